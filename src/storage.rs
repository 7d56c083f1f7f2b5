use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

/// Where avatar uploads live. A trait seam so tests never touch the disk.
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Persist the bytes and return the public path to serve them from.
    async fn put(&self, content_type: &str, body: Bytes) -> anyhow::Result<String>;
    async fn delete(&self, path: &str) -> anyhow::Result<()>;
}

pub const PUBLIC_PREFIX: &str = "/uploads";

/// Local-disk store; files land under the configured upload directory.
pub struct LocalAvatarStore {
    root: PathBuf,
}

impl LocalAvatarStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

#[async_trait]
impl AvatarStore for LocalAvatarStore {
    async fn put(&self, content_type: &str, body: Bytes) -> anyhow::Result<String> {
        let filename = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
        tokio::fs::create_dir_all(&self.root)
            .await
            .context("create upload dir")?;
        let target = self.root.join(&filename);
        tokio::fs::write(&target, &body)
            .await
            .with_context(|| format!("write avatar {}", target.display()))?;
        Ok(format!("{PUBLIC_PREFIX}/{filename}"))
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let Some(filename) = path.strip_prefix(&format!("{PUBLIC_PREFIX}/")) else {
            return Ok(());
        };
        // Paths come from our own records; reject anything that escapes.
        if filename.contains('/') || filename.contains("..") {
            anyhow::bail!("refusing to delete outside the upload dir: {path}");
        }
        let target = self.root.join(filename);
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("delete avatar {}", target.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> LocalAvatarStore {
        let dir = std::env::temp_dir().join(format!("snippets-avatars-{}", Uuid::new_v4()));
        LocalAvatarStore::new(dir)
    }

    #[tokio::test]
    async fn put_then_delete_roundtrip() {
        let store = temp_store();
        let path = store
            .put("image/png", Bytes::from_static(b"not-really-a-png"))
            .await
            .expect("put");
        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with(".png"));
        let on_disk = store.root.join(path.strip_prefix("/uploads/").unwrap());
        assert!(on_disk.exists());

        store.delete(&path).await.expect("delete");
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn delete_ignores_missing_files_and_foreign_paths() {
        let store = temp_store();
        store.delete("/uploads/gone.png").await.expect("missing ok");
        store.delete("https://cdn.example/avatar.png").await.expect("foreign ok");
    }

    #[tokio::test]
    async fn delete_refuses_traversal() {
        let store = temp_store();
        assert!(store.delete("/uploads/../etc/passwd").await.is_err());
    }

    #[test]
    fn unknown_content_types_fall_back_to_bin() {
        assert_eq!(extension_for("application/pdf"), "bin");
        assert_eq!(extension_for("image/jpeg"), "jpg");
    }
}
