pub mod handlers;

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use regex::Regex;
use tracing::info;

use crate::config::MailConfig;

/// Outbound mail seam. Handlers depend on this trait so tests can swap in
/// a recording fake.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        vars: &[(String, String)],
    ) -> anyhow::Result<()>;
}

/// Template names resolve to files on disk. Restrict them to a flat,
/// lowercase alphabet so a crafted name cannot point outside the
/// template directory.
pub fn is_valid_template_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Substitute `{{ var }}` placeholders textually.
pub fn render(template: &str, vars: &[(String, String)]) -> anyhow::Result<String> {
    let mut html = template.to_string();
    for (key, value) in vars {
        let re = Regex::new(&format!(r"\{{\{{\s*{}\s*\}}\}}", regex::escape(key)))
            .context("template variable pattern")?;
        html = re.replace_all(&html, value.as_str()).into_owned();
    }
    Ok(html)
}

/// SMTP-backed dispatcher rendering named HTML templates from disk.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    template_dir: PathBuf,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
            .context("smtp relay")?
            .port(cfg.port);
        if !cfg.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                cfg.username.clone(),
                cfg.password.clone(),
            ));
        }
        Ok(Self {
            transport: builder.build(),
            from: format!("\"Snippets\" <{}>", cfg.from_address),
            template_dir: PathBuf::from(&cfg.template_dir),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        vars: &[(String, String)],
    ) -> anyhow::Result<()> {
        anyhow::ensure!(
            is_valid_template_name(template),
            "invalid template name: {template}"
        );
        let path = self.template_dir.join(format!("{template}.html"));
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("load mail template {}", path.display()))?;
        let html = render(&raw, vars)?;

        let message = Message::builder()
            .from(self.from.parse().context("from address")?)
            .to(to.parse().context("to address")?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .context("build message")?;

        self.transport.send(message).await.context("smtp send")?;
        info!(%to, %subject, %template, "mail dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_every_occurrence() {
        let html = render(
            "<p>Hi {{username}}, your code is {{otp}}. Bye {{ username }}.</p>",
            &[
                ("username".into(), "alice".into()),
                ("otp".into(), "123456".into()),
            ],
        )
        .unwrap();
        assert_eq!(html, "<p>Hi alice, your code is 123456. Bye alice.</p>");
    }

    #[test]
    fn render_leaves_unknown_placeholders_alone() {
        let html = render("{{known}} {{unknown}}", &[("known".into(), "yes".into())]).unwrap();
        assert_eq!(html, "yes {{unknown}}");
    }

    #[test]
    fn render_tolerates_whitespace_in_placeholders() {
        let html = render("{{  otp  }}", &[("otp".into(), "654321".into())]).unwrap();
        assert_eq!(html, "654321");
    }

    #[test]
    fn template_names_are_flat_and_lowercase() {
        assert!(is_valid_template_name("welcome"));
        assert!(is_valid_template_name("verify"));
        assert!(is_valid_template_name("password_reset-2"));

        assert!(!is_valid_template_name(""));
        assert!(!is_valid_template_name("../../../etc/config"));
        assert!(!is_valid_template_name("reset/../../secrets"));
        assert!(!is_valid_template_name("sub/dir"));
        assert!(!is_valid_template_name("Welcome"));
        assert!(!is_valid_template_name("welcome.html"));
    }
}
