use std::collections::HashMap;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    auth::{
        extractors::CurrentUser,
        policy::{self, Action},
    },
    error::ApiError,
    response::{self, ApiResponse},
    state::AppState,
    users::repo_types::{Role, User},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/mail/send", post(send_bulk))
}

#[derive(Debug, Deserialize)]
pub struct BulkMailRequest {
    pub subject: String,
    pub template: String,
    /// Extra `{{ var }}` substitutions applied to the template.
    #[serde(default)]
    pub context: HashMap<String, String>,
    /// Empty list means every user.
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[instrument(skip(state, actor, payload))]
pub async fn send_bulk(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<BulkMailRequest>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    policy::authorize(&actor, Action::SendBulkMail)?;

    if payload.subject.trim().is_empty() || payload.template.trim().is_empty() {
        return Err(ApiError::Validation(
            "Subject and template are required".into(),
        ));
    }
    let template = payload.template.trim();
    if !super::is_valid_template_name(template) {
        return Err(ApiError::Validation(
            "Template name may only contain lowercase letters, digits, hyphens and underscores"
                .into(),
        ));
    }

    let recipients = User::list_by_roles(&state.db, &payload.roles).await?;
    let mut sent = Vec::with_capacity(recipients.len());
    for user in recipients {
        let mut vars: Vec<(String, String)> = payload
            .context
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        vars.push(("username".into(), user.username.clone()));

        state
            .mailer
            .send(&user.email, &payload.subject, template, &vars)
            .await
            .map_err(ApiError::MailDispatch)?;
        sent.push(user.email);
    }

    info!(
        actor = %actor.id,
        action = "bulk_mail",
        subject = %payload.subject,
        recipients = sent.len(),
        "bulk mail dispatched"
    );
    Ok(response::ok(
        format!("Sent \"{}\" to {} users.", payload.subject, sent.len()),
        sent,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_and_context_default_to_empty() {
        let req: BulkMailRequest =
            serde_json::from_str(r#"{"subject":"Hi","template":"notice"}"#).unwrap();
        assert!(req.roles.is_empty());
        assert!(req.context.is_empty());
    }

    #[test]
    fn roles_parse_lowercase() {
        let req: BulkMailRequest = serde_json::from_str(
            r#"{"subject":"Hi","template":"notice","roles":["admin","moderator"]}"#,
        )
        .unwrap();
        assert_eq!(req.roles, vec![Role::Admin, Role::Moderator]);
    }

    #[tokio::test]
    async fn template_names_that_leave_the_directory_are_rejected() {
        let state = AppState::fake();
        let admin = CurrentUser(User::stub(Role::Admin, true));
        let payload = BulkMailRequest {
            subject: "Hi".into(),
            template: "../../../etc/secrets".into(),
            context: HashMap::new(),
            roles: Vec::new(),
        };

        let result = send_bulk(State(state), admin, Json(payload)).await;

        match result {
            Err(ApiError::Validation(message)) => {
                assert!(message.starts_with("Template name"), "{message}");
            }
            other => panic!("expected a validation rejection, got {other:?}"),
        }
    }
}
