use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{error, instrument};

use crate::auth::services::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

pub fn router() -> Router<AppState> {
    // Non-POST methods on the path get 405 from the method router.
    Router::new().route("/email/send", post(send_email))
}

fn validate_body(body: &SendEmailRequest) -> Result<(), &'static str> {
    if body.to.trim().is_empty() || body.subject.trim().is_empty() || body.message.trim().is_empty()
    {
        return Err("Missing required fields");
    }
    Ok(())
}

/// Relay a transactional email through the configured provider. Callers must
/// hold a valid session; the provider credential never leaves server config.
#[instrument(skip(state, claims, body), fields(user_id = %claims.sub))]
pub async fn send_email(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Json(body): Json<SendEmailRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    validate_body(&body).map_err(|msg| (StatusCode::BAD_REQUEST, msg.to_string()))?;

    if let Err(e) = state.mailer.send(&body.to, &body.subject, &body.message).await {
        error!(error = %e, to = %body.to, "relay send failed");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to send email".to_string(),
        ));
    }
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(to: &str, subject: &str, message: &str) -> SendEmailRequest {
        SendEmailRequest {
            to: to.into(),
            subject: subject.into(),
            message: message.into(),
        }
    }

    #[test]
    fn complete_body_is_accepted() {
        assert!(validate_body(&body("a@b.c", "Reminder", "Starts soon")).is_ok());
    }

    #[test]
    fn each_missing_field_is_rejected() {
        assert!(validate_body(&body("", "s", "m")).is_err());
        assert!(validate_body(&body("a@b.c", "", "m")).is_err());
        assert!(validate_body(&body("a@b.c", "s", "")).is_err());
        assert!(validate_body(&body("  ", "s", "m")).is_err());
    }

    #[test]
    fn omitted_fields_deserialize_to_empty_and_fail_validation() {
        let parsed: SendEmailRequest = serde_json::from_str(r#"{"to":"a@b.c"}"#).unwrap();
        assert!(validate_body(&parsed).is_err());
    }
}
