use anyhow::Context;
use axum::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::config::MailerConfig;

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, message: &str) -> anyhow::Result<()>;
}

/// HTTP mail provider client. The API key lives in server config only; callers
/// never supply credentials.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from_address: String,
}

impl HttpMailer {
    pub fn new(config: &MailerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailer {
    async fn send(&self, to: &str, subject: &str, message: &str) -> anyhow::Result<()> {
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from_address,
                "to": to,
                "subject": subject,
                "text": message,
            }))
            .send()
            .await
            .context("mail provider unreachable")?;

        if !res.status().is_success() {
            anyhow::bail!("mail provider returned {}", res.status());
        }
        info!(%to, %subject, "email sent");
        Ok(())
    }
}

/// Fire-and-forget helper for notification mail: delivery problems are logged
/// and never fail the operation that triggered them.
pub async fn send_best_effort(mailer: &dyn MailTransport, to: &str, subject: &str, message: &str) {
    if let Err(e) = mailer.send(to, subject, message).await {
        warn!(error = %e, %to, "notification email not delivered");
    }
}
