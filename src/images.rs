use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use crate::config::ImageHostConfig;

/// Unsigned-upload image host (Cloudinary-style): one POST with the file and
/// a fixed preset, returning a public URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, body: Bytes, content_type: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct CloudinaryHost {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl CloudinaryHost {
    pub fn new(config: &ImageHostConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: config.upload_url.clone(),
            upload_preset: config.upload_preset.clone(),
        }
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, body: Bytes, content_type: &str) -> anyhow::Result<String> {
        let part = reqwest::multipart::Part::bytes(body.to_vec())
            .file_name("upload")
            .mime_str(content_type)
            .context("invalid image content type")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let res = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .context("image host unreachable")?;

        let status = res.status();
        let parsed: UploadResponse = res.json().await.context("image host response body")?;

        if !status.is_success() {
            let message = parsed
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| format!("upload rejected with status {status}"));
            anyhow::bail!(message);
        }

        parsed
            .secure_url
            .ok_or_else(|| anyhow::anyhow!("upload response missing secure_url"))
    }
}

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

pub fn is_supported_image(ct: &str) -> bool {
    ext_from_mime(ct).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
        assert_eq!(ext_from_mime("whatever/else"), None);
    }

    #[test]
    fn supported_image_follows_mime_table() {
        assert!(is_supported_image("image/png"));
        assert!(!is_supported_image("text/plain"));
    }

    #[test]
    fn upload_response_parses_error_payload() {
        let parsed: UploadResponse =
            serde_json::from_str(r#"{"error":{"message":"Upload preset not found"}}"#).unwrap();
        assert!(parsed.secure_url.is_none());
        assert_eq!(parsed.error.unwrap().message, "Upload preset not found");
    }

    #[test]
    fn upload_response_parses_success_payload() {
        let parsed: UploadResponse =
            serde_json::from_str(r#"{"secure_url":"https://img.example/a.png"}"#).unwrap();
        assert_eq!(parsed.secure_url.as_deref(), Some("https://img.example/a.png"));
    }
}
