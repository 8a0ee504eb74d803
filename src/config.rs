use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageHostConfig {
    pub upload_url: String,
    pub upload_preset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub images: ImageHostConfig,
    pub mailer: MailerConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mint-events".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mint-events-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let images = ImageHostConfig {
            upload_url: std::env::var("IMAGE_UPLOAD_URL")?,
            upload_preset: std::env::var("IMAGE_UPLOAD_PRESET")
                .unwrap_or_else(|_| "unsigned_upload".into()),
        };
        let mailer = MailerConfig {
            api_url: std::env::var("MAIL_API_URL")?,
            api_key: std::env::var("MAIL_API_KEY")?,
            from_address: std::env::var("MAIL_FROM")?,
        };
        Ok(Self {
            database_url,
            jwt,
            images,
            mailer,
        })
    }
}
