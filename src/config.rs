use serde::Deserialize;

/// Credentials for the external chat directory. Optional as a pair:
/// without them the server still starts, sync just fails per call.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub cookie_secure: bool,
    pub stream: Option<StreamConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt_secret = std::env::var("JWT_SECRET_KEY")?;
        let cookie_secure = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);
        let stream = match (
            std::env::var("STREAM_API_KEY"),
            std::env::var("STREAM_API_SECRET"),
        ) {
            (Ok(api_key), Ok(api_secret)) => Some(StreamConfig {
                api_key,
                api_secret,
                base_url: std::env::var("STREAM_BASE_URL")
                    .unwrap_or_else(|_| "https://chat.stream-io-api.com".into()),
            }),
            _ => None,
        };
        Ok(Self {
            database_url,
            jwt_secret,
            cookie_secure,
            stream,
        })
    }
}
