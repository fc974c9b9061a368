use std::time::Duration;

use axum::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{DirectoryClient, DirectoryUser};
use crate::config::StreamConfig;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

// Directory availability must never stall a signup or onboarding
// response beyond this.
const SYNC_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct ServerClaims {
    server: bool,
}

/// Stream-style chat directory client. Server-side requests carry a
/// JWT signed with the API secret; the API key rides as a query param.
pub struct StreamDirectory {
    client: Client,
    base_url: String,
    api_key: String,
    server_token: String,
}

impl StreamDirectory {
    pub fn new(config: &StreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(SYNC_TIMEOUT)
            .build()?;

        // The server token is static per secret; sign it once.
        let server_token = encode(
            &Header::default(),
            &ServerClaims { server: true },
            &EncodingKey::from_secret(config.api_secret.as_bytes()),
        )?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            server_token,
        })
    }
}

#[async_trait]
impl DirectoryClient for StreamDirectory {
    async fn upsert_user(&self, user: &DirectoryUser) -> anyhow::Result<()> {
        let url = format!("{}/users?api_key={}", self.base_url, self.api_key);

        let mut users = serde_json::Map::new();
        users.insert(user.id.clone(), serde_json::to_value(user)?);
        let payload = json!({ "users": users });

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.server_token.as_str())
            .header("stream-auth-type", "jwt")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            anyhow::bail!(
                "directory upsert failed: {}, {}",
                status,
                body["message"].as_str().unwrap_or("")
            );
        }

        debug!(user_id = %user.id, "directory user upserted");
        Ok(())
    }
}
