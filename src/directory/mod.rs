use axum::async_trait;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

pub mod stream;

/// Identity fields mirrored to the chat directory.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryUser {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl DirectoryUser {
    pub fn new(id: Uuid, name: &str, image: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            image: image.to_string(),
        }
    }
}

/// Create-or-update seam for the external user directory.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn upsert_user(&self, user: &DirectoryUser) -> anyhow::Result<()>;
}

/// Stand-in used when no directory credentials were configured; every
/// call fails and [`sync_user`] absorbs the failure.
pub struct DisabledDirectory;

#[async_trait]
impl DirectoryClient for DisabledDirectory {
    async fn upsert_user(&self, _user: &DirectoryUser) -> anyhow::Result<()> {
        anyhow::bail!("directory credentials not configured")
    }
}

/// Mirror a user to the directory. Failures are logged and swallowed;
/// the surrounding flow must not notice them.
pub async fn sync_user(directory: &dyn DirectoryClient, user: DirectoryUser) {
    if let Err(e) = directory.upsert_user(&user).await {
        warn!(error = %e, user_id = %user.id, "directory sync failed");
    }
}
