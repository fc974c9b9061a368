use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::{cookie::extract_session_token, jwt::JwtKeys};

/// Verified identity of the caller, resolved from the session cookie
/// (or a bearer token) before any handler that requires login runs.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_session_token(&parts.headers).ok_or((
            StatusCode::UNAUTHORIZED,
            "Unauthorized - no session token".to_string(),
        ))?;

        let keys = JwtKeys::from_ref(state);
        match keys.verify(&token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(_) => {
                warn!("invalid or expired session token");
                Err((
                    StatusCode::UNAUTHORIZED,
                    "Unauthorized - invalid or expired token".to_string(),
                ))
            }
        }
    }
}
