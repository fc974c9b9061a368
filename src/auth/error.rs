use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Terminal request failures for the auth flows. Each variant's display
/// string is exactly what the client sees.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    /// Onboarding names exactly which fields were left out.
    #[error("All fields are required")]
    MissingFields(Vec<String>),

    #[error("Email already exists, please use a different one.")]
    EmailTaken,

    /// Same message for unknown email and wrong password.
    #[error("Invalid Email or Password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    /// Anything unexpected; the detail stays in the server log.
    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

/// Error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::MissingFields(_) | AuthError::EmailTaken => {
                StatusCode::BAD_REQUEST
            }
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(e) = &self {
            error!(error = %e, "request failed unexpectedly");
        }
        let missing_fields = match &self {
            AuthError::MissingFields(fields) => Some(fields.clone()),
            _ => None,
        };
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            missing_fields,
        };
        (self.status(), Json(body)).into_response()
    }
}
