use axum::{
    extract::{FromRef, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookie::{clear_session_cookie, session_cookie},
        dto::{AuthResponse, MessageResponse, OnboardRequest, SigninRequest, SignupRequest},
        error::AuthError,
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{is_unique_violation, OnboardingProfile, User},
    },
    directory::{sync_user, DirectoryUser},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/logout", post(logout))
        .route("/auth/onboarding", post(onboard))
        .route("/auth/me", get(me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn random_avatar() -> String {
    let idx = rand::thread_rng().gen_range(1..=100);
    format!("https://avatar.iran.liara.run/public/{idx}.png")
}

fn set_cookie_headers(token: &str, secure: bool) -> Result<HeaderMap, AuthError> {
    let mut headers = HeaderMap::new();
    let value = session_cookie(token, secure).map_err(|e| AuthError::Internal(e.into()))?;
    headers.insert(SET_COOKIE, value);
    Ok(headers)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), AuthError> {
    payload.email = payload.email.trim().to_lowercase();
    let full_name = payload.full_name.trim().to_string();

    if payload.email.is_empty() || payload.password.is_empty() || full_name.is_empty() {
        warn!("signup with missing fields");
        return Err(AuthError::Validation("All fields are required".into()));
    }
    if payload.password.len() < 6 {
        warn!("signup password too short");
        return Err(AuthError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "signup invalid email");
        return Err(AuthError::Validation("Invalid email format".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "signup email already registered");
        return Err(AuthError::EmailTaken);
    }

    let hash = hash_password(&payload.password)?;
    let avatar = random_avatar();

    // Concurrent signups race the pre-check; the unique index on email
    // settles it, and the loser reads the same as the pre-check hit.
    let user = match User::create(&state.db, &payload.email, &hash, &full_name, &avatar).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "signup email already registered");
            return Err(AuthError::EmailTaken);
        }
        Err(e) => return Err(AuthError::Internal(e)),
    };

    sync_user(
        state.directory.as_ref(),
        DirectoryUser::new(user.id, &user.full_name, &user.profile_pic),
    )
    .await;

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    let headers = set_cookie_headers(&token, state.config.cookie_secure)?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse {
            success: true,
            user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Json(mut payload): Json<SigninRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), AuthError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() || payload.password.is_empty() {
        warn!("signin with missing fields");
        return Err(AuthError::Validation("All fields are required".into()));
    }

    // Unknown email and wrong password must be indistinguishable.
    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "signin unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "signin invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    let headers = set_cookie_headers(&token, state.config.cookie_secure)?;

    info!(user_id = %user.id, email = %user.email, "user signed in");
    Ok((
        headers,
        Json(AuthResponse {
            success: true,
            user,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<MessageResponse>) {
    // Always clear the cookie, even without a prior session.
    let mut headers = HeaderMap::new();
    if let Ok(value) = clear_session_cookie(state.config.cookie_secure) {
        headers.insert(SET_COOKIE, value);
    }

    (
        headers,
        Json(MessageResponse {
            success: true,
            message: "Logout successful".into(),
        }),
    )
}

/// Precondition: the caller's identity was already verified by the
/// [`AuthUser`] extractor; this handler never sees an anonymous request.
#[instrument(skip(state, payload))]
pub async fn onboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<OnboardRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let missing = payload.missing_fields();
    if !missing.is_empty() {
        warn!(user_id = %user_id, ?missing, "onboarding with missing fields");
        return Err(AuthError::MissingFields(missing));
    }

    let profile = OnboardingProfile {
        full_name: payload.full_name.trim(),
        bio: payload.bio.trim(),
        native_language: payload.native_language.trim(),
        learning_language: payload.learning_language.trim(),
        location: payload.location.trim(),
    };

    let Some(user) = User::complete_onboarding(&state.db, user_id, &profile).await? else {
        warn!(user_id = %user_id, "onboarding for unknown user");
        return Err(AuthError::UserNotFound);
    };

    sync_user(
        state.directory.as_ref(),
        DirectoryUser::new(user.id, &user.full_name, &user.profile_pic),
    )
    .await;

    info!(user_id = %user.id, "user onboarded");
    Ok(Json(AuthResponse {
        success: true,
        user,
    }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<AuthResponse>, AuthError> {
    let Some(user) = User::find_by_id(&state.db, user_id).await? else {
        warn!(user_id = %user_id, "session for unknown user");
        return Err(AuthError::UserNotFound);
    };
    Ok(Json(AuthResponse {
        success: true,
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn signup_payload(email: &str, password: &str, full_name: &str) -> Json<SignupRequest> {
        Json(SignupRequest {
            email: email.into(),
            password: password.into(),
            full_name: full_name.into(),
        })
    }

    #[test]
    fn email_pattern_accepts_plain_addresses() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn email_pattern_rejects_malformed_addresses() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@b.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("spaced name@b.com"));
        assert!(!is_valid_email("a@b .com"));
    }

    #[test]
    fn avatar_url_stays_in_template_bounds() {
        for _ in 0..50 {
            let url = random_avatar();
            let idx: u32 = url
                .strip_prefix("https://avatar.iran.liara.run/public/")
                .and_then(|rest| rest.strip_suffix(".png"))
                .and_then(|n| n.parse().ok())
                .expect("avatar url should match the template");
            assert!((1..=100).contains(&idx));
        }
    }

    #[tokio::test]
    async fn signup_rejects_missing_fields() {
        let state = AppState::fake();
        let err = signup(State(state), signup_payload("a@b.com", "", "A B"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(m) if m == "All fields are required"));
    }

    #[tokio::test]
    async fn signup_rejects_short_password() {
        let state = AppState::fake();
        let err = signup(State(state), signup_payload("a@b.com", "five5", "A B"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AuthError::Validation(m) if m == "Password must be at least 6 characters")
        );
    }

    #[tokio::test]
    async fn signup_rejects_invalid_email() {
        let state = AppState::fake();
        let err = signup(State(state), signup_payload("not-an-email", "secret1", "A B"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(m) if m == "Invalid email format"));
    }

    #[tokio::test]
    async fn signin_rejects_missing_fields() {
        let state = AppState::fake();
        let err = signin(
            State(state),
            Json(SigninRequest {
                email: "a@b.com".into(),
                password: String::new(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::Validation(m) if m == "All fields are required"));
    }

    #[tokio::test]
    async fn onboard_reports_each_missing_field() {
        let state = AppState::fake();
        let err = onboard(
            State(state),
            AuthUser(Uuid::new_v4()),
            Json(OnboardRequest {
                full_name: "A B".into(),
                bio: String::new(),
                native_language: "en".into(),
                learning_language: String::new(),
                location: String::new(),
            }),
        )
        .await
        .unwrap_err();
        match err {
            AuthError::MissingFields(fields) => {
                assert_eq!(fields, vec!["bio", "learningLanguage", "location"]);
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn logout_clears_cookie_and_succeeds() {
        let state = AppState::fake();
        let (headers, Json(body)) = logout(State(state)).await;
        assert!(body.success);
        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("jwt=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
