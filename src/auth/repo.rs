use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub full_name: String,
    pub profile_pic: String,
    pub bio: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub is_onboarded: bool,
    pub created_at: OffsetDateTime,
}

/// Profile fields applied when a user completes onboarding.
#[derive(Debug)]
pub struct OnboardingProfile<'a> {
    pub full_name: &'a str,
    pub bio: &'a str,
    pub native_language: &'a str,
    pub learning_language: &'a str,
    pub location: &'a str,
}

impl User {
    /// Find a user by (already normalized) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, full_name, profile_pic, bio,
                   native_language, learning_language, location, is_onboarded, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, full_name, profile_pic, bio,
                   native_language, learning_language, location, is_onboarded, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password and a generated avatar.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        full_name: &str,
        profile_pic: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name, profile_pic)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, full_name, profile_pic, bio,
                      native_language, learning_language, location, is_onboarded, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(profile_pic)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Merge the onboarding profile into the record and mark it
    /// onboarded. `None` when the id no longer resolves to a user.
    pub async fn complete_onboarding(
        db: &PgPool,
        id: Uuid,
        profile: &OnboardingProfile<'_>,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = $2, bio = $3, native_language = $4,
                learning_language = $5, location = $6, is_onboarded = TRUE
            WHERE id = $1
            RETURNING id, email, password_hash, full_name, profile_pic, bio,
                      native_language, learning_language, location, is_onboarded, created_at
            "#,
        )
        .bind(id)
        .bind(profile.full_name)
        .bind(profile.bio)
        .bind(profile.native_language)
        .bind(profile.learning_language)
        .bind(profile.location)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}

/// Whether an error is the database rejecting a duplicate key. The
/// unique index on email is the arbiter for concurrent signups.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.is_unique_violation())
}
