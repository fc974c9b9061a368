use serde::{Deserialize, Serialize};

use crate::auth::repo::User;

/// Request body for signup. Absent fields deserialize to empty strings
/// so the handlers report them as missing instead of the JSON layer
/// rejecting the body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Request body for signin.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Request body for the one-time onboarding step.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardRequest {
    pub full_name: String,
    pub bio: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
}

impl OnboardRequest {
    /// Wire names of required fields that are empty or absent.
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("fullName", &self.full_name),
            ("bio", &self.bio),
            ("nativeLanguage", &self.native_language),
            ("learningLanguage", &self.learning_language),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                missing.push(name.to_string());
            }
        }
        missing
    }
}

/// Response returned when a flow yields a user.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: User,
}

/// Response for flows without a user payload (logout).
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_signup_fields_default_to_empty() {
        let req: SignupRequest = serde_json::from_str(r#"{"email":"a@b.com"}"#).unwrap();
        assert_eq!(req.email, "a@b.com");
        assert!(req.password.is_empty());
        assert!(req.full_name.is_empty());
    }

    #[test]
    fn signup_reads_camel_case_names() {
        let req: SignupRequest =
            serde_json::from_str(r#"{"email":"a@b.com","password":"secret1","fullName":"A B"}"#)
                .unwrap();
        assert_eq!(req.full_name, "A B");
    }

    #[test]
    fn missing_fields_lists_only_empty_ones() {
        let req: OnboardRequest = serde_json::from_str(
            r#"{"fullName":"A B","bio":"hi","location":"  "}"#,
        )
        .unwrap();
        assert_eq!(
            req.missing_fields(),
            vec!["nativeLanguage", "learningLanguage", "location"]
        );
    }

    #[test]
    fn complete_onboard_request_has_no_missing_fields() {
        let req: OnboardRequest = serde_json::from_str(
            r#"{"fullName":"A B","bio":"hi","nativeLanguage":"en","learningLanguage":"es","location":"Lisbon"}"#,
        )
        .unwrap();
        assert!(req.missing_fields().is_empty());
    }
}
