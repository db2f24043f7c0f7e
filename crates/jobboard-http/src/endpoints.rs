//! Request/response types for the `/auth` endpoints.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Request body for login.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login.
#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Response from refresh.
///
/// Backends that rotate refresh tokens also return a new `refresh_token`.
#[derive(Deserialize)]
pub(crate) struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Response wrapper from `/auth/me`.
#[derive(Deserialize)]
pub(crate) struct MeResponse {
    pub user: CurrentUser,
}

/// Request body for requesting a password reset.
#[derive(Serialize)]
pub(crate) struct PasswordResetRequest<'a> {
    pub email: &'a str,
}

/// Request body for completing a password reset.
#[derive(Serialize)]
pub(crate) struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub password: &'a str,
}

/// Request body for verifying a profile-update code.
#[derive(Serialize)]
pub(crate) struct VerifyCodeRequest<'a> {
    pub code: &'a str,
}

/// Account registration details.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub username: String,
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            username: username.into(),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Response from registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
}

/// The authenticated user as reported by `/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Informational reply (`{"msg": "..."}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

/// Accept identifiers sent either as JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn current_user_accepts_string_id() {
        let me: MeResponse =
            serde_json::from_value(json!({"user": {"id": "5", "email": "a@b.c"}})).unwrap();
        assert_eq!(me.user.id, "5");
        assert_eq!(me.user.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn registered_user_accepts_numeric_id() {
        let user: RegisteredUser =
            serde_json::from_value(json!({"id": 17, "email": "a@b.c"})).unwrap();
        assert_eq!(user.id, "17");
    }

    #[test]
    fn message_accepts_either_field() {
        let a: Message = serde_json::from_value(json!({"msg": "ok"})).unwrap();
        let b: Message = serde_json::from_value(json!({"message": "ok"})).unwrap();
        assert_eq!(a.msg, b.msg);
    }

    #[test]
    fn registration_debug_hides_password() {
        let reg = Registration::new("a@b.c", "pw-secret", "alice");
        assert!(!format!("{:?}", reg).contains("pw-secret"));
    }

    #[test]
    fn refresh_response_without_rotation() {
        let refresh: RefreshResponse =
            serde_json::from_value(json!({"access_token": "newTok"})).unwrap();
        assert_eq!(refresh.access_token, "newTok");
        assert!(refresh.refresh_token.is_none());
    }
}
