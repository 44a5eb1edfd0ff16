//! Backend models the client needs to understand
//!
//! Projects, workflows and the rest stay as `serde_json::Value`; only the
//! authentication payloads are typed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token pair returned by the JWT login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_verified: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tokens_default_to_bearer() {
        let tokens: AuthTokens = serde_json::from_value(json!({"access_token": "abc"})).unwrap();
        assert_eq!(tokens.access_token, "abc");
        assert_eq!(tokens.token_type, "bearer");
    }

    #[test]
    fn user_defaults() {
        let user: User = serde_json::from_value(json!({
            "id": "12345678-1234-1234-1234-123456789012",
            "email": "test@example.com"
        }))
        .unwrap();
        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert!(!user.is_verified);
    }

    #[test]
    fn user_rejects_bad_id() {
        let result: Result<User, _> =
            serde_json::from_value(json!({"id": "not-a-uuid", "email": "x@y.z"}));
        assert!(result.is_err());
    }
}
