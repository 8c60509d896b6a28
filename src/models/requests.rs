//! Request DTOs for the user API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::MAX_KEY_LENGTH;
use crate::models::User;

/// Request body for user creation (POST /users)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    /// Primary key of the new user
    pub id: String,
    /// Display name
    pub name: String,
}

impl CreateUserRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.id.is_empty() {
            return Some("id cannot be empty".to_string());
        }
        if self.id.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "id exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        if self.name.trim().is_empty() {
            return Some("name cannot be empty".to_string());
        }
        None
    }
}

impl From<CreateUserRequest> for User {
    fn from(req: CreateUserRequest) -> Self {
        User::new(req.id, req.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_deserialize() {
        let json = r#"{"id": "u1", "name": "Ann"}"#;
        let req: CreateUserRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.id, "u1");
        assert_eq!(req.name, "Ann");
    }

    #[test]
    fn test_validate_empty_id() {
        let req = CreateUserRequest {
            id: "".to_string(),
            name: "Ann".to_string(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_blank_name() {
        let req = CreateUserRequest {
            id: "u1".to_string(),
            name: "  ".to_string(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = CreateUserRequest {
            id: "u1".to_string(),
            name: "Ann".to_string(),
        };
        assert!(req.validate().is_none());
        assert_eq!(User::from(req), User::new("u1", "Ann"));
    }
}
