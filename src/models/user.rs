//! User record served and cached by the demo service.

use serde::{Deserialize, Serialize};

/// A user, addressed by its primary key `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_json_shape() {
        let json = serde_json::to_string(&User::new("u1", "Ann")).unwrap();
        assert_eq!(json, r#"{"id":"u1","name":"Ann"}"#);
    }
}
