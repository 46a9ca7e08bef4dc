//! User records held by the credential store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, UserId};

use crate::Role;

/// A stored user.
///
/// # Invariants
/// - `username` is trimmed and non-empty; uniqueness is checked by the store.
/// - `password_hash` is a PHC record, never the plaintext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a user from validated registration input and an already computed hash.
    pub fn register(new: &NewUser, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            username: new.username.trim().to_string(),
            password_hash,
            role: new.role.clone().unwrap_or_default(),
            created_at: now,
        }
    }
}

// Keeps the hash out of logs.
impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Registration input.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), DomainError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if username.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("username cannot contain whitespace"));
        }
        if self.password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }
        if let Some(role) = &self.role {
            if role.as_str().trim().is_empty() {
                return Err(DomainError::validation("role cannot be empty"));
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, password: &str, role: Option<Role>) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: password.to_string(),
            role,
        }
    }

    #[test]
    fn register_defaults_role_to_user_and_trims_name() {
        let input = new_user("  alice ", "pw", None);
        input.validate().unwrap();
        let user = User::register(&input, "$argon2id$stub".to_string(), Utc::now());
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::user());
    }

    #[test]
    fn register_keeps_requested_role() {
        let input = new_user("root", "pw", Some(Role::admin()));
        let user = User::register(&input, "$argon2id$stub".to_string(), Utc::now());
        assert!(user.role.is_admin());
    }

    #[test]
    fn validation_rejects_blank_fields() {
        assert!(matches!(new_user("   ", "pw", None).validate(), Err(DomainError::Validation(_))));
        assert!(matches!(new_user("bob", "", None).validate(), Err(DomainError::Validation(_))));
        assert!(matches!(new_user("bo b", "pw", None).validate(), Err(DomainError::Validation(_))));
        assert!(matches!(
            new_user("bob", "pw", Some(Role::new(" "))).validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let input = new_user("carol", "hunter2", None);
        assert!(!format!("{input:?}").contains("hunter2"));

        let user = User::register(&input, "$argon2id$v=19$secret-hash".to_string(), Utc::now());
        assert!(!format!("{user:?}").contains("secret-hash"));
    }

    #[test]
    fn stored_form_uses_camel_case() {
        let input = new_user("dave", "pw", None);
        let user = User::register(&input, "$argon2id$stub".to_string(), Utc::now());
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "dave");
        assert_eq!(json["passwordHash"], "$argon2id$stub");
        assert_eq!(json["role"], "user");
    }
}
