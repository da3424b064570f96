use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Validate;
use crate::error::DomainError;

pub const USERNAME_MAX_LEN: usize = 150;

/// User entity - an author as seen by the blog.
///
/// Accounts are owned by the authentication collaborator; only the identity
/// and username are referenced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamp.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            created_at: Utc::now(),
        }
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), DomainError> {
        if self.username.trim().is_empty() {
            return Err(DomainError::Validation("username must not be empty".into()));
        }
        if self.username.chars().count() > USERNAME_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "username must be at most {USERNAME_MAX_LEN} characters"
            )));
        }
        Ok(())
    }
}
