use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{SHORT_TEXT_LEN, Validate, truncate_chars};
use crate::error::DomainError;

pub const TITLE_MAX_LEN: usize = 200;

/// Group entity - a topical category posts may belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    /// Unique URL key.
    pub slug: String,
    pub description: String,
}

impl Group {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            slug: slug.into(),
            description: description.into(),
        }
    }

    pub fn short_title(&self) -> &str {
        truncate_chars(&self.title, SHORT_TEXT_LEN)
    }
}

/// Slugs are restricted to ASCII letters, digits, hyphens and underscores.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Validate for Group {
    fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("group title must not be empty".into()));
        }
        if self.title.chars().count() > TITLE_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "group title must be at most {TITLE_MAX_LEN} characters"
            )));
        }
        if !is_valid_slug(&self.slug) {
            return Err(DomainError::Validation(format!(
                "invalid group slug: {:?}",
                self.slug
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_title())
    }
}
