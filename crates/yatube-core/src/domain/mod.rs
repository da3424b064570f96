//! Domain entities - the core business objects.

mod group;
mod post;
mod user;

pub use group::Group;
pub use post::Post;
pub use user::User;

use crate::error::DomainError;

/// Length of the short projection used when an entity is displayed.
pub const SHORT_TEXT_LEN: usize = 15;

/// Field constraints checked at the persistence boundary.
pub trait Validate {
    fn validate(&self) -> Result<(), DomainError>;
}

/// First `limit` characters of `text`, counted as Unicode scalar values.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
