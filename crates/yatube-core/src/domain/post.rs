use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{SHORT_TEXT_LEN, Validate, truncate_chars};
use crate::error::DomainError;

/// Post entity - a single authored text entry.
///
/// `pub_date` and `author_id` are fixed when the post is created; edits go
/// through [`Post::edit`], which only touches the editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    /// Relative path of the attached image, e.g. `posts/cat.jpg`.
    pub image: Option<String>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, text: impl Into<String>, group_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            pub_date: Utc::now(),
            author_id,
            group_id,
            image: None,
        }
    }

    pub fn with_image(mut self, path: impl Into<String>) -> Self {
        self.image = Some(path.into());
        self
    }

    /// Replace the editable fields, keeping identity, author and `pub_date`.
    pub fn edit(&mut self, text: impl Into<String>, group_id: Option<Uuid>) {
        self.text = text.into();
        self.group_id = group_id;
    }

    pub fn short_text(&self) -> &str {
        truncate_chars(&self.text, SHORT_TEXT_LEN)
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

impl Validate for Post {
    fn validate(&self) -> Result<(), DomainError> {
        if self.text.trim().is_empty() {
            return Err(DomainError::Validation("post text must not be empty".into()));
        }
        Ok(())
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_first_fifteen_characters() {
        let post = Post::new(
            Uuid::new_v4(),
            "Текст не самого длинного поста, больше 15 символов",
            None,
        );
        assert_eq!(post.to_string(), "Текст не самого");
    }

    #[test]
    fn test_edit_keeps_identity_author_and_pub_date() {
        let author = Uuid::new_v4();
        let mut post = Post::new(author, "before", None);
        let (id, pub_date) = (post.id, post.pub_date);

        let group = Uuid::new_v4();
        post.edit("after", Some(group));

        assert_eq!(post.id, id);
        assert_eq!(post.pub_date, pub_date);
        assert_eq!(post.author_id, author);
        assert_eq!(post.text, "after");
        assert_eq!(post.group_id, Some(group));
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let post = Post::new(Uuid::new_v4(), "   ", None);
        assert!(matches!(post.validate(), Err(DomainError::Validation(_))));
    }
}
