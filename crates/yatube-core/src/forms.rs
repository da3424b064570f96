//! Binding and validation of submitted post forms.

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::Post;
use crate::error::RepoError;
use crate::ports::GroupRepository;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Raw form body as submitted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFormData {
    #[serde(default)]
    pub text: String,
    /// Group id, or empty for "no group".
    #[serde(default)]
    pub group: String,
}

/// Validated form fields, ready to be applied to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPost {
    pub text: String,
    pub group_id: Option<Uuid>,
}

/// A post form together with its field errors.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub text: String,
    pub group: String,
    pub text_errors: Vec<String>,
    pub group_errors: Vec<String>,
}

/// Result of validating a bound form.
#[derive(Debug)]
pub enum FormOutcome {
    Valid(CleanedPost),
    Invalid(PostForm),
}

impl PostForm {
    /// Unbound form for the create page.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Form pre-filled from an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()).unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn bind(data: PostFormData) -> Self {
        Self {
            text: data.text,
            group: data.group,
            ..Self::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.text_errors.is_empty() || !self.group_errors.is_empty()
    }

    /// Validate the bound data. Group choices are checked against `groups`.
    pub async fn validate(mut self, groups: &dyn GroupRepository) -> Result<FormOutcome, RepoError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            self.text_errors.push(REQUIRED.to_string());
        }

        let group_choice = self.group.trim();
        let group_id = if group_choice.is_empty() {
            None
        } else {
            let found = match Uuid::parse_str(group_choice) {
                Ok(id) => groups.find_by_id(id).await?.map(|group| group.id),
                Err(_) => None,
            };
            if found.is_none() {
                self.group_errors.push(INVALID_CHOICE.to_string());
            }
            found
        };

        if self.has_errors() {
            return Ok(FormOutcome::Invalid(self));
        }

        Ok(FormOutcome::Valid(CleanedPost { text, group_id }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::Group;
    use crate::ports::BaseRepository;

    struct StaticGroups(HashMap<Uuid, Group>);

    #[async_trait]
    impl BaseRepository<Group, Uuid> for StaticGroups {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
            Ok(self.0.get(&id).cloned())
        }

        async fn insert(&self, entity: Group) -> Result<Group, RepoError> {
            Ok(entity)
        }

        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[async_trait]
    impl GroupRepository for StaticGroups {
        async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
            Ok(self.0.values().find(|g| g.slug == slug).cloned())
        }

        async fn all(&self) -> Result<Vec<Group>, RepoError> {
            Ok(self.0.values().cloned().collect())
        }
    }

    fn groups() -> (StaticGroups, Group) {
        let group = Group::new("Cats", "cats", "All about cats");
        let mut map = HashMap::new();
        map.insert(group.id, group.clone());
        (StaticGroups(map), group)
    }

    fn data(text: &str, group: &str) -> PostFormData {
        PostFormData {
            text: text.to_string(),
            group: group.to_string(),
        }
    }

    #[tokio::test]
    async fn test_valid_form_with_group() {
        let (repo, group) = groups();
        let form = PostForm::bind(data("  hello  ", &group.id.to_string()));

        match form.validate(&repo).await.unwrap() {
            FormOutcome::Valid(cleaned) => {
                assert_eq!(cleaned.text, "hello");
                assert_eq!(cleaned.group_id, Some(group.id));
            }
            FormOutcome::Invalid(form) => panic!("unexpected errors: {form:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_group_means_no_group() {
        let (repo, _) = groups();
        let outcome = PostForm::bind(data("hello", "")).validate(&repo).await.unwrap();
        assert!(matches!(
            outcome,
            FormOutcome::Valid(CleanedPost { group_id: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_blank_text_is_required() {
        let (repo, _) = groups();
        match PostForm::bind(data("   ", "")).validate(&repo).await.unwrap() {
            FormOutcome::Invalid(form) => {
                assert_eq!(form.text_errors, vec![REQUIRED.to_string()]);
                assert!(form.group_errors.is_empty());
            }
            FormOutcome::Valid(_) => panic!("blank text accepted"),
        }
    }

    #[tokio::test]
    async fn test_unknown_group_is_invalid_choice() {
        let (repo, _) = groups();
        for choice in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
            match PostForm::bind(data("hello", &choice)).validate(&repo).await.unwrap() {
                FormOutcome::Invalid(form) => {
                    assert_eq!(form.group_errors, vec![INVALID_CHOICE.to_string()]);
                    assert_eq!(form.group, choice);
                }
                FormOutcome::Valid(_) => panic!("unknown group accepted"),
            }
        }
    }

    #[test]
    fn test_from_post_prefills_fields() {
        let group_id = Uuid::new_v4();
        let post = Post::new(Uuid::new_v4(), "text", Some(group_id));
        let form = PostForm::from_post(&post);
        assert_eq!(form.text, "text");
        assert_eq!(form.group, group_id.to_string());
        assert!(!form.has_errors());
    }
}
