//! In-memory repositories - used when no database is configured and in tests.
//!
//! All three repositories share one [`InMemoryDatabase`], so the referential
//! rules of the schema (author cascade, group set-null, unique slugs and
//! usernames) are applied here explicitly.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{Group, Post, User, Validate};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    BaseRepository, GroupRepository, PostFilter, PostRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    /// Insertion order, used to break `pub_date` ties.
    posts: Vec<Post>,
}

/// Shared storage behind the in-memory repositories.
///
/// Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// In-memory repository for entity `T`.
pub struct InMemoryRepository<T> {
    db: Arc<InMemoryDatabase>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> InMemoryRepository<T> {
    pub fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

pub type InMemoryUserRepository = InMemoryRepository<User>;
pub type InMemoryGroupRepository = InMemoryRepository<Group>;
pub type InMemoryPostRepository = InMemoryRepository<Post>;

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.db.tables.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        user.validate()?;

        let mut tables = self.db.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(RepoError::Constraint(format!("user {} already exists", user.id)));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(format!(
                "username {:?} is taken",
                user.username
            )));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        // Posts are owned by their author.
        let before = tables.posts.len();
        tables.posts.retain(|post| post.author_id != id);
        tracing::debug!(
            user_id = %id,
            removed_posts = before - tables.posts.len(),
            "Deleted user"
        );

        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        Ok(self.db.tables.read().await.groups.get(&id).cloned())
    }

    async fn insert(&self, group: Group) -> Result<Group, RepoError> {
        group.validate()?;

        let mut tables = self.db.tables.write().await;
        if tables.groups.contains_key(&group.id) {
            return Err(RepoError::Constraint(format!("group {} already exists", group.id)));
        }
        if tables.groups.values().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint(format!(
                "slug {:?} is taken",
                group.slug
            )));
        }

        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;
        if tables.groups.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        // Posts outlive their group.
        for post in tables.posts.iter_mut().filter(|p| p.group_id == Some(id)) {
            post.group_id = None;
        }

        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn all(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.db.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

impl Tables {
    fn check_references(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "author {} does not exist",
                post.author_id
            )));
        }
        if let Some(group_id) = post.group_id {
            if !self.groups.contains_key(&group_id) {
                return Err(RepoError::Constraint(format!(
                    "group {group_id} does not exist"
                )));
            }
        }
        Ok(())
    }

    /// Posts matching `filter`, newest first; later insertions win ties.
    fn ordered(&self, filter: PostFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .rev()
            .filter(|post| filter.matches(post))
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        posts
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.posts.iter().find(|post| post.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        post.validate()?;

        let mut tables = self.db.tables.write().await;
        if tables.posts.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint(format!("post {} already exists", post.id)));
        }
        tables.check_references(&post)?;

        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|post| post.id != id);

        if tables.posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        post.validate()?;

        let mut tables = self.db.tables.write().await;
        tables.check_references(&post)?;

        let stored = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;

        stored.text = post.text;
        stored.group_id = post.group_id;
        stored.image = post.image;

        Ok(stored.clone())
    }

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .ordered(filter)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.posts.iter().filter(|post| filter.matches(post)).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    struct Fixture {
        users: InMemoryUserRepository,
        groups: InMemoryGroupRepository,
        posts: InMemoryPostRepository,
    }

    fn fixture() -> Fixture {
        let db = InMemoryDatabase::new();
        Fixture {
            users: InMemoryRepository::new(db.clone()),
            groups: InMemoryRepository::new(db.clone()),
            posts: InMemoryRepository::new(db),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let f = fixture();
        let author = f.users.insert(User::new("author")).await.unwrap();

        let mut old = Post::new(author.id, "old", None);
        old.pub_date = Utc::now() - Duration::days(1);
        f.posts.insert(old).await.unwrap();
        f.posts.insert(Post::new(author.id, "new", None)).await.unwrap();

        let listed = f.posts.list(PostFilter::All, 0, 10).await.unwrap();
        let texts: Vec<&str> = listed.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_filters_and_windows() {
        let f = fixture();
        let author = f.users.insert(User::new("author")).await.unwrap();
        let other = f.users.insert(User::new("other")).await.unwrap();
        let group = f.groups.insert(Group::new("Cats", "cats", "")).await.unwrap();

        for n in 0..13 {
            f.posts
                .insert(Post::new(author.id, format!("text {n}"), Some(group.id)))
                .await
                .unwrap();
        }
        f.posts.insert(Post::new(other.id, "elsewhere", None)).await.unwrap();

        assert_eq!(f.posts.count(PostFilter::All).await.unwrap(), 14);
        assert_eq!(f.posts.count(PostFilter::Group(group.id)).await.unwrap(), 13);
        assert_eq!(f.posts.count(PostFilter::Author(other.id)).await.unwrap(), 1);

        let second = f.posts.list(PostFilter::Group(group.id), 10, 10).await.unwrap();
        assert_eq!(second.len(), 3);
    }

    #[tokio::test]
    async fn test_deleting_author_deletes_posts() {
        let f = fixture();
        let author = f.users.insert(User::new("author")).await.unwrap();
        let keeper = f.users.insert(User::new("keeper")).await.unwrap();
        f.posts.insert(Post::new(author.id, "gone", None)).await.unwrap();
        let kept = f.posts.insert(Post::new(keeper.id, "kept", None)).await.unwrap();

        f.users.delete(author.id).await.unwrap();

        assert_eq!(f.posts.count(PostFilter::All).await.unwrap(), 1);
        assert!(f.posts.find_by_id(kept.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deleting_group_clears_post_group() {
        let f = fixture();
        let author = f.users.insert(User::new("author")).await.unwrap();
        let group = f.groups.insert(Group::new("Cats", "cats", "")).await.unwrap();
        let post = f
            .posts
            .insert(Post::new(author.id, "text", Some(group.id)))
            .await
            .unwrap();

        f.groups.delete(group.id).await.unwrap();

        let stored = f.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.group_id, None);
    }

    #[tokio::test]
    async fn test_unique_slug_and_username() {
        let f = fixture();
        f.groups.insert(Group::new("One", "same", "")).await.unwrap();
        let dup = f.groups.insert(Group::new("Two", "same", "")).await;
        assert!(matches!(dup, Err(RepoError::Constraint(_))));

        f.users.insert(User::new("name")).await.unwrap();
        let dup = f.users.insert(User::new("name")).await;
        assert!(matches!(dup, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_insert_checks_references_and_fields() {
        let f = fixture();
        let orphan = f.posts.insert(Post::new(Uuid::new_v4(), "text", None)).await;
        assert!(matches!(orphan, Err(RepoError::Constraint(_))));

        let author = f.users.insert(User::new("author")).await.unwrap();
        let blank = f.posts.insert(Post::new(author.id, "", None)).await;
        assert!(matches!(blank, Err(RepoError::Constraint(_))));

        let unknown_group = f
            .posts
            .insert(Post::new(author.id, "text", Some(Uuid::new_v4())))
            .await;
        assert!(matches!(unknown_group, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_author_and_pub_date() {
        let f = fixture();
        let author = f.users.insert(User::new("author")).await.unwrap();
        let post = f.posts.insert(Post::new(author.id, "before", None)).await.unwrap();

        let mut forged = post.clone();
        forged.text = "after".to_string();
        forged.author_id = Uuid::new_v4();
        forged.pub_date = Utc::now() + Duration::days(3);

        // A forged author id must not pass the reference check either.
        assert!(f.posts.update(forged.clone()).await.is_err());

        forged.author_id = author.id;
        let updated = f.posts.update(forged).await.unwrap();
        assert_eq!(updated.id, post.id);
        assert_eq!(updated.text, "after");
        assert_eq!(updated.pub_date, post.pub_date);
    }
}
