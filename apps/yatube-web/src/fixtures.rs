//! Seed data for in-memory storage.
//!
//! The fixtures file is JSON; posts refer to their author by username and to
//! their group by slug:
//!
//! ```json
//! {
//!   "users": [{ "username": "leo" }],
//!   "groups": [{ "title": "Cats", "slug": "cats", "description": "All about cats" }],
//!   "posts": [{ "author": "leo", "text": "Hello", "group": "cats" }]
//! }
//! ```

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use yatube_core::domain::{Group, Post, User};

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub users: Vec<UserFixture>,
    pub groups: Vec<GroupFixture>,
    pub posts: Vec<PostFixture>,
}

#[derive(Debug, Deserialize)]
pub struct UserFixture {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct GroupFixture {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct PostFixture {
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub pub_date: Option<DateTime<Utc>>,
}

/// Counts of inserted records.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Loaded {
    pub users: usize,
    pub groups: usize,
    pub posts: usize,
}

/// Read and parse a fixtures file.
pub fn load(path: &Path) -> anyhow::Result<Fixtures> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading fixtures from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing fixtures in {}", path.display()))
}

/// Insert fixtures through the repositories, users and groups first.
pub async fn apply(state: &AppState, fixtures: Fixtures) -> anyhow::Result<Loaded> {
    let mut loaded = Loaded::default();

    let mut authors: HashMap<String, Uuid> = HashMap::new();
    for fixture in fixtures.users {
        let user = state
            .users
            .insert(User::new(fixture.username.clone()))
            .await
            .with_context(|| format!("inserting user {}", fixture.username))?;
        authors.insert(user.username, user.id);
        loaded.users += 1;
    }

    let mut groups: HashMap<String, Uuid> = HashMap::new();
    for fixture in fixtures.groups {
        let group = state
            .groups
            .insert(Group::new(fixture.title, fixture.slug.clone(), fixture.description))
            .await
            .with_context(|| format!("inserting group {}", fixture.slug))?;
        groups.insert(group.slug, group.id);
        loaded.groups += 1;
    }

    for fixture in fixtures.posts {
        let Some(&author_id) = authors.get(&fixture.author) else {
            bail!("post refers to unknown author {}", fixture.author);
        };
        let group_id = match fixture.group {
            Some(slug) => match groups.get(&slug) {
                Some(&id) => Some(id),
                None => bail!("post refers to unknown group {slug}"),
            },
            None => None,
        };

        let mut post = Post::new(author_id, fixture.text, group_id);
        if let Some(image) = fixture.image {
            post = post.with_image(image);
        }
        if let Some(pub_date) = fixture.pub_date {
            post.pub_date = pub_date;
        }
        state.posts.insert(post).await.context("inserting post")?;
        loaded.posts += 1;
    }

    tracing::info!(
        users = loaded.users,
        groups = loaded.groups,
        posts = loaded.posts,
        "Fixtures loaded"
    );
    Ok(loaded)
}
