//! Read-only post pages: the feed, group and profile listings, post detail.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use yatube_core::DomainError;
use yatube_core::domain::{Group, Post};
use yatube_core::pagination::{Page, parse_page_number};
use yatube_core::ports::PostFilter;

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{
    GroupListTemplate, IndexTemplate, PostCard, PostDetailTemplate, ProfileTemplate, render,
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    fn number(&self) -> i64 {
        parse_page_number(self.page.as_deref())
    }
}

/// Load one page of posts matching `filter`, newest first.
async fn post_page(
    state: &AppState,
    filter: PostFilter,
    requested: i64,
) -> AppResult<Page<PostCard>> {
    let total = state.posts.count(filter).await?;
    let window = state.paginator.window(total, requested);
    let posts = state
        .posts
        .list(filter, window.offset, window.limit)
        .await?;
    let cards = post_cards(state, posts).await?;
    Ok(Page::new(window, cards))
}

/// Resolve author names and groups for a batch of posts.
async fn post_cards(state: &AppState, posts: Vec<Post>) -> AppResult<Vec<PostCard>> {
    let groups: HashMap<Uuid, Group> = if posts.iter().any(|p| p.group_id.is_some()) {
        state
            .groups
            .all()
            .await?
            .into_iter()
            .map(|group| (group.id, group))
            .collect()
    } else {
        HashMap::new()
    };

    let mut authors: HashMap<Uuid, String> = HashMap::new();
    let mut cards = Vec::with_capacity(posts.len());
    for post in posts {
        if !authors.contains_key(&post.author_id) {
            let username = state
                .users
                .find_by_id(post.author_id)
                .await?
                .map(|user| user.username)
                .unwrap_or_default();
            authors.insert(post.author_id, username);
        }
        let author = authors.get(&post.author_id).cloned().unwrap_or_default();
        let group = post.group_id.and_then(|id| groups.get(&id));
        cards.push(PostCard::new(post, &author, group));
    }

    Ok(cards)
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page_obj = post_page(&state, PostFilter::All, query.number()).await?;
    render(&IndexTemplate { page_obj })
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("Group", &slug))?;

    let page_obj = post_page(&state, PostFilter::Group(group.id), query.number()).await?;
    render(&GroupListTemplate { group, page_obj })
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", &username))?;

    let page_obj = post_page(&state, PostFilter::Author(author.id), query.number()).await?;
    render(&ProfileTemplate {
        post_count: page_obj.total,
        author,
        page_obj,
    })
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", &post_id))?;

    let author = state
        .users
        .find_by_id(post.author_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Post {post_id} has no author")))?;

    let group = match post.group_id {
        Some(group_id) => state.groups.find_by_id(group_id).await?,
        None => None,
    };

    let post_count = state.posts.count(PostFilter::Author(author.id)).await?;
    let can_edit = identity.user_id() == Some(post.author_id);

    render(&PostDetailTemplate::new(
        post,
        author,
        group.as_ref(),
        post_count,
        can_edit,
    ))
}
