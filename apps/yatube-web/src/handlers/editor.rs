//! Post creation and editing.

use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use yatube_core::DomainError;
use yatube_core::domain::{Post, User};
use yatube_core::forms::{FormOutcome, PostForm, PostFormData};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views::{GroupChoice, PostFormTemplate, render};

use super::{login_redirect, post_url, profile_url, redirect, requested_path};

async fn form_page(
    state: &AppState,
    form: PostForm,
    post_id: Option<Uuid>,
) -> AppResult<HttpResponse> {
    let groups = state.groups.all().await?;
    render(&PostFormTemplate {
        groups: GroupChoice::options(&groups, &form.group),
        form,
        is_edit: post_id.is_some(),
        post_id,
    })
}

/// Resolve the caller to a stored user. A token for a deleted user yields `None`.
async fn current_user(state: &AppState, identity: &Identity) -> AppResult<Option<User>> {
    let user = state.users.find_by_id(identity.user_id).await?;
    if user.is_none() {
        tracing::warn!(user_id = %identity.user_id, "Identity refers to an unknown user");
    }
    Ok(user)
}

/// Load a post for editing; `Err(redirect)` when the caller is not its author.
async fn editable_post(
    state: &AppState,
    post_id: Uuid,
    identity: &OptionalIdentity,
) -> AppResult<Result<Post, HttpResponse>> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", &post_id))?;

    match identity.user_id() {
        Some(user_id) if post.is_authored_by(user_id) => Ok(Ok(post)),
        caller => {
            tracing::debug!(%post_id, caller = ?caller, "Edit refused for non-author");
            Ok(Err(redirect(&post_url(post_id))))
        }
    }
}

/// GET /create/
pub async fn create_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    if current_user(&state, &identity).await?.is_none() {
        return Ok(login_redirect(&state.login_url, requested_path(&req)));
    }

    form_page(&state, PostForm::empty(), None).await
}

/// Unwrap a submitted form once the caller has been let through.
fn submitted(
    body: Result<web::Form<PostFormData>, actix_web::Error>,
) -> Result<PostFormData, HttpResponse> {
    body.map(web::Form::into_inner)
        .map_err(|err| err.error_response())
}

/// POST /create/
pub async fn create_submit(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: Identity,
    body: Result<web::Form<PostFormData>, actix_web::Error>,
) -> AppResult<HttpResponse> {
    let Some(author) = current_user(&state, &identity).await? else {
        return Ok(login_redirect(&state.login_url, requested_path(&req)));
    };
    let data = match submitted(body) {
        Ok(data) => data,
        Err(response) => return Ok(response),
    };

    match PostForm::bind(data)
        .validate(state.groups.as_ref())
        .await?
    {
        FormOutcome::Valid(cleaned) => {
            let post = Post::new(author.id, cleaned.text, cleaned.group_id);
            let post = state.posts.insert(post).await?;
            tracing::info!(post_id = %post.id, author = %author.username, "Post created");
            Ok(redirect(&profile_url(&author.username)))
        }
        FormOutcome::Invalid(form) => form_page(&state, form, None).await,
    }
}

/// GET /posts/{post_id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = match editable_post(&state, post_id, &identity).await? {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };

    form_page(&state, PostForm::from_post(&post), Some(post.id)).await
}

/// POST /posts/{post_id}/edit/
pub async fn edit_submit(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
    body: Result<web::Form<PostFormData>, actix_web::Error>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let mut post = match editable_post(&state, post_id, &identity).await? {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };
    let data = match submitted(body) {
        Ok(data) => data,
        Err(response) => return Ok(response),
    };

    match PostForm::bind(data)
        .validate(state.groups.as_ref())
        .await?
    {
        FormOutcome::Valid(cleaned) => {
            post.edit(cleaned.text, cleaned.group_id);
            let post = state.posts.update(post).await?;
            tracing::info!(post_id = %post.id, "Post updated");
            Ok(redirect(&post_url(post.id)))
        }
        FormOutcome::Invalid(form) => form_page(&state, form, Some(post_id)).await,
    }
}
