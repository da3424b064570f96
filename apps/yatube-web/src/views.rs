//! HTML views rendered with askama.
//!
//! Each page handler fills one of the template structs below; field names
//! match the variables the templates read (`page_obj`, `group`, `author`,
//! `post_count`, `post`, `form`, ...).

use actix_web::{HttpResponse, http::StatusCode, http::header::ContentType};
use askama::Template;
use uuid::Uuid;

use yatube_core::domain::{Group, Post, User, truncate_chars};
use yatube_core::forms::PostForm;
use yatube_core::pagination::Page;

use crate::middleware::error::AppResult;

/// Length of the post text projection used as the detail page title.
pub const POST_TITLE_LEN: usize = 30;

const DATE_FORMAT: &str = "%d %B %Y";
const DATETIME_FORMAT: &str = "%d %B %Y %H:%M";

/// Render a template into a `200 OK` HTML response.
pub fn render<T: Template>(template: &T) -> AppResult<HttpResponse> {
    let html = template.render()?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html))
}

#[derive(Debug, Clone)]
pub struct GroupLink {
    pub title: String,
    pub slug: String,
}

impl From<&Group> for GroupLink {
    fn from(group: &Group) -> Self {
        Self {
            title: group.title.clone(),
            slug: group.slug.clone(),
        }
    }
}

/// A post as shown in listings, with its author and group resolved.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: Uuid,
    pub text: String,
    pub pub_date: String,
    pub author: String,
    pub group: Option<GroupLink>,
    pub image: Option<String>,
}

impl PostCard {
    pub fn new(post: Post, author: &str, group: Option<&Group>) -> Self {
        Self {
            id: post.id,
            pub_date: post.pub_date.format(DATE_FORMAT).to_string(),
            text: post.text,
            author: author.to_string(),
            group: group.map(GroupLink::from),
            image: post.image,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub page_obj: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub group: Group,
    pub page_obj: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub author: User,
    pub post_count: u64,
    pub page_obj: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub post: PostCard,
    pub post_title: String,
    pub pub_date: String,
    pub group: Option<GroupLink>,
    pub author: User,
    pub post_count: u64,
    pub can_edit: bool,
}

impl PostDetailTemplate {
    pub fn new(post: Post, author: User, group: Option<&Group>, post_count: u64, can_edit: bool) -> Self {
        let post_title = truncate_chars(&post.text, POST_TITLE_LEN).to_string();
        let pub_date = post.pub_date.format(DATETIME_FORMAT).to_string();
        Self {
            post: PostCard::new(post, &author.username, group),
            post_title,
            pub_date,
            group: group.map(GroupLink::from),
            author,
            post_count,
            can_edit,
        }
    }
}

/// One `<option>` of the group select.
#[derive(Debug, Clone)]
pub struct GroupChoice {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

impl GroupChoice {
    pub fn options(groups: &[Group], selected: &str) -> Vec<Self> {
        groups
            .iter()
            .map(|group| {
                let id = group.id.to_string();
                Self {
                    selected: id == selected.trim(),
                    id,
                    title: group.title.clone(),
                }
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormTemplate {
    pub form: PostForm,
    pub groups: Vec<GroupChoice>,
    pub is_edit: bool,
    /// Set when editing: the post the form submits to.
    pub post_id: Option<Uuid>,
}

impl PostFormTemplate {
    pub fn action(&self) -> String {
        match self.post_id {
            Some(id) => format!("/posts/{id}/edit/"),
            None => "/create/".to_string(),
        }
    }
}

/// Content of an error page; 404s use `core/404.html`, everything else `core/error.html`.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: u16,
    pub title: String,
    pub detail: Option<String>,
}

#[derive(Template)]
#[template(path = "core/404.html")]
struct NotFoundTemplate<'a> {
    page: &'a ErrorPage,
}

#[derive(Template)]
#[template(path = "core/error.html")]
struct ErrorTemplate<'a> {
    page: &'a ErrorPage,
}

impl ErrorPage {
    pub fn not_found() -> Self {
        Self {
            status: 404,
            title: "Page not found".to_string(),
            detail: None,
        }
    }

    pub fn bad_request(detail: String) -> Self {
        Self {
            status: 400,
            title: "Bad request".to_string(),
            detail: Some(detail),
        }
    }

    pub fn internal_error() -> Self {
        Self {
            status: 500,
            title: "Server error".to_string(),
            detail: None,
        }
    }

    pub fn into_response(self, status: StatusCode) -> HttpResponse {
        let rendered = if status == StatusCode::NOT_FOUND {
            NotFoundTemplate { page: &self }.render()
        } else {
            ErrorTemplate { page: &self }.render()
        };

        match rendered {
            Ok(html) => HttpResponse::build(status)
                .content_type(ContentType::html())
                .body(html),
            Err(err) => {
                tracing::error!(%err, "Error page rendering failed");
                HttpResponse::build(status)
                    .content_type(ContentType::plaintext())
                    .body(self.title)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_title_is_thirty_characters() {
        let author = User::new("leo");
        let post = Post::new(author.id, "a".repeat(40), None);

        let view = PostDetailTemplate::new(post, author, None, 1, false);

        assert_eq!(view.post_title.chars().count(), POST_TITLE_LEN);
    }

    #[test]
    fn test_group_choices_mark_selection() {
        let cats = Group::new("Cats", "cats", "");
        let dogs = Group::new("Dogs", "dogs", "");
        let options = GroupChoice::options(&[cats.clone(), dogs], &cats.id.to_string());

        assert_eq!(options.len(), 2);
        assert!(options[0].selected);
        assert!(!options[1].selected);
    }

    #[test]
    fn test_post_text_is_escaped() {
        let author = User::new("leo");
        let post = Post::new(author.id, "<script>alert(1)</script>", None);
        let html = PostDetailTemplate::new(post, author, None, 1, false)
            .render()
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&#60;script&#62;alert(1)&#60;/script&#62;"));
    }
}
