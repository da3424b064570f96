//! HTTP handlers and route configuration.

mod editor;
mod health;
mod posts;

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use std::sync::Arc;
use url::form_urlencoded;
use uuid::Uuid;

use yatube_core::ports::TokenService;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Register shared data, extractor configuration and all application routes.
pub fn configure_app(
    state: AppState,
    tokens: Arc<dyn TokenService>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(state))
            .app_data(web::Data::new(tokens))
            .app_data(
                web::PathConfig::default()
                    .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
            )
            .app_data(
                web::FormConfig::default()
                    .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
            );
        configure_routes(cfg);
    }
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(editor::edit_form))
                .route(web::post().to(editor::edit_submit)),
        )
        .service(
            web::resource("/create/")
                .route(web::get().to(editor::create_form))
                .route(web::post().to(editor::create_submit)),
        )
        .route("/health/", web::get().to(health::health_check))
        .default_service(web::to(not_found));
}

async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(req.path().to_string()))
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

pub fn post_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

/// `302 Found` to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Path plus query string of the request, used as the `next` target after login.
pub fn requested_path(req: &HttpRequest) -> &str {
    req.uri()
        .path_and_query()
        .map(|target| target.as_str())
        .unwrap_or_else(|| req.path())
}

/// Redirect to the login page, asking it to send the caller back to `next`.
///
/// `next` is percent-encoded as a query value; slashes stay readable.
pub fn login_redirect(login_url: &str, next: &str) -> HttpResponse {
    let next: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
    redirect(&format!("{login_url}?next={}", next.replace("%2F", "/")))
}
