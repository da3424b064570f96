//! Caller identity extractors.

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use std::sync::Arc;

use yatube_core::ports::{AuthError, TokenClaims, TokenService};

use crate::handlers::{login_redirect, requested_path};
use crate::state::AppState;

/// Cookie holding the identity token for browser sessions.
pub const SESSION_COOKIE: &str = "yatube_session";

/// Authenticated caller.
///
/// Pages that require a login take this extractor; anonymous callers are
/// redirected to the login page with `next` pointing back at the request:
/// ```ignore
/// async fn protected_page(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Raised when a page requires a login; renders as a redirect to the login page.
#[derive(Debug)]
pub struct LoginRequired {
    pub reason: AuthError,
    pub login_url: String,
    pub next: String,
}

impl std::fmt::Display for LoginRequired {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "login required for {}: {}", self.next, self.reason)
    }
}

impl actix_web::ResponseError for LoginRequired {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        login_redirect(&self.login_url, &self.next)
    }
}

/// Read and verify the token from the `Authorization` header or the session cookie.
fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let token_service = match req.app_data::<web::Data<Arc<dyn TokenService>>>() {
        Some(service) => service,
        None => {
            tracing::error!("TokenService not found in app data");
            return Err(AuthError::InvalidToken("Server configuration error".to_string()));
        }
    };

    let token = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => {
            let auth_str = value
                .to_str()
                .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;
            auth_str
                .strip_prefix("Bearer ")
                .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?
                .to_string()
        }
        None => req
            .cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or(AuthError::MissingAuth)?,
    };

    token_service.validate_token(&token).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|reason| {
            tracing::debug!(path = %req.path(), %reason, "Anonymous caller on protected page");
            let login_url = req
                .app_data::<web::Data<AppState>>()
                .map(|state| state.login_url.clone())
                .unwrap_or_else(|| crate::config::DEFAULT_LOGIN_URL.to_string());
            LoginRequired {
                reason,
                login_url,
                next: requested_path(req).to_string(),
            }
        }))
    }
}

/// Optional identity extractor - anonymous callers yield `None`.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<uuid::Uuid> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match authenticate(req) {
            Ok(identity) => ready(Ok(OptionalIdentity(Some(identity)))),
            Err(AuthError::MissingAuth) => ready(Ok(OptionalIdentity(None))),
            Err(reason) => {
                tracing::debug!(%reason, "Ignoring unusable identity token");
                ready(Ok(OptionalIdentity(None)))
            }
        }
    }
}
