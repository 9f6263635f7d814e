//! The gatekeeper
//!
//! Every request passes here first. Pages that need a session redirect to the login page
//! without one, the login and signup pages redirect home with one. API routes do their
//! own checks and answer with a `401` instead of a redirect.

use axum::Extension;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::auth::resolve_session;
use crate::sessions::Sessions;
use crate::storage::Storage;

/// Where to go without a session
pub const LOGIN_PAGE: &str = "/login";

/// Where to go with a session
pub const HOME_PAGE: &str = "/";

/// The kinds of paths the gatekeeper knows about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    /// Login and signup pages
    AuthPage,

    /// Anything under `/api/`
    ApiRoute,

    /// Static files
    PublicAsset,

    /// Everything else
    ProtectedPage,
}

impl PathKind {
    /// Classify a request path
    pub fn classify(path: &str) -> Self {
        if path == LOGIN_PAGE || path == "/signup" {
            Self::AuthPage
        } else if path == "/api" || path.starts_with("/api/") {
            Self::ApiRoute
        } else if path.starts_with("/assets/")
            || path.starts_with("/static/")
            || path == "/favicon.ico"
        {
            Self::PublicAsset
        } else {
            Self::ProtectedPage
        }
    }

    /// Does the session matter for this kind of path?
    fn needs_session_check(self) -> bool {
        matches!(self, Self::AuthPage | Self::ProtectedPage)
    }
}

/// Decide what to do with a request, given its kind and whether it has a valid session
///
/// `Some` path to redirect to, or `None` to let it through
pub fn redirect_for(kind: PathKind, has_session: bool) -> Option<&'static str> {
    match (kind, has_session) {
        (PathKind::ProtectedPage, false) => Some(LOGIN_PAGE),
        (PathKind::AuthPage, true) => Some(HOME_PAGE),
        _ => None,
    }
}

/// Middleware function guarding the pages
pub async fn gatekeeper<S: Storage>(
    Extension(sessions): Extension<Sessions>,
    Extension(storage): Extension<S>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let kind = PathKind::classify(request.uri().path());

    if !kind.needs_session_check() {
        return next.run(request).await;
    }

    let token = Sessions::token_from(&jar);
    let has_session = match resolve_session(&storage, &sessions, token).await {
        Ok(user) => user.is_some(),
        Err(err) => {
            // treat as no session, the login page works without storage
            tracing::error!("Could not resolve session in gatekeeper: {err}");
            false
        }
    };

    if let Some(location) = redirect_for(kind, has_session) {
        tracing::debug!(
            "Redirecting {} to {location} (session: {has_session})",
            request.uri().path()
        );

        return Redirect::temporary(location).into_response();
    }

    next.run(request).await
}
