//! Page routes
//!
//! The actual pages are rendered by the frontend, these are the bare documents it mounts
//! on. They only exist behind the gatekeeper.

use axum::Router;
use axum::response::Html;
use axum::routing::get;

/// Get the router for all pages
pub fn router() -> Router {
    Router::new()
        .route("/", get(|| shell("Notes")))
        .route("/login", get(|| shell("Login")))
        .route("/signup", get(|| shell("Sign up")))
        .route("/note/add", get(|| shell("Add note")))
        .route("/note/update/{note}", get(|| shell("Update note")))
        .route("/note/view/{note}", get(|| shell("View note")))
}

/// An empty document with a title
async fn shell(title: &'static str) -> Html<String> {
    Html(format!(
        r#"<!doctype html><html lang="en"><head><meta charset="utf-8"><title>{title}</title></head><body><div id="app"></div></body></html>"#
    ))
}
