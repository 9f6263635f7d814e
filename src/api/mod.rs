//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::post;

pub use current_user::CurrentUser;
pub use request::Form;
pub use request::PathParameters;
pub use request::parse_note_id;
pub use response::Acknowledgement;
pub use response::Error;
pub use response::Success;

use crate::storage::Storage;

mod auth;
mod current_user;
mod notes;
mod request;
mod response;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    Router::new()
        .route("/auth", post(auth::authenticate::<S>))
        .route("/auth/me", get(auth::me::<S>))
        .route("/auth/logout", post(auth::logout::<S>))
        .route("/notes", get(notes::list::<S>).post(notes::create::<S>))
        .route(
            "/notes/{note}",
            get(notes::single::<S>)
                .patch(notes::update::<S>)
                .delete(notes::delete::<S>),
        )
}

/// Fallback for everything without a route
pub async fn not_found() -> Error {
    Error::not_found("Not found")
}
