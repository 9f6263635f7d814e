#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::middleware;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::sessions::Sessions;
use crate::settings::Settings;
use crate::settings::StorageConfig;
use crate::storage::Memory;
use crate::storage::Postgres;
use crate::storage::Storage;

mod api;
mod auth;
mod errors;
mod gatekeeper;
mod graceful_shutdown;
mod notes;
mod pages;
mod password;
mod sessions;
mod settings;
mod storage;
#[cfg(test)]
mod tests;
mod users;

const DEFAULT_RUST_LOG: &str = "jotter=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let app = setup_app(Settings::from_env()).await?;

    let address = settings::address()?;
    let listener = TcpListener::bind(address).await?;
    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Database connection
/// - Database migrations
pub async fn setup_app(settings: Settings) -> Result<Router> {
    let sessions = Sessions::new(settings.session_secret.as_bytes(), settings.secure_cookies);

    let router = match settings.storage {
        StorageConfig::Memory => create_router(Memory::new(), sessions),
        StorageConfig::Postgres(database_url) => {
            create_router(Postgres::connect(&database_url).await?, sessions)
        }
        StorageConfig::ExistingConnection(pool) => {
            create_router(Postgres::with_pool(pool).await?, sessions)
        }
    };

    Ok(router)
}

/// Create the router for Jotter
///
/// The gatekeeper sees every request before the routes do
fn create_router<S: Storage>(storage: S, sessions: Sessions) -> Router {
    Router::new()
        .nest("/api", api::router::<S>())
        .merge(pages::router())
        .fallback(api::not_found)
        .layer(middleware::from_fn(gatekeeper::gatekeeper::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(storage))
        .layer(Extension(sessions))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}
