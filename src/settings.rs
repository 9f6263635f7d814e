//! Settings from the environment

use std::env::var;
use std::net::SocketAddr;

use anyhow::Result;
use sqlx::PgPool;

use crate::password::generate;

const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";

/// Where to store users and notes
pub enum StorageConfig {
    /// Keep everything in memory, gone on shutdown
    Memory,

    /// Connect to Postgres with a connection string
    Postgres(String),

    /// Use an existing Postgres connection pool
    ExistingConnection(PgPool),
}

/// All settings of Jotter
pub struct Settings {
    /// Storage to use
    pub storage: StorageConfig,

    /// Secret to sign session tokens with
    pub session_secret: String,

    /// Only send session cookies over HTTPS
    pub secure_cookies: bool,
}

impl Settings {
    /// Detect the settings from the environment
    ///
    /// - `DATABASE_URL`: Postgres connection string, memory storage when not set
    /// - `SESSION_SECRET`: generated when not set, sessions will not survive a restart
    /// - `APP_ENV`: `production` turns on secure cookies
    pub fn from_env() -> Self {
        let storage = match non_empty_env_var("DATABASE_URL") {
            Some(database_url) => StorageConfig::Postgres(database_url),
            None => {
                tracing::warn!("`DATABASE_URL` is not set, using memory storage");
                StorageConfig::Memory
            }
        };

        let session_secret = env_var_or_else("SESSION_SECRET", || {
            let session_secret = generate();
            tracing::info!(
                "`SESSION_SECRET` is not set, generating temporary one: {session_secret}"
            );
            session_secret
        });

        let secure_cookies = non_empty_env_var("APP_ENV").is_some_and(|env| env == "production");

        Self {
            storage,
            session_secret,
            secure_cookies,
        }
    }
}

/// Get the address to listen on
///
/// `ADDRESS` for the full address, `PORT` to override just the port
pub fn address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    if let Some(port) = non_empty_env_var("PORT") {
        address.set_port(port.parse::<u16>()?);
    }

    Ok(address)
}

/// Get the value of ENV var, only when it is set and not empty
fn non_empty_env_var(var_name: &'static str) -> Option<String> {
    var(var_name).ok().filter(|value| !value.is_empty())
}

/// Get the value of ENV var, or a default
///
/// Only when:
/// - It is set
/// - It is not empty
fn env_var_or_else(var_name: &'static str, or_else: fn() -> String) -> String {
    non_empty_env_var(var_name).unwrap_or_else(or_else)
}
