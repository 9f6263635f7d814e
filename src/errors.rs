//! Errors of the auth and notes services

use thiserror::Error;

use crate::storage;

/// Everything that can go wrong in a service call
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// The email address is already registered
    #[error("Email already exists")]
    Conflict,

    /// Unknown email or wrong password, deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No valid session
    #[error("Not authenticated")]
    Unauthenticated,

    /// Valid session, but not the owner
    #[error("Not authorized")]
    Forbidden,

    /// The thing does not exist (anymore)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Anything unexpected, never shown to the client
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<storage::Error> for ServiceError {
    fn from(err: storage::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
