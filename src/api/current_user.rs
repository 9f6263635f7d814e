//! Current user service
//!
//! Get the current user from the request based on the session cookie

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use crate::api::Error;
use crate::auth::resolve_session;
use crate::errors::ServiceError;
use crate::sessions::Sessions;
use crate::storage::Storage;
use crate::users::User;

/// Current user service
///
/// Extracting it fails with `401 Not authenticated` without a valid session, before any
/// handler logic runs
pub struct CurrentUser<S: Storage> {
    /// The actual user
    user: Arc<User>,

    /// The storage the user was found in
    storage: PhantomData<fn() -> S>,
}

impl<S: Storage> CurrentUser<S> {
    /// Create the current user from a user
    fn new(user: User) -> Self {
        Self {
            user: Arc::new(user),
            storage: PhantomData,
        }
    }
}

impl<S: Storage> Clone for CurrentUser<S> {
    fn clone(&self) -> Self {
        Self {
            user: Arc::clone(&self.user),
            storage: PhantomData,
        }
    }
}

impl<S: Storage> Deref for CurrentUser<S> {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl<B, S> FromRequestParts<B> for CurrentUser<S>
where
    B: Send + Sync,
    S: Storage,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &B) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let Extension(sessions) = parts
            .extract::<Extension<Sessions>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get session keys"))?;

        let Extension(storage) = parts
            .extract::<Extension<S>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get the storage"))?;

        let user = resolve_session(&storage, &sessions, Sessions::token_from(&jar)).await?;

        user.map(CurrentUser::new)
            .ok_or_else(|| ServiceError::Unauthenticated.into())
    }
}
