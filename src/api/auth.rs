//! Authentication API: signup, login, current session and logout

use axum::Extension;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::auth;
use crate::auth::Registration;
use crate::sessions::Sessions;
use crate::storage::Storage;
use crate::users::User;

use super::Acknowledgement;
use super::Error;
use super::Form;
use super::Success;

/// The user response information
///
/// A subset of all the information, ready to be serialized for the outside world. The
/// password hash and session ID never leave the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// The user ID
    pub id: Uuid,

    /// The email address
    pub email: String,

    /// The display name
    pub name: String,
}

impl UserResponse {
    /// Create a user response from a [`User`](User)
    fn from_user(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Wrapper around the user, `null` when there is none
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    user: Option<UserResponse>,
}

impl UserEnvelope {
    fn new(user: Option<User>) -> Self {
        Self {
            user: user.map(UserResponse::from_user),
        }
    }
}

/// Login or signup form
///
/// All fields are optional at this level, missing fields are reported by the validation
/// of the auth service with a readable message
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthForm {
    /// Email address of the user
    email: Option<String>,

    /// Password of the user
    password: Option<String>,

    /// Display name, required for signup
    name: Option<String>,

    /// `login` or `signup`
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Signup or login, both start a session
///
/// Request signup:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "a@x.com", "password": "secret1", "name": "A", "type": "signup" }' \
///     http://localhost:6000/api/auth
/// ```
///
/// Request login:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "a@x.com", "password": "secret1", "type": "login" }' \
///     http://localhost:6000/api/auth
/// ```
///
/// Response, with a `Set-Cookie` header for the session:
/// ```json
/// { "user": { "id": "<uuid>", "email": "a@x.com", "name": "A" } }
/// ```
pub async fn authenticate<S: Storage>(
    Extension(sessions): Extension<Sessions>,
    Extension(storage): Extension<S>,
    jar: CookieJar,
    Form(form): Form<AuthForm>,
) -> Result<(CookieJar, Success<UserEnvelope>), Error> {
    let email = form.email.as_deref().unwrap_or_default();
    let password = form.password.as_deref().unwrap_or_default();

    let (user, token) = match form.kind.as_deref() {
        Some("signup") => {
            let registration = Registration {
                email,
                password,
                name: form.name.as_deref(),
            };

            auth::register(&storage, &sessions, &registration).await?
        }
        Some("login") => auth::authenticate(&storage, &sessions, email, password).await?,
        _ => return Err(Error::bad_request("Invalid request type")),
    };

    let jar = jar.add(sessions.cookie(&token));

    Ok((jar, Success::ok(UserEnvelope::new(Some(user)))))
}

/// Get the user of the current session, if any
///
/// Request:
/// ```sh
/// curl -v -b 'session=tokentokentoken' http://localhost:6000/api/auth/me
/// ```
///
/// Response:
/// ```json
/// { "user": null }
/// ```
pub async fn me<S: Storage>(
    Extension(sessions): Extension<Sessions>,
    Extension(storage): Extension<S>,
    jar: CookieJar,
) -> Success<UserEnvelope> {
    let user = auth::resolve_session(&storage, &sessions, Sessions::token_from(&jar))
        .await
        .unwrap_or_else(|err| {
            tracing::error!("Could not resolve session: {err}");
            None
        });

    Success::ok(UserEnvelope::new(user))
}

/// End the current session
///
/// The session can not be used again, even when the client holds on to the cookie
///
/// Request:
/// ```sh
/// curl -v -XPOST -b 'session=tokentokentoken' http://localhost:6000/api/auth/logout
/// ```
///
/// Response:
/// ```json
/// { "success": true }
/// ```
pub async fn logout<S: Storage>(
    Extension(sessions): Extension<Sessions>,
    Extension(storage): Extension<S>,
    jar: CookieJar,
) -> (CookieJar, Success<Acknowledgement>) {
    auth::end_session(&storage, &sessions, Sessions::token_from(&jar)).await;

    let jar = jar.remove(sessions.removal_cookie());

    (jar, Success::ok(Acknowledgement::new()))
}
