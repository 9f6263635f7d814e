//! Session tokens
//!
//! A session is a signed JWT carried in the session cookie. The token holds the user ID
//! and the session ID of that user at the time of issuing; rotating the session ID of
//! the user revokes every token issued before.

use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;
use chrono::Utc;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::users::User;

/// Name of the cookie holding the session token
pub const SESSION_COOKIE: &str = "session";

/// How long a session lasts, one week
const SESSION_LIFETIME_SECONDS: i64 = 60 * 60 * 24 * 7;

/// Keys and cookie settings for sessions
#[derive(Clone)]
pub struct Sessions {
    /// The encoding key
    encoding: EncodingKey,

    /// The decoding key
    decoding: DecodingKey,

    /// Only send the cookie over HTTPS
    secure_cookies: bool,
}

/// The JWT claims to identify a user
#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    /// The user ID
    pub sub: Uuid,

    /// Issued at, as UNIX timestamp
    pub iat: i64,

    /// Expires at, as UNIX timestamp
    pub exp: i64,

    /// The session ID of the user when the token was issued
    pub jti: Uuid,
}

/// An issued session token
#[derive(Debug)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Sessions {
    /// Create new encoding/decoding keys, derived from a secret
    pub fn new(secret: &[u8], secure_cookies: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            secure_cookies,
        }
    }

    /// Issue a token for the current session of the user
    pub fn issue(&self, user: &User) -> Result<SessionToken, ServiceError> {
        use jsonwebtoken::Header;
        use jsonwebtoken::encode;

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            iat: now,
            exp: now + SESSION_LIFETIME_SECONDS,
            jti: user.session_id,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map(SessionToken)
            .map_err(|err| ServiceError::Internal(format!("Could not sign session: {err}")))
    }

    /// Verify signature and expiration of a token
    ///
    /// Says nothing about the user still existing or the session being revoked
    pub fn verify(&self, token: &str) -> Option<Claims> {
        use jsonwebtoken::Validation;
        use jsonwebtoken::decode;

        match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(token_data) => Some(token_data.claims),
            Err(err) => {
                tracing::debug!("Rejected session token: {err}");
                None
            }
        }
    }

    /// The session token sent along with the request, if any
    pub fn token_from(jar: &CookieJar) -> Option<&str> {
        jar.get(SESSION_COOKIE)
            .map(Cookie::value)
            .filter(|token| !token.is_empty())
    }

    /// The cookie to hand a session token to the client
    pub fn cookie(&self, token: &SessionToken) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.as_str().to_string()))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Strict)
            .max_age(time::Duration::seconds(SESSION_LIFETIME_SECONDS))
            .build()
    }

    /// The cookie to make the client forget its session
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Strict)
            .build()
    }
}
