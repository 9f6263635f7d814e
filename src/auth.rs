//! Registration, login and the lifecycle of sessions

use std::sync::LazyLock;

use uuid::Uuid;

use crate::errors::ServiceError;
use crate::password;
use crate::sessions::SessionToken;
use crate::sessions::Sessions;
use crate::storage;
use crate::storage::CreateUserValues;
use crate::storage::Storage;
use crate::users::User;
use crate::users::validate_email;
use crate::users::validate_name;
use crate::users::validate_password;

/// Hash to check passwords of unknown emails against
///
/// Login with an unknown email takes as long as login with a wrong password
static UNKNOWN_USER_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    password::hash(&password::generate())
        .map_err(|err| tracing::error!("Could not hash the unknown user password: {err}"))
        .ok()
});

/// Everything needed to register a new user
pub struct Registration<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: Option<&'a str>,
}

/// Register a new user and start a session for it
pub async fn register<S: Storage>(
    storage: &S,
    sessions: &Sessions,
    registration: &Registration<'_>,
) -> Result<(User, SessionToken), ServiceError> {
    validate_email(registration.email)?;
    validate_password(registration.password)?;
    let name = validate_name(registration.name)?;

    if storage
        .find_single_user_by_email(registration.email)
        .await?
        .is_some()
    {
        return Err(ServiceError::Conflict);
    }

    let hashed_password = hash_password(registration.password).await?;

    let values = CreateUserValues {
        session_id: &Uuid::new_v4(),
        email: registration.email,
        name,
        hashed_password: &hashed_password,
    };

    let user = match storage.create_user(&values).await {
        Ok(user) => user,
        // lost the race against a registration with the same email
        Err(storage::Error::UniqueViolation(_)) => return Err(ServiceError::Conflict),
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Registered user {}", user.id);

    let token = sessions.issue(&user)?;

    Ok((user, token))
}

/// Check the credentials of a user and start a session for it
///
/// Unknown emails and wrong passwords are reported the same way
pub async fn authenticate<S: Storage>(
    storage: &S,
    sessions: &Sessions,
    email: &str,
    password: &str,
) -> Result<(User, SessionToken), ServiceError> {
    validate_email(email)?;
    validate_password(password)?;

    let Some(user) = storage.find_single_user_by_email(email).await? else {
        tracing::debug!("Login attempt for unknown email");

        verify_unknown_user_password(password).await?;

        return Err(ServiceError::InvalidCredentials);
    };

    if !verify_password(&user.hashed_password, password).await? {
        tracing::debug!("Login attempt with wrong password for user {}", user.id);

        return Err(ServiceError::InvalidCredentials);
    }

    let token = sessions.issue(&user)?;

    Ok((user, token))
}

/// Find the user behind a session token
///
/// Absent, forged, expired and revoked tokens all resolve to `None`, as do tokens of
/// users that no longer exist
pub async fn resolve_session<S: Storage>(
    storage: &S,
    sessions: &Sessions,
    token: Option<&str>,
) -> Result<Option<User>, ServiceError> {
    let Some(claims) = token.and_then(|token| sessions.verify(token)) else {
        return Ok(None);
    };

    let user = storage.find_single_user_by_id(&claims.sub).await?;

    Ok(user.filter(|user| {
        let is_current = user.session_id == claims.jti;
        if !is_current {
            tracing::debug!("Revoked session used for user {}", user.id);
        }

        is_current
    }))
}

/// End the session behind a token
///
/// Rotates the session ID of the user, so the token can not be replayed. Never fails:
/// problems are logged and the client forgets its cookie regardless.
pub async fn end_session<S: Storage>(storage: &S, sessions: &Sessions, token: Option<&str>) {
    let user = match resolve_session(storage, sessions, token).await {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(err) => {
            tracing::error!("Could not resolve session to end it: {err}");
            return;
        }
    };

    if let Err(err) = storage.rotate_session(&user, &Uuid::new_v4()).await {
        tracing::error!("Could not revoke session of user {}: {err}", user.id);
    } else {
        tracing::debug!("Ended session of user {}", user.id);
    }
}

/// Hash on the blocking pool, Argon2 is slow on purpose
async fn hash_password(password: &str) -> Result<String, ServiceError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || password::hash(&password))
        .await
        .map_err(|err| ServiceError::Internal(err.to_string()))?
        .map_err(|err| ServiceError::Internal(format!("Could not hash password: {err}")))
}

/// Verify on the blocking pool, Argon2 is slow on purpose
async fn verify_password(hashed_password: &str, password: &str) -> Result<bool, ServiceError> {
    let hashed_password = hashed_password.to_string();
    let password = password.to_string();

    tokio::task::spawn_blocking(move || password::verify(&hashed_password, &password))
        .await
        .map_err(|err| ServiceError::Internal(err.to_string()))
}

/// Verify against the unknown user hash on the blocking pool, never matches
async fn verify_unknown_user_password(password: &str) -> Result<bool, ServiceError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        UNKNOWN_USER_HASH
            .as_deref()
            .is_some_and(|hashed_password| password::verify(hashed_password, &password))
    })
    .await
    .map_err(|err| ServiceError::Internal(err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use std::time::Instant;

    use super::*;
    use crate::storage::Memory;

    fn registration<'a>(email: &'a str, password: &'a str) -> Registration<'a> {
        Registration {
            email,
            password,
            name: Some("A"),
        }
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let storage = Memory::new();
        let sessions = Sessions::new(b"verysecret", false);

        let (user, token) = register(&storage, &sessions, &registration("a@x.com", "secret1"))
            .await
            .unwrap();
        assert_eq!("a@x.com", user.email);
        assert_eq!("A", user.name);
        assert_ne!("secret1", user.hashed_password);

        let resolved = resolve_session(&storage, &sessions, Some(token.as_str()))
            .await
            .unwrap();
        assert_eq!(Some(user.id), resolved.map(|user| user.id));

        let (authenticated, _) = authenticate(&storage, &sessions, "a@x.com", "secret1")
            .await
            .unwrap();
        assert_eq!(user.id, authenticated.id);
    }

    #[tokio::test]
    async fn test_register_conflict() {
        let storage = Memory::new();
        let sessions = Sessions::new(b"verysecret", false);

        register(&storage, &sessions, &registration("a@x.com", "secret1"))
            .await
            .unwrap();

        let result = register(&storage, &sessions, &registration("a@x.com", "secret2")).await;
        assert!(matches!(result, Err(ServiceError::Conflict)));

        // the first password still works, nothing was overwritten
        assert!(
            authenticate(&storage, &sessions, "a@x.com", "secret1")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_register_validation() {
        let storage = Memory::new();
        let sessions = Sessions::new(b"verysecret", false);

        let err = register(&storage, &sessions, &registration("nope", "secret1"))
            .await
            .unwrap_err();
        assert_eq!("Invalid email address", err.to_string());

        let err = register(&storage, &sessions, &registration("a@x.com", "short"))
            .await
            .unwrap_err();
        assert_eq!("Password must be at least 6 characters", err.to_string());

        let nameless = Registration {
            email: "a@x.com",
            password: "secret1",
            name: None,
        };
        let err = register(&storage, &sessions, &nameless).await.unwrap_err();
        assert_eq!("Name is required for signup", err.to_string());
    }

    #[tokio::test]
    async fn test_invalid_credentials_are_uniform() {
        let storage = Memory::new();
        let sessions = Sessions::new(b"verysecret", false);

        register(&storage, &sessions, &registration("a@x.com", "secret1"))
            .await
            .unwrap();

        let wrong_password = authenticate(&storage, &sessions, "a@x.com", "secret2")
            .await
            .unwrap_err();
        let unknown_email = authenticate(&storage, &sessions, "b@x.com", "secret1")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, ServiceError::InvalidCredentials));
        assert!(matches!(unknown_email, ServiceError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_end_session_revokes_token() {
        let storage = Memory::new();
        let sessions = Sessions::new(b"verysecret", false);

        let (_, token) = register(&storage, &sessions, &registration("a@x.com", "secret1"))
            .await
            .unwrap();

        end_session(&storage, &sessions, Some(token.as_str())).await;

        let resolved = resolve_session(&storage, &sessions, Some(token.as_str()))
            .await
            .unwrap();
        assert!(resolved.is_none());

        // a new login gets a working session again
        let (_, token) = authenticate(&storage, &sessions, "a@x.com", "secret1")
            .await
            .unwrap();
        let resolved = resolve_session(&storage, &sessions, Some(token.as_str()))
            .await
            .unwrap();
        assert!(resolved.is_some());
    }

    #[tokio::test]
    async fn test_end_session_without_token() {
        let storage = Memory::new();
        let sessions = Sessions::new(b"verysecret", false);

        end_session(&storage, &sessions, None).await;
        end_session(&storage, &sessions, Some("garbage")).await;
    }

    #[test]
    fn test_unknown_user_hash() {
        let hashed_password = UNKNOWN_USER_HASH.as_deref().unwrap();
        assert!(hashed_password.starts_with("$argon2"));

        assert!(!password::verify(hashed_password, "secret1"));
        assert!(!password::verify(hashed_password, ""));
    }

    #[tokio::test]
    async fn test_unknown_email_costs_as_much_as_wrong_password() {
        let storage = Memory::new();
        let sessions = Sessions::new(b"verysecret", false);

        register(&storage, &sessions, &registration("a@x.com", "secret1"))
            .await
            .unwrap();

        // first use of the unknown user hash creates it
        authenticate(&storage, &sessions, "b@x.com", "secret1")
            .await
            .unwrap_err();

        let mut wrong_password = Duration::ZERO;
        let mut unknown_email = Duration::ZERO;

        for _ in 0..3 {
            let start = Instant::now();
            authenticate(&storage, &sessions, "a@x.com", "secret2")
                .await
                .unwrap_err();
            wrong_password += start.elapsed();

            let start = Instant::now();
            authenticate(&storage, &sessions, "b@x.com", "secret2")
                .await
                .unwrap_err();
            unknown_email += start.elapsed();
        }

        assert!(
            unknown_email * 10 > wrong_password,
            "unknown email: {unknown_email:?}, wrong password: {wrong_password:?}"
        );
    }
}
