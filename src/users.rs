//! Users and the rules for their credentials

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Minimum amount of characters in a password
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub session_id: Uuid,
    pub email: String,
    pub name: String,
    pub hashed_password: String,
    pub updated_at: DateTime<Utc>,
}

/// Check if the email address has the shape of one
///
/// A single `@` with something in front of it, and a dotted domain behind it without
/// empty labels. No whitespace anywhere.
pub fn validate_email(email: &str) -> Result<(), ServiceError> {
    let invalid = || ServiceError::Validation("Invalid email address".to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };

    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels = domain.split('.').collect::<Vec<_>>();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}

/// Check the password length, counted in characters
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Get the trimmed display name, it is required for signup
pub fn validate_name(name: Option<&str>) -> Result<&str, ServiceError> {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ServiceError::Validation("Name is required for signup".to_string()))
}
