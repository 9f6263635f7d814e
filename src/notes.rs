//! Notes and their ownership rules
//!
//! Every operation takes the identity of the caller explicitly, a note is only ever
//! visible to and mutable by its author

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::NoteValues;
use crate::storage::Storage;
use crate::users::User;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Is the user the author of this note?
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }
}

/// Validate title and content, both are required and can not be empty
fn validate<'a>(title: &'a str, content: &'a str) -> Result<NoteValues<'a>, ServiceError> {
    if title.is_empty() {
        return Err(ServiceError::Validation("Title is required".to_string()));
    }

    if content.is_empty() {
        return Err(ServiceError::Validation("Content is required".to_string()));
    }

    Ok(NoteValues { title, content })
}

/// All notes of the owner, most recently updated first
pub async fn list_owned<S: Storage>(storage: &S, owner: &User) -> Result<Vec<Note>, ServiceError> {
    Ok(storage.find_all_notes_by_author(owner).await?)
}

/// Create a note for the owner
pub async fn create<S: Storage>(
    storage: &S,
    owner: &User,
    title: &str,
    content: &str,
) -> Result<Note, ServiceError> {
    let values = validate(title, content)?;

    let note = storage.create_note(owner, &values).await?;

    tracing::debug!("Note {} created by {}", note.id, owner.id);

    Ok(note)
}

/// Get a single note of the owner
///
/// A note of somebody else is forbidden, not missing
pub async fn get<S: Storage>(
    storage: &S,
    owner: &User,
    note_id: &Uuid,
) -> Result<Note, ServiceError> {
    let note = storage
        .find_single_note_by_id(note_id)
        .await?
        .ok_or(ServiceError::NotFound("Note"))?;

    if !note.is_owned_by(owner) {
        tracing::debug!("User {} tried to access note {} of {}", owner.id, note.id, note.author_id);

        return Err(ServiceError::Forbidden);
    }

    Ok(note)
}

/// Overwrite title and content of a note of the owner
pub async fn update<S: Storage>(
    storage: &S,
    owner: &User,
    note_id: &Uuid,
    title: &str,
    content: &str,
) -> Result<Note, ServiceError> {
    let note = get(storage, owner, note_id).await?;
    let values = validate(title, content)?;

    storage
        .update_note(&note, &values)
        .await?
        .ok_or(ServiceError::NotFound("Note"))
}

/// Permanently delete a note of the owner
pub async fn delete<S: Storage>(
    storage: &S,
    owner: &User,
    note_id: &Uuid,
) -> Result<(), ServiceError> {
    let note = get(storage, owner, note_id).await?;

    if storage.delete_note(&note).await? {
        tracing::debug!("Note {} deleted by {}", note.id, owner.id);

        Ok(())
    } else {
        Err(ServiceError::NotFound("Note"))
    }
}
