//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::notes::Note;
use crate::users::User;

use super::CreateUserValues;
use super::Error;
use super::NoteValues;
use super::Result;
use super::Storage;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All users in storage
    users: Arc<Mutex<HashMap<Uuid, User>>>,

    /// All notes in storage
    notes: Arc<Mutex<HashMap<Uuid, Note>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

/// The current time, but always after `previous`
///
/// The clock may not have moved between two quick mutations
fn now_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();

    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// The most recent change to any note
fn latest_update(notes: &HashMap<Uuid, Note>) -> Option<DateTime<Utc>> {
    notes.values().map(|note| note.updated_at).max()
}

#[async_trait]
impl Storage for Memory {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        let mut users = self.users.lock().await;

        if users.values().any(|user| user.email == values.email) {
            return Err(Error::UniqueViolation("users.email".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            session_id: *values.session_id,
            email: values.email.to_string(),
            name: values.name.to_string(),
            hashed_password: values.hashed_password.to_string(),
            updated_at: Utc::now(),
        };

        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn rotate_session(&self, user: &User, session_id: &Uuid) -> Result<User> {
        self.users
            .lock()
            .await
            .get_mut(&user.id)
            .map(|user| {
                user.session_id = *session_id;
                user.updated_at = now_after(user.updated_at);

                user.clone()
            })
            .ok_or_else(|| Error::NotFound(format!("user {}", user.id)))
    }

    async fn find_all_notes_by_author(&self, author: &User) -> Result<Vec<Note>> {
        let mut notes = self
            .notes
            .lock()
            .await
            .values()
            .filter(|note| note.author_id == author.id)
            .cloned()
            .collect::<Vec<_>>();

        notes.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(notes)
    }

    async fn find_single_note_by_id(&self, id: &Uuid) -> Result<Option<Note>> {
        Ok(self.notes.lock().await.get(id).cloned())
    }

    async fn create_note(&self, author: &User, values: &NoteValues<'_>) -> Result<Note> {
        let mut notes = self.notes.lock().await;

        let now = latest_update(&notes).map_or_else(Utc::now, now_after);

        let note = Note {
            id: Uuid::new_v4(),
            author_id: author.id,
            title: values.title.to_string(),
            content: values.content.to_string(),
            created_at: now,
            updated_at: now,
        };

        notes.insert(note.id, note.clone());

        Ok(note)
    }

    async fn update_note(&self, note: &Note, values: &NoteValues<'_>) -> Result<Option<Note>> {
        let mut notes = self.notes.lock().await;

        let now = latest_update(&notes).map_or_else(Utc::now, now_after);

        Ok(notes.get_mut(&note.id).map(|note| {
            note.title = values.title.to_string();
            note.content = values.content.to_string();
            note.updated_at = now;

            note.clone()
        }))
    }

    async fn delete_note(&self, note: &Note) -> Result<bool> {
        Ok(self.notes.lock().await.remove(&note.id).is_some())
    }
}
