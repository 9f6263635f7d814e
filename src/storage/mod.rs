//! All things related to the storage of users and notes

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::Memory;
pub use postgres::Postgres;

use crate::notes::Note;
use crate::users::User;

mod memory;
mod postgres;

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),

    /// The row to change is gone
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique constraint refused the write
    #[error("Unique violation: {0}")]
    UniqueViolation(String),

    /// Migrations could not be applied
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create a User
pub struct CreateUserValues<'a> {
    /// The initial session ID for the user
    pub session_id: &'a Uuid,

    /// The email address, unique over all users
    pub email: &'a str,

    /// The display name
    pub name: &'a str,

    /// The hashed password
    pub hashed_password: &'a str,
}

/// Values to create or overwrite a Note
///
/// Both fields are always written, there are no partial updates
pub struct NoteValues<'a> {
    /// Title of the note
    pub title: &'a str,

    /// Content of the note
    pub content: &'a str,
}

/// Storage with all supported operations
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Finds a single user by its email address
    ///
    /// Email addresses are compared as-is, case-sensitive
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Finds a single user by its ID
    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>>;

    /// Create a single user
    ///
    /// Fails with [`Error::UniqueViolation`] when the email is already taken
    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User>;

    /// Replace the session ID of a user, invalidating all tokens issued before
    async fn rotate_session(&self, user: &User, session_id: &Uuid) -> Result<User>;

    /// Find all notes of an author, most recently updated first
    async fn find_all_notes_by_author(&self, author: &User) -> Result<Vec<Note>>;

    /// Find a single note by ID, regardless of its author
    async fn find_single_note_by_id(&self, id: &Uuid) -> Result<Option<Note>>;

    /// Create a note for an author
    async fn create_note(&self, author: &User, values: &NoteValues<'_>) -> Result<Note>;

    /// Overwrite title and content of a note
    ///
    /// `None` when the note disappeared in the meantime
    async fn update_note(&self, note: &Note, values: &NoteValues<'_>) -> Result<Option<Note>>;

    /// Permanently delete a note
    ///
    /// `false` when there was nothing left to delete
    async fn delete_note(&self, note: &Note) -> Result<bool>;
}
