//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::notes::Note;
use crate::users::User;

use super::CreateUserValues;
use super::Error;
use super::NoteValues;
use super::Result;
use super::Storage;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Columns of a user, in `SELECT` and `RETURNING` clauses
const USER_COLUMNS: &str = "id, session_id, email, name, hashed_password, updated_at";

/// Columns of a note, in `SELECT` and `RETURNING` clauses
const NOTE_COLUMNS: &str = "id, author_id, title, content, created_at, updated_at";

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage from a connection string
    ///
    /// Migrations will be run
    pub async fn connect(database_url: &str) -> Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .map_err(connection_error)?;

        Self::with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Migration(err.to_string()))?;

        Ok(Self { connection_pool })
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r"
            INSERT INTO users (id, session_id, email, name, hashed_password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(values.session_id)
        .bind(values.email)
        .bind(values.name)
        .bind(values.hashed_password)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(write_error)
    }

    async fn rotate_session(&self, user: &User, session_id: &Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r"
            UPDATE users
            SET session_id = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(session_id)
        .bind(user.id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => Error::NotFound(format!("user {}", user.id)),
            err => connection_error(err),
        })
    }

    async fn find_all_notes_by_author(&self, author: &User) -> Result<Vec<Note>> {
        sqlx::query_as::<_, Note>(&format!(
            r"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE author_id = $1
            ORDER BY updated_at DESC, created_at DESC, id
            "
        ))
        .bind(author.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_note_by_id(&self, id: &Uuid) -> Result<Option<Note>> {
        sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_note(&self, author: &User, values: &NoteValues<'_>) -> Result<Note> {
        sqlx::query_as::<_, Note>(&format!(
            r"
            INSERT INTO notes (id, author_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING {NOTE_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(author.id)
        .bind(values.title)
        .bind(values.content)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn update_note(&self, note: &Note, values: &NoteValues<'_>) -> Result<Option<Note>> {
        // `CURRENT_TIMESTAMP` is the transaction start, keep it strictly increasing anyway
        sqlx::query_as::<_, Note>(&format!(
            r"
            UPDATE notes
            SET title = $1,
                content = $2,
                updated_at = GREATEST(CURRENT_TIMESTAMP, updated_at + INTERVAL '1 microsecond')
            WHERE id = $3
            RETURNING {NOTE_COLUMNS}
            "
        ))
        .bind(values.title)
        .bind(values.content)
        .bind(note.id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_note(&self, note: &Note) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(note.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}

/// Convert `SQLx` errors of inserts, keeping unique violations apart
fn write_error(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
            Error::UniqueViolation(database_error.message().to_string())
        }
        _ => connection_error(err),
    }
}
