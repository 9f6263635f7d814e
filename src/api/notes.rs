//! Notes API, every route works on notes of the current user only

use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::notes;
use crate::notes::Note;
use crate::storage::Storage;

use super::Acknowledgement;
use super::CurrentUser;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::parse_note_id;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteResponse {
    fn from_note(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            author_id: note.author_id,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }

    fn from_note_multiple(notes: Vec<Note>) -> Vec<Self> {
        notes.into_iter().map(Self::from_note).collect::<Vec<Self>>()
    }
}

/// Create or update note form
///
/// Missing fields are reported as required by the notes service
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NoteForm {
    title: Option<String>,
    content: Option<String>,
}

impl NoteForm {
    fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// List all notes of the current user, most recently updated first
///
/// Request:
/// ```sh
/// curl -v -b 'session=tokentokentoken' http://localhost:6000/api/notes
/// ```
///
/// Response:
/// ```json
/// [ { "id": "<uuid>", "title": "T", "content": "C", "authorId": "<uuid>", ... } ]
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<Vec<NoteResponse>>, Error> {
    let notes = notes::list_owned(&storage, &current_user).await?;

    Ok(Success::ok(NoteResponse::from_note_multiple(notes)))
}

/// Get a single note of the current user
///
/// Request:
/// ```sh
/// curl -v -b 'session=tokentokentoken' http://localhost:6000/api/notes/<uuid>
/// ```
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<String>,
) -> Result<Success<NoteResponse>, Error> {
    let note_id = parse_note_id(&note_id)?;

    let note = notes::get(&storage, &current_user, &note_id).await?;

    Ok(Success::ok(NoteResponse::from_note(note)))
}

/// Create a note for the current user
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -b 'session=tokentokentoken' \
///     -d '{ "title": "T", "content": "C" }' \
///     http://localhost:6000/api/notes
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<NoteForm>,
) -> Result<Success<NoteResponse>, Error> {
    let note = notes::create(&storage, &current_user, form.title(), form.content()).await?;

    Ok(Success::ok(NoteResponse::from_note(note)))
}

/// Overwrite title and content of a note of the current user
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Content-Type: application/json' \
///     -b 'session=tokentokentoken' \
///     -d '{ "title": "T2", "content": "C2" }' \
///     http://localhost:6000/api/notes/<uuid>
/// ```
pub async fn update<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<String>,
    Form(form): Form<NoteForm>,
) -> Result<Success<NoteResponse>, Error> {
    let note_id = parse_note_id(&note_id)?;

    let note = notes::update(
        &storage,
        &current_user,
        &note_id,
        form.title(),
        form.content(),
    )
    .await?;

    Ok(Success::ok(NoteResponse::from_note(note)))
}

/// Permanently delete a note of the current user
///
/// Request:
/// ```sh
/// curl -v -XDELETE -b 'session=tokentokentoken' http://localhost:6000/api/notes/<uuid>
/// ```
///
/// Response:
/// ```json
/// { "success": true }
/// ```
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<String>,
) -> Result<Success<Acknowledgement>, Error> {
    let note_id = parse_note_id(&note_id)?;

    notes::delete(&storage, &current_user, &note_id).await?;

    Ok(Success::ok(Acknowledgement::new()))
}
