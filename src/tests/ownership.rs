use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_foreign_note_is_forbidden() {
    let mut app = helper::setup_test_app().await;

    let (_, session_a) = helper::signup(&mut app, "a@x.com").await;
    let (_, session_b) = helper::signup(&mut app, "b@x.com").await;

    let note = helper::create_note(&mut app, &session_a, "T", "C").await;
    let note_id = note.id.to_string();

    let reply = helper::single_note(&mut app, Some(&session_b), &note_id).await;
    assert_eq!(StatusCode::FORBIDDEN, reply.status_code);
    assert_eq!(Some("Not authorized".to_string()), reply.error());

    let reply = helper::maybe_update_note(&mut app, Some(&session_b), &note_id, "X", "Y").await;
    assert_eq!(StatusCode::FORBIDDEN, reply.status_code);
    assert_eq!(Some("Not authorized".to_string()), reply.error());

    // ownership is checked before the form is validated
    let reply = helper::maybe_update_note(&mut app, Some(&session_b), &note_id, "", "").await;
    assert_eq!(StatusCode::FORBIDDEN, reply.status_code);

    let reply = helper::maybe_delete_note(&mut app, Some(&session_b), &note_id).await;
    assert_eq!(StatusCode::FORBIDDEN, reply.status_code);
    assert_eq!(Some("Not authorized".to_string()), reply.error());

    // still there, untouched
    let reply = helper::single_note(&mut app, Some(&session_a), &note_id).await;
    assert_eq!(StatusCode::OK, reply.status_code);
    assert_eq!(Some(note), reply.note());
}
