use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_login() {
    let mut app = helper::setup_test_app().await;

    let (user, _) = helper::signup(&mut app, "a@x.com").await;

    let reply = helper::maybe_login(&mut app, "a@x.com", "secret1").await;
    assert_eq!(StatusCode::OK, reply.status_code);
    assert_eq!(Some(user), reply.user());

    let session = reply.session().unwrap();
    let reply = helper::list_notes(&mut app, Some(&session)).await;
    assert_eq!(StatusCode::OK, reply.status_code);
    assert_eq!(Some(vec![]), reply.notes());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let mut app = helper::setup_test_app().await;

    helper::signup(&mut app, "a@x.com").await;

    let wrong_password = helper::maybe_login(&mut app, "a@x.com", "wrong-password").await;
    assert_eq!(StatusCode::UNAUTHORIZED, wrong_password.status_code);
    assert!(wrong_password.set_cookie.is_none());

    let unknown_email = helper::maybe_login(&mut app, "b@x.com", "secret1").await;
    assert_eq!(StatusCode::UNAUTHORIZED, unknown_email.status_code);

    assert_eq!(Some("Invalid credentials".to_string()), wrong_password.error());
    assert_eq!(wrong_password.body, unknown_email.body);

    // emails are matched exactly
    let reply = helper::maybe_login(&mut app, "A@x.com", "secret1").await;
    assert_eq!(StatusCode::UNAUTHORIZED, reply.status_code);
}

#[tokio::test]
async fn test_login_validation() {
    let mut app = helper::setup_test_app().await;

    let reply = helper::maybe_login(&mut app, "", "secret1").await;
    assert_eq!(StatusCode::BAD_REQUEST, reply.status_code);
    assert_eq!(Some("Invalid email address".to_string()), reply.error());

    let reply = helper::maybe_login(&mut app, "a@x.com", "").await;
    assert_eq!(StatusCode::BAD_REQUEST, reply.status_code);
    assert_eq!(
        Some("Password must be at least 6 characters".to_string()),
        reply.error()
    );
}

#[tokio::test]
async fn test_me_without_session() {
    let mut app = helper::setup_test_app().await;

    let reply = helper::me(&mut app, None).await;
    assert_eq!(StatusCode::OK, reply.status_code);
    assert!(reply.body["user"].is_null());

    let reply = helper::me(&mut app, Some("session=not-a-token")).await;
    assert_eq!(StatusCode::OK, reply.status_code);
    assert!(reply.body["user"].is_null());
}

#[tokio::test]
async fn test_tampered_session() {
    let mut app = helper::setup_test_app().await;

    let (_, session) = helper::signup(&mut app, "a@x.com").await;

    let mut tampered = session.clone();
    tampered.push('x');

    let reply = helper::me(&mut app, Some(&tampered)).await;
    assert!(reply.body["user"].is_null());

    let reply = helper::list_notes(&mut app, Some(&tampered)).await;
    assert_eq!(StatusCode::UNAUTHORIZED, reply.status_code);
    assert_eq!(Some("Not authenticated".to_string()), reply.error());
}
