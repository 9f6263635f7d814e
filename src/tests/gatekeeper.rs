use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_protected_pages_without_session() {
    let mut app = helper::setup_test_app().await;

    for path in ["/", "/note/add", "/note/view/some-id", "/somewhere/else"] {
        let reply = helper::page(&mut app, path, None).await;
        assert_eq!(StatusCode::TEMPORARY_REDIRECT, reply.status_code, "{path}");
        assert_eq!(Some("/login".to_string()), reply.location, "{path}");
    }
}

#[tokio::test]
async fn test_protected_pages_with_session() {
    let mut app = helper::setup_test_app().await;

    let (_, session) = helper::signup(&mut app, "a@x.com").await;

    for path in ["/", "/note/add", "/note/update/some-id", "/note/view/some-id"] {
        let reply = helper::page(&mut app, path, Some(&session)).await;
        assert_eq!(StatusCode::OK, reply.status_code, "{path}");
        assert!(reply.location.is_none(), "{path}");
    }

    // passes the gatekeeper, nothing lives here
    let reply = helper::page(&mut app, "/somewhere/else", Some(&session)).await;
    assert_eq!(StatusCode::NOT_FOUND, reply.status_code);
    assert_eq!(Some("Not found".to_string()), reply.error());
}

#[tokio::test]
async fn test_auth_pages() {
    let mut app = helper::setup_test_app().await;

    for path in ["/login", "/signup"] {
        let reply = helper::page(&mut app, path, None).await;
        assert_eq!(StatusCode::OK, reply.status_code, "{path}");
    }

    let (_, session) = helper::signup(&mut app, "a@x.com").await;

    for path in ["/login", "/signup"] {
        let reply = helper::page(&mut app, path, Some(&session)).await;
        assert_eq!(StatusCode::TEMPORARY_REDIRECT, reply.status_code, "{path}");
        assert_eq!(Some("/".to_string()), reply.location, "{path}");
    }
}

#[tokio::test]
async fn test_invalid_session_is_no_session() {
    let mut app = helper::setup_test_app().await;

    let (_, session) = helper::signup(&mut app, "a@x.com").await;
    let mut tampered = session.clone();
    tampered.push('x');

    let reply = helper::page(&mut app, "/", Some(&tampered)).await;
    assert_eq!(StatusCode::TEMPORARY_REDIRECT, reply.status_code);
    assert_eq!(Some("/login".to_string()), reply.location);

    let reply = helper::page(&mut app, "/login", Some(&tampered)).await;
    assert_eq!(StatusCode::OK, reply.status_code);

    // revoked sessions too
    helper::logout(&mut app, Some(&session)).await;

    let reply = helper::page(&mut app, "/", Some(&session)).await;
    assert_eq!(StatusCode::TEMPORARY_REDIRECT, reply.status_code);
    assert_eq!(Some("/login".to_string()), reply.location);
}

#[tokio::test]
async fn test_api_and_assets_pass_through() {
    let mut app = helper::setup_test_app().await;

    // the API answers for itself
    let reply = helper::list_notes(&mut app, None).await;
    assert_eq!(StatusCode::UNAUTHORIZED, reply.status_code);
    assert!(reply.location.is_none());

    let reply = helper::page(&mut app, "/api/unknown", None).await;
    assert_eq!(StatusCode::NOT_FOUND, reply.status_code);
    assert!(reply.location.is_none());

    for path in ["/assets/app.css", "/static/logo.svg", "/favicon.ico"] {
        let reply = helper::page(&mut app, path, None).await;
        assert_eq!(StatusCode::NOT_FOUND, reply.status_code, "{path}");
        assert!(reply.location.is_none(), "{path}");
    }
}
