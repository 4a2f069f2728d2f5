//! Full profile workflow: `ProfileView` driving `HttpBackend` and
//! `FirebaseStorage`, both pointed at one mock server.

use std::sync::Arc;
use std::time::Duration;

use homestead::api::HttpBackend;
use homestead::core::model::{AvatarFile, ProfileField, UserSession};
use homestead::core::store::{SessionSnapshot, SessionStore};
use homestead::core::upload::UploadPhase;
use homestead::storage::FirebaseStorage;
use homestead::view::ProfileView;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn alice() -> UserSession {
    UserSession {
        id: "u1".to_string(),
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        avatar_url: "https://img/alice.png".to_string(),
    }
}

fn view_for(server: &MockServer) -> ProfileView {
    let backend = HttpBackend::new(server.uri(), Some("access_token=abc")).unwrap();
    let storage = FirebaseStorage::new(server.uri(), "bkt", None);
    ProfileView::new(
        SessionStore::new(SessionSnapshot::signed_in(alice())),
        Arc::new(backend),
        Arc::new(storage),
    )
}

/// Apply the next background result, failing the test if none arrives.
async fn settle(view: &mut ProfileView) {
    tokio::time::timeout(Duration::from_secs(5), view.process_next())
        .await
        .expect("background result should arrive");
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_upload_then_submit_persists_avatar() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v0/b/bkt/o"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "1me.png",
            "bucket": "bkt",
            "downloadTokens": "tok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let avatar_url = format!("{}/v0/b/bkt/o/1me.png?alt=media&token=tok", server.uri());

    Mock::given(method("POST"))
        .and(path("/api/user/update/u1"))
        .and(body_partial_json(json!({
            "username": "alicia",
            "avatar": avatar_url.clone()
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u1",
            "username": "alicia",
            "email": "alice@example.com",
            "avatar": avatar_url.clone()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = view_for(&server);
    view.select_avatar_file(AvatarFile::new("me.png", vec![9; 2048]));
    while view.state().upload.is_in_progress() {
        settle(&mut view).await;
    }
    assert!(matches!(view.state().upload, UploadPhase::Succeeded { .. }));
    assert_eq!(view.state().pending.avatar_url.as_deref(), Some(avatar_url.as_str()));

    view.edit_field(ProfileField::Username, "alicia");
    view.submit_profile();
    settle(&mut view).await;

    let session = view.session();
    let user = session.current_user.as_ref().unwrap();
    assert_eq!(user.username, "alicia");
    assert_eq!(user.avatar_url, avatar_url);
    assert!(view.state().update_success);
    assert!(view.state().pending.is_empty());
}

#[tokio::test]
async fn test_rejected_update_keeps_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/user/update/u1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "statusCode": 401,
            "message": "You can only update your own account!"
        })))
        .mount(&server)
        .await;

    let mut view = view_for(&server);
    view.edit_field(ProfileField::Email, "new@example.com");
    view.submit_profile();
    settle(&mut view).await;

    let session = view.session();
    assert_eq!(session.current_user, Some(alice()));
    assert_eq!(
        session.error.as_deref(),
        Some("You can only update your own account!")
    );
    assert!(!session.loading);
    // The edit is still staged for another try.
    assert_eq!(
        view.state().pending.get(ProfileField::Email),
        Some("new@example.com")
    );
}

#[tokio::test]
async fn test_delete_account_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/user/delete/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("User has been deleted!")))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = view_for(&server);
    let mut rx = view.store().subscribe();
    view.delete_account();
    assert!(view.session().loading);
    settle(&mut view).await;

    assert_eq!(*view.session(), SessionSnapshot::default());
    assert!(rx.borrow_and_update().current_user.is_none());
}

#[tokio::test]
async fn test_sign_out_failure_sets_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/signOut"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "statusCode": 500,
            "message": "Internal Server Error"
        })))
        .mount(&server)
        .await;

    let mut view = view_for(&server);
    view.sign_out();
    settle(&mut view).await;

    let session = view.session();
    assert_eq!(session.current_user, Some(alice()));
    assert_eq!(session.error.as_deref(), Some("Internal Server Error"));
}

#[tokio::test]
async fn test_listings_show_delete_and_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user/listings/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "l1", "name": "Loft", "imageUrls": ["https://img/l1.png"], "userRef": "u1" },
            { "_id": "l2", "name": "Barn", "imageUrls": [], "userRef": "u1" }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/listing/delete/l1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("Listing has been deleted!")))
        .mount(&server)
        .await;

    let mut view = view_for(&server);
    view.toggle_listings();
    settle(&mut view).await;
    assert_eq!(view.state().visible_listings().len(), 2);

    view.delete_listing("l1");
    settle(&mut view).await;
    let names: Vec<_> = view.state().listings.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Barn"]);

    // Hide, then show again: the second fetch finds no mock and gets a 404.
    view.toggle_listings();
    assert!(view.state().visible_listings().is_empty());
    view.toggle_listings();
    settle(&mut view).await;
    assert!(view.state().listings_error);
}
