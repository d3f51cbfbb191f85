use crate::common::{TestApp, routes, valid_listing_fields};

#[tokio::test]
async fn enquiry_sends_one_notification_to_the_seller() {
    let app = TestApp::spawn().await;
    let seller = app.create_authenticated_seller("alice", "securepass").await;
    let buyer = app.create_authenticated_seller("bob", "securepass").await;
    let id = app.create_listing(&seller, &valid_listing_fields()).await;
    // Drop the admin registration notifications recorded during setup.
    app.notifier.clear();

    let res = app.post_empty_with_token(&routes::enquire(&id), &buyer).await;

    assert_eq!(res.status, 200, "enquiry failed: {}", res.text);
    assert_eq!(res.body["success"], true);

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "alice@example.com");
    assert_eq!(sent[0].subject, "Interest in Your Listing: Corolla");
    assert!(sent[0].body.contains("bob"));
    assert!(sent[0].body.contains("bob@example.com"));
}

#[tokio::test]
async fn enquiring_about_an_unknown_listing_dispatches_nothing() {
    let app = TestApp::spawn().await;
    let buyer = app.create_authenticated_seller("bob", "securepass").await;
    app.notifier.clear();

    let res = app
        .post_empty_with_token(
            &routes::enquire("00000000-0000-4000-8000-000000000000"),
            &buyer,
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
    assert_eq!(app.notifier.sent_count(), 0);
}

#[tokio::test]
async fn dispatch_failure_is_reported_not_retried() {
    let app = TestApp::spawn().await;
    let seller = app.create_authenticated_seller("alice", "securepass").await;
    let buyer = app.create_authenticated_seller("bob", "securepass").await;
    let id = app.create_listing(&seller, &valid_listing_fields()).await;
    app.notifier.clear();
    app.notifier.set_failing(true);

    let res = app.post_empty_with_token(&routes::enquire(&id), &buyer).await;

    assert_eq!(res.status, 502);
    assert_eq!(res.body["success"], false);
    assert!(
        res.body["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to send email"),
        "unexpected message: {}",
        res.text
    );
    assert_eq!(app.notifier.sent_count(), 0);
}

#[tokio::test]
async fn enquiry_requires_a_token() {
    let app = TestApp::spawn().await;
    let seller = app.create_authenticated_seller("alice", "securepass").await;
    let id = app.create_listing(&seller, &valid_listing_fields()).await;

    let res = app
        .post_empty_without_token(&routes::enquire(&id))
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");
}
