use serde_json::json;

use crate::common::{ADMIN_RECIPIENT, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_seller_can_register_with_valid_credentials() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "securepass",
                }),
            )
            .await;

        assert_eq!(res.status, 201);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn cannot_register_with_an_already_taken_username() {
        let app = TestApp::spawn().await;
        let body = json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "securepass",
        });

        let first = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(
            first.status, 201,
            "First registration failed: {}",
            first.text
        );

        let res = app.post_without_token(routes::REGISTER, &body).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn cannot_register_with_a_password_that_is_too_short() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "short",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_register_with_an_invalid_email() {
        let app = TestApp::spawn().await;

        for bad in ["not-an-email", "a@nodot", "@example.com"] {
            let res = app
                .post_without_token(
                    routes::REGISTER,
                    &json!({
                        "username": "alice",
                        "email": bad,
                        "password": "securepass",
                    }),
                )
                .await;

            assert_eq!(res.status, 400, "email {bad:?} was accepted");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_structured_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.post_raw_json(routes::REGISTER, "{\"username\": ").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["message"].is_string());
    }

    #[tokio::test]
    async fn registration_notifies_the_admin_recipient() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "securepass",
                }),
            )
            .await;
        assert_eq!(res.status, 201);

        let sent = app.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "New User Registration");
        assert_eq!(sent[0].recipient, ADMIN_RECIPIENT);
        assert!(sent[0].body.contains("alice"));
        assert!(sent[0].body.contains("alice@example.com"));
    }

    #[tokio::test]
    async fn registration_succeeds_even_when_the_admin_channel_fails() {
        let app = TestApp::spawn().await;
        app.notifier.set_failing(true);

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "securepass",
                }),
            )
            .await;

        assert_eq!(res.status, 201, "registration failed: {}", res.text);
        assert_eq!(app.notifier.sent_count(), 0);
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn registered_seller_can_log_in() {
        let app = TestApp::spawn().await;
        app.create_authenticated_seller("alice", "securepass").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "alice", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_authenticated_seller("alice", "securepass").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "alice", "password": "wrongpass"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_username_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "nobody", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn returns_the_current_seller() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn rejects_a_garbage_token() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}
