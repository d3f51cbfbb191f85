use sea_orm::{ConnectionTrait, DbBackend, EntityTrait, PaginatorTrait, Statement};
use server::entity::{listing, location};

use crate::common::{
    STORAGE_BASE_URL, TestApp, fields_with, fields_without, routes, valid_listing_fields,
};

async fn listing_count(app: &TestApp) -> u64 {
    listing::Entity::find().count(&app.db).await.unwrap()
}

async fn location_count(app: &TestApp) -> u64 {
    location::Entity::find().count(&app.db).await.unwrap()
}

/// Cap mileage at the database level, below what form validation allows.
/// A submission can then pass validation and upload but fail inside the
/// persistence transaction.
async fn cap_mileage_in_database(app: &TestApp) {
    app.db
        .execute_raw(Statement::from_string(
            DbBackend::Postgres,
            "ALTER TABLE \"listing\" ADD CONSTRAINT \"listing_mileage_cap\" \
             CHECK (mileage <= 100000)"
                .to_string(),
        ))
        .await
        .expect("Failed to add mileage cap");
}

mod submission {
    use super::*;

    #[tokio::test]
    async fn create_with_image_persists_listing_location_and_image() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;

        let res = app
            .post_form(
                routes::LISTINGS,
                &valid_listing_fields(),
                Some(("car.jpg", b"jpeg-bytes".to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "create failed: {}", res.text);
        assert_eq!(res.body["brand"], "Toyota");
        assert_eq!(res.body["mileage"], 5000);
        assert_eq!(
            res.body["image"],
            format!("{STORAGE_BASE_URL}/listings/alice/car.jpg")
        );
        assert_eq!(res.body["location"]["address"], "1600 Grand Ave");
        assert_eq!(res.body["location"]["state"], "MN");

        assert_eq!(listing_count(&app).await, 1);
        assert_eq!(location_count(&app).await, 1);
        assert_eq!(
            app.storage.object("listings/alice/car.jpg"),
            Some(b"jpeg-bytes".to_vec())
        );
    }

    #[tokio::test]
    async fn create_without_image_leaves_image_url_empty() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;

        let res = app
            .post_form(routes::LISTINGS, &valid_listing_fields(), None, &token)
            .await;

        assert_eq!(res.status, 201, "create failed: {}", res.text);
        assert_eq!(res.body["image"], "");
        assert!(app.storage.is_empty());
    }

    #[tokio::test]
    async fn omitted_mileage_and_color_fall_back_to_defaults() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;

        let res = app
            .post_form(
                routes::LISTINGS,
                &fields_without(&["mileage", "color"]),
                None,
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "create failed: {}", res.text);
        assert_eq!(res.body["mileage"], 0);
        assert_eq!(res.body["color"], "White");
    }

    #[tokio::test]
    async fn invalid_location_writes_neither_row() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;

        let res = app
            .post_form(
                routes::LISTINGS,
                &fields_with(&[("zip_code", "not-a-zip")]),
                Some(("car.jpg", b"jpeg-bytes".to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(listing_count(&app).await, 0);
        assert_eq!(location_count(&app).await, 0);
        // Validation precedes the upload.
        assert!(app.storage.is_empty());
    }

    #[tokio::test]
    async fn unknown_brand_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;

        let res = app
            .post_form(
                routes::LISTINGS,
                &fields_with(&[("brand", "NotABrand")]),
                None,
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn failed_upload_writes_no_rows() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;
        app.storage.set_failing(true);

        let res = app
            .post_form(
                routes::LISTINGS,
                &valid_listing_fields(),
                Some(("car.jpg", b"jpeg-bytes".to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 502, "expected storage failure: {}", res.text);
        assert_eq!(res.body["code"], "STORAGE_ERROR");
        assert_eq!(listing_count(&app).await, 0);
        assert_eq!(location_count(&app).await, 0);
    }

    #[tokio::test]
    async fn failed_persistence_discards_the_uploaded_image() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;
        cap_mileage_in_database(&app).await;

        let res = app
            .post_form(
                routes::LISTINGS,
                &fields_with(&[("mileage", "150000")]),
                Some(("car.jpg", b"jpeg-bytes".to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 500, "expected insert failure: {}", res.text);
        assert_eq!(listing_count(&app).await, 0);
        assert_eq!(location_count(&app).await, 0);
        // The already uploaded object is removed again.
        assert!(app.storage.is_empty());
    }

    #[tokio::test]
    async fn image_filename_with_path_separators_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;

        let res = app
            .post_form(
                routes::LISTINGS,
                &valid_listing_fields(),
                Some(("../../etc/passwd", b"data".to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(listing_count(&app).await, 0);
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form_without_token(routes::LISTINGS, &valid_listing_fields())
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}

mod browse {
    use super::*;

    #[tokio::test]
    async fn get_returns_the_listing_with_its_location() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;
        let id = app.create_listing(&token, &valid_listing_fields()).await;

        let res = app.get_without_token(&routes::listing(&id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], id.as_str());
        assert_eq!(res.body["model"], "Corolla");
        assert_eq!(res.body["location"]["city"], "Saint Paul");
    }

    #[tokio::test]
    async fn get_unknown_listing_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&routes::listing("00000000-0000-4000-8000-000000000000"))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    async fn seed_listings(app: &TestApp, token: &str) {
        app.create_listing(token, &valid_listing_fields()).await;
        app.create_listing(
            token,
            &fields_with(&[
                ("brand", "Honda"),
                ("model", "Civic"),
                ("mileage", "42000"),
                ("color", "Red"),
                ("transmission", "Manual"),
            ]),
        )
        .await;
        app.create_listing(
            token,
            &fields_with(&[
                ("brand", "Toyota"),
                ("model", "Camry"),
                ("mileage", "90000"),
                ("color", "White"),
                ("transmission", "CVT"),
            ]),
        )
        .await;
    }

    #[tokio::test]
    async fn brand_filter_is_an_exact_match() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;
        seed_listings(&app, &token).await;

        let res = app
            .get_without_token(&format!("{}?brand=Toyota", routes::LISTINGS))
            .await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert!(data.iter().all(|l| l["brand"] == "Toyota"));
    }

    #[tokio::test]
    async fn model_filter_matches_substrings_case_insensitively() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;
        seed_listings(&app, &token).await;

        let res = app
            .get_without_token(&format!("{}?model=oRo", routes::LISTINGS))
            .await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["model"], "Corolla");
    }

    #[tokio::test]
    async fn mileage_range_bounds_are_inclusive() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;
        seed_listings(&app, &token).await;

        let res = app
            .get_without_token(&format!(
                "{}?mileage_min=5000&mileage_max=42000",
                routes::LISTINGS
            ))
            .await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
    }

    #[tokio::test]
    async fn inverted_mileage_range_matches_nothing() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;
        seed_listings(&app, &token).await;

        let res = app
            .get_without_token(&format!(
                "{}?mileage_min=50000&mileage_max=10000",
                routes::LISTINGS
            ))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 0);
        assert_eq!(res.body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn filters_combine_conjunctively() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;
        seed_listings(&app, &token).await;

        let res = app
            .get_without_token(&format!(
                "{}?brand=Toyota&transmission=CVT&color=White",
                routes::LISTINGS
            ))
            .await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["model"], "Camry");
    }

    #[tokio::test]
    async fn pagination_is_stable_when_created_at_ties() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;
        seed_listings(&app, &token).await;

        // Collapse every timestamp so ordering must fall back to the id.
        app.db
            .execute_raw(Statement::from_string(
                DbBackend::Postgres,
                "UPDATE \"listing\" SET created_at = '2026-01-01T00:00:00Z'".to_string(),
            ))
            .await
            .expect("Failed to equalize timestamps");

        let mut seen = std::collections::HashSet::new();
        for page in 1..=2 {
            let res = app
                .get_without_token(&format!("{}?page={page}&per_page=2", routes::LISTINGS))
                .await;
            assert_eq!(res.status, 200);
            for item in res.body["data"].as_array().unwrap() {
                let id = item["id"].as_str().unwrap().to_string();
                assert!(seen.insert(id), "listing repeated across pages");
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn unfiltered_list_returns_everything_with_pagination_metadata() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;
        seed_listings(&app, &token).await;

        let res = app.get_without_token(routes::LISTINGS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 3);
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["page"], 1);
        assert_eq!(res.body["pagination"]["total_pages"], 1);
    }
}

mod edit {
    use super::*;

    #[tokio::test]
    async fn edit_without_image_keeps_the_stored_image() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;

        let create = app
            .post_form(
                routes::LISTINGS,
                &valid_listing_fields(),
                Some(("car.jpg", b"jpeg-bytes".to_vec())),
                &token,
            )
            .await;
        assert_eq!(create.status, 201, "create failed: {}", create.text);
        let id = create.body["id"].as_str().unwrap().to_string();
        let original_image = create.body["image"].as_str().unwrap().to_string();

        let res = app
            .put_form(
                &routes::listing(&id),
                &fields_with(&[("address", "55 Summit Ave"), ("mileage", "6000")]),
                None,
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "edit failed: {}", res.text);
        assert_eq!(res.body["mileage"], 6000);
        assert_eq!(res.body["image"], original_image.as_str());
        assert_eq!(res.body["location"]["address"], "55 Summit Ave");
    }

    #[tokio::test]
    async fn edit_with_a_new_image_replaces_the_url() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;

        let create = app
            .post_form(
                routes::LISTINGS,
                &valid_listing_fields(),
                Some(("car.jpg", b"old".to_vec())),
                &token,
            )
            .await;
        let id = create.body["id"].as_str().unwrap().to_string();

        let res = app
            .put_form(
                &routes::listing(&id),
                &valid_listing_fields(),
                Some(("new.jpg", b"new".to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "edit failed: {}", res.text);
        assert_eq!(
            res.body["image"],
            format!("{STORAGE_BASE_URL}/listings/alice/new.jpg")
        );
        assert_eq!(
            app.storage.object("listings/alice/new.jpg"),
            Some(b"new".to_vec())
        );
    }

    #[tokio::test]
    async fn failed_edit_discards_only_the_new_image() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;

        let create = app
            .post_form(
                routes::LISTINGS,
                &valid_listing_fields(),
                Some(("car.jpg", b"old".to_vec())),
                &token,
            )
            .await;
        assert_eq!(create.status, 201, "create failed: {}", create.text);
        let id = create.body["id"].as_str().unwrap().to_string();

        cap_mileage_in_database(&app).await;

        let res = app
            .put_form(
                &routes::listing(&id),
                &fields_with(&[("mileage", "150000")]),
                Some(("new.jpg", b"new".to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 500, "expected update failure: {}", res.text);
        // The replacement is cleaned up, the stored image is untouched.
        assert_eq!(app.storage.object("listings/alice/new.jpg"), None);
        assert_eq!(
            app.storage.object("listings/alice/car.jpg"),
            Some(b"old".to_vec())
        );

        let unchanged = app.get_without_token(&routes::listing(&id)).await;
        assert_eq!(unchanged.body["mileage"], 5000);
        assert_eq!(
            unchanged.body["image"],
            format!("{STORAGE_BASE_URL}/listings/alice/car.jpg")
        );
    }

    #[tokio::test]
    async fn only_the_owner_can_edit() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_seller("alice", "securepass").await;
        let other = app.create_authenticated_seller("mallory", "securepass").await;
        let id = app.create_listing(&owner, &valid_listing_fields()).await;

        let res = app
            .put_form(&routes::listing(&id), &valid_listing_fields(), None, &other)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn editing_an_unknown_listing_uploads_nothing() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_seller("alice", "securepass").await;

        let res = app
            .put_form(
                &routes::listing("00000000-0000-4000-8000-000000000000"),
                &valid_listing_fields(),
                Some(("car.jpg", b"data".to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert!(app.storage.is_empty());
    }
}
