use serde_json::json;

use crate::helpers::{Transporter, spawn_app, spawn_app_with};

#[tokio::test]
async fn subscribe_returns_200_for_a_new_address() {
    let app = spawn_app().await;

    let response = app
        .post_subscription(&json!({ "email": "ursula_le_guin@gmail.com" }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Subscribed" }));
}

#[tokio::test]
async fn subscribe_persists_the_new_subscriber() {
    let app = spawn_app().await;

    app.post_subscription(&json!({ "email": "ursula_le_guin@gmail.com" }))
        .await;

    let saved = app.stored_subscribers().await;
    assert_eq!(saved, vec!["ursula_le_guin@gmail.com".to_string()]);
}

#[tokio::test]
async fn subscribe_appends_to_the_existing_list() {
    let app = spawn_app().await;
    app.store()
        .try_save(&["first@closet.com".to_string()])
        .await
        .unwrap();

    app.post_subscription(&json!({ "email": "second@closet.com" }))
        .await;

    assert_eq!(
        app.stored_subscribers().await,
        vec!["first@closet.com".to_string(), "second@closet.com".to_string()]
    );
}

#[tokio::test]
async fn subscribing_twice_reports_already_subscribed() {
    let app = spawn_app().await;
    let body = json!({ "email": "ursula_le_guin@gmail.com" });

    app.post_subscription(&body).await;
    let before = std::fs::read(&app.subscribers_path).unwrap();
    let response = app.post_subscription(&body).await;

    assert_eq!(200, response.status().as_u16());
    let message: serde_json::Value = response.json().await.unwrap();
    assert_eq!(message, json!({ "message": "Already subscribed" }));
    let after = std::fs::read(&app.subscribers_path).unwrap();
    assert_eq!(before, after);
    assert_eq!(app.stored_subscribers().await.len(), 1);
}

#[tokio::test]
async fn subscribe_returns_400_for_invalid_payloads() {
    let app = spawn_app().await;

    let test_cases = vec![
        (json!({ "email": "definitely-not-an-email" }), "an address without @"),
        (json!({ "email": "" }), "an empty address"),
        (json!({ "email": 42 }), "a number"),
        (json!({ "email": null }), "a null address"),
        (json!({ "email": ["a@b.com"] }), "an array"),
        (json!({}), "a missing address"),
    ];

    for (body, description) in test_cases {
        let response = app.post_subscription(&body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload was {}.",
            description
        );
        let error: serde_json::Value = response.json().await.unwrap();
        assert_eq!(error, json!({ "error": "Invalid email" }));
    }

    assert!(!app.subscriber_file_exists());
}

#[tokio::test]
async fn subscribe_returns_400_for_malformed_json() {
    let app = spawn_app().await;

    let response = app.post_raw_subscription("{\"email\": ").await;

    assert_eq!(400, response.status().as_u16());
    let error: serde_json::Value = response.json().await.unwrap();
    assert_eq!(error, json!({ "error": "Invalid email" }));
}

#[tokio::test]
async fn invalid_address_leaves_the_stored_list_unchanged() {
    let app = spawn_app().await;
    let existing = vec!["first@closet.com".to_string()];
    app.store().try_save(&existing).await.unwrap();
    let before = std::fs::read(&app.subscribers_path).unwrap();

    app.post_subscription(&json!({ "email": "nobody" })).await;

    let after = std::fs::read(&app.subscribers_path).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn subscribe_still_succeeds_when_mail_delivery_fails() {
    let app = spawn_app_with(Transporter::Unreachable).await;

    let response = app
        .post_subscription(&json!({ "email": "ursula_le_guin@gmail.com" }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Subscribed" }));
    assert_eq!(
        app.stored_subscribers().await,
        vec!["ursula_le_guin@gmail.com".to_string()]
    );
}

#[tokio::test]
async fn corrupt_subscriber_file_is_treated_as_empty() {
    let app = spawn_app().await;
    std::fs::write(&app.subscribers_path, "not json at all").unwrap();

    let response = app
        .post_subscription(&json!({ "email": "ursula_le_guin@gmail.com" }))
        .await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        app.stored_subscribers().await,
        vec!["ursula_le_guin@gmail.com".to_string()]
    );
}
