use serde_json::json;

use crate::helpers::{Transporter, spawn_app, spawn_app_with};

#[tokio::test]
async fn send_email_returns_200_with_a_working_transporter() {
    let app = spawn_app().await;

    let response = app
        .post_contact_json(&json!({
            "name": "Ursula",
            "email": "ursula@example.com",
            "message": "Do you ship to Canada?"
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "Email sent successfully!");
    assert!(!app.subscriber_file_exists());
}

#[tokio::test]
async fn send_email_accepts_url_encoded_forms() {
    let app = spawn_app().await;

    let response = app
        .post_contact_form("name=Ursula&email=ursula%40example.com&message=Hello")
        .await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "Email sent successfully!");
}

#[tokio::test]
async fn send_email_accepts_missing_fields() {
    let app = spawn_app().await;

    let response = app.post_contact_json(&json!({})).await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn send_email_returns_400_for_malformed_json() {
    let app = spawn_app().await;

    let response = app
        .post_raw_contact("application/json", "{\"name\": \"Ursula\", ")
        .await;

    assert_eq!(400, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "Invalid request body.");
}

#[tokio::test]
async fn send_email_ignores_bodies_of_other_types() {
    let app = spawn_app().await;

    let response = app.post_raw_contact("text/plain", "hello there").await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "Email sent successfully!");
}

#[tokio::test]
async fn send_email_accepts_a_request_without_a_body() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/send-email", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn send_email_returns_500_when_delivery_fails() {
    let app = spawn_app_with(Transporter::Unreachable).await;

    let response = app
        .post_contact_json(&json!({
            "name": "Ursula",
            "email": "ursula@example.com",
            "message": "Do you ship to Canada?"
        }))
        .await;

    assert_eq!(500, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "Failed to send email.");
    assert!(!app.subscriber_file_exists());
}
