//! Integration tests for POST /api/contact

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_valid_submission_is_relayed() {
    let mut site = TestSite::new().await;

    let response = site
        .send(json_post(
            "/api/contact",
            &json!({
                "email": "  band@example.com ",
                "bandName": "The Examples",
                "numberOfSongs": 4,
                "links": "https://example.com/demo",
                "services": ["Mixing", "juggling", "mixing", "mastering"],
                "message": "We have an EP ready for mixing."
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Thank you! Your message has been sent.");

    let mail = site.next_mail().await.expect("Message should be relayed");
    assert_eq!(mail.from, MAIL_FROM);
    assert_eq!(mail.to, MAIL_TO);
    assert_eq!(mail.reply_to, "band@example.com");
    assert_eq!(mail.subject, "Contact form: The Examples (band@example.com)");
    assert!(mail.text.contains("Services: mixing, mastering"));
    assert!(mail.text.contains("Number of songs: 4"));
    assert!(!mail.text.contains("juggling"));
}

#[tokio::test]
async fn test_services_with_mixed_entry_types() {
    let mut site = TestSite::new().await;

    let response = site
        .send(json_post(
            "/api/contact",
            &json!({
                "email": "band@example.com",
                "services": [42, "mixing", null],
                "message": "Mixed list"
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let mail = site.next_mail().await.expect("Message should be relayed");
    assert!(mail.text.contains("Services: mixing\n"));

    let response = site
        .send(json_post(
            "/api/contact",
            &json!({
                "email": "band@example.com",
                "services": "Mastering",
                "message": "Single service"
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let mail = site.next_mail().await.expect("Message should be relayed");
    assert!(mail.text.contains("Services: mastering\n"));
}

#[tokio::test]
async fn test_missing_message_is_rejected() {
    let mut site = TestSite::new().await;

    let response = site
        .send(json_post("/api/contact", &json!({"email": "a@example.com"})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Message is required");

    assert!(site.next_mail().await.is_none());
}

#[tokio::test]
async fn test_invalid_email_is_rejected() {
    let site = TestSite::new().await;

    for email in ["", "not-an-email", "a@b", "a b@example.com"] {
        let response = site
            .send(json_post(
                "/api/contact",
                &json!({"email": email, "message": "Hi"}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{:?}", email);
    }

    let long_email = format!("{}@example.com", "a".repeat(250));
    let response = site
        .send(json_post(
            "/api/contact",
            &json!({"email": long_email, "message": "Hi"}),
        ))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["error"], "Email must be at most 254 characters");
}

#[tokio::test]
async fn test_overlong_message_is_rejected() {
    let site = TestSite::new().await;

    let response = site
        .send(json_post(
            "/api/contact",
            &json!({"email": "a@example.com", "message": "x".repeat(5001)}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let site = TestSite::new().await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = site.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_success_without_mail_relay() {
    let site = TestSite::without_mail().await;

    let response = site
        .send(json_post(
            "/api/contact",
            &json!({"email": "a@example.com", "message": "Hello"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
}

#[tokio::test]
async fn test_contact_rate_limit() {
    let site = TestSite::new().await;
    let payload = json!({"email": "a@example.com", "message": "Hello"});

    for _ in 0..5 {
        let response = site.send(json_post("/api/contact", &payload)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = site.send(json_post("/api/contact", &payload)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Too many requests, please try again later.");

    // Landing pages are not counted against the contact allowance
    assert_eq!(site.send(get("/")).await.status(), StatusCode::OK);
}
