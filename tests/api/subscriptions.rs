use coming_soon::domain::Subscription;
use serde_json::{json, Value};

use crate::helpers::spawn_app;

#[tokio::test]
async fn subscribe_returns_a_200_and_the_record_for_a_valid_email() {
    let app = spawn_app().await;

    let res = app.post_subscription(json!({"email": "a@b.com"}).to_string()).await;

    assert_eq!(res.status().as_u16(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Thank you for subscribing!");
    assert_eq!(body["subscription"]["email"], "a@b.com");
    assert_eq!(body["subscription"]["id"], 1);
    assert!(body["subscription"]["createdAt"].is_string());
}

#[tokio::test]
async fn subscribing_twice_returns_the_same_record() {
    let app = spawn_app().await;
    let body = json!({"email": "a@b.com"}).to_string();

    let first: Value = app.post_subscription(body.clone()).await.json().await.unwrap();
    let res = app.post_subscription(body).await;

    assert_eq!(res.status().as_u16(), 200);
    let second: Value = res.json().await.unwrap();
    assert_eq!(first["subscription"], second["subscription"]);
    assert_eq!(second["subscription"]["id"], 1);
}

#[tokio::test]
async fn subscribe_persists_the_new_subscriber() {
    let app = spawn_app().await;

    app.post_subscription(json!({"email": "email@email.com"}).to_string())
        .await
        .error_for_status()
        .unwrap();

    let saved: Vec<Subscription> =
        serde_json::from_str(&std::fs::read_to_string(&app.storage_path).unwrap()).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].email, "email@email.com");
    assert_eq!(saved[0].id, 1);
}

#[tokio::test]
async fn subscribe_returns_a_400_when_data_is_missing() {
    let app = spawn_app().await;

    let test_cases = vec![
        (json!({}).to_string(), "No email"),
        (json!({"email": null}).to_string(), "Null email"),
        ("not json".to_string(), "Not JSON"),
    ];
    for (body, description) in test_cases {
        let res = app.post_subscription(body).await;
        assert_eq!(res.status().as_u16(), 400, "Test Failed for: {}", description);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["success"], false, "Test Failed for: {}", description);
        assert_eq!(body["message"], "Please enter a valid email address");
    }
}

#[tokio::test]
async fn subscribe_returns_400_when_data_is_invalid() {
    let app = spawn_app().await;

    let test_cases = vec![
        ("not-an-email", "Not an email"),
        ("", "Email empty"),
        ("someone@localhost", "No dot in domain"),
        ("some one@example.com", "Whitespace"),
    ];

    for (email, description) in test_cases {
        let res = app.post_subscription(json!({ "email": email }).to_string()).await;
        assert_eq!(res.status().as_u16(), 400, "Test Failed for: {}", description);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Please enter a valid email address");
    }

    let stored: Value = app.get_subscriptions().await.json().await.unwrap();
    assert_eq!(stored["subscriptions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn subscribe_returns_500_without_details_when_the_store_cannot_write() {
    let app = spawn_app().await;
    std::fs::remove_dir_all(app.storage_path.parent().unwrap()).unwrap();

    let res = app.post_subscription(json!({"email": "a@b.com"}).to_string()).await;

    assert_eq!(res.status().as_u16(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Failed to save your subscription. Please try again later."
    );

    let stored: Value = app.get_subscriptions().await.json().await.unwrap();
    assert_eq!(stored["subscriptions"].as_array().unwrap().len(), 0);
}
