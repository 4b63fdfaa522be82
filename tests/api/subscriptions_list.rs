use serde_json::{json, Value};

use crate::helpers::{spawn_app, spawn_app_with_storage, unique_storage_path};

#[tokio::test]
async fn listing_an_empty_store_returns_an_empty_array() {
    let app = spawn_app().await;

    let res = app.get_subscriptions().await;

    assert_eq!(res.status().as_u16(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "subscriptions": [] }));
}

#[tokio::test]
async fn end_to_end_subscribe_then_list() {
    let app = spawn_app().await;

    let ok = app.post_subscription(json!({"email": "a@b.com"}).to_string()).await;
    assert_eq!(ok.status().as_u16(), 200);
    let again = app.post_subscription(json!({"email": "a@b.com"}).to_string()).await;
    assert_eq!(again.status().as_u16(), 200);
    let bad = app.post_subscription(json!({"email": "not-an-email"}).to_string()).await;
    assert_eq!(bad.status().as_u16(), 400);

    let res = app.get_subscriptions().await;
    assert_eq!(res.status().as_u16(), 200);
    let body: Value = res.json().await.unwrap();
    let subscriptions = body["subscriptions"].as_array().unwrap();
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0]["email"], "a@b.com");
    assert_eq!(subscriptions[0]["id"], 1);
}

#[tokio::test]
async fn listing_returns_records_in_insertion_order() {
    let app = spawn_app().await;
    let emails = ["first@example.com", "second@example.com", "third@example.com"];
    for email in emails {
        app.post_subscription(json!({ "email": email }).to_string()).await;
    }

    let body: Value = app.get_subscriptions().await.json().await.unwrap();
    let listed: Vec<&str> = body["subscriptions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["email"].as_str().unwrap())
        .collect();

    assert_eq!(listed, emails);
}

#[tokio::test]
async fn a_restarted_app_keeps_records_and_continues_ids() {
    let storage_path = unique_storage_path();
    let first_run = spawn_app_with_storage(&storage_path).await;
    for email in ["one@example.com", "two@example.com"] {
        first_run.post_subscription(json!({ "email": email }).to_string()).await;
    }
    let before: Value = first_run.get_subscriptions().await.json().await.unwrap();

    let second_run = spawn_app_with_storage(&storage_path).await;
    let after: Value = second_run.get_subscriptions().await.json().await.unwrap();
    assert_eq!(before, after);

    let next: Value = second_run
        .post_subscription(json!({"email": "three@example.com"}).to_string())
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(next["subscription"]["id"], 3);
}

#[tokio::test]
async fn listing_while_subscriptions_are_being_written_always_succeeds() {
    let app = spawn_app().await;
    let address = app.address.clone();

    let mut handles = Vec::new();
    for i in 0..20 {
        let address = address.clone();
        handles.push(tokio::spawn(async move {
            let client = reqwest::Client::new();
            let subscribe = client
                .post(&format!("{}/api/subscribe", address))
                .json(&json!({ "email": format!("user{}@example.com", i) }))
                .send()
                .await
                .expect("Failed to send request");
            let list = client
                .get(&format!("{}/api/subscriptions", address))
                .send()
                .await
                .expect("Failed to send request");
            (subscribe.status().as_u16(), list.status().as_u16())
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), (200, 200));
    }

    let body: Value = app.get_subscriptions().await.json().await.unwrap();
    let mut ids: Vec<u64> = body["subscriptions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_u64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
}
