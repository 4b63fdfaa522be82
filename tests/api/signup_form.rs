use coming_soon::signup_form::{FormState, SignupForm, FAILURE_MESSAGE, SUCCESS_MESSAGE};
use serde_json::Value;

use crate::helpers::spawn_app;

#[tokio::test]
async fn a_valid_submission_reaches_success_and_clears_the_field() {
    let app = spawn_app().await;
    let mut form = SignupForm::new(&app.address, reqwest::Client::new());
    form.set_email("a@b.com");

    match form.submit().await {
        FormState::Success { subscription } => {
            assert_eq!(subscription.email, "a@b.com");
            assert_eq!(subscription.id, 1);
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(form.email(), "");
    assert_eq!(form.notice(), Some(SUCCESS_MESSAGE));
}

#[tokio::test]
async fn an_invalid_address_never_reaches_the_endpoint() {
    let app = spawn_app().await;
    let mut form = SignupForm::new(&app.address, reqwest::Client::new());
    form.set_email("not-an-email");

    let state = form.submit().await.clone();

    assert_eq!(state, FormState::Idle);
    assert!(form.field_error().is_some());
    let body: Value = app.get_subscriptions().await.json().await.unwrap();
    assert_eq!(body["subscriptions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn a_server_failure_keeps_the_value_for_correction() {
    let app = spawn_app().await;
    std::fs::remove_dir_all(app.storage_path.parent().unwrap()).unwrap();
    let mut form = SignupForm::new(&app.address, reqwest::Client::new());
    form.set_email("a@b.com");

    let state = form.submit().await.clone();

    assert!(matches!(state, FormState::Error { .. }));
    assert_eq!(form.email(), "a@b.com");
    assert_eq!(form.notice(), Some(FAILURE_MESSAGE));
}

#[tokio::test]
async fn an_unreachable_endpoint_is_reported_as_an_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut form = SignupForm::new(&format!("http://127.0.0.1:{}", port), reqwest::Client::new());
    form.set_email("a@b.com");

    let state = form.submit().await.clone();

    assert!(matches!(state, FormState::Error { .. }));
    assert_eq!(form.email(), "a@b.com");
    assert!(form.is_submit_enabled());
}
