//! Client side of the signup flow.
//!
//! [`SignupForm`] holds the single email field and walks
//! `Idle -> Submitting -> Success | Error -> Idle`. Addresses are checked with
//! the same [`SubscriberEmail::parse`] the server uses, so a locally invalid
//! value never produces a request.
//!
//! Submission is split in two halves. [`SignupForm::begin_submit`] validates
//! and moves to `Submitting`, handing back the request to send; it returns
//! `None` while a request is already in flight. [`SignupForm::complete`] takes
//! the outcome. [`SignupForm::submit`] does both around a real HTTP call.

use serde::Deserialize;

use crate::domain::{SubscriberEmail, Subscription, SubscriptionForm};

pub const SUCCESS_MESSAGE: &str = "Thanks! We'll be in touch soon.";
pub const FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    Success { subscription: Subscription },
    Error { message: String },
}

#[derive(thiserror::Error, Debug)]
pub enum SignupError {
    #[error("Failed to reach the subscription endpoint")]
    Network(#[from] reqwest::Error),
    #[error("The subscription was rejected: {0}")]
    Rejected(String),
    #[error("The subscription endpoint answered with an unexpected body")]
    MalformedResponse,
}

/// Request produced by a successful [`SignupForm::begin_submit`].
#[derive(Debug)]
pub struct SubmitRequest {
    pub email: SubscriberEmail,
}

#[derive(Deserialize)]
struct SubscribeReply {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    subscription: Option<Subscription>,
}

pub struct SignupForm {
    http_client: reqwest::Client,
    subscribe_url: String,
    email: String,
    field_error: Option<String>,
    state: FormState,
}

impl SignupForm {
    /// `base_url` is the origin serving the API, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: &str, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            subscribe_url: format!("{}/api/subscribe", base_url.trim_end_matches('/')),
            email: String::new(),
            field_error: None,
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Local validation message for the field, if the last attempt failed it.
    pub fn field_error(&self) -> Option<&str> {
        self.field_error.as_deref()
    }

    /// Confirmation or failure text to display under the form.
    pub fn notice(&self) -> Option<&str> {
        match &self.state {
            FormState::Success { .. } => Some(SUCCESS_MESSAGE),
            FormState::Error { message } => Some(message),
            FormState::Idle | FormState::Submitting => None,
        }
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.state != FormState::Submitting
    }

    /// Edits the field. Ignored while a request is in flight; editing after a
    /// success or failure puts the form back to `Idle`.
    pub fn set_email(&mut self, value: impl Into<String>) {
        if self.state == FormState::Submitting {
            return;
        }
        self.email = value.into();
        self.field_error = None;
        self.state = FormState::Idle;
    }

    pub fn reset(&mut self) {
        if self.state == FormState::Submitting {
            return;
        }
        self.email.clear();
        self.field_error = None;
        self.state = FormState::Idle;
    }

    /// Validates the field and enters `Submitting`.
    ///
    /// Returns `None` without any state change when a request is already in
    /// flight, and `None` with a field error when the address is invalid.
    pub fn begin_submit(&mut self) -> Option<SubmitRequest> {
        if self.state == FormState::Submitting {
            tracing::debug!("submit ignored, a request is already in flight");
            return None;
        }
        match SubscriberEmail::parse(self.email.clone()) {
            Ok(email) => {
                self.field_error = None;
                self.state = FormState::Submitting;
                Some(SubmitRequest { email })
            }
            Err(message) => {
                self.field_error = Some(message);
                None
            }
        }
    }

    /// Applies the outcome of the request started by `begin_submit`.
    pub fn complete(&mut self, outcome: Result<Subscription, SignupError>) {
        match outcome {
            Ok(subscription) => {
                self.email.clear();
                self.state = FormState::Success { subscription };
            }
            Err(e) => {
                tracing::warn!("Subscription attempt failed: {}", e);
                self.state = FormState::Error {
                    message: FAILURE_MESSAGE.to_string(),
                };
            }
        }
    }

    /// Runs a full submission against the subscription endpoint.
    pub async fn submit(&mut self) -> &FormState {
        if let Some(request) = self.begin_submit() {
            let outcome = self.send(request).await;
            self.complete(outcome);
        }
        &self.state
    }

    #[tracing::instrument(
        name = "Posting the signup form",
        skip(self, request),
        fields(email = %request.email)
    )]
    async fn send(&self, request: SubmitRequest) -> Result<Subscription, SignupError> {
        let response = self
            .http_client
            .post(&self.subscribe_url)
            .json(&SubscriptionForm {
                email: request.email.as_ref().to_owned(),
            })
            .send()
            .await?;

        let status = response.status();
        let reply: SubscribeReply = response
            .json()
            .await
            .map_err(|_| SignupError::MalformedResponse)?;

        if !status.is_success() || !reply.success {
            return Err(SignupError::Rejected(
                reply.message.unwrap_or_else(|| status.to_string()),
            ));
        }
        reply.subscription.ok_or(SignupError::MalformedResponse)
    }
}
