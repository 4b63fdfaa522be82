use std::fmt::Debug;
use std::sync::Arc;

use actix_web::{
    error::JsonPayloadError, get, http::StatusCode, post, web, HttpRequest, HttpResponse,
    ResponseError,
};
use anyhow::Context;
use serde::Serialize;

use crate::{
    domain::{NewSubscriber, Subscription, SubscriptionForm, INVALID_EMAIL_MESSAGE},
    routes::{error_chain_fmt, FailureBody},
    subscription_store::SubscriptionStore,
    telemetry::spawn_blocking_with_tracing,
};

pub const SUBSCRIBE_SUCCESS_MESSAGE: &str = "Thank you for subscribing!";

#[derive(Serialize)]
struct SubscribeBody {
    success: bool,
    message: &'static str,
    subscription: Subscription,
}

#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(form, store),
    fields(subscriber_email = %form.email)
)]
#[post("/api/subscribe")]
pub async fn subscribe(
    form: web::Json<SubscriptionForm>,
    store: web::Data<SubscriptionStore>,
) -> Result<HttpResponse, SubscribeError> {
    let new_sub: NewSubscriber = form.0.try_into().map_err(SubscribeError::ValidationError)?;

    let subscription = save_subscription(store.into_inner(), new_sub)
        .await
        .context("Failed to store the new subscriber")?;

    Ok(HttpResponse::Ok().json(SubscribeBody {
        success: true,
        message: SUBSCRIBE_SUCCESS_MESSAGE,
        subscription,
    }))
}

#[tracing::instrument(name = "Saving new subscriber details in the store", skip(store, new_sub))]
async fn save_subscription(
    store: Arc<SubscriptionStore>,
    new_sub: NewSubscriber,
) -> Result<Subscription, anyhow::Error> {
    let subscription = spawn_blocking_with_tracing(move || store.save(&new_sub.email))
        .await
        .context("Failed to spawn blocking task")??;
    Ok(subscription)
}

/// Turns bodies that are not `{ "email": string }` into the same 400 a bad
/// address gets.
pub fn subscribe_json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!("Rejected malformed subscription body: {}", err);
    SubscribeError::ValidationError(INVALID_EMAIL_MESSAGE.to_string()).into()
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to save your subscription. Please try again later.")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SubscribeError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let SubscribeError::UnexpectedError(e) = self {
            tracing::error!("Subscription failed: {:?}", e);
        }
        let message = self.to_string();
        HttpResponse::build(self.status_code()).json(FailureBody {
            success: false,
            message: &message,
        })
    }
}

#[derive(Serialize)]
struct SubscriptionsBody {
    subscriptions: Vec<Subscription>,
}

#[tracing::instrument(name = "Listing all subscriptions", skip(store))]
#[get("/api/subscriptions")]
pub async fn list_subscriptions(
    store: web::Data<SubscriptionStore>,
) -> Result<HttpResponse, ListSubscriptionsError> {
    let subscriptions = fetch_subscriptions(store.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SubscriptionsBody { subscriptions }))
}

// The store lock can be held by a writer for the length of an fsync, so it is
// never taken on an actix worker thread.
#[tracing::instrument(name = "Fetching subscriptions from the store", skip(store))]
async fn fetch_subscriptions(
    store: Arc<SubscriptionStore>,
) -> Result<Vec<Subscription>, anyhow::Error> {
    let subscriptions = spawn_blocking_with_tracing(move || store.get_all())
        .await
        .context("Failed to spawn blocking task")?
        .context("Failed to read the subscription store")?;
    Ok(subscriptions)
}

#[derive(thiserror::Error)]
pub enum ListSubscriptionsError {
    #[error("Failed to fetch subscriptions.")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for ListSubscriptionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ListSubscriptionsError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        tracing::error!("Listing subscriptions failed: {:?}", self);
        HttpResponse::build(self.status_code()).json(FailureBody {
            success: false,
            message: &self.to_string(),
        })
    }
}
