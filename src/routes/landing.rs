use actix_web::{error::ErrorInternalServerError, get, http::header::ContentType, HttpResponse};
use chrono::{Datelike, Utc};

use crate::domain::email_rule;

const LANDING_PAGE: &str = include_str!("../../static/index.html");

/// Renders the landing page. The signup script receives the server's own
/// address rule, so both sides reject the same inputs.
pub fn render_landing_page() -> Result<String, serde_json::Error> {
    let rule = serde_json::to_string(&email_rule())?;
    Ok(LANDING_PAGE
        .replace("{{year}}", &Utc::now().year().to_string())
        .replace("{{email_rule}}", &rule))
}

#[get("/")]
pub async fn landing_page() -> Result<HttpResponse, actix_web::Error> {
    let body = render_landing_page().map_err(|e| {
        tracing::error!("Failed to render the landing page: {:?}", e);
        ErrorInternalServerError("Failed to render the page.")
    })?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}
