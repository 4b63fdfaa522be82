mod health_check;
mod landing;
mod subscriptions;

pub use health_check::*;
pub use landing::*;
pub use subscriptions::*;

use serde::Serialize;

/// Body returned whenever a request fails.
#[derive(Serialize)]
pub struct FailureBody<'a> {
    pub success: bool,
    pub message: &'a str,
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
