use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A collected address. Created once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: u64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
