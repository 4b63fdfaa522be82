use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::domain::{SubscriberEmail, Subscription};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Failed to access the subscription file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("The subscription file {} does not hold a valid subscription list", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("No ids are left to assign after {last_id}")]
    IdsExhausted { last_id: u64 },
    #[error("Failed to persist the subscription list")]
    Persist(#[source] std::io::Error),
    #[error("The subscription store was poisoned by a panicking writer")]
    Poisoned,
}

/// Durable, deduplicated collection of [`Subscription`]s.
///
/// Every record lives in memory and the full set is rewritten to a single JSON
/// file whenever a new address arrives. Writers are serialized by a mutex held
/// across the whole check-assign-persist sequence, so two requests for the same
/// new address can never race to different ids.
#[derive(Debug)]
pub struct SubscriptionStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    // insertion order, which is also the order written to disk
    subscriptions: Vec<Subscription>,
    // email -> position in `subscriptions`
    index: HashMap<String, usize>,
    // next id to hand out, always greater than every id issued so far
    next_id: u64,
}

impl SubscriptionStore {
    /// Loads every record from `path`, creating the file with an empty list
    /// when it does not exist yet.
    #[instrument(name = "Opening the subscription store")]
    pub fn open(path: &Path) -> Result<SubscriptionStore, StoreError> {
        if !path.exists() {
            info!("subscription file not found, initializing an empty one");
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            write_atomically(path, &[]).map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let data = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let subscriptions: Vec<Subscription> =
            serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;

        let mut state = StoreState {
            next_id: 1,
            ..StoreState::default()
        };
        for sub in subscriptions {
            let following = sub
                .id
                .checked_add(1)
                .ok_or(StoreError::IdsExhausted { last_id: sub.id })?;
            state.next_id = state.next_id.max(following);
            // the first record for an address wins, later copies are dropped
            if state.index.contains_key(&sub.email) {
                debug!(email = %sub.email, id = sub.id, "skipping duplicate record in subscription file");
                continue;
            }
            state.index.insert(sub.email.clone(), state.subscriptions.len());
            state.subscriptions.push(sub);
        }
        info!(
            records = state.subscriptions.len(),
            next_id = state.next_id,
            "subscription store loaded"
        );

        Ok(SubscriptionStore {
            path: path.to_path_buf(),
            state: Mutex::new(state),
        })
    }

    /// Stores `email` and returns its record.
    ///
    /// An address that is already present is returned unchanged. A new address
    /// gets the next id and the current time, and the whole set is written to
    /// disk before returning. If that write fails the record is dropped again
    /// and [`StoreError::Persist`] is returned.
    #[instrument(name = "Saving a subscription", skip(self, email), fields(email = %email))]
    pub fn save(&self, email: &SubscriberEmail) -> Result<Subscription, StoreError> {
        let mut state = self.lock()?;

        if let Some(&position) = state.index.get(email.as_ref()) {
            debug!("address already subscribed");
            return Ok(state.subscriptions[position].clone());
        }

        let next_id = state
            .next_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted { last_id: state.next_id - 1 })?;
        let subscription = Subscription {
            id: state.next_id,
            email: email.as_ref().to_owned(),
            created_at: Utc::now(),
        };
        state.subscriptions.push(subscription.clone());

        if let Err(e) = self.persist(&state.subscriptions) {
            state.subscriptions.pop();
            return Err(StoreError::Persist(e));
        }

        let position = state.subscriptions.len() - 1;
        state.index.insert(subscription.email.clone(), position);
        state.next_id = next_id;
        info!(id = subscription.id, "new subscription saved");

        Ok(subscription)
    }

    /// Returns the record for an exact (case-sensitive) email match.
    pub fn get_by_email(&self, email: &str) -> Result<Option<Subscription>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .index
            .get(email)
            .map(|&position| state.subscriptions[position].clone()))
    }

    /// Returns every record in insertion order.
    pub fn get_all(&self) -> Result<Vec<Subscription>, StoreError> {
        Ok(self.lock()?.subscriptions.clone())
    }

    /// Rewrites the durable file from the in-memory set.
    #[instrument(name = "Flushing the subscription store", skip(self))]
    pub fn flush(&self) -> Result<(), StoreError> {
        let state = self.lock()?;
        self.persist(&state.subscriptions)
            .map_err(StoreError::Persist)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }

    fn persist(&self, subscriptions: &[Subscription]) -> std::io::Result<()> {
        write_atomically(&self.path, subscriptions).map_err(|e| {
            tracing::error!("Failed to write subscription file: {:?}", e);
            e
        })
    }
}

// Writes to a sibling temp file first and renames it over `path`, so readers
// never observe a half-written list.
fn write_atomically(path: &Path, subscriptions: &[Subscription]) -> std::io::Result<()> {
    let json = serde_json::to_vec_pretty(subscriptions)?;
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(&json)?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)
}
