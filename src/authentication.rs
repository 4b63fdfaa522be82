//! Placeholder user accounts.
//!
//! Nothing in the HTTP surface reads or writes users yet; the store exists so a
//! future admin area has somewhere to start from.

use std::collections::BTreeMap;
use std::sync::Mutex;

use secrecy::Secret;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("The username {0} is already taken")]
    UsernameTaken(String),
    #[error("The user store was poisoned by a panicking writer")]
    Poisoned,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: Secret<String>,
}

pub struct NewUser {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(Debug)]
pub struct UserStore {
    users: Mutex<UserState>,
}

#[derive(Debug)]
struct UserState {
    by_id: BTreeMap<u64, User>,
    next_id: u64,
}

impl Default for UserStore {
    fn default() -> Self {
        Self {
            users: Mutex::new(UserState {
                by_id: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl UserStore {
    pub fn get_user(&self, id: u64) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().map_err(|_| AuthError::Poisoned)?;
        Ok(users.by_id.get(&id).cloned())
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().map_err(|_| AuthError::Poisoned)?;
        Ok(users
            .by_id
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    #[tracing::instrument(name = "Create a user", skip(self, new_user), fields(username = %new_user.username))]
    pub fn create_user(&self, new_user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.lock().map_err(|_| AuthError::Poisoned)?;
        if users.by_id.values().any(|u| u.username == new_user.username) {
            return Err(AuthError::UsernameTaken(new_user.username));
        }

        let user = User {
            id: users.next_id,
            username: new_user.username,
            password: new_user.password,
        };
        users.next_id += 1;
        users.by_id.insert(user.id, user.clone());
        Ok(user)
    }
}
