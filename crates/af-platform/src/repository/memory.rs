//! In-Memory Repositories
//!
//! Map-backed implementations of the persistence ports, used by the
//! integration tests and by `AF_STORE=memory` local development mode.
//! The refresh-token store keeps the same staged-write/commit semantics
//! as the MongoDB store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::{NewUser, RefreshTokenRecord, UserAccount};
use crate::error::{AuthError, Result};
use crate::repository::refresh_token::PendingWrite;
use crate::repository::{RefreshTokenStore, UserDirectory};
use crate::service::PasswordService;

/// In-memory refresh-token store keyed by user id.
#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    live: Mutex<HashMap<String, RefreshTokenRecord>>,
    pending: Mutex<Vec<PendingWrite>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed records. Exposed so tests can assert the
    /// one-record-per-user invariant.
    pub fn record_count(&self) -> usize {
        self.live.lock().expect("store poisoned").len()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<RefreshTokenRecord>> {
        Ok(self
            .live
            .lock()
            .expect("store poisoned")
            .get(user_id)
            .cloned())
    }

    async fn find_by_token(&self, code: &str) -> Result<Option<RefreshTokenRecord>> {
        Ok(self
            .live
            .lock()
            .expect("store poisoned")
            .values()
            .find(|r| r.code == code)
            .cloned())
    }

    async fn upsert(&self, user_id: &str, code: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.pending
            .lock()
            .expect("store poisoned")
            .push(PendingWrite::Upsert(RefreshTokenRecord::new(
                user_id, code, expires_at,
            )));
        Ok(())
    }

    async fn delete(&self, record: &RefreshTokenRecord) -> Result<()> {
        self.pending
            .lock()
            .expect("store poisoned")
            .push(PendingWrite::Delete {
                user_id: record.user_id.clone(),
            });
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let writes: Vec<PendingWrite> = {
            let mut pending = self.pending.lock().expect("store poisoned");
            pending.drain(..).collect()
        };
        let mut live = self.live.lock().expect("store poisoned");
        for write in writes {
            match write {
                PendingWrite::Upsert(record) => {
                    live.insert(record.user_id.clone(), record);
                }
                PendingWrite::Delete { user_id } => {
                    live.remove(&user_id);
                }
            }
        }
        Ok(())
    }
}

/// In-memory user directory with argon2 password verification.
pub struct InMemoryUserDirectory {
    users: Mutex<Vec<UserAccount>>,
    passwords: Arc<PasswordService>,
}

impl InMemoryUserDirectory {
    pub fn new(passwords: Arc<PasswordService>) -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            passwords,
        }
    }

    /// Insert a pre-built account, bypassing hashing. Test seam.
    pub fn insert_account(&self, user: UserAccount) {
        self.users.lock().expect("directory poisoned").push(user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        Ok(self
            .users
            .lock()
            .expect("directory poisoned")
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserAccount>> {
        Ok(self
            .users
            .lock()
            .expect("directory poisoned")
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_name(&self, user_name: &str) -> Result<Option<UserAccount>> {
        Ok(self
            .users
            .lock()
            .expect("directory poisoned")
            .iter()
            .find(|u| u.user_name == user_name)
            .cloned())
    }

    async fn verify_password(&self, user: &UserAccount, password: &str) -> Result<bool> {
        Ok(self.passwords.verify_password(password, &user.password_hash))
    }

    async fn roles(&self, user: &UserAccount) -> Result<Vec<String>> {
        Ok(user.roles.clone())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserAccount> {
        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(AuthError::duplicate_user("email", &new_user.email));
        }
        if self.find_by_name(&new_user.user_name).await?.is_some() {
            return Err(AuthError::duplicate_user("userName", &new_user.user_name));
        }

        let password_hash = self.passwords.hash_password(&new_user.password)?;
        let mut user = UserAccount::new(new_user.user_name, new_user.email, password_hash);
        user.city = new_user.city;
        user.birth_date = new_user.birth_date;

        self.users
            .lock()
            .expect("directory poisoned")
            .push(user.clone());
        Ok(user)
    }

    async fn assign_roles(&self, user_name: &str, roles: &[String]) -> Result<UserAccount> {
        let mut users = self.users.lock().expect("directory poisoned");
        let user = users
            .iter_mut()
            .find(|u| u.user_name == user_name)
            .ok_or(AuthError::UserNotFound)?;

        for role in roles {
            user.assign_role(role.clone());
        }
        Ok(user.clone())
    }
}
