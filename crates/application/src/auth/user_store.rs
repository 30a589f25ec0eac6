//! Signed-in user profile.

use std::sync::Arc;

use gatehouse_domain::{SessionConfig, UserInfo};
use parking_lot::RwLock;

use crate::ApplicationResult;
use crate::ports::KeyValueStore;

const USER_INFO_KEY: &str = "user_info";

/// Holds the current `UserInfo`, persisted as JSON.
///
/// Independent of the token store; both are cleared together on logout.
pub struct UserStore {
    key: String,
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<Option<UserInfo>>,
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("key", &self.key)
            .field("user", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl UserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: &SessionConfig, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            key: config.storage_key(USER_INFO_KEY),
            storage,
            state: RwLock::new(None),
        }
    }

    /// Current user, if signed in.
    #[must_use]
    pub fn user(&self) -> Option<UserInfo> {
        self.state.read().clone()
    }

    /// Replaces the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be persisted.
    pub async fn set_user(&self, user: UserInfo) -> ApplicationResult<()> {
        let encoded = serde_json::to_string(&user)?;
        self.storage.set(&self.key, &encoded).await?;
        tracing::debug!(user_id = %user.user_id, "User profile stored");
        *self.state.write() = Some(user);
        Ok(())
    }

    /// Clears the profile. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted profile cannot be removed.
    pub async fn clear(&self) -> ApplicationResult<()> {
        self.state.write().take();
        self.storage.remove(&self.key).await?;
        Ok(())
    }

    /// Loads the persisted profile. An unreadable profile is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn restore(&self) -> ApplicationResult<()> {
        let user = match self.storage.get(&self.key).await? {
            Some(raw) => match serde_json::from_str::<UserInfo>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable user profile");
                    self.storage.remove(&self.key).await?;
                    None
                }
            },
            None => None,
        };
        *self.state.write() = user;
        Ok(())
    }
}
