//! Session token storage with expiry tracking.
//!
//! The store owns the single- or dual-token pair for the process. Absolute
//! expiry timestamps are persisted next to the token so they survive a
//! restart, and every expiry check reads the clock at call time.
//!
//! All accessors are side-effect free except `try_get_valid_token` and
//! `refresh_token`, which may hit the network. Concurrent refreshes are
//! collapsed into one call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use gatehouse_domain::{SessionConfig, TokenInfo, TokenMode, expiry_after, token_preview};
use parking_lot::{Mutex, RwLock};
use tracing::Instrument;
use uuid::Uuid;

use super::UserStore;
use crate::ports::{AuthApi, Clock, KeyValueStore};
use crate::{ApplicationError, ApplicationResult};

const TOKEN_KEY: &str = "token";
const ACCESS_EXPIRE_KEY: &str = "accessTokenExpireTime";
const REFRESH_EXPIRE_KEY: &str = "refreshTokenExpireTime";

#[derive(Debug, Clone)]
struct SessionTokens {
    info: TokenInfo,
    access_expires_at: Option<DateTime<Utc>>,
    refresh_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct StorageKeys {
    token: String,
    access_expire: String,
    refresh_expire: String,
}

/// Process-wide owner of the session token.
pub struct TokenStore {
    mode: TokenMode,
    keys: StorageKeys,
    expiring_buffer: Duration,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    api: Arc<dyn AuthApi>,
    users: Arc<UserStore>,
    state: RwLock<Option<SessionTokens>>,
    /// Bumped on every logout.
    epoch: AtomicU64,
    refresh_lock: tokio::sync::Mutex<()>,
    completed_refreshes: AtomicU64,
    last_refresh: Mutex<Option<ApplicationResult<()>>>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("mode", &self.mode)
            .field("has_session", &self.has_session())
            .field("epoch", &self.session_epoch())
            .finish_non_exhaustive()
    }
}

impl TokenStore {
    /// Creates an empty store. Call `restore` to load persisted state.
    #[must_use]
    pub fn new(
        config: &SessionConfig,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        api: Arc<dyn AuthApi>,
        users: Arc<UserStore>,
    ) -> Self {
        let buffer = i64::try_from(config.expiring_buffer_secs).unwrap_or(i64::MAX);
        Self {
            mode: config.token_mode,
            keys: StorageKeys {
                token: config.storage_key(TOKEN_KEY),
                access_expire: config.storage_key(ACCESS_EXPIRE_KEY),
                refresh_expire: config.storage_key(REFRESH_EXPIRE_KEY),
            },
            expiring_buffer: Duration::try_seconds(buffer).unwrap_or(Duration::MAX),
            storage,
            clock,
            api,
            users,
            state: RwLock::new(None),
            epoch: AtomicU64::new(0),
            refresh_lock: tokio::sync::Mutex::new(()),
            completed_refreshes: AtomicU64::new(0),
            last_refresh: Mutex::new(None),
        }
    }

    /// Token mode fixed by configuration.
    #[must_use]
    pub const fn mode(&self) -> TokenMode {
        self.mode
    }

    /// Counter that moves on every logout.
    #[must_use]
    pub fn session_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Returns true if any token is held, expired or not.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.state.read().is_some()
    }

    /// Loads persisted token state.
    ///
    /// A token without an expiry key is kept but reads as expired. A token
    /// whose shape does not match the configured mode is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    pub async fn restore(&self) -> ApplicationResult<()> {
        let Some(raw) = self.storage.get(&self.keys.token).await? else {
            *self.state.write() = None;
            return Ok(());
        };

        let info = match serde_json::from_str::<TokenInfo>(&raw) {
            Ok(info) if info.mode() == self.mode => info,
            Ok(info) => {
                tracing::warn!(
                    stored = %info.mode(),
                    configured = %self.mode,
                    "Discarding persisted token of the wrong mode"
                );
                self.clear_persisted().await?;
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted token");
                self.clear_persisted().await?;
                return Ok(());
            }
        };

        let access_expires_at = self.read_expiry(&self.keys.access_expire).await?;
        let refresh_expires_at = match self.mode {
            TokenMode::Single => None,
            TokenMode::Double => self.read_expiry(&self.keys.refresh_expire).await?,
        };

        tracing::debug!(token = %token_preview(info.bearer()), "Restored session token");
        *self.state.write() = Some(SessionTokens {
            info,
            access_expires_at,
            refresh_expires_at,
        });
        Ok(())
    }

    /// Stores a freshly issued token and persists its absolute expiry.
    ///
    /// Must be called after every successful login or refresh. In-memory
    /// state only changes once persisting succeeded.
    ///
    /// # Errors
    ///
    /// Returns `Domain(TokenModeMismatch)` for a token of the wrong mode, or
    /// a storage error.
    pub async fn set_token_info(&self, info: TokenInfo) -> ApplicationResult<()> {
        info.ensure_mode(self.mode)?;

        let now = self.clock.now();
        let access_expires_at = expiry_after(now, info.bearer_ttl_secs());
        let refresh_expires_at = info.refresh_ttl_secs().map(|ttl| expiry_after(now, ttl));

        let encoded = serde_json::to_string(&info)?;
        self.storage.set(&self.keys.token, &encoded).await?;
        self.storage
            .set(
                &self.keys.access_expire,
                &access_expires_at.timestamp_millis().to_string(),
            )
            .await?;
        match refresh_expires_at {
            Some(at) => {
                self.storage
                    .set(&self.keys.refresh_expire, &at.timestamp_millis().to_string())
                    .await?;
            }
            None => self.storage.remove(&self.keys.refresh_expire).await?,
        }

        tracing::info!(
            token = %token_preview(info.bearer()),
            expires_at = %access_expires_at,
            "Session token stored"
        );
        *self.state.write() = Some(SessionTokens {
            info,
            access_expires_at: Some(access_expires_at),
            refresh_expires_at,
        });
        Ok(())
    }

    /// Returns true if there is no token, no recorded expiry, or `now >= expiry`.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        let now = self.clock.now();
        self.state
            .read()
            .as_ref()
            .is_none_or(|tokens| tokens.access_expires_at.is_none_or(|at| now >= at))
    }

    /// Returns true if the refresh token is unusable.
    ///
    /// Always true in single-token mode.
    #[must_use]
    pub fn is_refresh_token_expired(&self) -> bool {
        if self.mode == TokenMode::Single {
            return true;
        }
        let now = self.clock.now();
        self.state
            .read()
            .as_ref()
            .is_none_or(|tokens| tokens.refresh_expires_at.is_none_or(|at| now >= at))
    }

    /// Returns the bearer credential if it has not expired. Never refreshes.
    #[must_use]
    pub fn get_valid_token(&self) -> Option<String> {
        if self.is_token_expired() {
            return None;
        }
        self.state
            .read()
            .as_ref()
            .map(|tokens| tokens.info.bearer().to_string())
    }

    /// Like `get_valid_token`, but refreshes first when the access token
    /// expired and a live refresh token is available.
    ///
    /// A failed refresh is logged and yields `None`; the caller decides
    /// whether to force a logout.
    pub async fn try_get_valid_token(&self) -> Option<String> {
        if self.is_token_expired()
            && self.mode == TokenMode::Double
            && !self.is_refresh_token_expired()
        {
            if let Err(e) = self.refresh_token().await {
                tracing::warn!(error = %e, "Token refresh failed");
            }
        }
        self.get_valid_token()
    }

    /// Exchanges the refresh token for a new pair.
    ///
    /// Callers arriving while a refresh is in flight wait for it and share
    /// its result instead of issuing their own call. On failure the stored
    /// token is left untouched.
    ///
    /// # Errors
    ///
    /// - `UnsupportedOperation` in single-token mode
    /// - `AuthExpired` if there is no live refresh token
    /// - the raw cause of a failed network call
    pub async fn refresh_token(&self) -> ApplicationResult<()> {
        if self.mode == TokenMode::Single {
            return Err(ApplicationError::UnsupportedOperation(
                "token refresh in single-token mode",
            ));
        }

        let observed = self.completed_refreshes.load(Ordering::Acquire);
        let _flight = self.refresh_lock.lock().await;
        if self.completed_refreshes.load(Ordering::Acquire) != observed {
            tracing::debug!("Joining result of concurrent token refresh");
            return self.last_refresh.lock().clone().unwrap_or(Ok(()));
        }

        let result = self.refresh_locked().await;
        *self.last_refresh.lock() = Some(result.clone());
        self.completed_refreshes.fetch_add(1, Ordering::AcqRel);
        result
    }

    async fn refresh_locked(&self) -> ApplicationResult<()> {
        if self.is_refresh_token_expired() {
            return Err(ApplicationError::AuthExpired);
        }
        let refresh_token = self
            .state
            .read()
            .as_ref()
            .and_then(|tokens| tokens.info.refresh_token().map(String::from))
            .ok_or(ApplicationError::AuthExpired)?;

        tracing::debug!(refresh_token = %token_preview(&refresh_token), "Refreshing session token");
        let request_id = Uuid::now_v7();
        let info = self
            .api
            .refresh(&refresh_token)
            .instrument(tracing::debug_span!("refresh", %request_id))
            .await?;
        self.set_token_info(info).await
    }

    /// Clears the token, its persisted expiry keys and the user profile.
    ///
    /// Safe to call any number of times.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted state cannot be removed. In-memory
    /// token and user state are cleared regardless, and the user profile is
    /// removed even when the token keys cannot be.
    pub async fn logout(&self) -> ApplicationResult<()> {
        let had_session = self.state.write().take().is_some();
        self.epoch.fetch_add(1, Ordering::AcqRel);

        let tokens_cleared = self.clear_persisted().await;
        let user_cleared = self.users.clear().await;
        if let Err(e) = &tokens_cleared {
            tracing::warn!(error = %e, "Failed to remove persisted token");
        }
        tokens_cleared?;
        user_cleared?;

        if had_session {
            tracing::info!("Session cleared");
        }
        Ok(())
    }

    /// Token status for display.
    #[must_use]
    pub fn status(&self) -> TokenStatus {
        let now = self.clock.now();
        let can_refresh = !self.is_refresh_token_expired();
        let state = self.state.read();
        let Some(tokens) = state.as_ref() else {
            return TokenStatus::NotAuthenticated;
        };
        match tokens.access_expires_at {
            None => TokenStatus::Expired { can_refresh },
            Some(at) if now >= at => TokenStatus::Expired { can_refresh },
            Some(at)
                if now
                    .checked_add_signed(self.expiring_buffer)
                    .is_none_or(|horizon| horizon >= at) =>
            {
                TokenStatus::Expiring {
                    seconds_remaining: (at - now).num_seconds(),
                    can_refresh,
                }
            }
            Some(at) => TokenStatus::Valid {
                seconds_remaining: (at - now).num_seconds(),
            },
        }
    }

    async fn read_expiry(&self, key: &str) -> ApplicationResult<Option<DateTime<Utc>>> {
        let raw = self.storage.get(key).await?;
        Ok(raw
            .and_then(|value| value.trim().parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis))
    }

    async fn clear_persisted(&self) -> ApplicationResult<()> {
        self.storage
            .remove_all(&[
                &self.keys.token,
                &self.keys.access_expire,
                &self.keys.refresh_expire,
            ])
            .await?;
        Ok(())
    }
}

/// Status of the session token for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// No token is held.
    NotAuthenticated,
    /// Token is valid and not expiring soon.
    Valid {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
    /// Token is valid but will expire soon.
    Expiring {
        /// Seconds until expiry.
        seconds_remaining: i64,
        /// Whether a refresh is possible.
        can_refresh: bool,
    },
    /// Token has expired.
    Expired {
        /// Whether a refresh is possible.
        can_refresh: bool,
    },
}

impl TokenStatus {
    /// Returns true if the token is still usable.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. } | Self::Expiring { .. })
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Not signed in".to_string(),
            Self::Valid { seconds_remaining } => {
                let secs = *seconds_remaining;
                if secs > 3600 {
                    format!("Signed in, valid for {} hours", secs / 3600)
                } else if secs > 60 {
                    format!("Signed in, valid for {} minutes", secs / 60)
                } else {
                    format!("Signed in, valid for {secs} seconds")
                }
            }
            Self::Expiring {
                seconds_remaining,
                can_refresh,
            } => {
                let hint = if *can_refresh { " (will refresh)" } else { "" };
                format!("Session expiring in {seconds_remaining} seconds{hint}")
            }
            Self::Expired { can_refresh: true } => "Session expired (can refresh)".to_string(),
            Self::Expired { can_refresh: false } => "Session expired".to_string(),
        }
    }
}
