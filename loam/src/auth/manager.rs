//! Session lifecycle with sliding expiry
//!
//! Failure semantics are fail-closed: any store problem during `load` or
//! `renew` reports as [`SessionError::NotFound`], so an infrastructure
//! failure can never admit a request.

use std::sync::Arc;

use chrono::Duration;

use super::session::{SessionError, SessionRecord, SessionToken};
use super::store::SessionStore;

/// Creates, loads, renews, and invalidates session records
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a manager over a store with the configured sliding TTL.
    /// The TTL is read from configuration once at startup.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, ttl_secs: u64) -> Self {
        let secs = i64::try_from(ttl_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        Self {
            store,
            ttl: Duration::seconds(secs),
        }
    }

    /// The configured TTL in seconds (also the cookie Max-Age)
    #[must_use]
    pub fn ttl_secs(&self) -> u64 {
        u64::try_from(self.ttl.num_seconds()).unwrap_or(0)
    }

    /// Open an authenticated session for a user, returning the opaque token
    /// the caller must deliver to the client.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error; the caller treats a failed
    /// create as a failed login.
    pub async fn create(&self, user_email: &str) -> Result<SessionToken, SessionError> {
        let token = SessionToken::generate();
        let record = SessionRecord::new(user_email, self.ttl);
        self.store.put(&token, &record).await?;
        Ok(token)
    }

    /// Fetch the record for a token without renewing it.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] for a missing or expired session, and for
    /// any store failure (fail closed).
    pub async fn load(&self, token: &SessionToken) -> Result<SessionRecord, SessionError> {
        match self.store.get(token).await {
            Ok(Some(record)) if !record.is_expired() => Ok(record),
            Ok(_) => Err(SessionError::NotFound),
            Err(err) => {
                tracing::warn!(error = %err, "session store read failed, treating as unauthenticated");
                Err(SessionError::NotFound)
            }
        }
    }

    /// Extend a live session's expiry to the full TTL from now. Invoked by
    /// the auth gate on every authenticated request.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] if the session is missing, expired, or
    /// the store write fails.
    pub async fn renew(&self, token: &SessionToken) -> Result<(), SessionError> {
        let mut record = self.load(token).await?;
        record.touch(self.ttl);
        self.store.put(token, &record).await.map_err(|err| {
            tracing::warn!(error = %err, "session renewal write failed");
            SessionError::NotFound
        })
    }

    /// Destroy a session. Idempotent: invalidating an absent session
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error when the delete itself fails.
    pub async fn invalidate(&self, token: &SessionToken) -> Result<(), SessionError> {
        self.store.delete(token).await
    }
}
