//! Session storage backends
//!
//! The store owns expiry: an expired record is as good as absent. The
//! in-memory backend keeps a min-heap of expiry times and purges
//! opportunistically on writes; the Redis backend delegates expiry to the
//! server via `SET` with `EX`.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_redis::{Config as RedisConfig, Pool, Runtime};
use parking_lot::Mutex;
use redis::AsyncCommands;

use super::session::{SessionError, SessionRecord, SessionToken};

/// Raw session persistence; the sliding-TTL policy lives in
/// [`super::SessionManager`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the record for a token; `None` when absent or expired
    async fn get(&self, token: &SessionToken) -> Result<Option<SessionRecord>, SessionError>;

    /// Write the record, replacing any previous one, with expiry taken from
    /// `record.expires_at`
    async fn put(&self, token: &SessionToken, record: &SessionRecord) -> Result<(), SessionError>;

    /// Remove the record; removing a missing record is not an error
    async fn delete(&self, token: &SessionToken) -> Result<(), SessionError>;
}

#[derive(Default)]
struct MemoryInner {
    sessions: HashMap<String, SessionRecord>,
    expiry_queue: BinaryHeap<Reverse<(DateTime<Utc>, String)>>,
}

impl MemoryInner {
    fn purge_expired(&mut self, now: DateTime<Utc>) {
        while let Some(Reverse((expiry, _))) = self.expiry_queue.peek() {
            if *expiry > now {
                break;
            }
            let Some(Reverse((_, token))) = self.expiry_queue.pop() else {
                break;
            };
            // Only drop the session if it was not renewed since this heap
            // entry was pushed.
            if self
                .sessions
                .get(&token)
                .is_some_and(SessionRecord::is_expired)
            {
                self.sessions.remove(&token);
            }
        }
    }
}

/// In-process session store for development and tests
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<MemoryInner>,
}

impl MemorySessionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, token: &SessionToken) -> Result<Option<SessionRecord>, SessionError> {
        let mut inner = self.inner.lock();
        match inner.sessions.get(token.as_str()) {
            Some(record) if record.is_expired() => {
                inner.sessions.remove(token.as_str());
                Ok(None)
            }
            Some(record) => Ok(Some(record.clone())),
            None => Ok(None),
        }
    }

    async fn put(&self, token: &SessionToken, record: &SessionRecord) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.purge_expired(Utc::now());
        inner
            .sessions
            .insert(token.as_str().to_string(), record.clone());
        inner
            .expiry_queue
            .push(Reverse((record.expires_at, token.as_str().to_string())));
        Ok(())
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), SessionError> {
        self.inner.lock().sessions.remove(token.as_str());
        Ok(())
    }
}

/// Redis-backed session store for deployments
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: Pool,
}

impl RedisSessionStore {
    /// Create a store over an existing connection pool
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Build a pool from a Redis URL.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Backend`] if the pool cannot be created.
    pub fn connect(url: &str) -> Result<Self, SessionError> {
        let pool = RedisConfig::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| SessionError::Backend(e.to_string()))?;
        Ok(Self::new(pool))
    }

    fn key(token: &SessionToken) -> String {
        format!("session:{token}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, token: &SessionToken) -> Result<Option<SessionRecord>, SessionError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;
        let raw: Option<String> = conn
            .get(Self::key(token))
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, token: &SessionToken, record: &SessionRecord) -> Result<(), SessionError> {
        let ttl = record.remaining_secs();
        if ttl == 0 {
            return self.delete(token).await;
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;
        let json = serde_json::to_string(record)?;
        let _: () = conn
            .set_ex(Self::key(token), json, ttl)
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), SessionError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;
        let _: () = conn
            .del(Self::key(token))
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemorySessionStore::new();
        let token = SessionToken::generate();
        let record = SessionRecord::new("jane@x.com", Duration::hours(1));

        store.put(&token, &record).await.unwrap();
        let loaded = store.get(&token).await.unwrap().expect("session missing");
        assert_eq!(loaded.user_email, "jane@x.com");

        store.delete(&token).await.unwrap();
        assert!(store.get(&token).await.unwrap().is_none());
        // deleting again is fine
        store.delete(&token).await.unwrap();
    }

    #[tokio::test]
    async fn expired_record_reads_as_absent() {
        let store = MemorySessionStore::new();
        let token = SessionToken::generate();
        let record = SessionRecord::new("jane@x.com", Duration::seconds(-1));

        store.put(&token, &record).await.unwrap();
        assert!(store.get(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_keeps_renewed_sessions() {
        let store = MemorySessionStore::new();
        let token = SessionToken::generate();

        let mut record = SessionRecord::new("jane@x.com", Duration::seconds(-1));
        store.put(&token, &record).await.unwrap();

        // Renewal writes a fresh expiry; the stale heap entry must not
        // evict the live record.
        record.touch(Duration::hours(1));
        store.put(&token, &record).await.unwrap();

        let another = SessionToken::generate();
        store
            .put(&another, &SessionRecord::new("x@x.com", Duration::hours(1)))
            .await
            .unwrap();

        assert!(store.get(&token).await.unwrap().is_some());
    }
}
