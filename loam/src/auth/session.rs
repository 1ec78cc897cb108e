//! Session tokens and records

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session token delivered to the client via cookie
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a new random token
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse a token from its string form, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidToken`] if the string is not a UUID.
    pub fn try_from_string(s: String) -> Result<Self, SessionError> {
        Uuid::parse_str(&s)
            .map(|_| Self(s))
            .map_err(|_| SessionError::InvalidToken)
    }

    /// The token as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SessionToken {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_string(s.to_string())
    }
}

/// Server-side session state, owned by the session store; the application
/// re-fetches it by token on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Whether the session belongs to an authenticated user
    pub authenticated: bool,
    /// Email of the session's user
    pub user_email: String,
    /// When this session was created
    pub created_at: DateTime<Utc>,
    /// When this session expires; renewal pushes this forward
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create an authenticated record expiring `ttl` from now
    #[must_use]
    pub fn new(user_email: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            authenticated: true,
            user_email: user_email.into(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Whether the record has outlived its expiry
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Extend the expiry to `ttl` from now (sliding-session renewal)
    pub fn touch(&mut self, ttl: Duration) {
        self.expires_at = Utc::now() + ttl;
    }

    /// Seconds until expiry; zero when already expired
    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        let remaining = self.expires_at - Utc::now();
        u64::try_from(remaining.num_seconds()).unwrap_or(0)
    }
}

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Token is not in the expected format
    #[error("invalid session token")]
    InvalidToken,

    /// No live session for the token (also covers store failures, which are
    /// reported as not-found to fail closed)
    #[error("session not found")]
    NotFound,

    /// Record could not be serialized or deserialized
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing store failed
    #[error("session store error: {0}")]
    Backend(String),
}
