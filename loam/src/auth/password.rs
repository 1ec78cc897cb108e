//! Password hashing and verification using Argon2id
//!
//! Argon2id with a per-hash random salt, PHC string output, and
//! constant-time verification. Parameters follow OWASP server-side
//! recommendations and can be tuned via [`PasswordHashConfig`].

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use thiserror::Error;

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing failed
    #[error("failed to hash password: {0}")]
    HashingFailed(String),

    /// Parameters rejected by Argon2
    #[error("invalid Argon2 parameters: {0}")]
    InvalidParams(String),
}

/// Argon2id cost parameters
#[derive(Debug, Clone)]
pub struct PasswordHashConfig {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Number of iterations
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
    /// Output hash length in bytes
    pub output_length: usize,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // ~19 MiB, OWASP recommended minimum
            iterations: 2,
            parallelism: 1,
            output_length: 32,
        }
    }
}

/// Password hasher over Argon2id
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    config: PasswordHashConfig,
}

impl PasswordHasher {
    /// Create a hasher with default parameters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher with custom parameters
    #[must_use]
    pub const fn with_config(config: PasswordHashConfig) -> Self {
        Self { config }
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured parameters are invalid or the
    /// hashing operation itself fails.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let params = Params::new(
            self.config.memory_cost,
            self.config.iterations,
            self.config.parallelism,
            Some(self.config.output_length),
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// Constant-time comparison. Returns `false` rather than an error for a
    /// mismatch or a malformed hash; parse failures are logged and treated
    /// as non-matches.
    #[must_use]
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(error = %err, "malformed password hash");
                return false;
            }
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Hash a password with default parameters.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    PasswordHasher::default().hash(password)
}

/// Verify a password against a hash with default parameters.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHasher::default().verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hasher = PasswordHasher::new();
        let password = "correct-horse-battery-staple";

        let hash = hasher.hash(password).expect("hashing failed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn malformed_hash_verifies_false_without_error() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify("password", "not-a-phc-string"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn same_password_hashes_differently() {
        let hasher = PasswordHasher::new();
        let password = "same-password";

        let first = hasher.hash(password).expect("hashing failed");
        let second = hasher.hash(password).expect("hashing failed");
        assert_ne!(first, second);
        assert!(hasher.verify(password, &first));
        assert!(hasher.verify(password, &second));
    }

    #[test]
    fn convenience_functions() {
        let hash = hash_password("my-secret-password").expect("hashing failed");
        assert!(verify_password("my-secret-password", &hash));
        assert!(!verify_password("other", &hash));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let hasher = PasswordHasher::with_config(PasswordHashConfig {
            memory_cost: 1,
            iterations: 0,
            parallelism: 1,
            output_length: 32,
        });
        assert!(matches!(
            hasher.hash("pw"),
            Err(PasswordError::InvalidParams(_))
        ));
    }
}
