//! User identity records and their validation rulesets

pub mod store;

pub use store::{CredentialStore, MemoryCredentialStore, PgCredentialStore};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validate::{Rule, Ruleset};

/// Role assigned to a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to the admin area
    Admin,
    /// Regular account
    User,
}

impl Role {
    /// Text form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Parse the stored text form
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role option values accepted by the admin user forms
pub const ROLE_OPTIONS: &[&str] = &["admin", "user"];

/// Stored identity record
///
/// `password_hash` is `None` for accounts created through the admin area or
/// the API; such accounts cannot log in until they register a password.
/// The hash is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct Credential {
    /// Primary key
    pub id: Uuid,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Unique email address (exact-match comparison)
    pub email: String,
    /// Argon2id password hash, when the account has one
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Assigned role
    pub role: Role,
}

/// Fields for inserting a new credential
#[derive(Debug, Clone)]
pub struct NewCredential {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Password hash; `None` for accounts created without a password
    pub password_hash: Option<String>,
    /// Assigned role
    pub role: Role,
}

/// Fields the profile-update flow may change (the password is not among
/// them)
#[derive(Debug, Clone)]
pub struct CredentialUpdate {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Assigned role
    pub role: Role,
}

/// Rules for the login form
#[must_use]
pub fn login_rules() -> Ruleset {
    Ruleset::new()
        .field("email", [Rule::Required, Rule::Email])
        .field("password", [Rule::Required])
}

/// Rules for self-registration
#[must_use]
pub fn registration_rules() -> Ruleset {
    Ruleset::new()
        .field("first_name", [Rule::Required])
        .field("last_name", [Rule::Required])
        .field("email", [Rule::Required, Rule::Email, Rule::UniqueEmail])
        .field("password", [Rule::Required, Rule::MinLength(12)])
        .field(
            "confirm_password",
            [Rule::Required, Rule::EqualsField("password")],
        )
}

/// Rules for the admin create/update user forms
#[must_use]
pub fn user_rules() -> Ruleset {
    Ruleset::new()
        .field("first_name", [Rule::Required])
        .field("last_name", [Rule::Required])
        .field("email", [Rule::Required, Rule::Email, Rule::UniqueEmail])
        .field("role", [Rule::Required, Rule::OneOf(ROLE_OPTIONS)])
}
