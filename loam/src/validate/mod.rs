//! Data-driven form validation
//!
//! Validation rules are an explicit, ordered list per entity evaluated by a
//! small interpreter, with no reflection and no derive macros. Each field
//! reports at most one message: the first failing rule wins.
//!
//! ```rust,ignore
//! let rules = Ruleset::new()
//!     .field("email", [Rule::Required, Rule::Email, Rule::UniqueEmail])
//!     .field("password", [Rule::Required, Rule::MinLength(12)]);
//!
//! let values = FieldValues::new()
//!     .field("email", "jane@x.com")
//!     .field("password", "correct-horse-battery");
//!
//! let errors = validator.validate(&values, &rules).await;
//! assert!(errors.is_empty());
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;
use validator::ValidateEmail;

use crate::inflection::humanize;
use crate::users::CredentialStore;

/// A single declarative constraint on a form field
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must be present and non-blank
    Required,
    /// Value must look like an email address
    Email,
    /// Value must be at least this many characters long
    MinLength(usize),
    /// Value must equal the named other field
    EqualsField(&'static str),
    /// Value must be one of the listed options
    OneOf(&'static [&'static str]),
    /// Value must not collide with another credential's email
    UniqueEmail,
}

/// A rule bound to a field name
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Form field the rule applies to
    pub field: &'static str,
    /// The constraint
    pub rule: Rule,
}

/// Ordered list of field rules for one entity
#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    rules: Vec<FieldRule>,
}

impl Ruleset {
    /// Create an empty ruleset
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules for a field, evaluated in the given order
    #[must_use]
    pub fn field(mut self, field: &'static str, rules: impl IntoIterator<Item = Rule>) -> Self {
        for rule in rules {
            self.rules.push(FieldRule { field, rule });
        }
        self
    }
}

/// Form input handed to the validator: field values plus the id of the
/// record being edited (absent on the create path).
#[derive(Debug, Clone, Default)]
pub struct FieldValues {
    values: BTreeMap<String, String>,
    record_id: Option<Uuid>,
}

impl FieldValues {
    /// Create an empty value set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field value
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Attach the id of the record being edited (update path); the
    /// uniqueness rule treats an unchanged email as passing.
    #[must_use]
    pub fn record_id(mut self, id: Uuid) -> Self {
        self.record_id = Some(id);
        self
    }

    /// Look up a field value; absent fields read as empty.
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }
}

/// Field-to-message error map; at most one message per field, rebuilt fresh
/// on every validation attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ErrorMap {
    errors: BTreeMap<String, String>,
}

impl ErrorMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field; an existing message wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Whether the field has an error
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Message for a field; empty string when the field is clean. Useful in
    /// templates.
    #[must_use]
    pub fn msg(&self, field: &str) -> &str {
        self.errors.get(field).map_or("", String::as_str)
    }

    /// Whether the map has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with errors
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over `(field, message)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Rule interpreter
///
/// Holds the credential store so the uniqueness rule can run its read-only
/// lookups; everything else is pure.
#[derive(Clone)]
pub struct Validator {
    store: Arc<dyn CredentialStore>,
}

impl Validator {
    /// Create a validator over the given credential store
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Evaluate a ruleset against form input.
    ///
    /// Returns an empty map iff every rule passes. Has no side effects
    /// besides the read-only uniqueness lookups; store read failures fail
    /// the rule closed rather than crashing.
    pub async fn validate(&self, values: &FieldValues, ruleset: &Ruleset) -> ErrorMap {
        let mut errors = ErrorMap::new();
        for FieldRule { field, rule } in &ruleset.rules {
            if errors.has(field) {
                continue;
            }
            if let Some(message) = self.check(field, values, rule).await {
                errors.insert(*field, message);
            }
        }
        errors
    }

    async fn check(&self, field: &str, values: &FieldValues, rule: &Rule) -> Option<String> {
        let value = values.get(field);
        match rule {
            Rule::Required => {
                if value.trim().is_empty() {
                    return Some(format!("{} is required", humanize(field)));
                }
            }
            Rule::Email => {
                if !value.to_owned().validate_email() {
                    return Some(format!(
                        "{} must be a valid email address",
                        humanize(field)
                    ));
                }
            }
            Rule::MinLength(min) => {
                if value.chars().count() < *min {
                    return Some(format!(
                        "{} must be at least {} characters long",
                        humanize(field),
                        min
                    ));
                }
            }
            Rule::EqualsField(other) => {
                if value != values.get(other) {
                    return Some(format!(
                        "{} must match {}",
                        humanize(field),
                        humanize(other)
                    ));
                }
            }
            Rule::OneOf(options) => {
                if !options.iter().any(|option| *option == value) {
                    return Some(format!("{} is invalid", humanize(field)));
                }
            }
            Rule::UniqueEmail => return self.check_unique_email(field, value, values).await,
        }
        None
    }

    /// Uniqueness: on the update path an unchanged email passes; otherwise
    /// the candidate must be absent from the store. Store failures fail
    /// closed with the fallback message.
    async fn check_unique_email(
        &self,
        field: &str,
        value: &str,
        values: &FieldValues,
    ) -> Option<String> {
        if let Some(id) = values.record_id {
            match self.store.email_for_id(id).await {
                Ok(Some(existing)) if existing == value => return None,
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "uniqueness lookup failed");
                    return Some(format!("{} is invalid", humanize(field)));
                }
            }
        }
        match self.store.email_exists(value).await {
            Ok(false) => None,
            Ok(true) => Some(format!("{} is already in use", humanize(field))),
            Err(err) => {
                tracing::warn!(error = %err, "uniqueness lookup failed");
                Some(format!("{} is invalid", humanize(field)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::{MemoryCredentialStore, NewCredential, Role};

    fn validator_with(store: MemoryCredentialStore) -> Validator {
        Validator::new(Arc::new(store))
    }

    fn seeded_store() -> (MemoryCredentialStore, Uuid) {
        let store = MemoryCredentialStore::new();
        let id = store.seed(NewCredential {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "a@x.com".to_string(),
            password_hash: None,
            role: Role::Admin,
        });
        (store, id)
    }

    #[tokio::test]
    async fn empty_map_when_all_rules_pass() {
        let validator = validator_with(MemoryCredentialStore::new());
        let rules = Ruleset::new()
            .field("email", [Rule::Required, Rule::Email])
            .field("password", [Rule::Required, Rule::MinLength(12)]);
        let values = FieldValues::new()
            .field("email", "jane@x.com")
            .field("password", "sufficiently-long");

        let errors = validator.validate(&values, &rules).await;
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn first_failing_rule_wins() {
        let validator = validator_with(MemoryCredentialStore::new());
        let rules = Ruleset::new().field("email", [Rule::Required, Rule::Email]);
        let values = FieldValues::new().field("email", "");

        let errors = validator.validate(&values, &rules).await;
        assert_eq!(errors.msg("email"), "Email is required");
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn message_templates() {
        let validator = validator_with(MemoryCredentialStore::new());
        let rules = Ruleset::new()
            .field("email", [Rule::Email])
            .field("password", [Rule::MinLength(12)])
            .field("confirm_password", [Rule::EqualsField("password")])
            .field("role", [Rule::OneOf(&["admin", "user"])]);
        let values = FieldValues::new()
            .field("email", "not-an-email")
            .field("password", "short")
            .field("confirm_password", "different")
            .field("role", "superuser");

        let errors = validator.validate(&values, &rules).await;
        assert_eq!(errors.msg("email"), "Email must be a valid email address");
        assert_eq!(
            errors.msg("password"),
            "Password must be at least 12 characters long"
        );
        assert_eq!(
            errors.msg("confirm_password"),
            "Confirm Password must match Password"
        );
        assert_eq!(errors.msg("role"), "Role is invalid");
    }

    #[tokio::test]
    async fn validation_is_idempotent() {
        let validator = validator_with(MemoryCredentialStore::new());
        let rules = Ruleset::new().field("email", [Rule::Required, Rule::Email]);
        let values = FieldValues::new().field("email", "nope");

        let first = validator.validate(&values, &rules).await;
        let second = validator.validate(&values, &rules).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unique_email_passes_when_unchanged() {
        let (store, id) = seeded_store();
        let validator = validator_with(store);
        let rules = Ruleset::new().field("email", [Rule::UniqueEmail]);
        let values = FieldValues::new().field("email", "a@x.com").record_id(id);

        let errors = validator.validate(&values, &rules).await;
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn unique_email_rejects_taken_email_on_create() {
        let (store, _) = seeded_store();
        let validator = validator_with(store);
        let rules = Ruleset::new().field("email", [Rule::UniqueEmail]);
        let values = FieldValues::new().field("email", "a@x.com");

        let errors = validator.validate(&values, &rules).await;
        assert_eq!(errors.msg("email"), "Email is already in use");
    }

    #[tokio::test]
    async fn unique_email_rejects_taken_email_on_foreign_update() {
        let (store, _) = seeded_store();
        let other = store.seed(NewCredential {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "b@x.com".to_string(),
            password_hash: None,
            role: Role::User,
        });
        let validator = validator_with(store);
        let rules = Ruleset::new().field("email", [Rule::UniqueEmail]);
        let values = FieldValues::new().field("email", "a@x.com").record_id(other);

        let errors = validator.validate(&values, &rules).await;
        assert_eq!(errors.msg("email"), "Email is already in use");
    }

    #[tokio::test]
    async fn unique_email_allows_fresh_email() {
        let (store, _) = seeded_store();
        let validator = validator_with(store);
        let rules = Ruleset::new().field("email", [Rule::UniqueEmail]);
        let values = FieldValues::new().field("email", "new@x.com");

        let errors = validator.validate(&values, &rules).await;
        assert!(errors.is_empty());
    }

    #[test]
    fn error_map_first_message_wins() {
        let mut errors = ErrorMap::new();
        errors.insert("email", "Email is required");
        errors.insert("email", "Email must be a valid email address");
        assert_eq!(errors.msg("email"), "Email is required");
        assert_eq!(errors.len(), 1);
    }
}
