//! Request handlers
//!
//! Public pages render articles by kind; the admin handlers behind the auth
//! gate share the validation-to-persistence pipeline: build field values,
//! run the ruleset, re-render with the error map on failure, persist and
//! redirect on success.

pub mod admin_articles;
pub mod admin_users;
pub mod contact;
pub mod dashboard;
pub mod pages;
