//! loam: a server-rendered personal website with an admin back office
//!
//! Public pages (home, articles, games, tools, contact) plus an
//! authenticated admin area for CRUD on users and articles, backed by
//! PostgreSQL and a cookie-session store (Redis or in-memory).
//!
//! The core of the application is the session-based authentication stack:
//!
//! - [`auth::PasswordHasher`]: Argon2id hashing and verification
//! - [`validate::Validator`]: data-driven form validation producing a
//!   field to message error map
//! - [`auth::SessionManager`]: opaque-token sessions with sliding expiry
//! - [`middleware::AuthGateLayer`]: route protection that renews the
//!   session and forwards the identity to handlers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use loam::config::AppConfig;
//! use loam::state::AppState;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     loam::observability::init()?;
//!
//!     let config = AppConfig::load()?;
//!     let state = AppState::from_config(config.clone()).await?;
//!     let app = loam::routes::router(state);
//!
//!     let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod articles;
pub mod assets;
pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod handlers;
pub mod inflection;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod state;
pub mod template;
pub mod users;
pub mod validate;

pub mod prelude {
    //! Convenience re-exports for common types

    pub use crate::auth::{
        Authenticated, CurrentUser, PasswordHasher, SessionManager, SessionRecord, SessionToken,
    };
    pub use crate::config::AppConfig;
    pub use crate::error::{AppError, StoreError};
    pub use crate::middleware::AuthGateLayer;
    pub use crate::state::AppState;
    pub use crate::validate::{ErrorMap, FieldValues, Rule, Ruleset, Validator};
}
