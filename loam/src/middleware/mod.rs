//! Middleware layers
//!
//! - Auth gate: session-checked route protection with sliding renewal

pub mod auth;

pub use auth::{
    clear_session_cookie, session_cookie, token_from_headers, AuthGate, AuthGateLayer, GateConfig,
};
