//! Error types and error handling
//!
//! Library errors are typed; the [`axum::response::IntoResponse`] boundary
//! maps them to generic status responses. Backend error detail (SQL text,
//! Redis errors) is logged and never reaches a response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Persistence errors shared by the credential and article stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found
    #[error("record not found")]
    NotFound,

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data could not be interpreted
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server-side failure with no better classification
    #[error("server error: {0}")]
    Server(String),

    /// Store error
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Session error
    #[error("session error: {0}")]
    Session(#[from] crate::auth::SessionError),

    /// Template rendering failed
    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    /// Email dispatch failed
    #[error("email error: {0}")]
    Email(#[from] crate::email::EmailError),

    /// Resource not found (404)
    #[error("not found")]
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound | Self::Store(StoreError::NotFound) => {
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
