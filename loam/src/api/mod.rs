//! JSON API, `/api/v1`
//!
//! Mirrors the admin user operations for programmatic clients. Responses
//! serialize [`Credential`] directly; the password hash is never included.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::users::{self, Credential, NewCredential};
use crate::validate::{ErrorMap, FieldValues};

/// Request body for creating a user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Role (`admin` or `user`)
    #[serde(default)]
    pub role: String,
}

/// Response body for a created user
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    /// Generated id
    pub id: Uuid,
}

/// GET /api/v1/users
///
/// # Errors
///
/// Returns [`AppError`] if the store read fails.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Credential>>, AppError> {
    Ok(Json(state.users().list().await?))
}

/// GET /api/v1/users/{id}
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown id.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Credential>, AppError> {
    let credential = state
        .users()
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(credential))
}

/// POST /api/v1/users
///
/// Validation failures return 422 with the field-to-message map as JSON.
///
/// # Errors
///
/// Returns [`AppError`] if the insert fails.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Response, AppError> {
    let values = FieldValues::new()
        .field("first_name", &request.first_name)
        .field("last_name", &request.last_name)
        .field("email", &request.email)
        .field("role", &request.role);
    let errors = state
        .validator()
        .validate(&values, &users::user_rules())
        .await;
    if !errors.is_empty() {
        return Ok(validation_failure(&errors));
    }

    let role = users::Role::parse(&request.role)
        .ok_or_else(|| AppError::Server("role failed revalidation".to_string()))?;
    let id = state
        .users()
        .insert(NewCredential {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password_hash: None,
            role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedUserResponse { id })).into_response())
}

fn validation_failure(errors: &ErrorMap) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(errors.clone())).into_response()
}
