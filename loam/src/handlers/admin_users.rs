//! Admin user CRUD
//!
//! Create and edit run the shared pipeline: validate first (short-circuit
//! on failure, re-rendering the form with the error map and entered
//! values), persist only on success, then redirect. The uniqueness rule
//! treats an unchanged email on the edit path as passing.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::template::{render, PageMeta};
use crate::users::{self, Credential, CredentialUpdate, NewCredential, Role};
use crate::validate::{ErrorMap, FieldValues};

#[derive(Template)]
#[template(path = "users_list.html")]
struct UsersListTemplate {
    meta: PageMeta,
    users: Vec<UserRow>,
}

struct UserRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
}

impl From<Credential> for UserRow {
    fn from(credential: Credential) -> Self {
        Self {
            id: credential.id.to_string(),
            first_name: credential.first_name,
            last_name: credential.last_name,
            email: credential.email,
            role: credential.role.to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "user_create.html")]
struct UserCreateTemplate {
    meta: PageMeta,
    errors: ErrorMap,
    form: UserForm,
}

#[derive(Template)]
#[template(path = "user_edit.html")]
struct UserEditTemplate {
    meta: PageMeta,
    errors: ErrorMap,
    id: String,
    form: UserForm,
}

#[derive(Template)]
#[template(path = "user_view.html")]
struct UserViewTemplate {
    meta: PageMeta,
    user: UserRow,
}

/// Admin user form fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserForm {
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

impl UserForm {
    fn values(&self) -> FieldValues {
        FieldValues::new()
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("role", &self.role)
    }

    fn role(&self) -> Result<Role, AppError> {
        Role::parse(&self.role)
            .ok_or_else(|| AppError::Server("role failed revalidation".to_string()))
    }
}

impl From<Credential> for UserForm {
    fn from(credential: Credential) -> Self {
        Self {
            first_name: credential.first_name,
            last_name: credential.last_name,
            email: credential.email,
            role: credential.role.to_string(),
        }
    }
}

/// GET /admin/users
///
/// # Errors
///
/// Returns [`AppError`] if the store read fails.
pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let users = state.users().list().await?;
    Ok(render(&UsersListTemplate {
        meta: state.meta("Users", "Manage users", "admin, users"),
        users: users.into_iter().map(UserRow::from).collect(),
    }))
}

fn create_page(state: &AppState, errors: ErrorMap, form: UserForm) -> Response {
    render(&UserCreateTemplate {
        meta: state.meta("Create a user", "Create a user", "admin, users"),
        errors,
        form,
    })
}

/// GET /admin/users/create
pub async fn create_form(State(state): State<AppState>) -> Response {
    create_page(&state, ErrorMap::new(), UserForm::default())
}

/// POST /admin/users/create
///
/// # Errors
///
/// Returns [`AppError`] if the insert fails.
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    let errors = state
        .validator()
        .validate(&form.values(), &users::user_rules())
        .await;
    if !errors.is_empty() {
        return Ok(create_page(&state, errors, form));
    }

    let role = form.role()?;
    let id = state
        .users()
        .insert(NewCredential {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            // Accounts created here have no password until they register one.
            password_hash: None,
            role,
        })
        .await?;
    tracing::info!(%id, "user created");

    Ok(Redirect::to(&format!("/admin/users/{id}")).into_response())
}

/// GET /admin/users/{id}
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown id.
pub async fn view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let credential = state
        .users()
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    let title = format!("{}, {}", credential.last_name, credential.first_name);
    Ok(render(&UserViewTemplate {
        meta: state.meta(&title, &title, "admin, users"),
        user: UserRow::from(credential),
    }))
}

fn edit_page(state: &AppState, errors: ErrorMap, id: Uuid, form: UserForm) -> Response {
    render(&UserEditTemplate {
        meta: state.meta("Update User", "Update a user", "admin, users"),
        errors,
        id: id.to_string(),
        form,
    })
}

/// GET /admin/users/{id}/edit
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown id.
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let credential = state
        .users()
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(edit_page(&state, ErrorMap::new(), id, UserForm::from(credential)))
}

/// POST /admin/users/{id}/edit
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown id, or [`AppError`] if the
/// update fails.
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    // The record id rides along so the uniqueness rule can pass an
    // unchanged email.
    let values = form.values().record_id(id);
    let errors = state
        .validator()
        .validate(&values, &users::user_rules())
        .await;
    if !errors.is_empty() {
        return Ok(edit_page(&state, errors, id, form));
    }

    let role = form.role()?;
    state
        .users()
        .update(
            id,
            CredentialUpdate {
                first_name: form.first_name,
                last_name: form.last_name,
                email: form.email,
                role,
            },
        )
        .await?;
    tracing::info!(%id, "user updated");

    Ok(Redirect::to(&format!("/admin/users/{id}")).into_response())
}

/// GET /admin/users/{id}/delete
///
/// # Errors
///
/// Returns [`AppError`] if the delete fails.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.users().delete(id).await?;
    tracing::info!(%id, "user deleted");
    Ok(Redirect::to("/admin/users").into_response())
}
