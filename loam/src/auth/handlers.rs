//! Login, logout, and self-registration handlers
//!
//! The login POST gives one uniform answer, "Invalid email or password.",
//! for an unknown email, a wrong password, and a store failure, so the
//! response never reveals whether an email is registered. Validation
//! failures re-render the form with per-field messages and the entered
//! email; the password is never echoed back.

use askama::Template;
use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::{clear_session_cookie, session_cookie, token_from_headers};
use crate::state::AppState;
use crate::template::{render, PageMeta};
use crate::users::{self, NewCredential, Role};
use crate::validate::{ErrorMap, FieldValues};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    meta: PageMeta,
    errors: ErrorMap,
    email: String,
    failed: bool,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    meta: PageMeta,
    errors: ErrorMap,
    form: RegisterForm,
}

/// Login form fields
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Password
    #[serde(default)]
    pub password: String,
}

/// Registration form fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Password (minimum 12 characters)
    #[serde(default)]
    pub password: String,
    /// Password confirmation
    #[serde(default)]
    pub confirm_password: String,
}

fn login_page(state: &AppState, errors: ErrorMap, email: String, failed: bool) -> Response {
    render(&LoginTemplate {
        meta: state.meta("Login", "Login", "login"),
        errors,
        email,
        failed,
    })
}

/// GET /admin/login
pub async fn login_form(State(state): State<AppState>) -> Response {
    login_page(&state, ErrorMap::new(), String::new(), false)
}

/// POST /admin/login
///
/// # Errors
///
/// Returns [`AppError`] only for response-assembly failures; authentication
/// problems render the uniform denial instead.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let values = FieldValues::new()
        .field("email", &form.email)
        .field("password", &form.password);
    let errors = state
        .validator()
        .validate(&values, &users::login_rules())
        .await;
    if !errors.is_empty() {
        return Ok(login_page(&state, errors, form.email, false));
    }

    // Unknown email, wrong password, and store failure all take the same
    // denial path: the response must not leak which one happened.
    let credential = match state.users().find_by_email(&form.email).await {
        Ok(Some(credential)) => credential,
        Ok(None) => {
            return Ok(login_page(&state, ErrorMap::new(), form.email, true));
        }
        Err(err) => {
            tracing::warn!(error = %err, "credential lookup failed during login");
            return Ok(login_page(&state, ErrorMap::new(), form.email, true));
        }
    };

    let verified = credential
        .password_hash
        .as_deref()
        .is_some_and(|hash| state.hasher().verify(&form.password, hash));
    if !verified {
        return Ok(login_page(&state, ErrorMap::new(), form.email, true));
    }

    let token = match state.sessions().create(&credential.email).await {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!(error = %err, "session create failed during login");
            return Ok(login_page(&state, ErrorMap::new(), form.email, true));
        }
    };
    tracing::info!(email = %credential.email, "login succeeded");

    let cookie = session_cookie(
        &state.config().session.cookie_name,
        &token,
        state.sessions().ttl_secs(),
        state.config().session.secure_cookies,
    );
    let mut response = Redirect::to("/admin/dashboard").into_response();
    response.headers_mut().append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| AppError::Server("invalid session cookie".to_string()))?,
    );
    Ok(response)
}

/// GET /admin/logout
///
/// Invalidating an absent or already-dead session is fine; the client is
/// sent to the login page either way.
pub async fn logout(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = token_from_headers(&headers, &state.config().session.cookie_name) {
        if let Err(err) = state.sessions().invalidate(&token).await {
            tracing::warn!(error = %err, "session invalidation failed during logout");
        }
    }

    let mut response = Redirect::to("/admin/login").into_response();
    response.headers_mut().append(
        SET_COOKIE,
        clear_session_cookie(&state.config().session.cookie_name)
            .parse()
            .map_err(|_| AppError::Server("invalid session cookie".to_string()))?,
    );
    Ok(response)
}

fn register_page(state: &AppState, errors: ErrorMap, form: RegisterForm) -> Response {
    render(&RegisterTemplate {
        meta: state.meta(
            "Register your account",
            "Register your account",
            "registration",
        ),
        errors,
        form,
    })
}

/// GET /admin/register
pub async fn register_form(State(state): State<AppState>) -> Response {
    register_page(&state, ErrorMap::new(), RegisterForm::default())
}

/// POST /admin/register
///
/// # Errors
///
/// Returns [`AppError`] if hashing or the insert fails.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let values = FieldValues::new()
        .field("first_name", &form.first_name)
        .field("last_name", &form.last_name)
        .field("email", &form.email)
        .field("password", &form.password)
        .field("confirm_password", &form.confirm_password);
    let errors = state
        .validator()
        .validate(&values, &users::registration_rules())
        .await;
    if !errors.is_empty() {
        return Ok(register_page(&state, errors, form));
    }

    let password_hash = state
        .hasher()
        .hash(&form.password)
        .map_err(|err| AppError::Server(err.to_string()))?;

    let id = state
        .users()
        .insert(NewCredential {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            password_hash: Some(password_hash),
            role: Role::User,
        })
        .await?;
    tracing::info!(%id, "user registered");

    Ok(Redirect::to("/admin/login").into_response())
}
