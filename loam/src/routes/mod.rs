//! Router assembly
//!
//! Three route groups mirror the site structure: the public site, the JSON
//! API, and the admin area. Admin routes sit behind the auth gate except
//! for login, logout, and registration.

use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::handlers as auth_handlers;
use crate::handlers::{admin_articles, admin_users, contact, dashboard, pages};
use crate::middleware::{AuthGateLayer, GateConfig};
use crate::state::AppState;

/// Build the application router over the given state
#[must_use]
pub fn router(state: AppState) -> Router {
    let gate = AuthGateLayer::with_config(
        state.sessions().clone(),
        GateConfig {
            login_path: "/admin/login".to_string(),
            cookie_name: state.config().session.cookie_name.clone(),
        },
    );

    let admin = Router::new()
        .route("/admin/dashboard", get(dashboard::dashboard))
        .route("/admin/users", get(admin_users::list))
        .route(
            "/admin/users/create",
            get(admin_users::create_form).post(admin_users::create),
        )
        .route("/admin/users/{id}", get(admin_users::view))
        .route(
            "/admin/users/{id}/edit",
            get(admin_users::edit_form).post(admin_users::edit),
        )
        .route("/admin/users/{id}/delete", get(admin_users::delete))
        .route("/admin/articles", get(admin_articles::list))
        .route(
            "/admin/articles/create",
            get(admin_articles::create_form).post(admin_articles::create),
        )
        .route("/admin/articles/{id}", get(admin_articles::view))
        .route(
            "/admin/articles/{id}/edit",
            get(admin_articles::edit_form).post(admin_articles::edit),
        )
        .route("/admin/articles/{id}/delete", get(admin_articles::delete))
        .layer(gate);

    let api = Router::new()
        .route("/api/v1/users", get(api::list_users).post(api::create_user))
        .route("/api/v1/users/{id}", get(api::get_user));

    Router::new()
        .route("/", get(pages::home))
        .route("/articles", get(pages::list_articles))
        .route("/articles/{slug}", get(pages::view_article))
        .route("/games", get(pages::list_games))
        .route("/games/{slug}", get(pages::view_game))
        .route("/tools", get(pages::list_tools))
        .route("/tools/{slug}", get(pages::view_tool))
        .route(
            "/contact",
            get(contact::contact_form).post(contact::submit),
        )
        .route(
            "/admin/login",
            get(auth_handlers::login_form).post(auth_handlers::login),
        )
        .route("/admin/logout", get(auth_handlers::logout))
        .route(
            "/admin/register",
            get(auth_handlers::register_form).post(auth_handlers::register),
        )
        .merge(admin)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state)
}
