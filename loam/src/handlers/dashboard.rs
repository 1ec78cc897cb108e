//! Admin dashboard

use askama::Template;
use axum::{extract::State, response::Response};

use crate::auth::Authenticated;
use crate::state::AppState;
use crate::template::{render, PageMeta};

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    meta: PageMeta,
    user_email: String,
}

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
) -> Response {
    render(&DashboardTemplate {
        meta: state.meta("Dashboard", "Admin dashboard", "admin"),
        user_email: user.email,
    })
}
