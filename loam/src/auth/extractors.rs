//! Extractors for accessing the authenticated identity in handlers
//!
//! The auth gate inserts a [`CurrentUser`] into request extensions after a
//! successful session check; handlers receive it with
//! `Authenticated(user): Authenticated`.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use super::CurrentUser;

/// Authenticated-identity extractor for protected handlers
///
/// Only resolves on routes behind the auth gate. Requesting it elsewhere
/// rejects with a redirect to the login page, the same response the gate
/// gives an unauthenticated request.
pub struct Authenticated(pub CurrentUser);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(Self)
            .ok_or(AuthRedirect)
    }
}

/// Rejection that sends the client to the login page
#[derive(Debug)]
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/admin/login").into_response()
    }
}
