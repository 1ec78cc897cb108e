//! Auth gate middleware for protecting admin routes
//!
//! Wraps a protected subtree as a tower layer. Per request:
//!
//! 1. Extract the session token from the cookie; absent or unparsable
//!    tokens deny the request.
//! 2. Load the session; a missing, expired, or unreadable session denies.
//! 3. A session without the authenticated flag denies.
//! 4. Otherwise the session is renewed for the full TTL; if renewal fails
//!    the request is denied rather than proceeding on a stale session. On
//!    success the identity is forwarded to the handler through request
//!    extensions.
//!
//! Denial redirects browsers to the login page; HTMX requests get a 401
//! with an `HX-Redirect` header instead.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::Request,
    http::{header::COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tower::{Layer, Service};

use crate::auth::{CurrentUser, SessionManager, SessionToken};

/// Auth gate settings
#[derive(Clone, Debug)]
pub struct GateConfig {
    /// Where denied requests are sent
    pub login_path: String,
    /// Name of the session cookie
    pub cookie_name: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: "/admin/login".to_string(),
            cookie_name: "loam_session".to_string(),
        }
    }
}

/// Layer applying the auth gate to a protected subtree
///
/// The session manager is an explicit dependency injected at construction;
/// there is no ambient store handle.
#[derive(Clone)]
pub struct AuthGateLayer {
    sessions: SessionManager,
    config: Arc<GateConfig>,
}

impl AuthGateLayer {
    /// Create a gate over the given session manager with default paths
    #[must_use]
    pub fn new(sessions: SessionManager) -> Self {
        Self {
            sessions,
            config: Arc::new(GateConfig::default()),
        }
    }

    /// Create a gate with custom settings
    #[must_use]
    pub fn with_config(sessions: SessionManager, config: GateConfig) -> Self {
        Self {
            sessions,
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for AuthGateLayer {
    type Service = AuthGate<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGate {
            inner,
            sessions: self.sessions.clone(),
            config: self.config.clone(),
        }
    }
}

/// Middleware service enforcing session validity before a protected
/// handler runs
#[derive(Clone)]
pub struct AuthGate<S> {
    inner: S,
    sessions: SessionManager,
    config: Arc<GateConfig>,
}

impl<S> Service<Request> for AuthGate<S>
where
    S: Service<Request, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let sessions = self.sessions.clone();
        let config = self.config.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let is_htmx = req
                .headers()
                .get("HX-Request")
                .and_then(|v| v.to_str().ok())
                == Some("true");

            let Some(token) = token_from_headers(req.headers(), &config.cookie_name) else {
                return Ok(deny(is_htmx, &config.login_path));
            };

            let record = match sessions.load(&token).await {
                Ok(record) => record,
                Err(_) => return Ok(deny(is_htmx, &config.login_path)),
            };

            if !record.authenticated {
                tracing::debug!("session present but not authenticated, denying");
                return Ok(deny(is_htmx, &config.login_path));
            }

            if sessions.renew(&token).await.is_err() {
                return Ok(deny(is_htmx, &config.login_path));
            }

            req.extensions_mut().insert(CurrentUser {
                email: record.user_email.clone(),
            });
            req.extensions_mut().insert(token);

            inner.call(req).await
        })
    }
}

fn deny(is_htmx: bool, login_path: &str) -> Response {
    if is_htmx {
        // HTMX cannot follow a 303 usefully; tell it to navigate instead.
        (
            StatusCode::UNAUTHORIZED,
            [("HX-Redirect", login_path)],
            "Unauthorized",
        )
            .into_response()
    } else {
        Redirect::to(login_path).into_response()
    }
}

/// Extract the session token from a request's cookie header
#[must_use]
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<SessionToken> {
    let cookie_header = headers.get(COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=') {
            if name.trim() == cookie_name {
                return value.trim().parse().ok();
            }
        }
    }

    None
}

/// Build the `Set-Cookie` value that delivers a session token
#[must_use]
pub fn session_cookie(
    cookie_name: &str,
    token: &SessionToken,
    max_age_secs: u64,
    secure: bool,
) -> String {
    let mut cookie = format!(
        "{cookie_name}={token}; Path=/; Max-Age={max_age_secs}; SameSite=Lax; HttpOnly"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that clears the session cookie
#[must_use]
pub fn clear_session_cookie(cookie_name: &str) -> String {
    format!("{cookie_name}=; Path=/; Max-Age=0; SameSite=Lax; HttpOnly")
}
