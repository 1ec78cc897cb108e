//! End-to-end tests over the full router with in-memory backends:
//! registration, login, gate enforcement, logout, and the user CRUD
//! pipeline.

use std::sync::Arc;

use axum::http::{header::COOKIE, HeaderValue, StatusCode};
use axum_test::TestServer;
use parking_lot::Mutex;

use loam::articles::MemoryArticleStore;
use loam::assets::AssetManifest;
use loam::auth::{MemorySessionStore, SessionManager};
use loam::config::AppConfig;
use loam::email::{Email, EmailError, EmailSender};
use loam::state::AppState;
use loam::users::{CredentialStore, MemoryCredentialStore, Role};

/// Mailer double that records instead of sending
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

#[async_trait::async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;
        self.sent.lock().push(email);
        Ok(())
    }
}

struct TestApp {
    server: TestServer,
    users: Arc<MemoryCredentialStore>,
    sessions: SessionManager,
    mailer: Arc<RecordingMailer>,
}

fn test_app() -> TestApp {
    let mut config = AppConfig::default();
    config.session.secure_cookies = false;
    config.email.support_address = "support@example.com".to_string();

    let users = Arc::new(MemoryCredentialStore::new());
    let articles = Arc::new(MemoryArticleStore::new());
    let sessions = SessionManager::new(
        Arc::new(MemorySessionStore::new()),
        config.session.expiry_secs,
    );
    let mailer = Arc::new(RecordingMailer::default());

    let state = AppState::new(
        config,
        users.clone(),
        articles,
        sessions.clone(),
        mailer.clone(),
        AssetManifest::default(),
    );

    TestApp {
        server: TestServer::new(loam::routes::router(state)).expect("test server"),
        users,
        sessions,
        mailer,
    }
}

fn session_cookie_from(response: &axum_test::TestResponse) -> String {
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("response should set a session cookie")
        .to_str()
        .expect("cookie should be ascii")
        .to_string();
    set_cookie
        .split(';')
        .next()
        .expect("cookie should have a name=value part")
        .to_string()
}

const PASSWORD: &str = "a-long-enough-password";

async fn register_jane(app: &TestApp) {
    let response = app
        .server
        .post("/admin/register")
        .form(&[
            ("first_name", "Jane"),
            ("last_name", "Doe"),
            ("email", "jane@x.com"),
            ("password", PASSWORD),
            ("confirm_password", PASSWORD),
        ])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/admin/login");
}

#[tokio::test]
async fn unauthenticated_admin_request_redirects_to_login() {
    let app = test_app();

    let response = app.server.get("/admin/users").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/admin/login");
}

#[tokio::test]
async fn registration_inserts_one_credential_with_verifying_hash() {
    let app = test_app();
    register_jane(&app).await;

    let all = app.users.list().await.unwrap();
    assert_eq!(all.len(), 1);
    let jane = &all[0];
    assert_eq!(jane.email, "jane@x.com");
    assert_eq!(jane.role, Role::User);
    let hash = jane.password_hash.as_deref().expect("hash stored");
    assert!(loam::auth::verify_password(PASSWORD, hash));
}

#[tokio::test]
async fn registration_with_short_password_rerenders_with_errors() {
    let app = test_app();

    let response = app
        .server
        .post("/admin/register")
        .form(&[
            ("first_name", "Jane"),
            ("last_name", "Doe"),
            ("email", "jane@x.com"),
            ("password", "short"),
            ("confirm_password", "different"),
        ])
        .await;

    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("Password must be at least 12 characters long"));
    assert!(body.contains("Confirm Password must match Password"));
    // entered non-secret values are preserved
    assert!(body.contains("jane@x.com"));
    assert!(app.users.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn login_logout_round_trip() {
    let app = test_app();
    register_jane(&app).await;

    let response = app
        .server
        .post("/admin/login")
        .form(&[("email", "jane@x.com"), ("password", PASSWORD)])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/admin/dashboard");
    let cookie = session_cookie_from(&response);

    let dashboard = app
        .server
        .get("/admin/dashboard")
        .add_header(COOKIE, HeaderValue::from_str(&cookie).unwrap())
        .await;
    dashboard.assert_status_ok();
    assert!(dashboard.text().contains("jane@x.com"));

    let logout = app
        .server
        .get("/admin/logout")
        .add_header(COOKIE, HeaderValue::from_str(&cookie).unwrap())
        .await;
    logout.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(logout.headers()["location"], "/admin/login");

    // the old cookie no longer admits
    let after = app
        .server
        .get("/admin/dashboard")
        .add_header(COOKIE, HeaderValue::from_str(&cookie).unwrap())
        .await;
    after.assert_status(StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn login_with_wrong_password_is_a_uniform_denial() {
    let app = test_app();
    register_jane(&app).await;

    let response = app
        .server
        .post("/admin/login")
        .form(&[("email", "jane@x.com"), ("password", "wrong-password")])
        .await;

    response.assert_status_ok();
    assert!(response.headers().get("set-cookie").is_none());
    assert!(response.text().contains("Invalid email or password."));
}

#[tokio::test]
async fn login_with_unknown_email_looks_identical_to_wrong_password() {
    let app = test_app();
    register_jane(&app).await;

    let unknown = app
        .server
        .post("/admin/login")
        .form(&[("email", "nobody@x.com"), ("password", PASSWORD)])
        .await;
    let wrong = app
        .server
        .post("/admin/login")
        .form(&[("email", "jane@x.com"), ("password", "wrong-password")])
        .await;

    unknown.assert_status_ok();
    wrong.assert_status_ok();
    assert!(unknown.text().contains("Invalid email or password."));
    assert!(wrong.text().contains("Invalid email or password."));
}

#[tokio::test]
async fn login_validation_failure_skips_lookup_and_shows_field_errors() {
    let app = test_app();

    let response = app
        .server
        .post("/admin/login")
        .form(&[("email", "not-an-email"), ("password", "")])
        .await;

    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("Email must be a valid email address"));
    assert!(body.contains("Password is required"));
}

#[tokio::test]
async fn admin_user_create_redirects_and_duplicate_email_is_rejected() {
    let app = test_app();
    register_jane(&app).await;

    let login = app
        .server
        .post("/admin/login")
        .form(&[("email", "jane@x.com"), ("password", PASSWORD)])
        .await;
    let cookie = session_cookie_from(&login);
    let cookie_value = HeaderValue::from_str(&cookie).unwrap();

    let created = app
        .server
        .post("/admin/users/create")
        .add_header(COOKIE, cookie_value.clone())
        .form(&[
            ("first_name", "Grace"),
            ("last_name", "Hopper"),
            ("email", "grace@x.com"),
            ("role", "admin"),
        ])
        .await;
    created.assert_status(StatusCode::SEE_OTHER);
    let location = created.headers()["location"].to_str().unwrap().to_string();
    assert!(location.starts_with("/admin/users/"));

    // same email again: uniqueness error, nothing inserted
    let duplicate = app
        .server
        .post("/admin/users/create")
        .add_header(COOKIE, cookie_value)
        .form(&[
            ("first_name", "Grace"),
            ("last_name", "Hopper"),
            ("email", "grace@x.com"),
            ("role", "admin"),
        ])
        .await;
    duplicate.assert_status_ok();
    assert!(duplicate.text().contains("Email is already in use"));
    assert_eq!(app.users.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn admin_edit_keeping_own_email_passes_uniqueness() {
    let app = test_app();
    register_jane(&app).await;

    let login = app
        .server
        .post("/admin/login")
        .form(&[("email", "jane@x.com"), ("password", PASSWORD)])
        .await;
    let cookie = HeaderValue::from_str(&session_cookie_from(&login)).unwrap();

    let jane_id = app.users.list().await.unwrap()[0].id;
    let response = app
        .server
        .post(&format!("/admin/users/{jane_id}/edit"))
        .add_header(COOKIE, cookie)
        .form(&[
            ("first_name", "Janet"),
            ("last_name", "Doe"),
            ("email", "jane@x.com"),
            ("role", "admin"),
        ])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    let updated = app.users.find_by_id(jane_id).await.unwrap().unwrap();
    assert_eq!(updated.first_name, "Janet");
    assert_eq!(updated.role, Role::Admin);
}

#[tokio::test]
async fn gate_session_ttl_is_extended_by_requests() {
    let app = test_app();
    let token = app.sessions.create("jane@x.com").await.unwrap();
    let before = app.sessions.load(&token).await.unwrap().expires_at;

    tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    let response = app
        .server
        .get("/admin/dashboard")
        .add_header(
            COOKIE,
            HeaderValue::from_str(&format!("loam_session={token}")).unwrap(),
        )
        .await;
    response.assert_status_ok();

    let after = app.sessions.load(&token).await.unwrap().expires_at;
    assert!(after > before);
}

#[tokio::test]
async fn contact_form_dispatches_to_support_address() {
    let app = test_app();

    let response = app
        .server
        .post("/contact")
        .form(&[
            ("subject", "General Contact"),
            ("name", "Visitor"),
            ("email", "visitor@x.com"),
            ("body", "Hello there"),
        ])
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("Thanks for your message"));

    let sent = app.mailer.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["support@example.com".to_string()]);
    assert_eq!(sent[0].reply_to.as_deref(), Some("visitor@x.com"));
}

#[tokio::test]
async fn contact_form_validation_blocks_dispatch() {
    let app = test_app();

    let response = app
        .server
        .post("/contact")
        .form(&[
            ("subject", "General Contact"),
            ("name", ""),
            ("email", "not-an-email"),
            ("body", ""),
        ])
        .await;

    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("Name is required"));
    assert!(body.contains("Email must be a valid email address"));
    assert!(body.contains("Body is required"));
    assert!(app.mailer.sent.lock().is_empty());
}
