//! Public pages and the JSON API over in-memory backends

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use uuid::Uuid;

use loam::articles::{Article, ArticleKind, MemoryArticleStore};
use loam::assets::AssetManifest;
use loam::auth::{MemorySessionStore, SessionManager};
use loam::config::AppConfig;
use loam::email::ConsoleBackend;
use loam::state::AppState;
use loam::users::{CredentialStore, MemoryCredentialStore};

fn article(kind: ArticleKind, slug: &str, title: &str, body: &str) -> Article {
    Article {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: title.to_string(),
        description: Some(format!("About {title}")),
        keywords: None,
        body: Some(body.to_string()),
        published: Some(Utc::now()),
        format: Some("markdown".to_string()),
        kind,
    }
}

struct TestApp {
    server: TestServer,
    users: Arc<MemoryCredentialStore>,
}

fn test_app() -> TestApp {
    let mut config = AppConfig::default();
    config.session.secure_cookies = false;

    let users = Arc::new(MemoryCredentialStore::new());
    let articles = Arc::new(MemoryArticleStore::new());
    articles.seed(article(
        ArticleKind::Post,
        "first-post",
        "First Post",
        "# Welcome\n\nSome *markdown* content.",
    ));
    articles.seed(article(
        ArticleKind::Game,
        "space-runner",
        "Space Runner",
        "A little browser game.",
    ));
    articles.seed(article(
        ArticleKind::Tool,
        "hash-check",
        "Hash Check",
        "A small utility.",
    ));

    let sessions = SessionManager::new(
        Arc::new(MemorySessionStore::new()),
        config.session.expiry_secs,
    );
    let state = AppState::new(
        config,
        users.clone(),
        articles,
        sessions,
        Arc::new(ConsoleBackend::new()),
        AssetManifest::default(),
    );

    TestApp {
        server: TestServer::new(loam::routes::router(state)).expect("test server"),
        users,
    }
}

#[tokio::test]
async fn home_page_renders() {
    let app = test_app();
    let response = app.server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("Things and Stuff"));
}

#[tokio::test]
async fn article_listing_shows_only_posts() {
    let app = test_app();
    let response = app.server.get("/articles").await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("First Post"));
    assert!(!body.contains("Space Runner"));
}

#[tokio::test]
async fn article_detail_renders_markdown() {
    let app = test_app();
    let response = app.server.get("/articles/first-post").await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("<h1>Welcome</h1>"));
    assert!(body.contains("<em>markdown</em>"));
}

#[tokio::test]
async fn unknown_slug_is_404() {
    let app = test_app();
    let response = app.server.get("/articles/no-such-article").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn games_and_tools_listings_filter_by_kind() {
    let app = test_app();

    let games = app.server.get("/games").await;
    games.assert_status_ok();
    assert!(games.text().contains("Space Runner"));
    assert!(!games.text().contains("First Post"));

    let tools = app.server.get("/tools").await;
    tools.assert_status_ok();
    assert!(tools.text().contains("Hash Check"));
}

#[tokio::test]
async fn api_creates_lists_and_fetches_users() {
    let app = test_app();

    let created = app
        .server
        .post("/api/v1/users")
        .json(&serde_json::json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@x.com",
            "role": "user",
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let id = created.json::<serde_json::Value>()["id"]
        .as_str()
        .expect("id in response")
        .to_string();

    let listed = app.server.get("/api/v1/users").await;
    listed.assert_status_ok();
    let body = listed.text();
    assert!(body.contains("jane@x.com"));
    assert!(!body.contains("password_hash"));

    let fetched = app.server.get(&format!("/api/v1/users/{id}")).await;
    fetched.assert_status_ok();
    assert!(fetched.text().contains("jane@x.com"));

    let missing = app
        .server
        .get(&format!("/api/v1/users/{}", Uuid::new_v4()))
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_create_returns_field_errors_as_json() {
    let app = test_app();

    let response = app
        .server
        .post("/api/v1/users")
        .json(&serde_json::json!({
            "first_name": "",
            "last_name": "Doe",
            "email": "nope",
            "role": "root",
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let errors = response.json::<serde_json::Value>();
    assert_eq!(errors["first_name"], "First Name is required");
    assert_eq!(errors["email"], "Email must be a valid email address");
    assert_eq!(errors["role"], "Role is invalid");
    assert!(app.users.list().await.unwrap().is_empty());
}
