//! Application state
//!
//! Every collaborator (stores, session manager, hasher, mailer) is an
//! explicit dependency injected at construction time. There is no global
//! mutable state; handlers receive an [`AppState`] clone through axum's
//! `State` extractor.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::articles::{ArticleStore, PgArticleStore};
use crate::assets::AssetManifest;
use crate::auth::{MemorySessionStore, PasswordHasher, RedisSessionStore, SessionManager};
use crate::config::{AppConfig, EmailBackend, SessionBackend};
use crate::email::{ConsoleBackend, EmailSender, SmtpBackend};
use crate::template::PageMeta;
use crate::users::CredentialStore;
use crate::users::PgCredentialStore;
use crate::validate::Validator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    users: Arc<dyn CredentialStore>,
    articles: Arc<dyn ArticleStore>,
    sessions: SessionManager,
    hasher: PasswordHasher,
    mailer: Arc<dyn EmailSender>,
    assets: Arc<AssetManifest>,
}

impl AppState {
    /// Assemble state from explicit collaborators. Tests use this with the
    /// in-memory stores.
    #[must_use]
    pub fn new(
        config: AppConfig,
        users: Arc<dyn CredentialStore>,
        articles: Arc<dyn ArticleStore>,
        sessions: SessionManager,
        mailer: Arc<dyn EmailSender>,
        assets: AssetManifest,
    ) -> Self {
        Self {
            config: Arc::new(config),
            users,
            articles,
            sessions,
            hasher: PasswordHasher::new(),
            mailer,
            assets: Arc::new(assets),
        }
    }

    /// Build production state from configuration: connect PostgreSQL, run
    /// migrations, and wire the configured session and email backends.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable, migrations fail, or
    /// a backend cannot be constructed.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database.url)
            .await
            .context("failed to connect to PostgreSQL")?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .context("failed to run database migrations")?;

        let sessions = match config.session.backend {
            SessionBackend::Memory => {
                tracing::info!("using in-memory session store");
                SessionManager::new(
                    Arc::new(MemorySessionStore::new()),
                    config.session.expiry_secs,
                )
            }
            SessionBackend::Redis => {
                let store = RedisSessionStore::connect(&config.session.redis_url)
                    .context("failed to create Redis session pool")?;
                SessionManager::new(Arc::new(store), config.session.expiry_secs)
            }
        };

        let mailer: Arc<dyn EmailSender> = match config.email.backend {
            EmailBackend::Console => Arc::new(ConsoleBackend::new()),
            EmailBackend::Smtp => Arc::new(
                SmtpBackend::new(config.email.smtp.clone())
                    .context("failed to configure SMTP backend")?,
            ),
        };

        let assets = AssetManifest::load(&config.assets.manifest_dir);

        Ok(Self::new(
            config,
            Arc::new(PgCredentialStore::new(pool.clone())),
            Arc::new(PgArticleStore::new(pool)),
            sessions,
            mailer,
            assets,
        ))
    }

    /// Application configuration
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Credential store
    #[must_use]
    pub fn users(&self) -> &Arc<dyn CredentialStore> {
        &self.users
    }

    /// Article store
    #[must_use]
    pub fn articles(&self) -> &Arc<dyn ArticleStore> {
        &self.articles
    }

    /// Session manager
    #[must_use]
    pub const fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Password hasher
    #[must_use]
    pub const fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Email backend
    #[must_use]
    pub fn mailer(&self) -> &Arc<dyn EmailSender> {
        &self.mailer
    }

    /// A validator over the credential store
    #[must_use]
    pub fn validator(&self) -> Validator {
        Validator::new(self.users.clone())
    }

    /// Head-section data for a page, carrying the asset fingerprints
    #[must_use]
    pub fn meta(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        keywords: impl Into<String>,
    ) -> PageMeta {
        PageMeta {
            title: title.into(),
            description: description.into(),
            keywords: keywords.into(),
            css_bust: self.assets.css.clone(),
            js_bust: self.assets.js.clone(),
        }
    }
}
