//! Article persistence

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Article, ArticleKind, NewArticle};
use crate::error::StoreError;

/// Lookup and mutation interface for articles
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// List every article
    async fn list(&self) -> Result<Vec<Article>, StoreError>;

    /// List articles of one kind
    async fn list_by_kind(&self, kind: ArticleKind) -> Result<Vec<Article>, StoreError>;

    /// Find an article by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError>;

    /// Find an article by slug
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, StoreError>;

    /// Insert a new article, returning its generated id
    async fn insert(&self, new: NewArticle) -> Result<Uuid, StoreError>;

    /// Replace an article's mutable fields
    async fn update(&self, article: &Article) -> Result<(), StoreError>;

    /// Delete an article
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: Uuid,
    slug: String,
    title: String,
    description: Option<String>,
    keywords: Option<String>,
    body: Option<String>,
    published: Option<chrono::DateTime<chrono::Utc>>,
    format: Option<String>,
    kind: String,
}

impl TryFrom<ArticleRow> for Article {
    type Error = StoreError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let kind = ArticleKind::parse(&row.kind)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown article kind {:?}", row.kind)))?;
        Ok(Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            keywords: row.keywords,
            body: row.body,
            published: row.published,
            format: row.format,
            kind,
        })
    }
}

/// PostgreSQL-backed article store
#[derive(Clone)]
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    /// Create a store over an existing connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            "SELECT id, slug, title, description, keywords, body, published, format, kind \
             FROM articles ORDER BY title",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Article::try_from).collect()
    }

    async fn list_by_kind(&self, kind: ArticleKind) -> Result<Vec<Article>, StoreError> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            "SELECT id, slug, title, description, keywords, body, published, format, kind \
             FROM articles WHERE kind = $1 ORDER BY published DESC NULLS LAST, title",
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Article::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        let row = sqlx::query_as::<_, ArticleRow>(
            "SELECT id, slug, title, description, keywords, body, published, format, kind \
             FROM articles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Article::try_from).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, StoreError> {
        let row = sqlx::query_as::<_, ArticleRow>(
            "SELECT id, slug, title, description, keywords, body, published, format, kind \
             FROM articles WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Article::try_from).transpose()
    }

    async fn insert(&self, new: NewArticle) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO articles (id, title, slug) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&new.title)
            .bind(&new.slug)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn update(&self, article: &Article) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE articles \
             SET title = $1, slug = $2, description = $3, keywords = $4, body = $5, \
                 published = $6, format = $7, kind = $8 \
             WHERE id = $9",
        )
        .bind(&article.title)
        .bind(&article.slug)
        .bind(&article.description)
        .bind(&article.keywords)
        .bind(&article.body)
        .bind(article.published)
        .bind(&article.format)
        .bind(article.kind.as_str())
        .bind(article.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-memory article store for tests and single-process development
#[derive(Default)]
pub struct MemoryArticleStore {
    records: RwLock<HashMap<Uuid, Article>>,
}

impl MemoryArticleStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronously insert a full article. Test convenience.
    pub fn seed(&self, article: Article) -> Uuid {
        let id = article.id;
        self.records.write().insert(id, article);
        id
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        let mut all: Vec<Article> = self.records.read().values().cloned().collect();
        all.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(all)
    }

    async fn list_by_kind(&self, kind: ArticleKind) -> Result<Vec<Article>, StoreError> {
        let mut matching: Vec<Article> = self
            .records
            .read()
            .values()
            .filter(|a| a.kind == kind)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.published.cmp(&a.published).then(a.title.cmp(&b.title)));
        Ok(matching)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, StoreError> {
        Ok(self
            .records
            .read()
            .values()
            .find(|a| a.slug == slug)
            .cloned())
    }

    async fn insert(&self, new: NewArticle) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.records.write().insert(
            id,
            Article {
                id,
                slug: new.slug,
                title: new.title,
                description: None,
                keywords: None,
                body: None,
                published: None,
                format: None,
                kind: ArticleKind::Post,
            },
        );
        Ok(id)
    }

    async fn update(&self, article: &Article) -> Result<(), StoreError> {
        let mut records = self.records.write();
        if !records.contains_key(&article.id) {
            return Err(StoreError::NotFound);
        }
        records.insert(article.id, article.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.records.write().remove(&id);
        Ok(())
    }
}
