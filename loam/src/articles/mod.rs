//! Articles: posts, games, tools, and standalone pages

pub mod store;

pub use store::{ArticleStore, MemoryArticleStore, PgArticleStore};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inflection::slugify;
use crate::validate::{Rule, Ruleset};

/// What kind of content an article is; drives which public listing it
/// appears in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleKind {
    /// Blog post, listed under `/articles`
    Post,
    /// Game write-up, listed under `/games`
    Game,
    /// Tool write-up, listed under `/tools`
    Tool,
    /// Standalone page
    Page,
}

impl ArticleKind {
    /// Text form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Game => "game",
            Self::Tool => "tool",
            Self::Page => "page",
        }
    }

    /// Parse the stored text form
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "post" => Some(Self::Post),
            "game" => Some(Self::Game),
            "tool" => Some(Self::Tool),
            "page" => Some(Self::Page),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArticleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind option values accepted by the admin article form
pub const KIND_OPTIONS: &[&str] = &["post", "game", "tool", "page"];

/// Stored article
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    /// Primary key
    pub id: Uuid,
    /// Unique URL slug, derived from the title on create
    pub slug: String,
    /// Title
    pub title: String,
    /// Meta description
    pub description: Option<String>,
    /// Meta keywords
    pub keywords: Option<String>,
    /// Markdown body
    pub body: Option<String>,
    /// Publication timestamp; unpublished when `None`
    pub published: Option<DateTime<Utc>>,
    /// Body format hint
    pub format: Option<String>,
    /// Content kind
    pub kind: ArticleKind,
}

/// Fields for creating an article; everything beyond the title is filled
/// in on the edit form
#[derive(Debug, Clone)]
pub struct NewArticle {
    /// Title
    pub title: String,
    /// URL slug
    pub slug: String,
}

impl NewArticle {
    /// Build a new article from a title, deriving the slug
    #[must_use]
    pub fn from_title(title: impl Into<String>) -> Self {
        let title = title.into();
        let slug = slugify(&title);
        Self { title, slug }
    }
}

/// Parse the admin form's `published` input (`YYYY-MM-DD HH:MM:SS`); an
/// empty value reads as unpublished.
///
/// # Errors
///
/// Returns the underlying parse error for a non-empty, malformed value.
pub fn parse_published(value: &str) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")?;
    Ok(Some(naive.and_utc()))
}

/// Rules for the admin create article form
#[must_use]
pub fn article_create_rules() -> Ruleset {
    Ruleset::new().field("title", [Rule::Required])
}

/// Rules for the admin edit article form
#[must_use]
pub fn article_update_rules() -> Ruleset {
    Ruleset::new()
        .field("title", [Rule::Required])
        .field("slug", [Rule::Required])
        .field("kind", [Rule::Required, Rule::OneOf(KIND_OPTIONS)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_text() {
        for kind in [
            ArticleKind::Post,
            ArticleKind::Game,
            ArticleKind::Tool,
            ArticleKind::Page,
        ] {
            assert_eq!(ArticleKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ArticleKind::parse("video"), None);
    }

    #[test]
    fn new_article_derives_slug_from_title() {
        let new = NewArticle::from_title("Hello, World!");
        assert_eq!(new.title, "Hello, World!");
        assert_eq!(new.slug, "hello-world");
    }

    #[test]
    fn published_parses_sql_style_timestamps() {
        let parsed = parse_published("2024-03-01 12:30:00").unwrap();
        assert!(parsed.is_some());
        assert_eq!(parse_published("").unwrap(), None);
        assert_eq!(parse_published("   ").unwrap(), None);
        assert!(parse_published("March 1st").is_err());
    }
}
