//! Admin article CRUD
//!
//! Creating an article takes just a title and derives the slug; everything
//! else is filled in on the edit form. The `published` input accepts
//! `YYYY-MM-DD HH:MM:SS`; an empty value means unpublished.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::articles::{
    self, parse_published, Article, ArticleKind, NewArticle,
};
use crate::error::AppError;
use crate::state::AppState;
use crate::template::{render, render_markdown, PageMeta};
use crate::validate::{ErrorMap, FieldValues};

#[derive(Template)]
#[template(path = "articles_list.html")]
struct ArticlesListTemplate {
    meta: PageMeta,
    articles: Vec<ArticleRow>,
}

struct ArticleRow {
    id: String,
    title: String,
    slug: String,
    kind: String,
    published: String,
}

impl From<Article> for ArticleRow {
    fn from(article: Article) -> Self {
        Self {
            id: article.id.to_string(),
            title: article.title,
            slug: article.slug,
            kind: article.kind.to_string(),
            published: article
                .published
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "article_create.html")]
struct ArticleCreateTemplate {
    meta: PageMeta,
    errors: ErrorMap,
    title: String,
}

#[derive(Template)]
#[template(path = "article_edit.html")]
struct ArticleEditTemplate {
    meta: PageMeta,
    errors: ErrorMap,
    id: String,
    form: ArticleForm,
}

#[derive(Template)]
#[template(path = "article_view.html")]
struct ArticleViewTemplate {
    meta: PageMeta,
    article: ArticleRow,
    body_html: String,
}

/// Create form fields
#[derive(Debug, Default, Deserialize)]
pub struct ArticleCreateForm {
    /// Article title; the slug is derived from it
    #[serde(default)]
    pub title: String,
}

/// Edit form fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleForm {
    /// Title
    #[serde(default)]
    pub title: String,
    /// URL slug
    #[serde(default)]
    pub slug: String,
    /// Meta description
    #[serde(default)]
    pub description: String,
    /// Meta keywords
    #[serde(default)]
    pub keywords: String,
    /// Markdown body
    #[serde(default)]
    pub body: String,
    /// Publication timestamp, `YYYY-MM-DD HH:MM:SS` or empty
    #[serde(default)]
    pub published: String,
    /// Body format hint
    #[serde(default)]
    pub format: String,
    /// Content kind
    #[serde(default)]
    pub kind: String,
}

impl ArticleForm {
    fn values(&self) -> FieldValues {
        FieldValues::new()
            .field("title", &self.title)
            .field("slug", &self.slug)
            .field("kind", &self.kind)
    }
}

impl From<Article> for ArticleForm {
    fn from(article: Article) -> Self {
        Self {
            title: article.title,
            slug: article.slug,
            description: article.description.unwrap_or_default(),
            keywords: article.keywords.unwrap_or_default(),
            body: article.body.unwrap_or_default(),
            published: article
                .published
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            format: article.format.unwrap_or_default(),
            kind: article.kind.to_string(),
        }
    }
}

/// Empty form strings become `None`; spare the database the empty-string
/// sentinels.
fn optional(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// GET /admin/articles
///
/// # Errors
///
/// Returns [`AppError`] if the store read fails.
pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let articles = state.articles().list().await?;
    Ok(render(&ArticlesListTemplate {
        meta: state.meta("Articles", "Manage articles", "admin, articles"),
        articles: articles.into_iter().map(ArticleRow::from).collect(),
    }))
}

fn create_page(state: &AppState, errors: ErrorMap, title: String) -> Response {
    render(&ArticleCreateTemplate {
        meta: state.meta("Create an article", "Create an article", "admin, articles"),
        errors,
        title,
    })
}

/// GET /admin/articles/create
pub async fn create_form(State(state): State<AppState>) -> Response {
    create_page(&state, ErrorMap::new(), String::new())
}

/// POST /admin/articles/create
///
/// # Errors
///
/// Returns [`AppError`] if the insert fails.
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<ArticleCreateForm>,
) -> Result<Response, AppError> {
    let values = FieldValues::new().field("title", &form.title);
    let errors = state
        .validator()
        .validate(&values, &articles::article_create_rules())
        .await;
    if !errors.is_empty() {
        return Ok(create_page(&state, errors, form.title));
    }

    let id = state
        .articles()
        .insert(NewArticle::from_title(form.title))
        .await?;
    tracing::info!(%id, "article created");

    Ok(Redirect::to(&format!("/admin/articles/{id}")).into_response())
}

/// GET /admin/articles/{id}
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown id.
pub async fn view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let article = state
        .articles()
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    let body_html = render_markdown(article.body.as_deref().unwrap_or_default());
    let title = article.title.clone();
    Ok(render(&ArticleViewTemplate {
        meta: state.meta(&title, &title, "admin, articles"),
        article: ArticleRow::from(article),
        body_html,
    }))
}

fn edit_page(state: &AppState, errors: ErrorMap, id: Uuid, form: ArticleForm) -> Response {
    render(&ArticleEditTemplate {
        meta: state.meta("Update Article", "Update an article", "admin, articles"),
        errors,
        id: id.to_string(),
        form,
    })
}

/// GET /admin/articles/{id}/edit
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown id.
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let article = state
        .articles()
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(edit_page(&state, ErrorMap::new(), id, ArticleForm::from(article)))
}

/// POST /admin/articles/{id}/edit
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown id, or [`AppError`] if the
/// update fails.
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<ArticleForm>,
) -> Result<Response, AppError> {
    let mut errors = state
        .validator()
        .validate(&form.values(), &articles::article_update_rules())
        .await;

    let published = match parse_published(&form.published) {
        Ok(published) => published,
        Err(_) => {
            errors.insert("published", "Published is invalid");
            None
        }
    };

    if !errors.is_empty() {
        return Ok(edit_page(&state, errors, id, form));
    }

    let kind = ArticleKind::parse(&form.kind)
        .ok_or_else(|| AppError::Server("kind failed revalidation".to_string()))?;
    let article = Article {
        id,
        slug: form.slug.clone(),
        title: form.title.clone(),
        description: optional(form.description.clone()),
        keywords: optional(form.keywords.clone()),
        body: optional(form.body.clone()),
        published,
        format: optional(form.format.clone()),
        kind,
    };
    state.articles().update(&article).await?;
    tracing::info!(%id, "article updated");

    Ok(Redirect::to(&format!("/admin/articles/{id}")).into_response())
}

/// GET /admin/articles/{id}/delete
///
/// # Errors
///
/// Returns [`AppError`] if the delete fails.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.articles().delete(id).await?;
    tracing::info!(%id, "article deleted");
    Ok(Redirect::to("/admin/articles").into_response())
}
