//! Public site pages: home plus the article listings and detail pages

use askama::Template;
use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::articles::{Article, ArticleKind};
use crate::error::AppError;
use crate::state::AppState;
use crate::template::{render, render_markdown, PageMeta};

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    meta: PageMeta,
}

/// Listing row handed to the template
struct ArticleListItem {
    slug: String,
    title: String,
    description: String,
}

#[derive(Template)]
#[template(path = "article_list.html")]
struct ArticleListTemplate {
    meta: PageMeta,
    heading: String,
    base_path: String,
    articles: Vec<ArticleListItem>,
}

#[derive(Template)]
#[template(path = "article.html")]
struct ArticleTemplate {
    meta: PageMeta,
    title: String,
    body_html: String,
}

/// GET /
pub async fn home(State(state): State<AppState>) -> Response {
    render(&HomeTemplate {
        meta: state.meta(
            "Home",
            "A personal site: articles, games, and tools",
            "web development, games, tools",
        ),
    })
}

fn list_items(articles: Vec<Article>) -> Vec<ArticleListItem> {
    articles
        .into_iter()
        .map(|article| ArticleListItem {
            slug: article.slug,
            title: article.title,
            description: article.description.unwrap_or_default(),
        })
        .collect()
}

async fn listing(
    state: &AppState,
    kind: ArticleKind,
    heading: &str,
    description: &str,
    keywords: &str,
    base_path: &str,
) -> Result<Response, AppError> {
    let articles = state.articles().list_by_kind(kind).await?;
    Ok(render(&ArticleListTemplate {
        meta: state.meta(heading, description, keywords),
        heading: heading.to_string(),
        base_path: base_path.to_string(),
        articles: list_items(articles),
    }))
}

async fn detail(state: &AppState, slug: &str) -> Result<Response, AppError> {
    let article = state
        .articles()
        .find_by_slug(slug)
        .await?
        .ok_or(AppError::NotFound)?;

    let body_html = render_markdown(article.body.as_deref().unwrap_or_default());
    Ok(render(&ArticleTemplate {
        meta: state.meta(
            &article.title,
            article.description.clone().unwrap_or_default(),
            article.keywords.clone().unwrap_or_default(),
        ),
        title: article.title,
        body_html,
    }))
}

/// GET /articles
///
/// # Errors
///
/// Returns [`AppError`] if the store read fails.
pub async fn list_articles(State(state): State<AppState>) -> Result<Response, AppError> {
    listing(
        &state,
        ArticleKind::Post,
        "Articles",
        "A list of articles",
        "articles, blog",
        "/articles",
    )
    .await
}

/// GET /articles/{slug}
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown slug.
pub async fn view_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    detail(&state, &slug).await
}

/// GET /games
///
/// # Errors
///
/// Returns [`AppError`] if the store read fails.
pub async fn list_games(State(state): State<AppState>) -> Result<Response, AppError> {
    listing(
        &state,
        ArticleKind::Game,
        "Games",
        "Browser games and game write-ups",
        "games, indie games",
        "/games",
    )
    .await
}

/// GET /games/{slug}
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown slug.
pub async fn view_game(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    detail(&state, &slug).await
}

/// GET /tools
///
/// # Errors
///
/// Returns [`AppError`] if the store read fails.
pub async fn list_tools(State(state): State<AppState>) -> Result<Response, AppError> {
    listing(
        &state,
        ArticleKind::Tool,
        "Tools",
        "Small tools and utilities",
        "tools, utilities",
        "/tools",
    )
    .await
}

/// GET /tools/{slug}
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown slug.
pub async fn view_tool(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    detail(&state, &slug).await
}
