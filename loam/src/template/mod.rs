//! Template plumbing shared by all pages
//!
//! Every page template embeds a [`PageMeta`] for the layout's head section
//! (title, meta tags, cache-busted asset URLs). [`render`] turns any askama
//! template into a response, mapping render failures to a generic 500.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use pulldown_cmark::{html, Parser};

/// Head-section data carried by every page
#[derive(Debug, Clone, Default)]
pub struct PageMeta {
    /// Page title
    pub title: String,
    /// Meta description
    pub description: String,
    /// Meta keywords
    pub keywords: String,
    /// CSS bundle fingerprint
    pub css_bust: String,
    /// JS bundle fingerprint
    pub js_bust: String,
}

/// Render a template into a response; a render failure logs and returns a
/// generic 500.
pub fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(body) => Html(body).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "template rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Convert a markdown article body to HTML
#[must_use]
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}
