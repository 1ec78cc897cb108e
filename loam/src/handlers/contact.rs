//! Contact form: validated submission dispatched to the support address

use askama::Template;
use axum::{extract::State, response::Response, Form};
use serde::Deserialize;

use crate::email::Email;
use crate::error::AppError;
use crate::state::AppState;
use crate::template::{render, PageMeta};
use crate::validate::{ErrorMap, FieldValues, Rule, Ruleset};

#[derive(Template)]
#[template(path = "contact.html")]
struct ContactTemplate {
    meta: PageMeta,
    errors: ErrorMap,
    form: ContactForm,
    sent: bool,
    failed: bool,
}

/// Contact form fields
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    /// Subject line picked from the select
    #[serde(default)]
    pub subject: String,
    /// Visitor name
    #[serde(default)]
    pub name: String,
    /// Visitor email, used as Reply-To
    #[serde(default)]
    pub email: String,
    /// Message body
    #[serde(default)]
    pub body: String,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self {
            subject: "General Contact".to_string(),
            name: String::new(),
            email: String::new(),
            body: String::new(),
        }
    }
}

fn contact_rules() -> Ruleset {
    Ruleset::new()
        .field("name", [Rule::Required])
        .field("email", [Rule::Required, Rule::Email])
        .field("body", [Rule::Required])
}

fn contact_page(
    state: &AppState,
    errors: ErrorMap,
    form: ContactForm,
    sent: bool,
    failed: bool,
) -> Response {
    render(&ContactTemplate {
        meta: state.meta("Contact", "Get in touch", "contact, email"),
        errors,
        form,
        sent,
        failed,
    })
}

/// GET /contact
pub async fn contact_form(State(state): State<AppState>) -> Response {
    contact_page(&state, ErrorMap::new(), ContactForm::default(), false, false)
}

/// POST /contact
///
/// A delivery failure renders a generic note; the transport error is
/// logged, never shown.
///
/// # Errors
///
/// Returns [`AppError`] only for response-assembly failures.
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Result<Response, AppError> {
    let values = FieldValues::new()
        .field("name", &form.name)
        .field("email", &form.email)
        .field("body", &form.body);
    let errors = state.validator().validate(&values, &contact_rules()).await;
    if !errors.is_empty() {
        return Ok(contact_page(&state, errors, form, false, false));
    }

    let support = state.config().email.support_address.clone();
    let message = Email::new()
        .to(support.clone())
        .from(support)
        .reply_to(form.email.clone())
        .subject(format!("{}: from {}", form.subject, form.name))
        .text(form.body.clone());

    match state.mailer().send(message).await {
        Ok(()) => Ok(contact_page(
            &state,
            ErrorMap::new(),
            ContactForm::default(),
            true,
            false,
        )),
        Err(err) => {
            tracing::error!(error = %err, "contact email dispatch failed");
            Ok(contact_page(&state, ErrorMap::new(), form, false, true))
        }
    }
}
