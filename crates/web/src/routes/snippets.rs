//! Snippet pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use snippetbox_core::SnippetId;

use super::page::{PageContext, SnippetView, set_flash};
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::{FormErrors, Validator, max_chars, not_blank, permitted_value};
use crate::models::snippet::{MAX_TITLE_CHARS, PERMITTED_EXPIRY_DAYS};
use crate::state::AppState;

/// Lifetime preselected on an empty form.
const DEFAULT_EXPIRY_DAYS: i32 = 365;

/// Create-snippet form submission.
///
/// Every field defaults to empty so missing fields become validation errors
/// rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct SnippetForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub expires: String,
}

/// Values echoed back into the form.
#[derive(Debug, Clone)]
pub struct SnippetFormValues {
    pub title: String,
    pub content: String,
    pub expires: i32,
}

impl Default for SnippetFormValues {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: DEFAULT_EXPIRY_DAYS,
        }
    }
}

/// Snippet detail template.
#[derive(Template, WebTemplate)]
#[template(path = "snippet/show.html")]
pub struct ShowSnippetTemplate {
    pub page: PageContext,
    pub snippet: SnippetView,
}

/// Create-snippet form template.
#[derive(Template, WebTemplate)]
#[template(path = "snippet/create.html")]
pub struct CreateSnippetTemplate {
    pub page: PageContext,
    pub form: SnippetFormValues,
    pub errors: FormErrors,
}

/// Display one snippet. Unknown, expired and malformed IDs are all `404`.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    page: PageContext,
) -> Result<ShowSnippetTemplate> {
    let id = SnippetId::from_path_segment(&id).ok_or(AppError::NotFound)?;
    let snippet = state
        .snippets()
        .get(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ShowSnippetTemplate {
        page,
        snippet: SnippetView::from(&snippet),
    })
}

/// Display the empty create form.
pub async fn create_form(page: PageContext) -> CreateSnippetTemplate {
    CreateSnippetTemplate {
        page,
        form: SnippetFormValues::default(),
        errors: FormErrors::default(),
    }
}

/// Handle the create form.
///
/// Invalid input re-renders the form with `422`. Success redirects to the
/// new snippet with a flash message.
#[instrument(skip(state, session, page, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<SnippetForm>,
) -> Result<Response> {
    let values = SnippetFormValues {
        expires: form.expires.trim().parse().unwrap_or(0),
        title: form.title,
        content: form.content,
    };

    if let Err(errors) = validate(&values) {
        let template = CreateSnippetTemplate {
            page,
            form: values,
            errors,
        };
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response());
    }

    let id = state
        .snippets()
        .insert(values.title.trim(), &values.content, values.expires)
        .await?;
    tracing::info!(snippet_id = %id, "Snippet created");

    set_flash(&session, "Snippet successfully created!").await?;
    Ok(Redirect::to(&format!("/snippet/{id}")).into_response())
}

fn validate(values: &SnippetFormValues) -> std::result::Result<(), FormErrors> {
    let mut v = Validator::new();
    v.check(not_blank(&values.title), "title", "This field cannot be blank");
    v.check(
        max_chars(values.title.trim(), MAX_TITLE_CHARS),
        "title",
        format!("This field cannot be more than {MAX_TITLE_CHARS} characters long"),
    );
    v.check(not_blank(&values.content), "content", "This field cannot be blank");
    v.check(
        permitted_value(&values.expires, &PERMITTED_EXPIRY_DAYS),
        "expires",
        "This field must equal 1, 7 or 365",
    );
    v.finish()
}
