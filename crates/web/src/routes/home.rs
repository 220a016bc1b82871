//! Home page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use super::page::{PageContext, SnippetView};
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Snippets listed on the home page.
const LATEST_LIMIT: u32 = 10;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub snippets: Vec<SnippetView>,
}

/// Display the latest unexpired snippets, newest first.
#[instrument(skip(state, page))]
pub async fn home(State(state): State<AppState>, page: PageContext) -> Result<HomeTemplate> {
    let snippets = state.snippets().latest(LATEST_LIMIT).await?;
    Ok(HomeTemplate {
        page,
        snippets: snippets.iter().map(SnippetView::from).collect(),
    })
}
