use askama::Template;

use crate::render::results::{build_rows, ResultRow, PLACEHOLDER};
use crate::session::controller::SubmissionController;

/// The full page: both input forms and the results section.
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub job_description: String,
    pub selection_label: String,
    pub rows: Vec<ResultRow>,
    pub placeholder: &'static str,
}

/// Renders the page from the session's current state.
pub fn render_page(session: &SubmissionController) -> Result<String, askama::Error> {
    let snapshot = session.results();

    PageTemplate {
        job_description: session.job_description(),
        selection_label: selection_label(session.selection_len()),
        rows: build_rows(&snapshot.results),
        placeholder: PLACEHOLDER,
    }
    .render()
}

pub fn selection_label(count: usize) -> String {
    if count > 0 {
        format!("{count} file(s) selected")
    } else {
        "Click to select one or more resume files".to_string()
    }
}
