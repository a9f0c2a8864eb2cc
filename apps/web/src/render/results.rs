//! Result Renderer — turns the ranked result set into display rows.
//!
//! Pure: the same set always renders to the same bytes. Fields the service sent
//! with the wrong shape show as "N/A"; the row itself is never dropped.

use std::fmt;

use askama::Template;
use serde::Serialize;

use crate::models::ranking::{RankedResultSet, RankedResumeEntry};

pub const PLACEHOLDER: &str = "No resumes ranked yet.";
pub const NOT_AVAILABLE: &str = "N/A";
pub const HEADERS: [&str; 6] = [
    "Rank",
    "Name",
    "Similarity Score",
    "Skills",
    "Experience",
    "Education",
];

/// One display row, every cell already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub rank: usize,
    pub name: String,
    pub score: String,
    pub skills: String,
    pub experience: String,
    pub education: String,
}

impl ResultRow {
    /// `index` is the entry's zero-based position in the set.
    pub fn from_entry(index: usize, entry: &RankedResumeEntry) -> Self {
        Self {
            rank: index + 1,
            name: entry.name.clone().unwrap_or_default(),
            score: entry
                .score
                .as_deref()
                .map_or_else(|| NOT_AVAILABLE.to_string(), |s| format!("{s}%")),
            skills: join_or_na(entry.skills.as_deref()),
            experience: entry
                .experience
                .map_or_else(|| NOT_AVAILABLE.to_string(), |y| format!("{y} years")),
            education: join_or_na(entry.education.as_deref()),
        }
    }
}

impl fmt::Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {} | {} | {}",
            self.rank, self.name, self.score, self.skills, self.experience, self.education
        )
    }
}

fn join_or_na(items: Option<&[String]>) -> String {
    items.map_or_else(|| NOT_AVAILABLE.to_string(), |items| items.join(", "))
}

/// Rows in service order. Empty means the placeholder is shown instead.
pub fn build_rows(results: &RankedResultSet) -> Vec<ResultRow> {
    results
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| ResultRow::from_entry(i, entry))
        .collect()
}

/// Plain-text rendition: the placeholder, or a header line followed by one line per row.
pub fn render_text(results: &RankedResultSet) -> String {
    let rows = build_rows(results);
    if rows.is_empty() {
        return PLACEHOLDER.to_string();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(HEADERS.join(" | "));
    lines.extend(rows.iter().map(ResultRow::to_string));
    lines.join("\n")
}

/// The results section of the page.
#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate {
    pub rows: Vec<ResultRow>,
    pub placeholder: &'static str,
}

impl ResultsTemplate {
    pub fn new(results: &RankedResultSet) -> Self {
        Self {
            rows: build_rows(results),
            placeholder: PLACEHOLDER,
        }
    }
}

/// HTML rendition of the results section.
pub fn render_html(results: &RankedResultSet) -> Result<String, askama::Error> {
    ResultsTemplate::new(results).render()
}
