//! Ranked results as returned by the analysis service.
//!
//! The payload is never trusted to be well-typed. Each field is read leniently
//! and a field of the wrong shape is treated as absent, so the renderer can show
//! "N/A" instead of dropping the row.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// One scored resume. Rank is not stored; it is the entry's position in the set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedResumeEntry {
    pub name: Option<String>,
    /// Display text of the score: numbers and strings both count.
    pub score: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<f64>,
    pub education: Option<Vec<String>>,
    pub job_titles: Option<Vec<String>>,
}

impl RankedResumeEntry {
    /// Reads an entry out of an arbitrary JSON value. Non-objects yield an entry
    /// with every field absent.
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: value.get("name").and_then(scalar_text),
            score: value.get("score").and_then(score_text),
            skills: value.get("skills").and_then(text_list),
            experience: value.get("experience").and_then(Value::as_f64),
            education: value.get("education").and_then(text_list),
            job_titles: value.get("job_titles").and_then(text_list),
        }
    }
}

/// The ordered result set of the most recent applied upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedResultSet {
    entries: Vec<RankedResumeEntry>,
}

impl RankedResultSet {
    /// Builds a set from the raw `/upload-resumes` response body, keeping the
    /// service's order. A body that is not an array produces an empty set.
    pub fn from_payload(payload: &Value) -> Self {
        match payload {
            Value::Array(items) => Self {
                entries: items.iter().map(RankedResumeEntry::from_value).collect(),
            },
            other => {
                warn!(
                    "Upload response is not a JSON array (got {}); treating as empty",
                    json_kind(other)
                );
                Self::default()
            }
        }
    }

    pub fn entries(&self) -> &[RankedResumeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<RankedResumeEntry>> for RankedResultSet {
    fn from(entries: Vec<RankedResumeEntry>) -> Self {
        Self { entries }
    }
}

/// Numbers use float formatting so `92` and `92.0` both read "92".
fn score_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Only a genuine JSON array counts as a list. Non-string items are kept as
/// their JSON text; `null` items become empty strings.
fn text_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
