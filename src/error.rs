//! Structured error types for the report engine.
//!
//! Every failure a render can hit maps onto one variant of [`ReportError`]:
//! bad JSON input, a model that fails validation, a text measurement or
//! drawing failure from a collaborator, or a sink that cannot produce bytes.

use thiserror::Error;

/// A required field of the report model is missing or empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

/// The text measurer could not produce a height.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    #[error("cannot measure text into a box {0}pt wide")]
    InvalidWidth(f64),
    #[error("font size must be positive, got {0}")]
    InvalidFontSize(f64),
}

/// The drawing surface rejected an operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SinkError {
    #[error("no page to draw on; call add_page first")]
    NoPage,
    #[error("page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("image error: {0}")]
    Image(String),
    #[error("failed to produce document bytes: {0}")]
    Finalize(String),
}

/// The unified error type returned by the public rendering API.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON input failed to parse as a report model.
    #[error("failed to parse report model: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    #[error("invalid report model: {0}")]
    Validation(#[from] ValidationError),
    #[error("text measurement failed: {0}")]
    Measurement(#[from] MeasureError),
    #[error("drawing failed: {0}")]
    Sink(#[from] SinkError),
    /// Pages were laid out but the byte stream could not be produced.
    #[error("render error: {0}")]
    Finalize(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the report schema. Check field names (camelCase) and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input; is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}
