//! # Inspection Report
//!
//! Renders an inspection protocol (property and lease metadata plus a
//! table of room remarks) into a paginated PDF.
//!
//! Rows are never sliced after the fact. Each row is measured first, then
//! placed on the current page only if it ends above the bottom threshold;
//! otherwise it moves whole to a new page under a repeated table header.
//! Footers carry the total page count, so they are stamped in a second
//! pass once the content has finished flowing.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    : ReportModel, validated before anything is drawn
//!       ↓
//!   [layout]   : header block, paginated remarks table, summary row
//!       ↓           ↑ heights from [text] + [font]
//!   [footer]   : second pass: "page i of n" on every page
//!       ↓
//!   [sink]     : DocumentSink; [pdf] writes the bytes
//! ```
//!
//! Styling lives in one [`style::StyleSheet`] value. Text measurement and
//! the drawing surface are traits ([`text::TextMeasurer`],
//! [`sink::DocumentSink`]) so the engine can be driven by other backends
//! or by test doubles.

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod sink;
pub mod style;
pub mod text;

use chrono::Local;

pub use error::ReportError;
pub use layout::{LayoutEngine, LayoutOutcome, RenderedReport};
pub use model::{Remark, RenderConfig, ReportModel, RoomGroup};
pub use style::StyleSheet;

use error::ValidationError;
use pdf::{Metadata, PdfSink};
use text::FontMeasurer;

/// Render a report to PDF bytes with the default style.
///
/// This is the primary entry point.
pub fn render(model: &ReportModel, config: &RenderConfig) -> Result<Vec<u8>, ReportError> {
    render_with_style(model, config, StyleSheet::default())
}

/// Render a report to PDF bytes with a custom style sheet.
pub fn render_with_style(
    model: &ReportModel,
    config: &RenderConfig,
    style: StyleSheet,
) -> Result<Vec<u8>, ReportError> {
    let (width, height) = style.page_dimensions();
    let sink = PdfSink::new(width, height).with_metadata(Metadata {
        title: Some(format!("{} {}", style.labels.title, model.id)),
        subject: Some(model.address.clone()),
        created: Some(Local::now()),
    });
    let engine = LayoutEngine::new(style, FontMeasurer::new());
    Ok(engine.render(model, config, sink)?.bytes)
}

/// Render a report given as camelCase JSON to PDF bytes.
///
/// `null` is treated as a missing model.
pub fn render_json(json: &str, config: &RenderConfig) -> Result<Vec<u8>, ReportError> {
    let model: Option<ReportModel> = serde_json::from_str(json)?;
    let model = model.ok_or(ValidationError::MissingField("model"))?;
    render(&model, config)
}
