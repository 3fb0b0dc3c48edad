//! # Document Sinks
//!
//! A sink is the page-oriented drawing surface the layout engine paints on.
//! It knows nothing about reports: it draws rectangles, wrapped text, lines
//! and images at top-left-origin coordinates in points, adds pages, and can
//! return to an earlier page to paint over part of it. Once every page is
//! complete it turns into bytes.
//!
//! Two sinks ship with the crate: [`crate::pdf::PdfSink`] produces a PDF,
//! and [`RecordingSink`] keeps every call in memory so pagination can be
//! asserted without a renderer.

mod recording;

pub use recording::{DrawOp, RecordedPage, RecordingSink};

use crate::error::SinkError;
use crate::style::{Color, FontSpec, TextAlign};

/// An axis-aligned rectangle, `y` growing downwards from the page top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// How a piece of text is set.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    /// Wrap width. `None` draws a single unwrapped line.
    pub width: Option<f64>,
    pub align: TextAlign,
    pub font: FontSpec,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width: f64,
    pub color: Color,
}

/// Page-oriented drawing surface consumed by the layout engine.
pub trait DocumentSink {
    /// Append a page and make it current.
    fn add_page(&mut self) -> Result<(), SinkError>;

    fn draw_rect(&mut self, rect: Rect, fill: Color) -> Result<(), SinkError>;

    /// Draw `text` with its first line's top edge at `y`.
    fn draw_text(&mut self, text: &str, x: f64, y: f64, options: &TextOptions)
        -> Result<(), SinkError>;

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        style: LineStyle,
    ) -> Result<(), SinkError>;

    /// Draw the image at `src` scaled to `width`, keeping its aspect ratio.
    fn draw_image(&mut self, src: &str, x: f64, y: f64, width: f64) -> Result<(), SinkError>;

    /// Make an existing page current again; later draws land on it.
    fn switch_to_page(&mut self, index: usize) -> Result<(), SinkError>;

    fn page_count(&self) -> usize;

    /// Index of the page draws currently land on.
    fn current_page(&self) -> Option<usize>;

    /// Produce the finished document.
    fn finish(self) -> Result<Vec<u8>, SinkError>
    where
        Self: Sized;
}
