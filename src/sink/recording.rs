use std::fmt::Write as FmtWrite;

use super::{DocumentSink, LineStyle, Rect, TextOptions};
use crate::error::SinkError;
use crate::style::Color;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        rect: Rect,
        fill: Color,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        options: TextOptions,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        style: LineStyle,
    },
    Image {
        src: String,
        x: f64,
        y: f64,
        width: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedPage {
    pub ops: Vec<DrawOp>,
}

impl RecordedPage {
    /// Every text draw on the page, in order.
    pub fn texts(&self) -> impl Iterator<Item = (&str, f64, f64)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, x, y, .. } => Some((text.as_str(), *x, *y)),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|(t, _, _)| t == needle)
    }
}

/// In-memory sink that records every call.
///
/// `finish` renders the recording as a line-per-op text dump, so byte
/// length grows with the amount of drawn content.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pages: Vec<RecordedPage>,
    current: Option<usize>,
    /// Image sources that fail to load.
    missing_images: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `draw_image` fail for `src`, like a missing asset would.
    pub fn with_missing_image(mut self, src: impl Into<String>) -> Self {
        self.missing_images.push(src.into());
        self
    }

    pub fn pages(&self) -> &[RecordedPage] {
        &self.pages
    }

    pub fn total_ops(&self) -> usize {
        self.pages.iter().map(|p| p.ops.len()).sum()
    }

    fn push(&mut self, op: DrawOp) -> Result<(), SinkError> {
        let index = self.current.ok_or(SinkError::NoPage)?;
        self.pages[index].ops.push(op);
        Ok(())
    }

    /// Text dump of the recording, one op per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (i, page) in self.pages.iter().enumerate() {
            let _ = writeln!(out, "page {}", i);
            for op in &page.ops {
                let _ = match op {
                    DrawOp::Rect { rect, fill } => writeln!(
                        out,
                        "  rect {:.2} {:.2} {:.2} {:.2} fill {:.3} {:.3} {:.3}",
                        rect.x, rect.y, rect.width, rect.height, fill.r, fill.g, fill.b
                    ),
                    DrawOp::Text { text, x, y, options } => writeln!(
                        out,
                        "  text {:.2} {:.2} w={:?} {:?} {:?}",
                        x, y, options.width, options.align, text
                    ),
                    DrawOp::Line { from, to, style } => writeln!(
                        out,
                        "  line {:.2} {:.2} {:.2} {:.2} w={:.2}",
                        from.0, from.1, to.0, to.1, style.width
                    ),
                    DrawOp::Image { src, x, y, width } => {
                        writeln!(out, "  image {:.2} {:.2} w={:.2} {}", x, y, width, src)
                    }
                };
            }
        }
        out
    }
}

impl DocumentSink for RecordingSink {
    fn add_page(&mut self) -> Result<(), SinkError> {
        self.pages.push(RecordedPage::default());
        self.current = Some(self.pages.len() - 1);
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, fill: Color) -> Result<(), SinkError> {
        self.push(DrawOp::Rect { rect, fill })
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        options: &TextOptions,
    ) -> Result<(), SinkError> {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            options: options.clone(),
        })
    }

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        style: LineStyle,
    ) -> Result<(), SinkError> {
        self.push(DrawOp::Line { from, to, style })
    }

    fn draw_image(&mut self, src: &str, x: f64, y: f64, width: f64) -> Result<(), SinkError> {
        if self.missing_images.iter().any(|m| m == src) {
            return Err(SinkError::Image(format!("cannot open '{}'", src)));
        }
        self.push(DrawOp::Image {
            src: src.to_string(),
            x,
            y,
            width,
        })
    }

    fn switch_to_page(&mut self, index: usize) -> Result<(), SinkError> {
        if index >= self.pages.len() {
            return Err(SinkError::PageOutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        self.current = Some(index);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> Option<usize> {
        self.current
    }

    fn finish(self) -> Result<Vec<u8>, SinkError> {
        Ok(self.dump().into_bytes())
    }
}
