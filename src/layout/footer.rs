//! # Footer Finalizer
//!
//! The second pass. Footers carry the total page count, which exists only
//! after the content flow has finished, so every page is revisited once
//! the sink holds all of them. The timestamp is formatted once by the
//! caller and shared by every page.

use std::fmt::Write as FmtWrite;

use chrono::{DateTime, Local};

use crate::error::{ReportError, SinkError};
use crate::sink::{DocumentSink, Rect, TextOptions};
use crate::style::{Labels, StyleSheet, TextAlign};

/// `"page 2 of 5 • generated 2026-03-02 14:05"` for `index == 1`.
pub fn footer_text(labels: &Labels, index: usize, total: usize, timestamp: &str) -> String {
    format!(
        "{} {} {} {} \u{2022} {} {}",
        labels.page,
        index + 1,
        labels.of,
        total,
        labels.generated,
        timestamp
    )
}

/// Format the footer timestamp with a strftime-style pattern.
///
/// An unknown specifier is reported as an error instead of panicking the
/// way `to_string()` on chrono's formatter would.
pub fn format_timestamp(at: &DateTime<Local>, pattern: &str) -> Result<String, ReportError> {
    let mut out = String::new();
    write!(out, "{}", at.format(pattern))
        .map_err(|_| ReportError::Finalize(format!("invalid footer time format '{}'", pattern)))?;
    Ok(out)
}

/// Stamp a footer on every page of `sink` and return how many were stamped.
///
/// The band below the bottom margin is cleared first, so stamping twice
/// with the same inputs leaves the same result. Content reaching into the
/// band is painted over; only an overflowing block can get there, since
/// the bottom thresholds never drop below the margin.
pub fn stamp_footers<S: DocumentSink + ?Sized>(
    sink: &mut S,
    style: &StyleSheet,
    timestamp: &str,
) -> Result<usize, SinkError> {
    let total = sink.page_count();
    let (page_width, page_height) = style.page_dimensions();
    let band_top = page_height - style.margin.bottom;
    let options = TextOptions {
        width: Some(style.content_width()),
        align: TextAlign::Center,
        font: style.fonts.footer.clone(),
        color: style.colors.footer,
    };

    for index in 0..total {
        sink.switch_to_page(index)?;
        sink.draw_rect(
            Rect::new(0.0, band_top, page_width, style.margin.bottom),
            style.colors.paper,
        )?;
        sink.draw_text(
            &footer_text(&style.labels, index, total, timestamp),
            style.margin.left,
            band_top + style.footer_offset,
            &options,
        )?;
    }
    Ok(total)
}
