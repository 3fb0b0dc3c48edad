//! Row height calculation.
//!
//! Rows are rigid: every cell in a row takes the height of the tallest
//! cell, so one long description grows all of its siblings. Heights come
//! from the text measurer; nothing here draws.

use crate::error::MeasureError;
use crate::style::{FontSpec, StyleSheet};
use crate::text::TextMeasurer;

/// One cell's text and the full width of its column.
#[derive(Debug, Clone, Copy)]
pub struct CellText<'a> {
    pub text: &'a str,
    pub width: f64,
}

/// Spacing that turns measured text heights into row heights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    /// Horizontal padding inside a cell, both sides together.
    pub cell_padding: f64,
    /// Vertical padding added to the tallest cell.
    pub row_padding: f64,
    pub min_height: f64,
}

impl RowMetrics {
    pub fn from_style(style: &StyleSheet) -> Self {
        Self {
            cell_padding: style.cell_padding,
            row_padding: style.row_padding,
            min_height: style.min_row_height,
        }
    }
}

/// `max(min_height, tallest cell + row_padding)`.
pub fn row_height<M: TextMeasurer + ?Sized>(
    measurer: &M,
    cells: &[CellText<'_>],
    font: &FontSpec,
    metrics: RowMetrics,
) -> Result<f64, MeasureError> {
    let mut tallest: f64 = 0.0;
    for cell in cells {
        let h = measurer.measure(cell.text, font, cell.width - metrics.cell_padding)?;
        tallest = tallest.max(h);
    }
    Ok(metrics.min_height.max(tallest + metrics.row_padding))
}

/// A label stacked over its value, as in the header info grid.
#[derive(Debug, Clone, Copy)]
pub struct InfoCell<'a> {
    pub label: &'a str,
    pub value: &'a str,
}

/// Label height + gap + value height, each measured on its own.
pub fn info_cell_height<M: TextMeasurer + ?Sized>(
    measurer: &M,
    cell: InfoCell<'_>,
    width: f64,
    label_font: &FontSpec,
    value_font: &FontSpec,
    cell_padding: f64,
    gap: f64,
) -> Result<f64, MeasureError> {
    let inner = width - cell_padding;
    let label = measurer.measure(cell.label, label_font, inner)?;
    let value = measurer.measure(cell.value, value_font, inner)?;
    Ok(label + gap + value)
}

/// Height of an info-grid row whose cells share `width` each.
pub fn info_row_height<M: TextMeasurer + ?Sized>(
    measurer: &M,
    cells: &[InfoCell<'_>],
    width: f64,
    label_font: &FontSpec,
    value_font: &FontSpec,
    gap: f64,
    metrics: RowMetrics,
) -> Result<f64, MeasureError> {
    let mut tallest: f64 = 0.0;
    for cell in cells {
        let h = info_cell_height(
            measurer,
            *cell,
            width,
            label_font,
            value_font,
            metrics.cell_padding,
            gap,
        )?;
        tallest = tallest.max(h);
    }
    Ok(metrics.min_height.max(tallest + metrics.row_padding))
}
