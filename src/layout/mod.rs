//! # Paginated Report Layout
//!
//! The engine flows one inspection protocol onto fixed-size pages in two
//! passes.
//!
//! ## Phase 1: content
//!
//! 1. Open the first page and draw the header block: optional logo, title,
//!    and a three-row info grid whose row heights come from measured text
//! 2. Draw the remarks table header, kept together with the first block
//!    below it so no page ends on a lone header
//! 3. Plan every table row with [`page_break::paginate`]: a row that does
//!    not end above the bottom threshold moves whole to a new page
//! 4. Draw the planned rows, opening pages and repeating the table header
//!    wherever the plan says a break happens
//! 5. With costs enabled, place the summary row against a smaller bottom
//!    threshold (nothing follows it)
//!
//! ## Phase 2: finalize
//!
//! Only now is the page count known. [`footer::stamp_footers`] revisits
//! every page with one shared timestamp, then the sink produces bytes.
//!
//! Planning is kept apart from drawing: the pagination rule is a pure
//! function of row heights, so it can be tested with plain numbers, and
//! the drawing loop only has to follow the plan.

pub mod footer;
pub mod page_break;
pub mod rows;
pub mod table;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::ReportError;
use crate::model::{validate, RenderConfig, ReportModel};
use crate::sink::{DocumentSink, LineStyle, Rect, TextOptions};
use crate::style::{Color, FontSpec, StyleSheet, TextAlign};
use crate::text::TextMeasurer;

use page_break::{fits, paginate, step, LayoutState, Phase, Placement};
use rows::{info_row_height, row_height, CellText, InfoCell, RowMetrics};
use table::{format_cost, table_rows, ColumnKind, ColumnSet, RunningTotal, TableRow};

/// What phase 1 produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOutcome {
    /// Pages in the sink when the content flow finished.
    pub pages: usize,
    /// Physical table rows drawn, placeholder rows included.
    pub rows: usize,
    /// Sum of every remark cost, whether or not costs are shown.
    pub total_cost: f64,
    /// Where each table row landed, in row order.
    pub row_placements: Vec<Placement>,
    /// Where the summary row landed, when costs are shown.
    pub summary: Option<Placement>,
}

/// A finished document.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub outcome: LayoutOutcome,
    /// The timestamp printed in every footer.
    pub timestamp: String,
}

/// Lays out inspection protocols with a fixed style and text measurer.
///
/// The engine holds no per-render state; one engine can render any number
/// of reports, and every render gets its own cursor, total and sink.
pub struct LayoutEngine<M: TextMeasurer> {
    style: StyleSheet,
    measurer: M,
    timestamp: Option<DateTime<Local>>,
}

impl<M: TextMeasurer> LayoutEngine<M> {
    pub fn new(style: StyleSheet, measurer: M) -> Self {
        Self {
            style,
            measurer,
            timestamp: None,
        }
    }

    /// Print `at` in every footer instead of the time finalization starts.
    pub fn with_timestamp(mut self, at: DateTime<Local>) -> Self {
        self.timestamp = Some(at);
        self
    }

    pub fn style(&self) -> &StyleSheet {
        &self.style
    }

    /// Validate, lay out, stamp footers and finish `sink`.
    ///
    /// Validation runs before the sink is touched, so a rejected model
    /// costs no drawing at all. Any failure after that abandons the
    /// partially drawn sink.
    pub fn render<S: DocumentSink>(
        &self,
        model: &ReportModel,
        config: &RenderConfig,
        mut sink: S,
    ) -> Result<RenderedReport, ReportError> {
        validate(Some(model))?;

        let outcome = self.layout(model, config, &mut sink)?;

        let at = self.timestamp.unwrap_or_else(Local::now);
        let timestamp = footer::format_timestamp(&at, &self.style.footer_time_format)?;
        let stamped = footer::stamp_footers(&mut sink, &self.style, &timestamp)?;
        log::debug!(
            "{:?}: stamped {} of {} pages for protocol '{}'",
            Phase::Finalizing,
            stamped,
            outcome.pages,
            model.id
        );

        let bytes = sink
            .finish()
            .map_err(|e| ReportError::Finalize(e.to_string()))?;
        Ok(RenderedReport {
            bytes,
            outcome,
            timestamp,
        })
    }

    /// Phase 1: draw the header block, the remarks table and the summary
    /// row onto `sink`. Footers are not drawn.
    pub fn layout<S: DocumentSink + ?Sized>(
        &self,
        model: &ReportModel,
        config: &RenderConfig,
        sink: &mut S,
    ) -> Result<LayoutOutcome, ReportError> {
        let style = &self.style;
        let (_, page_height) = style.page_dimensions();

        sink.add_page()?;
        let mut state = LayoutState::new(page_height, style.margin.top);
        self.draw_header_block(model, sink, &mut state)?;
        state.skip(style.block_gap);

        let columns = ColumnSet::for_config(&style.columns, config);
        let rows = table_rows(&model.rooms, &style.labels);
        let metrics = RowMetrics::from_style(style);

        let mut total = RunningTotal::default();
        for row in &rows {
            total.add(row.cost.unwrap_or(0.0));
        }

        let header_height = self.table_header_height(&columns, metrics)?;
        let heights = rows
            .iter()
            .map(|row| self.table_row_height(row, &columns, metrics))
            .collect::<Result<Vec<_>, _>>()?;
        let summary_height = if columns.has_cost() {
            Some(self.summary_height(&columns, total.value(), metrics)?)
        } else {
            None
        };

        // The table header travels with whatever block comes first.
        let (first_height, first_threshold) = match (heights.first(), summary_height) {
            (Some(&h), _) => (h, style.row_threshold()),
            (None, Some(h)) => (h, style.summary_threshold()),
            (None, None) => (0.0, style.row_threshold()),
        };
        state.phase = Phase::TableHeader;
        if !fits(state.y, header_height + first_height, page_height, first_threshold) {
            sink.add_page()?;
            state = state.next_page(0.0);
        }
        self.draw_table_header(sink, &columns, state.y, header_height)?;
        state.skip(header_height);

        state.phase = Phase::TableRow;
        let (mut state, row_placements) =
            paginate(state, &heights, style.row_threshold(), header_height);
        for (row, placement) in rows.iter().zip(&row_placements) {
            self.follow_placement(sink, &columns, placement, header_height)?;
            self.draw_table_row(sink, &columns, row, placement)?;
        }

        let summary = match summary_height {
            Some(height) => {
                state.phase = Phase::SummaryRow;
                let (next, placement) =
                    step(state, height, style.summary_threshold(), header_height);
                state = next;
                self.follow_placement(sink, &columns, &placement, header_height)?;
                self.draw_summary_row(sink, &columns, total.value(), &placement)?;
                Some(placement)
            }
            None => None,
        };

        state.phase = Phase::Finalizing;
        log::debug!(
            "laid out protocol '{}': {} rows on {} pages, ending at y={:.1} on page {}",
            model.id,
            rows.len(),
            sink.page_count(),
            state.y,
            state.page_index + 1
        );

        Ok(LayoutOutcome {
            pages: sink.page_count(),
            rows: rows.len(),
            total_cost: total.value(),
            row_placements,
            summary,
        })
    }

    /// Open the page a planned block needs and repeat the table header.
    fn follow_placement<S: DocumentSink + ?Sized>(
        &self,
        sink: &mut S,
        columns: &ColumnSet,
        placement: &Placement,
        header_height: f64,
    ) -> Result<(), ReportError> {
        if placement.breaks_before {
            log::debug!(
                "page break before {:.1}pt block, opening page {}",
                placement.height,
                placement.page + 1
            );
            sink.add_page()?;
            self.draw_table_header(sink, columns, self.style.margin.top, header_height)?;
        }
        if placement.overflows {
            log::warn!(
                "block of {:.1}pt does not fit on page {}; drawing it past the bottom threshold",
                placement.height,
                placement.page + 1
            );
        }
        Ok(())
    }

    // ── Header block ────────────────────────────────────────────

    fn draw_header_block<S: DocumentSink + ?Sized>(
        &self,
        model: &ReportModel,
        sink: &mut S,
        state: &mut LayoutState,
    ) -> Result<(), ReportError> {
        let style = &self.style;
        let left = style.margin.left;
        let width = style.content_width();
        state.phase = Phase::Header;

        // The logo is decorative: a failure here is the one drawing error
        // a render survives.
        if let Some(logo) = &style.logo {
            if let Err(e) = sink.draw_image(&logo.src, left, state.y, logo.width) {
                log::warn!("skipping header logo '{}': {}", logo.src, e);
            }
        }

        let title_font = &style.fonts.title;
        let title_slack = (style.header_band_height - title_font.line_advance()).max(0.0);
        let title_y = state.y + title_slack / 2.0;
        let title_align = if style.logo.is_some() {
            TextAlign::Right
        } else {
            TextAlign::Left
        };
        sink.draw_text(
            &style.labels.title,
            left,
            title_y,
            &text_options(title_font, Some(width), title_align, style.colors.text),
        )?;
        state.skip(style.header_band_height);

        let metrics = RowMetrics::from_style(style);
        for grid_row in self.info_grid(model) {
            let cell_width = width / grid_row.len() as f64;
            let cells: Vec<InfoCell<'_>> = grid_row
                .iter()
                .map(|(label, value)| InfoCell {
                    label: *label,
                    value: value.as_str(),
                })
                .collect();
            let height = info_row_height(
                &self.measurer,
                &cells,
                cell_width,
                &style.fonts.bold,
                &style.fonts.body,
                style.label_gap,
                metrics,
            )?;
            self.draw_info_row(sink, &cells, cell_width, state.y, height)?;
            state.skip(height);
        }
        Ok(())
    }

    fn info_grid(&self, model: &ReportModel) -> [Vec<(&str, String)>; 3] {
        let labels = &self.style.labels;
        let or_none = |value: &str| {
            if value.trim().is_empty() {
                labels.none.clone()
            } else {
                value.to_string()
            }
        };
        let yes_no = |flag: bool| {
            if flag {
                labels.yes.clone()
            } else {
                labels.no.clone()
            }
        };

        [
            vec![
                (labels.protocol_id.as_str(), model.id.clone()),
                (labels.date.as_str(), model.date.clone()),
                (labels.address.as_str(), model.address.clone()),
            ],
            vec![
                (labels.apartment_code.as_str(), or_none(&model.apartment_code)),
                (labels.residence_id.as_str(), or_none(&model.residence_id)),
                (
                    labels.lease_start.as_str(),
                    or_none(model.lease_start_date.as_deref().unwrap_or("")),
                ),
                (
                    labels.area.as_str(),
                    model
                        .area_size
                        .map(|a| format!("{} m\u{b2}", a))
                        .unwrap_or_else(|| labels.none.clone()),
                ),
            ],
            vec![
                (
                    labels.residence_type.as_str(),
                    or_none(model.residence_type.as_deref().unwrap_or("")),
                ),
                (labels.furnished.as_str(), yes_no(model.is_furnished)),
                (
                    labels.tenant_present.as_str(),
                    yes_no(model.tenant_present_flags.tenant_present),
                ),
                (
                    labels.new_tenant_present.as_str(),
                    yes_no(model.tenant_present_flags.new_tenant_present),
                ),
            ],
        ]
    }

    fn draw_info_row<S: DocumentSink + ?Sized>(
        &self,
        sink: &mut S,
        cells: &[InfoCell<'_>],
        cell_width: f64,
        y: f64,
        height: f64,
    ) -> Result<(), ReportError> {
        let style = &self.style;
        let inner = cell_width - style.cell_padding;
        let label_options = text_options(
            &style.fonts.bold,
            Some(inner),
            TextAlign::Left,
            style.colors.muted,
        );
        let value_options = text_options(
            &style.fonts.body,
            Some(inner),
            TextAlign::Left,
            style.colors.text,
        );
        let top = y + style.row_padding / 2.0;

        for (i, cell) in cells.iter().enumerate() {
            let x = style.margin.left + i as f64 * cell_width + style.cell_padding / 2.0;
            let label_height = self.measurer.measure(cell.label, &style.fonts.bold, inner)?;
            sink.draw_text(cell.label, x, top, &label_options)?;
            sink.draw_text(cell.value, x, top + label_height + style.label_gap, &value_options)?;
        }
        self.rule(sink, style.margin.left, y + height, style.content_width())
    }

    // ── Remarks table ───────────────────────────────────────────

    fn table_header_height(
        &self,
        columns: &ColumnSet,
        metrics: RowMetrics,
    ) -> Result<f64, ReportError> {
        let labels = &self.style.labels;
        let cells: Vec<CellText<'_>> = columns
            .columns()
            .iter()
            .map(|c| CellText {
                text: c.heading(labels),
                width: c.width,
            })
            .collect();
        Ok(row_height(&self.measurer, &cells, &self.style.fonts.bold, metrics)?)
    }

    fn table_row_height(
        &self,
        row: &TableRow,
        columns: &ColumnSet,
        metrics: RowMetrics,
    ) -> Result<f64, ReportError> {
        let texts: Vec<_> = columns.columns().iter().map(|c| row.cell(c.kind)).collect();
        let cells: Vec<CellText<'_>> = texts
            .iter()
            .zip(columns.columns())
            .map(|(text, c)| CellText {
                text,
                width: c.width,
            })
            .collect();
        Ok(row_height(&self.measurer, &cells, &self.style.fonts.body, metrics)?)
    }

    fn summary_height(
        &self,
        columns: &ColumnSet,
        total: f64,
        metrics: RowMetrics,
    ) -> Result<f64, ReportError> {
        let cells = self.summary_cells(columns, total);
        let cells: Vec<CellText<'_>> = cells
            .iter()
            .map(|(text, width, _)| CellText { text, width: *width })
            .collect();
        Ok(row_height(&self.measurer, &cells, &self.style.fonts.bold, metrics)?)
    }

    /// `(text, width, x offset)` of the summary: the label spans every
    /// column but the last, the total sits in the cost column.
    fn summary_cells(&self, columns: &ColumnSet, total: f64) -> [(String, f64, f64); 2] {
        let cost_width = columns
            .columns()
            .iter()
            .find(|c| c.kind == ColumnKind::Cost)
            .map_or(0.0, |c| c.width);
        let label_width = columns.total_width() - cost_width;
        [
            (self.style.labels.total.clone(), label_width, 0.0),
            (format_cost(total), cost_width, label_width),
        ]
    }

    fn draw_table_header<S: DocumentSink + ?Sized>(
        &self,
        sink: &mut S,
        columns: &ColumnSet,
        y: f64,
        height: f64,
    ) -> Result<(), ReportError> {
        let style = &self.style;
        let left = style.margin.left;
        if let Some(fill) = style.colors.header_fill {
            sink.draw_rect(Rect::new(left, y, columns.total_width(), height), fill)?;
        }
        for (column, x) in columns.columns().iter().zip(columns.x_positions(left)) {
            sink.draw_text(
                column.heading(&style.labels),
                x + style.cell_padding / 2.0,
                y + style.row_padding / 2.0,
                &text_options(
                    &style.fonts.bold,
                    Some(column.width - style.cell_padding),
                    column.align(),
                    style.colors.header_text,
                ),
            )?;
        }
        self.rule(sink, left, y + height, columns.total_width())
    }

    fn draw_table_row<S: DocumentSink + ?Sized>(
        &self,
        sink: &mut S,
        columns: &ColumnSet,
        row: &TableRow,
        placement: &Placement,
    ) -> Result<(), ReportError> {
        let style = &self.style;
        let left = style.margin.left;
        if row.shaded() {
            if let Some(shade) = style.colors.shade {
                sink.draw_rect(
                    Rect::new(left, placement.y, columns.total_width(), placement.height),
                    shade,
                )?;
            }
        }
        for (column, x) in columns.columns().iter().zip(columns.x_positions(left)) {
            let text = row.cell(column.kind);
            if text.is_empty() {
                continue;
            }
            sink.draw_text(
                &text,
                x + style.cell_padding / 2.0,
                placement.y + style.row_padding / 2.0,
                &text_options(
                    &style.fonts.body,
                    Some(column.width - style.cell_padding),
                    column.align(),
                    style.colors.text,
                ),
            )?;
        }
        self.rule(sink, left, placement.y + placement.height, columns.total_width())
    }

    fn draw_summary_row<S: DocumentSink + ?Sized>(
        &self,
        sink: &mut S,
        columns: &ColumnSet,
        total: f64,
        placement: &Placement,
    ) -> Result<(), ReportError> {
        let style = &self.style;
        let left = style.margin.left;
        for (i, (text, width, offset)) in self.summary_cells(columns, total).iter().enumerate() {
            let align = if i == 0 { TextAlign::Left } else { TextAlign::Right };
            sink.draw_text(
                text,
                left + offset + style.cell_padding / 2.0,
                placement.y + style.row_padding / 2.0,
                &text_options(
                    &style.fonts.bold,
                    Some(width - style.cell_padding),
                    align,
                    style.colors.text,
                ),
            )?;
        }
        self.rule(sink, left, placement.y, columns.total_width())
    }

    fn rule<S: DocumentSink + ?Sized>(
        &self,
        sink: &mut S,
        x: f64,
        y: f64,
        width: f64,
    ) -> Result<(), ReportError> {
        sink.draw_line(
            (x, y),
            (x + width, y),
            LineStyle {
                width: self.style.grid_line_width,
                color: self.style.colors.grid,
            },
        )?;
        Ok(())
    }
}

fn text_options(
    font: &FontSpec,
    width: Option<f64>,
    align: TextAlign,
    color: Color,
) -> TextOptions {
    TextOptions {
        width,
        align,
        font: font.clone(),
        color,
    }
}
