//! # Style Sheet
//!
//! Every color, font, spacing and fixed label the engine uses lives in one
//! immutable [`StyleSheet`] value handed to the layout engine at
//! construction. Nothing is global, so a light sheet and a print sheet can
//! be used side by side in the same process.
//!
//! All types deserialize with full defaults: a JSON stylesheet only needs to
//! name the values it overrides.

use serde::{Deserialize, Serialize};

/// An RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(v: f64) -> Self {
        Self { r: v, g: v, b: v }
    }
}

/// Horizontal alignment of text inside its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A font face plus the size it is set at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: String,
    /// 100-900; anything >= 600 resolves to the bold face.
    #[serde(default = "default_weight")]
    pub weight: u32,
    pub size: f64,
    /// Line height as a multiplier of `size`.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
}

fn default_weight() -> u32 {
    400
}

fn default_line_height() -> f64 {
    1.2
}

impl FontSpec {
    pub fn new(family: &str, weight: u32, size: f64) -> Self {
        Self {
            family: family.to_string(),
            weight,
            size,
            line_height: default_line_height(),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight >= 600
    }

    /// Distance between consecutive baselines.
    pub fn line_advance(&self) -> f64 {
        self.size * self.line_height
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for page margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }
}

/// Fonts used by the different text roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fonts {
    pub body: FontSpec,
    /// Info-grid labels, table headings and the summary row.
    pub bold: FontSpec,
    pub title: FontSpec,
    pub footer: FontSpec,
}

impl Default for Fonts {
    fn default() -> Self {
        Self {
            body: FontSpec::new("Helvetica", 400, 9.0),
            bold: FontSpec::new("Helvetica", 700, 9.0),
            title: FontSpec::new("Helvetica", 700, 18.0),
            footer: FontSpec::new("Helvetica", 400, 8.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Palette {
    pub text: Color,
    /// Info-grid labels.
    pub muted: Color,
    pub header_fill: Option<Color>,
    pub header_text: Color,
    /// Fill for odd-parity remark rows.
    pub shade: Option<Color>,
    pub grid: Color,
    pub footer: Color,
    /// Page background; the footer band is cleared with it before stamping.
    pub paper: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            text: Color::gray(0.1),
            muted: Color::gray(0.4),
            header_fill: Some(Color::rgb(0.12, 0.2, 0.33)),
            header_text: Color::WHITE,
            shade: Some(Color::rgb(0.95, 0.96, 0.98)),
            grid: Color::gray(0.8),
            footer: Color::gray(0.45),
            paper: Color::WHITE,
        }
    }
}

/// Fixed widths of the remarks-table columns in points.
///
/// The first four are the same whether or not costs are shown; the cost
/// column is appended or omitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnWidths {
    pub room: f64,
    pub component: f64,
    pub description: f64,
    pub status: f64,
    pub cost: f64,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self {
            room: 95.0,
            component: 95.0,
            description: 185.0,
            status: 60.0,
            cost: 60.0,
        }
    }
}

/// Decorative image drawn in the top-left corner of the first page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logo {
    /// File path, data URI, or raw base64.
    pub src: String,
    pub width: f64,
}

/// Every fixed string printed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Labels {
    pub title: String,
    pub protocol_id: String,
    pub date: String,
    pub address: String,
    pub apartment_code: String,
    pub residence_id: String,
    pub lease_start: String,
    pub area: String,
    pub residence_type: String,
    pub furnished: String,
    pub tenant_present: String,
    pub new_tenant_present: String,
    pub yes: String,
    pub no: String,
    /// Printed for absent optional values.
    pub none: String,
    pub room: String,
    pub component: String,
    pub description: String,
    pub status: String,
    pub cost: String,
    pub no_remark: String,
    pub ok: String,
    pub total: String,
    pub page: String,
    pub of: String,
    pub generated: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            title: "Inspection protocol".into(),
            protocol_id: "Protocol".into(),
            date: "Date".into(),
            address: "Address".into(),
            apartment_code: "Apartment code".into(),
            residence_id: "Residence id".into(),
            lease_start: "Lease start".into(),
            area: "Area".into(),
            residence_type: "Residence type".into(),
            furnished: "Furnished".into(),
            tenant_present: "Tenant present".into(),
            new_tenant_present: "New tenant present".into(),
            yes: "yes".into(),
            no: "no".into(),
            none: "-".into(),
            room: "Room".into(),
            component: "Component".into(),
            description: "Description".into(),
            status: "Status".into(),
            cost: "Cost".into(),
            no_remark: "no remark".into(),
            ok: "OK".into(),
            total: "Total".into(),
            page: "page".into(),
            of: "of".into(),
            generated: "generated".into(),
        }
    }
}

/// The complete, immutable styling of one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleSheet {
    pub page_size: PageSize,
    pub margin: Edges,
    pub fonts: Fonts,
    pub colors: Palette,
    pub columns: ColumnWidths,
    /// Horizontal padding inside a cell, both sides together. Subtracted
    /// from the column width before text is measured.
    pub cell_padding: f64,
    /// Vertical padding added to the tallest cell of a row.
    pub row_padding: f64,
    pub min_row_height: f64,
    /// Space between an info-grid label and its value.
    pub label_gap: f64,
    /// Space between the header block and the table.
    pub block_gap: f64,
    /// Height reserved at the top of the first page for logo and title.
    pub header_band_height: f64,
    /// Ordinary rows must end this far above the page bottom. Values below
    /// `margin.bottom` are raised to it, since the footer pass repaints that
    /// band.
    pub row_bottom_threshold: f64,
    /// The summary row may sit closer to the bottom edge, but never inside
    /// the bottom margin either.
    pub summary_bottom_threshold: f64,
    /// Footer baseline offset below the bottom margin line.
    pub footer_offset: f64,
    pub footer_time_format: String,
    pub grid_line_width: f64,
    pub logo: Option<Logo>,
    pub labels: Labels,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin: Edges::uniform(50.0),
            fonts: Fonts::default(),
            colors: Palette::default(),
            columns: ColumnWidths::default(),
            cell_padding: 8.0,
            row_padding: 8.0,
            min_row_height: 20.0,
            label_gap: 2.0,
            block_gap: 16.0,
            header_band_height: 48.0,
            row_bottom_threshold: 80.0,
            summary_bottom_threshold: 50.0,
            footer_offset: 10.0,
            footer_time_format: "%Y-%m-%d %H:%M".into(),
            grid_line_width: 0.5,
            logo: None,
            labels: Labels::default(),
        }
    }
}

impl StyleSheet {
    /// Print variant: no fills, black text, darker grid lines.
    pub fn monochrome() -> Self {
        Self {
            colors: Palette {
                text: Color::BLACK,
                muted: Color::gray(0.3),
                header_fill: None,
                header_text: Color::BLACK,
                shade: None,
                grid: Color::gray(0.2),
                footer: Color::BLACK,
                paper: Color::WHITE,
            },
            ..Self::default()
        }
    }

    pub fn page_dimensions(&self) -> (f64, f64) {
        self.page_size.dimensions()
    }

    pub fn content_width(&self) -> f64 {
        self.page_dimensions().0 - self.margin.horizontal()
    }

    /// Bottom threshold applied to table rows.
    pub fn row_threshold(&self) -> f64 {
        self.row_bottom_threshold.max(self.margin.bottom)
    }

    /// Bottom threshold applied to the summary row.
    pub fn summary_threshold(&self) -> f64 {
        self.summary_bottom_threshold.max(self.margin.bottom)
    }

    pub fn with_logo(mut self, src: impl Into<String>, width: f64) -> Self {
        self.logo = Some(Logo {
            src: src.into(),
            width,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_columns_fit_content_width() {
        let style = StyleSheet::default();
        let c = style.columns;
        let total = c.room + c.component + c.description + c.status + c.cost;
        assert!(total <= style.content_width(), "{} > {}", total, style.content_width());
    }

    #[test]
    fn test_summary_threshold_is_smaller() {
        let style = StyleSheet::default();
        assert!(style.summary_bottom_threshold < style.row_bottom_threshold);
    }

    #[test]
    fn test_thresholds_never_reach_into_footer_band() {
        let mut style = StyleSheet::default();
        assert_eq!(style.row_threshold(), 80.0);
        assert_eq!(style.summary_threshold(), 50.0);

        style.row_bottom_threshold = 10.0;
        style.summary_bottom_threshold = 0.0;
        assert_eq!(style.row_threshold(), style.margin.bottom);
        assert_eq!(style.summary_threshold(), style.margin.bottom);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let style: StyleSheet = serde_json::from_str(
            r#"{ "pageSize": "Letter", "labels": { "title": "Besiktningsprotokoll" } }"#,
        )
        .unwrap();
        assert_eq!(style.page_dimensions(), (612.0, 792.0));
        assert_eq!(style.labels.title, "Besiktningsprotokoll");
        assert_eq!(style.labels.no_remark, "no remark");
        assert_eq!(style.row_bottom_threshold, 80.0);
    }

    #[test]
    fn test_monochrome_has_no_fills() {
        let style = StyleSheet::monochrome();
        assert!(style.colors.header_fill.is_none());
        assert!(style.colors.shade.is_none());
        assert_eq!(style.columns, StyleSheet::default().columns);
    }
}
