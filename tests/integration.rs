//! Integration tests for the inspection report pipeline.
//!
//! These tests drive the public API end to end. They verify:
//! - Invalid models are rejected before anything is drawn
//! - Rows are placed whole, below a table header on every page
//! - Costs are totalled whether or not they are shown
//! - Every page gets the same footer page count and timestamp
//! - PDF output is structurally valid

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Local, TimeZone};
use pretty_assertions::assert_eq;

use inspection_report::error::{SinkError, ValidationError};
use inspection_report::layout::footer::stamp_footers;
use inspection_report::layout::{LayoutEngine, LayoutOutcome};
use inspection_report::pdf::PdfSink;
use inspection_report::sink::{
    DocumentSink, LineStyle, RecordedPage, RecordingSink, Rect, TextOptions,
};
use inspection_report::style::{Color, StyleSheet};
use inspection_report::text::FontMeasurer;
use inspection_report::{Remark, RenderConfig, ReportError, ReportModel, RoomGroup};

// ─── Helpers ────────────────────────────────────────────────────

const TIMESTAMP: &str = "2026-03-02 14:05";

const LONG_DESCRIPTION: &str = "Paint is flaking along the lower edge of the wall and the \
    plaster underneath shows water damage that needs a closer look by a contractor.";

fn base_model(rooms: Vec<RoomGroup>) -> ReportModel {
    ReportModel {
        id: "P-2026-017".into(),
        date: "2026-03-02".into(),
        address: "Storgatan 1, 722 15 Västerås".into(),
        apartment_code: "1101".into(),
        residence_id: "R-88".into(),
        lease_start_date: Some("2021-10-01".into()),
        area_size: Some(54.5),
        residence_type: Some("2 rok".into()),
        rooms,
        ..Default::default()
    }
}

/// One room with `n` long remarks, `Component {i}` costing `100 * (i + 1)`.
fn long_room(n: usize) -> RoomGroup {
    let remarks = (0..n)
        .map(|i| {
            Remark::new(format!("Component {}", i), LONG_DESCRIPTION)
                .with_status("Damaged")
                .with_cost(100.0 * (i + 1) as f64)
        })
        .collect();
    RoomGroup::new("Living room", remarks)
}

fn engine() -> LayoutEngine<FontMeasurer> {
    LayoutEngine::new(StyleSheet::default(), FontMeasurer::new())
        .with_timestamp(Local.with_ymd_and_hms(2026, 3, 2, 14, 5, 0).unwrap())
}

/// Both passes against a recording sink, which stays inspectable.
fn two_pass(model: &ReportModel, config: &RenderConfig) -> (LayoutOutcome, RecordingSink) {
    let engine = engine();
    let mut sink = RecordingSink::new();
    let outcome = engine.layout(model, config, &mut sink).unwrap();
    let stamped = stamp_footers(&mut sink, engine.style(), TIMESTAMP).unwrap();
    assert_eq!(stamped, sink.page_count());
    (outcome, sink)
}

fn count_text(page: &RecordedPage, needle: &str) -> usize {
    page.texts().filter(|(t, _, _)| *t == needle).count()
}

fn text_y(page: &RecordedPage, needle: &str) -> Option<f64> {
    page.texts().find(|(t, _, _)| *t == needle).map(|(_, _, y)| y)
}

fn footers(sink: &RecordingSink) -> Vec<String> {
    sink.pages()
        .iter()
        .flat_map(|p| p.texts())
        .filter(|(t, _, _)| t.starts_with("page "))
        .map(|(t, _, _)| t.to_string())
        .collect()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(contains(bytes, "%%EOF"), "Missing %%EOF marker");
    assert!(contains(bytes, "xref"), "Missing xref table");
    assert!(contains(bytes, "trailer"), "Missing trailer");
}

fn contains(bytes: &[u8], needle: &str) -> bool {
    bytes.windows(needle.len()).any(|w| w == needle.as_bytes())
}

/// Counts every call; used to prove nothing was drawn.
struct CountingSink {
    calls: Rc<Cell<usize>>,
}

impl CountingSink {
    fn tick(&self) -> Result<(), SinkError> {
        self.calls.set(self.calls.get() + 1);
        Ok(())
    }
}

impl DocumentSink for CountingSink {
    fn add_page(&mut self) -> Result<(), SinkError> {
        self.tick()
    }
    fn draw_rect(&mut self, _: Rect, _: Color) -> Result<(), SinkError> {
        self.tick()
    }
    fn draw_text(&mut self, _: &str, _: f64, _: f64, _: &TextOptions) -> Result<(), SinkError> {
        self.tick()
    }
    fn draw_line(&mut self, _: (f64, f64), _: (f64, f64), _: LineStyle) -> Result<(), SinkError> {
        self.tick()
    }
    fn draw_image(&mut self, _: &str, _: f64, _: f64, _: f64) -> Result<(), SinkError> {
        self.tick()
    }
    fn switch_to_page(&mut self, _: usize) -> Result<(), SinkError> {
        self.tick()
    }
    fn page_count(&self) -> usize {
        0
    }
    fn current_page(&self) -> Option<usize> {
        None
    }
    fn finish(self) -> Result<Vec<u8>, SinkError> {
        self.tick()?;
        Ok(Vec::new())
    }
}

// ─── Validation ─────────────────────────────────────────────────

#[test]
fn test_blank_required_field_draws_nothing() {
    for field in ["id", "date", "address"] {
        let mut model = base_model(vec![long_room(3)]);
        match field {
            "id" => model.id.clear(),
            "date" => model.date = "   ".into(),
            _ => model.address.clear(),
        }

        let calls = Rc::new(Cell::new(0));
        let sink = CountingSink {
            calls: Rc::clone(&calls),
        };
        let err = engine()
            .render(&model, &RenderConfig::default(), sink)
            .unwrap_err();

        match err {
            ReportError::Validation(ValidationError::MissingField(name)) => assert_eq!(name, field),
            other => panic!("expected a validation error, got {:?}", other),
        }
        assert_eq!(calls.get(), 0, "sink touched for blank `{}`", field);
    }
}

#[test]
fn test_null_json_is_missing_model() {
    let err = inspection_report::render_json("null", &RenderConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ReportError::Validation(ValidationError::MissingField("model"))
    ));
}

#[test]
fn test_malformed_json_is_parse_error() {
    let err = inspection_report::render_json(r#"{"id": "P-1","#, &RenderConfig::default())
        .unwrap_err();
    assert!(matches!(err, ReportError::Parse { .. }));
}

// ─── Pagination ─────────────────────────────────────────────────

#[test]
fn test_rows_never_straddle_pages() {
    let style = StyleSheet::default();
    let (_, page_height) = style.page_dimensions();
    let model = base_model(vec![long_room(30)]);
    let (outcome, sink) = two_pass(&model, &RenderConfig::default());

    assert_eq!(outcome.row_placements.len(), 30);
    for (i, placement) in outcome.row_placements.iter().enumerate() {
        assert!(!placement.overflows);
        assert!(
            placement.y + placement.height <= page_height - style.row_bottom_threshold,
            "row {} ends at {} on page {}",
            i,
            placement.y + placement.height,
            placement.page
        );
        let page = &sink.pages()[placement.page];
        assert!(page.contains_text(&format!("Component {}", i)));
    }
}

#[test]
fn test_table_header_once_above_rows_on_every_page() {
    let model = base_model(vec![long_room(30)]);
    let (outcome, sink) = two_pass(&model, &RenderConfig::default());

    for (index, page) in sink.pages().iter().enumerate() {
        let rows_here: Vec<usize> = outcome
            .row_placements
            .iter()
            .enumerate()
            .filter(|(_, p)| p.page == index)
            .map(|(i, _)| i)
            .collect();
        if rows_here.is_empty() {
            continue;
        }
        assert_eq!(count_text(page, "Room"), 1, "page {}", index);
        let header_y = text_y(page, "Room").unwrap();
        let first_row_y = text_y(page, &format!("Component {}", rows_here[0])).unwrap();
        assert!(header_y < first_row_y);
    }
}

#[test]
fn test_cursor_advances_by_row_height() {
    let model = base_model(vec![long_room(30)]);
    let (outcome, _) = two_pass(&model, &RenderConfig::default());

    for pair in outcome.row_placements.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.page == b.page {
            assert!(b.y > a.y);
            assert!((b.y - (a.y + a.height)).abs() < 1e-9);
        } else {
            assert_eq!(b.page, a.page + 1);
            assert!(b.breaks_before);
        }
    }
}

// ─── Costs ──────────────────────────────────────────────────────

#[test]
fn test_total_is_the_same_with_and_without_costs() {
    let model = base_model(vec![long_room(12), RoomGroup::new("Hall", vec![])]);
    let expected: f64 = (1..=12).map(|i| 100.0 * i as f64).sum();

    let (with_costs, with_sink) = two_pass(&model, &RenderConfig { include_costs: true });
    let (without_costs, without_sink) = two_pass(&model, &RenderConfig { include_costs: false });
    assert_eq!(with_costs.total_cost, expected);
    assert_eq!(without_costs.total_cost, expected);

    assert!(with_sink.finish().unwrap().len() >= without_sink.finish().unwrap().len());

    let with_pdf = engine()
        .render(&model, &RenderConfig { include_costs: true }, PdfSink::new(595.28, 841.89))
        .unwrap();
    let without_pdf = engine()
        .render(&model, &RenderConfig { include_costs: false }, PdfSink::new(595.28, 841.89))
        .unwrap();
    assert!(with_pdf.bytes.len() >= without_pdf.bytes.len());
}

// ─── Footers ────────────────────────────────────────────────────

#[test]
fn test_every_footer_agrees_on_count_and_time() {
    let model = base_model(vec![long_room(30)]);
    let (outcome, sink) = two_pass(&model, &RenderConfig::default());
    let total = sink.page_count();
    assert_eq!(outcome.pages, total);

    let expected: Vec<String> = (1..=total)
        .map(|i| format!("page {} of {} \u{2022} generated {}", i, total, TIMESTAMP))
        .collect();
    assert_eq!(footers(&sink), expected);
}

#[test]
fn test_render_reports_footer_timestamp() {
    let report = engine()
        .render(&base_model(vec![]), &RenderConfig::default(), RecordingSink::new())
        .unwrap();
    assert_eq!(report.timestamp, TIMESTAMP);
}

// ─── Scenarios ──────────────────────────────────────────────────

#[test]
fn test_zero_rooms() {
    let model = base_model(vec![]);

    let (outcome, sink) = two_pass(&model, &RenderConfig { include_costs: true });
    assert_eq!(outcome.pages, 1);
    assert_eq!(outcome.rows, 0);
    let page = &sink.pages()[0];
    assert!(page.contains_text("Inspection protocol"));
    assert_eq!(count_text(page, "Room"), 1);
    assert!(page.contains_text("Total"));
    assert!(page.contains_text("0.00"));

    let (outcome, sink) = two_pass(&model, &RenderConfig { include_costs: false });
    assert!(outcome.summary.is_none());
    let page = &sink.pages()[0];
    assert_eq!(count_text(page, "Room"), 1);
    assert!(!page.contains_text("Total"));
}

#[test]
fn test_room_without_remarks() {
    let model = base_model(vec![RoomGroup::new("Balcony", vec![])]);
    let (outcome, sink) = two_pass(&model, &RenderConfig::default());

    assert_eq!(outcome.rows, 1);
    assert_eq!(outcome.total_cost, 0.0);
    let page = &sink.pages()[0];
    assert!(page.contains_text("Balcony"));
    assert!(page.contains_text("no remark"));
    assert!(page.contains_text("OK"));
}

#[test]
fn test_long_table_repeats_header_on_new_pages() {
    let model = base_model(vec![long_room(30)]);
    let (outcome, sink) = two_pass(&model, &RenderConfig::default());

    assert!(outcome.pages >= 2, "expected overflow, got {} page(s)", outcome.pages);
    for page in &sink.pages()[1..] {
        let first_text = page.texts().next().map(|(t, _, _)| t);
        assert_eq!(first_text, Some("Room"));
    }
    assert_eq!(footers(&sink).len(), sink.page_count());
    // The room name is printed once, on its first row only.
    let names: usize = sink.pages().iter().map(|p| count_text(p, "Living room")).sum();
    assert_eq!(names, 1);
}

#[test]
fn test_costs_hidden() {
    let model = base_model(vec![long_room(4)]);
    let (outcome, sink) = two_pass(&model, &RenderConfig { include_costs: false });

    assert_eq!(outcome.total_cost, 1000.0);
    assert!(outcome.summary.is_none());
    for page in sink.pages() {
        assert!(!page.contains_text("Cost"));
        assert!(!page.contains_text("Total"));
        assert!(!page.contains_text("100.00"));
        assert!(!page.contains_text("1 000.00"));
    }
}

// ─── PDF output ─────────────────────────────────────────────────

#[test]
fn test_render_produces_valid_pdf() {
    let bytes = inspection_report::render(
        &base_model(vec![long_room(2)]),
        &RenderConfig::default(),
    )
    .unwrap();
    assert_valid_pdf(&bytes);
    assert!(contains(&bytes, "/Count 1"));
}

#[test]
fn test_pdf_page_count_matches_layout() {
    let model = base_model(vec![long_room(30)]);
    let report = engine()
        .render(&model, &RenderConfig::default(), PdfSink::new(595.28, 841.89))
        .unwrap();
    assert_valid_pdf(&report.bytes);
    assert!(report.outcome.pages >= 2);
    assert!(contains(&report.bytes, &format!("/Count {}", report.outcome.pages)));
}

#[test]
fn test_missing_logo_is_not_fatal() {
    let style = StyleSheet::default().with_logo("./no/such/logo.png", 90.0);
    let bytes = inspection_report::render_with_style(
        &base_model(vec![long_room(1)]),
        &RenderConfig::default(),
        style,
    )
    .unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn test_render_json() {
    let json = r#"{
        "id": "P-9",
        "date": "2026-05-11",
        "address": "Kungsgatan 4",
        "isFurnished": true,
        "tenantPresentFlags": { "tenantPresent": true },
        "rooms": [
            { "roomName": "Kitchen", "remarks": [
                { "buildingComponent": "Stove", "notes": "Burn mark", "status": "Damaged", "cost": 1200 }
            ]},
            { "roomName": "Hall", "remarks": [] }
        ]
    }"#;
    let bytes = inspection_report::render_json(json, &RenderConfig { include_costs: false }).unwrap();
    assert_valid_pdf(&bytes);
}
