//! The remarks table: columns, physical rows and the cost total.
//!
//! A room is a display group, not a layout unit. Each remark becomes one
//! physical row; the room name is printed only on the group's first row.
//! A room without remarks still gets one placeholder row.

use std::borrow::Cow;

use crate::model::{RenderConfig, RoomGroup};
use crate::style::{ColumnWidths, Labels, TextAlign};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Room,
    Component,
    Description,
    Status,
    Cost,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub kind: ColumnKind,
    pub width: f64,
}

impl Column {
    pub fn heading<'a>(&self, labels: &'a Labels) -> &'a str {
        match self.kind {
            ColumnKind::Room => &labels.room,
            ColumnKind::Component => &labels.component,
            ColumnKind::Description => &labels.description,
            ColumnKind::Status => &labels.status,
            ColumnKind::Cost => &labels.cost,
        }
    }

    pub fn align(&self) -> TextAlign {
        match self.kind {
            ColumnKind::Cost => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }
}

/// Ordered columns of the remarks table, fixed for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    /// Four columns, plus the cost column when costs are included.
    pub fn for_config(widths: &ColumnWidths, config: &RenderConfig) -> Self {
        let mut columns = vec![
            Column {
                kind: ColumnKind::Room,
                width: widths.room,
            },
            Column {
                kind: ColumnKind::Component,
                width: widths.component,
            },
            Column {
                kind: ColumnKind::Description,
                width: widths.description,
            },
            Column {
                kind: ColumnKind::Status,
                width: widths.status,
            },
        ];
        if config.include_costs {
            columns.push(Column {
                kind: ColumnKind::Cost,
                width: widths.cost,
            });
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_cost(&self) -> bool {
        self.columns.iter().any(|c| c.kind == ColumnKind::Cost)
    }

    pub fn total_width(&self) -> f64 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Left edge of every column, starting at `left`.
    pub fn x_positions(&self, left: f64) -> Vec<f64> {
        self.columns
            .iter()
            .scan(left, |x, c| {
                let at = *x;
                *x += c.width;
                Some(at)
            })
            .collect()
    }
}

/// One physical, unsplittable row of the remarks table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Empty on every row of a group but the first.
    pub room: String,
    pub component: String,
    pub description: String,
    pub status: String,
    /// `None` on the placeholder row of a room without remarks.
    pub cost: Option<f64>,
    pub group_index: usize,
    pub remark_index: usize,
}

impl TableRow {
    /// Alternating fill, keyed on position within the grouping loop rather
    /// than a running row counter. Two neighbouring rows can share a parity
    /// where an odd-sized room ends.
    pub fn shaded(&self) -> bool {
        (self.group_index + self.remark_index) % 2 == 1
    }

    pub fn cell(&self, kind: ColumnKind) -> Cow<'_, str> {
        match kind {
            ColumnKind::Room => Cow::Borrowed(&self.room),
            ColumnKind::Component => Cow::Borrowed(&self.component),
            ColumnKind::Description => Cow::Borrowed(&self.description),
            ColumnKind::Status => Cow::Borrowed(&self.status),
            ColumnKind::Cost => match self.cost {
                Some(cost) => Cow::Owned(format_cost(cost)),
                None => Cow::Borrowed(""),
            },
        }
    }
}

/// Flatten rooms into physical rows.
pub fn table_rows(rooms: &[RoomGroup], labels: &Labels) -> Vec<TableRow> {
    let mut rows = Vec::new();
    for (group_index, group) in rooms.iter().enumerate() {
        if group.remarks.is_empty() {
            rows.push(TableRow {
                room: group.room_name.clone(),
                component: labels.no_remark.clone(),
                description: String::new(),
                status: labels.ok.clone(),
                cost: None,
                group_index,
                remark_index: 0,
            });
            continue;
        }
        for (remark_index, remark) in group.remarks.iter().enumerate() {
            rows.push(TableRow {
                room: if remark_index == 0 {
                    group.room_name.clone()
                } else {
                    String::new()
                },
                component: remark.building_component.clone(),
                description: remark.description.clone(),
                status: remark.status.clone(),
                cost: Some(remark.cost),
                group_index,
                remark_index,
            });
        }
    }
    rows
}

/// Sum of remark costs for one render.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningTotal(f64);

impl RunningTotal {
    pub fn add(&mut self, cost: f64) {
        self.0 += cost;
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Two decimals with space-grouped thousands: `12960.5` -> `"12 960.50"`.
pub fn format_cost(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Remark;
    use pretty_assertions::assert_eq;

    fn rooms() -> Vec<RoomGroup> {
        vec![
            RoomGroup::new(
                "Kitchen",
                vec![
                    Remark::new("Stove", "Burn mark").with_cost(1200.0),
                    Remark::new("Floor", "Scratches").with_status("Worn").with_cost(300.0),
                    Remark::new("Tap", "Drips"),
                ],
            ),
            RoomGroup::new("Hall", vec![]),
            RoomGroup::new("Bedroom", vec![Remark::new("Wall", "Hole").with_cost(450.0)]),
        ]
    }

    #[test]
    fn test_room_name_only_on_first_row() {
        let rows = table_rows(&rooms(), &Labels::default());
        let names: Vec<&str> = rows.iter().map(|r| r.room.as_str()).collect();
        assert_eq!(names, vec!["Kitchen", "", "", "Hall", "Bedroom"]);
    }

    #[test]
    fn test_empty_room_gets_placeholder_row() {
        let rows = table_rows(&[RoomGroup::new("Hall", vec![])], &Labels::default());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.room, "Hall");
        assert_eq!(row.component, "no remark");
        assert_eq!(row.status, "OK");
        assert_eq!(row.cost, None);
        assert_eq!(row.cell(ColumnKind::Cost), "");
    }

    #[test]
    fn test_shading_follows_group_plus_remark_parity() {
        let rows = table_rows(&rooms(), &Labels::default());
        let shading: Vec<bool> = rows.iter().map(TableRow::shaded).collect();
        // Kitchen 0,1,2 -> F,T,F; Hall (1+0) -> T; Bedroom (2+0) -> F.
        assert_eq!(shading, vec![false, true, false, true, false]);

        let rows = table_rows(
            &[
                RoomGroup::new("A", vec![Remark::new("x", ""), Remark::new("y", "")]),
                RoomGroup::new("B", vec![Remark::new("z", "")]),
            ],
            &Labels::default(),
        );
        // Rows 2 and 3 share a parity: the quirk of the grouping loop.
        let shading: Vec<bool> = rows.iter().map(TableRow::shaded).collect();
        assert_eq!(shading, vec![false, true, true]);
    }

    #[test]
    fn test_column_set_appends_cost() {
        let widths = ColumnWidths::default();
        let with = ColumnSet::for_config(&widths, &RenderConfig { include_costs: true });
        let without = ColumnSet::for_config(&widths, &RenderConfig { include_costs: false });
        assert_eq!(with.columns().len(), 5);
        assert_eq!(without.columns().len(), 4);
        assert!(with.has_cost());
        assert!(!without.has_cost());
        assert_eq!(&with.columns()[..4], without.columns());
        assert_eq!(with.total_width() - without.total_width(), widths.cost);
    }

    #[test]
    fn test_x_positions_accumulate_widths() {
        let set = ColumnSet::for_config(&ColumnWidths::default(), &RenderConfig::default());
        assert_eq!(
            set.x_positions(50.0),
            vec![50.0, 145.0, 240.0, 425.0, 485.0]
        );
    }

    #[test]
    fn test_running_total_sums_costs() {
        let mut total = RunningTotal::default();
        for row in table_rows(&rooms(), &Labels::default()) {
            total.add(row.cost.unwrap_or(0.0));
        }
        assert_eq!(total.value(), 1950.0);
    }

    #[test]
    fn test_cost_formatting() {
        assert_eq!(format_cost(0.0), "0.00");
        assert_eq!(format_cost(999.5), "999.50");
        assert_eq!(format_cost(1200.0), "1 200.00");
        assert_eq!(format_cost(12960.456), "12 960.46");
        assert_eq!(format_cost(1234567.0), "1 234 567.00");
        assert_eq!(format_cost(-1500.0), "-1 500.00");
    }
}
