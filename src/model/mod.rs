//! # Report Model
//!
//! The input representation for the engine: one inspection protocol with
//! its property and lease metadata plus an ordered list of rooms, each
//! carrying zero or more remarks.
//!
//! The model is produced upstream (from lease, residence and inspection
//! services) and arrives either as a Rust value or as camelCase JSON. The
//! engine never mutates it.

pub mod validate;

use serde::{Deserialize, Serialize};

pub use validate::validate;

/// A complete inspection protocol ready for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportModel {
    /// Protocol identifier. Required.
    pub id: String,
    /// Inspection date as it should be printed. Required.
    pub date: String,
    /// Street address of the residence. Required.
    pub address: String,
    pub apartment_code: String,
    pub residence_id: String,
    pub lease_start_date: Option<String>,
    /// Living area in square metres.
    pub area_size: Option<f64>,
    pub residence_type: Option<String>,
    pub is_furnished: bool,
    pub tenant_present_flags: TenantPresence,
    /// Rooms in inspection order.
    pub rooms: Vec<RoomGroup>,
}

/// Who attended the inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantPresence {
    pub tenant_present: bool,
    pub new_tenant_present: bool,
}

/// One room and the remarks recorded for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomGroup {
    pub room_name: String,
    /// Empty means "no remarks for this room".
    pub remarks: Vec<Remark>,
}

impl RoomGroup {
    pub fn new(room_name: impl Into<String>, remarks: Vec<Remark>) -> Self {
        Self {
            room_name: room_name.into(),
            remarks,
        }
    }
}

/// A single finding on a building component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remark {
    #[serde(default)]
    pub building_component: String,
    #[serde(default, alias = "notes")]
    pub description: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub cost: f64,
}

fn default_status() -> String {
    "OK".to_string()
}

impl Default for Remark {
    fn default() -> Self {
        Self {
            building_component: String::new(),
            description: String::new(),
            status: default_status(),
            cost: 0.0,
        }
    }
}

impl Remark {
    pub fn new(building_component: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            building_component: building_component.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }
}

/// The only externally supplied rendering option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Adds the cost column and the trailing summary row.
    pub include_costs: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            include_costs: true,
        }
    }
}
