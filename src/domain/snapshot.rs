//! Persistable estimate snapshot and preview DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::estimate::LineItem;

/// Lifecycle of a generated estimate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    PendingPayment,
    Paid,
    Free,
}

impl Default for EstimateStatus {
    fn default() -> Self {
        Self::PendingPayment
    }
}

/// Identity stamped onto a snapshot by the surrounding system.
///
/// The reference number and date are allocated outside the pure engine
/// (sequence in the database, clock at the call site) so the computation
/// itself stays deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefStamp {
    pub engineer_id: Uuid,
    pub ref_no: String,
    pub estimate_date: NaiveDate,
}

/// Header of a persistable estimate snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateHeader {
    pub engineer_id: Uuid,
    pub ref_no: String,
    pub estimate_date: NaiveDate,
    pub client_name: String,
    pub project_address: String,
    #[serde(default)]
    pub plot_length_ft: Option<f64>,
    #[serde(default)]
    pub plot_width_ft: Option<f64>,
    #[serde(default)]
    pub floors: Option<i32>,
    pub builtup_area_sqft: f64,
    pub project_type_code: String,
    pub quality_id: i64,
    pub rate_per_sqft: f64,
    pub sub_total_excl_gst: f64,
    pub gst_amount: f64,
    pub grand_total_incl_gst: f64,
    pub status: EstimateStatus,
}

/// Complete snapshot: header plus the rendered breakup rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateSnapshot {
    pub header: EstimateHeader,
    pub rows: Vec<LineItem>,
}

/// Catalog display names echoed back with a preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewMeta {
    pub project_type_name: String,
    pub quality_name: String,
    pub rate_per_sqft: f64,
    pub builtup_area_sqft: f64,
}

/// The three reconciled grand totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalTotals {
    pub sub_total_excl_gst: f64,
    pub gst_amount: f64,
    pub grand_total_incl_gst: f64,
}

/// Preview of an estimate before payment and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatePreview {
    pub meta: PreviewMeta,
    #[serde(rename = "final")]
    pub final_totals: FinalTotals,
    pub rows: Vec<LineItem>,
}
