//! Estimate request and breakup types.

use serde::{Deserialize, Serialize};

/// Caller-facing input for one estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateRequest {
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
}

/// How the estimate date is stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    #[default]
    Auto,
    Manual,
}

/// Per-estimate presentation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateOptions {
    #[serde(default)]
    pub date_mode: DateMode,
    /// Required in manual date mode, `YYYY-MM-DD`.
    #[serde(default)]
    pub estimate_date_manual: Option<String>,
    #[serde(default = "default_true")]
    pub show_plot_details: bool,
    #[serde(default = "default_true")]
    pub show_floors: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            date_mode: DateMode::Auto,
            estimate_date_manual: None,
            show_plot_details: true,
            show_floors: true,
        }
    }
}

/// One row of the breakup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub unit: String,
    /// Currency rate per unit, except on extras rows where it carries the
    /// percentage figure and `unit` is "%".
    pub rate: f64,
    pub qty: f64,
    pub amount: f64,
    #[serde(default)]
    pub is_extra: bool,
}

/// Diagnostic snapshot of the intermediate figures.
///
/// Advisory only. In particular `excl_gst_from_rows` is the row-summed
/// subtotal and may drift a few paise from the published one; the
/// published subtotal is snapped to the GST split instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateMeta {
    pub builtup: f64,
    pub rate_per_sqft: f64,
    pub work_subtotal: f64,
    pub percent_base: f64,
    pub fixed_total: f64,
    pub percent_total: f64,
    pub extras_total: f64,
    pub excl_gst_from_rows: f64,
    pub normalized_percents: bool,
    pub sum_percent: f64,
}

/// Complete output of the estimate builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateBreakup {
    pub rows: Vec<LineItem>,
    pub meta: EstimateMeta,
    pub subtotal_excl_gst: f64,
    pub gst_percent: f64,
    pub gst_amount: f64,
    pub total_incl_gst: f64,
}
