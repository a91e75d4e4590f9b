//! Catalog row models.
//!
//! Read-only snapshots of the pricing catalog the caller fetched for one
//! estimate: qualities, project types, description rows and the charges
//! record. Columns are loose in the source system, so the serde defaults
//! mirror what the rows actually contain (missing numerics read as 0,
//! unknown pricing modes read as percent).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::rules::QtyRule;

/// Pricing mode of a description row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalcMode {
    /// Quantity from a rule (or the static fallback), amount = qty * rate.
    FixedQty,
    /// Single flat amount, quantity pinned at 1.
    Lumpsum,
    /// Proportional share of the percentage pool.
    #[default]
    Percent,
}

impl CalcMode {
    /// Map the catalog label. Absent or unknown labels are percent rows.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_uppercase().as_str() {
            "FIXED_QTY" => Self::FixedQty,
            "LUMPSUM" => Self::Lumpsum,
            _ => Self::Percent,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::FixedQty => "FIXED_QTY",
            Self::Lumpsum => "LUMPSUM",
            Self::Percent => "PERCENT",
        }
    }
}

impl<'de> Deserialize<'de> for CalcMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.as_deref().map(Self::from_label).unwrap_or_default())
    }
}

impl Serialize for CalcMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_label())
    }
}

/// One description row of the estimate catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionItem {
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    /// Monetary rate per unit; its meaning depends on `calc_enum`.
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub calc_enum: CalcMode,
    /// Share of the percentage pool; read only for percent rows.
    #[serde(default)]
    pub percent: f64,
    /// Static quantity fallback when no rule resolves.
    #[serde(default)]
    pub fixed_qty: f64,
    #[serde(rename = "qty_rule_json", default)]
    pub qty_rule: QtyRule,
    #[serde(default)]
    pub sort_order: i64,
}

/// Contingency / electrification percentages for a project type.
///
/// `None` means the column is null and the configured default applies; an
/// explicit 0 is a real value and is honored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Charges {
    #[serde(default)]
    pub contingencies_percent: Option<f64>,
    #[serde(default)]
    pub electrification_percent: Option<f64>,
}

/// Construction quality tier carrying the rate per square foot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quality {
    pub id: i64,
    pub name: String,
    pub rate_per_sqft: f64,
}

/// Project type the catalog rows are keyed by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectType {
    pub code: String,
    pub name: String,
}

/// Atomically-consistent catalog state for a single estimate.
///
/// The engine never fetches data itself; callers assemble one snapshot
/// per request so a mid-flight catalog update cannot mix old and new
/// rows inside one computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub quality: Quality,
    pub project_type: ProjectType,
    pub descriptions: Vec<DescriptionItem>,
    pub charges: Charges,
}

impl CatalogSnapshot {
    /// Assemble a snapshot, ordering description rows by their sort key.
    /// The sort is stable, so rows sharing a key keep their fetch order.
    pub fn new(
        quality: Quality,
        project_type: ProjectType,
        mut descriptions: Vec<DescriptionItem>,
        charges: Charges,
    ) -> Self {
        descriptions.sort_by_key(|d| d.sort_order);
        Self {
            quality,
            project_type,
            descriptions,
            charges,
        }
    }
}
