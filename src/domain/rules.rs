//! Quantity rules for fixed-quantity catalog items.
//!
//! A description row may carry a declarative rule that resolves its
//! quantity from the computation context instead of a static value. Two
//! shapes are in circulation: area bands (water-tank style) and the older
//! threshold steps. Anything else decodes to [`QtyRule::Unrecognized`]
//! and the row falls back to its static quantity — one bad catalog row
//! must never break estimate generation.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The only basis the band shape resolves today.
const BASIS_BUILTUP_AREA: &str = "BUILTUP_AREA_SQFT";

/// One band of an area-band rule.
///
/// `from` defaults to an open lower bound, the upper bound is `to` if
/// present, else `upto`, else open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upto: Option<f64>,
    pub qty: f64,
}

/// One step of a threshold rule. A step without `max` matches anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub qty: f64,
}

/// Declarative quantity rule attached to a catalog description row.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QtyRule {
    /// `{ basis: "BUILTUP_AREA_SQFT", rules: [{qty, upto?}, {from, to, qty}, ...] }`
    AreaBand { basis: String, bands: Vec<Band> },
    /// `{ type: "threshold", by: <context key>, steps: [{max?, qty}, ...] }`
    Threshold { by: String, steps: Vec<ThresholdStep> },
    /// Absent, malformed, or unknown-shaped payload. Evaluates to nothing.
    #[default]
    Unrecognized,
}

/// Variables a rule may resolve against. Built fresh per estimate.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub builtup_area_sqft: f64,
}

impl RuleContext {
    fn value(&self, key: &str) -> Option<f64> {
        match key {
            "builtup_area_sqft" => Some(self.builtup_area_sqft),
            _ => None,
        }
    }
}

impl QtyRule {
    /// Interpret a decoded JSON payload.
    ///
    /// Accepts the object form or its string serialization (legacy rows
    /// store the rule as text). Parse failures and unknown shapes come
    /// back as [`QtyRule::Unrecognized`].
    pub fn decode(value: &Value) -> QtyRule {
        match value {
            Value::Null => QtyRule::Unrecognized,
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(inner) => Self::interpret(&inner),
                Err(_) => QtyRule::Unrecognized,
            },
            other => Self::interpret(other),
        }
    }

    fn interpret(value: &Value) -> QtyRule {
        let Some(obj) = value.as_object() else {
            return QtyRule::Unrecognized;
        };

        let basis = obj
            .get("basis")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty());
        if let (Some(basis), Some(rules)) = (basis, obj.get("rules").and_then(Value::as_array)) {
            let bands = rules
                .iter()
                .filter_map(Value::as_object)
                .map(|band| Band {
                    from: coerce_number(band.get("from")),
                    to: coerce_number(band.get("to")),
                    upto: coerce_number(band.get("upto")),
                    qty: coerce_number(band.get("qty")).unwrap_or(0.0),
                })
                .collect();
            return QtyRule::AreaBand {
                basis: basis.to_string(),
                bands,
            };
        }

        if obj.get("type").and_then(Value::as_str) == Some("threshold") {
            let by = obj
                .get("by")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let steps = obj
                .get("steps")
                .and_then(Value::as_array)
                .map(|steps| {
                    steps
                        .iter()
                        .filter_map(Value::as_object)
                        .map(|step| ThresholdStep {
                            max: coerce_number(step.get("max")),
                            qty: coerce_number(step.get("qty")).unwrap_or(0.0),
                        })
                        .collect()
                })
                .unwrap_or_default();
            return QtyRule::Threshold { by, steps };
        }

        QtyRule::Unrecognized
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, QtyRule::Unrecognized)
    }

    /// Resolve the rule to a quantity, or `None` when it does not apply.
    ///
    /// Callers fall back to the row's static `fixed_qty` on `None`.
    pub fn evaluate(&self, ctx: &RuleContext) -> Option<f64> {
        match self {
            QtyRule::AreaBand { basis, bands } => {
                if !basis.eq_ignore_ascii_case(BASIS_BUILTUP_AREA) {
                    return None;
                }
                let v = ctx.value("builtup_area_sqft")?;
                if !v.is_finite() {
                    return None;
                }

                for band in bands {
                    let from = band.from.unwrap_or(f64::NEG_INFINITY);
                    let to = band.to.or(band.upto).unwrap_or(f64::INFINITY);

                    // The three checks stay separate and in this order:
                    // rule authors stack overlapping bands and rely on the
                    // first textual match winning.
                    if v > from && v <= to {
                        return Some(band.qty);
                    }
                    if from == f64::NEG_INFINITY && v <= to {
                        return Some(band.qty);
                    }
                    if to == f64::INFINITY && v > from {
                        return Some(band.qty);
                    }
                }
                None
            }
            QtyRule::Threshold { by, steps } => {
                let v = ctx.value(by)?;
                if !v.is_finite() {
                    return None;
                }
                for step in steps {
                    match step.max {
                        None => return Some(step.qty),
                        Some(max) if v <= max => return Some(step.qty),
                        Some(_) => {}
                    }
                }
                None
            }
            QtyRule::Unrecognized => None,
        }
    }
}

/// Loose numeric read: numbers pass through, numeric strings parse.
/// Mirrors how the catalog rows were written by hand.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for QtyRule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(QtyRule::decode(&value))
    }
}

impl Serialize for QtyRule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            QtyRule::AreaBand { basis, bands } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("basis", basis)?;
                map.serialize_entry("rules", bands)?;
                map.end()
            }
            QtyRule::Threshold { by, steps } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "threshold")?;
                map.serialize_entry("by", by)?;
                map.serialize_entry("steps", steps)?;
                map.end()
            }
            QtyRule::Unrecognized => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(builtup: f64) -> RuleContext {
        RuleContext {
            builtup_area_sqft: builtup,
        }
    }

    fn water_tank_rule() -> QtyRule {
        QtyRule::decode(&json!({
            "basis": "BUILTUP_AREA_SQFT",
            "rules": [
                { "upto": 1000, "qty": 500 },
                { "from": 1000, "qty": 750 },
            ],
        }))
    }

    #[test]
    fn band_upto_matches_at_boundary() {
        let rule = water_tank_rule();
        assert_eq!(rule.evaluate(&ctx(1000.0)), Some(500.0));
    }

    #[test]
    fn band_open_upper_matches_above_boundary() {
        let rule = water_tank_rule();
        assert_eq!(rule.evaluate(&ctx(1500.0)), Some(750.0));
    }

    #[test]
    fn overlapping_bands_resolve_to_first_listed() {
        let rule = QtyRule::decode(&json!({
            "basis": "BUILTUP_AREA_SQFT",
            "rules": [
                { "from": 500, "to": 2000, "qty": 10 },
                { "from": 500, "to": 1500, "qty": 20 },
            ],
        }));
        assert_eq!(rule.evaluate(&ctx(1200.0)), Some(10.0));
    }

    #[test]
    fn no_band_matches_outside_every_interval() {
        let rule = QtyRule::decode(&json!({
            "basis": "BUILTUP_AREA_SQFT",
            "rules": [{ "from": 100, "to": 200, "qty": 5 }],
        }));
        assert_eq!(rule.evaluate(&ctx(50.0)), None);
        assert_eq!(rule.evaluate(&ctx(250.0)), None);
    }

    #[test]
    fn lower_bound_is_exclusive_upper_inclusive() {
        let rule = QtyRule::decode(&json!({
            "basis": "BUILTUP_AREA_SQFT",
            "rules": [{ "from": 100, "to": 200, "qty": 5 }],
        }));
        assert_eq!(rule.evaluate(&ctx(100.0)), None);
        assert_eq!(rule.evaluate(&ctx(100.01)), Some(5.0));
        assert_eq!(rule.evaluate(&ctx(200.0)), Some(5.0));
    }

    #[test]
    fn basis_is_case_insensitive() {
        let rule = QtyRule::decode(&json!({
            "basis": "builtup_area_sqft",
            "rules": [{ "qty": 3 }],
        }));
        assert_eq!(rule.evaluate(&ctx(10.0)), Some(3.0));
    }

    #[test]
    fn unknown_basis_yields_nothing() {
        let rule = QtyRule::decode(&json!({
            "basis": "PLOT_AREA_SQFT",
            "rules": [{ "qty": 3 }],
        }));
        assert_eq!(rule.evaluate(&ctx(10.0)), None);
    }

    #[test]
    fn non_finite_context_yields_nothing() {
        let rule = water_tank_rule();
        assert_eq!(rule.evaluate(&ctx(f64::NAN)), None);
        assert_eq!(rule.evaluate(&ctx(f64::INFINITY)), None);
    }

    #[test]
    fn threshold_picks_first_step_at_or_below_max() {
        let rule = QtyRule::decode(&json!({
            "type": "threshold",
            "by": "builtup_area_sqft",
            "steps": [
                { "max": 800, "qty": 1 },
                { "max": 1600, "qty": 2 },
                { "qty": 3 },
            ],
        }));
        assert_eq!(rule.evaluate(&ctx(800.0)), Some(1.0));
        assert_eq!(rule.evaluate(&ctx(801.0)), Some(2.0));
        assert_eq!(rule.evaluate(&ctx(9999.0)), Some(3.0));
    }

    #[test]
    fn threshold_without_catch_all_can_miss() {
        let rule = QtyRule::decode(&json!({
            "type": "threshold",
            "by": "builtup_area_sqft",
            "steps": [{ "max": 800, "qty": 1 }],
        }));
        assert_eq!(rule.evaluate(&ctx(900.0)), None);
    }

    #[test]
    fn threshold_with_unknown_context_key_yields_nothing() {
        let rule = QtyRule::decode(&json!({
            "type": "threshold",
            "by": "floors",
            "steps": [{ "qty": 1 }],
        }));
        assert_eq!(rule.evaluate(&ctx(900.0)), None);
    }

    #[test]
    fn string_encoded_rule_decodes_like_the_object_form() {
        let object = water_tank_rule();
        let string = QtyRule::decode(&json!(
            r#"{"basis":"BUILTUP_AREA_SQFT","rules":[{"upto":1000,"qty":500},{"from":1000,"qty":750}]}"#
        ));
        assert_eq!(object, string);
    }

    #[test]
    fn malformed_string_decodes_to_unrecognized() {
        let rule = QtyRule::decode(&json!("{invalid json"));
        assert!(rule.is_unrecognized());
        assert_eq!(rule.evaluate(&ctx(1000.0)), None);
    }

    #[test]
    fn unknown_shapes_decode_to_unrecognized() {
        assert!(QtyRule::decode(&json!(null)).is_unrecognized());
        assert!(QtyRule::decode(&json!(42)).is_unrecognized());
        assert!(QtyRule::decode(&json!({ "steps": [] })).is_unrecognized());
        assert!(QtyRule::decode(&json!({ "basis": "BUILTUP_AREA_SQFT" })).is_unrecognized());
    }

    #[test]
    fn non_numeric_qty_coerces_to_zero() {
        let rule = QtyRule::decode(&json!({
            "basis": "BUILTUP_AREA_SQFT",
            "rules": [{ "upto": 1000, "qty": "n/a" }],
        }));
        assert_eq!(rule.evaluate(&ctx(500.0)), Some(0.0));
    }

    #[test]
    fn numeric_strings_in_bounds_parse() {
        let rule = QtyRule::decode(&json!({
            "basis": "BUILTUP_AREA_SQFT",
            "rules": [{ "from": "1000", "to": "2000", "qty": "12.5" }],
        }));
        assert_eq!(rule.evaluate(&ctx(1500.0)), Some(12.5));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let rule = water_tank_rule();
        let first = rule.evaluate(&ctx(1000.0));
        for _ in 0..10 {
            assert_eq!(rule.evaluate(&ctx(1000.0)), first);
        }
    }
}
