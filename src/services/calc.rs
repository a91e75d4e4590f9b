//! Estimate builder.
//!
//! Produces a breakup that fits exactly inside the GST-exclusive
//! subtotal: the two extras are carved out first as a share of the work
//! subtotal, fixed and lumpsum rows are deducted next, and percent rows
//! split whatever budget remains.
//!
//! The builder is total: it never errors and never panics. Non-finite
//! inputs flow through the arithmetic as NaN and surface in the result;
//! the validation layer in front of it is responsible for rejecting
//! those before anything is persisted.

use tracing::debug;

use crate::config::ChargeDefaults;
use crate::domain::catalog::{CalcMode, Charges, DescriptionItem};
use crate::domain::estimate::{EstimateBreakup, EstimateMeta, LineItem};
use crate::domain::rules::RuleContext;

/// Display label of the contingency extras row.
pub const CONTINGENCIES_ROW_NAME: &str = "Contingencies & Water Charges";

/// Display label of the electrification extras row.
pub const ELECTRIFICATION_ROW_NAME: &str = "Electrification & Other Charges";

/// Declared percents are left untouched when their sum is within this
/// distance of 100.
const NORMALIZE_TOLERANCE: f64 = 0.0001;

/// Round to 2 decimals, half away from zero, with an epsilon nudge so
/// values sitting a hair under the half boundary round up.
pub fn round2(n: f64) -> f64 {
    ((n + f64::EPSILON) * 100.0).round() / 100.0
}

/// Round to 3 decimals; used for quantities.
pub fn round3(n: f64) -> f64 {
    ((n + f64::EPSILON) * 1000.0).round() / 1000.0
}

/// Inputs to one estimate computation.
///
/// `descriptions` must already be in catalog order; the builder preserves
/// that order within each row group.
#[derive(Debug, Clone)]
pub struct EstimateParams<'a> {
    pub builtup_area_sqft: f64,
    pub rate_per_sqft: f64,
    /// GST rate as a fraction (0.18 == 18%).
    pub gst_rate: f64,
    pub descriptions: &'a [DescriptionItem],
    pub charges: &'a Charges,
}

/// Build the full breakup for one estimate.
///
/// The grand total `builtup * rate` is the single source of truth for
/// what the client pays; the GST-exclusive subtotal is derived back from
/// it, and every row is allocated inside that subtotal. Output rows are
/// ordered percent rows, then fixed/lumpsum rows, then the two extras.
pub fn build_estimate(params: &EstimateParams<'_>, defaults: &ChargeDefaults) -> EstimateBreakup {
    let builtup = params.builtup_area_sqft;
    let rate = params.rate_per_sqft;

    let total_incl_gst = round2(builtup * rate);
    let total_excl_gst = round2(total_incl_gst / (1.0 + params.gst_rate));
    let gst_amount = round2(total_incl_gst - total_excl_gst);
    let gst_percent = params.gst_rate * 100.0;

    let cont_pct = params
        .charges
        .contingencies_percent
        .unwrap_or(defaults.contingencies_percent);
    let elec_pct = params
        .charges
        .electrification_percent
        .unwrap_or(defaults.electrification_percent);
    let extra_pct_total = cont_pct + elec_pct;

    // Extras are a percentage of the work subtotal, not of the full
    // subtotal, so back the work figure out: work + work * extras% must
    // reconstruct the exclusive subtotal.
    let work_subtotal = round2(total_excl_gst / (1.0 + extra_pct_total / 100.0));

    debug!(
        total_incl_gst,
        total_excl_gst, work_subtotal, "derived estimate frame"
    );

    let ctx = RuleContext {
        builtup_area_sqft: builtup,
    };

    // Fixed and lumpsum rows first; they must fit inside the work
    // subtotal before percent rows see any budget.
    let mut fixed_rows: Vec<LineItem> = Vec::new();
    let mut fixed_total = 0.0;
    let mut percent_items: Vec<&DescriptionItem> = Vec::new();

    for d in params.descriptions {
        match d.calc_enum {
            CalcMode::FixedQty => {
                let rule_qty = d.qty_rule.evaluate(&ctx);
                let qty = round3(rule_qty.unwrap_or(d.fixed_qty));
                let amount = round2(qty * d.rate);

                fixed_total = round2(fixed_total + amount);
                fixed_rows.push(LineItem {
                    name: d.name.clone(),
                    unit: d.unit.clone().unwrap_or_default(),
                    rate: d.rate,
                    qty,
                    amount,
                    is_extra: false,
                });
            }
            CalcMode::Lumpsum => {
                let amount = round2(d.rate);

                fixed_total = round2(fixed_total + amount);
                fixed_rows.push(LineItem {
                    name: d.name.clone(),
                    unit: d.unit.clone().unwrap_or_default(),
                    rate: d.rate,
                    qty: 1.0,
                    amount,
                    is_extra: false,
                });
            }
            CalcMode::Percent => percent_items.push(d),
        }
    }

    let mut percent_base = round2(work_subtotal - fixed_total);
    if percent_base < 0.0 {
        percent_base = 0.0;
    }

    // Percent rows split the remaining budget. Declared percents that do
    // not sum to 100 are normalized proportionally; a sum at (or within
    // tolerance of) 100 is used as declared.
    let sum_percent: f64 = percent_items.iter().map(|d| d.percent).sum();
    let normalize = sum_percent > 0.0 && (sum_percent - 100.0).abs() > NORMALIZE_TOLERANCE;

    let mut percent_rows: Vec<LineItem> = Vec::new();
    let mut percent_total = 0.0;

    for d in &percent_items {
        let effective_pct = if normalize {
            d.percent * 100.0 / sum_percent
        } else {
            d.percent
        };

        let amount = round2(percent_base * effective_pct / 100.0);
        let qty = round3(if d.rate > 0.0 { amount / d.rate } else { 0.0 });

        percent_total = round2(percent_total + amount);
        percent_rows.push(LineItem {
            name: d.name.clone(),
            unit: d.unit.clone().unwrap_or_default(),
            rate: d.rate,
            qty,
            amount,
            is_extra: false,
        });
    }

    // Extras come off the work subtotal directly, independent of how the
    // percent/fixed split landed.
    let cont_amt = round2(work_subtotal * cont_pct / 100.0);
    let elec_amt = round2(work_subtotal * elec_pct / 100.0);

    debug!(
        fixed_total,
        percent_base, percent_total, cont_amt, elec_amt, "distributed breakup rows"
    );

    let mut rows = percent_rows;
    rows.append(&mut fixed_rows);
    rows.push(LineItem {
        name: CONTINGENCIES_ROW_NAME.to_string(),
        unit: "%".to_string(),
        rate: cont_pct,
        qty: 1.0,
        amount: cont_amt,
        is_extra: true,
    });
    rows.push(LineItem {
        name: ELECTRIFICATION_ROW_NAME.to_string(),
        unit: "%".to_string(),
        rate: elec_pct,
        qty: 1.0,
        amount: elec_amt,
        is_extra: true,
    });

    let excl_gst_from_rows = round2(percent_total + fixed_total + cont_amt + elec_amt);

    // The published subtotal is snapped to the GST split so the grand
    // totals always reconcile to the rupee; row-sum drift of a few paise
    // stays visible in the meta only.
    EstimateBreakup {
        rows,
        meta: EstimateMeta {
            builtup,
            rate_per_sqft: rate,
            work_subtotal,
            percent_base,
            fixed_total,
            percent_total,
            extras_total: round2(cont_amt + elec_amt),
            excl_gst_from_rows,
            normalized_percents: normalize,
            sum_percent,
        },
        subtotal_excl_gst: total_excl_gst,
        gst_percent,
        gst_amount,
        total_incl_gst,
    }
}
