//! Boundary validation in front of the lenient calculation core.
//!
//! The core arithmetic is total and NaN-tolerant; everything that must
//! reject bad input before persistence happens here instead. Checks and
//! messages match what the estimate form surfaces to the end user.

use chrono::NaiveDate;

use crate::config::ChargeDefaults;
use crate::domain::estimate::{DateMode, EstimateBreakup, EstimateOptions, EstimateRequest};
use crate::error::{EstimateError, EstimateResult};
use crate::services::calc::{build_estimate, EstimateParams};

/// Validate an estimate request against its presentation options.
///
/// Plot dimensions and floor count are optional and only validated when
/// the corresponding section is shown.
pub fn validate_request(req: &EstimateRequest, options: &EstimateOptions) -> EstimateResult<()> {
    if options.date_mode == DateMode::Manual {
        let manual = req_manual_date(options)?;
        parse_manual_date(manual)?;
    }

    if !req.builtup_area_sqft.is_finite() || req.builtup_area_sqft <= 0.0 {
        return Err(EstimateError::InvalidBuiltupArea);
    }

    if options.show_plot_details {
        if let Some(pl) = req.plot_length_ft {
            if !pl.is_finite() || pl <= 0.0 {
                return Err(EstimateError::InvalidPlotLength);
            }
        }
        if let Some(pw) = req.plot_width_ft {
            if !pw.is_finite() || pw <= 0.0 {
                return Err(EstimateError::InvalidPlotWidth);
            }
        }
    }

    if options.show_floors {
        if let Some(fl) = req.floors {
            if fl <= 0 {
                return Err(EstimateError::InvalidFloors);
            }
        }
    }

    if req.client_name.is_empty() {
        return Err(EstimateError::MissingField("client_name"));
    }
    if req.project_address.is_empty() {
        return Err(EstimateError::MissingField("project_address"));
    }
    if req.project_type_code.is_empty() {
        return Err(EstimateError::MissingField("project_type_code"));
    }

    Ok(())
}

/// Resolve the date stamped onto the estimate.
///
/// Auto mode uses the caller-supplied `today` so the engine itself never
/// reads the clock; manual mode parses the user's `YYYY-MM-DD` string.
pub fn resolve_estimate_date(
    options: &EstimateOptions,
    today: NaiveDate,
) -> EstimateResult<NaiveDate> {
    match options.date_mode {
        DateMode::Auto => Ok(today),
        DateMode::Manual => parse_manual_date(req_manual_date(options)?),
    }
}

/// Strict entry point around [`build_estimate`]: same arithmetic, but a
/// NaN-tainted result is rejected instead of returned, so not-null
/// columns downstream never see a non-finite total.
pub fn build_estimate_checked(
    params: &EstimateParams<'_>,
    defaults: &ChargeDefaults,
) -> EstimateResult<EstimateBreakup> {
    let built = build_estimate(params, defaults);

    if !built.subtotal_excl_gst.is_finite() {
        return Err(EstimateError::CalculationFailed("sub_total_excl_gst"));
    }
    if !built.gst_amount.is_finite() || !built.total_incl_gst.is_finite() {
        return Err(EstimateError::CalculationFailed("GST/Total"));
    }

    Ok(built)
}

fn req_manual_date(options: &EstimateOptions) -> EstimateResult<&str> {
    options
        .estimate_date_manual
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(EstimateError::ManualDateMissing)
}

fn parse_manual_date(raw: &str) -> EstimateResult<NaiveDate> {
    // Zero-padded YYYY-MM-DD only; chrono alone would also accept
    // unpadded fields.
    if !is_iso_date_shaped(raw) {
        return Err(EstimateError::ManualDateFormat);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| EstimateError::ManualDateFormat)
}

fn is_iso_date_shaped(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter()
            .enumerate()
            .all(|(i, c)| if i == 4 || i == 7 { *c == b'-' } else { c.is_ascii_digit() })
}
