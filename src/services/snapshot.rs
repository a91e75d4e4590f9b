//! Preview and snapshot assembly.
//!
//! The two orchestrations in front of the calculation core: a preview
//! for the estimate form (no identity, nothing persisted) and the full
//! snapshot handed to persistence once payment is captured. Both take an
//! already-fetched [`CatalogSnapshot`] and are pure given their inputs.

use tracing::{debug, instrument};

use crate::config::{ChargeDefaults, Settings};
use crate::domain::catalog::CatalogSnapshot;
use crate::domain::estimate::{EstimateOptions, EstimateRequest};
use crate::domain::snapshot::{
    EstimateHeader, EstimatePreview, EstimateSnapshot, EstimateStatus, FinalTotals, PreviewMeta,
    RefStamp,
};
use crate::error::EstimateResult;
use crate::services::calc::EstimateParams;
use crate::services::validation::{build_estimate_checked, validate_request};

/// Format a sequential estimate reference number, e.g. `EST-2025-0042`.
///
/// Sequence allocation itself lives with the caller (a per-engineer
/// counter in the database); this is only the display form.
pub fn format_ref_no(prefix: &str, year: i32, seq: u32) -> String {
    format!("{prefix}-{year}-{seq:04}")
}

/// Compute a preview: validated totals and breakup rows, no identity.
#[instrument(skip_all, fields(project_type = %catalog.project_type.code, builtup = req.builtup_area_sqft))]
pub fn preview_estimate(
    req: &EstimateRequest,
    options: &EstimateOptions,
    catalog: &CatalogSnapshot,
    settings: &Settings,
) -> EstimateResult<EstimatePreview> {
    validate_request(req, options)?;

    let params = EstimateParams {
        builtup_area_sqft: req.builtup_area_sqft,
        rate_per_sqft: catalog.quality.rate_per_sqft,
        gst_rate: settings.gst_rate,
        descriptions: &catalog.descriptions,
        charges: &catalog.charges,
    };
    let built = build_estimate_checked(&params, &ChargeDefaults::from(settings))?;

    debug!(
        total_incl_gst = built.total_incl_gst,
        rows = built.rows.len(),
        "estimate preview computed"
    );

    Ok(EstimatePreview {
        meta: PreviewMeta {
            project_type_name: catalog.project_type.name.clone(),
            quality_name: catalog.quality.name.clone(),
            rate_per_sqft: catalog.quality.rate_per_sqft,
            builtup_area_sqft: req.builtup_area_sqft,
        },
        final_totals: FinalTotals {
            sub_total_excl_gst: built.subtotal_excl_gst,
            gst_amount: built.gst_amount,
            grand_total_incl_gst: built.total_incl_gst,
        },
        rows: built.rows,
    })
}

/// Assemble the persistable snapshot for a stamped estimate.
///
/// Same computation as the preview, plus the header persistence expects.
/// Snapshots start in `pending_payment`; the caller flips the status
/// once the payment outcome is known.
#[instrument(skip_all, fields(ref_no = %stamp.ref_no))]
pub fn build_snapshot(
    req: &EstimateRequest,
    options: &EstimateOptions,
    catalog: &CatalogSnapshot,
    settings: &Settings,
    stamp: &RefStamp,
) -> EstimateResult<EstimateSnapshot> {
    validate_request(req, options)?;

    let params = EstimateParams {
        builtup_area_sqft: req.builtup_area_sqft,
        rate_per_sqft: catalog.quality.rate_per_sqft,
        gst_rate: settings.gst_rate,
        descriptions: &catalog.descriptions,
        charges: &catalog.charges,
    };
    let built = build_estimate_checked(&params, &ChargeDefaults::from(settings))?;

    debug!(
        grand_total_incl_gst = built.total_incl_gst,
        "estimate snapshot assembled"
    );

    let header = EstimateHeader {
        engineer_id: stamp.engineer_id,
        ref_no: stamp.ref_no.clone(),
        estimate_date: stamp.estimate_date,
        client_name: req.client_name.clone(),
        project_address: req.project_address.clone(),
        plot_length_ft: req.plot_length_ft,
        plot_width_ft: req.plot_width_ft,
        floors: req.floors,
        builtup_area_sqft: req.builtup_area_sqft,
        project_type_code: req.project_type_code.clone(),
        quality_id: req.quality_id,
        rate_per_sqft: catalog.quality.rate_per_sqft,
        sub_total_excl_gst: built.subtotal_excl_gst,
        gst_amount: built.gst_amount,
        grand_total_incl_gst: built.total_incl_gst,
        status: EstimateStatus::PendingPayment,
    };

    Ok(EstimateSnapshot {
        header,
        rows: built.rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Charges, ProjectType, Quality};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new(
            Quality {
                id: 2,
                name: "Premium".into(),
                rate_per_sqft: 1800.0,
            },
            ProjectType {
                code: "RES".into(),
                name: "Residential".into(),
            },
            Vec::new(),
            Charges::default(),
        )
    }

    fn request() -> EstimateRequest {
        EstimateRequest {
            client_name: "Sharma Residence".into(),
            project_address: "Plot 12, Sector 9".into(),
            plot_length_ft: Some(40.0),
            plot_width_ft: Some(30.0),
            floors: Some(2),
            builtup_area_sqft: 1000.0,
            project_type_code: "RES".into(),
            quality_id: 2,
        }
    }

    fn stamp() -> RefStamp {
        RefStamp {
            engineer_id: Uuid::nil(),
            ref_no: format_ref_no("EST", 2025, 42),
            estimate_date: NaiveDate::from_ymd_opt(2025, 8, 5).expect("valid date"),
        }
    }

    #[test]
    fn ref_no_is_zero_padded() {
        assert_eq!(format_ref_no("EST", 2025, 42), "EST-2025-0042");
        assert_eq!(format_ref_no("EST", 2025, 12345), "EST-2025-12345");
    }

    #[test]
    fn preview_echoes_catalog_names_and_reconciled_totals() {
        let preview = preview_estimate(
            &request(),
            &EstimateOptions::default(),
            &catalog(),
            &Settings::default(),
        )
        .expect("preview succeeds");

        assert_eq!(preview.meta.project_type_name, "Residential");
        assert_eq!(preview.meta.quality_name, "Premium");
        assert_eq!(preview.final_totals.grand_total_incl_gst, 1_800_000.00);
        assert_eq!(preview.final_totals.sub_total_excl_gst, 1_525_423.73);
        assert_eq!(preview.final_totals.gst_amount, 274_576.27);
        assert_eq!(preview.rows.len(), 2);
    }

    #[test]
    fn preview_rejects_invalid_requests() {
        let mut req = request();
        req.builtup_area_sqft = -5.0;
        let err = preview_estimate(
            &req,
            &EstimateOptions::default(),
            &catalog(),
            &Settings::default(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_BUILTUP_AREA");
    }

    #[test]
    fn snapshot_header_matches_breakup_totals_exactly() {
        let snapshot = build_snapshot(
            &request(),
            &EstimateOptions::default(),
            &catalog(),
            &Settings::default(),
            &stamp(),
        )
        .expect("snapshot succeeds");

        assert_eq!(snapshot.header.ref_no, "EST-2025-0042");
        assert_eq!(snapshot.header.status, EstimateStatus::PendingPayment);
        assert_eq!(snapshot.header.rate_per_sqft, 1800.0);
        assert_eq!(snapshot.header.grand_total_incl_gst, 1_800_000.00);
        let reconciled = snapshot.header.sub_total_excl_gst + snapshot.header.gst_amount
            - snapshot.header.grand_total_incl_gst;
        assert!(reconciled.abs() < 0.01);
        assert_eq!(snapshot.rows.len(), 2);
    }

    #[test]
    fn snapshot_and_preview_agree_on_totals() {
        let options = EstimateOptions::default();
        let settings = Settings::default();
        let preview =
            preview_estimate(&request(), &options, &catalog(), &settings).expect("preview");
        let snapshot = build_snapshot(&request(), &options, &catalog(), &settings, &stamp())
            .expect("snapshot");

        assert_eq!(
            preview.final_totals.sub_total_excl_gst,
            snapshot.header.sub_total_excl_gst
        );
        assert_eq!(preview.rows, snapshot.rows);
    }
}
