//! Boundary error taxonomy.
//!
//! The calculation core itself never fails: bad numeric input propagates
//! as NaN through the arithmetic. These errors belong to the validation
//! boundary in front of it, so a caller that persists or renders a
//! breakup only ever sees finite totals.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Built-up area must be a number > 0.")]
    InvalidBuiltupArea,

    #[error("Plot Length must be a number > 0.")]
    InvalidPlotLength,

    #[error("Plot Width must be a number > 0.")]
    InvalidPlotWidth,

    #[error("No. of Floors must be a whole number (1,2,3...).")]
    InvalidFloors,

    #[error("Manual date is required.")]
    ManualDateMissing,

    #[error("Invalid manual date format (YYYY-MM-DD).")]
    ManualDateFormat,

    /// The lenient core produced a non-finite total. Raised by the
    /// checked entry points before anything gets persisted.
    #[error("Estimate calculation failed ({0} invalid).")]
    CalculationFailed(&'static str),
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl EstimateError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidBuiltupArea => "INVALID_BUILTUP_AREA",
            Self::InvalidPlotLength => "INVALID_PLOT_LENGTH",
            Self::InvalidPlotWidth => "INVALID_PLOT_WIDTH",
            Self::InvalidFloors => "INVALID_FLOORS",
            Self::ManualDateMissing => "MANUAL_DATE_MISSING",
            Self::ManualDateFormat => "MANUAL_DATE_FORMAT",
            Self::CalculationFailed(_) => "CALCULATION_FAILED",
        }
    }

    /// Serializable form for callers that surface errors over the wire.
    pub fn detail(&self) -> ErrorDetail {
        ErrorDetail {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

pub type EstimateResult<T> = Result<T, EstimateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_user_facing_texts() {
        assert_eq!(
            EstimateError::InvalidBuiltupArea.to_string(),
            "Built-up area must be a number > 0."
        );
        assert_eq!(
            EstimateError::ManualDateFormat.to_string(),
            "Invalid manual date format (YYYY-MM-DD)."
        );
        assert_eq!(
            EstimateError::CalculationFailed("sub_total_excl_gst").to_string(),
            "Estimate calculation failed (sub_total_excl_gst invalid)."
        );
    }

    #[test]
    fn detail_is_wire_serializable() {
        let detail = EstimateError::ManualDateMissing.detail();
        let value = serde_json::to_value(detail).expect("detail serializes");
        assert_eq!(value["code"], "MANUAL_DATE_MISSING");
        assert_eq!(value["message"], "Manual date is required.");
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(EstimateError::InvalidFloors.code(), "INVALID_FLOORS");
        assert_eq!(
            EstimateError::CalculationFailed("gst_amount").code(),
            "CALCULATION_FAILED"
        );
    }
}
