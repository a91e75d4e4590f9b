use anyhow::{ensure, Result};
use std::env;

/// GST rate applied when the environment does not override it.
pub const DEFAULT_GST_RATE: f64 = 0.18;

/// Fallback percentage for each of the two extras rows.
pub const DEFAULT_EXTRAS_PERCENT: f64 = 2.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    #[allow(dead_code)]
    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

/// Engine configuration.
///
/// Every knob has a sensible default so the engine runs with an empty
/// environment; deployments override via env vars.
#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,

    /// GST rate as a fraction (0.18 == 18%).
    pub gst_rate: f64,

    // Extras fallbacks, used only when the charges record is null
    pub default_contingencies_percent: f64,
    pub default_electrification_percent: f64,

    /// Prefix for generated estimate reference numbers.
    pub ref_no_prefix: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));

        let gst_rate = env::var("GST_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_GST_RATE);
        ensure!(
            gst_rate > 0.0 && gst_rate < 1.0,
            "GST_RATE must be a fraction between 0 and 1, got {gst_rate}"
        );

        let default_contingencies_percent = env::var("DEFAULT_CONTINGENCIES_PERCENT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_EXTRAS_PERCENT);
        let default_electrification_percent = env::var("DEFAULT_ELECTRIFICATION_PERCENT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_EXTRAS_PERCENT);

        let ref_no_prefix = env::var("REF_NO_PREFIX").unwrap_or_else(|_| "EST".to_string());

        Ok(Settings {
            env,
            gst_rate,
            default_contingencies_percent,
            default_electrification_percent,
            ref_no_prefix,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Environment::Dev,
            gst_rate: DEFAULT_GST_RATE,
            default_contingencies_percent: DEFAULT_EXTRAS_PERCENT,
            default_electrification_percent: DEFAULT_EXTRAS_PERCENT,
            ref_no_prefix: "EST".to_string(),
        }
    }
}

/// Fallback percentages for the contingency and electrification rows.
///
/// Passed explicitly into the builder instead of read from a global so
/// tests can vary them per call. Applied only when the corresponding
/// charges field is null; an explicit 0 in the catalog is honored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeDefaults {
    pub contingencies_percent: f64,
    pub electrification_percent: f64,
}

impl Default for ChargeDefaults {
    fn default() -> Self {
        Self {
            contingencies_percent: DEFAULT_EXTRAS_PERCENT,
            electrification_percent: DEFAULT_EXTRAS_PERCENT,
        }
    }
}

impl From<&Settings> for ChargeDefaults {
    fn from(s: &Settings) -> Self {
        Self {
            contingencies_percent: s.default_contingencies_percent,
            electrification_percent: s.default_electrification_percent,
        }
    }
}
