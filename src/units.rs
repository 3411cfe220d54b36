//! Glucose unit conversion and display formatting
//!
//! The analytics pipeline works exclusively in mmol/L; mg/dL exists only as a
//! render-time conversion. Conversion factor 18.018.

use serde::{Deserialize, Serialize};

/// mmol/L to mg/dL conversion factor
pub const MMOL_TO_MGDL: f64 = 18.018;

/// Convert mmol/L to mg/dL
pub fn mmol_to_mgdl(mmol: f64) -> f64 {
    mmol * MMOL_TO_MGDL
}

/// Convert mg/dL to mmol/L
pub fn mgdl_to_mmol(mgdl: f64) -> f64 {
    mgdl / MMOL_TO_MGDL
}

/// Display unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GlucoseUnit {
    #[serde(rename = "mmol/L")]
    #[default]
    MmolL,
    #[serde(rename = "mg/dL")]
    MgDl,
}

impl GlucoseUnit {
    /// Format a canonical mmol/L value in the preferred unit, with suffix.
    /// mg/dL is conventionally shown as a whole number, mmol/L to one decimal.
    pub fn format(self, mmol: f64) -> String {
        match self {
            GlucoseUnit::MmolL => format!("{mmol:.1} mmol/L"),
            GlucoseUnit::MgDl => format!("{:.0} mg/dL", mmol_to_mgdl(mmol)),
        }
    }

    /// Display value in the preferred unit (mg/dL rounded to a whole number)
    pub fn display_value(self, mmol: f64) -> f64 {
        match self {
            GlucoseUnit::MmolL => mmol,
            GlucoseUnit::MgDl => mmol_to_mgdl(mmol).round(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GlucoseUnit::MmolL => "mmol/L",
            GlucoseUnit::MgDl => "mg/dL",
        }
    }
}
