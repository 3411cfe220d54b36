//! Gluco Analytics - glucose time-series analytics engine
//!
//! Transforms exported diabetes-management data (CGM readings, insulin
//! delivery events) into the statistics the dashboard renders, through four
//! independent pure-function analyzers over the same parsed input:
//!
//! - **Parser**: raw CSV export text into typed readings
//! - **RoC**: per-interval glucose velocity classification
//! - **AGP / TIR**: percentile and range binning across time-of-day slots
//! - **IOB**: decay-weighted active-insulin estimation from dosing events
//!
//! No analyzer calls another and none holds state across calls; every
//! invocation is a fresh, deterministic computation over in-memory arrays.

pub mod agp;
pub mod colormap;
pub mod error;
pub mod iob;
pub mod parser;
pub mod report;
pub mod roc;
pub mod types;
pub mod units;

pub use error::AnalyticsError;
pub use parser::{parse_insulin_readings, parse_readings, parse_readings_auto};
pub use report::{DailyReport, ReportConfig, ReportEncoder};
pub use types::{
    GlucoseReading, GlucoseThresholds, HourlyIobData, InsulinKind, InsulinReading, RangeCategory,
    RocCategory, RocDataPoint, RocStats, TimeSlotStats, TirBreakdown,
};

/// Engine version embedded in report payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const ENGINE_NAME: &str = "gluco-analytics";
