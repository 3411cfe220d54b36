//! Core types for the glucose analytics pipeline
//!
//! This module defines the data structures that flow through each analyzer:
//! parsed readings and dosing events on the way in, plain statistics records
//! on the way out. All values are mmol/L; mg/dL is a display-only conversion.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// One glucose measurement parsed from an export row.
///
/// Invariant: `value > 0.0` (enforced at parse time). Sequences of readings
/// are never mutated in place; every transform produces a new sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlucoseReading {
    /// Wall-clock time of the measurement (exports carry no timezone)
    pub timestamp: NaiveDateTime,
    /// Glucose value (mmol/L)
    pub value: f64,
}

/// Insulin delivery kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsulinKind {
    Basal,
    Bolus,
}

impl InsulinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsulinKind::Basal => "basal",
            InsulinKind::Bolus => "bolus",
        }
    }
}

/// One insulin dosing event. Source events are never mutated; the IOB
/// estimator folds over them to produce the hourly series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsulinReading {
    pub timestamp: NaiveDateTime,
    pub kind: InsulinKind,
    /// Units delivered
    pub units: f64,
}

/// Rate-of-change classification.
///
/// Total over the absolute rate with fixed thresholds:
/// good <= 0.3, medium <= 0.55, else bad (mmol/L per 5 minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RocCategory {
    Good,
    Medium,
    Bad,
}

/// Category threshold: at or below this rate is `Good`
pub const ROC_GOOD_MAX: f64 = 0.3;
/// Category threshold: at or below this rate (and above good) is `Medium`
pub const ROC_MEDIUM_MAX: f64 = 0.55;

impl RocCategory {
    /// Classify an absolute rate (mmol/L per 5 min)
    pub fn from_rate(roc_abs: f64) -> Self {
        if roc_abs <= ROC_GOOD_MAX {
            RocCategory::Good
        } else if roc_abs <= ROC_MEDIUM_MAX {
            RocCategory::Medium
        } else {
            RocCategory::Bad
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RocCategory::Good => "good",
            RocCategory::Medium => "medium",
            RocCategory::Bad => "bad",
        }
    }
}

/// One rate-of-change sample derived from a pair of readings.
///
/// Only computed for pairs whose gap is within [1, 30] minutes; pairs outside
/// that window contribute no point (sensor gaps and duplicate timestamps are
/// excluded, not imputed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocDataPoint {
    /// Timestamp of the later reading in the pair
    pub timestamp: NaiveDateTime,
    /// Time of day as decimal hours (hour + minute/60)
    pub time_decimal: f64,
    /// Time of day label, "HH:MM"
    pub time_label: String,
    /// Absolute rate magnitude (mmol/L per 5 min)
    pub roc: f64,
    /// Signed rate (mmol/L per 5 min); negative = falling
    pub roc_raw: f64,
    /// Glucose value of the later reading (mmol/L)
    pub glucose_value: f64,
    /// Hex color for rendering, derived from the magnitude
    pub color: String,
    pub category: RocCategory,
}

/// Rollup statistics over a set of rate-of-change points.
///
/// All fields are zero when computed from empty input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RocStats {
    /// Minimum signed rate (steepest fall)
    pub min: f64,
    /// Maximum signed rate (steepest rise)
    pub max: f64,
    /// Population standard deviation of the signed rates
    pub std_dev: f64,
    pub good_count: usize,
    pub medium_count: usize,
    pub bad_count: usize,
    pub good_pct: f64,
    pub medium_pct: f64,
    pub bad_pct: f64,
    pub total: usize,
}

/// Percentile summary for one 5-minute time-of-day slot, aggregated across
/// all calendar days in the dataset.
///
/// All statistic fields are `0.0` sentinels (not NaN) when `count == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlotStats {
    /// Slot label, "HH:MM" (slot start)
    pub time_slot: String,
    pub lowest: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub highest: f64,
    /// Number of readings that fell into this slot
    pub count: usize,
}

impl TimeSlotStats {
    /// Empty slot with zero sentinels
    pub fn empty(time_slot: String) -> Self {
        Self {
            time_slot,
            lowest: 0.0,
            p10: 0.0,
            p25: 0.0,
            p50: 0.0,
            p75: 0.0,
            p90: 0.0,
            highest: 0.0,
            count: 0,
        }
    }
}

/// One hour of the insulin-on-board series for a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyIobData {
    /// Hour of day (0-23)
    pub hour: u32,
    /// Label, "HH:00"
    pub time_label: String,
    /// Decay-weighted active insulin at the top of the hour (units)
    pub active_iob: f64,
    /// Raw basal units delivered in the preceding hour (no decay)
    pub basal_in_previous_hour: f64,
    /// Raw bolus units delivered in the preceding hour (no decay)
    pub bolus_in_previous_hour: f64,
}

/// Glucose range thresholds (mmol/L).
///
/// Must satisfy `0 < very_low < low < high < very_high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlucoseThresholds {
    pub very_low: f64,
    pub low: f64,
    pub high: f64,
    pub very_high: f64,
}

impl Default for GlucoseThresholds {
    /// Standard clinical cut points: 3.0 / 3.9 / 10.0 / 13.9 mmol/L
    fn default() -> Self {
        Self {
            very_low: 3.0,
            low: 3.9,
            high: 10.0,
            very_high: 13.9,
        }
    }
}

impl GlucoseThresholds {
    /// Check the ordering invariant
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.very_low <= 0.0 {
            return Err(AnalyticsError::InvalidThresholds(format!(
                "very_low must be positive, got {}",
                self.very_low
            )));
        }
        if !(self.very_low < self.low && self.low < self.high && self.high < self.very_high) {
            return Err(AnalyticsError::InvalidThresholds(format!(
                "thresholds must satisfy very_low < low < high < very_high, got {} / {} / {} / {}",
                self.very_low, self.low, self.high, self.very_high
            )));
        }
        Ok(())
    }
}

/// Five-level range classification of a single reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeCategory {
    VeryLow,
    Low,
    InRange,
    High,
    VeryHigh,
}

impl RangeCategory {
    /// Classify a reading against the configured thresholds
    pub fn classify(value: f64, thresholds: &GlucoseThresholds) -> Self {
        if value < thresholds.very_low {
            RangeCategory::VeryLow
        } else if value < thresholds.low {
            RangeCategory::Low
        } else if value <= thresholds.high {
            RangeCategory::InRange
        } else if value <= thresholds.very_high {
            RangeCategory::High
        } else {
            RangeCategory::VeryHigh
        }
    }

    /// Collapse to the three-level view
    pub fn collapse(self) -> RangeCategory3 {
        match self {
            RangeCategory::VeryLow | RangeCategory::Low => RangeCategory3::Low,
            RangeCategory::InRange => RangeCategory3::InRange,
            RangeCategory::High | RangeCategory::VeryHigh => RangeCategory3::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeCategory::VeryLow => "very_low",
            RangeCategory::Low => "low",
            RangeCategory::InRange => "in_range",
            RangeCategory::High => "high",
            RangeCategory::VeryHigh => "very_high",
        }
    }
}

/// Three-level range classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeCategory3 {
    Low,
    InRange,
    High,
}

/// Time-in-range breakdown: counts and percentage-of-total per category.
///
/// Percentages are of the total reading count; an empty input yields
/// all-zero fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TirBreakdown {
    pub total: usize,
    pub very_low_count: usize,
    pub low_count: usize,
    pub in_range_count: usize,
    pub high_count: usize,
    pub very_high_count: usize,
    pub very_low_pct: f64,
    pub low_pct: f64,
    pub in_range_pct: f64,
    pub high_pct: f64,
    pub very_high_pct: f64,
}

impl TirBreakdown {
    /// Three-level low percentage (very low + low)
    pub fn low_pct_3(&self) -> f64 {
        self.very_low_pct + self.low_pct
    }

    /// Three-level high percentage (high + very high)
    pub fn high_pct_3(&self) -> f64 {
        self.high_pct + self.very_high_pct
    }
}

/// Time-in-range breakdown for one group (weekday, hour, or day segment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedTir {
    /// Group label ("Monday", "14:00", "morning", ...)
    pub label: String,
    pub breakdown: TirBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roc_category_boundaries() {
        assert_eq!(RocCategory::from_rate(0.3), RocCategory::Good);
        assert_eq!(RocCategory::from_rate(0.30001), RocCategory::Medium);
        assert_eq!(RocCategory::from_rate(0.55), RocCategory::Medium);
        assert_eq!(RocCategory::from_rate(0.55001), RocCategory::Bad);
        assert_eq!(RocCategory::from_rate(0.0), RocCategory::Good);
    }

    #[test]
    fn test_thresholds_default_valid() {
        assert!(GlucoseThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_thresholds_rejects_bad_ordering() {
        let t = GlucoseThresholds {
            very_low: 3.9,
            low: 3.0,
            high: 10.0,
            very_high: 13.9,
        };
        assert!(t.validate().is_err());

        let t = GlucoseThresholds {
            very_low: 0.0,
            low: 3.9,
            high: 10.0,
            very_high: 13.9,
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_range_classification() {
        let t = GlucoseThresholds::default();
        assert_eq!(RangeCategory::classify(2.5, &t), RangeCategory::VeryLow);
        assert_eq!(RangeCategory::classify(3.5, &t), RangeCategory::Low);
        assert_eq!(RangeCategory::classify(5.5, &t), RangeCategory::InRange);
        // Boundary: both configured bounds are themselves in range
        assert_eq!(RangeCategory::classify(3.9, &t), RangeCategory::InRange);
        assert_eq!(RangeCategory::classify(10.0, &t), RangeCategory::InRange);
        assert_eq!(RangeCategory::classify(12.0, &t), RangeCategory::High);
        assert_eq!(RangeCategory::classify(15.0, &t), RangeCategory::VeryHigh);
    }

    #[test]
    fn test_range_collapse() {
        assert_eq!(RangeCategory::VeryLow.collapse(), RangeCategory3::Low);
        assert_eq!(RangeCategory::Low.collapse(), RangeCategory3::Low);
        assert_eq!(RangeCategory::InRange.collapse(), RangeCategory3::InRange);
        assert_eq!(RangeCategory::High.collapse(), RangeCategory3::High);
        assert_eq!(RangeCategory::VeryHigh.collapse(), RangeCategory3::High);
    }

    #[test]
    fn test_empty_slot_sentinels() {
        let slot = TimeSlotStats::empty("00:00".to_string());
        assert_eq!(slot.count, 0);
        assert_eq!(slot.p50, 0.0);
        assert_eq!(slot.lowest, 0.0);
        assert_eq!(slot.highest, 0.0);
    }
}
