//! Daily report assembly
//!
//! Convenience layer that runs the independent analyzers over one parsed
//! dataset and packages the results as a single serializable payload for the
//! dashboard. The analyzers never call each other; this module is the only
//! place they are composed.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agp::{calculate_agp_stats, time_in_range, time_in_range_by_segment};
use crate::error::AnalyticsError;
use crate::iob::{prepare_hourly_iob_for_date, DEFAULT_ACTION_HOURS, MAX_ACTION_HOURS, MIN_ACTION_HOURS};
use crate::roc::{calculate_roc, calculate_roc_stats};
use crate::types::{
    GlucoseReading, GlucoseThresholds, GroupedTir, HourlyIobData, InsulinReading, RocStats,
    TimeSlotStats, TirBreakdown,
};
use crate::{ENGINE_NAME, ENGINE_VERSION};

/// Configuration supplied by the dashboard settings layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub thresholds: GlucoseThresholds,
    /// Insulin action duration in hours (1-10)
    pub insulin_action_hours: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            thresholds: GlucoseThresholds::default(),
            insulin_action_hours: DEFAULT_ACTION_HOURS,
        }
    }
}

impl ReportConfig {
    /// Validate thresholds and action duration up front, before any analyzer
    /// runs
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        self.thresholds.validate()?;
        if !(MIN_ACTION_HOURS..=MAX_ACTION_HOURS).contains(&self.insulin_action_hours) {
            return Err(AnalyticsError::InvalidDuration(self.insulin_action_hours));
        }
        Ok(())
    }
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Complete analytics payload for one report render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub producer: ReportProducer,
    /// When this report was computed (UTC, RFC 3339)
    pub generated_at: String,
    /// Report date, YYYY-MM-DD (drives the IOB series)
    pub date: String,
    pub reading_count: usize,
    pub insulin_event_count: usize,
    pub roc_stats: RocStats,
    pub time_in_range: TirBreakdown,
    pub tir_by_segment: Vec<GroupedTir>,
    pub agp: Vec<TimeSlotStats>,
    pub hourly_iob: Vec<HourlyIobData>,
}

/// Report encoder carrying a stable instance id for provenance
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create an encoder with a fresh instance id
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance id
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Run every analyzer over the supplied dataset and assemble the report.
    ///
    /// The readings and events are used as given; date-range slicing is the
    /// caller's concern except for the IOB series, which is always projected
    /// onto `date`.
    pub fn encode(
        &self,
        readings: &[GlucoseReading],
        insulin: &[InsulinReading],
        date: &str,
        config: &ReportConfig,
    ) -> Result<DailyReport, AnalyticsError> {
        config.validate()?;

        let roc_points = calculate_roc(readings);

        Ok(DailyReport {
            producer: ReportProducer {
                name: ENGINE_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            generated_at: Utc::now().to_rfc3339(),
            date: date.to_string(),
            reading_count: readings.len(),
            insulin_event_count: insulin.len(),
            roc_stats: calculate_roc_stats(&roc_points),
            time_in_range: time_in_range(readings, &config.thresholds),
            tir_by_segment: time_in_range_by_segment(readings, &config.thresholds),
            agp: calculate_agp_stats(readings),
            hourly_iob: prepare_hourly_iob_for_date(insulin, date, config.insulin_action_hours)?,
        })
    }

    /// Encode straight to a JSON string
    pub fn encode_to_json(
        &self,
        readings: &[GlucoseReading],
        insulin: &[InsulinReading],
        date: &str,
        config: &ReportConfig,
    ) -> Result<String, AnalyticsError> {
        let report = self.encode(readings, insulin, date, config)?;
        serde_json::to_string_pretty(&report).map_err(AnalyticsError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InsulinKind;
    use chrono::NaiveDate;

    fn make_test_readings() -> Vec<GlucoseReading> {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        vec![
            GlucoseReading {
                timestamp: day.and_hms_opt(8, 0, 0).unwrap(),
                value: 5.0,
            },
            GlucoseReading {
                timestamp: day.and_hms_opt(8, 5, 0).unwrap(),
                value: 5.5,
            },
            GlucoseReading {
                timestamp: day.and_hms_opt(8, 10, 0).unwrap(),
                value: 11.0,
            },
        ]
    }

    fn make_test_insulin() -> Vec<InsulinReading> {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        vec![InsulinReading {
            timestamp: day.and_hms_opt(7, 0, 0).unwrap(),
            kind: InsulinKind::Bolus,
            units: 4.0,
        }]
    }

    #[test]
    fn test_full_report() {
        let encoder = ReportEncoder::new();
        let report = encoder
            .encode(
                &make_test_readings(),
                &make_test_insulin(),
                "2024-03-01",
                &ReportConfig::default(),
            )
            .unwrap();

        assert_eq!(report.producer.name, ENGINE_NAME);
        assert_eq!(report.reading_count, 3);
        assert_eq!(report.insulin_event_count, 1);
        assert_eq!(report.roc_stats.total, 2);
        assert_eq!(report.time_in_range.total, 3);
        assert_eq!(report.time_in_range.high_count, 1);
        assert_eq!(report.agp.len(), 288);
        assert_eq!(report.hourly_iob.len(), 24);
        // Bolus at 07:00 with 5 h action is still partially active at 08:00
        assert!(report.hourly_iob[8].active_iob > 0.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let encoder = ReportEncoder::new();
        let config = ReportConfig {
            insulin_action_hours: 0,
            ..Default::default()
        };
        assert!(encoder
            .encode(&[], &[], "2024-03-01", &config)
            .is_err());

        let config = ReportConfig {
            thresholds: GlucoseThresholds {
                very_low: 5.0,
                low: 4.0,
                high: 10.0,
                very_high: 13.9,
            },
            ..Default::default()
        };
        assert!(encoder
            .encode(&[], &[], "2024-03-01", &config)
            .is_err());
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let encoder = ReportEncoder::new();
        assert!(encoder
            .encode(&[], &[], "not-a-date", &ReportConfig::default())
            .is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let encoder = ReportEncoder::with_instance_id("fixed-id".to_string());
        let json = encoder
            .encode_to_json(
                &make_test_readings(),
                &make_test_insulin(),
                "2024-03-01",
                &ReportConfig::default(),
            )
            .unwrap();

        let parsed: DailyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.producer.instance_id, "fixed-id");
        assert_eq!(parsed.date, "2024-03-01");
        assert_eq!(parsed.agp.len(), 288);
    }

    #[test]
    fn test_empty_dataset_produces_degenerate_report() {
        let encoder = ReportEncoder::new();
        let report = encoder
            .encode(&[], &[], "2024-03-01", &ReportConfig::default())
            .unwrap();

        assert_eq!(report.reading_count, 0);
        assert_eq!(report.roc_stats.total, 0);
        assert_eq!(report.time_in_range.total, 0);
        assert!(report.agp.iter().all(|s| s.count == 0));
        assert!(report.hourly_iob.iter().all(|h| h.active_iob == 0.0));
    }
}
