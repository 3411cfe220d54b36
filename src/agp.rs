//! Ambulatory glucose profile and time-in-range aggregation
//!
//! The AGP groups every reading by its time of day truncated to a 5-minute
//! slot (288 slots), pooling all calendar days in the dataset, and summarizes
//! each slot with min/max and interpolated percentiles. The time-in-range
//! categorizer buckets individual readings against the configured thresholds
//! and produces percentage-of-total breakdowns overall, per weekday, per hour
//! of day, and per day segment.

use chrono::{Datelike, Timelike};

use crate::types::{
    GlucoseReading, GlucoseThresholds, GroupedTir, RangeCategory, TimeSlotStats, TirBreakdown,
};

/// Number of 5-minute slots in a day
pub const SLOTS_PER_DAY: usize = 288;

/// Day segment boundaries for the per-time-period breakdown
const DAY_SEGMENTS: &[(&str, u32, u32)] = &[
    ("night", 0, 6),
    ("morning", 6, 12),
    ("afternoon", 12, 18),
    ("evening", 18, 24),
];

/// Aggregate readings into 288 time-of-day slot summaries.
///
/// Percentiles use linear interpolation between order statistics (the R-7 /
/// Excel method). Slots with no readings report `count = 0` and `0.0` for
/// every statistic field.
pub fn calculate_agp_stats(readings: &[GlucoseReading]) -> Vec<TimeSlotStats> {
    let mut slots: Vec<Vec<f64>> = vec![Vec::new(); SLOTS_PER_DAY];
    for r in readings {
        let slot = (r.timestamp.hour() * 12 + r.timestamp.minute() / 5) as usize;
        slots[slot].push(r.value);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(i, mut values)| {
            let label = format!("{:02}:{:02}", i / 12, (i % 12) * 5);
            if values.is_empty() {
                return TimeSlotStats::empty(label);
            }
            values.sort_by(f64::total_cmp);
            TimeSlotStats {
                time_slot: label,
                lowest: values[0],
                p10: percentile(&values, 0.10),
                p25: percentile(&values, 0.25),
                p50: percentile(&values, 0.50),
                p75: percentile(&values, 0.75),
                p90: percentile(&values, 0.90),
                highest: values[values.len() - 1],
                count: values.len(),
            }
        })
        .collect()
}

/// R-7 percentile of an ascending-sorted, non-empty slice
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = p * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = rank - lo as f64;
    if lo + 1 >= n {
        return sorted[n - 1];
    }
    sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
}

/// Time-in-range breakdown over all readings
pub fn time_in_range(readings: &[GlucoseReading], thresholds: &GlucoseThresholds) -> TirBreakdown {
    breakdown(readings.iter().map(|r| r.value))
        .classify_with(thresholds)
}

// Internal accumulator so the grouped views share one counting path
struct Counter {
    values: Vec<f64>,
}

impl Counter {
    fn classify_with(self, thresholds: &GlucoseThresholds) -> TirBreakdown {
        let total = self.values.len();
        if total == 0 {
            return TirBreakdown::default();
        }

        let mut b = TirBreakdown {
            total,
            ..Default::default()
        };
        for v in &self.values {
            match RangeCategory::classify(*v, thresholds) {
                RangeCategory::VeryLow => b.very_low_count += 1,
                RangeCategory::Low => b.low_count += 1,
                RangeCategory::InRange => b.in_range_count += 1,
                RangeCategory::High => b.high_count += 1,
                RangeCategory::VeryHigh => b.very_high_count += 1,
            }
        }

        let pct = |count: usize| count as f64 / total as f64 * 100.0;
        b.very_low_pct = pct(b.very_low_count);
        b.low_pct = pct(b.low_count);
        b.in_range_pct = pct(b.in_range_count);
        b.high_pct = pct(b.high_count);
        b.very_high_pct = pct(b.very_high_count);
        b
    }
}

fn breakdown(values: impl Iterator<Item = f64>) -> Counter {
    Counter {
        values: values.collect(),
    }
}

/// Time-in-range per weekday (7 entries, Monday first)
pub fn time_in_range_by_weekday(
    readings: &[GlucoseReading],
    thresholds: &GlucoseThresholds,
) -> Vec<GroupedTir> {
    const WEEKDAYS: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];

    WEEKDAYS
        .iter()
        .enumerate()
        .map(|(i, label)| GroupedTir {
            label: (*label).to_string(),
            breakdown: breakdown(
                readings
                    .iter()
                    .filter(|r| r.timestamp.weekday().num_days_from_monday() as usize == i)
                    .map(|r| r.value),
            )
            .classify_with(thresholds),
        })
        .collect()
}

/// Time-in-range per hour of day (24 entries)
pub fn time_in_range_by_hour(
    readings: &[GlucoseReading],
    thresholds: &GlucoseThresholds,
) -> Vec<GroupedTir> {
    (0..24u32)
        .map(|hour| GroupedTir {
            label: format!("{hour:02}:00"),
            breakdown: breakdown(
                readings
                    .iter()
                    .filter(|r| r.timestamp.hour() == hour)
                    .map(|r| r.value),
            )
            .classify_with(thresholds),
        })
        .collect()
}

/// Time-in-range per day segment: night 00-06, morning 06-12,
/// afternoon 12-18, evening 18-24
pub fn time_in_range_by_segment(
    readings: &[GlucoseReading],
    thresholds: &GlucoseThresholds,
) -> Vec<GroupedTir> {
    DAY_SEGMENTS
        .iter()
        .map(|(label, start, end)| GroupedTir {
            label: (*label).to_string(),
            breakdown: breakdown(
                readings
                    .iter()
                    .filter(|r| {
                        let h = r.timestamp.hour();
                        h >= *start && h < *end
                    })
                    .map(|r| r.value),
            )
            .classify_with(thresholds),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn reading_on(day: u32, h: u32, m: u32, value: f64) -> GlucoseReading {
        GlucoseReading {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap(),
            value,
        }
    }

    #[test]
    fn test_agp_empty_input() {
        let stats = calculate_agp_stats(&[]);
        assert_eq!(stats.len(), SLOTS_PER_DAY);
        assert!(stats.iter().all(|s| s.count == 0 && s.p50 == 0.0));
        assert_eq!(stats[0].time_slot, "00:00");
        assert_eq!(stats[287].time_slot, "23:55");
    }

    #[test]
    fn test_agp_pools_across_days_into_same_slot() {
        // Two readings at the same time of day on different days
        let readings = vec![reading_on(1, 8, 0, 5.0), reading_on(2, 8, 0, 7.0)];
        let stats = calculate_agp_stats(&readings);

        let slot = &stats[(8 * 12) as usize];
        assert_eq!(slot.time_slot, "08:00");
        assert_eq!(slot.count, 2);
        assert_eq!(slot.lowest, 5.0);
        assert_eq!(slot.highest, 7.0);
        // Interpolated median of [5.0, 7.0]
        assert!((slot.p50 - 6.0).abs() < 1e-9);

        // Everything else stays empty
        let filled: usize = stats.iter().filter(|s| s.count > 0).count();
        assert_eq!(filled, 1);
    }

    #[test]
    fn test_agp_truncates_to_slot_start() {
        // 08:03 and 08:04 land in the 08:00 slot; 08:05 starts the next one
        let readings = vec![
            reading_on(1, 8, 3, 5.0),
            reading_on(1, 8, 4, 6.0),
            reading_on(1, 8, 5, 9.0),
        ];
        let stats = calculate_agp_stats(&readings);
        assert_eq!(stats[96].count, 2); // 08:00
        assert_eq!(stats[97].count, 1); // 08:05
    }

    #[test]
    fn test_percentile_r7() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        // R-7: rank = p * (n-1)
        assert!((percentile(&values, 0.5) - 2.5).abs() < 1e-9);
        assert!((percentile(&values, 0.25) - 1.75).abs() < 1e-9);
        assert!((percentile(&values, 0.0) - 1.0).abs() < 1e-9);
        assert!((percentile(&values, 1.0) - 4.0).abs() < 1e-9);
        assert!((percentile(&values, 0.9) - 3.7).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_singleton() {
        assert_eq!(percentile(&[4.2], 0.10), 4.2);
        assert_eq!(percentile(&[4.2], 0.90), 4.2);
    }

    #[test]
    fn test_time_in_range_counts_and_percentages() {
        let thresholds = GlucoseThresholds::default();
        let readings = vec![
            reading_on(1, 8, 0, 2.5),  // very low
            reading_on(1, 9, 0, 3.5),  // low
            reading_on(1, 10, 0, 5.0), // in range
            reading_on(1, 11, 0, 7.0), // in range
            reading_on(1, 12, 0, 12.0), // high
        ];
        let tir = time_in_range(&readings, &thresholds);
        assert_eq!(tir.total, 5);
        assert_eq!(tir.very_low_count, 1);
        assert_eq!(tir.low_count, 1);
        assert_eq!(tir.in_range_count, 2);
        assert_eq!(tir.high_count, 1);
        assert_eq!(tir.very_high_count, 0);
        assert!((tir.in_range_pct - 40.0).abs() < 1e-9);
        assert!((tir.low_pct_3() - 40.0).abs() < 1e-9);
        assert!((tir.high_pct_3() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_in_range_empty() {
        let tir = time_in_range(&[], &GlucoseThresholds::default());
        assert_eq!(tir, TirBreakdown::default());
    }

    #[test]
    fn test_time_in_range_by_weekday() {
        let thresholds = GlucoseThresholds::default();
        // 2024-03-01 is a Friday, 2024-03-04 a Monday
        let readings = vec![reading_on(1, 8, 0, 5.0), reading_on(4, 8, 0, 12.0)];
        let by_weekday = time_in_range_by_weekday(&readings, &thresholds);
        assert_eq!(by_weekday.len(), 7);
        assert_eq!(by_weekday[0].label, "Monday");
        assert_eq!(by_weekday[0].breakdown.high_count, 1);
        assert_eq!(by_weekday[4].label, "Friday");
        assert_eq!(by_weekday[4].breakdown.in_range_count, 1);
        assert_eq!(by_weekday[6].breakdown.total, 0);
    }

    #[test]
    fn test_time_in_range_by_hour() {
        let thresholds = GlucoseThresholds::default();
        let readings = vec![
            reading_on(1, 8, 0, 5.0),
            reading_on(1, 8, 30, 6.0),
            reading_on(1, 14, 0, 12.0),
        ];
        let by_hour = time_in_range_by_hour(&readings, &thresholds);
        assert_eq!(by_hour.len(), 24);
        assert_eq!(by_hour[8].label, "08:00");
        assert_eq!(by_hour[8].breakdown.total, 2);
        assert!((by_hour[8].breakdown.in_range_pct - 100.0).abs() < 1e-9);
        assert_eq!(by_hour[14].breakdown.high_count, 1);
        assert_eq!(by_hour[0].breakdown.total, 0);
    }

    #[test]
    fn test_time_in_range_by_segment() {
        let thresholds = GlucoseThresholds::default();
        let readings = vec![
            reading_on(1, 3, 0, 5.0),  // night
            reading_on(1, 7, 0, 5.0),  // morning
            reading_on(1, 13, 0, 5.0), // afternoon
            reading_on(1, 23, 0, 5.0), // evening
        ];
        let segments = time_in_range_by_segment(&readings, &thresholds);
        assert_eq!(segments.len(), 4);
        for seg in &segments {
            assert_eq!(seg.breakdown.total, 1, "segment {}", seg.label);
        }
        assert_eq!(segments[0].label, "night");
        assert_eq!(segments[3].label, "evening");
    }
}
