//! Rate-of-change analysis
//!
//! Classifies per-interval glucose velocity from consecutive reading pairs.
//! All rates are normalized to the canonical 5-minute cadence (mmol/L per
//! 5 min). Pairs separated by less than 1 minute (duplicate or near-duplicate
//! timestamps) or more than 30 minutes (sensor dropouts) contribute no point;
//! both boundaries are inclusive.

use chrono::{NaiveDateTime, Timelike};

use crate::colormap::roc_color;
use crate::types::{GlucoseReading, RocCategory, RocDataPoint, RocStats};

/// Minimum pair gap in minutes (inclusive)
pub const MIN_GAP_MINUTES: f64 = 1.0;
/// Maximum pair gap in minutes (inclusive)
pub const MAX_GAP_MINUTES: f64 = 30.0;

/// Half-width of the centered smoothing window in minutes
const SMOOTHING_HALF_WINDOW_MINUTES: f64 = 7.5;

/// Compute rate-of-change points from consecutive reading pairs.
///
/// Readings are sorted by timestamp (stable, ties keep input order) before
/// processing, so the result is insensitive to input order. Fewer than two
/// readings yield an empty result.
pub fn calculate_roc(readings: &[GlucoseReading]) -> Vec<RocDataPoint> {
    if readings.len() < 2 {
        return Vec::new();
    }

    let mut sorted = readings.to_vec();
    sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let mut points = Vec::new();
    for pair in sorted.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let delta_minutes = minutes_between(prev.timestamp, curr.timestamp);
        if !(MIN_GAP_MINUTES..=MAX_GAP_MINUTES).contains(&delta_minutes) {
            continue;
        }
        let roc_raw = (curr.value - prev.value) / delta_minutes * 5.0;
        points.push(make_point(curr, roc_raw));
    }

    points
}

/// Interval-based variant: for each reading, look back to the most recent
/// earlier reading whose gap is within +/-20% of `interval_minutes` and
/// compute the rate over that span, still normalized to the 5-minute unit.
/// Readings with no earlier partner inside the tolerance are omitted.
pub fn calculate_roc_with_interval(
    readings: &[GlucoseReading],
    interval_minutes: f64,
) -> Vec<RocDataPoint> {
    if readings.len() < 2 || interval_minutes <= 0.0 {
        return Vec::new();
    }

    let mut sorted = readings.to_vec();
    sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let min_gap = interval_minutes * 0.8;
    let max_gap = interval_minutes * 1.2;

    let mut points = Vec::new();
    for i in 1..sorted.len() {
        let curr = &sorted[i];
        // Walk backwards; the gap only grows, so stop once past tolerance
        for j in (0..i).rev() {
            let gap = minutes_between(sorted[j].timestamp, curr.timestamp);
            if gap < min_gap {
                continue;
            }
            if gap > max_gap {
                break;
            }
            let roc_raw = (curr.value - sorted[j].value) / gap * 5.0;
            points.push(make_point(curr, roc_raw));
            break;
        }
    }

    points
}

/// Rollup statistics over rate-of-change points: signed min/max, population
/// standard deviation, and per-category counts and percentages. Empty input
/// yields all-zero stats.
pub fn calculate_roc_stats(points: &[RocDataPoint]) -> RocStats {
    if points.is_empty() {
        return RocStats::default();
    }

    let total = points.len();
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut good_count = 0;
    let mut medium_count = 0;
    let mut bad_count = 0;

    for p in points {
        min = min.min(p.roc_raw);
        max = max.max(p.roc_raw);
        sum += p.roc_raw;
        match p.category {
            RocCategory::Good => good_count += 1,
            RocCategory::Medium => medium_count += 1,
            RocCategory::Bad => bad_count += 1,
        }
    }

    let mean = sum / total as f64;
    let variance = points
        .iter()
        .map(|p| (p.roc_raw - mean).powi(2))
        .sum::<f64>()
        / total as f64;

    let pct = |count: usize| count as f64 / total as f64 * 100.0;

    RocStats {
        min,
        max,
        std_dev: variance.sqrt(),
        good_count,
        medium_count,
        bad_count,
        good_pct: pct(good_count),
        medium_pct: pct(medium_count),
        bad_pct: pct(bad_count),
        total,
    }
}

/// Centered 15-minute moving average: each point's magnitude becomes the mean
/// over all points within +/-7.5 minutes of its timestamp, clamped to >= 0,
/// with category and color re-derived from the smoothed magnitude. The signed
/// rate is smoothed the same way without the clamp.
pub fn smooth_roc_data(points: &[RocDataPoint]) -> Vec<RocDataPoint> {
    points
        .iter()
        .map(|p| {
            let mut sum_abs = 0.0;
            let mut sum_raw = 0.0;
            let mut n = 0usize;
            for q in points {
                let offset = minutes_between(p.timestamp, q.timestamp).abs();
                if offset <= SMOOTHING_HALF_WINDOW_MINUTES {
                    sum_abs += q.roc;
                    sum_raw += q.roc_raw;
                    n += 1;
                }
            }
            // The point itself is always inside its own window, so n >= 1
            let roc = (sum_abs / n as f64).max(0.0);
            RocDataPoint {
                roc,
                roc_raw: sum_raw / n as f64,
                color: roc_color(roc),
                category: RocCategory::from_rate(roc),
                ..p.clone()
            }
        })
        .collect()
}

/// Longest contiguous run of same-category points, measured as elapsed
/// minutes between the run's first and last timestamp. A singleton run
/// contributes 0 minutes. Points are expected in timestamp order, as produced
/// by [`calculate_roc`].
pub fn longest_category_period(points: &[RocDataPoint], category: RocCategory) -> f64 {
    let mut longest = 0.0f64;
    let mut run_start: Option<NaiveDateTime> = None;
    let mut run_end: Option<NaiveDateTime> = None;

    for p in points {
        if p.category == category {
            if run_start.is_none() {
                run_start = Some(p.timestamp);
            }
            run_end = Some(p.timestamp);
        } else {
            if let (Some(start), Some(end)) = (run_start, run_end) {
                longest = longest.max(minutes_between(start, end));
            }
            run_start = None;
            run_end = None;
        }
    }
    if let (Some(start), Some(end)) = (run_start, run_end) {
        longest = longest.max(minutes_between(start, end));
    }

    longest
}

fn make_point(curr: &GlucoseReading, roc_raw: f64) -> RocDataPoint {
    let roc = roc_raw.abs();
    RocDataPoint {
        timestamp: curr.timestamp,
        time_decimal: curr.timestamp.hour() as f64 + curr.timestamp.minute() as f64 / 60.0,
        time_label: curr.timestamp.format("%H:%M").to_string(),
        roc,
        roc_raw,
        glucose_value: curr.value,
        color: roc_color(roc),
        category: RocCategory::from_rate(roc),
    }
}

fn minutes_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    (later - earlier).num_seconds() as f64 / 60.0
}
