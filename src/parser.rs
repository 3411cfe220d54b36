//! CSV export parser
//!
//! Turns raw export text into typed readings. Exports carry a fixed two-line
//! preamble (metadata line, then header line) followed by data rows. Columns
//! are located by case-insensitive substring match on header names, never by
//! position.
//!
//! Parsing is deliberately lenient: a missing column yields an empty result
//! rather than an error, and malformed rows are skipped. Callers treat empty
//! output as "no usable data", not as failure.

use chrono::NaiveDateTime;

use crate::types::{GlucoseReading, InsulinKind, InsulinReading};

/// Timestamp formats seen in CGM export files
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Parse glucose readings from export text using the given delimiter.
///
/// Line 0 is metadata (ignored), line 1 is the header row, data starts at
/// line 2. Rows with an unparseable timestamp, a non-numeric glucose field,
/// or a value <= 0 are skipped. Returns an empty vec when either required
/// column is missing.
pub fn parse_readings(csv_text: &str, delimiter: char) -> Vec<GlucoseReading> {
    let lines: Vec<&str> = csv_text.lines().collect();
    if lines.len() < 3 {
        return Vec::new();
    }

    let header: Vec<String> = lines[1]
        .split(delimiter)
        .map(|h| h.trim().to_lowercase())
        .collect();

    let timestamp_col = match find_column(&header, &["timestamp"]) {
        Some(i) => i,
        None => return Vec::new(),
    };
    let glucose_col = match find_column(&header, &["glucose value", "glucose"]) {
        Some(i) => i,
        None => return Vec::new(),
    };

    let mut readings = Vec::new();
    for line in &lines[2..] {
        let fields: Vec<&str> = line.split(delimiter).collect();
        let timestamp = match fields.get(timestamp_col).and_then(|f| parse_timestamp(f)) {
            Some(t) => t,
            None => continue,
        };
        let value = match fields.get(glucose_col).and_then(|f| f.trim().parse::<f64>().ok()) {
            Some(v) if v > 0.0 => v,
            _ => continue,
        };
        readings.push(GlucoseReading { timestamp, value });
    }

    readings
}

/// Parse insulin dosing events from export text using the given delimiter.
///
/// Same preamble and skip rules as [`parse_readings`]. The units column is
/// found by the substring "insulin"; the delivery kind comes from an optional
/// type column ("subtype" or "type") whose value contains "basal" or "long"
/// for basal delivery. Without a type column every event is treated as bolus.
pub fn parse_insulin_readings(csv_text: &str, delimiter: char) -> Vec<InsulinReading> {
    let lines: Vec<&str> = csv_text.lines().collect();
    if lines.len() < 3 {
        return Vec::new();
    }

    let header: Vec<String> = lines[1]
        .split(delimiter)
        .map(|h| h.trim().to_lowercase())
        .collect();

    let timestamp_col = match find_column(&header, &["timestamp"]) {
        Some(i) => i,
        None => return Vec::new(),
    };
    let units_col = match find_column(&header, &["insulin"]) {
        Some(i) => i,
        None => return Vec::new(),
    };
    let kind_col = find_column(&header, &["subtype", "type"]);

    let mut events = Vec::new();
    for line in &lines[2..] {
        let fields: Vec<&str> = line.split(delimiter).collect();
        let timestamp = match fields.get(timestamp_col).and_then(|f| parse_timestamp(f)) {
            Some(t) => t,
            None => continue,
        };
        let units = match fields.get(units_col).and_then(|f| f.trim().parse::<f64>().ok()) {
            Some(u) if u > 0.0 => u,
            _ => continue,
        };
        let kind = kind_col
            .and_then(|i| fields.get(i))
            .map(|f| {
                let k = f.trim().to_lowercase();
                if k.contains("basal") || k.contains("long") {
                    InsulinKind::Basal
                } else {
                    InsulinKind::Bolus
                }
            })
            .unwrap_or(InsulinKind::Bolus);
        events.push(InsulinReading {
            timestamp,
            kind,
            units,
        });
    }

    events
}

/// Auto-detect the delimiter from the header line: tab vs comma counts, the
/// more frequent character wins, tie favors tab.
pub fn detect_delimiter(csv_text: &str) -> char {
    let header = csv_text.lines().nth(1).unwrap_or("");
    let tabs = header.matches('\t').count();
    let commas = header.matches(',').count();
    if commas > tabs {
        ','
    } else {
        '\t'
    }
}

/// Parse readings with delimiter auto-detection
pub fn parse_readings_auto(csv_text: &str) -> Vec<GlucoseReading> {
    parse_readings(csv_text, detect_delimiter(csv_text))
}

/// Parse insulin events with delimiter auto-detection
pub fn parse_insulin_readings_auto(csv_text: &str) -> Vec<InsulinReading> {
    parse_insulin_readings(csv_text, detect_delimiter(csv_text))
}

/// Concatenate readings from multiple source files in source-file order.
///
/// No de-duplication or re-sorting happens here; sorting is each downstream
/// consumer's responsibility.
pub fn merge_readings(parts: &[Vec<GlucoseReading>]) -> Vec<GlucoseReading> {
    let mut merged = Vec::with_capacity(parts.iter().map(Vec::len).sum());
    for part in parts {
        merged.extend_from_slice(part);
    }
    merged
}

/// First header index whose name contains any of the needles, tried in order
fn find_column(header: &[String], needles: &[&str]) -> Option<usize> {
    for needle in needles {
        if let Some(i) = header.iter().position(|h| h.contains(needle)) {
            return Some(i);
        }
    }
    None
}

fn parse_timestamp(field: &str) -> Option<NaiveDateTime> {
    let trimmed = field.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}
