//! Visit records and their line-oriented on-disk format.
//!
//! One record per line: `<path>\t<weight>\t<last_visit>`, where
//! `last_visit` is Unix seconds. Blank lines and `#` comments are skipped.
//! Lines without a timestamp load with the epoch; extra trailing fields are
//! ignored so newer writers stay readable.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;

/// All records keyed by normalized absolute path.
pub type Records = BTreeMap<String, VisitRecord>;

#[derive(Debug, Clone, PartialEq)]
pub struct VisitRecord {
    pub path: String,
    pub weight: f64,
    pub last_visit: DateTime<Utc>,
}

impl VisitRecord {
    pub fn new(path: impl Into<String>, weight: f64, last_visit: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            weight,
            last_visit,
        }
    }

    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}",
            self.path,
            self.weight,
            self.last_visit.timestamp()
        )
    }
}

/// A line that could not be parsed, with its 1-based number.
#[derive(Debug, Clone, PartialEq)]
pub struct LineError {
    pub line: usize,
    pub reason: String,
}

pub fn parse_records(content: &str) -> Result<Records, LineError> {
    let mut records = Records::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let record = parse_line(line).map_err(|reason| LineError {
            line: idx + 1,
            reason,
        })?;

        // Duplicate keys can only come from hand edits; keep the heavier one.
        match records.get(&record.path) {
            Some(existing) if existing.weight >= record.weight => {}
            _ => {
                records.insert(record.path.clone(), record);
            }
        }
    }

    Ok(records)
}

fn parse_line(line: &str) -> Result<VisitRecord, String> {
    let mut fields = line.split('\t');

    let path = fields.next().unwrap_or_default();
    if !path.starts_with('/') {
        return Err(format!("path '{}' is not absolute", path));
    }

    let weight_field = fields
        .next()
        .ok_or_else(|| "missing weight field".to_string())?;
    let weight: f64 = weight_field
        .trim()
        .parse()
        .map_err(|_| format!("weight '{}' is not a number", weight_field))?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(format!("weight '{}' is out of range", weight_field));
    }

    let last_visit = match fields.next() {
        Some(ts) => {
            let secs: i64 = ts
                .trim()
                .parse()
                .map_err(|_| format!("timestamp '{}' is not an integer", ts))?;
            Utc.timestamp_opt(secs, 0)
                .single()
                .ok_or_else(|| format!("timestamp '{}' is out of range", ts))?
        }
        None => DateTime::<Utc>::default(),
    };

    Ok(VisitRecord::new(path, weight, last_visit))
}

pub fn render_records(records: &Records) -> String {
    let mut out = String::new();
    for record in records.values() {
        out.push_str(&record.to_line());
        out.push('\n');
    }
    out
}
