use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::error::MalformedRecord;
use crate::model::{ResultStatus, SUBJECT_SLOTS};

use super::normalize::RawMatch;

/// Roll, sex marker, name, five codes, skipped middle, result token and the
/// trailing five pairs (consumed, not kept).
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(\d{8})\s+[MF]\s+([A-Z'\s]+)\s+",
        r"(\d{3})\s+(\d{3})\s+(\d{3})\s+(\d{3})\s+(\d{3})\s+.*?",
        r"(PASS|COMP|ESSENTIAL REPEAT|FAIL|\S+)\s+",
        r"(?:\d{3}\s+[A-Z0-9]+\s+){5}",
    ))
    .unwrap()
});

/// An indented line of five `code grade` pairs.
static MARKS_ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s+((?:\d{3}\s+[A-Z0-9]+\s+){5})").unwrap());

/// Scan headers and marks rows independently, then join them by ordinal.
///
/// The i-th header is paired with the i-th marks row with no content check,
/// so a missing or extra row shifts every following pairing.
pub fn scan(text: &str) -> Vec<RawMatch> {
    let headers: Vec<Captures> = HEADER_RE.captures_iter(text).collect();
    if headers.is_empty() {
        debug!("pattern-join: no header matches");
        return Vec::new();
    }

    let rows: Vec<&str> = MARKS_ROW_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();

    if headers.len() != rows.len() {
        warn!(
            headers = headers.len(),
            marks_rows = rows.len(),
            "pattern-join: header and marks-row counts differ, ordinal pairing may misalign"
        );
    }

    headers
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| match join(i, caps, rows.get(i).copied()) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(ordinal = i, roll = &caps[1], error = %e, "skipping record");
                None
            }
        })
        .collect()
}

fn join(ordinal: usize, caps: &Captures, row: Option<&str>) -> Result<RawMatch, MalformedRecord> {
    let row = row.ok_or(MalformedRecord::MissingMarksRow { ordinal })?;
    let marks = marks_from_row(row)?;
    let codes = (3..3 + SUBJECT_SLOTS).map(|g| caps[g].to_string()).collect();

    Ok(RawMatch {
        roll_no: caps[1].to_string(),
        name: caps[2].trim().to_string(),
        codes,
        marks,
        result_token: Some(caps[8].to_string()),
        fallback: ResultStatus::Comp,
    })
}

/// Every other token from index 0: the numbers of the five pairs.
fn marks_from_row(row: &str) -> Result<Vec<u32>, MalformedRecord> {
    let tokens: Vec<&str> = row.split_whitespace().collect();
    (0..SUBJECT_SLOTS * 2)
        .step_by(2)
        .map(|k| {
            let token = tokens.get(k).copied().unwrap_or_default();
            token.parse::<u32>().map_err(|_| MalformedRecord::BadMark {
                token: token.to_string(),
            })
        })
        .collect()
}
