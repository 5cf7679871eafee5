use tracing::warn;

use crate::error::MalformedRecord;
use crate::model::{ResultStatus, SUBJECT_SLOTS};

use super::header::parse_header;
use super::normalize::RawMatch;
use super::tokens::{find_result_phrase, is_header, pairs, tokenize, Token};

/// Walk the document line by line; every header line yields one record whose
/// marks come from the `lookahead` lines that follow it. The window is not
/// cut short at the next header, so a student without a marks row of their
/// own picks up pairs from whatever follows.
pub fn scan(text: &str, lookahead: usize) -> Vec<RawMatch> {
    let lines: Vec<Vec<Token>> = text.lines().map(tokenize).collect();
    let mut out = Vec::new();

    for (i, tokens) in lines.iter().enumerate() {
        if !is_header(tokens) {
            continue;
        }
        match record_at(&lines, i, lookahead) {
            Ok(raw) => out.push(raw),
            Err(e) => warn!(line = i + 1, error = %e, "skipping record"),
        }
    }

    out
}

fn record_at(lines: &[Vec<Token>], idx: usize, lookahead: usize) -> Result<RawMatch, MalformedRecord> {
    let tokens = &lines[idx];
    let header = parse_header(tokens)?;

    let joined = tokens.iter().map(|t| t.text).collect::<Vec<_>>().join(" ");
    let result = find_result_phrase(&joined);

    let mut marks = Vec::with_capacity(SUBJECT_SLOTS);
    for next in lines.iter().skip(idx + 1).take(lookahead) {
        for (number, _grade) in pairs(next) {
            let mark = number.parse::<u32>().map_err(|_| MalformedRecord::BadMark {
                token: number.to_string(),
            })?;
            marks.push(mark);
        }
        if marks.len() >= SUBJECT_SLOTS {
            break;
        }
    }
    marks.truncate(SUBJECT_SLOTS);

    let mut codes: Vec<String> = header.codes.iter().map(|c| c.to_string()).collect();
    codes.truncate(SUBJECT_SLOTS);

    Ok(RawMatch {
        roll_no: header.roll.to_string(),
        name: header.name_parts.join(" "),
        codes,
        marks,
        result_token: result.map(|r| r.as_str().to_string()),
        fallback: ResultStatus::Pass,
    })
}
