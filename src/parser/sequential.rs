//! Single-pass extractor: each header is bound to the first marks row that
//! follows it, so there is no second scan to fall out of step with.
//!
//! `SeekHeader -> InHeader -> SeekMarks -> Emit -> SeekHeader`, advancing one
//! line at a time.

use tracing::{debug, warn};

use crate::error::MalformedRecord;
use crate::model::{ResultStatus, SUBJECT_SLOTS};

use super::header::parse_header;
use super::normalize::RawMatch;
use super::tokens::{find_result_phrase, is_header, leading_marks_row, tokenize, Token};

enum State {
    SeekHeader,
    SeekMarks { pending: RawMatch, waited: usize },
}

struct Machine {
    state: State,
    lookahead: usize,
    out: Vec<RawMatch>,
}

pub fn scan(text: &str, lookahead: usize) -> Vec<RawMatch> {
    let mut m = Machine {
        state: State::SeekHeader,
        lookahead,
        out: Vec::new(),
    };
    for (i, line) in text.lines().enumerate() {
        m.step(i + 1, &tokenize(line));
    }
    m.finish();
    m.out
}

impl Machine {
    fn step(&mut self, line_no: usize, tokens: &[Token]) {
        let state = std::mem::replace(&mut self.state, State::SeekHeader);
        self.state = match state {
            State::SeekHeader => self.in_header(line_no, tokens),
            State::SeekMarks { pending, .. } if is_header(tokens) => {
                debug!(roll = %pending.roll_no, "no marks row before next header");
                self.emit(pending);
                self.in_header(line_no, tokens)
            }
            State::SeekMarks { mut pending, waited } => match leading_marks_row(tokens) {
                Some(numbers) => {
                    match parse_marks(&numbers) {
                        Ok(marks) => {
                            pending.marks = marks;
                            self.emit(pending);
                        }
                        Err(e) => warn!(line = line_no, roll = %pending.roll_no, error = %e, "skipping record"),
                    }
                    State::SeekHeader
                }
                None if waited + 1 >= self.lookahead => {
                    debug!(roll = %pending.roll_no, "marks row not found within lookahead");
                    self.emit(pending);
                    State::SeekHeader
                }
                None => State::SeekMarks {
                    pending,
                    waited: waited + 1,
                },
            },
        };
    }

    fn in_header(&mut self, line_no: usize, tokens: &[Token]) -> State {
        if !is_header(tokens) {
            return State::SeekHeader;
        }
        match header_match(tokens) {
            Ok(pending) if self.lookahead == 0 => {
                self.emit(pending);
                State::SeekHeader
            }
            Ok(pending) => State::SeekMarks { pending, waited: 0 },
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping record");
                State::SeekHeader
            }
        }
    }

    fn emit(&mut self, raw: RawMatch) {
        self.out.push(raw);
    }

    fn finish(&mut self) {
        if let State::SeekMarks { pending, .. } = std::mem::replace(&mut self.state, State::SeekHeader) {
            self.emit(pending);
        }
    }
}

fn header_match(tokens: &[Token]) -> Result<RawMatch, MalformedRecord> {
    let header = parse_header(tokens)?;
    let rest = header.rest.iter().map(|t| t.text).collect::<Vec<_>>().join(" ");

    Ok(RawMatch {
        roll_no: header.roll.to_string(),
        name: header.name_parts.join(" "),
        codes: header
            .codes
            .iter()
            .take(SUBJECT_SLOTS)
            .map(|c| c.to_string())
            .collect(),
        marks: Vec::new(),
        result_token: find_result_phrase(&rest).map(|r| r.as_str().to_string()),
        fallback: ResultStatus::Comp,
    })
}

fn parse_marks(numbers: &[&str]) -> Result<Vec<u32>, MalformedRecord> {
    numbers
        .iter()
        .map(|n| {
            n.parse::<u32>().map_err(|_| MalformedRecord::BadMark {
                token: n.to_string(),
            })
        })
        .collect()
}
