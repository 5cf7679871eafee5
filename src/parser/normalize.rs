use crate::model::{percentage_of, ResultStatus, StudentRecord, Subject, SUBJECT_SLOTS};

/// What an extractor recovered for one student before cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub roll_no: String,
    pub name: String,
    pub codes: Vec<String>,
    pub marks: Vec<u32>,
    /// Scanned result text, if any.
    pub result_token: Option<String>,
    /// Status used when `result_token` is missing or outside the vocabulary.
    pub fallback: ResultStatus,
}

/// Total over any raw match: pads/truncates to five slots, collapses the
/// name, coerces the result and derives total and percentage.
pub fn normalize(raw: RawMatch) -> StudentRecord {
    let name = raw.name.split_whitespace().collect::<Vec<_>>().join(" ");

    let result = raw
        .result_token
        .as_deref()
        .and_then(ResultStatus::from_token)
        .unwrap_or(raw.fallback);

    let mut codes = raw.codes.into_iter();
    let mut marks = raw.marks.into_iter();
    let subjects: [Subject; SUBJECT_SLOTS] = std::array::from_fn(|_| Subject {
        code: codes.next().unwrap_or_default(),
        marks: marks.next().unwrap_or(0),
    });

    let total = subjects.iter().map(|s| s.marks).sum();

    StudentRecord {
        roll_no: raw.roll_no.trim().to_string(),
        name,
        subjects,
        total,
        percentage: percentage_of(total),
        result,
    }
}
