//! Aggregations and filters over an extracted table. Nothing here touches the
//! records; every function borrows and returns new rows.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::GazetteError;
use crate::model::{round2, PerformanceTier, ResultStatus, StudentRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolSummary {
    pub total_students: usize,
    pub average_percentage: f64,
    pub pass: usize,
    pub comp: usize,
    pub essential_repeat: usize,
    pub fail: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAverage {
    pub code: String,
    pub average: f64,
    pub students: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectEntry {
    pub roll_no: String,
    pub name: String,
    pub code: String,
    pub marks: u32,
}

/// Case-insensitive substring match on roll number or name. An empty query
/// matches everything.
pub fn search<'a>(records: &'a [StudentRecord], query: &str) -> Vec<&'a StudentRecord> {
    let q = query.trim().to_lowercase();
    records.iter().filter(|r| matches_query(r, &q)).collect()
}

/// `q` must already be trimmed and lowercased.
fn matches_query(r: &StudentRecord, q: &str) -> bool {
    q.is_empty() || r.roll_no.contains(q) || r.name.to_lowercase().contains(q)
}

pub fn by_result(records: &[StudentRecord], status: ResultStatus) -> Vec<&StudentRecord> {
    records.iter().filter(|r| r.result == status).collect()
}

/// Inclusive on both ends.
pub fn by_percentage_range(
    records: &[StudentRecord],
    min: f64,
    max: f64,
) -> Result<Vec<&StudentRecord>, GazetteError> {
    if min > max {
        return Err(GazetteError::InvalidRange { min, max });
    }
    Ok(records
        .iter()
        .filter(|r| r.percentage >= min && r.percentage <= max)
        .collect())
}

/// Search, status and inclusive percentage range applied together in one
/// pass. `None` leaves that criterion open.
pub fn filter<'a>(
    records: &'a [StudentRecord],
    query: Option<&str>,
    status: Option<ResultStatus>,
    min: f64,
    max: f64,
) -> Result<Vec<&'a StudentRecord>, GazetteError> {
    if min > max {
        return Err(GazetteError::InvalidRange { min, max });
    }
    let q = query.unwrap_or_default().trim().to_lowercase();
    Ok(records
        .iter()
        .filter(|r| {
            r.percentage >= min
                && r.percentage <= max
                && status.map_or(true, |s| r.result == s)
                && matches_query(r, &q)
        })
        .collect())
}

/// Count per status, most frequent first; ties keep vocabulary order.
pub fn result_counts(records: &[StudentRecord]) -> Vec<(ResultStatus, usize)> {
    let mut counts: Vec<(ResultStatus, usize)> = ResultStatus::ALL
        .into_iter()
        .map(|s| (s, records.iter().filter(|r| r.result == s).count()))
        .filter(|(_, n)| *n > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Count per tier in tier order, zero counts included. Records with no tier
/// (percentage above 100) are left out.
pub fn tier_counts(records: &[StudentRecord]) -> Vec<(PerformanceTier, usize)> {
    PerformanceTier::ALL
        .into_iter()
        .map(|t| {
            let n = records
                .iter()
                .filter(|r| r.performance_tier() == Some(t))
                .count();
            (t, n)
        })
        .collect()
}

/// Average marks per subject code, highest first. Each slot position is
/// averaged on its own and a code's figure is the mean of its per-slot means,
/// so a code sitting in two different slots weighs both slots equally however
/// many students each holds. `students` counts every slot carrying the code.
/// Empty (padded) codes are skipped.
pub fn subject_averages(records: &[StudentRecord]) -> Vec<SubjectAverage> {
    let mut per_slot: BTreeMap<(&str, usize), (u64, usize)> = BTreeMap::new();
    for r in records {
        for (slot, s) in r.subjects.iter().enumerate() {
            if s.code.is_empty() {
                continue;
            }
            let e = per_slot.entry((s.code.as_str(), slot)).or_default();
            e.0 += u64::from(s.marks);
            e.1 += 1;
        }
    }

    let mut acc: BTreeMap<&str, (f64, usize, usize)> = BTreeMap::new();
    for ((code, _), (sum, n)) in per_slot {
        let e = acc.entry(code).or_default();
        e.0 += sum as f64 / n as f64;
        e.1 += 1;
        e.2 += n;
    }

    let mut out: Vec<SubjectAverage> = acc
        .into_iter()
        .map(|(code, (means, slots, students))| SubjectAverage {
            code: code.to_string(),
            average: round2(means / slots as f64),
            students,
        })
        .collect();
    out.sort_by(|a, b| b.average.total_cmp(&a.average));
    out
}

/// Every slot holding `code`, best marks first.
pub fn subject_drilldown(records: &[StudentRecord], code: &str) -> Vec<SubjectEntry> {
    let mut out: Vec<SubjectEntry> = records
        .iter()
        .flat_map(|r| {
            r.subjects
                .iter()
                .filter(|s| s.code == code)
                .map(move |s| SubjectEntry {
                    roll_no: r.roll_no.clone(),
                    name: r.name.clone(),
                    code: s.code.clone(),
                    marks: s.marks,
                })
        })
        .collect();
    out.sort_by(|a, b| b.marks.cmp(&a.marks));
    out
}

/// Distinct subject codes in ascending order.
pub fn subject_codes(records: &[StudentRecord]) -> Vec<String> {
    let mut codes: Vec<String> = records
        .iter()
        .flat_map(|r| r.subjects.iter())
        .filter(|s| !s.code.is_empty())
        .map(|s| s.code.clone())
        .collect();
    codes.sort();
    codes.dedup();
    codes
}

pub fn school_summary(records: &[StudentRecord]) -> SchoolSummary {
    let count = |s: ResultStatus| records.iter().filter(|r| r.result == s).count();
    let average_percentage = if records.is_empty() {
        0.0
    } else {
        round2(records.iter().map(|r| r.percentage).sum::<f64>() / records.len() as f64)
    };

    SchoolSummary {
        total_students: records.len(),
        average_percentage,
        pass: count(ResultStatus::Pass),
        comp: count(ResultStatus::Comp),
        essential_repeat: count(ResultStatus::EssentialRepeat),
        fail: count(ResultStatus::Fail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract;
    use crate::parser::normalize::{normalize, RawMatch};
    use crate::table::Table;

    fn school() -> Table {
        extract(&std::fs::read_to_string("tests/fixtures/school.txt").unwrap())
    }

    #[test]
    fn search_by_roll_or_name() {
        let t = school();
        assert_eq!(search(t.records(), "20814457").len(), 1);
        let hits = search(t.records(), "nair");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "MEERA NAIR");
        assert_eq!(search(t.records(), "  ").len(), 4);
        assert!(search(t.records(), "zzz").is_empty());
    }

    #[test]
    fn filter_by_result() {
        let t = school();
        assert_eq!(by_result(t.records(), ResultStatus::Pass).len(), 2);
        assert_eq!(by_result(t.records(), ResultStatus::Fail).len(), 0);
    }

    #[test]
    fn percentage_range_inclusive() {
        let t = school();
        // 86.8, 53.8, 25.6, 80.4
        let hits = by_percentage_range(t.records(), 53.8, 86.8).unwrap();
        assert_eq!(hits.len(), 3);
        assert!(matches!(
            by_percentage_range(t.records(), 60.0, 50.0),
            Err(GazetteError::InvalidRange { .. })
        ));
    }

    #[test]
    fn combined_filter() {
        let t = school();
        let hits = filter(t.records(), Some("a"), Some(ResultStatus::Pass), 0.0, 100.0).unwrap();
        let names: Vec<&str> = hits.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ANANYA SHARMA", "MEERA NAIR"]);

        let hits = filter(t.records(), Some("a"), Some(ResultStatus::Pass), 85.0, 100.0).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].roll_no, "20814456");

        assert_eq!(filter(t.records(), None, None, 0.0, 100.0).unwrap().len(), 4);
        assert!(filter(t.records(), Some("verma"), Some(ResultStatus::Pass), 0.0, 100.0)
            .unwrap()
            .is_empty());
        assert!(matches!(
            filter(t.records(), None, None, 90.0, 10.0),
            Err(GazetteError::InvalidRange { .. })
        ));
    }

    #[test]
    fn counts_by_result() {
        let t = school();
        let counts = result_counts(t.records());
        assert_eq!(counts[0], (ResultStatus::Pass, 2));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn counts_by_tier() {
        let t = school();
        let tiers = tier_counts(t.records());
        assert_eq!(tiers.len(), 5);
        assert_eq!(tiers[0], (PerformanceTier::Fail, 1));
        assert_eq!(tiers[2], (PerformanceTier::Second, 1));
        assert_eq!(tiers[4], (PerformanceTier::Distinction, 2));
    }

    #[test]
    fn averages_per_subject() {
        let t = school();
        let avgs = subject_averages(t.records());
        let english = avgs.iter().find(|a| a.code == "301").unwrap();
        // 95 + 65 + 20 + 82
        assert_eq!(english.students, 4);
        assert_eq!(english.average, 65.5);
        assert!(avgs.windows(2).all(|w| w[0].average >= w[1].average));
        assert_eq!(avgs[0].code, "048");
    }

    #[test]
    fn average_weighs_each_slot_equally() {
        let rec = |codes: [&str; 5], marks: [u32; 5]| {
            normalize(RawMatch {
                roll_no: "1".into(),
                name: "X".into(),
                codes: codes.iter().map(|c| c.to_string()).collect(),
                marks: marks.to_vec(),
                result_token: None,
                fallback: ResultStatus::Pass,
            })
        };
        let records = vec![
            rec(["101", "", "", "", ""], [90, 0, 0, 0, 0]),
            rec(["101", "", "", "", ""], [70, 0, 0, 0, 0]),
            rec(["", "101", "", "", ""], [0, 20, 0, 0, 0]),
        ];
        let avgs = subject_averages(&records);
        assert_eq!(avgs.len(), 1);
        // slot 1 mean 80, slot 2 mean 20
        assert_eq!(avgs[0].average, 50.0);
        assert_eq!(avgs[0].students, 3);
    }

    #[test]
    fn drilldown_sorted_by_marks() {
        let t = school();
        let rows = subject_drilldown(t.records(), "041");
        let marks: Vec<u32> = rows.iter().map(|r| r.marks).collect();
        assert_eq!(marks, vec![88, 74, 15]);
        assert!(subject_drilldown(t.records(), "999").is_empty());
    }

    #[test]
    fn distinct_codes() {
        let t = school();
        let codes = subject_codes(t.records());
        assert_eq!(codes.first().map(String::as_str), Some("027"));
        assert_eq!(codes.last().map(String::as_str), Some("301"));
        assert_eq!(codes.len(), 10);
    }

    #[test]
    fn summary_card() {
        let t = school();
        let s = school_summary(t.records());
        assert_eq!(s.total_students, 4);
        assert_eq!(s.pass, 2);
        assert_eq!(s.comp, 1);
        assert_eq!(s.essential_repeat, 1);
        assert_eq!(s.fail, 0);
        assert_eq!(s.average_percentage, 61.65);
    }

    #[test]
    fn summary_of_nothing() {
        let s = school_summary(&[]);
        assert_eq!(s.total_students, 0);
        assert_eq!(s.average_percentage, 0.0);
    }
}
