use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of subject slots every record carries.
pub const SUBJECT_SLOTS: usize = 5;

pub const COL_ROLL_NO: &str = "Roll No";
pub const COL_NAME: &str = "Name";
pub const COL_TOTAL: &str = "Total";
pub const COL_PERCENTAGE: &str = "Percentage";
pub const COL_RESULT: &str = "Result";
pub const COL_TIER: &str = "Performance Tier";

pub const SUBJECT_CODE_COLS: [&str; SUBJECT_SLOTS] =
    ["Sub1 Code", "Sub2 Code", "Sub3 Code", "Sub4 Code", "Sub5 Code"];
pub const SUBJECT_MARKS_COLS: [&str; SUBJECT_SLOTS] =
    ["Sub1 Marks", "Sub2 Marks", "Sub3 Marks", "Sub4 Marks", "Sub5 Marks"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum ResultStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "COMP")]
    Comp,
    #[serde(rename = "ESSENTIAL REPEAT")]
    EssentialRepeat,
    #[serde(rename = "FAIL")]
    Fail,
}

impl ResultStatus {
    /// Vocabulary in the order extractors probe it.
    pub const ALL: [ResultStatus; 4] = [
        ResultStatus::Pass,
        ResultStatus::Comp,
        ResultStatus::EssentialRepeat,
        ResultStatus::Fail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResultStatus::Pass => "PASS",
            ResultStatus::Comp => "COMP",
            ResultStatus::EssentialRepeat => "ESSENTIAL REPEAT",
            ResultStatus::Fail => "FAIL",
        }
    }

    /// Exact match against the gazette vocabulary.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == token)
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PerformanceTier {
    Fail,
    Pass,
    Second,
    First,
    Distinction,
}

impl PerformanceTier {
    pub const ALL: [PerformanceTier; 5] = [
        PerformanceTier::Fail,
        PerformanceTier::Pass,
        PerformanceTier::Second,
        PerformanceTier::First,
        PerformanceTier::Distinction,
    ];

    /// Left-closed bins `[0,33) [33,45) [45,60) [60,75) [75,100]`.
    /// Anything outside `[0, 100]` has no tier.
    pub fn classify(percentage: f64) -> Option<Self> {
        if !(0.0..=100.0).contains(&percentage) {
            return None;
        }
        let tier = if percentage < 33.0 {
            PerformanceTier::Fail
        } else if percentage < 45.0 {
            PerformanceTier::Pass
        } else if percentage < 60.0 {
            PerformanceTier::Second
        } else if percentage < 75.0 {
            PerformanceTier::First
        } else {
            PerformanceTier::Distinction
        };
        Some(tier)
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceTier::Fail => "Fail (<33%)",
            PerformanceTier::Pass => "Pass (33-44%)",
            PerformanceTier::Second => "Second (45-59%)",
            PerformanceTier::First => "First (60-74%)",
            PerformanceTier::Distinction => "Distinction (75%+)",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Subject {
    pub code: String,
    pub marks: u32,
}

/// One student's normalized row. Built once by the normalizer, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub roll_no: String,
    pub name: String,
    pub subjects: [Subject; SUBJECT_SLOTS],
    pub total: u32,
    pub percentage: f64,
    pub result: ResultStatus,
}

impl StudentRecord {
    /// Derived on request from `percentage`.
    pub fn performance_tier(&self) -> Option<PerformanceTier> {
        PerformanceTier::classify(self.percentage)
    }

    pub fn marks(&self) -> impl Iterator<Item = u32> + '_ {
        self.subjects.iter().map(|s| s.marks)
    }
}

/// `round(total / 5, 2)`; an average over the five slots, not out of 500.
pub fn percentage_of(total: u32) -> f64 {
    round2(f64::from(total) / SUBJECT_SLOTS as f64)
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
