use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::model::{
    StudentRecord, COL_NAME, COL_PERCENTAGE, COL_RESULT, COL_ROLL_NO, COL_TIER, COL_TOTAL,
    SUBJECT_CODE_COLS, SUBJECT_MARKS_COLS, SUBJECT_SLOTS,
};

/// Ordered output of one parse. Rows keep document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    records: Vec<StudentRecord>,
}

impl Table {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        Table { records }
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `Roll No, Name, Sub1 Code, Sub1 Marks, …, Total, Percentage, Result`
    /// plus `Performance Tier` when asked for.
    pub fn columns(include_tier: bool) -> Vec<&'static str> {
        let mut cols = vec![COL_ROLL_NO, COL_NAME];
        for i in 0..SUBJECT_SLOTS {
            cols.push(SUBJECT_CODE_COLS[i]);
            cols.push(SUBJECT_MARKS_COLS[i]);
        }
        cols.extend([COL_TOTAL, COL_PERCENTAGE, COL_RESULT]);
        if include_tier {
            cols.push(COL_TIER);
        }
        cols
    }

    /// Every record as display strings, aligned with [`Table::columns`].
    pub fn rows(&self, include_tier: bool) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|r| row_cells(r, include_tier))
            .collect()
    }

    /// Serializable view; rows become objects keyed by the column names.
    pub fn view(&self, include_tier: bool) -> TableView<'_> {
        TableView {
            records: &self.records,
            include_tier,
        }
    }

    /// Fixed-width text rendering, at most `limit` rows.
    pub fn render_text(&self, include_tier: bool, limit: Option<usize>) -> String {
        render_grid(
            &Table::columns(include_tier),
            &self
                .records
                .iter()
                .take(limit.unwrap_or(usize::MAX))
                .map(|r| row_cells(r, include_tier))
                .collect::<Vec<_>>(),
        )
    }
}

fn row_cells(r: &StudentRecord, include_tier: bool) -> Vec<String> {
    let mut cells = vec![r.roll_no.clone(), r.name.clone()];
    for s in &r.subjects {
        cells.push(s.code.clone());
        cells.push(s.marks.to_string());
    }
    cells.push(r.total.to_string());
    cells.push(format_percentage(r.percentage));
    cells.push(r.result.to_string());
    if include_tier {
        cells.push(r.performance_tier().map(|t| t.to_string()).unwrap_or_default());
    }
    cells
}

/// `86.6`, `45.0`: always at least one decimal place.
pub fn format_percentage(p: f64) -> String {
    let s = p.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Left-aligned columns separated by ` | `, with a dashed rule under the header.
pub fn render_grid(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = grid_line(headers.iter().copied(), &widths);
    out.push('\n');
    let rule = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(rule));
    out.push('\n');
    for row in rows {
        out.push_str(&grid_line(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

fn grid_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(c, w)| format!("{:<w$}", c, w = *w))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

pub struct TableView<'a> {
    records: &'a [StudentRecord],
    include_tier: bool,
}

struct RowView<'a> {
    record: &'a StudentRecord,
    include_tier: bool,
}

impl Serialize for TableView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in self.records {
            seq.serialize_element(&RowView {
                record,
                include_tier: self.include_tier,
            })?;
        }
        seq.end()
    }
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let r = self.record;
        let len = Table::columns(self.include_tier).len();
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(COL_ROLL_NO, &r.roll_no)?;
        map.serialize_entry(COL_NAME, &r.name)?;
        for (i, s) in r.subjects.iter().enumerate() {
            map.serialize_entry(SUBJECT_CODE_COLS[i], &s.code)?;
            map.serialize_entry(SUBJECT_MARKS_COLS[i], &s.marks)?;
        }
        map.serialize_entry(COL_TOTAL, &r.total)?;
        map.serialize_entry(COL_PERCENTAGE, &r.percentage)?;
        map.serialize_entry(COL_RESULT, &r.result)?;
        if self.include_tier {
            map.serialize_entry(COL_TIER, &r.performance_tier().map(|t| t.label()))?;
        }
        map.end()
    }
}
