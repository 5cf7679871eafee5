use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::parser::{extract_with, ExtractOptions};
use crate::table::Table;

type Key = (u64, ExtractOptions);

/// Parse cache owned by the caller. Parsing is a pure function of the text and
/// options, so a hit can be returned as-is.
#[derive(Debug, Default)]
pub struct Session {
    tables: HashMap<Key, Arc<Table>>,
}

fn content_key(text: &str, opts: &ExtractOptions) -> Key {
    let mut h = DefaultHasher::new();
    text.hash(&mut h);
    (h.finish(), *opts)
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, text: &str, opts: &ExtractOptions) -> Arc<Table> {
        let key = content_key(text, opts);
        if let Some(hit) = self.tables.get(&key) {
            debug!(records = hit.len(), "session cache hit");
            return Arc::clone(hit);
        }
        let table = Arc::new(extract_with(text, opts));
        self.tables.insert(key, Arc::clone(&table));
        table
    }

    /// Tables for `docs` in input order. Distinct uncached documents are parsed
    /// in parallel; each parse itself stays single-threaded.
    pub fn parse_all(&mut self, docs: &[&str], opts: &ExtractOptions) -> Vec<Arc<Table>> {
        let keys: Vec<Key> = docs.iter().map(|d| content_key(d, opts)).collect();

        let mut pending: Vec<(Key, &str)> = Vec::new();
        for (key, doc) in keys.iter().zip(docs) {
            if !self.tables.contains_key(key) && !pending.iter().any(|(k, _)| k == key) {
                pending.push((*key, *doc));
            }
        }
        debug!(docs = docs.len(), to_parse = pending.len(), "session batch");

        let parsed: Vec<(Key, Table)> = pending
            .into_par_iter()
            .map(|(key, doc)| (key, extract_with(doc, opts)))
            .collect();
        for (key, table) in parsed {
            self.tables.insert(key, Arc::new(table));
        }

        keys.iter()
            .filter_map(|k| self.tables.get(k).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Drop every cached table.
    pub fn clear(&mut self) {
        self.tables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ExtractMode;

    fn doc() -> String {
        std::fs::read_to_string("tests/fixtures/school.txt").unwrap()
    }

    #[test]
    fn caches_by_content() {
        let mut s = Session::new();
        let opts = ExtractOptions::default();
        let a = s.parse(&doc(), &opts);
        let b = s.parse(&doc(), &opts);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn options_are_part_of_the_key() {
        let mut s = Session::new();
        let text = doc();
        s.parse(&text, &ExtractOptions::default());
        s.parse(
            &text,
            &ExtractOptions {
                mode: ExtractMode::LineScan,
                ..ExtractOptions::default()
            },
        );
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn batch_dedups_and_keeps_order() {
        let mut s = Session::new();
        let school = doc();
        let single = std::fs::read_to_string("tests/fixtures/single.txt").unwrap();
        let tables = s.parse_all(
            &[school.as_str(), single.as_str(), school.as_str()],
            &ExtractOptions::default(),
        );
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].len(), 4);
        assert_eq!(tables[1].len(), 1);
        assert!(Arc::ptr_eq(&tables[0], &tables[2]));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn clear_empties_cache() {
        let mut s = Session::new();
        s.parse("", &ExtractOptions::default());
        assert!(!s.is_empty());
        s.clear();
        assert!(s.is_empty());
    }
}
