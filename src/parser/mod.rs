pub mod header;
pub mod line_scan;
pub mod normalize;
pub mod pattern_join;
pub mod sequential;
pub mod tokens;

use std::time::Instant;

use clap::ValueEnum;
use serde::Deserialize;
use tracing::{debug, info};

use crate::table::Table;
use normalize::{normalize, RawMatch};

/// Lines scanned after a header when looking for its marks.
pub const DEFAULT_LOOKAHEAD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractMode {
    /// Composite header scan joined to marks rows by position.
    #[default]
    PatternJoin,
    /// Header lines tokenized one at a time, marks read from the lines below.
    LineScan,
    /// One pass binding each header to the next marks row.
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtractOptions {
    pub mode: ExtractMode,
    pub lookahead_lines: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            mode: ExtractMode::default(),
            lookahead_lines: DEFAULT_LOOKAHEAD,
        }
    }
}

/// Parse a gazette with the default options.
pub fn extract(text: &str) -> Table {
    extract_with(text, &ExtractOptions::default())
}

/// raw text → extractor → normalizer → table. Pure in `text` and `opts`;
/// malformed entries are dropped, never reported as errors.
pub fn extract_with(text: &str, opts: &ExtractOptions) -> Table {
    let t0 = Instant::now();
    let raws: Vec<RawMatch> = match opts.mode {
        ExtractMode::PatternJoin => pattern_join::scan(text),
        ExtractMode::LineScan => line_scan::scan(text, opts.lookahead_lines),
        ExtractMode::Sequential => sequential::scan(text, opts.lookahead_lines),
    };
    debug!(mode = ?opts.mode, matches = raws.len(), "scan finished");

    let table = Table::new(raws.into_iter().map(normalize).collect());
    info!(
        mode = ?opts.mode,
        records = table.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "extracted gazette"
    );
    table
}
