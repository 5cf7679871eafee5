//! Extraction of student result records from plain-text board gazettes.
//!
//! ```no_run
//! let table = gazette_extract::extract(&std::fs::read_to_string("gazette.txt").unwrap());
//! for r in table.records() {
//!     println!("{} {} {} {}", r.roll_no, r.name, r.total, r.result);
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod session;
pub mod table;

pub use error::{GazetteError, MalformedRecord};
pub use model::{PerformanceTier, ResultStatus, StudentRecord, Subject};
pub use parser::{extract, extract_with, ExtractMode, ExtractOptions};
pub use session::Session;
pub use table::Table;
