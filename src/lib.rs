//! csvclean - CSV to XLSX conversion with allow-list text sanitization
//!
//! Loads a CSV file, strips every text cell down to hyphen, CJK ideographs,
//! CJK punctuation and full-width forms, and writes a single-sheet workbook.

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod sanitize;

pub use config::Config;
pub use convert::{convert, ConvertSummary};
pub use error::ConvertError;
pub use model::Table;
