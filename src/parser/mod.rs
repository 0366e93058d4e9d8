//! Parser layer for reading tabular source files

mod csv;

use std::path::Path;

use anyhow::Result;

use crate::model::Table;

pub use self::csv::CsvParser;

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;

    /// Check the extension of `path`; files without one are accepted
    fn supports_path(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.supports_extension(ext),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_path() {
        let parser = CsvParser;
        assert!(parser.supports_path(Path::new("data.csv")));
        assert!(parser.supports_path(Path::new("DATA.CSV")));
        assert!(parser.supports_path(Path::new("export")));
        assert!(!parser.supports_path(Path::new("book.xlsx")));
    }
}
