//! Configuration handling for csvclean

use std::path::PathBuf;

/// Name of the single worksheet written to the destination workbook
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Configuration for a conversion run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the source CSV file
    pub source: PathBuf,
    /// Path to the destination XLSX file
    pub destination: PathBuf,
    /// Worksheet name in the destination workbook
    pub sheet_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl Config {
    /// Create a new Config with source and destination paths
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            ..Default::default()
        }
    }

    /// Set the worksheet name
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }
}
