//! Error kinds for the conversion pipeline

use thiserror::Error;

/// One variant per pipeline stage.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Source missing, unreadable, or not parseable as CSV
    #[error("{0:#}")]
    Load(#[source] anyhow::Error),

    /// Table could not be sanitized (row width does not match the header)
    #[error("{0}")]
    Sanitize(String),

    /// Destination unwritable, or a value the workbook format cannot hold
    #[error("{0:#}")]
    Save(#[source] anyhow::Error),
}

impl ConvertError {
    /// Short name of the failing stage
    pub fn stage(&self) -> &'static str {
        match self {
            ConvertError::Load(_) => "load",
            ConvertError::Sanitize(_) => "sanitize",
            ConvertError::Save(_) => "save",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_display_includes_context_chain() {
        let err = ConvertError::Load(anyhow!("No such file").context("Failed to open file: a.csv"));
        assert_eq!(err.to_string(), "Failed to open file: a.csv: No such file");
        assert_eq!(err.stage(), "load");
    }

    #[test]
    fn test_sanitize_display() {
        let err = ConvertError::Sanitize("row 3 has 1 cells, expected 2".to_string());
        assert_eq!(err.to_string(), "row 3 has 1 cells, expected 2");
        assert_eq!(err.stage(), "sanitize");
    }
}
