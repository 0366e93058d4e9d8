//! The load → sanitize → save pipeline

use tracing::{info, warn};

use crate::config::Config;
use crate::error::ConvertError;
use crate::output::{TableWriter, XlsxWriter};
use crate::parser::{CsvParser, Parser};
use crate::sanitize::{sanitize_table, SanitizeStats};

/// Outcome of a successful conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    pub rows: usize,
    pub columns: usize,
    pub sanitize: SanitizeStats,
}

/// Convert `config.source` to `config.destination`
///
/// Nothing is written to the destination unless all three stages succeed.
pub fn convert(config: &Config) -> Result<ConvertSummary, ConvertError> {
    let parser = CsvParser;
    if !parser.supports_path(&config.source) {
        warn!(path = %config.source.display(), "source does not have a .csv extension, parsing as CSV anyway");
    }

    let mut table = parser.parse(&config.source).map_err(ConvertError::Load)?;
    info!(
        path = %config.source.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded source"
    );

    let stats = sanitize_table(&mut table)?;
    info!(
        cells_changed = stats.cells_changed,
        chars_removed = stats.chars_removed,
        "sanitized text cells"
    );

    XlsxWriter::new(config.sheet_name.as_str())
        .write(&table, &config.destination)
        .map_err(ConvertError::Save)?;
    info!(path = %config.destination.display(), "saved workbook");

    Ok(ConvertSummary {
        rows: table.row_count(),
        columns: table.column_count(),
        sanitize: stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let destination = dir.path().join("out.xlsx");
        std::fs::write(&source, "名称,数量\nApple苹果,3\n橙子,\n").unwrap();

        let summary = convert(&Config::new(&source, &destination)).unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, 2);
        assert_eq!(summary.sanitize.cells_changed, 1);
        assert!(destination.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_convert_output_has_default_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let destination = dir.path().join("out.xlsx");
        std::fs::write(&source, "a\n中\n").unwrap();

        convert(&Config::new(&source, &destination)).unwrap();

        let mode = |p: &std::path::Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&destination), mode(&source));
    }

    #[test]
    fn test_convert_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.xlsx");
        let config = Config::new(dir.path().join("missing.csv"), &destination);

        let err = convert(&config).unwrap_err();

        assert_eq!(err.stage(), "load");
        assert!(err.to_string().contains("Failed to open file"));
        assert!(!destination.exists());
    }

    #[test]
    fn test_convert_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.csv");
        std::fs::write(&source, "a\n中\n").unwrap();
        let destination = dir.path().join("missing_dir").join("out.xlsx");

        let err = convert(&Config::new(&source, &destination)).unwrap_err();

        assert_eq!(err.stage(), "save");
        assert!(!destination.exists());
    }
}
