//! CSV file parser

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::StringRecord;
use tracing::debug;

use crate::model::{CellType, CellValue, Column, Table};

use super::Parser;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Field contents read as missing values
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path) -> Result<Table> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        debug!(path = %path.display(), bytes = bytes.len(), "read source file");
        self.parse_bytes(&bytes)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "txt")
    }
}

impl CsvParser {
    /// Parse an in-memory CSV document
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Table> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut records = csv_reader.records();

        // Read headers
        let headers = match records.next() {
            Some(result) => result.context("Failed to read CSV headers")?,
            None => bail!("No columns to parse from file"),
        };
        let names = dedupe_names(
            headers
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    if name.is_empty() {
                        format!("Unnamed: {}", i)
                    } else {
                        name.to_string()
                    }
                })
                .collect(),
        );
        let width = names.len();

        // Read rows
        let mut rows: Vec<(usize, StringRecord)> = Vec::new();
        for result in records {
            let record = result.context("Failed to read CSV row")?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(rows.len() + 2);
            if record.len() > width {
                bail!(
                    "Error tokenizing data: expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                );
            }
            rows.push((line, record));
        }

        // Infer column types
        let types: Vec<CellType> = (0..width)
            .map(|col_idx| {
                rows.iter()
                    .filter_map(|(_, record)| record.get(col_idx))
                    .fold(CellType::Null, |acc, field| {
                        acc.widen(parse_cell_value(field).cell_type())
                    })
            })
            .collect();

        let columns: Vec<Column> = names
            .into_iter()
            .zip(&types)
            .map(|(name, cell_type)| Column::with_type(name, *cell_type))
            .collect();

        for column in &columns {
            debug!(column = %column.name, inferred_type = %column.inferred_type, "inferred column type");
        }

        let mut table = Table::new(columns);
        for (line, record) in &rows {
            // Short rows are padded with nulls
            let cells: Vec<CellValue> = types
                .iter()
                .enumerate()
                .map(|(col_idx, cell_type)| coerce_cell_value(record.get(col_idx), *cell_type))
                .collect();
            table.add_row(cells, *line);
        }

        debug!(
            rows = table.row_count(),
            columns = table.column_count(),
            "parsed CSV"
        );
        Ok(table)
    }
}

/// Classify a single field on its own
fn parse_cell_value(s: &str) -> CellValue {
    if MISSING_TOKENS.contains(&s) {
        return CellValue::Null;
    }

    match s {
        "True" | "TRUE" | "true" => return CellValue::Bool(true),
        "False" | "FALSE" | "false" => return CellValue::Bool(false),
        _ => {}
    }

    // ASCII only: U+3000 is content, not padding
    let trimmed = s.trim_matches(|c: char| c.is_ascii_whitespace());

    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }

    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_nan() {
            return CellValue::Null;
        }
        return CellValue::Float(f);
    }

    CellValue::String(Cow::Owned(s.to_string()))
}

/// Convert a field to the value its column type calls for
fn coerce_cell_value(field: Option<&str>, column_type: CellType) -> CellValue {
    let Some(field) = field else {
        return CellValue::Null;
    };

    match (column_type, parse_cell_value(field)) {
        (_, CellValue::Null) => CellValue::Null,
        (CellType::String, _) => CellValue::String(Cow::Owned(field.to_string())),
        (CellType::Float, CellValue::Int(i)) => CellValue::Float(i as f64),
        (_, value) => value,
    }
}

/// Rename repeated header names to `name.1`, `name.2`, ...
fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.clone();
        while used.contains(&candidate) {
            let n = next_suffix.entry(name.clone()).or_insert(1);
            candidate = format!("{}.{}", name, n);
            *n += 1;
        }
        used.insert(candidate.clone());
        result.push(candidate);
    }

    result
}
