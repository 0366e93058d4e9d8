//! XLSX output

use anyhow::{bail, Context, Result};
use rust_xlsxwriter::utility::row_col_to_cell;
use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Workbook, Worksheet};
use tracing::{debug, warn};

use crate::config::DEFAULT_SHEET_NAME;
use crate::model::{CellValue, Table};

use super::TableWriter;

/// Worksheet row limit, header included
pub const MAX_ROWS: usize = 1_048_576;
/// Worksheet column limit
pub const MAX_COLUMNS: usize = 16_384;
/// Longest string a single cell can hold, in characters
pub const MAX_STRING_CHARS: usize = 32_767;
/// Largest integer magnitude a cell number (an f64) holds exactly
pub const MAX_EXACT_INT: u64 = 1 << 53;

/// Writes a table as a single-sheet workbook with a header row
pub struct XlsxWriter {
    sheet_name: String,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME)
    }
}

impl XlsxWriter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    fn header_format() -> Format {
        Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin)
    }
}

impl TableWriter for XlsxWriter {
    fn render(&self, table: &Table) -> Result<Vec<u8>> {
        check_limits(table)?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&self.sheet_name)
            .with_context(|| format!("Invalid sheet name: {}", self.sheet_name))?;

        let header_format = Self::header_format();
        for (col_idx, column) in table.columns.iter().enumerate() {
            let col = col_idx as ColNum;
            check_string(&column.name, 0, col)?;
            worksheet
                .write_string_with_format(0, col, &column.name, &header_format)
                .with_context(|| format!("Failed to write header cell {}", row_col_to_cell(0, col)))?;
        }

        let rounded = table
            .rows
            .iter()
            .flat_map(|row| &row.cells)
            .filter(|cell| matches!(cell, CellValue::Int(i) if !fits_exactly(*i)))
            .count();
        if rounded > 0 {
            warn!(
                cells = rounded,
                "integers beyond 2^53 are stored rounded to the nearest representable number"
            );
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let xlsx_row = (row_idx + 1) as RowNum;
            for (col_idx, cell) in row.cells.iter().enumerate() {
                write_cell(worksheet, xlsx_row, col_idx as ColNum, cell)?;
            }
        }

        let bytes = workbook
            .save_to_buffer()
            .context("Failed to encode workbook")?;
        debug!(
            sheet = %self.sheet_name,
            rows = table.row_count(),
            columns = table.column_count(),
            bytes = bytes.len(),
            "rendered workbook"
        );
        Ok(bytes)
    }
}

fn check_limits(table: &Table) -> Result<()> {
    if table.row_count() + 1 > MAX_ROWS {
        bail!(
            "Table has {} data rows; a worksheet holds at most {}",
            table.row_count(),
            MAX_ROWS - 1
        );
    }
    if table.column_count() > MAX_COLUMNS {
        bail!(
            "Table has {} columns; a worksheet holds at most {}",
            table.column_count(),
            MAX_COLUMNS
        );
    }
    Ok(())
}

fn check_string(s: &str, row: RowNum, col: ColNum) -> Result<()> {
    let len = s.chars().count();
    if len > MAX_STRING_CHARS {
        bail!(
            "Cell {} holds {} characters; a cell holds at most {}",
            row_col_to_cell(row, col),
            len,
            MAX_STRING_CHARS
        );
    }
    Ok(())
}

/// Whether `i` survives the conversion to a cell number unchanged
fn fits_exactly(i: i64) -> bool {
    i.unsigned_abs() <= MAX_EXACT_INT
}

fn write_cell(worksheet: &mut Worksheet, row: RowNum, col: ColNum, cell: &CellValue) -> Result<()> {
    let result = match cell {
        CellValue::Null => return Ok(()),
        CellValue::Bool(b) => worksheet.write_boolean(row, col, *b),
        CellValue::Int(i) => worksheet.write_number(row, col, *i as f64),
        CellValue::Float(f) if f.is_finite() => worksheet.write_number(row, col, *f),
        // Excel has no infinity
        CellValue::Float(f) => {
            worksheet.write_string(row, col, if *f > 0.0 { "inf" } else { "-inf" })
        }
        CellValue::String(s) => {
            check_string(s, row, col)?;
            worksheet.write_string(row, col, s.as_ref())
        }
    };

    result
        .map(|_| ())
        .with_context(|| format!("Failed to write cell {}", row_col_to_cell(row, col)))
}
