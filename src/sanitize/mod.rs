//! Allow-list filtering of text cells
//!
//! Every character outside [`ALLOWED_RANGES`] is deleted from string cells.
//! Numbers, booleans and nulls pass through untouched.

use std::borrow::Cow;
use std::ops::RangeInclusive;

use tracing::debug;

use crate::error::ConvertError;
use crate::model::{CellValue, Table};

/// Characters that survive sanitization
pub const ALLOWED_RANGES: [RangeInclusive<char>; 4] = [
    // Hyphen-minus
    '-'..='-',
    // CJK Unified Ideographs
    '\u{4E00}'..='\u{9FFF}',
    // Ideographic (full-width) space, CJK symbols and punctuation
    '\u{3000}'..='\u{303F}',
    // Halfwidth and fullwidth forms
    '\u{FF00}'..='\u{FFEF}',
];

/// Counters collected while sanitizing a table
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeStats {
    /// String cells inspected
    pub text_cells: usize,
    /// String cells whose content changed
    pub cells_changed: usize,
    /// Characters removed across all cells
    pub chars_removed: usize,
}

/// Whether `c` lies in one of the allowed ranges
pub fn is_allowed(c: char) -> bool {
    ALLOWED_RANGES.iter().any(|range| range.contains(&c))
}

/// Keep only allowed characters; borrows when nothing is removed
pub fn sanitize_str(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_allowed) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|&c| is_allowed(c)).collect())
    }
}

/// Sanitize one cell in place, returning the number of characters removed
pub fn sanitize_cell(cell: &mut CellValue) -> usize {
    let CellValue::String(text) = cell else {
        return 0;
    };

    let before = text.chars().count();
    let cleaned = match sanitize_str(text) {
        Cow::Borrowed(_) => return 0,
        Cow::Owned(cleaned) => cleaned,
    };
    let removed = before - cleaned.chars().count();
    *text = Cow::Owned(cleaned);
    removed
}

/// Sanitize every string cell of `table` in place
///
/// Fails only if a row's width disagrees with the header, since the shape
/// of the table must be preserved.
pub fn sanitize_table(table: &mut Table) -> Result<SanitizeStats, ConvertError> {
    let width = table.column_count();
    let mut stats = SanitizeStats::default();

    for row in &mut table.rows {
        if row.cells.len() != width {
            return Err(ConvertError::Sanitize(format!(
                "row at line {} has {} cells, expected {}",
                row.source_line,
                row.cells.len(),
                width
            )));
        }

        for cell in &mut row.cells {
            if !matches!(cell, CellValue::String(_)) {
                continue;
            }
            stats.text_cells += 1;
            let removed = sanitize_cell(cell);
            if removed > 0 {
                stats.cells_changed += 1;
                stats.chars_removed += removed;
            }
        }
    }

    debug!(
        text_cells = stats.text_cells,
        cells_changed = stats.cells_changed,
        chars_removed = stats.chars_removed,
        "sanitized table"
    );
    Ok(stats)
}
