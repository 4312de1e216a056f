//! Blank-value sanitizing for spreadsheet cells

use crate::types::CellValue;

/// Trimmed string form of a cell, or `None` for blank, error and "nan" cells
pub fn sanitize(value: &CellValue) -> Option<String> {
    if matches!(value, CellValue::Empty | CellValue::Error(_)) {
        return None;
    }
    let text = value.to_string();
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(trimmed.to_string())
}
