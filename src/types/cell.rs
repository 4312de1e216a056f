//! Spreadsheet cell values, independent of the workbook reader

use std::fmt;

use chrono::NaiveDateTime;

/// A single cell as read from a worksheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// Formula error such as `#N/A`
    Error(String),
}

impl CellValue {
    /// True for cells that carry no value at all
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty | CellValue::Error(_) => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed text of a string cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.trim()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            // Numeric identifiers often arrive as floats; keep them integral.
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

#[cfg(test)]
impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn integral_float_renders_without_fraction() {
        assert_eq!(CellValue::Float(1234567890.0).to_string(), "1234567890");
        assert_eq!(CellValue::Float(4500.5).to_string(), "4500.5");
    }

    #[test]
    fn nan_float_renders_as_nan() {
        assert_eq!(CellValue::Float(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn datetime_renders_like_a_timestamp() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::DateTime(dt).to_string(), "2024-03-01 00:00:00");
    }

    #[test]
    fn whitespace_text_is_blank() {
        assert!(CellValue::from("   ").is_blank());
        assert!(CellValue::Error("#N/A".into()).is_blank());
        assert!(!CellValue::Int(0).is_blank());
    }
}
