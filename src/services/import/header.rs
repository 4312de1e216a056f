//! Arabic header mapping and header-row detection

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::errors::ImportError;
use crate::services::spreadsheet::{Sheet, Table};

/// Anchor labels that identify the GOSI header row
pub const GOSI_ANCHORS: [&str; 2] = ["اسم المشترك", "رقم الهوية"];

const GOSI_HEADERS: &[(&str, &str)] = &[
    ("اسم المشترك", "subscriber_name"),
    ("رقم الهوية", "identity_number"),
    ("الجنسية", "nationality"),
    ("الجنس", "gender"),
    ("تاريخ الميلاد", "date_of_birth"),
    ("الأجر الأساسي", "basic_salary"),
    ("السكن", "housing"),
    ("العمولات", "commissions"),
    ("البدلات الأخرى", "other_allowances"),
    ("إجمالي الأجر", "total_salary"),
    ("الاجر الخاضع للاشتراك", "contributable_salary"),
    ("المهنة", "occupation"),
    ("تاريخ الإلتحاق", "joining_date"),
];

const WORKER_HEADERS: &[(&str, &str)] = &[
    ("رقم العامل", "worker_id"),
    ("اسم العامل", "worker_name"),
    ("الجنسية", "nationality"),
    ("رقم المنشأة", "company_id"),
    ("إسم المنشأة", "company_name"),
    ("رقم الحدود", "border_number"),
    ("الإقامة - البطاقة", "iqama_number"),
    ("المهنة", "occupation"),
    ("تاريخ انتهاء الاقامة", "iqama_expiry"),
    ("تاريخ دخول المملكة", "entry_date_ksa"),
    ("نوع العامل", "worker_type"),
];

/// Arabic column label to canonical field name
pub struct HeaderMap(HashMap<&'static str, &'static str>);

impl HeaderMap {
    fn from_pairs(pairs: &[(&'static str, &'static str)]) -> Self {
        Self(pairs.iter().copied().collect())
    }

    pub fn canonical(&self, label: &str) -> Option<&'static str> {
        self.0.get(label.trim()).copied()
    }
}

pub static GOSI_HEADER_MAP: Lazy<HeaderMap> = Lazy::new(|| HeaderMap::from_pairs(GOSI_HEADERS));
pub static WORKER_HEADER_MAP: Lazy<HeaderMap> =
    Lazy::new(|| HeaderMap::from_pairs(WORKER_HEADERS));

/// Index of the first row containing every anchor label
pub fn find_header_row(sheet: &Sheet, anchors: &[&str]) -> Result<usize, ImportError> {
    sheet
        .rows()
        .iter()
        .position(|row| {
            anchors
                .iter()
                .all(|anchor| row.iter().any(|cell| cell.as_text() == Some(*anchor)))
        })
        .ok_or(ImportError::HeaderNotFound)
}

/// Rename every known label in the table to its canonical field name
pub fn normalize_headers(table: &mut Table, map: &HeaderMap) {
    table.rename_columns(|label| map.canonical(label));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn gosi_sheet_with_header_at(header_row: usize) -> Sheet {
        let mut rows: Vec<Vec<CellValue>> = (0..header_row)
            .map(|i| vec![text(&format!("metadata {}", i)), CellValue::Empty])
            .collect();
        rows.push(vec![text("اسم المشترك"), text("رقم الهوية")]);
        rows.push(vec![text("محمد"), text("1012345678")]);
        Sheet::from_rows(rows)
    }

    #[test]
    fn finds_header_below_metadata_rows() {
        let sheet = gosi_sheet_with_header_at(5);
        assert_eq!(find_header_row(&sheet, &GOSI_ANCHORS).unwrap(), 5);
    }

    #[test]
    fn finds_header_on_first_row() {
        let sheet = gosi_sheet_with_header_at(0);
        assert_eq!(find_header_row(&sheet, &GOSI_ANCHORS).unwrap(), 0);
    }

    #[test]
    fn header_requires_both_anchors_on_the_same_row() {
        let sheet = Sheet::from_rows(vec![
            vec![text("اسم المشترك"), CellValue::Empty],
            vec![CellValue::Empty, text("رقم الهوية")],
        ]);
        let err = find_header_row(&sheet, &GOSI_ANCHORS).unwrap_err();
        assert!(matches!(err, ImportError::HeaderNotFound));
    }

    #[test]
    fn missing_anchors_is_fatal() {
        let sheet = Sheet::from_rows(vec![
            vec![text("Name"), text("ID")],
            vec![text("Ali"), CellValue::Int(1)],
        ]);
        let err = find_header_row(&sheet, &GOSI_ANCHORS).unwrap_err();
        assert_eq!(err.to_string(), "Header row not found. Please upload a valid file.");
    }

    #[test]
    fn anchors_match_after_trimming() {
        let sheet = Sheet::from_rows(vec![vec![text(" اسم المشترك "), text("رقم الهوية\n")]]);
        assert_eq!(find_header_row(&sheet, &GOSI_ANCHORS).unwrap(), 0);
    }

    #[test]
    fn normalize_maps_known_labels_and_keeps_others() {
        let sheet = Sheet::from_rows(vec![vec![
            text("رقم العامل"),
            text("اسم العامل"),
            text("ملاحظات"),
            text("تاريخ دخول المملكة"),
        ]]);
        let mut table = sheet.into_table(0).unwrap();
        normalize_headers(&mut table, &WORKER_HEADER_MAP);
        assert_eq!(
            table.columns(),
            &[
                "worker_id".to_string(),
                "worker_name".to_string(),
                "ملاحظات".to_string(),
                "entry_date_ksa".to_string(),
            ]
        );
    }

    #[test]
    fn header_maps_cover_every_field() {
        assert_eq!(GOSI_HEADERS.len(), 13);
        assert_eq!(WORKER_HEADERS.len(), 11);
        assert_eq!(GOSI_HEADER_MAP.canonical("الاجر الخاضع للاشتراك"), Some("contributable_salary"));
        assert_eq!(WORKER_HEADER_MAP.canonical("الإقامة - البطاقة"), Some("iqama_number"));
        assert_eq!(WORKER_HEADER_MAP.canonical("unknown"), None);
    }
}
