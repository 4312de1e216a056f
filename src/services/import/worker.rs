//! Foreign-worker registry import
//!
//! Registry exports carry their Arabic header on the first row.

use crate::errors::{ImportError, RowError};
use crate::services::error_log::{WORKER_CRITICAL_ERROR, WORKER_ROW_ERROR};
use crate::services::spreadsheet::{RawRow, Sheet, Table};
use crate::types::{EntityKind, ImportRecord, WorkerRecord};

use super::date::normalize_date;
use super::header::{normalize_headers, WORKER_HEADER_MAP};
use super::sanitize::sanitize;
use super::Pipeline;

pub struct WorkerPipeline;

impl Pipeline for WorkerPipeline {
    const KIND: EntityKind = EntityKind::WorkerData;
    const ROW_ERROR: &'static str = WORKER_ROW_ERROR;
    const CRITICAL_ERROR: &'static str = WORKER_CRITICAL_ERROR;

    fn load_table(sheet: Sheet) -> Result<Table, ImportError> {
        let mut table = sheet.into_table(0)?;
        normalize_headers(&mut table, &WORKER_HEADER_MAP);
        Ok(table)
    }

    fn build_record(row: &RawRow<'_>, worker_id: String) -> Result<ImportRecord, RowError> {
        let text = |field: &str| sanitize(row.get(field));

        Ok(WorkerRecord {
            worker_id,
            worker_name: text("worker_name"),
            nationality: text("nationality"),
            company_id: text("company_id"),
            company_name: text("company_name"),
            border_number: text("border_number"),
            iqama_number: text("iqama_number"),
            occupation: text("occupation"),
            iqama_expiry: normalize_date(row.get("iqama_expiry")),
            entry_date_ksa: normalize_date(row.get("entry_date_ksa")),
            worker_type: text("worker_type"),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{Fixture, Fixture::*, Harness};
    use super::*;
    use crate::types::{BatchResult, RowRef, SkippedRow};
    use chrono::NaiveDate;

    const HEADER: [&str; 11] = [
        "رقم العامل",
        "اسم العامل",
        "الجنسية",
        "رقم المنشأة",
        "إسم المنشأة",
        "رقم الحدود",
        "الإقامة - البطاقة",
        "المهنة",
        "تاريخ انتهاء الاقامة",
        "تاريخ دخول المملكة",
        "نوع العامل",
    ];

    fn header() -> Vec<Fixture<'static>> {
        HEADER.iter().map(|&h| Text(h)).collect()
    }

    fn worker<'a>(id: Fixture<'a>, name: &'a str, expiry: &'a str) -> Vec<Fixture<'a>> {
        vec![
            id,
            Text(name),
            Text("هندي"),
            Number(7001234567.0),
            Text("شركة البناء"),
            Number(3123456789.0),
            Text("2345678901"),
            Text("عامل بناء"),
            Text(expiry),
            Text("nan"),
            Text(" عادي "),
        ]
    }

    #[tokio::test]
    async fn imports_registry_rows() {
        let harness = Harness::new();
        let url = harness.write_workbook(
            "workers.xlsx",
            &[
                header(),
                worker(Number(123456.0), "Ramesh", "1446/06/12"),
                worker(Text("W-2"), "Suresh", "bad date"),
            ],
        );

        let result = harness.importer.import_worker_data(&url, harness.context()).await;

        assert_eq!(result.inserted.len(), 2);
        assert!(result.skipped.is_empty());

        let stored = harness.store.committed();
        let ImportRecord::WorkerData(first) = &stored[0] else {
            panic!("expected a worker record");
        };
        assert_eq!(first.worker_id, "123456");
        assert_eq!(first.company_id.as_deref(), Some("7001234567"));
        assert_eq!(first.border_number.as_deref(), Some("3123456789"));
        assert_eq!(first.iqama_expiry, NaiveDate::from_ymd_opt(2024, 12, 13));
        assert_eq!(first.entry_date_ksa, None);
        assert_eq!(first.worker_type.as_deref(), Some("عادي"));

        let ImportRecord::WorkerData(second) = &stored[1] else {
            panic!("expected a worker record");
        };
        assert_eq!(second.iqama_expiry, None);
    }

    #[tokio::test]
    async fn same_worker_twice_in_one_batch_is_a_duplicate() {
        let harness = Harness::new();
        let url = harness.write_workbook(
            "workers.xlsx",
            &[
                header(),
                worker(Text("W1"), "A", ""),
                worker(Text("W1"), "B", ""),
            ],
        );

        let result = harness.importer.import_worker_data(&url, harness.context()).await;

        assert_eq!(result.inserted.len(), 1);
        assert_eq!(
            result.skipped,
            vec![SkippedRow {
                row: RowRef::Line(3),
                reason: "Duplicate".to_string()
            }]
        );
        let stored = harness.store.committed();
        let ImportRecord::WorkerData(kept) = &stored[0] else {
            panic!("expected a worker record");
        };
        assert_eq!(kept.worker_name.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn blank_worker_id_is_skipped_and_blank_rows_keep_numbering() {
        let harness = Harness::new();
        let url = harness.write_workbook(
            "workers.xlsx",
            &[
                header(),
                worker(Text("nan"), "A", ""),
                vec![Blank],
                worker(Text("W3"), "C", ""),
            ],
        );

        let result = harness.importer.import_worker_data(&url, harness.context()).await;

        assert_eq!(result.inserted.len(), 1);
        assert_eq!(
            result.skipped,
            vec![SkippedRow {
                row: RowRef::Line(2),
                reason: "Missing worker_id".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn header_only_sheet_imports_nothing() {
        let harness = Harness::new();
        let url = harness.write_workbook("workers.xlsx", &[header()]);

        let result = harness.importer.import_worker_data(&url, harness.context()).await;

        assert_eq!(result, BatchResult::default());
    }

    #[tokio::test]
    async fn empty_sheet_fails_the_batch() {
        let harness = Harness::new();
        let url = harness.write_workbook("workers.xlsx", &[]);

        let result = harness.importer.import_worker_data(&url, harness.context()).await;

        assert_eq!(result, BatchResult::failed("Spreadsheet has no header row"));
    }
}
