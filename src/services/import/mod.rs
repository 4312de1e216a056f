//! Spreadsheet import pipelines
//!
//! Both pipelines share one row loop: resolve the uploaded file, read its
//! first sheet, locate and normalize the header, then walk the data rows in
//! order. A row is skipped when its key is missing or already stored, and
//! any failure building or persisting a row is logged and recorded without
//! stopping the batch. Failures that make the whole file unusable end the
//! batch with a single `"All"` skip entry.

pub mod date;
pub mod gosi;
pub mod header;
pub mod hijri;
pub mod sanitize;
pub mod worker;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::errors::{ImportError, RowError};
use crate::services::error_log::ErrorLog;
use crate::services::file_store::FileStore;
use crate::services::persistence::{PersistenceContext, RecordStore};
use crate::services::spreadsheet::{RawRow, Sheet, Table};
use crate::types::{BatchResult, EntityKind, ImportRecord, RowRef};

pub use gosi::GosiPipeline;
pub use worker::WorkerPipeline;

use sanitize::sanitize;

/// What distinguishes one import pipeline from another
pub trait Pipeline {
    const KIND: EntityKind;
    /// Error log category for row failures
    const ROW_ERROR: &'static str;
    /// Error log category for batch failures
    const CRITICAL_ERROR: &'static str;

    /// Locate the header row and relabel columns to canonical field names
    fn load_table(sheet: Sheet) -> Result<Table, ImportError>;

    /// Build the record for a row whose key is `key`
    fn build_record(row: &RawRow<'_>, key: String) -> Result<ImportRecord, RowError>;
}

/// Outcome of one data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Inserted(String),
    Skipped(String),
}

/// Runs import batches against a file store and an error log
#[derive(Clone)]
pub struct Importer {
    files: Arc<dyn FileStore>,
    errors: Arc<dyn ErrorLog>,
}

impl Importer {
    pub fn new(files: Arc<dyn FileStore>, errors: Arc<dyn ErrorLog>) -> Self {
        Self { files, errors }
    }

    /// Import a GOSI subscriber export
    pub async fn import_gosi_worker_data<S: RecordStore>(
        &self,
        file_url: &str,
        ctx: PersistenceContext<S>,
    ) -> BatchResult {
        self.run::<GosiPipeline, S>(file_url, ctx).await
    }

    /// Import a foreign-worker registry export
    pub async fn import_worker_data<S: RecordStore>(
        &self,
        file_url: &str,
        ctx: PersistenceContext<S>,
    ) -> BatchResult {
        self.run::<WorkerPipeline, S>(file_url, ctx).await
    }

    /// Result for a batch that could not start, e.g. because the record
    /// store was unavailable
    pub fn abort(&self, kind: EntityKind, reason: &str) -> BatchResult {
        self.errors.log(reason, critical_category(kind));
        BatchResult::failed(reason)
    }

    async fn run<P: Pipeline, S: RecordStore>(
        &self,
        file_url: &str,
        ctx: PersistenceContext<S>,
    ) -> BatchResult {
        let started = Instant::now();
        info!(
            "Importing {} from {} as {}",
            P::KIND.label(),
            file_url,
            ctx.actor().name
        );

        match self.run_batch::<P, S>(file_url, ctx).await {
            Ok(result) => {
                info!(
                    "{} import finished: {} inserted, {} skipped in {:?}",
                    P::KIND.label(),
                    result.inserted.len(),
                    result.skipped.len(),
                    started.elapsed()
                );
                result
            }
            Err(e) => {
                let reason = e.to_string();
                self.errors.log(&reason, P::CRITICAL_ERROR);
                BatchResult::failed(reason)
            }
        }
    }

    async fn run_batch<P: Pipeline, S: RecordStore>(
        &self,
        file_url: &str,
        mut ctx: PersistenceContext<S>,
    ) -> Result<BatchResult, ImportError> {
        let path = self.files.resolve(file_url)?;
        let sheet = Sheet::open(&path)?;
        let table = P::load_table(sheet)?;
        debug!("Columns: {:?}", table.columns());

        let mut result = BatchResult::default();
        for (index, row) in table.records() {
            let row_ref = RowRef::from_index(index);
            match process_row::<P, S>(&row, &mut ctx).await {
                Ok(RowOutcome::Inserted(id)) => result.record_inserted(id),
                Ok(RowOutcome::Skipped(reason)) => {
                    warn!("Skipping row {:?}: {}", row_ref, reason);
                    result.record_skipped(row_ref, reason);
                }
                Err(e) => {
                    let reason = e.to_string();
                    if let RowRef::Line(n) = row_ref {
                        self.errors.log(&format!("Row {}: {}", n, reason), P::ROW_ERROR);
                    }
                    warn!("Row {:?} failed: {}", row_ref, reason);
                    result.record_skipped(row_ref, reason);
                }
            }
        }

        ctx.finish().await?;
        Ok(result)
    }
}

async fn process_row<P: Pipeline, S: RecordStore>(
    row: &RawRow<'_>,
    ctx: &mut PersistenceContext<S>,
) -> Result<RowOutcome, RowError> {
    let key_field = P::KIND.key_field();
    let Some(key) = sanitize(row.get(key_field)) else {
        return Ok(RowOutcome::Skipped(format!("Missing {}", key_field)));
    };

    if ctx.exists(P::KIND, &key).await? {
        return Ok(RowOutcome::Skipped("Duplicate".to_string()));
    }

    let record = P::build_record(row, key)?;
    let id = ctx.insert(&record).await?;
    Ok(RowOutcome::Inserted(id))
}

fn critical_category(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::GosiWorkerData => GosiPipeline::CRITICAL_ERROR,
        EntityKind::WorkerData => WorkerPipeline::CRITICAL_ERROR,
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Fixture::*, Harness};
    use super::*;
    use crate::services::error_log::{GOSI_CRITICAL_ERROR, WORKER_CRITICAL_ERROR};
    use crate::types::SkippedRow;

    #[tokio::test]
    async fn missing_file_fails_the_whole_batch() {
        let harness = Harness::new();
        let result = harness
            .importer
            .import_worker_data("/files/absent.xlsx", harness.context())
            .await;

        assert_eq!(result, BatchResult::failed("File not found: /files/absent.xlsx"));
        assert_eq!(
            harness.error_messages(),
            vec![(
                WORKER_CRITICAL_ERROR.to_string(),
                "File not found: /files/absent.xlsx".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn unreadable_workbook_fails_the_whole_batch() {
        let harness = Harness::new();
        std::fs::write(harness.path("broken.xlsx"), b"not a workbook").unwrap();

        let result = harness
            .importer
            .import_gosi_worker_data("/files/broken.xlsx", harness.context())
            .await;

        assert!(result.inserted.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].row, RowRef::All);
        assert_eq!(harness.error_messages()[0].0, GOSI_CRITICAL_ERROR);
    }

    #[tokio::test]
    async fn failed_commit_reports_the_batch_as_failed() {
        let harness = Harness::new();
        let url = harness.write_workbook(
            "workers.xlsx",
            &[vec![Text("رقم العامل")], vec![Text("W1")]],
        );
        harness.store.state.lock().fail_commit = true;

        let result = harness.importer.import_worker_data(&url, harness.context()).await;

        let expected = crate::errors::StoreError::from(sqlx::Error::PoolClosed).to_string();
        assert_eq!(
            result.skipped,
            vec![SkippedRow {
                row: RowRef::All,
                reason: expected
            }]
        );
        assert!(result.inserted.is_empty());
        assert!(harness.store.committed().is_empty());
    }

    #[tokio::test]
    async fn dry_run_reports_rows_but_stores_nothing() {
        let harness = Harness::new();
        let url = harness.write_workbook(
            "workers.xlsx",
            &[vec![Text("رقم العامل")], vec![Text("W1")], vec![Text("W2")]],
        );

        let ctx = harness.context().dry_run(true);
        let result = harness.importer.import_worker_data(&url, ctx).await;

        assert_eq!(result.inserted.len(), 2);
        assert!(harness.store.committed().is_empty());
        assert!(harness.store.state.lock().rolled_back);
    }

    #[tokio::test]
    async fn permission_check_applies_when_not_ignored() {
        let harness = Harness::new();
        let url = harness.write_workbook(
            "workers.xlsx",
            &[vec![Text("رقم العامل")], vec![Text("W1")], vec![Blank], vec![Number(7.0)]],
        );
        let clerk = crate::services::persistence::Actor {
            name: "clerk".to_string(),
            role: "user".to_string(),
            permissions: vec![],
        };
        let ctx = PersistenceContext::new(harness.store.clone(), clerk);

        let result = harness.importer.import_worker_data(&url, ctx).await;

        assert!(result.inserted.is_empty());
        assert_eq!(
            result.skipped,
            vec![
                SkippedRow {
                    row: RowRef::Line(2),
                    reason: "Not permitted to create Worker Data".to_string()
                },
                SkippedRow {
                    row: RowRef::Line(4),
                    reason: "Not permitted to create Worker Data".to_string()
                },
            ]
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn skipped_rows_are_logged_as_warnings() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let harness = Harness::new();
        let url = harness.write_workbook(
            "workers.xlsx",
            &[vec![Text("رقم العامل")], vec![Text("W1")], vec![Text("W1")]],
        );
        let result = harness.importer.import_worker_data(&url, harness.context()).await;
        assert_eq!(result.skipped[0].reason, "Duplicate");

        let output = String::from_utf8(logs.0.lock().clone()).unwrap();
        let skips: Vec<&str> = output.lines().filter(|l| l.contains("Skipping row")).collect();
        assert_eq!(skips.len(), 1);
        assert!(skips[0].contains("WARN"), "{}", skips[0]);
        assert!(skips[0].contains("Duplicate"));
    }

    #[tokio::test]
    async fn abort_logs_a_critical_error() {
        let harness = Harness::new();
        let result = harness
            .importer
            .abort(EntityKind::GosiWorkerData, "Database operation failed: pool timed out");

        assert_eq!(result.skipped[0].row, RowRef::All);
        assert_eq!(harness.error_messages()[0].0, GOSI_CRITICAL_ERROR);
    }
}
