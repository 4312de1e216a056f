//! Imported HR record types

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Record store entity targeted by an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    GosiWorkerData,
    WorkerData,
}

impl EntityKind {
    /// Display name of the entity
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::GosiWorkerData => "GOSI Worker Data",
            EntityKind::WorkerData => "Worker Data",
        }
    }

    /// Natural key used for deduplication
    pub fn key_field(&self) -> &'static str {
        match self {
            EntityKind::GosiWorkerData => "identity_number",
            EntityKind::WorkerData => "worker_id",
        }
    }

    /// Permission a desk user needs to create records of this kind
    pub fn create_permission(&self) -> &'static str {
        match self {
            EntityKind::GosiWorkerData => "hr:gosi_worker_data:create",
            EntityKind::WorkerData => "hr:worker_data:create",
        }
    }
}

/// Social-insurance (GOSI) subscriber row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GosiWorkerRecord {
    pub identity_number: String,
    pub subscriber_name: Option<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub basic_salary: Option<BigDecimal>,
    pub housing: Option<BigDecimal>,
    pub commissions: Option<BigDecimal>,
    pub other_allowances: Option<BigDecimal>,
    pub total_salary: Option<BigDecimal>,
    pub contributable_salary: Option<BigDecimal>,
    pub occupation: Option<String>,
    pub joining_date: Option<NaiveDate>,
}

/// Foreign-worker registry row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub worker_id: String,
    pub worker_name: Option<String>,
    pub nationality: Option<String>,
    pub company_id: Option<String>,
    pub company_name: Option<String>,
    pub border_number: Option<String>,
    pub iqama_number: Option<String>,
    pub occupation: Option<String>,
    pub iqama_expiry: Option<NaiveDate>,
    pub entry_date_ksa: Option<NaiveDate>,
    pub worker_type: Option<String>,
}

/// A record ready to be persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportRecord {
    GosiWorkerData(GosiWorkerRecord),
    WorkerData(WorkerRecord),
}

impl ImportRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            ImportRecord::GosiWorkerData(_) => EntityKind::GosiWorkerData,
            ImportRecord::WorkerData(_) => EntityKind::WorkerData,
        }
    }

    pub fn natural_key(&self) -> &str {
        match self {
            ImportRecord::GosiWorkerData(r) => &r.identity_number,
            ImportRecord::WorkerData(r) => &r.worker_id,
        }
    }
}

impl From<GosiWorkerRecord> for ImportRecord {
    fn from(record: GosiWorkerRecord) -> Self {
        ImportRecord::GosiWorkerData(record)
    }
}

impl From<WorkerRecord> for ImportRecord {
    fn from(record: WorkerRecord) -> Self {
        ImportRecord::WorkerData(record)
    }
}
