//! Record persistence for import batches
//!
//! A batch runs against one [`PersistenceContext`]: the store that owns the
//! transaction, the desk user the batch acts for, and whether their
//! per-entity create permissions are enforced. Nothing is durable until the
//! context is committed.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use crate::auth::AuthInfo;
use crate::db::queries;
use crate::errors::{RowError, StoreError};
use crate::types::{EntityKind, ImportRecord};

/// Transactional storage for imported records
#[async_trait]
pub trait RecordStore: Send {
    /// Whether a record of `kind` with this natural key exists, including
    /// records created earlier in the same batch
    async fn exists(&mut self, kind: EntityKind, key: &str) -> Result<bool, StoreError>;

    /// Persist a record and return its generated id
    async fn create(&mut self, record: &ImportRecord, created_by: &str) -> Result<String, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}

/// Postgres-backed store holding one transaction per batch.
///
/// Each insert runs inside its own savepoint so a failing row leaves the
/// surrounding transaction usable for the rows after it.
pub struct PgRecordStore {
    tx: Transaction<'static, Postgres>,
}

impl PgRecordStore {
    pub async fn begin(pool: &PgPool) -> Result<Self, StoreError> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    async fn insert(&mut self, record: &ImportRecord, created_by: &str) -> Result<uuid::Uuid, sqlx::Error> {
        match record {
            ImportRecord::GosiWorkerData(r) => {
                queries::gosi_worker_data::insert_gosi_worker(&mut self.tx, r, created_by).await
            }
            ImportRecord::WorkerData(r) => {
                queries::worker_data::insert_worker(&mut self.tx, r, created_by).await
            }
        }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn exists(&mut self, kind: EntityKind, key: &str) -> Result<bool, StoreError> {
        let found = match kind {
            EntityKind::GosiWorkerData => {
                queries::gosi_worker_data::identity_number_exists(&mut self.tx, key).await?
            }
            EntityKind::WorkerData => queries::worker_data::worker_id_exists(&mut self.tx, key).await?,
        };
        Ok(found)
    }

    async fn create(&mut self, record: &ImportRecord, created_by: &str) -> Result<String, StoreError> {
        sqlx::query("SAVEPOINT import_row").execute(&mut *self.tx).await?;

        match self.insert(record, created_by).await {
            Ok(id) => {
                sqlx::query("RELEASE SAVEPOINT import_row")
                    .execute(&mut *self.tx)
                    .await?;
                Ok(id.to_string())
            }
            Err(e) => {
                sqlx::query("ROLLBACK TO SAVEPOINT import_row")
                    .execute(&mut *self.tx)
                    .await?;
                Err(e.into())
            }
        }
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// Desk user an import acts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl Actor {
    /// Operator running imports from the command line
    pub fn system() -> Self {
        Self {
            name: "system".to_string(),
            role: "admin".to_string(),
            permissions: Vec::new(),
        }
    }

    pub fn from_auth(auth: &AuthInfo) -> Self {
        Self {
            name: auth.user_id.to_string(),
            role: auth.role.clone(),
            permissions: auth.permissions.clone(),
        }
    }

    pub fn can_create(&self, kind: EntityKind) -> bool {
        self.role == "admin" || self.permissions.iter().any(|p| p == kind.create_permission())
    }
}

/// Everything a batch needs to persist rows
pub struct PersistenceContext<S> {
    store: S,
    actor: Actor,
    ignore_permissions: bool,
    dry_run: bool,
}

impl<S: RecordStore> PersistenceContext<S> {
    pub fn new(store: S, actor: Actor) -> Self {
        Self {
            store,
            actor,
            ignore_permissions: false,
            dry_run: false,
        }
    }

    /// Administrative import: create records regardless of the actor's
    /// per-entity permissions
    pub fn ignore_permissions(mut self) -> Self {
        self.ignore_permissions = true;
        self
    }

    /// Roll back instead of committing when the batch finishes
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub async fn exists(&mut self, kind: EntityKind, key: &str) -> Result<bool, StoreError> {
        self.store.exists(kind, key).await
    }

    pub async fn insert(&mut self, record: &ImportRecord) -> Result<String, RowError> {
        let kind = record.kind();
        if !self.ignore_permissions && !self.actor.can_create(kind) {
            return Err(RowError::NotPermitted(kind.label()));
        }
        let id = self.store.create(record, &self.actor.name).await?;
        debug!("Created {} {} as {}", kind.label(), record.natural_key(), id);
        Ok(id)
    }

    /// Make the batch durable, or discard it for a dry run
    pub async fn finish(self) -> Result<(), StoreError> {
        if self.dry_run {
            info!("Dry run: rolling back import batch");
            self.store.rollback().await
        } else {
            self.store.commit().await
        }
    }
}
