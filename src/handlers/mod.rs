//! NATS message handlers

pub mod import;
pub mod ping;

use std::sync::Arc;

use anyhow::Result;
use async_nats::Client;
use sqlx::PgPool;
use tokio::select;
use tracing::{error, info};

use crate::config::Config;
use crate::services::error_log::ErrorLogService;
use crate::services::file_store::SiteFileStore;
use crate::services::import::Importer;
use crate::types::EntityKind;

use self::import::ImportState;

pub const SUBJECT_PING: &str = "hr.ping";
pub const SUBJECT_IMPORT_GOSI: &str = "hr.import.gosi";
pub const SUBJECT_IMPORT_WORKER: &str = "hr.import.worker";
pub const SUBJECT_IMPORT_ERRORS: &str = "hr.import.errors.list";

/// Start all message handlers
pub async fn start_handlers(client: Client, pool: PgPool, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    let jwt_secret: Arc<str> = Arc::from(config.require_jwt_secret()?);

    let files = Arc::new(SiteFileStore::new(
        config.site_files_dir.clone(),
        config.site_private_files_dir.clone(),
    ));
    let errors = Arc::new(ErrorLogService::persistent(config.error_log_path()));
    let importer = Importer::new(files, errors.clone());
    info!(
        "Importer initialized: files in {}, private files in {}",
        config.site_files_dir.display(),
        config.site_private_files_dir.display()
    );

    let state = ImportState {
        pool,
        importer,
        errors,
        jwt_secret,
    };

    // Subscribe to all subjects
    let ping_sub = client.subscribe(SUBJECT_PING).await?;
    let gosi_sub = client.subscribe(SUBJECT_IMPORT_GOSI).await?;
    let worker_sub = client.subscribe(SUBJECT_IMPORT_WORKER).await?;
    let errors_sub = client.subscribe(SUBJECT_IMPORT_ERRORS).await?;

    info!(
        "Subscribed to {}, {}, {}, {}",
        SUBJECT_PING, SUBJECT_IMPORT_GOSI, SUBJECT_IMPORT_WORKER, SUBJECT_IMPORT_ERRORS
    );

    let client_ping = client.clone();
    let ping_handle = tokio::spawn(async move { ping::handle_ping(client_ping, ping_sub).await });

    let client_gosi = client.clone();
    let state_gosi = state.clone();
    let gosi_handle = tokio::spawn(async move {
        import::handle_import(client_gosi, gosi_sub, state_gosi, EntityKind::GosiWorkerData).await
    });

    let client_worker = client.clone();
    let state_worker = state.clone();
    let worker_handle = tokio::spawn(async move {
        import::handle_import(client_worker, worker_sub, state_worker, EntityKind::WorkerData).await
    });

    let errors_handle = tokio::spawn(async move {
        import::handle_list_errors(client, errors_sub, state).await
    });

    info!("All handlers started");

    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = gosi_handle => {
            error!("GOSI import handler finished: {:?}", result);
        }
        result = worker_handle => {
            error!("Worker import handler finished: {:?}", result);
        }
        result = errors_handle => {
            error!("Import error list handler finished: {:?}", result);
        }
    }

    Ok(())
}
