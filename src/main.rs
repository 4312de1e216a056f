//! HR Import Worker - imports GOSI and worker-registry spreadsheets
//!
//! Serves import requests over NATS, or runs a single import from the
//! command line.

mod auth;
mod cli;
mod config;
mod db;
mod errors;
mod handlers;
mod services;
mod types;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, ImportKind};
use crate::config::Config;
use crate::services::error_log::ErrorLogService;
use crate::services::file_store::SiteFileStore;
use crate::services::import::Importer;
use crate::services::persistence::{Actor, PersistenceContext, PgRecordStore};
use crate::types::EntityKind;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logs_dir = config::logs_dir();
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "hr-import.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // stdout is reserved for the JSON result of the import command
    let to_stderr = matches!(cli.command, Some(Command::Import { .. }));
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hr_import=debug".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(move || -> Box<dyn std::io::Write> {
                    if to_stderr {
                        Box::new(std::io::stderr())
                    } else {
                        Box::new(std::io::stdout())
                    }
                }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => {
            let pool = db::create_pool(&config.database_url).await?;
            db::run_migrations(&pool).await
        }
        Command::Import {
            kind,
            file_url,
            dry_run,
        } => import_file(config, kind, &file_url, dry_run).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting HR import worker...");

    let pool = db::create_pool(&config.database_url).await?;
    info!("Connected to PostgreSQL");

    db::run_migrations(&pool).await?;

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    if let Err(e) = handlers::start_handlers(nats_client, pool, &config).await {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Run one import as the system operator and print the result
async fn import_file(config: Config, kind: ImportKind, file_url: &str, dry_run: bool) -> Result<()> {
    let files = Arc::new(SiteFileStore::new(
        config.site_files_dir.clone(),
        config.site_private_files_dir.clone(),
    ));
    let errors = Arc::new(ErrorLogService::persistent(config.error_log_path()));
    let importer = Importer::new(files, errors);

    let entity = match kind {
        ImportKind::Gosi => EntityKind::GosiWorkerData,
        ImportKind::Worker => EntityKind::WorkerData,
    };

    let pool = db::create_pool(&config.database_url).await?;
    let result = match PgRecordStore::begin(&pool).await {
        Ok(store) => {
            let ctx = PersistenceContext::new(store, Actor::system())
                .ignore_permissions()
                .dry_run(dry_run);
            match entity {
                EntityKind::GosiWorkerData => importer.import_gosi_worker_data(file_url, ctx).await,
                EntityKind::WorkerData => importer.import_worker_data(file_url, ctx).await,
            }
        }
        Err(e) => importer.abort(entity, &e.to_string()),
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
