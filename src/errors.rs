//! Domain error types for spreadsheet imports

use std::path::PathBuf;

use thiserror::Error;

/// Failure of the record store collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database operation failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failure that aborts a whole batch before or after its rows are processed
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid file reference: {0}")]
    InvalidFileReference(String),
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Failed to read spreadsheet {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("Spreadsheet {0} has no worksheets")]
    NoWorksheet(PathBuf),
    #[error("Spreadsheet has no header row")]
    EmptySheet,
    #[error("Header row not found. Please upload a valid file.")]
    HeaderNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of a single row; the batch carries on with the next row
#[derive(Error, Debug)]
pub enum RowError {
    #[error("Invalid amount for {field}: '{value}'")]
    InvalidAmount { field: &'static str, value: String },
    #[error("Not permitted to create {0}")]
    NotPermitted(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}
