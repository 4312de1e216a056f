//! Business logic services

pub mod error_log;
pub mod file_store;
pub mod import;
pub mod persistence;
pub mod spreadsheet;
