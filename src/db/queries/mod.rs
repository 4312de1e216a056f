//! Database queries

pub mod gosi_worker_data;
pub mod worker_data;
