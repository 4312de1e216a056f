//! Type definitions

pub mod cell;
pub mod import;
pub mod messages;
pub mod record;

pub use cell::*;
pub use import::*;
pub use messages::*;
pub use record::*;
