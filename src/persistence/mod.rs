//! Backup and restore
//!
//! Features:
//! - Flat JSON snapshot of every registered region's stored record
//! - Import writes entries straight into the record store
//! - Unknown keys are kept and reported, `null` clears a record

pub mod snapshot;

pub use snapshot::{ImportReport, Snapshot};
