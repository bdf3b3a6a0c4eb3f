//! wiscv-storage
//!
//! Local SQLite persistence for patients and their evaluations. Thin wrapper
//! around `rusqlite`: one long-lived connection per session, autocommit per
//! statement, `foreign_keys=ON` so deleting a patient cascades to their
//! evaluations.

pub mod db;
pub mod error;
pub mod evaluations;
pub mod patients;
pub mod stats;

pub use db::{open, open_in_memory};
pub use error::StorageError;
pub use rusqlite::Connection;
