//! wiscv-core
//!
//! Pure domain types for WISC-V scoring: subtests, composite indices, ages,
//! classification bands, and the patient/evaluation models. No I/O; this is
//! the shared vocabulary of the workspace.

pub mod age;
pub mod classification;
pub mod error;
pub mod models;
pub mod subtest;

pub use age::Age;
pub use classification::Classification;
pub use error::CoreError;
pub use subtest::{CompositeIndex, Subtest};
