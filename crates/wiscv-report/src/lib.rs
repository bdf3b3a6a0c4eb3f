//! wiscv-report
//!
//! Output renderers over already-computed scores: the composite profile
//! chart (PNG), the interpretive narrative, and the PDF report.

pub mod chart;
pub mod error;
pub mod narrative;
pub mod pdf;

pub use chart::render_profile_chart;
pub use error::ReportError;
pub use narrative::interpretive_text;
pub use pdf::{Report, render_report, report_bytes};
