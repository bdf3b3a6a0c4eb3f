pub mod evaluation;
pub mod patient;
pub mod score;

pub use evaluation::{Evaluation, EvaluationRecord};
pub use patient::Patient;
pub use score::{CompositeResult, CompositeScore, ConfidenceLevel, SubtestEntry};
