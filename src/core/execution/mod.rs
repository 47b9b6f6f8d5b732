pub mod config;
pub mod evaluator;

// Re-export commonly used types
pub use config::{EvaluationConfig, SchedulingOrder};
pub use evaluator::{evaluate, EvaluationObserver, EvaluationReport, Evaluator};
