// Domain Layer - Statuses, results, and reports

pub mod report;
pub mod status;

// Re-exports
pub use report::{aggregate, CheckResult, Report};
pub use status::{Category, Status};
