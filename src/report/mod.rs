pub mod record;
pub mod reporter;

pub use record::{ComparisonFailure, FailureCause, MissingBaseline, Outcome, TestRecord};
pub use reporter::{ReportError, ReportResult, Reporter};
