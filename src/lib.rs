//! Testify Report - structured result reporting for UI screenshot test runs.
//!
//! This crate provides:
//! - A [`Reporter`] that accumulates per-test results during a run
//! - A line-oriented report document with a stable, diffable grammar
//! - Session-aware merging, so independent test processes in the same run
//!   append to one report instead of overwriting each other
//! - Pluggable storage so hosts control where the report lands
//!
//! # Example
//!
//! ```rust,no_run
//! use testify_report::{Reporter, ReportSession};
//! use testify_report::storage::FsStorage;
//!
//! let storage = FsStorage::new("/tmp/testify/report.yml");
//! let mut reporter = Reporter::with_storage(ReportSession::new(), storage);
//!
//! reporter.start_test("default", "MainActivityScreenshotTest", "com.example.app");
//! reporter.capture_output("screenshots/default.png", "/data/output/default.png");
//! reporter.pass();
//! reporter.end_test().unwrap();
//! ```

pub mod config;
pub mod report;
pub mod session;
pub mod storage;

// Re-export reporter types
pub use report::{
    ComparisonFailure, FailureCause, MissingBaseline, Outcome, ReportError, ReportResult,
    Reporter, TestRecord,
};

// Re-export session types
pub use session::{ParsedHeader, ReportSession, SessionOutcome, parse_header};

// Re-export storage types
pub use storage::{
    FsStorage, ReportStorage, StorageError, StoragePolicy, StorageResult, TargetEnvironment,
    resolve_report_path,
};
