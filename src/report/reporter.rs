//! The reporter lifecycle and report-file merge algorithm.
//!
//! One [`Reporter`] lives for one test method's execution. Calls arrive in a
//! fixed order — `start_test`, optionally `capture_output`, exactly one of
//! `pass`/`fail`, then `end_test` — and `end_test` is the only point that
//! touches storage: it reads any existing report, decides whether that report
//! belongs to the current session, and rewrites the reconciled document.

use std::path::Path;

use crate::report::record::{FailureCause, Outcome, TestRecord};
use crate::session::{ReportSession, SessionOutcome};
use crate::storage::{
    FsStorage, ReportStorage, StorageError, StoragePolicy, TargetEnvironment,
};

/// Result type for reporter operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Error types for reporter operations
#[derive(Debug)]
pub enum ReportError {
    /// The report file could not be read, written, or cleared
    Storage(StorageError),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Storage(err) => write!(f, "Storage error: {}", err),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Storage(err) => Some(err),
        }
    }
}

impl From<StorageError> for ReportError {
    fn from(err: StorageError) -> Self {
        ReportError::Storage(err)
    }
}

/// Accumulates one test run's results and persists them as a report document.
///
/// Call order per test is caller-enforced; out-of-order calls produce an
/// incomplete record rather than an error (see the module docs).
#[derive(Debug)]
pub struct Reporter<S: ReportStorage> {
    session: ReportSession,
    storage: S,
    record: Option<TestRecord>,
}

impl Reporter<FsStorage> {
    /// Create a reporter writing to the location resolved from host policy,
    /// with a freshly generated session.
    pub fn new(environment: &dyn TargetEnvironment, policy: &dyn StoragePolicy) -> Self {
        Self::with_storage(
            ReportSession::new(),
            FsStorage::from_environment(environment, policy),
        )
    }
}

impl<S: ReportStorage> Reporter<S> {
    /// Create a reporter with an explicit session and storage backend
    pub fn with_storage(session: ReportSession, storage: S) -> Self {
        Self {
            session,
            storage,
            record: None,
        }
    }

    /// The session this reporter accumulates into
    pub fn session(&self) -> &ReportSession {
        &self.session
    }

    /// Resolved location of the report file
    pub fn report_path(&self) -> &Path {
        self.storage.path()
    }

    /// Open a record for a starting test
    pub fn start_test(
        &mut self,
        test_name: impl Into<String>,
        class_name: impl Into<String>,
        package_name: impl Into<String>,
    ) {
        debug_assert!(self.record.is_none(), "previous test was never ended");
        self.record = Some(TestRecord::new(test_name, class_name, package_name));
    }

    /// Record the baseline and captured image locations for the open test
    pub fn capture_output(&mut self, baseline_path: &str, output_path: &str) {
        debug_assert!(self.record.is_some(), "capture_output before start_test");
        if let Some(record) = self.record.as_mut() {
            record.capture_output(baseline_path, output_path);
        }
    }

    /// Mark the open test as passed
    pub fn pass(&mut self) {
        debug_assert!(self.record.is_some(), "pass before start_test");
        if let Some(record) = self.record.as_mut() {
            record.outcome = Outcome::Pass;
        }
    }

    /// Mark the open test as failed, classifying the error into a cause and
    /// quoting its message as the description
    pub fn fail(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.fail_with(FailureCause::classify(error), &error.to_string());
    }

    /// Mark the open test as failed with an explicit cause and description
    pub fn fail_with(&mut self, cause: FailureCause, description: &str) {
        debug_assert!(self.record.is_some(), "fail before start_test");
        if let Some(record) = self.record.as_mut() {
            record.outcome = Outcome::Fail {
                cause,
                description: description.to_string(),
            };
        }
    }

    /// Finalize the open test: merge with any existing report for this
    /// session, update the counters, and rewrite the report file.
    ///
    /// An existing file from a different session is overwritten, not merged.
    /// A storage failure aborts the write and loses this test's record; the
    /// clear-before-write keeps a partial document from being left behind.
    pub fn end_test(&mut self) -> ReportResult<()> {
        let record = self.record.take();

        let mut preserved_body = Vec::new();
        if self.storage.exists() {
            let lines = self.storage.read_lines()?;
            if self.session.is_same_session(&lines) {
                // Continuation of a run that already wrote a report: adopt
                // its counters and keep its test blocks verbatim.
                self.session.init_from_lines(&lines);
                preserved_body = body_lines(&lines);
            }
        }

        if let Some(record) = &record {
            self.session.record_result(match record.outcome {
                Outcome::Pass => SessionOutcome::Pass,
                Outcome::Fail { .. } => SessionOutcome::Fail,
                Outcome::Pending => SessionOutcome::Skipped,
            });
        }

        let mut document = self.session.header_lines();
        document.extend(preserved_body);
        if let Some(record) = record {
            document.extend(record.block_lines());
        }
        let mut text = document.join("\n");
        text.push('\n');

        self.storage.clear()?;
        self.storage.write(&text)?;
        Ok(())
    }
}

/// Extract the test blocks of a persisted document: everything after the
/// header's `- tests:` marker.
fn body_lines(lines: &[String]) -> Vec<String> {
    match lines.iter().position(|l| l == "- tests:") {
        Some(index) => lines[index + 1..].to_vec(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    /// In-memory storage standing in for the report file
    struct MemoryStorage {
        path: PathBuf,
        content: Option<String>,
    }

    impl MemoryStorage {
        fn empty() -> Self {
            Self {
                path: PathBuf::from("/data/data/com.app.example/app_testify/report.yml"),
                content: None,
            }
        }

        fn with_content(lines: &[&str]) -> Self {
            let mut storage = Self::empty();
            storage.content = Some(lines.join("\n") + "\n");
            storage
        }
    }

    impl ReportStorage for MemoryStorage {
        fn path(&self) -> &Path {
            &self.path
        }

        fn exists(&self) -> bool {
            self.content.is_some()
        }

        fn read_lines(&self) -> Result<Vec<String>, StorageError> {
            let text = self.content.clone().unwrap_or_default();
            Ok(text.lines().map(|l| l.to_string()).collect())
        }

        fn write(&mut self, text: &str) -> Result<(), StorageError> {
            self.content = Some(text.to_string());
            Ok(())
        }

        fn clear(&mut self) -> Result<(), StorageError> {
            if self.content.is_some() {
                self.content = Some(String::new());
            }
            Ok(())
        }
    }

    const EXISTING_REPORT: &[&str] = &[
        "---",
        "- session: 623815995-477",
        "- date: 2020-06-26@14:49:45",
        "- failed: 1",
        "- passed: 3",
        "- total: 4",
        "- tests:",
        "  - test:",
        "    name: default",
        "    class: ClientDetailsViewScreenshotTest",
        "    package: com.shopify.testify.sample.clients.details",
        "    baseline_image: assets/screenshots/22-480x800@240dp-en_US/default.png",
        "    test_image: /data/data/com.shopify.testify.sample/app_images/screenshots/22-480x800@240dp-en_US/ClientDetailsViewScreenshotTest_default.png",
        "    status: PASS",
    ];

    fn reporter_for(storage: MemoryStorage) -> Reporter<MemoryStorage> {
        Reporter::with_storage(
            ReportSession::with_identity("623815995-477", "2020-06-26@14:49:45"),
            storage,
        )
    }

    fn run_one_passing_test(reporter: &mut Reporter<MemoryStorage>) {
        reporter.start_test("startTest", "ReporterTest", "com.shopify.testify");
        reporter.capture_output("foo", "bar");
        reporter.pass();
        reporter.end_test().unwrap();
    }

    #[test]
    fn test_fresh_session_document() {
        let mut reporter = reporter_for(MemoryStorage::empty());
        run_one_passing_test(&mut reporter);

        let expected = [
            "---",
            "- session: 623815995-477",
            "- date: 2020-06-26@14:49:45",
            "- failed: 0",
            "- passed: 1",
            "- total: 1",
            "- tests:",
            "    - test:",
            "        name: startTest",
            "        class: ReporterTest",
            "        package: com.shopify.testify",
            "        baseline_image: assets/foo",
            "        test_image: bar",
            "        status: PASS",
        ]
        .join("\n")
            + "\n";
        assert_eq!(reporter.storage.content.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_merge_preserves_existing_body() {
        let mut reporter = reporter_for(MemoryStorage::with_content(EXISTING_REPORT));
        reporter.start_test("failingTest", "ReporterTest", "com.shopify.testify");
        reporter.capture_output("foo", "bar");
        reporter.fail(&std::io::Error::other("This is a failure"));
        reporter.end_test().unwrap();

        let content = reporter.storage.content.clone().unwrap();
        let lines: Vec<&str> = content.lines().collect();

        // Counters: old header plus one failure.
        assert_eq!(lines[3], "- failed: 2");
        assert_eq!(lines[4], "- passed: 3");
        assert_eq!(lines[5], "- total: 5");

        // Old body preserved verbatim, including its historical indentation.
        assert_eq!(&lines[7..14], &EXISTING_REPORT[7..14]);

        // New block appended after it, in the normalized four-space form.
        assert_eq!(
            &lines[14..],
            &[
                "    - test:",
                "        name: failingTest",
                "        class: ReporterTest",
                "        package: com.shopify.testify",
                "        baseline_image: assets/foo",
                "        test_image: bar",
                "        status: FAIL",
                "        cause: UNKNOWN",
                "        description: \"This is a failure\"",
            ]
        );
    }

    #[test]
    fn test_different_session_is_overwritten() {
        let mut existing = EXISTING_REPORT.to_vec();
        existing[1] = "- session: deadbeef-42";

        let mut reporter = reporter_for(MemoryStorage::with_content(&existing));
        run_one_passing_test(&mut reporter);

        let content = reporter.storage.content.clone().unwrap();
        assert!(!content.contains("ClientDetailsViewScreenshotTest"));
        assert!(content.contains("- total: 1\n"));
        assert!(content.contains("- session: 623815995-477\n"));
    }

    #[test]
    fn test_unparseable_existing_file_is_overwritten() {
        let mut reporter = reporter_for(MemoryStorage::with_content(&["not", "a", "report"]));
        run_one_passing_test(&mut reporter);

        let content = reporter.storage.content.clone().unwrap();
        assert!(content.starts_with("---\n- session: 623815995-477\n"));
        assert!(!content.contains("not"));
    }

    #[test]
    fn test_fail_classification_in_document() {
        let mut reporter = reporter_for(MemoryStorage::empty());
        reporter.start_test("t", "C", "p");
        reporter.fail(&crate::report::record::ComparisonFailure::new(
            "12 pixels differ",
        ));
        reporter.end_test().unwrap();

        let content = reporter.storage.content.clone().unwrap();
        assert!(content.contains("        status: FAIL\n"));
        assert!(content.contains("        cause: IMAGE_MISMATCH\n"));
        assert!(content.contains("        description: \"12 pixels differ\"\n"));
    }

    #[test]
    fn test_pending_outcome_counts_total_only() {
        let mut reporter = reporter_for(MemoryStorage::empty());
        reporter.start_test("t", "C", "p");
        reporter.end_test().unwrap();

        let content = reporter.storage.content.clone().unwrap();
        assert!(content.contains("- failed: 0\n"));
        assert!(content.contains("- passed: 0\n"));
        assert!(content.contains("- total: 1\n"));
        // No status line for a test that never reported an outcome.
        assert!(!content.contains("status:"));
    }

    #[test]
    fn test_new_reporter_resolves_report_path() {
        struct Env;
        impl crate::storage::TargetEnvironment for Env {
            fn app_data_dir(&self) -> PathBuf {
                PathBuf::from("/data/data/com.app.example/app_testify")
            }
            fn external_storage_dir(&self) -> PathBuf {
                PathBuf::from("/sdcard")
            }
        }
        struct Policy(bool);
        impl crate::storage::StoragePolicy for Policy {
            fn use_sd_card(&self) -> bool {
                self.0
            }
        }

        let reporter = Reporter::new(&Env, &Policy(false));
        assert_eq!(
            reporter.report_path(),
            Path::new("/data/data/com.app.example/app_testify/report.yml")
        );

        let reporter = Reporter::new(&Env, &Policy(true));
        assert_eq!(reporter.report_path(), Path::new("/sdcard/testify/report.yml"));
    }

    #[test]
    fn test_body_lines_extraction() {
        let lines: Vec<String> = EXISTING_REPORT.iter().map(|s| s.to_string()).collect();
        let body = body_lines(&lines);
        assert_eq!(body.len(), 7);
        assert_eq!(body[0], "  - test:");

        assert_eq!(body_lines(&["---".to_string()]), Vec::<String>::new());
    }
}
