//! The in-progress record for one running test.

use serde::{Deserialize, Serialize};

/// Indentation for a test block's opener line (`- test:`)
const BLOCK_INDENT: &str = "    ";

/// Indentation for a test block's key/value lines
const ENTRY_INDENT: &str = "        ";

/// The mutable record for the test currently running.
///
/// Opened by `Reporter::start_test`, filled in through capture and outcome
/// calls, and consumed when the test ends. Exactly one record is open per
/// reporter at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    /// Test method name
    pub test_name: String,
    /// Simple class name of the test
    pub class_name: String,
    /// Package the test belongs to
    pub package_name: String,
    /// Baseline image path, relative to the instrumentation assets
    pub baseline_image: Option<String>,
    /// Captured test image path, device-absolute
    pub test_image: Option<String>,
    /// Terminal outcome; stays `Pending` until `pass()` or `fail()`
    pub outcome: Outcome,
}

/// Terminal state of a test record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// No pass/fail recorded yet
    Pending,
    Pass,
    Fail {
        cause: FailureCause,
        description: String,
    },
}

/// Enumerated classification of why a test failed, distinct from the
/// free-text description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCause {
    /// Unrecognized error type
    Unknown,
    /// Captured image did not match the baseline
    ImageMismatch,
    /// No baseline image was recorded for the test
    BaselineMissing,
}

impl FailureCause {
    /// Name used in the report's `cause:` line
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCause::Unknown => "UNKNOWN",
            FailureCause::ImageMismatch => "IMAGE_MISMATCH",
            FailureCause::BaselineMissing => "BASELINE_MISSING",
        }
    }

    /// Classify an arbitrary error.
    ///
    /// Recognizes the comparison failures this crate defines for its
    /// collaborators; anything else maps to `Unknown`.
    pub fn classify(error: &(dyn std::error::Error + 'static)) -> Self {
        if error.downcast_ref::<ComparisonFailure>().is_some() {
            FailureCause::ImageMismatch
        } else if error.downcast_ref::<MissingBaseline>().is_some() {
            FailureCause::BaselineMissing
        } else {
            FailureCause::Unknown
        }
    }
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by a screenshot comparison collaborator when the captured
/// image differs from the baseline
#[derive(Debug)]
pub struct ComparisonFailure {
    message: String,
}

impl ComparisonFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ComparisonFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ComparisonFailure {}

/// Error raised when a test has no baseline image to compare against
#[derive(Debug)]
pub struct MissingBaseline {
    message: String,
}

impl MissingBaseline {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for MissingBaseline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for MissingBaseline {}

impl TestRecord {
    /// Open a record for the given test identity
    pub fn new(
        test_name: impl Into<String>,
        class_name: impl Into<String>,
        package_name: impl Into<String>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            class_name: class_name.into(),
            package_name: package_name.into(),
            baseline_image: None,
            test_image: None,
            outcome: Outcome::Pending,
        }
    }

    /// Record the captured image locations. The baseline is asset-relative
    /// and rendered under `assets/`; the output path is kept verbatim.
    pub fn capture_output(&mut self, baseline_path: &str, output_path: &str) {
        self.baseline_image = Some(format!("assets/{}", baseline_path));
        self.test_image = Some(output_path.to_string());
    }

    /// Render this record as the lines of one test block
    pub fn block_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{}- test:", BLOCK_INDENT),
            format!("{}name: {}", ENTRY_INDENT, self.test_name),
            format!("{}class: {}", ENTRY_INDENT, self.class_name),
            format!("{}package: {}", ENTRY_INDENT, self.package_name),
        ];
        if let Some(baseline) = &self.baseline_image {
            lines.push(format!("{}baseline_image: {}", ENTRY_INDENT, baseline));
        }
        if let Some(test_image) = &self.test_image {
            lines.push(format!("{}test_image: {}", ENTRY_INDENT, test_image));
        }
        match &self.outcome {
            Outcome::Pending => {}
            Outcome::Pass => lines.push(format!("{}status: PASS", ENTRY_INDENT)),
            Outcome::Fail { cause, description } => {
                lines.push(format!("{}status: FAIL", ENTRY_INDENT));
                lines.push(format!("{}cause: {}", ENTRY_INDENT, cause));
                lines.push(format!("{}description: \"{}\"", ENTRY_INDENT, description));
            }
        }
        lines
    }
}
