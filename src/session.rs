//! Test-run session identity and counters.
//!
//! A [`ReportSession`] identifies one test-run process and tracks its
//! pass/fail/total counters. It is never persisted on its own: it is rendered
//! into the report document's header and re-hydrated back from one when a
//! later test in the same run merges onto an existing report.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Timestamp format used in the report header, e.g. `2020-06-26@14:49:45`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d@%H:%M:%S";

/// Identity and counters for one test-run session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSession {
    /// Unique session ID, stable across all tests in one run
    pub session_id: String,
    /// Session creation time, already formatted for the header
    pub timestamp: String,
    /// Number of failed tests recorded so far
    pub fail_count: u32,
    /// Number of passed tests recorded so far
    pub pass_count: u32,
    /// Total number of tests recorded so far
    pub test_count: u32,
}

/// Header fields recovered from a previously persisted report document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    pub session_id: String,
    pub timestamp: String,
    pub fail_count: u32,
    pub pass_count: u32,
    pub test_count: u32,
}

/// Terminal outcome of a single test, as counted by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Pass,
    Fail,
    /// Test ended without a recorded pass/fail; counted in the total only
    Skipped,
}

impl ReportSession {
    /// Create a new session with a generated ID and the current timestamp
    pub fn new() -> Self {
        Self {
            session_id: generate_session_id(),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            fail_count: 0,
            pass_count: 0,
            test_count: 0,
        }
    }

    /// Create a session with a fixed identity (counters start at zero)
    pub fn with_identity(session_id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            timestamp: timestamp.into(),
            fail_count: 0,
            pass_count: 0,
            test_count: 0,
        }
    }

    /// Does the given document belong to this session?
    ///
    /// Returns true only on an exact session-id match. A document with no
    /// parseable header never matches, which makes the caller fall back to a
    /// fresh-start write.
    pub fn is_same_session(&self, lines: &[String]) -> bool {
        match parse_header(lines) {
            Some(header) => header.session_id == self.session_id,
            None => false,
        }
    }

    /// Re-hydrate identity and counters from an existing document's header.
    ///
    /// A partial or damaged header keeps the session's current values rather
    /// than failing.
    pub fn init_from_lines(&mut self, lines: &[String]) {
        if let Some(header) = parse_header(lines) {
            self.session_id = header.session_id;
            self.timestamp = header.timestamp;
            self.fail_count = header.fail_count;
            self.pass_count = header.pass_count;
            self.test_count = header.test_count;
        }
    }

    /// Count one finalized test
    pub fn record_result(&mut self, outcome: SessionOutcome) {
        self.test_count += 1;
        match outcome {
            SessionOutcome::Pass => self.pass_count += 1,
            SessionOutcome::Fail => self.fail_count += 1,
            SessionOutcome::Skipped => {}
        }
    }

    /// Render the canonical header lines
    pub fn header_lines(&self) -> Vec<String> {
        vec![
            "---".to_string(),
            format!("- session: {}", self.session_id),
            format!("- date: {}", self.timestamp),
            format!("- failed: {}", self.fail_count),
            format!("- passed: {}", self.pass_count),
            format!("- total: {}", self.test_count),
            "- tests:".to_string(),
        ]
    }
}

impl Default for ReportSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the header of a persisted report document.
///
/// The grammar emits header fields in a fixed order, but parsing is keyed by
/// field name so interleaved unknown lines do not break older readers.
/// Returns `None` unless the session id and all three counters are present.
pub fn parse_header(lines: &[String]) -> Option<ParsedHeader> {
    let mut session_id = None;
    let mut timestamp = None;
    let mut fail_count = None;
    let mut pass_count = None;
    let mut test_count = None;

    for line in lines {
        // Header lines all use the "- key: value" shape; the body's test
        // blocks are indented, so they never match here.
        let Some(entry) = line.strip_prefix("- ") else {
            continue;
        };
        let Some((key, value)) = entry.split_once(": ") else {
            continue;
        };
        match key {
            "session" => session_id = Some(value.to_string()),
            "date" => timestamp = Some(value.to_string()),
            "failed" => fail_count = value.trim().parse().ok(),
            "passed" => pass_count = value.trim().parse().ok(),
            "total" => test_count = value.trim().parse().ok(),
            _ => {}
        }
    }

    Some(ParsedHeader {
        session_id: session_id?,
        timestamp: timestamp.unwrap_or_default(),
        fail_count: fail_count?,
        pass_count: pass_count?,
        test_count: test_count?,
    })
}

/// Generate a session ID: eight hex digits derived from wall clock and pid,
/// a dash, then the process id reduced to at most three decimal digits.
fn generate_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let pid = std::process::id();
    let seed = (millis as u32) ^ pid.rotate_left(16);
    format!("{:08x}-{}", seed, pid % 1000)
}
