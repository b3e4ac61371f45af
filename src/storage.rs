//! Report file location and raw file access.
//!
//! Storage is split into two small capability traits injected by the host
//! ([`StoragePolicy`], [`TargetEnvironment`]) plus a [`ReportStorage`] trait
//! covering the thin read/write/clear surface the reporter needs. Tests swap
//! in in-memory implementations; production code uses [`FsStorage`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the persisted report
pub const REPORT_FILE_NAME: &str = "report.yml";

/// Directory component used under shared external storage
pub const REPORT_DIR_NAME: &str = "testify";

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Error types for report storage operations
#[derive(Debug)]
pub enum StorageError {
    /// I/O failure reading, writing, or clearing the report file
    Io(std::io::Error),
    /// The report path has no parent directory to create
    InvalidPath(PathBuf),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "I/O error: {}", err),
            StorageError::InvalidPath(path) => {
                write!(f, "Invalid report path: {}", path.display())
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(err) => Some(err),
            StorageError::InvalidPath(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

/// Host policy deciding where report output lands
pub trait StoragePolicy {
    /// Whether output should go to shared external storage
    fn use_sd_card(&self) -> bool;
}

/// Host-provided directory roots
pub trait TargetEnvironment {
    /// App-private data directory reserved for report output
    fn app_data_dir(&self) -> PathBuf;

    /// Shared external storage root
    fn external_storage_dir(&self) -> PathBuf;
}

/// Resolve the on-disk location of the report file.
///
/// External storage gets a `testify/` subdirectory; the app-private
/// directory is already report-specific, so the file lands directly in it.
pub fn resolve_report_path(
    environment: &dyn TargetEnvironment,
    policy: &dyn StoragePolicy,
) -> PathBuf {
    if policy.use_sd_card() {
        environment
            .external_storage_dir()
            .join(REPORT_DIR_NAME)
            .join(REPORT_FILE_NAME)
    } else {
        environment.app_data_dir().join(REPORT_FILE_NAME)
    }
}

/// Read/write boundary for the persisted report document
pub trait ReportStorage {
    /// Resolved location of the report file
    fn path(&self) -> &Path;

    /// Whether a report file currently exists
    fn exists(&self) -> bool;

    /// Read the full report as ordered lines
    fn read_lines(&self) -> StorageResult<Vec<String>>;

    /// Replace the report file's content with the given text
    fn write(&mut self, text: &str) -> StorageResult<()>;

    /// Truncate the report file, leaving it empty
    fn clear(&mut self) -> StorageResult<()>;
}

/// Filesystem-backed report storage
#[derive(Debug, Clone)]
pub struct FsStorage {
    path: PathBuf,
}

impl FsStorage {
    /// Create storage for an explicit report file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create storage at the location resolved from host policy
    pub fn from_environment(
        environment: &dyn TargetEnvironment,
        policy: &dyn StoragePolicy,
    ) -> Self {
        Self::new(resolve_report_path(environment, policy))
    }

    fn ensure_parent_dir(&self) -> StorageResult<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| StorageError::InvalidPath(self.path.clone()))?;
        fs::create_dir_all(parent)?;
        Ok(())
    }
}

impl ReportStorage for FsStorage {
    fn path(&self) -> &Path {
        &self.path
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read_lines(&self) -> StorageResult<Vec<String>> {
        let text = fs::read_to_string(&self.path)?;
        Ok(text.lines().map(|l| l.to_string()).collect())
    }

    fn write(&mut self, text: &str) -> StorageResult<()> {
        self.ensure_parent_dir()?;
        let mut file = fs::File::create(&self.path)?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        if self.path.exists() {
            fs::File::create(&self.path)?;
        }
        Ok(())
    }
}
