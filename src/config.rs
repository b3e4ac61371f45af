//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for report storage,
//! supporting:
//! - Environment variables for all configurable values
//! - Sensible defaults matching the historical on-device locations
//! - Trait implementations so the configured values plug directly into the
//!   storage capability interfaces
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TESTIFY_REPORT_DIR` | App-private directory for report output | `/data/data/com.app.example/app_testify` |
//! | `TESTIFY_EXTERNAL_DIR` | Shared external storage root | `/sdcard` |
//! | `TESTIFY_USE_SDCARD` | Write the report to external storage (`1`/`true`) | `false` |

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::storage::{StoragePolicy, TargetEnvironment};

// ============================================================================
// Default Values
// ============================================================================

/// Default app-private report directory
pub const DEFAULT_REPORT_DIR: &str = "/data/data/com.app.example/app_testify";

/// Default external storage root
pub const DEFAULT_EXTERNAL_DIR: &str = "/sdcard";

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the app-private report directory
pub const ENV_REPORT_DIR: &str = "TESTIFY_REPORT_DIR";

/// Environment variable for the external storage root
pub const ENV_EXTERNAL_DIR: &str = "TESTIFY_EXTERNAL_DIR";

/// Environment variable selecting external storage output
pub const ENV_USE_SDCARD: &str = "TESTIFY_USE_SDCARD";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized storage configuration for report output
#[derive(Debug, Clone)]
pub struct Config {
    /// App-private directory for report output
    pub report_dir: PathBuf,
    /// Shared external storage root
    pub external_dir: PathBuf,
    /// Whether report output goes to external storage
    pub use_sd_card: bool,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            report_dir: env::var(ENV_REPORT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_REPORT_DIR)),
            external_dir: env::var(ENV_EXTERNAL_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_EXTERNAL_DIR)),
            use_sd_card: env::var(ENV_USE_SDCARD)
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            external_dir: PathBuf::from(DEFAULT_EXTERNAL_DIR),
            use_sd_card: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl TargetEnvironment for Config {
    fn app_data_dir(&self) -> PathBuf {
        self.report_dir.clone()
    }

    fn external_storage_dir(&self) -> PathBuf {
        self.external_dir.clone()
    }
}

impl StoragePolicy for Config {
    fn use_sd_card(&self) -> bool {
        self.use_sd_card
    }
}

/// Parse a boolean environment value ("1", "true", "yes" are truthy)
fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}
