//! Configuration for the legacy path
//!
//! Loaded from TOML; every key is optional and falls back to the default.
//!
//! ```toml
//! rounding = "half-even"
//! max_batch_size = 10
//!
//! [legacy]
//! program = "./payroll"
//! working_dir = "/opt/payroll"
//! timeout_ms = 5000
//! temp_prefix = "temp_payroll_input_"
//! ```

use payroll_core::{RecordEncoder, RoundingMode, DEFAULT_MAX_BATCH_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not valid TOML, or wrong types
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but unusable
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Where and how to run the legacy program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    /// Executable path; relative paths with a directory part resolve against `working_dir`
    pub program: PathBuf,
    /// Directory the program runs in and transient input files are written to
    pub working_dir: PathBuf,
    /// Wall-clock limit for one run
    pub timeout_ms: u64,
    /// Transient input file name prefix
    pub temp_prefix: String,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./payroll"),
            working_dir: PathBuf::from("."),
            timeout_ms: 5_000,
            temp_prefix: "temp_payroll_input_".to_string(),
        }
    }
}

impl LegacyConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With program path
    #[inline]
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// With working directory
    #[inline]
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// With timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With transient file prefix
    #[inline]
    #[must_use]
    pub fn with_temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    /// Timeout as a duration
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Program path as it should be spawned from `working_dir`
    ///
    /// A bare name (`payroll`) is left for `PATH` lookup; `./payroll` or
    /// `bin/payroll` are joined onto `working_dir`, since spawning a relative
    /// path together with a different current directory is platform specific.
    #[must_use]
    pub fn resolve_program(&self, working_dir: &Path) -> PathBuf {
        if self.program.is_relative() && self.program.components().count() > 1 {
            working_dir.join(&self.program)
        } else {
            self.program.clone()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("legacy.timeout_ms must be positive".into()));
        }
        if self.temp_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(
                "legacy.temp_prefix must not contain path separators".into(),
            ));
        }
        Ok(())
    }
}

/// Whole-pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// Legacy program settings
    pub legacy: LegacyConfig,
    /// Rounding applied when scaling amounts to cents
    pub rounding: RoundingMode,
    /// Largest batch accepted by either path
    pub max_batch_size: usize,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            legacy: LegacyConfig::default(),
            rounding: RoundingMode::default(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl PayrollConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With legacy settings
    #[inline]
    #[must_use]
    pub fn with_legacy(mut self, legacy: LegacyConfig) -> Self {
        self.legacy = legacy;
        self
    }

    /// With rounding mode
    #[inline]
    #[must_use]
    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for malformed TOML, [`ConfigError::Invalid`]
    /// for values that parse but cannot work.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// As [`PayrollConfig::from_toml_str`], plus [`ConfigError::Io`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check values that serde cannot
    ///
    /// # Errors
    /// [`ConfigError::Invalid`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid("max_batch_size must be positive".into()));
        }
        self.legacy.validate()
    }

    /// Encoder configured for this pipeline
    #[inline]
    #[must_use]
    pub fn encoder(&self) -> RecordEncoder {
        RecordEncoder::new()
            .with_rounding(self.rounding)
            .with_max_batch_size(self.max_batch_size)
    }
}
