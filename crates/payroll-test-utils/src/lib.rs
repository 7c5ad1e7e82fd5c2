//! Testing utilities for the payroll parity workspace
//!
//! Shared fixtures, record builders and fake legacy programs.

#![allow(missing_docs)]

use payroll_core::EmployeeRecord;
use payroll_legacy::{LegacyConfig, PayrollConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

pub fn record(id: &str, hours: f64, rate: f64, tax: f64) -> EmployeeRecord {
    EmployeeRecord::new(id, hours, rate, tax)
}

/// `[{E1, 20.0, 15.50, 50.00}]`, gross 310.00, net 260.00
pub fn scenario_batch() -> Vec<EmployeeRecord> {
    vec![record("E1", 20.0, 15.50, 50.00)]
}

/// The fixed-width blob for [`scenario_batch`]
pub const SCENARIO_BLOB: &str = "E1   02000015500005000\n";

/// `n` distinct valid records
pub fn sample_batch(n: usize) -> Vec<EmployeeRecord> {
    (0..n)
        .map(|i| {
            let step = f64::from(u32::try_from(i).unwrap_or(u32::MAX));
            record(
                &format!("E{i:03}"),
                8.5 + step * 3.25,
                12.75 + step * 1.5,
                step * 7.0,
            )
        })
        .collect()
}

/// A batch whose third record has a NaN rate
pub fn nan_rate_batch() -> Vec<EmployeeRecord> {
    vec![
        record("OK1", 10.0, 10.0, 1.0),
        record("OK2", 20.0, 20.0, 2.0),
        record("BAD", 30.0, f64::NAN, 3.0),
    ]
}

/// Temporary working directory for a legacy run
pub struct LegacyWorkspace {
    dir: TempDir,
}

impl LegacyWorkspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write an executable `/bin/sh` script into the workspace
    #[cfg(unix)]
    pub fn write_script(&self, name: &str, body: &str) -> PathBuf {
        use std::io::Write;
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let path = self.dir.path().join(name);
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(0o755)
                .open(&path)
                .expect("create script");
            file.write_all(format!("#!/bin/sh\n{body}\n").as_bytes())
                .expect("write script");
            file.sync_all().expect("sync script");
            file.set_permissions(std::fs::Permissions::from_mode(0o755))
                .expect("chmod script");
        }
        // handle closed before returning so exec never races an open writer (ETXTBSY)
        path
    }

    /// Legacy settings pointing at `program`, running in this workspace
    pub fn legacy_config(&self, program: impl Into<PathBuf>) -> LegacyConfig {
        LegacyConfig::new()
            .with_program(program)
            .with_working_dir(self.dir.path())
            .with_timeout(Duration::from_secs(10))
    }

    /// Pipeline settings pointing at `program`
    pub fn payroll_config(&self, program: impl Into<PathBuf>) -> PayrollConfig {
        PayrollConfig::new().with_legacy(self.legacy_config(program))
    }

    /// Files left behind whose name starts with `prefix`
    pub fn leftover_inputs(&self, prefix: &str) -> Vec<PathBuf> {
        std::fs::read_dir(self.dir.path())
            .expect("read workspace")
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with(prefix))
            })
            .collect()
    }
}

impl Default for LegacyWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
