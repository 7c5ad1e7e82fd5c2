//! Legacy process adapter
//!
//! Runs the external batch program against one input blob:
//! 1. write the blob to a freshly named transient file in the working directory
//! 2. spawn the program with that path as its only argument
//! 3. collect stdout, stderr and the exit status, bounded by a timeout
//! 4. remove the transient file, whatever happened above
//!
//! Step 4 is a drop guard, so every early return and every `?` cleans up.

use crate::config::LegacyConfig;
use payroll_core::PayrollError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Everything the legacy program produced on a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Always `Some(0)` for outputs returned by [`LegacyProcessAdapter::run`]
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Invokes the external payroll executable
#[derive(Debug, Clone)]
pub struct LegacyProcessAdapter {
    config: LegacyConfig,
}

impl LegacyProcessAdapter {
    /// Create an adapter for the configured program
    #[inline]
    #[must_use]
    pub fn new(config: LegacyConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LegacyConfig {
        &self.config
    }

    /// Run the program over `blob`
    ///
    /// # Errors
    /// - [`PayrollError::Io`] if the working directory or transient file is unusable
    /// - [`PayrollError::ProcessLaunch`] if the program cannot be spawned
    /// - [`PayrollError::ProcessTimeout`] if it outlives the configured timeout
    /// - [`PayrollError::ProcessExit`] on a non-zero exit status
    pub async fn run(&self, blob: &str) -> Result<ProcessOutput, PayrollError> {
        let working_dir = tokio::fs::canonicalize(&self.config.working_dir)
            .await
            .map_err(|e| {
                PayrollError::io(
                    format!("resolving working directory {}", self.config.working_dir.display()),
                    e,
                )
            })?;

        let input = TransientInput::create(&working_dir, &self.config.temp_prefix, blob).await?;
        let program = self.config.resolve_program(&working_dir);
        tracing::info!(
            program = %program.display(),
            input = %input.path().display(),
            lines = blob.lines().count(),
            "launching legacy payroll program"
        );

        let child = Command::new(&program)
            .arg(input.path())
            .current_dir(&working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PayrollError::ProcessLaunch {
                program: program.clone(),
                source,
            })?;

        let timeout = self.config.timeout();
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(waited) => waited.map_err(|e| PayrollError::io("waiting for legacy program", e))?,
            Err(_) => {
                // Dropping the wait future drops the child, which kills it
                tracing::warn!(timeout_ms = self.config.timeout_ms, "legacy payroll program timed out");
                return Err(PayrollError::ProcessTimeout {
                    timeout,
                    input: blob.to_string(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code();

        if !output.status.success() {
            tracing::warn!(
                exit_code = ?exit_code,
                stdout = %stdout,
                stderr = %stderr,
                input = %blob,
                "legacy payroll program failed"
            );
            return Err(PayrollError::ProcessExit {
                exit_code,
                stdout,
                stderr,
                input: blob.to_string(),
            });
        }

        tracing::debug!(stdout = %stdout, stderr = %stderr, "legacy payroll program finished");
        Ok(ProcessOutput {
            exit_code,
            stdout,
            stderr,
        })
    }
}

/// A transient input file, removed when dropped
#[derive(Debug)]
struct TransientInput {
    path: PathBuf,
}

impl TransientInput {
    async fn create(dir: &Path, prefix: &str, contents: &str) -> Result<Self, PayrollError> {
        let suffix: [u8; 8] = rand::random();
        let path = dir.join(format!("{prefix}{}.txt", hex::encode(suffix)));

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| PayrollError::io(format!("creating {}", path.display()), e))?;
        let guard = Self { path };

        file.write_all(contents.as_bytes())
            .await
            .map_err(|e| PayrollError::io(format!("writing {}", guard.path.display()), e))?;
        file.flush()
            .await
            .map_err(|e| PayrollError::io(format!("flushing {}", guard.path.display()), e))?;

        Ok(guard)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransientInput {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove transient input");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transient_input_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let input = TransientInput::create(dir.path(), "t_", "E1   02000015500005000\n")
            .await
            .unwrap();
        let path = input.path().to_path_buf();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "E1   02000015500005000\n"
        );
        drop(input);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_transient_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = TransientInput::create(dir.path(), "t_", "").await.unwrap();
        let b = TransientInput::create(dir.path(), "t_", "").await.unwrap();
        assert_ne!(a.path(), b.path());
        let name = a.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("t_"));
        assert!(name.ends_with(".txt"));
        assert_eq!(name.len(), "t_".len() + 16 + ".txt".len());
    }

    #[tokio::test]
    async fn test_missing_working_dir_is_io_error() {
        let adapter = LegacyProcessAdapter::new(
            LegacyConfig::new().with_working_dir("/definitely/not/a/real/dir"),
        );
        let err = adapter.run("").await.unwrap_err();
        assert!(matches!(err, PayrollError::Io { .. }));
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = LegacyProcessAdapter::new(
            LegacyConfig::new()
                .with_working_dir(dir.path())
                .with_program("./no-such-payroll"),
        );
        let err = adapter.run("E1   02000015500005000\n").await.unwrap_err();
        assert!(matches!(err, PayrollError::ProcessLaunch { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
