//! The conversion backend: whatever turns a local file into Markdown text.
//!
//! [`MarkdownBackend`] is the single seam between this crate and the actual
//! document parser. The production implementation, [`MarkitdownBackend`],
//! runs the `markitdown` executable from a project-local virtualenv through
//! `uv`. Inject a different `Arc<dyn MarkdownBackend>` via
//! [`crate::ConverterConfigBuilder::backend`] to use another tool or a mock.
//!
//! # Example
//!
//! ```rust
//! use markdownify::{MarkdownBackend, MarkdownifyError};
//! use std::path::Path;
//!
//! struct Upper;
//!
//! #[async_trait::async_trait]
//! impl MarkdownBackend for Upper {
//!     async fn convert(&self, input: &Path) -> Result<String, MarkdownifyError> {
//!         let text = tokio::fs::read_to_string(input).await?;
//!         Ok(text.to_uppercase())
//!     }
//! }
//! ```

use crate::config::{ConverterConfig, StderrPolicy};
use crate::error::MarkdownifyError;
use crate::pipeline::paths;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Converts one local file to Markdown.
///
/// Implementations must be `Send + Sync`; a single backend is shared by every
/// call made through a [`crate::DocumentConverter`].
#[async_trait]
pub trait MarkdownBackend: Send + Sync {
    /// Convert the file at `input` and return the Markdown text.
    async fn convert(&self, input: &Path) -> Result<String, MarkdownifyError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Path of the markitdown executable inside `<project_root>/.venv`.
pub fn markitdown_path(project_root: &Path) -> PathBuf {
    let (bin_dir, exe) = if cfg!(windows) {
        ("Scripts", "markitdown.exe")
    } else {
        ("bin", "markitdown")
    };
    project_root.join(".venv").join(bin_dir).join(exe)
}

/// Runs `<uv> run <project_root>/.venv/bin/markitdown <input>`.
#[derive(Debug, Clone)]
pub struct MarkitdownBackend {
    project_root: PathBuf,
    uv_path: PathBuf,
    timeout: Option<Duration>,
    stderr_policy: StderrPolicy,
}

impl MarkitdownBackend {
    pub fn new(project_root: impl Into<PathBuf>, uv_path: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            uv_path: uv_path.into(),
            timeout: None,
            stderr_policy: StderrPolicy::default(),
        }
    }

    /// Backend using the tool location, timeout and stderr policy from `config`.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(&config.project_root, &config.uv_path)
            .with_timeout(config.tool_timeout_secs.map(Duration::from_secs))
            .with_stderr_policy(config.stderr_policy)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stderr_policy(mut self, policy: StderrPolicy) -> Self {
        self.stderr_policy = policy;
        self
    }

    /// Where this backend expects the markitdown executable.
    pub fn executable(&self) -> PathBuf {
        markitdown_path(&self.project_root)
    }

    fn command(&self, executable: &Path, input: &Path) -> Command {
        let runner = paths::expand_home(&self.uv_path);
        let mut cmd = Command::new(runner);
        cmd.arg("run")
            .arg(executable)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl MarkdownBackend for MarkitdownBackend {
    async fn convert(&self, input: &Path) -> Result<String, MarkdownifyError> {
        let executable = self.executable();
        if !executable.is_file() {
            return Err(MarkdownifyError::ExecutableNotFound { path: executable });
        }

        let start = Instant::now();
        debug!(
            "Running {} run {} {}",
            self.uv_path.display(),
            executable.display(),
            input.display()
        );

        let mut cmd = self.command(&executable, input);
        let spawned = cmd.output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, spawned).await.map_err(|_| {
                MarkdownifyError::ExecutionFailed {
                    detail: format!("markitdown timed out after {}s", limit.as_secs()),
                }
            })?,
            None => spawned.await,
        }
        .map_err(|e| MarkdownifyError::ExecutionFailed {
            detail: format!("failed to start '{}': {}", self.uv_path.display(), e),
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            match self.stderr_policy {
                StderrPolicy::Fatal => {
                    return Err(MarkdownifyError::ExecutionFailed {
                        detail: stderr.into_owned(),
                    })
                }
                StderrPolicy::Warn => warn!("markitdown stderr: {}", stderr.trim_end()),
            }
        }

        if !output.status.success() {
            return Err(MarkdownifyError::ExecutionFailed {
                detail: format!("markitdown exited with {}", output.status),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            "markitdown produced {} bytes in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    fn name(&self) -> &str {
        "markitdown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn executable_lives_in_venv() {
        let path = markitdown_path(Path::new("/srv/app"));
        if cfg!(windows) {
            assert!(path.ends_with(".venv/Scripts/markitdown.exe"));
        } else {
            assert_eq!(path, PathBuf::from("/srv/app/.venv/bin/markitdown"));
        }
    }

    #[tokio::test]
    async fn missing_executable_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        // The runner does not exist either; reaching it would give ExecutionError.
        let backend = MarkitdownBackend::new(root.path(), "/definitely/not/uv");
        let err = backend
            .convert(Path::new("/tmp/whatever.pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("markitdown executable not found"));
    }

    #[test]
    fn from_config_copies_tool_settings() {
        let config = ConverterConfig::builder()
            .project_root("/opt/md")
            .tool_timeout_secs(9)
            .stderr_policy(StderrPolicy::Warn)
            .build()
            .unwrap();
        let backend = MarkitdownBackend::from_config(&config);
        assert_eq!(backend.timeout, Some(Duration::from_secs(9)));
        assert_eq!(backend.stderr_policy, StderrPolicy::Warn);
        assert_eq!(backend.name(), "markitdown");
    }
}
