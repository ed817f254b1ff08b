//! Configuration for document conversion and Markdown reads.
//!
//! All behaviour is controlled through [`ConverterConfig`], built via its
//! [`ConverterConfigBuilder`]. Settings that used to come from the process
//! environment (the `MD_SHARE_DIR` allow-list in particular) are plain fields
//! here; only the CLI binary maps environment variables onto them.

use crate::backend::MarkdownBackend;
use crate::error::MarkdownifyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default location of the `uv` runner used to start markitdown.
pub const DEFAULT_UV_PATH: &str = "~/.local/bin/uv";

/// Extension given to downloaded inputs that are not PDFs, and to outputs.
pub const DEFAULT_EXTENSION: &str = "md";

/// Configuration for a [`crate::DocumentConverter`].
///
/// # Example
/// ```rust
/// use markdownify::ConverterConfig;
///
/// let config = ConverterConfig::builder()
///     .project_root("/opt/markdownify")
///     .share_dir("~/shared-notes")
///     .download_timeout_secs(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConverterConfig {
    /// Directory holding the `.venv` that provides markitdown. Default: `.`.
    pub project_root: PathBuf,

    /// Command used to run markitdown inside its virtualenv. Default: `~/.local/bin/uv`.
    ///
    /// A leading `~` is expanded to the home directory at invocation time.
    pub uv_path: PathBuf,

    /// Allow-listed directory for [`crate::DocumentConverter::read_markdown`].
    /// If None, any Markdown file may be read.
    pub share_dir: Option<PathBuf>,

    /// Directory for temp files. If None, uses the platform temp directory.
    pub temp_dir: Option<PathBuf>,

    /// Extension for downloaded non-PDF inputs. Default: `md`.
    pub default_extension: String,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Kill markitdown after this many seconds. Default: None (no limit).
    pub tool_timeout_secs: Option<u64>,

    /// How output on the tool's stderr is treated. Default: [`StderrPolicy::Fatal`].
    pub stderr_policy: StderrPolicy,

    /// Pre-constructed backend. Takes precedence over `project_root`/`uv_path`.
    pub backend: Option<Arc<dyn MarkdownBackend>>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            uv_path: PathBuf::from(DEFAULT_UV_PATH),
            share_dir: None,
            temp_dir: None,
            default_extension: DEFAULT_EXTENSION.to_string(),
            download_timeout_secs: 120,
            tool_timeout_secs: None,
            stderr_policy: StderrPolicy::default(),
            backend: None,
        }
    }
}

impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("project_root", &self.project_root)
            .field("uv_path", &self.uv_path)
            .field("share_dir", &self.share_dir)
            .field("temp_dir", &self.temp_dir)
            .field("default_extension", &self.default_extension)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("tool_timeout_secs", &self.tool_timeout_secs)
            .field("stderr_policy", &self.stderr_policy)
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .finish()
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Directory temp files are created in.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.project_root = root.into();
        self
    }

    pub fn uv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.uv_path = path.into();
        self
    }

    /// Restrict Markdown reads to `dir`. An empty path clears the restriction.
    pub fn share_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.config.share_dir = (!dir.as_os_str().is_empty()).then_some(dir);
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn default_extension(mut self, ext: impl Into<String>) -> Self {
        let ext: String = ext.into();
        self.config.default_extension = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn tool_timeout_secs(mut self, secs: u64) -> Self {
        self.config.tool_timeout_secs = Some(secs);
        self
    }

    pub fn stderr_policy(mut self, policy: StderrPolicy) -> Self {
        self.config.stderr_policy = policy;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn MarkdownBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, MarkdownifyError> {
        let c = &self.config;
        if c.default_extension.is_empty()
            || !c.default_extension.chars().all(|ch| ch.is_ascii_alphanumeric())
        {
            return Err(MarkdownifyError::InvalidConfig(format!(
                "default extension must be non-empty ASCII alphanumeric, got '{}'",
                c.default_extension
            )));
        }
        if c.download_timeout_secs == 0 {
            return Err(MarkdownifyError::InvalidConfig(
                "download timeout must be ≥ 1s".into(),
            ));
        }
        if c.tool_timeout_secs == Some(0) {
            return Err(MarkdownifyError::InvalidConfig(
                "tool timeout must be ≥ 1s".into(),
            ));
        }
        if c.uv_path.as_os_str().is_empty() {
            return Err(MarkdownifyError::InvalidConfig(
                "uv path must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What to do when markitdown writes to stderr.
///
/// markitdown (and the Python libraries under it) sometimes print warnings
/// on stderr while still producing usable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StderrPolicy {
    /// Any stderr output fails the conversion, whatever the exit status. (default)
    #[default]
    Fatal,
    /// Log stderr as a warning; fail only on a non-zero exit status.
    Warn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConverterConfig::default();
        assert_eq!(c.project_root, PathBuf::from("."));
        assert_eq!(c.uv_path, PathBuf::from("~/.local/bin/uv"));
        assert_eq!(c.default_extension, "md");
        assert_eq!(c.download_timeout_secs, 120);
        assert!(c.share_dir.is_none());
        assert!(c.tool_timeout_secs.is_none());
        assert_eq!(c.stderr_policy, StderrPolicy::Fatal);
    }

    #[test]
    fn empty_share_dir_is_no_restriction() {
        let c = ConverterConfig::builder().share_dir("").build().unwrap();
        assert!(c.share_dir.is_none());

        let c = ConverterConfig::builder()
            .share_dir("/allowed")
            .share_dir("")
            .build()
            .unwrap();
        assert!(c.share_dir.is_none());
    }

    #[test]
    fn builder_strips_leading_dot_from_extension() {
        let c = ConverterConfig::builder()
            .default_extension(".txt")
            .build()
            .unwrap();
        assert_eq!(c.default_extension, "txt");
    }

    #[test]
    fn builder_rejects_bad_extension() {
        let err = ConverterConfig::builder()
            .default_extension("m/d")
            .build()
            .unwrap_err();
        assert!(matches!(err, MarkdownifyError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_timeouts() {
        assert!(ConverterConfig::builder()
            .download_timeout_secs(0)
            .build()
            .is_err());
        assert!(ConverterConfig::builder()
            .tool_timeout_secs(0)
            .build()
            .is_err());
    }

    #[test]
    fn temp_dir_falls_back_to_platform_dir() {
        let c = ConverterConfig::default();
        assert_eq!(c.temp_dir(), std::env::temp_dir());
        let c = ConverterConfig::builder().temp_dir("/var/tmp/md").build().unwrap();
        assert_eq!(c.temp_dir(), PathBuf::from("/var/tmp/md"));
    }

    #[test]
    fn debug_hides_backend_internals() {
        let c = ConverterConfig::default();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("ConverterConfig"));
        assert!(dbg.contains("backend: None"));
    }
}
