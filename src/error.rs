//! Error types for the markdownify library.
//!
//! Every failure surfaces as a [`MarkdownifyError`]. Errors raised while
//! converting a document are wrapped once in [`MarkdownifyError::Conversion`]
//! so the caller sees a single descriptive message; errors raised while
//! reading a Markdown file are returned as-is.
//!
//! Use [`MarkdownifyError::kind`] to branch on the failure class without
//! matching every variant. It looks through the conversion wrapper.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the markdownify library.
#[derive(Debug, Error)]
pub enum MarkdownifyError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request did not name exactly one source, or the URL is malformed.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The file named by the caller does not exist.
    #[error("File does not exist: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The file exists but does not carry a Markdown extension.
    #[error("Required file is not a Markdown file: '{path}'")]
    InvalidType { path: PathBuf },

    /// The file lies outside the allow-listed share directory.
    #[error("Only files in '{allowed}' are allowed (got '{path}')")]
    PermissionDenied { path: PathBuf, allowed: PathBuf },

    // ── Download errors ───────────────────────────────────────────────────
    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Tool errors ───────────────────────────────────────────────────────
    /// The markitdown executable is missing from the project's virtualenv.
    #[error("markitdown executable not found at '{path}'")]
    ExecutableNotFound { path: PathBuf },

    /// The tool could not be started, wrote to stderr, or exited non-zero.
    #[error("Error executing command: {detail}")]
    ExecutionFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// A temp file could not be created, written or persisted.
    #[error("Temp file error: {reason}")]
    TempFile { reason: String },

    /// Could not create or write the requested output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Wrapper ───────────────────────────────────────────────────────────
    /// A conversion step failed; the inner error says which one.
    ///
    /// The inner message is part of the display text, so it is not also
    /// exposed through [`std::error::Error::source`].
    #[error("Error processing to Markdown: {inner}")]
    Conversion { inner: Box<MarkdownifyError> },
}

/// Coarse classification of a [`MarkdownifyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    ExecutionError,
    PermissionError,
    InvalidType,
    Download,
    Io,
    InvalidConfig,
}

impl MarkdownifyError {
    /// Failure class of this error, looking through [`MarkdownifyError::Conversion`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarkdownifyError::InvalidInput { .. } => ErrorKind::InvalidInput,
            MarkdownifyError::FileNotFound { .. }
            | MarkdownifyError::ExecutableNotFound { .. } => ErrorKind::NotFound,
            MarkdownifyError::InvalidType { .. } => ErrorKind::InvalidType,
            MarkdownifyError::PermissionDenied { .. } => ErrorKind::PermissionError,
            MarkdownifyError::DownloadFailed { .. } | MarkdownifyError::DownloadTimeout { .. } => {
                ErrorKind::Download
            }
            MarkdownifyError::ExecutionFailed { .. } => ErrorKind::ExecutionError,
            MarkdownifyError::TempFile { .. }
            | MarkdownifyError::OutputWriteFailed { .. }
            | MarkdownifyError::Io(_) => ErrorKind::Io,
            MarkdownifyError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            MarkdownifyError::Conversion { inner } => inner.kind(),
        }
    }

    /// Wrap a conversion-path error. Already-wrapped errors are returned unchanged.
    pub(crate) fn into_conversion(self) -> Self {
        match self {
            e @ MarkdownifyError::Conversion { .. } => e,
            other => MarkdownifyError::Conversion {
                inner: Box::new(other),
            },
        }
    }
}
