//! Input resolution: turn a [`ConversionSource`] into a local file.
//!
//! markitdown only reads from the file system, so URL sources are downloaded
//! into a temp file first. The download is held by a [`TempPath`] inside
//! [`ResolvedInput::Downloaded`], which removes it when the input is dropped
//! on success, on error, and on cancellation alike.

use crate::config::ConverterConfig;
use crate::error::MarkdownifyError;
use crate::pipeline::temp;
use crate::request::ConversionSource;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempPath;
use tracing::{debug, info};

/// The resolved input: either a caller-owned local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file. Never deleted.
    Local(PathBuf),
    /// Input was a URL; bytes saved to a temp file that is deleted on drop.
    Downloaded(TempPath),
}

impl ResolvedInput {
    /// Get the path to the input file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded(p) => p,
        }
    }

    /// Whether this input is owned (and removed) by the conversion.
    pub fn is_temporary(&self) -> bool {
        matches!(self, ResolvedInput::Downloaded(_))
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Extension for a downloaded file: `pdf` when the URL ends in `.pdf`,
/// `default` otherwise.
pub fn infer_extension<'a>(url: &str, default: &'a str) -> &'a str {
    if url.ends_with(".pdf") {
        "pdf"
    } else {
        default
    }
}

/// Resolve a source to a local file, downloading URLs.
pub async fn resolve_source(
    source: &ConversionSource,
    config: &ConverterConfig,
) -> Result<ResolvedInput, MarkdownifyError> {
    match source {
        ConversionSource::File(path) => resolve_local(path),
        ConversionSource::Url(url) => download_url(url, config).await,
    }
}

fn resolve_local(path: &Path) -> Result<ResolvedInput, MarkdownifyError> {
    if !path.exists() {
        return Err(MarkdownifyError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    debug!("Resolved local input: {}", path.display());
    Ok(ResolvedInput::Local(path.to_path_buf()))
}

/// Download a URL into a fresh temp file.
async fn download_url(url: &str, config: &ConverterConfig) -> Result<ResolvedInput, MarkdownifyError> {
    info!("Downloading: {}", url);
    let timeout_secs = config.download_timeout_secs;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| MarkdownifyError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            MarkdownifyError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            MarkdownifyError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(MarkdownifyError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            MarkdownifyError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            MarkdownifyError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    let extension = infer_extension(url, &config.default_extension);
    let path = temp::write(&config.temp_dir(), extension, &bytes).await?;

    info!("Downloaded {} bytes to: {}", bytes.len(), path.display());
    Ok(ResolvedInput::Downloaded(path))
}
