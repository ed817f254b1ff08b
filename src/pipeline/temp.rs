//! Temp files named `markdown_output_<unix-millis>.<ext>`.
//!
//! Files are created exclusively. If another file already took this
//! millisecond's name, `_1`, `_2`, ... is appended to the timestamp.
//!
//! Callers receive a [`TempPath`], which deletes the file when dropped.
//! Downloaded inputs rely on that; outputs are [`persist`]ed before returning.

use crate::error::MarkdownifyError;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};
use tracing::debug;

/// File name prefix shared by every temp file this crate creates.
pub const TEMP_PREFIX: &str = "markdown_output_";

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Create an empty temp file in `dir` with the given extension.
pub fn create(dir: &Path, extension: &str) -> Result<TempPath, MarkdownifyError> {
    let stamp = Utc::now().timestamp_millis();
    let suffix = format!(".{extension}");

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let prefix = if attempt == 0 {
            format!("{TEMP_PREFIX}{stamp}")
        } else {
            format!("{TEMP_PREFIX}{stamp}_{attempt}")
        };

        match Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .rand_bytes(0)
            .tempfile_in(dir)
        {
            Ok(file) => return Ok(file.into_temp_path()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(MarkdownifyError::TempFile {
                    reason: format!("cannot create temp file in '{}': {}", dir.display(), e),
                })
            }
        }
    }

    Err(MarkdownifyError::TempFile {
        reason: format!(
            "{MAX_NAME_ATTEMPTS} temp files already use timestamp {stamp} in '{}'",
            dir.display()
        ),
    })
}

/// Create a temp file and fill it with `contents`.
///
/// The file is removed again if writing fails.
pub async fn write(
    dir: &Path,
    extension: &str,
    contents: &[u8],
) -> Result<TempPath, MarkdownifyError> {
    let path = create(dir, extension)?;
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| MarkdownifyError::TempFile {
            reason: format!("failed to write '{}': {}", path.display(), e),
        })?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(path)
}

/// Keep the file on disk past the guard's lifetime.
pub fn persist(path: TempPath) -> Result<PathBuf, MarkdownifyError> {
    path.keep().map_err(|e| MarkdownifyError::TempFile {
        reason: format!("failed to persist '{}': {}", e.path.display(), e.error),
    })
}
