//! Reading existing Markdown files, optionally confined to a share directory.
//!
//! Checks run in a fixed order: extension, share-directory containment,
//! existence. A `.txt` path outside the share directory therefore fails with
//! [`MarkdownifyError::InvalidType`], and a missing file outside it fails with
//! [`MarkdownifyError::PermissionDenied`] without touching the disk.

use crate::error::MarkdownifyError;
use crate::output::MarkdownDocument;
use crate::pipeline::paths;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

/// Extensions accepted as Markdown (case-sensitive, without the dot).
pub const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// Whether `path` ends in `.md` or `.markdown`.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}

/// Read `path` as Markdown.
///
/// When `share_dir` is set, the resolved path must lie inside it. The check
/// is repeated on canonical paths once the file is known to exist, so a
/// symlink inside the share directory cannot point outside it. An empty
/// `share_dir` means no restriction.
///
/// Contents are decoded as UTF-8; invalid byte sequences become U+FFFD
/// rather than failing the read.
pub async fn read_markdown_file(
    path: &Path,
    share_dir: Option<&Path>,
) -> Result<MarkdownDocument, MarkdownifyError> {
    let resolved = paths::resolve(path)?;
    debug!("Reading {} (resolved {})", path.display(), resolved.display());

    if !is_markdown(&resolved) {
        return Err(MarkdownifyError::InvalidType { path: resolved });
    }

    let allowed = match share_dir.filter(|dir| !dir.as_os_str().is_empty()) {
        Some(dir) => {
            let allowed = paths::resolve(dir)?;
            if !resolved.starts_with(&allowed) {
                return Err(MarkdownifyError::PermissionDenied {
                    path: resolved,
                    allowed,
                });
            }
            Some(allowed)
        }
        None => None,
    };

    match tokio::fs::metadata(&resolved).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(MarkdownifyError::FileNotFound { path: resolved }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(MarkdownifyError::FileNotFound { path: resolved })
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(allowed) = allowed {
        let canonical = tokio::fs::canonicalize(&resolved).await?;
        let canonical_allowed = tokio::fs::canonicalize(&allowed).await?;
        if !canonical.starts_with(&canonical_allowed) {
            return Err(MarkdownifyError::PermissionDenied {
                path: canonical,
                allowed: canonical_allowed,
            });
        }
    }

    let bytes = tokio::fs::read(&resolved).await?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("{} is not valid UTF-8; replacing invalid bytes", resolved.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    info!("Read {} bytes from {}", text.len(), resolved.display());

    Ok(MarkdownDocument {
        path: path.to_path_buf(),
        resolved_path: resolved,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind as Kind;

    #[test]
    fn markdown_extensions() {
        assert!(is_markdown(Path::new("/a/notes.md")));
        assert!(is_markdown(Path::new("/a/notes.markdown")));
        assert!(!is_markdown(Path::new("/a/notes.txt")));
        assert!(!is_markdown(Path::new("/a/notes.MD")));
        assert!(!is_markdown(Path::new("/a/md")));
        assert!(!is_markdown(Path::new("/a/.md")));
    }

    #[tokio::test]
    async fn txt_is_invalid_type_even_if_missing() {
        let err = read_markdown_file(Path::new("/nowhere/file.txt"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidType);
    }

    #[tokio::test]
    async fn outside_share_dir_is_permission_error() {
        let share = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let file = other.path().join("file.md");
        std::fs::write(&file, "# other").unwrap();

        let err = read_markdown_file(&file, Some(share.path())).await.unwrap_err();
        assert_eq!(err.kind(), Kind::PermissionError);
    }

    #[tokio::test]
    async fn sibling_with_shared_prefix_is_outside() {
        let root = tempfile::tempdir().unwrap();
        let allowed = root.path().join("allowed");
        let sibling = root.path().join("allowed2");
        std::fs::create_dir_all(&allowed).unwrap();
        std::fs::create_dir_all(&sibling).unwrap();
        let file = sibling.join("x.md");
        std::fs::write(&file, "x").unwrap();

        let err = read_markdown_file(&file, Some(&allowed)).await.unwrap_err();
        assert_eq!(err.kind(), Kind::PermissionError);
    }

    #[tokio::test]
    async fn dot_dot_cannot_escape_share_dir() {
        let root = tempfile::tempdir().unwrap();
        let allowed = root.path().join("allowed");
        std::fs::create_dir_all(&allowed).unwrap();
        std::fs::write(root.path().join("secret.md"), "s").unwrap();

        let sneaky = allowed.join("..").join("secret.md");
        let err = read_markdown_file(&sneaky, Some(&allowed)).await.unwrap_err();
        assert_eq!(err.kind(), Kind::PermissionError);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_out_of_share_dir_is_refused() {
        let root = tempfile::tempdir().unwrap();
        let allowed = root.path().join("allowed");
        std::fs::create_dir_all(&allowed).unwrap();
        let target = root.path().join("outside.md");
        std::fs::write(&target, "outside").unwrap();
        let link = allowed.join("link.md");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let err = read_markdown_file(&link, Some(&allowed)).await.unwrap_err();
        assert_eq!(err.kind(), Kind::PermissionError);
    }

    #[tokio::test]
    async fn empty_share_dir_does_not_restrict() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("x.md");
        std::fs::write(&file, "# x").unwrap();

        let doc = read_markdown_file(&file, Some(Path::new(""))).await.unwrap();
        assert_eq!(doc.text, "# x");
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_rejected() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("latin1.md");
        std::fs::write(&file, b"caf\xe9 # ok\n").unwrap();

        let doc = read_markdown_file(&file, None).await.unwrap();
        assert_eq!(doc.text, "caf\u{FFFD} # ok\n");
    }

    #[tokio::test]
    async fn directory_named_md_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("folder.md");
        std::fs::create_dir_all(&dir).unwrap();
        let err = read_markdown_file(&dir, None).await.unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }
}
