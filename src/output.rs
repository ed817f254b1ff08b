//! Values returned by conversions and Markdown reads.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// File holding `text`. A persisted temp file unless written via
    /// [`crate::convert_to_file`]. The caller owns it.
    pub path: PathBuf,
    /// The Markdown produced by the backend.
    pub text: String,
}

/// A Markdown file read through [`crate::DocumentConverter::read_markdown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownDocument {
    /// The path exactly as the caller gave it.
    pub path: PathBuf,
    /// Absolute, `~`-expanded and normalised form of `path`.
    pub resolved_path: PathBuf,
    /// File contents, verbatim.
    pub text: String,
}
