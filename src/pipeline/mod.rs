//! Stages of a conversion.
//!
//! ```text
//! input ──▶ backend ──▶ temp
//! (URL/path)  (markitdown)  (output file)
//! ```
//!
//! 1. [`input`]: resolve the request's source to a local file, downloading
//!    URLs into a self-deleting temp file
//! 2. [`crate::backend`]: run the converter on that file
//! 3. [`temp`]: write the Markdown to a persisted temp file
//!
//! [`paths`] holds the path resolution shared with Markdown reads.

pub mod input;
pub mod paths;
pub mod temp;
