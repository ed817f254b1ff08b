//! # markdownify
//!
//! Convert documents (local files or URLs) to Markdown by running
//! [markitdown](https://github.com/microsoft/markitdown), and read existing
//! Markdown files from an optional allow-listed directory.
//!
//! The crate does no parsing itself. It validates the request, downloads URL
//! inputs into a temp file, runs the converter, and stores the result in
//! another temp file.
//!
//! ## Pipeline Overview
//!
//! ```text
//! request
//!  │
//!  ├─ 1. Validate  exactly one of file path / URL
//!  ├─ 2. Input     use the local file, or download the URL to a temp file
//!  ├─ 3. Backend   <uv> run <root>/.venv/bin/markitdown <input>
//!  ├─ 4. Output    markdown_output_<millis>.md in the temp dir
//!  └─ 5. Cleanup   downloaded input removed on every exit path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use markdownify::{ConversionRequest, ConverterConfig, DocumentConverter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConverterConfig::builder()
//!         .project_root("/opt/markdownify")
//!         .share_dir("~/notes")
//!         .build()?;
//!     let converter = DocumentConverter::new(config);
//!
//!     let result = converter
//!         .convert_to_markdown(&ConversionRequest::file("report.docx"))
//!         .await?;
//!     println!("{}", result.text);
//!
//!     let doc = converter.read_markdown("~/notes/todo.md").await?;
//!     println!("{}", doc.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `markdownify` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! markdownify = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod read;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{markitdown_path, MarkdownBackend, MarkitdownBackend};
pub use config::{ConverterConfig, ConverterConfigBuilder, StderrPolicy};
pub use convert::{convert, convert_sync, convert_to_file, read_markdown, DocumentConverter};
pub use error::{ErrorKind, MarkdownifyError};
pub use output::{ConversionResult, MarkdownDocument};
pub use request::{ConversionRequest, ConversionSource};
