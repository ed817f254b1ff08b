//! The [`DocumentConverter`] component and its free-function entry points.
//!
//! A conversion runs these steps and nothing else:
//!
//! 1. validate the request (exactly one of file path / URL)
//! 2. resolve the input, downloading URLs to a temp file
//! 3. run the backend on the local file
//! 4. write the Markdown to a new temp file and persist it
//! 5. drop the downloaded input, if any
//!
//! Every error from these steps is wrapped in
//! [`MarkdownifyError::Conversion`]. The downloaded input is removed on all
//! exit paths because it lives in a [`tempfile::TempPath`] guard.

use crate::backend::{MarkdownBackend, MarkitdownBackend};
use crate::config::ConverterConfig;
use crate::error::MarkdownifyError;
use crate::output::{ConversionResult, MarkdownDocument};
use crate::pipeline::{input, temp};
use crate::read::read_markdown_file;
use crate::request::ConversionRequest;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Converts documents to Markdown and reads Markdown files.
///
/// Cheap to share: wrap it in an `Arc` and call it from any task. Calls do
/// not share state beyond the configuration.
///
/// # Example
/// ```rust,no_run
/// use markdownify::{ConversionRequest, ConverterConfig, DocumentConverter};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConverterConfig::builder().project_root("/opt/markdownify").build()?;
/// let converter = DocumentConverter::new(config);
///
/// let result = converter
///     .convert_to_markdown(&ConversionRequest::url("https://arxiv.org/pdf/1706.03762.pdf"))
///     .await?;
/// println!("{} ({} bytes)", result.path.display(), result.text.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DocumentConverter {
    config: ConverterConfig,
    backend: Arc<dyn MarkdownBackend>,
}

impl std::fmt::Debug for DocumentConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentConverter")
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl DocumentConverter {
    /// Build a converter. Uses `config.backend` when set, otherwise markitdown.
    pub fn new(config: ConverterConfig) -> Self {
        let backend = resolve_backend(&config);
        Self { config, backend }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert a local file or URL to Markdown.
    ///
    /// # Errors
    /// Always [`MarkdownifyError::Conversion`]; use
    /// [`MarkdownifyError::kind`] to see what went wrong:
    /// - `InvalidInput`: neither or both sources, malformed URL
    /// - `NotFound`: markitdown missing, or local input missing
    /// - `ExecutionError`: markitdown failed or wrote to stderr
    /// - `Download`: URL fetch failed or timed out
    pub async fn convert_to_markdown(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, MarkdownifyError> {
        self.run(request).await.map_err(|e| {
            warn!("Conversion failed: {}", e);
            e.into_conversion()
        })
    }

    /// Read an existing Markdown file, honouring `config.share_dir`.
    ///
    /// Errors are returned unwrapped: `InvalidType`, `PermissionError`,
    /// `NotFound`, or `Io`.
    pub async fn read_markdown(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<MarkdownDocument, MarkdownifyError> {
        read_markdown_file(path.as_ref(), self.config.share_dir.as_deref()).await
    }

    async fn run(&self, request: &ConversionRequest) -> Result<ConversionResult, MarkdownifyError> {
        let start = Instant::now();

        // ── Step 1: Validate request ─────────────────────────────────────
        let source = request.source()?;
        info!("Starting conversion: {}", source);

        // ── Step 2: Resolve input ────────────────────────────────────────
        let resolved = input::resolve_source(&source, &self.config).await?;

        // ── Step 3: Run backend ──────────────────────────────────────────
        let backend = self.backend_for(request);
        debug!("Converting {} with {}", resolved.path().display(), backend.name());
        let text = backend.convert(resolved.path()).await?;

        // ── Step 4: Save output ──────────────────────────────────────────
        let output = temp::write(
            &self.config.temp_dir(),
            &self.config.default_extension,
            text.as_bytes(),
        )
        .await?;
        let path = temp::persist(output)?;

        // ── Step 5: Drop downloaded input ────────────────────────────────
        if resolved.is_temporary() {
            debug!("Removing temp input {}", resolved.path().display());
        }
        drop(resolved);

        info!(
            "Conversion complete: {} bytes in {}ms → {}",
            text.len(),
            start.elapsed().as_millis(),
            path.display()
        );
        Ok(ConversionResult { path, text })
    }

    /// Per-request tool overrides get a one-off markitdown backend.
    fn backend_for(&self, request: &ConversionRequest) -> Arc<dyn MarkdownBackend> {
        if !request.overrides_tool() {
            return Arc::clone(&self.backend);
        }
        let root = request
            .project_root
            .as_ref()
            .unwrap_or(&self.config.project_root);
        let uv = request.uv_path.as_ref().unwrap_or(&self.config.uv_path);
        let mut config = self.config.clone();
        config.project_root = root.clone();
        config.uv_path = uv.clone();
        Arc::new(MarkitdownBackend::from_config(&config))
    }
}

/// Convert a file or URL to Markdown with a one-shot converter.
pub async fn convert(
    request: &ConversionRequest,
    config: &ConverterConfig,
) -> Result<ConversionResult, MarkdownifyError> {
    DocumentConverter::new(config.clone())
        .convert_to_markdown(request)
        .await
}

/// Convert and write the Markdown to `output_path` instead of a temp file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
/// The returned result's `path` is `output_path`.
pub async fn convert_to_file(
    request: &ConversionRequest,
    output_path: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<ConversionResult, MarkdownifyError> {
    let output = convert(request, config).await?;
    let path = output_path.as_ref();

    let write_failed = |e: std::io::Error| MarkdownifyError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, &output.text)
        .await
        .map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(write_failed)?;

    if let Err(e) = tokio::fs::remove_file(&output.path).await {
        warn!("Could not remove {}: {}", output.path.display(), e);
    }

    Ok(ConversionResult {
        path: path.to_path_buf(),
        text: output.text,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally; do not call from async code.
pub fn convert_sync(
    request: &ConversionRequest,
    config: &ConverterConfig,
) -> Result<ConversionResult, MarkdownifyError> {
    tokio::runtime::Runtime::new()
        .map_err(MarkdownifyError::Io)?
        .block_on(convert(request, config))
}

/// Read a Markdown file, honouring `config.share_dir`.
pub async fn read_markdown(
    path: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<MarkdownDocument, MarkdownifyError> {
    read_markdown_file(path.as_ref(), config.share_dir.as_deref()).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Use the injected backend if there is one, otherwise markitdown.
fn resolve_backend(config: &ConverterConfig) -> Arc<dyn MarkdownBackend> {
    match config.backend {
        Some(ref backend) => Arc::clone(backend),
        None => Arc::new(MarkitdownBackend::from_config(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl MarkdownBackend for Echo {
        async fn convert(&self, input: &Path) -> Result<String, MarkdownifyError> {
            Ok(tokio::fs::read_to_string(input).await?)
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn config_in(dir: &Path) -> ConverterConfig {
        ConverterConfig::builder()
            .temp_dir(dir)
            .backend(Arc::new(Echo))
            .build()
            .unwrap()
    }

    #[test]
    fn injected_backend_wins() {
        let dir = tempfile::tempdir().unwrap();
        let converter = DocumentConverter::new(config_in(dir.path()));
        assert_eq!(converter.backend.name(), "echo");
        assert!(format!("{converter:?}").contains("echo"));
    }

    #[test]
    fn default_backend_is_markitdown() {
        let converter = DocumentConverter::new(ConverterConfig::default());
        assert_eq!(converter.backend.name(), "markitdown");
    }

    #[test]
    fn request_overrides_replace_backend() {
        let dir = tempfile::tempdir().unwrap();
        let converter = DocumentConverter::new(config_in(dir.path()));
        let req = ConversionRequest::file("a.pdf").with_project_root("/elsewhere");
        assert_eq!(converter.backend_for(&req).name(), "markitdown");
        assert_eq!(
            converter.backend_for(&ConversionRequest::file("a.pdf")).name(),
            "echo"
        );
    }

    #[tokio::test]
    async fn errors_are_wrapped_once() {
        let dir = tempfile::tempdir().unwrap();
        let converter = DocumentConverter::new(config_in(dir.path()));
        let err = converter
            .convert_to_markdown(&ConversionRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MarkdownifyError::Conversion { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err
            .to_string()
            .contains("Error processing to Markdown: Invalid input"));
    }

    #[tokio::test]
    async fn local_file_round_trip_leaves_input_alone() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.html");
        std::fs::write(&input, "<h1>Hi</h1>").unwrap();

        let converter = DocumentConverter::new(config_in(dir.path()));
        let result = converter
            .convert_to_markdown(&ConversionRequest::file(&input))
            .await
            .unwrap();

        assert_eq!(result.text, "<h1>Hi</h1>");
        assert!(input.exists(), "caller-owned input must survive");
        assert_eq!(std::fs::read_to_string(&result.path).unwrap(), result.text);
        assert_eq!(result.path.extension().unwrap(), "md");
        assert!(result.path.starts_with(dir.path()));
    }

    #[tokio::test]
    async fn convert_to_file_moves_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "plain").unwrap();
        let dest = dir.path().join("nested/out.md");

        let result = convert_to_file(&ConversionRequest::file(&input), &dest, &config_in(dir.path()))
            .await
            .unwrap();

        assert_eq!(result.path, dest);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "plain");
        assert!(!dest.with_extension("md.tmp").exists());
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(temp::TEMP_PREFIX))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn convert_sync_runs_outside_async() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "sync").unwrap();
        let result = convert_sync(&ConversionRequest::file(&input), &config_in(dir.path())).unwrap();
        assert_eq!(result.text, "sync");
    }
}
