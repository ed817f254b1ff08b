//! CLI binary for markdownify.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConverterConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use markdownify::{
    convert_to_file, ConversionRequest, ConverterConfig, DocumentConverter, StderrPolicy,
};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a local document (stdout)
  markdownify convert report.docx

  # Convert a URL and write the Markdown to a file
  markdownify convert https://arxiv.org/pdf/1706.03762.pdf -o attention.md

  # Print the conversion result (temp file path + text) as JSON
  markdownify convert slides.pptx --json

  # Read a Markdown file from the shared directory
  MD_SHARE_DIR=~/notes markdownify read ~/notes/todo.md

SETUP:
  markitdown must be installed in <project-root>/.venv, e.g.
    uv venv && uv pip install 'markitdown[all]'
  It is started as: <uv-path> run <project-root>/.venv/bin/markitdown <input>

ENVIRONMENT VARIABLES:
  MD_SHARE_DIR              Only allow `read` inside this directory
  MARKDOWNIFY_PROJECT_ROOT  Directory containing the markitdown .venv
  MARKDOWNIFY_UV_PATH       Path to the uv executable (default ~/.local/bin/uv)
  RUST_LOG                  Override log filter (e.g. markdownify=debug)
"#;

/// Convert documents and URLs to Markdown with markitdown.
#[derive(Parser, Debug)]
#[command(
    name = "markdownify",
    version,
    about = "Convert documents and URLs to Markdown with markitdown",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory containing the `.venv` that provides markitdown.
    #[arg(long, global = true, env = "MARKDOWNIFY_PROJECT_ROOT", default_value = ".")]
    project_root: PathBuf,

    /// Path to the uv runner.
    #[arg(long, global = true, env = "MARKDOWNIFY_UV_PATH", default_value = "~/.local/bin/uv")]
    uv_path: PathBuf,

    /// Only allow reading Markdown files inside this directory.
    /// An empty value leaves reads unrestricted.
    #[arg(
        long,
        global = true,
        env = "MD_SHARE_DIR",
        value_parser = clap::builder::OsStringValueParser::new()
    )]
    share_dir: Option<OsString>,

    /// HTTP download timeout in seconds.
    #[arg(long, global = true, env = "MARKDOWNIFY_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Kill markitdown after this many seconds.
    #[arg(long, global = true, env = "MARKDOWNIFY_TOOL_TIMEOUT")]
    tool_timeout: Option<u64>,

    /// Log markitdown's stderr instead of failing on it.
    #[arg(long, global = true, env = "MARKDOWNIFY_ALLOW_STDERR")]
    allow_stderr: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "MARKDOWNIFY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "MARKDOWNIFY_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a local file or HTTP/HTTPS URL to Markdown.
    Convert(ConvertArgs),
    /// Print a Markdown file.
    Read(ReadArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Local file path or HTTP/HTTPS URL.
    source: String,

    /// Write Markdown to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the result (path and text) as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ReadArgs {
    /// Path to a .md or .markdown file. A leading `~` is expanded.
    path: PathBuf,

    /// Print the document (path, resolved path, text) as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    match &cli.command {
        Command::Convert(args) => run_convert(args, &config, cli.quiet).await,
        Command::Read(args) => run_read(args, &config).await,
    }
}

async fn run_convert(args: &ConvertArgs, config: &ConverterConfig, quiet: bool) -> Result<()> {
    let request = ConversionRequest::from_source_str(&args.source);

    if let Some(ref output_path) = args.output {
        let result = convert_to_file(&request, output_path, config)
            .await
            .context("Conversion failed")?;
        if args.json {
            print_json(&result)?;
        } else if !quiet {
            eprintln!("Wrote {} bytes to {}", result.text.len(), result.path.display());
        }
        return Ok(());
    }

    let result = DocumentConverter::new(config.clone())
        .convert_to_markdown(&request)
        .await
        .context("Conversion failed")?;

    if args.json {
        print_json(&result)?;
    } else {
        write_stdout(&result.text)?;
        if !quiet {
            eprintln!("Saved to {}", result.path.display());
        }
    }
    Ok(())
}

async fn run_read(args: &ReadArgs, config: &ConverterConfig) -> Result<()> {
    let doc = DocumentConverter::new(config.clone())
        .read_markdown(&args.path)
        .await
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    if args.json {
        print_json(&doc)?;
    } else {
        write_stdout(&doc.text)?;
    }
    Ok(())
}

/// Map CLI args to `ConverterConfig`.
fn build_config(cli: &Cli) -> Result<ConverterConfig> {
    let mut builder = ConverterConfig::builder()
        .project_root(&cli.project_root)
        .uv_path(&cli.uv_path)
        .download_timeout_secs(cli.download_timeout);

    if let Some(dir) = cli.share_dir.as_ref().filter(|d| !d.is_empty()) {
        builder = builder.share_dir(dir);
    }
    if let Some(secs) = cli.tool_timeout {
        builder = builder.tool_timeout_secs(secs);
    }
    if cli.allow_stderr {
        builder = builder.stderr_policy(StderrPolicy::Warn);
    }

    builder.build().context("Invalid configuration")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise output")?;
    println!("{json}");
    Ok(())
}

fn write_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    // Ensure a trailing newline on stdout.
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}
