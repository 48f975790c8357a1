//! CLI binary for visionary-text.
//!
//! A thin shim over the library crate: maps CLI flags to `VisionConfig`,
//! drives one `PageController` through select → OCR → (ask) → (copy), and
//! prints the resulting view.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use visionary_text::source::is_url;
use visionary_text::{
    render_icon, service, Notice, NoticeLevel, PageController, PageObserver, PageView,
    RequestKind, ResultPanel, VisionConfig,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Spinner observer ─────────────────────────────────────────────────────────

/// Shows a spinner while a request is in flight.
struct SpinnerObserver {
    bar: ProgressBar,
}

impl SpinnerObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::hidden();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        Arc::new(Self { bar })
    }
}

impl PageObserver for SpinnerObserver {
    fn on_request_start(&self, kind: RequestKind) {
        self.bar.reset();
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
        self.bar.set_message(match kind {
            RequestKind::Ocr => "Extracting Text...",
            RequestKind::AskAi => "AI is thinking...",
        });
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_request_complete(&self, _kind: RequestKind, _success: bool) {
        self.bar.finish_and_clear();
    }
}

/// Upper bound for `--max-upload-mib`.
const MAX_UPLOAD_MIB: u64 = 1024;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract text from a local image (stdout)
  visionary receipt.jpg

  # Extract text from a URL and ask the assistant about it
  visionary https://example.com/sign.png --ask

  # Copy the extracted text to the clipboard
  visionary scan.webp --copy

  # Use a remote OCR worker instead of a local LLM provider
  visionary --endpoint https://ocr.example.com scan.png

  # JSON output (page view + notices)
  visionary --json scan.png > out.json

  # Print one of the page icons as SVG
  visionary --icon magic-wand

ACCEPTED IMAGES:
  PNG, JPG, WEBP up to 4MB (change with --max-upload-mib).

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  VISIONARY_ENDPOINT      Remote OCR worker base URL

AI responses may be inaccurate or inappropriate. Please verify important
information. Remote services may limit the number of requests.
"#;

/// Extract text from images or image URLs and ask an AI assistant about it.
#[derive(Parser, Debug)]
#[command(
    name = "visionary",
    version,
    about = "Extract text from images or image URLs, then ask an AI assistant about it",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local image path (PNG/JPG/WEBP) or HTTP/HTTPS image URL.
    #[arg(required_unless_present = "icon")]
    input: Option<String>,

    /// Ask the AI assistant about the extracted text.
    #[arg(long, env = "VISIONARY_ASK")]
    ask: bool,

    /// Copy the extracted text to the system clipboard.
    #[arg(long)]
    copy: bool,

    /// Output the final page view and notices as JSON.
    #[arg(long, env = "VISIONARY_JSON")]
    json: bool,

    /// Print an icon (magic-wand, document) as SVG and exit.
    #[arg(long, value_name = "NAME")]
    icon: Option<String>,

    /// Remote OCR worker base URL (uses /api/ocr and /api/ask).
    #[arg(long, env = "VISIONARY_ENDPOINT")]
    endpoint: Option<String>,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "VISIONARY_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, env = "VISIONARY_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Path to a text file containing a custom OCR system prompt.
    #[arg(long, env = "VISIONARY_OCR_PROMPT")]
    ocr_prompt: Option<PathBuf>,

    /// Path to a text file containing a custom assistant system prompt.
    #[arg(long, env = "VISIONARY_ASSISTANT_PROMPT")]
    assistant_prompt: Option<PathBuf>,

    /// Upload size limit in MiB.
    #[arg(long, env = "VISIONARY_MAX_UPLOAD_MIB", default_value_t = 4,
          value_parser = clap::value_parser!(u64).range(1..=MAX_UPLOAD_MIB))]
    max_upload_mib: u64,

    /// HTTP download timeout in seconds for URL images.
    #[arg(long, env = "VISIONARY_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable the spinner.
    #[arg(long, env = "VISIONARY_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "VISIONARY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "VISIONARY_QUIET")]
    quiet: bool,
}

#[derive(Serialize)]
struct JsonOutput {
    view: PageView,
    notices: Vec<Notice>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and notices cover normal feedback; library logs stay at
    // WARN unless asked for.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Icon mode ────────────────────────────────────────────────────────
    if let Some(ref name) = cli.icon {
        return match render_icon(name, &[]) {
            Some(svg) => {
                println!("{svg}");
                Ok(ExitCode::SUCCESS)
            }
            None => anyhow::bail!("Unknown icon '{}' (expected magic-wand or document)", name),
        };
    }
    let input = cli
        .input
        .clone()
        .context("An image path or URL is required")?;

    // ── Build controller ─────────────────────────────────────────────────
    let config = build_config(&cli).await?;
    let service = service::from_config(&config).context("Failed to set up OCR service")?;
    let mut page = PageController::new(service, config);
    if !cli.quiet && !cli.no_progress && !cli.json {
        page = page.with_observer(SpinnerObserver::new());
    }

    let mut notices = Vec::new();

    // ── Select image ─────────────────────────────────────────────────────
    let selected = if is_url(&input) {
        page.set_url(&input);
        Ok(())
    } else {
        page.load_file(&input).await
    };
    drain(&mut page, &mut notices, &cli);
    if selected.is_err() {
        return finish(&page, notices, &cli, ExitCode::FAILURE);
    }

    // ── OCR ──────────────────────────────────────────────────────────────
    let ocr = page.perform_ocr().await;
    drain(&mut page, &mut notices, &cli);
    if ocr.is_err() || page.state().error.is_some() {
        return finish(&page, notices, &cli, ExitCode::FAILURE);
    }

    // ── Ask AI ───────────────────────────────────────────────────────────
    let mut code = ExitCode::SUCCESS;
    if cli.ask {
        let asked = page.ask_ai().await;
        drain(&mut page, &mut notices, &cli);
        if asked.is_err() || page.state().ai_response.is_empty() {
            code = ExitCode::FAILURE;
        }
    }

    // ── Copy ─────────────────────────────────────────────────────────────
    if cli.copy && copy(&mut page, &cli).is_err() {
        code = ExitCode::FAILURE;
    }
    drain(&mut page, &mut notices, &cli);

    finish(&page, notices, &cli, code)
}

#[cfg(feature = "clipboard")]
fn copy(page: &mut PageController, cli: &Cli) -> Result<(), visionary_text::VisionError> {
    // The process exits right after this; hold the contents until another
    // application (or a clipboard manager) has taken them.
    let mut clipboard = visionary_text::clipboard::SystemClipboard::waiting();
    if clipboard.waits_for_handoff() && !cli.quiet && !cli.json {
        eprintln!("{}", dim("• Waiting for the clipboard to be pasted (Ctrl+C to abort)..."));
    }
    page.copy_result(&mut clipboard)
}

#[cfg(not(feature = "clipboard"))]
fn copy(_page: &mut PageController, _cli: &Cli) -> Result<(), visionary_text::VisionError> {
    eprintln!("{}", red("✗ This build has no clipboard support (enable the `clipboard` feature)."));
    Err(visionary_text::VisionError::ClipboardUnavailable(
        "built without clipboard support".into(),
    ))
}

/// Move pending notices out of the controller, printing them unless in JSON mode.
fn drain(page: &mut PageController, sink: &mut Vec<Notice>, cli: &Cli) {
    for notice in page.take_notices() {
        if !cli.json && (!cli.quiet || notice.is_error()) {
            print_notice(&notice);
        }
        sink.push(notice);
    }
}

fn print_notice(notice: &Notice) {
    let line = match notice.level {
        NoticeLevel::Success => format!("{} {}", green("✔"), notice.message),
        NoticeLevel::Info => format!("{} {}", dim("•"), notice.message),
        NoticeLevel::Warning => format!("{} {}", yellow("⚠"), notice.message),
        NoticeLevel::Error => format!("{} {}", red("✘"), red(&notice.message)),
    };
    eprintln!("{line}");
}

/// Render the final view and pick the exit code.
fn finish(
    page: &PageController,
    notices: Vec<Notice>,
    cli: &Cli,
    code: ExitCode,
) -> Result<ExitCode> {
    let view = page.view();

    if cli.json {
        let out = JsonOutput { view, notices };
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("Failed to serialise output")?
        );
        return Ok(code);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match view.result_panel {
        ResultPanel::Text(ref text) => {
            handle
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
        // Already reported through the error notice.
        ResultPanel::Error(_) | ResultPanel::Loading | ResultPanel::Placeholder(_) => {}
    }

    if let Some(ref response) = view.ai_response {
        writeln!(handle, "\n{}\n{}", bold("AI Assistant:"), response)
            .context("Failed to write to stdout")?;
    }

    Ok(code)
}

/// Map CLI args to `VisionConfig`.
async fn build_config(cli: &Cli) -> Result<VisionConfig> {
    let max_upload_bytes = cli
        .max_upload_mib
        .checked_mul(1024 * 1024)
        .context("--max-upload-mib is too large")?;
    let mut builder = VisionConfig::builder()
        .max_upload_bytes(max_upload_bytes)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref endpoint) = cli.endpoint {
        builder = builder.endpoint(endpoint.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref path) = cli.ocr_prompt {
        builder = builder.ocr_prompt(read_prompt(path).await?);
    }
    if let Some(ref path) = cli.assistant_prompt {
        builder = builder.assistant_prompt(read_prompt(path).await?);
    }

    builder.build().context("Invalid configuration")
}

async fn read_prompt(path: &PathBuf) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read prompt from {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_limit_flag_is_bounded() {
        let err = Cli::try_parse_from(["visionary", "--max-upload-mib", "17592186044416", "a.png"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(Cli::try_parse_from(["visionary", "--max-upload-mib", "0", "a.png"]).is_err());
    }

    #[tokio::test]
    async fn upload_limit_flag_maps_to_bytes() {
        let cli = Cli::try_parse_from(["visionary", "--max-upload-mib", "1024", "a.png"]).unwrap();
        let config = build_config(&cli).await.unwrap();
        assert_eq!(config.max_upload_bytes, 1024 * 1024 * 1024);
        assert_eq!(config.max_upload_mib(), 1024);
    }
}
