//! # visionary-text
//!
//! Extract text from an image (uploaded file or URL) with an OCR service,
//! then optionally ask an AI assistant about it.
//!
//! ## Flow
//!
//! ```text
//! file / URL
//!  │
//!  ├─ 1. Select   validate type + 4 MiB limit, build data-URL preview
//!  ├─ 2. OCR      base64 payload or URL → OcrService::perform_ocr
//!  ├─ 3. Show     PageView projection (loading / error / text)
//!  ├─ 4. Ask AI   extracted text → OcrService::ask_ai
//!  └─ 5. Copy     extracted text → clipboard, 2 s confirmation
//! ```
//!
//! All state lives in [`PageState`], mutated only through
//! [`PageController`] commands. Rendering is a separate, pure step:
//! [`PageView::project`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use visionary_text::{service, PageController, VisionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = VisionConfig::default();
//!     let service = service::from_config(&config)?;
//!     let mut page = PageController::new(service, config);
//!
//!     page.load_file("receipt.jpg").await?;
//!     page.perform_ocr().await?;
//!     println!("{}", page.state().ocr_result);
//!
//!     page.ask_ai().await?;
//!     println!("{}", page.state().ai_response);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature     | Default | Description |
//! |-------------|---------|-------------|
//! | `cli`       | on      | Enables the `visionary` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `clipboard` | on      | [`clipboard::SystemClipboard`] via arboard |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod icon;
pub mod notice;
pub mod postprocess;
pub mod prompts;
pub mod service;
pub mod source;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use clipboard::{ClipboardError, ClipboardSink, MemoryClipboard};
pub use config::{VisionConfig, VisionConfigBuilder};
pub use controller::{AskRequest, OcrRequest, PageController, PageState};
pub use error::{ServiceError, VisionError};
pub use icon::{render_icon, IconName};
pub use notice::{Notice, NoticeLevel, NoopObserver, PageObserver, RequestKind};
pub use service::{AiData, OcrData, OcrService, ServiceResponse};
pub use source::{ImageKind, ImageSource, UploadedFile};
pub use view::{ButtonIcon, ButtonView, PageView, ResultPanel};
