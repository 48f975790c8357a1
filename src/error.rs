//! Error types for the visionary-text library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`VisionError`] — the request never left the process: a validation
//!   guard tripped (oversized file, no image, nothing to ask about), a local
//!   file could not be read, or the service could not be set up. The
//!   `Display` text of the validation variants is exactly the notice the
//!   user sees.
//!
//! * [`ServiceError`] — the request was issued but the call itself failed
//!   (transport error, unparseable body, provider error). The controller
//!   folds these into the same path as a `success: false` response, so a
//!   caller never has to treat them as fatal.

use std::path::PathBuf;
use thiserror::Error;

/// All client-side errors returned by the visionary-text library.
#[derive(Debug, Error)]
pub enum VisionError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// The selected file exceeds the upload limit.
    #[error("File is too large. Please upload an image under {limit_mib}MB.")]
    FileTooLarge {
        name: String,
        size: u64,
        limit_mib: u64,
    },

    /// The selected file is not a PNG, JPEG or WEBP image.
    #[error("Unsupported image '{name}'. Please upload a PNG, JPG or WEBP image.")]
    UnsupportedImage { name: String },

    /// OCR was requested with neither a file nor a URL selected.
    #[error("Please upload an image or provide a URL.")]
    MissingImageSource,

    /// Ask-AI was requested before any text was extracted.
    #[error("No text to ask about. Perform OCR first.")]
    NoExtractedText,

    /// The same or a competing request is still running.
    #[error("Please wait: {action} is still in progress.")]
    RequestInFlight { action: &'static str },

    // ── File errors ───────────────────────────────────────────────────────
    /// Image file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure while reading the image.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The system clipboard refused the copy.
    #[error("Could not copy to clipboard: {0}")]
    ClipboardUnavailable(String),

    // ── Setup errors ──────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VisionError {
    /// True for the guard failures that are surfaced as a notice and leave
    /// the page state untouched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            VisionError::FileTooLarge { .. }
                | VisionError::UnsupportedImage { .. }
                | VisionError::MissingImageSource
                | VisionError::NoExtractedText
                | VisionError::RequestInFlight { .. }
        )
    }
}

/// A failed call to an [`crate::service::OcrService`].
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// The HTTP request could not be sent or the connection dropped.
    #[error("Request to '{url}' failed: {reason}")]
    Http { url: String, reason: String },

    /// The server answered with a non-success status and no usable envelope.
    #[error("Service returned HTTP {status}")]
    Status { status: u16 },

    /// The body could not be decoded as a response envelope.
    #[error("Invalid response from service: {0}")]
    InvalidResponse(String),

    /// The LLM provider returned an error.
    #[error("{message}")]
    Llm { message: String },

    /// An image URL could not be fetched.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// An image URL download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// An image URL served more than the upload limit.
    #[error("Image at '{url}' is too large. Please use an image under {limit_mib}MB.")]
    DownloadTooLarge { url: String, limit_mib: u64 },

    /// The bytes behind an image URL are not a supported image.
    #[error("'{url}' does not point to a PNG, JPEG or WEBP image")]
    NotAnImage { url: String },
}
