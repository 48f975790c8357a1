//! Configuration types for the page controller and its OCR service.
//!
//! Every knob lives in [`VisionConfig`], built via its
//! [`VisionConfigBuilder`]. The controller reads the upload limit and the
//! copy-confirmation window; [`crate::service::from_config`] reads the rest
//! to decide which service backs the page.

use crate::error::VisionError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Largest accepted upload: 4 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 4 * 1024 * 1024;

/// How long the copy confirmation stays visible.
pub const DEFAULT_COPY_CONFIRMATION_MS: u64 = 2000;

/// Configuration for a [`crate::controller::PageController`] and the
/// service it talks to.
///
/// # Example
/// ```rust
/// use visionary_text::VisionConfig;
///
/// let config = VisionConfig::builder()
///     .model("gpt-4.1-mini")
///     .temperature(0.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_upload_bytes, 4 * 1024 * 1024);
/// ```
#[derive(Clone)]
pub struct VisionConfig {
    /// Maximum accepted file size in bytes. Default: 4 MiB.
    pub max_upload_bytes: u64,

    /// Copy-confirmation window in milliseconds. Default: 2000.
    pub copy_confirmation_ms: u64,

    /// Base URL of a remote OCR worker exposing `/api/ocr` and `/api/ask`.
    ///
    /// When set, the HTTP service is used and every LLM field below is ignored.
    pub endpoint: Option<String>,

    /// LLM model identifier, e.g. "gpt-4.1-nano".
    /// If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.1.
    ///
    /// Transcription wants the model to be faithful to what it sees, so the
    /// default stays close to zero.
    pub temperature: f32,

    /// Maximum tokens generated per call. Default: 4096.
    pub max_tokens: usize,

    /// Custom OCR system prompt. If None, uses [`crate::prompts::OCR_SYSTEM_PROMPT`].
    pub ocr_prompt: Option<String>,

    /// Custom assistant system prompt. If None, uses
    /// [`crate::prompts::ASSISTANT_SYSTEM_PROMPT`].
    pub assistant_prompt: Option<String>,

    /// Timeout for fetching URL images in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            copy_confirmation_ms: DEFAULT_COPY_CONFIRMATION_MS,
            endpoint: None,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 4096,
            ocr_prompt: None,
            assistant_prompt: None,
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionConfig")
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("copy_confirmation_ms", &self.copy_confirmation_ms)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl VisionConfig {
    /// Create a new builder for `VisionConfig`.
    pub fn builder() -> VisionConfigBuilder {
        VisionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The copy-confirmation window as a `Duration`.
    pub fn copy_confirmation(&self) -> Duration {
        Duration::from_millis(self.copy_confirmation_ms)
    }

    /// Upload limit rounded up to whole MiB, as shown to the user.
    pub fn max_upload_mib(&self) -> u64 {
        self.max_upload_bytes.div_ceil(1024 * 1024)
    }
}

/// Builder for [`VisionConfig`].
#[derive(Debug)]
pub struct VisionConfigBuilder {
    config: VisionConfig,
}

impl VisionConfigBuilder {
    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn copy_confirmation_ms(mut self, ms: u64) -> Self {
        self.config.copy_confirmation_ms = ms;
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = Some(url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn ocr_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.ocr_prompt = Some(prompt.into());
        self
    }

    pub fn assistant_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.assistant_prompt = Some(prompt.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<VisionConfig, VisionError> {
        let c = &self.config;
        if c.max_upload_bytes == 0 {
            return Err(VisionError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(VisionError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if let Some(ref endpoint) = c.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(VisionError::InvalidConfig(format!(
                    "Endpoint must be an HTTP/HTTPS URL, got '{}'",
                    endpoint
                )));
            }
        }
        Ok(self.config)
    }
}
