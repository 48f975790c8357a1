//! The external OCR / assistant service the page talks to.
//!
//! The page controller only knows the [`OcrService`] trait. Two backends
//! ship with the crate:
//!
//! ```text
//!                 ┌─▶ HttpOcrService  POST {endpoint}/api/ocr, /api/ask
//! PageController ─┤
//!                 └─▶ LlmOcrService   edgequake-llm vision provider
//! ```
//!
//! Both answer with the same [`ServiceResponse`] envelope, so a remote
//! worker and a local provider are interchangeable. [`from_config`] picks
//! one: an `endpoint` selects HTTP, otherwise an LLM provider is resolved.

pub mod http;
pub mod llm;

pub use http::HttpOcrService;
pub use llm::LlmOcrService;

use crate::config::VisionConfig;
use crate::error::{ServiceError, VisionError};
use async_trait::async_trait;
use edgequake_llm::{LLMProvider, ProviderFactory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Response envelope shared by every backend.
///
/// `success: true` carries `data`; `success: false` carries `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ServiceResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ServiceResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// The payload when the call succeeded, otherwise the reported error
    /// (which may be absent).
    pub fn into_result(self) -> Result<T, Option<String>> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.error.filter(|e| !e.is_empty())),
        }
    }
}

/// Payload of a successful OCR call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrData {
    pub text: String,
}

/// Payload of a successful Ask-AI call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiData {
    pub response: String,
}

/// Client for the remote OCR and assistant operations.
///
/// `Err` means the call itself broke (transport, decoding, provider
/// failure); a service that answered but could not do the work returns
/// `Ok` with `success: false`.
#[async_trait]
pub trait OcrService: Send + Sync {
    /// Extract text from an image given as base64 bytes and/or a URL.
    async fn perform_ocr(
        &self,
        image_data: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<ServiceResponse<OcrData>, ServiceError>;

    /// Ask the assistant about previously extracted text.
    async fn ask_ai(&self, text: &str) -> Result<ServiceResponse<AiData>, ServiceError>;

    /// Short backend name for logs, e.g. "http" or "openai/gpt-4.1-nano".
    fn name(&self) -> String;
}

/// Build the service described by `config`.
pub fn from_config(config: &VisionConfig) -> Result<Arc<dyn OcrService>, VisionError> {
    if let Some(ref endpoint) = config.endpoint {
        info!("Using remote OCR service at {}", endpoint);
        return Ok(Arc::new(HttpOcrService::new(endpoint)?));
    }

    let provider = resolve_provider(config)?;
    let service = LlmOcrService::new(provider, config)?;
    info!("Using LLM OCR service: {}", service.name());
    Ok(Arc::new(service))
}

// ── Provider resolution ──────────────────────────────────────────────────

const DEFAULT_MODEL: &str = "gpt-4.1-nano";

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, VisionError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        VisionError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is.
/// 2. **Named provider + model** (`config.provider_name`) — API key read
///    from the provider's usual environment variable.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **OpenAI** when `OPENAI_API_KEY` is set, so users with several keys
///    get a predictable default.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &VisionConfig) -> Result<Arc<dyn LLMProvider>, VisionError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_vision_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| VisionError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --endpoint.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_parses() {
        let r: ServiceResponse<OcrData> =
            serde_json::from_str(r#"{"success":true,"data":{"text":"Hello World"}}"#).unwrap();
        assert_eq!(
            r.into_result(),
            Ok(OcrData {
                text: "Hello World".into()
            })
        );
    }

    #[test]
    fn envelope_failure_parses() {
        let r: ServiceResponse<AiData> =
            serde_json::from_str(r#"{"success":false,"error":"rate limited"}"#).unwrap();
        assert_eq!(r.into_result(), Err(Some("rate limited".to_string())));
    }

    #[test]
    fn success_without_data_is_a_failure() {
        let r: ServiceResponse<OcrData> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(r.into_result(), Err(None));
    }

    #[test]
    fn empty_error_string_counts_as_absent() {
        let r: ServiceResponse<OcrData> = ServiceResponse::failure("");
        assert_eq!(r.into_result(), Err(None));
    }

    #[test]
    fn envelope_serialises_without_nulls() {
        let json = serde_json::to_string(&ServiceResponse::ok(AiData {
            response: "hi".into(),
        }))
        .unwrap();
        assert_eq!(json, r#"{"success":true,"data":{"response":"hi"}}"#);
    }

    #[test]
    fn endpoint_selects_http_backend() {
        let config = VisionConfig::builder()
            .endpoint("https://ocr.example.com")
            .build()
            .unwrap();
        let service = from_config(&config).unwrap();
        assert_eq!(service.name(), "http:https://ocr.example.com");
    }
}
