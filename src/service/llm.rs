//! [`OcrService`] backed directly by a vision-capable LLM.
//!
//! OCR sends the image as an attachment under a transcription prompt; the
//! answer is cleaned by [`crate::postprocess::clean_transcript`]. Ask-AI is
//! a plain two-message chat. All prompt text lives in [`crate::prompts`].
//!
//! URL images are downloaded here and checked against the accepted
//! encodings before they are attached.

use super::{AiData, OcrData, OcrService, ServiceResponse};
use crate::config::VisionConfig;
use crate::error::{ServiceError, VisionError};
use crate::postprocess::clean_transcript;
use crate::prompts::{assistant_user_message, ASSISTANT_SYSTEM_PROMPT, OCR_SYSTEM_PROMPT};
use crate::source::ImageKind;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Calls an edgequake-llm provider for both operations.
pub struct LlmOcrService {
    provider: Arc<dyn LLMProvider>,
    http: reqwest::Client,
    options: CompletionOptions,
    ocr_prompt: String,
    assistant_prompt: String,
    download_timeout_secs: u64,
    max_download_bytes: u64,
    label: String,
}

impl LlmOcrService {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &VisionConfig) -> Result<Self, VisionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .map_err(|e| VisionError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            provider,
            http,
            options: build_options(config),
            ocr_prompt: config
                .ocr_prompt
                .clone()
                .unwrap_or_else(|| OCR_SYSTEM_PROMPT.to_string()),
            assistant_prompt: config
                .assistant_prompt
                .clone()
                .unwrap_or_else(|| ASSISTANT_SYSTEM_PROMPT.to_string()),
            download_timeout_secs: config.download_timeout_secs,
            max_download_bytes: config.max_upload_bytes,
            label: format!(
                "{}/{}",
                config.provider_name.as_deref().unwrap_or("auto"),
                config.model.as_deref().unwrap_or("default")
            ),
        })
    }

    /// Turn the request payload into an attachment, downloading if needed.
    async fn image_attachment(
        &self,
        image_data: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Result<ImageData, String>, ServiceError> {
        if let Some(b64) = image_data {
            let bytes = match STANDARD.decode(b64) {
                Ok(bytes) => bytes,
                Err(e) => return Ok(Err(format!("Invalid image payload: {}", e))),
            };
            return Ok(match ImageKind::sniff(&bytes) {
                Some(kind) => Ok(attachment(b64.to_string(), kind)),
                None => Err("Unsupported image format. Use PNG, JPEG or WEBP.".to_string()),
            });
        }

        if let Some(url) = image_url.filter(|u| !u.is_empty()) {
            let (bytes, kind) = download_image(
                &self.http,
                url,
                self.download_timeout_secs,
                self.max_download_bytes,
            )
            .await?;
            return Ok(Ok(attachment(STANDARD.encode(&bytes), kind)));
        }

        Ok(Err("No image provided.".to_string()))
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ServiceError> {
        let start = Instant::now();
        match self.provider.chat(messages, Some(&self.options)).await {
            Ok(response) => {
                debug!(
                    "{} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                Ok(response.content)
            }
            Err(e) => {
                let message = format!("{}", e);
                warn!("LLM call failed — {}", message);
                Err(ServiceError::Llm { message })
            }
        }
    }
}

/// Fetch an image URL, refusing bodies over `max_bytes`.
///
/// The declared `Content-Length` is checked first; the body is then read
/// chunk by chunk so an undeclared or lying length is still capped.
async fn download_image(
    http: &reqwest::Client,
    url: &str,
    timeout_secs: u64,
    max_bytes: u64,
) -> Result<(Vec<u8>, ImageKind), ServiceError> {
    info!("Downloading image from: {}", url);

    let transport = |e: reqwest::Error| {
        if e.is_timeout() {
            ServiceError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ServiceError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };
    let too_large = || ServiceError::DownloadTooLarge {
        url: url.to_string(),
        limit_mib: max_bytes.div_ceil(1024 * 1024),
    };

    let mut response = http.get(url).send().await.map_err(transport)?;

    if !response.status().is_success() {
        return Err(ServiceError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }
    if response.content_length().is_some_and(|len| len > max_bytes) {
        return Err(too_large());
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(transport)? {
        if (bytes.len() + chunk.len()) as u64 > max_bytes {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }

    let kind = ImageKind::sniff(&bytes).ok_or_else(|| ServiceError::NotAnImage {
        url: url.to_string(),
    })?;
    debug!("Downloaded {} bytes ({:?})", bytes.len(), kind);
    Ok((bytes, kind))
}

fn attachment(b64: String, kind: ImageKind) -> ImageData {
    ImageData::new(b64, kind.mime_type()).with_detail("high")
}

/// Build `CompletionOptions` from the config.
fn build_options(config: &VisionConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[async_trait]
impl OcrService for LlmOcrService {
    async fn perform_ocr(
        &self,
        image_data: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<ServiceResponse<OcrData>, ServiceError> {
        let image = match self.image_attachment(image_data, image_url).await? {
            Ok(image) => image,
            Err(reason) => return Ok(ServiceResponse::failure(reason)),
        };

        let messages = vec![
            ChatMessage::system(self.ocr_prompt.as_str()),
            ChatMessage::user_with_images("", vec![image]),
        ];
        let raw = self.chat(&messages).await?;
        let text = clean_transcript(&raw);

        if text.is_empty() {
            return Ok(ServiceResponse::failure("No text found in the image."));
        }
        Ok(ServiceResponse::ok(OcrData { text }))
    }

    async fn ask_ai(&self, text: &str) -> Result<ServiceResponse<AiData>, ServiceError> {
        let messages = vec![
            ChatMessage::system(self.assistant_prompt.as_str()),
            ChatMessage::user(assistant_user_message(text)),
        ];
        let response = self.chat(&messages).await?;
        let response = response.trim().to_string();

        if response.is_empty() {
            return Ok(ServiceResponse::failure("The assistant returned an empty answer."));
        }
        Ok(ServiceResponse::ok(AiData { response }))
    }

    fn name(&self) -> String {
        self.label.clone()
    }
}
