//! JSON-over-HTTP client for a remote OCR worker.
//!
//! Wire format:
//!
//! ```text
//! POST {endpoint}/api/ocr   {"image": "<base64>"?, "imageUrl": "<url>"?}
//! POST {endpoint}/api/ask   {"text": "<extracted text>"}
//! → {"success": bool, "data": {...}?, "error": "..."?}
//! ```
//!
//! The worker reports its own failures inside the envelope, often with a
//! 4xx/5xx status. The envelope is therefore parsed regardless of status
//! and the status only matters when the body is not an envelope.

use super::{AiData, OcrData, OcrService, ServiceResponse};
use crate::error::{ServiceError, VisionError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OcrRequestBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

#[derive(Serialize)]
struct AskRequestBody<'a> {
    text: &'a str,
}

/// [`OcrService`] backed by a remote worker.
#[derive(Debug, Clone)]
pub struct HttpOcrService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOcrService {
    /// Create a client for `endpoint` (scheme + host, optional path prefix).
    ///
    /// No request timeout is set: the worker is trusted to answer or fail.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| VisionError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Reuse an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<ServiceResponse<T>, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.endpoint, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Http {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| ServiceError::Http {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        debug!("{} → HTTP {} ({} bytes)", url, status, bytes.len());

        match serde_json::from_slice::<ServiceResponse<T>>(&bytes) {
            Ok(envelope) => Ok(envelope),
            Err(e) if status.is_success() => Err(ServiceError::InvalidResponse(e.to_string())),
            Err(_) => {
                warn!("{} answered HTTP {} without an envelope", url, status);
                Err(ServiceError::Status {
                    status: status.as_u16(),
                })
            }
        }
    }
}

#[async_trait]
impl OcrService for HttpOcrService {
    async fn perform_ocr(
        &self,
        image_data: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<ServiceResponse<OcrData>, ServiceError> {
        let body = OcrRequestBody {
            image: image_data,
            image_url: image_url.filter(|u| !u.is_empty()),
        };
        self.post("/api/ocr", &body).await
    }

    async fn ask_ai(&self, text: &str) -> Result<ServiceResponse<AiData>, ServiceError> {
        self.post("/api/ask", &AskRequestBody { text }).await
    }

    fn name(&self) -> String {
        format!("http:{}", self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_trimmed() {
        let s = HttpOcrService::new("https://ocr.example.com/").unwrap();
        assert_eq!(s.endpoint(), "https://ocr.example.com");
    }

    #[test]
    fn ocr_body_omits_missing_fields() {
        let body = OcrRequestBody {
            image: None,
            image_url: Some("https://x/y.png"),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"imageUrl":"https://x/y.png"}"#
        );

        let body = OcrRequestBody {
            image: Some("AAAA"),
            image_url: None,
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"image":"AAAA"}"#);
    }
}
