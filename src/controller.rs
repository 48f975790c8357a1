//! The page controller: all page state plus the two request cycles.
//!
//! ## State machine
//!
//! ```text
//!   select_file / set_url            begin_ocr ──▶ service ──▶ finish_ocr
//!   ────────────────────▶ source          │  ocr_loading = true   │ = false
//!   (clears result + error)               ▼                        ▼
//!                                    ocr_result / error   ──▶ begin_ask_ai ─▶ … ─▶ finish_ask_ai
//! ```
//!
//! Every request cycle is split into `begin_*` (guards, set the loading
//! flag, build the request) and `finish_*` (store the outcome, clear the
//! flag). Front-ends that render while a request is in flight call them
//! separately; everyone else uses [`PageController::perform_ocr`] and
//! [`PageController::ask_ai`], which run both halves around the service
//! call.
//!
//! Guard failures emit a notice and return `Err` without touching state.
//! Service failures never return `Err`: they are stored and notified.

use crate::clipboard::ClipboardSink;
use crate::config::VisionConfig;
use crate::error::{ServiceError, VisionError};
use crate::notice::{Notice, NoticeLevel, RequestKind, SharedObserver};
use crate::service::{AiData, OcrData, OcrService, ServiceResponse};
use crate::source::{self, ImageSource, UploadedFile};
use crate::view::PageView;
use std::path::Path;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const OCR_SUCCESS: &str = "Text extracted successfully!";
const OCR_FAILED: &str = "Failed to extract text.";
const OCR_UNKNOWN: &str = "An unknown error occurred.";
const AI_SUCCESS: &str = "AI assistant responded!";
const AI_FAILED: &str = "Failed to get AI response.";
const AI_UNKNOWN: &str = "An unknown AI error occurred.";
const COPIED: &str = "Copied to clipboard!";

/// Everything the page shows. Owned by one [`PageController`].
#[derive(Debug, Clone, Default)]
pub struct PageState {
    pub source: ImageSource,
    /// Data URL for files, the URL itself for URL mode.
    pub preview: Option<String>,
    pub ocr_result: String,
    pub ai_response: String,
    pub ocr_loading: bool,
    pub ai_loading: bool,
    /// Inline error for the last OCR attempt.
    pub error: Option<String>,
    pub copied_at: Option<Instant>,
}

impl PageState {
    pub fn has_source(&self) -> bool {
        !self.source.is_none()
    }

    pub fn is_busy(&self) -> bool {
        self.ocr_loading || self.ai_loading
    }

    fn clear_result(&mut self) {
        self.ocr_result.clear();
        self.error = None;
    }
}

/// Payload of one OCR call, built by [`PageController::begin_ocr`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrRequest {
    /// Base64 file bytes, without a `data:` prefix.
    pub image_data: Option<String>,
    pub image_url: Option<String>,
}

impl OcrRequest {
    pub async fn send(
        &self,
        service: &dyn OcrService,
    ) -> Result<ServiceResponse<OcrData>, ServiceError> {
        service
            .perform_ocr(self.image_data.as_deref(), self.image_url.as_deref())
            .await
    }
}

/// Payload of one Ask-AI call, built by [`PageController::begin_ask_ai`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub text: String,
}

impl AskRequest {
    pub async fn send(
        &self,
        service: &dyn OcrService,
    ) -> Result<ServiceResponse<AiData>, ServiceError> {
        service.ask_ai(&self.text).await
    }
}

/// Drives a [`PageState`] against an [`OcrService`].
pub struct PageController {
    state: PageState,
    service: Arc<dyn OcrService>,
    config: VisionConfig,
    observer: Option<SharedObserver>,
    notices: Vec<Notice>,
}

impl PageController {
    pub fn new(service: Arc<dyn OcrService>, config: VisionConfig) -> Self {
        Self {
            state: PageState::default(),
            service,
            config,
            observer: None,
            notices: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// The service requests are sent to.
    pub fn service(&self) -> Arc<dyn OcrService> {
        Arc::clone(&self.service)
    }

    /// Project the current state for rendering.
    pub fn view(&self) -> PageView {
        PageView::project(&self.state, self.is_copy_confirmed())
    }

    /// Drain the notices emitted since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ── Source selection ─────────────────────────────────────────────────

    /// Make `file` the active source.
    ///
    /// Oversized files are refused with a notice and leave state unchanged.
    pub fn select_file(&mut self, file: UploadedFile) -> Result<(), VisionError> {
        if file.size() > self.config.max_upload_bytes {
            return self.reject(VisionError::FileTooLarge {
                name: file.name().to_string(),
                size: file.size(),
                limit_mib: self.config.max_upload_mib(),
            });
        }

        info!("Selected file '{}' ({} bytes, {:?})", file.name(), file.size(), file.kind());
        self.state.preview = Some(file.data_url());
        self.state.source = ImageSource::File(file);
        self.state.clear_result();
        Ok(())
    }

    /// Read an image from disk and select it.
    ///
    /// The size limit is checked against file metadata before any bytes are read.
    pub async fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), VisionError> {
        match source::read_image_file(path.as_ref(), self.config.max_upload_bytes).await {
            Ok(file) => self.select_file(file),
            Err(e) => self.reject(e),
        }
    }

    /// Set the image URL. An empty string clears the source.
    pub fn set_url(&mut self, url: &str) {
        if url.is_empty() {
            debug!("Image URL cleared");
            self.state.source = ImageSource::None;
            self.state.preview = None;
        } else {
            debug!("Image URL set: {}", url);
            self.state.source = ImageSource::Url(url.to_string());
            self.state.preview = Some(url.to_string());
        }
        self.state.clear_result();
    }

    // ── OCR ──────────────────────────────────────────────────────────────

    /// Check guards, mark OCR in flight and build the request.
    pub fn begin_ocr(&mut self) -> Result<OcrRequest, VisionError> {
        if !self.state.has_source() {
            return self.reject(VisionError::MissingImageSource);
        }
        if self.state.is_busy() {
            return self.reject(VisionError::RequestInFlight {
                action: self.busy_action(),
            });
        }

        let request = match &self.state.source {
            ImageSource::File(file) => Some(OcrRequest {
                image_data: Some(file.encoded_payload()),
                image_url: None,
            }),
            ImageSource::Url(url) => Some(OcrRequest {
                image_data: None,
                image_url: Some(url.clone()),
            }),
            ImageSource::None => None,
        };
        let Some(request) = request else {
            return self.reject(VisionError::MissingImageSource);
        };

        self.state.ocr_loading = true;
        self.state.clear_result();
        info!(
            "OCR request issued ({})",
            if request.image_data.is_some() { "file" } else { "url" }
        );
        self.emit_start(RequestKind::Ocr);
        Ok(request)
    }

    /// Store the outcome of an OCR call and clear the loading flag.
    ///
    /// Returns whether text was stored.
    pub fn finish_ocr(
        &mut self,
        outcome: Result<ServiceResponse<OcrData>, ServiceError>,
    ) -> bool {
        if !self.state.ocr_loading {
            warn!("OCR outcome arrived with no request in flight; ignored");
            return false;
        }
        self.state.ocr_loading = false;

        let failure = match outcome.map(ServiceResponse::into_result) {
            Ok(Ok(data)) => {
                info!("OCR succeeded ({} chars)", data.text.len());
                self.state.ocr_result = data.text;
                self.state.error = None;
                self.notify(Notice::success(OCR_SUCCESS));
                self.emit_complete(RequestKind::Ocr, true);
                return true;
            }
            Ok(Err(reported)) => reported.unwrap_or_else(|| OCR_FAILED.to_string()),
            Err(e) => non_empty(e.to_string(), OCR_UNKNOWN),
        };

        warn!("OCR failed — {}", failure);
        self.state.ocr_result.clear();
        self.state.error = Some(failure.clone());
        self.notify(Notice::error(failure));
        self.emit_complete(RequestKind::Ocr, false);
        false
    }

    /// Run a full OCR cycle against the controller's service.
    pub async fn perform_ocr(&mut self) -> Result<(), VisionError> {
        let request = self.begin_ocr()?;
        let service = self.service();
        let outcome = request.send(service.as_ref()).await;
        self.finish_ocr(outcome);
        Ok(())
    }

    // ── Ask AI ───────────────────────────────────────────────────────────

    /// Check guards, mark the assistant call in flight and build the request.
    pub fn begin_ask_ai(&mut self) -> Result<AskRequest, VisionError> {
        if self.state.ocr_result.is_empty() {
            return self.reject(VisionError::NoExtractedText);
        }
        if self.state.is_busy() {
            return self.reject(VisionError::RequestInFlight {
                action: self.busy_action(),
            });
        }

        self.state.ai_loading = true;
        self.state.ai_response.clear();
        info!("Ask-AI request issued ({} chars)", self.state.ocr_result.len());
        self.emit_start(RequestKind::AskAi);
        Ok(AskRequest {
            text: self.state.ocr_result.clone(),
        })
    }

    /// Store the outcome of an Ask-AI call and clear the loading flag.
    ///
    /// Failures are only notified, never stored inline.
    pub fn finish_ask_ai(
        &mut self,
        outcome: Result<ServiceResponse<AiData>, ServiceError>,
    ) -> bool {
        if !self.state.ai_loading {
            warn!("Ask-AI outcome arrived with no request in flight; ignored");
            return false;
        }
        self.state.ai_loading = false;

        let failure = match outcome.map(ServiceResponse::into_result) {
            Ok(Ok(data)) => {
                info!("Assistant answered ({} chars)", data.response.len());
                self.state.ai_response = data.response;
                self.notify(Notice::success(AI_SUCCESS));
                self.emit_complete(RequestKind::AskAi, true);
                return true;
            }
            Ok(Err(reported)) => reported.unwrap_or_else(|| AI_FAILED.to_string()),
            Err(e) => non_empty(e.to_string(), AI_UNKNOWN),
        };

        warn!("Ask-AI failed — {}", failure);
        self.notify(Notice::error(failure));
        self.emit_complete(RequestKind::AskAi, false);
        false
    }

    /// Run a full Ask-AI cycle against the controller's service.
    pub async fn ask_ai(&mut self) -> Result<(), VisionError> {
        let request = self.begin_ask_ai()?;
        let service = self.service();
        let outcome = request.send(service.as_ref()).await;
        self.finish_ask_ai(outcome);
        Ok(())
    }

    // ── Copy ─────────────────────────────────────────────────────────────

    /// Copy the extracted text and start the confirmation window.
    pub fn copy_result(&mut self, sink: &mut dyn ClipboardSink) -> Result<(), VisionError> {
        if self.state.ocr_result.is_empty() {
            return self.reject(VisionError::NoExtractedText);
        }
        if let Err(e) = sink.set_text(&self.state.ocr_result) {
            return self.reject(VisionError::ClipboardUnavailable(e.0));
        }
        self.state.copied_at = Some(Instant::now());
        self.notify(Notice::success(COPIED));
        Ok(())
    }

    /// True while inside the confirmation window of the last copy.
    pub fn is_copy_confirmed(&self) -> bool {
        match self.state.copied_at {
            Some(at) => at.elapsed() < self.config.copy_confirmation(),
            None => false,
        }
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn busy_action(&self) -> &'static str {
        if self.state.ocr_loading {
            RequestKind::Ocr.as_str()
        } else {
            RequestKind::AskAi.as_str()
        }
    }

    fn reject<T>(&mut self, err: VisionError) -> Result<T, VisionError> {
        let level = match err {
            VisionError::NoExtractedText | VisionError::RequestInFlight { .. } => {
                NoticeLevel::Warning
            }
            _ => NoticeLevel::Error,
        };
        debug!("Rejected: {}", err);
        self.notify(Notice {
            level,
            message: err.to_string(),
        });
        Err(err)
    }

    fn notify(&mut self, notice: Notice) {
        if let Some(ref observer) = self.observer {
            observer.on_notice(&notice);
        }
        self.notices.push(notice);
    }

    fn emit_start(&self, kind: RequestKind) {
        if let Some(ref observer) = self.observer {
            observer.on_request_start(kind);
        }
    }

    fn emit_complete(&self, kind: RequestKind, success: bool) {
        if let Some(ref observer) = self.observer {
            observer.on_request_complete(kind, success);
        }
    }
}

fn non_empty(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::HttpOcrService;
    use crate::source::tests::PNG_MAGIC;

    fn controller() -> PageController {
        // Never contacted: these tests only drive begin/finish by hand.
        let service = Arc::new(HttpOcrService::new("http://127.0.0.1:9").unwrap());
        PageController::new(service, VisionConfig::default())
    }

    fn png(name: &str) -> UploadedFile {
        UploadedFile::new(name, PNG_MAGIC.to_vec()).unwrap()
    }

    #[test]
    fn url_then_file_switches_mode() {
        let mut c = controller();
        c.set_url("https://example.com/a.png");
        assert_eq!(c.state().source.url(), Some("https://example.com/a.png"));

        c.select_file(png("a.png")).unwrap();
        assert!(c.state().source.url().is_none());
        assert!(c.state().preview.as_deref().unwrap().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn begin_ocr_builds_file_payload() {
        let mut c = controller();
        c.select_file(png("a.png")).unwrap();
        let req = c.begin_ocr().unwrap();
        assert_eq!(req.image_url, None);
        assert_eq!(req.image_data.as_deref(), Some("iVBORw0KGgo="));
        assert!(c.state().ocr_loading);
    }

    #[test]
    fn begin_ocr_twice_is_rejected() {
        let mut c = controller();
        c.set_url("https://example.com/a.png");
        c.begin_ocr().unwrap();
        let err = c.begin_ocr().unwrap_err();
        assert!(matches!(err, VisionError::RequestInFlight { action: "OCR" }));
    }

    #[test]
    fn exception_with_empty_message_uses_fallback() {
        let mut c = controller();
        c.set_url("https://example.com/a.png");
        c.begin_ocr().unwrap();
        let ok = c.finish_ocr(Err(ServiceError::Llm {
            message: String::new(),
        }));
        assert!(!ok);
        assert_eq!(c.state().error.as_deref(), Some(OCR_UNKNOWN));
        assert!(!c.state().ocr_loading);
    }

    #[test]
    fn stray_finish_is_ignored() {
        let mut c = controller();
        assert!(!c.finish_ocr(Ok(ServiceResponse::ok(OcrData {
            text: "x".into()
        }))));
        assert!(c.state().ocr_result.is_empty());
        assert!(c.take_notices().is_empty());
    }

    #[test]
    fn ocr_blocked_while_ask_ai_running() {
        let mut c = controller();
        c.set_url("https://example.com/a.png");
        c.begin_ocr().unwrap();
        c.finish_ocr(Ok(ServiceResponse::ok(OcrData {
            text: "Hello".into(),
        })));
        c.begin_ask_ai().unwrap();
        let err = c.begin_ocr().unwrap_err();
        assert!(matches!(err, VisionError::RequestInFlight { action: "Ask AI" }));
    }

    #[test]
    fn ask_ai_refused_while_ocr_running() {
        let mut c = controller();
        c.set_url("https://example.com/a.png");
        c.begin_ocr().unwrap();
        c.finish_ocr(Ok(ServiceResponse::ok(OcrData {
            text: "Hello".into(),
        })));
        c.begin_ocr().unwrap();
        // A running OCR has already cleared the text it will replace.
        let err = c.begin_ask_ai().unwrap_err();
        assert!(matches!(err, VisionError::NoExtractedText));
        assert!(!c.state().ai_loading);
        assert!(!c.view().ask_button.enabled);
    }

    #[test]
    fn ai_failure_is_not_stored_inline() {
        let mut c = controller();
        c.set_url("https://example.com/a.png");
        c.begin_ocr().unwrap();
        c.finish_ocr(Ok(ServiceResponse::ok(OcrData {
            text: "Hello".into(),
        })));
        c.begin_ask_ai().unwrap();
        c.finish_ask_ai(Ok(ServiceResponse::failure("")));
        assert!(c.state().error.is_none());
        assert!(c.state().ai_response.is_empty());
        let last = c.take_notices().pop().unwrap();
        assert_eq!(last, Notice::error(AI_FAILED));
    }
}
