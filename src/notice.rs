//! Transient user notifications and the observer trait that receives them.
//!
//! Inject an [`Arc<dyn PageObserver>`] via
//! [`crate::controller::PageController::with_observer`] to receive events as
//! the controller runs: a terminal spinner, a toast layer, a log sink.
//!
//! The controller also keeps every notice it emits in a queue that callers
//! can drain with [`crate::controller::PageController::take_notices`], so
//! front-ends that poll rather than subscribe lose nothing.
//!
//! # Example
//!
//! ```rust
//! use visionary_text::{Notice, PageObserver};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct ErrorCounter(AtomicUsize);
//!
//! impl PageObserver for ErrorCounter {
//!     fn on_notice(&self, notice: &Notice) {
//!         if notice.is_error() {
//!             self.0.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//!
//! let observer: Arc<dyn PageObserver> = Arc::new(ErrorCounter(AtomicUsize::new(0)));
//! observer.on_notice(&Notice::error("boom"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A short, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Which request cycle an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Ocr,
    AskAi,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Ocr => "OCR",
            RequestKind::AskAi => "Ask AI",
        }
    }
}

/// Called by the page controller as state changes.
///
/// Implementations must be `Send + Sync` so a controller can move between
/// tasks. All methods have default no-op implementations so callers only
/// override what they care about.
pub trait PageObserver: Send + Sync {
    /// A notice was emitted.
    fn on_notice(&self, notice: &Notice) {
        let _ = notice;
    }

    /// A request was issued and its loading flag set.
    fn on_request_start(&self, kind: RequestKind) {
        let _ = kind;
    }

    /// A request finished (either way) and its loading flag was cleared.
    ///
    /// # Arguments
    /// * `kind`    — which cycle finished
    /// * `success` — whether a result was stored
    fn on_request_complete(&self, kind: RequestKind, success: bool) {
        let _ = (kind, success);
    }
}

/// A no-op implementation for callers that don't need events.
pub struct NoopObserver;

impl PageObserver for NoopObserver {}

/// Convenience alias matching the type stored in the controller.
pub type SharedObserver = Arc<dyn PageObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tracking {
        notices: AtomicUsize,
        starts: AtomicUsize,
        successes: AtomicUsize,
    }

    impl PageObserver for Tracking {
        fn on_notice(&self, _notice: &Notice) {
            self.notices.fetch_add(1, Ordering::SeqCst);
        }

        fn on_request_start(&self, _kind: RequestKind) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_request_complete(&self, _kind: RequestKind, success: bool) {
            if success {
                self.successes.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let o = NoopObserver;
        o.on_notice(&Notice::info("hi"));
        o.on_request_start(RequestKind::Ocr);
        o.on_request_complete(RequestKind::AskAi, false);
    }

    #[test]
    fn tracking_observer_receives_events() {
        let t = Tracking {
            notices: AtomicUsize::new(0),
            starts: AtomicUsize::new(0),
            successes: AtomicUsize::new(0),
        };
        t.on_request_start(RequestKind::Ocr);
        t.on_notice(&Notice::success("done"));
        t.on_request_complete(RequestKind::Ocr, true);
        t.on_request_complete(RequestKind::AskAi, false);

        assert_eq!(t.starts.load(Ordering::SeqCst), 1);
        assert_eq!(t.notices.load(Ordering::SeqCst), 1);
        assert_eq!(t.successes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn notice_serialises_lowercase_level() {
        let json = serde_json::to_string(&Notice::warning("careful")).unwrap();
        assert_eq!(json, r#"{"level":"warning","message":"careful"}"#);
    }
}
