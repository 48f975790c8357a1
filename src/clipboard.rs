//! Clipboard sinks for the "copy result" action.

use std::sync::{Arc, Mutex};
use thiserror::Error;

/// The clipboard refused the write.
#[derive(Debug, Error)]
#[error("Clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Anything extracted text can be copied into.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// In-process clipboard. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last text written, if any.
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|s| s.clone())
    }
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| ClipboardError(e.to_string()))?;
        *slot = Some(text.to_string());
        Ok(())
    }
}

/// The operating-system clipboard, opened on first use.
///
/// On Linux (X11 and Wayland) the contents only live as long as the owning
/// process serves them. A clipboard built with [`SystemClipboard::waiting`]
/// blocks in `set_text` until another application takes ownership, which a
/// short-lived process needs before it exits.
#[cfg(feature = "clipboard")]
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    wait_for_handoff: bool,
}

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose writes hold until the contents are handed off.
    /// Has no effect outside Linux.
    pub fn waiting() -> Self {
        Self {
            inner: None,
            wait_for_handoff: true,
        }
    }

    /// Whether writes block until another application owns the contents.
    pub fn waits_for_handoff(&self) -> bool {
        cfg!(target_os = "linux") && self.wait_for_handoff
    }
}

#[cfg(feature = "clipboard")]
impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let wait = self.waits_for_handoff();
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new().map_err(|e| ClipboardError(e.to_string()))?);
        }
        let Some(cb) = self.inner.as_mut() else {
            return Err(ClipboardError("not initialised".into()));
        };

        #[cfg(target_os = "linux")]
        if wait {
            use arboard::SetExtLinux;
            return cb
                .set()
                .wait()
                .text(text.to_string())
                .map_err(|e| ClipboardError(e.to_string()));
        }
        #[cfg(not(target_os = "linux"))]
        let _ = wait;

        cb.set_text(text.to_string())
            .map_err(|e| ClipboardError(e.to_string()))
    }
}
