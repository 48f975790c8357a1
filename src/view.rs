//! Pure projection of [`PageState`] into what a front-end draws.
//!
//! Nothing here mutates state or performs I/O; the same state always
//! yields the same view, which is what the tests lean on.

use crate::controller::PageState;
use crate::icon::IconName;
use serde::Serialize;

pub const PLACEHOLDER: &str = "Your extracted text will appear here.";

/// What the extracted-text panel shows. Earlier variants win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum ResultPanel {
    Loading,
    Error(String),
    Text(String),
    Placeholder(&'static str),
}

/// Icon slot on a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ButtonIcon {
    Spinner,
    MagicWand,
    Bot,
    Copy,
    Check,
}

impl ButtonIcon {
    /// The static vector icon for this slot, when one exists.
    pub fn vector(&self) -> Option<IconName> {
        match self {
            ButtonIcon::MagicWand => Some(IconName::MagicWand),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    pub enabled: bool,
    pub label: &'static str,
    pub icon: ButtonIcon,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub preview: Option<String>,
    pub result_panel: ResultPanel,
    pub ocr_button: ButtonView,
    pub ask_button: ButtonView,
    /// `None` when the copy button is hidden.
    pub copy_button: Option<ButtonIcon>,
    pub ai_response: Option<String>,
}

impl PageView {
    pub fn project(state: &PageState, copy_confirmed: bool) -> Self {
        let busy = state.is_busy();
        let has_text = !state.ocr_result.is_empty();

        let result_panel = if state.ocr_loading {
            ResultPanel::Loading
        } else if let Some(ref err) = state.error {
            ResultPanel::Error(err.clone())
        } else if has_text {
            ResultPanel::Text(state.ocr_result.clone())
        } else {
            ResultPanel::Placeholder(PLACEHOLDER)
        };

        let ocr_button = ButtonView {
            enabled: state.has_source() && !busy,
            label: if state.ocr_loading {
                "Extracting Text..."
            } else {
                "Perform OCR"
            },
            icon: if state.ocr_loading {
                ButtonIcon::Spinner
            } else {
                ButtonIcon::MagicWand
            },
        };

        let ask_button = ButtonView {
            enabled: has_text && !busy,
            label: if state.ai_loading {
                "AI is thinking..."
            } else {
                "Ask AI about this text"
            },
            icon: if state.ai_loading {
                ButtonIcon::Spinner
            } else {
                ButtonIcon::Bot
            },
        };

        let copy_button = (has_text && !state.ocr_loading).then_some(if copy_confirmed {
            ButtonIcon::Check
        } else {
            ButtonIcon::Copy
        });

        Self {
            preview: state.preview.clone(),
            result_panel,
            ocr_button,
            ask_button,
            copy_button,
            ai_response: (!state.ai_response.is_empty()).then(|| state.ai_response.clone()),
        }
    }
}
