//! Shared types for capture sources, recognized words, and mouse actions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the image to recognize comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    /// The currently focused window (default mode).
    ActiveWindow,
    /// The whole desktop, all monitors composited.
    Desktop,
    /// An image carried by the system clipboard.
    Clipboard,
    /// An image file on disk.
    File(PathBuf),
}

impl CaptureSource {
    /// Whether this source shoots the live screen (window or desktop).
    ///
    /// Screen sources are the only ones where pre-capture macros and
    /// click-to-interact make sense; clipboard and file images have no
    /// on-screen geometry.
    pub fn is_screen(&self) -> bool {
        matches!(self, CaptureSource::ActiveWindow | CaptureSource::Desktop)
    }
}

/// Result of a capture: one or more images plus the screen offset of the
/// captured region (non-zero only for window captures on X11).
#[derive(Debug, Clone)]
pub struct Capture {
    pub images: Vec<image::DynamicImage>,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Capture {
    pub fn single(img: image::DynamicImage) -> Self {
        Self {
            images: vec![img],
            offset_x: 0,
            offset_y: 0,
        }
    }
}

/// One recognized word with its screen geometry.
///
/// `x`/`y` are the center of the word's bounding box in *screen*
/// coordinates (preprocessing scale already divided out, capture offsets
/// added), so they can be fed straight to the input driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    /// Estimated font size in points, derived from the box height.
    pub font_size: f64,
    /// Dominant colors of the box ("unknown" unless color analysis is on).
    pub color: String,
    /// Object kind; always "text" for OCR results.
    pub kind: String,
    pub x: i32,
    pub y: i32,
    /// Tesseract word confidence, 0-100 (-1 for non-word rows).
    pub confidence: i32,
}

/// Full OCR outcome: assembled text plus the per-word list for the GUI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub text: String,
    pub words: Vec<Word>,
}

/// Mouse actions that can be mapped onto a recognized word.
///
/// The macro-file tokens (`b1c`, `b1d`, ...) are inherited from the
/// original `.ocrm` format and kept for file compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseAction {
    LeftClick,
    DoubleClick,
    MiddleClick,
    RightClick,
    /// Move the pointer without clicking ("route to").
    MoveOnly,
}

impl MouseAction {
    /// Token used in `.ocrm` macro files.
    pub fn macro_token(&self) -> &'static str {
        match self {
            MouseAction::LeftClick => "b1c",
            MouseAction::DoubleClick => "b1d",
            MouseAction::MiddleClick => "b2c",
            MouseAction::RightClick => "b3c",
            MouseAction::MoveOnly => "None",
        }
    }

    /// Parse a `.ocrm` mouse event token.
    pub fn from_macro_token(token: &str) -> Option<Self> {
        match token {
            "b1c" => Some(MouseAction::LeftClick),
            "b1d" => Some(MouseAction::DoubleClick),
            "b2c" => Some(MouseAction::MiddleClick),
            "b3c" => Some(MouseAction::RightClick),
            "None" | "abs" => Some(MouseAction::MoveOnly),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_source_is_screen() {
        assert!(CaptureSource::ActiveWindow.is_screen());
        assert!(CaptureSource::Desktop.is_screen());
        assert!(!CaptureSource::Clipboard.is_screen());
        assert!(!CaptureSource::File(PathBuf::from("/tmp/x.png")).is_screen());
    }

    #[test]
    fn test_capture_single() {
        let img = image::DynamicImage::new_rgba8(4, 4);
        let capture = Capture::single(img);
        assert_eq!(capture.images.len(), 1);
        assert_eq!(capture.offset_x, 0);
        assert_eq!(capture.offset_y, 0);
    }

    #[test]
    fn test_mouse_action_tokens_roundtrip() {
        for action in [
            MouseAction::LeftClick,
            MouseAction::DoubleClick,
            MouseAction::MiddleClick,
            MouseAction::RightClick,
            MouseAction::MoveOnly,
        ] {
            let token = action.macro_token();
            assert_eq!(MouseAction::from_macro_token(token), Some(action));
        }
    }

    #[test]
    fn test_mouse_action_abs_alias() {
        assert_eq!(MouseAction::from_macro_token("abs"), Some(MouseAction::MoveOnly));
    }

    #[test]
    fn test_mouse_action_unknown_token() {
        assert_eq!(MouseAction::from_macro_token("b9x"), None);
    }
}
