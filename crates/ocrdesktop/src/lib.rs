//! Screen OCR for desktop accessibility.
//!
//! ocrdesktop captures screen content (the focused window, the whole
//! desktop, the clipboard, or an image file), recognizes its text with
//! tesseract, and maps every recognized word back to screen coordinates
//! so it can be clicked or typed at. It exists for users of screen
//! readers and magnifiers facing applications that expose nothing to the
//! accessibility bus.
//!
//! # Pipeline
//!
//! ```text
//! capture -> preprocess (upscale 3x, optional transforms)
//!         -> tesseract (TSV) -> parse -> assemble text
//!         -> words with screen coordinates
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ocrdesktop::capture::capture;
//! use ocrdesktop::config::AppConfig;
//! use ocrdesktop::ocr::OcrProcessor;
//! use ocrdesktop::types::CaptureSource;
//!
//! # async fn run() -> ocrdesktop::Result<()> {
//! let config = AppConfig::default();
//! let shot = capture(&CaptureSource::ActiveWindow).await?;
//! let result = OcrProcessor::new(config.ocr).process_capture(&shot, None).await?;
//! println!("{}", result.text);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod capture;
pub mod clipboard;
pub mod color;
pub mod config;
pub mod error;
pub mod input;
pub mod macros;
pub mod ocr;
pub mod platform;
pub mod types;

pub use color::ColorDetector;
pub use config::AppConfig;
pub use error::{OcrDesktopError, Result};
pub use input::{InputDriver, KeyPhase};
pub use macros::{MacroFile, MacroStep};
pub use ocr::OcrProcessor;
pub use platform::{detect_display_server, DisplayServer};
pub use types::{Capture, CaptureSource, MouseAction, RecognitionResult, Word};
