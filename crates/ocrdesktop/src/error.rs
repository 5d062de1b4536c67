//! Error types for ocrdesktop.
//!
//! All fallible operations in the library return [`Result`]. The error
//! taxonomy separates system errors from application errors:
//!
//! **System errors MUST always bubble up unchanged:**
//! - `OcrDesktopError::Io` (from `std::io::Error`) - file system errors,
//!   permission errors. Never wrap or suppress these.
//!
//! **Application errors are wrapped with context:**
//! - `Capture` - screenshot acquisition failures (X11, portal, clipboard)
//! - `Ocr` - Tesseract invocation or output-parsing failures
//! - `ImageProcessing` - decode/transform failures
//! - `Input` - mouse/keyboard injection failures
//! - `Macro` - macro file parsing or replay failures
//! - `Validation` - invalid configuration or parameters
//! - `MissingDependency` - tesseract not installed or too old
use thiserror::Error;

/// Result type alias using `OcrDesktopError`.
pub type Result<T> = std::result::Result<T, OcrDesktopError>;

/// Main error type for all ocrdesktop operations.
#[derive(Debug, Error)]
pub enum OcrDesktopError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Capture error: {message}")]
    Capture {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Clipboard error: {message}")]
    Clipboard {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Input injection error: {message}")]
    Input {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Macro error: {message}")]
    Macro {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Other(String),
}

macro_rules! error_constructor {
    ($name:ident, $with_source:ident, $variant:ident) => {
        #[doc = concat!("Create a `", stringify!($variant), "` error.")]
        pub fn $name<S: Into<String>>(message: S) -> Self {
            Self::$variant {
                message: message.into(),
                source: None,
            }
        }

        #[doc = concat!("Create a `", stringify!($variant), "` error with a source.")]
        pub fn $with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
            message: S,
            source: E,
        ) -> Self {
            Self::$variant {
                message: message.into(),
                source: Some(Box::new(source)),
            }
        }
    };
}

impl OcrDesktopError {
    error_constructor!(capture, capture_with_source, Capture);
    error_constructor!(ocr, ocr_with_source, Ocr);
    error_constructor!(image_processing, image_processing_with_source, ImageProcessing);
    error_constructor!(clipboard, clipboard_with_source, Clipboard);
    error_constructor!(input, input_with_source, Input);
    error_constructor!(macro_error, macro_error_with_source, Macro);
    error_constructor!(validation, validation_with_source, Validation);
}

impl From<image::ImageError> for OcrDesktopError {
    fn from(err: image::ImageError) -> Self {
        OcrDesktopError::ImageProcessing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
