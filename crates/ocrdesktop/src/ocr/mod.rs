//! The recognition pipeline.
//!
//! A capture goes through four stages: preprocessing (upscale plus the
//! optional transforms), a tesseract subprocess run with TSV output, TSV
//! parsing, and text assembly. Word coordinates come back in preprocessed
//! pixels; this module divides the scale factor out and adds the capture
//! offsets so every [`Word`] carries true screen coordinates.

pub mod preprocess;
pub mod tesseract;
pub mod text;
pub mod tsv;

pub use preprocess::preprocess;
pub use tesseract::{recognize_tsv, validate_tesseract_version};
pub use text::{assemble_text, clean_text};
pub use tsv::{parse_tsv, WordBox};

use crate::color::ColorDetector;
use crate::config::OcrSettings;
use crate::error::{OcrDesktopError, Result};
use crate::types::{Capture, RecognitionResult, Word};
use image::DynamicImage;

/// Runs the full capture-to-words pipeline.
pub struct OcrProcessor {
    settings: OcrSettings,
}

impl OcrProcessor {
    pub fn new(settings: OcrSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &OcrSettings {
        &self.settings
    }

    /// Recognize all images of a capture.
    ///
    /// Captures with several images are recognized independently and the
    /// texts concatenated. When a `ColorDetector` is given, each word is
    /// annotated with the dominant colors of its box in the preprocessed
    /// image.
    pub async fn process_capture(
        &self,
        capture: &Capture,
        color: Option<&ColorDetector>,
    ) -> Result<RecognitionResult> {
        if capture.images.is_empty() {
            return Err(OcrDesktopError::ocr("capture contains no images"));
        }

        let mut result = RecognitionResult::default();

        for img in &capture.images {
            let part = self.process_image(img, capture.offset_x, capture.offset_y, color).await?;
            if !result.text.is_empty() && !part.text.is_empty() {
                result.text.push('\n');
            }
            result.text.push_str(&part.text);
            result.words.extend(part.words);
        }

        Ok(result)
    }

    async fn process_image(
        &self,
        img: &DynamicImage,
        offset_x: i32,
        offset_y: i32,
        color: Option<&ColorDetector>,
    ) -> Result<RecognitionResult> {
        let settings = self.settings.clone();
        let source = img.clone();

        // Upscaling a full-desktop shot is CPU-heavy; keep it off the runtime.
        let prepared = tokio::task::spawn_blocking(move || preprocess(&source, &settings))
            .await
            .map_err(|e| OcrDesktopError::ocr_with_source("preprocessing task failed", e))?;

        let tsv_data = recognize_tsv(&prepared, &self.settings).await?;
        let boxes = parse_tsv(&tsv_data);

        let text = clean_text(&assemble_text(&boxes));

        let scale = self.settings.scale_factor;
        let words = boxes
            .iter()
            .map(|b| word_from_box(b, scale, offset_x, offset_y, &prepared, color))
            .collect();

        tracing::debug!(words = boxes.len(), "recognition finished");

        Ok(RecognitionResult { text, words })
    }
}

/// Map a TSV word box onto a screen-coordinate [`Word`].
fn word_from_box(
    b: &WordBox,
    scale: u32,
    offset_x: i32,
    offset_y: i32,
    prepared: &DynamicImage,
    color: Option<&ColorDetector>,
) -> Word {
    let scale = scale.max(1);
    let (center_x, center_y) = b.center();

    let color = match color {
        Some(detector) => detector.describe_region(prepared, b.left, b.top, b.width, b.height),
        None => "unknown".to_string(),
    };

    Word {
        text: b.text.clone(),
        // Box height back in screen pixels, 0.78 points per pixel.
        font_size: (f64::from(b.height) / f64::from(scale) * 0.78).round(),
        color,
        kind: "text".to_string(),
        x: (center_x / scale) as i32 + offset_x,
        y: (center_y / scale) as i32 + offset_y,
        confidence: b.confidence.round() as i32,
    }
}
