//! Loading capture input from an image file.

use crate::error::{OcrDesktopError, Result};
use image::DynamicImage;
use std::path::Path;

/// Load an image file for recognition.
///
/// Any raster format the image crate decodes is accepted. PDFs get a
/// dedicated error since they are the most common thing users try; the
/// fix (render a page to PNG first) belongs in the message.
pub async fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(OcrDesktopError::validation(format!(
            "input file does not exist: {}",
            path.display()
        )));
    }

    if is_pdf(path) {
        return Err(OcrDesktopError::UnsupportedFormat(format!(
            "{} is a PDF; render a page to an image (e.g. with pdftoppm) and retry",
            path.display()
        )));
    }

    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        image::open(&path).map_err(|e| {
            OcrDesktopError::image_processing_with_source(format!("failed to load image {}", path.display()), e)
        })
    })
    .await
    .map_err(|e| OcrDesktopError::image_processing_with_source("image load task failed", e))?
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_image(Path::new("/nonexistent/shot.png")).await;
        assert!(matches!(result, Err(OcrDesktopError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_load_pdf_rejected_with_hint() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.PDF");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let err = load_image(&path).await.unwrap_err();
        assert!(matches!(err, OcrDesktopError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("pdftoppm"));
    }

    #[tokio::test]
    async fn test_load_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shot.png");
        image::DynamicImage::new_rgba8(8, 6).save(&path).unwrap();

        let img = load_image(&path).await.unwrap();
        assert_eq!(img.width(), 8);
        assert_eq!(img.height(), 6);
    }

    #[tokio::test]
    async fn test_load_garbage_image_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"not an image").unwrap();

        let result = load_image(&path).await;
        assert!(matches!(result, Err(OcrDesktopError::ImageProcessing { .. })));
    }
}
