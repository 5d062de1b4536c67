//! System clipboard access.
//!
//! Used in two directions: `-C` recognizes an image already on the
//! clipboard, and headless runs can place the recognized text back on it.
//! The clipboard handle is created per call inside `spawn_blocking`; X11
//! clipboard traffic round-trips through the display server and must not
//! block the runtime.

use crate::error::{OcrDesktopError, Result};
use image::{DynamicImage, RgbaImage};

/// Read an image from the clipboard.
///
/// Fails with a clipboard error when the clipboard is empty or holds
/// non-image content.
pub async fn read_image() -> Result<DynamicImage> {
    tokio::task::spawn_blocking(|| {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| OcrDesktopError::clipboard_with_source("failed to open clipboard", e))?;

        let data = clipboard
            .get_image()
            .map_err(|e| OcrDesktopError::clipboard_with_source("clipboard does not contain an image", e))?;

        image_from_clipboard_data(data.width, data.height, data.bytes.into_owned())
    })
    .await
    .map_err(|e| OcrDesktopError::clipboard_with_source("clipboard task failed", e))?
}

/// Put text on the clipboard.
///
/// The text survives only as long as the process on most Linux clipboard
/// setups; callers that need it afterwards should keep the process alive
/// or rely on a clipboard manager.
pub async fn write_text(text: String) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| OcrDesktopError::clipboard_with_source("failed to open clipboard", e))?;

        clipboard
            .set_text(text)
            .map_err(|e| OcrDesktopError::clipboard_with_source("failed to write clipboard text", e))
    })
    .await
    .map_err(|e| OcrDesktopError::clipboard_with_source("clipboard task failed", e))?
}

fn image_from_clipboard_data(width: usize, height: usize, bytes: Vec<u8>) -> Result<DynamicImage> {
    let width = u32::try_from(width)
        .map_err(|_| OcrDesktopError::clipboard("clipboard image width out of range"))?;
    let height = u32::try_from(height)
        .map_err(|_| OcrDesktopError::clipboard("clipboard image height out of range"))?;

    let img = RgbaImage::from_raw(width, height, bytes)
        .ok_or_else(|| OcrDesktopError::clipboard("clipboard image data is truncated"))?;

    Ok(DynamicImage::ImageRgba8(img))
}
