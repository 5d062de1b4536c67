//! Direct screen capture through xcap (X11).
//!
//! xcap talks to the display server synchronously and, on some backends,
//! spins up its own runtime internally, so every call is wrapped in
//! `spawn_blocking`.

use crate::error::{OcrDesktopError, Result};
use crate::types::Capture;
use image::{DynamicImage, ImageBuffer, Rgba};
use xcap::{Monitor, Window};

/// Capture the currently focused window.
///
/// The capture offset is the window's screen position, so word
/// coordinates can be mapped back to global coordinates for clicking.
pub async fn capture_focused_window() -> Result<Capture> {
    tokio::task::spawn_blocking(|| {
        let windows = Window::all()
            .map_err(|e| OcrDesktopError::capture_with_source("failed to enumerate windows", e))?;

        for window in windows {
            if window.is_minimized().unwrap_or(true) {
                continue;
            }
            if !window.is_focused().unwrap_or(false) {
                continue;
            }

            let x = window
                .x()
                .map_err(|e| OcrDesktopError::capture_with_source("failed to read window position", e))?;
            let y = window
                .y()
                .map_err(|e| OcrDesktopError::capture_with_source("failed to read window position", e))?;

            let img = window
                .capture_image()
                .map_err(|e| OcrDesktopError::capture_with_source("failed to capture window", e))?;

            tracing::debug!(
                title = %window.title().unwrap_or_default(),
                x,
                y,
                "captured focused window"
            );

            return Ok(Capture {
                images: vec![DynamicImage::ImageRgba8(img)],
                offset_x: x,
                offset_y: y,
            });
        }

        Err(OcrDesktopError::capture("no focused window found"))
    })
    .await
    .map_err(|e| OcrDesktopError::capture_with_source("capture task failed", e))?
}

/// Capture the whole desktop.
///
/// All monitors are composited into one image spanning their bounding
/// box; the capture offset is the bounding box origin (negative when a
/// monitor sits left of or above the primary).
pub async fn capture_desktop() -> Result<Capture> {
    tokio::task::spawn_blocking(|| {
        let monitors = Monitor::all()
            .map_err(|e| OcrDesktopError::capture_with_source("failed to enumerate monitors", e))?;

        if monitors.is_empty() {
            return Err(OcrDesktopError::capture("no monitors detected"));
        }

        let mut shots = Vec::with_capacity(monitors.len());
        for monitor in monitors {
            let x = monitor
                .x()
                .map_err(|e| OcrDesktopError::capture_with_source("failed to read monitor geometry", e))?;
            let y = monitor
                .y()
                .map_err(|e| OcrDesktopError::capture_with_source("failed to read monitor geometry", e))?;

            let img = monitor
                .capture_image()
                .map_err(|e| OcrDesktopError::capture_with_source("failed to capture monitor", e))?;

            shots.push((x, y, img));
        }

        Ok(composite_monitors(shots))
    })
    .await
    .map_err(|e| OcrDesktopError::capture_with_source("capture task failed", e))?
}

type MonitorShot = (i32, i32, ImageBuffer<Rgba<u8>, Vec<u8>>);

/// Composite per-monitor shots into one image at their true layout.
fn composite_monitors(shots: Vec<MonitorShot>) -> Capture {
    let min_x = shots.iter().map(|(x, _, _)| *x).min().unwrap_or(0);
    let min_y = shots.iter().map(|(_, y, _)| *y).min().unwrap_or(0);
    let max_x = shots
        .iter()
        .map(|(x, _, img)| *x + img.width() as i32)
        .max()
        .unwrap_or(0);
    let max_y = shots
        .iter()
        .map(|(_, y, img)| *y + img.height() as i32)
        .max()
        .unwrap_or(0);

    let width = (max_x - min_x).max(1) as u32;
    let height = (max_y - min_y).max(1) as u32;

    let mut composite = ImageBuffer::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    for (x, y, img) in shots {
        image::imageops::overlay(&mut composite, &img, i64::from(x - min_x), i64::from(y - min_y));
    }

    Capture {
        images: vec![DynamicImage::ImageRgba8(composite)],
        offset_x: min_x,
        offset_y: min_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(x: i32, y: i32, width: u32, height: u32, value: u8) -> MonitorShot {
        (x, y, ImageBuffer::from_pixel(width, height, Rgba([value, 0, 0, 255])))
    }

    #[test]
    fn test_composite_single_monitor() {
        let capture = composite_monitors(vec![shot(0, 0, 100, 50, 10)]);
        assert_eq!(capture.images[0].width(), 100);
        assert_eq!(capture.images[0].height(), 50);
        assert_eq!(capture.offset_x, 0);
        assert_eq!(capture.offset_y, 0);
    }

    #[test]
    fn test_composite_side_by_side() {
        let capture = composite_monitors(vec![shot(0, 0, 100, 50, 10), shot(100, 0, 80, 60, 20)]);
        assert_eq!(capture.images[0].width(), 180);
        assert_eq!(capture.images[0].height(), 60);
    }

    #[test]
    fn test_composite_negative_origin() {
        // Secondary monitor left of the primary.
        let capture = composite_monitors(vec![shot(-100, 0, 100, 50, 10), shot(0, 0, 100, 50, 20)]);
        assert_eq!(capture.offset_x, -100);
        assert_eq!(capture.images[0].width(), 200);

        let img = capture.images[0].to_rgba8();
        assert_eq!(img.get_pixel(0, 0).0[0], 10);
        assert_eq!(img.get_pixel(100, 0).0[0], 20);
    }
}
