//! Acquiring the image to recognize.
//!
//! Four sources: the focused window, the whole desktop, the clipboard,
//! and a file. Screen sources go through xcap on X11 and the XDG
//! screenshot portal on Wayland; the capture result carries the screen
//! offset of the shot so recognized words can be mapped back to global
//! coordinates.

pub mod file;
pub mod portal;
pub mod screen;

use crate::clipboard;
use crate::error::Result;
use crate::platform::{detect_display_server, DisplayServer};
use crate::types::{Capture, CaptureSource};

/// Capture an image from the requested source.
///
/// When no focused window can be found the capture falls back to the
/// whole desktop, matching what a screen-reader user expects: some
/// recognizable content is always better than nothing.
pub async fn capture(source: &CaptureSource) -> Result<Capture> {
    match source {
        CaptureSource::ActiveWindow => match capture_window().await {
            Ok(capture) => Ok(capture),
            Err(e) => {
                tracing::warn!(error = %e, "window capture failed, falling back to desktop");
                capture_desktop().await
            }
        },
        CaptureSource::Desktop => capture_desktop().await,
        CaptureSource::Clipboard => Ok(Capture::single(clipboard::read_image().await?)),
        CaptureSource::File(path) => Ok(Capture::single(file::load_image(path).await?)),
    }
}

async fn capture_window() -> Result<Capture> {
    match detect_display_server() {
        // The portal has no "active window" request; interactive mode
        // lets the user pick the window themselves.
        DisplayServer::Wayland => portal::screenshot(true).await,
        DisplayServer::X11 | DisplayServer::Unknown => screen::capture_focused_window().await,
    }
}

async fn capture_desktop() -> Result<Capture> {
    match detect_display_server() {
        DisplayServer::Wayland => portal::screenshot(false).await,
        DisplayServer::X11 | DisplayServer::Unknown => screen::capture_desktop().await,
    }
}
