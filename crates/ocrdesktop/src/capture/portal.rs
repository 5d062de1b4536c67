//! Wayland screen capture via the XDG screenshot portal.
//!
//! Wayland compositors do not let clients read other windows' pixels;
//! the portal is the sanctioned path. Interactive mode shows the
//! compositor's own picker, which doubles as the "active window" mode on
//! Wayland since the portal has no focused-window request.

use crate::error::{OcrDesktopError, Result};
use crate::types::Capture;
use ashpd::desktop::screenshot::Screenshot;

/// Take a screenshot through the portal.
///
/// With `interactive` the compositor shows its selection dialog; without
/// it the whole desktop is captured (when permission has been granted).
/// Portal shots have no usable offset, so the capture reports (0, 0).
pub async fn screenshot(interactive: bool) -> Result<Capture> {
    tracing::debug!(interactive, "requesting portal screenshot");

    let request = Screenshot::request()
        .interactive(interactive)
        .modal(true)
        .send()
        .await
        .map_err(|e| OcrDesktopError::capture_with_source("screenshot portal unavailable", e))?;

    let response = request
        .response()
        .map_err(|e| OcrDesktopError::capture_with_source("screenshot request denied or failed", e))?;

    let uri = response.uri().clone();
    if uri.scheme() != "file" {
        return Err(OcrDesktopError::capture(format!(
            "portal returned unsupported URI scheme {:?}",
            uri.scheme()
        )));
    }

    let path = uri
        .to_file_path()
        .map_err(|_| OcrDesktopError::capture(format!("portal URI is not a valid file path: {}", uri)))?;

    let img = image::open(&path)
        .map_err(|e| OcrDesktopError::capture_with_source("failed to load portal screenshot", e))?;

    // The portal leaves the shot on disk; it is ours to delete.
    if let Err(e) = std::fs::remove_file(&path) {
        tracing::warn!(path = %path.display(), error = %e, "could not remove portal screenshot");
    }

    Ok(Capture::single(img))
}
