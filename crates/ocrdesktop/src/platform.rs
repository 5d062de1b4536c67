//! Display-server detection.
//!
//! Capture strategy depends on the session type: X11 allows direct pixel
//! grabs, Wayland requires the XDG Desktop Portal.

/// The display server the session runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    Wayland,
    X11,
    Unknown,
}

/// Detect the display server from the session environment.
pub fn detect_display_server() -> DisplayServer {
    let session_type = std::env::var("XDG_SESSION_TYPE").unwrap_or_default();
    let wayland_display = std::env::var("WAYLAND_DISPLAY").unwrap_or_default();
    let x11_display = std::env::var("DISPLAY").unwrap_or_default();
    detect(&session_type, &wayland_display, &x11_display)
}

/// Pure detection logic, separated for testability.
fn detect(session_type: &str, wayland_display: &str, x11_display: &str) -> DisplayServer {
    match session_type.to_ascii_lowercase().as_str() {
        "wayland" => return DisplayServer::Wayland,
        "x11" => return DisplayServer::X11,
        _ => {}
    }
    if !wayland_display.is_empty() {
        DisplayServer::Wayland
    } else if !x11_display.is_empty() {
        DisplayServer::X11
    } else {
        DisplayServer::Unknown
    }
}
