//! Simulated mouse and keyboard input.
//!
//! Wraps enigo behind a small driver so the rest of the crate talks in
//! screen coordinates, [`MouseAction`]s, and X-style key names ("Return",
//! "F4", "a"). Key names are kept compatible with the `.ocrm` macro
//! format, which records them as the display server reports them.

use crate::error::{OcrDesktopError, Result};
use crate::types::MouseAction;
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

/// Press / release phase of a simulated key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Press,
    Release,
    Tap,
}

/// Injects input events into the session.
pub struct InputDriver {
    enigo: Enigo,
}

impl InputDriver {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| OcrDesktopError::input_with_source("failed to open input connection", e))?;
        Ok(Self { enigo })
    }

    /// Move the pointer to absolute screen coordinates.
    pub fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| OcrDesktopError::input_with_source("failed to move pointer", e))
    }

    /// Move the pointer and perform the given action there.
    pub fn act_at(&mut self, x: i32, y: i32, action: MouseAction) -> Result<()> {
        self.move_to(x, y)?;

        match action {
            MouseAction::MoveOnly => Ok(()),
            MouseAction::LeftClick => self.click(Button::Left),
            MouseAction::DoubleClick => {
                self.click(Button::Left)?;
                self.click(Button::Left)
            }
            MouseAction::MiddleClick => self.click(Button::Middle),
            MouseAction::RightClick => self.click(Button::Right),
        }
    }

    fn click(&mut self, button: Button) -> Result<()> {
        self.enigo
            .button(button, Direction::Click)
            .map_err(|e| OcrDesktopError::input_with_source("failed to click", e))
    }

    /// Send a key event by name.
    pub fn key(&mut self, name: &str, phase: KeyPhase) -> Result<()> {
        let key = key_from_name(name)
            .ok_or_else(|| OcrDesktopError::input(format!("unknown key name: {:?}", name)))?;

        let direction = match phase {
            KeyPhase::Press => Direction::Press,
            KeyPhase::Release => Direction::Release,
            KeyPhase::Tap => Direction::Click,
        };

        self.enigo
            .key(key, direction)
            .map_err(|e| OcrDesktopError::input_with_source(format!("failed to send key {:?}", name), e))
    }

    /// Type a string as individual unicode key taps.
    pub fn type_text(&mut self, text: &str) -> Result<()> {
        self.enigo
            .text(text)
            .map_err(|e| OcrDesktopError::input_with_source("failed to type text", e))
    }
}

/// Map an X-style key name onto an enigo key.
///
/// Single characters become unicode taps; everything else goes through
/// the named-key table.
pub fn key_from_name(name: &str) -> Option<Key> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(Key::Unicode(c));
    }

    let key = match name {
        "Return" | "Enter" | "KP_Enter" => Key::Return,
        "space" => Key::Space,
        "Tab" | "ISO_Left_Tab" => Key::Tab,
        "BackSpace" => Key::Backspace,
        "Delete" => Key::Delete,
        "Escape" => Key::Escape,
        "Up" => Key::UpArrow,
        "Down" => Key::DownArrow,
        "Left" => Key::LeftArrow,
        "Right" => Key::RightArrow,
        "Home" => Key::Home,
        "End" => Key::End,
        "Page_Up" | "Prior" => Key::PageUp,
        "Page_Down" | "Next" => Key::PageDown,
        "Shift_L" | "Shift_R" => Key::Shift,
        "Control_L" | "Control_R" => Key::Control,
        "Alt_L" | "Alt_R" => Key::Alt,
        "Super_L" | "Super_R" => Key::Meta,
        "Caps_Lock" => Key::CapsLock,
        "F1" => Key::F1,
        "F2" => Key::F2,
        "F3" => Key::F3,
        "F4" => Key::F4,
        "F5" => Key::F5,
        "F6" => Key::F6,
        "F7" => Key::F7,
        "F8" => Key::F8,
        "F9" => Key::F9,
        "F10" => Key::F10,
        "F11" => Key::F11,
        "F12" => Key::F12,
        _ => return None,
    };

    Some(key)
}
