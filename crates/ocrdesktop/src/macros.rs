//! Recording and replay of `.ocrm` input macros.
//!
//! A macro file is a plain-text list of comma-separated steps, one per
//! line:
//!
//! ```text
//! c,delay,0.9
//! m,412,388,b1c
//! k,65293,Return,2
//! ```
//!
//! `c,delay,<seconds>` pauses replay, `m,<x>,<y>,<action>` moves the
//! pointer and optionally clicks, and `k,<keyval>,<name>,<phase>` sends a
//! key event (phase 0 = press, 1 = release, 2 = tap). The active macro
//! lives at `~/.activeOCRMacro.ocrm` and is replayed before every screen
//! capture, so a recorded navigation sequence can re-open the same dialog
//! each run.

use crate::error::{OcrDesktopError, Result};
use crate::input::{InputDriver, KeyPhase};
use crate::types::MouseAction;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

/// File name of the active macro in the home directory.
pub const ACTIVE_MACRO_FILE: &str = ".activeOCRMacro.ocrm";

/// Delay recorded ahead of each captured mouse step, in seconds.
const RECORDED_STEP_DELAY: f64 = 0.9;

/// One step of a macro.
#[derive(Debug, Clone, PartialEq)]
pub enum MacroStep {
    /// Pause replay.
    Delay { seconds: f64 },
    /// Send a key event. `value` is the keysym the recorder saw; replay
    /// goes by `name`.
    Key { value: u32, name: String, phase: KeyPhase },
    /// Move the pointer and perform a mouse action.
    Mouse { x: i32, y: i32, action: MouseAction },
}

impl MacroStep {
    /// Serialize to one `.ocrm` line (without trailing newline).
    pub fn to_line(&self) -> String {
        match self {
            MacroStep::Delay { seconds } => format!("c,delay,{}", seconds),
            MacroStep::Key { value, name, phase } => {
                let phase = match phase {
                    KeyPhase::Press => 0,
                    KeyPhase::Release => 1,
                    KeyPhase::Tap => 2,
                };
                format!("k,{},{},{}", value, name, phase)
            }
            MacroStep::Mouse { x, y, action } => format!("m,{},{},{}", x, y, action.macro_token()),
        }
    }

    /// Parse one `.ocrm` line. `line_num` is 1-based and only used for
    /// error messages.
    pub fn parse_line(line: &str, line_num: usize) -> Result<Self> {
        let fields: Vec<&str> = line.trim().split(',').collect();

        let bad = |what: &str| OcrDesktopError::macro_error(format!("line {}: {}: {:?}", line_num, what, line.trim()));

        match fields.as_slice() {
            ["c", "delay", seconds] => {
                let seconds: f64 = seconds.parse().map_err(|_| bad("invalid delay"))?;
                if !seconds.is_finite() || seconds < 0.0 {
                    return Err(bad("invalid delay"));
                }
                Ok(MacroStep::Delay { seconds })
            }
            ["k", value, name, phase] => {
                let value: u32 = value.parse().map_err(|_| bad("invalid keysym value"))?;
                let phase = match *phase {
                    "0" => KeyPhase::Press,
                    "1" => KeyPhase::Release,
                    "2" => KeyPhase::Tap,
                    _ => return Err(bad("invalid key phase")),
                };
                if name.is_empty() {
                    return Err(bad("empty key name"));
                }
                Ok(MacroStep::Key {
                    value,
                    name: (*name).to_string(),
                    phase,
                })
            }
            ["m", x, y, token] => {
                let x: i32 = x.parse().map_err(|_| bad("invalid x coordinate"))?;
                let y: i32 = y.parse().map_err(|_| bad("invalid y coordinate"))?;
                let action = MouseAction::from_macro_token(token).ok_or_else(|| bad("unknown mouse action"))?;
                Ok(MacroStep::Mouse { x, y, action })
            }
            _ => Err(bad("unrecognized macro step")),
        }
    }
}

/// Parse a whole `.ocrm` document. Blank lines are skipped.
pub fn parse_macro(content: &str) -> Result<Vec<MacroStep>> {
    let mut steps = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        steps.push(MacroStep::parse_line(line, idx + 1)?);
    }
    Ok(steps)
}

/// Serialize steps to `.ocrm` text.
pub fn serialize_macro(steps: &[MacroStep]) -> String {
    let mut out = String::new();
    for step in steps {
        out.push_str(&step.to_line());
        out.push('\n');
    }
    out
}

/// The active macro file, replayed before screen captures.
#[derive(Debug, Clone)]
pub struct MacroFile {
    path: PathBuf,
}

impl MacroFile {
    /// The active macro in the user's home directory.
    pub fn active() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| OcrDesktopError::macro_error("could not determine home directory"))?;
        Ok(Self {
            path: home.join(ACTIVE_MACRO_FILE),
        })
    }

    /// A macro file at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and parse all steps. A missing file is an empty macro.
    pub fn read_steps(&self) -> Result<Vec<MacroStep>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        parse_macro(&content)
    }

    /// Install another macro file as this one (used to activate a saved
    /// macro). The source is validated before it is copied.
    pub fn install_from(&self, source: impl AsRef<Path>) -> Result<()> {
        let content = std::fs::read_to_string(source.as_ref())?;
        parse_macro(&content)?;
        std::fs::write(&self.path, content)?;
        tracing::info!(path = %self.path.display(), "macro activated");
        Ok(())
    }

    /// Delete the macro file. Missing files are fine.
    pub fn unload(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "macro unloaded");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Append a recorded mouse step, preceded by the standard delay so
    /// replayed clicks land after the UI has settled.
    pub fn append_mouse(&self, x: i32, y: i32, action: MouseAction) -> Result<()> {
        self.append(&[
            MacroStep::Delay {
                seconds: RECORDED_STEP_DELAY,
            },
            MacroStep::Mouse { x, y, action },
        ])
    }

    /// Append a recorded key step.
    pub fn append_key(&self, value: u32, name: &str, phase: KeyPhase) -> Result<()> {
        self.append(&[MacroStep::Key {
            value,
            name: name.to_string(),
            phase,
        }])
    }

    fn append(&self, steps: &[MacroStep]) -> Result<()> {
        use std::io::Write;

        let mut file = std::fs::OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(serialize_macro(steps).as_bytes())?;
        Ok(())
    }

    /// Replay all steps.
    ///
    /// The input connection is opened on the first key or mouse step, so
    /// replaying a missing or delay-only macro needs no display server.
    pub async fn replay(&self) -> Result<()> {
        let steps = self.read_steps()?;
        if steps.is_empty() {
            return Ok(());
        }

        tracing::debug!(steps = steps.len(), path = %self.path.display(), "replaying macro");

        let mut driver: Option<InputDriver> = None;
        for step in steps {
            match step {
                MacroStep::Delay { seconds } => {
                    tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
                }
                MacroStep::Key { name, phase, .. } => {
                    input(&mut driver)?.key(&name, phase)?;
                }
                MacroStep::Mouse { x, y, action } => {
                    input(&mut driver)?.act_at(x, y, action)?;
                }
            }
        }

        Ok(())
    }
}

fn input(slot: &mut Option<InputDriver>) -> Result<&mut InputDriver> {
    if slot.is_none() {
        *slot = Some(InputDriver::new()?);
    }
    match slot {
        Some(driver) => Ok(driver),
        None => Err(OcrDesktopError::input("input connection unavailable")),
    }
}
