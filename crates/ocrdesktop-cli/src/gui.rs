//! The accessible result window.
//!
//! Shows the recognized text as a plain text view or a word table and
//! lets the user act on a word: the window hides itself, waits for the
//! compositor to reveal whatever was underneath, and injects the chosen
//! mouse event at the word's real screen position. Interaction entries
//! only appear for screen captures; a clipboard or file image has no
//! on-screen geometry to click.

use anyhow::Result;
use device_query::{DeviceQuery, DeviceState, Keycode};
use eframe::egui;
use ocrdesktop::config::AppConfig;
use ocrdesktop::ocr::OcrProcessor;
use ocrdesktop::types::{Capture, MouseAction, RecognitionResult};
use ocrdesktop::{ColorDetector, InputDriver, KeyPhase, MacroFile};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Delay between hiding the window and injecting the event, so the
/// window underneath has regained focus.
const PRE_CLICK_DELAY: Duration = Duration::from_millis(800);

/// Everything the window needs from the pipeline.
pub struct GuiContext {
    pub runtime: tokio::runtime::Handle,
    pub capture: Capture,
    pub result: RecognitionResult,
    pub config: AppConfig,
    /// Screen capture: word coordinates are clickable.
    pub interactive: bool,
    /// The active macro slot, target of recording and the Macro menu.
    pub macro_file: MacroFile,
}

pub fn run(context: GuiContext) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("OCR")
            .with_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "OCR",
        options,
        Box::new(move |_cc| Ok(Box::new(App::new(context)))),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Text,
    Table,
}

/// A mouse event scheduled to fire after the window has hidden itself.
struct PendingAction {
    x: i32,
    y: i32,
    action: MouseAction,
    fire_at: Instant,
}

struct App {
    runtime: tokio::runtime::Handle,
    capture: Capture,
    result: RecognitionResult,
    config: AppConfig,
    interactive: bool,

    view: View,
    selected: Option<usize>,
    status: String,

    pending: Option<PendingAction>,
    recording: bool,
    send_keys: Option<Arc<AtomicBool>>,
    macro_file: MacroFile,
    macro_rx: Option<mpsc::Receiver<ocrdesktop::Result<()>>>,
    retry_rx: Option<mpsc::Receiver<ocrdesktop::Result<RecognitionResult>>>,
}

impl App {
    fn new(context: GuiContext) -> Self {
        Self {
            runtime: context.runtime,
            capture: context.capture,
            result: context.result,
            config: context.config,
            interactive: context.interactive,
            view: View::Text,
            selected: None,
            status: String::new(),
            pending: None,
            recording: false,
            send_keys: None,
            macro_file: context.macro_file,
            macro_rx: None,
            retry_rx: None,
        }
    }

    fn interact(&mut self, ctx: &egui::Context, action: MouseAction) {
        let Some(word) = self.selected.and_then(|i| self.result.words.get(i)) else {
            self.status = "No word selected".to_string();
            return;
        };
        let (x, y) = (word.x, word.y);

        if self.recording {
            // A recorded click ends the session like a performed one.
            match self.macro_file.append_mouse(x, y, action) {
                Ok(()) => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
                Err(e) => self.status = format!("Recording failed: {e}"),
            }
            return;
        }

        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
        self.pending = Some(PendingAction {
            x,
            y,
            action,
            fire_at: Instant::now() + PRE_CLICK_DELAY,
        });
        ctx.request_repaint_after(PRE_CLICK_DELAY);
    }

    /// Fire a scheduled mouse event once its delay has elapsed, then
    /// close the window. Returns true while an action is still pending.
    fn drive_pending(&mut self, ctx: &egui::Context) -> bool {
        let Some(pending) = &self.pending else {
            return false;
        };

        let now = Instant::now();
        if now < pending.fire_at {
            ctx.request_repaint_after(pending.fire_at - now);
            return true;
        }

        let outcome = InputDriver::new().and_then(|mut driver| driver.act_at(pending.x, pending.y, pending.action));
        if let Err(e) = outcome {
            tracing::error!(error = %e, "input injection failed");
        }

        self.pending = None;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        true
    }

    fn retry_ocr(&mut self, ctx: &egui::Context) {
        if self.retry_rx.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel();
        self.retry_rx = Some(rx);
        self.status = "Recognizing...".to_string();

        let capture = self.capture.clone();
        let config = self.config.clone();
        let repaint = ctx.clone();
        self.runtime.spawn(async move {
            let detector = config.color.enabled.then(|| ColorDetector::new(config.color.max_colors));
            let processor = OcrProcessor::new(config.ocr);
            let result = processor.process_capture(&capture, detector.as_ref()).await;
            let _ = tx.send(result);
            repaint.request_repaint();
        });
    }

    fn poll_retry(&mut self, ctx: &egui::Context) {
        let Some(rx) = &self.retry_rx else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(result)) => {
                self.result = result;
                self.selected = None;
                self.status = "Recognition updated".to_string();
                self.retry_rx = None;
            }
            Ok(Err(e)) => {
                self.status = format!("Recognition failed: {e}");
                self.retry_rx = None;
            }
            Err(mpsc::TryRecvError::Empty) => {
                ctx.request_repaint_after(Duration::from_millis(100));
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                self.status = "Recognition task vanished".to_string();
                self.retry_rx = None;
            }
        }
    }

    fn toggle_send_keys(&mut self) {
        if let Some(stop) = self.send_keys.take() {
            stop.store(true, Ordering::Relaxed);
            self.status = "Send-key mode off".to_string();
            return;
        }

        let macro_file = self.macro_file.clone();
        let stop = Arc::new(AtomicBool::new(false));
        self.send_keys = Some(stop.clone());
        self.status = "Send-key mode on (F4 to leave)".to_string();

        std::thread::spawn(move || record_keys(macro_file, stop));
    }

    fn send_to_clipboard(&mut self) {
        let text = self.result.text.clone();
        self.runtime.spawn(async move {
            if let Err(e) = ocrdesktop::clipboard::write_text(text).await {
                tracing::error!(error = %e, "clipboard write failed");
            }
        });
        self.status = "Sending text to clipboard".to_string();
    }

    /// Macro -> Run: hide the window so replayed events land on the
    /// application underneath, replay off-thread, close when done.
    fn start_macro_run(&mut self, ctx: &egui::Context) {
        if self.macro_rx.is_some() {
            return;
        }
        if !self.macro_file.exists() {
            self.status = "No macro loaded".to_string();
            return;
        }

        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
        self.macro_rx = Some(spawn_replay(self.macro_file.clone()));
        ctx.request_repaint_after(Duration::from_millis(100));
    }

    fn poll_macro(&mut self, ctx: &egui::Context) {
        let Some(rx) = &self.macro_rx else {
            return;
        };

        match rx.try_recv() {
            Ok(outcome) => {
                if let Err(e) = outcome {
                    tracing::error!(error = %e, "macro replay failed");
                }
                self.macro_rx = None;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Err(mpsc::TryRecvError::Empty) => {
                ctx.request_repaint_after(Duration::from_millis(100));
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                self.macro_rx = None;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn unload_macro(&mut self) {
        self.status = match self.macro_file.unload() {
            Ok(()) => "Macro unloaded".to_string(),
            Err(e) => format!("Unload failed: {e}"),
        };
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let mut retry = false;

        egui::menu::bar(ui, |ui| {
            ui.menu_button("View", |ui| {
                ui.selectable_value(&mut self.view, View::Text, "Text");
                ui.selectable_value(&mut self.view, View::Table, "Word table");
            });

            ui.menu_button("OCR", |ui| {
                ui.checkbox(&mut self.config.ocr.invert, "Invert colors");
                ui.checkbox(&mut self.config.ocr.grayscale, "Grayscale");
                ui.checkbox(&mut self.config.ocr.black_white, "Black and white");
                if ui.button("Retry recognition").clicked() {
                    retry = true;
                    ui.close_menu();
                }
            });

            if self.interactive {
                ui.menu_button("Interact", |ui| {
                    let actions = [
                        ("Left click", MouseAction::LeftClick),
                        ("Double click", MouseAction::DoubleClick),
                        ("Middle click", MouseAction::MiddleClick),
                        ("Right click", MouseAction::RightClick),
                        ("Route to", MouseAction::MoveOnly),
                    ];
                    let mut chosen = None;
                    for (label, action) in actions {
                        if ui.button(label).clicked() {
                            chosen = Some(action);
                            ui.close_menu();
                        }
                    }
                    ui.separator();
                    ui.checkbox(&mut self.recording, "Record clicks into macro");
                    let sending = self.send_keys.is_some();
                    if ui.button(if sending { "Stop send-key mode" } else { "Send-key mode" }).clicked() {
                        self.toggle_send_keys();
                        ui.close_menu();
                    }
                    if let Some(action) = chosen {
                        self.interact(ctx, action);
                    }
                });
            }

            ui.menu_button("Macro", |ui| {
                if ui.button("Run").clicked() {
                    self.start_macro_run(ctx);
                    ui.close_menu();
                }
                if ui.button("Unload").clicked() {
                    self.unload_macro();
                    ui.close_menu();
                }
            });

            ui.menu_button("Output", |ui| {
                if ui.button("Send text to clipboard").clicked() {
                    self.send_to_clipboard();
                    ui.close_menu();
                }
                if ui.button("Close").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });

        if retry {
            self.retry_ocr(ctx);
        }
    }

    fn text_view(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().auto_shrink(false).show(ui, |ui| {
            // A TextEdit keeps the content reachable for screen readers
            // and allows caret navigation; edits are thrown away.
            let mut text = self.result.text.clone();
            ui.add_sized(
                ui.available_size(),
                egui::TextEdit::multiline(&mut text).font(egui::TextStyle::Monospace),
            );
        });
    }

    fn table_view(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().auto_shrink(false).show(ui, |ui| {
            egui::Grid::new("word_table").striped(true).num_columns(7).show(ui, |ui| {
                ui.strong("Text");
                ui.strong("Font size");
                ui.strong("Color");
                ui.strong("Kind");
                ui.strong("X");
                ui.strong("Y");
                ui.strong("Confidence");
                ui.end_row();

                for (i, word) in self.result.words.iter().enumerate() {
                    let selected = self.selected == Some(i);
                    if ui.selectable_label(selected, &word.text).clicked() {
                        self.selected = Some(i);
                    }
                    ui.label(format!("{}", word.font_size));
                    ui.label(&word.color);
                    ui.label(&word.kind);
                    ui.label(word.x.to_string());
                    ui.label(word.y.to_string());
                    ui.label(word.confidence.to_string());
                    ui.end_row();
                }
            });
        });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.drive_pending(ctx) {
            return;
        }
        self.poll_macro(ctx);
        self.poll_retry(ctx);

        // The recorder thread exits on F4; reflect that in the UI.
        if let Some(stop) = &self.send_keys {
            if stop.load(Ordering::Relaxed) {
                self.send_keys = None;
                self.status = "Send-key mode off".to_string();
            } else {
                ctx.request_repaint_after(Duration::from_millis(200));
            }
        }

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                if self.recording {
                    ui.label("(recording clicks)");
                }
                if self.send_keys.is_some() {
                    ui.label("(send-key mode, F4 to leave)");
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.view {
            View::Text => self.text_view(ui),
            View::Table => self.table_view(ui),
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(stop) = &self.send_keys {
            stop.store(true, Ordering::Relaxed);
        }
    }
}

/// Replay a macro on its own thread, reporting completion through a
/// channel the UI can poll.
fn spawn_replay(macro_file: MacroFile) -> mpsc::Receiver<ocrdesktop::Result<()>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(replay_blocking(&macro_file));
    });
    rx
}

fn replay_blocking(macro_file: &MacroFile) -> ocrdesktop::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    runtime.block_on(macro_file.replay())
}

/// Poll the keyboard globally and append newly pressed keys to the
/// active macro. F4 ends the session without being recorded.
fn record_keys(macro_file: MacroFile, stop: Arc<AtomicBool>) {
    let device = DeviceState::new();
    let mut held: Vec<Keycode> = device.get_keys();

    while !stop.load(Ordering::Relaxed) {
        let keys = device.get_keys();

        for key in &keys {
            if held.contains(key) {
                continue;
            }
            if *key == Keycode::F4 {
                stop.store(true, Ordering::Relaxed);
                return;
            }
            if let Some(name) = keycode_name(*key) {
                // The recorder has no keysym value; replay goes by name.
                if let Err(e) = macro_file.append_key(0, &name, KeyPhase::Tap) {
                    tracing::error!(error = %e, "failed to record key");
                }
            }
        }

        held = keys;
        std::thread::sleep(Duration::from_millis(30));
    }
}

/// X-style name for a polled keycode, matching what the input driver and
/// the `.ocrm` format expect. Keys without a stable name are skipped.
fn keycode_name(key: Keycode) -> Option<String> {
    use Keycode::*;

    let name = match key {
        A | B | C | D | E | F | G | H | I | J | K | L | M | N | O | P | Q | R | S | T | U | V | W | X | Y
        | Z => return Some(format!("{:?}", key).to_lowercase()),
        Key0 | Key1 | Key2 | Key3 | Key4 | Key5 | Key6 | Key7 | Key8 | Key9 => {
            return format!("{:?}", key).strip_prefix("Key").map(str::to_string)
        }
        F1 | F2 | F3 | F5 | F6 | F7 | F8 | F9 | F10 | F11 | F12 => return Some(format!("{:?}", key)),
        Enter => "Return",
        Space => "space",
        Tab => "Tab",
        Backspace => "BackSpace",
        Delete => "Delete",
        Escape => "Escape",
        Up => "Up",
        Down => "Down",
        Left => "Left",
        Right => "Right",
        Home => "Home",
        End => "End",
        PageUp => "Page_Up",
        PageDown => "Page_Down",
        CapsLock => "Caps_Lock",
        LShift => "Shift_L",
        RShift => "Shift_R",
        LControl => "Control_L",
        RControl => "Control_R",
        LAlt => "Alt_L",
        RAlt => "Alt_R",
        _ => return None,
    };

    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrdesktop::macros::MacroStep;
    use ocrdesktop::types::Word;
    use tempfile::tempdir;

    fn test_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap()
    }

    fn test_app(macro_file: MacroFile, runtime: &tokio::runtime::Runtime) -> App {
        App::new(GuiContext {
            runtime: runtime.handle().clone(),
            capture: Capture {
                images: Vec::new(),
                offset_x: 0,
                offset_y: 0,
            },
            result: RecognitionResult {
                text: "Yes".to_string(),
                words: vec![Word {
                    text: "Yes".to_string(),
                    font_size: 14.0,
                    color: "unknown".to_string(),
                    kind: "text".to_string(),
                    x: 125,
                    y: 340,
                    confidence: 95,
                }],
            },
            config: AppConfig::default(),
            interactive: true,
            macro_file,
        })
    }

    #[test]
    fn test_recording_click_appends_step_without_injecting() {
        let dir = tempdir().unwrap();
        let runtime = test_runtime();
        let mut app = test_app(MacroFile::at(dir.path().join("rec.ocrm")), &runtime);
        app.recording = true;
        app.selected = Some(0);

        app.interact(&egui::Context::default(), MouseAction::LeftClick);

        // Recorded, not scheduled for injection.
        assert!(app.pending.is_none());
        let steps = app.macro_file.read_steps().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(
            steps[1],
            MacroStep::Mouse {
                x: 125,
                y: 340,
                action: MouseAction::LeftClick
            }
        );
    }

    #[test]
    fn test_macro_run_replays_off_thread() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("delays.ocrm");
        std::fs::write(&path, "c,delay,0.01\n").unwrap();

        let rx = spawn_replay(MacroFile::at(path));
        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_macro_run_reports_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.ocrm");
        std::fs::write(&path, "garbage\n").unwrap();

        let rx = spawn_replay(MacroFile::at(path));
        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(outcome.is_err());
    }

    #[test]
    fn test_macro_run_completion_clears_pending_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("delays.ocrm");
        std::fs::write(&path, "c,delay,0.01\n").unwrap();

        let runtime = test_runtime();
        let mut app = test_app(MacroFile::at(path), &runtime);
        let ctx = egui::Context::default();

        app.start_macro_run(&ctx);
        assert!(app.macro_rx.is_some());

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.macro_rx.is_some() {
            assert!(Instant::now() < deadline, "macro run never finished");
            app.poll_macro(&ctx);
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_macro_run_without_macro_keeps_window() {
        let dir = tempdir().unwrap();
        let runtime = test_runtime();
        let mut app = test_app(MacroFile::at(dir.path().join("none.ocrm")), &runtime);

        app.start_macro_run(&egui::Context::default());

        assert!(app.macro_rx.is_none());
        assert_eq!(app.status, "No macro loaded");
    }

    #[test]
    fn test_clipboard_status_reports_in_progress() {
        let dir = tempdir().unwrap();
        let runtime = test_runtime();
        let mut app = test_app(MacroFile::at(dir.path().join("m.ocrm")), &runtime);

        // The task is queued on an undriven runtime; only the status is
        // observable here.
        app.send_to_clipboard();
        assert_eq!(app.status, "Sending text to clipboard");
    }

    #[test]
    fn test_keycode_names() {
        assert_eq!(keycode_name(Keycode::A).as_deref(), Some("a"));
        assert_eq!(keycode_name(Keycode::Key7).as_deref(), Some("7"));
        assert_eq!(keycode_name(Keycode::Enter).as_deref(), Some("Return"));
        assert_eq!(keycode_name(Keycode::Backspace).as_deref(), Some("BackSpace"));
        assert_eq!(keycode_name(Keycode::F12).as_deref(), Some("F12"));
        assert_eq!(keycode_name(Keycode::LShift).as_deref(), Some("Shift_L"));
    }

    #[test]
    fn test_recorded_names_replayable() {
        // Every name the recorder writes must be one the input driver
        // can map back to a key.
        for key in [
            Keycode::A,
            Keycode::Key0,
            Keycode::Enter,
            Keycode::Space,
            Keycode::Tab,
            Keycode::Escape,
            Keycode::Up,
            Keycode::PageDown,
            Keycode::LControl,
            Keycode::F10,
        ] {
            let name = keycode_name(key).unwrap();
            assert!(
                ocrdesktop::input::key_from_name(&name).is_some(),
                "unmappable key name: {name}"
            );
        }
    }
}
