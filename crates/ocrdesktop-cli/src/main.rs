//! ocrdesktop command-line interface.

mod gui;

use anyhow::{Context, Result};
use clap::Parser;
use ocrdesktop::capture::capture;
use ocrdesktop::config::AppConfig;
use ocrdesktop::ocr::OcrProcessor;
use ocrdesktop::types::CaptureSource;
use ocrdesktop::{clipboard, ColorDetector, MacroFile};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ocrdesktop",
    version,
    about = "Read inaccessible windows with OCR and interact with the recognized text",
    long_about = "Captures screen content, recognizes its text with tesseract, and \
                  presents it in an accessible window where every word can be clicked \
                  at its real screen position. By default the active window is captured."
)]
struct Cli {
    /// OCR the whole desktop instead of the active window
    #[arg(short = 'd', long = "desktop", conflicts_with_all = ["clipboard_image", "file"])]
    desktop: bool,

    /// Read the image to recognize from the clipboard
    #[arg(short = 'C', long = "clipboard-image", conflicts_with = "file")]
    clipboard_image: bool,

    /// Read the image to recognize from a file
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: Option<PathBuf>,

    /// OCR language (tesseract code, e.g. "eng", "deu", "eng+deu")
    #[arg(short = 'l', long = "lang", value_name = "LANG")]
    lang: Option<String>,

    /// Do not show the GUI (implies printing the text to stdout)
    #[arg(short = 'n', long = "no-gui")]
    no_gui: bool,

    /// Send the recognized text to the clipboard
    #[arg(short = 'c', long = "to-clipboard")]
    to_clipboard: bool,

    /// Print the recognized text to stdout
    #[arg(short = 'o', long = "stdout")]
    stdout: bool,

    /// Analyze the dominant colors of each word (slower)
    #[arg(short = 'O', long = "colors")]
    colors: bool,

    /// How many color names to report per word
    #[arg(short = 'x', long = "max-colors", value_name = "N")]
    max_colors: Option<usize>,

    /// Invert the image before recognition (for dark themes)
    #[arg(short = 'i', long = "invert")]
    invert: bool,

    /// Convert the image to grayscale before recognition
    #[arg(short = 'g', long = "grayscale")]
    grayscale: bool,

    /// Break the image into hard black and white before recognition
    #[arg(short = 'b', long = "black-white")]
    black_white: bool,

    /// Luma threshold for --black-white (0-255)
    #[arg(short = 't', long = "threshold", value_name = "N")]
    threshold: Option<u8>,

    /// Load a macro file, make it the active macro, and replay it before
    /// capturing
    #[arg(short = 'm', long = "macro", value_name = "FILE")]
    macro_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Cli {
    fn capture_source(&self) -> CaptureSource {
        if let Some(path) = &self.file {
            CaptureSource::File(path.clone())
        } else if self.clipboard_image {
            CaptureSource::Clipboard
        } else if self.desktop {
            CaptureSource::Desktop
        } else {
            CaptureSource::ActiveWindow
        }
    }

    /// Layer command-line overrides on top of the discovered config.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(lang) = &self.lang {
            config.ocr.language = lang.clone();
        }
        if self.invert {
            config.ocr.invert = true;
        }
        if self.grayscale {
            config.ocr.grayscale = true;
        }
        if self.black_white {
            config.ocr.black_white = true;
        }
        if let Some(threshold) = self.threshold {
            config.ocr.black_white_threshold = threshold;
        }
        if self.colors {
            config.color.enabled = true;
        }
        if let Some(max_colors) = self.max_colors {
            config.color.max_colors = max_colors;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    let mut config = AppConfig::discover()
        .context("failed to load configuration")?
        .unwrap_or_default();
    cli.apply_to(&mut config);
    config.validate().context("invalid configuration")?;

    let source = cli.capture_source();
    let outcome = runtime.block_on(run_pipeline(&cli, &config, &source))?;

    if cli.stdout || cli.no_gui {
        println!("{}", outcome.result.text);
    }
    if cli.to_clipboard {
        runtime
            .block_on(clipboard::write_text(outcome.result.text.clone()))
            .context("failed to send text to clipboard")?;
    }

    if !cli.no_gui {
        gui::run(gui::GuiContext {
            runtime: runtime.handle().clone(),
            capture: outcome.capture,
            result: outcome.result,
            config,
            interactive: source.is_screen(),
            macro_file: MacroFile::active()?,
        })
        .context("GUI failed")?;
    }

    Ok(())
}

struct PipelineOutcome {
    capture: ocrdesktop::Capture,
    result: ocrdesktop::RecognitionResult,
}

async fn run_pipeline(cli: &Cli, config: &AppConfig, source: &CaptureSource) -> Result<PipelineOutcome> {
    if let Some(path) = &cli.macro_file {
        MacroFile::active()?
            .install_from(path)
            .with_context(|| format!("failed to load macro {}", path.display()))?;
    }

    // Replay the active macro before shooting the screen, so recorded
    // navigation clicks land first.
    if source.is_screen() {
        let active = MacroFile::active()?;
        if active.exists() {
            active.replay().await.context("macro replay failed")?;
        }
    }

    let shot = capture(source).await.context("capture failed")?;

    let detector = config.color.enabled.then(|| ColorDetector::new(config.color.max_colors));
    let processor = OcrProcessor::new(config.ocr.clone());
    let result = processor
        .process_capture(&shot, detector.as_ref())
        .await
        .context("recognition failed")?;

    tracing::info!(words = result.words.len(), "recognition complete");

    Ok(PipelineOutcome { capture: shot, result })
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "ocrdesktop=debug,ocrdesktop_cli=debug"
    } else {
        "ocrdesktop=warn,ocrdesktop_cli=warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_source_is_active_window() {
        let cli = Cli::parse_from(["ocrdesktop"]);
        assert_eq!(cli.capture_source(), CaptureSource::ActiveWindow);
    }

    #[test]
    fn test_mode_flags() {
        let cli = Cli::parse_from(["ocrdesktop", "-d"]);
        assert_eq!(cli.capture_source(), CaptureSource::Desktop);

        let cli = Cli::parse_from(["ocrdesktop", "-C"]);
        assert_eq!(cli.capture_source(), CaptureSource::Clipboard);

        let cli = Cli::parse_from(["ocrdesktop", "-f", "/tmp/shot.png"]);
        assert_eq!(cli.capture_source(), CaptureSource::File(PathBuf::from("/tmp/shot.png")));
    }

    #[test]
    fn test_conflicting_modes_rejected() {
        assert!(Cli::try_parse_from(["ocrdesktop", "-d", "-C"]).is_err());
        assert!(Cli::try_parse_from(["ocrdesktop", "-C", "-f", "x.png"]).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::parse_from(["ocrdesktop", "-l", "deu", "-i", "-b", "-t", "128", "-O", "-x", "5"]);
        let mut config = AppConfig::default();
        cli.apply_to(&mut config);

        assert_eq!(config.ocr.language, "deu");
        assert!(config.ocr.invert);
        assert!(config.ocr.black_white);
        assert_eq!(config.ocr.black_white_threshold, 128);
        assert!(config.color.enabled);
        assert_eq!(config.color.max_colors, 5);
    }

    #[test]
    fn test_overrides_keep_config_defaults() {
        let cli = Cli::parse_from(["ocrdesktop"]);
        let mut config = AppConfig::default();
        config.ocr.language = "fra".to_string();
        cli.apply_to(&mut config);
        assert_eq!(config.ocr.language, "fra");
    }
}
