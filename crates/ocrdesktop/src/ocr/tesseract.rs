//! Tesseract subprocess invocation.
//!
//! The engine itself is an external dependency; this module shells out to
//! the `tesseract` executable with TSV output and maps its failure modes
//! onto the crate's error taxonomy.

use crate::config::OcrSettings;
use crate::error::{OcrDesktopError, Result};
use image::DynamicImage;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::io::Cursor;
use std::path::Path;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

/// Timeout for a single tesseract run.
const TESSERACT_TIMEOUT_SECONDS: u64 = 120;

/// Minimal supported Tesseract major version (TSV output and `--psm`).
const MINIMAL_SUPPORTED_TESSERACT_VERSION: u32 = 4;

static TESSERACT_VALIDATED: OnceCell<bool> = OnceCell::new();

/// Validate that a usable tesseract is installed and available.
///
/// The check runs once per process; later calls return immediately.
pub async fn validate_tesseract_version() -> Result<()> {
    if TESSERACT_VALIDATED.get().is_some() {
        return Ok(());
    }

    let output = Command::new("tesseract").arg("--version").output().await.map_err(|e| {
        OcrDesktopError::MissingDependency(format!(
            "Tesseract version {} or above is required but not found in PATH: {}",
            MINIMAL_SUPPORTED_TESSERACT_VERSION, e
        ))
    })?;

    if !output.status.success() {
        return Err(OcrDesktopError::MissingDependency(
            "Tesseract version check failed".to_string(),
        ));
    }

    // Tesseract prints its banner on stderr up to 4.x and stdout from 5.x.
    let banner = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let major = extract_major_version(&banner).ok_or_else(|| {
        OcrDesktopError::MissingDependency(format!("Could not parse Tesseract version from output: {}", banner))
    })?;

    if major < MINIMAL_SUPPORTED_TESSERACT_VERSION {
        return Err(OcrDesktopError::MissingDependency(format!(
            "Tesseract version {} or above is required, found major version {}",
            MINIMAL_SUPPORTED_TESSERACT_VERSION, major
        )));
    }

    let _ = TESSERACT_VALIDATED.set(true);

    Ok(())
}

fn extract_major_version(output: &str) -> Option<u32> {
    let re = Regex::new(r"tesseract\s+v?(\d+)\.(\d+)").ok()?;
    let caps = re.captures(output)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Run tesseract on a preprocessed image and return the raw TSV output.
pub async fn recognize_tsv(img: &DynamicImage, settings: &OcrSettings) -> Result<String> {
    validate_tesseract_version().await?;

    // Tesseract reads from a file; hand it a throwaway PNG.
    let mut png_bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
        .map_err(|e| OcrDesktopError::image_processing_with_source("failed to encode capture as PNG", e))?;

    let temp = tempfile::Builder::new()
        .prefix("ocrdesktop-")
        .suffix(".png")
        .tempfile()?;
    tokio::fs::write(temp.path(), &png_bytes).await?;

    run_tesseract(temp.path(), settings).await
}

async fn run_tesseract(input: &Path, settings: &OcrSettings) -> Result<String> {
    tracing::debug!(
        input = %input.display(),
        language = %settings.language,
        psm = settings.psm,
        "invoking tesseract"
    );

    let child = Command::new("tesseract")
        .arg(input)
        .arg("stdout")
        .arg("-l")
        .arg(&settings.language)
        .arg("--psm")
        .arg(settings.psm.to_string())
        .arg("tsv")
        // Tesseract misparses numbers under some locales.
        .env("LC_ALL", "C")
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .map_err(|e| std::io::Error::other(format!("Failed to execute tesseract: {}", e)))?;

    let output = match timeout(Duration::from_secs(TESSERACT_TIMEOUT_SECONDS), child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(std::io::Error::other(format!("Failed to wait for tesseract: {}", e)).into()),
        Err(_) => {
            return Err(OcrDesktopError::ocr(format!(
                "Tesseract timed out after {} seconds",
                TESSERACT_TIMEOUT_SECONDS
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        let stderr_lower = stderr.to_lowercase();
        if stderr_lower.contains("failed loading language") || stderr_lower.contains("tessdata") {
            return Err(OcrDesktopError::MissingDependency(format!(
                "Tesseract language data for '{}' is not installed: {}",
                settings.language,
                stderr.trim()
            )));
        }
        if stderr_lower.contains("error") || stderr_lower.contains("failed") {
            return Err(OcrDesktopError::ocr(format!("Tesseract failed: {}", stderr.trim())));
        }

        return Err(std::io::Error::other(format!("Tesseract system error: {}", stderr)).into());
    }

    String::from_utf8(output.stdout)
        .map_err(|e| OcrDesktopError::ocr(format!("Failed to decode tesseract TSV output: {}", e)))
}
