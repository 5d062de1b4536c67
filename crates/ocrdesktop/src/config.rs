//! Configuration loading and validation.
//!
//! Settings can be loaded from an `ocrdesktop.toml` file (explicit path or
//! discovered upward from the current directory) and are then overridden by
//! command-line flags.

use crate::error::{OcrDesktopError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// OCR and preprocessing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Tesseract language code (e.g. "eng", "deu", "eng+deu").
    #[serde(default = "default_language")]
    pub language: String,

    /// Upscale factor applied before recognition. Screen text is small;
    /// tesseract works much better at 3x.
    #[serde(default = "default_scale_factor")]
    pub scale_factor: u32,

    /// Tesseract page segmentation mode. 4 (single column of variable-size
    /// text) matches typical window content.
    #[serde(default = "default_psm")]
    pub psm: u8,

    /// Convert to grayscale before recognition.
    #[serde(default)]
    pub grayscale: bool,

    /// Invert colors before recognition (for dark themes).
    #[serde(default)]
    pub invert: bool,

    /// Break the image into hard black and white.
    #[serde(default)]
    pub black_white: bool,

    /// Luma cutoff for `black_white`: values above become white.
    #[serde(default = "default_black_white_threshold")]
    pub black_white_threshold: u8,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            scale_factor: default_scale_factor(),
            psm: default_psm(),
            grayscale: false,
            invert: false,
            black_white: false,
            black_white_threshold: default_black_white_threshold(),
        }
    }
}

/// Color analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorSettings {
    /// Analyze the dominant colors of each word box (slower).
    #[serde(default)]
    pub enabled: bool,

    /// How many color names to report per word.
    #[serde(default = "default_max_colors")]
    pub max_colors: usize,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_colors: default_max_colors(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ocr: OcrSettings,

    #[serde(default)]
    pub color: ColorSettings,
}

fn default_language() -> String {
    "eng".to_string()
}
fn default_scale_factor() -> u32 {
    3
}
fn default_psm() -> u8 {
    4
}
fn default_black_white_threshold() -> u8 {
    200
}
fn default_max_colors() -> usize {
    3
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            OcrDesktopError::validation(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            OcrDesktopError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Discover `ocrdesktop.toml` in the current directory or any parent.
    ///
    /// Returns `Ok(None)` when no config file exists.
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(OcrDesktopError::Io)?;

        loop {
            let candidate = current.join("ocrdesktop.toml");
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Validate settings ranges.
    pub fn validate(&self) -> Result<()> {
        validate_language_code(&self.ocr.language)?;

        if !(1..=8).contains(&self.ocr.scale_factor) {
            return Err(OcrDesktopError::validation(format!(
                "scale_factor must be between 1 and 8, got {}",
                self.ocr.scale_factor
            )));
        }

        if self.ocr.psm > 10 {
            return Err(OcrDesktopError::validation(format!(
                "psm must be between 0 and 10, got {}",
                self.ocr.psm
            )));
        }

        if self.color.max_colors == 0 {
            return Err(OcrDesktopError::validation(
                "max_colors must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Validate a Tesseract language specification.
///
/// Accepts lowercase codes and script suffixes joined with `+`
/// ("eng", "chi_sim", "eng+deu"). The string ends up on a subprocess
/// command line, so anything else is rejected.
pub fn validate_language_code(language: &str) -> Result<()> {
    if language.is_empty() {
        return Err(OcrDesktopError::validation("language must not be empty".to_string()));
    }

    let valid = language
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '+');
    if !valid || language.starts_with('+') || language.ends_with('+') {
        return Err(OcrDesktopError::validation(format!(
            "invalid language code: {:?}",
            language
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.scale_factor, 3);
        assert_eq!(config.ocr.psm, 4);
        assert_eq!(config.ocr.black_white_threshold, 200);
        assert!(!config.color.enabled);
        assert_eq!(config.color.max_colors, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("ocrdesktop.toml");

        fs::write(
            &config_path,
            r#"
[ocr]
language = "deu"
scale_factor = 2
grayscale = true

[color]
enabled = true
max_colors = 5
        "#,
        )
        .unwrap();

        let config = AppConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(config.ocr.language, "deu");
        assert_eq!(config.ocr.scale_factor, 2);
        assert!(config.ocr.grayscale);
        assert!(config.color.enabled);
        assert_eq!(config.color.max_colors, 5);
    }

    #[test]
    fn test_from_toml_file_partial_uses_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("ocrdesktop.toml");

        fs::write(&config_path, "[ocr]\nlanguage = \"fra\"\n").unwrap();

        let config = AppConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(config.ocr.language, "fra");
        assert_eq!(config.ocr.scale_factor, 3);
        assert_eq!(config.color.max_colors, 3);
    }

    #[test]
    fn test_from_toml_file_invalid_values_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("ocrdesktop.toml");

        fs::write(&config_path, "[ocr]\nscale_factor = 20\n").unwrap();

        let result = AppConfig::from_toml_file(&config_path);
        assert!(matches!(result, Err(OcrDesktopError::Validation { .. })));
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = AppConfig::from_toml_file("/nonexistent/ocrdesktop.toml");
        assert!(matches!(result, Err(OcrDesktopError::Validation { .. })));
    }

    #[test]
    fn test_validate_language_codes() {
        assert!(validate_language_code("eng").is_ok());
        assert!(validate_language_code("chi_sim").is_ok());
        assert!(validate_language_code("eng+deu").is_ok());

        assert!(validate_language_code("").is_err());
        assert!(validate_language_code("+eng").is_err());
        assert!(validate_language_code("eng+").is_err());
        assert!(validate_language_code("en g").is_err());
        assert!(validate_language_code("eng; rm -rf /").is_err());
    }

    #[test]
    fn test_validate_psm_range() {
        let mut config = AppConfig::default();
        config.ocr.psm = 10;
        assert!(config.validate().is_ok());
        config.ocr.psm = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_max_colors() {
        let mut config = AppConfig::default();
        config.color.max_colors = 0;
        assert!(config.validate().is_err());
    }
}
