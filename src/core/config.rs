//! Run configuration: JSON config file plus environment overrides.
//!
//! Loaded once per run and treated as immutable afterwards. Every field can
//! be overridden from the environment, which wins over the file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::paths;
use crate::error::{Error, ErrorCode, Result};
use crate::utils::io;

pub const ENV_API_KEY: &str = "FABHAND_API_KEY";
pub const ENV_HOST: &str = "FABHAND_HOST";
pub const ENV_PROTOCOL: &str = "FABHAND_PROTOCOL";
pub const ENV_THEME_PATH: &str = "FABHAND_THEME_PATH";
pub const ENV_DRAWING_SHEET_PATH: &str = "FABHAND_DRAWING_SHEET_PATH";
pub const ENV_REPLACE_FILES: &str = "FABHAND_REPLACE_FILES";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub host: String,
    pub protocol: String,
    pub theme_path: String,
    pub drawing_sheet_path: String,
    pub replace_files: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            host: String::new(),
            protocol: "https".to_string(),
            theme_path: String::new(),
            drawing_sheet_path: String::new(),
            replace_files: false,
        }
    }
}

impl Config {
    /// Load the config file (when present) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = paths::config_json()?;
        let mut config = if path.exists() {
            let raw = io::read_file(&path, "read config")?;
            serde_json::from_str(&raw)
                .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.expand_paths();
        Ok(config)
    }

    /// Overlay environment values onto the file-loaded config.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup(ENV_API_KEY) {
            self.api_key = v;
        }
        if let Some(v) = lookup(ENV_HOST) {
            self.host = v;
        }
        if let Some(v) = lookup(ENV_PROTOCOL) {
            self.protocol = v;
        }
        if let Some(v) = lookup(ENV_THEME_PATH) {
            self.theme_path = v;
        }
        if let Some(v) = lookup(ENV_DRAWING_SHEET_PATH) {
            self.drawing_sheet_path = v;
        }
        if let Some(v) = lookup(ENV_REPLACE_FILES) {
            self.replace_files = parse_bool(ENV_REPLACE_FILES, &v)?;
        }
        Ok(())
    }

    fn expand_paths(&mut self) {
        self.theme_path = shellexpand::tilde(&self.theme_path).into_owned();
        self.drawing_sheet_path = shellexpand::tilde(&self.drawing_sheet_path).into_owned();
    }

    /// Everything `push` needs, checked before any generation or network
    /// activity. Reports every missing item at once.
    pub fn validate_for_push(&self) -> Result<()> {
        let mut missing: Vec<&str> = Vec::new();

        if self.api_key.is_empty() {
            missing.push("api_key");
        }
        if self.host.is_empty() {
            missing.push("host");
        }
        if self.theme_path.is_empty() || !Path::new(&self.theme_path).is_file() {
            missing.push("theme_path (must name an existing file)");
        }
        if self.drawing_sheet_path.is_empty() || !Path::new(&self.drawing_sheet_path).is_file() {
            missing.push("drawing_sheet_path (must name an existing file)");
        }

        if missing.is_empty() {
            return Ok(());
        }

        Err(Error::new(
            ErrorCode::ConfigMissingKey,
            "Missing required configuration",
            serde_json::json!({ "missing": missing }),
        )
        .with_hint("Run 'fabhand config show' to inspect the effective configuration")
        .with_hint("Values come from config.json or FABHAND_* environment variables"))
    }

    /// The subset `resolve` and uploads need.
    pub fn validate_for_remote(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::config_missing_key("api_key", None)
                .with_hint(format!("Set {} or api_key in config.json", ENV_API_KEY)));
        }
        if self.host.is_empty() {
            return Err(Error::config_missing_key("host", None)
                .with_hint(format!("Set {} or host in config.json", ENV_HOST)));
        }
        Ok(())
    }

    /// The subset local generation needs: the PDF exporters consume the
    /// theme and drawing sheet, the rest of the artifacts need nothing.
    pub fn validate_for_generate(&self) -> Result<()> {
        let mut missing: Vec<&str> = Vec::new();
        if self.theme_path.is_empty() || !Path::new(&self.theme_path).is_file() {
            missing.push("theme_path (must name an existing file)");
        }
        if self.drawing_sheet_path.is_empty() || !Path::new(&self.drawing_sheet_path).is_file() {
            missing.push("drawing_sheet_path (must name an existing file)");
        }
        if missing.is_empty() {
            return Ok(());
        }
        Err(Error::new(
            ErrorCode::ConfigMissingKey,
            "Missing required configuration",
            serde_json::json!({ "missing": missing }),
        )
        .with_hint("PDF export needs a KiCad color theme and a drawing sheet file"))
    }

    /// Copy with the API key masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.api_key.is_empty() {
            copy.api_key = "<redacted>".to_string();
        }
        copy
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::config_invalid_value(
            key,
            format!("expected a boolean, got '{}'", value),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut config = Config {
            api_key: "from-file".to_string(),
            host: "example.com".to_string(),
            ..Config::default()
        };
        let env = env_map(&[(ENV_API_KEY, "from-env"), (ENV_REPLACE_FILES, "true")]);

        config.apply_env(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.host, "example.com");
        assert!(config.replace_files);
    }

    #[test]
    fn bad_replace_files_value_is_a_config_error() {
        let mut config = Config::default();
        let env = env_map(&[(ENV_REPLACE_FILES, "maybe")]);

        let err = config.apply_env(|k| env.get(k).cloned()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn push_validation_lists_every_missing_item() {
        let config = Config::default();
        let err = config.validate_for_push().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigMissingKey);
        let missing = err.details["missing"].as_array().unwrap();
        assert_eq!(missing.len(), 4);
    }

    #[test]
    fn push_validation_accepts_complete_config() {
        let dir = TempDir::new().unwrap();
        let theme = dir.path().join("theme.json");
        let sheet = dir.path().join("sheet.kicad_wks");
        std::fs::write(&theme, "{}").unwrap();
        std::fs::write(&sheet, "sheet").unwrap();

        let config = Config {
            api_key: "key".to_string(),
            host: "assets.example.com".to_string(),
            theme_path: theme.display().to_string(),
            drawing_sheet_path: sheet.display().to_string(),
            ..Config::default()
        };
        assert!(config.validate_for_push().is_ok());
    }

    #[test]
    fn theme_path_must_exist_for_push() {
        let config = Config {
            api_key: "key".to_string(),
            host: "assets.example.com".to_string(),
            theme_path: "/nonexistent/theme.json".to_string(),
            drawing_sheet_path: "/nonexistent/sheet.kicad_wks".to_string(),
            ..Config::default()
        };
        let err = config.validate_for_push().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigMissingKey);
    }

    #[test]
    fn remote_validation_needs_key_and_host() {
        let mut config = Config::default();
        assert!(config.validate_for_remote().is_err());
        config.api_key = "key".to_string();
        assert!(config.validate_for_remote().is_err());
        config.host = "assets.example.com".to_string();
        assert!(config.validate_for_remote().is_ok());
    }

    #[test]
    fn redacted_masks_only_a_set_key() {
        let mut config = Config::default();
        assert_eq!(config.redacted().api_key, "");
        config.api_key = "secret".to_string();
        assert_eq!(config.redacted().api_key, "<redacted>");
    }

    #[test]
    fn default_protocol_is_https() {
        assert_eq!(Config::default().protocol, "https");
    }
}
