use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub notes_dir: String,
    pub editor: String,
    pub ai_key: String,
    pub ai_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir().to_string_lossy().to_string(),
            editor: default_editor(),
            ai_key: String::new(),
            ai_model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Credentials shared with the `pairy` CLI.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PairyConfig {
    api_key: String,
    model: String,
}

impl Config {
    pub fn config_dir() -> PathBuf {
        base_config_dir().join("grove")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    fn pairy_path() -> PathBuf {
        base_config_dir().join("pairy").join("config.json")
    }

    /// Load `config.toml`, then fill a missing API key from the pairy config
    /// and finally from `GEMINI_API_KEY`.
    pub fn load() -> Result<Self> {
        Self::resolve(&Self::config_path(), &Self::pairy_path(), env::var(API_KEY_ENV).ok())
    }

    fn resolve(config_path: &Path, pairy_path: &Path, env_key: Option<String>) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = fs::read_to_string(config_path).map_err(|e| Error::io(config_path, e))?;
            toml::from_str::<Config>(&content)
                .map_err(|e| Error::Config(format!("{}: {}", config_path.display(), e)))?
        } else {
            Config::default()
        };

        if config.editor.trim().is_empty() {
            config.editor = default_editor();
        }
        if config.ai_model.trim().is_empty() {
            config.ai_model = DEFAULT_MODEL.to_string();
        }

        if config.ai_key.trim().is_empty() {
            if let Some(pairy) = read_pairy(pairy_path) {
                if !pairy.api_key.trim().is_empty() {
                    debug!("using API key from {}", pairy_path.display());
                    config.ai_key = pairy.api_key;
                    if !pairy.model.trim().is_empty() {
                        config.ai_model = pairy.model;
                    }
                }
            }
        }

        if config.ai_key.trim().is_empty() {
            if let Some(key) = env_key {
                config.ai_key = key;
            }
        }

        Ok(config)
    }

    pub fn notes_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.notes_dir).to_string())
    }

    pub fn has_ai_key(&self) -> bool {
        !self.ai_key.trim().is_empty()
    }
}

fn read_pairy(path: &Path) -> Option<PairyConfig> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(pairy) => Some(pairy),
        Err(e) => {
            warn!("ignoring {}: {}", path.display(), e);
            None
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(env::var("HOME").unwrap_or_default()))
}

fn base_config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| home_dir().join(".config"))
}

fn default_notes_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| home_dir().join(".local").join("share"))
        .join("grove")
        .join("notes")
}

fn default_editor() -> String {
    ["EDITOR", "VISUAL"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "vim".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Paths {
        _dir: TempDir,
        grove: PathBuf,
        pairy: PathBuf,
    }

    fn paths() -> Paths {
        let dir = TempDir::new().unwrap();
        let grove = dir.path().join("grove.toml");
        let pairy = dir.path().join("pairy.json");
        Paths { _dir: dir, grove, pairy }
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let p = paths();
        let config = Config::resolve(&p.grove, &p.pairy, None).unwrap();
        assert_eq!(config.ai_model, DEFAULT_MODEL);
        assert!(config.ai_key.is_empty());
        assert!(!config.has_ai_key());
        assert!(config.notes_dir.ends_with("notes"));
        assert!(!config.editor.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let p = paths();
        fs::write(&p.grove, "notes_dir = \"/tmp/my-notes\"\neditor = \"hx\"\n").unwrap();

        let config = Config::resolve(&p.grove, &p.pairy, None).unwrap();
        assert_eq!(config.notes_dir, "/tmp/my-notes");
        assert_eq!(config.editor, "hx");
        assert_eq!(config.ai_model, DEFAULT_MODEL);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let p = paths();
        fs::write(&p.grove, "notes_dir = [unterminated").unwrap();
        assert!(matches!(Config::resolve(&p.grove, &p.pairy, None), Err(Error::Config(_))));
    }

    #[test]
    fn test_own_key_wins() {
        let p = paths();
        fs::write(&p.grove, "ai_key = \"grove-key\"\n").unwrap();
        fs::write(&p.pairy, r#"{"api_key": "pairy-key", "model": "gemini-pro"}"#).unwrap();

        let config = Config::resolve(&p.grove, &p.pairy, Some("env-key".into())).unwrap();
        assert_eq!(config.ai_key, "grove-key");
        assert_eq!(config.ai_model, DEFAULT_MODEL);
    }

    #[test]
    fn test_pairy_key_and_model_fallback() {
        let p = paths();
        fs::write(&p.pairy, r#"{"api_key": "pairy-key", "model": "gemini-pro"}"#).unwrap();

        let config = Config::resolve(&p.grove, &p.pairy, Some("env-key".into())).unwrap();
        assert_eq!(config.ai_key, "pairy-key");
        assert_eq!(config.ai_model, "gemini-pro");
    }

    #[test]
    fn test_env_key_is_last_resort() {
        let p = paths();
        fs::write(&p.pairy, "not json").unwrap();

        let config = Config::resolve(&p.grove, &p.pairy, Some("env-key".into())).unwrap();
        assert_eq!(config.ai_key, "env-key");
        assert!(config.has_ai_key());
    }

    #[test]
    fn test_notes_path_expands_tilde() {
        let config = Config {
            notes_dir: "~/notes".into(),
            ..Config::default()
        };
        let path = config.notes_path();
        if dirs::home_dir().is_some() {
            assert!(!path.to_string_lossy().starts_with('~'));
        }
        assert!(path.ends_with("notes"));
    }
}
