use crate::error::AppError;
use crate::model::CoachIdentity;
use crate::status::StatusInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "COACHDESK_CONFIG_PATH";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
    colored_status: bool,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        paint(self.accent, self.reset, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        paint(self.muted, self.reset, text)
    }

    /// Status label tinted with the registry's color token.
    pub fn status_label(&self, info: &StatusInfo) -> String {
        if !self.colored_status {
            return info.label.to_string();
        }
        paint(ansi_for_token(info.color), self.reset, info.label)
    }
}

fn paint(code: &str, reset: &str, text: &str) -> String {
    if code.is_empty() {
        text.to_string()
    } else {
        format!("{code}{text}{reset}")
    }
}

fn ansi_for_token(token: &str) -> &'static str {
    match token {
        "blue" => "\x1b[38;5;33m",
        "cyan" => "\x1b[38;5;37m",
        "yellow" => "\x1b[38;5;178m",
        "orange" => "\x1b[38;5;208m",
        "purple" => "\x1b[38;5;135m",
        "green" => "\x1b[38;5;34m",
        "red" => "\x1b[38;5;160m",
        _ => "\x1b[38;5;245m",
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: RESET,
            colored_status: true,
        },
        Some("solarized") => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            reset: RESET,
            colored_status: true,
        },
        _ => Palette {
            accent: "",
            muted: "",
            reset: "",
            colored_status: false,
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonicalize_key(raw);
    if cleaned.is_empty() {
        return Some("default".into());
    }

    match cleaned.as_str() {
        "vanilla" | "light" | "plain" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// Lowercases and collapses every run of non-alphanumerics into one `_`.
pub fn canonicalize_key(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub coach: CoachIdentity,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Config {
    /// The alias expansion for `word`, split on whitespace.
    pub fn expand_alias(&self, word: &str) -> Option<Vec<String>> {
        self.aliases
            .get(word)
            .map(|expansion| expansion.split_whitespace().map(str::to_string).collect())
            .filter(|words: &Vec<String>| !words.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub coach_name: Option<String>,
    pub coach_email: Option<String>,
    pub aliases: HashMap<String, String>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("coachdesk")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("coachdesk")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "using default configuration");
            ConfigLoad {
                config: Config::default(),
                error: Some(err),
            }
        }
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(normalized) = overrides.theme.as_deref().and_then(canonical_theme_name) {
        merged.theme = Some(normalized);
    }
    if let Some(name) = overrides.coach_name.as_ref() {
        merged.coach.name = name.trim().to_string();
    }
    if let Some(email) = overrides.coach_email.as_ref() {
        merged.coach.email = email.trim().to_string();
    }

    for (alias, value) in overrides.aliases.iter() {
        merged.aliases.insert(alias.clone(), value.clone());
    }

    merged
}
