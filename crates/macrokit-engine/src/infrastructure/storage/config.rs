//! TOML-based configuration persistence.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\MacroKit\config.toml`
//! - Linux:    `~/.config/macrokit/config.toml`
//! - macOS:    `~/Library/Application Support/MacroKit/config.toml`
//!
//! Every field carries a serde default so a first run without a config
//! file, or an old file missing newer fields, still loads cleanly.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub hotkeys: HotkeyConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory holding macro JSON files. Absent means the `macros`
    /// subdirectory next to the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macros_dir: Option<PathBuf>,
}

/// Default playback behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Speed multiplier applied when a macro is played without an explicit
    /// speed. Must be positive.
    #[serde(default = "default_speed")]
    pub default_speed: f64,
}

/// Hotkey registry tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotkeyConfig {
    /// Seconds between heartbeat re-registrations of all hooks.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
    /// Milliseconds a combo is ignored after an accepted trigger.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_speed() -> f64 {
    1.0
}
fn default_heartbeat_secs() -> u64 {
    30
}
fn default_cooldown_ms() -> u64 {
    300
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            macros_dir: None,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_speed: default_speed(),
        }
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            heartbeat_secs: default_heartbeat_secs(),
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

impl AppConfig {
    /// Resolves the macro store directory, honouring the override when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoPlatformConfigDir`] when no override is
    /// configured and the platform directory cannot be determined.
    pub fn macros_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.general.macros_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(config_dir()?.join("macros")),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config
/// base directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory
/// cannot be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from disk, returning `AppConfig::default()` if the
/// file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists `config` to disk, creating the config directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("MacroKit"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("macrokit"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("MacroKit")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_expected_tuning() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.general.log_level, "info");
        assert_eq!(cfg.playback.default_speed, 1.0);
        assert_eq!(cfg.hotkeys.heartbeat_secs, 30);
        assert_eq!(cfg.hotkeys.cooldown_ms, 300);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.general.log_level = "debug".to_string();
        cfg.playback.default_speed = 1.5;
        cfg.hotkeys.cooldown_ms = 500;

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        // Arrange
        let toml_str = r#"
[hotkeys]
heartbeat_secs = 10
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.hotkeys.heartbeat_secs, 10);
        assert_eq!(cfg.hotkeys.cooldown_ms, 300);
        assert_eq!(cfg.general.log_level, "info");
    }

    #[test]
    fn test_absent_macros_dir_is_omitted_from_toml() {
        let cfg = AppConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        assert!(!toml_str.contains("macros_dir"));
    }

    #[test]
    fn test_macros_dir_override_wins() {
        let mut cfg = AppConfig::default();
        cfg.general.macros_dir = Some(PathBuf::from("/srv/macros"));

        assert_eq!(cfg.macros_dir().unwrap(), PathBuf::from("/srv/macros"));
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result: Result<AppConfig, toml::de::Error> = toml::from_str("[[[ not valid");
        assert!(result.is_err());
    }
}
