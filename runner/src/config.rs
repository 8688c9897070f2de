//! Configuration for the runner.
//!
//! A [`RunnerConfig`] is assembled once per reload from the persisted
//! [`Settings`] file and a few `pass`-compatible environment variables, then
//! shared immutably. Components never read the environment themselves.

use std::path::{Path, PathBuf};
use std::time::Duration;

use passrunner_actions::{ActionDefinition, ActionSettings};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, RunnerError};
use crate::query::QueryPolicy;

/// Overrides the store location.
pub const ENV_STORE_DIR: &str = "PASSWORD_STORE_DIR";

/// Overrides the auto-clear timeout, in whole seconds.
pub const ENV_CLIP_TIME: &str = "PASSWORD_STORE_CLIP_TIME";

/// Overrides the OTP marker.
pub const ENV_OTP_IDENTIFIER: &str = "PASSWORD_STORE_OTP_IDENTIFIER";

/// Seconds a secret stays on the clipboard by default.
pub const DEFAULT_CLIP_TIMEOUT_SECS: u64 = 45;

/// Largest accepted timeout; larger values are treated as invalid.
pub const MAX_CLIP_TIMEOUT_SECS: u64 = i32::MAX as u64;

/// Path segment prefix marking one-time-password entries.
pub const DEFAULT_OTP_MARKER: &str = "totp::";

/// Queries shorter than this are ignored unless prefixed with `pass`.
pub const DEFAULT_MIN_QUERY_LENGTH: usize = 3;

/// External decryption program and leading arguments.
///
/// The runner appends `[otp] show <entry>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    /// Program to run.
    pub program: String,

    /// Arguments placed before the sub-command.
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Create a tool command.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add a leading argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Default for ToolCommand {
    fn default() -> Self {
        Self::new("pass")
    }
}

fn default_min_query_length() -> usize {
    DEFAULT_MIN_QUERY_LENGTH
}

/// Persisted user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Offer the configured extraction actions.
    #[serde(default)]
    pub show_additional_actions: bool,

    /// Offer the show-contents action.
    #[serde(default)]
    pub show_full_file_content_action: bool,

    /// Minimum length of a query without the `pass` prefix.
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,

    /// Decryption tool.
    #[serde(default)]
    pub tool: ToolCommand,

    /// Extraction actions in offered order.
    #[serde(default)]
    pub additional_actions: Vec<ActionDefinition>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_additional_actions: false,
            show_full_file_content_action: false,
            min_query_length: DEFAULT_MIN_QUERY_LENGTH,
            tool: ToolCommand::default(),
            additional_actions: Vec::new(),
        }
    }
}

impl Settings {
    /// Default settings location: `<config dir>/passrunner/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("passrunner").join("config.toml"))
    }

    /// Load settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let settings = toml::from_str(&raw).map_err(|source| RunnerError::SettingsParse {
            path: path.display().to_string(),
            source,
        })?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings to `path`, creating parent directories.
    ///
    /// Action definitions are only persisted while actions are enabled.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut persisted = self.clone();
        if !persisted.show_additional_actions {
            persisted.additional_actions.clear();
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(&persisted)?)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Add an action definition unless one with the same name exists.
    ///
    /// Returns whether the definition was added.
    pub fn add_action(&mut self, definition: ActionDefinition) -> bool {
        if self
            .additional_actions
            .iter()
            .any(|existing| existing.name == definition.name)
        {
            return false;
        }
        self.additional_actions.push(definition);
        true
    }

    /// Remove an action definition by name.
    pub fn remove_action(&mut self, name: &str) -> bool {
        let before = self.additional_actions.len();
        self.additional_actions.retain(|a| a.name != name);
        self.additional_actions.len() != before
    }

    /// The action-related part of the settings.
    pub fn action_settings(&self) -> ActionSettings {
        ActionSettings {
            show_actions: self.show_additional_actions,
            show_raw_content_action: self.show_full_file_content_action,
            definitions: self.additional_actions.clone(),
        }
    }
}

/// Immutable configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Store root.
    pub base_dir: PathBuf,

    /// Seconds before the clipboard is cleared.
    pub clip_timeout_secs: u64,

    /// Prefix of a path segment that marks an OTP entry.
    pub otp_marker: String,

    /// Decryption tool.
    pub tool: ToolCommand,

    /// Query pre-processing.
    pub query: QueryPolicy,

    /// Action registry inputs.
    pub actions: ActionSettings,
}

impl RunnerConfig {
    /// Resolve settings against the process environment.
    pub fn from_env(settings: &Settings) -> Self {
        Self::resolve(settings, |key| std::env::var(key).ok())
    }

    /// Resolve settings against an arbitrary variable lookup.
    pub fn resolve(settings: &Settings, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_dir = lookup(ENV_STORE_DIR)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_store_dir);

        let clip_timeout_secs = match lookup(ENV_CLIP_TIME) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs <= MAX_CLIP_TIMEOUT_SECS => secs,
                _ => {
                    warn!("Ignoring invalid {ENV_CLIP_TIME}={raw:?}");
                    DEFAULT_CLIP_TIMEOUT_SECS
                }
            },
            None => DEFAULT_CLIP_TIMEOUT_SECS,
        };

        let otp_marker = lookup(ENV_OTP_IDENTIFIER)
            .filter(|marker| !marker.is_empty())
            .unwrap_or_else(|| DEFAULT_OTP_MARKER.to_string());

        Self {
            base_dir,
            clip_timeout_secs,
            otp_marker,
            tool: settings.tool.clone(),
            query: QueryPolicy::new(settings.min_query_length),
            actions: settings.action_settings(),
        }
    }

    /// Load the settings file (default location when `path` is `None`) and
    /// resolve it against the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path.map(Path::to_path_buf).or_else(Settings::default_path) {
            Some(path) => Settings::load(&path)?,
            None => Settings::default(),
        };
        Ok(Self::from_env(&settings))
    }

    /// The auto-clear timeout.
    pub fn clip_timeout(&self) -> Duration {
        Duration::from_secs(self.clip_timeout_secs)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::resolve(&Settings::default(), |_| None)
    }
}

fn default_store_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".password-store")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::resolve(&Settings::default(), lookup(&[]));

        assert!(config.base_dir.ends_with(".password-store"));
        assert_eq!(config.clip_timeout_secs, 45);
        assert_eq!(config.otp_marker, "totp::");
        assert_eq!(config.tool, ToolCommand::new("pass"));
        assert!(!config.actions.show_actions);
    }

    #[test]
    fn test_environment_overrides() {
        let config = RunnerConfig::resolve(
            &Settings::default(),
            lookup(&[
                (ENV_STORE_DIR, "/srv/store"),
                (ENV_CLIP_TIME, "10"),
                (ENV_OTP_IDENTIFIER, "otp-"),
            ]),
        );

        assert_eq!(config.base_dir, PathBuf::from("/srv/store"));
        assert_eq!(config.clip_timeout(), Duration::from_secs(10));
        assert_eq!(config.otp_marker, "otp-");
    }

    #[test]
    fn test_invalid_timeout_is_ignored() {
        let too_large = (MAX_CLIP_TIMEOUT_SECS + 1).to_string();
        let max = u64::MAX.to_string();
        for raw in ["soon", "4.5", "-3", "", too_large.as_str(), max.as_str()] {
            let config = RunnerConfig::resolve(&Settings::default(), lookup(&[(ENV_CLIP_TIME, raw)]));
            assert_eq!(config.clip_timeout_secs, DEFAULT_CLIP_TIMEOUT_SECS, "{raw}");
        }
    }

    #[test]
    fn test_largest_timeout_is_accepted() {
        let max = MAX_CLIP_TIMEOUT_SECS.to_string();

        let config = RunnerConfig::resolve(&Settings::default(), lookup(&[(ENV_CLIP_TIME, max.as_str())]));

        assert_eq!(config.clip_timeout_secs, MAX_CLIP_TIMEOUT_SECS);
    }

    #[test]
    fn test_settings_from_toml() {
        let settings: Settings = toml::from_str(
            r#"
            show_additional_actions = true
            min_query_length = 2

            [tool]
            program = "gopass"

            [[additional_actions]]
            name = "user"
            icon = "user-identity"
            regex = "user: (.+)"

            [[additional_actions]]
            name = "url"
            regex = "url: (.+)"
            "#,
        )
        .unwrap();

        assert!(settings.show_additional_actions);
        assert!(!settings.show_full_file_content_action);
        assert_eq!(settings.min_query_length, 2);
        assert_eq!(settings.tool.program, "gopass");
        let names: Vec<_> = settings
            .additional_actions
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["user", "url"]);
    }

    #[test]
    fn test_settings_missing_file_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let settings = Settings::load(&temp_dir.path().join("absent.toml")).unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "show_additional_actions = maybe").unwrap();

        assert!(matches!(
            Settings::load(&path),
            Err(RunnerError::SettingsParse { .. })
        ));
    }

    #[test]
    fn test_settings_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.toml");
        let mut settings = Settings {
            show_additional_actions: true,
            ..Default::default()
        };
        assert!(settings.add_action(ActionDefinition::new("user", "", "user: (.+)")));
        assert!(!settings.add_action(ActionDefinition::new("user", "x", "login: (.+)")));

        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_disabled_actions_are_not_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let mut settings = Settings::default();
        settings.add_action(ActionDefinition::new("user", "", "user: (.+)"));

        settings.save(&path).unwrap();

        assert!(Settings::load(&path).unwrap().additional_actions.is_empty());
        assert!(settings.remove_action("user"));
        assert!(!settings.remove_action("user"));
    }
}
