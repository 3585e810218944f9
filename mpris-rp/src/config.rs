//! Configuration loading and lookup
//!
//! Built-in defaults (embedded YAML) merged with an optional user file,
//! walked as a generic value tree. Option lookups fall through
//! `player.<identity>.<key>` → `options.<key>` → built-in default, so a
//! flag can be flipped globally and overridden per player.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use presence_model::SelectionPolicy;
use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

/// Built-in defaults; always present, always parseable.
const DEFAULT_CONFIG: &str = include_str!("default_config.yaml");

/// Directory under the user config root holding the user file.
const CONFIG_DIR_NAME: &str = "mpris-rp";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Whether the display counts time up from the start or down to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowTime {
    Elapsed,
    Remaining,
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Merged configuration tree.
#[derive(Debug, Clone)]
pub struct Config {
    data: Value,
}

impl Config {
    /// Load the built-in defaults merged with the user file, if any.
    pub fn load() -> Result<Self, ConfigError> {
        let user = user_config_path().and_then(|path| match fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "loaded user configuration");
                Some(text)
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "could not read user configuration");
                None
            }
        });
        Self::from_yaml(user.as_deref())
    }

    /// Defaults overlaid with an optional user document.
    pub fn from_yaml(user: Option<&str>) -> Result<Self, ConfigError> {
        let mut data: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if let Some(text) = user {
            let overlay: Value = serde_yaml::from_str(text)?;
            // an empty user file parses to null; nothing to merge
            if !overlay.is_null() {
                merge_values(&mut data, &overlay);
            }
        }
        Ok(Self { data })
    }

    /// Walk a dotted path through the merged tree.
    pub fn raw_get(&self, key: &str) -> Option<&Value> {
        let mut node = &self.data;
        for segment in key.split('.') {
            node = node.get(segment)?;
        }
        Some(node)
    }

    /// `options.<key>` lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get("options")?.get(key)
    }

    /// `player.<identity>.<key>` lookup, falling back to `options.<key>`.
    ///
    /// Identities are used as single mapping keys, so names containing
    /// dots or spaces work unquoted.
    pub fn player_get(&self, identity: &str, key: &str) -> Option<&Value> {
        self.data
            .get("player")
            .and_then(|players| players.get(identity))
            .and_then(|player| player.get(key))
            .or_else(|| self.get(key))
    }

    /// Fixed delay between reconnection attempts.
    pub fn reconnect_wait(&self) -> Duration {
        duration_or(self.raw_get("global.reconnect_wait"), 1.0)
    }

    /// Fixed delay between state polls.
    pub fn poll_interval(&self) -> Duration {
        duration_or(self.raw_get("global.poll_interval"), 5.0)
    }

    /// Force-debug flag for logging.
    pub fn debug_logging(&self) -> bool {
        self.raw_get("global.debug")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Configured default log level, when present.
    pub fn log_level(&self) -> Option<&str> {
        self.raw_get("global.log_level").and_then(Value::as_str)
    }

    /// Timestamp mode for one player.
    pub fn show_time(&self, identity: &str) -> ShowTime {
        match self.player_get(identity, "show_time").and_then(Value::as_str) {
            Some("remaining") => ShowTime::Remaining,
            _ => ShowTime::Elapsed,
        }
    }

    fn player_flag(&self, identity: &str, key: &str, default: bool) -> bool {
        self.player_get(identity, key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }
}

impl SelectionPolicy for Config {
    fn ignored(&self, identity: &str) -> bool {
        self.player_flag(identity, "ignore", false)
    }

    fn show_paused(&self, identity: &str) -> bool {
        self.player_flag(identity, "show_paused", true)
    }

    fn show_stopped(&self, identity: &str) -> bool {
        self.player_flag(identity, "show_stopped", false)
    }
}

/// Recursively merge `overlay` into `base`: mappings merge per key,
/// anything else replaces the base value.
fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

fn duration_or(value: Option<&Value>, default_secs: f64) -> Duration {
    let secs = value.and_then(Value::as_f64).unwrap_or(default_secs);
    Duration::from_secs_f64(secs.max(0.0))
}

/// User file location: `<config root>/mpris-rp/config.yaml`.
fn user_config_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}
