//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rstax/rstax.toml`
//! 3. Local config: `<dir>/.rstax.toml` (working directory)
//! 4. Environment variables: `RSTAX_*` prefix

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::weights::{WeightConfig, FALLBACK_WEIGHT};

/// Weight settings as written in config files. Level keys are strings
/// ("1".."5") because TOML tables key by string; `weight_config()`
/// parses and validates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeightSettings {
    /// Weight for nodes with neither an override nor a level default
    pub fallback: f64,
    /// Default weight per depth level ("1".."5")
    pub level_defaults: BTreeMap<String, f64>,
    /// Explicit weight per node id
    pub node_overrides: BTreeMap<String, f64>,
}

impl Default for WeightSettings {
    fn default() -> Self {
        Self {
            fallback: FALLBACK_WEIGHT,
            level_defaults: BTreeMap::new(),
            node_overrides: BTreeMap::new(),
        }
    }
}

/// Raw weight settings for intermediate parsing (fields are Option to
/// distinguish "not specified, inherit" from explicit values).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawWeightSettings {
    pub fallback: Option<f64>,
    pub level_defaults: Option<BTreeMap<String, f64>>,
    pub node_overrides: Option<BTreeMap<String, f64>>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub actor: Option<String>,
    pub log_path: Option<PathBuf>,
    #[serde(default)]
    pub weights: RawWeightSettings,
}

impl WeightSettings {
    /// Merge overlay onto self: scalar wins if Some, maps merge per key
    /// (overlay entries override, base entries without a counterpart
    /// survive).
    pub fn merge(&self, overlay: &RawWeightSettings) -> Self {
        Self {
            fallback: overlay.fallback.unwrap_or(self.fallback),
            level_defaults: merge_map(&self.level_defaults, overlay.level_defaults.as_ref()),
            node_overrides: merge_map(&self.node_overrides, overlay.node_overrides.as_ref()),
        }
    }
}

fn merge_map(
    base: &BTreeMap<String, f64>,
    overlay: Option<&BTreeMap<String, f64>>,
) -> BTreeMap<String, f64> {
    let mut merged = base.clone();
    if let Some(overlay) = overlay {
        for (key, value) in overlay {
            merged.insert(key.clone(), *value);
        }
    }
    merged
}

/// Unified configuration for rstax.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Actor recorded on audit entries (default: $USER)
    pub actor: String,
    /// Default audit log location (JSON lines)
    pub log_path: PathBuf,
    /// Rollup weight settings
    pub weights: WeightSettings,
}

impl Default for Settings {
    fn default() -> Self {
        // Try $USER, fall back to a fixed label
        let actor = std::env::var("USER").unwrap_or_else(|_| "unknown".into());

        Self {
            actor,
            log_path: default_log_path(),
            weights: WeightSettings::default(),
        }
    }
}

/// Default audit log path (~/.rstax/audit.jsonl).
fn default_log_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".rstax").join("audit.jsonl"))
        .unwrap_or_else(|| PathBuf::from("~/.rstax/audit.jsonl"))
}

/// Get the XDG config directory for rstax.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rstax").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rstax.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".rstax.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins where
    /// specified, weight maps merge per key.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            actor: overlay.actor.clone().unwrap_or_else(|| self.actor.clone()),
            log_path: overlay
                .log_path
                .clone()
                .unwrap_or_else(|| self.log_path.clone()),
            weights: self.weights.merge(&overlay.weights),
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.log_path.to_string_lossy().as_ref());
        self.log_path = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory searched for `.rstax.toml` (None skips
    ///   the local layer)
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/rstax/rstax.toml`
    /// 3. Local config: `<local_dir>/.rstax.toml`
    /// 4. Environment variables: `RSTAX_*` prefix
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply RSTAX_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("RSTAX")
                .separator("__")
                .list_separator(","),
        );
        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("actor") {
            settings.actor = val;
        }
        if let Ok(val) = config.get_string("log_path") {
            settings.log_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_float("weights.fallback") {
            settings.weights.fallback = val;
        }

        Ok(settings)
    }

    /// Convert the weight settings into a validated domain config.
    ///
    /// Level keys must parse as integers; negative weights and levels
    /// outside 1..=5 are rejected.
    pub fn weight_config(&self) -> Result<WeightConfig, ApplicationError> {
        let mut level_defaults = BTreeMap::new();
        for (key, weight) in &self.weights.level_defaults {
            let level: u8 = key.parse().map_err(|_| ApplicationError::Config {
                message: format!("weight level key is not a number: {key}"),
            })?;
            level_defaults.insert(level, *weight);
        }
        let config = WeightConfig {
            level_defaults,
            node_overrides: self.weights.node_overrides.clone(),
            fallback: self.weights.fallback,
        };
        config.validate()?;
        Ok(config)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rstax configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rstax/rstax.toml
#   Local:  ./.rstax.toml
#   Env:    RSTAX_* environment variables (e.g. RSTAX_ACTOR,
#           RSTAX_WEIGHTS__FALLBACK)

# Actor recorded on audit entries
# actor = "jane.doe"

# Audit log location (JSON lines)
# log_path = "~/.rstax/audit.jsonl"

[weights]
# Weight for nodes with neither an override nor a level default
# fallback = 1.0

# Default weight per depth level (1-based from the roots, max 5)
# [weights.level_defaults]
# "1" = 1.0
# "2" = 2.0

# Explicit weight per node id (beats the level default)
# [weights.node_overrides]
# "payment-fraud" = 3.0
"#
        .to_string()
    }
}

/// Expand environment variables and `~` in a path string.
///
/// Uses shellexpand; an unexpandable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
