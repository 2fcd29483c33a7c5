//! Configuration loading.
//!
//! # Hierarchy
//!
//! Later layers override earlier ones:
//! 1. Built-in defaults
//! 2. TOML file given with `--config`
//! 3. Environment variables: `HOSTSYNC_*`
//! 4. CLI flags
//!
//! # Example Config
//!
//! ```toml
//! [api]
//! url = "https://zabbix.example.com/zabbix/api_jsonrpc.php"
//! timeout_secs = 30
//!
//! [import]
//! default_template_group = "Templates/Imported"
//! agent_port = "10050"
//! update_visible_name = true
//! continue_on_error = true
//! delimiter = ";"
//! sheet = "Hosts"
//! ```

use std::path::{Path, PathBuf};

use hostsync_core::DEFAULT_SHEET;
use hostsync_reconciler::{
    DEFAULT_AGENT_PORT, DEFAULT_TEMPLATE_GROUP, ReconcilerConfig, RunMode, RunPolicy,
    text::DEFAULT_MAX_NAME_LEN,
};
use hostsync_rpc::ApiConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the default template group.
pub const ENV_DEFAULT_TEMPLATE_GROUP: &str = "HOSTSYNC_DEFAULT_TEMPLATE_GROUP";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error(transparent)]
    Api(#[from] hostsync_rpc::Error),
}

/// Whole application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub import: ImportSettings,
}

/// Settings for one import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub default_template_group: String,
    pub agent_port: String,
    pub update_visible_name: bool,
    pub update_technical_name: bool,
    pub max_name_len: usize,
    pub continue_on_error: bool,
    /// Source field delimiter, a single ASCII character.
    pub delimiter: char,
    /// Worksheet read from workbook sources.
    pub sheet: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            default_template_group: DEFAULT_TEMPLATE_GROUP.to_string(),
            agent_port: DEFAULT_AGENT_PORT.to_string(),
            update_visible_name: true,
            update_technical_name: false,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            continue_on_error: true,
            delimiter: ';',
            sheet: DEFAULT_SHEET.to_string(),
        }
    }
}

impl ImportSettings {
    /// Engine configuration for the given mode.
    pub fn reconciler_config(&self, mode: RunMode) -> ReconcilerConfig {
        ReconcilerConfig {
            mode,
            default_template_group: self.default_template_group.clone(),
            agent_port: self.agent_port.clone(),
            update_visible_name: self.update_visible_name,
            update_technical_name: self.update_technical_name,
            max_name_len: self.max_name_len,
        }
    }

    pub const fn run_policy(&self) -> RunPolicy {
        RunPolicy {
            continue_on_error: self.continue_on_error,
        }
    }

    /// Delimiter as a byte.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for non-ASCII delimiters.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| ConfigError::Invalid {
                key: "delimiter".to_string(),
                reason: format!("'{}' is not a single ASCII character", self.delimiter),
            })
    }
}

impl AppConfig {
    /// Defaults, then the optional TOML file, then the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed, or an
    /// environment variable holds an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = path.map_or_else(|| Ok(Self::default()), Self::from_file)?;
        base.overlay_vars(|key| std::env::var(key).ok())
    }

    /// Parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Read` or `Parse`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Overlay `HOSTSYNC_*` variables from an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is set but unparsable.
    pub fn overlay_vars(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(group) = lookup(ENV_DEFAULT_TEMPLATE_GROUP).filter(|g| !g.trim().is_empty()) {
            self.import.default_template_group = group;
        }
        self.api = self.api.overlay_vars(lookup)?;
        Ok(self)
    }
}
