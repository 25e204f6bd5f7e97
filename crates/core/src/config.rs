//! Workspace configuration
//!
//! Defaults suit an interactive session. Every value can be overridden
//! programmatically with the `with_*` builders or through environment
//! variables with [`WorkspaceConfig::from_env`].

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DEBOUNCE_MS: &str = "GUIDELENS_DEBOUNCE_MS";
pub const ENV_SHEET_DEBOUNCE_MS: &str = "GUIDELENS_SHEET_DEBOUNCE_MS";
pub const ENV_DATA_DIR: &str = "GUIDELENS_DATA_DIR";
pub const ENV_DIRECTORY_ACCESS: &str = "GUIDELENS_DIRECTORY_ACCESS";

#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    /// Idle window before a project change is written.
    pub debounce: Duration,
    /// Idle window before analysis-sheet drafts merge into the project.
    pub sheet_debounce: Duration,
    /// How often the background auto-save checks for due writes.
    pub auto_save_interval: Duration,
    /// Home of the local fallback store and the remembered directory.
    pub data_dir: Option<PathBuf>,
    /// Whether a project directory may be granted at all.
    pub directory_access: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(800),
            sheet_debounce: Duration::from_millis(600),
            auto_save_interval: Duration::from_millis(100),
            data_dir: None,
            directory_access: true,
        }
    }
}

impl WorkspaceConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_sheet_debounce(mut self, debounce: Duration) -> Self {
        self.sheet_debounce = debounce;
        self
    }

    pub fn with_auto_save_interval(mut self, interval: Duration) -> Self {
        self.auto_save_interval = interval;
        self
    }

    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_directory_access(mut self, enabled: bool) -> Self {
        self.directory_access = enabled;
        self
    }

    /// Defaults overridden by environment variables.
    ///
    /// - `GUIDELENS_DEBOUNCE_MS`: project write debounce in milliseconds
    /// - `GUIDELENS_SHEET_DEBOUNCE_MS`: sheet draft debounce in milliseconds
    /// - `GUIDELENS_DATA_DIR`: local data directory
    /// - `GUIDELENS_DIRECTORY_ACCESS`: `0`/`false` disables project directories
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DEBOUNCE_MS) {
            config.debounce = parse_millis(ENV_DEBOUNCE_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_SHEET_DEBOUNCE_MS) {
            config.sheet_debounce = parse_millis(ENV_SHEET_DEBOUNCE_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_DATA_DIR) {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue { key: ENV_DATA_DIR, value });
            }
            config.data_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_DIRECTORY_ACCESS) {
            config.directory_access = parse_flag(ENV_DIRECTORY_ACCESS, &value)?;
        }

        Ok(config)
    }
}

fn parse_millis(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidValue { key, value: value.to_owned() })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: value.to_owned() }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
