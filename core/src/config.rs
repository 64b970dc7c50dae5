use docsearch_protocol::CategoryTable;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::pagination::DEFAULT_PAGE_SIZE;

const DOCSEARCH_HOME_ENV_VAR: &str = "DOCSEARCH_HOME";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Tuning for the search screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Documents requested per page; also the exhaustion threshold.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Quiescence window before a tag suggestion lookup is issued.
    #[serde(default = "default_suggestion_debounce_ms")]
    pub suggestion_debounce_ms: u64,

    /// Shortest tag input that triggers a lookup.
    #[serde(default = "default_min_suggestion_chars")]
    pub min_suggestion_chars: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub categories: CategoryTable,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_suggestion_debounce_ms() -> u64 {
    500
}

fn default_min_suggestion_chars() -> usize {
    2
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            suggestion_debounce_ms: default_suggestion_debounce_ms(),
            min_suggestion_chars: default_min_suggestion_chars(),
            request_timeout_secs: default_request_timeout_secs(),
            categories: CategoryTable::default(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be > 0".to_string()));
        }
        if self.min_suggestion_chars == 0 {
            return Err(ConfigError::Invalid(
                "min_suggestion_chars must be > 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn suggestion_debounce(&self) -> Duration {
        Duration::from_millis(self.suggestion_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Directory holding `config.toml` and the persisted session.
///
/// `$DOCSEARCH_HOME` wins when set; otherwise `~/.docsearch`. The directory is
/// not required to exist.
pub fn find_docsearch_home() -> Result<PathBuf, ConfigError> {
    if let Ok(val) = std::env::var(DOCSEARCH_HOME_ENV_VAR)
        && !val.is_empty()
    {
        return Ok(PathBuf::from(val));
    }
    let mut home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    home.push(".docsearch");
    Ok(home)
}

/// Parse a TOML config file, falling back to defaults when it does not exist.
pub fn load_config_file<T>(path: &Path) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(T::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
