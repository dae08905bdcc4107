//! Runtime configuration resolved from the environment.
//!
//! | Variable               | Default                               |
//! |------------------------|---------------------------------------|
//! | `CLASSTRACK_DATA_DIR`  | `<temp dir>/classtrack`               |
//! | `CLASSTRACK_DB_PATH`   | `<data dir>/classtrack.sqlite3`       |
//! | `CLASSTRACK_LOG_LEVEL` | `default_log_level()`                 |
//!
//! Blank values are treated as unset.

use crate::logging::{default_log_level, normalize_level};
use std::path::PathBuf;

pub const ENV_DATA_DIR: &str = "CLASSTRACK_DATA_DIR";
pub const ENV_DB_PATH: &str = "CLASSTRACK_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CLASSTRACK_LOG_LEVEL";

const DATA_DIR_NAME: &str = "classtrack";
const DB_FILE_NAME: &str = "classtrack.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    /// Normalized log level (`trace|debug|info|warn|error`).
    pub log_level: String,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    /// - The configured log level is not recognized.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_dir = read(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DATA_DIR_NAME));
        let db_path = read(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME));
        let log_level = match read(ENV_LOG_LEVEL) {
            Some(level) => normalize_level(&level)?,
            None => default_log_level(),
        };

        Ok(Self {
            data_dir,
            db_path,
            log_level: log_level.to_string(),
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(vars: &[(&str, &str)]) -> Result<AppConfig, String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_live_under_temp_dir() {
        let config = resolve(&[]).unwrap();
        assert_eq!(config.data_dir, std::env::temp_dir().join("classtrack"));
        assert_eq!(config.db_path, config.data_dir.join("classtrack.sqlite3"));
        assert_eq!(config.log_dir(), config.data_dir.join("logs"));
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn explicit_values_override_defaults_and_blank_is_unset() {
        let config = resolve(&[
            (ENV_DATA_DIR, "/srv/planner"),
            (ENV_DB_PATH, "  "),
            (ENV_LOG_LEVEL, "Warning"),
        ])
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/planner"));
        assert_eq!(config.db_path, PathBuf::from("/srv/planner/classtrack.sqlite3"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        assert!(resolve(&[(ENV_LOG_LEVEL, "loud")]).is_err());
    }
}
