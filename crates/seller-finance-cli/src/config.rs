//! Runtime settings for the CLI.
//!
//! ## Data directory resolution
//!
//! 1. `--data-dir` flag
//! 2. `SFC_DATA_DIR` environment variable
//! 3. Platform data directory (`~/.local/share/seller-finance` on Linux,
//!    `~/Library/Application Support/seller-finance` on macOS,
//!    `%APPDATA%\seller-finance\data` on Windows)

use std::collections::HashMap;
use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;

pub const DATA_DIR_ENV: &str = "SFC_DATA_DIR";
const SCENARIOS_FILE: &str = "scenarios.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine a data directory; set SFC_DATA_DIR or pass --data-dir")]
    NoDataDir,
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone)]
pub struct Settings {
    data_dir: PathBuf,
}

impl Settings {
    pub fn resolve(flag: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::from_env_map(flag, std::env::vars().collect())
    }

    pub fn from_env_map(
        flag: Option<PathBuf>,
        env_map: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        if let Some(dir) = flag {
            return Ok(Self { data_dir: dir });
        }

        if let Some(custom) = env_map.get(DATA_DIR_ENV) {
            if custom.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    DATA_DIR_ENV.to_string(),
                    "must not be empty".to_string(),
                ));
            }
            return Ok(Self {
                data_dir: PathBuf::from(custom),
            });
        }

        let dirs = ProjectDirs::from("", "", "seller-finance").ok_or(ConfigError::NoDataDir)?;
        Ok(Self {
            data_dir: dirs.data_dir().to_path_buf(),
        })
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn scenarios_file(&self) -> PathBuf {
        self.data_dir.join(SCENARIOS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins() {
        let env = HashMap::from([(DATA_DIR_ENV.to_string(), "/from/env".to_string())]);
        let s = Settings::from_env_map(Some(PathBuf::from("/from/flag")), env).unwrap();
        assert_eq!(s.data_dir(), &PathBuf::from("/from/flag"));
    }

    #[test]
    fn test_env_override() {
        let env = HashMap::from([(DATA_DIR_ENV.to_string(), "/tmp/sfc".to_string())]);
        let s = Settings::from_env_map(None, env).unwrap();
        assert_eq!(s.scenarios_file(), PathBuf::from("/tmp/sfc/scenarios.json"));
    }

    #[test]
    fn test_empty_env_rejected() {
        let env = HashMap::from([(DATA_DIR_ENV.to_string(), "  ".to_string())]);
        assert!(matches!(
            Settings::from_env_map(None, env),
            Err(ConfigError::InvalidValue(..))
        ));
    }
}
