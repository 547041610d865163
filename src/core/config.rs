//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const INFERENCE_COMMAND_ENV: &str = "OUIJA_INFERENCE_COMMAND";
pub const LOG_ENV: &str = "OUIJA_LOG";

/// Errors loading an explicitly requested config file
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(ouija::config::read))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    #[diagnostic(
        code(ouija::config::parse),
        help("Expected YAML with optional `inference.command`, `inference.timeout_secs` and `log` keys")
    )]
    Parse { path: PathBuf, message: String },
}

/// How to reach the inference service
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Program and arguments; the request arrives on stdin
    pub command: Option<Vec<String>>,

    /// Seconds before the command is killed
    pub timeout_secs: u64,
}

impl InferenceConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Ouija configuration with layered hierarchy
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub inference: InferenceConfig,

    /// Log filter directive, e.g. `ouija=debug`
    pub log: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/ouija/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(global) = Self::from_file(&global_path) {
                    config.merge(global);
                }
            }
        }

        // 3. Environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    /// Load with an explicit file in place of the global one.
    ///
    /// Unlike the global file, an explicit file that can't be read is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.merge(Self::from_file(path)?);
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse one YAML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        // An empty file deserializes to unit, not to an empty map
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents)
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ouija")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.inference.command.is_some() {
            self.inference.command = other.inference.command;
        }
        if other.inference.timeout_secs != InferenceConfig::DEFAULT_TIMEOUT_SECS {
            self.inference.timeout_secs = other.inference.timeout_secs;
        }
        if other.log.is_some() {
            self.log = other.log;
        }
    }

    /// Overlay environment variables read through `var`
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(command) = var(INFERENCE_COMMAND_ENV) {
            let parts: Vec<String> = command.split_whitespace().map(String::from).collect();
            if !parts.is_empty() {
                self.inference.command = Some(parts);
            }
        }
        if let Some(log) = var(LOG_ENV) {
            if !log.trim().is_empty() {
                self.log = Some(log);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.inference.command, None);
        assert_eq!(config.inference.timeout_secs, 60);
        assert_eq!(config.log, None);
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "inference:\n  command: [llm, -m, small]\n  timeout_secs: 10\nlog: ouija=debug\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(
            config.inference.command,
            Some(vec!["llm".to_string(), "-m".to_string(), "small".to_string()])
        );
        assert_eq!(config.inference.timeout_secs, 10);
        assert_eq!(config.log.as_deref(), Some("ouija=debug"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "log: warn\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.inference.timeout_secs, 60);
        assert_eq!(config.log.as_deref(), Some("warn"));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_bad_yaml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "inference: [not, a, map]\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_merge_precedence() {
        let mut base = Config {
            inference: InferenceConfig {
                command: Some(vec!["a".into()]),
                timeout_secs: 30,
            },
            log: Some("info".into()),
        };
        base.merge(Config {
            inference: InferenceConfig {
                command: Some(vec!["b".into()]),
                timeout_secs: InferenceConfig::DEFAULT_TIMEOUT_SECS,
            },
            log: None,
        });
        assert_eq!(base.inference.command, Some(vec!["b".to_string()]));
        assert_eq!(base.inference.timeout_secs, 30);
        assert_eq!(base.log.as_deref(), Some("info"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            (INFERENCE_COMMAND_ENV, "ollama run  llama3"),
            (LOG_ENV, "ouija=trace"),
        ]));
        assert_eq!(
            config.inference.command,
            Some(vec![
                "ollama".to_string(),
                "run".to_string(),
                "llama3".to_string()
            ])
        );
        assert_eq!(config.log.as_deref(), Some("ouija=trace"));
    }

    #[test]
    fn test_blank_env_ignored() {
        let mut config = Config::default();
        config.inference.command = Some(vec!["keep".into()]);
        config.apply_env(env(&[(INFERENCE_COMMAND_ENV, "  "), (LOG_ENV, "")]));
        assert_eq!(config.inference.command, Some(vec!["keep".to_string()]));
        assert_eq!(config.log, None);
    }
}
