use crate::error::CompilerError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Thresholds the timing validator checks recorded delays against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Longest allowed gap between two consecutive inputs.
    pub timeout_ms: i64,
    /// Shortest allowed gap between two consecutive inputs.
    pub debounce_ms: i64,
    /// Longest allowed sum of all delays in a sequence.
    pub max_sequence_ms: i64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            debounce_ms: 50,
            max_sequence_ms: 10000,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), CompilerError> {
        if self.timeout_ms <= 0 || self.debounce_ms <= 0 || self.max_sequence_ms <= 0 {
            return Err(CompilerError::Config(format!(
                "timing thresholds must be positive, got timeout {}ms, debounce {}ms, max sequence {}ms",
                self.timeout_ms, self.debounce_ms, self.max_sequence_ms
            )));
        }
        if self.debounce_ms > self.timeout_ms {
            return Err(CompilerError::Config(format!(
                "debounce ({}ms) must not exceed timeout ({}ms)",
                self.debounce_ms, self.timeout_ms
            )));
        }
        if self.timeout_ms > self.max_sequence_ms {
            return Err(CompilerError::Config(format!(
                "timeout ({}ms) must not exceed the maximum sequence duration ({}ms)",
                self.timeout_ms, self.max_sequence_ms
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub env_name: String,
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            env_name: env::var("MKC_ENV").unwrap_or_else(|_| String::from("default")),
            timing: TimingConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file for the current environment (defaults when it
    /// does not exist yet), then apply `MKC_*` environment overrides.
    pub fn load() -> Result<Self, CompilerError> {
        let path = Self::get_config_path();
        let config = if path.exists() {
            Self::load_from(&path)?
        } else {
            debug!("no config file at {}, using defaults", path.display());
            Config::default()
        };

        let config = config.with_overrides(|key| env::var(key).ok())?;
        config.timing.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, CompilerError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self) -> Result<(), CompilerError> {
        self.save_to(&Self::get_config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CompilerError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `MKC_TIMEOUT_MS`, `MKC_DEBOUNCE_MS` and `MKC_MAX_SEQUENCE_MS`
    /// as returned by `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, CompilerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides: [(&str, &mut i64); 3] = [
            ("MKC_TIMEOUT_MS", &mut self.timing.timeout_ms),
            ("MKC_DEBOUNCE_MS", &mut self.timing.debounce_ms),
            ("MKC_MAX_SEQUENCE_MS", &mut self.timing.max_sequence_ms),
        ];

        for (key, slot) in overrides {
            if let Some(raw) = lookup(key) {
                let value = raw.trim().parse::<i64>().map_err(|_| {
                    CompilerError::Config(format!("{} must be an integer, got {:?}", key, raw))
                })?;
                debug!("{} overrides {} with {}", key, *slot, value);
                *slot = value;
            }
        }

        Ok(self)
    }

    pub fn get_config_path() -> PathBuf {
        if let Ok(custom) = env::var("MKC_CONFIG") {
            return PathBuf::from(custom);
        }

        let env_name = env::var("MKC_ENV").unwrap_or_else(|_| String::from("default"));
        let home_var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
        let home = env::var(home_var).unwrap_or_else(|_| {
            warn!("{} is not set, keeping config under the current directory", home_var);
            String::from(".")
        });

        PathBuf::from(home)
            .join(".mkc")
            .join(env_name)
            .join("config.json")
    }
}
