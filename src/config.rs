use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    ARTIFACT_DIR_NAME, COMPILE_BUDGET, COMPILER_ENV, DEFAULT_COMPILER, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_WORKERS, EXECUTE_BUDGET, NO_COLOR_ENV, TMPDIR_ENV, WORKERS_ENV,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidWorkers { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub compiler: PathBuf,
    pub workers: usize,
    pub queue_capacity: usize,
    pub compile_budget: Duration,
    pub execute_budget: Duration,
    pub artifact_dir: PathBuf,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compiler: PathBuf::from(DEFAULT_COMPILER),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            compile_budget: COMPILE_BUDGET,
            execute_budget: EXECUTE_BUDGET,
            artifact_dir: std::env::temp_dir().join(ARTIFACT_DIR_NAME),
            color: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source, falling back to
    /// the defaults for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(compiler) = lookup(COMPILER_ENV).filter(|v| !v.is_empty()) {
            config.compiler = PathBuf::from(compiler);
        }
        if let Some(value) = lookup(WORKERS_ENV) {
            config.workers = match value.trim().parse::<usize>() {
                Ok(workers) if workers > 0 => workers,
                _ => {
                    return Err(ConfigError::InvalidWorkers {
                        name: WORKERS_ENV,
                        value,
                    });
                }
            };
        }
        if let Some(dir) = lookup(TMPDIR_ENV).filter(|v| !v.is_empty()) {
            config.artifact_dir = PathBuf::from(dir);
        }
        // https://no-color.org: any non-empty value disables colors.
        if lookup(NO_COLOR_ENV).is_some_and(|v| !v.is_empty()) {
            config.color = false;
        }

        Ok(config)
    }
}
