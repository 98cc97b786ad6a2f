use crate::error::{RankevalError, Result};
use crate::ingest::GroundTruthColumns;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "rankeval.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub eval: EvalConfig,
}

/// Input files and ground-truth column names
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub ground_truth: Option<PathBuf>,
    #[serde(default)]
    pub predictions: Option<PathBuf>,
    #[serde(default = "default_qid_column")]
    pub qid_column: String,
    #[serde(default = "default_relevant_column")]
    pub relevant_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            ground_truth: None,
            predictions: None,
            qid_column: default_qid_column(),
            relevant_column: default_relevant_column(),
        }
    }
}

/// Evaluation settings as written in the config file (unvalidated)
#[derive(Debug, Clone, Deserialize)]
pub struct EvalConfig {
    #[serde(default = "default_k")]
    pub k: i64,
    #[serde(default = "default_sample_size")]
    pub sample_size: i64,
    #[serde(default)]
    pub parallel: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            sample_size: default_sample_size(),
            parallel: false,
        }
    }
}

fn default_qid_column() -> String {
    "qid".to_string()
}

fn default_relevant_column() -> String {
    "cid".to_string()
}

fn default_k() -> i64 {
    10
}

fn default_sample_size() -> i64 {
    5
}

/// Validated evaluation options passed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// Rank cutoff K (> 0).
    pub k: usize,
    /// Number of per-query results kept in the report sample.
    pub sample_size: usize,
    /// Score queries on the rayon thread pool.
    pub parallel: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            k: 10,
            sample_size: 5,
            parallel: false,
        }
    }
}

impl EvalOptions {
    /// Validate a cutoff and sample size. K must be positive, the sample size
    /// must not be negative.
    pub fn new(k: i64, sample_size: i64) -> Result<Self> {
        if k <= 0 {
            return Err(RankevalError::Config(format!(
                "k must be greater than 0 (got {})",
                k
            )));
        }
        if sample_size < 0 {
            return Err(RankevalError::Config(format!(
                "sample_size must not be negative (got {})",
                sample_size
            )));
        }
        let k = usize::try_from(k)
            .map_err(|_| RankevalError::Config(format!("k is too large: {}", k)))?;
        let sample_size = usize::try_from(sample_size).map_err(|_| {
            RankevalError::Config(format!("sample_size is too large: {}", sample_size))
        })?;
        Ok(Self {
            k,
            sample_size,
            parallel: false,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Command-line values that replace `[eval]` settings when present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalOverrides {
    pub k: Option<i64>,
    pub sample_size: Option<i64>,
    pub parallel: Option<bool>,
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. `path`, when given
    /// 2. Path specified in RANKEVAL_CONFIG environment variable
    /// 3. ./rankeval.toml in current directory (optional: defaults are used if absent)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let (config_path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match std::env::var("RANKEVAL_CONFIG") {
                Ok(p) => (PathBuf::from(p), true),
                Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
            },
        };

        if !required && !config_path.exists() {
            log::debug!(
                "No {} found, using default configuration",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
            RankevalError::Config(format!(
                "Failed to read config file {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let config = Self::from_toml(&config_str)?;
        log::debug!("Loaded configuration from {}", config_path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// `[eval]` values are validated when options are resolved, so command-line
    /// overrides can replace an invalid file value.
    pub fn from_toml(config_str: &str) -> Result<Self> {
        toml::from_str(config_str)
            .map_err(|e| RankevalError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validated evaluation options from the `[eval]` section.
    pub fn eval_options(&self) -> Result<EvalOptions> {
        self.resolve_options(&EvalOverrides::default())
    }

    /// Validated evaluation options, each override taking precedence over the
    /// `[eval]` value.
    pub fn resolve_options(&self, overrides: &EvalOverrides) -> Result<EvalOptions> {
        let options = EvalOptions::new(
            overrides.k.unwrap_or(self.eval.k),
            overrides.sample_size.unwrap_or(self.eval.sample_size),
        )?;
        Ok(options.with_parallel(overrides.parallel.unwrap_or(self.eval.parallel)))
    }

    pub fn columns(&self) -> GroundTruthColumns {
        GroundTruthColumns {
            query_id: self.input.qid_column.clone(),
            relevant_ids: self.input.relevant_column.clone(),
        }
    }
}
