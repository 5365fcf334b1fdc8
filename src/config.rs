use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::kernel::{
    HysteresisThresholds, KernelError, SignalWeights, error::invalid_config,
};

const DEFAULT_SCHEMA_FILE: &str = "coherence.schema.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub kernel: KernelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub failure_log: FailureLogConfig,
}

fn default_window_seconds() -> u64 {
    60
}

fn default_tick_seconds() -> u64 {
    5
}

fn default_lambda1() -> f64 {
    0.5
}

fn default_dmax() -> f64 {
    0.4
}

fn default_rmax() -> f64 {
    3.0
}

fn default_t_target() -> f64 {
    300.0
}

fn default_k() -> f64 {
    0.1
}

fn default_alpha() -> f64 {
    0.2
}

fn default_lookback_ticks() -> usize {
    3
}

fn default_epsilon() -> f64 {
    0.1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct KernelConfig {
    #[serde(default = "default_window_seconds")]
    #[validate(range(min = 1))]
    pub window_seconds: u64,
    #[serde(default = "default_tick_seconds")]
    #[validate(range(min = 1))]
    pub tick_seconds: u64,
    /// Decay rate of the violation signal.
    #[serde(default = "default_lambda1")]
    #[validate(range(min = 0.0))]
    pub lambda1: f64,
    /// Drift at which the drift signal saturates.
    #[serde(default = "default_dmax")]
    #[validate(range(exclusive_min = 0.0))]
    pub dmax: f64,
    /// Retries per request at which the retry signal saturates.
    #[serde(default = "default_rmax")]
    #[validate(range(exclusive_min = 0.0))]
    pub rmax: f64,
    /// Seconds since the last breaker reset at which staleness reaches 0.5.
    #[serde(default = "default_t_target")]
    #[validate(range(min = 0.0))]
    pub t_target: f64,
    /// Sigmoid steepness of the staleness signal.
    #[serde(default = "default_k")]
    #[validate(range(min = 0.0))]
    pub k: f64,
    #[serde(default)]
    #[validate(nested)]
    pub weights: SignalWeights,
    /// Share of the worst-case term in the risk blend.
    #[serde(default = "default_alpha")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub alpha: f64,
    #[serde(default = "default_lookback_ticks")]
    #[validate(range(min = 1))]
    pub lookback_ticks: usize,
    /// Stabilizer added to breaker capacity in the emergency index.
    #[serde(default = "default_epsilon")]
    #[validate(range(exclusive_min = 0.0))]
    pub epsilon: f64,
    #[serde(default)]
    #[validate(nested)]
    pub thresholds: HysteresisThresholds,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            tick_seconds: default_tick_seconds(),
            lambda1: default_lambda1(),
            dmax: default_dmax(),
            rmax: default_rmax(),
            t_target: default_t_target(),
            k: default_k(),
            weights: SignalWeights::default(),
            alpha: default_alpha(),
            lookback_ticks: default_lookback_ticks(),
            epsilon: default_epsilon(),
            thresholds: HysteresisThresholds::default(),
        }
    }
}

impl KernelConfig {
    pub fn validate_invariants(&self) -> Result<(), KernelError> {
        self.validate()
            .map_err(|errors| invalid_config(format!("invalid kernel config: {errors}")))
    }
}

fn default_failure_log_path() -> PathBuf {
    PathBuf::from("./state/panic.log")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureLogConfig {
    #[serde(default = "default_failure_log_path")]
    pub path: PathBuf,
}

impl Default for FailureLogConfig {
    fn default() -> Self {
        Self {
            path: default_failure_log_path(),
        }
    }
}

fn default_enabled_true() -> bool {
    true
}

fn default_logging_dir() -> PathBuf {
    PathBuf::from("./logs/coherence")
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_rotation() -> LoggingRotation {
    LoggingRotation::Daily
}

fn default_logging_retention_days() -> usize {
    14
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default = "default_logging_rotation")]
    pub rotation: LoggingRotation,
    #[serde(default = "default_logging_retention_days")]
    pub retention_days: usize,
    #[serde(default = "default_enabled_true")]
    pub stderr_warn_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logging_dir(),
            filter: default_logging_filter(),
            rotation: default_logging_rotation(),
            retention_days: default_logging_retention_days(),
            stderr_warn_enabled: true,
        }
    }
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let schema_path = resolve_schema_path(config_base, &config_value)?;
        validate_against_schema(&config_value, &schema_path)?;

        let mut config: Config = serde_json::from_value(config_value)
            .context("failed to deserialize coherence config")?;

        if !config.failure_log.path.is_absolute() {
            config.failure_log.path = config_base.join(&config.failure_log.path);
        }

        config
            .kernel
            .validate_invariants()
            .with_context(|| format!("rejected kernel section of {}", config_path.display()))?;

        Ok(config)
    }
}

fn resolve_schema_path(config_base: &Path, config_value: &Value) -> Result<PathBuf> {
    if let Some(path_text) = config_value.get("$schema").and_then(|value| value.as_str()) {
        let configured = PathBuf::from(path_text);
        if configured.is_absolute() {
            return Ok(configured);
        }
        return Ok(config_base.join(&configured));
    }

    let local_default = config_base.join(DEFAULT_SCHEMA_FILE);
    if local_default.exists() {
        return Ok(local_default);
    }

    Err(anyhow!(
        "unable to resolve schema path: expected $schema in config or {DEFAULT_SCHEMA_FILE} beside it"
    ))
}

fn validate_against_schema(config_value: &Value, schema_path: &Path) -> Result<()> {
    let schema_content = fs::read_to_string(schema_path)
        .with_context(|| format!("failed to read schema {}", schema_path.display()))?;
    let schema: Value = serde_json::from_str(&schema_content)
        .with_context(|| format!("failed to parse schema {}", schema_path.display()))?;

    let compiled =
        JSONSchema::compile(&schema).map_err(|e| anyhow!("failed to compile schema: {e}"))?;

    match compiled.validate(config_value) {
        Ok(()) => Ok(()),
        Err(errors_iter) => {
            let messages: Vec<String> = errors_iter
                .map(|error: ValidationError<'_>| error.to_string())
                .collect();
            Err(anyhow!("config validation failed: {}", messages.join("; ")))
        }
    }
}
