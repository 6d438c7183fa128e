//! Lookup configuration.
//!
//! Configuration can be set programmatically, loaded from environment
//! variables, or read from the `[options]` table of a world manifest.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `MODLOOKUP_IGNORE_UNNAMED_SPLIT` | Ignore the unnamed module when a split package is also visible from exactly one named module ("true"/"false") | false |
//! | `MODLOOKUP_TASK` | Name of the task doing the lookups, attached to every diagnostic event | main |
//! | `MODLOOKUP_QUIET_TASKS` | Comma separated task names whose diagnostics are muted | indexing,reconciler |
//!
//! # Example
//!
//! ```rust
//! use modlookup::LookupConfig;
//!
//! let config = LookupConfig::builder()
//!     .ignore_unnamed_module_for_split_package(true)
//!     .task("worker-1")
//!     .build()
//!     .unwrap();
//! assert!(config.ignore_unnamed_module_for_split_package);
//! ```

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by [`LookupConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid configuration for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Complete lookup configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LookupConfig {
    /// When exactly one named module and the unnamed module both expose a
    /// split package to a client, pick the named one instead of reporting
    /// the conflict.
    /// Default: false.
    #[serde(alias = "ignore_unnamed_module_for_split_package")]
    pub ignore_unnamed_module_for_split_package: bool,

    /// Name of the task using this environment.
    /// Default: "main".
    pub task: String,

    /// Task names whose diagnostics are muted.
    /// Default: background indexing and reconciling tasks.
    #[serde(alias = "quiet_tasks")]
    pub quiet_tasks: Vec<String>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            ignore_unnamed_module_for_split_package: false,
            task: "main".to_string(),
            quiet_tasks: vec!["indexing".to_string(), "reconciler".to_string()],
        }
    }
}

impl LookupConfig {
    /// Create a new builder for LookupConfig.
    pub fn builder() -> LookupConfigBuilder {
        LookupConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their default values.
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Override fields with any environment variables that are set.
    pub fn merge_env(mut self) -> Self {
        if let Some(val) = parse_env_bool("MODLOOKUP_IGNORE_UNNAMED_SPLIT") {
            self.ignore_unnamed_module_for_split_package = val;
        }
        if let Ok(val) = env::var("MODLOOKUP_TASK") {
            if !val.trim().is_empty() {
                self.task = val.trim().to_string();
            }
        }
        if let Ok(val) = env::var("MODLOOKUP_QUIET_TASKS") {
            self.quiet_tasks = parse_list(&val);
        }
        self
    }

    /// Whether diagnostics of the configured task are muted.
    pub fn is_quiet(&self) -> bool {
        self.quiet_tasks.iter().any(|t| t == &self.task)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.task.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "task".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Builder for LookupConfig.
#[derive(Debug, Clone, Default)]
pub struct LookupConfigBuilder {
    config: LookupConfig,
}

impl LookupConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable ignoring the unnamed module for split packages.
    pub fn ignore_unnamed_module_for_split_package(mut self, enabled: bool) -> Self {
        self.config.ignore_unnamed_module_for_split_package = enabled;
        self
    }

    /// Set the task name.
    pub fn task(mut self, task: impl Into<String>) -> Self {
        self.config.task = task.into();
        self
    }

    /// Replace the set of muted task names.
    pub fn quiet_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.quiet_tasks = tasks.into_iter().map(Into::into).collect();
        self
    }

    /// Build the configuration, validating it first.
    pub fn build(self) -> Result<LookupConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Parse an environment variable as bool.
fn parse_env_bool(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|s| match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    })
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
