//! Engine configuration
//!
//! Serde-deserializable configuration with file and environment sources.
//! Every field has a default so the engine runs with no config file at
//! all; `GLINT_*` environment variables override file values.

use crate::error::EngineError;
use crate::logging::LoggingConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration for the glint engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlintConfig {
    /// Manual-override icon directory. Read-only to the engine; a file
    /// named `<tile-id>.png` here always wins over everything else.
    #[serde(default = "default_override_dir")]
    pub override_dir: PathBuf,

    /// Managed icon cache directory, owned exclusively by the engine.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Location of the sled database holding the attempt and gradient
    /// tables.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Identifying user agent sent with every fetch.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Days during which a failed fetch attempt is not retried.
    #[serde(default = "default_retry_suppression_days")]
    pub retry_suppression_days: i64,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "glint")
}

fn default_override_dir() -> PathBuf {
    PathBuf::from("icons")
}

fn default_cache_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.cache_dir().join("icons"))
        .unwrap_or_else(|| PathBuf::from(".glint/icons"))
}

fn default_store_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("store"))
        .unwrap_or_else(|| PathBuf::from(".glint/store"))
}

fn default_user_agent() -> String {
    format!("glint/{}", env!("CARGO_PKG_VERSION"))
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_retry_suppression_days() -> i64 {
    30
}

impl Default for GlintConfig {
    fn default() -> Self {
        Self {
            override_dir: default_override_dir(),
            cache_dir: default_cache_dir(),
            store_path: default_store_path(),
            user_agent: default_user_agent(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            retry_suppression_days: default_retry_suppression_days(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GlintConfig {
    /// Load configuration, merging (lowest to highest precedence):
    /// defaults, the given config file, `GLINT_*` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self, EngineError> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("GLINT").separator("__"),
        );

        let settings = builder.build()?;

        // Deserialize into a partial view so absent keys fall back to the
        // serde defaults above.
        let config: GlintConfig = settings.try_deserialize()?;
        Ok(config)
    }
}
