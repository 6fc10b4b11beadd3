//! Layered configuration for the harnesses.
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. `sampleconv.toml` (or an explicit path)
//! 3. `SAMPLECONV_*` environment variables, `__` separating nested keys
//!    (e.g. `SAMPLECONV_BENCH__NUM_ITERATIONS=100`)
//!
//! A missing file is not an error: a warning is logged and the remaining
//! layers still apply. Any other failure to read it is.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use figment::providers::{Env, Format as _, Serialized, Toml};
use figment::{Figment, Provider};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bench::BenchConfig;
use crate::check::CheckConfig;
use crate::error::{Error, Result};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "sampleconv.toml";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "SAMPLECONV_";

/// Logging defaults; `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `"info"` or `"sampleconv_core=debug"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete harness configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleconvConfig {
    /// Benchmark parameters.
    pub bench: BenchConfig,
    /// Correctness harness parameters.
    pub check: CheckConfig,
    /// Logging defaults.
    pub logging: LoggingConfig,
}

impl SampleconvConfig {
    /// Loads from [`CONFIG_FILE`] in the working directory plus environment.
    ///
    /// # Errors
    ///
    /// See [`SampleconvConfig::from_file`].
    pub fn load() -> Result<Self> {
        Self::from_file(CONFIG_FILE)
    }

    /// Loads from `path` plus environment.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when `path` exists but cannot be read, [`Error::Config`]
    /// when a layer cannot be parsed or the merged values fail validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "configuration file not found, using defaults"
                );
                String::new()
            }
            Err(e) => return Err(e.into()),
        };
        let config: Self = Self::figment(Toml::string(&text))
            .extract()
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then `file`, then the environment.
    fn figment(file: impl Provider) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] naming the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.bench.validate()?;
        self.check.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(Error::Config("logging.level must not be empty".into()));
        }
        Ok(())
    }

    /// Renders the configuration as TOML, e.g. to seed a config file.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
