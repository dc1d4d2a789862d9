// Copyright 2025 Stone Ridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dashboard configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. `srgraph.toml` in the working directory, or the file named by
//!    `SRGRAPH_CONFIG` (optional)
//! 3. `SRGRAPH_*` environment variables, e.g. `SRGRAPH_DATA_DIR`
//! 4. `PORT`, for hosts that assign the listen port that way
//!
//! A `.env` file is loaded into the environment first when present.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use srgraph_core::MalformedPolicy;
use std::path::{Path, PathBuf};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SRGRAPH";

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "srgraph.toml";

/// Dashboard service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Directory holding the record files.
    pub data_dir: PathBuf,
    /// Leave out malformed record files instead of failing the request.
    pub skip_malformed: bool,
    /// Emit logs as JSON lines.
    pub log_json: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            data_dir: PathBuf::from("data"),
            skip_malformed: false,
            log_json: false,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let file = std::env::var(format!("{}_CONFIG", ENV_PREFIX))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::from_sources(Some(&file), Environment::with_prefix(ENV_PREFIX))?
            .with_port_override(std::env::var("PORT").ok().as_deref())
    }

    /// Build configuration from an optional file and an environment source.
    pub fn from_sources(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
            .set_default("skip_malformed", defaults.skip_malformed)?
            .set_default("log_json", defaults.log_json)?;

        if let Some(file) = file {
            builder = builder.add_source(File::from(file).required(false));
        }

        builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Apply a bare `PORT` value, when set.
    pub fn with_port_override(mut self, port: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(port) = port {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Message(format!("invalid PORT value: {:?}", port)))?;
        }
        Ok(self)
    }

    /// Policy for record files that cannot be parsed.
    pub fn malformed_policy(&self) -> MalformedPolicy {
        if self.skip_malformed {
            MalformedPolicy::Skip
        } else {
            MalformedPolicy::Fail
        }
    }
}
