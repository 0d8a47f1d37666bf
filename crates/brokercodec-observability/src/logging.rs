//! Log configuration and subscriber initialisation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Log levels, globally and per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error" | "off"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component (crate name, dashes allowed): component → level
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: BTreeMap::new(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log level '{level}' for {target}")]
    UnknownLevel { target: String, level: String },

    #[error("invalid filter directive: {0}")]
    Filter(String),

    #[error("a global subscriber is already installed")]
    AlreadyInitialised,
}

impl LogConfig {
    /// Set `level` as the override for `component`.
    pub fn with_component(mut self, component: impl Into<String>, level: impl Into<String>) -> Self {
        self.components.insert(component.into(), level.into());
        self
    }

    /// `EnvFilter` directive string, e.g. `warn,brokercodec_evm=trace`.
    pub fn directives(&self) -> Result<String, LoggingError> {
        check_level("default", &self.level)?;
        let mut directives = self.level.to_ascii_lowercase();
        for (component, level) in &self.components {
            check_level(component, level)?;
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level.to_ascii_lowercase()));
        }
        Ok(directives)
    }
}

fn check_level(target: &str, level: &str) -> Result<(), LoggingError> {
    if LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(LoggingError::UnknownLevel {
            target: target.into(),
            level: level.into(),
        })
    }
}

/// Install the global subscriber. `RUST_LOG`, when set, replaces the
/// configured levels.
pub fn init_tracing(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.directives()?).map_err(|e| LoggingError::Filter(e.to_string()))?,
    };

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    installed.map_err(|_| LoggingError::AlreadyInitialised)?;
    tracing::debug!(json = config.json, "tracing initialised");
    Ok(())
}
