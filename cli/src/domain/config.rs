//! Domain types and validators for Berth configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Runtime CLI used when neither the config file nor `--runtime` names one.
pub const DEFAULT_RUNTIME_BINARY: &str = "nerdctl";

/// Per-command timeout applied to every runtime invocation.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.berth/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BerthConfig {
    /// Container runtime settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Container runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Runtime CLI binary (`nerdctl`, `docker`, `podman`, or a path).
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Seconds a single runtime command may run before it is killed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_binary() -> String {
    DEFAULT_RUNTIME_BINARY.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// ── Validators ───────────────────────────────────────────────────────────────

impl BerthConfig {
    /// Apply command-line overrides on top of the file values.
    #[must_use]
    pub fn with_overrides(mut self, binary: Option<&str>, timeout_secs: Option<u64>) -> Self {
        if let Some(binary) = binary {
            self.runtime.binary = binary.to_string();
        }
        if let Some(secs) = timeout_secs {
            self.runtime.timeout_secs = secs;
        }
        self
    }

    /// Reject values no runtime invocation could work with.
    ///
    /// # Errors
    ///
    /// Returns an error if the binary is blank or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.runtime.binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "runtime.binary".to_string(),
                value: self.runtime.binary.clone(),
                hint: "Name a runtime CLI such as nerdctl or docker.".to_string(),
            }
            .into());
        }
        if self.runtime.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "runtime.timeout_secs".to_string(),
                value: "0".to_string(),
                hint: "The timeout must be at least one second.".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
