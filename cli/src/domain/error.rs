//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::teardown::ResourceKind;

// ── Teardown errors ───────────────────────────────────────────────────────────

/// Errors raised while tearing down a project.
///
/// Only [`TeardownError::Removal`] is tolerated by the orchestrator; every
/// other variant aborts the remaining phases.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TeardownError {
    /// A declared network or volume has no full name to address it by.
    #[error("invalid {kind} name {short_name:?}")]
    Reference {
        kind: ResourceKind,
        short_name: String,
    },

    /// A service could not be expanded into its containers.
    #[error("cannot expand service {service:?}: {reason}")]
    Parse { service: String, reason: String },

    /// The runtime could not tell whether a resource exists.
    #[error("cannot check whether {kind} {name} exists: {reason}")]
    Probe {
        kind: ResourceKind,
        name: String,
        reason: String,
    },

    /// The runtime failed to remove a resource.
    #[error("failed to remove {kind} {name}: {reason}")]
    Removal {
        kind: ResourceKind,
        name: String,
        reason: String,
    },
}

impl TeardownError {
    /// `true` for errors that abort the whole teardown.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Removal { .. })
    }

    /// Stable machine-readable code used in JSON error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Reference { .. } => "reference_error",
            Self::Parse { .. } => "parse_error",
            Self::Probe { .. } => "probe_failure",
            Self::Removal { .. } => "removal_failure",
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}\n\n{hint}")]
    InvalidValue {
        key: String,
        value: String,
        hint: String,
    },
}
