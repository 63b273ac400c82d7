//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod teardown;

pub use config::{BerthConfig, RuntimeConfig};
pub use error::{ConfigError, TeardownError};
pub use teardown::{
    DownSummary, FailedRemoval, RemovedResource, ResourceKind, SkipReason, SkippedResource,
    TeardownOptions,
};
