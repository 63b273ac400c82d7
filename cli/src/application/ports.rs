//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared project model —
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use berth_common::{Project, RunningInstance, ServiceDefinition};
use tokio_util::sync::CancellationToken;

use crate::domain::BerthConfig;

// ── Container Runtime Ports ───────────────────────────────────────────────────

/// Issues side-effecting commands to the container runtime.
///
/// This is the only boundary through which teardown mutates runtime state.
#[allow(async_fn_in_trait)]
pub trait RuntimeExecutor {
    /// Run the runtime CLI with `args` (e.g. `["network", "rm", "demo_default"]`).
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned, exits non-zero, times
    /// out, or `cancel` fires while it runs.
    async fn run_command(&self, cancel: &CancellationToken, args: &[&str]) -> Result<()>;
}

/// Answers whether a named network or volume currently exists.
#[allow(async_fn_in_trait)]
pub trait ResourceProbe {
    /// Check whether a network with this full name exists.
    async fn network_exists(&self, cancel: &CancellationToken, full_name: &str) -> Result<bool>;
    /// Check whether a volume with this full name exists.
    async fn volume_exists(&self, cancel: &CancellationToken, full_name: &str) -> Result<bool>;
}

/// Composite trait — any type implementing both sub-traits is a `ContainerRuntime`.
pub trait ContainerRuntime: RuntimeExecutor + ResourceProbe {}

/// Blanket implementation: any type implementing both sub-traits is a `ContainerRuntime`.
impl<T> ContainerRuntime for T where T: RuntimeExecutor + ResourceProbe {}

// ── Service Expansion Port ────────────────────────────────────────────────────

/// Maps a service definition to the containers that currently represent it.
pub trait ServiceExpander {
    /// Expand `service` into its running instances, in replica order.
    ///
    /// # Errors
    ///
    /// Returns `TeardownError::Parse` if the definition is structurally invalid.
    fn expand(&self, project: &Project, service: &ServiceDefinition)
    -> Result<Vec<RunningInstance>>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, cancel: &CancellationToken, program: &str, args: &[&str])
    -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned, exceeds `timeout`,
    /// or `cancel` fires. In both of the latter cases the child process must
    /// be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Project and Config Ports ──────────────────────────────────────────────────

/// Supplies the resolved project to tear down.
pub trait ProjectSource {
    /// Load the project at `path`, with service names filled in and full
    /// resource names resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialized.
    fn load(&self, path: &Path) -> Result<Project>;
}

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, returning defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<BerthConfig>;
    /// Path of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}
