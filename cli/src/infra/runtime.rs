//! Infrastructure implementation of the container runtime ports.
//!
//! `CliRuntime<R>` drives a docker-compatible runtime CLI (`nerdctl`,
//! `docker`, `podman`) through a `CommandRunner`, so tests can inject a mock
//! runner without spawning real processes.

use std::process::Output;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{CommandRunner, ResourceProbe, RuntimeExecutor};
use crate::infra::command_runner::TokioCommandRunner;

/// Infrastructure adapter that routes all runtime CLI calls through a `CommandRunner`.
pub struct CliRuntime<R: CommandRunner> {
    runner: R,
    binary: String,
}

impl<R: CommandRunner> CliRuntime<R> {
    /// Create a runtime adapter invoking `binary` through `runner`.
    pub fn new(runner: R, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    /// List names printed one per line by `<binary> <object> ls`.
    async fn list_names(&self, cancel: &CancellationToken, object: &str) -> Result<Vec<String>> {
        let output = self
            .runner
            .run(cancel, &self.binary, &[object, "ls", "--format", "{{.Name}}"])
            .await
            .with_context(|| format!("{} {object} ls", self.binary))?;
        ensure_success(&self.binary, &[object, "ls"], &output)?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    async fn exists(&self, cancel: &CancellationToken, object: &str, name: &str) -> Result<bool> {
        let exists = self
            .list_names(cancel, object)
            .await?
            .iter()
            .any(|n| n == name);
        tracing::debug!(object, name, exists, "probed runtime");
        Ok(exists)
    }
}

impl CliRuntime<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn with_tokio(binary: &str, timeout: std::time::Duration) -> Self {
        Self::new(TokioCommandRunner::new(timeout), binary)
    }
}

impl<R: CommandRunner> RuntimeExecutor for CliRuntime<R> {
    async fn run_command(&self, cancel: &CancellationToken, args: &[&str]) -> Result<()> {
        let output = self
            .runner
            .run(cancel, &self.binary, args)
            .await
            .with_context(|| format!("{} {}", self.binary, args.join(" ")))?;
        ensure_success(&self.binary, args, &output)
    }
}

impl<R: CommandRunner> ResourceProbe for CliRuntime<R> {
    async fn network_exists(&self, cancel: &CancellationToken, full_name: &str) -> Result<bool> {
        self.exists(cancel, "network", full_name).await
    }

    async fn volume_exists(&self, cancel: &CancellationToken, full_name: &str) -> Result<bool> {
        self.exists(cancel, "volume", full_name).await
    }
}

/// Turn a non-zero exit into an error carrying the command's stderr.
fn ensure_success(binary: &str, args: &[&str], output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let status = output
        .status
        .code()
        .map_or_else(|| "signal".to_string(), |c| c.to_string());
    if stderr.is_empty() {
        anyhow::bail!("{binary} {} exited with {status}", args.join(" "))
    }
    anyhow::bail!("{binary} {} exited with {status}: {stderr}", args.join(" "))
}
