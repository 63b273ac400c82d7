//! `berth down` — remove a project's containers, networks and volumes.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::application::ports::ProjectSource;
use crate::application::services::teardown;
use crate::domain::TeardownOptions;
use crate::infra::expander::ReplicaExpander;
use crate::infra::project::YamlProjectSource;
use crate::infra::runtime::CliRuntime;
use crate::output::{HumanRenderer, TerminalReporter, json};

/// Arguments for the down command.
#[derive(Args)]
pub struct DownArgs {
    /// Resolved project file (YAML or JSON)
    #[arg(short, long, default_value = "compose.yaml")]
    pub file: PathBuf,

    /// Project name, replacing the one in the file
    #[arg(short = 'p', long)]
    pub project_name: Option<String>,

    /// Also remove named volumes and anonymous container volumes
    #[arg(long)]
    pub volumes: bool,

    /// Runtime CLI to invoke (nerdctl, docker, podman or a path)
    #[arg(long, env = "BERTH_RUNTIME")]
    pub runtime: Option<String>,

    /// Seconds each runtime command may take
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Run `berth down`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the project cannot be
/// loaded, or teardown hits a fatal error. Failed removals are not errors.
pub async fn run(app: &AppContext, args: &DownArgs, cancel: &CancellationToken) -> Result<()> {
    let config = app
        .config
        .clone()
        .with_overrides(args.runtime.as_deref(), args.timeout);
    config.validate()?;

    let project = YamlProjectSource::new(args.project_name.clone()).load(&args.file)?;
    tracing::debug!(
        project = %project.name,
        runtime = %config.runtime.binary,
        remove_volumes = args.volumes,
        "starting teardown"
    );

    let runtime = CliRuntime::with_tokio(&config.runtime.binary, config.runtime.timeout());
    let reporter = TerminalReporter::new(&app.output);
    let options = TeardownOptions {
        remove_volumes: args.volumes,
    };
    let summary = teardown::down(
        &runtime,
        &ReplicaExpander,
        &reporter,
        cancel,
        &project,
        options,
    )
    .await?;

    if app.is_json() {
        println!("{}", json::format_summary(&summary)?);
    } else {
        HumanRenderer::new(&app.output).render_summary(&summary);
    }
    Ok(())
}
