//! Application service — project teardown use-case.
//!
//! Imports only from `crate::domain`, `crate::application::ports` and the
//! shared project model. All runtime I/O is routed through injected ports.
//!
//! Teardown runs three phases strictly in order: containers, networks, then
//! (only when requested) volumes. Containers go first so networks and volumes
//! are no longer in use when their turn comes.

use std::collections::BTreeMap;

use anyhow::Result;
use berth_common::{Project, ProjectResource, ServiceDefinition};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ContainerRuntime, ProgressReporter, ServiceExpander};
use crate::domain::{
    DownSummary, FailedRemoval, RemovedResource, ResourceKind, SkipReason, SkippedResource,
    TeardownError, TeardownOptions,
};

/// Tear down every container, network and (optionally) volume of `project`.
///
/// Removal failures are reported as warnings and recorded in the returned
/// summary; the remaining resources are still processed. Resources already
/// removed stay removed when a later step fails.
///
/// # Errors
///
/// Returns a [`TeardownError`] (wrapped in `anyhow`) and stops immediately when
/// a service cannot be expanded, a declared network or volume has no full
/// name, or an existence probe fails.
pub async fn down(
    runtime: &impl ContainerRuntime,
    expander: &impl ServiceExpander,
    reporter: &impl ProgressReporter,
    cancel: &CancellationToken,
    project: &Project,
    options: TeardownOptions,
) -> Result<DownSummary> {
    let mut session = Teardown {
        runtime,
        reporter,
        cancel,
        summary: DownSummary::new(&project.name),
    };

    let unknown = project.unknown_fields();
    if !unknown.is_empty() {
        reporter.warn(&format!("Ignoring: {}", unknown.join(", ")));
        session.summary.ignored_fields = unknown;
    }

    for svc in project.services.values() {
        session
            .down_service(expander, project, svc, options.remove_volumes)
            .await?;
    }

    for short_name in project.networks.keys() {
        let network = resolve(ResourceKind::Network, short_name, &project.networks)?;
        session.down_resource(ResourceKind::Network, network).await?;
    }

    if options.remove_volumes {
        for short_name in project.volumes.keys() {
            let volume = resolve(ResourceKind::Volume, short_name, &project.volumes)?;
            session.down_resource(ResourceKind::Volume, volume).await?;
        }
    }

    Ok(session.summary)
}

/// Look a short name up in the project's own mapping. An entry without a
/// full name cannot be addressed on the runtime.
fn resolve<'p, D: ProjectResource>(
    kind: ResourceKind,
    short_name: &str,
    definitions: &'p BTreeMap<String, D>,
) -> Result<&'p D, TeardownError> {
    definitions
        .get(short_name)
        .filter(|definition| !definition.full_name().is_empty())
        .ok_or_else(|| TeardownError::Reference {
            kind,
            short_name: short_name.to_string(),
        })
}

/// State of one `down` call.
struct Teardown<'a, R, P> {
    runtime: &'a R,
    reporter: &'a P,
    cancel: &'a CancellationToken,
    summary: DownSummary,
}

impl<R: ContainerRuntime, P: ProgressReporter> Teardown<'_, R, P> {
    async fn down_service(
        &mut self,
        expander: &impl ServiceExpander,
        project: &Project,
        svc: &ServiceDefinition,
        remove_anon_volumes: bool,
    ) -> Result<()> {
        let instances = expander.expand(project, svc).map_err(|e| {
            e.downcast::<TeardownError>()
                .unwrap_or_else(|e| TeardownError::Parse {
                    service: svc.name.clone(),
                    reason: format!("{e:#}"),
                })
        })?;

        for instance in &instances {
            self.reporter.step(&format!("Removing container {}", instance.name));
            let outcome = self
                .remove(ResourceKind::Container, &instance.name, remove_anon_volumes)
                .await;
            self.settle(ResourceKind::Container, &instance.name, outcome)?;
        }
        Ok(())
    }

    /// Classify a network or volume as external, absent, or present and
    /// owned, and remove it only in the last case.
    async fn down_resource(
        &mut self,
        kind: ResourceKind,
        definition: &impl ProjectResource,
    ) -> Result<()> {
        let full_name = definition.full_name();
        if definition.is_external() {
            self.skip(kind, full_name, SkipReason::External);
            return Ok(());
        }

        if !self.exists(kind, full_name).await? {
            self.skip(kind, full_name, SkipReason::Absent);
            return Ok(());
        }

        self.reporter.step(&format!("Removing {kind} {full_name}"));
        let outcome = self.remove(kind, full_name, false).await;
        self.settle(kind, full_name, outcome)
    }

    async fn exists(&self, kind: ResourceKind, full_name: &str) -> Result<bool, TeardownError> {
        let probed = if kind == ResourceKind::Volume {
            self.runtime.volume_exists(self.cancel, full_name).await
        } else {
            self.runtime.network_exists(self.cancel, full_name).await
        };
        probed.map_err(|e| TeardownError::Probe {
            kind,
            name: full_name.to_string(),
            reason: format!("{e:#}"),
        })
    }

    async fn remove(
        &self,
        kind: ResourceKind,
        name: &str,
        remove_anon_volumes: bool,
    ) -> Result<(), TeardownError> {
        let args = kind.removal_args(name, remove_anon_volumes);
        self.runtime
            .run_command(self.cancel, &args)
            .await
            .map_err(|e| TeardownError::Removal {
                kind,
                name: name.to_string(),
                reason: format!("{e:#}"),
            })
    }

    /// Failure policy for removals: fatal errors end the call, anything else
    /// is warned about and recorded.
    fn settle(
        &mut self,
        kind: ResourceKind,
        name: &str,
        outcome: Result<(), TeardownError>,
    ) -> Result<()> {
        match outcome {
            Ok(()) => self.summary.removed.push(RemovedResource {
                kind,
                name: name.to_string(),
            }),
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => {
                self.reporter.warn(&err.to_string());
                let reason = match err {
                    TeardownError::Removal { reason, .. } => reason,
                    other => other.to_string(),
                };
                self.summary.failed.push(FailedRemoval {
                    kind,
                    name: name.to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }

    fn skip(&mut self, kind: ResourceKind, name: &str, reason: SkipReason) {
        self.summary.skipped.push(SkippedResource {
            kind,
            name: name.to_string(),
            reason,
        });
    }
}
