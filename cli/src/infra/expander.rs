//! Default `ServiceExpander`: derives container names from the replica count.
//!
//! Containers are named `<project>_<service>_<n>` for `n` in `1..=replicas`,
//! unless the service pins a single `container_name`.

use std::sync::LazyLock;

use anyhow::Result;
use berth_common::{Project, RunningInstance, ServiceDefinition};
use regex::Regex;

use crate::application::ports::ServiceExpander;
use crate::domain::TeardownError;

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").expect("valid name pattern"));

/// Upper bound on the containers a single service may expand to.
pub const MAX_REPLICAS: u32 = 10_000;

/// Expands services by replica count.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplicaExpander;

impl ServiceExpander for ReplicaExpander {
    fn expand(
        &self,
        project: &Project,
        service: &ServiceDefinition,
    ) -> Result<Vec<RunningInstance>> {
        let invalid = |reason: String| TeardownError::Parse {
            service: service.name.clone(),
            reason,
        };

        if !NAME_PATTERN.is_match(&project.name) {
            return Err(invalid(format!("invalid project name {:?}", project.name)).into());
        }
        if !NAME_PATTERN.is_match(&service.name) {
            return Err(invalid(format!("invalid service name {:?}", service.name)).into());
        }

        let replicas = replicas(service).map_err(invalid)?;

        if let Some(container_name) = &service.container_name {
            if replicas > 1 {
                return Err(invalid(format!(
                    "container_name {container_name:?} cannot be used with {replicas} replicas"
                ))
                .into());
            }
            if !NAME_PATTERN.is_match(container_name) {
                return Err(
                    invalid(format!("invalid container_name {container_name:?}")).into(),
                );
            }
            return Ok((1..=replicas)
                .map(|index| RunningInstance {
                    name: container_name.clone(),
                    service: service.name.clone(),
                    index,
                })
                .collect());
        }

        Ok((1..=replicas)
            .map(|index| RunningInstance {
                name: format!("{}_{}_{index}", project.name, service.name),
                service: service.name.clone(),
                index,
            })
            .collect())
    }
}

/// `deploy.replicas`, else `scale`, else 1.
fn replicas(service: &ServiceDefinition) -> Result<u32, String> {
    let deploy = service.deploy.as_ref().and_then(|d| d.replicas);
    let count = match (deploy, service.scale) {
        (Some(d), Some(s)) if d != s => {
            return Err(format!("deploy.replicas ({d}) and scale ({s}) disagree"));
        }
        (Some(n), _) | (None, Some(n)) => n,
        (None, None) => 1,
    };
    let count = u32::try_from(count).map_err(|_| format!("invalid replica count {count}"))?;
    if count > MAX_REPLICAS {
        return Err(format!("replica count {count} exceeds the limit of {MAX_REPLICAS}"));
    }
    Ok(count)
}
