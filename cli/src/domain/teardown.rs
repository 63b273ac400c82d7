//! Teardown domain types: options, resource kinds, removal command lines and
//! the per-run summary.
//!
//! Pure data only: no I/O, no async.

use std::fmt;

use serde::Serialize;

/// Options recognised by `down`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownOptions {
    /// Remove named volumes owned by the project and anonymous volumes
    /// attached to its containers.
    pub remove_volumes: bool,
}

/// Kind of runtime resource a project owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Container,
    Network,
    Volume,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Container => "container",
            Self::Network => "network",
            Self::Volume => "volume",
        })
    }
}

impl ResourceKind {
    /// Runtime arguments that remove the resource called `name`.
    ///
    /// `remove_anon_volumes` only applies to containers (`rm -f -v`).
    #[must_use]
    pub fn removal_args(self, name: &str, remove_anon_volumes: bool) -> Vec<&str> {
        match self {
            Self::Container if remove_anon_volumes => vec!["rm", "-f", "-v", name],
            Self::Container => vec!["rm", "-f", name],
            Self::Network => vec!["network", "rm", name],
            Self::Volume => vec!["volume", "rm", "-f", name],
        }
    }
}

/// Why a network or volume was left in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipReason {
    /// Owned by someone else; never probed.
    External,
    /// Already gone.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedResource {
    pub kind: ResourceKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedResource {
    pub kind: ResourceKind,
    pub name: String,
    pub reason: SkipReason,
}

/// A removal the runtime refused. Teardown carried on past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRemoval {
    pub kind: ResourceKind,
    pub name: String,
    pub reason: String,
}

/// What a completed teardown did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownSummary {
    pub project: String,
    pub removed: Vec<RemovedResource>,
    pub skipped: Vec<SkippedResource>,
    pub failed: Vec<FailedRemoval>,
    /// Populated project fields teardown does not act on.
    pub ignored_fields: Vec<String>,
}

impl DownSummary {
    #[must_use]
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            ..Self::default()
        }
    }

    /// Names of removed resources of one kind, in removal order.
    #[must_use]
    pub fn removed_names(&self, kind: ResourceKind) -> Vec<&str> {
        self.removed
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.name.as_str())
            .collect()
    }

    /// `true` when at least one removal was downgraded to a warning.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.failed.is_empty()
    }
}
