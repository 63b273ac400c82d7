use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// One logical service of a project.
///
/// A service expands into zero or more [`RunningInstance`]s; the expansion
/// itself lives outside this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceDefinition {
    /// Service name. Filled from the mapping key when the file omits it.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Fixed container name; only valid for a single replica.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeployConfig>,
    /// Network short names this service attaches to.
    #[serde(
        default,
        deserialize_with = "network_refs",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub networks: Vec<String>,
    #[serde(
        default,
        deserialize_with = "mounts",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub volumes: Vec<ServiceVolume>,
}

/// The `deploy` section. Only the replica count matters for teardown.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i64>,
}

/// A mount declared by a service, normalised to the long syntax.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceVolume {
    /// Mount type: `volume`, `bind` or `tmpfs`.
    #[serde(rename = "type", default = "default_mount_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub target: String,
}

fn default_mount_type() -> String {
    "volume".to_string()
}

impl ServiceVolume {
    /// Parse the short syntax `[source:]target[:mode]`.
    ///
    /// A source starting with `/`, `.` or `~` is a bind mount; any other
    /// source names a project volume. A lone target is an anonymous volume.
    #[must_use]
    pub fn parse_short(spec: &str) -> Self {
        let mut parts = spec.splitn(3, ':');
        let first = parts.next().unwrap_or_default();
        match parts.next() {
            None => Self {
                kind: default_mount_type(),
                source: None,
                target: first.to_string(),
            },
            Some(target) => {
                let kind = if first.starts_with(['/', '.', '~']) {
                    "bind"
                } else {
                    "volume"
                };
                Self {
                    kind: kind.to_string(),
                    source: Some(first.to_string()),
                    target: target.to_string(),
                }
            }
        }
    }

    /// Short name of the project volume this mount uses, if any.
    #[must_use]
    pub fn named_volume(&self) -> Option<&str> {
        if self.kind != "volume" {
            return None;
        }
        self.source.as_deref().filter(|s| !s.is_empty())
    }
}

/// One concrete container produced by expanding a service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunningInstance {
    /// Resolved container name, as known to the runtime.
    pub name: String,
    pub service: String,
    /// 1-based replica index.
    pub index: u32,
}

// Services list networks either as `[a, b]` or as `{a: {...}, b: null}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum NetworkRefs {
    List(Vec<String>),
    Map(BTreeMap<String, serde_json::Value>),
}

fn network_refs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<NetworkRefs>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(NetworkRefs::List(names)) => names,
        Some(NetworkRefs::Map(map)) => map.into_keys().collect(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMount {
    Short(String),
    Long(ServiceVolume),
}

fn mounts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ServiceVolume>, D::Error> {
    let raw = Option::<Vec<RawMount>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|m| match m {
            RawMount::Short(spec) => ServiceVolume::parse_short(&spec),
            RawMount::Long(v) => v,
        })
        .collect())
}
