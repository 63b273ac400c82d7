//! Resolved project model.
//!
//! A [`Project`] is built once from an already-resolved project file and is
//! read-only afterwards. Mapping keys are the short names written in the
//! file; each definition carries the full name the runtime knows it by.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::service::ServiceDefinition;

/// Project fields teardown acts on. Any other populated field is reported
/// as ignored.
pub const KNOWN_PROJECT_FIELDS: &[&str] = &[
    "name",
    "working_dir",
    "services",
    "networks",
    "volumes",
    "compose_files",
];

/// Desired-state description of a multi-service deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceDefinition>,
    #[serde(default, deserialize_with = "nullable_entries")]
    pub networks: BTreeMap<String, NetworkDefinition>,
    #[serde(default, deserialize_with = "nullable_entries")]
    pub volumes: BTreeMap<String, VolumeDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compose_files: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub secrets: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configs: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, Option<String>>,
    /// Top-level keys this model does not know about (`x-*` extensions and
    /// newer file-format features).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

/// A network or volume declared by a project.
pub trait ProjectResource {
    /// Name the runtime knows the resource by.
    fn full_name(&self) -> &str;
    /// `true` when the project only references the resource.
    fn is_external(&self) -> bool;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkDefinition {
    /// Full name. Resolved by [`Project::resolve_names`] when left empty.
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "external_flag")]
    pub external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeDefinition {
    /// Full name. Resolved by [`Project::resolve_names`] when left empty.
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "external_flag")]
    pub external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

impl ProjectResource for NetworkDefinition {
    fn full_name(&self) -> &str {
        &self.name
    }

    fn is_external(&self) -> bool {
        self.external
    }
}

impl ProjectResource for VolumeDefinition {
    fn full_name(&self) -> &str {
        &self.name
    }

    fn is_external(&self) -> bool {
        self.external
    }
}

/// Derive the runtime name of a project resource.
///
/// Owned resources are prefixed with the project name
/// (`"wordpress"` + `"db_data"` → `"wordpress_db_data"`); external ones keep
/// their short name.
#[must_use]
pub fn full_name(project: &str, short_name: &str, external: bool) -> String {
    if external {
        short_name.to_string()
    } else {
        format!("{project}_{short_name}")
    }
}

impl Project {
    /// Fill service names from their keys and derive the full name of every
    /// network and volume that does not override it.
    pub fn resolve_names(&mut self) {
        for (key, svc) in &mut self.services {
            if svc.name.is_empty() {
                svc.name.clone_from(key);
            }
        }
        for (short, net) in &mut self.networks {
            if net.name.is_empty() {
                net.name = full_name(&self.name, short, net.external);
            }
        }
        for (short, vol) in &mut self.volumes {
            if vol.name.is_empty() {
                vol.name = full_name(&self.name, short, vol.external);
            }
        }
    }

    /// Populated fields outside [`KNOWN_PROJECT_FIELDS`].
    #[must_use]
    pub fn unknown_fields(&self) -> Vec<String> {
        let Ok(serde_json::Value::Object(fields)) = serde_json::to_value(self) else {
            return Vec::new();
        };
        fields
            .into_iter()
            .filter(|(k, v)| !KNOWN_PROJECT_FIELDS.contains(&k.as_str()) && !is_empty_value(v))
            .map(|(k, _)| k)
            .collect()
    }
}

fn is_empty_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
        serde_json::Value::Bool(_) | serde_json::Value::Number(_) => false,
    }
}

// `networks: {default: }` leaves the entry null; treat it as all defaults.
fn nullable_entries<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Option::<BTreeMap<String, Option<T>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, v.unwrap_or_default()))
        .collect())
}

// Accepts `external: true` and the legacy `external: {name: ...}` form.
fn external_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum External {
        Flag(bool),
        Legacy(BTreeMap<String, serde_json::Value>),
    }

    Ok(match Option::<External>::deserialize(deserializer)? {
        None => false,
        Some(External::Flag(flag)) => flag,
        Some(External::Legacy(_)) => true,
    })
}
