pub mod project;
pub mod service;

pub use project::{
    KNOWN_PROJECT_FIELDS, NetworkDefinition, Project, ProjectResource, VolumeDefinition, full_name,
};
pub use service::{DeployConfig, RunningInstance, ServiceDefinition, ServiceVolume};
