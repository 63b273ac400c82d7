//! Property-based tests for teardown dispatch and classification.
//!
//! Uses `proptest` to verify invariants across many random projects.

#![allow(clippy::expect_used)]

use std::fmt::Write as _;

use proptest::prelude::*;

use berth_cli::application::services::teardown::down;
use berth_cli::domain::{DownSummary, TeardownOptions};
use berth_cli::infra::expander::ReplicaExpander;
use tokio_util::sync::CancellationToken;

use crate::mocks::{RecordingReporter, RecordingRuntime, project};

fn teardown(runtime: &RecordingRuntime, yaml: &str, remove_volumes: bool) -> DownSummary {
    let project = project(yaml);
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    rt.block_on(async {
        down(
            runtime,
            &ReplicaExpander,
            &RecordingReporter::default(),
            &CancellationToken::new(),
            &project,
            TeardownOptions { remove_volumes },
        )
        .await
        .expect("teardown succeeds")
    })
}

/// A project declaring `net<i>`/`vol<i>` with the given external flags.
fn resources_yaml(networks: &[bool], volumes: &[bool]) -> String {
    let mut yaml = String::from("name: demo\nservices: {}\nnetworks:\n");
    for (i, external) in networks.iter().enumerate() {
        let _ = writeln!(yaml, "  net{i}:\n    external: {external}");
    }
    yaml.push_str("volumes:\n");
    for (i, external) in volumes.iter().enumerate() {
        let _ = writeln!(yaml, "  vol{i}:\n    external: {external}");
    }
    yaml
}

/// Runtime names of every declared resource, owned or external.
fn all_names(prefix: &str, count: usize) -> Vec<String> {
    (0..count)
        .flat_map(|i| [format!("{prefix}{i}"), format!("demo_{prefix}{i}")])
        .collect()
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}

// ============================================================================
// Container dispatch
// ============================================================================

proptest! {
    /// N instances produce exactly N forced removals, with `-v` iff volumes
    /// are being removed.
    #[test]
    fn prop_instances_dispatch_one_removal_each(
        replicas in 0u32..12,
        remove_volumes in any::<bool>(),
    ) {
        let yaml = format!("name: demo\nservices:\n  web:\n    scale: {replicas}\n");
        let runtime = RecordingRuntime::default();
        let summary = teardown(&runtime, &yaml, remove_volumes);

        let expected: Vec<String> = (1..=replicas)
            .map(|i| {
                if remove_volumes {
                    format!("rm -f -v demo_web_{i}")
                } else {
                    format!("rm -f demo_web_{i}")
                }
            })
            .collect();
        prop_assert_eq!(runtime.commands(), expected);
        prop_assert_eq!(summary.removed.len(), replicas as usize);
    }
}

// ============================================================================
// Resource classification
// ============================================================================

proptest! {
    /// External networks and volumes are never probed nor removed, even
    /// when a resource of that name exists.
    #[test]
    fn prop_external_resources_untouched(
        networks in proptest::collection::vec(any::<bool>(), 0..6),
        volumes in proptest::collection::vec(any::<bool>(), 0..6),
    ) {
        let net_names = all_names("net", networks.len());
        let vol_names = all_names("vol", volumes.len());
        let runtime = RecordingRuntime::default()
            .with_networks(&as_strs(&net_names))
            .with_volumes(&as_strs(&vol_names));

        teardown(&runtime, &resources_yaml(&networks, &volumes), true);

        let externals: Vec<String> = networks
            .iter()
            .enumerate()
            .filter(|(_, ext)| **ext)
            .map(|(i, _)| format!("net{i}"))
            .chain(
                volumes
                    .iter()
                    .enumerate()
                    .filter(|(_, ext)| **ext)
                    .map(|(i, _)| format!("vol{i}")),
            )
            .collect();
        let probed = runtime.probed();
        let commands = runtime.commands();
        for name in &externals {
            prop_assert!(!probed.contains(name), "probed external {}", name);
            prop_assert!(
                !commands.iter().any(|c| c.ends_with(&format!(" {name}"))),
                "removed external {}",
                name
            );
        }

        let owned = networks.iter().chain(&volumes).filter(|ext| !**ext).count();
        prop_assert_eq!(probed.len(), owned);
        prop_assert_eq!(commands.len(), owned);
    }

    /// Owned resources the runtime does not report are never removed.
    #[test]
    fn prop_absent_resources_never_removed(
        present in proptest::collection::vec(any::<bool>(), 1..8),
    ) {
        let declared = vec![false; present.len()];
        let existing: Vec<String> = present
            .iter()
            .enumerate()
            .filter(|(_, p)| **p)
            .map(|(i, _)| format!("demo_vol{i}"))
            .collect();
        let runtime = RecordingRuntime::default().with_volumes(&as_strs(&existing));

        let summary = teardown(&runtime, &resources_yaml(&[], &declared), true);

        let mut removed: Vec<String> = runtime
            .commands_starting_with("volume rm -f ")
            .iter()
            .map(|c| c.trim_start_matches("volume rm -f ").to_string())
            .collect();
        removed.sort();
        let mut expected = existing.clone();
        expected.sort();
        prop_assert_eq!(removed, expected);
        prop_assert_eq!(summary.skipped.len(), present.len() - existing.len());
    }
}
