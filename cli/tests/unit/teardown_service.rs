//! Unit tests for the teardown application service.
//!
//! The runtime, reporter and expander are in-memory doubles, so these tests
//! exercise ordering, classification and failure policy without spawning
//! any process.

#![allow(clippy::expect_used)]

use berth_cli::application::services::teardown::down;
use berth_cli::domain::{
    DownSummary, ResourceKind, SkipReason, SkippedResource, TeardownError, TeardownOptions,
};
use berth_cli::infra::expander::ReplicaExpander;
use berth_common::Project;
use tokio_util::sync::CancellationToken;

use crate::mocks::{Call, MockExpander, RecordingReporter, RecordingRuntime, instances, project};

const DEMO: &str = "\
name: demo
services:
  web:
    image: nginx
    scale: 2
networks:
  default: {}
volumes:
  data: {}
";

const WITH_EXTERNALS: &str = "\
name: demo
services:
  web:
    image: nginx
    networks: [default, shared]
    volumes:
      - cache:/var/cache
networks:
  default: {}
  shared:
    external: true
volumes:
  cache:
    external: true
";

fn keep_volumes() -> TeardownOptions {
    TeardownOptions::default()
}

fn remove_volumes() -> TeardownOptions {
    TeardownOptions {
        remove_volumes: true,
    }
}

async fn run(
    runtime: &RecordingRuntime,
    project: &Project,
    options: TeardownOptions,
) -> (anyhow::Result<DownSummary>, RecordingReporter) {
    let reporter = RecordingReporter::default();
    let result = down(
        runtime,
        &ReplicaExpander,
        &reporter,
        &CancellationToken::new(),
        project,
        options,
    )
    .await;
    (result, reporter)
}

fn teardown_error(err: &anyhow::Error) -> &TeardownError {
    err.downcast_ref::<TeardownError>()
        .expect("error should be a TeardownError")
}

// ── End-to-end ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_down_removes_containers_then_owned_existing_network() {
    let project = project(DEMO);
    let runtime = RecordingRuntime::default().with_networks(&["demo_default"]);

    let (result, _) = run(&runtime, &project, remove_volumes()).await;
    let summary = result.expect("teardown succeeds");

    assert_eq!(
        runtime.commands(),
        vec![
            "rm -f -v demo_web_1",
            "rm -f -v demo_web_2",
            "network rm demo_default",
        ]
    );
    assert_eq!(summary.removed_names(ResourceKind::Container).len(), 2);
    assert_eq!(summary.removed_names(ResourceKind::Network), vec!["demo_default"]);
    assert!(summary.removed_names(ResourceKind::Volume).is_empty());
    assert_eq!(
        summary.skipped,
        vec![SkippedResource {
            kind: ResourceKind::Volume,
            name: "demo_data".to_string(),
            reason: SkipReason::Absent,
        }]
    );
    assert!(!summary.has_warnings());
}

#[tokio::test]
async fn test_down_phases_run_in_order() {
    let project = project(DEMO);
    let runtime = RecordingRuntime::default()
        .with_networks(&["demo_default"])
        .with_volumes(&["demo_data"]);

    let (result, _) = run(&runtime, &project, remove_volumes()).await;
    result.expect("teardown succeeds");

    assert_eq!(
        runtime.calls(),
        vec![
            Call::Run(vec!["rm".into(), "-f".into(), "-v".into(), "demo_web_1".into()]),
            Call::Run(vec!["rm".into(), "-f".into(), "-v".into(), "demo_web_2".into()]),
            Call::ProbeNetwork("demo_default".into()),
            Call::Run(vec!["network".into(), "rm".into(), "demo_default".into()]),
            Call::ProbeVolume("demo_data".into()),
            Call::Run(vec![
                "volume".into(),
                "rm".into(),
                "-f".into(),
                "demo_data".into()
            ]),
        ]
    );
}

#[tokio::test]
async fn test_down_emits_progress_notice_per_removal() {
    let project = project(DEMO);
    let runtime = RecordingRuntime::default()
        .with_networks(&["demo_default"])
        .with_volumes(&["demo_data"]);

    let (result, reporter) = run(&runtime, &project, remove_volumes()).await;
    result.expect("teardown succeeds");

    assert_eq!(
        reporter.steps(),
        vec![
            "Removing container demo_web_1",
            "Removing container demo_web_2",
            "Removing network demo_default",
            "Removing volume demo_data",
        ]
    );
    assert!(reporter.warnings().is_empty());
}

#[tokio::test]
async fn test_down_does_not_mutate_project() {
    let project = project(DEMO);
    let before = project.clone();
    let runtime = RecordingRuntime::default().with_networks(&["demo_default"]);

    let (result, _) = run(&runtime, &project, remove_volumes()).await;
    result.expect("teardown succeeds");

    assert_eq!(project, before);
}

// ── External and absent resources ─────────────────────────────────────────────

#[tokio::test]
async fn test_external_resources_are_never_probed_or_removed() {
    let project = project(WITH_EXTERNALS);
    let runtime = RecordingRuntime::default()
        .with_networks(&["demo_default", "shared"])
        .with_volumes(&["cache"]);

    let (result, _) = run(&runtime, &project, remove_volumes()).await;
    let summary = result.expect("teardown succeeds");

    assert_eq!(runtime.probed(), vec!["demo_default"]);
    assert!(runtime.commands().iter().all(|c| !c.ends_with(" shared")));
    assert!(runtime.commands().iter().all(|c| !c.ends_with(" cache")));
    let external: Vec<&str> = summary
        .skipped
        .iter()
        .filter(|s| s.reason == SkipReason::External)
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(external, vec!["shared", "cache"]);
}

#[tokio::test]
async fn test_absent_resources_are_skipped() {
    let project = project(DEMO);
    let runtime = RecordingRuntime::default();

    let (result, _) = run(&runtime, &project, remove_volumes()).await;
    let summary = result.expect("teardown succeeds");

    assert!(runtime.commands_starting_with("network rm").is_empty());
    assert!(runtime.commands_starting_with("volume rm").is_empty());
    assert_eq!(runtime.probed(), vec!["demo_default", "demo_data"]);
    assert!(
        summary
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::Absent)
    );
}

#[tokio::test]
async fn test_repeated_teardown_removes_no_networks_or_volumes() {
    let project = project(DEMO);

    let first = RecordingRuntime::default()
        .with_networks(&["demo_default"])
        .with_volumes(&["demo_data"]);
    let (result, _) = run(&first, &project, remove_volumes()).await;
    result.expect("first teardown succeeds");

    // everything is gone now
    let second = RecordingRuntime::default();
    let (result, _) = run(&second, &project, remove_volumes()).await;
    let summary = result.expect("second teardown succeeds");

    assert!(second.commands_starting_with("network").is_empty());
    assert!(second.commands_starting_with("volume").is_empty());
    assert!(summary.removed_names(ResourceKind::Network).is_empty());
}

// ── Volume opt-in ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_volumes_untouched_without_remove_volumes() {
    let project = project(DEMO);
    let runtime = RecordingRuntime::default()
        .with_networks(&["demo_default"])
        .with_volumes(&["demo_data"]);

    let (result, _) = run(&runtime, &project, keep_volumes()).await;
    result.expect("teardown succeeds");

    assert_eq!(runtime.volume_probes(), 0);
    assert!(runtime.commands_starting_with("volume").is_empty());
    assert_eq!(
        runtime.commands_starting_with("rm "),
        vec!["rm -f demo_web_1", "rm -f demo_web_2"]
    );
}

// ── Failure policy ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_removal_failure_is_a_warning_and_teardown_continues() {
    let project = project(DEMO);
    let runtime = RecordingRuntime::default()
        .with_networks(&["demo_default"])
        .with_volumes(&["demo_data"])
        .failing_on(&["demo_web_1", "demo_default"]);

    let (result, reporter) = run(&runtime, &project, remove_volumes()).await;
    let summary = result.expect("removal failures are not fatal");

    assert_eq!(
        runtime.commands(),
        vec![
            "rm -f -v demo_web_1",
            "rm -f -v demo_web_2",
            "network rm demo_default",
            "volume rm -f demo_data",
        ]
    );
    assert_eq!(summary.failed.len(), 2);
    assert_eq!(summary.failed[0].name, "demo_web_1");
    assert_eq!(summary.failed[1].kind, ResourceKind::Network);
    assert!(summary.has_warnings());
    assert_eq!(summary.removed_names(ResourceKind::Volume), vec!["demo_data"]);

    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].starts_with("failed to remove container demo_web_1"));
    assert!(warnings[1].contains("is in use"));
}

#[tokio::test]
async fn test_network_without_full_name_aborts_before_volumes() {
    let mut project = project(
        "\
name: demo
services:
  web:
    image: nginx
networks:
  backend: {}
  default: {}
volumes:
  data: {}
",
    );
    project
        .networks
        .get_mut("backend")
        .expect("backend declared")
        .name
        .clear();
    let runtime = RecordingRuntime::default()
        .with_networks(&["demo_default"])
        .with_volumes(&["demo_data"]);

    let (result, _) = run(&runtime, &project, remove_volumes()).await;
    let err = result.expect_err("unresolved network is fatal");

    assert_eq!(
        teardown_error(&err),
        &TeardownError::Reference {
            kind: ResourceKind::Network,
            short_name: "backend".to_string(),
        }
    );
    assert_eq!(err.to_string(), r#"invalid network name "backend""#);
    // containers were already removed; no rollback
    assert_eq!(runtime.commands(), vec!["rm -f -v demo_web_1"]);
    assert!(runtime.probed().is_empty());
}

#[tokio::test]
async fn test_volume_without_full_name_is_fatal_only_with_remove_volumes() {
    let mut project = project(DEMO);
    project
        .volumes
        .get_mut("data")
        .expect("data declared")
        .name
        .clear();

    let runtime = RecordingRuntime::default();
    let (result, _) = run(&runtime, &project, keep_volumes()).await;
    result.expect("volume phase skipped");

    let runtime = RecordingRuntime::default();
    let (result, _) = run(&runtime, &project, remove_volumes()).await;
    let err = result.expect_err("unresolved volume is fatal");
    assert!(matches!(
        teardown_error(&err),
        TeardownError::Reference {
            kind: ResourceKind::Volume,
            short_name,
        } if short_name == "data"
    ));
    assert_eq!(runtime.volume_probes(), 0);
}

#[tokio::test]
async fn test_undeclared_service_networks_do_not_block_declared_ones() {
    let project = project(
        "\
name: demo
services:
  web:
    image: nginx
    networks: [default]
    volumes:
      - type: volume
        source: pgdata
        target: /var/lib/postgresql/data
networks:
  zeta: {}
",
    );
    let runtime = RecordingRuntime::default().with_networks(&["demo_zeta"]);

    let (result, _) = run(&runtime, &project, remove_volumes()).await;
    let summary = result.expect("only declared networks and volumes are visited");

    assert_eq!(
        runtime.commands(),
        vec!["rm -f -v demo_web_1", "network rm demo_zeta"]
    );
    assert_eq!(runtime.probed(), vec!["demo_zeta"]);
    assert_eq!(summary.removed_names(ResourceKind::Network), vec!["demo_zeta"]);
}

#[tokio::test]
async fn test_probe_failure_is_fatal() {
    let project = project(DEMO);
    let runtime = RecordingRuntime::default().with_probe_error();

    let (result, _) = run(&runtime, &project, remove_volumes()).await;
    let err = result.expect_err("probe failure is fatal");

    match teardown_error(&err) {
        TeardownError::Probe { kind, name, reason } => {
            assert_eq!(*kind, ResourceKind::Network);
            assert_eq!(name, "demo_default");
            assert!(reason.contains("cannot connect"));
        }
        other => panic!("expected probe failure, got {other:?}"),
    }
    assert_eq!(runtime.commands_starting_with("rm ").len(), 2);
    assert_eq!(runtime.volume_probes(), 0);
}

// ── Cancellation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancelled_removals_warn_and_cancelled_lookup_aborts() {
    let project = project(DEMO);
    let runtime = RecordingRuntime::default()
        .with_networks(&["demo_default"])
        .with_volumes(&["demo_data"]);
    let reporter = RecordingReporter::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = down(
        &runtime,
        &ReplicaExpander,
        &reporter,
        &cancel,
        &project,
        remove_volumes(),
    )
    .await
    .expect_err("cancelled existence check is fatal");

    match teardown_error(&err) {
        TeardownError::Probe { kind, name, reason } => {
            assert_eq!(*kind, ResourceKind::Network);
            assert_eq!(name, "demo_default");
            assert!(reason.contains("cancelled"), "{reason}");
        }
        other => panic!("expected a failed existence check, got {other:?}"),
    }

    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].starts_with("failed to remove container demo_web_1"));
    assert!(warnings[1].starts_with("failed to remove container demo_web_2"));
    assert!(warnings.iter().all(|w| w.contains("cancelled")));

    assert_eq!(
        runtime.commands(),
        vec!["rm -f -v demo_web_1", "rm -f -v demo_web_2"]
    );
    assert_eq!(runtime.volume_probes(), 0);
}

#[tokio::test]
async fn test_cancelled_removals_are_recorded_as_failures() {
    let project = project("name: demo\nservices:\n  web:\n    scale: 2\n");
    let runtime = RecordingRuntime::default();
    let reporter = RecordingReporter::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = down(
        &runtime,
        &ReplicaExpander,
        &reporter,
        &cancel,
        &project,
        keep_volumes(),
    )
    .await
    .expect("cancelled removals are not fatal");

    let failed: Vec<&str> = summary.failed.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(failed, vec!["demo_web_1", "demo_web_2"]);
    assert!(summary.failed.iter().all(|f| f.reason.contains("cancelled")));
    assert!(summary.removed.is_empty());
    assert_eq!(reporter.warnings().len(), 2);
}

// ── Service expansion ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_expander_is_asked_once_per_service() {
    let project = project(
        "\
name: demo
services:
  api: {image: api}
  worker: {image: worker}
",
    );
    let runtime = RecordingRuntime::default();
    let reporter = RecordingReporter::default();

    let mut expander = MockExpander::new();
    expander
        .expect_expand()
        .withf(|p, s| p.name == "demo" && s.name == "api")
        .times(1)
        .returning(|_, s| Ok(instances(&s.name, 1)));
    expander
        .expect_expand()
        .withf(|_, s| s.name == "worker")
        .times(1)
        .returning(|_, s| Ok(instances(&s.name, 3)));

    let summary = down(
        &runtime,
        &expander,
        &reporter,
        &CancellationToken::new(),
        &project,
        keep_volumes(),
    )
    .await
    .expect("teardown succeeds");

    assert_eq!(
        runtime.commands(),
        vec![
            "rm -f api-1",
            "rm -f worker-1",
            "rm -f worker-2",
            "rm -f worker-3"
        ]
    );
    assert_eq!(summary.removed_names(ResourceKind::Container).len(), 4);
}

#[tokio::test]
async fn test_expansion_failure_becomes_parse_error() {
    let project = project(DEMO);
    let runtime = RecordingRuntime::default().with_networks(&["demo_default"]);
    let reporter = RecordingReporter::default();

    let mut expander = MockExpander::new();
    expander
        .expect_expand()
        .returning(|_, _| Err(anyhow::anyhow!("unsupported deploy mode")));

    let err = down(
        &runtime,
        &expander,
        &reporter,
        &CancellationToken::new(),
        &project,
        keep_volumes(),
    )
    .await
    .expect_err("expansion failure is fatal");

    assert!(matches!(
        teardown_error(&err),
        TeardownError::Parse { service, reason }
            if service == "web" && reason == "unsupported deploy mode"
    ));
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn test_replica_conflict_aborts_before_any_removal() {
    let project = project(
        "\
name: demo
services:
  db:
    image: mariadb
    container_name: mariadb
    scale: 3
",
    );
    let runtime = RecordingRuntime::default();

    let (result, _) = run(&runtime, &project, keep_volumes()).await;
    let err = result.expect_err("conflict is fatal");

    assert!(matches!(
        teardown_error(&err),
        TeardownError::Parse { service, .. } if service == "db"
    ));
    assert!(runtime.commands().is_empty());
}

#[tokio::test]
async fn test_zero_replicas_dispatch_nothing() {
    let project = project("name: demo\nservices:\n  web:\n    scale: 0\n");
    let runtime = RecordingRuntime::default();

    let (result, _) = run(&runtime, &project, remove_volumes()).await;
    result.expect("teardown succeeds");

    assert!(runtime.commands().is_empty());
}

// ── Unknown fields ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_fields_produce_single_warning() {
    let project = project(
        "\
name: demo
services:
  web: {image: nginx}
secrets:
  token:
    file: ./token.txt
x-custom:
  owner: ops
",
    );
    let runtime = RecordingRuntime::default();

    let (result, reporter) = run(&runtime, &project, keep_volumes()).await;
    let summary = result.expect("unknown fields are not fatal");

    assert_eq!(reporter.warnings(), vec!["Ignoring: secrets, x-custom"]);
    assert_eq!(summary.ignored_fields, vec!["secrets", "x-custom"]);
    assert_eq!(runtime.commands(), vec!["rm -f demo_web_1"]);
}

#[tokio::test]
async fn test_known_fields_only_produce_no_warning() {
    let project = project(DEMO);
    let runtime = RecordingRuntime::default();

    let (result, reporter) = run(&runtime, &project, keep_volumes()).await;
    let summary = result.expect("teardown succeeds");

    assert!(reporter.warnings().is_empty());
    assert!(summary.ignored_fields.is_empty());
}
