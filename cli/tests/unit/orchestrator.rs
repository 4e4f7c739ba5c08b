//! Tests for the concurrent provisioning orchestrator.

#![allow(clippy::expect_used)]

use gmsaas_step::application::services::provision::provision;
use gmsaas_step::domain::{ConfigError, FleetSpec, TaskError};

use crate::helpers::{FakeControlPlane, NoopReporter};

fn fleet(recipes: usize, ports: Vec<u16>) -> FleetSpec {
    FleetSpec {
        template_ids: (0..recipes).map(|i| format!("recipe-{i}")).collect(),
        ports,
        run_id: "build7".to_owned(),
    }
}

#[tokio::test]
async fn test_output_order_matches_input_when_later_tasks_finish_first() {
    let control = FakeControlPlane::new().with_delays(vec![60, 40, 20, 0]);
    let result = provision(&control, &NoopReporter, &fleet(4, vec![]))
        .await
        .expect("provision");

    assert_eq!(control.started_order(), vec![3, 2, 1, 0], "completion order reversed");
    assert_eq!(result.uuids(), vec!["uuid-0", "uuid-1", "uuid-2", "uuid-3"]);
    assert_eq!(
        result.bridge_serials(),
        vec![
            "localhost:40000",
            "localhost:40001",
            "localhost:40002",
            "localhost:40003"
        ]
    );
    let names: Vec<_> = result.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "instance_build7_0",
            "instance_build7_1",
            "instance_build7_2",
            "instance_build7_3"
        ]
    );
    assert!(!result.any_failed());
}

#[tokio::test]
async fn test_port_count_mismatch_fails_before_any_command() {
    let control = FakeControlPlane::new();
    let err = provision(&control, &NoopReporter, &fleet(3, vec![4321]))
        .await
        .expect_err("mismatch");

    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::PortCountMismatch {
            ports: 1,
            templates: 3
        })
    );
    assert!(control.calls().is_empty(), "no command may run: {:?}", control.calls());
}

#[tokio::test]
async fn test_single_launch_failure_is_isolated() {
    let control = FakeControlPlane::new().failing_start(&[1]);
    let result = provision(&control, &NoopReporter, &fleet(3, vec![]))
        .await
        .expect("provision");

    assert_eq!(result.len(), 3);
    assert_eq!(result.uuids(), vec!["uuid-0", "", "uuid-2"]);
    assert_eq!(
        result.bridge_serials(),
        vec!["localhost:40000", "", "localhost:40002"]
    );
    assert!(result.any_failed());
    assert_eq!(result.failed_count(), 1);
    assert!(matches!(
        result.entries()[1].error,
        Some(TaskError::Launch { .. })
    ));
}

#[tokio::test]
async fn test_all_succeed_with_explicit_ports() {
    let control = FakeControlPlane::new();
    let result = provision(&control, &NoopReporter, &fleet(2, vec![4321, 4322]))
        .await
        .expect("provision");

    assert!(!result.any_failed());
    assert_eq!(
        result.bridge_serials(),
        vec!["localhost:4321", "localhost:4322"]
    );
    let calls = control.calls();
    assert!(calls.contains(&"adbconnect uuid-0 Some(4321)".to_owned()));
    assert!(calls.contains(&"adbconnect uuid-1 Some(4322)".to_owned()));
}

#[tokio::test]
async fn test_every_request_is_resolved_after_all_launches() {
    let control = FakeControlPlane::new().failing_start(&[0]);
    provision(&control, &NoopReporter, &fleet(3, vec![]))
        .await
        .expect("provision");

    let calls = control.calls();
    let first_list = calls.iter().position(|c| c == "list").expect("listed");
    assert!(
        calls[..first_list].iter().all(|c| c != "list"),
        "launch phase precedes resolution"
    );
    assert_eq!(calls[first_list..].len(), 3, "one listing per request");
    assert!(calls[first_list..].iter().all(|c| c == "list"));
}

#[tokio::test]
async fn test_legacy_client_serial_filled_by_resolution() {
    let control = FakeControlPlane::new().legacy_output();
    let result = provision(&control, &NoopReporter, &fleet(2, vec![]))
        .await
        .expect("provision");

    assert!(!result.any_failed());
    assert_eq!(
        result.bridge_serials(),
        vec!["localhost:40000", "localhost:40001"]
    );
}

#[tokio::test]
async fn test_bridge_failure_leaves_empty_entry() {
    let control = FakeControlPlane::new().failing_connect(&[0]);
    let result = provision(&control, &NoopReporter, &fleet(2, vec![]))
        .await
        .expect("provision");

    assert_eq!(result.uuids(), vec!["", "uuid-1"]);
    assert!(matches!(
        result.entries()[0].error,
        Some(TaskError::BridgeConnect { .. })
    ));
    assert_eq!(control.listed().len(), 2, "started instance is left running");
}

#[tokio::test]
async fn test_connect_serial_kept_when_listing_omits_it() {
    let control = FakeControlPlane::new().unlisted_serials();
    let result = provision(&control, &NoopReporter, &fleet(2, vec![4321, 4322]))
        .await
        .expect("provision");

    assert!(!result.any_failed());
    assert_eq!(result.uuids(), vec!["uuid-0", "uuid-1"]);
    assert_eq!(
        result.bridge_serials(),
        vec!["localhost:4321", "localhost:4322"]
    );
}
