//! Tests for launching a single instance.

#![allow(clippy::expect_used)]

use gmsaas_step::application::services::launch::launch;
use gmsaas_step::domain::{ProvisioningRequest, TaskError};

use crate::helpers::FakeControlPlane;

fn request(index: usize, port: Option<u16>) -> ProvisioningRequest {
    ProvisioningRequest {
        index,
        template_id: format!("recipe-{index}"),
        requested_name: format!("instance_run_{index}"),
        bridge_port: port,
    }
}

#[tokio::test]
async fn test_launch_starts_then_connects() {
    let control = FakeControlPlane::new();
    let outcome = launch(&control, request(0, Some(5037))).await;

    assert!(!outcome.is_failed());
    let record = outcome.record.expect("record");
    assert_eq!(record.uuid, "uuid-0");
    assert_eq!(record.name, "instance_run_0");
    assert_eq!(record.bridge_serial, "localhost:5037");
    assert_eq!(
        control.calls(),
        vec![
            "start recipe-0 instance_run_0".to_owned(),
            "adbconnect uuid-0 Some(5037)".to_owned(),
        ]
    );
}

#[tokio::test]
async fn test_launch_with_legacy_output_leaves_serial_for_resolution() {
    let control = FakeControlPlane::new().legacy_output();
    let outcome = launch(&control, request(0, None)).await;

    let record = outcome.record.expect("record");
    assert_eq!(record.uuid, "uuid-0");
    assert_eq!(record.bridge_serial, "");
}

#[tokio::test]
async fn test_launch_failure_skips_adb_connect() {
    let control = FakeControlPlane::new().failing_start(&[0]);
    let outcome = launch(&control, request(0, None)).await;

    assert!(outcome.is_failed());
    assert!(outcome.record.is_none());
    assert!(matches!(outcome.error, Some(TaskError::Launch { .. })));
    assert_eq!(control.calls(), vec!["start recipe-0 instance_run_0".to_owned()]);
}

#[tokio::test]
async fn test_adb_connect_failure_fails_task_but_leaves_instance() {
    let control = FakeControlPlane::new().failing_connect(&[0]);
    let outcome = launch(&control, request(0, None)).await;

    match outcome.error {
        Some(TaskError::BridgeConnect { uuid, .. }) => assert_eq!(uuid, "uuid-0"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(control.listed().len(), 1, "no rollback of the started instance");
}

#[tokio::test]
async fn test_launch_tolerates_stderr_notice_after_plain_uuid() {
    let control = FakeControlPlane::new().legacy_output().with_stderr_notice();
    let outcome = launch(&control, request(0, Some(5037))).await;

    assert!(!outcome.is_failed(), "unexpected {:?}", outcome.error);
    let record = outcome.record.expect("record");
    assert_eq!(record.uuid, "uuid-0");
    assert_eq!(
        control.calls(),
        vec![
            "start recipe-0 instance_run_0".to_owned(),
            "adbconnect uuid-0 Some(5037)".to_owned(),
        ]
    );
}

#[tokio::test]
async fn test_launch_reads_serial_despite_stderr_notice() {
    let control = FakeControlPlane::new().with_stderr_notice();
    let outcome = launch(&control, request(1, None)).await;

    let record = outcome.record.expect("record");
    assert_eq!(record.bridge_serial, "localhost:40001");
}
