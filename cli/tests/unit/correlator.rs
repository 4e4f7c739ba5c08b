//! Tests for resolving instances by name against the instance list.

#![allow(clippy::expect_used)]

use gmsaas_step::application::services::correlate::resolve;

use crate::helpers::StaticListing;

const TEXT_LISTING: &str = "\
UUID                                  NAME           ADB SERIAL      STATE
------------------------------------  -------------  --------------  ------
aaaaaaaa-0000-0000-0000-000000000001  instance_x_1   localhost:4001  ONLINE
aaaaaaaa-0000-0000-0000-000000000010  instance_x_10  localhost:4010  ONLINE
";

#[tokio::test]
async fn test_resolve_is_exact_match_only() {
    let control = StaticListing::new(
        r#"{"instances": [
            {"uuid": "u10", "name": "instance_x_10", "adb_serial": "localhost:4010"}
        ]}"#,
    );
    let (uuid, serial) = resolve(&control, "instance_x_1").await;
    assert_eq!(uuid, "", "instance_x_1 must not match instance_x_10");
    assert_eq!(serial, "");
}

#[tokio::test]
async fn test_resolve_text_listing() {
    let control = StaticListing::new(TEXT_LISTING);
    let (uuid, serial) = resolve(&control, "instance_x_10").await;
    assert_eq!(uuid, "aaaaaaaa-0000-0000-0000-000000000010");
    assert_eq!(serial, "localhost:4010");
}

#[tokio::test]
async fn test_resolve_first_match_wins() {
    let control = StaticListing::new(
        r#"{"instances": [
            {"uuid": "first", "name": "dup", "adb_serial": "localhost:1"},
            {"uuid": "second", "name": "dup", "adb_serial": "localhost:2"}
        ]}"#,
    );
    assert_eq!(resolve(&control, "dup").await.0, "first");
}

#[tokio::test]
async fn test_resolve_is_idempotent() {
    let control = StaticListing::new(TEXT_LISTING);
    let first = resolve(&control, "instance_x_1").await;
    let second = resolve(&control, "instance_x_1").await;
    assert_eq!(first, second);
    assert_eq!(first.0, "aaaaaaaa-0000-0000-0000-000000000001");
    assert_eq!(*control.list_calls.lock().expect("lock"), 2, "one listing per resolve");
}

#[tokio::test]
async fn test_resolve_listing_failure_yields_empty() {
    let control = StaticListing::failing();
    assert_eq!(
        resolve(&control, "instance_x_1").await,
        (String::new(), String::new())
    );
}
