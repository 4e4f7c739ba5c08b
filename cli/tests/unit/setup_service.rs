//! Tests for the client preparation service.
//!
//! All collaborators append to one shared log so the tests can assert the
//! order of setup steps.

#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use gmsaas_step::application::ports::{ClientInstaller, ClientSetup, EnvironmentExporter};
use gmsaas_step::application::services::setup::{
    SetupOptions, USER_AGENT_EXTRA_DATA_KEY, prepare_client,
};
use gmsaas_step::domain::{Credentials, ExportError, ProcessError, SetupError};

use crate::helpers::{NoopReporter, process_failure};

type Log = Arc<Mutex<Vec<String>>>;

fn push(log: &Log, entry: String) {
    log.lock().expect("lock").push(entry);
}

struct FakeInstaller {
    log: Log,
    installed: bool,
    fail: bool,
}

impl ClientInstaller for FakeInstaller {
    fn locate(&self) -> Option<PathBuf> {
        self.installed.then(|| PathBuf::from("/usr/local/bin/gmsaas"))
    }

    async fn install(&self, version: Option<&semver::Version>) -> Result<(), ProcessError> {
        let version = version.map_or_else(|| "latest".to_owned(), ToString::to_string);
        push(&self.log, format!("install {version}"));
        if self.fail {
            return Err(process_failure("pip3 install gmsaas", "no network"));
        }
        Ok(())
    }
}

struct FakeClient {
    log: Log,
    fail_login: bool,
}

impl ClientSetup for FakeClient {
    async fn configure_sdk_path(&self, path: &str) -> Result<(), ProcessError> {
        push(&self.log, format!("sdk {path}"));
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), ProcessError> {
        let form = match credentials {
            Credentials::Token(_) => "token",
            Credentials::Login { .. } => "password",
        };
        push(&self.log, format!("login {form}"));
        if self.fail_login {
            return Err(process_failure("gmsaas auth token ***", "invalid token"));
        }
        Ok(())
    }
}

struct FakeExporter {
    log: Log,
    fail: bool,
}

impl EnvironmentExporter for FakeExporter {
    async fn export(&self, key: &str, value: &str) -> Result<(), ProcessError> {
        push(&self.log, format!("export {key}={value}"));
        if self.fail {
            return Err(process_failure("envman add", "no envstore"));
        }
        Ok(())
    }
}

struct Harness {
    log: Log,
    installer: FakeInstaller,
    client: FakeClient,
    exporter: FakeExporter,
}

impl Harness {
    fn new() -> Self {
        let log: Log = Arc::default();
        Self {
            installer: FakeInstaller {
                log: log.clone(),
                installed: true,
                fail: false,
            },
            client: FakeClient {
                log: log.clone(),
                fail_login: false,
            },
            exporter: FakeExporter {
                log: log.clone(),
                fail: false,
            },
            log,
        }
    }

    async fn run(&self, sdk: Option<&str>, version: Option<&semver::Version>) -> anyhow::Result<()> {
        let credentials = Credentials::Token("tok".into());
        prepare_client(
            &self.installer,
            &self.client,
            &self.exporter,
            &NoopReporter,
            SetupOptions {
                credentials: &credentials,
                gmsaas_version: version,
                android_sdk_path: sdk,
            },
        )
        .await
    }

    fn entries(&self) -> Vec<String> {
        self.log.lock().expect("lock").clone()
    }
}

#[tokio::test]
async fn test_setup_order_when_already_installed() {
    let h = Harness::new();
    h.run(Some("/sdk"), None).await.expect("setup");
    assert_eq!(
        h.entries(),
        vec![
            "sdk /sdk".to_owned(),
            format!("export {USER_AGENT_EXTRA_DATA_KEY}=bitrise.io"),
            "login token".to_owned(),
        ]
    );
}

#[tokio::test]
async fn test_missing_client_is_installed_with_pin() {
    let mut h = Harness::new();
    h.installer.installed = false;
    let pin = semver::Version::new(1, 9, 0);
    h.run(Some("/sdk"), Some(&pin)).await.expect("setup");
    assert_eq!(h.entries()[0], "install 1.9.0");
    assert_eq!(h.entries().len(), 4);
}

#[tokio::test]
async fn test_install_failure_is_fatal() {
    let mut h = Harness::new();
    h.installer.installed = false;
    h.installer.fail = true;
    let err = h.run(Some("/sdk"), None).await.expect_err("fatal");
    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::Install(_))
    ));
    assert_eq!(h.entries().len(), 1, "nothing runs after a failed install");
}

#[tokio::test]
async fn test_unset_sdk_path_is_fatal_before_login() {
    let h = Harness::new();
    let err = h.run(None, None).await.expect_err("fatal");
    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::SdkPathUnset)
    ));
    assert!(h.entries().is_empty());
}

#[tokio::test]
async fn test_auth_failure_is_fatal() {
    let mut h = Harness::new();
    h.client.fail_login = true;
    let err = h.run(Some("/sdk"), None).await.expect_err("fatal");
    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::Auth(_))
    ));
}

#[tokio::test]
async fn test_user_agent_export_failure_is_fatal() {
    let mut h = Harness::new();
    h.exporter.fail = true;
    let err = h.run(Some("/sdk"), None).await.expect_err("fatal");
    let export = err.downcast_ref::<ExportError>().expect("export error");
    assert_eq!(export.key, USER_AGENT_EXTRA_DATA_KEY);
    assert!(!h.entries().iter().any(|e| e.starts_with("login")));
}
