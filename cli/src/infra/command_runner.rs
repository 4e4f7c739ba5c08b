//! Infrastructure implementation of the `CommandRunner` port, plus the
//! invocation helper every adapter uses to turn raw output into
//! `Result<String, ProcessError>`.

use std::process::{Output, Stdio};

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::application::ports::CommandRunner;
use crate::domain::ProcessError;

/// Production `CommandRunner` backed by `tokio::process`.
///
/// Waits for the child unconditionally; there is no timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        // Read stdout/stderr concurrently with wait() so a child that fills
        // the pipe buffer cannot deadlock against us.
        let (status, stdout, stderr) = tokio::join!(
            child.wait(),
            async {
                let mut buf = Vec::new();
                if let Some(ref mut h) = stdout_handle {
                    let _ = h.read_to_end(&mut buf).await;
                }
                buf
            },
            async {
                let mut buf = Vec::new();
                if let Some(ref mut h) = stderr_handle {
                    let _ = h.read_to_end(&mut buf).await;
                }
                buf
            },
        );
        Ok(Output {
            status: status.with_context(|| format!("waiting for {program}"))?,
            stdout,
            stderr,
        })
    }
}

/// Command line as it may appear in logs, with every `secrets` argument
/// replaced by `***`.
#[must_use]
pub fn printable_command(program: &str, args: &[&str], secrets: &[&str]) -> String {
    std::iter::once(program)
        .chain(
            args.iter()
                .map(|&a| if secrets.contains(&a) { "***" } else { a }),
        )
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stdout followed by stderr, lossily decoded and trimmed.
#[must_use]
pub fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_owned()
}

/// Run `program` and return its combined output.
///
/// # Errors
///
/// Returns [`ProcessError::Spawn`] if the program could not be run and
/// [`ProcessError::Failed`] if it exited non-zero.
pub async fn invoke(
    runner: &impl CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<String, ProcessError> {
    invoke_masked(runner, program, args, &[]).await
}

/// [`invoke`], masking `secrets` in the command line carried by errors.
///
/// # Errors
///
/// See [`invoke`].
pub async fn invoke_masked(
    runner: &impl CommandRunner,
    program: &str,
    args: &[&str],
    secrets: &[&str],
) -> Result<String, ProcessError> {
    let command = printable_command(program, args, secrets);
    debug!(%command, "running");
    let output = runner
        .run(program, args)
        .await
        .map_err(|e| ProcessError::Spawn {
            command: command.clone(),
            reason: format!("{e:#}"),
        })?;
    let text = combined_output(&output);
    if output.status.success() {
        Ok(text)
    } else {
        Err(ProcessError::Failed {
            command,
            status: output.status.to_string(),
            output: text,
        })
    }
}
