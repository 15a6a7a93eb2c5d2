//! Artifact Compiler Adapter — one bounded invocation of the external TeX
//! engine. A non-zero exit is a normal outcome the orchestrator interprets
//! (TeX reports recoverable warnings as failures on pass one); only a binary
//! that cannot be started at all is an error here.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::warn;

use crate::render::RenderError;

/// Captured outcome of one compiler pass.
/// `exit_code` is `None` when the process was killed (timeout or signal).
#[derive(Debug)]
pub struct PassOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl PassOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs the TeX engine once over `primary` inside `workdir`, bounded by
/// `timeout`. On timeout the child is killed (via `kill_on_drop`) and the
/// pass is reported as failed rather than raised, so the orchestrator can
/// feed it into the same diagnostic path as a non-zero exit.
pub async fn run_pass(
    engine: &str,
    workdir: &Path,
    primary: &Path,
    timeout: Duration,
) -> Result<PassOutput, RenderError> {
    let child = Command::new(engine)
        .arg("-interaction=nonstopmode")
        .arg("-output-directory")
        .arg(workdir)
        .arg(primary)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| RenderError::ToolMissing {
            engine: engine.to_string(),
            source,
        })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(PassOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            timed_out: false,
        }),
        Ok(Err(e)) => Err(RenderError::Workspace(e)),
        Err(_elapsed) => {
            // Dropping the timed-out future drops the child, which kills the
            // process (`kill_on_drop`). Nothing useful was captured.
            warn!(engine, timeout_secs = timeout.as_secs(), "TeX pass exceeded its time ceiling");
            Ok(PassOutput {
                exit_code: None,
                stdout: String::new(),
                stderr: format!("pass killed after exceeding {}s ceiling", timeout.as_secs()),
                timed_out: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_engine_is_tool_missing() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("doc.tex");
        std::fs::write(&primary, "x").unwrap();

        let result = run_pass(
            "definitely-not-an-installed-tex-engine",
            dir.path(),
            &primary,
            Duration::from_secs(5),
        )
        .await;

        match result {
            Err(RenderError::ToolMissing { engine, .. }) => {
                assert_eq!(engine, "definitely-not-an-installed-tex-engine");
            }
            other => panic!("expected ToolMissing, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_a_normal_outcome() {
        // `false` exits 1 without reading its arguments; the adapter must
        // report that as a pass result, not an error.
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("doc.tex");
        std::fs::write(&primary, "x").unwrap();

        let output = run_pass("false", dir.path(), &primary, Duration::from_secs(5))
            .await
            .expect("non-zero exit must not raise");
        assert_eq!(output.exit_code, Some(1));
        assert!(!output.succeeded());
        assert!(!output.timed_out);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_pass_and_reports_it_failed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("doc.tex");
        std::fs::write(&primary, "x").unwrap();

        // A stand-in engine that hangs regardless of its arguments.
        let engine = dir.path().join("slowtex");
        std::fs::write(&engine, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&engine, std::fs::Permissions::from_mode(0o755)).unwrap();

        let output = run_pass(
            engine.to_str().unwrap(),
            dir.path(),
            &primary,
            Duration::from_millis(200),
        )
        .await
        .expect("timeout must not raise");

        assert!(output.timed_out);
        assert_eq!(output.exit_code, None);
    }
}
