//! External validator commands
//!
//! Commands run one at a time on a current-thread runtime. A command that
//! outlives its timeout is killed (the child is dropped with
//! `kill_on_drop`) and recorded as a `TIMEOUT` failure.

use crate::error::OrchestratorError;
use crate::report::{TaskRecord, TaskStatus, COMMAND_CATEGORY, TIMEOUT_CATEGORY};
use crate::task::CommandSpec;
use specgate_checks::{Findings, Issue};
use std::process::Stdio;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Runtime used for every command of one run
pub(crate) fn build_runtime() -> Result<Runtime, OrchestratorError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(OrchestratorError::Runtime)
}

/// Run one command to completion or timeout
pub(crate) async fn run_command(spec: &CommandSpec, document: &str, timeout: Duration) -> TaskRecord {
    let record = |status: TaskStatus| TaskRecord::new(&spec.name, None, spec.criticality, status);
    let failure = |status: TaskStatus, category: &str, message: String| {
        let mut issues = Findings::new();
        issues.push(Issue::error(category, message.as_str()));
        record(status).with_output(message).with_issues(issues)
    };

    let child = tokio::process::Command::new(&spec.program)
        .args(spec.resolved_args(document))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(command = %spec.name, program = %spec.program, error = %e, "spawn failed");
            return failure(
                TaskStatus::Error,
                COMMAND_CATEGORY,
                format!("spawn failed for {}: {e}", spec.program),
            );
        }
    };

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Err(_) => {
            tracing::warn!(command = %spec.name, timeout_secs = timeout.as_secs(), "command timed out");
            failure(
                TaskStatus::Timeout,
                TIMEOUT_CATEGORY,
                format!("Validation timed out after {} seconds", timeout.as_secs()),
            )
        }
        Ok(Err(e)) => failure(
            TaskStatus::Error,
            COMMAND_CATEGORY,
            format!("could not collect output of {}: {e}", spec.program),
        ),
        Ok(Ok(output)) => {
            let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                if !captured.is_empty() && !captured.ends_with('\n') {
                    captured.push('\n');
                }
                captured.push_str(&stderr);
            }

            if output.status.success() {
                record(TaskStatus::Passed).with_output(captured)
            } else {
                let code = output
                    .status
                    .code()
                    .map_or_else(|| "a signal".to_string(), |c| format!("status {c}"));
                let mut issues = Findings::new();
                issues.push(Issue::error(
                    COMMAND_CATEGORY,
                    format!("{} exited with {code}", spec.program),
                ));
                record(TaskStatus::Failed)
                    .with_output(captured)
                    .with_issues(issues)
            }
        }
    }
}
