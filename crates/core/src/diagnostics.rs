//! Pre-flight environment diagnostics
//!
//! A fixed list of introspection commands run before a notebook executes,
//! purely for operator visibility. They run strictly in the listed order,
//! one at a time, each fully drained before the next. Failures are
//! reported, never escalated.

use tracing::{debug, warn};

use crate::command::{CommandResult, CommandRunner, CommandSpec};
use crate::error::Error;

/// Outcome of one diagnostic command. The error case is carried here
/// instead of propagating: diagnostics are best-effort.
#[derive(Debug)]
pub struct DiagnosticReport {
    pub label: &'static str,
    pub spec: CommandSpec,
    pub outcome: Result<CommandResult, Error>,
}

impl DiagnosticReport {
    pub fn succeeded(&self) -> bool {
        matches!(&self.outcome, Ok(result) if result.success())
    }
}

/// The fixed pre-flight command list, in execution order.
pub fn preflight_commands() -> Vec<(&'static str, CommandSpec)> {
    vec![
        (
            "available kernels",
            CommandSpec::new("jupyter").args(["kernelspec", "list"]),
        ),
        ("working directory", CommandSpec::new("pwd")),
        // printenv reads PATH itself; passing `$PATH` as an argument would
        // arrive literally, since no shell is involved.
        ("effective PATH", CommandSpec::new("printenv").arg("PATH")),
        (
            "installed packages",
            CommandSpec::new("python3").args(["-m", "pip", "list"]),
        ),
    ]
}

/// Run every pre-flight command and collect the reports. Never fails.
pub fn run_preflight(runner: &CommandRunner) -> Vec<DiagnosticReport> {
    preflight_commands()
        .into_iter()
        .map(|(label, spec)| {
            let outcome = runner.run(&spec);
            match &outcome {
                Ok(result) => debug!("diagnostic `{label}` exited with {}", result.exit_code),
                Err(e) => warn!("diagnostic `{label}` could not run: {e}"),
            }
            DiagnosticReport {
                label,
                spec,
                outcome,
            }
        })
        .collect()
}
