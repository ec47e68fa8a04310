//! Notebook execution driver
//!
//! Linear state machine per run: Unloaded -> Loaded -> Running ->
//! {Completed | Failed}. Loading or kernel-start failures return `Err`
//! before any cell runs; once running, the outcome is an
//! [`ExecutionReport`] whose `final_state` distinguishes a clean run from
//! one stopped at the first failing cell or at the run deadline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::command::CommandRunner;
use crate::diagnostics;
use crate::error::{Error, Result};
use crate::kernel::{CellReply, KernelSession, KernelSpec, ReplyStatus};
use crate::notebook::{Cell, Notebook, Output, SourceText, StreamName};

/// Per-run execution configuration. Constructed immediately before a run
/// and discarded after it.
///
/// The kernel is a required, explicit choice; call sites must state it.
/// [`KernelSpec::default`] is the documented default (`python3`) for
/// callers that want it, but nothing here falls back to it silently.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    pub kernel: KernelSpec,
    pub working_dir: PathBuf,
    pub timeout: Duration,
}

impl ExecutionConfig {
    pub fn new(kernel: KernelSpec, working_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            kernel,
            working_dir: working_dir.into(),
            timeout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalState {
    Completed,
    Failed,
}

/// What stopped a run, preserved for the caller and for serialized
/// reports. A run is all-or-nothing past the failure point; there is no
/// partial-success state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorRecord {
    CellExecution {
        cell_index: usize,
        ename: String,
        evalue: String,
        traceback: Vec<String>,
    },
    Timeout {
        timeout_secs: u64,
    },
}

/// Outcome of one notebook run. The mutated notebook (with captured
/// outputs) is the durable artifact; whether it is persisted back to disk
/// is the caller's decision.
#[derive(Debug)]
pub struct ExecutionReport {
    pub final_state: FinalState,
    pub executed_cell_count: usize,
    pub error: Option<ErrorRecord>,
    pub notebook: Notebook,
}

impl ExecutionReport {
    pub fn completed(&self) -> bool {
        self.final_state == FinalState::Completed
    }
}

/// Executes every cell of a notebook, in document order, under one kernel
/// session.
#[derive(Debug, Default)]
pub struct NotebookDriver {
    preflight: bool,
}

impl NotebookDriver {
    pub fn new() -> Self {
        Self { preflight: false }
    }

    /// Run the fixed pre-flight diagnostic commands before executing.
    /// Their failures are reported but never fail the run.
    pub fn with_preflight(mut self) -> Self {
        self.preflight = true;
        self
    }

    /// Load the notebook at `path` and execute it under `config`.
    pub fn execute(&self, path: impl AsRef<Path>, config: &ExecutionConfig) -> Result<ExecutionReport> {
        let path = path.as_ref();
        let notebook = Notebook::from_path(path)?;
        debug!(
            "loaded {} ({} cells, {} code)",
            path.display(),
            notebook.cell_count(),
            notebook.code_cell_count()
        );

        if self.preflight {
            for report in diagnostics::run_preflight(&CommandRunner::new()) {
                match &report.outcome {
                    Ok(result) => info!(
                        "preflight {}: exit {}\n{}",
                        report.label,
                        result.exit_code,
                        result.stdout_lossy().trim_end()
                    ),
                    Err(e) => warn!("preflight {} failed: {e}", report.label),
                }
            }
        }

        self.execute_document(notebook, config)
    }

    /// Execute an already-loaded document. Cells run strictly in document
    /// order; later cells may depend on bindings from earlier ones.
    pub fn execute_document(
        &self,
        mut notebook: Notebook,
        config: &ExecutionConfig,
    ) -> Result<ExecutionReport> {
        let mut session = KernelSession::start(&config.kernel, &config.working_dir, config.timeout)?;

        let mut executed = 0usize;
        let mut execution_count = 0u64;

        for (index, cell) in notebook.cells.iter_mut().enumerate() {
            let Cell::Code(code_cell) = cell else {
                // Markup cells have nothing to run; they pass through
                // untouched but still count as visited.
                executed += 1;
                continue;
            };

            let source = code_cell.source.as_joined();
            debug!("executing cell {index}");

            let reply = match session.execute_cell(&source) {
                Ok(reply) => reply,
                Err(Error::ExecutionTimeout { timeout_secs }) => {
                    warn!("run exceeded timeout of {timeout_secs}s at cell {index}");
                    return Ok(ExecutionReport {
                        final_state: FinalState::Failed,
                        executed_cell_count: executed,
                        error: Some(ErrorRecord::Timeout { timeout_secs }),
                        notebook,
                    });
                }
                Err(e) => return Err(e),
            };

            executed += 1;
            execution_count += 1;
            code_cell.execution_count = Some(execution_count);
            code_cell.outputs = outputs_from_reply(&reply, execution_count);

            if matches!(reply.status, ReplyStatus::Error) {
                let record = ErrorRecord::CellExecution {
                    cell_index: index,
                    ename: reply.ename.unwrap_or_else(|| "Exception".to_string()),
                    evalue: reply.evalue.unwrap_or_default(),
                    traceback: reply.traceback,
                };
                warn!("cell {index} raised; stopping run");
                return Ok(ExecutionReport {
                    final_state: FinalState::Failed,
                    executed_cell_count: executed,
                    error: Some(record),
                    notebook,
                });
            }
        }

        info!("notebook run completed: {executed} cells");
        Ok(ExecutionReport {
            final_state: FinalState::Completed,
            executed_cell_count: executed,
            error: None,
            notebook,
        })
    }
}

fn outputs_from_reply(reply: &CellReply, execution_count: u64) -> Vec<Output> {
    let mut outputs = Vec::new();

    if !reply.stdout.is_empty() {
        outputs.push(Output::Stream {
            name: StreamName::Stdout,
            text: SourceText::Joined(reply.stdout.clone()),
        });
    }
    if !reply.stderr.is_empty() {
        outputs.push(Output::Stream {
            name: StreamName::Stderr,
            text: SourceText::Joined(reply.stderr.clone()),
        });
    }
    if let Some(result) = &reply.result {
        let mut data = Map::new();
        data.insert("text/plain".to_string(), Value::String(result.clone()));
        outputs.push(Output::ExecuteResult {
            data,
            metadata: Map::new(),
            execution_count: Some(execution_count),
        });
    }
    if matches!(reply.status, ReplyStatus::Error) {
        outputs.push(Output::Error {
            ename: reply.ename.clone().unwrap_or_else(|| "Exception".to_string()),
            evalue: reply.evalue.clone().unwrap_or_default(),
            traceback: reply.traceback.clone(),
        });
    }

    outputs
}
