use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::KernelSpec;

/// In-kernel harness: reads one JSON request per line from stdin, execs the
/// cell source in a single shared namespace, and writes one JSON reply per
/// line to stdout. Cell prints go through the captured StringIO streams, so
/// the reply channel stays clean. If the last statement of a cell is an
/// expression its repr is returned as the cell result.
const HARNESS: &str = r#"
import ast, io, json, sys, traceback

def run_cell(code, env):
    out, err = io.StringIO(), io.StringIO()
    saved = (sys.stdout, sys.stderr)
    sys.stdout, sys.stderr = out, err
    reply = {"status": "ok"}
    try:
        tree = ast.parse(code)
        result = None
        if tree.body and isinstance(tree.body[-1], ast.Expr):
            last = tree.body.pop()
            exec(compile(tree, "<cell>", "exec"), env)
            result = eval(compile(ast.Expression(last.value), "<cell>", "eval"), env)
        else:
            exec(compile(tree, "<cell>", "exec"), env)
        if result is not None:
            reply["result"] = repr(result)
    except BaseException as exc:
        reply = {
            "status": "error",
            "ename": type(exc).__name__,
            "evalue": str(exc),
            "traceback": traceback.format_exc().splitlines(),
        }
    finally:
        sys.stdout, sys.stderr = saved
    reply["stdout"] = out.getvalue()
    reply["stderr"] = err.getvalue()
    return reply

def main():
    env = {"__name__": "__main__"}
    for line in sys.stdin:
        line = line.strip()
        if not line:
            continue
        request = json.loads(line)
        json.dump(run_cell(request["code"], env), sys.stdout)
        sys.stdout.write("\n")
        sys.stdout.flush()

main()
"#;

#[derive(Debug, Serialize)]
struct CellRequest<'a> {
    code: &'a str,
}

/// Outcome of one cell as reported by the kernel harness.
#[derive(Debug, Clone, Deserialize)]
pub struct CellReply {
    pub status: ReplyStatus,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub ename: Option<String>,
    #[serde(default)]
    pub evalue: Option<String>,
    #[serde(default)]
    pub traceback: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Ok,
    Error,
}

/// One interpreter process serving one notebook run.
///
/// The session owns the child exclusively. Cells execute strictly one at a
/// time in a shared namespace, so later cells see bindings from earlier
/// ones. A single deadline bounds the whole run; when it passes, the child
/// is killed. The child is also killed on drop, so every exit path releases
/// the kernel process and its pipes.
#[derive(Debug)]
pub struct KernelSession {
    child: Child,
    stdin: Option<ChildStdin>,
    replies: Receiver<std::result::Result<CellReply, String>>,
    reader: Option<JoinHandle<()>>,
    deadline: Instant,
    timeout: Duration,
}

impl KernelSession {
    /// Start the kernel interpreter in `working_dir` with `timeout` as the
    /// whole-run limit.
    pub fn start(kernel: &KernelSpec, working_dir: &Path, timeout: Duration) -> Result<Self> {
        debug!(
            "starting kernel `{}` ({}) in {}",
            kernel.name(),
            kernel.interpreter(),
            working_dir.display()
        );

        let mut child = Command::new(kernel.interpreter())
            .arg("-c")
            .arg(HARNESS)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    Error::ExecutableNotFound {
                        program: kernel.interpreter().to_string(),
                    }
                } else {
                    Error::ProcessExecution {
                        program: kernel.interpreter().to_string(),
                        source,
                    }
                }
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Kernel("kernel stdin was not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Kernel("kernel stdout was not piped".to_string()))?;

        // A blocking pipe read cannot observe a deadline, so replies are
        // drained on a dedicated thread and received with a timeout.
        let (tx, rx) = mpsc::channel();
        let reader = std::thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let message = match line {
                    Ok(line) => serde_json::from_str(&line)
                        .map_err(|e| format!("malformed kernel reply: {e}")),
                    Err(e) => Err(format!("kernel stdout read failed: {e}")),
                };
                if tx.send(message).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            child,
            stdin: Some(stdin),
            replies: rx,
            reader: Some(reader),
            deadline: Instant::now() + timeout,
            timeout,
        })
    }

    /// Execute one cell's source and block until the kernel replies or the
    /// run deadline passes.
    pub fn execute_cell(&mut self, code: &str) -> Result<CellReply> {
        let request = serde_json::to_string(&CellRequest { code })
            .map_err(|e| Error::Kernel(format!("cannot encode cell request: {e}")))?;

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::Kernel("kernel session already closed".to_string()))?;
        writeln!(stdin, "{request}")
            .and_then(|()| stdin.flush())
            .map_err(|e| Error::Kernel(format!("kernel stdin closed: {e}")))?;

        let remaining = self.deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            self.kill();
            return Err(self.timeout_error());
        }

        match self.replies.recv_timeout(remaining) {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(message)) => Err(Error::Kernel(message)),
            Err(RecvTimeoutError::Timeout) => {
                self.kill();
                Err(self.timeout_error())
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(Error::Kernel("kernel exited before replying".to_string()))
            }
        }
    }

    fn timeout_error(&self) -> Error {
        Error::ExecutionTimeout {
            timeout_secs: self.timeout.as_secs(),
        }
    }

    fn kill(&mut self) {
        self.stdin.take();
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for KernelSession {
    fn drop(&mut self) {
        self.kill();
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}
