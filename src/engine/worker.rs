//! Interpreter worker process
//!
//! Each engine owns one `python3` child running a small driver loop:
//! newline-delimited JSON requests on stdin, one JSON reply per request on
//! stdout. The driver holds the evaluation namespace for the life of the
//! process, so bindings persist across requests until a reset or a kill.

use std::path::Path;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use crate::error::{Error, Result};

/// Driver loop executed by `python -u -c`.
///
/// Output capture is scoped: each exec redirects `sys.stdout`/`sys.stderr`
/// into fresh `StringIO` buffers via context managers, so the real streams
/// (the protocol pipe among them) are restored on every exit path. Errors
/// come back as the interpreter's own traceback rendering with the
/// driver's frame stripped.
const DRIVER: &str = r#"
import io
import json
import sys
import traceback
from contextlib import redirect_stdout, redirect_stderr

namespace = {"__name__": "__main__"}


def run(source):
    out = io.StringIO()
    err = io.StringIO()
    try:
        code = compile(source, "<snippet>", "exec")
        with redirect_stdout(out), redirect_stderr(err):
            exec(code, namespace)
    except BaseException as exc:
        tb = exc.__traceback__.tb_next if exc.__traceback__ else None
        diagnostic = "".join(traceback.format_exception(type(exc), exc, tb))
        return {"status": "error", "diagnostic": diagnostic}
    return {"status": "ok", "stdout": out.getvalue(), "stderr": err.getvalue()}


for line in sys.stdin:
    line = line.strip()
    if not line:
        continue
    request = json.loads(line)
    if request.get("op") == "reset":
        namespace.clear()
        namespace["__name__"] = "__main__"
        reply = {"status": "reset"}
    else:
        reply = run(request.get("source", ""))
    sys.stdout.write(json.dumps(reply) + "\n")
    sys.stdout.flush()
"#;

/// Request sent to the driver
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub(crate) enum Request<'a> {
    /// Evaluate a snippet against the persistent namespace
    Eval { source: &'a str },
    /// Clear the namespace
    Reset,
}

/// Reply read back from the driver
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum Reply {
    /// Evaluation completed; both buffers may be empty
    Ok { stdout: String, stderr: String },
    /// Evaluation raised; `diagnostic` is the native traceback text
    Error { diagnostic: String },
    /// Reset acknowledged
    Reset,
}

/// Handle to one running driver process
pub(crate) struct Worker {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
}

impl Worker {
    /// Spawn a fresh worker with an empty namespace
    pub(crate) fn spawn(python: &Path) -> Result<Self> {
        let mut child = Command::new(python)
            .arg("-u")
            .arg("-c")
            .arg(DRIVER)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::Worker(format!("Failed to spawn {}: {}", python.display(), e))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Worker("Worker stdin pipe missing".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Worker("Worker stdout pipe missing".to_string()))?;

        debug!("Spawned interpreter worker (pid {:?})", child.id());

        Ok(Worker {
            child,
            stdin,
            reader: BufReader::new(stdout),
        })
    }

    /// Send one request and wait for its reply
    pub(crate) async fn request(&mut self, request: &Request<'_>) -> Result<Reply> {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::Worker(format!("Failed to write to worker: {}", e)))?;

        let mut reply = String::new();
        let read = self
            .reader
            .read_line(&mut reply)
            .await
            .map_err(|e| Error::Worker(format!("Failed to read from worker: {}", e)))?;
        if read == 0 {
            return Err(Error::Worker("Worker exited unexpectedly".to_string()));
        }

        serde_json::from_str(reply.trim())
            .map_err(|e| Error::Worker(format!("Malformed worker reply: {}", e)))
    }

    /// Kill the process without waiting for it to finish
    pub(crate) fn abandon(mut self) {
        // kill_on_drop reaps the child in the background once the SIGKILL
        // lands; nothing to await here.
        let _ = self.child.start_kill();
        debug!("Killed interpreter worker (pid {:?})", self.child.id());
    }
}
