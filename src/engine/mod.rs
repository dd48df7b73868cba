//! Execution engine - isolated Python evaluation with output capture
//!
//! `PythonEngine` evaluates snippets against a persistent namespace held by
//! a dedicated interpreter worker process. Standard output and standard
//! error are captured per call; runtime failures come back as the
//! interpreter's own traceback text. Blocking and timeout concerns live in
//! the callers (`guard`, `supervisor`), not here.

mod supervisor;
mod worker;

pub use supervisor::{run_with_timeout, DEFAULT_DEADLINE};

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::InterpreterConfig;
use crate::error::{Error, Result};
use crate::guard::Violation;
use worker::{Reply, Request, Worker};

/// Terminal classification of one execution attempt
///
/// Exactly one variant is produced per submitted snippet. `Blocked` is
/// produced before any evaluation side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The static guard rejected the snippet; it was never evaluated
    Blocked(Vec<Violation>),
    /// Evaluation finished; either buffer may be empty
    Success { stdout: String, stderr: String },
    /// Evaluation raised; `diagnostic` is the full traceback text
    RuntimeError { diagnostic: String },
    /// The deadline elapsed before evaluation finished
    TimedOut { deadline: Duration },
}

impl Outcome {
    /// Whether the snippet ran to completion
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Whether the snippet was rejected before evaluation
    pub fn is_blocked(&self) -> bool {
        matches!(self, Outcome::Blocked(_))
    }
}

/// Evaluates snippets in a dedicated interpreter worker
///
/// The namespace persists across `evaluate` calls on the same engine until
/// `reset` is called or the worker is killed (timeout or `shutdown`), after
/// which the next evaluation starts on a fresh, empty namespace. `&mut
/// self` on `evaluate` keeps at most one evaluation per engine in flight,
/// so capture buffers are never shared.
pub struct PythonEngine {
    python: PathBuf,
    worker: Option<Worker>,
}

impl PythonEngine {
    /// Create an engine using the configured interpreter
    pub fn new(config: &InterpreterConfig) -> Self {
        PythonEngine {
            python: config.python.clone(),
            worker: None,
        }
    }

    /// Create an engine for a specific interpreter executable
    pub fn with_interpreter(python: impl Into<PathBuf>) -> Self {
        PythonEngine {
            python: python.into(),
            worker: None,
        }
    }

    /// Evaluate one snippet against the persistent namespace
    ///
    /// Returns only `Success` or `RuntimeError`. Failures of the worker
    /// machinery itself never escape: they degrade to a `RuntimeError`
    /// outcome naming the failure, and the worker is discarded so the next
    /// call starts clean.
    pub async fn evaluate(&mut self, source: &str) -> Outcome {
        match self.try_evaluate(source).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Evaluation machinery failed: {}", e);
                self.shutdown();
                Outcome::RuntimeError {
                    diagnostic: format!("Interpreter worker failure: {}", e),
                }
            }
        }
    }

    async fn try_evaluate(&mut self, source: &str) -> Result<Outcome> {
        let worker = self.worker().await?;
        match worker.request(&Request::Eval { source }).await? {
            Reply::Ok { stdout, stderr } => Ok(Outcome::Success { stdout, stderr }),
            Reply::Error { diagnostic } => Ok(Outcome::RuntimeError { diagnostic }),
            Reply::Reset => Err(Error::Worker(
                "Unexpected reset acknowledgement".to_string(),
            )),
        }
    }

    /// Clear the namespace
    ///
    /// Bindings from earlier evaluations are gone afterwards. A worker
    /// that cannot acknowledge the reset is discarded instead, which
    /// achieves the same post-condition on the next spawn.
    pub async fn reset(&mut self) {
        let Some(worker) = self.worker.as_mut() else {
            // No worker yet means the namespace is already empty.
            return;
        };
        match worker.request(&Request::Reset).await {
            Ok(Reply::Reset) => debug!("Namespace cleared"),
            Ok(_) | Err(_) => {
                warn!("Reset not acknowledged, discarding worker");
                self.shutdown();
            }
        }
    }

    /// Kill the worker, if any
    ///
    /// The next evaluation spawns a fresh worker with an empty namespace.
    /// Used by the supervisor when a deadline elapses.
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abandon();
        }
    }

    async fn worker(&mut self) -> Result<&mut Worker> {
        if self.worker.is_none() {
            self.worker = Some(Worker::spawn(&self.python)?);
        }
        self.worker
            .as_mut()
            .ok_or_else(|| Error::Internal("Worker slot empty after spawn".to_string()))
    }
}

impl Drop for PythonEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PythonEngine {
        PythonEngine::with_interpreter("python3")
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let mut engine = engine();
        let outcome = engine.evaluate("x = 1 + 1\nprint(x)").await;
        assert_eq!(
            outcome,
            Outcome::Success {
                stdout: "2\n".to_string(),
                stderr: String::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_empty_output_is_success() {
        let mut engine = engine();
        let outcome = engine.evaluate("x = 41 + 1").await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_captures_stderr() {
        let mut engine = engine();
        let outcome = engine
            .evaluate("import sys\nsys.stderr.write('careful\\n')")
            .await;
        match outcome {
            Outcome::Success { stdout, stderr } => {
                assert_eq!(stdout, "");
                assert_eq!(stderr, "careful\n");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_runtime_error_diagnostic() {
        let mut engine = engine();
        let outcome = engine.evaluate("1/0").await;
        match outcome {
            Outcome::RuntimeError { diagnostic } => {
                assert!(diagnostic.contains("ZeroDivisionError"));
                assert!(diagnostic.contains("<snippet>"));
            }
            other => panic!("expected runtime error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_syntax_error_surfaces_as_runtime_error() {
        let mut engine = engine();
        let outcome = engine.evaluate("def broken(:\n").await;
        match outcome {
            Outcome::RuntimeError { diagnostic } => {
                assert!(diagnostic.contains("SyntaxError"));
            }
            other => panic!("expected runtime error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_namespace_persists_across_calls() {
        let mut engine = engine();
        assert!(engine.evaluate("x = 5").await.is_success());
        let outcome = engine.evaluate("print(x)").await;
        assert_eq!(
            outcome,
            Outcome::Success {
                stdout: "5\n".to_string(),
                stderr: String::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_reset_clears_namespace() {
        let mut engine = engine();
        assert!(engine.evaluate("x = 5").await.is_success());
        engine.reset().await;
        let outcome = engine.evaluate("print(x)").await;
        match outcome {
            Outcome::RuntimeError { diagnostic } => {
                assert!(diagnostic.contains("NameError"));
            }
            other => panic!("expected NameError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recovers_from_worker_death() {
        let mut engine = engine();
        let outcome = engine.evaluate("import os\nos._exit(3)").await;
        assert!(matches!(outcome, Outcome::RuntimeError { .. }));

        // Next call spawns a fresh worker.
        let outcome = engine.evaluate("print('back')").await;
        assert_eq!(
            outcome,
            Outcome::Success {
                stdout: "back\n".to_string(),
                stderr: String::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_interpreter_degrades_to_diagnostic() {
        let mut engine = PythonEngine::with_interpreter("pyexec-no-such-interpreter");
        let outcome = engine.evaluate("print('hi')").await;
        match outcome {
            Outcome::RuntimeError { diagnostic } => {
                assert!(diagnostic.contains("Interpreter worker failure"));
            }
            other => panic!("expected degraded diagnostic, got {:?}", other),
        }
    }
}
