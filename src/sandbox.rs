//! Sandbox facade - the guard → supervisor → formatter pipeline
//!
//! This is the surface a presentation layer talks to: submit one snippet,
//! get one rendered transcript back. A blocked snippet never reaches the
//! engine; everything else is evaluated under the configured deadline.

use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::engine::{run_with_timeout, Outcome, PythonEngine};
use crate::format;
use crate::guard::{StaticGuard, Violation};

/// One-stop snippet executor with a persistent namespace
pub struct Sandbox {
    guard: StaticGuard,
    engine: PythonEngine,
    deadline: Duration,
}

impl Sandbox {
    /// Create a sandbox from configuration
    pub fn new(config: &Config) -> Self {
        Sandbox {
            guard: StaticGuard::new(),
            engine: PythonEngine::new(&config.interpreter),
            deadline: config.execution.timeout,
        }
    }

    /// Override the evaluation deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Mutable access to the deny list, for caller extensions
    ///
    /// Must not be called while an execution is in progress; the borrow
    /// checker enforces exactly that.
    pub fn guard_mut(&mut self) -> &mut StaticGuard {
        &mut self.guard
    }

    /// Static scan only; no evaluation
    pub fn check(&self, source: &str) -> Vec<Violation> {
        self.guard.check(source)
    }

    /// Run one snippet to its outcome
    pub async fn run(&mut self, source: &str) -> Outcome {
        let violations = self.guard.check(source);
        if !violations.is_empty() {
            debug!("Blocked snippet ({} violations)", violations.len());
            return Outcome::Blocked(violations);
        }
        run_with_timeout(&mut self.engine, source, self.deadline).await
    }

    /// Run one snippet and render the transcript
    pub async fn execute(&mut self, source: &str) -> String {
        format::render(&self.run(source).await)
    }

    /// Clear the persistent namespace
    pub async fn reset(&mut self) {
        self.engine.reset().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn sandbox() -> Sandbox {
        Sandbox::new(&Config::minimal())
    }

    #[tokio::test]
    async fn test_blocked_snippet_never_reaches_the_engine() {
        // A broken interpreter path would fail any evaluation, so a
        // Blocked outcome proves the engine was never invoked.
        let mut config = Config::minimal();
        config.interpreter.python = "pyexec-no-such-interpreter".into();
        let mut sandbox = Sandbox::new(&config);

        let outcome = sandbox.run("import tkinter").await;
        match outcome {
            Outcome::Blocked(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].name, "tkinter");
            }
            other => panic!("expected blocked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_renders_success_transcript() {
        let mut sandbox = sandbox();
        let transcript = sandbox.execute("x = 1 + 1\nprint(x)").await;
        assert_eq!(transcript, "✅ Output:\n2\n");
    }

    #[tokio::test]
    async fn test_execute_renders_blocked_transcript() {
        let mut sandbox = sandbox();
        let transcript = sandbox.execute("name = input('Enter name: ')").await;
        assert!(transcript.contains("❌ Code execution blocked!"));
        assert!(transcript.contains("• input: input() function requires user interaction"));
    }

    #[tokio::test]
    async fn test_execute_renders_error_transcript() {
        let mut sandbox = sandbox();
        let transcript = sandbox.execute("1/0").await;
        assert!(transcript.contains("❌ Execution Error:"));
        assert!(transcript.contains("ZeroDivisionError"));
    }

    #[tokio::test]
    async fn test_deadline_override() {
        let mut sandbox = sandbox().with_deadline(Duration::from_millis(300));
        let transcript = sandbox.execute("while True: pass").await;
        assert!(transcript.contains("⏰ Execution timed out after 0.3 seconds"));
    }

    #[tokio::test]
    async fn test_namespace_survives_between_executes() {
        let mut sandbox = sandbox();
        sandbox.execute("x = 5").await;
        assert_eq!(sandbox.execute("print(x)").await, "✅ Output:\n5\n");

        sandbox.reset().await;
        let transcript = sandbox.execute("print(x)").await;
        assert!(transcript.contains("NameError"));
    }

    #[tokio::test]
    async fn test_extended_deny_list() {
        let mut sandbox = sandbox();
        sandbox
            .guard_mut()
            .deny("webbrowser", "opens an external window");
        let transcript = sandbox.execute("import webbrowser").await;
        assert!(transcript.contains("• webbrowser: opens an external window"));
    }
}
