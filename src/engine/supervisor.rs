//! Timeout supervisor - wall-clock watchdog around one evaluation

use std::time::Duration;

use tracing::warn;

use super::{Outcome, PythonEngine};

/// Deadline applied when the caller does not override it
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// Evaluate `source` with a wall-clock deadline
///
/// Completion before the deadline returns the engine's outcome unchanged
/// and immediately. When the deadline elapses first, the worker process is
/// killed outright and `TimedOut` is returned; the runaway snippet does
/// not keep burning CPU in the background. The cost of that policy is that
/// the namespace does not survive a timeout - the next evaluation on the
/// same engine starts on a fresh worker.
pub async fn run_with_timeout(
    engine: &mut PythonEngine,
    source: &str,
    deadline: Duration,
) -> Outcome {
    match tokio::time::timeout(deadline, engine.evaluate(source)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!("Evaluation exceeded {:?} deadline, killing worker", deadline);
            engine.shutdown();
            Outcome::TimedOut { deadline }
        }
    }
}
