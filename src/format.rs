//! Result formatter - renders an outcome as the user-facing transcript
//!
//! Pure text assembly with no failure modes. The four outcome classes get
//! visually distinct banners so a transcript is unambiguous at a glance.

use std::time::Duration;

use crate::engine::Outcome;

const BLOCKED_BANNER: &str = "❌ Code execution blocked!";
const OUTPUT_BANNER: &str = "✅ Output:";
const WARNINGS_BANNER: &str = "⚠️  Warnings:";
const ERROR_BANNER: &str = "❌ Execution Error:";
const NO_OUTPUT_MESSAGE: &str = "✅ Code executed successfully (no output)";

const SUGGESTIONS: &str = "💡 Suggestions:
• Use hardcoded values instead of input()
• Define variables with your test data
• Use random values for testing
• Example: name = 'John' instead of name = input('Enter name: ')";

/// Render one outcome as the final transcript text
pub fn render(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Blocked(violations) => {
            let mut text = String::new();
            text.push_str(BLOCKED_BANNER);
            text.push_str("\n\n");
            text.push_str("The following functions require user input and are not allowed:\n");
            for violation in violations {
                text.push_str(&format!("• {}: {}\n", violation.name, violation.reason));
            }
            text.push('\n');
            text.push_str(SUGGESTIONS);
            text
        }
        Outcome::Success { stdout, stderr } => {
            if stdout.is_empty() && stderr.is_empty() {
                return NO_OUTPUT_MESSAGE.to_string();
            }
            let mut text = String::new();
            if !stdout.is_empty() {
                text.push_str(OUTPUT_BANNER);
                text.push('\n');
                text.push_str(stdout);
            }
            if !stderr.is_empty() {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(WARNINGS_BANNER);
                text.push('\n');
                text.push_str(stderr);
            }
            text
        }
        Outcome::RuntimeError { diagnostic } => {
            format!("{}\n{}", ERROR_BANNER, diagnostic)
        }
        Outcome::TimedOut { deadline } => {
            format!("⏰ Execution timed out after {} seconds", seconds(deadline))
        }
    }
}

/// Format a duration as seconds, dropping a zero fraction
fn seconds(deadline: &Duration) -> String {
    let secs = deadline.as_secs_f64();
    if secs.fract() == 0.0 {
        format!("{}", secs as u64)
    } else {
        format!("{}", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::Violation;

    #[test]
    fn test_no_output_message_is_fixed() {
        let outcome = Outcome::Success {
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(render(&outcome), NO_OUTPUT_MESSAGE);
        // Idempotent, no hidden state.
        assert_eq!(render(&outcome), NO_OUTPUT_MESSAGE);
    }

    #[test]
    fn test_stdout_rendering() {
        let outcome = Outcome::Success {
            stdout: "2\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(render(&outcome), "✅ Output:\n2\n");
    }

    #[test]
    fn test_stderr_renders_after_stdout() {
        let outcome = Outcome::Success {
            stdout: "ok\n".to_string(),
            stderr: "careful\n".to_string(),
        };
        let text = render(&outcome);
        let output_at = text.find(OUTPUT_BANNER).unwrap();
        let warnings_at = text.find(WARNINGS_BANNER).unwrap();
        assert!(output_at < warnings_at);
        assert!(text.contains("careful\n"));
    }

    #[test]
    fn test_stderr_only() {
        let outcome = Outcome::Success {
            stdout: String::new(),
            stderr: "careful\n".to_string(),
        };
        let text = render(&outcome);
        assert!(!text.contains(OUTPUT_BANNER));
        assert!(text.starts_with(WARNINGS_BANNER));
    }

    #[test]
    fn test_blocked_lists_each_violation_with_reason() {
        let outcome = Outcome::Blocked(vec![
            Violation {
                name: "input".to_string(),
                reason: "input() function requires user interaction".to_string(),
            },
            Violation {
                name: "tkinter".to_string(),
                reason: "tkinter can be used for user input dialogs".to_string(),
            },
        ]);
        let text = render(&outcome);
        assert!(text.starts_with(BLOCKED_BANNER));
        assert!(text.contains("• input: input() function requires user interaction"));
        assert!(text.contains("• tkinter: tkinter can be used for user input dialogs"));
        assert!(text.contains("💡 Suggestions:"));
    }

    #[test]
    fn test_runtime_error_is_verbatim() {
        let diagnostic = "Traceback (most recent call last):\n  File \"<snippet>\", line 1, in <module>\nZeroDivisionError: division by zero\n";
        let outcome = Outcome::RuntimeError {
            diagnostic: diagnostic.to_string(),
        };
        let text = render(&outcome);
        assert!(text.starts_with(ERROR_BANNER));
        assert!(text.contains(diagnostic));
    }

    #[test]
    fn test_timeout_message() {
        let outcome = Outcome::TimedOut {
            deadline: Duration::from_secs(5),
        };
        assert_eq!(render(&outcome), "⏰ Execution timed out after 5 seconds");

        let outcome = Outcome::TimedOut {
            deadline: Duration::from_millis(1500),
        };
        assert_eq!(render(&outcome), "⏰ Execution timed out after 1.5 seconds");
    }
}
