// src/exec/echo.rs

//! REPL-style echo of a submission's last expression.
//!
//! After a submission runs, its last non-blank line is evaluated again as an
//! expression so learners see the value an interactive shell would print.
//! This step is best effort: whatever happens here never replaces the
//! captured stdout.

/// Result of the secondary evaluation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EchoOutcome {
    /// The submission does not end in a bare top-level line, or that line is
    /// a statement (assignment, `def`, ...).
    NoTrailingExpression,
    /// The expression evaluated. `None` means the value has no
    /// representation (Python `None`).
    Evaluated(Option<String>),
    /// Evaluation failed; the reason is kept for logging only.
    Failed(String),
}

impl EchoOutcome {
    /// Text to append to the output, if any.
    pub fn rendered(&self) -> Option<&str> {
        match self {
            EchoOutcome::Evaluated(Some(value)) if !value.is_empty() => Some(value),
            _ => None,
        }
    }
}

/// Last non-blank line of `code`, if it can be echoed.
///
/// Indented lines continue a block (a loop body, a function) and comment lines
/// have no value; neither is echoed.
pub fn trailing_expression(code: &str) -> Option<&str> {
    let line = code.lines().rev().find(|l| !l.trim().is_empty())?;

    if line.starts_with(char::is_whitespace) {
        return None;
    }
    if line.trim_start().starts_with('#') {
        return None;
    }
    Some(line.trim_end())
}

/// Join captured stdout with the echoed value and trim the result.
pub fn combine_output(stdout: &str, echo: &EchoOutcome) -> String {
    match echo.rendered() {
        Some(value) => format!("{}\n{value}", stdout.trim_end()).trim().to_string(),
        None => stdout.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_last_non_blank_line() {
        assert_eq!(trailing_expression("x = 1\nx + 1\n\n   \n"), Some("x + 1"));
        assert_eq!(trailing_expression("print('a'); 2+2"), Some("print('a'); 2+2"));
        assert_eq!(trailing_expression("value\r\n"), Some("value"));
    }

    #[test]
    fn skips_block_bodies_and_comments() {
        assert_eq!(trailing_expression("for i in range(3):\n    print(i)\n"), None);
        assert_eq!(trailing_expression("x = 2\n# done\n"), None);
        assert_eq!(trailing_expression("x = 2\n   # indented comment"), None);
        assert_eq!(trailing_expression("x\n\tpass"), None);
    }

    #[test]
    fn empty_code_has_no_trailing_expression() {
        assert_eq!(trailing_expression(""), None);
        assert_eq!(trailing_expression("\n\n  \n"), None);
    }

    #[test]
    fn combine_appends_value_on_new_line() {
        let echo = EchoOutcome::Evaluated(Some("4".to_string()));
        assert_eq!(combine_output("a\n", &echo), "a\n4");
        assert_eq!(combine_output("", &echo), "4");
    }

    #[test]
    fn combine_ignores_missing_and_failed_values() {
        for echo in [
            EchoOutcome::NoTrailingExpression,
            EchoOutcome::Evaluated(None),
            EchoOutcome::Evaluated(Some(String::new())),
            EchoOutcome::Failed("NameError: name 'y' is not defined".to_string()),
        ] {
            assert_eq!(combine_output("  x\n", &echo), "x");
        }
    }
}
