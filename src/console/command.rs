// src/console/command.rs

//! Parsing of console input lines.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::{QuestionRef, UserAction};
use crate::session::QuestionDraft;

pub const HELP: &str = "\
Commands:
  next | n            next question
  prev | p            previous question
  goto N              jump to question N
  show                show the current question again
  edit                type a new answer, end with a line containing only '.'
  load PATH           replace the answer with the contents of a file
  check [N]           run the answer through Python
  flag [N]            flag or unflag a question
  reset-answer [N]    restore the starter code
  finish              submit the exam
  retake              new attempt over the same questions (after finishing)
  export              write exam_answers.json and exam_submission.py
  restart             discard everything and start again
  quit                leave examsim";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Next,
    Prev,
    /// Zero-based target.
    Goto(usize),
    Show,
    Edit,
    Load(PathBuf),
    Check(QuestionRef),
    Flag(QuestionRef),
    ResetAnswer(QuestionRef),
    Finish,
    Retake,
    Export,
    Restart,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list.")]
    Unknown(String),

    #[error("'{command}' needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("'{0}' is not a question number")]
    BadNumber(String),
}

/// Parse one input line. Blank lines give `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "next" | "n" => ConsoleCommand::Next,
        "prev" | "p" => ConsoleCommand::Prev,
        "goto" | "g" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "goto",
                    what: "a question number",
                });
            }
            ConsoleCommand::Goto(question_number(rest)?)
        }
        "show" | "s" => ConsoleCommand::Show,
        "edit" | "e" => ConsoleCommand::Edit,
        "load" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "load",
                    what: "a file path",
                });
            }
            ConsoleCommand::Load(PathBuf::from(rest))
        }
        "check" | "c" | "run" => ConsoleCommand::Check(question_ref(rest)?),
        "flag" | "f" => ConsoleCommand::Flag(question_ref(rest)?),
        "reset-answer" => ConsoleCommand::ResetAnswer(question_ref(rest)?),
        "finish" => ConsoleCommand::Finish,
        "retake" => ConsoleCommand::Retake,
        "export" => ConsoleCommand::Export,
        "restart" => ConsoleCommand::Restart,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "q" | "exit" => ConsoleCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

fn question_ref(arg: &str) -> Result<QuestionRef, CommandError> {
    if arg.is_empty() {
        Ok(QuestionRef::Current)
    } else {
        question_number(arg).map(QuestionRef::At)
    }
}

/// One-based on the console, zero-based everywhere else.
fn question_number(arg: &str) -> Result<usize, CommandError> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandError::BadNumber(arg.to_string())),
    }
}

impl ConsoleCommand {
    /// Prompt to show before the command takes effect, if it needs one.
    pub fn confirmation(&self) -> Option<&'static str> {
        match self {
            ConsoleCommand::Finish => Some("Finish the exam? Answers cannot be changed afterwards."),
            ConsoleCommand::Retake => Some("Start a new attempt over the same questions?"),
            ConsoleCommand::Restart => Some("Discard this session and start over?"),
            _ => None,
        }
    }

    /// Controller actions for commands that need no further input.
    ///
    /// `Edit`, `Load` and `Help` are handled by the input loop and map to
    /// nothing here. `drafts` are the configured questions, used by
    /// `restart`.
    pub fn into_actions(self, confirmed: bool, drafts: &[QuestionDraft]) -> Vec<UserAction> {
        match self {
            ConsoleCommand::Next => vec![UserAction::Navigate(1)],
            ConsoleCommand::Prev => vec![UserAction::Navigate(-1)],
            ConsoleCommand::Goto(i) => vec![UserAction::Goto(i)],
            ConsoleCommand::Show => vec![UserAction::Show],
            ConsoleCommand::Check(q) => vec![UserAction::Check(q)],
            ConsoleCommand::Flag(q) => vec![UserAction::ToggleFlag(q)],
            ConsoleCommand::ResetAnswer(q) => vec![UserAction::ResetAnswer(q)],
            ConsoleCommand::Finish => vec![UserAction::Finish { confirmed }],
            ConsoleCommand::Retake if confirmed => vec![UserAction::Retake],
            ConsoleCommand::Restart if confirmed => {
                vec![UserAction::Reset, UserAction::Start(drafts.to_vec())]
            }
            ConsoleCommand::Export => vec![UserAction::Export],
            ConsoleCommand::Quit => vec![UserAction::Quit],
            ConsoleCommand::Retake
            | ConsoleCommand::Restart
            | ConsoleCommand::Edit
            | ConsoleCommand::Load(_)
            | ConsoleCommand::Help => Vec::new(),
        }
    }
}

/// Whether a reply to a confirmation prompt means yes.
pub fn is_yes(reply: &str) -> bool {
    matches!(reply.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_one_based() {
        assert_eq!(parse_command("goto 3"), Ok(Some(ConsoleCommand::Goto(2))));
        assert_eq!(
            parse_command("  check 1 "),
            Ok(Some(ConsoleCommand::Check(QuestionRef::At(0))))
        );
        assert_eq!(
            parse_command("goto 0"),
            Err(CommandError::BadNumber("0".to_string()))
        );
    }

    #[test]
    fn question_defaults_to_current() {
        assert_eq!(
            parse_command("FLAG"),
            Ok(Some(ConsoleCommand::Flag(QuestionRef::Current)))
        );
        assert_eq!(
            parse_command("reset-answer"),
            Ok(Some(ConsoleCommand::ResetAnswer(QuestionRef::Current)))
        );
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_command("   "), Ok(None));
        assert!(matches!(parse_command("dance"), Err(CommandError::Unknown(w)) if w == "dance"));
        assert!(matches!(
            parse_command("load"),
            Err(CommandError::MissingArgument { command: "load", .. })
        ));
    }

    #[test]
    fn load_keeps_spaces_in_path() {
        assert_eq!(
            parse_command("load my answers/q1.py"),
            Ok(Some(ConsoleCommand::Load(PathBuf::from("my answers/q1.py"))))
        );
    }

    #[test]
    fn declined_confirmations() {
        let drafts = vec![QuestionDraft::new("q")];
        assert_eq!(
            ConsoleCommand::Finish.into_actions(false, &drafts),
            vec![UserAction::Finish { confirmed: false }]
        );
        assert!(ConsoleCommand::Retake.into_actions(false, &drafts).is_empty());
        assert!(ConsoleCommand::Restart.into_actions(false, &drafts).is_empty());
    }

    #[test]
    fn restart_resets_then_starts_over() {
        let drafts = vec![QuestionDraft::new("q")];
        assert_eq!(
            ConsoleCommand::Restart.into_actions(true, &drafts),
            vec![UserAction::Reset, UserAction::Start(drafts.clone())]
        );
    }

    #[test]
    fn yes_replies() {
        assert!(is_yes("Y"));
        assert!(is_yes(" yes\n"));
        assert!(!is_yes(""));
        assert!(!is_yes("nope"));
    }
}
