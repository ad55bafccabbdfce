// src/review/render.rs

use std::fmt;

use crate::errors::Result;
use crate::session::{Phase, Session};

/// Shown instead of an output for questions that were never checked.
pub const NOT_EXECUTED: &str = "Not executed.";

/// Read-only view of one answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    /// One-based question number.
    pub number: usize,
    pub flagged: bool,
    pub text: String,
    pub image_count: usize,
    pub answer: String,
    /// `None` when the question was never run.
    pub output: Option<String>,
}

impl ReviewEntry {
    pub fn output_or_marker(&self) -> &str {
        self.output.as_deref().unwrap_or(NOT_EXECUTED)
    }
}

impl fmt::Display for ReviewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Question {}", self.number)?;
        if self.flagged {
            write!(f, " (Flagged)")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.text)?;
        if self.image_count > 0 {
            writeln!(f, "[{} image(s) attached]", self.image_count)?;
        }
        writeln!(f, "Your Answer:")?;
        writeln!(f, "{}", self.answer.trim_end())?;
        writeln!(f, "Output:")?;
        write!(f, "{}", self.output_or_marker())
    }
}

/// Per-question review of a concluded session.
pub fn review_entries(session: &Session) -> Result<Vec<ReviewEntry>> {
    session.require_phase(Phase::Review, "review")?;

    Ok(session
        .questions()
        .iter()
        .enumerate()
        .map(|(i, q)| ReviewEntry {
            number: i + 1,
            flagged: q.flagged,
            text: q.text.clone(),
            image_count: q.images.len(),
            answer: q.answer.clone(),
            output: q.was_executed().then(|| q.output.clone()),
        })
        .collect())
}
