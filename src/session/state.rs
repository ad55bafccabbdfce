// src/session/state.rs

//! The owned exam session.
//!
//! All mutation goes through methods that check the phase first, so a
//! concluded attempt can never be edited by a late event.

use std::fmt;

use tracing::debug;

use crate::errors::{ExamError, Result, SetupError};
use crate::session::question::{Question, QuestionDraft};
use crate::types::TimeRemaining;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Active,
    Review,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::Active => "active",
            Phase::Review => "review",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    questions: Vec<Question>,
    current_index: usize,
    time_remaining: TimeRemaining,
    phase: Phase,
}

impl Default for Session {
    fn default() -> Self {
        Self::setup()
    }
}

impl Session {
    /// Empty session waiting for questions.
    pub fn setup() -> Self {
        Self {
            questions: Vec::new(),
            current_index: 0,
            time_remaining: TimeRemaining::Unlimited,
            phase: Phase::Setup,
        }
    }

    /// Commit drafts and enter the active phase.
    pub fn begin(drafts: &[QuestionDraft], time_remaining: TimeRemaining) -> Result<Self> {
        if drafts.is_empty() {
            return Err(SetupError::NoQuestions.into());
        }

        let questions: Vec<Question> = drafts.iter().map(QuestionDraft::commit).collect();
        debug!(count = questions.len(), %time_remaining, "committed question drafts");

        Ok(Self {
            questions,
            current_index: 0,
            time_remaining,
            phase: Phase::Active,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn time_remaining(&self) -> TimeRemaining {
        self.time_remaining
    }

    pub fn question(&self, index: usize) -> Result<&Question> {
        self.questions.get(index).ok_or(ExamError::NoSuchQuestion {
            index,
            len: self.questions.len(),
        })
    }

    pub fn current(&self) -> Option<&Question> {
        match self.phase {
            Phase::Active => self.questions.get(self.current_index),
            _ => None,
        }
    }

    /// Fail with `InvalidPhase` unless the session is in `expected`.
    pub fn require_phase(&self, expected: Phase, operation: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ExamError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    /// Mutable access to a question while the attempt is running.
    pub fn question_mut(&mut self, index: usize, operation: &'static str) -> Result<&mut Question> {
        self.require_phase(Phase::Active, operation)?;
        let len = self.questions.len();
        self.questions
            .get_mut(index)
            .ok_or(ExamError::NoSuchQuestion { index, len })
    }

    /// Move by `delta`, clamped to the question range. Returns the new index.
    pub fn navigate(&mut self, delta: isize) -> Result<usize> {
        self.require_phase(Phase::Active, "navigate")?;
        let last = self.questions.len().saturating_sub(1) as isize;
        let target = (self.current_index as isize).saturating_add(delta).clamp(0, last);
        self.current_index = target as usize;
        Ok(self.current_index)
    }

    /// Jump to `index`. Out of range leaves the position unchanged.
    pub fn goto(&mut self, index: usize) -> Result<usize> {
        self.require_phase(Phase::Active, "goto")?;
        if index < self.questions.len() {
            self.current_index = index;
        }
        Ok(self.current_index)
    }

    pub fn set_time_remaining(&mut self, remaining: TimeRemaining) -> Result<()> {
        self.require_phase(Phase::Active, "tick")?;
        self.time_remaining = remaining;
        Ok(())
    }

    /// Leave the active phase for good.
    pub fn conclude(&mut self) -> Result<()> {
        self.require_phase(Phase::Active, "finish")?;
        self.phase = Phase::Review;
        Ok(())
    }

    /// Drafts equivalent to this session's questions, for a retake.
    pub fn drafts(&self) -> Vec<QuestionDraft> {
        self.questions.iter().map(QuestionDraft::from).collect()
    }
}
