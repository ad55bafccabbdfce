// src/engine/event_handlers.rs

//! Event handling logic for the core.
//!
//! Handlers mutate the session and describe the side effects they need as
//! [`CoreCommand`]s; what the user should see is reported as
//! [`Notification`]s.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::EngineStatus;
use crate::session::{Phase, Question, QuestionDraft, Session};
use crate::types::TimeRemaining;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start the clock for `attempt` (nothing to start when unlimited).
    StartTimer { attempt: u64, limit: TimeRemaining },
    /// Stop the running countdown, if any.
    CancelTimer,
    /// Mirror the full answer text of one question.
    PersistAnswer { index: usize, answer: String },
    /// Drop the mirror of one question.
    ForgetAnswer { index: usize },
    /// Drop every answer mirror.
    ClearAnswers,
    /// Run `code` through the execution gateway and report back with
    /// `RuntimeEvent::CheckCompleted`.
    RunCheck {
        attempt: u64,
        index: usize,
        code: String,
    },
    /// Write the snapshot and transcript of a concluded attempt.
    WriteExports { session: Session },
    /// Stop the runtime loop.
    RequestExit,
}

/// What renderers are told about state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    AttemptStarted { attempt: u64, session: Session },
    QuestionShown {
        index: usize,
        total: usize,
        question: Question,
        time_remaining: TimeRemaining,
    },
    TimerUpdated(TimeRemaining),
    AnswerSaved { index: usize },
    AnswerReset { index: usize, answer: String },
    FlagToggled { index: usize, flagged: bool },
    /// The engine is working on a check ("Running...").
    CheckStarted { index: usize },
    CheckFinished { index: usize, output: String },
    EngineStatusChanged(EngineStatus),
    /// The countdown reached zero and the attempt was closed.
    TimeUp,
    AttemptFinished { forced: bool },
    /// Read-only view of a concluded attempt.
    ReviewReady { session: Session },
    ReturnedToSetup,
    ExportsWritten { snapshot: PathBuf, transcript: PathBuf },
    /// An action was refused; nothing changed.
    Rejected { reason: String },
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Side effects the IO shell should carry out, in order.
    pub commands: Vec<CoreCommand>,
    /// Messages for the front end, in order.
    pub notifications: Vec<Notification>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn idle() -> Self {
        Self {
            commands: Vec::new(),
            notifications: Vec::new(),
            keep_running: true,
        }
    }

    pub fn exit() -> Self {
        Self {
            commands: vec![CoreCommand::CancelTimer, CoreCommand::RequestExit],
            notifications: Vec::new(),
            keep_running: false,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        let mut step = Self::idle();
        step.notifications.push(Notification::Rejected {
            reason: reason.into(),
        });
        step
    }

    pub fn command(mut self, command: CoreCommand) -> Self {
        self.commands.push(command);
        self
    }

    pub fn notify(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }
}

/// Notification showing the session's current question.
pub fn show_current(session: &Session) -> Option<Notification> {
    let question = session.current()?;
    Some(Notification::QuestionShown {
        index: session.current_index(),
        total: session.len(),
        question: question.clone(),
        time_remaining: session.time_remaining(),
    })
}

/// Build a fresh active session from `drafts` and describe its startup.
///
/// Persistence is cleared before the clock starts so that nothing from an
/// earlier attempt can be mistaken for this one's answers.
pub fn begin_attempt(
    session: &mut Session,
    drafts: &[QuestionDraft],
    attempt: u64,
    limit: TimeRemaining,
) -> Result<CoreStep> {
    let fresh = Session::begin(drafts, limit)?;
    *session = fresh;

    info!(attempt, questions = session.len(), %limit, "attempt started");

    let mut step = CoreStep::idle()
        .command(CoreCommand::ClearAnswers)
        .command(CoreCommand::StartTimer { attempt, limit })
        .notify(Notification::AttemptStarted {
            attempt,
            session: session.clone(),
        })
        .notify(Notification::TimerUpdated(limit));

    if let Some(shown) = show_current(session) {
        step = step.notify(shown);
    }
    Ok(step)
}

/// Close the active attempt: stop the clock, drop the answer mirror, move to
/// review.
pub fn conclude_attempt(session: &mut Session, forced: bool) -> Result<CoreStep> {
    session.conclude()?;

    info!(forced, "attempt finished");

    let mut step = CoreStep::idle()
        .command(CoreCommand::CancelTimer)
        .command(CoreCommand::ClearAnswers);

    if forced {
        step = step.notify(Notification::TimeUp);
    }

    Ok(step
        .notify(Notification::AttemptFinished { forced })
        .notify(Notification::ReviewReady {
            session: session.clone(),
        }))
}

/// Handle a countdown tick.
///
/// Ticks from an earlier attempt (queued before its timer was cancelled) are
/// ignored.
pub fn handle_timer_tick(
    session: &mut Session,
    current_attempt: u64,
    attempt: u64,
    remaining: u64,
) -> CoreStep {
    if attempt != current_attempt || session.phase() != Phase::Active {
        debug!(attempt, current_attempt, remaining, "stale timer tick ignored");
        return CoreStep::idle();
    }

    let remaining = TimeRemaining::Seconds(remaining);
    match session.set_time_remaining(remaining) {
        Ok(()) => CoreStep::idle().notify(Notification::TimerUpdated(remaining)),
        Err(_) => CoreStep::idle(),
    }
}

/// Handle countdown expiry: forced finish, at most once per attempt.
pub fn handle_timer_expiry(session: &mut Session, current_attempt: u64, attempt: u64) -> CoreStep {
    if attempt != current_attempt || session.phase() != Phase::Active {
        debug!(attempt, current_attempt, phase = %session.phase(), "stale timer expiry ignored");
        return CoreStep::idle();
    }

    match conclude_attempt(session, true) {
        Ok(step) => step,
        Err(err) => CoreStep::rejected(err.to_string()),
    }
}

/// Handle the result of a check.
///
/// Errors are stored as the question's output; results that arrive after
/// the attempt was concluded are dropped.
pub fn handle_check_completed(
    session: &mut Session,
    pending_check: &mut Option<usize>,
    current_attempt: u64,
    attempt: u64,
    index: usize,
    result: std::result::Result<String, String>,
) -> CoreStep {
    if attempt != current_attempt {
        debug!(attempt, current_attempt, index, "check result from an earlier attempt dropped");
        return CoreStep::idle();
    }

    if *pending_check == Some(index) {
        *pending_check = None;
    }

    let output = match result {
        Ok(output) => output,
        Err(message) => format!("Error: {message}"),
    };

    match session.question_mut(index, "check") {
        Ok(question) => {
            question.output = output.clone();
            debug!(index, bytes = output.len(), "check output stored");
            CoreStep::idle().notify(Notification::CheckFinished { index, output })
        }
        Err(err) => {
            debug!(index, error = %err, "check result arrived after the attempt closed");
            CoreStep::idle()
        }
    }
}
