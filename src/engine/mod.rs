// src/engine/mod.rs

//! Exam session engine.
//!
//! The session controller is split in two, like any event-driven shell:
//! - [`core`] is a pure, synchronous state machine. It consumes
//!   [`RuntimeEvent`]s and returns a [`CoreStep`]: commands for the IO shell
//!   plus [`Notification`]s for whoever renders the exam.
//! - [`runtime`] is the async shell. It reads events from a channel, feeds the
//!   core, and carries out its commands (timer, persistence, execution,
//!   exports).
//!
//! Nothing in the core touches presentation, Tokio or the filesystem, so the
//! whole Setup → Active → Review lifecycle is unit testable.

use std::path::PathBuf;

use crate::exec::EngineStatus;
use crate::session::QuestionDraft;
use crate::types::TimeRemaining;

/// Which question an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionRef {
    /// The question currently on screen.
    Current,
    /// Zero-based index.
    At(usize),
}

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Start(Vec<QuestionDraft>),
    Navigate(isize),
    Goto(usize),
    Show,
    Edit { question: QuestionRef, text: String },
    ToggleFlag(QuestionRef),
    Check(QuestionRef),
    ResetAnswer(QuestionRef),
    /// Finish on the user's request. `confirmed` is the answer to the
    /// "finish exam?" prompt.
    Finish { confirmed: bool },
    Retake,
    Reset,
    Export,
    Quit,
}

/// Events flowing into the runtime from the front end, the timer and the
/// execution engine.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    User(UserAction),
    /// One second elapsed in the countdown of `attempt`.
    TimerTick { attempt: u64, remaining: u64 },
    /// The countdown of `attempt` reached zero.
    TimerExpired { attempt: u64 },
    /// A check spawned for `attempt` finished. `Err` carries the formatted
    /// error message.
    CheckCompleted {
        attempt: u64,
        index: usize,
        result: Result<String, String>,
    },
    EngineStatusChanged(EngineStatus),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Options shared by the core and the async shell.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Countdown length (or unlimited) applied to every new attempt.
    pub time_limit: TimeRemaining,
    /// Where `export` writes its files.
    pub export_dir: PathBuf,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::ExamCore;
pub use event_handlers::{CoreCommand, CoreStep, Notification};
pub use runtime::Runtime;
