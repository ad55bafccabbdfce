// src/engine/core.rs

//! Pure session controller.
//!
//! `ExamCore` owns the [`Session`] and is the single source of truth for exam
//! semantics. Every operation either returns the [`CoreStep`] describing what
//! must happen next or an error, in which case nothing changed.
//!
//! It has **no** channels, no Tokio types, and does not perform any IO.

use tracing::{debug, warn};

use crate::engine::event_handlers::{
    CoreCommand, CoreStep, Notification, begin_attempt, conclude_attempt, handle_check_completed,
    handle_timer_expiry, handle_timer_tick, show_current,
};
use crate::engine::{QuestionRef, RuntimeEvent, RuntimeOptions, UserAction};
use crate::errors::{ExamError, Result};
use crate::exec::EngineStatus;
use crate::session::{Phase, QuestionDraft, Session};

#[derive(Debug)]
pub struct ExamCore {
    session: Session,
    options: RuntimeOptions,
    /// Incremented by every start and retake; tags timer and check events.
    attempt: u64,
    engine: EngineStatus,
    /// Question whose check is in flight.
    pending_check: Option<usize>,
}

impl ExamCore {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            session: Session::setup(),
            options,
            attempt: 0,
            engine: EngineStatus::Loading,
            pending_check: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    pub fn engine_status(&self) -> &EngineStatus {
        &self.engine
    }

    pub fn pending_check(&self) -> Option<usize> {
        self.pending_check
    }

    /// Whether the Check affordance should be enabled right now.
    pub fn can_check(&self) -> bool {
        self.session.phase() == Phase::Active && self.engine.is_ready() && self.pending_check.is_none()
    }

    /// Handle a single runtime event.
    ///
    /// Refused user actions are logged and reported as
    /// [`Notification::Rejected`]; they never stop the loop.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::User(action) => {
                let label = action_label(&action);
                match self.apply(action) {
                    Ok(step) => step,
                    Err(err) => {
                        warn!(action = label, error = %err, "action refused");
                        CoreStep::rejected(err.to_string())
                    }
                }
            }
            RuntimeEvent::TimerTick { attempt, remaining } => {
                handle_timer_tick(&mut self.session, self.attempt, attempt, remaining)
            }
            RuntimeEvent::TimerExpired { attempt } => {
                let step = handle_timer_expiry(&mut self.session, self.attempt, attempt);
                if self.session.phase() == Phase::Review {
                    self.pending_check = None;
                }
                step
            }
            RuntimeEvent::CheckCompleted {
                attempt,
                index,
                result,
            } => handle_check_completed(
                &mut self.session,
                &mut self.pending_check,
                self.attempt,
                attempt,
                index,
                result,
            ),
            RuntimeEvent::EngineStatusChanged(status) => {
                debug!(%status, "engine status changed");
                self.engine = status.clone();
                CoreStep::idle().notify(Notification::EngineStatusChanged(status))
            }
            RuntimeEvent::ShutdownRequested => CoreStep::exit(),
        }
    }

    /// Dispatch a user action to the matching operation.
    pub fn apply(&mut self, action: UserAction) -> Result<CoreStep> {
        match action {
            UserAction::Start(drafts) => self.start(&drafts),
            UserAction::Navigate(delta) => self.navigate(delta),
            UserAction::Goto(index) => self.goto(index),
            UserAction::Show => self.show(),
            UserAction::Edit { question, text } => {
                let index = self.resolve(question)?;
                self.edit(index, text)
            }
            UserAction::ToggleFlag(question) => {
                let index = self.resolve(question)?;
                self.toggle_flag(index)
            }
            UserAction::Check(question) => {
                let index = self.resolve(question)?;
                self.check(index)
            }
            UserAction::ResetAnswer(question) => {
                let index = self.resolve(question)?;
                self.reset_answer(index)
            }
            UserAction::Finish { confirmed } => self.finish(false, || confirmed),
            UserAction::Retake => self.retake(),
            UserAction::Reset => Ok(self.reset()),
            UserAction::Export => self.export(),
            UserAction::Quit => Ok(CoreStep::exit()),
        }
    }

    /// Commit drafts and begin an attempt.
    pub fn start(&mut self, drafts: &[QuestionDraft]) -> Result<CoreStep> {
        self.session.require_phase(Phase::Setup, "start")?;
        let step = begin_attempt(
            &mut self.session,
            drafts,
            self.attempt + 1,
            self.options.time_limit,
        )?;
        self.attempt += 1;
        self.pending_check = None;
        Ok(step)
    }

    /// Move by `delta` questions. Moving past either end is a no-op.
    pub fn navigate(&mut self, delta: isize) -> Result<CoreStep> {
        let before = self.session.current_index();
        let after = self.session.navigate(delta)?;
        if before == after {
            return Ok(CoreStep::idle());
        }
        Ok(self.shown())
    }

    pub fn goto(&mut self, index: usize) -> Result<CoreStep> {
        let before = self.session.current_index();
        let after = self.session.goto(index)?;
        if before == after {
            return Ok(CoreStep::idle());
        }
        Ok(self.shown())
    }

    /// Re-display the current question, or the review in the review phase.
    pub fn show(&mut self) -> Result<CoreStep> {
        match self.session.phase() {
            Phase::Active => Ok(self.shown()),
            Phase::Review => Ok(CoreStep::idle().notify(Notification::ReviewReady {
                session: self.session.clone(),
            })),
            Phase::Setup => Err(ExamError::InvalidPhase {
                operation: "show",
                phase: Phase::Setup,
            }),
        }
    }

    /// Replace the answer of question `index` and mirror it.
    pub fn edit(&mut self, index: usize, text: String) -> Result<CoreStep> {
        let question = self.session.question_mut(index, "edit")?;
        question.answer = text.clone();
        Ok(CoreStep::idle()
            .command(CoreCommand::PersistAnswer {
                index,
                answer: text,
            })
            .notify(Notification::AnswerSaved { index }))
    }

    pub fn toggle_flag(&mut self, index: usize) -> Result<CoreStep> {
        let question = self.session.question_mut(index, "flag")?;
        question.flagged = !question.flagged;
        let flagged = question.flagged;
        debug!(index, flagged, "flag toggled");
        Ok(CoreStep::idle().notify(Notification::FlagToggled { index, flagged }))
    }

    /// Send the current answer of question `index` to the engine.
    ///
    /// Only one check runs at a time; a second request while one is pending
    /// is refused.
    pub fn check(&mut self, index: usize) -> Result<CoreStep> {
        self.session.require_phase(Phase::Active, "check")?;
        match &self.engine {
            EngineStatus::Ready => {}
            EngineStatus::Loading => return Err(ExamError::EngineNotReady),
            EngineStatus::Failed(reason) => return Err(ExamError::EngineInit(reason.clone())),
        }
        if let Some(pending) = self.pending_check {
            return Err(ExamError::CheckPending { index: pending });
        }

        let code = self.session.question(index)?.answer.clone();
        self.pending_check = Some(index);
        debug!(index, attempt = self.attempt, "check requested");

        Ok(CoreStep::idle()
            .command(CoreCommand::RunCheck {
                attempt: self.attempt,
                index,
                code,
            })
            .notify(Notification::CheckStarted { index }))
    }

    /// Put the starter code back and forget the output.
    pub fn reset_answer(&mut self, index: usize) -> Result<CoreStep> {
        let question = self.session.question_mut(index, "reset answer")?;
        question.answer = question.pre_code.clone();
        question.output.clear();
        let answer = question.answer.clone();
        Ok(CoreStep::idle()
            .command(CoreCommand::ForgetAnswer { index })
            .notify(Notification::AnswerReset { index, answer }))
    }

    /// Conclude the attempt.
    ///
    /// A forced finish (timer expiry) is unconditional; otherwise `confirm`
    /// decides, and a declined confirmation changes nothing.
    pub fn finish<C: FnOnce() -> bool>(&mut self, force: bool, confirm: C) -> Result<CoreStep> {
        self.session.require_phase(Phase::Active, "finish")?;
        if !force && !confirm() {
            debug!("finish declined");
            return Ok(CoreStep::idle());
        }
        let step = conclude_attempt(&mut self.session, force)?;
        self.pending_check = None;
        Ok(step)
    }

    /// Start a new attempt over the same questions.
    pub fn retake(&mut self) -> Result<CoreStep> {
        self.session.require_phase(Phase::Review, "retake")?;
        let drafts = self.session.drafts();
        let step = begin_attempt(
            &mut self.session,
            &drafts,
            self.attempt + 1,
            self.options.time_limit,
        )?;
        self.attempt += 1;
        self.pending_check = None;
        Ok(step)
    }

    /// Discard the session and return to setup. Valid from any phase.
    pub fn reset(&mut self) -> CoreStep {
        debug!(phase = %self.session.phase(), "session reset");
        self.session = Session::setup();
        self.pending_check = None;
        CoreStep::idle()
            .command(CoreCommand::CancelTimer)
            .command(CoreCommand::ClearAnswers)
            .notify(Notification::ReturnedToSetup)
    }

    pub fn export(&mut self) -> Result<CoreStep> {
        self.session.require_phase(Phase::Review, "export")?;
        Ok(CoreStep::idle().command(CoreCommand::WriteExports {
            session: self.session.clone(),
        }))
    }

    fn resolve(&self, question: QuestionRef) -> Result<usize> {
        match question {
            QuestionRef::Current => Ok(self.session.current_index()),
            QuestionRef::At(index) => Ok(index),
        }
    }

    fn shown(&self) -> CoreStep {
        match show_current(&self.session) {
            Some(n) => CoreStep::idle().notify(n),
            None => CoreStep::idle(),
        }
    }
}

fn action_label(action: &UserAction) -> &'static str {
    match action {
        UserAction::Start(_) => "start",
        UserAction::Navigate(_) => "navigate",
        UserAction::Goto(_) => "goto",
        UserAction::Show => "show",
        UserAction::Edit { .. } => "edit",
        UserAction::ToggleFlag(_) => "flag",
        UserAction::Check(_) => "check",
        UserAction::ResetAnswer(_) => "reset answer",
        UserAction::Finish { .. } => "finish",
        UserAction::Retake => "retake",
        UserAction::Reset => "reset",
        UserAction::Export => "export",
        UserAction::Quit => "quit",
    }
}
