// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{ExamError, Result};
use crate::exec::{EngineStatus, ExecutionGateway, Sandbox};
use crate::persist::AnswerPersistence;
use crate::review;
use crate::timer::{self, TimerHandle};

use super::core::ExamCore;
use super::{CoreCommand, Notification, RuntimeEvent};

/// Drives the session controller in response to `RuntimeEvent`s.
///
/// This is a pure IO shell around `ExamCore`, which holds all the exam
/// semantics. It owns the side-effecting collaborators: the countdown task,
/// the answer mirror, the execution gateway and the notification channel.
pub struct Runtime<S: Sandbox> {
    core: ExamCore,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    /// Handed to the timer and to check tasks so they can report back.
    event_tx: mpsc::Sender<RuntimeEvent>,
    gateway: ExecutionGateway<S>,
    answers: AnswerPersistence,
    notify_tx: mpsc::Sender<Notification>,
    timer: Option<TimerHandle>,
}

impl<S: Sandbox> fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

impl<S: Sandbox> Runtime<S> {
    pub fn new(
        core: ExamCore,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        event_tx: mpsc::Sender<RuntimeEvent>,
        gateway: ExecutionGateway<S>,
        answers: AnswerPersistence,
        notify_tx: mpsc::Sender<Notification>,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            gateway,
            answers,
            notify_tx,
            timer: None,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`, one at a time.
    /// - Feeds them into the core.
    /// - Executes the commands it returns, then forwards its notifications.
    ///
    /// Returns the core so callers can inspect the final session.
    pub async fn run(mut self) -> Result<ExamCore> {
        info!("exam runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await;
            }

            for notification in step.notifications {
                self.publish(notification).await;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        self.cancel_timer();
        info!("runtime exiting");
        Ok(self.core)
    }

    /// Execute a single command from the core.
    ///
    /// Storage and export failures are reported but never end the session.
    async fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::StartTimer { attempt, limit } => {
                self.cancel_timer();
                self.timer = timer::start(attempt, limit, self.event_tx.clone());
            }
            CoreCommand::CancelTimer => self.cancel_timer(),
            CoreCommand::PersistAnswer { index, answer } => {
                if let Err(e) = self.answers.save(index, &answer) {
                    warn!(index, error = %e, "failed to mirror answer");
                }
            }
            CoreCommand::ForgetAnswer { index } => {
                if let Err(e) = self.answers.remove(index) {
                    warn!(index, error = %e, "failed to remove answer mirror");
                }
            }
            CoreCommand::ClearAnswers => {
                if let Err(e) = self.answers.clear() {
                    warn!(error = %e, "failed to clear answer storage");
                }
            }
            CoreCommand::RunCheck {
                attempt,
                index,
                code,
            } => self.spawn_check(attempt, index, code),
            CoreCommand::WriteExports { session } => {
                let dir = self.core_export_dir();
                match review::write_exports(&dir, &session) {
                    Ok(paths) => {
                        self.publish(Notification::ExportsWritten {
                            snapshot: paths.snapshot,
                            transcript: paths.transcript,
                        })
                        .await
                    }
                    Err(e) => {
                        warn!(error = %e, dir = ?dir, "export failed");
                        self.publish(Notification::Rejected {
                            reason: format!("Export failed: {e}"),
                        })
                        .await
                    }
                }
            }
            CoreCommand::RequestExit => {
                info!("core issued RequestExit command");
            }
        }
    }

    /// Run a check off the loop; its result comes back as an event.
    ///
    /// A lost worker is reported as `EngineStatusChanged` ahead of the result.
    fn spawn_check(&self, attempt: u64, index: usize, code: String) {
        let gateway = self.gateway.clone();
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let result = gateway.run(&code).await;
            if let Err(ExamError::Sandbox(reason)) = &result {
                let lost = RuntimeEvent::EngineStatusChanged(EngineStatus::Failed(reason.clone()));
                if tx.send(lost).await.is_err() {
                    debug!(attempt, index, "runtime gone before engine loss was reported");
                }
            }
            let result = result.map_err(|e| e.to_string());
            debug!(attempt, index, ok = result.is_ok(), "check finished");
            if tx
                .send(RuntimeEvent::CheckCompleted {
                    attempt,
                    index,
                    result,
                })
                .await
                .is_err()
            {
                debug!(attempt, index, "runtime gone before check result arrived");
            }
        });
    }

    fn cancel_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn core_export_dir(&self) -> std::path::PathBuf {
        self.core.options().export_dir.clone()
    }

    async fn publish(&self, notification: Notification) {
        if self.notify_tx.send(notification).await.is_err() {
            debug!("no front end listening; notification dropped");
        }
    }
}
