// src/exec/gateway.rs

//! The check protocol.
//!
//! `ExecutionGateway::run` performs, in order:
//! 1. clear the sandbox's captured output,
//! 2. execute the whole submission in the shared namespace,
//! 3. read back the captured stdout,
//! 4. best-effort echo of the trailing expression (failures swallowed),
//! 5. join stdout and echo value, trimmed.
//!
//! The sandbox sits behind an async mutex, so overlapping runs are serialized
//! rather than interleaved inside the shared namespace. A transport failure
//! (the worker is gone) moves the engine to `Failed`; later runs are refused
//! instead of hitting a dead pipe.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::errors::{ExamError, Result};

use super::backend::{Sandbox, SandboxError};
use super::echo::{EchoOutcome, combine_output, trailing_expression};
use super::EngineStatus;

enum EngineSlot<S> {
    Loading,
    Ready(S),
    Failed(String),
}

/// Detailed result of one run, before the two parts are joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub stdout: String,
    pub echo: EchoOutcome,
}

impl RunReport {
    pub fn output(&self) -> String {
        combine_output(&self.stdout, &self.echo)
    }
}

/// Shared handle to the execution engine. Cheap to clone.
pub struct ExecutionGateway<S> {
    slot: Arc<Mutex<EngineSlot<S>>>,
}

impl<S> Clone for ExecutionGateway<S> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<S: Sandbox> Default for ExecutionGateway<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sandbox> ExecutionGateway<S> {
    /// Gateway whose engine is still loading.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(EngineSlot::Loading)),
        }
    }

    /// Gateway with an already initialised sandbox.
    pub fn ready(sandbox: S) -> Self {
        Self {
            slot: Arc::new(Mutex::new(EngineSlot::Ready(sandbox))),
        }
    }

    /// Hand over a sandbox that finished initialising.
    pub async fn install(&self, sandbox: S) {
        *self.slot.lock().await = EngineSlot::Ready(sandbox);
        info!("execution engine ready");
    }

    /// Record that the sandbox could not be started.
    pub async fn mark_failed(&self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(%reason, "execution engine failed to initialise");
        *self.slot.lock().await = EngineSlot::Failed(reason);
    }

    pub async fn status(&self) -> EngineStatus {
        match &*self.slot.lock().await {
            EngineSlot::Loading => EngineStatus::Loading,
            EngineSlot::Ready(_) => EngineStatus::Ready,
            EngineSlot::Failed(reason) => EngineStatus::Failed(reason.clone()),
        }
    }

    /// Run a submission and return the combined output.
    pub async fn run(&self, code: &str) -> Result<String> {
        self.run_detailed(code).await.map(|report| report.output())
    }

    /// Run a submission and keep stdout and the echo outcome apart.
    pub async fn run_detailed(&self, code: &str) -> Result<RunReport> {
        let mut slot = self.slot.lock().await;
        let sandbox = match &mut *slot {
            EngineSlot::Ready(sandbox) => sandbox,
            EngineSlot::Loading => return Err(ExamError::EngineNotReady),
            EngineSlot::Failed(reason) => return Err(ExamError::EngineInit(reason.clone())),
        };

        debug!(bytes = code.len(), "running submission");

        let outcome = run_protocol(sandbox, code).await;
        if let Err(SandboxError::Transport(reason)) = &outcome {
            warn!(%reason, "execution engine lost; check disabled");
            *slot = EngineSlot::Failed(reason.clone());
        }
        outcome.map_err(into_exam_error)
    }
}

async fn run_protocol<S: Sandbox>(
    sandbox: &mut S,
    code: &str,
) -> std::result::Result<RunReport, SandboxError> {
    sandbox.clear_output().await?;
    sandbox.execute(code).await?;
    let stdout = sandbox.read_output().await?;

    let echo = match trailing_expression(code) {
        None => EchoOutcome::NoTrailingExpression,
        Some(line) => match sandbox.echo(line).await {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(line, error = %err, "trailing expression not echoed");
                EchoOutcome::Failed(err.to_string())
            }
        },
    };

    Ok(RunReport { stdout, echo })
}

fn into_exam_error(err: SandboxError) -> ExamError {
    match err {
        SandboxError::Raised(msg) => ExamError::Execution(msg),
        SandboxError::Transport(msg) => ExamError::Sandbox(msg),
    }
}
