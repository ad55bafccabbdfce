// src/exec/backend.rs

//! Pluggable sandbox abstraction.
//!
//! The gateway talks to a `Sandbox` instead of a concrete interpreter. This
//! keeps the check protocol testable with a scripted fake while the
//! production worker lives in [`super::python`].

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use super::echo::EchoOutcome;

pub type SandboxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SandboxError {
    /// The submitted code raised. Carries the formatted error text.
    #[error("{0}")]
    Raised(String),

    /// The interpreter could not be reached (worker died, bad reply, ...).
    #[error("{0}")]
    Transport(String),
}

/// One shared interpreter namespace per session.
///
/// Every primitive operates on the same namespace, so state defined by one
/// `execute` is visible to later calls.
pub trait Sandbox: Send + 'static {
    /// Empty the captured-output buffer.
    fn clear_output(&mut self) -> SandboxFuture<'_, Result<(), SandboxError>>;

    /// Run a whole submission. Blocking input must already be disabled.
    fn execute<'a>(&'a mut self, code: &'a str) -> SandboxFuture<'a, Result<(), SandboxError>>;

    /// Everything printed since the last `clear_output`.
    fn read_output(&mut self) -> SandboxFuture<'_, Result<String, SandboxError>>;

    /// Evaluate one source line as an expression in the shared namespace.
    ///
    /// Returns [`EchoOutcome::NoTrailingExpression`] when the line is a
    /// statement rather than an expression. Output printed while evaluating
    /// must not reach the captured buffer.
    fn echo<'a>(&'a mut self, line: &'a str)
    -> SandboxFuture<'a, Result<EchoOutcome, SandboxError>>;
}
