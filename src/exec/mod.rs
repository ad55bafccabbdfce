// src/exec/mod.rs

//! Code execution layer.
//!
//! - [`backend`] defines the [`Sandbox`] trait: the four primitives the
//!   session engine needs from an interpreter (clear captured output, execute,
//!   read captured output, evaluate a trailing expression).
//! - [`echo`] finds the trailing expression of a submission and combines its
//!   value with the captured stdout.
//! - [`gateway`] runs the full check protocol against a sandbox and tracks
//!   engine readiness.
//! - [`python`] is the production sandbox: a persistent `python3` worker.

pub mod backend;
pub mod echo;
pub mod gateway;
pub mod python;

use std::fmt;

pub use backend::{Sandbox, SandboxError, SandboxFuture};
pub use echo::{EchoOutcome, trailing_expression};
pub use gateway::{ExecutionGateway, RunReport};
pub use python::PythonSandbox;

/// Readiness of the execution engine. Gates the Check capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Loading,
    Ready,
    Failed(String),
}

impl EngineStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, EngineStatus::Ready)
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStatus::Loading => f.write_str("Python engine loading..."),
            EngineStatus::Ready => f.write_str("Python engine ready"),
            EngineStatus::Failed(reason) => write!(f, "Python engine unavailable: {reason}"),
        }
    }
}
