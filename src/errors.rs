// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::session::Phase;

#[derive(Error, Debug)]
pub enum ExamError {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    /// Check was requested before the sandbox finished loading.
    #[error("Python engine is still loading...")]
    EngineNotReady,

    /// User code raised while running. The message is the formatted traceback.
    #[error("{0}")]
    Execution(String),

    /// The sandbox never came up; only checking is affected.
    #[error("Python engine failed to load: {0}")]
    EngineInit(String),

    /// The sandbox was running but the worker stopped answering.
    #[error("Execution engine failure: {0}")]
    Sandbox(String),

    #[error("'{operation}' is not available during the {phase} phase")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },

    /// Another check is still running; the sandbox runs one at a time.
    #[error("A check is already running for question {}", .index + 1)]
    CheckPending { index: usize },

    #[error("Question {index} does not exist (the exam has {len} questions)")]
    NoSuchQuestion { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Problems with the question set handed to `start`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("Add at least one question.")]
    NoQuestions,
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ExamError>;
