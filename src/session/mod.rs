// src/session/mod.rs

//! Exam data model.
//!
//! - [`question`] holds the per-question record and the setup-time draft it
//!   is committed from.
//! - [`state`] holds the [`Session`] itself: the ordered questions, the
//!   current position, the clock and the phase.

pub mod question;
pub mod state;

pub use question::{Question, QuestionDraft};
pub use state::{Phase, Session};
