// src/persist/mod.rs

//! Answer persistence.
//!
//! While an attempt is active every answer is mirrored into a key-value store
//! so that a crash or restart loses nothing. The in-memory session stays the
//! system of record; the mirror is only read back for recovery.
//!
//! - [`store`] defines the [`KeyValueStore`] trait and the in-memory store.
//! - [`file`] is the on-disk store (one JSON object file).
//! - [`answers`] owns the key naming convention and the scoped clear.

pub mod answers;
pub mod file;
pub mod store;

pub use answers::{AnswerPersistence, answer_key, is_answer_key};
pub use file::FileStore;
pub use store::{KeyValueStore, MemoryStore};
