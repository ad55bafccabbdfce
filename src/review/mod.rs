// src/review/mod.rs

//! Review and export of a concluded attempt.
//!
//! - [`render`] builds the read-only per-question view.
//! - [`export`] produces the JSON snapshot and the Python transcript and
//!   writes them to disk.

pub mod export;
pub mod render;

pub use export::{
    ExportPaths, SNAPSHOT_FILE, TRANSCRIPT_FILE, import_snapshot, snapshot_json, transcript,
    write_exports,
};
pub use render::{NOT_EXECUTED, ReviewEntry, review_entries};
