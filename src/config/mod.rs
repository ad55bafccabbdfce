// src/config/mod.rs

//! Configuration loading and validation for examsim.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants and apply CLI overrides (`validate.rs`).
//! - Turn `[[question]]` entries into setup drafts (`drafts.rs`).

pub mod drafts;
pub mod loader;
pub mod model;
pub mod validate;

pub use drafts::{build_drafts, image_data_url};
pub use loader::{config_root_dir, load_and_validate, load_from_path};
pub use model::{
    ConfigOverrides, EngineSection, ExamConfig, ExamSection, ExportSection, QuestionConfig,
    RawExamConfig, StorageSection,
};
