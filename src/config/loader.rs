// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ExamConfig, RawExamConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawExamConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawExamConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawExamConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks there is at least one question and that the timing and engine
///   values are usable.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ExamConfig> {
    let raw_config = load_from_path(&path)?;
    let config = ExamConfig::try_from(raw_config)?;
    Ok(config)
}

/// Directory that relative paths in the config resolve against.
///
/// A bare filename like `exam.toml` has an empty parent; that means the
/// current working directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
