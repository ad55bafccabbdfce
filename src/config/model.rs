// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{StorageMode, TimeRemaining};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [exam]
/// minutes = 45
///
/// [engine]
/// python = "python3"
///
/// [[question]]
/// text = "Return the sum of a list."
/// pre_code = "def total(xs):\n    pass\n"
/// ```
///
/// All sections except `[[question]]` are optional and have reasonable
/// defaults. This is the unchecked form; see [`ExamConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExamConfig {
    #[serde(default)]
    pub exam: ExamSection,

    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub export: ExportSection,

    /// Every `[[question]]` table, in file order.
    #[serde(default)]
    pub question: Vec<QuestionConfig>,
}

/// `[exam]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExamSection {
    /// Countdown length in minutes. Ignored when `unlimited` is set.
    #[serde(default = "default_minutes")]
    pub minutes: u64,

    #[serde(default)]
    pub unlimited: bool,
}

fn default_minutes() -> u64 {
    60
}

impl Default for ExamSection {
    fn default() -> Self {
        Self {
            minutes: default_minutes(),
            unlimited: false,
        }
    }
}

/// `[engine]` section: how to start the Python worker.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Interpreter executable, looked up on `PATH` when not absolute.
    #[serde(default = "default_python")]
    pub python: String,

    /// What `input()` returns inside the sandbox.
    #[serde(default = "default_input_sentinel")]
    pub input_sentinel: String,

    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_input_sentinel() -> String {
    "Input is disabled in exam mode".to_string()
}

fn default_startup_timeout_secs() -> u64 {
    30
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            python: default_python(),
            input_sentinel: default_input_sentinel(),
            startup_timeout_secs: default_startup_timeout_secs(),
        }
    }
}

/// `[storage]` section: where answers are mirrored during an attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub mode: StorageMode,

    /// Directory for the `file` mode, relative to the config file.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".examsim")
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            mode: StorageMode::default(),
            dir: default_storage_dir(),
        }
    }
}

/// `[export]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSection {
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

/// One `[[question]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionConfig {
    pub text: String,

    #[serde(default)]
    pub pre_code: String,

    /// When false, `pre_code` is kept in the file but not given to the
    /// candidate.
    #[serde(default = "default_use_pre_code")]
    pub use_pre_code: bool,

    /// Image files (relative to the config file) or ready-made `data:` URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

fn default_use_pre_code() -> bool {
    true
}

/// A configuration that passed validation.
///
/// Only built through `TryFrom<RawExamConfig>`, so holding one means the
/// question list is non-empty and the timing values make sense.
#[derive(Debug, Clone)]
pub struct ExamConfig {
    pub exam: ExamSection,
    pub engine: EngineSection,
    pub storage: StorageSection,
    pub export: ExportSection,
    pub question: Vec<QuestionConfig>,
}

impl ExamConfig {
    pub(crate) fn new_unchecked(raw: RawExamConfig) -> Self {
        Self {
            exam: raw.exam,
            engine: raw.engine,
            storage: raw.storage,
            export: raw.export,
            question: raw.question,
        }
    }

    pub(crate) fn into_raw(self) -> RawExamConfig {
        RawExamConfig {
            exam: self.exam,
            engine: self.engine,
            storage: self.storage,
            export: self.export,
            question: self.question,
        }
    }

    /// Budget for each new attempt.
    pub fn time_limit(&self) -> TimeRemaining {
        if self.exam.unlimited {
            TimeRemaining::Unlimited
        } else {
            TimeRemaining::from_minutes(self.exam.minutes)
        }
    }
}

/// Values from the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub minutes: Option<u64>,
    pub unlimited: bool,
    pub export_dir: Option<PathBuf>,
}
