// src/config/validate.rs

use tracing::debug;

use crate::config::model::{ConfigOverrides, ExamConfig, RawExamConfig};
use crate::errors::{ExamError, Result};

impl TryFrom<RawExamConfig> for ExamConfig {
    type Error = ExamError;

    fn try_from(raw: RawExamConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ExamConfig::new_unchecked(raw))
    }
}

impl ExamConfig {
    /// Apply command-line overrides and validate the result again.
    pub fn with_overrides(self, overrides: &ConfigOverrides) -> Result<Self> {
        let mut raw = self.into_raw();

        if let Some(minutes) = overrides.minutes {
            debug!(minutes, "minutes overridden on the command line");
            raw.exam.minutes = minutes;
            raw.exam.unlimited = false;
        }
        if overrides.unlimited {
            raw.exam.unlimited = true;
        }
        if let Some(dir) = &overrides.export_dir {
            raw.export.dir = dir.clone();
        }

        ExamConfig::try_from(raw)
    }
}

fn validate_raw_config(cfg: &RawExamConfig) -> Result<()> {
    ensure_has_questions(cfg)?;
    validate_exam_section(cfg)?;
    validate_engine_section(cfg)?;
    Ok(())
}

fn ensure_has_questions(cfg: &RawExamConfig) -> Result<()> {
    if cfg.question.is_empty() {
        return Err(ExamError::ConfigError(
            "config must contain at least one [[question]] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_exam_section(cfg: &RawExamConfig) -> Result<()> {
    if !cfg.exam.unlimited && cfg.exam.minutes == 0 {
        return Err(ExamError::ConfigError(
            "[exam].minutes must be >= 1 unless [exam].unlimited is set (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_engine_section(cfg: &RawExamConfig) -> Result<()> {
    if cfg.engine.python.trim().is_empty() {
        return Err(ExamError::ConfigError(
            "[engine].python must name an interpreter".to_string(),
        ));
    }
    if cfg.engine.startup_timeout_secs == 0 {
        return Err(ExamError::ConfigError(
            "[engine].startup_timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeRemaining;

    fn parse(toml_src: &str) -> RawExamConfig {
        toml::from_str(toml_src).unwrap()
    }

    const ONE_QUESTION: &str = r#"
[[question]]
text = "Say hi"
"#;

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg = ExamConfig::try_from(parse(ONE_QUESTION)).unwrap();
        assert_eq!(cfg.time_limit(), TimeRemaining::Seconds(3600));
        assert_eq!(cfg.engine.python, "python3");
        assert_eq!(cfg.engine.input_sentinel, "Input is disabled in exam mode");
        assert!(cfg.question[0].use_pre_code);
    }

    #[test]
    fn zero_minutes_only_allowed_when_unlimited() {
        let err = ExamConfig::try_from(parse(&format!("[exam]\nminutes = 0\n{ONE_QUESTION}")))
            .unwrap_err();
        assert!(matches!(err, ExamError::ConfigError(msg) if msg.contains("minutes")));

        let cfg = ExamConfig::try_from(parse(&format!(
            "[exam]\nminutes = 0\nunlimited = true\n{ONE_QUESTION}"
        )))
        .unwrap();
        assert_eq!(cfg.time_limit(), TimeRemaining::Unlimited);
    }

    #[test]
    fn blank_interpreter_is_rejected() {
        let err = ExamConfig::try_from(parse(&format!("[engine]\npython = \"  \"\n{ONE_QUESTION}")))
            .unwrap_err();
        assert!(matches!(err, ExamError::ConfigError(msg) if msg.contains("python")));
    }

    #[test]
    fn overrides_take_precedence() {
        let cfg = ExamConfig::try_from(parse(&format!("[exam]\nunlimited = true\n{ONE_QUESTION}")))
            .unwrap();

        let cfg = cfg
            .with_overrides(&ConfigOverrides {
                minutes: Some(5),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(cfg.time_limit(), TimeRemaining::Seconds(300));

        let cfg = cfg
            .with_overrides(&ConfigOverrides {
                unlimited: true,
                export_dir: Some("out".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(cfg.time_limit().is_unlimited());
        assert_eq!(cfg.export.dir, std::path::PathBuf::from("out"));
    }

    #[test]
    fn zero_minute_override_is_rejected() {
        let cfg = ExamConfig::try_from(parse(ONE_QUESTION)).unwrap();
        assert!(
            cfg.with_overrides(&ConfigOverrides {
                minutes: Some(0),
                ..Default::default()
            })
            .is_err()
        );
    }
}
