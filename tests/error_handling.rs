// tests/error_handling.rs

use std::io::Write;

use tempfile::NamedTempFile;

use examsim::config::{ConfigOverrides, build_drafts, config_root_dir, load_and_validate};
use examsim::errors::ExamError;
use examsim::types::{StorageMode, TimeRemaining};
use examsim_test_utils::builders::ExamConfigBuilder;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn exam_without_questions_is_a_config_error() {
    let file = config_file(
        r#"
[exam]
minutes = 10
"#,
    );

    match load_and_validate(file.path()) {
        Err(ExamError::ConfigError(msg)) => assert!(msg.contains("[[question]]")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = config_file("[[question]]\ntext = \n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ExamError::TomlError(_))
    ));
}

#[test]
fn unknown_storage_mode_is_rejected_while_parsing() {
    let file = config_file(
        r#"
[storage]
mode = "cloud"

[[question]]
text = "q"
"#,
    );
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ExamError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        load_and_validate("/definitely/not/an/exam.toml"),
        Err(ExamError::IoError(_))
    ));
}

#[test]
fn full_config_loads_with_images_relative_to_the_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("figures")).unwrap();
    std::fs::write(dir.path().join("figures/plot.gif"), b"GIF89a").unwrap();

    let path = dir.path().join("exam.toml");
    std::fs::write(
        &path,
        r#"
[exam]
minutes = 45

[engine]
python = "/usr/bin/python3"

[storage]
mode = "memory"

[export]
dir = "out"

[[question]]
text = "Read the plot"
images = ["figures/plot.gif"]

[[question]]
text = "Sum a list"
pre_code = "def total(xs):\n    pass\n"
"#,
    )
    .unwrap();

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.time_limit(), TimeRemaining::Seconds(45 * 60));
    assert_eq!(cfg.storage.mode, StorageMode::Memory);
    assert_eq!(cfg.engine.python, "/usr/bin/python3");

    let drafts = build_drafts(&cfg, &config_root_dir(&path)).unwrap();
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0].images, vec!["data:image/gif;base64,R0lGODlh".to_string()]);
    assert_eq!(drafts[1].commit().answer, "def total(xs):\n    pass\n");
}

#[test]
fn missing_image_fails_draft_building() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ExamConfigBuilder::new()
        .with_question_config(examsim::config::QuestionConfig {
            text: "Look".to_string(),
            pre_code: String::new(),
            use_pre_code: true,
            images: vec!["missing.png".to_string()],
        })
        .build();

    assert!(build_drafts(&cfg, dir.path()).is_err());
}

#[test]
fn cli_overrides_are_validated() {
    let cfg = ExamConfigBuilder::new().with_question("q").minutes(30).build();

    let unlimited = cfg
        .clone()
        .with_overrides(&ConfigOverrides {
            unlimited: true,
            ..Default::default()
        })
        .unwrap();
    assert!(unlimited.time_limit().is_unlimited());

    assert!(matches!(
        cfg.with_overrides(&ConfigOverrides {
            minutes: Some(0),
            ..Default::default()
        }),
        Err(ExamError::ConfigError(_))
    ));
}
