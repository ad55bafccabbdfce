// src/review/export.rs

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::errors::Result;
use crate::session::{Phase, Question, Session};

pub const SNAPSHOT_FILE: &str = "exam_answers.json";
pub const TRANSCRIPT_FILE: &str = "exam_submission.py";

const BANNER: &str = "# ==========================================";

/// Where `write_exports` put its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub snapshot: PathBuf,
    pub transcript: PathBuf,
}

/// Pretty-printed JSON array of every question record.
pub fn snapshot_json(session: &Session) -> Result<String> {
    session.require_phase(Phase::Review, "export")?;
    Ok(serde_json::to_string_pretty(session.questions())?)
}

/// Parse a snapshot produced by [`snapshot_json`].
pub fn import_snapshot(json: &str) -> Result<Vec<Question>> {
    Ok(serde_json::from_str(json)?)
}

/// The attempt as a standalone Python file.
///
/// Question text goes into a docstring, the answer is copied verbatim and the
/// output is turned into comment lines, so the file parses on its own as long
/// as the answers do.
pub fn transcript(session: &Session) -> Result<String> {
    session.require_phase(Phase::Review, "export")?;

    let mut out = String::new();
    out.push_str("\"\"\"\nEXAM SUBMISSION\nGenerated by examsim\n\"\"\"\n\n");

    for (i, q) in session.questions().iter().enumerate() {
        let _ = writeln!(out, "{BANNER}");
        let _ = writeln!(out, "# QUESTION {}", i + 1);
        let _ = writeln!(out, "{BANNER}");
        let _ = writeln!(out, "\"\"\"\n{}\n\"\"\"\n", docstring_safe(&q.text));

        let _ = writeln!(out, "# --- Your Code: ---");
        let _ = writeln!(out, "{}\n", q.answer);

        let _ = writeln!(out, "# --- Execution Output: ---");
        let _ = writeln!(out, "{}\n\n", commented(&q.output));
    }

    Ok(out)
}

/// Write both exports into `dir`, creating it if needed.
pub fn write_exports(dir: &Path, session: &Session) -> Result<ExportPaths> {
    let snapshot = snapshot_json(session)?;
    let transcript = transcript(session)?;

    fs::create_dir_all(dir).with_context(|| format!("creating export directory {:?}", dir))?;

    let paths = ExportPaths {
        snapshot: dir.join(SNAPSHOT_FILE),
        transcript: dir.join(TRANSCRIPT_FILE),
    };
    fs::write(&paths.snapshot, snapshot)
        .with_context(|| format!("writing {:?}", paths.snapshot))?;
    fs::write(&paths.transcript, transcript)
        .with_context(|| format!("writing {:?}", paths.transcript))?;

    info!(snapshot = ?paths.snapshot, transcript = ?paths.transcript, "exports written");
    Ok(paths)
}

/// Text that cannot terminate a `"""` docstring or form an invalid escape.
fn docstring_safe(text: &str) -> String {
    text.replace('\0', "").replace('\\', "\\\\").replace('"', "'")
}

/// One `# ` line per output line. Python ends a source line at `\r\n`, `\r`
/// or `\n`, so all three split here; NUL is not allowed in source at all.
fn commented(output: &str) -> String {
    let output = output.replace('\0', "").replace("\r\n", "\n").replace('\r', "\n");
    let output = if output.is_empty() { "No output" } else { output.as_str() };
    output
        .split('\n')
        .map(|line| format!("# {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::QuestionDraft;
    use crate::types::TimeRemaining;

    fn finished(questions: &[(&str, &str, &str)]) -> Session {
        let drafts: Vec<_> = questions.iter().map(|(t, _, _)| QuestionDraft::new(*t)).collect();
        let mut s = Session::begin(&drafts, TimeRemaining::Unlimited).unwrap();
        for (i, (_, answer, output)) in questions.iter().enumerate() {
            let q = s.question_mut(i, "edit").unwrap();
            q.answer = answer.to_string();
            q.output = output.to_string();
        }
        s.conclude().unwrap();
        s
    }

    #[test]
    fn transcript_layout() {
        let s = finished(&[("Print \"hi\"", "print('hi')", "hi")]);
        let expected = "\"\"\"\nEXAM SUBMISSION\nGenerated by examsim\n\"\"\"\n\n\
# ==========================================\n\
# QUESTION 1\n\
# ==========================================\n\
\"\"\"\nPrint 'hi'\n\"\"\"\n\n\
# --- Your Code: ---\n\
print('hi')\n\n\
# --- Execution Output: ---\n\
# hi\n\n\n";
        assert_eq!(transcript(&s).unwrap(), expected);
    }

    #[test]
    fn multi_line_output_becomes_comments() {
        let s = finished(&[("q", "x", "a\nb"), ("r", "", "")]);
        let t = transcript(&s).unwrap();
        assert!(t.contains("# --- Execution Output: ---\n# a\n# b\n"));
        assert!(t.contains("# --- Execution Output: ---\n# No output\n"));
        assert!(t.contains("# QUESTION 2\n"));
    }

    #[test]
    fn carriage_returns_and_nul_never_leave_a_comment() {
        assert_eq!(commented("loading\rdone now"), "# loading\n# done now");
        assert_eq!(commented("a\r\nb\n"), "# a\n# b\n# ");
        assert_eq!(commented("x\0y"), "# xy");
        assert_eq!(commented("\0"), "# No output");
    }

    #[test]
    fn docstring_text_is_neutralised() {
        assert_eq!(docstring_safe(r#"say """ \n"#), r"say ''' \\n");
    }

    #[test]
    fn snapshot_round_trips() {
        let mut draft = QuestionDraft::new("two");
        draft.images.push("data:image/png;base64,AAAA".to_string());
        let mut s = Session::begin(&[QuestionDraft::new("one"), draft], TimeRemaining::Unlimited)
            .unwrap();
        s.question_mut(0, "edit").unwrap().output = "1".to_string();
        s.question_mut(1, "flag").unwrap().flagged = true;
        s.conclude().unwrap();

        let json = snapshot_json(&s).unwrap();
        let back = import_snapshot(&json).unwrap();
        assert_eq!(back, s.questions());
        assert!(json.contains("\"preCode\""));
    }

    #[test]
    fn exports_refuse_active_sessions() {
        let s = Session::begin(&[QuestionDraft::new("x")], TimeRemaining::Unlimited).unwrap();
        assert!(snapshot_json(&s).is_err());
        assert!(transcript(&s).is_err());
    }

    #[test]
    fn write_exports_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let s = finished(&[("q", "print(2)", "2")]);
        let paths = write_exports(&dir.path().join("out"), &s).unwrap();
        assert!(paths.snapshot.ends_with(SNAPSHOT_FILE));
        let py = fs::read_to_string(&paths.transcript).unwrap();
        assert!(py.contains("print(2)"));
    }
}
