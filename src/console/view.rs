// src/console/view.rs

use std::io::{self, Write};

use tracing::warn;

use crate::engine::Notification;
use crate::review::review_entries;
use crate::session::Question;
use crate::types::TimeRemaining;

/// Seconds below which every tick is printed.
const FINAL_COUNTDOWN: u64 = 10;

/// Renders controller notifications as plain text.
pub struct ConsoleView<W: Write> {
    out: W,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(&mut self, notification: &Notification) -> io::Result<()> {
        let out = &mut self.out;
        match notification {
            Notification::AttemptStarted { attempt, session } => {
                writeln!(
                    out,
                    "=== Attempt {attempt}: {} question(s), time limit {} ===",
                    session.len(),
                    session.time_remaining()
                )?;
            }
            Notification::QuestionShown {
                index,
                total,
                question,
                time_remaining,
            } => write_question(out, *index, *total, question, *time_remaining)?,
            Notification::TimerUpdated(remaining) => {
                if should_announce(*remaining) {
                    writeln!(out, "[time remaining {remaining}]")?;
                }
            }
            Notification::AnswerSaved { index } => {
                writeln!(out, "Answer {} saved.", index + 1)?;
            }
            Notification::AnswerReset { index, answer } => {
                writeln!(out, "Question {} reset to its starter code:", index + 1)?;
                writeln!(out, "{}", display_answer(answer))?;
            }
            Notification::FlagToggled { index, flagged } => {
                let state = if *flagged { "flagged" } else { "unflagged" };
                writeln!(out, "Question {} {state}.", index + 1)?;
            }
            Notification::CheckStarted { .. } => writeln!(out, "Running...")?,
            Notification::CheckFinished { index, output } => {
                writeln!(out, "Output of question {}:", index + 1)?;
                let output = if output.is_empty() { "(no output)" } else { output.as_str() };
                writeln!(out, "{output}")?;
            }
            Notification::EngineStatusChanged(status) => writeln!(out, "{status}")?,
            Notification::TimeUp => {
                writeln!(out, "Time is up! Your exam was submitted automatically.")?;
            }
            Notification::AttemptFinished { forced } => {
                if !forced {
                    writeln!(out, "Exam submitted.")?;
                }
            }
            Notification::ReviewReady { session } => match review_entries(session) {
                Ok(entries) => {
                    writeln!(out, "=== Review ===")?;
                    for entry in entries {
                        writeln!(out, "\n{entry}")?;
                    }
                    writeln!(
                        out,
                        "\nType 'export' to save your answers, 'retake' or 'restart' to go again."
                    )?;
                }
                Err(e) => warn!(error = %e, "review requested for an unfinished session"),
            },
            Notification::ReturnedToSetup => writeln!(out, "Session discarded.")?,
            Notification::ExportsWritten {
                snapshot,
                transcript,
            } => {
                writeln!(out, "Saved {}", snapshot.display())?;
                writeln!(out, "Saved {}", transcript.display())?;
            }
            Notification::Rejected { reason } => writeln!(out, "! {reason}")?,
        }
        out.flush()
    }
}

/// Full minutes and the last few seconds; unlimited never changes.
fn should_announce(remaining: TimeRemaining) -> bool {
    match remaining {
        TimeRemaining::Seconds(s) => s % 60 == 0 || s <= FINAL_COUNTDOWN,
        TimeRemaining::Unlimited => false,
    }
}

fn display_answer(answer: &str) -> &str {
    if answer.trim().is_empty() {
        "(empty)"
    } else {
        answer.trim_end()
    }
}

fn write_question<W: Write>(
    out: &mut W,
    index: usize,
    total: usize,
    q: &Question,
    remaining: TimeRemaining,
) -> io::Result<()> {
    write!(out, "\n--- Question {}/{total}", index + 1)?;
    if q.flagged {
        write!(out, " (Flagged)")?;
    }
    writeln!(out, " --- {remaining}")?;
    writeln!(out, "{}", q.text)?;
    if !q.images.is_empty() {
        writeln!(out, "[{} image(s) attached]", q.images.len())?;
    }
    writeln!(out, "Answer:")?;
    writeln!(out, "{}", display_answer(&q.answer))?;
    if q.was_executed() {
        writeln!(out, "Output:")?;
        writeln!(out, "{}", q.output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{QuestionDraft, Session};

    fn rendered(notifications: &[Notification]) -> String {
        let mut view = ConsoleView::new(Vec::new());
        for n in notifications {
            view.render(n).unwrap();
        }
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn timer_is_announced_on_minutes_and_final_seconds() {
        let text = rendered(&[
            Notification::TimerUpdated(TimeRemaining::Seconds(120)),
            Notification::TimerUpdated(TimeRemaining::Seconds(119)),
            Notification::TimerUpdated(TimeRemaining::Seconds(11)),
            Notification::TimerUpdated(TimeRemaining::Seconds(10)),
            Notification::TimerUpdated(TimeRemaining::Unlimited),
        ]);
        assert_eq!(text, "[time remaining 02:00]\n[time remaining 00:10]\n");
    }

    #[test]
    fn question_shows_flag_and_output() {
        let mut q = QuestionDraft::new("Print hi").commit();
        q.flagged = true;
        q.output = "hi".to_string();

        let text = rendered(&[Notification::QuestionShown {
            index: 0,
            total: 3,
            question: q,
            time_remaining: TimeRemaining::Seconds(65),
        }]);
        assert!(text.contains("--- Question 1/3 (Flagged) --- 01:05"));
        assert!(text.contains("Answer:\n(empty)\nOutput:\nhi\n"));
    }

    #[test]
    fn review_lists_unexecuted_questions() {
        let mut s = Session::begin(&[QuestionDraft::new("Loop")], TimeRemaining::Unlimited).unwrap();
        s.conclude().unwrap();

        let text = rendered(&[Notification::ReviewReady { session: s }]);
        assert!(text.contains("Question 1\nLoop\n"));
        assert!(text.contains("Output:\nNot executed."));
    }
}
