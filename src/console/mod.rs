// src/console/mod.rs

//! Line-oriented terminal front end.
//!
//! Input lines become [`UserAction`]s sent to the runtime; notifications
//! coming back are rendered by [`ConsoleView`]. The console holds no exam
//! state of its own, so anything it sends may still be refused by the
//! controller. The one exception is Check: the view publishes the engine
//! status it has seen, and the input side refuses `check` up front until the
//! engine is ready.

pub mod command;
pub mod view;

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::engine::{Notification, QuestionRef, RuntimeEvent, UserAction};
use crate::errors::Result;
use crate::exec::EngineStatus;
use crate::session::QuestionDraft;

pub use command::{CommandError, ConsoleCommand, HELP, is_yes, parse_command};
pub use view::ConsoleView;

/// Ends a multi-line answer typed after `edit`.
pub const EDIT_TERMINATOR: &str = ".";

/// Read commands from `reader` until `quit` or end of input.
///
/// Prompts go to `out`. End of input counts as `quit`. `drafts` are the
/// configured questions, replayed by `restart`. `engine` follows the engine
/// status; `check` is only offered while it is ready.
pub async fn run_input<R, W>(
    reader: R,
    mut out: W,
    tx: mpsc::Sender<RuntimeEvent>,
    engine: watch::Receiver<EngineStatus>,
    drafts: Vec<QuestionDraft>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };
        debug!(?command, "console command");

        let actions = match command {
            ConsoleCommand::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            ConsoleCommand::Check(_) if !engine.borrow().is_ready() => {
                writeln!(out, "Check is unavailable ({})", *engine.borrow())?;
                continue;
            }
            ConsoleCommand::Edit => {
                writeln!(
                    out,
                    "Type the new answer. End with a line containing only '{EDIT_TERMINATOR}'."
                )?;
                out.flush()?;
                let text = read_block(&mut lines).await?;
                vec![UserAction::Edit {
                    question: QuestionRef::Current,
                    text,
                }]
            }
            ConsoleCommand::Load(path) => match tokio::fs::read_to_string(&path).await {
                Ok(text) => vec![UserAction::Edit {
                    question: QuestionRef::Current,
                    text,
                }],
                Err(e) => {
                    writeln!(out, "Cannot read {}: {e}", path.display())?;
                    continue;
                }
            },
            other => {
                let confirmed = match other.confirmation() {
                    Some(prompt) => {
                        write!(out, "{prompt} [y/N] ")?;
                        out.flush()?;
                        lines.next_line().await?.is_some_and(|reply| is_yes(&reply))
                    }
                    None => true,
                };
                other.into_actions(confirmed, &drafts)
            }
        };

        let quitting = actions.contains(&UserAction::Quit);
        for action in actions {
            if tx.send(RuntimeEvent::User(action)).await.is_err() {
                debug!("runtime gone; console input stops");
                return Ok(());
            }
        }
        if quitting {
            return Ok(());
        }
    }

    debug!("end of console input");
    let _ = tx.send(RuntimeEvent::User(UserAction::Quit)).await;
    Ok(())
}

/// Collect lines up to the terminator (or end of input).
async fn read_block<R>(lines: &mut Lines<R>) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut block = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim_end() == EDIT_TERMINATOR {
            break;
        }
        block.push(line);
    }
    Ok(block.join("\n"))
}

/// Render notifications until the runtime drops its sender.
///
/// Engine status changes are also published on `engine` for the input side.
pub async fn run_view<W: Write>(
    mut rx: mpsc::Receiver<Notification>,
    engine: watch::Sender<EngineStatus>,
    out: W,
) -> W {
    let mut view = ConsoleView::new(out);
    while let Some(notification) = rx.recv().await {
        if let Notification::EngineStatusChanged(status) = &notification {
            engine.send_replace(status.clone());
        }
        if let Err(e) = view.render(&notification) {
            warn!(error = %e, "failed to write to the console");
        }
    }
    view.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drive(input: &str) -> (Vec<UserAction>, String) {
        drive_with(input, EngineStatus::Ready).await
    }

    async fn drive_with(input: &str, status: EngineStatus) -> (Vec<UserAction>, String) {
        let (tx, mut rx) = mpsc::channel(32);
        let (_engine_tx, engine_rx) = watch::channel(status);
        let drafts = vec![QuestionDraft::new("q")];
        let mut prompts = Vec::new();

        run_input(input.as_bytes(), &mut prompts, tx, engine_rx, drafts)
            .await
            .unwrap();

        let mut actions = Vec::new();
        while let Ok(RuntimeEvent::User(a)) = rx.try_recv() {
            actions.push(a);
        }
        (actions, String::from_utf8(prompts).unwrap())
    }

    #[tokio::test]
    async fn edit_reads_until_terminator() {
        let (actions, _) = drive("edit\ndef f():\n    return 1\n.\ncheck\nquit\n").await;
        assert_eq!(
            actions,
            vec![
                UserAction::Edit {
                    question: QuestionRef::Current,
                    text: "def f():\n    return 1".to_string(),
                },
                UserAction::Check(QuestionRef::Current),
                UserAction::Quit,
            ]
        );
    }

    #[tokio::test]
    async fn finish_asks_first() {
        let (actions, prompts) = drive("finish\nn\nfinish\ny\n").await;
        assert_eq!(
            actions,
            vec![
                UserAction::Finish { confirmed: false },
                UserAction::Finish { confirmed: true },
                UserAction::Quit,
            ]
        );
        assert!(prompts.contains("Finish the exam?"));
    }

    #[tokio::test]
    async fn bad_lines_are_reported_not_sent() {
        let (actions, prompts) = drive("bogus\ngoto x\nload /definitely/not/here.py\n").await;
        assert_eq!(actions, vec![UserAction::Quit]);
        assert!(prompts.contains("Unknown command 'bogus'"));
        assert!(prompts.contains("'x' is not a question number"));
        assert!(prompts.contains("Cannot read /definitely/not/here.py"));
    }

    #[tokio::test]
    async fn load_replaces_the_current_answer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer.py");
        std::fs::write(&path, "print('x')\n").unwrap();

        let (actions, _) = drive(&format!("load {}\n", path.display())).await;
        assert_eq!(
            actions[0],
            UserAction::Edit {
                question: QuestionRef::Current,
                text: "print('x')\n".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn check_is_held_back_until_the_engine_is_ready() {
        let (actions, prompts) = drive_with("check\nc 1\nnext\n", EngineStatus::Loading).await;
        assert_eq!(actions, vec![UserAction::Navigate(1), UserAction::Quit]);
        assert!(prompts.contains("Check is unavailable (Python engine loading...)"));

        let (actions, prompts) =
            drive_with("check\n", EngineStatus::Failed("python worker exited".to_string())).await;
        assert_eq!(actions, vec![UserAction::Quit]);
        assert!(prompts.contains("python worker exited"));
    }

    #[tokio::test]
    async fn view_publishes_engine_status() {
        let (tx, rx) = mpsc::channel(4);
        let (engine_tx, engine_rx) = watch::channel(EngineStatus::Loading);
        tx.send(Notification::EngineStatusChanged(EngineStatus::Ready))
            .await
            .unwrap();
        drop(tx);

        let out = run_view(rx, engine_tx, Vec::new()).await;
        assert!(engine_rx.borrow().is_ready());
        assert!(String::from_utf8(out).unwrap().contains("Python engine ready"));
    }
}
