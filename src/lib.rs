// src/lib.rs

pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod persist;
pub mod review;
pub mod session;
pub mod timer;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::io::BufReader;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ExamConfig, build_drafts, config_root_dir, load_and_validate};
use crate::engine::{ExamCore, Notification, Runtime, RuntimeEvent, RuntimeOptions, UserAction};
use crate::exec::{EngineStatus, ExecutionGateway, PythonSandbox};
use crate::persist::{AnswerPersistence, FileStore, KeyValueStore, MemoryStore};
use crate::types::StorageMode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the Python worker (started in the background)
/// - answer storage
/// - console input and output
/// - Ctrl-C handling
/// - the runtime around the exam controller
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?.with_overrides(&args.overrides())?;
    let root_dir = config_root_dir(&config_path);
    let drafts = build_drafts(&cfg, &root_dir)?;

    if args.dry_run {
        print_dry_run(&cfg, &drafts);
        return Ok(());
    }

    let answers = AnswerPersistence::new(open_store(&cfg, &root_dir));

    if args.recover {
        print_recovered(&answers)?;
        return Ok(());
    }

    // Runtime event channel and the notification feed for the console.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let (notify_tx, notify_rx) = mpsc::channel::<Notification>(64);

    // The worker starts in the background; checks are refused until it
    // reports in.
    let gateway = ExecutionGateway::<PythonSandbox>::new();
    {
        let gateway = gateway.clone();
        let engine = cfg.engine.clone();
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            let status = match PythonSandbox::spawn(&engine).await {
                Ok(sandbox) => {
                    info!(version = sandbox.version(), "python worker ready");
                    gateway.install(sandbox).await;
                    EngineStatus::Ready
                }
                Err(e) => {
                    let reason = format!("{e:#}");
                    gateway.mark_failed(reason.clone()).await;
                    EngineStatus::Failed(reason)
                }
            };
            let _ = tx.send(RuntimeEvent::EngineStatusChanged(status)).await;
        });
    }

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // Console: rendering and line input.
    let (engine_tx, engine_rx) = watch::channel(EngineStatus::Loading);
    let view = tokio::spawn(console::run_view(notify_rx, engine_tx, std::io::stdout()));
    {
        let tx = rt_tx.clone();
        let drafts = drafts.clone();
        tokio::spawn(async move {
            let stdin = BufReader::new(tokio::io::stdin());
            if let Err(e) =
                console::run_input(stdin, std::io::stdout(), tx, engine_rx, drafts).await
            {
                warn!(error = %e, "console input failed");
            }
        });
    }

    rt_tx
        .send(RuntimeEvent::User(UserAction::Start(drafts)))
        .await?;

    let options = RuntimeOptions {
        time_limit: cfg.time_limit(),
        export_dir: resolve(&root_dir, &cfg.export.dir),
    };

    // Construct the pure core (single source of truth for exam semantics).
    let core = ExamCore::new(options);

    // Construct the async IO shell around the core.
    let runtime = Runtime::new(core, rt_rx, rt_tx, gateway, answers, notify_tx);
    let core = runtime.run().await?;
    debug!(phase = %core.phase(), attempt = core.attempt(), "runtime finished");

    // Let the console print whatever is still queued.
    let _ = view.await;
    Ok(())
}

fn open_store(cfg: &ExamConfig, root_dir: &Path) -> Box<dyn KeyValueStore> {
    match cfg.storage.mode {
        StorageMode::File => Box::new(FileStore::new(resolve(root_dir, &cfg.storage.dir))),
        StorageMode::Memory => Box::new(MemoryStore::new()),
    }
}

fn resolve(root_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root_dir.join(path)
    }
}

fn print_recovered(answers: &AnswerPersistence) -> Result<()> {
    let recovered = answers.recover()?;
    if recovered.is_empty() {
        println!("No answers from an interrupted attempt were found.");
        return Ok(());
    }

    for (index, answer) in &recovered {
        println!("--- Question {} ---", index.saturating_add(1));
        println!("{answer}");
    }
    Ok(())
}

/// Simple dry-run output: print the settings and the questions.
fn print_dry_run(cfg: &ExamConfig, drafts: &[session::QuestionDraft]) {
    println!("examsim dry-run");
    println!("  exam.time_limit = {}", cfg.time_limit());
    println!("  engine.python = {}", cfg.engine.python);
    println!("  storage.mode = {:?}", cfg.storage.mode);
    println!("  export.dir = {}", cfg.export.dir.display());
    println!();

    println!("questions ({}):", drafts.len());
    for (i, draft) in drafts.iter().enumerate() {
        let first_line = draft.text.lines().next().unwrap_or("");
        println!("  {}. {first_line}", i + 1);
        if !draft.images.is_empty() {
            println!("      images: {}", draft.images.len());
        }
        if !draft.pre_code.is_empty() {
            println!(
                "      pre_code: {} line(s){}",
                draft.pre_code.lines().count(),
                if draft.use_pre_code { "" } else { " (not used)" }
            );
        }
    }

    debug!("dry-run complete (nothing started)");
}
