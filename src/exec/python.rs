// src/exec/python.rs

//! Production sandbox: one long-lived `python3` worker per session.
//!
//! The worker runs `driver.py` and answers one JSON reply per JSON request.
//! It keeps a single namespace for its whole life, captures user stdout in a
//! buffer and replaces `input()` with a function returning a fixed sentinel,
//! so a submission can never block waiting on a read.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

use crate::config::model::EngineSection;

use super::backend::{Sandbox, SandboxError, SandboxFuture};
use super::echo::EchoOutcome;

const DRIVER: &str = include_str!("driver.py");

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Request<'a> {
    Clear,
    Exec { code: &'a str },
    Output,
    Echo { line: &'a str },
}

#[derive(Debug, Default, Deserialize)]
struct Reply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    version: Option<String>,
}

pub struct PythonSandbox {
    // Held so the worker is killed when the sandbox is dropped.
    _child: Child,
    requests: ChildStdin,
    replies: Lines<BufReader<ChildStdout>>,
    version: String,
}

impl std::fmt::Debug for PythonSandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonSandbox")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl PythonSandbox {
    /// Start the worker and wait for its readiness line.
    pub async fn spawn(engine: &EngineSection) -> Result<Self> {
        info!(python = %engine.python, "starting python worker");

        let mut cmd = Command::new(&engine.python);
        cmd.arg("-u")
            .arg("-c")
            .arg(DRIVER)
            .arg(&engine.input_sentinel)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning python worker '{}'", engine.python))?;

        let requests = child.stdin.take().context("python worker has no stdin")?;
        let stdout = child.stdout.take().context("python worker has no stdout")?;

        // Always consume stderr so the pipe never fills; user code may write
        // warnings or tracebacks there.
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("python stderr: {}", line);
                }
            });
        }

        let mut replies = BufReader::new(stdout).lines();
        let startup = Duration::from_secs(engine.startup_timeout_secs);
        let first = tokio::time::timeout(startup, replies.next_line())
            .await
            .map_err(|_| anyhow!("python worker not ready after {}s", engine.startup_timeout_secs))?
            .context("reading python worker greeting")?
            .ok_or_else(|| anyhow!("python worker exited during startup"))?;

        let greeting: Reply =
            serde_json::from_str(&first).context("parsing python worker greeting")?;
        if !greeting.ok || !greeting.ready {
            bail!(
                "python worker refused to start: {}",
                greeting.error.unwrap_or_else(|| first.clone())
            );
        }

        let version = greeting.version.unwrap_or_default();
        info!(%version, "python worker ready");

        Ok(Self {
            _child: child,
            requests,
            replies,
            version,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    async fn request(&mut self, request: &Request<'_>) -> Result<Reply, SandboxError> {
        let mut line = serde_json::to_string(request)
            .map_err(|e| SandboxError::Transport(format!("encoding request: {e}")))?;
        line.push('\n');

        self.requests
            .write_all(line.as_bytes())
            .await
            .map_err(|e| SandboxError::Transport(format!("writing to python worker: {e}")))?;
        self.requests
            .flush()
            .await
            .map_err(|e| SandboxError::Transport(format!("flushing python worker: {e}")))?;

        let raw = self
            .replies
            .next_line()
            .await
            .map_err(|e| SandboxError::Transport(format!("reading from python worker: {e}")))?
            .ok_or_else(|| SandboxError::Transport("python worker exited".to_string()))?;

        let reply: Reply = serde_json::from_str(&raw)
            .map_err(|e| SandboxError::Transport(format!("malformed worker reply: {e}")))?;

        if reply.ok {
            Ok(reply)
        } else {
            Err(SandboxError::Raised(
                reply.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

impl Sandbox for PythonSandbox {
    fn clear_output(&mut self) -> SandboxFuture<'_, Result<(), SandboxError>> {
        Box::pin(async move { self.request(&Request::Clear).await.map(|_| ()) })
    }

    fn execute<'a>(&'a mut self, code: &'a str) -> SandboxFuture<'a, Result<(), SandboxError>> {
        Box::pin(async move { self.request(&Request::Exec { code }).await.map(|_| ()) })
    }

    fn read_output(&mut self) -> SandboxFuture<'_, Result<String, SandboxError>> {
        Box::pin(async move {
            let reply = self.request(&Request::Output).await?;
            Ok(reply.output.unwrap_or_default())
        })
    }

    fn echo<'a>(
        &'a mut self,
        line: &'a str,
    ) -> SandboxFuture<'a, Result<EchoOutcome, SandboxError>> {
        Box::pin(async move {
            let reply = self.request(&Request::Echo { line }).await?;
            match reply.kind.as_deref() {
                Some("value") => Ok(EchoOutcome::Evaluated(reply.value)),
                Some("statement") => Ok(EchoOutcome::NoTrailingExpression),
                other => Err(SandboxError::Transport(format!(
                    "unexpected echo reply kind: {other:?}"
                ))),
            }
        })
    }
}
