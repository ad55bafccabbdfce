use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use examsim::exec::{EchoOutcome, Sandbox, SandboxError, SandboxFuture};

/// What the fake does when asked to execute a given submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Append this text to the output buffer.
    Prints(String),
    /// Fail with `SandboxError::Raised`.
    Raises(String),
    /// Append the submission itself to the output buffer.
    EchoSource,
    /// Fail with `SandboxError::Transport`, as a dead worker would.
    Disconnects(String),
}

/// One primitive call, in the order the gateway made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxCall {
    ClearOutput,
    Execute(String),
    ReadOutput,
    Echo(String),
}

/// A scripted sandbox that:
/// - records every primitive call
/// - answers `execute` from a per-submission script (or a fallback)
/// - answers `echo` from a per-line table (default: no trailing expression)
pub struct FakeSandbox {
    scripts: HashMap<String, Script>,
    fallback: Script,
    echoes: HashMap<String, Result<EchoOutcome, SandboxError>>,
    execute_delay: Option<Duration>,
    buffer: String,
    calls: Arc<Mutex<Vec<SandboxCall>>>,
}

impl FakeSandbox {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            fallback: Script::Prints(String::new()),
            echoes: HashMap::new(),
            execute_delay: None,
            buffer: String::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fake whose output is whatever code it was given.
    pub fn echoing_source() -> Self {
        Self::new().otherwise(Script::EchoSource)
    }

    pub fn on_code(mut self, code: &str, script: Script) -> Self {
        self.scripts.insert(code.to_string(), script);
        self
    }

    pub fn otherwise(mut self, script: Script) -> Self {
        self.fallback = script;
        self
    }

    pub fn on_echo(mut self, line: &str, outcome: EchoOutcome) -> Self {
        self.echoes.insert(line.to_string(), Ok(outcome));
        self
    }

    /// Make `echo(line)` fail at the transport level.
    pub fn echo_breaks(mut self, line: &str, message: &str) -> Self {
        self.echoes
            .insert(line.to_string(), Err(SandboxError::Transport(message.to_string())));
        self
    }

    /// Every `execute` sleeps this long first (tokio time, so it can be
    /// paused).
    pub fn with_execute_delay(mut self, delay: Duration) -> Self {
        self.execute_delay = Some(delay);
        self
    }

    /// Shared log of calls; stays valid after the fake moves into a gateway.
    pub fn calls(&self) -> Arc<Mutex<Vec<SandboxCall>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: SandboxCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for FakeSandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox for FakeSandbox {
    fn clear_output(&mut self) -> SandboxFuture<'_, Result<(), SandboxError>> {
        self.record(SandboxCall::ClearOutput);
        self.buffer.clear();
        Box::pin(async { Ok(()) })
    }

    fn execute<'a>(&'a mut self, code: &'a str) -> SandboxFuture<'a, Result<(), SandboxError>> {
        self.record(SandboxCall::Execute(code.to_string()));
        Box::pin(async move {
            if let Some(delay) = self.execute_delay {
                tokio::time::sleep(delay).await;
            }
            let script = self
                .scripts
                .get(code)
                .cloned()
                .unwrap_or_else(|| self.fallback.clone());
            match script {
                Script::Prints(text) => {
                    self.buffer.push_str(&text);
                    Ok(())
                }
                Script::EchoSource => {
                    self.buffer.push_str(code);
                    Ok(())
                }
                Script::Raises(msg) => Err(SandboxError::Raised(msg)),
                Script::Disconnects(msg) => Err(SandboxError::Transport(msg)),
            }
        })
    }

    fn read_output(&mut self) -> SandboxFuture<'_, Result<String, SandboxError>> {
        self.record(SandboxCall::ReadOutput);
        let out = self.buffer.clone();
        Box::pin(async move { Ok(out) })
    }

    fn echo<'a>(
        &'a mut self,
        line: &'a str,
    ) -> SandboxFuture<'a, Result<EchoOutcome, SandboxError>> {
        self.record(SandboxCall::Echo(line.to_string()));
        let outcome = self
            .echoes
            .get(line)
            .cloned()
            .unwrap_or(Ok(EchoOutcome::NoTrailingExpression));
        Box::pin(async move { outcome })
    }
}
