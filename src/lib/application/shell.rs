//! Interactive session loop.

use crate::application::agent::{AgentError, AgentRuntime};
use crate::application::tooling::ToolCatalog;
use crate::application::transcript::{ConsoleRenderer, LogReconciler, SessionLog, TurnStream};
use crate::constants::EXIT_COMMANDS;
use crate::domain::{LogRecord, RunningHistory, Turn};
use serde_json::Value;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("stdin/stdout I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("failed to write agent output to {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode agent output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("a prompt is required in once mode")]
    MissingPrompt,
}

impl ShellError {
    pub fn user_message(&self) -> String {
        match self {
            ShellError::Agent(err) => err.user_message(),
            ShellError::MissingPrompt => {
                "Pass a prompt after the options, e.g. `agent-shell --mode once \"what's (3 + 5) x 12?\"`."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_COMMANDS
        .iter()
        .any(|command| input.eq_ignore_ascii_case(command))
}

/// Owns the running history and the session log for one interactive session.
pub struct SessionShell<A: AgentRuntime, W: Write> {
    agent: A,
    catalog: ToolCatalog,
    renderer: ConsoleRenderer<W>,
    history: RunningHistory,
    log: SessionLog,
    reconciler: LogReconciler,
}

impl<A: AgentRuntime, W: Write> SessionShell<A, W> {
    pub fn new(
        agent: A,
        catalog: ToolCatalog,
        renderer: ConsoleRenderer<W>,
        log: SessionLog,
    ) -> Self {
        Self {
            agent,
            catalog,
            renderer,
            history: RunningHistory::new(),
            log,
            reconciler: LogReconciler,
        }
    }

    pub fn history(&self) -> &RunningHistory {
        &self.history
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn into_renderer(self) -> ConsoleRenderer<W> {
        self.renderer
    }

    /// Reads lines until an exit command or end of input.
    pub async fn run<R>(&mut self, input: R) -> Result<(), ShellError>
    where
        R: AsyncBufRead + Unpin,
    {
        info!(
            log = %self.log.path().display(),
            tools = self.catalog.len(),
            "Interactive session started"
        );
        self.renderer.banner(&self.catalog);

        let mut lines = input.lines();
        loop {
            self.renderer.prompt();
            let Some(line) = lines.next_line().await? else {
                debug!("Input closed");
                self.renderer.notice("");
                self.renderer.goodbye();
                break;
            };

            if self.handle_line(&line).await == LoopControl::Exit {
                break;
            }
        }

        info!(
            turns = self.history.len(),
            records = self.log.records().len(),
            "Interactive session finished"
        );
        Ok(())
    }

    /// Processes one line of user input. Agent and persistence failures are
    /// reported as warnings and never end the session.
    pub async fn handle_line(&mut self, line: &str) -> LoopControl {
        let input = line.trim();
        if input.is_empty() {
            return LoopControl::Continue;
        }
        if is_exit_command(input) {
            self.renderer.goodbye();
            return LoopControl::Exit;
        }

        self.history.push(Turn::user(input));
        self.log.push(LogRecord::user(input));

        match self.agent.invoke(self.history.turns(), &self.catalog).await {
            Ok(raw) => self.apply_delta(raw),
            Err(err) => {
                let completed = err.completed_turns();
                if !completed.is_empty() {
                    self.apply_delta(completed.to_vec());
                }
                warn!(error = %err, completed = completed.len(), "Agent invocation failed");
                self.renderer.warning(&err.user_message());
            }
        }

        if let Err(err) = self.log.persist() {
            warn!(error = %err, "Failed to persist session log");
            self.renderer.warning(&err.user_message());
        }

        LoopControl::Continue
    }

    /// Renders the raw turns of one invocation and folds them into history and log.
    fn apply_delta(&mut self, raw: Vec<Value>) {
        let stream = TurnStream::from_raw(&Value::Array(raw));
        self.renderer.render_stream(&stream);
        match stream {
            TurnStream::Turns(delta) => {
                let appended = self
                    .reconciler
                    .reconcile(&mut self.history, &mut self.log, &delta);
                debug!(turns = delta.len(), records = appended, "Agent turn reconciled");
            }
            TurnStream::Unrecognized(_) => {
                warn!("Agent returned output without any recognizable turn");
            }
        }
    }
}
