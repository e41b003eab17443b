//! Generation-tracking controller
//!
//! A session is one blocking `POST /api/generate` that may take minutes. While
//! it is in flight the controller keeps two periodic activities going: a fake
//! progress ticker (the backend reports nothing until it is done) and a poller
//! for the backend's log tail while the server log panel is open. All three,
//! plus incoming user commands, are multiplexed in one `select!` loop that lives
//! exactly as long as the request does, so every timer stops on every exit path.
//!
//! State has a single owner. Mutations go through `&mut self`; observers get
//! snapshots over a `watch` channel and talk back through `ControllerHandle`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::errors::{ErrorInfo, GenerationError};
use crate::logs::LogAggregator;
use crate::session::{Session, SessionStatus};
use crate::steps::StepState;
use crate::types::{GenerateRequest, GenerationResult};
use crate::EbookBackend;

mod log_poller;
mod simulator;

use log_poller::LogPoller;
use simulator::ProgressSimulator;

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;

pub const START_LOG: &str = "Starting ebook generation...";
pub const SUCCESS_LOG: &str = "Ebook generated successfully!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub request_timeout: Duration,
    pub progress_interval: Duration,
    pub log_poll_interval: Duration,
    pub server_log_lines: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(600_000),
            progress_interval: Duration::from_millis(3000),
            log_poll_interval: Duration::from_millis(2000),
            server_log_lines: 50,
        }
    }
}

impl ControllerConfig {
    /// Rejects a zero period or a zero line count.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            bail!("request timeout must be greater than zero");
        }
        if self.progress_interval.is_zero() {
            bail!("progress interval must be greater than zero");
        }
        if self.log_poll_interval.is_zero() {
            bail!("log poll interval must be greater than zero");
        }
        if self.server_log_lines == 0 {
            bail!("server log lines must be at least 1");
        }
        Ok(())
    }
}

/// Snapshot of everything a view needs to render
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControllerState {
    pub session: Option<Session>,
    pub steps: StepState,
    pub logs: LogAggregator,
    pub result: Option<GenerationResult>,
    pub error: Option<ErrorInfo>,
    /// Set from session start until settle handling has finished
    pub generating: bool,
}

impl ControllerState {
    pub fn status(&self) -> SessionStatus {
        self.session
            .as_ref()
            .map(|session| session.status)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate(String),
    ToggleServerLogs,
    RefreshServerLogs,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session was already in progress; nothing was sent
    Ignored,
}

/// Cloneable front for a running controller
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    in_progress: Arc<AtomicBool>,
    state: watch::Receiver<ControllerState>,
}

impl ControllerHandle {
    /// Request a new session. Empty topics are rejected before anything is
    /// sent, and the call is a no-op while another session is in progress.
    pub fn start(&self, topic: &str) -> Result<StartOutcome, GenerationError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(GenerationError::Validation);
        }

        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(topic = %topic, "generation already in progress, ignoring start");
            return Ok(StartOutcome::Ignored);
        }

        if self
            .commands
            .send(Command::Generate(topic.to_string()))
            .is_err()
        {
            self.in_progress.store(false, Ordering::SeqCst);
            return Err(GenerationError::Cancelled);
        }

        Ok(StartOutcome::Started)
    }

    pub fn toggle_server_logs(&self) -> Result<()> {
        self.send(Command::ToggleServerLogs)
    }

    pub fn refresh_server_logs(&self) -> Result<()> {
        self.send(Command::RefreshServerLogs)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    pub fn is_generating(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.clone()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("Generation controller is no longer running"))
    }
}

/// How the request part of a session ended
enum Tracked {
    Settled(Result<GenerationResult, GenerationError>),
    TornDown,
}

pub struct GenerationController {
    backend: Arc<dyn EbookBackend>,
    config: ControllerConfig,
    state: ControllerState,
    publisher: watch::Sender<ControllerState>,
    commands: mpsc::UnboundedReceiver<Command>,
    in_progress: Arc<AtomicBool>,
    poller: LogPoller,
}

impl GenerationController {
    pub fn new(
        backend: Arc<dyn EbookBackend>,
        config: ControllerConfig,
    ) -> Result<(GenerationController, ControllerHandle)> {
        config.validate()?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (publisher, state_rx) = watch::channel(ControllerState::default());
        let in_progress = Arc::new(AtomicBool::new(false));
        let poller = LogPoller::new(backend.clone(), config.server_log_lines);

        let controller = GenerationController {
            backend,
            config,
            state: ControllerState::default(),
            publisher,
            commands: command_rx,
            in_progress: in_progress.clone(),
            poller,
        };

        let handle = ControllerHandle {
            commands: command_tx,
            in_progress,
            state: state_rx,
        };

        Ok((controller, handle))
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Serve handle commands until shutdown or until every handle is dropped
    pub async fn run(mut self) -> Result<()> {
        tracing::debug!("generation controller started");

        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Generate(topic) => {
                    if let Err(GenerationError::Cancelled) = self.generate(&topic).await {
                        break;
                    }
                }
                Command::ToggleServerLogs => self.toggle_server_logs().await,
                Command::RefreshServerLogs => {
                    self.fetch_server_logs().await;
                }
                Command::Shutdown => break,
            }
        }

        tracing::debug!("generation controller stopped");
        Ok(())
    }

    /// Run one session to completion. Failures are recorded on the session and
    /// also returned.
    pub async fn generate(&mut self, topic: &str) -> Result<GenerationResult, GenerationError> {
        let topic = topic.trim();
        if topic.is_empty() {
            self.in_progress.store(false, Ordering::SeqCst);
            return Err(GenerationError::Validation);
        }

        self.begin(topic);

        let outcome = match self.track(GenerateRequest::new(topic)).await {
            Tracked::Settled(outcome) => {
                self.settle(&outcome).await;
                outcome
            }
            Tracked::TornDown => {
                let outcome = Err(GenerationError::Cancelled);
                self.record(&outcome);
                outcome
            }
        };

        self.state.generating = false;
        self.in_progress.store(false, Ordering::SeqCst);
        self.publish();

        outcome
    }

    /// Fetch the backend log tail now. On failure the shown lines stay as they
    /// were. Returns the lines shown afterwards.
    pub async fn fetch_server_logs(&mut self) -> Vec<String> {
        let (seq, logs) = self.poller.fetch().await;
        self.apply_fetch(seq, logs);
        self.server_lines()
    }

    /// Show or hide the server log. Showing it fetches immediately.
    pub async fn toggle_server_logs(&mut self) {
        if !self.state.logs.server_visible() {
            self.fetch_server_logs().await;
        }

        self.flip_server_visibility();
    }

    fn begin(&mut self, topic: &str) {
        tracing::info!(topic = %topic, "starting ebook generation");

        self.in_progress.store(true, Ordering::SeqCst);
        self.state.session = Some(Session::start(topic));
        self.state.generating = true;
        self.state.steps.reset();
        self.state.logs.clear_client();
        self.state.result = None;
        self.state.error = None;
        self.state.logs.push_client(START_LOG);
        self.publish();
    }

    async fn track(&mut self, request: GenerateRequest) -> Tracked {
        let backend = self.backend.clone();
        let request = time::timeout(self.config.request_timeout, async move {
            backend.generate(request).await
        });
        tokio::pin!(request);

        let mut progress = ProgressSimulator::start(self.config.progress_interval);
        let mut polling = LogPoller::schedule(self.config.log_poll_interval);
        let mut fetches: FuturesUnordered<_> = FuturesUnordered::new();
        let mut commands_open = true;

        loop {
            tokio::select! {
                outcome = &mut request => {
                    return match outcome {
                        Ok(outcome) => Tracked::Settled(outcome),
                        Err(_) => {
                            tracing::warn!(
                                timeout_ms = self.config.request_timeout.as_millis() as u64,
                                "generation request timed out"
                            );
                            Tracked::Settled(Err(GenerationError::Timeout))
                        }
                    };
                }
                _ = progress.tick() => {
                    if ProgressSimulator::advance(&mut self.state.steps, &mut self.state.logs) {
                        self.publish();
                    }
                }
                _ = polling.tick() => {
                    if self.state.logs.server_visible() {
                        fetches.push(self.poller.fetch());
                    }
                }
                Some((seq, logs)) = fetches.next() => {
                    self.apply_fetch(seq, logs);
                }
                command = self.commands.recv(), if commands_open => match command {
                    Some(Command::Generate(topic)) => {
                        tracing::debug!(topic = %topic, "generation already in progress, ignoring start");
                    }
                    Some(Command::ToggleServerLogs) => {
                        if !self.state.logs.server_visible() {
                            fetches.push(self.poller.fetch());
                        }
                        self.flip_server_visibility();
                    }
                    Some(Command::RefreshServerLogs) => {
                        fetches.push(self.poller.fetch());
                    }
                    Some(Command::Shutdown) => {
                        tracing::info!("controller torn down during generation");
                        return Tracked::TornDown;
                    }
                    None => commands_open = false,
                },
            }
        }
    }

    async fn settle(&mut self, outcome: &Result<GenerationResult, GenerationError>) {
        self.record(outcome);

        if self.state.logs.server_visible() {
            self.fetch_server_logs().await;
        }
    }

    fn record(&mut self, outcome: &Result<GenerationResult, GenerationError>) {
        let status = match outcome {
            Ok(result) => {
                tracing::info!(filename = %result.filename, "ebook generated");
                self.state.steps.complete();
                self.state.result = Some(result.clone());
                self.state.logs.push_client(SUCCESS_LOG);
                SessionStatus::Succeeded
            }
            Err(err) => {
                tracing::error!(kind = ?err.kind(), error = %err, "ebook generation failed");
                self.state.error = Some(ErrorInfo::from(err));
                self.state.logs.push_client(&format!("Error: {err}"));
                SessionStatus::Failed
            }
        };

        if let Some(session) = self.state.session.as_mut() {
            session.status = status;
        }
        self.publish();
    }

    fn apply_fetch(&mut self, seq: u64, logs: Result<Vec<String>>) {
        match logs {
            Ok(lines) => {
                if self.state.logs.replace_server(seq, &lines) {
                    self.publish();
                } else {
                    tracing::debug!(seq, "dropping stale server log fetch");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch server logs");
            }
        }
    }

    fn flip_server_visibility(&mut self) {
        let visible = !self.state.logs.server_visible();
        self.state.logs.set_server_visible(visible);
        self.publish();
    }

    fn server_lines(&self) -> Vec<String> {
        self.state
            .logs
            .server()
            .iter()
            .map(|entry| entry.text.clone())
            .collect()
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }
}

/// Interval whose first tick fires one period from now
pub(crate) fn periodic(period: Duration) -> Interval {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
