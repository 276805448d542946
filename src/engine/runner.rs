use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::{GameConfig, OracleMode};
use crate::engine::engine::{GameEngine, PendingTurn};
use crate::engine::local_heuristic::LocalHeuristicStrategy;
use crate::engine::oracle_client::OracleClient;
use crate::engine::protocol::{EngineCommand, EngineEvent};
use crate::engine::readiness::ReadinessGate;
use crate::engine::remote_oracle::RemoteOracleStrategy;
use crate::engine::responses::ResponseSelector;
use crate::engine::strategy::ScoringStrategy;
use crate::model::session::SessionSnapshot;

/// Picks the oracle named by the config.
pub fn strategy_from_config(config: &GameConfig) -> Result<Arc<dyn ScoringStrategy>> {
    match &config.oracle {
        OracleMode::Remote { base_url } => {
            info!("using remote oracle at {base_url}");
            let client = OracleClient::new(
                base_url.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )?;
            Ok(Arc::new(RemoteOracleStrategy::new(client)))
        }
        OracleMode::Local => {
            info!("using local keyword oracle");
            Ok(Arc::new(LocalHeuristicStrategy::default()))
        }
    }
}

/// Owns the worker thread running one playthrough. Dropping the handle ends
/// the game and stops any readiness polling.
pub struct EngineHandle {
    cmd_tx: Sender<EngineCommand>,
    event_rx: Receiver<EngineEvent>,
    guess_channel: bool,
    initial: SessionSnapshot,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn from_config(config: &GameConfig) -> Result<Self> {
        let strategy = strategy_from_config(config)?;
        let selector = ResponseSelector::from_entropy(config.responses.clone())
            .context("invalid response table")?;
        Self::spawn(
            strategy,
            selector,
            config.turn_limit,
            Duration::from_millis(config.poll_interval_ms),
        )
    }

    pub fn spawn(
        strategy: Arc<dyn ScoringStrategy>,
        selector: ResponseSelector,
        turn_limit: u32,
        poll_interval: Duration,
    ) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let game = GameEngine::new(strategy.as_ref(), turn_limit, selector, event_tx)?;
        let guess_channel = game.has_guess_channel();
        let initial = game.snapshot();

        let gate = if strategy.needs_readiness() {
            let ready_tx = cmd_tx.clone();
            Some(ReadinessGate::start(
                Arc::clone(&strategy),
                poll_interval,
                move || {
                    let _ = ready_tx.send(EngineCommand::OracleReady);
                },
            ))
        } else {
            None
        };

        let mut worker = Worker {
            rx: cmd_rx,
            tx: cmd_tx.clone(),
            game,
            strategy,
            gate,
        };
        let worker = thread::spawn(move || worker.run());

        Ok(Self {
            cmd_tx,
            event_rx,
            guess_channel,
            initial,
            worker: Some(worker),
        })
    }

    pub fn ask(&self, text: impl Into<String>) {
        self.send_command(EngineCommand::Ask(text.into()));
    }

    pub fn guess(&self, text: impl Into<String>) {
        self.send_command(EngineCommand::Guess(text.into()));
    }

    pub fn reveal_finished(&self) {
        self.send_command(EngineCommand::RevealFinished);
    }

    pub fn has_guess_channel(&self) -> bool {
        self.guess_channel
    }

    /// Session state before any event was emitted.
    pub fn initial_snapshot(&self) -> &SessionSnapshot {
        &self.initial
    }

    /// Events that arrived since the last call, without blocking.
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        self.event_rx.try_iter().collect()
    }

    pub fn next_event(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send_command(&self, cmd: EngineCommand) {
        let _ = self.cmd_tx.send(cmd);
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.send_command(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

struct Worker {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineCommand>,
    game: GameEngine<Sender<EngineEvent>>,
    strategy: Arc<dyn ScoringStrategy>,
    gate: Option<ReadinessGate>,
}

impl Worker {
    fn run(&mut self) {
        while let Ok(cmd) = self.rx.recv() {
            match cmd {
                EngineCommand::Ask(text) => {
                    if let Some(pending) = self.game.begin_question(&text) {
                        self.dispatch(pending);
                    }
                }

                EngineCommand::Guess(text) => {
                    if let Some(pending) = self.game.begin_guess(&text) {
                        self.dispatch(pending);
                    }
                }

                EngineCommand::OracleReady => {
                    self.stop_polling();
                    if let Err(err) = self.strategy.reset() {
                        warn!("could not reset oracle session: {err:#}");
                    }
                    self.game.mark_ready();
                }

                EngineCommand::Classified { ticket, result } => {
                    self.game.resolve(ticket, result);
                }

                EngineCommand::RevealFinished => {
                    self.game.finish();
                }

                EngineCommand::Shutdown => break,
            }
        }
        self.stop_polling();
    }

    /// Asks the oracle on a helper thread; the verdict comes back as a command.
    fn dispatch(&self, pending: PendingTurn) {
        let strategy = Arc::clone(&self.strategy);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = pending.classify(strategy.as_ref());
            let _ = tx.send(EngineCommand::Classified {
                ticket: pending.ticket,
                result,
            });
        });
    }

    fn stop_polling(&mut self) {
        if let Some(mut gate) = self.gate.take() {
            gate.cancel();
        }
    }
}
