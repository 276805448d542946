use std::sync::mpsc::Sender;

use crate::engine::strategy::Verdict;
use crate::model::outcome::TerminalReason;
use crate::model::session::SessionSnapshot;
use crate::model::turn::Turn;

pub enum EngineCommand {
    Ask(String),
    Guess(String),
    /// The reveal delay ran out on the presentation side.
    RevealFinished,
    Shutdown,

    // Posted by the engine's own helper threads.
    OracleReady,
    Classified {
        ticket: u64,
        result: anyhow::Result<Verdict>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    TurnAppended(Turn),
    Terminal(TerminalReason),
    ReadinessChanged(bool),
    SessionChanged(SessionSnapshot),
}

/// Everything the presentation layer hears from a game.
pub trait EngineObserver {
    fn on_turn_appended(&mut self, turn: &Turn);
    fn on_terminal(&mut self, reason: TerminalReason);
    fn on_readiness_changed(&mut self, ready: bool);

    fn on_session_changed(&mut self, _snapshot: &SessionSnapshot) {}
}

impl EngineObserver for Sender<EngineEvent> {
    fn on_turn_appended(&mut self, turn: &Turn) {
        let _ = self.send(EngineEvent::TurnAppended(turn.clone()));
    }

    fn on_terminal(&mut self, reason: TerminalReason) {
        let _ = self.send(EngineEvent::Terminal(reason));
    }

    fn on_readiness_changed(&mut self, ready: bool) {
        let _ = self.send(EngineEvent::ReadinessChanged(ready));
    }

    fn on_session_changed(&mut self, snapshot: &SessionSnapshot) {
        let _ = self.send(EngineEvent::SessionChanged(snapshot.clone()));
    }
}

/// Records events in order. Handy for headless runs and tests.
impl EngineObserver for Vec<EngineEvent> {
    fn on_turn_appended(&mut self, turn: &Turn) {
        self.push(EngineEvent::TurnAppended(turn.clone()));
    }

    fn on_terminal(&mut self, reason: TerminalReason) {
        self.push(EngineEvent::Terminal(reason));
    }

    fn on_readiness_changed(&mut self, ready: bool) {
        self.push(EngineEvent::ReadinessChanged(ready));
    }

    fn on_session_changed(&mut self, snapshot: &SessionSnapshot) {
        self.push(EngineEvent::SessionChanged(snapshot.clone()));
    }
}
