use serde::{Deserialize, Serialize};

/// Local confidence never exceeds this.
pub const CONFIDENCE_CAP: u32 = 100;
/// Confidence at which the local oracle commits to an answer.
pub const CONFIDENCE_THRESHOLD: u32 = 85;
/// A lucky first question must not end the local game.
pub const MIN_TURNS_BEFORE_REVEAL: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingReadiness,
    Active,
    Revealing,
    Done,
}

/// Counters for a remote-oracle playthrough. The service owns the real
/// question counter; this mirrors what it reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSession {
    turn_count: u32,
    turn_limit: u32,
    ready: bool,
    terminal: bool,
}

impl RemoteSession {
    pub fn new(turn_limit: u32) -> Self {
        Self {
            turn_count: 0,
            turn_limit,
            ready: false,
            terminal: false,
        }
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn turn_limit(&self) -> u32 {
        self.turn_limit
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Mirrors the service's count, clamped to the budget. The count never
    /// goes down within a playthrough.
    pub fn record_count(&mut self, reported: u32) {
        self.turn_count = reported.max(self.turn_count).min(self.turn_limit);
    }

    pub fn is_exhausted(&self) -> bool {
        self.turn_count >= self.turn_limit
    }
}

/// Counters for a local-heuristic playthrough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSession {
    turn_count: u32,
    confidence: u32,
    terminal: bool,
}

impl LocalSession {
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn confidence(&self) -> u32 {
        self.confidence
    }

    /// Counts one question and adds its score. Confidence only ever grows.
    pub fn record_turn(&mut self, confidence_delta: u32) {
        self.turn_count += 1;
        self.confidence = self
            .confidence
            .saturating_add(confidence_delta)
            .min(CONFIDENCE_CAP);
    }

    pub fn threshold_reached(&self) -> bool {
        self.confidence >= CONFIDENCE_THRESHOLD && self.turn_count >= MIN_TURNS_BEFORE_REVEAL
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum GameSession {
    Remote(RemoteSession),
    Local(LocalSession),
}

impl GameSession {
    pub fn turn_count(&self) -> u32 {
        match self {
            GameSession::Remote(s) => s.turn_count,
            GameSession::Local(s) => s.turn_count,
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            GameSession::Remote(s) => s.terminal,
            GameSession::Local(s) => s.terminal,
        }
    }

    pub(crate) fn mark_terminal(&mut self) {
        match self {
            GameSession::Remote(s) => s.terminal = true,
            GameSession::Local(s) => s.terminal = true,
        }
    }
}

/// Read-only view handed to the presentation layer after counter changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub turn_count: u32,
    pub turn_limit: Option<u32>,
    pub confidence: Option<u32>,
    pub in_flight: bool,
}

impl SessionSnapshot {
    pub fn turns_left(&self) -> Option<u32> {
        self.turn_limit
            .map(|limit| limit.saturating_sub(self.turn_count))
    }
}
