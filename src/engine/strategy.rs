use crate::model::outcome::{Outcome, TerminalReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    RemoteOracle,
    LocalHeuristic,
}

/// Remote verdict for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleAnswer {
    /// `None` when the service sent a label outside the known set.
    pub outcome: Option<Outcome>,
    pub label: String,
    pub response: Option<String>,
    pub turn_count: u32,
    pub terminal: Option<TerminalReason>,
}

/// Remote verdict for a guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessVerdict {
    pub correct: bool,
    pub message: Option<String>,
    pub turn_count: u32,
    pub terminal: bool,
}

/// Local score for one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicScore {
    pub confidence_delta: u32,
    pub matched_any_keyword: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Answer(OracleAnswer),
    Guess(GuessVerdict),
    Score(HeuristicScore),
}

/// The oracle behind a game. Implementations are shared with the threads
/// that run classification, so they must be `Send + Sync`.
///
/// Errors mean the oracle could not be reached or answered garbage; the
/// engine turns them into an apology line and leaves the session untouched.
pub trait ScoringStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn classify(&self, question: &str) -> anyhow::Result<Verdict>;

    /// Strategies without a guess channel score guesses like questions.
    fn classify_guess(&self, guess: &str) -> anyhow::Result<Verdict> {
        self.classify(guess)
    }

    fn has_guess_channel(&self) -> bool {
        false
    }

    /// Whether the oracle needs to report readiness before play starts.
    fn needs_readiness(&self) -> bool {
        false
    }

    fn poll_ready(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Clears whatever the oracle remembers from an earlier playthrough.
    fn reset(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
