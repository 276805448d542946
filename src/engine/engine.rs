use anyhow::Result;
use log::{debug, info, warn};

use crate::engine::protocol::EngineObserver;
use crate::engine::responses::{
    ResponseSelector, GUESS_FAILED_LINE, OUT_OF_QUESTIONS_LINE, QUESTION_FAILED_LINE,
    TIME_UP_LINE, WIN_LINE, WRONG_GUESS_LINE,
};
use crate::engine::strategy::{
    GuessVerdict, HeuristicScore, OracleAnswer, ScoringStrategy, StrategyKind, Verdict,
};
use crate::error::EngineError;
use crate::model::outcome::TerminalReason;
use crate::model::session::{GameSession, LocalSession, Phase, RemoteSession, SessionSnapshot};
use crate::model::turn::{Transcript, Turn};

pub const DEFAULT_TURN_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Question,
    Guess,
}

/// A submission that has been accepted and is waiting for the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub ticket: u64,
    pub kind: SubmissionKind,
    pub text: String,
}

impl PendingTurn {
    pub fn classify(&self, strategy: &dyn ScoringStrategy) -> Result<Verdict> {
        match self.kind {
            SubmissionKind::Question => strategy.classify(&self.text),
            SubmissionKind::Guess => strategy.classify_guess(&self.text),
        }
    }
}

/// One playthrough of the guessing game.
///
/// Submissions are split in two halves so the oracle can be consulted off
/// the engine's thread: [`begin_question`](Self::begin_question) /
/// [`begin_guess`](Self::begin_guess) record the player's turn and mark a
/// request in flight, [`resolve`](Self::resolve) applies the verdict. While a
/// request is in flight, or outside the active phase, new submissions are
/// ignored.
pub struct GameEngine<O: EngineObserver> {
    phase: Phase,
    session: GameSession,
    transcript: Transcript,
    selector: ResponseSelector,
    observer: O,
    in_flight: Option<(u64, SubmissionKind)>,
    next_ticket: u64,
    guess_channel: bool,
}

impl<O: EngineObserver> GameEngine<O> {
    pub fn new(
        strategy: &dyn ScoringStrategy,
        turn_limit: u32,
        selector: ResponseSelector,
        observer: O,
    ) -> Result<Self, EngineError> {
        let session = match strategy.kind() {
            StrategyKind::RemoteOracle => {
                if turn_limit == 0 {
                    return Err(EngineError::InvalidTurnLimit);
                }
                GameSession::Remote(RemoteSession::new(turn_limit))
            }
            StrategyKind::LocalHeuristic => GameSession::Local(LocalSession::default()),
        };
        let phase = if strategy.needs_readiness() {
            Phase::AwaitingReadiness
        } else {
            Phase::Active
        };

        Ok(Self {
            phase,
            session,
            transcript: Transcript::new(),
            selector,
            observer,
            in_flight: None,
            next_ticket: 0,
            guess_channel: strategy.has_guess_channel(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_guess_channel(&self) -> bool {
        self.guess_channel
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let (turn_limit, confidence) = match &self.session {
            GameSession::Remote(s) => (Some(s.turn_limit()), None),
            GameSession::Local(s) => (None, Some(s.confidence())),
        };
        SessionSnapshot {
            phase: self.phase,
            turn_count: self.session.turn_count(),
            turn_limit,
            confidence,
            in_flight: self.in_flight.is_some(),
        }
    }

    /// The oracle finished warming up. Only meaningful once.
    pub fn mark_ready(&mut self) -> bool {
        if self.phase != Phase::AwaitingReadiness {
            return false;
        }
        if let GameSession::Remote(session) = &mut self.session {
            session.mark_ready();
        }
        self.phase = Phase::Active;
        info!("oracle ready, game is active");
        self.observer.on_readiness_changed(true);
        self.notify_session();
        true
    }

    pub fn begin_question(&mut self, raw: &str) -> Option<PendingTurn> {
        self.begin(raw, SubmissionKind::Question)
    }

    /// Without a guess channel the guess is scored like any question.
    pub fn begin_guess(&mut self, raw: &str) -> Option<PendingTurn> {
        let kind = if self.guess_channel {
            SubmissionKind::Guess
        } else {
            SubmissionKind::Question
        };
        self.begin(raw, kind)
    }

    fn begin(&mut self, raw: &str, kind: SubmissionKind) -> Option<PendingTurn> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        if self.phase != Phase::Active {
            debug!("ignoring submission while {:?}", self.phase);
            return None;
        }
        if self.in_flight.is_some() {
            debug!("ignoring submission, oracle is still thinking");
            return None;
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let shown = match kind {
            SubmissionKind::Question => text.to_string(),
            SubmissionKind::Guess => format!("My guess: {text}"),
        };
        self.append(Turn::player(shown));
        self.in_flight = Some((ticket, kind));
        self.notify_session();

        Some(PendingTurn {
            ticket,
            kind,
            text: text.to_string(),
        })
    }

    /// Applies the oracle's answer for `ticket`. Answers for anything but the
    /// request currently in flight are dropped, which also covers a response
    /// delivered twice.
    pub fn resolve(&mut self, ticket: u64, result: Result<Verdict>) -> bool {
        let Some((expected, kind)) = self.in_flight else {
            debug!("dropping verdict for ticket {ticket}, nothing in flight");
            return false;
        };
        if ticket != expected {
            debug!("dropping stale verdict for ticket {ticket} (waiting on {expected})");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(verdict) => self.apply(kind, verdict),
            Err(err) => {
                warn!("oracle call failed: {err:#}");
                self.apologize(kind);
            }
        }
        self.notify_session();
        true
    }

    /// Runs a whole question on the calling thread.
    pub fn submit_question(&mut self, strategy: &dyn ScoringStrategy, raw: &str) -> bool {
        match self.begin_question(raw) {
            Some(pending) => {
                let result = pending.classify(strategy);
                self.resolve(pending.ticket, result)
            }
            None => false,
        }
    }

    /// Runs a whole guess on the calling thread.
    pub fn submit_guess(&mut self, strategy: &dyn ScoringStrategy, raw: &str) -> bool {
        match self.begin_guess(raw) {
            Some(pending) => {
                let result = pending.classify(strategy);
                self.resolve(pending.ticket, result)
            }
            None => false,
        }
    }

    /// The presentation layer finished its reveal transition.
    pub fn finish(&mut self) -> bool {
        if self.phase != Phase::Revealing {
            return false;
        }
        self.phase = Phase::Done;
        self.notify_session();
        true
    }

    fn apply(&mut self, kind: SubmissionKind, verdict: Verdict) {
        match verdict {
            Verdict::Answer(answer) => match self.record_remote_count(answer.turn_count) {
                Some(exhausted) => self.apply_answer(answer, exhausted),
                None => self.reject_verdict(kind, "remote answer"),
            },
            Verdict::Guess(guess) => match self.record_remote_count(guess.turn_count) {
                Some(exhausted) => self.apply_guess(guess, exhausted),
                None => self.reject_verdict(kind, "remote guess verdict"),
            },
            Verdict::Score(score) => match self.record_local_turn(score.confidence_delta) {
                Some((confidence, reached)) => self.apply_score(score, confidence, reached),
                None => self.reject_verdict(kind, "heuristic score"),
            },
        }
    }

    fn apply_answer(&mut self, answer: OracleAnswer, exhausted: bool) {
        match answer.terminal {
            Some(TerminalReason::Won) => {
                let line = answer.response.unwrap_or_else(|| WIN_LINE.to_string());
                self.announce(TerminalReason::Won, line);
            }
            Some(reason) => self.announce(reason, TIME_UP_LINE),
            None => {
                if answer.outcome.is_none() {
                    debug!("oracle sent unlisted label '{}'", answer.label);
                }
                let line = self.selector.for_outcome(answer.outcome);
                self.append(Turn::engine(line).with_outcome(answer.outcome));
                if exhausted {
                    self.announce(TerminalReason::OutOfTurns, TIME_UP_LINE);
                }
            }
        }
    }

    fn apply_guess(&mut self, guess: GuessVerdict, exhausted: bool) {
        if guess.correct {
            let line = guess.message.unwrap_or_else(|| WIN_LINE.to_string());
            self.announce(TerminalReason::Won, line);
            return;
        }
        let line = guess
            .message
            .unwrap_or_else(|| WRONG_GUESS_LINE.to_string());
        self.append(Turn::engine(line));
        if guess.terminal || exhausted {
            self.announce(TerminalReason::OutOfTurns, OUT_OF_QUESTIONS_LINE);
        }
    }

    fn apply_score(&mut self, score: HeuristicScore, confidence: u32, reached: bool) {
        if reached {
            let line = self.selector.final_answer();
            self.announce(TerminalReason::ConfidenceReached, line);
        } else {
            let line = self
                .selector
                .for_confidence(confidence, score.matched_any_keyword);
            self.append(Turn::engine(line));
        }
    }

    fn record_remote_count(&mut self, reported: u32) -> Option<bool> {
        match &mut self.session {
            GameSession::Remote(session) => {
                session.record_count(reported);
                Some(session.is_exhausted())
            }
            GameSession::Local(_) => None,
        }
    }

    fn record_local_turn(&mut self, delta: u32) -> Option<(u32, bool)> {
        match &mut self.session {
            GameSession::Local(session) => {
                session.record_turn(delta);
                Some((session.confidence(), session.threshold_reached()))
            }
            GameSession::Remote(_) => None,
        }
    }

    fn reject_verdict(&mut self, kind: SubmissionKind, what: &str) {
        warn!("{what} does not fit a {} session", self.variant_name());
        self.apologize(kind);
    }

    fn apologize(&mut self, kind: SubmissionKind) {
        let line = match kind {
            SubmissionKind::Question => QUESTION_FAILED_LINE,
            SubmissionKind::Guess => GUESS_FAILED_LINE,
        };
        self.append(Turn::engine(line));
    }

    fn announce(&mut self, reason: TerminalReason, line: impl Into<String>) {
        if self.session.is_terminal() {
            return;
        }
        self.append(Turn::engine(line).emphasized());
        self.session.mark_terminal();
        self.phase = Phase::Revealing;
        info!("game over: {reason:?} after {} turns", self.session.turn_count());
        self.observer.on_terminal(reason);
    }

    fn append(&mut self, turn: Turn) {
        let stored = self.transcript.append(turn);
        self.observer.on_turn_appended(stored);
    }

    fn notify_session(&mut self) {
        let snapshot = self.snapshot();
        self.observer.on_session_changed(&snapshot);
    }

    fn variant_name(&self) -> &'static str {
        match self.session {
            GameSession::Remote(_) => "remote",
            GameSession::Local(_) => "local",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::local_heuristic::LocalHeuristicStrategy;
    use crate::engine::protocol::EngineEvent;
    use crate::engine::responses::ResponseBanks;
    use crate::model::outcome::Outcome;
    use crate::model::turn::Speaker;

    fn local_engine() -> (LocalHeuristicStrategy, GameEngine<Vec<EngineEvent>>) {
        let strategy = LocalHeuristicStrategy::default();
        let selector = ResponseSelector::seeded(ResponseBanks::default(), 11).unwrap();
        let engine = GameEngine::new(&strategy, DEFAULT_TURN_LIMIT, selector, Vec::new()).unwrap();
        (strategy, engine)
    }

    #[test]
    fn local_engine_starts_active() {
        let (_, engine) = local_engine();
        assert_eq!(engine.phase(), Phase::Active);
        assert!(!engine.has_guess_channel());
    }

    #[test]
    fn whitespace_submission_is_a_no_op() {
        let (strategy, mut engine) = local_engine();
        assert!(!engine.submit_question(&strategy, "   \t "));
        assert!(engine.transcript().is_empty());
        assert_eq!(engine.session().turn_count(), 0);
        assert!(engine.observer().is_empty());
    }

    #[test]
    fn second_submission_while_thinking_is_ignored() {
        let (_, mut engine) = local_engine();
        let pending = engine.begin_question("Is it a flower?").unwrap();
        assert_eq!(engine.transcript().len(), 1);

        assert!(engine.begin_question("Is it red?").is_none());
        assert!(engine.begin_guess("rose").is_none());
        assert_eq!(engine.transcript().len(), 1);

        let verdict = Verdict::Score(HeuristicScore {
            confidence_delta: 24,
            matched_any_keyword: true,
        });
        assert!(engine.resolve(pending.ticket, Ok(verdict.clone())));
        assert_eq!(engine.transcript().len(), 2);

        // the same response delivered again changes nothing
        assert!(!engine.resolve(pending.ticket, Ok(verdict)));
        assert_eq!(engine.transcript().len(), 2);
        assert_eq!(engine.session().turn_count(), 1);
    }

    #[test]
    fn failure_appends_apology_without_consuming_turn() {
        let (_, mut engine) = local_engine();
        let pending = engine.begin_question("Is it alive?").unwrap();
        engine.resolve(pending.ticket, Err(anyhow::anyhow!("connection refused")));

        let last = engine.transcript().last().unwrap();
        assert_eq!(last.speaker, Speaker::Engine);
        assert_eq!(last.text, QUESTION_FAILED_LINE);
        assert!(!last.text.contains("refused"));
        assert_eq!(engine.session().turn_count(), 0);
        assert_eq!(engine.phase(), Phase::Active);
        assert!(!engine.is_in_flight());
    }

    #[test]
    fn mismatched_verdict_is_treated_as_failure() {
        let (_, mut engine) = local_engine();
        let pending = engine.begin_question("Is it red?").unwrap();
        let answer = Verdict::Answer(OracleAnswer {
            outcome: Some(Outcome::Affirmative),
            label: "yes".into(),
            response: None,
            turn_count: 1,
            terminal: None,
        });
        engine.resolve(pending.ticket, Ok(answer));
        assert_eq!(engine.transcript().last().unwrap().text, QUESTION_FAILED_LINE);
        assert_eq!(engine.session().turn_count(), 0);
    }

    #[test]
    fn lucky_first_question_waits_for_second_turn() {
        let (strategy, mut engine) = local_engine();
        engine.submit_question(&strategy, "rose roses petals thorns");
        assert_eq!(engine.snapshot().confidence, Some(100));
        assert_eq!(engine.phase(), Phase::Active);
        assert_eq!(
            engine.transcript().last().unwrap().text,
            ResponseBanks::default().final_answer
        );

        engine.submit_question(&strategy, "hello");
        assert_eq!(engine.phase(), Phase::Revealing);
        let last = engine.transcript().last().unwrap();
        assert!(last.emphasized);
        assert!(engine
            .observer()
            .contains(&EngineEvent::Terminal(TerminalReason::ConfidenceReached)));
    }

    #[test]
    fn revealing_rejects_submissions_and_finishes_once() {
        let (strategy, mut engine) = local_engine();
        engine.submit_question(&strategy, "rose rose rose");
        engine.submit_question(&strategy, "rose");
        assert_eq!(engine.phase(), Phase::Revealing);

        let len = engine.transcript().len();
        assert!(!engine.submit_question(&strategy, "Is it a flower?"));
        assert_eq!(engine.transcript().len(), len);

        assert!(engine.finish());
        assert!(!engine.finish());
        assert_eq!(engine.phase(), Phase::Done);

        let terminals = engine
            .observer()
            .iter()
            .filter(|e| matches!(e, EngineEvent::Terminal(_)))
            .count();
        assert_eq!(terminals, 1);
    }
}
