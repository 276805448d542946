use anyhow::Result;

use crate::engine::oracle_client::{OracleApi, OracleClient};
use crate::engine::strategy::{GuessVerdict, OracleAnswer, ScoringStrategy, StrategyKind, Verdict};
use crate::model::outcome::{Outcome, TerminalReason};

/// Hands every judgement to the oracle service. The service owns the
/// question counter and the hidden answer.
#[derive(Debug)]
pub struct RemoteOracleStrategy<A = OracleClient> {
    api: A,
}

impl<A: OracleApi> RemoteOracleStrategy<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }
}

impl<A: OracleApi> ScoringStrategy for RemoteOracleStrategy<A> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RemoteOracle
    }

    fn classify(&self, question: &str) -> Result<Verdict> {
        let reply = self.api.ask(question)?;

        let terminal = if reply.guessed_correctly {
            Some(TerminalReason::Won)
        } else if reply.game_over {
            Some(TerminalReason::OutOfTurns)
        } else {
            None
        };

        Ok(Verdict::Answer(OracleAnswer {
            outcome: Outcome::from_tag(&reply.label),
            label: reply.label,
            response: reply.response,
            turn_count: reply.question_count,
            terminal,
        }))
    }

    fn classify_guess(&self, guess: &str) -> Result<Verdict> {
        let reply = self.api.guess(guess)?;
        Ok(Verdict::Guess(GuessVerdict {
            correct: reply.correct,
            message: reply.message,
            turn_count: reply.question_count,
            terminal: reply.correct || reply.game_over,
        }))
    }

    fn has_guess_channel(&self) -> bool {
        true
    }

    fn needs_readiness(&self) -> bool {
        true
    }

    fn poll_ready(&self) -> Result<bool> {
        Ok(self.api.status()?.model_ready)
    }

    fn reset(&self) -> Result<()> {
        self.api.reset()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;
    use crate::engine::oracle_client::{AskReply, GuessReply, StatusReply};

    struct CannedOracle {
        ask: AskReply,
        guess: GuessReply,
    }

    impl OracleApi for CannedOracle {
        fn status(&self) -> Result<StatusReply> {
            bail!("503 Service Unavailable")
        }

        fn reset(&self) -> Result<()> {
            Ok(())
        }

        fn ask(&self, _question: &str) -> Result<AskReply> {
            Ok(self.ask.clone())
        }

        fn guess(&self, _guess: &str) -> Result<GuessReply> {
            Ok(self.guess.clone())
        }
    }

    fn canned(
        label: &str,
        guessed_correctly: bool,
        game_over: bool,
    ) -> RemoteOracleStrategy<CannedOracle> {
        RemoteOracleStrategy::new(CannedOracle {
            ask: AskReply {
                label: label.into(),
                response: None,
                question_count: 4,
                guessed_correctly,
                game_over,
            },
            guess: GuessReply {
                correct: true,
                message: None,
                question_count: 4,
                game_over: false,
            },
        })
    }

    #[test]
    fn known_label_maps_to_outcome() {
        let verdict = canned("close", false, false).classify("Is it red?").unwrap();
        let Verdict::Answer(answer) = verdict else {
            panic!("expected an answer");
        };
        assert_eq!(answer.outcome, Some(Outcome::PartialMatch));
        assert_eq!(answer.turn_count, 4);
        assert_eq!(answer.terminal, None);
    }

    #[test]
    fn unknown_label_keeps_raw_text() {
        let Verdict::Answer(answer) = canned("maybe?", false, false).classify("hm").unwrap() else {
            panic!("expected an answer");
        };
        assert_eq!(answer.outcome, None);
        assert_eq!(answer.label, "maybe?");
    }

    #[test]
    fn direct_answer_via_ask_wins() {
        let Verdict::Answer(answer) = canned("guessed", true, true).classify("rose").unwrap() else {
            panic!("expected an answer");
        };
        assert_eq!(answer.terminal, Some(TerminalReason::Won));
    }

    #[test]
    fn correct_guess_is_terminal_with_budget_left() {
        let verdict = canned("yes", false, false).classify_guess("rose").unwrap();
        let Verdict::Guess(guess) = verdict else {
            panic!("expected a guess verdict");
        };
        assert!(guess.correct);
        assert!(guess.terminal);
    }

    #[test]
    fn status_failure_propagates() {
        assert!(canned("yes", false, false).poll_ready().is_err());
    }
}
