use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::outcome::Outcome;
use crate::model::session::CONFIDENCE_THRESHOLD;

pub const GENERIC_LINE: &str = "Interesting...";
pub const WIN_LINE: &str = "YES! You guessed it!";
pub const WRONG_GUESS_LINE: &str = "Nope, try again!";
pub const TIME_UP_LINE: &str = "Time's up! Let me show you what was inside...";
pub const OUT_OF_QUESTIONS_LINE: &str = "Out of questions! Let me reveal what's inside...";
pub const QUESTION_FAILED_LINE: &str = "Hmm, I had a hiccup. Try again!";
pub const GUESS_FAILED_LINE: &str = "Something went wrong, try again!";

/// Local confidence bands. Upper bounds are exclusive except for the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    Low,
    Mid,
    High,
    FinalAnswer,
}

impl ConfidenceBand {
    pub fn of(confidence: u32) -> Self {
        match confidence {
            0..=34 => ConfidenceBand::Low,
            35..=64 => ConfidenceBand::Mid,
            c if c < CONFIDENCE_THRESHOLD => ConfidenceBand::High,
            _ => ConfidenceBand::FinalAnswer,
        }
    }
}

/// Flavor text for every classification key. Loaded from config so it can be
/// edited, which is why it has to be validated before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseBanks {
    pub affirmative: Vec<String>,
    pub negative: Vec<String>,
    pub partial_match: Vec<String>,
    pub unknown: Vec<String>,
    pub far_off: Vec<String>,

    pub low: Vec<String>,
    pub mid: Vec<String>,
    pub high: Vec<String>,
    /// Said as-is once the local oracle is sure. Never randomized.
    pub final_answer: String,
    pub no_match: Vec<String>,
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ResponseBanks {
    fn default() -> Self {
        Self {
            affirmative: lines(&[
                "Yes! You're on the right track!",
                "That's correct! Keep going!",
                "Absolutely! You're getting closer!",
                "Yes indeed! Smart question!",
                "Right on! You're narrowing it down!",
            ]),
            negative: lines(&[
                "Nope, that's not it!",
                "No, try a different direction!",
                "Not quite! Think again...",
                "No, but good question!",
                "That's a no! Keep guessing!",
            ]),
            partial_match: lines(&[
                "Getting warmer! You're so close!",
                "Almost! You're in the right neighborhood!",
                "Very close! Just a little more...",
                "Hot! You're nearly there!",
                "So close I can feel it!",
            ]),
            unknown: lines(&[
                "Hmm, that's a tricky one...",
                "Not sure about that! Try something else.",
                "Hard to say... ask something different!",
                "That's debatable... keep exploring!",
                "I'm on the fence with that one!",
            ]),
            far_off: lines(&[
                "Way off! Think completely differently!",
                "Not even close! Change your approach!",
                "Miles away! Try another angle!",
                "Totally off track! Rethink this!",
                "Nope, you're in the wrong galaxy!",
            ]),
            low: lines(&[
                "Hmm, I can't picture it yet...",
                "Still foggy. Tell me more!",
                "That doesn't narrow it down much.",
                "Keep going, I'm only warming up.",
            ]),
            mid: lines(&[
                "Ooh, something is taking shape...",
                "Now we're getting somewhere!",
                "I think I see where this is going.",
                "Interesting, that helps a lot.",
            ]),
            high: lines(&[
                "I'm almost sure now!",
                "It's on the tip of my tongue!",
                "One more clue and I've got it!",
                "I can nearly see it!",
            ]),
            final_answer: "I know exactly what it is! Let me show you...".to_string(),
            no_match: lines(&[
                "Hmm, that doesn't ring a bell.",
                "I'm not sure what to make of that one.",
                "Try asking about what it looks like!",
                "That one went right over my head.",
            ]),
        }
    }
}

impl ResponseBanks {
    pub fn validate(&self) -> Result<(), EngineError> {
        let banks: [(&'static str, &Vec<String>); 9] = [
            ("affirmative", &self.affirmative),
            ("negative", &self.negative),
            ("partial_match", &self.partial_match),
            ("unknown", &self.unknown),
            ("far_off", &self.far_off),
            ("low", &self.low),
            ("mid", &self.mid),
            ("high", &self.high),
            ("no_match", &self.no_match),
        ];
        for (key, bank) in banks {
            if bank.is_empty() || bank.iter().any(|line| line.trim().is_empty()) {
                return Err(EngineError::EmptyBank { key });
            }
        }
        if self.final_answer.trim().is_empty() {
            return Err(EngineError::EmptyBank { key: "final_answer" });
        }
        Ok(())
    }

    pub fn for_outcome(&self, outcome: Outcome) -> &[String] {
        match outcome {
            Outcome::Affirmative => &self.affirmative,
            Outcome::Negative => &self.negative,
            Outcome::PartialMatch => &self.partial_match,
            Outcome::Unknown => &self.unknown,
            Outcome::FarOff => &self.far_off,
        }
    }
}

/// Picks flavor lines uniformly from the bank for a classification.
pub struct ResponseSelector {
    banks: ResponseBanks,
    rng: Box<dyn RngCore + Send>,
}

impl ResponseSelector {
    /// Fails if any bank is empty.
    pub fn new(banks: ResponseBanks, rng: Box<dyn RngCore + Send>) -> Result<Self, EngineError> {
        banks.validate()?;
        Ok(Self { banks, rng })
    }

    pub fn from_entropy(banks: ResponseBanks) -> Result<Self, EngineError> {
        Self::new(banks, Box::new(StdRng::from_entropy()))
    }

    pub fn seeded(banks: ResponseBanks, seed: u64) -> Result<Self, EngineError> {
        Self::new(banks, Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn banks(&self) -> &ResponseBanks {
        &self.banks
    }

    /// Line for a remote label. Labels outside the known set get the generic line.
    pub fn for_outcome(&mut self, outcome: Option<Outcome>) -> String {
        match outcome {
            Some(outcome) => {
                let bank = self.banks.for_outcome(outcome);
                pick(bank, &mut *self.rng)
            }
            None => GENERIC_LINE.to_string(),
        }
    }

    /// Line for the local oracle after a turn.
    pub fn for_confidence(&mut self, confidence: u32, matched_any_keyword: bool) -> String {
        if !matched_any_keyword {
            return pick(&self.banks.no_match, &mut *self.rng);
        }
        let bank = match ConfidenceBand::of(confidence) {
            ConfidenceBand::Low => &self.banks.low,
            ConfidenceBand::Mid => &self.banks.mid,
            ConfidenceBand::High => &self.banks.high,
            ConfidenceBand::FinalAnswer => return self.banks.final_answer.clone(),
        };
        pick(bank, &mut *self.rng)
    }

    pub fn final_answer(&self) -> String {
        self.banks.final_answer.clone()
    }
}

fn pick(bank: &[String], rng: &mut (dyn RngCore + Send)) -> String {
    bank.choose(rng)
        .cloned()
        .unwrap_or_else(|| GENERIC_LINE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_split_at_documented_edges() {
        assert_eq!(ConfidenceBand::of(0), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::of(34), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::of(35), ConfidenceBand::Mid);
        assert_eq!(ConfidenceBand::of(64), ConfidenceBand::Mid);
        assert_eq!(ConfidenceBand::of(65), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::of(84), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::of(85), ConfidenceBand::FinalAnswer);
        assert_eq!(ConfidenceBand::of(100), ConfidenceBand::FinalAnswer);
    }

    #[test]
    fn outcome_lines_come_from_their_bank() {
        let mut selector = ResponseSelector::seeded(ResponseBanks::default(), 7).unwrap();
        for outcome in Outcome::ALL {
            for _ in 0..20 {
                let line = selector.for_outcome(Some(outcome));
                assert!(selector.banks().for_outcome(outcome).contains(&line));
            }
        }
    }

    #[test]
    fn unknown_label_gets_generic_line() {
        let mut selector = ResponseSelector::seeded(ResponseBanks::default(), 1).unwrap();
        assert_eq!(selector.for_outcome(None), GENERIC_LINE);
    }

    #[test]
    fn no_match_bank_ignores_confidence() {
        let mut selector = ResponseSelector::seeded(ResponseBanks::default(), 3).unwrap();
        for confidence in [0, 50, 70, 100] {
            let line = selector.for_confidence(confidence, false);
            assert!(selector.banks().no_match.contains(&line));
        }
    }

    #[test]
    fn final_band_is_fixed_sentence() {
        let mut selector = ResponseSelector::seeded(ResponseBanks::default(), 3).unwrap();
        for _ in 0..10 {
            assert_eq!(selector.for_confidence(90, true), selector.final_answer());
        }
    }

    #[test]
    fn empty_bank_is_rejected_at_construction() {
        let banks = ResponseBanks {
            partial_match: Vec::new(),
            ..ResponseBanks::default()
        };
        let err = ResponseSelector::seeded(banks, 0).err();
        assert_eq!(err, Some(EngineError::EmptyBank { key: "partial_match" }));

        let banks = ResponseBanks {
            final_answer: "  ".into(),
            ..ResponseBanks::default()
        };
        assert_eq!(
            banks.validate(),
            Err(EngineError::EmptyBank { key: "final_answer" })
        );
    }
}
