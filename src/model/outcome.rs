use std::fmt;

use serde::{Deserialize, Serialize};

/// Verdict the remote oracle gives for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Affirmative,
    Negative,
    PartialMatch,
    Unknown,
    FarOff,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Outcome::Affirmative,
        Outcome::Negative,
        Outcome::PartialMatch,
        Outcome::Unknown,
        Outcome::FarOff,
    ];

    /// Parses a wire label. Anything outside the known set is `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "yes" => Some(Outcome::Affirmative),
            "no" => Some(Outcome::Negative),
            "close" => Some(Outcome::PartialMatch),
            "i don't know" => Some(Outcome::Unknown),
            "too far away" => Some(Outcome::FarOff),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Outcome::Affirmative => "yes",
            Outcome::Negative => "no",
            Outcome::PartialMatch => "close",
            Outcome::Unknown => "i don't know",
            Outcome::FarOff => "too far away",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Why the game left the active phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    Won,
    OutOfTurns,
    ConfidenceReached,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_tags_parse_case_insensitively() {
        assert_eq!(Outcome::from_tag("Yes"), Some(Outcome::Affirmative));
        assert_eq!(Outcome::from_tag(" too far away "), Some(Outcome::FarOff));
        assert_eq!(Outcome::from_tag("I don't know"), Some(Outcome::Unknown));
    }

    #[test]
    fn unlisted_tags_are_not_outcomes() {
        assert_eq!(Outcome::from_tag("guessed"), None);
        assert_eq!(Outcome::from_tag("game_over"), None);
        assert_eq!(Outcome::from_tag(""), None);
    }

    #[test]
    fn tag_round_trips_for_every_outcome() {
        for outcome in Outcome::ALL {
            assert_eq!(Outcome::from_tag(outcome.tag()), Some(outcome));
        }
    }
}
