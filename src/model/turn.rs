use serde::{Deserialize, Serialize};

use crate::model::outcome::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Player,
    Engine,
}

/// One line of the chat. Never mutated once it is in a [`Transcript`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub outcome: Option<Outcome>,
    pub emphasized: bool,
}

impl Turn {
    pub fn player(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Player,
            text: text.into(),
            outcome: None,
            emphasized: false,
        }
    }

    pub fn engine(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Engine,
            text: text.into(),
            outcome: None,
            emphasized: false,
        }
    }

    pub fn with_outcome(mut self, outcome: Option<Outcome>) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn emphasized(mut self) -> Self {
        self.emphasized = true;
        self
    }
}

/// Append-only chat log. Append order is display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends and hands back the stored turn.
    pub fn append(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        let last = self.turns.len() - 1;
        &self.turns[last]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_chronological_order() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::player("Is it alive?"));
        transcript.append(Turn::engine("Yes indeed!").with_outcome(Some(Outcome::Affirmative)));
        transcript.append(Turn::engine("Time's up!").emphasized());

        let texts: Vec<&str> = transcript.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["Is it alive?", "Yes indeed!", "Time's up!"]);
        assert_eq!(transcript.turns()[0].speaker, Speaker::Player);
        assert!(transcript.last().is_some_and(|t| t.emphasized));
    }
}
