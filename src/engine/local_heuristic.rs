use std::collections::HashMap;

use anyhow::Result;

use crate::engine::strategy::{HeuristicScore, ScoringStrategy, StrategyKind, Verdict};

/// Bonus for a question longer than [`LONG_QUESTION_TOKENS`] words.
pub const LONG_QUESTION_BONUS: u32 = 3;
pub const LONG_QUESTION_TOKENS: usize = 5;
/// Bonus for actually phrasing it as a question.
pub const QUESTION_MARK_BONUS: u32 = 2;

// Weighted toward the hidden answer (a rose): its identity first, then
// what kind of thing it is, then its traits.
const BUILTIN_WEIGHTS: &[(&str, u32)] = &[
    ("rose", 40),
    ("roses", 40),
    ("flower", 22),
    ("flowers", 22),
    ("bloom", 16),
    ("blossom", 16),
    ("petal", 18),
    ("petals", 18),
    ("thorn", 18),
    ("thorns", 18),
    ("bouquet", 18),
    ("valentine", 16),
    ("valentines", 16),
    ("plant", 15),
    ("plants", 15),
    ("romance", 14),
    ("romantic", 14),
    ("love", 12),
    ("garden", 12),
    ("red", 12),
    ("pink", 10),
    ("stem", 10),
    ("fragrant", 10),
    ("smell", 8),
    ("scent", 8),
    ("grow", 10),
    ("grows", 10),
    ("living", 10),
    ("alive", 10),
    ("leaves", 8),
    ("leaf", 8),
    ("wedding", 8),
    ("nature", 6),
    ("beautiful", 6),
    ("gift", 4),
    ("color", 4),
    ("colour", 4),
];

/// Word weights for the local oracle. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    weights: HashMap<String, u32>,
}

impl KeywordTable {
    pub fn builtin() -> Self {
        Self {
            weights: BUILTIN_WEIGHTS
                .iter()
                .map(|(word, weight)| (word.to_string(), *weight))
                .collect(),
        }
    }

    pub fn weight(&self, token: &str) -> u32 {
        self.weights.get(token).copied().unwrap_or(0)
    }
}

/// Lowercases, drops everything that is not a letter or whitespace, and
/// splits on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Deterministic bag-of-keywords scorer.
#[derive(Debug, Clone)]
pub struct LocalHeuristicStrategy {
    table: KeywordTable,
}

impl Default for LocalHeuristicStrategy {
    fn default() -> Self {
        Self::new(KeywordTable::builtin())
    }
}

impl LocalHeuristicStrategy {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn score(&self, text: &str) -> HeuristicScore {
        let tokens = tokenize(text);

        let mut delta = 0u32;
        let mut matched_any_keyword = false;
        for token in &tokens {
            let weight = self.table.weight(token);
            if weight > 0 {
                matched_any_keyword = true;
                delta = delta.saturating_add(weight);
            }
        }
        if tokens.len() > LONG_QUESTION_TOKENS {
            delta += LONG_QUESTION_BONUS;
        }
        if text.contains('?') {
            delta += QUESTION_MARK_BONUS;
        }

        HeuristicScore {
            confidence_delta: delta,
            matched_any_keyword,
        }
    }
}

impl ScoringStrategy for LocalHeuristicStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LocalHeuristic
    }

    fn classify(&self, question: &str) -> Result<Verdict> {
        Ok(Verdict::Score(self.score(question)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flower_question_scores_weight_plus_question_bonus() {
        let strategy = LocalHeuristicStrategy::default();
        let score = strategy.score("Is it a flower?");
        assert_eq!(score.confidence_delta, 24);
        assert!(score.matched_any_keyword);
    }

    #[test]
    fn long_questions_get_length_bonus() {
        let strategy = LocalHeuristicStrategy::default();
        // six tokens, no keywords, no question mark
        let score = strategy.score("could you tell me about it");
        assert_eq!(score.confidence_delta, LONG_QUESTION_BONUS);
        assert!(!score.matched_any_keyword);
    }

    #[test]
    fn punctuation_is_stripped_before_matching() {
        assert_eq!(tokenize("Red, PETALS... & thorns!"), ["red", "petals", "thorns"]);
        assert_eq!(tokenize("valentine's"), ["valentines"]);
        assert!(tokenize("  ?!  ").is_empty());
    }

    #[test]
    fn unmatched_text_can_score_zero() {
        let strategy = LocalHeuristicStrategy::default();
        let score = strategy.score("hello there");
        assert_eq!(score.confidence_delta, 0);
        assert!(!score.matched_any_keyword);
    }

    #[test]
    fn repeated_keywords_each_count() {
        let strategy = LocalHeuristicStrategy::default();
        assert_eq!(strategy.score("rose rose").confidence_delta, 80);
    }

    #[test]
    fn builtin_table_weights_the_answer_highest() {
        let table = KeywordTable::builtin();
        assert_eq!(table.weight("rose"), 40);
        assert!(table.weight("flower") < table.weight("rose"));
        assert_eq!(table.weight("tulip"), 0);
    }
}
