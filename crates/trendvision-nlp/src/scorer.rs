//! General-purpose lexicon sentiment scorer for post titles.

use crate::outcome::{DefaultReason, ModelOutcome};

/// Scores a title into a sentiment value in `[-1.0, 1.0]`.
///
/// Implementations must be total: empty or failed input resolves to `0.0`.
pub trait SentimentScorer {
    fn score(&self, text: &str) -> ModelOutcome<f64>;
}

/// Word polarities.
///
/// Keys are lowercase single words. The final score is the mean polarity of
/// the matched words, clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("amazing", 0.6),
    ("awesome", 0.6),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("breakthrough", 0.6),
    ("brilliant", 0.9),
    ("cool", 0.35),
    ("easy", 0.43),
    ("excellent", 1.0),
    ("excited", 0.38),
    ("exciting", 0.3),
    ("fantastic", 0.4),
    ("fast", 0.2),
    ("faster", 0.3),
    ("free", 0.4),
    ("fun", 0.3),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("helpful", 0.5),
    ("impressive", 1.0),
    ("improved", 0.5),
    ("interesting", 0.5),
    ("love", 0.5),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("powerful", 0.3),
    ("success", 0.3),
    ("successful", 0.75),
    ("useful", 0.3),
    ("win", 0.8),
    ("wins", 0.8),
    ("wonderful", 1.0),
    // Negative signals
    ("angry", -0.5),
    ("awful", -1.0),
    ("bad", -0.7),
    ("banned", -0.5),
    ("breach", -0.5),
    ("broken", -0.4),
    ("bug", -0.3),
    ("crash", -0.5),
    ("dangerous", -0.6),
    ("dead", -0.2),
    ("difficult", -0.5),
    ("disappointing", -0.6),
    ("fail", -0.5),
    ("failed", -0.5),
    ("failure", -0.3),
    ("fake", -0.5),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("lawsuit", -0.4),
    ("layoffs", -0.5),
    ("leak", -0.3),
    ("outage", -0.5),
    ("poor", -0.4),
    ("problem", -0.3),
    ("sad", -0.5),
    ("scam", -0.8),
    ("slow", -0.3),
    ("stupid", -0.8),
    ("terrible", -1.0),
    ("ugly", -0.7),
    ("vulnerability", -0.4),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

/// Words that flip the polarity of the next scored word.
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "isn't", "wasn't", "aren't", "don't", "doesn't", "didn't", "can't",
    "won't", "cannot",
];
const NEGATION_FACTOR: f64 = -0.5;

/// Words that strengthen the next scored word.
const INTENSIFIERS: &[&str] = &[
    "very", "really", "extremely", "super", "so", "incredibly", "totally", "absolutely",
];
const INTENSIFIER_FACTOR: f64 = 1.3;

fn polarity(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(lex_word, _)| *lex_word == word)
        .map(|&(_, weight)| weight)
}

/// Score a text string using the general lexicon.
///
/// Splits text into lowercase words and averages the polarities of the words
/// found in [`LEXICON`]. A preceding negation multiplies a word's polarity by
/// `-0.5`; a preceding intensifier by `1.3`. Returns `0.0` for empty or
/// unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f64 {
    let mut total = 0.0_f64;
    let mut matched = 0_u32;
    let mut modifier = 1.0_f64;

    for raw in text.split_whitespace() {
        let word = raw
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
            .replace('’', "'")
            .to_lowercase();
        if word.is_empty() {
            continue;
        }

        if NEGATIONS.contains(&word.as_str()) {
            modifier *= NEGATION_FACTOR;
            continue;
        }
        if INTENSIFIERS.contains(&word.as_str()) {
            modifier *= INTENSIFIER_FACTOR;
            continue;
        }

        if let Some(weight) = polarity(&word) {
            total += (weight * modifier).clamp(-1.0, 1.0);
            matched += 1;
        }
        modifier = 1.0;
    }

    if matched == 0 {
        return 0.0;
    }
    (total / f64::from(matched)).clamp(-1.0, 1.0)
}

/// [`SentimentScorer`] backed by [`lexicon_score`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> ModelOutcome<f64> {
        if text.trim().is_empty() {
            return ModelOutcome::defaulted(0.0, DefaultReason::EmptyInput);
        }
        ModelOutcome::Value(lexicon_score(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(lexicon_score("the quick brown fox"), 0.0);
    }

    #[test]
    fn positive_keyword_returns_positive() {
        let score = lexicon_score("This new laptop is great");
        assert!((score - 0.8).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = lexicon_score("Another outage at the cloud provider");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn score_is_mean_of_matched_words() {
        // good (0.7) and bad (-0.7)
        assert!(lexicon_score("good news, bad news").abs() < 1e-9);
    }

    #[test]
    fn negation_flips_and_dampens() {
        let score = lexicon_score("not good");
        assert!((score + 0.35).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn intensifier_strengthens_and_clamps() {
        let score = lexicon_score("very good");
        assert!((score - 0.91).abs() < 1e-9, "got {score}");
        assert_eq!(lexicon_score("extremely excellent"), 1.0);
    }

    #[test]
    fn modifier_resets_after_scored_word() {
        let score = lexicon_score("not bad, good");
        // bad -> 0.35, good -> 0.7
        assert!((score - 0.525).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn punctuation_stripped_from_words() {
        assert!(lexicon_score("Terrible!!!") < 0.0);
    }

    #[test]
    fn scorer_defaults_on_blank_text() {
        let outcome = LexiconScorer.score("   ");
        assert!(outcome.is_default());
        assert_eq!(*outcome.value(), 0.0);
    }

    #[test]
    fn scores_always_in_range() {
        for text in [
            "best best best very very very excellent",
            "worst horrible never never awful",
            "not not not not good",
        ] {
            let score = lexicon_score(text);
            assert!((-1.0..=1.0).contains(&score), "{text}: {score}");
        }
    }
}
