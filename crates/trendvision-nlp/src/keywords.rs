//! Dominant-keyword extraction from post titles.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::outcome::{DefaultReason, ModelOutcome};

/// Extracts a single keyword or key phrase from a title.
///
/// Implementations must be total: failure resolves to an empty keyword.
pub trait KeywordExtractor {
    fn extract(&self, title: &str) -> ModelOutcome<String>;
}

/// Longest key phrase produced, in words.
const MAX_PHRASE_WORDS: usize = 2;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'+#\-]*").expect("valid regex"));

/// Characters that end a phrase even without a stop word in between.
fn is_phrase_break(ch: char) -> bool {
    matches!(
        ch,
        '.' | ',' | ';' | ':' | '!' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '|' | '/'
            | '…' | '—' | '–' | '“' | '”'
    )
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "can't", "cannot", "could", "couldn't", "did", "didn't", "do",
    "does", "doesn't", "doing", "don't", "down", "during", "each", "even", "ever", "every", "few",
    "for", "from", "further", "get", "gets", "got", "had", "hadn't", "has", "hasn't", "have",
    "haven't", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
    "i", "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just",
    "let's", "like", "me", "more", "most", "much", "must", "my", "myself", "new", "no", "nor",
    "not", "now", "of", "off", "on", "once", "one", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "really", "same", "she", "should", "shouldn't", "so",
    "some", "still", "such", "than", "that", "that's", "the", "their", "theirs", "them",
    "themselves", "then", "there", "there's", "these", "they", "they're", "this", "those",
    "through", "to", "too", "under", "until", "up", "us", "very", "via", "vs", "was", "wasn't",
    "we", "we're", "were", "weren't", "what", "what's", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "won't", "would", "wouldn't", "you", "you're", "your", "yours",
    "yourself", "yourselves",
];

fn is_stop_word(word: &str) -> bool {
    word.chars().count() < 2 || STOP_WORDS.contains(&word)
}

/// Rapid automatic keyword extraction over a single title.
///
/// The title is split into candidate phrases at stop words and punctuation,
/// each phrase capped at two words. Words are scored by degree over
/// frequency and a phrase scores the sum of its words. The best phrase wins;
/// ties go to the earliest phrase, so output is stable for a given title.
#[derive(Debug, Clone, Copy, Default)]
pub struct RakeExtractor;

impl RakeExtractor {
    fn candidate_phrases(title: &str) -> Vec<Vec<String>> {
        let normalized = title.replace('’', "'").to_lowercase();
        let mut phrases = Vec::new();

        for segment in normalized.split(is_phrase_break) {
            let mut run: Vec<String> = Vec::new();
            for m in WORD.find_iter(segment) {
                let word = m
                    .as_str()
                    .trim_end_matches(['\'', '-', '+', '#'])
                    .to_string();
                if is_stop_word(&word) {
                    flush_run(&mut run, &mut phrases);
                } else {
                    run.push(word);
                }
            }
            flush_run(&mut run, &mut phrases);
        }

        phrases
    }
}

fn flush_run(run: &mut Vec<String>, phrases: &mut Vec<Vec<String>>) {
    for chunk in run.chunks(MAX_PHRASE_WORDS) {
        phrases.push(chunk.to_vec());
    }
    run.clear();
}

impl KeywordExtractor for RakeExtractor {
    fn extract(&self, title: &str) -> ModelOutcome<String> {
        let phrases = Self::candidate_phrases(title);
        if phrases.is_empty() {
            return ModelOutcome::defaulted(String::new(), DefaultReason::EmptyInput);
        }

        let mut frequency: HashMap<&str, usize> = HashMap::new();
        let mut degree: HashMap<&str, usize> = HashMap::new();
        for phrase in &phrases {
            for word in phrase {
                *frequency.entry(word.as_str()).or_insert(0) += 1;
                *degree.entry(word.as_str()).or_insert(0) += phrase.len();
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let word_score = |word: &str| -> f64 {
            let freq = frequency.get(word).copied().unwrap_or(1).max(1);
            degree.get(word).copied().unwrap_or(0) as f64 / freq as f64
        };

        let mut best: Option<(&Vec<String>, f64)> = None;
        for phrase in &phrases {
            let score: f64 = phrase.iter().map(|w| word_score(w)).sum();
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((phrase, score)),
            }
        }

        match best {
            Some((phrase, _)) => ModelOutcome::Value(phrase.join(" ")),
            None => ModelOutcome::defaulted(String::new(), DefaultReason::EmptyInput),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(title: &str) -> String {
        RakeExtractor.extract(title).into_value()
    }

    #[test]
    fn empty_title_defaults_to_empty_keyword() {
        let outcome = RakeExtractor.extract("");
        assert!(outcome.is_default());
        assert_eq!(outcome.into_value(), "");
    }

    #[test]
    fn stop_words_only_defaults_to_empty_keyword() {
        let outcome = RakeExtractor.extract("What is this, and why?");
        assert!(outcome.is_default());
        assert_eq!(outcome.value(), "");
    }

    #[test]
    fn prefers_two_word_phrase() {
        assert_eq!(keyword("Why is the Rust compiler so slow?"), "rust compiler");
    }

    #[test]
    fn phrases_never_exceed_two_words() {
        let kw = keyword("Apple Vision Pro headset price cut");
        assert!(kw.split_whitespace().count() <= MAX_PHRASE_WORDS, "got {kw}");
        assert_eq!(kw, "apple vision");
    }

    #[test]
    fn punctuation_breaks_phrases() {
        assert_eq!(keyword("Linux, kernel"), "linux");
    }

    #[test]
    fn equal_scores_go_to_the_first_phrase() {
        // "thoughts" and "kubernetes" both score 1.0.
        assert_eq!(keyword("Thoughts on Kubernetes?"), "thoughts");
        assert_eq!(keyword("Kubernetes on thoughts"), "kubernetes");
    }

    #[test]
    fn extraction_is_deterministic() {
        let title = "OpenAI releases GPT model; Google answers with Gemini update";
        let first = keyword(title);
        for _ in 0..5 {
            assert_eq!(keyword(title), first);
        }
    }

    #[test]
    fn curly_apostrophes_are_normalized() {
        assert_eq!(keyword("Don’t buy GPUs"), "buy gpus");
    }
}
