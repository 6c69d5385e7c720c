//! Tokenization, stop words and keyword sets

use std::collections::{BTreeSet, HashSet};
use unicode_segmentation::UnicodeSegmentation;

pub struct TextProcessor {
    stop_words: HashSet<&'static str>,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Lowercased tokens; `+`, `#` and inner dots survive so "C++", "C#" and
    /// "Node.js" stay whole.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#' || c == '.'))
            .map(|t| t.trim_matches('.'))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Every token in the text, for whole-word membership checks
    pub fn token_set(&self, text: &str) -> HashSet<String> {
        self.tokenize(text).into_iter().collect()
    }

    /// Significant tokens: no stop words, no bare numbers, no single letters
    /// unless they carry a symbol
    pub fn keyword_set(&self, text: &str) -> BTreeSet<String> {
        self.tokenize(text)
            .into_iter()
            .filter(|t| t.chars().any(|c| c.is_alphabetic()))
            .filter(|t| t.chars().count() > 1 || t.contains('+') || t.contains('#'))
            .filter(|t| !self.is_stop_word(t))
            .collect()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word.to_lowercase().as_str())
    }

    /// Alphabetic words with Unicode word boundaries, original casing kept
    pub fn words<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.unicode_words().collect()
    }

    pub fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Fraction of the requirement keywords present as whole tokens in `candidate_text`
    pub fn keyword_coverage(&self, requirements: &str, candidate_text: &str) -> f32 {
        let required = self.keyword_set(requirements);
        if required.is_empty() {
            return 0.0;
        }

        let present = self.token_set(candidate_text);
        let hits = required.iter().filter(|k| present.contains(*k)).count();
        hits as f32 / required.len() as f32
    }
}

pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// True for words like "Kubernetes": an uppercase letter followed only by lowercase ones
pub fn is_title_cased(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let rest: Vec<char> = chars.collect();
            !rest.is_empty() && rest.iter().all(|c| c.is_lowercase())
        }
        _ => false,
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
    "during", "each", "either", "etc", "few", "for", "from", "further", "had", "has",
    "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if", "in",
    "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my", "no", "nor",
    "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out",
    "over", "own", "same", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "us", "very", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "within", "would",
    "you", "your", "yours",
    // job-ad filler
    "ability", "able", "candidate", "candidates", "closely", "demonstrated", "desired",
    "excellent", "experience", "experienced", "familiarity", "good", "ideal", "including",
    "knowledge", "looking", "minimum", "must", "nice", "plus", "preferred", "proficiency",
    "proficient", "proven", "required", "requirement", "requirements", "responsibilities",
    "role", "skills", "solid", "strong", "understanding", "using", "work", "working",
    "year", "years", "yrs",
];
