//! Candidate skill phrases from free text

use regex::Regex;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseKind {
    NounChunk,
    Organization,
    Product,
    Language,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Phrase {
    pub text: String,
    pub kind: PhraseKind,
}

impl Phrase {
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Source of noun-chunk and named-entity phrases. The field extractor works
/// without one; plug in a statistical tagger here when available.
pub trait PhraseAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<Phrase>;
}

/// Delimiter-driven analyzer. Short list items become noun chunks; inside
/// longer sentences, runs of capitalised or mixed-case tokens become entities.
pub struct RuleBasedAnalyzer {
    delimiters: Regex,
    max_chunk_tokens: usize,
    leading_words: HashSet<&'static str>,
    languages: HashSet<&'static str>,
}

impl RuleBasedAnalyzer {
    pub fn new(max_chunk_tokens: usize) -> Self {
        Self {
            delimiters: Regex::new(r"[,;|•·●▪()\[\]:\t\n]|\s+(?:and|&|-|–|—)\s+")
                .expect("Invalid phrase delimiter regex"),
            max_chunk_tokens,
            leading_words: LEADING_WORDS.iter().copied().collect(),
            languages: HUMAN_LANGUAGES.iter().copied().collect(),
        }
    }

    fn chunk(&self, segment: &str) -> Option<Phrase> {
        let tokens: Vec<&str> = segment
            .split_whitespace()
            .skip_while(|t| self.leading_words.contains(t.to_lowercase().as_str()))
            .collect();
        if tokens.is_empty() || tokens.len() > self.max_chunk_tokens {
            return None;
        }

        let text = tokens.join(" ").trim_end_matches('.').to_string();
        if !text.chars().any(|c| c.is_alphabetic()) {
            return None;
        }

        let kind = if tokens.len() == 1 && self.languages.contains(text.to_lowercase().as_str()) {
            PhraseKind::Language
        } else {
            PhraseKind::NounChunk
        };
        Some(Phrase { text, kind })
    }

    fn entities(&self, segment: &str, out: &mut Vec<Phrase>) {
        let tokens: Vec<&str> = segment
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| matches!(c, '.' | '"' | '\'' | '!' | '?')))
            .collect();

        let mut span: Vec<&str> = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            // Sentence-initial capitals carry no signal
            let entity_like = is_marked_token(token) || (i > 0 && starts_upper(token));
            if entity_like && span.len() < self.max_chunk_tokens {
                span.push(token);
                continue;
            }
            self.flush(&mut span, out);
            if entity_like {
                span.push(token);
            }
        }
        self.flush(&mut span, out);
    }

    fn flush(&self, span: &mut Vec<&str>, out: &mut Vec<Phrase>) {
        if span.is_empty() {
            return;
        }
        let text = span.join(" ");
        let kind = if span.len() == 1 && self.languages.contains(text.to_lowercase().as_str()) {
            PhraseKind::Language
        } else if span.iter().any(|t| is_marked_token(t)) {
            PhraseKind::Product
        } else if span.last().is_some_and(|t| is_org_suffix(t)) {
            PhraseKind::Organization
        } else if span.iter().any(|t| t.chars().all(|c| c.is_ascii_digit())) {
            PhraseKind::Other
        } else {
            PhraseKind::Organization
        };
        out.push(Phrase { text, kind });
        span.clear();
    }
}

impl Default for RuleBasedAnalyzer {
    fn default() -> Self {
        Self::new(4)
    }
}

impl PhraseAnalyzer for RuleBasedAnalyzer {
    fn analyze(&self, text: &str) -> Vec<Phrase> {
        let mut phrases = Vec::new();

        for segment in self.delimiters.split(text) {
            let segment = segment.trim().trim_start_matches(['-', '*', '+', '>']).trim();
            if segment.is_empty() {
                continue;
            }
            match self.chunk(segment) {
                Some(phrase) => phrases.push(phrase),
                None => self.entities(segment, &mut phrases),
            }
        }

        phrases
    }
}

/// All-caps acronyms, inner capitals (GraphQL), or letters mixed with digits (EC2)
fn is_marked_token(token: &str) -> bool {
    let letters = token.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 {
        return false;
    }
    let upper = token.chars().filter(|c| c.is_uppercase()).count();
    let has_digit = token.chars().any(|c| c.is_ascii_digit());
    let inner_upper = token.chars().skip(1).any(|c| c.is_uppercase());

    (letters >= 2 && upper == letters) || inner_upper || (has_digit && letters > 0)
}

fn starts_upper(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_uppercase())
}

fn is_org_suffix(token: &str) -> bool {
    matches!(
        token.trim_end_matches('.').to_lowercase().as_str(),
        "inc" | "corp" | "corporation" | "ltd" | "llc" | "gmbh" | "university" | "labs"
    )
}

const LEADING_WORDS: &[&str] = &[
    "a", "an", "the", "with", "in", "of", "on", "for", "using", "via", "and", "or",
    "including", "such", "as", "strong", "good", "excellent", "basic", "advanced",
];

const HUMAN_LANGUAGES: &[&str] = &[
    "english", "spanish", "french", "german", "italian", "portuguese", "mandarin",
    "chinese", "japanese", "korean", "hindi", "arabic", "russian", "dutch", "polish",
];
