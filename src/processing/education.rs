//! Degree detection and normalisation

use crate::processing::text_processor::title_case;
use regex::Regex;
use std::collections::BTreeSet;

pub struct EducationExtractor {
    spelled_out: Regex,
    abbreviations: Regex,
    min_section_len: usize,
}

impl EducationExtractor {
    pub fn new(min_section_len: usize) -> Self {
        Self {
            spelled_out: Regex::new(
                r"(?i)\b(bachelor(?:'?s)?|master(?:'?s)?|ph\.?\s?d|doctorate|diploma|associate(?:'?s)?\s+degree|high\s+school)\b",
            )
            .expect("Invalid degree regex"),
            // Abbreviations are matched case-sensitively so "ms" or "be" in prose do not count
            abbreviations: Regex::new(
                r"\b(B\.?\s?Sc|M\.?\s?Sc|B\.?\s?Tech|M\.?\s?Tech|B\.?S|M\.?S|B\.E|M\.E|B\.A|M\.A|BBA|MBA|PhD)(?:[^A-Za-z]|$)",
            )
            .expect("Invalid degree abbreviation regex"),
            min_section_len,
        }
    }

    /// Degree categories found in the education section, or in the whole
    /// text when the section is too short to be trusted
    pub fn extract(&self, education_section: &str, full_text: &str) -> Option<String> {
        let scope = if education_section.trim().chars().count() >= self.min_section_len {
            education_section
        } else {
            full_text
        };

        let mut degrees = BTreeSet::new();
        for caps in self.spelled_out.captures_iter(scope) {
            if let Some(m) = caps.get(1) {
                degrees.insert(normalize_degree(m.as_str()));
            }
        }
        for caps in self.abbreviations.captures_iter(scope) {
            if let Some(m) = caps.get(1) {
                if !is_product_prefix(m.as_str(), &scope[m.end()..]) {
                    degrees.insert(normalize_degree(m.as_str()));
                }
            }
        }

        if degrees.is_empty() {
            None
        } else {
            Some(degrees.into_iter().collect::<Vec<_>>().join(", "))
        }
    }
}

impl Default for EducationExtractor {
    fn default() -> Self {
        Self::new(20)
    }
}

/// Words that follow "MS" when it names Microsoft software rather than a degree
const MS_PRODUCTS: &[&str] = &[
    "365", "access", "azure", "dynamics", "excel", "office", "outlook", "powerpoint",
    "project", "sharepoint", "sql", "teams", "visio", "word",
];

fn is_product_prefix(token: &str, rest: &str) -> bool {
    let compact: String = token.chars().filter(|c| c.is_alphanumeric()).collect();
    if !compact.eq_ignore_ascii_case("ms") {
        return false;
    }
    let next = rest
        .split_whitespace()
        .next()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .unwrap_or_default();
    MS_PRODUCTS.contains(&next.as_str())
}

/// Map a matched token to Bachelor's / Master's / PhD, or keep it literally
pub fn normalize_degree(token: &str) -> String {
    let compact: String = token
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();

    if compact.starts_with("bachelor")
        || matches!(compact.as_str(), "bsc" | "btech" | "bs" | "be" | "ba" | "bba")
    {
        "Bachelor's".to_string()
    } else if compact.starts_with("master")
        || matches!(compact.as_str(), "msc" | "mtech" | "ms" | "me" | "ma" | "mba")
    {
        "Master's".to_string()
    } else if compact == "phd" || compact == "doctorate" {
        "PhD".to_string()
    } else if compact.starts_with("associate") {
        "Associate".to_string()
    } else {
        title_case(&token.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}
