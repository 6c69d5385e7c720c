//! Structured field extraction from resume text

use crate::config::Config;
use crate::models::ExtractedFields;
use crate::processing::document::{HeaderLineSegmenter, ResumeSections, SectionSegmenter};
use crate::processing::education::EducationExtractor;
use crate::processing::experience::ExperienceExtractor;
use crate::processing::phrases::{PhraseAnalyzer, PhraseKind, RuleBasedAnalyzer};
use crate::processing::skill_matcher::SkillGazetteer;
use crate::processing::text_processor::{is_title_cased, title_case, TextProcessor};
use chrono::NaiveDate;
use log::debug;
use std::collections::{BTreeMap, HashSet};

pub struct FieldExtractor {
    segmenter: Box<dyn SectionSegmenter>,
    gazetteer: SkillGazetteer,
    phrase_analyzer: Option<Box<dyn PhraseAnalyzer>>,
    experience: ExperienceExtractor,
    education: EducationExtractor,
    text_processor: TextProcessor,
    phrase_char_limit: usize,
    max_phrase_tokens: usize,
    noise: HashSet<&'static str>,
}

impl FieldExtractor {
    pub fn from_config(config: &Config) -> Self {
        let processing = &config.processing;
        let phrase_analyzer: Option<Box<dyn PhraseAnalyzer>> = if processing.enable_phrase_analysis {
            Some(Box::new(RuleBasedAnalyzer::new(processing.max_phrase_tokens)))
        } else {
            None
        };

        Self {
            segmenter: Box::new(HeaderLineSegmenter::new(processing.header_max_len)),
            gazetteer: SkillGazetteer::default(),
            phrase_analyzer,
            experience: ExperienceExtractor::new(&config.experience),
            education: EducationExtractor::new(processing.min_education_section_len),
            text_processor: TextProcessor::new(),
            phrase_char_limit: processing.phrase_char_limit,
            max_phrase_tokens: processing.max_phrase_tokens,
            noise: NOISE_TERMS.iter().copied().collect(),
        }
    }

    pub fn with_segmenter(mut self, segmenter: Box<dyn SectionSegmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Replace or disable (`None`) the phrase source
    pub fn with_phrase_analyzer(mut self, analyzer: Option<Box<dyn PhraseAnalyzer>>) -> Self {
        self.phrase_analyzer = analyzer;
        self
    }

    pub fn with_gazetteer(mut self, gazetteer: SkillGazetteer) -> Self {
        self.gazetteer = gazetteer;
        self
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.experience = self.experience.with_reference_date(date);
        self
    }

    pub fn segment(&self, text: &str) -> ResumeSections {
        self.segmenter.segment(text)
    }

    pub fn extract(&self, text: &str) -> ExtractedFields {
        if text.trim().is_empty() {
            return ExtractedFields {
                skills: None,
                experience: Some(self.experience.extract("")),
                education: None,
            };
        }

        let sections = self.segmenter.segment(text);
        debug!(
            "Sections: skills={} experience={} education={} chars",
            sections.skills.len(),
            sections.experience.len(),
            sections.education.len()
        );

        let experience_scope = if sections.experience.trim().is_empty() {
            text
        } else {
            sections.experience.as_str()
        };

        ExtractedFields {
            skills: self.extract_skills(text, &sections),
            experience: Some(self.experience.extract(experience_scope)),
            education: self.education.extract(&sections.education, text),
        }
    }

    /// Union of gazetteer hits, phrase candidates and capitalised terms from
    /// the skills section, deduplicated case-insensitively and sorted
    pub fn extract_skills(&self, text: &str, sections: &ResumeSections) -> Option<String> {
        let mut skills: BTreeMap<String, String> = BTreeMap::new();

        for skill in self.gazetteer.find_skills(text) {
            skills.entry(skill.to_lowercase()).or_insert(skill);
        }

        if let Some(analyzer) = &self.phrase_analyzer {
            let scope = self.phrase_scope(text, sections);
            for phrase in analyzer.analyze(&scope) {
                let accepted = match phrase.kind {
                    PhraseKind::NounChunk
                    | PhraseKind::Organization
                    | PhraseKind::Product
                    | PhraseKind::Language => phrase.token_count() <= self.max_phrase_tokens,
                    PhraseKind::Other => false,
                };
                if accepted {
                    self.add_candidate(&mut skills, &phrase.text);
                }
            }
        }

        for word in self.text_processor.words(&sections.skills) {
            if is_title_cased(word) && !self.text_processor.is_stop_word(word) {
                self.add_candidate(&mut skills, word);
            }
        }

        if skills.is_empty() {
            None
        } else {
            Some(skills.into_values().collect::<Vec<_>>().join(", "))
        }
    }

    pub fn match_requirements(&self, skills: &str, requirements: &str) -> Vec<String> {
        match_requirements(skills, requirements)
    }

    /// Skills and experience sections, or the whole text when neither exists,
    /// capped at the configured character limit
    fn phrase_scope(&self, text: &str, sections: &ResumeSections) -> String {
        let joined = [sections.skills.as_str(), sections.experience.as_str()]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n");
        let source = if joined.is_empty() { text } else { joined.as_str() };
        source.chars().take(self.phrase_char_limit).collect()
    }

    fn add_candidate(&self, skills: &mut BTreeMap<String, String>, raw: &str) {
        let cleaned = raw
            .trim()
            .trim_matches(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
            .to_string();
        if self.is_noise(&cleaned) {
            return;
        }

        let display = if cleaned.chars().any(|c| c.is_uppercase()) {
            cleaned
        } else {
            title_case(&cleaned)
        };
        skills.entry(display.to_lowercase()).or_insert(display);
    }

    fn is_noise(&self, candidate: &str) -> bool {
        if candidate.chars().filter(|c| c.is_alphabetic()).count() < 2 && !candidate.contains(['+', '#']) {
            return true;
        }
        if candidate.contains('@') || candidate.to_lowercase().contains("http") {
            return true;
        }

        let tokens: Vec<String> = candidate.split_whitespace().map(str::to_lowercase).collect();
        if tokens.iter().any(|t| t.chars().all(|c| c.is_ascii_digit() || c == '/' || c == '.')) {
            return true;
        }
        if tokens.iter().all(|t| self.noise.contains(t.as_str()) || self.text_processor.is_stop_word(t)) {
            return true;
        }

        // A generic head noun ("cross-functional team") marks the whole phrase as filler
        tokens
            .last()
            .is_some_and(|head| self.noise.contains(head.as_str()))
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Extracted skills that occur in the lowercased requirements text
pub fn match_requirements(skills: &str, requirements: &str) -> Vec<String> {
    let requirements = requirements.to_lowercase();
    skills
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && requirements.contains(&s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

const NOISE_TERMS: &[&str] = &[
    "company", "companies", "team", "teams", "project", "projects", "client", "clients",
    "business", "customer", "customers", "department", "stakeholders", "organization",
    "responsibilities", "responsibility", "role", "position", "summary", "profile",
    "education", "skills", "experience", "present", "current", "today", "various",
    "tools", "technologies", "things", "people", "members", "daily", "jan", "january",
    "feb", "february", "mar", "march", "apr", "april", "may", "jun", "june", "jul",
    "july", "aug", "august", "sep", "sept", "september", "oct", "october", "nov",
    "november", "dec", "december", "resume", "curriculum", "vitae", "phone", "email",
];
