//! Resume section segmentation

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionType {
    Skills,
    Experience,
    Education,
    Other,
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionType::Skills => write!(f, "Skills"),
            SectionType::Experience => write!(f, "Experience"),
            SectionType::Education => write!(f, "Education"),
            SectionType::Other => write!(f, "Other"),
        }
    }
}

/// Resume text partitioned by section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeSections {
    pub skills: String,
    pub experience: String,
    pub education: String,
    pub other: String,
}

impl ResumeSections {
    fn push_line(&mut self, section: SectionType, line: &str) {
        let buffer = match section {
            SectionType::Skills => &mut self.skills,
            SectionType::Experience => &mut self.experience,
            SectionType::Education => &mut self.education,
            SectionType::Other => &mut self.other,
        };
        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(line);
    }
}

/// Splits resume text into sections. Implementations can target other
/// layouts (two-column exports, non-English headers).
pub trait SectionSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> ResumeSections;
}

/// Treats a short line that reads like a section title as a header and
/// assigns every following line to that section until the next header.
pub struct HeaderLineSegmenter {
    max_header_len: usize,
    skills: Regex,
    experience: Regex,
    education: Regex,
    other: Regex,
}

impl HeaderLineSegmenter {
    pub fn new(max_header_len: usize) -> Self {
        Self {
            max_header_len,
            skills: header_regex(&[
                "skills",
                "technical skills",
                "key skills",
                "core competencies",
                "technologies",
                "tech stack",
                "expertise",
            ]),
            experience: header_regex(&[
                "experience",
                "work experience",
                "professional experience",
                "employment",
                "employment history",
                "work history",
                "career history",
            ]),
            education: header_regex(&[
                "education",
                "academic background",
                "academics",
                "qualifications",
                "educational qualifications",
            ]),
            other: header_regex(&[
                "summary",
                "profile",
                "objective",
                "about me",
                "projects",
                "certifications",
                "certificates",
                "awards",
                "languages",
                "interests",
                "references",
                "contact",
            ]),
        }
    }

    fn classify(&self, line: &str) -> Option<SectionType> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.chars().count() >= self.max_header_len {
            return None;
        }

        if self.skills.is_match(trimmed) {
            Some(SectionType::Skills)
        } else if self.experience.is_match(trimmed) {
            Some(SectionType::Experience)
        } else if self.education.is_match(trimmed) {
            Some(SectionType::Education)
        } else if self.other.is_match(trimmed) {
            Some(SectionType::Other)
        } else {
            None
        }
    }
}

impl Default for HeaderLineSegmenter {
    fn default() -> Self {
        Self::new(50)
    }
}

impl SectionSegmenter for HeaderLineSegmenter {
    fn segment(&self, text: &str) -> ResumeSections {
        let mut sections = ResumeSections::default();
        let mut current = SectionType::Other;

        for line in text.lines() {
            if let Some(section) = self.classify(line) {
                current = section;
                continue;
            }
            if !line.trim().is_empty() {
                sections.push_line(current, line.trim_end());
            }
        }

        sections
    }
}

/// Whole-line header match: optional bullet/number prefix and trailing colon
fn header_regex(names: &[&str]) -> Regex {
    let alternatives = names
        .iter()
        .map(|n| n.replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)^[\W\d_]*(?:{})\s*:?\s*$", alternatives))
        .expect("Invalid section header regex")
}
