//! Records shared between extraction, scoring and the batch runner

use serde::{Deserialize, Serialize};

/// Per-job weighting of the four sub-scores. Weights need not sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub skills: f32,
    pub experience: f32,
    pub education: f32,
    pub full_text: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            skills: 0.4,
            experience: 0.3,
            education: 0.1,
            full_text: 0.2,
        }
    }
}

impl ScoreWeights {
    pub fn new(skills: f32, experience: f32, education: f32, full_text: f32) -> Self {
        Self { skills, experience, education, full_text }
    }

    pub fn has_negative(&self) -> bool {
        [self.skills, self.experience, self.education, self.full_text]
            .iter()
            .any(|w| *w < 0.0)
    }
}

/// Read-only job input to scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProfile {
    pub job_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub weights: Option<ScoreWeights>,
}

impl JobProfile {
    /// Title, description, requirements and location joined for full-text comparison
    pub fn full_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            self.title.as_str(),
            self.description.as_str(),
            self.requirements.as_str(),
        ];
        if let Some(location) = &self.location {
            parts.push(location.as_str());
        }
        parts
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: i64,
    pub skills_score: f32,
    pub experience_score: f32,
    pub education_score: f32,
    pub full_text_score: f32,
    pub keyword_coverage: f32,
    pub matched_skills: Vec<String>,
    /// Weighted score on the 0-100 scale
    pub final_score: f32,
    pub rank: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate_id: i64,
    pub job_id: i64,
    pub name: String,
    /// Stored URL or filename of the uploaded resume
    pub resume_file: Option<String>,
    #[serde(default)]
    pub ai_score: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsingRecord {
    pub parsing_id: i64,
    pub candidate_id: i64,
    #[serde(default)]
    pub parsed_text: Option<String>,
    pub skills_extracted: Option<String>,
    pub experience_extracted: Option<String>,
    pub education_extracted: Option<String>,
    pub ai_score: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Completed,
    JobNotFound,
    NoCandidates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub job_id: i64,
    pub processed_candidates: usize,
    pub failed: usize,
    pub status: BatchStatus,
    /// Successfully scored candidates, best first
    pub results: Vec<MatchResult>,
}

impl BatchSummary {
    pub fn terminal(job_id: i64, status: BatchStatus) -> Self {
        Self {
            job_id,
            processed_candidates: 0,
            failed: 0,
            status,
            results: Vec::new(),
        }
    }
}

/// Sort results best first and assign 1-based ranks
pub fn rank_results(results: &mut [MatchResult]) {
    results.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
    for (i, result) in results.iter_mut().enumerate() {
        result.rank = Some(i + 1);
    }
}
