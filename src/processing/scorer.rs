//! Weighted resume-to-job match scoring

use crate::config::{Config, ScoringConfig};
use crate::models::{ExtractedFields, JobProfile, MatchResult, ScoreWeights};
use crate::processing::embeddings::{Embedder, SemanticSimilarity};
use crate::processing::experience::ExperienceExtractor;
use crate::processing::fields::match_requirements;
use crate::processing::text_processor::TextProcessor;
use log::debug;
use regex::Regex;
use std::sync::Arc;

/// Combines embedding similarity with deterministic sub-scores. Sub-scores
/// are fractions in [0, 1]; the final score is on a 0-100 scale.
pub struct SimilarityScorer {
    embedder: Arc<dyn Embedder>,
    config: Config,
    text_processor: TextProcessor,
    experience: ExperienceExtractor,
    required_years: Regex,
}

impl SimilarityScorer {
    pub fn new(embedder: Arc<dyn Embedder>, config: &Config) -> Self {
        Self {
            embedder,
            config: config.clone(),
            text_processor: TextProcessor::new(),
            experience: ExperienceExtractor::new(&config.experience),
            // A range such as "3-5 years" keeps its lower bound
            required_years: Regex::new(
                r"(?i)\b(\d+)(?:\s*(?:-|–|to)\s*\d+)?\s*\+?\s*(?:years?|yrs?)\b",
            )
            .expect("Invalid required years regex"),
        }
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.model_name()
    }

    fn semantic(&self) -> SemanticSimilarity<'_> {
        SemanticSimilarity::new(self.embedder.as_ref(), &self.config)
    }

    pub fn similarity(&self, reference: &str, candidate: &str) -> f32 {
        self.semantic().similarity(reference, candidate)
    }

    pub fn score(
        &self,
        candidate_id: i64,
        job: &JobProfile,
        fields: &ExtractedFields,
        resume_text: &str,
    ) -> MatchResult {
        let skills = fields.skills.as_deref().unwrap_or("");

        let skills_score = self.skills_score(job, fields.skills.as_deref());
        let experience_score = self.experience_score(job, fields.experience.as_deref());
        let education_score = self.education_score(job, fields.education.as_deref());
        let full_text_score = self.full_text_score(job, resume_text);
        let keyword_coverage = self
            .text_processor
            .keyword_coverage(&job.requirements, resume_text);

        let weights = job.weights.unwrap_or(self.config.scoring.default_weights);
        let final_score = final_score(
            &weights,
            &self.config.scoring,
            [skills_score, experience_score, education_score, full_text_score],
            keyword_coverage,
        );

        debug!(
            "Candidate {}: skills={:.3} experience={:.3} education={:.3} full_text={:.3} coverage={:.3} final={:.1}",
            candidate_id, skills_score, experience_score, education_score, full_text_score, keyword_coverage, final_score
        );

        MatchResult {
            candidate_id,
            skills_score,
            experience_score,
            education_score,
            full_text_score,
            keyword_coverage,
            matched_skills: match_requirements(skills, &job.requirements),
            final_score,
            rank: None,
        }
    }

    /// Blend of semantic similarity and exact keyword overlap; 0 without skills
    pub fn skills_score(&self, job: &JobProfile, skills: Option<&str>) -> f32 {
        let skills = match skills {
            Some(s) if !s.trim().is_empty() => s,
            _ => return 0.0,
        };

        let semantic = self.similarity(&job.requirements, skills);

        let required = self.text_processor.keyword_set(&job.requirements);
        let exact = if required.is_empty() {
            0.0
        } else {
            let candidate = self.text_processor.keyword_set(skills);
            required.intersection(&candidate).count() as f32 / required.len() as f32
        };

        let share = self.config.scoring.semantic_skill_share;
        (share * semantic + (1.0 - share) * exact).clamp(0.0, 1.0)
    }

    /// Years asked for in the requirements, then the description
    pub fn required_years(&self, job: &JobProfile) -> f32 {
        [job.requirements.as_str(), job.description.as_str()]
            .iter()
            .find_map(|text| {
                self.required_years
                    .captures(text)
                    .and_then(|caps| caps.get(1)?.as_str().parse::<f32>().ok())
            })
            .unwrap_or(self.config.scoring.default_required_years)
    }

    pub fn experience_score(&self, job: &JobProfile, experience: Option<&str>) -> f32 {
        let candidate_years = experience.map_or(0.0, |e| self.experience.parse_years(e));
        if candidate_years <= 0.0 {
            return 0.0;
        }

        let required = self.required_years(job);
        if required <= 0.0 || candidate_years >= required {
            1.0
        } else {
            candidate_years / required
        }
    }

    pub fn education_score(&self, job: &JobProfile, education: Option<&str>) -> f32 {
        match education {
            Some(e) if !e.trim().is_empty() => self.similarity(&job.requirements, e),
            _ => 0.0,
        }
    }

    pub fn full_text_score(&self, job: &JobProfile, resume_text: &str) -> f32 {
        self.similarity(&job.full_text(), resume_text)
    }
}

/// Normalised weighted mean of `[skills, experience, education, full_text]`
/// scaled to 0-100, plus the coverage bonus
pub fn final_score(
    weights: &ScoreWeights,
    scoring: &ScoringConfig,
    sub_scores: [f32; 4],
    keyword_coverage: f32,
) -> f32 {
    let mut w = [weights.skills, weights.experience, weights.education, weights.full_text]
        .map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 });
    if w.iter().sum::<f32>() <= 0.0 {
        w = [1.0; 4];
    }
    let total: f32 = w.iter().sum();

    let weighted: f32 = w
        .iter()
        .zip(sub_scores.iter())
        .map(|(weight, score)| weight * if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 })
        .sum();

    let mut score = 100.0 * weighted / total;
    if keyword_coverage > scoring.coverage_bonus_threshold {
        score += scoring.coverage_bonus_points;
    }

    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::HashingEmbedder;

    fn scorer() -> SimilarityScorer {
        SimilarityScorer::new(Arc::new(HashingEmbedder::default()), &Config::default())
    }

    fn job() -> JobProfile {
        JobProfile {
            job_id: 1,
            title: "Backend Engineer".to_string(),
            description: "Looking for a backend engineer with 3+ years of experience.".to_string(),
            requirements: "Python, SQL, Docker".to_string(),
            location: None,
            weights: None,
        }
    }

    #[test]
    fn test_final_score_is_normalised_weighted_mean() {
        let scoring = Config::default().scoring;
        let weights = ScoreWeights::new(2.0, 1.0, 1.0, 0.0);
        let score = final_score(&weights, &scoring, [1.0, 0.5, 0.0, 1.0], 0.0);
        // (2*1 + 1*0.5 + 0) / 4 = 0.625
        assert!((score - 62.5).abs() < 1e-4);
    }

    #[test]
    fn test_final_score_weight_edge_cases() {
        let scoring = Config::default().scoring;

        let zero = ScoreWeights::new(0.0, 0.0, 0.0, 0.0);
        let score = final_score(&zero, &scoring, [1.0, 0.0, 0.0, 1.0], 0.0);
        assert!((score - 50.0).abs() < 1e-4);

        let negative = ScoreWeights::new(-1.0, 1.0, 0.0, 0.0);
        let score = final_score(&negative, &scoring, [1.0, 0.25, 0.0, 0.0], 0.0);
        assert!((score - 25.0).abs() < 1e-4);

        let score = final_score(&ScoreWeights::default(), &scoring, [f32::NAN; 4], f32::NAN);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_coverage_bonus_is_capped() {
        let scoring = Config::default().scoring;
        let weights = ScoreWeights::default();
        assert_eq!(final_score(&weights, &scoring, [1.0; 4], 1.0), 100.0);

        let with_bonus = final_score(&weights, &scoring, [0.5; 4], 0.9);
        assert!((with_bonus - 55.0).abs() < 1e-4);
        let without = final_score(&weights, &scoring, [0.5; 4], 0.8);
        assert!((without - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_required_years() {
        let s = scorer();
        assert_eq!(s.required_years(&job()), 3.0);

        let mut j = job();
        j.requirements = "7 yrs of Rust".to_string();
        assert_eq!(s.required_years(&j), 7.0);

        j.requirements = "Rust".to_string();
        j.description = "Great team".to_string();
        assert_eq!(s.required_years(&j), 1.0);
    }

    #[test]
    fn test_required_years_ranges_use_lower_bound() {
        let s = scorer();
        let mut j = job();
        for (requirements, expected) in [
            ("3-5 years of Python", 3.0),
            ("2 – 4 yrs backend work", 2.0),
            ("4 to 6 years in data engineering", 4.0),
            ("Rust, 10+ years", 10.0),
        ] {
            j.requirements = requirements.to_string();
            j.description = String::new();
            assert_eq!(s.required_years(&j), expected, "{}", requirements);
        }
    }

    #[test]
    fn test_experience_score() {
        let s = scorer();
        let j = job();
        assert_eq!(s.experience_score(&j, Some("5 years")), 1.0);
        assert!((s.experience_score(&j, Some("1.5 years")) - 0.5).abs() < 1e-6);
        assert_eq!(s.experience_score(&j, Some("0")), 0.0);
        assert_eq!(s.experience_score(&j, Some("Fresh/Entry Level")), 0.0);
        assert_eq!(s.experience_score(&j, None), 0.0);
    }

    #[test]
    fn test_skills_score_without_skills() {
        let s = scorer();
        assert_eq!(s.skills_score(&job(), None), 0.0);
        assert_eq!(s.skills_score(&job(), Some("  ")), 0.0);
        let score = s.skills_score(&job(), Some("Docker, Python, SQL"));
        assert!(score > 0.3 && score <= 1.0);
    }

    #[test]
    fn test_scores_scenario() {
        let s = scorer();
        let fields = ExtractedFields {
            skills: Some("Docker, Python".to_string()),
            experience: Some("5 years".to_string()),
            education: None,
        };
        let resume = "5 years of experience with Python and Docker.";

        let result = s.score(42, &job(), &fields, resume);
        assert_eq!(result.candidate_id, 42);
        assert_eq!(result.experience_score, 1.0);
        assert!((result.keyword_coverage - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(result.matched_skills, vec!["Docker".to_string(), "Python".to_string()]);
        assert_eq!(result.education_score, 0.0);
        assert!((0.0..=100.0).contains(&result.final_score));
        assert!(result.final_score >= 30.0);
    }

    #[test]
    fn test_empty_resume_scores_zero() {
        let s = scorer();
        let fields = ExtractedFields {
            skills: None,
            experience: Some("0".to_string()),
            education: None,
        };
        let result = s.score(1, &job(), &fields, "");
        assert_eq!(result.skills_score, 0.0);
        assert_eq!(result.experience_score, 0.0);
        assert_eq!(result.education_score, 0.0);
        assert_eq!(result.full_text_score, 0.0);
        assert_eq!(result.keyword_coverage, 0.0);
        assert_eq!(result.final_score, 0.0);
        assert!(result.matched_skills.is_empty());
    }
}
