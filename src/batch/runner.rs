//! Sequential scoring of every candidate of a job

use crate::batch::store::CandidateStore;
use crate::config::Config;
use crate::error::{Result, ResumeScorerError};
use crate::input::file_detector::FileType;
use crate::input::InputManager;
use crate::models::{
    rank_results, BatchStatus, BatchSummary, CandidateRecord, JobProfile, MatchResult,
    ParsingRecord,
};
use crate::processing::{Embedder, FieldExtractor, SimilarityScorer};
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

pub struct BatchRunner {
    store: Arc<dyn CandidateStore>,
    input: InputManager,
    extractor: FieldExtractor,
    scorer: SimilarityScorer,
    uploads_dir: PathBuf,
    show_progress: bool,
}

impl BatchRunner {
    pub fn new(store: Arc<dyn CandidateStore>, embedder: Arc<dyn Embedder>, config: &Config) -> Self {
        Self {
            store,
            // Re-runs must see replaced files
            input: InputManager::new().with_cache(false),
            extractor: FieldExtractor::from_config(config),
            scorer: SimilarityScorer::new(embedder, config),
            uploads_dir: config.storage.uploads_dir.clone(),
            show_progress: false,
        }
    }

    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_uploads_dir(mut self, uploads_dir: PathBuf) -> Self {
        self.uploads_dir = uploads_dir;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn store(&self) -> &Arc<dyn CandidateStore> {
        &self.store
    }

    /// Score every candidate of `job_id`. Failures are counted and logged,
    /// never returned.
    pub async fn run(&mut self, job_id: i64) -> BatchSummary {
        let job = match self.store.job(job_id) {
            Ok(Some(job)) => job,
            Ok(None) => {
                warn!("Job {} not found", job_id);
                return BatchSummary::terminal(job_id, BatchStatus::JobNotFound);
            }
            Err(e) => {
                error!("Failed to load job {}: {}", job_id, e);
                return BatchSummary::terminal(job_id, BatchStatus::JobNotFound);
            }
        };

        let candidates = match self.store.candidates_for_job(job_id) {
            Ok(candidates) if !candidates.is_empty() => candidates,
            Ok(_) => {
                info!("No candidates for job {}", job_id);
                return BatchSummary::terminal(job_id, BatchStatus::NoCandidates);
            }
            Err(e) => {
                error!("Failed to load candidates for job {}: {}", job_id, e);
                return BatchSummary::terminal(job_id, BatchStatus::NoCandidates);
            }
        };

        info!(
            "Scoring {} candidates for job {} ({}) with {}",
            candidates.len(),
            job_id,
            job.title,
            self.scorer.embedder_name()
        );

        let progress = self.progress_bar(candidates.len());
        let mut results = Vec::with_capacity(candidates.len());
        let mut failed = 0;

        for candidate in &candidates {
            progress.set_message(candidate.name.clone());
            match self.process_candidate(&job, candidate).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Skipping candidate {}: {}", candidate.candidate_id, e);
                    failed += 1;
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        rank_results(&mut results);
        info!(
            "Job {}: {} scored, {} failed",
            job_id,
            results.len(),
            failed
        );

        BatchSummary {
            job_id,
            processed_candidates: results.len(),
            failed,
            status: BatchStatus::Completed,
            results,
        }
    }

    async fn process_candidate(
        &mut self,
        job: &JobProfile,
        candidate: &CandidateRecord,
    ) -> Result<MatchResult> {
        let reference = candidate.resume_file.as_deref().ok_or_else(|| {
            ResumeScorerError::InvalidInput("Candidate has no resume file".to_string())
        })?;
        let path = resolve_resume_path(&self.uploads_dir, reference).ok_or_else(|| {
            ResumeScorerError::InvalidInput(format!("Cannot resolve resume reference: {}", reference))
        })?;
        if !path.exists() {
            return Err(ResumeScorerError::InvalidInput(format!(
                "Resume file not found: {}",
                path.display()
            )));
        }

        let text = self.input.extract_text(&path).await;
        if text.trim().is_empty() {
            return Err(ResumeScorerError::TextProcessing(format!(
                "No text extracted from {}",
                path.display()
            )));
        }

        let fields = self.extractor.extract(&text);
        let result = self.scorer.score(candidate.candidate_id, job, &fields, &text);

        self.store.save_parsing(ParsingRecord {
            parsing_id: 0,
            candidate_id: candidate.candidate_id,
            parsed_text: Some(text),
            skills_extracted: fields.skills,
            experience_extracted: fields.experience,
            education_extracted: fields.education,
            ai_score: Some(result.final_score),
        })?;
        self.store
            .update_candidate_score(candidate.candidate_id, result.final_score)?;

        Ok(result)
    }

    /// Copy a resume into the uploads directory, parse it and register the
    /// candidate with its parsing record
    pub async fn ingest(
        &mut self,
        candidate_id: i64,
        job_id: i64,
        name: &str,
        source: &Path,
    ) -> Result<ParsingRecord> {
        if self.store.job(job_id)?.is_none() {
            return Err(ResumeScorerError::JobNotFound(job_id));
        }
        if FileType::from_path(source) == FileType::Unsupported {
            return Err(ResumeScorerError::UnsupportedFormat(source.display().to_string()));
        }

        let original_name = source
            .file_name()
            .ok_or_else(|| {
                ResumeScorerError::InvalidInput(format!("Not a file: {}", source.display()))
            })?
            .to_string_lossy()
            .to_string();
        let file_name = upload_file_name(candidate_id, &original_name, Local::now());

        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        let stored = self.uploads_dir.join(&file_name);
        tokio::fs::copy(source, &stored).await?;
        info!("Stored resume for candidate {} at {}", candidate_id, stored.display());

        let text = self.input.try_extract(&stored).await?;
        let fields = self.extractor.extract(&text);

        self.store.register_candidate(CandidateRecord {
            candidate_id,
            job_id,
            name: name.to_string(),
            resume_file: Some(file_name),
            ai_score: None,
        })?;

        let mut record = ParsingRecord {
            parsing_id: 0,
            candidate_id,
            parsed_text: Some(text),
            skills_extracted: fields.skills,
            experience_extracted: fields.experience,
            education_extracted: fields.education,
            ai_score: None,
        };
        record.parsing_id = self.store.save_parsing(record.clone())?;

        Ok(record)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar
    }
}

/// Name a resume is stored under: candidate id and upload time ahead of the
/// original name, so uploads never replace another candidate's file
pub fn upload_file_name(candidate_id: i64, original_name: &str, uploaded_at: DateTime<Local>) -> String {
    format!(
        "{}_{}_{}",
        candidate_id,
        uploaded_at.format("%Y%m%d%H%M%S"),
        original_name
    )
}

/// Map a stored resume reference (URL or file name) to a path in the uploads
/// directory. Only the final path component is used.
pub fn resolve_resume_path(uploads_dir: &Path, reference: &str) -> Option<PathBuf> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let last_component = match Url::parse(reference) {
        Ok(url) if url.has_host() || url.scheme() == "file" => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|segment| urlencoding::decode(segment).ok())
            .map(|segment| segment.into_owned()),
        _ => Some(reference.to_string()),
    }?;

    // A decoded segment may still carry separators
    let file_name = Path::new(&last_component).file_name()?;

    Some(uploads_dir.join(file_name))
}
