//! Persistence seam for jobs, candidates and parsing records

use crate::error::{Result, ResumeScorerError};
use crate::models::{CandidateRecord, JobProfile, ParsingRecord};
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Storage used by the batch runner. Every mutation is committed before the
/// call returns.
pub trait CandidateStore: Send + Sync {
    fn job(&self, job_id: i64) -> Result<Option<JobProfile>>;

    fn candidates_for_job(&self, job_id: i64) -> Result<Vec<CandidateRecord>>;

    /// Insert or overwrite the single parsing record of a candidate; returns its id
    fn save_parsing(&self, record: ParsingRecord) -> Result<i64>;

    fn update_candidate_score(&self, candidate_id: i64, score: f32) -> Result<()>;

    fn register_candidate(&self, candidate: CandidateRecord) -> Result<()>;

    fn add_job(&self, job: JobProfile) -> Result<()>;

    fn candidate(&self, candidate_id: i64) -> Result<Option<CandidateRecord>>;

    fn parsing_for_candidate(&self, candidate_id: i64) -> Result<Option<ParsingRecord>>;
}

/// Serialized form of a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub jobs: Vec<JobProfile>,
    #[serde(default)]
    pub candidates: Vec<CandidateRecord>,
    #[serde(default)]
    pub parsings: Vec<ParsingRecord>,
}

impl StoreDocument {
    fn job(&self, job_id: i64) -> Option<JobProfile> {
        self.jobs.iter().find(|j| j.job_id == job_id).cloned()
    }

    fn candidates_for_job(&self, job_id: i64) -> Vec<CandidateRecord> {
        let mut candidates: Vec<CandidateRecord> = self
            .candidates
            .iter()
            .filter(|c| c.job_id == job_id)
            .cloned()
            .collect();
        candidates.sort_by_key(|c| c.candidate_id);
        candidates
    }

    fn save_parsing(&mut self, mut record: ParsingRecord) -> i64 {
        if let Some(existing) = self
            .parsings
            .iter_mut()
            .find(|p| p.candidate_id == record.candidate_id)
        {
            record.parsing_id = existing.parsing_id;
            *existing = record;
            return existing.parsing_id;
        }

        record.parsing_id = self.parsings.iter().map(|p| p.parsing_id).max().unwrap_or(0) + 1;
        let id = record.parsing_id;
        self.parsings.push(record);
        id
    }

    fn update_candidate_score(&mut self, candidate_id: i64, score: f32) -> Result<()> {
        let candidate = self
            .candidates
            .iter_mut()
            .find(|c| c.candidate_id == candidate_id)
            .ok_or_else(|| {
                ResumeScorerError::Storage(format!("Unknown candidate: {}", candidate_id))
            })?;
        candidate.ai_score = Some(score);
        Ok(())
    }

    fn register_candidate(&mut self, candidate: CandidateRecord) {
        match self
            .candidates
            .iter_mut()
            .find(|c| c.candidate_id == candidate.candidate_id)
        {
            Some(existing) => *existing = candidate,
            None => self.candidates.push(candidate),
        }
    }

    fn add_job(&mut self, job: JobProfile) {
        match self.jobs.iter_mut().find(|j| j.job_id == job.job_id) {
            Some(existing) => *existing = job,
            None => self.jobs.push(job),
        }
    }

    fn candidate(&self, candidate_id: i64) -> Option<CandidateRecord> {
        self.candidates
            .iter()
            .find(|c| c.candidate_id == candidate_id)
            .cloned()
    }

    fn parsing_for_candidate(&self, candidate_id: i64) -> Option<ParsingRecord> {
        self.parsings
            .iter()
            .find(|p| p.candidate_id == candidate_id)
            .cloned()
    }
}

fn lock(document: &Mutex<StoreDocument>) -> Result<MutexGuard<'_, StoreDocument>> {
    document
        .lock()
        .map_err(|_| ResumeScorerError::Storage("Store lock poisoned".to_string()))
}

#[derive(Default)]
pub struct MemoryStore {
    document: Mutex<StoreDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: StoreDocument) -> Self {
        Self { document: Mutex::new(document) }
    }
}

impl CandidateStore for MemoryStore {
    fn job(&self, job_id: i64) -> Result<Option<JobProfile>> {
        Ok(lock(&self.document)?.job(job_id))
    }

    fn candidates_for_job(&self, job_id: i64) -> Result<Vec<CandidateRecord>> {
        Ok(lock(&self.document)?.candidates_for_job(job_id))
    }

    fn save_parsing(&self, record: ParsingRecord) -> Result<i64> {
        Ok(lock(&self.document)?.save_parsing(record))
    }

    fn update_candidate_score(&self, candidate_id: i64, score: f32) -> Result<()> {
        lock(&self.document)?.update_candidate_score(candidate_id, score)
    }

    fn register_candidate(&self, candidate: CandidateRecord) -> Result<()> {
        lock(&self.document)?.register_candidate(candidate);
        Ok(())
    }

    fn add_job(&self, job: JobProfile) -> Result<()> {
        lock(&self.document)?.add_job(job);
        Ok(())
    }

    fn candidate(&self, candidate_id: i64) -> Result<Option<CandidateRecord>> {
        Ok(lock(&self.document)?.candidate(candidate_id))
    }

    fn parsing_for_candidate(&self, candidate_id: i64) -> Result<Option<ParsingRecord>> {
        Ok(lock(&self.document)?.parsing_for_candidate(candidate_id))
    }
}

/// JSON document on disk, rewritten atomically after every mutation
pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<StoreDocument>,
}

impl JsonFileStore {
    /// Open an existing store file, or start an empty one at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let document = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            if content.trim().is_empty() {
                StoreDocument::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            StoreDocument::default()
        };

        debug!(
            "Opened store {} ({} jobs, {} candidates)",
            path.display(),
            document.jobs.len(),
            document.candidates.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut StoreDocument) -> Result<T>) -> Result<T> {
        let mut document = lock(&self.document)?;
        let mut updated = document.clone();
        let value = f(&mut updated)?;
        self.write(&updated)?;
        *document = updated;
        Ok(value)
    }

    fn write(&self, document: &StoreDocument) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let mut file = tempfile::NamedTempFile::new_in(&parent)?;
        serde_json::to_writer_pretty(&mut file, document)?;
        file.flush()?;
        file.persist(&self.path).map_err(|e| {
            ResumeScorerError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}

impl CandidateStore for JsonFileStore {
    fn job(&self, job_id: i64) -> Result<Option<JobProfile>> {
        Ok(lock(&self.document)?.job(job_id))
    }

    fn candidates_for_job(&self, job_id: i64) -> Result<Vec<CandidateRecord>> {
        Ok(lock(&self.document)?.candidates_for_job(job_id))
    }

    fn save_parsing(&self, record: ParsingRecord) -> Result<i64> {
        self.mutate(|doc| Ok(doc.save_parsing(record)))
    }

    fn update_candidate_score(&self, candidate_id: i64, score: f32) -> Result<()> {
        self.mutate(|doc| doc.update_candidate_score(candidate_id, score))
    }

    fn register_candidate(&self, candidate: CandidateRecord) -> Result<()> {
        self.mutate(|doc| {
            doc.register_candidate(candidate);
            Ok(())
        })
    }

    fn add_job(&self, job: JobProfile) -> Result<()> {
        self.mutate(|doc| {
            doc.add_job(job);
            Ok(())
        })
    }

    fn candidate(&self, candidate_id: i64) -> Result<Option<CandidateRecord>> {
        Ok(lock(&self.document)?.candidate(candidate_id))
    }

    fn parsing_for_candidate(&self, candidate_id: i64) -> Result<Option<ParsingRecord>> {
        Ok(lock(&self.document)?.parsing_for_candidate(candidate_id))
    }
}
