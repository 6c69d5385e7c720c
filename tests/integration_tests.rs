//! Integration tests for the resume scorer

use resume_scorer::batch::{BatchRunner, CandidateStore, JsonFileStore, MemoryStore};
use resume_scorer::cli::load_job_profile;
use resume_scorer::input::InputManager;
use resume_scorer::models::{BatchStatus, CandidateRecord, JobProfile};
use resume_scorer::processing::{FieldExtractor, HashingEmbedder};
use resume_scorer::{Config, ResumeScorerError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn scenario_job() -> JobProfile {
    load_job_profile(&fixture("job.toml")).unwrap()
}

fn candidate(candidate_id: i64, job_id: i64, resume_file: Option<&str>) -> CandidateRecord {
    CandidateRecord {
        candidate_id,
        job_id,
        name: format!("Candidate {}", candidate_id),
        resume_file: resume_file.map(str::to_string),
        ai_score: None,
    }
}

fn runner(store: Arc<dyn CandidateStore>, uploads: &Path) -> BatchRunner {
    BatchRunner::new(store, Arc::new(HashingEmbedder::default()), &Config::default())
        .with_uploads_dir(uploads.to_path_buf())
}

/// Uploads directory holding copies of the named fixtures
fn uploads_with(files: &[&str]) -> TempDir {
    let uploads = TempDir::new().unwrap();
    for name in files {
        std::fs::copy(fixture(name), uploads.path().join(name)).unwrap();
    }
    uploads
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let mut manager = InputManager::new();
    let text = manager.extract_text(&fixture("sample_resume.txt")).await;

    assert!(text.contains("Jane Doe"));
    assert!(text.contains("Kubernetes"));
    assert!(!text.contains('\r'));
}

#[tokio::test]
async fn test_text_extraction_from_docx() {
    let mut manager = InputManager::new();
    let text = manager.extract_text(&fixture("sample_resume.docx")).await;

    assert!(text.contains("John Roe, Z\u{fc}rich"));
    assert!(text.contains("Feb 2020 \u{2013} Feb 2023"));
    assert!(text.contains("Python & Spark"));
    assert!(text.lines().any(|l| l.trim() == "SKILLS"));
    assert!(!text.contains("<w:"));
}

#[tokio::test]
async fn test_text_extraction_from_pdf() {
    let mut manager = InputManager::new();
    let text = manager.extract_text(&fixture("sample_resume.pdf")).await;

    assert!(!text.trim().is_empty());
    assert!(text.contains("Python"));
}

#[tokio::test]
async fn test_corrupt_files_yield_empty_text() {
    let mut manager = InputManager::new();
    assert_eq!(manager.extract_text(&fixture("corrupt.pdf")).await, "");
    assert_eq!(manager.extract_text(&fixture("corrupt.docx")).await, "");
    assert_eq!(manager.extract_text(&fixture("nonexistent.txt")).await, "");
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let mut manager = InputManager::new();
    let path = fixture("unsupported.xyz");

    assert_eq!(manager.extract_text(&path).await, "");
    assert!(matches!(
        manager.try_extract(&path).await,
        Err(ResumeScorerError::UnsupportedFormat(_))
    ));
}

#[tokio::test]
async fn test_caching_functionality() {
    let mut manager = InputManager::new();
    let path = fixture("sample_resume.txt");

    let first = manager.extract_text(&path).await;
    assert_eq!(manager.cache_size(), 1);
    let second = manager.extract_text(&path).await;
    assert_eq!(first, second);
    assert_eq!(manager.cache_size(), 1);

    let mut uncached = InputManager::new().with_cache(false);
    uncached.extract_text(&path).await;
    assert_eq!(uncached.cache_size(), 0);
}

#[tokio::test]
async fn test_field_extraction_from_txt_resume() {
    let text = InputManager::new()
        .extract_text(&fixture("sample_resume.txt"))
        .await;
    let fields = FieldExtractor::default().extract(&text);

    let skills = fields.skills.unwrap();
    for expected in ["Python", "Docker", "PostgreSQL", "Kubernetes", "Terraform", "AWS"] {
        assert!(skills.contains(expected), "missing {} in {}", expected, skills);
    }
    assert_eq!(fields.experience.as_deref(), Some("5.2 years"));
    assert_eq!(fields.education.as_deref(), Some("Bachelor's"));
}

#[tokio::test]
async fn test_field_extraction_from_docx_resume() {
    let text = InputManager::new()
        .extract_text(&fixture("sample_resume.docx"))
        .await;
    let fields = FieldExtractor::default().extract(&text);

    let skills = fields.skills.unwrap();
    assert!(skills.contains("Spark"));
    assert!(skills.contains("Airflow"));
    assert_eq!(fields.experience.as_deref(), Some("3.0 years"));
    assert_eq!(fields.education.as_deref(), Some("Master's"));
}

#[tokio::test]
async fn test_batch_scores_and_ranks_candidates() {
    let uploads = uploads_with(&["scenario_resume.txt", "sample_resume.txt", "empty_resume.txt"]);
    let store = Arc::new(MemoryStore::new());
    store.add_job(scenario_job()).unwrap();
    store
        .register_candidate(candidate(1, 1, Some("http://localhost:8000/uploads/scenario_resume.txt")))
        .unwrap();
    store.register_candidate(candidate(2, 1, Some("sample_resume.txt"))).unwrap();
    store.register_candidate(candidate(3, 1, Some("missing.pdf"))).unwrap();
    store.register_candidate(candidate(4, 1, Some("empty_resume.txt"))).unwrap();
    store.register_candidate(candidate(5, 1, None)).unwrap();

    let mut runner = runner(store.clone(), uploads.path());
    let summary = runner.run(1).await;

    assert_eq!(summary.status, BatchStatus::Completed);
    assert_eq!(summary.processed_candidates, 2);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.results.len(), 2);
    assert_eq!(summary.results[0].rank, Some(1));
    assert_eq!(summary.results[1].rank, Some(2));
    assert!(summary.results[0].final_score >= summary.results[1].final_score);

    let scenario = summary
        .results
        .iter()
        .find(|r| r.candidate_id == 1)
        .unwrap();
    assert_eq!(scenario.experience_score, 1.0);
    assert!((scenario.keyword_coverage - 2.0 / 3.0).abs() < 1e-6);
    assert!(scenario.matched_skills.contains(&"Python".to_string()));
    assert!(scenario.matched_skills.contains(&"Docker".to_string()));
    assert!(!scenario.matched_skills.contains(&"SQL".to_string()));
    assert!((0.0..=100.0).contains(&scenario.final_score));

    let stored = store.candidate(1).unwrap().unwrap();
    assert_eq!(stored.ai_score, Some(scenario.final_score));
    let parsing = store.parsing_for_candidate(1).unwrap().unwrap();
    assert_eq!(parsing.experience_extracted.as_deref(), Some("5 years"));
    assert_eq!(parsing.ai_score, Some(scenario.final_score));

    assert_eq!(store.candidate(3).unwrap().unwrap().ai_score, None);
    assert!(store.parsing_for_candidate(4).unwrap().is_none());
}

#[tokio::test]
async fn test_batch_rerun_is_idempotent() {
    let uploads = uploads_with(&["scenario_resume.txt", "sample_resume.txt"]);
    let store = Arc::new(MemoryStore::new());
    store.add_job(scenario_job()).unwrap();
    store.register_candidate(candidate(1, 1, Some("scenario_resume.txt"))).unwrap();
    store.register_candidate(candidate(2, 1, Some("sample_resume.txt"))).unwrap();

    let mut runner = runner(store.clone(), uploads.path());
    let first = runner.run(1).await;
    let first_parsing = store.parsing_for_candidate(2).unwrap().unwrap();
    let second = runner.run(1).await;
    let second_parsing = store.parsing_for_candidate(2).unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(first_parsing, second_parsing);
}

#[tokio::test]
async fn test_batch_terminal_statuses() {
    let uploads = TempDir::new().unwrap();
    let store = Arc::new(MemoryStore::new());
    store.add_job(scenario_job()).unwrap();

    let mut runner = runner(store, uploads.path());

    let missing = runner.run(99).await;
    assert_eq!(missing.status, BatchStatus::JobNotFound);
    assert!(missing.results.is_empty());

    let empty = runner.run(1).await;
    assert_eq!(empty.status, BatchStatus::NoCandidates);
    assert_eq!(empty.processed_candidates, 0);
}

#[tokio::test]
async fn test_ingest_then_batch_with_json_store() {
    let workspace = TempDir::new().unwrap();
    let uploads = workspace.path().join("uploads");
    let store_path = workspace.path().join("store.json");

    {
        let store: Arc<dyn CandidateStore> = Arc::new(JsonFileStore::open(&store_path).unwrap());
        store.add_job(scenario_job()).unwrap();

        let mut runner = runner(store.clone(), &uploads);
        let record = runner
            .ingest(10, 1, "Jane Doe", &fixture("sample_resume.txt"))
            .await
            .unwrap();

        assert!(record.parsing_id > 0);
        assert!(record.skills_extracted.as_deref().unwrap_or("").contains("Python"));
        let stored_name = store.candidate(10).unwrap().unwrap().resume_file.unwrap();
        assert!(stored_name.starts_with("10_"));
        assert!(stored_name.ends_with("_sample_resume.txt"));
        assert!(uploads.join(&stored_name).exists());

        let unknown_job = runner
            .ingest(11, 42, "Nobody", &fixture("sample_resume.txt"))
            .await;
        assert!(matches!(unknown_job, Err(ResumeScorerError::JobNotFound(42))));

        let unsupported = runner
            .ingest(12, 1, "Nobody", &fixture("unsupported.xyz"))
            .await;
        assert!(matches!(unsupported, Err(ResumeScorerError::UnsupportedFormat(_))));
    }

    let store: Arc<dyn CandidateStore> = Arc::new(JsonFileStore::open(&store_path).unwrap());
    let registered = store.candidate(10).unwrap().unwrap();
    assert!(registered
        .resume_file
        .as_deref()
        .is_some_and(|f| f.ends_with("_sample_resume.txt")));
    assert!(store.candidate(11).unwrap().is_none());

    let mut runner = runner(store.clone(), &uploads);
    let summary = runner.run(1).await;
    assert_eq!(summary.status, BatchStatus::Completed);
    assert_eq!(summary.processed_candidates, 1);
    assert!(store.candidate(10).unwrap().unwrap().ai_score.is_some());
}

#[tokio::test]
async fn test_same_named_uploads_stay_with_their_candidates() {
    let sources = TempDir::new().unwrap();
    let uploads = TempDir::new().unwrap();
    for (dir, body) in [
        ("a", "Alice Able\nPython developer, 4 years of experience\n"),
        ("b", "Bob Baker\nDocker administrator\n"),
    ] {
        std::fs::create_dir_all(sources.path().join(dir)).unwrap();
        std::fs::write(sources.path().join(dir).join("resume.txt"), body).unwrap();
    }

    let store = Arc::new(MemoryStore::new());
    store.add_job(scenario_job()).unwrap();
    let mut runner = runner(store.clone(), uploads.path());
    runner
        .ingest(1, 1, "Alice", &sources.path().join("a").join("resume.txt"))
        .await
        .unwrap();
    runner
        .ingest(2, 1, "Bob", &sources.path().join("b").join("resume.txt"))
        .await
        .unwrap();

    let first = store.candidate(1).unwrap().unwrap().resume_file;
    let second = store.candidate(2).unwrap().unwrap().resume_file;
    assert_ne!(first, second);

    let summary = runner.run(1).await;
    assert_eq!(summary.processed_candidates, 2);

    let alice = store.parsing_for_candidate(1).unwrap().unwrap();
    let bob = store.parsing_for_candidate(2).unwrap().unwrap();
    assert!(alice.parsed_text.unwrap().contains("Alice Able"));
    assert!(bob.parsed_text.unwrap().contains("Bob Baker"));
}

#[tokio::test]
async fn test_empty_resume_scores_zero() {
    let job = scenario_job();
    let fields = FieldExtractor::default().extract("");
    let scorer = resume_scorer::processing::SimilarityScorer::new(
        Arc::new(HashingEmbedder::default()),
        &Config::default(),
    );
    let result = scorer.score(1, &job, &fields, "");

    assert_eq!(fields.skills, None);
    assert_eq!(fields.experience.as_deref(), Some("0"));
    assert_eq!(fields.education, None);
    assert_eq!(result.final_score, 0.0);
}
