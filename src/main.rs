//! resume-scorer: resume field extraction and resume-to-job match scoring

use clap::Parser;
use colored::Colorize;
use log::{error, info, warn};
use resume_scorer::batch::{BatchRunner, CandidateStore, JsonFileStore};
use resume_scorer::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use resume_scorer::config::{Config, OutputFormat};
use resume_scorer::input::InputManager;
use resume_scorer::output::{save_report_to_file, MatchReport, ReportGenerator};
use resume_scorer::processing::embedding_manager::EmbeddingModelManager;
use resume_scorer::processing::{
    Embedder, EmbeddingEngine, FieldExtractor, HashingEmbedder, SimilarityScorer,
};
use resume_scorer::{Result, ResumeScorerError};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

const RESUME_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Score { resume, job, detailed, output, save } => {
            cli::validate_file_extension(&resume, &RESUME_EXTENSIONS)
                .map_err(|e| ResumeScorerError::InvalidInput(format!("Resume file: {}", e)))?;
            let format = resolve_format(output.as_deref(), &config)?;
            let job = cli::load_job_profile(&job)?;

            let mut input_manager = InputManager::new();
            let text = input_manager.try_extract(&resume).await?;
            let fields = FieldExtractor::from_config(&config).extract(&text);

            let scorer = SimilarityScorer::new(load_embedder(&config), &config);
            let result = scorer.score(0, &job, &fields, &text);

            let generator = ReportGenerator::with_options(config.output.color_output, detailed, true);
            let report = generator.match_report(
                &MatchReport { job: &job, fields: &fields, result: &result },
                &format,
            )?;
            emit(&report, save.as_deref())?;
        }

        Commands::Batch { job_id, store, detailed, output, save } => {
            let format = resolve_format(output.as_deref(), &config)?;
            config.ensure_dirs()?;
            let store = open_store(store.as_deref(), &config)?;

            let mut runner = BatchRunner::new(store, load_embedder(&config), &config)
                .with_progress(format == OutputFormat::Console);
            let summary = runner.run(job_id).await;

            let generator = ReportGenerator::with_options(config.output.color_output, detailed, true);
            emit(&generator.batch_report(&summary, &format)?, save.as_deref())?;
        }

        Commands::Ingest { candidate_id, job_id, name, resume, store } => {
            cli::validate_file_extension(&resume, &RESUME_EXTENSIONS)
                .map_err(|e| ResumeScorerError::InvalidInput(format!("Resume file: {}", e)))?;
            config.ensure_dirs()?;
            let store = open_store(store.as_deref(), &config)?;

            // Ingestion never scores, so the model is not loaded
            let mut runner = BatchRunner::new(store, Arc::new(HashingEmbedder::default()), &config);
            let record = runner.ingest(candidate_id, job_id, &name, &resume).await?;

            println!(
                "{} candidate {} ({}) for job {}",
                "Registered".green().bold(),
                candidate_id,
                name,
                job_id
            );
            println!("  Skills:     {}", record.skills_extracted.as_deref().unwrap_or("-"));
            println!("  Experience: {}", record.experience_extracted.as_deref().unwrap_or("-"));
            println!("  Education:  {}", record.education_extracted.as_deref().unwrap_or("-"));
        }

        Commands::AddJob { job, store } => {
            let job = cli::load_job_profile(&job)?;
            let store = open_store(store.as_deref(), &config)?;
            store.add_job(job.clone())?;
            println!("{} job {} ({})", "Stored".green().bold(), job.job_id, job.title);
        }

        Commands::Extract { resume, output } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let mut input_manager = InputManager::new();
            let text = input_manager.try_extract(&resume).await?;
            let fields = FieldExtractor::from_config(&config).extract(&text);

            let generator = ReportGenerator::with_options(config.output.color_output, true, true);
            println!("{}", generator.fields_report(&fields, &format)?);
        }

        Commands::Models { action } => {
            let mut manager = EmbeddingModelManager::new(config.models.models_dir.clone()).await?;
            match action {
                ModelAction::List => {
                    println!("{}", "Embedding models".bold());
                    for model in manager.list_available_models() {
                        let status = if manager.is_model_downloaded(&model.id) {
                            "downloaded".green()
                        } else {
                            "available".yellow()
                        };
                        println!(
                            "  {} ({}) - {} MB, {} dims [{}]",
                            model.id, model.repo_id, model.size_mb, model.dimensions, status
                        );
                        println!("    {}", model.description);
                    }
                    println!("\nAuto-selected: {}", manager.auto_select_model());
                }
                ModelAction::Download { model } => {
                    let model_id = manager.resolve_model_id(&model).ok_or_else(|| {
                        ResumeScorerError::ModelLoading(format!("Unknown embedding model: {}", model))
                    })?;
                    let path = manager.ensure_model_available(&model_id).await?;
                    println!("{} {} at {}", "Ready:".green().bold(), model_id, path.display());
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    ResumeScorerError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("# {}\n{}", Config::config_path().display(), content);
            }
            Some(ConfigAction::Reset) => {
                Config::default().save()?;
                println!("Configuration reset: {}", Config::config_path().display());
            }
        },
    }

    Ok(())
}

fn resolve_format(flag: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match flag {
        Some(f) => cli::parse_output_format(f).map_err(ResumeScorerError::InvalidInput),
        None => Ok(config.output.format.clone()),
    }
}

fn open_store(path: Option<&Path>, config: &Config) -> Result<Arc<dyn CandidateStore>> {
    let path: PathBuf = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.storage.store_path.clone());
    info!("Using store {}", path.display());
    Ok(Arc::new(JsonFileStore::open(&path)?))
}

/// The configured Model2Vec model, or the hashing embedder when it cannot be loaded
fn load_embedder(config: &Config) -> Arc<dyn Embedder> {
    match EmbeddingEngine::from_config(config) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            warn!("{}", e);
            warn!("Falling back to feature-hashing embeddings; semantic scores will be coarser");
            Arc::new(HashingEmbedder::default())
        }
    }
}

fn emit(content: &str, save: Option<&Path>) -> Result<()> {
    match save {
        Some(path) => {
            save_report_to_file(content, path)?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
