//! CLI interface for the resume scorer

use crate::config::OutputFormat;
use crate::error::{Result, ResumeScorerError};
use crate::models::JobProfile;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-scorer")]
#[command(about = "Resume field extraction and resume-to-job match scoring")]
#[command(long_about = "Extract skills, experience and education from PDF/DOCX/TXT resumes and rank candidates against a job using embedding similarity and keyword scoring")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one resume against a job description file
    Score {
        /// Path to resume file (PDF, DOCX, TXT)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job profile (TOML or JSON)
        #[arg(short, long)]
        job: PathBuf,

        /// Include extracted fields in the output
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Score every candidate of a stored job
    Batch {
        /// Job identifier in the store
        #[arg(long)]
        job_id: i64,

        /// Store file (defaults to the configured store)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Show per-component scores
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Store a resume for a candidate and parse it
    Ingest {
        #[arg(long)]
        candidate_id: i64,

        #[arg(long)]
        job_id: i64,

        /// Candidate display name
        #[arg(long)]
        name: String,

        /// Path to resume file (PDF, DOCX, TXT)
        #[arg(short, long)]
        resume: PathBuf,

        /// Store file (defaults to the configured store)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Add or replace a job in the store from a TOML or JSON profile
    AddJob {
        /// Path to job profile (TOML or JSON)
        #[arg(short, long)]
        job: PathBuf,

        /// Store file (defaults to the configured store)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Print the fields extracted from a resume
    Extract {
        /// Path to resume file (PDF, DOCX, TXT)
        resume: PathBuf,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Embedding model management
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List catalogued embedding models
    List,

    /// Download an embedding model from the Hugging Face hub
    Download {
        /// Model id, repo id or name
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

pub fn parse_output_format(format: &str) -> std::result::Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> std::result::Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if allowed_extensions.contains(&ext.to_lowercase().as_str()) => Ok(()),
        Some(ext) => Err(format!(
            "Unsupported file extension: .{}. Allowed: {}",
            ext,
            allowed_extensions.join(", ")
        )),
        None => Err("File has no extension".to_string()),
    }
}

/// Read a job profile from a `.toml` or `.json` file
pub fn load_job_profile(path: &Path) -> Result<JobProfile> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("toml") => toml::from_str(&content).map_err(|e| {
            ResumeScorerError::InvalidInput(format!("Invalid job profile {}: {}", path.display(), e))
        }),
        _ => Err(ResumeScorerError::InvalidInput(format!(
            "Job profile must be .toml or .json: {}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_batch_command() {
        let cli = Cli::parse_from(["resume-scorer", "--verbose", "batch", "--job-id", "7", "-o", "json"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Batch { job_id, output, .. } => {
                assert_eq!(job_id, 7);
                assert_eq!(output.as_deref(), Some("json"));
            }
            _ => panic!("expected batch command"),
        }
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("MD"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        let allowed = ["pdf", "docx", "txt"];
        assert!(validate_file_extension(Path::new("cv.PDF"), &allowed).is_ok());
        assert!(validate_file_extension(Path::new("cv.odt"), &allowed).is_err());
        assert!(validate_file_extension(Path::new("cv"), &allowed).is_err());
    }

    #[test]
    fn test_load_job_profile_toml() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("job.toml");
        std::fs::write(
            &path,
            "job_id = 3\ntitle = \"Data Engineer\"\nrequirements = \"Python, Spark\"\n\n[weights]\nskills = 0.5\nexperience = 0.2\neducation = 0.1\nfull_text = 0.2\n",
        )
        .unwrap();

        let job = load_job_profile(&path).unwrap();
        assert_eq!(job.job_id, 3);
        assert_eq!(job.description, "");
        assert_eq!(job.weights.map(|w| w.skills), Some(0.5));
    }
}
