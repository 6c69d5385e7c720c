//! Configuration management for the resume scorer

use crate::error::{Result, ResumeScorerError};
use crate::models::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub processing: ProcessingConfig,
    pub experience: ExperienceConfig,
    pub scoring: ScoringConfig,
    pub storage: StorageConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub default_embedding_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Words per embedding window
    pub chunk_words: usize,
    /// Words between window starts; smaller than `chunk_words` means overlap
    pub chunk_stride: usize,
    pub pooling: PoolingStrategy,
    pub enable_phrase_analysis: bool,
    pub phrase_char_limit: usize,
    pub max_phrase_tokens: usize,
    pub header_max_len: usize,
    pub min_education_section_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolingStrategy {
    MaxOverChunks,
    Mean,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceConfig {
    pub max_range_months: u32,
    pub max_plausible_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub default_weights: ScoreWeights,
    pub semantic_skill_share: f32,
    pub coverage_bonus_threshold: f32,
    pub coverage_bonus_points: f32,
    pub default_required_years: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub uploads_dir: PathBuf,
    pub store_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-scorer");

        Self {
            models: ModelConfig {
                models_dir: base_dir.join("models"),
                default_embedding_model: "potion-base-8M".to_string(),
            },
            processing: ProcessingConfig {
                chunk_words: 400,
                chunk_stride: 200,
                pooling: PoolingStrategy::MaxOverChunks,
                enable_phrase_analysis: true,
                phrase_char_limit: 5000,
                max_phrase_tokens: 4,
                header_max_len: 50,
                min_education_section_len: 20,
            },
            experience: ExperienceConfig {
                max_range_months: 120,
                max_plausible_years: 40,
            },
            scoring: ScoringConfig {
                default_weights: ScoreWeights::default(),
                semantic_skill_share: 0.7,
                coverage_bonus_threshold: 0.8,
                coverage_bonus_points: 5.0,
                default_required_years: 1.0,
            },
            storage: StorageConfig {
                uploads_dir: base_dir.join("uploads"),
                store_path: base_dir.join("store.json"),
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ResumeScorerError::Configuration(format!("Failed to parse config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ResumeScorerError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-scorer")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.processing;
        if p.chunk_words == 0 {
            return Err(ResumeScorerError::Configuration(
                "processing.chunk_words must be positive".to_string(),
            ));
        }
        if p.chunk_stride == 0 || p.chunk_stride > p.chunk_words {
            return Err(ResumeScorerError::Configuration(format!(
                "processing.chunk_stride must be in 1..={}, got {}",
                p.chunk_words, p.chunk_stride
            )));
        }

        let s = &self.scoring;
        if !(0.0..=1.0).contains(&s.semantic_skill_share) {
            return Err(ResumeScorerError::Configuration(
                "scoring.semantic_skill_share must be within [0, 1]".to_string(),
            ));
        }
        if s.default_weights.has_negative() {
            return Err(ResumeScorerError::Configuration(
                "scoring.default_weights must not be negative".to_string(),
            ));
        }

        Ok(())
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.models.models_dir)?;
        std::fs::create_dir_all(&self.storage.uploads_dir)?;
        if let Some(parent) = self.storage.store_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.processing.chunk_words, 400);
        assert_eq!(config.processing.pooling, PoolingStrategy::MaxOverChunks);
    }

    #[test]
    fn test_rejects_bad_stride() {
        let mut config = Config::default();
        config.processing.chunk_stride = 0;
        assert!(config.validate().is_err());

        config.processing.chunk_stride = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_keeps_weights() {
        let mut config = Config::default();
        config.scoring.default_weights.skills = 2.5;

        let text = toml::to_string_pretty(&config).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, text).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.scoring.default_weights.skills, 2.5);
    }
}
