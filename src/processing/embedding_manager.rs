//! Catalogue and download of Model2Vec embedding models

use crate::error::{Result, ResumeScorerError};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub id: String,
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub dimensions: u32,
    pub description: String,
}

/// Preference order for auto-selection, best size/quality trade-off first
const PREFERRED_MODELS: [&str; 3] = ["potion-base-8M", "m2v-base", "m2v-large"];

const REQUIRED_FILES: [&str; 2] = ["model.safetensors", "tokenizer.json"];
const OPTIONAL_FILES: [&str; 1] = ["config.json"];

pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    catalogue: BTreeMap<String, EmbeddingModelInfo>,
    downloaded: HashSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&models_dir).await.map_err(|e| {
            ResumeScorerError::ModelLoading(format!(
                "Failed to create models directory {}: {}",
                models_dir.display(),
                e
            ))
        })?;

        let mut manager = Self {
            models_dir,
            catalogue: default_catalogue(),
            downloaded: HashSet::new(),
        };
        manager.scan_downloaded_models().await?;
        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if is_model_directory(&entry.path()).await {
                self.downloaded
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    /// Fetch a catalogued model from the Hugging Face hub into the models directory
    pub async fn download_model(&mut self, model_id: &str) -> Result<PathBuf> {
        let info = self.catalogue.get(model_id).cloned().ok_or_else(|| {
            ResumeScorerError::ModelLoading(format!("Unknown embedding model: {}", model_id))
        })?;

        let model_dir = self.models_dir.join(model_id);
        if self.downloaded.contains(model_id) {
            return Ok(model_dir);
        }

        info!("Downloading {} ({} MB) from {}", info.name, info.size_mb, info.repo_id);
        fs::create_dir_all(&model_dir).await?;

        let api = Api::new().map_err(|e| {
            ResumeScorerError::ModelLoading(format!("Failed to initialize HF API: {}", e))
        })?;
        let repo = api.model(info.repo_id.clone());

        for file in REQUIRED_FILES.iter().chain(OPTIONAL_FILES.iter()) {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                    info!("Downloaded {}", file);
                }
                Err(e) if OPTIONAL_FILES.contains(file) => {
                    warn!("Optional file {} not available: {}", file, e);
                }
                Err(e) => {
                    return Err(ResumeScorerError::ModelLoading(format!(
                        "Failed to download {} for {}: {}",
                        file, model_id, e
                    )));
                }
            }
        }

        self.downloaded.insert(model_id.to_string());
        Ok(model_dir)
    }

    pub fn model_path(&self, model_id: &str) -> Option<PathBuf> {
        self.downloaded
            .contains(model_id)
            .then(|| self.models_dir.join(model_id))
    }

    pub async fn ensure_model_available(&mut self, model_id: &str) -> Result<PathBuf> {
        match self.model_path(model_id) {
            Some(path) => Ok(path),
            None => self.download_model(model_id).await,
        }
    }

    pub fn list_available_models(&self) -> Vec<&EmbeddingModelInfo> {
        self.catalogue.values().collect()
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded.contains(model_id)
    }

    /// First downloaded model in preference order, else the recommended default
    pub fn auto_select_model(&self) -> String {
        PREFERRED_MODELS
            .iter()
            .find(|id| self.downloaded.contains(**id))
            .unwrap_or(&PREFERRED_MODELS[0])
            .to_string()
    }

    /// Accept a catalogue id, a hub repo id or a display name
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        if self.catalogue.contains_key(input) {
            return Some(input.to_string());
        }
        self.catalogue
            .values()
            .find(|info| info.repo_id == input || info.name.eq_ignore_ascii_case(input))
            .map(|info| info.id.clone())
    }
}

async fn is_model_directory(path: &Path) -> bool {
    for file in REQUIRED_FILES {
        if fs::metadata(path.join(file)).await.is_err() {
            return false;
        }
    }
    true
}

fn default_catalogue() -> BTreeMap<String, EmbeddingModelInfo> {
    [
        ("potion-base-8M", "Potion Base 8M", "minishlab/potion-base-8M", 33, 256,
         "Distilled static embeddings, recommended default"),
        ("m2v-base", "Model2Vec Base", "minishlab/M2V_base_output", 90, 256,
         "Legacy Model2Vec base model"),
        ("m2v-large", "Model2Vec Large", "minishlab/M2V_large_output", 250, 512,
         "Larger Model2Vec model for higher accuracy"),
    ]
    .into_iter()
    .map(|(id, name, repo_id, size_mb, dimensions, description)| {
        (
            id.to_string(),
            EmbeddingModelInfo {
                id: id.to_string(),
                name: name.to_string(),
                repo_id: repo_id.to_string(),
                size_mb,
                dimensions,
                description: description.to_string(),
            },
        )
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_manager_creation_scans_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();

        assert_eq!(manager.list_available_models().len(), 3);
        assert!(!manager.is_model_downloaded("potion-base-8M"));
        assert_eq!(manager.auto_select_model(), "potion-base-8M");
    }

    #[tokio::test]
    async fn test_detects_downloaded_model() {
        let temp_dir = TempDir::new().unwrap();
        let model_dir = temp_dir.path().join("m2v-base");
        std::fs::create_dir_all(&model_dir).unwrap();
        for file in REQUIRED_FILES {
            std::fs::write(model_dir.join(file), b"{}").unwrap();
        }

        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();
        assert!(manager.is_model_downloaded("m2v-base"));
        assert_eq!(manager.auto_select_model(), "m2v-base");
        assert_eq!(manager.model_path("m2v-base"), Some(model_dir));
    }

    #[tokio::test]
    async fn test_resolve_model_id() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();

        assert_eq!(manager.resolve_model_id("potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(
            manager.resolve_model_id("minishlab/potion-base-8M"),
            Some("potion-base-8M".to_string())
        );
        assert_eq!(manager.resolve_model_id("potion base 8m"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("gpt-4"), None);
    }
}
