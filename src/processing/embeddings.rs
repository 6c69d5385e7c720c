//! Embeddings generation using Model2Vec

use crate::config::{Config, PoolingStrategy};
use crate::error::{Result, ResumeScorerError};
use log::{info, warn};
use model2vec_rs::model::StaticModel;
use ndarray::{Array2, Axis};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

/// Text to vector encoder shared read-only by the scorer
pub trait Embedder: Send + Sync {
    /// One vector per input text, in input order
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str;
}

pub struct EmbeddingEngine {
    model: StaticModel,
    cache: Mutex<HashMap<String, Vec<f32>>>,
    model_name: String,
}

impl EmbeddingEngine {
    pub fn new(model_path: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(model_path, None, None, None).map_err(|e| {
            ResumeScorerError::ModelLoading(format!(
                "Failed to load model from {}: {}",
                model_path.display(),
                e
            ))
        })?;

        info!("Model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            cache: Mutex::new(HashMap::new()),
            model_name: model_name.to_string(),
        })
    }

    /// Load the configured default model from the models directory
    pub fn from_config(config: &Config) -> Result<Self> {
        let model_name = &config.models.default_embedding_model;
        let model_path = config.models.models_dir.join(model_name);
        if !model_path.exists() {
            return Err(ResumeScorerError::ModelLoading(format!(
                "Model {} not found in {}. Run `resume-scorer models download {}` first.",
                model_name,
                config.models.models_dir.display(),
                model_name
            )));
        }
        Self::new(&model_path, model_name)
    }

    pub fn cache_size(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

impl Embedder for EmbeddingEngine {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| ResumeScorerError::Embedding("Embedding cache poisoned".to_string()))?;

        let uncached: Vec<String> = texts
            .iter()
            .filter(|t| !cache.contains_key(*t))
            .cloned()
            .collect();

        if !uncached.is_empty() {
            // The tokenizer panics on some inputs instead of returning an error
            let embeddings = panic::catch_unwind(AssertUnwindSafe(|| self.model.encode(&uncached)))
                .map_err(|_| ResumeScorerError::Embedding("Model2Vec encoding panicked".to_string()))?;

            if embeddings.len() != uncached.len() {
                return Err(ResumeScorerError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    uncached.len(),
                    embeddings.len()
                )));
            }
            for (text, embedding) in uncached.into_iter().zip(embeddings) {
                cache.insert(text, embedding);
            }
        }

        texts
            .iter()
            .map(|t| {
                cache.get(t).cloned().ok_or_else(|| {
                    ResumeScorerError::Embedding("Embedding missing from cache".to_string())
                })
            })
            .collect()
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Feature-hashing bag of words. Deterministic and model-free; texts sharing
/// vocabulary land close together.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        let tokens = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
            .filter(|t| !t.is_empty());

        for token in tokens {
            let hash = fnv1a(token.as_bytes());
            let index = (hash % self.dimensions as u64) as usize;
            // High bit picks the sign so collisions partly cancel
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn model_name(&self) -> &str {
        "feature-hashing"
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf29ce484222325u64, |hash, b| {
        (hash ^ *b as u64).wrapping_mul(0x100000001b3)
    })
}

/// Cosine similarity; 0 for empty, zero-norm or mismatched vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Overlapping windows of `size` words, `stride` words apart. The last window
/// always reaches the end of the text.
pub fn chunk_words(text: &str, size: usize, stride: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    let size = size.max(1);
    let stride = stride.clamp(1, size);

    if words.len() <= size {
        return vec![words.join(" ")];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += stride;
    }
    chunks
}

/// Element-wise mean of equally sized vectors
pub fn mean_pool(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
    let dims = vectors.first()?.len();
    if dims == 0 || vectors.iter().any(|v| v.len() != dims) {
        return None;
    }

    let flat: Vec<f32> = vectors.iter().flatten().copied().collect();
    let matrix = Array2::from_shape_vec((vectors.len(), dims), flat).ok()?;
    matrix.mean_axis(Axis(0)).map(|m| m.to_vec())
}

/// Text-to-text similarity over an injected embedder, with chunking of long
/// candidate text
pub struct SemanticSimilarity<'a> {
    embedder: &'a dyn Embedder,
    chunk_words: usize,
    chunk_stride: usize,
    pooling: PoolingStrategy,
}

impl<'a> SemanticSimilarity<'a> {
    pub fn new(embedder: &'a dyn Embedder, config: &Config) -> Self {
        Self {
            embedder,
            chunk_words: config.processing.chunk_words,
            chunk_stride: config.processing.chunk_stride,
            pooling: config.processing.pooling,
        }
    }

    /// Similarity in [0, 1]; 0 when either side is empty or embedding fails
    pub fn similarity(&self, reference: &str, candidate: &str) -> f32 {
        if reference.trim().is_empty() || candidate.trim().is_empty() {
            return 0.0;
        }

        match self.try_similarity(reference, candidate) {
            Ok(score) if score.is_finite() => score.clamp(0.0, 1.0),
            Ok(_) => 0.0,
            Err(e) => {
                warn!("Similarity computation failed: {}", e);
                0.0
            }
        }
    }

    fn try_similarity(&self, reference: &str, candidate: &str) -> Result<f32> {
        let chunks = chunk_words(candidate, self.chunk_words, self.chunk_stride);
        let mut texts = Vec::with_capacity(chunks.len() + 1);
        texts.push(reference.to_string());
        texts.extend(chunks);

        let embeddings = self.embedder.embed(&texts)?;
        let (reference_vec, chunk_vecs) = embeddings
            .split_first()
            .ok_or_else(|| ResumeScorerError::Embedding("No embeddings returned".to_string()))?;

        let score = match self.pooling {
            PoolingStrategy::MaxOverChunks => chunk_vecs
                .iter()
                .map(|chunk| cosine_similarity(reference_vec, chunk))
                .fold(0.0f32, f32::max),
            PoolingStrategy::Mean => {
                let pooled = mean_pool(chunk_vecs).ok_or_else(|| {
                    ResumeScorerError::Embedding("Chunk embeddings have inconsistent dimensions".to_string())
                })?;
                cosine_similarity(reference_vec, &pooled)
            }
        };

        Ok(score)
    }
}
