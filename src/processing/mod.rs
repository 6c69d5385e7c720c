//! Field extraction and similarity scoring

pub mod document;
pub mod education;
pub mod embedding_manager;
pub mod embeddings;
pub mod experience;
pub mod fields;
pub mod phrases;
pub mod scorer;
pub mod skill_matcher;
pub mod text_processor;

pub use embeddings::{Embedder, EmbeddingEngine, HashingEmbedder};
pub use fields::FieldExtractor;
pub use scorer::SimilarityScorer;
