//! Batch scoring over a candidate store

pub mod runner;
pub mod store;

pub use runner::{resolve_resume_path, BatchRunner};
pub use store::{CandidateStore, JsonFileStore, MemoryStore};
