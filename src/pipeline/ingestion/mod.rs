// Pipeline ingestion: file decoding and candidate sources

pub mod csv_source;
pub mod decode;
pub mod json_source;

pub use csv_source::CsvFileSource;
pub use json_source::JsonFileSource;

use crate::error::Result;
use crate::types::{CandidateSource, RawCandidate};

/// Candidates held in memory, for tests and embedding callers
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    label: String,
    candidates: Vec<RawCandidate>,
}

impl InMemorySource {
    pub fn new(label: impl Into<String>, candidates: Vec<RawCandidate>) -> Self {
        Self {
            label: label.into(),
            candidates,
        }
    }
}

impl CandidateSource for InMemorySource {
    fn source_name(&self) -> &str {
        &self.label
    }

    fn fetch_candidates(&self) -> Result<Vec<RawCandidate>> {
        Ok(self.candidates.clone())
    }
}
