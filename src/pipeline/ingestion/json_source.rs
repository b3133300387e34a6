use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::DEFAULT_ENCODINGS;
use crate::error::Result;
use crate::pipeline::ingestion::decode::read_text;
use crate::types::{CandidateSource, RawCandidate};

/// Parse a JSON array of candidate objects
pub fn parse_candidates(text: &str) -> Result<Vec<RawCandidate>> {
    let candidates: Vec<RawCandidate> = serde_json::from_str(text)?;
    debug!("Parsed {} JSON candidates", candidates.len());
    Ok(candidates)
}

/// Candidates from a JSON dump produced by one of the scrapers
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    label: String,
    encodings: Vec<String>,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            label: path.display().to_string(),
            path,
            encodings: DEFAULT_ENCODINGS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn with_encodings(mut self, encodings: Vec<String>) -> Self {
        self.encodings = encodings;
        self
    }
}

impl CandidateSource for JsonFileSource {
    fn source_name(&self) -> &str {
        &self.label
    }

    fn fetch_candidates(&self) -> Result<Vec<RawCandidate>> {
        let text = read_text(&self.path, &self.encodings)?;
        // utf-8 keeps a leading BOM, which serde_json rejects
        parse_candidates(text.trim_start_matches('\u{feff}'))
    }
}
