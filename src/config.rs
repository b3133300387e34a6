use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{CONFIG_ENV_VAR, DEFAULT_ENCODINGS};
use crate::error::{Result, RosterError};
use crate::pipeline::processing::reference::{MatchMode, ReferenceTable};
use crate::types::SourceKind;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub reference: ReferenceConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceKind,
    pub match_mode: MatchMode,
    /// Date ages are computed against; today when unset
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub encodings: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            encodings: DEFAULT_ENCODINGS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub include_header: bool,
    pub include_profile_url: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_header: true,
            include_profile_url: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// TOML file of `[[rider]]` entries replacing the built-in table
    pub path: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            RosterError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&config_content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.input.encodings.is_empty() {
            return Err(RosterError::Config(
                "input.encodings must name at least one encoding".to_string(),
            ));
        }
        Ok(config)
    }

    /// Config from an explicit path, else from the file named by
    /// `CYCLIST_ROSTER_CONFIG` (a `.env` file is honoured), else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        dotenv::dotenv().ok();
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(path.trim())),
            _ => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn reference_table(&self) -> Result<ReferenceTable> {
        match &self.reference.path {
            Some(path) => ReferenceTable::load(path),
            None => Ok(ReferenceTable::builtin()),
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.pipeline
            .as_of
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.pipeline.source, SourceKind::Ranking);
        assert_eq!(config.pipeline.match_mode, MatchMode::Substring);
        assert_eq!(config.input.encodings.len(), DEFAULT_ENCODINGS.len());
        assert!(config.output.include_header);
        assert!(!config.output.include_profile_url);
        assert!(config.reference.path.is_none());
    }

    #[test]
    fn test_sections_are_parsed() {
        let config = Config::from_toml_str(
            r#"
            [pipeline]
            source = "rider-stats"
            match_mode = "exact"
            as_of = "2026-01-01"

            [input]
            encodings = ["windows-1252"]

            [output]
            include_header = false
            include_profile_url = true
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.source, SourceKind::RiderStats);
        assert_eq!(config.pipeline.match_mode, MatchMode::Exact);
        assert_eq!(config.as_of(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(config.input.encodings, vec!["windows-1252".to_string()]);
        assert!(!config.output.include_header);
        assert!(config.output.include_profile_url);
    }

    #[test]
    fn test_empty_encoding_list_is_rejected() {
        let err = Config::from_toml_str("[input]\nencodings = []").unwrap_err();
        assert!(matches!(err, RosterError::Config(_)));
    }

    #[test]
    fn test_unknown_source_is_a_toml_error() {
        let err = Config::from_toml_str("[pipeline]\nsource = \"radio\"").unwrap_err();
        assert!(matches!(err, RosterError::Toml(_)));
    }

    #[test]
    fn test_load_from_file_and_reference_path() {
        let mut reference = NamedTempFile::new().unwrap();
        writeln!(
            reference,
            "[[rider]]\nname = \"Ben Healy\"\nteam = \"EF\"\nnationality = \"Ireland\"\nranking = 21\ncategory = \"CLIMBER\"\nprice = 8.0"
        )
        .unwrap();

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[reference]\npath = {:?}",
            reference.path().to_string_lossy()
        )
        .unwrap();

        let config = Config::resolve(Some(file.path())).unwrap();
        let table = config.reference_table().unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, RosterError::Config(_)));
    }
}
