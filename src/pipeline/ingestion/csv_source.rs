use csv::StringRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::{DEFAULT_ENCODINGS, PROFILE_FIELD, ROSTER_FIELDS};
use crate::error::Result;
use crate::pipeline::ingestion::decode::read_text;
use crate::pipeline::processing::classify::normalize_tag;
use crate::types::{CandidateSource, RawCandidate, SpecialtyPoints};

/// How far into a file to look for the `;` delimiter
const DELIMITER_SNIFF_CHARS: usize = 1024;

/// Column aliases, consulted in order; the first header present wins
const NAME_COLUMNS: &[&str] = &["Nome", "name", "Name", "nome"];
const TEAM_COLUMNS: &[&str] = &["Equipa", "team", "Team", "equipa"];
const RANKING_COLUMNS: &[&str] = &["UCI Ranking", "Ranking", "ranking", "UCI", "uci_ranking"];
const PROFILE_COLUMNS: &[&str] = &["Link", "URL", "url", "profile_url"];
const NATIONALITY_COLUMNS: &[&str] = &["Nacionalidade", "nationality", "Nationality"];
const BIRTHDATE_COLUMNS: &[&str] = &["birthdate", "Birthdate", "born"];
const AGE_COLUMNS: &[&str] = &["age", "Age", "Idade"];
const LINK_TITLE_COLUMNS: &[&str] = &["title", "link_title"];
const FIRST_NAME_COLUMNS: &[&str] = &["first_name"];
const LAST_NAME_COLUMNS: &[&str] = &["last_name"];

/// Specialty tags recognised as point columns, after tag normalization
const SPECIALTY_TAGS: &[&str] = &["sprint", "climber", "gc", "one-day-races", "hills", "time-trial"];

/// `;` if it appears near the top of the file, `,` otherwise
pub fn detect_delimiter(text: &str) -> u8 {
    if text.chars().take(DELIMITER_SNIFF_CHARS).any(|c| c == ';') {
        b';'
    } else {
        b','
    }
}

/// Resolved column positions for one file
#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    first_name: Option<usize>,
    last_name: Option<usize>,
    team: Option<usize>,
    ranking: Option<usize>,
    profile: Option<usize>,
    nationality: Option<usize>,
    birthdate: Option<usize>,
    age: Option<usize>,
    link_title: Option<usize>,
    specialties: Vec<(String, usize)>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            let header = header.trim_start_matches('\u{feff}').trim();
            positions.entry(header.to_string()).or_insert(idx);
        }
        let find = |aliases: &[&str]| aliases.iter().find_map(|a| positions.get(*a).copied());

        let specialties = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, header)| {
                let tag = normalize_tag(header.trim_start_matches('\u{feff}'));
                SPECIALTY_TAGS.contains(&tag.as_str()).then_some((tag, idx))
            })
            .collect();

        Self {
            name: find(NAME_COLUMNS),
            first_name: find(FIRST_NAME_COLUMNS),
            last_name: find(LAST_NAME_COLUMNS),
            team: find(TEAM_COLUMNS),
            ranking: find(RANKING_COLUMNS),
            profile: find(PROFILE_COLUMNS),
            nationality: find(NATIONALITY_COLUMNS),
            birthdate: find(BIRTHDATE_COLUMNS),
            age: find(AGE_COLUMNS),
            link_title: find(LINK_TITLE_COLUMNS),
            specialties,
        }
    }

    /// Positions for a headerless file in the canonical roster layout
    fn canonical() -> Self {
        let headers: StringRecord = ROSTER_FIELDS
            .iter()
            .copied()
            .chain(std::iter::once(PROFILE_FIELD))
            .collect();
        Self::from_headers(&headers)
    }

    fn has_name(&self) -> bool {
        self.name.is_some() || self.first_name.is_some() || self.last_name.is_some()
    }

    fn candidate(&self, record: &StringRecord) -> RawCandidate {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let name = match cell(self.name) {
            Some(name) => name,
            None => [cell(self.first_name), cell(self.last_name)]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" "),
        };

        let mut specialty_points = SpecialtyPoints::new();
        for (tag, idx) in &self.specialties {
            let score = record
                .get(*idx)
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(0);
            specialty_points.insert(tag.clone(), score);
        }

        RawCandidate {
            name,
            team: cell(self.team),
            ranking: cell(self.ranking).and_then(|r| parse_ranking(&r)),
            specialty_points,
            profile_reference: cell(self.profile),
            nationality: cell(self.nationality),
            birthdate: cell(self.birthdate),
            age: cell(self.age).and_then(|a| a.parse().ok()),
            link_title: cell(self.link_title),
        }
    }
}

/// Rankings arrive as `12`, `12.0` or junk such as `-`
fn parse_ranking(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite() && *r >= 0.0 && *r <= f64::from(u32::MAX))
            .map(|r| r as u32)
    })
}

/// Parse decoded CSV text into candidates. Unreadable rows are logged and
/// skipped; a file without any usable name column yields nothing.
pub fn parse_candidates(text: &str, has_header: bool) -> Result<Vec<RawCandidate>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(text))
        .has_headers(has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns = if has_header {
        ColumnMap::from_headers(reader.headers()?)
    } else {
        ColumnMap::canonical()
    };
    if !columns.has_name() {
        warn!("No name column found in CSV input");
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    for (row, record) in reader.records().enumerate() {
        match record {
            Ok(record) => candidates.push(columns.candidate(&record)),
            Err(e) => warn!(row = row + 1, error = %e, "Skipping unreadable CSV row"),
        }
    }
    debug!("Parsed {} CSV candidates", candidates.len());
    Ok(candidates)
}

/// Candidates from a scraped CSV file
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
    label: String,
    encodings: Vec<String>,
    has_header: bool,
}

impl CsvFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            label: path.display().to_string(),
            path,
            encodings: DEFAULT_ENCODINGS.iter().map(|e| e.to_string()).collect(),
            has_header: true,
        }
    }

    pub fn with_encodings(mut self, encodings: Vec<String>) -> Self {
        self.encodings = encodings;
        self
    }

    /// Treat the file as the canonical roster layout without a header row
    pub fn headerless(mut self) -> Self {
        self.has_header = false;
        self
    }
}

impl CandidateSource for CsvFileSource {
    fn source_name(&self) -> &str {
        &self.label
    }

    fn fetch_candidates(&self) -> Result<Vec<RawCandidate>> {
        let text = read_text(&self.path, &self.encodings)?;
        parse_candidates(&text, self.has_header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_detection() {
        assert_eq!(detect_delimiter("Nome;Equipa\nA;B"), b';');
        assert_eq!(detect_delimiter("name,team\nA,B"), b',');
        let late = format!("name,team\n{}\n;", "x".repeat(DELIMITER_SNIFF_CHARS));
        assert_eq!(detect_delimiter(&late), b',');
    }

    #[test]
    fn test_alias_columns_are_resolved() {
        let text = "Nome;Equipa;UCI Ranking;Nacionalidade;Link\nPOGAČAR Tadej;UAE;1;SLO;https://www.procyclingstats.com/rider/tadej-pogacar\n";
        let candidates = parse_candidates(text, true).unwrap();
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.name, "POGAČAR Tadej");
        assert_eq!(c.team.as_deref(), Some("UAE"));
        assert_eq!(c.ranking, Some(1));
        assert_eq!(c.nationality.as_deref(), Some("SLO"));
        assert!(c.profile_reference.as_deref().unwrap().ends_with("tadej-pogacar"));
    }

    #[test]
    fn test_alias_priority_prefers_earlier_alias() {
        let text = "name,Nome\nsecond,first\n";
        let candidates = parse_candidates(text, true).unwrap();
        assert_eq!(candidates[0].name, "first");
    }

    #[test]
    fn test_bom_and_padding_in_headers() {
        let text = "\u{feff}name , team \nBen Healy,EF\n";
        let candidates = parse_candidates(text, true).unwrap();
        assert_eq!(candidates[0].name, "Ben Healy");
        assert_eq!(candidates[0].team.as_deref(), Some("EF"));
    }

    #[test]
    fn test_first_and_last_name_columns_are_joined() {
        let text = "first_name,last_name,team\nMads,Pedersen,Lidl-Trek\n";
        let candidates = parse_candidates(text, true).unwrap();
        assert_eq!(candidates[0].name, "Mads Pedersen");
    }

    #[test]
    fn test_specialty_columns_keep_column_order() {
        let text = "name,time_trial,gc,sprint\nRemco Evenepoel,2100,2100,50\n";
        let candidates = parse_candidates(text, true).unwrap();
        let tags: Vec<&str> = candidates[0].specialty_points.iter().map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["time-trial", "gc", "sprint"]);
        assert_eq!(candidates[0].specialty_points.top(), Some(("time-trial", 2100)));
    }

    #[test]
    fn test_headerless_file_uses_roster_layout() {
        let text = "Jonas,Vingegaard,Visma,Denmark,29,2,GC,14.0,GC\n";
        let candidates = parse_candidates(text, false).unwrap();
        let c = &candidates[0];
        assert_eq!(c.name, "Jonas Vingegaard");
        assert_eq!(c.team.as_deref(), Some("Visma"));
        assert_eq!(c.age, Some(29));
        assert_eq!(c.ranking, Some(2));
    }

    #[test]
    fn test_missing_name_column_yields_nothing() {
        let candidates = parse_candidates("team,ranking\nUAE,1\n", true).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_ranking_formats() {
        assert_eq!(parse_ranking("12"), Some(12));
        assert_eq!(parse_ranking("12.0"), Some(12));
        assert_eq!(parse_ranking("-"), None);
        assert_eq!(parse_ranking("-3"), None);
    }
}
