use crate::error::RosterError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Ranking assumed for riders whose ranking is missing or reported as 0
pub const UNKNOWN_RANKING: u32 = 999;

/// Performance category used by the fantasy game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Gc,
    Sprinter,
    Climber,
    Classics,
    #[default]
    Rouleur,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Gc,
        Category::Sprinter,
        Category::Climber,
        Category::Classics,
        Category::Rouleur,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Gc => "GC",
            Category::Sprinter => "SPRINTER",
            Category::Climber => "CLIMBER",
            Category::Classics => "CLASSICS",
            Category::Rouleur => "ROULEUR",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RosterError::InvalidField {
                field: "category",
                value: s.to_string(),
            })
    }
}

/// Market price in millions, stored as whole tenths so it always carries
/// exactly one fractional digit and stays inside `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Price(u16);

impl Price {
    pub const MIN: Price = Price(30);
    pub const MAX: Price = Price(150);
    pub const DEFAULT: Price = Price(50);

    /// Clamp to `[3.0, 15.0]` and round to one decimal place.
    ///
    /// Rounding works on the exact decimal value of the float, so `9.35`
    /// (stored just below 9.35) becomes 9.3 rather than 9.4.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Price::MIN;
        }
        let clamped = value.clamp(Price::MIN.as_f64(), Price::MAX.as_f64());
        let tenths = format!("{clamped:.1}")
            .replace('.', "")
            .parse::<u16>()
            .unwrap_or(Price::MIN.0);
        Price::from_tenths(tenths)
    }

    /// Round to one decimal place, or `None` when outside `[3.0, 15.0]`.
    pub fn checked_from_f64(value: f64) -> Option<Self> {
        (value.is_finite() && value >= Price::MIN.as_f64() && value <= Price::MAX.as_f64())
            .then(|| Price::from_f64(value))
    }

    pub fn from_tenths(tenths: u16) -> Self {
        Price(tenths.clamp(Price::MIN.0, Price::MAX.0))
    }

    pub fn tenths(self) -> u16 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::DEFAULT
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl FromStr for Price {
    type Err = RosterError;

    /// Parses a stored price. Out-of-range values are rejected rather than
    /// clamped so corrupt files surface instead of silently changing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RosterError::InvalidField {
            field: "price",
            value: s.to_string(),
        };
        let value: f64 = s.trim().parse().map_err(|_| invalid())?;
        Price::checked_from_f64(value).ok_or_else(invalid)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Price::from_f64(value))
    }
}

/// Per-discipline scores in the order the source reported them.
///
/// Order matters: category selection breaks ties on the first maximum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialtyPoints(Vec<(String, i64)>);

impl SpecialtyPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a tag. Updating keeps the tag's original position.
    pub fn insert(&mut self, tag: impl Into<String>, score: i64) {
        let tag = tag.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == tag) {
            Some(entry) => entry.1 = score,
            None => self.0.push((tag, score)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(tag, score)| (tag.as_str(), *score))
    }

    /// Sum of all scores, saturating at the `i64` bounds
    pub fn total(&self) -> i64 {
        self.0
            .iter()
            .fold(0i64, |acc, (_, score)| acc.saturating_add(*score))
    }

    /// Highest-scoring tag; the first one wins on ties.
    pub fn top(&self) -> Option<(&str, i64)> {
        let mut best: Option<(&str, i64)> = None;
        for (tag, score) in self.iter() {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((tag, score)),
            }
        }
        best
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for SpecialtyPoints {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut points = SpecialtyPoints::new();
        for (tag, score) in iter {
            points.insert(tag, score);
        }
        points
    }
}

impl Serialize for SpecialtyPoints {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (tag, score) in &self.0 {
            map.serialize_entry(tag, score)?;
        }
        map.end()
    }
}

struct SpecialtyPointsVisitor;

impl<'de> Visitor<'de> for SpecialtyPointsVisitor {
    type Value = SpecialtyPoints;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of specialty tag to score")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut points = SpecialtyPoints::new();
        // Sources report null for disciplines with no results
        while let Some((tag, score)) = access.next_entry::<String, Option<i64>>()? {
            points.insert(tag, score.unwrap_or(0));
        }
        Ok(points)
    }
}

impl<'de> Deserialize<'de> for SpecialtyPoints {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SpecialtyPointsVisitor)
    }
}

/// One row as yielded by an extractor, before any cleaning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCandidate {
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub ranking: Option<u32>,
    #[serde(default)]
    pub specialty_points: SpecialtyPoints,
    #[serde(default)]
    pub profile_reference: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    /// Title attribute of the wiki link the name came from
    #[serde(default)]
    pub link_title: Option<String>,
}

impl RawCandidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_ranking(mut self, ranking: u32) -> Self {
        self.ranking = Some(ranking);
        self
    }

    pub fn with_points(mut self, points: &[(&str, i64)]) -> Self {
        self.specialty_points = points.iter().map(|(tag, score)| (*tag, *score)).collect();
        self
    }

    pub fn with_nationality(mut self, nationality: impl Into<String>) -> Self {
        self.nationality = Some(nationality.into());
        self
    }

    pub fn with_birthdate(mut self, birthdate: impl Into<String>) -> Self {
        self.birthdate = Some(birthdate.into());
        self
    }

    pub fn with_link_title(mut self, title: impl Into<String>) -> Self {
        self.link_title = Some(title.into());
        self
    }

    pub fn with_profile_reference(mut self, reference: impl Into<String>) -> Self {
        self.profile_reference = Some(reference.into());
        self
    }

    /// Ranking as reported, with 0 treated as unknown
    pub fn known_ranking(&self) -> Option<u32> {
        self.ranking.filter(|r| *r > 0)
    }

    /// Ranking used for pricing; unknown rankings are worst-case
    pub fn effective_ranking(&self) -> u32 {
        self.known_ranking().unwrap_or(UNKNOWN_RANKING)
    }

    /// Team text, trimmed, if any non-blank value was scraped
    pub fn team_text(&self) -> Option<&str> {
        self.team.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Canonical roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclistRecord {
    pub first_name: String,
    pub last_name: String,
    pub team: String,
    pub nationality: String,
    pub age: Option<u32>,
    pub uci_ranking: Option<u32>,
    pub speciality: String,
    pub category: Category,
    pub price: Price,
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl CyclistRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Roster uniqueness key
    pub fn dedup_key(&self) -> (String, String) {
        (self.first_name.to_lowercase(), self.last_name.to_lowercase())
    }
}

/// Which kind of extractor produced a batch of candidates
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Names pulled from wiki team-list links
    Wiki,
    /// Team rosters from the statistics service
    TeamRoster,
    /// Ranking-website spreadsheet export
    #[default]
    Ranking,
    /// Individual rider pages with specialty points
    RiderStats,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Wiki => "wiki",
            SourceKind::TeamRoster => "team-roster",
            SourceKind::Ranking => "ranking",
            SourceKind::RiderStats => "rider-stats",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can yield raw candidates for one pipeline run
pub trait CandidateSource {
    /// Label used in logs and summaries
    fn source_name(&self) -> &str;

    /// Produce every candidate this source holds, in source order
    fn fetch_candidates(&self) -> crate::error::Result<Vec<RawCandidate>>;
}
