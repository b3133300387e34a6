use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::pipeline::processing::normalize::NormalizedName;
use crate::types::RawCandidate;

/// Sponsor words, race names and generic vocabulary that mark a scraped
/// "name" as a team or event rather than a rider
pub const TEAM_PATTERNS: &[&str] = &[
    "premier tech", "education", "easypost", "groupama", "fdj", "ineos", "grenadiers",
    "red bull", "bora", "hansgrohe", "decathlon", "cma cgm", "soudal", "quick-step",
    "visma", "lease", "bike", "movistar", "lidl", "trek", "jayco", "alula",
    "picnic", "postnl", "lotto", "intermarche", "bahrain", "victorious",
    "uno-x", "mobility", "uae", "emirates", "xds", "astana", "nsn", "cycling",
    "arkea", "hotels", "collstrop", "nardi", "fassa", "bortolo", "saunier", "duval",
    "prodir", "san remo", "lombardia", "strade bianche", "hamburg", "cyclassics",
    "bretagne", "classic", "copenhagen", "sprint", "ridelondon", "surrey",
    "alpecin", "ef education",
];

/// Terms that disqualify a wiki link from being a person
pub const NON_PERSON_TERMS: &[&str] = &[
    "team", "cycling", "tour", "race", "uci", "world", "edit", "wiki",
    "stage", "grand", "classification", "jersey", "champion", "olympic",
    "continental", "pro team", "worldteam",
];

/// Country and continent names that appear as link text in wiki dumps
pub const COUNTRY_NAMES: &[&str] = &[
    "belgium", "france", "spain", "germany", "italy", "united states", "australia",
    "netherlands", "switzerland", "denmark", "norway", "portugal", "slovenia",
    "colombia", "ecuador", "ireland", "eritrea", "great britain", "united kingdom",
    "austria", "poland", "canada", "south africa", "new zealand", "kazakhstan",
    "russia", "ukraine", "czech republic", "slovakia", "latvia", "estonia", "lithuania",
    "luxembourg", "bahrain", "asia", "europe", "oceania", "north america", "africa",
];

const PERSON_TITLE_MARKER: &str = "(cyclist)";
const MIN_SURNAME_CHARS: usize = 2;

/// Why a candidate did not make it into the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingName,
    ContainsDigit,
    MissingTeam,
    TeamName,
    Duplicate,
    ShortSurname,
    NonPersonTerm,
    CountryName,
    NotPersonLike,
    InvariantViolation,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::MissingName => "missing_name",
            RejectReason::ContainsDigit => "contains_digit",
            RejectReason::MissingTeam => "missing_team",
            RejectReason::TeamName => "team_name",
            RejectReason::Duplicate => "duplicate",
            RejectReason::ShortSurname => "short_surname",
            RejectReason::NonPersonTerm => "non_person_term",
            RejectReason::CountryName => "country_name",
            RejectReason::NotPersonLike => "not_person_like",
            RejectReason::InvariantViolation => "invariant_violation",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized keys admitted so far in one run. Owned by the run, never shared.
#[derive(Debug, Default)]
pub struct SeenNames {
    keys: HashSet<String>,
}

impl SeenNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns false if the key was already present
    pub fn record(&mut self, key: &str) -> bool {
        self.keys.insert(key.to_string())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Keyword tables consulted by the filter; replaceable for tests
#[derive(Debug, Clone)]
pub struct FilterRules {
    pub team_patterns: Vec<String>,
    pub non_person_terms: Vec<String>,
    pub country_names: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            team_patterns: owned(TEAM_PATTERNS),
            non_person_terms: owned(NON_PERSON_TERMS),
            country_names: owned(COUNTRY_NAMES),
        }
    }
}

/// Admit/reject decision for normalized candidates
#[derive(Debug, Clone)]
pub struct RecordFilter {
    rules: FilterRules,
    wiki_rules: bool,
    require_team: bool,
}

impl RecordFilter {
    pub fn new(rules: FilterRules, wiki_rules: bool, require_team: bool) -> Self {
        Self {
            rules,
            wiki_rules,
            require_team,
        }
    }

    /// Check every rule without touching `seen`. Callers record the key only
    /// once the candidate has actually been added to the roster.
    pub fn check(
        &self,
        name: &NormalizedName,
        candidate: &RawCandidate,
        seen: &SeenNames,
    ) -> Result<(), RejectReason> {
        let full_name = name.full_name();
        if full_name.is_empty() {
            return Err(RejectReason::MissingName);
        }
        if full_name.chars().any(char::is_numeric) {
            return Err(RejectReason::ContainsDigit);
        }
        if self.require_team && candidate.team_text().is_none() {
            return Err(RejectReason::MissingTeam);
        }

        if self.is_likely_team_name(&name.key) {
            return Err(RejectReason::TeamName);
        }
        if seen.contains(&name.key) {
            return Err(RejectReason::Duplicate);
        }
        if name.last_name.trim().chars().count() < MIN_SURNAME_CHARS {
            return Err(RejectReason::ShortSurname);
        }

        if self.wiki_rules {
            self.check_wiki_link(name, &full_name, candidate.link_title.as_deref())?;
        }
        Ok(())
    }

    /// Case-insensitive substring match against the team keyword list
    pub fn is_likely_team_name(&self, key: &str) -> bool {
        self.rules
            .team_patterns
            .iter()
            .any(|pattern| key.contains(pattern.as_str()))
    }

    fn check_wiki_link(
        &self,
        name: &NormalizedName,
        full_name: &str,
        link_title: Option<&str>,
    ) -> Result<(), RejectReason> {
        let title = link_title.map(str::to_lowercase).unwrap_or_default();
        let lowered = full_name.to_lowercase();

        if self.rules.country_names.iter().any(|c| *c == lowered || *c == name.key) {
            return Err(RejectReason::CountryName);
        }
        let has_term = |text: &str| {
            self.rules
                .non_person_terms
                .iter()
                .any(|term| text.contains(term.as_str()))
        };
        if has_term(&title) || has_term(&lowered) {
            return Err(RejectReason::NonPersonTerm);
        }

        let words: Vec<&str> = full_name.split(' ').collect();
        let two_capitalized = words.len() == 2
            && words
                .iter()
                .all(|w| w.chars().next().is_some_and(char::is_uppercase));
        if title.contains(PERSON_TITLE_MARKER) || two_capitalized {
            Ok(())
        } else {
            Err(RejectReason::NotPersonLike)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::NameNormalizer;

    fn check(filter: &RecordFilter, candidate: &RawCandidate, seen: &SeenNames) -> Result<(), RejectReason> {
        let name = NameNormalizer::normalize(&candidate.name);
        filter.check(&name, candidate, seen)
    }

    fn plain() -> RecordFilter {
        RecordFilter::new(FilterRules::default(), false, false)
    }

    fn wiki() -> RecordFilter {
        RecordFilter::new(FilterRules::default(), true, false)
    }

    #[test]
    fn test_team_names_are_rejected() {
        let seen = SeenNames::new();
        let soudal = RawCandidate::new("Soudal Quick-Step");
        assert_eq!(check(&plain(), &soudal, &seen), Err(RejectReason::TeamName));
        let lotto = RawCandidate::new("Lotto Intermarché");
        assert_eq!(check(&plain(), &lotto, &seen), Err(RejectReason::TeamName));
        assert!(check(&plain(), &RawCandidate::new("Tadej Pogačar"), &seen).is_ok());
    }

    #[test]
    fn test_duplicates_use_the_normalized_key() {
        let mut seen = SeenNames::new();
        seen.record("tadej pogacar");
        let accented = RawCandidate::new("POGAČAR Tadej");
        assert_eq!(check(&plain(), &accented, &seen), Err(RejectReason::Duplicate));
    }

    #[test]
    fn test_check_does_not_record() {
        let seen = SeenNames::new();
        let candidate = RawCandidate::new("Jonas Vingegaard");
        assert!(check(&plain(), &candidate, &seen).is_ok());
        assert!(check(&plain(), &candidate, &seen).is_ok());
        assert!(seen.is_empty());
    }

    #[test]
    fn test_short_or_missing_surname() {
        let seen = SeenNames::new();
        assert_eq!(check(&plain(), &RawCandidate::new("Carapaz"), &seen), Err(RejectReason::ShortSurname));
        assert_eq!(check(&plain(), &RawCandidate::new("Adam Y"), &seen), Err(RejectReason::ShortSurname));
        assert_eq!(check(&plain(), &RawCandidate::new("  "), &seen), Err(RejectReason::MissingName));
    }

    #[test]
    fn test_digits_are_never_valid() {
        let seen = SeenNames::new();
        let candidate = RawCandidate::new("Stage 21");
        assert_eq!(check(&plain(), &candidate, &seen), Err(RejectReason::ContainsDigit));
    }

    #[test]
    fn test_team_required_when_configured() {
        let seen = SeenNames::new();
        let filter = RecordFilter::new(FilterRules::default(), false, true);
        let candidate = RawCandidate::new("Jonas Vingegaard").with_team("  ");
        assert_eq!(check(&filter, &candidate, &seen), Err(RejectReason::MissingTeam));
        let candidate = candidate.with_team("Team Visma-Lease a Bike");
        assert!(check(&filter, &candidate, &seen).is_ok());
    }

    #[test]
    fn test_wiki_rules() {
        let seen = SeenNames::new();
        let country = RawCandidate::new("New Zealand").with_link_title("New Zealand");
        assert_eq!(check(&wiki(), &country, &seen), Err(RejectReason::CountryName));

        let tour = RawCandidate::new("Paris Nice").with_link_title("Paris–Nice stage race");
        assert_eq!(check(&wiki(), &tour, &seen), Err(RejectReason::NonPersonTerm));

        let lowercase = RawCandidate::new("Mathieu van der Poel").with_link_title("Mathieu van der Poel");
        assert_eq!(check(&wiki(), &lowercase, &seen), Err(RejectReason::NotPersonLike));

        let cyclist = RawCandidate::new("Mathieu van der Poel").with_link_title("Mathieu van der Poel (cyclist)");
        assert!(check(&wiki(), &cyclist, &seen).is_ok());

        let plain_name = RawCandidate::new("Ben Healy").with_link_title("Ben Healy");
        assert!(check(&wiki(), &plain_name, &seen).is_ok());
    }

    #[test]
    fn test_wiki_rules_only_apply_to_wiki_sources() {
        let seen = SeenNames::new();
        let candidate = RawCandidate::new("Mathieu van der Poel");
        assert!(check(&plain(), &candidate, &seen).is_ok());
    }
}
