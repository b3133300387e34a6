use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::pipeline::processing::classify::{CategoryClassifier, HeuristicClassifier, NameLists};
use crate::pipeline::processing::enrich::{age_from_birthdate, CountryTable};
use crate::pipeline::processing::filter::{FilterRules, RecordFilter, RejectReason, SeenNames};
use crate::pipeline::processing::normalize::{profile_path, NameNormalizer, NormalizedName};
use crate::pipeline::processing::policy::{ClassificationStrategy, SourcePolicy};
use crate::pipeline::processing::price::PriceCalculator;
use crate::pipeline::processing::reference::ReferenceMatcher;
use crate::types::{CyclistRecord, Price, RawCandidate, SourceKind};

const MIN_SURNAME_CHARS: usize = 2;

/// Records admitted so far, unique by lower-cased `(first_name, last_name)`.
/// Records are only ever appended.
#[derive(Debug, Default)]
pub struct Roster {
    records: Vec<CyclistRecord>,
    keys: HashSet<(String, String)>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, handing it back if its name is already present
    pub fn try_push(&mut self, record: CyclistRecord) -> Result<(), CyclistRecord> {
        if !self.keys.insert(record.dedup_key()) {
            return Err(record);
        }
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[CyclistRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CyclistRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A dropped candidate and the rule that dropped it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub reason: RejectReason,
    pub name: String,
}

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Admitted { reference_hit: bool },
    Rejected(Rejection),
}

/// Turns raw candidates into roster records according to a source policy
#[derive(Debug, Clone)]
pub struct RosterAssembler {
    kind: SourceKind,
    filter: RecordFilter,
    matcher: ReferenceMatcher,
    classification: ClassificationStrategy,
    heuristic: HeuristicClassifier,
    pricing: PriceCalculator,
    countries: CountryTable,
    as_of: NaiveDate,
}

impl RosterAssembler {
    pub fn new(policy: SourcePolicy, matcher: ReferenceMatcher, as_of: NaiveDate) -> Self {
        Self {
            kind: policy.kind,
            filter: RecordFilter::new(FilterRules::default(), policy.wiki_rules, policy.require_team),
            matcher,
            classification: policy.classification,
            heuristic: HeuristicClassifier::default(),
            pricing: PriceCalculator::new(policy.pricing),
            countries: CountryTable::builtin(),
            as_of,
        }
    }

    pub fn with_name_lists(mut self, lists: NameLists) -> Self {
        self.heuristic = HeuristicClassifier::new(lists);
        self
    }

    pub fn with_countries(mut self, countries: CountryTable) -> Self {
        self.countries = countries;
        self
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Run one candidate through every stage and append it to `roster` if it
    /// survives. `seen` is updated only for admitted candidates.
    pub fn assemble(
        &self,
        candidate: &RawCandidate,
        seen: &mut SeenNames,
        roster: &mut Roster,
    ) -> Outcome {
        let name = NameNormalizer::normalize(&candidate.name);

        if let Err(reason) = self.filter.check(&name, candidate, seen) {
            return self.reject(reason, &candidate.name);
        }

        let (record, reference_hit) = self.build_record(&name, candidate);

        if let Err(reason) = validate(&record) {
            return self.reject(reason, &candidate.name);
        }
        if let Err(record) = roster.try_push(record) {
            return self.reject(RejectReason::Duplicate, &record.full_name());
        }
        seen.record(&name.key);

        Outcome::Admitted { reference_hit }
    }

    fn build_record(&self, name: &NormalizedName, candidate: &RawCandidate) -> (CyclistRecord, bool) {
        let full_name = name.full_name();
        let team = candidate.team_text().unwrap_or_default().to_string();
        let nationality = candidate
            .nationality
            .as_deref()
            .map(|n| self.countries.resolve(n))
            .unwrap_or_default();
        let age = candidate
            .birthdate
            .as_deref()
            .and_then(|b| age_from_birthdate(b, self.as_of))
            .or(candidate.age);

        let (category, speciality) = match self.classification {
            ClassificationStrategy::SpecialtyPoints => (
                CategoryClassifier::from_points(&candidate.specialty_points),
                CategoryClassifier::speciality_label(&candidate.specialty_points),
            ),
            ClassificationStrategy::NameHeuristic => {
                let category = self.heuristic.classify(&full_name);
                (category, category.as_str().to_string())
            }
        };
        let price = self
            .pricing
            .price(candidate.known_ranking(), candidate.specialty_points.total());

        let mut record = CyclistRecord {
            first_name: name.first_name.clone(),
            last_name: name.last_name.clone(),
            team,
            nationality,
            age,
            uci_ranking: candidate.known_ranking(),
            speciality,
            category,
            price,
            profile_path: Some(profile_path(candidate.profile_reference.as_deref(), &name.slug)),
        };

        let reference_hit = match self.matcher.lookup(&full_name) {
            Some(entry) => {
                record.team = entry.team.clone();
                record.nationality = entry.nationality.clone();
                record.uci_ranking = Some(entry.ranking);
                record.category = entry.category;
                record.speciality = entry.category.as_str().to_string();
                record.price = entry.price;
                true
            }
            None => {
                debug!(name = %full_name, source = %self.kind, "EnrichmentUnavailable: no reference entry");
                false
            }
        };

        (record, reference_hit)
    }

    fn reject(&self, reason: RejectReason, name: &str) -> Outcome {
        debug!(name = %name, reason = %reason, source = %self.kind, "Candidate rejected");
        Outcome::Rejected(Rejection {
            reason,
            name: name.to_string(),
        })
    }
}

/// Final check on the record shape before it reaches the roster
fn validate(record: &CyclistRecord) -> Result<(), RejectReason> {
    let names_ok = !record.first_name.trim().is_empty()
        && record.last_name.trim().chars().count() >= MIN_SURNAME_CHARS;
    let price_ok = record.price >= Price::MIN && record.price <= Price::MAX;
    if names_ok && price_ok {
        Ok(())
    } else {
        Err(RejectReason::InvariantViolation)
    }
}
