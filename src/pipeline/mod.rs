// Roster pipeline: candidate ingestion, per-record processing, and the run driver

pub mod ingestion;
pub mod processing;
pub mod summary;

use chrono::NaiveDate;
use metrics::counter;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::processing::assemble::{Outcome, Roster, RosterAssembler};
use crate::pipeline::processing::filter::SeenNames;
use crate::pipeline::processing::reference::{MatchMode, ReferenceMatcher, ReferenceTable};
use crate::pipeline::summary::RunSummary;
use crate::types::{CandidateSource, CyclistRecord, RawCandidate, SourceKind};

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub roster: Vec<CyclistRecord>,
    pub summary: RunSummary,
}

pub struct Pipeline {
    assembler: RosterAssembler,
}

impl Pipeline {
    pub fn new(assembler: RosterAssembler) -> Self {
        Self { assembler }
    }

    pub fn for_source(
        kind: SourceKind,
        table: ReferenceTable,
        mode: MatchMode,
        as_of: NaiveDate,
    ) -> Self {
        let matcher = ReferenceMatcher::new(table, mode);
        Self::new(RosterAssembler::new(kind.policy(), matcher, as_of))
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let table = config.reference_table()?;
        Ok(Self::for_source(
            config.pipeline.source,
            table,
            config.pipeline.match_mode,
            config.as_of(),
        ))
    }

    /// Pull every candidate from `source` and assemble the roster
    #[instrument(skip(self, source), fields(source = %source.source_name(), kind = %self.assembler.kind()))]
    pub fn run(&self, source: &dyn CandidateSource) -> Result<RunOutcome> {
        info!("Fetching candidates");
        let candidates = source.fetch_candidates()?;
        info!("Fetched {} candidates", candidates.len());
        Ok(self.run_candidates(source.source_name(), candidates))
    }

    /// Assemble a roster from candidates already in hand. Each call starts
    /// from an empty seen-set and an empty roster.
    pub fn run_candidates<I>(&self, label: &str, candidates: I) -> RunOutcome
    where
        I: IntoIterator<Item = RawCandidate>,
    {
        let kind = self.assembler.kind().as_str();
        let mut seen = SeenNames::new();
        let mut roster = Roster::new();
        let mut summary = RunSummary::new(label);

        for candidate in candidates {
            counter!("roster_candidates_total", "source" => kind).increment(1);
            let outcome = self.assembler.assemble(&candidate, &mut seen, &mut roster);
            match &outcome {
                Outcome::Admitted { reference_hit } => {
                    counter!("roster_records_admitted_total", "source" => kind).increment(1);
                    if *reference_hit {
                        counter!("roster_reference_hits_total", "source" => kind).increment(1);
                    }
                }
                Outcome::Rejected(rejection) => {
                    counter!(
                        "roster_records_rejected_total",
                        "source" => kind,
                        "reason" => rejection.reason.as_str()
                    )
                    .increment(1);
                }
            }
            summary.record_outcome(&outcome);
        }

        let roster = roster.into_records();
        summary.tally_roster(&roster);

        if roster.is_empty() && summary.candidates > 0 {
            warn!("No candidates survived filtering");
        }
        info!(
            admitted = summary.admitted,
            rejected = summary.rejected_total(),
            reference_hits = summary.reference_hits,
            "Run complete"
        );

        RunOutcome { roster, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ingestion::InMemorySource;
    use crate::types::Category;

    fn pipeline(kind: SourceKind) -> Pipeline {
        Pipeline::for_source(
            kind,
            ReferenceTable::builtin(),
            MatchMode::Substring,
            NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
        )
    }

    #[test]
    fn test_run_reads_from_source() {
        let source = InMemorySource::new(
            "memory",
            vec![
                RawCandidate::new("Tadej Pogačar").with_team("UAE").with_ranking(50),
                RawCandidate::new("Soudal Quick-Step").with_team("Soudal"),
            ],
        );
        let outcome = pipeline(SourceKind::Ranking).run(&source).unwrap();
        assert_eq!(outcome.roster.len(), 1);
        assert_eq!(outcome.roster[0].category, Category::Gc);
        assert_eq!(outcome.summary.source, "memory");
        assert_eq!(outcome.summary.candidates, 2);
        assert_eq!(outcome.summary.reference_hits, 1);
    }

    #[test]
    fn test_huge_specialty_scores_do_not_abort_the_run() {
        let candidates = vec![
            RawCandidate::new("Fabio Christen")
                .with_ranking(40)
                .with_points(&[("gc", i64::MAX), ("sprint", 10)]),
            RawCandidate::new("Tobias Foss").with_ranking(45),
        ];
        let outcome = pipeline(SourceKind::RiderStats).run_candidates("memory", candidates);
        assert_eq!(outcome.summary.admitted, 2);
        assert_eq!(outcome.roster[0].category, Category::Gc);
        // 5.88 for rank 40 plus the 2000+ points bonus
        assert_eq!(outcome.roster[0].price.to_string(), "6.9");
    }

    #[test]
    fn test_each_run_starts_fresh() {
        let pipeline = pipeline(SourceKind::TeamRoster);
        let candidates = vec![RawCandidate::new("Ben Healy")];
        let first = pipeline.run_candidates("a", candidates.clone());
        let second = pipeline.run_candidates("b", candidates);
        assert_eq!(first.roster, second.roster);
        assert_eq!(second.summary.admitted, 1);
    }
}
