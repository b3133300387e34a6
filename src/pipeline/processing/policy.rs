use crate::pipeline::processing::price::{PriceSchedule, PricingStrategy};
use crate::types::{Price, SourceKind};

/// Where a record's category comes from when the reference table has no entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationStrategy {
    /// Argmax over the candidate's specialty points
    SpecialtyPoints,
    /// Curated name lists
    NameHeuristic,
}

/// Per-source behaviour of the assembler
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePolicy {
    pub kind: SourceKind,
    pub wiki_rules: bool,
    pub require_team: bool,
    pub classification: ClassificationStrategy,
    pub pricing: PricingStrategy,
}

impl SourceKind {
    pub fn policy(self) -> SourcePolicy {
        use ClassificationStrategy::*;

        let (wiki_rules, require_team, classification, pricing) = match self {
            SourceKind::Wiki => (true, false, SpecialtyPoints, PricingStrategy::Fixed(Price::DEFAULT)),
            SourceKind::TeamRoster => (false, false, SpecialtyPoints, PricingStrategy::Fixed(Price::DEFAULT)),
            SourceKind::Ranking => (
                false,
                true,
                NameHeuristic,
                PricingStrategy::Schedule(PriceSchedule::ranking()),
            ),
            SourceKind::RiderStats => (
                false,
                false,
                SpecialtyPoints,
                PricingStrategy::Schedule(PriceSchedule::rider_stats()),
            ),
        };

        SourcePolicy {
            kind: self,
            wiki_rules,
            require_team,
            classification,
            pricing,
        }
    }
}
