use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::pipeline::processing::assemble::Outcome;
use crate::pipeline::processing::filter::RejectReason;
use crate::types::{Category, CyclistRecord};

/// End-of-run report
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub source: String,
    pub candidates: usize,
    pub admitted: usize,
    pub rejected: BTreeMap<RejectReason, usize>,
    pub reference_hits: usize,
    pub enrichment_unavailable: usize,
    pub by_category: BTreeMap<Category, usize>,
    /// Sum of all prices, in tenths
    pub total_value_tenths: u64,
}

impl RunSummary {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn record_outcome(&mut self, outcome: &Outcome) {
        self.candidates += 1;
        match outcome {
            Outcome::Admitted { reference_hit } => {
                self.admitted += 1;
                if *reference_hit {
                    self.reference_hits += 1;
                } else {
                    self.enrichment_unavailable += 1;
                }
            }
            Outcome::Rejected(rejection) => {
                *self.rejected.entry(rejection.reason).or_insert(0) += 1;
            }
        }
    }

    /// Fill the category and value figures from the finished roster
    pub fn tally_roster(&mut self, records: &[CyclistRecord]) {
        self.by_category.clear();
        self.total_value_tenths = 0;
        for record in records {
            *self.by_category.entry(record.category).or_insert(0) += 1;
            self.total_value_tenths += u64::from(record.price.tenths());
        }
    }

    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }

    pub fn total_value(&self) -> f64 {
        self.total_value_tenths as f64 / 10.0
    }

    /// 0 for an empty roster
    pub fn average_price(&self) -> f64 {
        let count: usize = self.by_category.values().sum();
        if count == 0 {
            0.0
        } else {
            self.total_value() / count as f64
        }
    }

    /// Share of admitted records that matched the reference table
    pub fn hit_rate(&self) -> f64 {
        if self.admitted == 0 {
            0.0
        } else {
            self.reference_hits as f64 / self.admitted as f64
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source: {}", self.source)?;
        writeln!(f, "   Candidates: {}", self.candidates)?;
        writeln!(f, "   Admitted: {}", self.admitted)?;
        writeln!(f, "   Rejected: {}", self.rejected_total())?;
        for (reason, count) in &self.rejected {
            writeln!(f, "     - {reason}: {count}")?;
        }
        writeln!(
            f,
            "   Reference hits: {} ({:.1}%), unavailable: {}",
            self.reference_hits,
            self.hit_rate() * 100.0,
            self.enrichment_unavailable
        )?;
        writeln!(f, "   By category:")?;
        for (category, count) in &self.by_category {
            writeln!(f, "     - {category}: {count}")?;
        }
        writeln!(f, "   Total value: {:.1}M", self.total_value())?;
        write!(f, "   Average price: {:.2}M", self.average_price())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::assemble::Rejection;
    use crate::types::Price;

    fn record(category: Category, price: f64) -> CyclistRecord {
        CyclistRecord {
            first_name: "A".into(),
            last_name: "Rider".into(),
            team: String::new(),
            nationality: String::new(),
            age: None,
            uci_ranking: None,
            speciality: String::new(),
            category,
            price: Price::from_f64(price),
            profile_path: None,
        }
    }

    #[test]
    fn test_empty_summary_has_zero_averages() {
        let summary = RunSummary::new("empty");
        assert_eq!(summary.average_price(), 0.0);
        assert_eq!(summary.hit_rate(), 0.0);
        assert_eq!(summary.rejected_total(), 0);
    }

    #[test]
    fn test_outcomes_are_counted() {
        let mut summary = RunSummary::new("test");
        summary.record_outcome(&Outcome::Admitted { reference_hit: true });
        summary.record_outcome(&Outcome::Admitted { reference_hit: false });
        for _ in 0..2 {
            summary.record_outcome(&Outcome::Rejected(Rejection {
                reason: RejectReason::TeamName,
                name: "Lidl-Trek".into(),
            }));
        }
        assert_eq!(summary.candidates, 4);
        assert_eq!(summary.admitted, 2);
        assert_eq!(summary.rejected.get(&RejectReason::TeamName), Some(&2));
        assert_eq!(summary.hit_rate(), 0.5);
        assert_eq!(summary.enrichment_unavailable, 1);
    }

    #[test]
    fn test_roster_totals() {
        let mut summary = RunSummary::new("test");
        summary.tally_roster(&[
            record(Category::Gc, 15.0),
            record(Category::Gc, 4.5),
            record(Category::Sprinter, 5.0),
        ]);
        assert_eq!(summary.by_category.get(&Category::Gc), Some(&2));
        assert_eq!(summary.total_value_tenths, 245);
        assert!((summary.average_price() - 24.5 / 3.0).abs() < 1e-9);
        assert!(summary.to_string().contains("Total value: 24.5M"));
    }
}
