use serde::Serialize;

use crate::types::{Price, UNKNOWN_RANKING};

/// One linear segment of a price schedule.
///
/// Covers rankings from the previous band's `upper + 1` through `upper`, with
/// value `base - (ranking - anchor) * slope`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBand {
    pub upper: u32,
    pub base: f64,
    pub anchor: u32,
    pub slope: f64,
}

impl PriceBand {
    const fn new(upper: u32, base: f64, anchor: u32, slope: f64) -> Self {
        Self {
            upper,
            base,
            anchor,
            slope,
        }
    }

    fn value_at(&self, ranking: u32) -> f64 {
        let offset = f64::from(ranking.saturating_sub(self.anchor));
        self.base - offset * self.slope
    }
}

/// Piecewise-linear ranking → price schedule.
///
/// Evaluation carries a running cap: no band may price above what the
/// previous band reached at its upper bound, which keeps the schedule
/// non-increasing even where a source's published band starts overlap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSchedule {
    bands: Vec<PriceBand>,
    tail: f64,
}

const RANKING_BANDS: [PriceBand; 8] = [
    PriceBand::new(1, 15.0, 1, 0.0),
    PriceBand::new(3, 14.0, 2, 0.5),
    PriceBand::new(5, 13.0, 4, 0.5),
    PriceBand::new(10, 12.0, 6, 0.4),
    PriceBand::new(25, 10.0, 11, 0.15),
    PriceBand::new(50, 7.5, 26, 0.08),
    PriceBand::new(100, 5.5, 51, 0.02),
    PriceBand::new(200, 4.5, 101, 0.005),
];

const RIDER_STATS_BANDS: [PriceBand; 6] = [
    PriceBand::new(5, 14.0, 1, 0.5),
    PriceBand::new(10, 12.0, 6, 0.4),
    PriceBand::new(25, 9.5, 11, 0.15),
    PriceBand::new(50, 7.0, 26, 0.08),
    PriceBand::new(100, 5.5, 51, 0.03),
    PriceBand::new(200, 4.5, 101, 0.01),
];

impl PriceSchedule {
    /// Bands must be given in ascending `upper` order.
    pub fn new(bands: Vec<PriceBand>, tail: f64) -> Self {
        Self { bands, tail }
    }

    /// Schedule used for the ranking-website export
    pub fn ranking() -> Self {
        Self::new(RANKING_BANDS.to_vec(), 4.0)
    }

    /// Schedule used for rider pages from the statistics service
    pub fn rider_stats() -> Self {
        Self::new(RIDER_STATS_BANDS.to_vec(), 4.0)
    }

    /// Unclamped, unrounded price for a ranking. 0 counts as unknown.
    pub fn base_price(&self, ranking: u32) -> f64 {
        let ranking = if ranking == 0 { UNKNOWN_RANKING } else { ranking };
        let mut cap = f64::INFINITY;
        for band in &self.bands {
            if ranking <= band.upper {
                return band.value_at(ranking).min(cap);
            }
            cap = cap.min(band.value_at(band.upper));
        }
        self.tail.min(cap)
    }
}

/// Extra value for riders with large specialty-point totals
pub fn specialty_bonus(total: i64) -> f64 {
    if total > 2000 {
        1.0
    } else if total > 1000 {
        0.5
    } else {
        0.0
    }
}

/// How a source prices riders that the reference table does not cover
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PricingStrategy {
    Fixed(Price),
    Schedule(PriceSchedule),
}

/// Pure `(ranking, specialty total) -> price` function
#[derive(Debug, Clone)]
pub struct PriceCalculator {
    strategy: PricingStrategy,
}

impl PriceCalculator {
    pub fn new(strategy: PricingStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &PricingStrategy {
        &self.strategy
    }

    pub fn price(&self, ranking: Option<u32>, specialty_total: i64) -> Price {
        match &self.strategy {
            PricingStrategy::Fixed(price) => *price,
            PricingStrategy::Schedule(schedule) => {
                let ranking = ranking.unwrap_or(UNKNOWN_RANKING);
                let raw = schedule.base_price(ranking) + specialty_bonus(specialty_total);
                Price::from_f64(raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking_calc() -> PriceCalculator {
        PriceCalculator::new(PricingStrategy::Schedule(PriceSchedule::ranking()))
    }

    fn stats_calc() -> PriceCalculator {
        PriceCalculator::new(PricingStrategy::Schedule(PriceSchedule::rider_stats()))
    }

    #[test]
    fn test_ranking_schedule_anchor_points() {
        let calc = ranking_calc();
        let at = |r: u32| calc.price(Some(r), 0).to_string();
        assert_eq!(at(1), "15.0");
        assert_eq!(at(2), "14.0");
        assert_eq!(at(3), "13.5");
        assert_eq!(at(4), "13.0");
        assert_eq!(at(10), "10.4");
        assert_eq!(at(11), "10.0");
        assert_eq!(at(50), "5.6");
        assert_eq!(at(100), "4.5");
        assert_eq!(at(150), "4.3");
        assert_eq!(at(999), "4.0");
    }

    #[test]
    fn test_rider_stats_schedule_is_capped_between_bands() {
        let calc = stats_calc();
        let at = |r: u32| calc.price(Some(r), 0).to_string();
        assert_eq!(at(1), "14.0");
        assert_eq!(at(5), "12.0");
        assert_eq!(at(6), "12.0");
        assert_eq!(at(50), "5.1");
        // published band restarts at 5.5 but may not exceed rank 50
        assert_eq!(at(51), "5.1");
        assert_eq!(at(100), "4.0");
        assert_eq!(at(101), "4.0");
        assert_eq!(at(999), "3.5");
    }

    #[test]
    fn test_rider_stats_rounding_near_midpoints() {
        let calc = stats_calc();
        let prices: Vec<String> = [12, 18, 22, 66]
            .into_iter()
            .map(|r| calc.price(Some(r), 0).to_string())
            .collect();
        assert_eq!(prices, vec!["9.3", "8.4", "7.8", "5.0"]);
    }

    #[test]
    fn test_unknown_ranking_is_worst_case() {
        let calc = ranking_calc();
        assert_eq!(calc.price(None, 0), calc.price(Some(999), 0));
        assert_eq!(PriceSchedule::ranking().base_price(0), PriceSchedule::ranking().base_price(999));
    }

    #[test]
    fn test_specialty_bonus_thresholds() {
        assert_eq!(specialty_bonus(1000), 0.0);
        assert_eq!(specialty_bonus(1001), 0.5);
        assert_eq!(specialty_bonus(2000), 0.5);
        assert_eq!(specialty_bonus(2001), 1.0);

        let calc = stats_calc();
        assert_eq!(calc.price(Some(1), 2500).to_string(), "15.0");
        assert_eq!(calc.price(Some(26), 1500).to_string(), "7.5");
    }

    #[test]
    fn test_ceiling_is_enforced_after_bonus() {
        let calc = ranking_calc();
        assert_eq!(calc.price(Some(1), 5000), Price::MAX);
    }

    #[test]
    fn test_fixed_strategy_ignores_inputs() {
        let calc = PriceCalculator::new(PricingStrategy::Fixed(Price::DEFAULT));
        assert_eq!(calc.price(Some(1), 9000).to_string(), "5.0");
        assert_eq!(calc.price(None, 0).to_string(), "5.0");
    }

    #[test]
    fn test_monotonic_and_bounded_for_all_rankings() {
        for calc in [ranking_calc(), stats_calc()] {
            for total in [0, 1500, 2500] {
                let mut previous = Price::MAX;
                for ranking in 1..=1200 {
                    let price = calc.price(Some(ranking), total);
                    assert!(price <= previous, "rank {ranking} total {total}");
                    assert!(price >= Price::MIN && price <= Price::MAX);
                    previous = price;
                }
            }
        }
    }
}
