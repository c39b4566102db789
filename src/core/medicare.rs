use log::debug;

use super::error::{ProjectionError, ProjectionTable};
use super::types::{BASELINE_YEAR, SimulationConfig};

/// Part B premiums have grown roughly 6.5% a year.
const PREMIUM_GROWTH_RATE: f64 = 0.065;
/// Average IRMAA threshold growth over the last five years.
const CEILING_GROWTH_RATE: f64 = 0.039;
const BASELINE_TIERS: [(f64, f64); 6] = [
    (212_000.0, 185.0),
    (266_000.0, 259.0),
    (344_000.0, 370.0),
    (400_000.0, 480.9),
    (750_000.0, 591.9),
    (1_000_000.0, 628.9),
];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PremiumTier {
    pub magi_ceiling: f64,
    pub monthly_premium: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MedicarePremiumYear {
    pub year: i32,
    /// Ascending by ceiling.
    pub tiers: Vec<PremiumTier>,
}

impl MedicarePremiumYear {
    /// Monthly premium for one person: the first tier in ascending order whose
    /// ceiling the MAGI reaches, else the lowest tier.
    pub fn monthly_premium(&self, magi: f64) -> f64 {
        self.tiers
            .iter()
            .find(|tier| magi >= tier.magi_ceiling)
            .or(self.tiers.first())
            .map(|tier| tier.monthly_premium)
            .unwrap_or(0.0)
    }
}

/// Year-indexed premium schedules from the 2025 baseline through the year the
/// person is projected to die.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicarePremiumTable {
    years: Vec<MedicarePremiumYear>,
}

impl MedicarePremiumTable {
    pub fn build(config: &SimulationConfig) -> Self {
        let last_year = config.death_year().max(BASELINE_YEAR);
        let mut tiers: Vec<PremiumTier> = BASELINE_TIERS
            .iter()
            .map(|&(magi_ceiling, monthly_premium)| PremiumTier {
                magi_ceiling,
                monthly_premium,
            })
            .collect();
        let mut years = Vec::with_capacity((last_year - BASELINE_YEAR + 1) as usize);

        for year in BASELINE_YEAR..=last_year {
            if year > BASELINE_YEAR {
                for tier in &mut tiers {
                    tier.magi_ceiling *= 1.0 + CEILING_GROWTH_RATE;
                    tier.monthly_premium *= 1.0 + PREMIUM_GROWTH_RATE;
                }
            }
            years.push(MedicarePremiumYear {
                year,
                tiers: tiers.clone(),
            });
        }

        debug!(
            "built medicare premium table for {BASELINE_YEAR}..={last_year} ({} years)",
            years.len()
        );
        Self { years }
    }

    /// Schedule for `year`. Look-back years before the baseline use the
    /// baseline schedule.
    pub fn for_year(&self, year: i32) -> Result<&MedicarePremiumYear, ProjectionError> {
        let idx = (year - BASELINE_YEAR).max(0) as usize;
        self.years.get(idx).ok_or(ProjectionError::NotFound {
            table: ProjectionTable::MedicarePremiums,
            year,
        })
    }

    pub fn monthly_premium(&self, magi: f64, year: i32) -> Result<f64, ProjectionError> {
        Ok(self.for_year(year)?.monthly_premium(magi))
    }

    pub fn last_year(&self) -> i32 {
        BASELINE_YEAR + self.years.len() as i32 - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::sample_config;
    use approx::assert_abs_diff_eq;

    #[test]
    fn baseline_schedule_has_six_tiers() {
        let table = MedicarePremiumTable::build(&sample_config());
        let baseline = table.for_year(2025).unwrap();
        assert_eq!(baseline.tiers.len(), 6);
        assert_abs_diff_eq!(baseline.tiers[0].magi_ceiling, 212_000.0);
        assert_abs_diff_eq!(baseline.tiers[3].monthly_premium, 480.9);
    }

    #[test]
    fn ceilings_and_premiums_grow_at_independent_rates() {
        let table = MedicarePremiumTable::build(&sample_config());
        let base = table.for_year(2025).unwrap();
        let later = table.for_year(2030).unwrap();
        for (a, b) in base.tiers.iter().zip(&later.tiers) {
            assert_abs_diff_eq!(
                b.magi_ceiling,
                a.magi_ceiling * 1.039_f64.powi(5),
                epsilon = 1e-6
            );
            assert_abs_diff_eq!(
                b.monthly_premium,
                a.monthly_premium * 1.065_f64.powi(5),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn horizon_ends_at_death_year() {
        let config = sample_config();
        let table = MedicarePremiumTable::build(&config);
        assert_eq!(table.last_year(), config.death_year());
        assert!(matches!(
            table.for_year(config.death_year() + 1),
            Err(ProjectionError::NotFound {
                table: ProjectionTable::MedicarePremiums,
                ..
            })
        ));
    }

    #[test]
    fn look_back_before_baseline_uses_baseline() {
        let table = MedicarePremiumTable::build(&sample_config());
        assert_eq!(table.for_year(2023).unwrap(), table.for_year(2025).unwrap());
    }

    #[test]
    fn tier_selection_takes_first_ceiling_reached_else_lowest() {
        let table = MedicarePremiumTable::build(&sample_config());
        let baseline = table.for_year(2025).unwrap();
        assert_abs_diff_eq!(baseline.monthly_premium(50_000.0), 185.0);
        assert_abs_diff_eq!(baseline.monthly_premium(212_000.0), 185.0);
        assert_abs_diff_eq!(baseline.monthly_premium(900_000.0), 185.0);

        let later = table.for_year(2027).unwrap();
        assert_abs_diff_eq!(
            later.monthly_premium(0.0),
            185.0 * 1.065 * 1.065,
            epsilon = 1e-9
        );
    }
}
