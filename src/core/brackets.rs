use log::debug;

use super::error::{ProjectionError, ProjectionTable};
use super::types::{BASELINE_YEAR, SimulationConfig};

/// Historical average yearly bracket inflation, 2007-2017.
const BRACKET_GROWTH_RATE: f64 = 0.016;
const BASELINE_STANDARD_DEDUCTION: f64 = 30_000.0;
/// Additional deduction for turning 65, grown at the bracket rate.
const BASELINE_SENIOR_DEDUCTION: f64 = 3_100.0;
const BASELINE_BRACKETS: [(u32, f64); 6] = [
    (12, 96_950.0),
    (22, 206_700.0),
    (24, 394_600.0),
    (32, 501_050.0),
    (35, 751_600.0),
    (37, 1_000_000.0),
];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TaxBracket {
    pub rate_percent: u32,
    pub ceiling: f64,
}

impl TaxBracket {
    pub fn rate(&self) -> f64 {
        self.rate_percent as f64 / 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxBracketYear {
    pub year: i32,
    pub standard_deduction: f64,
    /// Ascending by rate and ceiling.
    pub brackets: Vec<TaxBracket>,
}

impl TaxBracketYear {
    /// Income ceiling of the bracket taxed at `rate_percent`. A rate missing
    /// from the schedule falls back to the highest bracket below it.
    pub fn ceiling_for_rate(&self, rate_percent: u32) -> Option<f64> {
        self.brackets
            .iter()
            .rev()
            .find(|b| b.rate_percent <= rate_percent)
            .map(|b| b.ceiling)
    }

    /// Progressive tax after the standard deduction. Each bracket's ceiling is
    /// consumed as a band width; income past the last band pays the top rate.
    pub fn tax_on(&self, income: f64) -> f64 {
        if income <= 0.0 {
            return 0.0;
        }

        let mut remaining = income - self.standard_deduction.min(income);
        let mut tax = 0.0;
        for bracket in &self.brackets {
            if remaining > bracket.ceiling {
                tax += bracket.rate() * bracket.ceiling;
                remaining -= bracket.ceiling;
            } else {
                return tax + bracket.rate() * remaining;
            }
        }

        let top_rate = self.brackets.last().map(TaxBracket::rate).unwrap_or(0.0);
        tax + top_rate * remaining
    }
}

/// Year-indexed bracket schedule from the 2025 baseline through
/// `2025 + deceased_age`, or the death year when that is later.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxBracketTable {
    years: Vec<TaxBracketYear>,
}

impl TaxBracketTable {
    pub fn build(config: &SimulationConfig) -> Self {
        let last_year =
            (BASELINE_YEAR + config.person.deceased_age as i32).max(config.death_year());
        let mut brackets: Vec<TaxBracket> = BASELINE_BRACKETS
            .iter()
            .map(|&(rate_percent, ceiling)| TaxBracket {
                rate_percent,
                ceiling,
            })
            .collect();
        let mut base_deduction = BASELINE_STANDARD_DEDUCTION;
        let mut years = Vec::with_capacity((last_year - BASELINE_YEAR + 1) as usize);

        for year in BASELINE_YEAR..=last_year {
            if year > BASELINE_YEAR {
                for bracket in &mut brackets {
                    bracket.ceiling = (bracket.ceiling * (1.0 + BRACKET_GROWTH_RATE)).round();
                }
                base_deduction *= 1.0 + BRACKET_GROWTH_RATE;
            }

            let mut standard_deduction = base_deduction;
            if config.age_in_year(year) == 65 {
                standard_deduction += senior_deduction(year);
            }

            years.push(TaxBracketYear {
                year,
                standard_deduction,
                brackets: brackets.clone(),
            });
        }

        debug!(
            "built tax bracket table for {BASELINE_YEAR}..={last_year} ({} years)",
            years.len()
        );
        Self { years }
    }

    pub fn for_year(&self, year: i32) -> Result<&TaxBracketYear, ProjectionError> {
        usize::try_from(year - BASELINE_YEAR)
            .ok()
            .and_then(|idx| self.years.get(idx))
            .ok_or(ProjectionError::NotFound {
                table: ProjectionTable::TaxBrackets,
                year,
            })
    }

    pub fn first_year(&self) -> i32 {
        BASELINE_YEAR
    }

    pub fn last_year(&self) -> i32 {
        BASELINE_YEAR + self.years.len() as i32 - 1
    }
}

fn senior_deduction(year: i32) -> f64 {
    BASELINE_SENIOR_DEDUCTION * (1.0 + BRACKET_GROWTH_RATE).powi(year - BASELINE_YEAR)
}
