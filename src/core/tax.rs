use super::brackets::TaxBracketTable;
use super::error::ProjectionError;
use super::types::{BASELINE_YEAR, SimulationConfig};

const SOCIAL_SECURITY_RATE: f64 = 0.062;
const SOCIAL_SECURITY_WAGE_BASE_2025: f64 = 176_100.0;
/// Average wage base growth over the last eight years.
const WAGE_BASE_GROWTH_RATE: f64 = 0.045;
const MEDICARE_RATE: f64 = 0.0145;
const MEDICARE_RATE_OVER_CEILING: f64 = 0.0235;
const MEDICARE_SURTAX_CEILING: f64 = 250_000.0;

const LONG_TERM_GAINS_RATE: f64 = 0.15;
const ZERO_GAINS_CEILING_2025: f64 = 96_700.0;
const NET_INVESTMENT_INCOME_RATE: f64 = 0.038;
const NET_INVESTMENT_INCOME_THRESHOLD: f64 = 250_000.0;
/// Share of spending added on top to cover the tax on the sale itself.
const SALE_TAX_ALLOWANCE: f64 = 0.15;
/// Share of every investment sale that is realized gain.
const GAIN_SHARE_OF_SALE: f64 = 0.5;

/// `base` compounded once per year after the 2025 baseline.
pub(crate) fn projected_from_baseline(base: f64, rate: f64, year: i32) -> f64 {
    base * (1.0 + rate).powi((year - BASELINE_YEAR).max(0))
}

pub fn social_security_wage_base(year: i32) -> f64 {
    projected_from_baseline(SOCIAL_SECURITY_WAGE_BASE_2025, WAGE_BASE_GROWTH_RATE, year)
}

/// Employee payroll tax: Social Security up to the wage base plus Medicare,
/// with the higher Medicare rate above a fixed ceiling.
pub fn fica_tax(salary: f64, year: i32) -> f64 {
    let salary = salary.max(0.0);
    let social_security = salary.min(social_security_wage_base(year)) * SOCIAL_SECURITY_RATE;
    let medicare = salary.min(MEDICARE_SURTAX_CEILING) * MEDICARE_RATE
        + (salary - MEDICARE_SURTAX_CEILING).max(0.0) * MEDICARE_RATE_OVER_CEILING;
    social_security + medicare
}

pub fn ordinary_income_tax(
    brackets: &TaxBracketTable,
    taxable_income: f64,
    year: i32,
) -> Result<f64, ProjectionError> {
    Ok(brackets.for_year(year)?.tax_on(taxable_income))
}

pub fn zero_rate_gains_ceiling(year: i32) -> f64 {
    projected_from_baseline(ZERO_GAINS_CEILING_2025, WAGE_BASE_GROWTH_RATE, year)
}

#[derive(Debug, Clone, Copy)]
pub struct CapitalGainsInputs {
    pub age: u32,
    pub year: i32,
    /// Ordinary income tax plus FICA already owed this year.
    pub other_tax: f64,
    pub distribution: f64,
    pub spending_after_social_security: f64,
    pub investment_balance: f64,
}

/// Tax on taxable-account sales between retirement and penalty-free access
/// to the pretax accounts. Before retirement salary covers spending; after
/// the no-penalty age spending comes from pretax and Roth, so neither realizes
/// gains.
///
/// When the investment account cannot cover the sale the gap is assumed to be
/// withdrawn from Roth contributions with no tax. Whether enough Roth basis
/// exists is not checked.
pub fn capital_gains_tax(config: &SimulationConfig, inputs: &CapitalGainsInputs) -> f64 {
    if inputs.age < config.person.retirement_age || inputs.age >= config.no_penalty_age {
        return 0.0;
    }

    let spending = inputs.spending_after_social_security;
    let gain = (spending + inputs.other_tax + spending * SALE_TAX_ALLOWANCE) * GAIN_SHARE_OF_SALE;
    // Social Security can cover the whole year, leaving nothing to sell.
    if gain <= 0.0 {
        return 0.0;
    }
    if inputs.investment_balance < gain {
        return 0.0;
    }

    let taxable = inputs.distribution + gain;
    let mut tax = 0.0;
    if taxable > zero_rate_gains_ceiling(inputs.year) {
        tax += gain * LONG_TERM_GAINS_RATE;
    }
    if taxable > NET_INVESTMENT_INCOME_THRESHOLD {
        let exposed = gain.min(taxable - NET_INVESTMENT_INCOME_THRESHOLD);
        tax += exposed * NET_INVESTMENT_INCOME_RATE;
    }
    tax + gain * config.state_tax_after_retirement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::sample_config;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn gap_year_inputs(config: &SimulationConfig) -> CapitalGainsInputs {
        CapitalGainsInputs {
            age: config.person.retirement_age,
            year: 2030,
            other_tax: 10_000.0,
            distribution: 100_000.0,
            spending_after_social_security: 90_000.0,
            investment_balance: 1_000_000.0,
        }
    }

    #[test]
    fn wage_base_compounds_from_2025() {
        assert_abs_diff_eq!(social_security_wage_base(2025), 176_100.0);
        assert_abs_diff_eq!(social_security_wage_base(2026), 184_024.5, epsilon = 1e-6);
        assert_abs_diff_eq!(
            social_security_wage_base(2030),
            176_100.0 * 1.045_f64.powi(5),
            epsilon = 1e-6
        );
    }

    #[test]
    fn fica_below_wage_base() {
        assert_abs_diff_eq!(fica_tax(150_000.0, 2026), 9_300.0 + 2_175.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fica_tax(0.0, 2026), 0.0);
    }

    #[test]
    fn fica_caps_social_security_and_adds_medicare_surtax() {
        let salary = 400_000.0;
        let expected = 176_100.0 * 0.062 + 250_000.0 * 0.0145 + 150_000.0 * 0.0235;
        assert_abs_diff_eq!(fica_tax(salary, 2025), expected, epsilon = 1e-9);
    }

    #[test]
    fn ordinary_income_tax_fails_outside_horizon() {
        let config = sample_config();
        let table = TaxBracketTable::build(&config);
        assert!(ordinary_income_tax(&table, 50_000.0, 2026).is_ok());
        assert!(ordinary_income_tax(&table, 50_000.0, table.last_year() + 1).is_err());
    }

    #[test]
    fn gap_year_gain_taxed_at_fifteen_percent_plus_state() {
        let mut config = sample_config();
        config.person.retirement_age = 55;
        config.no_penalty_age = 60;
        config.state_tax_after_retirement = 0.02;
        let inputs = gap_year_inputs(&config);

        // gain = (90,000 + 10,000 + 13,500) / 2
        let gain = 56_750.0;
        assert_abs_diff_eq!(
            capital_gains_tax(&config, &inputs),
            gain * 0.15 + gain * 0.02,
            epsilon = 1e-9
        );
    }

    #[test]
    fn gain_under_zero_rate_ceiling_only_pays_state() {
        let mut config = sample_config();
        config.person.retirement_age = 55;
        config.no_penalty_age = 60;
        config.state_tax_after_retirement = 0.0;
        let mut inputs = gap_year_inputs(&config);
        inputs.distribution = 0.0;
        inputs.spending_after_social_security = 40_000.0;
        inputs.other_tax = 0.0;

        assert_abs_diff_eq!(capital_gains_tax(&config, &inputs), 0.0);
    }

    #[test]
    fn surtax_applies_to_gain_above_threshold() {
        let mut config = sample_config();
        config.person.retirement_age = 55;
        config.no_penalty_age = 60;
        config.state_tax_after_retirement = 0.0;
        let mut inputs = gap_year_inputs(&config);
        inputs.distribution = 220_000.0;

        let gain = 56_750.0;
        let exposed = 220_000.0 + gain - 250_000.0;
        assert_abs_diff_eq!(
            capital_gains_tax(&config, &inputs),
            gain * 0.15 + exposed * 0.038,
            epsilon = 1e-9
        );

        inputs.distribution = 300_000.0;
        assert_abs_diff_eq!(
            capital_gains_tax(&config, &inputs),
            gain * 0.15 + gain * 0.038,
            epsilon = 1e-9
        );
    }

    #[test]
    fn short_investment_account_falls_back_to_roth_untaxed() {
        let mut config = sample_config();
        config.person.retirement_age = 55;
        config.no_penalty_age = 60;
        let mut inputs = gap_year_inputs(&config);
        inputs.investment_balance = 10_000.0;

        assert_eq!(capital_gains_tax(&config, &inputs), 0.0);
    }

    #[test]
    fn no_gains_tax_when_social_security_exceeds_spending() {
        let mut config = sample_config();
        config.person.retirement_age = 55;
        config.no_penalty_age = 60;
        config.state_tax_after_retirement = 0.02;
        let mut inputs = gap_year_inputs(&config);
        inputs.age = 56;
        inputs.spending_after_social_security = -20_000.0;
        inputs.other_tax = 0.0;
        inputs.distribution = 200_000.0;

        assert_eq!(capital_gains_tax(&config, &inputs), 0.0);
    }

    proptest! {
        #[test]
        fn prop_gains_tax_is_never_negative(
            age in 55u32..60,
            spending in -100_000i32..200_000,
            other_tax in 0u32..50_000,
            distribution in 0u32..500_000
        ) {
            let mut config = sample_config();
            config.person.retirement_age = 55;
            config.no_penalty_age = 60;
            config.state_tax_after_retirement = 0.03;
            let inputs = CapitalGainsInputs {
                age,
                year: 2030,
                other_tax: other_tax as f64,
                distribution: distribution as f64,
                spending_after_social_security: spending as f64,
                investment_balance: 5_000_000.0,
            };
            prop_assert!(capital_gains_tax(&config, &inputs) >= 0.0);
        }

        #[test]
        fn prop_no_gains_tax_outside_gap_years(
            age in 18u32..100,
            spending in 0u32..500_000,
            other_tax in 0u32..200_000,
            distribution in 0u32..1_000_000,
            investment in 0u32..5_000_000
        ) {
            let mut config = sample_config();
            config.person.retirement_age = 55;
            config.no_penalty_age = 60;
            let inputs = CapitalGainsInputs {
                age,
                year: 2040,
                other_tax: other_tax as f64,
                distribution: distribution as f64,
                spending_after_social_security: spending as f64,
                investment_balance: investment as f64,
            };
            if !(55..60).contains(&age) {
                prop_assert_eq!(capital_gains_tax(&config, &inputs), 0.0);
            }
        }
    }
}
