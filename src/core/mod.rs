mod brackets;
mod distribution;
mod engine;
mod error;
mod medicare;
mod milestones;
mod rmd;
mod social_security;
mod tables;
mod tax;
mod types;

pub use brackets::{TaxBracket, TaxBracketTable, TaxBracketYear};
pub use distribution::{DistributionInputs, bracket_headroom, distribution_amount};
pub use engine::{calculate_yearly, partial_year_factor, project, run_yearly_projection};
pub use error::{ProjectionError, ProjectionTable};
pub use medicare::{MedicarePremiumTable, MedicarePremiumYear, PremiumTier};
pub use milestones::{milestone_title, milestone_views};
pub use rmd::{required_minimum_distribution, rmd_divisor};
pub use social_security::{social_security_benefit, taxable_social_security};
pub use tables::ProjectionTables;
pub use tax::{
    CapitalGainsInputs, capital_gains_tax, fica_tax, ordinary_income_tax,
    social_security_wage_base, zero_rate_gains_ceiling,
};
pub use types::{
    AsOf, BASELINE_YEAR, ContributionPlan, DistributionPolicy, MilestoneView, Milestones, Person,
    Projection, SimulationConfig, SocialSecurity, SpendingPlan, YearlyRecord,
};

#[cfg(test)]
pub(crate) mod test_support {
    use super::types::{
        AsOf, ContributionPlan, DistributionPolicy, Person, SimulationConfig, SocialSecurity,
        SpendingPlan,
    };

    /// Household used across the unit tests: 50 years old in July 2026,
    /// retiring at 60.
    pub fn sample_config() -> SimulationConfig {
        SimulationConfig {
            person: Person {
                age: 50,
                salary: 150_000.0,
                pretax_balance: 500_000.0,
                investment_balance: 100_000.0,
                roth_balance: 100_000.0,
                retirement_age: 60,
                deceased_age: 88,
            },
            spending: SpendingPlan {
                before_retirement: 80_000.0,
                after_retirement: 70_000.0,
                insurance: 20_000.0,
            },
            contributions: ContributionPlan {
                employee_rate: 0.06,
                employer_match_rate: 0.5,
                employer_match_cap: 0.06,
                roth_401k_rate: 0.0,
            },
            social_security: SocialSecurity {
                claim_age: 62,
                monthly_amount: 3_000.0,
            },
            distribution: DistributionPolicy {
                start_age: 60,
                target_bracket: Some(12),
                offset: 0.0,
            },
            medicare_age: 65,
            rmd_age: 75,
            no_penalty_age: 60,
            return_before_retirement: 0.12,
            return_after_retirement: 0.06,
            merit_increase: 0.02,
            inflation: 0.028,
            state_tax_before_retirement: 0.05,
            state_tax_after_retirement: 0.0,
            as_of: AsOf {
                year: 2026,
                month: 7,
            },
        }
    }
}
