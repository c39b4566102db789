use serde::Serialize;

use super::error::ProjectionError;

/// First calendar year of every projected table.
pub const BASELINE_YEAR: i32 = 2025;

/// Calendar month the projection starts in. The first simulated year is
/// pro-rated by the months remaining in it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AsOf {
    pub year: i32,
    /// 1 = January.
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub age: u32,
    pub salary: f64,
    pub pretax_balance: f64,
    pub investment_balance: f64,
    pub roth_balance: f64,
    pub retirement_age: u32,
    pub deceased_age: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpendingPlan {
    pub before_retirement: f64,
    pub after_retirement: f64,
    /// Private health insurance paid between retirement and Medicare.
    pub insurance: f64,
}

/// 401(k) contribution percentages, stored as fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionPlan {
    pub employee_rate: f64,
    /// Share of the employee contribution the employer matches (0.5 = 50%).
    pub employer_match_rate: f64,
    /// Employee contribution rate above which the employer stops matching.
    pub employer_match_cap: f64,
    pub roth_401k_rate: f64,
}

impl ContributionPlan {
    /// Employee plus matched rate, e.g. 7% with a 50% match up to 6% is 10%.
    pub fn total_rate(&self) -> f64 {
        total_with_match(self.employee_rate, self)
    }

    pub fn roth_total_rate(&self) -> f64 {
        total_with_match(self.roth_401k_rate, self)
    }
}

fn total_with_match(rate: f64, plan: &ContributionPlan) -> f64 {
    rate + rate.min(plan.employer_match_cap) * plan.employer_match_rate
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocialSecurity {
    pub claim_age: u32,
    pub monthly_amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionPolicy {
    pub start_age: u32,
    /// Marginal bracket, in whole percent, to fill with conversions each year.
    /// `None` converts nothing beyond the RMD.
    pub target_bracket: Option<u32>,
    /// Flat amount added to the bracket ceiling.
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub person: Person,
    pub spending: SpendingPlan,
    pub contributions: ContributionPlan,
    pub social_security: SocialSecurity,
    pub distribution: DistributionPolicy,
    pub medicare_age: u32,
    pub rmd_age: u32,
    pub no_penalty_age: u32,
    pub return_before_retirement: f64,
    pub return_after_retirement: f64,
    pub merit_increase: f64,
    pub inflation: f64,
    pub state_tax_before_retirement: f64,
    pub state_tax_after_retirement: f64,
    pub as_of: AsOf,
}

impl SimulationConfig {
    /// Calendar year in which the person reaches `age`.
    pub fn year_at_age(&self, age: u32) -> i32 {
        self.as_of.year + age as i32 - self.person.age as i32
    }

    pub fn age_in_year(&self, year: i32) -> i64 {
        self.person.age as i64 + (year - self.as_of.year) as i64
    }

    pub fn death_year(&self) -> i32 {
        self.year_at_age(self.person.deceased_age)
    }

    pub fn validate(&self) -> Result<(), ProjectionError> {
        let person = &self.person;

        for (field, value) in [
            ("salary", person.salary),
            ("pretax balance", person.pretax_balance),
            ("investment balance", person.investment_balance),
            ("roth balance", person.roth_balance),
            ("spending before retirement", self.spending.before_retirement),
            ("spending after retirement", self.spending.after_retirement),
            ("insurance spending", self.spending.insurance),
            ("social security monthly amount", self.social_security.monthly_amount),
            ("employee contribution", self.contributions.employee_rate),
            ("employer match", self.contributions.employer_match_rate),
            ("employer match cap", self.contributions.employer_match_cap),
            ("roth 401k contribution", self.contributions.roth_401k_rate),
            ("merit increase", self.merit_increase),
            ("inflation", self.inflation),
            ("state tax before retirement", self.state_tax_before_retirement),
            ("state tax after retirement", self.state_tax_after_retirement),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProjectionError::config(
                    field,
                    format!("must be a finite value >= 0 (got {value})"),
                ));
            }
        }

        for (field, value) in [
            ("return before retirement", self.return_before_retirement),
            ("return after retirement", self.return_after_retirement),
        ] {
            if !value.is_finite() || value <= -1.0 {
                return Err(ProjectionError::config(
                    field,
                    format!("must be greater than -100% (got {value})"),
                ));
            }
        }

        if !self.distribution.offset.is_finite() {
            return Err(ProjectionError::config("distribution offset", "must be finite"));
        }

        if person.retirement_age < person.age {
            return Err(ProjectionError::config(
                "retirement age",
                format!("must be >= current age {}", person.age),
            ));
        }

        if person.deceased_age <= person.retirement_age {
            return Err(ProjectionError::config(
                "deceased age",
                format!("must be > retirement age {}", person.retirement_age),
            ));
        }

        if !(1..=12).contains(&self.as_of.month) {
            return Err(ProjectionError::config(
                "start month",
                format!("must be between 1 and 12 (got {})", self.as_of.month),
            ));
        }

        if self.as_of.year < BASELINE_YEAR {
            return Err(ProjectionError::config(
                "start year",
                format!("must not precede the {BASELINE_YEAR} tax baseline"),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRecord {
    pub age: u32,
    pub year: i32,
    pub title: String,
    pub salary: f64,
    pub pretax_balance: f64,
    pub investment_balance: f64,
    pub roth_balance: f64,
    pub k401_contribution: f64,
    pub roth_401k_contribution: f64,
    pub rmd_amount: f64,
    pub distribution_amount: f64,
    pub spending_amount: f64,
    pub social_security_benefit: f64,
    pub taxable_social_security: f64,
    pub medicare_premium: f64,
    pub fica_tax: f64,
    pub ordinary_income_tax: f64,
    pub capital_gains_tax: f64,
    pub state_tax: f64,
    pub total_tax: f64,
    pub net_worth: f64,
}

/// A configured milestone age with the simulated year at that age, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneView {
    pub age: u32,
    pub record: Option<YearlyRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestones {
    pub current: MilestoneView,
    pub retirement: MilestoneView,
    pub rmd: MilestoneView,
    pub medicare: MilestoneView,
    pub social_security: MilestoneView,
    pub distribution: MilestoneView,
    pub no_penalty_withdrawal: MilestoneView,
    pub deceased: MilestoneView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub years: Vec<YearlyRecord>,
    pub milestones: Milestones,
}
