use log::{info, warn};

use super::distribution::{DistributionInputs, distribution_amount};
use super::error::ProjectionError;
use super::milestones::{milestone_title, milestone_views};
use super::rmd::required_minimum_distribution;
use super::social_security::{social_security_benefit, taxable_social_security};
use super::tables::ProjectionTables;
use super::tax::{CapitalGainsInputs, capital_gains_tax, fica_tax, ordinary_income_tax};
use super::types::{AsOf, ContributionPlan, Projection, SimulationConfig, YearlyRecord};

/// Medicare premiums are set from income two years earlier.
const MEDICARE_LOOK_BACK_YEARS: i32 = 2;
/// Two enrolled people, twelve months.
const HOUSEHOLD_PREMIUM_MONTHS: f64 = 24.0;

#[derive(Debug)]
struct RunningState {
    age: u32,
    year: i32,
    salary: f64,
    pretax_balance: f64,
    investment_balance: f64,
    roth_balance: f64,
    spending_before_retirement: f64,
    spending_after_retirement: f64,
}

impl RunningState {
    fn from_config(config: &SimulationConfig) -> Self {
        let person = &config.person;
        Self {
            age: person.age,
            year: config.as_of.year,
            salary: person.salary,
            pretax_balance: person.pretax_balance,
            investment_balance: person.investment_balance,
            roth_balance: person.roth_balance,
            spending_before_retirement: config.spending.before_retirement,
            spending_after_retirement: config.spending.after_retirement,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ContributionFlow {
    k401: f64,
    k401_employee: f64,
    roth_401k: f64,
}

/// What the roll-forward into next year needs from the year just simulated.
#[derive(Debug, Clone, Copy)]
struct YearFlows {
    partial_year: f64,
    taxable_earned_income: f64,
    k401: f64,
    roth_401k: f64,
    distribution: f64,
    spending_after_social_security: f64,
    total_tax: f64,
}

impl YearFlows {
    fn outflow(self) -> f64 {
        self.spending_after_social_security + self.total_tax
    }
}

/// Full projection: one record per age from the current age through the
/// deceased age, plus the milestone views over those records.
pub fn project(config: &SimulationConfig) -> Result<Projection, ProjectionError> {
    let years = calculate_yearly(config)?;
    let milestones = milestone_views(config, &years);
    Ok(Projection { years, milestones })
}

pub fn calculate_yearly(config: &SimulationConfig) -> Result<Vec<YearlyRecord>, ProjectionError> {
    let tables = ProjectionTables::new(config);
    run_yearly_projection(config, &tables)
}

/// Drive the year loop against tables owned by the caller's run. The config
/// is validated before any year is simulated.
pub fn run_yearly_projection(
    config: &SimulationConfig,
    tables: &ProjectionTables<'_>,
) -> Result<Vec<YearlyRecord>, ProjectionError> {
    config.validate()?;
    let person = &config.person;
    info!(
        "projecting ages {}..={} starting {}-{:02}",
        person.age, person.deceased_age, config.as_of.year, config.as_of.month
    );

    let mut state = RunningState::from_config(config);
    let mut years = Vec::with_capacity((person.deceased_age - person.age + 1) as usize);
    let mut warned_negative = false;

    for index in 0..=(person.deceased_age - person.age) {
        let (record, flows) = simulate_year(config, tables, &mut state, index == 0)?;
        if !warned_negative && (record.investment_balance < 0.0 || record.roth_balance < 0.0) {
            warn!(
                "balances go negative at age {} (investment {:.0}, roth {:.0})",
                record.age, record.investment_balance, record.roth_balance
            );
            warned_negative = true;
        }
        years.push(record);
        roll_forward(config, &mut state, flows);
    }

    Ok(years)
}

/// Share of the calendar year still ahead in the starting month, to the
/// nearest percent. Every later year counts in full.
pub fn partial_year_factor(as_of: AsOf, year: i32) -> f64 {
    if year != as_of.year {
        return 1.0;
    }
    let months_left = 13 - as_of.month.clamp(1, 12);
    (months_left as f64 / 12.0 * 100.0).round() / 100.0
}

fn simulate_year(
    config: &SimulationConfig,
    tables: &ProjectionTables<'_>,
    state: &mut RunningState,
    first_year: bool,
) -> Result<(YearlyRecord, YearFlows), ProjectionError> {
    let age = state.age;
    let year = state.year;
    let partial_year = partial_year_factor(config.as_of, year);

    let spending_amount = if age < config.person.retirement_age {
        apply_pre_retirement_growth(config, state, first_year, partial_year);
        state.spending_before_retirement * partial_year
    } else {
        apply_post_retirement_growth(config, state, first_year);
        let mut amount = state.spending_after_retirement;
        if age < config.medicare_age {
            amount += insurance_spending(config, year);
        }
        amount
    };

    let contributions = contributions_for_year(&config.contributions, state.salary, partial_year);
    let taxable_earned_income = state.salary - contributions.k401_employee;

    let rmd = if age >= config.rmd_age {
        required_minimum_distribution(state.pretax_balance, age)?
    } else {
        0.0
    };
    let distribution = distribution_amount(
        config,
        tables.tax_brackets(),
        &DistributionInputs {
            age,
            year,
            pretax_balance: state.pretax_balance,
            taxable_ordinary_income: taxable_earned_income,
            rmd,
        },
    )?;
    let taxable_ordinary_income = taxable_earned_income + distribution;

    let social_security = social_security_benefit(config, age);
    let mut spending_after_social_security = spending_amount - social_security;

    let fica = fica_tax(state.salary, year);
    let taxable_ss = taxable_social_security(taxable_earned_income, social_security);
    let ordinary_tax = ordinary_income_tax(
        tables.tax_brackets(),
        taxable_ordinary_income + taxable_ss,
        year,
    )?;
    let capital_gains = capital_gains_tax(
        config,
        &CapitalGainsInputs {
            age,
            year,
            other_tax: ordinary_tax + fica,
            distribution,
            spending_after_social_security,
            investment_balance: state.investment_balance,
        },
    );
    let state_tax = taxable_ordinary_income * state_tax_rate(config, age);
    let total_tax = ordinary_tax + fica + capital_gains + state_tax;

    let medicare_premium = if age >= config.medicare_age {
        let magi = taxable_ordinary_income + taxable_ss;
        tables
            .medicare_premiums()
            .monthly_premium(magi, year - MEDICARE_LOOK_BACK_YEARS)?
            * HOUSEHOLD_PREMIUM_MONTHS
    } else {
        0.0
    };
    spending_after_social_security += medicare_premium;

    let record = YearlyRecord {
        age,
        year,
        title: milestone_title(config, age),
        salary: state.salary,
        pretax_balance: state.pretax_balance,
        investment_balance: state.investment_balance,
        roth_balance: state.roth_balance,
        k401_contribution: contributions.k401,
        roth_401k_contribution: contributions.roth_401k,
        rmd_amount: rmd,
        distribution_amount: distribution,
        spending_amount,
        social_security_benefit: social_security,
        taxable_social_security: taxable_ss,
        medicare_premium,
        fica_tax: fica,
        ordinary_income_tax: ordinary_tax,
        capital_gains_tax: capital_gains,
        state_tax,
        total_tax,
        net_worth: state.pretax_balance + state.investment_balance + state.roth_balance,
    };

    let flows = YearFlows {
        partial_year,
        taxable_earned_income,
        k401: contributions.k401,
        roth_401k: contributions.roth_401k,
        distribution,
        spending_after_social_security,
        total_tax,
    };

    Ok((record, flows))
}

fn apply_pre_retirement_growth(
    config: &SimulationConfig,
    state: &mut RunningState,
    first_year: bool,
    partial_year: f64,
) {
    let growth = config.return_before_retirement * partial_year;
    state.salary = grow(first_year, state.salary, config.merit_increase * partial_year);
    state.pretax_balance = grow(first_year, state.pretax_balance, growth);
    state.investment_balance = grow(first_year, state.investment_balance, growth);
    state.roth_balance = grow(first_year, state.roth_balance, growth);
}

fn apply_post_retirement_growth(config: &SimulationConfig, state: &mut RunningState, first_year: bool) {
    let growth = config.return_after_retirement;
    state.salary = 0.0;
    state.pretax_balance = grow(first_year, state.pretax_balance, growth);
    state.investment_balance = grow(first_year, state.investment_balance, growth);
    state.roth_balance = grow(first_year, state.roth_balance, growth);
}

/// The starting year has already been partly lived, and a negative balance
/// earns nothing.
fn grow(first_year: bool, amount: f64, rate: f64) -> f64 {
    if first_year || amount < 0.0 {
        amount
    } else {
        amount * (1.0 + rate)
    }
}

fn contributions_for_year(plan: &ContributionPlan, salary: f64, partial_year: f64) -> ContributionFlow {
    let prorated_salary = salary * partial_year;
    ContributionFlow {
        k401: prorated_salary * plan.total_rate(),
        k401_employee: prorated_salary * plan.employee_rate,
        roth_401k: prorated_salary * plan.roth_total_rate(),
    }
}

/// Insurance budget bridging retirement to Medicare, inflated every calendar
/// year after the start year.
fn insurance_spending(config: &SimulationConfig, year: i32) -> f64 {
    let years_inflated = (year - config.as_of.year).max(0);
    config.spending.insurance * (1.0 + config.inflation).powi(years_inflated)
}

fn state_tax_rate(config: &SimulationConfig, age: u32) -> f64 {
    if age < config.person.retirement_age {
        config.state_tax_before_retirement
    } else {
        config.state_tax_after_retirement
    }
}

fn roll_forward(config: &SimulationConfig, state: &mut RunningState, flows: YearFlows) {
    state.age += 1;
    state.year += 1;
    state.roth_balance += flows.distribution + flows.roth_401k;

    if state.age < config.person.retirement_age {
        state.investment_balance += (flows.taxable_earned_income
            - flows.roth_401k
            - flows.outflow())
            * flows.partial_year;
    } else if state.age >= config.no_penalty_age {
        state.roth_balance -= flows.outflow();
    } else {
        // Pretax withdrawals before the no-penalty age would cost 10%.
        state.investment_balance -= flows.outflow();
    }

    state.pretax_balance += flows.k401 - flows.distribution;
    state.spending_before_retirement *= 1.0 + config.inflation;
    state.spending_after_retirement *= 1.0 + config.inflation;
}
