use super::types::SimulationConfig;

const PROVISIONAL_INCOME_FIRST_TIER: f64 = 32_000.0;
const PROVISIONAL_INCOME_SECOND_TIER: f64 = 44_000.0;

/// Annual benefit at `age`: the nominal claim-year benefit, cost-of-living
/// adjusted by inflation every year after the claim age.
pub fn social_security_benefit(config: &SimulationConfig, age: u32) -> f64 {
    let ss = &config.social_security;
    if age < ss.claim_age {
        return 0.0;
    }
    let years_adjusted = (age - ss.claim_age) as i32;
    ss.monthly_amount * 12.0 * (1.0 + config.inflation).powi(years_adjusted)
}

/// Part of the benefit included in taxable income, by provisional income
/// (other income plus half the benefit).
pub fn taxable_social_security(other_income: f64, benefit: f64) -> f64 {
    let provisional = other_income + benefit / 2.0;
    if provisional < PROVISIONAL_INCOME_FIRST_TIER {
        0.0
    } else if provisional < PROVISIONAL_INCOME_SECOND_TIER {
        benefit * 0.5
    } else {
        benefit * 0.85
    }
}
