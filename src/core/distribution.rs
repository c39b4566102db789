use super::brackets::TaxBracketTable;
use super::error::ProjectionError;
use super::types::SimulationConfig;

#[derive(Debug, Clone, Copy)]
pub struct DistributionInputs {
    pub age: u32,
    pub year: i32,
    pub pretax_balance: f64,
    /// Ordinary income already taxable this year, before any distribution.
    pub taxable_ordinary_income: f64,
    pub rmd: f64,
}

/// Room left under the target bracket's ceiling (plus the configured offset)
/// once this year's other ordinary income is counted.
pub fn bracket_headroom(
    config: &SimulationConfig,
    brackets: &TaxBracketTable,
    inputs: &DistributionInputs,
) -> Result<f64, ProjectionError> {
    let policy = &config.distribution;
    let Some(target) = policy.target_bracket else {
        return Ok(0.0);
    };
    if inputs.age < policy.start_age {
        return Ok(0.0);
    }

    let Some(ceiling) = brackets.for_year(inputs.year)?.ceiling_for_rate(target) else {
        return Ok(0.0);
    };
    Ok((ceiling + policy.offset - inputs.taxable_ordinary_income).max(0.0))
}

/// Pretax dollars moved out this year: fill the target bracket, never less
/// than the RMD and never more than the balance.
pub fn distribution_amount(
    config: &SimulationConfig,
    brackets: &TaxBracketTable,
    inputs: &DistributionInputs,
) -> Result<f64, ProjectionError> {
    if inputs.pretax_balance <= 0.0 {
        return Ok(0.0);
    }

    let headroom = bracket_headroom(config, brackets, inputs)?;
    let conversion = inputs.pretax_balance.min(headroom);
    Ok(conversion.max(inputs.rmd.clamp(0.0, inputs.pretax_balance)))
}
