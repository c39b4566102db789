use super::types::{MilestoneView, Milestones, SimulationConfig, YearlyRecord};

/// Row titles in display order. Every rule whose age matches contributes.
fn title_rules(config: &SimulationConfig) -> [(u32, &'static str); 6] {
    [
        (config.person.retirement_age, "Retirement starts"),
        (config.rmd_age, "Required Minimum Distribution starts"),
        (config.medicare_age, "Medicare starts"),
        (config.social_security.claim_age, "Social Security benefit starts"),
        (config.distribution.start_age, "Roth Conversion starts"),
        (
            config.no_penalty_age,
            "Penalty free withdraw from pretax accounts starts",
        ),
    ]
}

pub fn milestone_title(config: &SimulationConfig, age: u32) -> String {
    title_rules(config)
        .iter()
        .filter(|(milestone_age, _)| *milestone_age == age)
        .map(|(_, title)| *title)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn milestone_views(config: &SimulationConfig, years: &[YearlyRecord]) -> Milestones {
    let view = |age: u32| MilestoneView {
        age,
        record: years.iter().find(|r| r.age == age).cloned(),
    };

    Milestones {
        current: view(config.person.age),
        retirement: view(config.person.retirement_age),
        rmd: view(config.rmd_age),
        medicare: view(config.medicare_age),
        social_security: view(config.social_security.claim_age),
        distribution: view(config.distribution.start_age),
        no_penalty_withdrawal: view(config.no_penalty_age),
        deceased: view(config.person.deceased_age),
    }
}
