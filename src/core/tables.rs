use std::cell::OnceCell;

use super::brackets::TaxBracketTable;
use super::medicare::MedicarePremiumTable;
use super::types::SimulationConfig;

/// Projected tables for one run. Each table is built on first use from the
/// run's config and is read-only afterwards; a new config needs new tables.
pub struct ProjectionTables<'a> {
    config: &'a SimulationConfig,
    tax_brackets: OnceCell<TaxBracketTable>,
    medicare_premiums: OnceCell<MedicarePremiumTable>,
}

impl<'a> ProjectionTables<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self {
            config,
            tax_brackets: OnceCell::new(),
            medicare_premiums: OnceCell::new(),
        }
    }

    pub fn tax_brackets(&self) -> &TaxBracketTable {
        self.tax_brackets.get_or_init(|| TaxBracketTable::build(self.config))
    }

    pub fn medicare_premiums(&self) -> &MedicarePremiumTable {
        self.medicare_premiums.get_or_init(|| MedicarePremiumTable::build(self.config))
    }
}
