use thiserror::Error;

/// Which projected table a lookup went to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProjectionTable {
    TaxBrackets,
    MedicarePremiums,
}

impl std::fmt::Display for ProjectionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionTable::TaxBrackets => f.write_str("tax bracket"),
            ProjectionTable::MedicarePremiums => f.write_str("medicare premium"),
        }
    }
}

/// Errors that abort a projection run. A failed run never yields partial records.
#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("invalid configuration: {field} {reason}")]
    Configuration { field: &'static str, reason: String },

    #[error("no RMD divisor for age {age}; the uniform lifetime table covers ages 72 to 100")]
    OutOfRange { age: u32 },

    #[error("{table} table has no entry for year {year}")]
    NotFound { table: ProjectionTable, year: i32 },
}

impl ProjectionError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        ProjectionError::Configuration {
            field,
            reason: reason.into(),
        }
    }
}
