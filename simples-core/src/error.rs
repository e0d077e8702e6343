use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the calculation engine and the annex table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimplesError {
    /// The annex code is not one of the five recognised annexes.
    #[error("unknown annex '{0}'")]
    UnknownAnnex(String),

    /// A revenue figure is negative, or zero where a positive value is required.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The trailing revenue is above the regime ceiling and the ceiling is enforced.
    #[error("gross income {gross_income} exceeds the regime ceiling of {ceiling}")]
    OutOfRangeRevenue {
        gross_income: Decimal,
        ceiling: Decimal,
    },

    /// The reference table violates one of its invariants. Only raised while
    /// building a table; a table that fails here must never serve requests.
    #[error("inconsistent annex table: {0}")]
    InconsistentTable(String),
}

impl SimplesError {
    /// Stable, machine-readable identifier of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownAnnex(_) => "UNKNOWN_ANNEX",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::OutOfRangeRevenue { .. } => "OUT_OF_RANGE_REVENUE",
            Self::InconsistentTable(_) => "INCONSISTENT_TABLE",
        }
    }
}
