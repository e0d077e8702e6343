//! The full monthly calculation over an annex table.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use simples_core::calculations::{CeilingPolicy, SimplesCalculator};
//! use simples_core::{Annex, AnnexTable, CalculationInput, SubTax};
//! # fn run(table: &AnnexTable) -> Result<(), simples_core::SimplesError> {
//!
//! let calculator = SimplesCalculator::new(table, CeilingPolicy::Reject);
//! let result = calculator.calculate(&CalculationInput {
//!     annex: Annex::I,
//!     gross_income: dec!(400000.00),
//!     month_income: dec!(30000.00),
//! })?;
//!
//! assert_eq!(result.bracket.label, "3ª Faixa");
//! assert_eq!(result.effective_tax_rate, dec!(6.035));
//! assert_eq!(result.tax_due, dec!(1810.50));
//! assert_eq!(result.partition_breakdown.total_amount(), result.tax_due);
//! # Ok(())
//! # }
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{round_half_up, round_rate};
use crate::calculations::{BracketResolver, CeilingPolicy, PartitionEngine, RateCalculator};
use crate::{AnnexTable, CalculationInput, CalculationResult, SimplesError};

/// Runs resolver, rate calculator and partition engine in sequence.
///
/// Holds only a shared reference to an immutable table, so any number of
/// calculators can run concurrently against the same table.
#[derive(Debug, Clone, Copy)]
pub struct SimplesCalculator<'a> {
    table: &'a AnnexTable,
    policy: CeilingPolicy,
}

impl<'a> SimplesCalculator<'a> {
    pub fn new(
        table: &'a AnnexTable,
        policy: CeilingPolicy,
    ) -> Self {
        Self { table, policy }
    }

    /// Computes the month's tax for `input`.
    ///
    /// # Errors
    ///
    /// - [`SimplesError::InvalidInput`] if the trailing revenue is zero or
    ///   negative, or the month revenue is negative.
    /// - [`SimplesError::OutOfRangeRevenue`] if the trailing revenue is above
    ///   the ceiling and the policy rejects.
    pub fn calculate(
        &self,
        input: &CalculationInput,
    ) -> Result<CalculationResult, SimplesError> {
        if input.month_income < Decimal::ZERO {
            return Err(SimplesError::InvalidInput(format!(
                "month income must not be negative, got {}",
                input.month_income
            )));
        }
        if input.gross_income <= Decimal::ZERO {
            return Err(SimplesError::InvalidInput(format!(
                "gross income must be greater than zero, got {}",
                input.gross_income
            )));
        }

        let bracket = BracketResolver::new(self.table, self.policy)
            .resolve(input.annex, input.gross_income)?;
        let effective_rate = RateCalculator.effective_rate(bracket, input.gross_income)?;
        let tax_due = RateCalculator.tax_due(effective_rate, input.month_income)?;
        let partition_breakdown = PartitionEngine.partition(bracket, effective_rate, tax_due)?;

        debug!(
            annex = %input.annex,
            bracket = %bracket.label,
            %effective_rate,
            %tax_due,
            "calculation complete"
        );

        Ok(CalculationResult {
            annex: input.annex,
            gross_income: round_half_up(input.gross_income),
            month_income: round_half_up(input.month_income),
            bracket: bracket.clone(),
            effective_tax_rate: round_rate(effective_rate),
            tax_due,
            partition_breakdown,
        })
    }
}
