//! Effective rate and monthly tax due.
//!
//! The regime's progressive formula, with `g` the trailing revenue (RBT12):
//!
//! ```text
//! effective_rate = (g * nominal_rate / 100 - deduction) / g
//! tax_due        = effective_rate * month_income
//! ```
//!
//! Rates here are percentages, so the effective rate is computed as
//! `(g * nominal_rate - deduction * 100) / g` in a single division.

use rust_decimal::Decimal;

use crate::Bracket;
use crate::SimplesError;
use crate::calculations::common::{max, round_half_up};

fn too_large(
    what: &str,
    value: Decimal,
) -> SimplesError {
    SimplesError::InvalidInput(format!("{what} {value} is too large to compute"))
}

/// Stateless calculator for the effective rate and the tax due.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateCalculator;

impl RateCalculator {
    /// Effective rate (percent, unrounded) for `gross_income` in `bracket`.
    ///
    /// A negative result is clamped to zero. Validated tables cannot produce
    /// one inside a bracket's range.
    ///
    /// # Errors
    ///
    /// Returns [`SimplesError::InvalidInput`] if `gross_income` is zero or
    /// negative, or so large that the formula leaves the decimal range.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use simples_core::calculations::RateCalculator;
    /// # use simples_core::{Bracket, LocalTaxShare, PartitionSpec};
    /// # let bracket = Bracket {
    /// #     label: "2ª Faixa".to_string(),
    /// #     revenue_min: dec!(180000.00),
    /// #     revenue_max: dec!(360000.00),
    /// #     nominal_rate: dec!(7.30),
    /// #     deduction_amount: dec!(5940.00),
    /// #     partition: PartitionSpec {
    /// #         irpj: dec!(5.50), csll: dec!(3.50), cofins: dec!(12.74),
    /// #         pis_pasep: dec!(2.76), cpp: dec!(41.50), ipi: None,
    /// #         local: LocalTaxShare::Icms(dec!(34.00)),
    /// #     },
    /// # };
    ///
    /// let rate = RateCalculator.effective_rate(&bracket, dec!(400000.00)).unwrap();
    /// assert_eq!(rate, dec!(5.815));
    ///
    /// let tax = RateCalculator.tax_due(rate, dec!(30000.00)).unwrap();
    /// assert_eq!(tax, dec!(1744.50));
    /// ```
    pub fn effective_rate(
        &self,
        bracket: &Bracket,
        gross_income: Decimal,
    ) -> Result<Decimal, SimplesError> {
        if gross_income <= Decimal::ZERO {
            return Err(SimplesError::InvalidInput(format!(
                "gross income must be greater than zero, got {gross_income}"
            )));
        }

        let rate = gross_income
            .checked_mul(bracket.nominal_rate)
            .zip(bracket.deduction_amount.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|(nominal, deduction)| nominal.checked_sub(deduction))
            .and_then(|taxable| taxable.checked_div(gross_income))
            .ok_or_else(|| too_large("gross income", gross_income))?;

        if rate < Decimal::ZERO {
            tracing::warn!(
                bracket = %bracket.label,
                %gross_income,
                %rate,
                "negative effective rate clamped to zero"
            );
        }

        Ok(max(rate, Decimal::ZERO))
    }

    /// Tax due on `month_income` at `effective_rate` (percent), in cents.
    ///
    /// # Errors
    ///
    /// Returns [`SimplesError::InvalidInput`] if `month_income` is negative or
    /// the tax would leave the decimal range.
    pub fn tax_due(
        &self,
        effective_rate: Decimal,
        month_income: Decimal,
    ) -> Result<Decimal, SimplesError> {
        if month_income < Decimal::ZERO {
            return Err(SimplesError::InvalidInput(format!(
                "month income must not be negative, got {month_income}"
            )));
        }

        let tax = effective_rate
            .checked_mul(month_income)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| too_large("month income", month_income))?;

        Ok(round_half_up(tax))
    }
}
