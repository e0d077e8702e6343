//! Bracket selection from the trailing twelve-month revenue.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Annex, AnnexTable, Bracket, SimplesError};

/// What to do with a trailing revenue above the top of the last bracket.
///
/// Companies above the ceiling are excluded from the regime, so the default
/// is to reject. Revenue equal to the ceiling is always accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingPolicy {
    /// Fail with [`SimplesError::OutOfRangeRevenue`].
    #[default]
    Reject,
    /// Keep computing with the last bracket.
    ClampToLastBracket,
}

/// Finds the bracket a trailing revenue falls into.
///
/// Brackets are half-open, so a revenue equal to a boundary resolves to the
/// bracket that starts there. The last bracket has no upper bound other than
/// the [`CeilingPolicy`].
#[derive(Debug, Clone, Copy)]
pub struct BracketResolver<'a> {
    table: &'a AnnexTable,
    policy: CeilingPolicy,
}

impl<'a> BracketResolver<'a> {
    pub fn new(
        table: &'a AnnexTable,
        policy: CeilingPolicy,
    ) -> Self {
        Self { table, policy }
    }

    /// # Errors
    ///
    /// - [`SimplesError::InvalidInput`] if `gross_income` is negative.
    /// - [`SimplesError::OutOfRangeRevenue`] if `gross_income` is above the
    ///   ceiling and the policy rejects.
    pub fn resolve(
        &self,
        annex: Annex,
        gross_income: Decimal,
    ) -> Result<&'a Bracket, SimplesError> {
        if gross_income < Decimal::ZERO {
            return Err(SimplesError::InvalidInput(format!(
                "gross income must not be negative, got {gross_income}"
            )));
        }

        let ceiling = self.table.ceiling(annex);
        if self.policy == CeilingPolicy::Reject && gross_income > ceiling {
            return Err(SimplesError::OutOfRangeRevenue {
                gross_income,
                ceiling,
            });
        }

        let brackets = self.table.brackets_for(annex);
        // Index of the first bracket starting above the revenue; the bracket
        // before it is the match. Tables always start at zero.
        let next = brackets.partition_point(|b| b.revenue_min <= gross_income);
        next.checked_sub(1)
            .and_then(|i| brackets.get(i))
            .ok_or_else(|| {
                SimplesError::InconsistentTable(format!("{annex}: no bracket covers {gross_income}"))
            })
    }
}
