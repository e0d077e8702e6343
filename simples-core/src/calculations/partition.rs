//! Split of the tax due across the sub-taxes of a bracket.
//!
//! Per-item rounding drifts: six shares of 0.01 each rounded half-up can add
//! up to 0.00 or 0.06. Amounts are therefore allocated by largest remainder.
//! Each sub-tax receives its exact share truncated to the cent, and the cents
//! still missing go one by one to the sub-taxes that lost the most to
//! truncation (ties in canonical sub-tax order). The amounts always add up to
//! the tax due.

use rust_decimal::Decimal;

use crate::calculations::common::{round_rate, truncate_cents};
use crate::{Bracket, Partition, PartitionBreakdown, SimplesError};

/// Stateless splitter of a computed tax across sub-taxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionEngine;

impl PartitionEngine {
    /// Splits `tax_due` according to `bracket`'s partition spec.
    ///
    /// `tax_due` must already be rounded to cents.
    ///
    /// `effective_rate` is the unrounded effective rate in percent; each
    /// sub-tax's rate is its share of it, rounded on output.
    ///
    /// # Errors
    ///
    /// Returns [`SimplesError::InvalidInput`] if a share of `tax_due` leaves
    /// the decimal range.
    pub fn partition(
        &self,
        bracket: &Bracket,
        effective_rate: Decimal,
        tax_due: Decimal,
    ) -> Result<PartitionBreakdown, SimplesError> {
        let shares = bracket.partition.shares();
        let cent = Decimal::new(1, 2);

        let mut allocations = Vec::with_capacity(shares.len());
        for (sub_tax, percent) in shares {
            let exact = tax_due
                .checked_mul(percent)
                .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
                .ok_or_else(|| {
                    SimplesError::InvalidInput(format!(
                        "tax due {tax_due} is too large to partition"
                    ))
                })?;
            let floor = truncate_cents(exact);
            allocations.push((sub_tax, percent, floor, exact - floor));
        }

        let allocated: Decimal = allocations.iter().map(|(_, _, floor, _)| *floor).sum();
        let mut leftover = tax_due - allocated;

        // Largest remainder first; ties in canonical order.
        let mut order: Vec<usize> = (0..allocations.len()).collect();
        order.sort_by(|&a, &b| {
            allocations[b]
                .3
                .cmp(&allocations[a].3)
                .then(allocations[a].0.cmp(&allocations[b].0))
        });

        // Shares within tolerance of 100 but above it can over-allocate; the
        // excess is taken back from the smallest remainders.
        while leftover <= -cent {
            let before = leftover;
            for &i in order.iter().rev() {
                if leftover > -cent {
                    break;
                }
                if allocations[i].2 >= cent {
                    allocations[i].2 -= cent;
                    leftover += cent;
                }
            }
            if leftover == before {
                break;
            }
        }

        while leftover >= cent && !order.is_empty() {
            for &i in &order {
                if leftover < cent {
                    break;
                }
                allocations[i].2 += cent;
                leftover -= cent;
            }
        }

        let entries = allocations
            .into_iter()
            .map(|(sub_tax, percent, amount, _)| {
                let partition = Partition {
                    percent_of_tax: percent,
                    effective_rate: round_rate(effective_rate * percent / Decimal::ONE_HUNDRED),
                    amount,
                };
                (sub_tax, partition)
            })
            .collect();

        Ok(PartitionBreakdown::new(entries))
    }
}
