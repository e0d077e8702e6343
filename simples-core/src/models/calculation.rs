use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::{Annex, Bracket, SubTax};
use crate::SimplesError;

/// Input for a single monthly calculation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CalculationInput {
    pub annex: Annex,
    /// Gross revenue of the trailing twelve months (RBT12).
    pub gross_income: Decimal,
    /// Gross revenue of the month being computed.
    pub month_income: Decimal,
}

impl CalculationInput {
    /// Builds an input from a wire annex code.
    ///
    /// # Errors
    ///
    /// Returns [`SimplesError::UnknownAnnex`] if `code` names no annex.
    pub fn from_code(
        code: &str,
        gross_income: Decimal,
        month_income: Decimal,
    ) -> Result<Self, SimplesError> {
        Ok(Self {
            annex: Annex::from_code(code)?,
            gross_income,
            month_income,
        })
    }
}

/// One sub-tax's slice of the tax due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Partition {
    /// Share of the total tax, as configured for the bracket (0-100).
    pub percent_of_tax: Decimal,
    /// Portion of the effective rate attributable to this sub-tax (percent).
    pub effective_rate: Decimal,
    pub amount: Decimal,
}

/// Per-sub-tax split of a calculation, in canonical sub-tax order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartitionBreakdown {
    entries: Vec<(SubTax, Partition)>,
}

impl PartitionBreakdown {
    pub(crate) fn new(mut entries: Vec<(SubTax, Partition)>) -> Self {
        entries.sort_by_key(|(k, _)| *k);
        Self { entries }
    }

    pub fn get(
        &self,
        sub_tax: SubTax,
    ) -> Option<&Partition> {
        self.entries
            .iter()
            .find(|(k, _)| *k == sub_tax)
            .map(|(_, p)| p)
    }

    pub fn contains(
        &self,
        sub_tax: SubTax,
    ) -> bool {
        self.get(sub_tax).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SubTax, &Partition)> {
        self.entries.iter().map(|(k, p)| (*k, p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_amount(&self) -> Decimal {
        self.entries.iter().map(|(_, p)| p.amount).sum()
    }
}

impl Serialize for PartitionBreakdown {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (sub_tax, partition) in &self.entries {
            map.serialize_entry(sub_tax.key(), partition)?;
        }
        map.end()
    }
}

/// Outcome of a calculation. Built once by the calculator and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationResult {
    pub annex: Annex,
    pub gross_income: Decimal,
    pub month_income: Decimal,
    /// The bracket the trailing revenue fell into.
    pub bracket: Bracket,
    /// Effective rate as a percentage, rounded to four decimal places.
    pub effective_tax_rate: Decimal,
    pub tax_due: Decimal,
    pub partition_breakdown: PartitionBreakdown,
}
