//! The validated reference table of brackets for every annex.
//!
//! An [`AnnexTable`] can only be obtained through [`AnnexTable::new`], which
//! checks every invariant the calculators rely on. Once built, a table is
//! immutable; replacing the rules means building a new table.

mod validation;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::{Annex, Bracket, SimplesError};

/// Brackets of all five annexes, each list sorted by `revenue_min`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnexTable {
    annexes: BTreeMap<Annex, Vec<Bracket>>,
}

impl AnnexTable {
    /// Builds a table, validating every annex.
    ///
    /// Brackets may be given in any order; they are sorted by `revenue_min`
    /// before validation.
    ///
    /// # Errors
    ///
    /// Returns [`SimplesError::InconsistentTable`] if an annex is missing or
    /// any bracket breaks contiguity, rate, deduction or partition rules.
    pub fn new(mut annexes: BTreeMap<Annex, Vec<Bracket>>) -> Result<Self, SimplesError> {
        for annex in Annex::ALL {
            let brackets = annexes.get_mut(&annex).ok_or_else(|| {
                SimplesError::InconsistentTable(format!("{annex}: annex has no brackets"))
            })?;
            brackets.sort_by(|a, b| a.revenue_min.cmp(&b.revenue_min));
            validation::validate_annex(annex, brackets)?;
        }

        let total: usize = annexes.values().map(Vec::len).sum();
        tracing::debug!(brackets = total, "annex table validated");

        Ok(Self { annexes })
    }

    /// Brackets of `annex`, ordered by `revenue_min`.
    pub fn brackets_for(
        &self,
        annex: Annex,
    ) -> &[Bracket] {
        self.annexes.get(&annex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// # Errors
    ///
    /// Returns [`SimplesError::UnknownAnnex`] if `code` names no annex.
    pub fn brackets_for_code(
        &self,
        code: &str,
    ) -> Result<&[Bracket], SimplesError> {
        Annex::from_code(code).map(|annex| self.brackets_for(annex))
    }

    pub fn all_annexes(&self) -> [Annex; 5] {
        Annex::ALL
    }

    /// Upper bound of the last bracket of `annex`.
    pub fn ceiling(
        &self,
        annex: Annex,
    ) -> Decimal {
        self.brackets_for(annex)
            .last()
            .map(|b| b.revenue_max)
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::fixtures::{legal_brackets, legal_table};
    use super::*;

    #[test]
    fn legal_table_is_consistent() {
        let table = legal_table();

        for annex in table.all_annexes() {
            assert_eq!(table.brackets_for(annex).len(), 6, "{annex}");
        }
    }

    #[test]
    fn brackets_are_contiguous_and_ordered() {
        let table = legal_table();

        for annex in table.all_annexes() {
            let brackets = table.brackets_for(annex);
            for pair in brackets.windows(2) {
                assert_eq!(pair[0].revenue_max, pair[1].revenue_min, "{annex}");
                assert!(pair[0].revenue_min < pair[1].revenue_min, "{annex}");
            }
        }
    }

    #[test]
    fn partition_shares_sum_to_one_hundred() {
        let table = legal_table();

        for annex in table.all_annexes() {
            for bracket in table.brackets_for(annex) {
                let diff = (bracket.partition.total() - dec!(100)).abs();
                assert!(diff <= dec!(0.01), "{annex} {}", bracket.label);
            }
        }
    }

    #[test]
    fn new_sorts_unordered_brackets() {
        let mut annexes = legal_brackets();
        annexes.get_mut(&Annex::III).unwrap().reverse();

        let table = AnnexTable::new(annexes).expect("table should build");

        assert_eq!(table.brackets_for(Annex::III)[0].revenue_min, dec!(0));
        assert_eq!(table.brackets_for(Annex::III)[0].label, "1ª Faixa");
    }

    #[test]
    fn new_rejects_missing_annex() {
        let mut annexes = legal_brackets();
        annexes.remove(&Annex::IV);

        let result = AnnexTable::new(annexes);

        assert_eq!(
            result,
            Err(SimplesError::InconsistentTable(
                "annex_iv: annex has no brackets".to_string()
            ))
        );
    }

    #[test]
    fn brackets_for_code_resolves_wire_codes() {
        let table = legal_table();

        let brackets = table.brackets_for_code("annex_v").expect("known code");

        assert_eq!(brackets[0].nominal_rate, dec!(15.50));
    }

    #[test]
    fn brackets_for_code_rejects_unknown_annex() {
        let table = legal_table();

        let result = table.brackets_for_code("annex_vi");

        assert_eq!(result, Err(SimplesError::UnknownAnnex("annex_vi".to_string())));
    }

    #[test]
    fn ceiling_is_top_of_last_bracket() {
        let table = legal_table();

        for annex in table.all_annexes() {
            assert_eq!(table.ceiling(annex), dec!(4800000.00));
        }
    }
}
