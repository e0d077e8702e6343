//! Read-only view of one annex's full bracket table.

use crate::{Annex, AnnexTable, Bracket, PartitionSpec, SimplesError};

/// The brackets of one annex, ordered from the lowest revenue range up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnexDetails<'a> {
    pub annex: Annex,
    pub brackets: &'a [Bracket],
}

impl<'a> AnnexDetails<'a> {
    /// `(label, bracket, partition spec)` triples in table order.
    pub fn entries(self) -> impl Iterator<Item = (&'a str, &'a Bracket, &'a PartitionSpec)> {
        self.brackets
            .iter()
            .map(|b| (b.label.as_str(), b, &b.partition))
    }

    pub fn get(
        &self,
        label: &str,
    ) -> Option<&'a Bracket> {
        self.brackets.iter().find(|b| b.label == label)
    }
}

/// Lookup of annex tables for the annex details view.
#[derive(Debug, Clone, Copy)]
pub struct AnnexQueryService<'a> {
    table: &'a AnnexTable,
}

impl<'a> AnnexQueryService<'a> {
    pub fn new(table: &'a AnnexTable) -> Self {
        Self { table }
    }

    pub fn annex_details(
        &self,
        annex: Annex,
    ) -> AnnexDetails<'a> {
        AnnexDetails {
            annex,
            brackets: self.table.brackets_for(annex),
        }
    }

    /// # Errors
    ///
    /// Returns [`SimplesError::UnknownAnnex`] if `code` names no annex.
    pub fn annex_details_by_code(
        &self,
        code: &str,
    ) -> Result<AnnexDetails<'a>, SimplesError> {
        Annex::from_code(code).map(|annex| self.annex_details(annex))
    }
}
