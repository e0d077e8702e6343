use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SimplesError;

/// The tax levied by the state or municipality alongside the federal taxes.
///
/// Every annex collects exactly one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocalTax {
    /// State tax on the circulation of goods (commerce and industry).
    Icms,
    /// Municipal tax on services.
    Iss,
}

/// One of the five sector tables of the regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Annex {
    I,
    II,
    III,
    IV,
    V,
}

impl Annex {
    pub const ALL: [Annex; 5] = [Annex::I, Annex::II, Annex::III, Annex::IV, Annex::V];

    /// Wire code used by the HTTP interface (`annex_i` ... `annex_v`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::I => "annex_i",
            Self::II => "annex_ii",
            Self::III => "annex_iii",
            Self::IV => "annex_iv",
            Self::V => "annex_v",
        }
    }

    pub fn roman(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
            Self::V => "V",
        }
    }

    /// Parses a wire code (`annex_iii`) or a bare roman numeral (`III`).
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let roman = normalized.strip_prefix("annex_").unwrap_or(&normalized);
        match roman {
            "i" => Some(Self::I),
            "ii" => Some(Self::II),
            "iii" => Some(Self::III),
            "iv" => Some(Self::IV),
            "v" => Some(Self::V),
            _ => None,
        }
    }

    /// Like [`Annex::parse`], failing with [`SimplesError::UnknownAnnex`].
    pub fn from_code(s: &str) -> Result<Self, SimplesError> {
        Self::parse(s).ok_or_else(|| SimplesError::UnknownAnnex(s.to_string()))
    }

    /// Annexes I and II cover commerce and industry (ICMS); III to V cover
    /// services (ISS).
    pub fn local_tax(&self) -> LocalTax {
        match self {
            Self::I | Self::II => LocalTax::Icms,
            Self::III | Self::IV | Self::V => LocalTax::Iss,
        }
    }

    /// Only the industry annex carries an IPI share.
    pub fn levies_ipi(&self) -> bool {
        matches!(self, Self::II)
    }
}

impl fmt::Display for Annex {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.code())
    }
}
