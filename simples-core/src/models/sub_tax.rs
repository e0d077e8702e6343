use std::fmt;

use serde::{Deserialize, Serialize};

/// A constituent tax collected through the unified payment.
///
/// Variants are declared in the canonical display order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubTax {
    Irpj,
    Csll,
    Cofins,
    PisPasep,
    Cpp,
    Ipi,
    Icms,
    Iss,
}

impl SubTax {
    pub const ALL: [SubTax; 8] = [
        SubTax::Irpj,
        SubTax::Csll,
        SubTax::Cofins,
        SubTax::PisPasep,
        SubTax::Cpp,
        SubTax::Ipi,
        SubTax::Icms,
        SubTax::Iss,
    ];

    /// Key used in JSON payloads.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Irpj => "irpj",
            Self::Csll => "csll",
            Self::Cofins => "cofins",
            Self::PisPasep => "pis_pasep",
            Self::Cpp => "cpp",
            Self::Ipi => "ipi",
            Self::Icms => "icms",
            Self::Iss => "iss",
        }
    }

    /// Name as printed on official documents.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Irpj => "IRPJ",
            Self::Csll => "CSLL",
            Self::Cofins => "COFINS",
            Self::PisPasep => "PIS/Pasep",
            Self::Cpp => "CPP",
            Self::Ipi => "IPI",
            Self::Icms => "ICMS",
            Self::Iss => "ISS",
        }
    }
}

impl fmt::Display for SubTax {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
