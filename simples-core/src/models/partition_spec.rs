use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LocalTax, SubTax};

/// The local-tax share of a bracket. Being a variant rather than two optional
/// fields, a spec always carries exactly one of ICMS or ISS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalTaxShare {
    Icms(Decimal),
    Iss(Decimal),
}

impl LocalTaxShare {
    pub fn tax(&self) -> LocalTax {
        match self {
            Self::Icms(_) => LocalTax::Icms,
            Self::Iss(_) => LocalTax::Iss,
        }
    }

    pub fn percent(&self) -> Decimal {
        match self {
            Self::Icms(p) | Self::Iss(p) => *p,
        }
    }

    pub fn sub_tax(&self) -> SubTax {
        match self {
            Self::Icms(_) => SubTax::Icms,
            Self::Iss(_) => SubTax::Iss,
        }
    }
}

/// Percentage of a bracket's tax owed to each sub-tax (0-100 each).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSpec {
    pub irpj: Decimal,
    pub csll: Decimal,
    pub cofins: Decimal,
    pub pis_pasep: Decimal,
    pub cpp: Decimal,
    /// Present only for annexes that levy IPI.
    pub ipi: Option<Decimal>,
    pub local: LocalTaxShare,
}

impl PartitionSpec {
    /// Every share present in this spec, in canonical sub-tax order.
    pub fn shares(&self) -> Vec<(SubTax, Decimal)> {
        let mut shares = vec![
            (SubTax::Irpj, self.irpj),
            (SubTax::Csll, self.csll),
            (SubTax::Cofins, self.cofins),
            (SubTax::PisPasep, self.pis_pasep),
            (SubTax::Cpp, self.cpp),
        ];
        if let Some(ipi) = self.ipi {
            shares.push((SubTax::Ipi, ipi));
        }
        shares.push((self.local.sub_tax(), self.local.percent()));
        shares
    }

    /// The share for `sub_tax`, or `None` when this spec does not carry it.
    pub fn percent_of(
        &self,
        sub_tax: SubTax,
    ) -> Option<Decimal> {
        self.shares()
            .into_iter()
            .find(|(k, _)| *k == sub_tax)
            .map(|(_, p)| p)
    }

    pub fn total(&self) -> Decimal {
        self.shares().iter().map(|(_, p)| *p).sum()
    }
}
