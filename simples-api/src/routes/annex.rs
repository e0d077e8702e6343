//! `GET /annex?code={annex}`: the bracket table of one annex, keyed by
//! bracket label in table order.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use simples_core::{AnnexDetails, AnnexQueryService, Bracket, LocalTaxShare, PartitionSpec};

use crate::error::AppError;
use crate::extractors::extract_query;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/annex", get(annex_details))
}

#[derive(Debug, Deserialize)]
pub struct AnnexQuery {
    pub code: String,
}

/// Revenue range, rate and deduction of one bracket.
#[derive(Debug, Serialize)]
pub struct AnnexCalcs {
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue_min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue_max: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub deduction_amount: Decimal,
}

/// Share of the tax per sub-tax, in percent.
#[derive(Debug, Serialize)]
pub struct AnnexPartitions {
    #[serde(with = "rust_decimal::serde::float")]
    pub irpj_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub csll_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cofins_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub pis_pasep_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cpp_percent: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub ipi_percent: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub icms_percent: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub iss_percent: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct AnnexBracket {
    pub calcs: AnnexCalcs,
    pub partitions: AnnexPartitions,
}

/// Brackets keyed by label, serialized as a JSON object in table order.
#[derive(Debug)]
pub struct AnnexDetailsResponse(pub Vec<(String, AnnexBracket)>);

impl Serialize for AnnexDetailsResponse {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, bracket) in &self.0 {
            map.serialize_entry(label, bracket)?;
        }
        map.end()
    }
}

impl From<&Bracket> for AnnexCalcs {
    fn from(bracket: &Bracket) -> Self {
        Self {
            revenue_min: bracket.revenue_min,
            revenue_max: bracket.revenue_max,
            rate_percent: bracket.nominal_rate,
            deduction_amount: bracket.deduction_amount,
        }
    }
}

impl From<&PartitionSpec> for AnnexPartitions {
    fn from(spec: &PartitionSpec) -> Self {
        let (icms_percent, iss_percent) = match spec.local {
            LocalTaxShare::Icms(p) => (Some(p), None),
            LocalTaxShare::Iss(p) => (None, Some(p)),
        };
        Self {
            irpj_percent: spec.irpj,
            csll_percent: spec.csll,
            cofins_percent: spec.cofins,
            pis_pasep_percent: spec.pis_pasep,
            cpp_percent: spec.cpp,
            ipi_percent: spec.ipi,
            icms_percent,
            iss_percent,
        }
    }
}

impl From<AnnexDetails<'_>> for AnnexDetailsResponse {
    fn from(details: AnnexDetails<'_>) -> Self {
        Self(
            details
                .entries()
                .map(|(label, bracket, spec)| {
                    (
                        label.to_string(),
                        AnnexBracket {
                            calcs: bracket.into(),
                            partitions: spec.into(),
                        },
                    )
                })
                .collect(),
        )
    }
}

async fn annex_details(
    State(state): State<AppState>,
    query: Result<Query<AnnexQuery>, QueryRejection>,
) -> Result<Json<AnnexDetailsResponse>, AppError> {
    let AnnexQuery { code } = extract_query(query)?;
    let table = state.table.snapshot();

    let details = AnnexQueryService::new(&table).annex_details_by_code(&code)?;
    tracing::debug!(annex = %details.annex, brackets = details.brackets.len(), "annex details");

    Ok(Json(details.into()))
}
