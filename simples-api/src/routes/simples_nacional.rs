//! `POST /simples-nacional`: effective rate, tax due and per-sub-tax split
//! for one month.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use simples_core::calculations::SimplesCalculator;
use simples_core::{
    CalculationInput, CalculationResult, Partition, PartitionBreakdown, SimplesError, SubTax,
};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/simples-nacional", post(calculate))
}

/// Calculation request. Fields are kept loose so an unknown annex or a
/// non-numeric revenue is reported as a domain error instead of a body
/// rejection.
#[derive(Debug, Deserialize)]
pub struct SimplesNacionalRequest {
    pub annex: String,
    pub gross_income: Value,
    pub month_income: Value,
}

/// Accepts a JSON number or a numeric string.
fn revenue(
    field: &str,
    value: &Value,
) -> Result<Decimal, SimplesError> {
    <Decimal as Deserialize>::deserialize(value).map_err(|_| {
        SimplesError::InvalidInput(format!("{field} must be a decimal number, got {value}"))
    })
}

/// The bracket the trailing revenue fell into.
#[derive(Debug, Serialize)]
pub struct Frame {
    pub bracket: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue_min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue_max: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub deduction_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct PartitionResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub percent_of_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub effective_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl From<&Partition> for PartitionResponse {
    fn from(p: &Partition) -> Self {
        Self {
            percent_of_tax: p.percent_of_tax,
            effective_rate: p.effective_rate,
            amount: p.amount,
        }
    }
}

/// Entries keyed by sub-tax (`irpj`, `pis_pasep`, ...); sub-taxes the annex
/// does not levy are left out.
#[derive(Debug)]
pub struct PartitionBreakdownResponse(pub Vec<(SubTax, PartitionResponse)>);

impl Serialize for PartitionBreakdownResponse {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (sub_tax, partition) in &self.0 {
            map.serialize_entry(sub_tax.key(), partition)?;
        }
        map.end()
    }
}

impl From<&PartitionBreakdown> for PartitionBreakdownResponse {
    fn from(breakdown: &PartitionBreakdown) -> Self {
        Self(breakdown.iter().map(|(k, p)| (k, p.into())).collect())
    }
}

#[derive(Debug, Serialize)]
pub struct SimplesNacionalResponse {
    pub annex: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    pub effective_tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub month_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_due: Decimal,
    pub frame: Frame,
    pub partition_breakdown: PartitionBreakdownResponse,
}

impl From<CalculationResult> for SimplesNacionalResponse {
    fn from(result: CalculationResult) -> Self {
        let bracket = &result.bracket;
        Self {
            annex: result.annex.code(),
            effective_tax_rate: result.effective_tax_rate,
            gross_income: result.gross_income,
            month_income: result.month_income,
            tax_due: result.tax_due,
            frame: Frame {
                bracket: bracket.label.clone(),
                revenue_min: bracket.revenue_min,
                revenue_max: bracket.revenue_max,
                rate_percent: bracket.nominal_rate,
                deduction_amount: bracket.deduction_amount,
            },
            partition_breakdown: (&result.partition_breakdown).into(),
        }
    }
}

async fn calculate(
    State(state): State<AppState>,
    body: Result<Json<SimplesNacionalRequest>, JsonRejection>,
) -> Result<Json<SimplesNacionalResponse>, AppError> {
    let req = extract_json(body)?;
    let gross_income = revenue("gross_income", &req.gross_income)?;
    let month_income = revenue("month_income", &req.month_income)?;
    let input = CalculationInput::from_code(&req.annex, gross_income, month_income)?;

    let table = state.table.snapshot();
    let result = SimplesCalculator::new(&table, state.policy).calculate(&input)?;

    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use simples_core::calculations::CeilingPolicy;
    use simples_data::AnnexTableLoader;
    use tower::ServiceExt;

    use super::*;
    use crate::error::ErrorBody;
    use crate::state::TableSource;

    fn test_app(policy: CeilingPolicy) -> Router {
        let table = AnnexTableLoader::bundled().unwrap();
        router().with_state(AppState::new(table, policy, TableSource::Bundled))
    }

    async fn post_json(
        app: Router,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/simples-nacional")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn assert_close(
        value: &serde_json::Value,
        expected: f64,
    ) {
        let actual = value.as_f64().unwrap_or_else(|| panic!("not a number: {value}"));
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn error_code(json: serde_json::Value) -> String {
        let body: ErrorBody = serde_json::from_value(json).unwrap();
        body.error.code
    }

    #[tokio::test]
    async fn boundary_revenue_annex_i() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::Reject),
            r#"{"annex": "annex_i", "gross_income": 180000.00, "month_income": 10000.00}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["annex"], "annex_i");
        assert_close(&json["effective_tax_rate"], 4.0);
        assert_close(&json["tax_due"], 400.0);
        assert_close(&json["gross_income"], 180000.0);
        assert_close(&json["month_income"], 10000.0);
        assert_eq!(json["frame"]["bracket"], "2ª Faixa");
        assert_close(&json["frame"]["rate_percent"], 7.3);
        assert_close(&json["frame"]["deduction_amount"], 5940.0);
    }

    #[tokio::test]
    async fn third_bracket_breakdown_closes_on_tax_due() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::Reject),
            r#"{"annex": "annex_i", "gross_income": 400000.00, "month_income": 30000.00}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_close(&json["effective_tax_rate"], 6.035);
        assert_close(&json["tax_due"], 1810.5);

        let breakdown = json["partition_breakdown"].as_object().unwrap();
        let mut keys: Vec<&str> = breakdown.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["cofins", "cpp", "csll", "icms", "irpj", "pis_pasep"]);

        let cents: i64 = breakdown
            .values()
            .map(|p| (p["amount"].as_f64().unwrap() * 100.0).round() as i64)
            .sum();
        assert_eq!(cents, 181050);
        assert_close(&breakdown["icms"]["percent_of_tax"], 33.5);
    }

    #[tokio::test]
    async fn service_annex_has_iss_only() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::Reject),
            r#"{"annex": "annex_iii", "gross_income": 100000, "month_income": 10000}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let breakdown = &json["partition_breakdown"];
        assert!(breakdown.get("iss").is_some());
        assert!(breakdown.get("icms").is_none());
        assert!(breakdown.get("ipi").is_none());
        assert_close(&json["tax_due"], 600.0);
    }

    #[tokio::test]
    async fn zero_gross_income_is_invalid_input() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::Reject),
            r#"{"annex": "annex_i", "gross_income": 0, "month_income": 10000}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(json), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn negative_month_income_is_invalid_input() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::Reject),
            r#"{"annex": "annex_i", "gross_income": 100000, "month_income": -1}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(json), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn unknown_annex_is_not_found() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::Reject),
            r#"{"annex": "annex_vi", "gross_income": 100000, "month_income": 10000}"#,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(json), "UNKNOWN_ANNEX");
    }

    #[tokio::test]
    async fn revenue_above_ceiling_is_rejected_by_default() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::Reject),
            r#"{"annex": "annex_v", "gross_income": 6000000, "month_income": 500000}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(json), "OUT_OF_RANGE_REVENUE");
    }

    #[tokio::test]
    async fn clamp_policy_uses_last_bracket() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::ClampToLastBracket),
            r#"{"annex": "annex_v", "gross_income": 6000000, "month_income": 500000}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["frame"]["bracket"], "6ª Faixa");
        assert_close(&json["effective_tax_rate"], 21.5);
        assert_close(&json["tax_due"], 107500.0);
    }

    #[tokio::test]
    async fn non_numeric_revenue_is_invalid_input() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::Reject),
            r#"{"annex": "annex_i", "gross_income": "lots", "month_income": 10000}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(json), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn numeric_strings_are_accepted() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::Reject),
            r#"{"annex": "annex_i", "gross_income": "180000.00", "month_income": "10000"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_close(&json["tax_due"], 400.0);
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::Reject),
            r#"{"annex": "annex_i", "gross_income": 100000}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(json), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn non_json_body_is_bad_request() {
        let (status, json) = post_json(test_app(CeilingPolicy::Reject), "annex=annex_i").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(json), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn month_income_beyond_decimal_range_is_invalid_input() {
        let (status, json) = post_json(
            test_app(CeilingPolicy::Reject),
            r#"{"annex": "annex_i", "gross_income": 100000, "month_income": 70000000000000000000000000000}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(json), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn identical_requests_give_identical_bodies() {
        let body = r#"{"annex": "annex_iv", "gross_income": 950000.00, "month_income": 81234.56}"#;

        let (_, first) = post_json(test_app(CeilingPolicy::Reject), body).await;
        let (_, second) = post_json(test_app(CeilingPolicy::Reject), body).await;

        assert_eq!(first, second);
    }
}
