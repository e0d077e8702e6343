//! Integration tests running the bundled annex table through the calculator.

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use simples_core::calculations::{CeilingPolicy, SimplesCalculator};
use simples_core::table::fixtures::legal_table;
use simples_core::{
    Annex, AnnexQueryService, AnnexTable, CalculationInput, LocalTax, SimplesError, SubTax,
};
use simples_data::{AnnexTableLoader, AnnexTableLoaderError, BUNDLED_TABLE_CSV};

fn bundled() -> AnnexTable {
    AnnexTableLoader::bundled().expect("bundled table must load")
}

fn calculate(
    table: &AnnexTable,
    code: &str,
    gross_income: Decimal,
    month_income: Decimal,
) -> Result<simples_core::CalculationResult, SimplesError> {
    let input = CalculationInput::from_code(code, gross_income, month_income)?;
    SimplesCalculator::new(table, CeilingPolicy::Reject).calculate(&input)
}

#[test]
fn test_bundled_csv_matches_in_code_legal_table() {
    let bundled = bundled();
    let legal = legal_table();

    for annex in Annex::ALL {
        assert_eq!(bundled.brackets_for(annex), legal.brackets_for(annex), "{annex}");
    }
    assert_eq!(bundled, legal);
}

#[test]
fn test_bundled_brackets_are_contiguous() {
    let table = bundled();

    for annex in Annex::ALL {
        let brackets = table.brackets_for(annex);
        assert_eq!(brackets.len(), 6, "{annex}");
        assert_eq!(brackets[0].revenue_min, Decimal::ZERO, "{annex}");
        for pair in brackets.windows(2) {
            assert_eq!(pair[0].revenue_max, pair[1].revenue_min, "{annex}");
        }
        assert_eq!(table.ceiling(annex), dec!(4800000.00), "{annex}");
    }
}

#[test]
fn test_bundled_partition_shares_sum_to_one_hundred() {
    let table = bundled();

    for annex in Annex::ALL {
        for bracket in table.brackets_for(annex) {
            assert_eq!(
                bracket.partition.total(),
                dec!(100),
                "{} {}",
                annex,
                bracket.label
            );
        }
    }
}

#[test]
fn test_first_bracket_annex_i() {
    let table = bundled();

    let result = calculate(&table, "annex_i", dec!(150000.00), dec!(10000.00)).unwrap();

    assert_eq!(result.bracket.label, "1ª Faixa");
    assert_eq!(result.effective_tax_rate, dec!(4.0000));
    assert_eq!(result.tax_due, dec!(400.00));
    assert_eq!(result.partition_breakdown.total_amount(), dec!(400.00));
}

#[test]
fn test_boundary_revenue_moves_to_next_bracket_without_jump() {
    let table = bundled();

    let result = calculate(&table, "annex_i", dec!(180000.00), dec!(10000.00)).unwrap();

    assert_eq!(result.bracket.label, "2ª Faixa");
    assert_eq!(result.effective_tax_rate, dec!(4.0000));
    assert_eq!(result.tax_due, dec!(400.00));
}

#[test]
fn test_third_bracket_annex_i() {
    let table = bundled();

    let result = calculate(&table, "annex_i", dec!(400000.00), dec!(30000.00)).unwrap();

    assert_eq!(result.bracket.label, "3ª Faixa");
    assert_eq!(result.effective_tax_rate, dec!(6.0350));
    assert_eq!(result.tax_due, dec!(1810.50));
    assert_eq!(result.partition_breakdown.total_amount(), dec!(1810.50));
}

#[test]
fn test_zero_gross_income_is_invalid() {
    let table = bundled();

    let err = calculate(&table, "annex_i", dec!(0), dec!(10000.00)).unwrap_err();

    assert!(matches!(err, SimplesError::InvalidInput(_)), "{err:?}");
}

#[test]
fn test_revenue_above_ceiling_is_rejected() {
    let table = bundled();

    let err = calculate(&table, "annex_iii", dec!(4800000.01), dec!(10000.00)).unwrap_err();

    assert!(
        matches!(err, SimplesError::OutOfRangeRevenue { .. }),
        "{err:?}"
    );
}

#[test]
fn test_unknown_annex_for_query_and_calculation() {
    let table = bundled();

    let query = AnnexQueryService::new(&table).annex_details_by_code("annex_vi");
    let calc = calculate(&table, "annex_vi", dec!(100000), dec!(1000));

    assert_eq!(
        query.unwrap_err(),
        SimplesError::UnknownAnnex("annex_vi".to_string())
    );
    assert_eq!(
        calc.unwrap_err(),
        SimplesError::UnknownAnnex("annex_vi".to_string())
    );
}

#[test]
fn test_local_tax_is_exclusive_in_every_annex() {
    let table = bundled();

    for annex in Annex::ALL {
        let result = calculate(&table, annex.code(), dec!(500000.00), dec!(42000.00)).unwrap();
        let breakdown = &result.partition_breakdown;

        match annex.local_tax() {
            LocalTax::Icms => {
                assert!(breakdown.contains(SubTax::Icms), "{annex}");
                assert!(!breakdown.contains(SubTax::Iss), "{annex}");
            }
            LocalTax::Iss => {
                assert!(breakdown.contains(SubTax::Iss), "{annex}");
                assert!(!breakdown.contains(SubTax::Icms), "{annex}");
            }
        }
        assert_eq!(breakdown.contains(SubTax::Ipi), annex.levies_ipi(), "{annex}");
        assert_eq!(breakdown.total_amount(), result.tax_due, "{annex}");
    }
}

#[test]
fn test_annex_details_lists_every_bracket_in_order() {
    let table = bundled();

    let details = AnnexQueryService::new(&table)
        .annex_details_by_code("annex_v")
        .unwrap();
    let labels: Vec<&str> = details.entries().map(|(label, _, _)| label).collect();

    assert_eq!(
        labels,
        vec![
            "1ª Faixa", "2ª Faixa", "3ª Faixa", "4ª Faixa", "5ª Faixa", "6ª Faixa"
        ]
    );
    assert_eq!(details.get("1ª Faixa").unwrap().nominal_rate, dec!(15.50));
}

#[test]
fn test_edited_table_with_gap_is_rejected() {
    let csv = BUNDLED_TABLE_CSV.replacen(
        "annex_i,2ª Faixa,180000.00",
        "annex_i,2ª Faixa,190000.00",
        1,
    );

    let err = AnnexTableLoader::load(csv.as_bytes()).expect_err("gap must be rejected");

    match err {
        AnnexTableLoaderError::Table(SimplesError::InconsistentTable(msg)) => {
            assert!(msg.contains("2ª Faixa"), "{msg}");
        }
        other => panic!("expected InconsistentTable, got {other:?}"),
    }
}
