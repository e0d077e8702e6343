use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use simples_core::{Annex, AnnexTable, Bracket, LocalTaxShare, PartitionSpec, SimplesError};
use thiserror::Error;
use tracing::info;

/// The legal tables (LC 123/2006 as amended by LC 155/2016), embedded at
/// build time.
pub const BUNDLED_TABLE_CSV: &str = include_str!("../data/annex_tables.csv");

/// Errors that can occur when loading annex table data.
#[derive(Debug, Error)]
pub enum AnnexTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error(transparent)]
    Table(#[from] SimplesError),
}

impl From<csv::Error> for AnnexTableLoaderError {
    fn from(err: csv::Error) -> Self {
        AnnexTableLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the annex table CSV file.
///
/// - `annex`: wire code (`annex_i` ... `annex_v`) or roman numeral
/// - `bracket`: label shown to users (e.g. `1ª Faixa`)
/// - `revenue_min` / `revenue_max`: RBT12 range, lower bound inclusive
/// - `rate_percent`: nominal rate in percent (e.g. `7.30`)
/// - `deduction_amount`: amount deducted before dividing by RBT12
/// - `irpj` ... `iss`: share of the tax per sub-tax in percent; `ipi`,
///   `icms` and `iss` are left empty when the annex does not levy them
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnnexTableRecord {
    pub annex: String,
    pub bracket: String,
    pub revenue_min: Decimal,
    pub revenue_max: Decimal,
    pub rate_percent: Decimal,
    pub deduction_amount: Decimal,
    pub irpj: Decimal,
    pub csll: Decimal,
    pub cofins: Decimal,
    pub pis_pasep: Decimal,
    pub cpp: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub ipi: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub icms: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub iss: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl AnnexTableRecord {
    /// Converts the row into a bracket of its annex.
    ///
    /// `row` is the 1-based data row number used in error messages.
    fn into_bracket(
        self,
        row: usize,
    ) -> Result<(Annex, Bracket), AnnexTableLoaderError> {
        let invalid = |reason: String| AnnexTableLoaderError::InvalidRecord { row, reason };

        let annex = Annex::parse(&self.annex)
            .ok_or_else(|| invalid(format!("unknown annex '{}'", self.annex)))?;

        let local = match (self.icms, self.iss) {
            (Some(icms), None) => LocalTaxShare::Icms(icms),
            (None, Some(iss)) => LocalTaxShare::Iss(iss),
            (Some(_), Some(_)) => {
                return Err(invalid("both icms and iss are set".to_string()));
            }
            (None, None) => {
                return Err(invalid("one of icms or iss is required".to_string()));
            }
        };

        if self.bracket.trim().is_empty() {
            return Err(invalid("bracket label is empty".to_string()));
        }

        let bracket = Bracket {
            label: self.bracket.trim().to_string(),
            revenue_min: self.revenue_min,
            revenue_max: self.revenue_max,
            nominal_rate: self.rate_percent,
            deduction_amount: self.deduction_amount,
            partition: PartitionSpec {
                irpj: self.irpj,
                csll: self.csll,
                cofins: self.cofins,
                pis_pasep: self.pis_pasep,
                cpp: self.cpp,
                ipi: self.ipi,
                local,
            },
        };

        Ok((annex, bracket))
    }
}

/// Loader for annex tables stored as CSV.
///
/// Parsing and building are separate steps so a file can be inspected
/// without being accepted as the live table.
pub struct AnnexTableLoader;

impl AnnexTableLoader {
    /// Parse annex table records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<AnnexTableRecord>, AnnexTableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: AnnexTableRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group records by annex and build a validated [`AnnexTable`].
    pub fn build(records: Vec<AnnexTableRecord>) -> Result<AnnexTable, AnnexTableLoaderError> {
        let mut annexes: BTreeMap<Annex, Vec<Bracket>> = BTreeMap::new();

        for (i, record) in records.into_iter().enumerate() {
            let (annex, bracket) = record.into_bracket(i + 1)?;
            annexes.entry(annex).or_default().push(bracket);
        }

        Ok(AnnexTable::new(annexes)?)
    }

    /// Parse and build a table from any CSV reader.
    pub fn load<R: Read>(reader: R) -> Result<AnnexTable, AnnexTableLoaderError> {
        Self::build(Self::parse(reader)?)
    }

    /// Parse and build a table from a CSV file.
    pub fn load_path(path: &Path) -> Result<AnnexTable, AnnexTableLoaderError> {
        let file = File::open(path).map_err(|source| AnnexTableLoaderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::load(file)?;

        info!(path = %path.display(), "annex table loaded");
        Ok(table)
    }

    /// The table shipped with this crate.
    pub fn bundled() -> Result<AnnexTable, AnnexTableLoaderError> {
        Self::load(BUNDLED_TABLE_CSV.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str =
        "annex,bracket,revenue_min,revenue_max,rate_percent,deduction_amount,irpj,csll,cofins,pis_pasep,cpp,ipi,icms,iss";

    fn csv_with(rows: &[&str]) -> String {
        let mut csv = HEADER.to_string();
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv
    }

    #[test]
    fn test_parse_csv_single_bracket() {
        let csv = csv_with(&["annex_i,1ª Faixa,0,180000,4.00,0,5.50,3.50,12.74,2.76,41.50,,34.00,"]);

        let records = AnnexTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            AnnexTableRecord {
                annex: "annex_i".to_string(),
                bracket: "1ª Faixa".to_string(),
                revenue_min: dec!(0),
                revenue_max: dec!(180000),
                rate_percent: dec!(4.00),
                deduction_amount: dec!(0),
                irpj: dec!(5.50),
                csll: dec!(3.50),
                cofins: dec!(12.74),
                pis_pasep: dec!(2.76),
                cpp: dec!(41.50),
                ipi: None,
                icms: Some(dec!(34.00)),
                iss: None,
            }
        );
    }

    #[test]
    fn test_parse_bundled_table() {
        let records =
            AnnexTableLoader::parse(BUNDLED_TABLE_CSV.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 30);
        for code in ["annex_i", "annex_ii", "annex_iii", "annex_iv", "annex_v"] {
            let count = records.iter().filter(|r| r.annex == code).count();
            assert_eq!(count, 6, "Expected 6 brackets for {}", code);
        }
    }

    #[test]
    fn test_bundled_table_builds() {
        let table = AnnexTableLoader::bundled().expect("bundled table must be consistent");

        let annex_ii = table.brackets_for(Annex::II);
        assert_eq!(annex_ii[0].partition.ipi, Some(dec!(7.50)));
        assert_eq!(annex_ii[5].partition.ipi, Some(dec!(35.00)));
        assert_eq!(
            table.brackets_for(Annex::IV)[0].partition.local,
            LocalTaxShare::Iss(dec!(44.50))
        );
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "annex,bracket,revenue_min\nannex_i,1ª Faixa,0";

        let result = AnnexTableLoader::parse(csv.as_bytes());

        let err = result.expect_err("Should fail for missing column");
        let AnnexTableLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = csv_with(&["annex_i,1ª Faixa,abc,180000,4.00,0,5.50,3.50,12.74,2.76,41.50,,34.00,"]);

        let result = AnnexTableLoader::parse(csv.as_bytes());

        let err = result.expect_err("Should fail for invalid decimal");
        assert!(
            matches!(err, AnnexTableLoaderError::CsvParse(_)),
            "Expected CsvParse error, got: {:?}",
            err
        );
    }

    #[test]
    fn test_parse_empty_csv() {
        let records = AnnexTableLoader::parse(HEADER.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }

    #[test]
    fn test_build_rejects_unknown_annex() {
        let csv = csv_with(&["annex_vi,1ª Faixa,0,180000,4.00,0,5.50,3.50,12.74,2.76,41.50,,34.00,"]);
        let records = AnnexTableLoader::parse(csv.as_bytes()).unwrap();

        let err = AnnexTableLoader::build(records).expect_err("unknown annex");

        match err {
            AnnexTableLoaderError::InvalidRecord { row, reason } => {
                assert_eq!(row, 1);
                assert_eq!(reason, "unknown annex 'annex_vi'");
            }
            other => panic!("expected InvalidRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_build_rejects_both_local_taxes() {
        let csv = csv_with(&["annex_i,1ª Faixa,0,180000,4.00,0,5.50,3.50,12.74,2.76,41.50,,34.00,0"]);
        let records = AnnexTableLoader::parse(csv.as_bytes()).unwrap();

        let err = AnnexTableLoader::build(records).expect_err("both local taxes");

        assert!(err.to_string().contains("both icms and iss"), "{err}");
    }

    #[test]
    fn test_build_rejects_missing_local_tax() {
        let csv = csv_with(&["annex_iii,1ª Faixa,0,180000,6.00,0,4.00,3.50,12.82,2.78,43.40,,,"]);
        let records = AnnexTableLoader::parse(csv.as_bytes()).unwrap();

        let err = AnnexTableLoader::build(records).expect_err("no local tax");

        assert!(err.to_string().contains("one of icms or iss"), "{err}");
    }

    #[test]
    fn test_build_rejects_incomplete_table() {
        let csv = csv_with(&["annex_i,1ª Faixa,0,180000,4.00,0,5.50,3.50,12.74,2.76,41.50,,34.00,"]);
        let records = AnnexTableLoader::parse(csv.as_bytes()).unwrap();

        let err = AnnexTableLoader::build(records).expect_err("only one annex");

        assert!(
            matches!(err, AnnexTableLoaderError::Table(SimplesError::InconsistentTable(_))),
            "{err:?}"
        );
    }

    #[test]
    fn test_load_path_reports_missing_file() {
        let err = AnnexTableLoader::load_path(Path::new("/nonexistent/annex.csv"))
            .expect_err("missing file");

        assert!(matches!(err, AnnexTableLoaderError::Io { .. }), "{err:?}");
        assert!(err.to_string().contains("/nonexistent/annex.csv"), "{err}");
    }
}
