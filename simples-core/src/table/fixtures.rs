//! The legal tables (LC 123/2006 as amended by LC 155/2016) built in code,
//! for tests. Enabled outside this crate by the `fixtures` feature.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{Annex, AnnexTable, Bracket, LocalTaxShare, PartitionSpec};

const LABELS: [&str; 6] = [
    "1ª Faixa", "2ª Faixa", "3ª Faixa", "4ª Faixa", "5ª Faixa", "6ª Faixa",
];

fn bounds() -> [Decimal; 7] {
    [
        dec!(0.00),
        dec!(180000.00),
        dec!(360000.00),
        dec!(720000.00),
        dec!(1800000.00),
        dec!(3600000.00),
        dec!(4800000.00),
    ]
}

/// (rate, deduction, [irpj, csll, cofins, pis_pasep, cpp], ipi, local)
type Row = (Decimal, Decimal, [Decimal; 5], Option<Decimal>, Decimal);

fn annex_brackets(
    annex: Annex,
    rows: [Row; 6],
) -> Vec<Bracket> {
    let bounds = bounds();
    rows.into_iter()
        .enumerate()
        .map(|(i, (rate, deduction, federal, ipi, local))| Bracket {
            label: LABELS[i].to_string(),
            revenue_min: bounds[i],
            revenue_max: bounds[i + 1],
            nominal_rate: rate,
            deduction_amount: deduction,
            partition: PartitionSpec {
                irpj: federal[0],
                csll: federal[1],
                cofins: federal[2],
                pis_pasep: federal[3],
                cpp: federal[4],
                ipi,
                local: match annex.local_tax() {
                    crate::LocalTax::Icms => LocalTaxShare::Icms(local),
                    crate::LocalTax::Iss => LocalTaxShare::Iss(local),
                },
            },
        })
        .collect()
}

pub fn legal_brackets() -> BTreeMap<Annex, Vec<Bracket>> {
    let annex_i_low = [dec!(5.50), dec!(3.50), dec!(12.74), dec!(2.76), dec!(41.50)];
    let annex_i_mid = [dec!(5.50), dec!(3.50), dec!(12.74), dec!(2.76), dec!(42.00)];
    let annex_ii = [dec!(5.50), dec!(3.50), dec!(11.51), dec!(2.49), dec!(37.50)];

    BTreeMap::from([
        (
            Annex::I,
            annex_brackets(
                Annex::I,
                [
                    (dec!(4.00), dec!(0.00), annex_i_low, None, dec!(34.00)),
                    (dec!(7.30), dec!(5940.00), annex_i_low, None, dec!(34.00)),
                    (dec!(9.50), dec!(13860.00), annex_i_mid, None, dec!(33.50)),
                    (dec!(10.70), dec!(22500.00), annex_i_mid, None, dec!(33.50)),
                    (dec!(14.30), dec!(87300.00), annex_i_mid, None, dec!(33.50)),
                    (
                        dec!(19.00),
                        dec!(378000.00),
                        [dec!(13.50), dec!(10.00), dec!(28.27), dec!(6.13), dec!(42.10)],
                        None,
                        dec!(0.00),
                    ),
                ],
            ),
        ),
        (
            Annex::II,
            annex_brackets(
                Annex::II,
                [
                    (dec!(4.50), dec!(0.00), annex_ii, Some(dec!(7.50)), dec!(32.00)),
                    (dec!(7.80), dec!(5940.00), annex_ii, Some(dec!(7.50)), dec!(32.00)),
                    (dec!(10.00), dec!(13860.00), annex_ii, Some(dec!(7.50)), dec!(32.00)),
                    (dec!(11.20), dec!(22500.00), annex_ii, Some(dec!(7.50)), dec!(32.00)),
                    (dec!(14.70), dec!(85500.00), annex_ii, Some(dec!(7.50)), dec!(32.00)),
                    (
                        dec!(30.00),
                        dec!(720000.00),
                        [dec!(8.50), dec!(7.50), dec!(20.96), dec!(4.54), dec!(23.50)],
                        Some(dec!(35.00)),
                        dec!(0.00),
                    ),
                ],
            ),
        ),
        (
            Annex::III,
            annex_brackets(
                Annex::III,
                [
                    (
                        dec!(6.00),
                        dec!(0.00),
                        [dec!(4.00), dec!(3.50), dec!(12.82), dec!(2.78), dec!(43.40)],
                        None,
                        dec!(33.50),
                    ),
                    (
                        dec!(11.20),
                        dec!(9360.00),
                        [dec!(4.00), dec!(3.50), dec!(14.05), dec!(3.05), dec!(43.40)],
                        None,
                        dec!(32.00),
                    ),
                    (
                        dec!(13.50),
                        dec!(17640.00),
                        [dec!(4.00), dec!(3.50), dec!(13.64), dec!(2.96), dec!(43.40)],
                        None,
                        dec!(32.50),
                    ),
                    (
                        dec!(16.00),
                        dec!(35640.00),
                        [dec!(4.00), dec!(3.50), dec!(13.64), dec!(2.96), dec!(43.40)],
                        None,
                        dec!(32.50),
                    ),
                    (
                        dec!(21.00),
                        dec!(125640.00),
                        [dec!(4.00), dec!(3.50), dec!(12.82), dec!(2.78), dec!(43.40)],
                        None,
                        dec!(33.50),
                    ),
                    (
                        dec!(33.00),
                        dec!(648000.00),
                        [dec!(35.00), dec!(15.00), dec!(16.03), dec!(3.47), dec!(30.50)],
                        None,
                        dec!(0.00),
                    ),
                ],
            ),
        ),
        (
            Annex::IV,
            annex_brackets(
                Annex::IV,
                [
                    (
                        dec!(4.50),
                        dec!(0.00),
                        [dec!(18.80), dec!(15.20), dec!(17.67), dec!(3.83), dec!(0.00)],
                        None,
                        dec!(44.50),
                    ),
                    (
                        dec!(9.00),
                        dec!(8100.00),
                        [dec!(19.80), dec!(15.20), dec!(20.55), dec!(4.45), dec!(0.00)],
                        None,
                        dec!(40.00),
                    ),
                    (
                        dec!(10.20),
                        dec!(12420.00),
                        [dec!(20.80), dec!(15.20), dec!(19.73), dec!(4.27), dec!(0.00)],
                        None,
                        dec!(40.00),
                    ),
                    (
                        dec!(14.00),
                        dec!(39780.00),
                        [dec!(17.80), dec!(19.20), dec!(18.90), dec!(4.10), dec!(0.00)],
                        None,
                        dec!(40.00),
                    ),
                    (
                        dec!(22.00),
                        dec!(183780.00),
                        [dec!(18.80), dec!(19.20), dec!(18.08), dec!(3.92), dec!(0.00)],
                        None,
                        dec!(40.00),
                    ),
                    (
                        dec!(33.00),
                        dec!(828000.00),
                        [dec!(53.50), dec!(21.50), dec!(20.55), dec!(4.45), dec!(0.00)],
                        None,
                        dec!(0.00),
                    ),
                ],
            ),
        ),
        (
            Annex::V,
            annex_brackets(
                Annex::V,
                [
                    (
                        dec!(15.50),
                        dec!(0.00),
                        [dec!(25.00), dec!(15.00), dec!(14.10), dec!(3.05), dec!(28.85)],
                        None,
                        dec!(14.00),
                    ),
                    (
                        dec!(18.00),
                        dec!(4500.00),
                        [dec!(23.00), dec!(15.00), dec!(14.10), dec!(3.05), dec!(27.85)],
                        None,
                        dec!(17.00),
                    ),
                    (
                        dec!(19.50),
                        dec!(9900.00),
                        [dec!(24.00), dec!(15.00), dec!(14.92), dec!(3.23), dec!(23.85)],
                        None,
                        dec!(19.00),
                    ),
                    (
                        dec!(20.50),
                        dec!(17100.00),
                        [dec!(21.00), dec!(15.00), dec!(15.74), dec!(3.41), dec!(23.85)],
                        None,
                        dec!(21.00),
                    ),
                    (
                        dec!(23.00),
                        dec!(62100.00),
                        [dec!(23.00), dec!(12.50), dec!(14.10), dec!(3.05), dec!(23.85)],
                        None,
                        dec!(23.50),
                    ),
                    (
                        dec!(30.50),
                        dec!(540000.00),
                        [dec!(35.00), dec!(15.50), dec!(16.44), dec!(3.56), dec!(29.50)],
                        None,
                        dec!(0.00),
                    ),
                ],
            ),
        ),
    ])
}

/// # Panics
///
/// Panics if the brackets above stop validating.
pub fn legal_table() -> AnnexTable {
    AnnexTable::new(legal_brackets()).expect("legal table must validate")
}
