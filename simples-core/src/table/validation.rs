use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::{Annex, Bracket, SimplesError};

/// Allowed distance between a bracket's share total and 100.
fn share_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn inconsistent(
    annex: Annex,
    label: &str,
    reason: impl std::fmt::Display,
) -> SimplesError {
    SimplesError::InconsistentTable(format!("{annex} {label}: {reason}"))
}

fn is_percentage(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED
}

/// Checks one annex's brackets, already sorted by `revenue_min`.
pub(super) fn validate_annex(
    annex: Annex,
    brackets: &[Bracket],
) -> Result<(), SimplesError> {
    let Some(first) = brackets.first() else {
        return Err(SimplesError::InconsistentTable(format!(
            "{annex}: annex has no brackets"
        )));
    };
    if !first.revenue_min.is_zero() {
        return Err(inconsistent(
            annex,
            &first.label,
            format!("first bracket starts at {} instead of 0", first.revenue_min),
        ));
    }

    let mut labels = HashSet::new();
    for bracket in brackets {
        if !labels.insert(bracket.label.as_str()) {
            return Err(inconsistent(annex, &bracket.label, "duplicate bracket label"));
        }
        validate_bracket(annex, bracket)?;
    }

    for pair in brackets.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        if lower.revenue_max != upper.revenue_min {
            return Err(inconsistent(
                annex,
                &upper.label,
                format!(
                    "starts at {} but previous bracket ends at {}",
                    upper.revenue_min, lower.revenue_max
                ),
            ));
        }
    }

    Ok(())
}

fn validate_bracket(
    annex: Annex,
    bracket: &Bracket,
) -> Result<(), SimplesError> {
    let label = bracket.label.as_str();

    if bracket.revenue_min < Decimal::ZERO {
        return Err(inconsistent(annex, label, "negative revenue_min"));
    }
    if bracket.revenue_max <= bracket.revenue_min {
        return Err(inconsistent(annex, label, "revenue_max must exceed revenue_min"));
    }
    if !is_percentage(bracket.nominal_rate) {
        return Err(inconsistent(
            annex,
            label,
            format!("nominal rate {} outside 0-100", bracket.nominal_rate),
        ));
    }
    if bracket.deduction_amount < Decimal::ZERO {
        return Err(inconsistent(annex, label, "negative deduction amount"));
    }

    // The formula must not go negative anywhere inside the bracket; it is
    // increasing in revenue, so checking the lower bound is enough.
    if bracket.revenue_min > Decimal::ZERO {
        let nominal_tax = bracket.revenue_min.checked_mul(bracket.nominal_rate);
        let deduction = bracket.deduction_amount.checked_mul(Decimal::ONE_HUNDRED);
        let (Some(nominal_tax), Some(deduction)) = (nominal_tax, deduction) else {
            return Err(inconsistent(annex, label, "bracket amounts are too large"));
        };
        if nominal_tax < deduction {
            return Err(inconsistent(
                annex,
                label,
                "deduction exceeds the nominal tax at the bracket's lower bound",
            ));
        }
    }

    let spec = &bracket.partition;
    if spec.local.tax() != annex.local_tax() {
        return Err(inconsistent(
            annex,
            label,
            format!("annex levies {:?}, not {:?}", annex.local_tax(), spec.local.tax()),
        ));
    }
    if spec.ipi.is_some() != annex.levies_ipi() {
        let reason = if annex.levies_ipi() {
            "missing IPI share"
        } else {
            "annex does not levy IPI"
        };
        return Err(inconsistent(annex, label, reason));
    }
    for (sub_tax, percent) in spec.shares() {
        if !is_percentage(percent) {
            return Err(inconsistent(
                annex,
                label,
                format!("{sub_tax} share {percent} outside 0-100"),
            ));
        }
    }
    let total = spec.total();
    if (total - Decimal::ONE_HUNDRED).abs() > share_tolerance() {
        return Err(inconsistent(
            annex,
            label,
            format!("partition shares sum to {total}, expected 100"),
        ));
    }

    Ok(())
}
