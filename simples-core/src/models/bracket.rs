use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PartitionSpec;

/// A revenue range ("faixa") of an annex.
///
/// Ranges are half-open: `revenue_min` belongs to the bracket, `revenue_max`
/// belongs to the next one. The last bracket of an annex is open above; its
/// `revenue_max` is the regime ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub label: String,
    pub revenue_min: Decimal,
    pub revenue_max: Decimal,
    /// Nominal rate as a percentage (e.g. `7.30`).
    pub nominal_rate: Decimal,
    pub deduction_amount: Decimal,
    pub partition: PartitionSpec,
}

impl Bracket {
    pub fn contains(
        &self,
        revenue: Decimal,
    ) -> bool {
        self.revenue_min <= revenue && revenue < self.revenue_max
    }
}
