mod annex;
mod bracket;
mod calculation;
mod partition_spec;
mod sub_tax;

pub use annex::{Annex, LocalTax};
pub use bracket::Bracket;
pub use calculation::{CalculationInput, CalculationResult, Partition, PartitionBreakdown};
pub use partition_spec::{LocalTaxShare, PartitionSpec};
pub use sub_tax::SubTax;
