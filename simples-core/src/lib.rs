pub mod calculations;
pub mod error;
pub mod models;
pub mod query;
pub mod table;

pub use error::SimplesError;
pub use models::*;
pub use query::{AnnexDetails, AnnexQueryService};
pub use table::AnnexTable;
