mod loader;

pub use loader::{AnnexTableLoader, AnnexTableLoaderError, AnnexTableRecord, BUNDLED_TABLE_CSV};
