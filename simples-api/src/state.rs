//! # Application State
//!
//! The annex table is held behind a read-write lock as an `Arc` snapshot.
//! Requests clone the `Arc` and compute without holding the lock; a reload
//! builds and validates the whole replacement before swapping it in.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use simples_core::AnnexTable;
use simples_core::calculations::CeilingPolicy;
use simples_data::{AnnexTableLoader, AnnexTableLoaderError};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The currently active annex table.
#[derive(Debug)]
pub struct SharedTable {
    current: RwLock<Arc<AnnexTable>>,
}

impl SharedTable {
    pub fn new(table: AnnexTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// The table to compute one request against.
    pub fn snapshot(&self) -> Arc<AnnexTable> {
        self.current.read().clone()
    }

    /// Non-blocking variant of [`snapshot`](Self::snapshot); `None` while a
    /// reload holds the write lock.
    pub fn try_snapshot(&self) -> Option<Arc<AnnexTable>> {
        self.current.try_read().map(|table| table.clone())
    }

    pub fn replace(
        &self,
        table: AnnexTable,
    ) {
        *self.current.write() = Arc::new(table);
    }
}

/// Where reloads read the table from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    Bundled,
    File(PathBuf),
}

impl TableSource {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Bundled, Self::File)
    }

    pub fn load(&self) -> Result<AnnexTable, AnnexTableLoaderError> {
        match self {
            Self::Bundled => AnnexTableLoader::bundled(),
            Self::File(path) => AnnexTableLoader::load_path(path),
        }
    }
}

impl std::fmt::Display for TableSource {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Bundled => write!(f, "bundled table"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub table: Arc<SharedTable>,
    pub policy: CeilingPolicy,
    pub source: TableSource,
    pub allowed_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        table: AnnexTable,
        policy: CeilingPolicy,
        source: TableSource,
    ) -> Self {
        Self {
            table: Arc::new(SharedTable::new(table)),
            policy,
            source,
            allowed_origins: Vec::new(),
        }
    }

    pub fn with_allowed_origins(
        mut self,
        origins: Vec<String>,
    ) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Re-reads the table from its source. On failure the current table stays
    /// active.
    pub fn reload(&self) -> Result<(), AnnexTableLoaderError> {
        match self.source.load() {
            Ok(table) => {
                self.table.replace(table);
                info!(source = %self.source, "annex table reloaded");
                Ok(())
            }
            Err(err) => {
                error!(source = %self.source, error = %err, "annex table reload rejected");
                Err(err)
            }
        }
    }

    /// Runs [`reload`](Self::reload) on the blocking pool so CSV parsing does
    /// not stall the request workers.
    pub fn spawn_reload(&self) -> JoinHandle<Result<(), AnnexTableLoaderError>> {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.reload())
    }
}
