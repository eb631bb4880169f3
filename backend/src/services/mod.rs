//! Business logic services for the bakery inventory platform

use serde::Serialize;
use shared::types::Notice;

use crate::error::{AppError, AppResult};
use crate::store::StoreResult;

pub mod catalog;
pub mod ledger;
pub mod prices;
pub mod reorder;
pub mod report;
pub mod snapshot;
pub mod summary;

pub use catalog::CatalogService;
pub use ledger::LedgerService;
pub use prices::PriceService;
pub use reorder::{MoveOutcome, ReorderGuard, ReorderService};
pub use report::{CsvReport, ReportRenderer, TextReport};
pub use snapshot::{LoadedSnapshot, SnapshotService};
pub use summary::SummaryService;

/// Result of a batch save
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub saved: usize,
    /// Keys of the records written
    pub keys: Vec<String>,
    pub notice: Notice,
}

impl SaveOutcome {
    /// Nothing to write; reported as a warning, not an error
    pub fn nothing(message: &str) -> Self {
        Self {
            saved: 0,
            keys: Vec::new(),
            notice: Notice::warning(message),
        }
    }

    /// Fold the joined results of a concurrent batch. Any failure fails the
    /// whole batch, but writes that went through are not undone.
    pub fn collect(results: Vec<(String, StoreResult<()>)>) -> AppResult<Self> {
        let mut committed = Vec::new();
        let mut failed = Vec::new();
        for (key, result) in results {
            match result {
                Ok(()) => committed.push(key),
                Err(e) => {
                    tracing::error!("Batch write for {} failed: {}", key, e);
                    failed.push(key);
                }
            }
        }

        if !failed.is_empty() {
            return Err(AppError::PartialBatch { committed, failed });
        }

        Ok(Self {
            saved: committed.len(),
            keys: committed,
            notice: Notice::success(""),
        })
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = notice;
        self
    }
}
