//! Daily summary: sheet totals combined with the cashier's figures

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::cash::CashFigures;
use shared::derived::DaySheet;
use shared::models::Shop;
use shared::session::{PendingChanges, PendingEdits};
use shared::summary::DailySummary;
use shared::types::Notice;
use shared::validation::validate_amount;

use crate::error::AppResult;
use crate::services::SnapshotService;
use crate::store::DocumentStore;

/// Body of a summary request. Cash figures live only on the client, so they
/// travel with every request, optionally with unsaved ledger edits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(flatten)]
    pub cash: CashFigures,
    #[serde(default)]
    pub pending: PendingEdits,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    #[serde(flatten)]
    pub summary: DailySummary,
    pub notices: Vec<Notice>,
}

#[derive(Clone)]
pub struct SummaryService {
    store: Arc<dyn DocumentStore>,
}

impl SummaryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn daily_summary(
        &self,
        shop: Shop,
        date: NaiveDate,
        request: &SummaryRequest,
    ) -> AppResult<SummaryView> {
        let cash = &request.cash;
        validate_amount("openingBalance", cash.opening_balance)?;
        validate_amount("deposit", cash.deposit)?;
        if let Some(closing) = cash.closing_balance {
            validate_amount("closingBalance", closing)?;
        }

        let session = PendingChanges::from_edits(shop, date, &request.pending)?;
        let loaded = SnapshotService::new(self.store.clone()).load().await?;
        let sheet = DaySheet::build(&loaded.snapshot, shop, date, &session);
        let summary = DailySummary::build(&sheet, cash);

        let mut notices = loaded.notices;
        if !summary.equation.is_balanced() {
            tracing::info!(
                "Cash for {} on {} is off by {} ({:?})",
                shop,
                date,
                summary.equation.magnitude(),
                summary.equation.status
            );
        }
        if !summary.missing_prices.is_empty() {
            notices.push(Notice::warning(format!(
                "Missing prices for: {}",
                summary.missing_prices.join(", ")
            )));
        }

        Ok(SummaryView { summary, notices })
    }
}
