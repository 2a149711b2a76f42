//! Best-effort history writes
//!
//! History and participation logs are informational. Their writes run after
//! the primary write commits and their failures never propagate to the
//! caller's result; the asymmetry is intentional and carried in the type.

use super::Actions;
use crate::markets::MarketEntry;
use crate::types::{EntryType, Prediction};
use chrono::NaiveDate;
use tracing::warn;

/// Outcome of a best-effort side effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    Recorded,
    /// Write failed; reason kept for logging only
    Failed(String),
}

impl HistoryOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, HistoryOutcome::Recorded)
    }

    /// Log a failed outcome. No-op when recorded.
    pub fn log(&self, context: &str) {
        if let HistoryOutcome::Failed(reason) = self {
            warn!("{} history write failed: {}", context, reason);
        }
    }
}

impl Actions {
    /// Record a prediction in the history log. Never fails the caller.
    pub(crate) async fn record_prediction_history(
        &self,
        wallet_address: &str,
        question: &str,
        prediction: Prediction,
        contract_address: &str,
        prediction_date: NaiveDate,
    ) -> HistoryOutcome {
        match self
            .db
            .upsert_prediction_history(
                wallet_address,
                question,
                prediction,
                contract_address,
                prediction_date,
            )
            .await
        {
            Ok(()) => HistoryOutcome::Recorded,
            Err(e) => HistoryOutcome::Failed(e.to_string()),
        }
    }

    /// Record a pot entry or re-entry in the participation log
    pub(crate) async fn record_participation(
        &self,
        wallet_address: &str,
        market: &MarketEntry,
        entry_type: EntryType,
    ) -> HistoryOutcome {
        match self
            .db
            .append_pot_participation(
                wallet_address,
                &market.contract_address,
                market.kind.as_str(),
                entry_type,
            )
            .await
        {
            Ok(()) => HistoryOutcome::Recorded,
            Err(e) => HistoryOutcome::Failed(e.to_string()),
        }
    }
}
