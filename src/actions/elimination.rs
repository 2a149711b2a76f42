//! Elimination checks and re-entry processing

use super::errors::ActionError;
use super::history::HistoryOutcome;
use super::Actions;
use crate::markets::MarketKind;
use crate::types::{normalize_wallet, EntryType, PotParticipation};
use tracing::info;

/// Result of a re-entry attempt
#[derive(Debug, Clone)]
pub struct ReEntry {
    /// True iff an elimination row existed and was removed
    pub removed: bool,
    /// Participation-log outcome; None when nothing was removed
    pub history: Option<HistoryOutcome>,
}

impl Actions {
    /// Whether a wallet is currently blocked from predicting on a market.
    ///
    /// Fails closed: a query error propagates instead of reading as
    /// "not eliminated".
    pub async fn is_eliminated(
        &self,
        wallet_address: &str,
        kind: MarketKind,
    ) -> Result<bool, ActionError> {
        let market = self.market(kind)?;
        let wallet = normalize_wallet(wallet_address);
        Ok(self.db.is_wallet_eliminated(&market.tables, &wallet).await?)
    }

    /// Alias for [`is_eliminated`](Actions::is_eliminated), under the name
    /// the retrieval surface uses.
    pub async fn has_wrong_predictions(
        &self,
        wallet_address: &str,
        kind: MarketKind,
    ) -> Result<bool, ActionError> {
        self.is_eliminated(wallet_address, kind).await
    }

    /// Clear a wallet's elimination after it paid the re-entry fee.
    ///
    /// Idempotent: a wallet with no elimination row gets `removed: false`
    /// and no participation write. The participation append is best-effort;
    /// its failure does not undo the removal.
    pub async fn process_re_entry(
        &self,
        wallet_address: &str,
        kind: MarketKind,
    ) -> Result<ReEntry, ActionError> {
        let market = self.market(kind)?;
        let wallet = normalize_wallet(wallet_address);

        let removed = self.db.delete_elimination(&market.tables, &wallet).await?;
        if !removed {
            return Ok(ReEntry { removed: false, history: None });
        }

        info!("Re-entry processed for {} on {}", wallet, kind);

        let history = self
            .record_participation(&wallet, market, EntryType::ReEntry)
            .await;
        history.log("re-entry participation");

        Ok(ReEntry { removed: true, history: Some(history) })
    }

    /// Log a wallet's first entry into a pot. Wholly best-effort.
    pub async fn record_pot_entry(
        &self,
        wallet_address: &str,
        kind: MarketKind,
    ) -> Result<HistoryOutcome, ActionError> {
        let market = self.market(kind)?;
        let wallet = normalize_wallet(wallet_address);

        let history = self
            .record_participation(&wallet, market, EntryType::Entry)
            .await;
        history.log("pot entry participation");
        Ok(history)
    }

    /// Participation rows for a wallet, newest first
    pub async fn participation_history(
        &self,
        wallet_address: &str,
    ) -> Result<Vec<PotParticipation>, ActionError> {
        let wallet = normalize_wallet(wallet_address);
        Ok(self.db.participation_for_wallet(&wallet).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::markets::MarketRegistry;
    use std::sync::Arc;

    async fn test_actions() -> Actions {
        let registry = Arc::new(MarketRegistry::standard());
        let db = Arc::new(Database::in_memory(&registry).await.unwrap());
        Actions::new(db, registry)
    }

    #[tokio::test]
    async fn test_re_entry_clears_elimination() {
        let actions = test_actions().await;
        let market = actions.registry().get(MarketKind::Crypto).unwrap().clone();

        actions.db.insert_elimination(&market.tables, "0xaaa").await.unwrap();
        assert!(actions.is_eliminated("0xAAA", MarketKind::Crypto).await.unwrap());

        let result = actions.process_re_entry("0xAAA", MarketKind::Crypto).await.unwrap();
        assert!(result.removed);
        assert_eq!(result.history, Some(HistoryOutcome::Recorded));

        assert!(!actions.has_wrong_predictions("0xaaa", MarketKind::Crypto).await.unwrap());
    }

    #[tokio::test]
    async fn test_re_entry_without_elimination_is_a_no_op() {
        let actions = test_actions().await;

        let result = actions.process_re_entry("0xbbb", MarketKind::Crypto).await.unwrap();
        assert!(!result.removed);
        assert!(result.history.is_none());

        // No participation row was appended
        let rows = actions.participation_history("0xbbb").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_re_entry_appends_participation_row() {
        let actions = test_actions().await;
        let market = actions.registry().get(MarketKind::Stocks).unwrap().clone();

        actions.db.insert_elimination(&market.tables, "0xccc").await.unwrap();
        actions.process_re_entry("0xCCC", MarketKind::Stocks).await.unwrap();

        let rows = actions.participation_history("0xccc").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entry_type, EntryType::ReEntry);
        assert_eq!(rows[0].contract_address, market.contract_address);
        assert_eq!(rows[0].table_type, "stocks");
    }

    #[tokio::test]
    async fn test_pot_entry_is_recorded() {
        let actions = test_actions().await;

        let outcome = actions.record_pot_entry("0xDDD", MarketKind::Featured).await.unwrap();
        assert!(outcome.is_recorded());

        let rows = actions.participation_history("0xddd").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entry_type, EntryType::Entry);
    }
}
