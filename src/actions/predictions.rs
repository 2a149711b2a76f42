//! Placing and retrieving predictions

use super::errors::ActionError;
use super::history::HistoryOutcome;
use super::Actions;
use crate::db::BetWrite;
use crate::markets::{fallback_question, MarketEntry, MarketKind};
use crate::time::{today_utc, tomorrow_utc};
use crate::types::{normalize_wallet, Bet, PlacedBet, Prediction};
use chrono::NaiveDate;
use tracing::info;

/// The date a prediction placed now resolves against: the configured event
/// date for penalty-exempt markets, otherwise tomorrow in UTC.
fn prediction_date(market: &MarketEntry) -> NaiveDate {
    market.event_date.unwrap_or_else(tomorrow_utc)
}

/// The date a read of "today's" bet targets. Penalty-exempt markets pin
/// every read to the event date.
fn read_date(market: &MarketEntry, default: NaiveDate) -> NaiveDate {
    market.event_date.unwrap_or(default)
}

impl Actions {
    /// Place a directional prediction, or change an existing one for the
    /// same date.
    ///
    /// The elimination gate and the bet upsert commit in one transaction, so
    /// an eliminated wallet can never slip a bet in and a double submission
    /// leaves exactly one row. The history write runs after commit and is
    /// best-effort; its outcome is returned for the caller to log.
    pub async fn place_prediction(
        &self,
        wallet_address: &str,
        prediction: Prediction,
        kind: MarketKind,
        question: Option<&str>,
    ) -> Result<(PlacedBet, HistoryOutcome), ActionError> {
        let market = self.market(kind)?;
        let wallet = normalize_wallet(wallet_address);
        let now = crate::time::now_utc();
        let date = prediction_date(market);

        let write = self
            .db
            .place_bet_guarded(&market.tables, &wallet, date, prediction, now)
            .await?;

        let updated = match write {
            BetWrite::Eliminated => return Err(ActionError::Eliminated),
            BetWrite::Inserted => false,
            BetWrite::Updated => true,
        };

        info!(
            "Prediction {} for {} on {} ({})",
            prediction,
            wallet,
            kind,
            if updated { "changed" } else { "placed" }
        );

        let question = question
            .map(str::to_string)
            .or_else(|| Some(market.question.clone()).filter(|q| !q.is_empty()))
            .unwrap_or_else(|| fallback_question(kind));

        let history = self
            .record_prediction_history(
                &wallet,
                &question,
                prediction,
                &market.contract_address,
                date,
            )
            .await;
        history.log("prediction");

        Ok((
            PlacedBet {
                prediction,
                prediction_date: date,
                updated,
            },
            history,
        ))
    }

    /// The wallet's bet for the next prediction date, if any
    pub async fn get_tomorrows_bet(
        &self,
        wallet_address: &str,
        kind: MarketKind,
    ) -> Result<Option<Bet>, ActionError> {
        let market = self.market(kind)?;
        let wallet = normalize_wallet(wallet_address);
        let date = read_date(market, tomorrow_utc());
        Ok(self.db.get_bet(&market.tables, &wallet, date).await?)
    }

    /// The wallet's bet resolving today, if any
    pub async fn get_todays_bet(
        &self,
        wallet_address: &str,
        kind: MarketKind,
    ) -> Result<Option<Bet>, ActionError> {
        let market = self.market(kind)?;
        let wallet = normalize_wallet(wallet_address);
        let date = read_date(market, today_utc());
        Ok(self.db.get_bet(&market.tables, &wallet, date).await?)
    }

    /// Every wallet's bet for a date, oldest first
    pub async fn get_bets_for_date(
        &self,
        kind: MarketKind,
        date: NaiveDate,
    ) -> Result<Vec<Bet>, ActionError> {
        let market = self.market(kind)?;
        Ok(self.db.get_bets_for_date(&market.tables, date).await?)
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
    async fn test_first_prediction_targets_tomorrow() {
        let actions = test_actions().await;

        let (placed, history) = actions
            .place_prediction("0xAAA", Prediction::Positive, MarketKind::Crypto, None)
            .await
            .unwrap();

        assert_eq!(placed.prediction, Prediction::Positive);
        assert_eq!(placed.prediction_date, tomorrow_utc());
        assert!(!placed.updated);
        assert!(history.is_recorded());

        let bet = actions
            .get_tomorrows_bet("0xaaa", MarketKind::Crypto)
            .await
            .unwrap()
            .expect("bet should exist");
        assert_eq!(bet.prediction, Prediction::Positive);
        assert_eq!(bet.wallet_address, "0xaaa");
    }

    #[tokio::test]
    async fn test_changing_a_prediction_keeps_one_row() {
        let actions = test_actions().await;

        actions
            .place_prediction("0xaaa", Prediction::Positive, MarketKind::Crypto, None)
            .await
            .unwrap();
        let (placed, _) = actions
            .place_prediction("0xaaa", Prediction::Negative, MarketKind::Crypto, None)
            .await
            .unwrap();

        assert!(placed.updated);

        let bets = actions
            .get_bets_for_date(MarketKind::Crypto, tomorrow_utc())
            .await
            .unwrap();
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].prediction, Prediction::Negative);
    }

    #[tokio::test]
    async fn test_eliminated_wallet_is_rejected_without_a_write() {
        let actions = test_actions().await;
        let market = actions.registry().get(MarketKind::Crypto).unwrap().clone();

        actions.db.insert_elimination(&market.tables, "0xaaa").await.unwrap();

        let err = actions
            .place_prediction("0xAAA", Prediction::Positive, MarketKind::Crypto, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("re-enter"));

        let bets = actions
            .get_bets_for_date(MarketKind::Crypto, tomorrow_utc())
            .await
            .unwrap();
        assert!(bets.is_empty());
    }

    #[tokio::test]
    async fn test_wallet_lookup_is_case_insensitive() {
        let actions = test_actions().await;

        actions
            .place_prediction("0xAbCdEf", Prediction::Positive, MarketKind::Featured, None)
            .await
            .unwrap();

        let bet = actions
            .get_tomorrows_bet("0xABCDEF", MarketKind::Featured)
            .await
            .unwrap()
            .expect("same row regardless of case");
        assert_eq!(bet.wallet_address, "0xabcdef");
    }

    #[tokio::test]
    async fn test_penalty_exempt_market_uses_event_date() {
        let actions = test_actions().await;
        let event_date = actions
            .registry()
            .get(MarketKind::Formula1)
            .unwrap()
            .event_date
            .unwrap();

        let (placed, _) = actions
            .place_prediction("0xaaa", Prediction::Negative, MarketKind::Formula1, None)
            .await
            .unwrap();
        assert_eq!(placed.prediction_date, event_date);

        // Reads pin to the event date too
        let bet = actions
            .get_todays_bet("0xaaa", MarketKind::Formula1)
            .await
            .unwrap()
            .expect("event-date bet visible");
        assert_eq!(bet.bet_date, event_date);
    }

    #[tokio::test]
    async fn test_history_failure_does_not_fail_the_placement() {
        let actions = test_actions().await;

        // Poison the history table; the primary write must still succeed
        sqlx::query("DROP TABLE prediction_history")
            .execute(actions.db.pool_for_tests())
            .await
            .unwrap();

        let (placed, history) = actions
            .place_prediction("0xaaa", Prediction::Positive, MarketKind::Crypto, None)
            .await
            .unwrap();
        assert!(!placed.updated);
        assert!(matches!(history, HistoryOutcome::Failed(_)));

        let bet = actions
            .get_tomorrows_bet("0xaaa", MarketKind::Crypto)
            .await
            .unwrap();
        assert!(bet.is_some());
    }

    #[tokio::test]
    async fn test_gate_fails_closed_when_the_ledger_is_broken() {
        let actions = test_actions().await;
        let market = actions.registry().get(MarketKind::Crypto).unwrap().clone();

        actions.db.drop_eliminations_table(&market.tables).await.unwrap();

        let err = actions
            .place_prediction("0xaaa", Prediction::Positive, MarketKind::Crypto, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Database(_)));

        // The gate error aborted the transaction; no bet row exists
        let bets = actions
            .get_bets_for_date(MarketKind::Crypto, tomorrow_utc())
            .await
            .unwrap();
        assert!(bets.is_empty());
    }

    #[tokio::test]
    async fn test_custom_registry_routes_to_scratch_tables() {
        use crate::markets::{MarketEntry, MarketTables};

        let registry = Arc::new(MarketRegistry::new(vec![MarketEntry {
            kind: MarketKind::Crypto,
            contract_address: "0x1".to_string(),
            question: "scratch?".to_string(),
            tables: MarketTables {
                bets: "scratch_bets".to_string(),
                eliminations: "scratch_wrong_predictions".to_string(),
            },
            event_date: None,
        }]));
        let db = Arc::new(Database::in_memory(&registry).await.unwrap());
        let actions = Actions::new(db, registry);

        actions
            .place_prediction("0xaaa", Prediction::Positive, MarketKind::Crypto, None)
            .await
            .unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scratch_bets")
            .fetch_one(actions.db.pool_for_tests())
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }
}
