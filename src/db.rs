//! SQLite database for bet ledgers, elimination ledgers, and history logs
//!
//! Every market kind owns its own (bets, eliminations) table pair; the
//! physical names come from the [`MarketRegistry`](crate::markets::MarketRegistry)
//! so tests can route the same operations at scratch tables. History tables
//! are shared across markets.

use crate::markets::{MarketRegistry, MarketTables};
use crate::types::{Bet, EntryType, PotParticipation, Prediction};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::info;

const DATE_FMT: &str = "%Y-%m-%d";

/// Outcome of the guarded bet write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetWrite {
    /// Wallet has an elimination row; nothing was written
    Eliminated,
    /// New bet row created
    Inserted,
    /// Existing (wallet, date) row overwritten in place
    Updated,
}

/// Database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database at `path` and set up the schema for
    /// every market in the registry.
    pub async fn new(path: &str, registry: &MarketRegistry) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(path)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.initialize(registry).await?;

        Ok(db)
    }

    /// In-memory database for tests. Single connection: every pooled
    /// connection to `:memory:` would otherwise see its own empty database.
    pub async fn in_memory(registry: &MarketRegistry) -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.initialize(registry).await?;

        Ok(db)
    }

    /// Initialize database schema
    async fn initialize(&self, registry: &MarketRegistry) -> Result<()> {
        // One bet ledger and one elimination ledger per market
        for entry in registry.entries() {
            let bets = &entry.tables.bets;
            let eliminations = &entry.tables.eliminations;

            let sql = format!(
                r#"
                CREATE TABLE IF NOT EXISTS {bets} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    wallet_address TEXT NOT NULL,
                    bet_date TEXT NOT NULL,
                    prediction TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    UNIQUE(wallet_address, bet_date)
                )
                "#
            );
            sqlx::query(&sql).execute(&self.pool).await?;

            let sql = format!(
                "CREATE INDEX IF NOT EXISTS idx_{bets}_date ON {bets}(bet_date)"
            );
            sqlx::query(&sql).execute(&self.pool).await?;

            let sql = format!(
                r#"
                CREATE TABLE IF NOT EXISTS {eliminations} (
                    wallet_address TEXT PRIMARY KEY
                )
                "#
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }

        // Prediction history, informational only
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS prediction_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                wallet_address TEXT NOT NULL,
                question TEXT NOT NULL,
                prediction TEXT NOT NULL,
                contract_address TEXT NOT NULL,
                prediction_date TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                UNIQUE(wallet_address, contract_address, prediction_date)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Pot participation, append-only
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pot_participation_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                wallet_address TEXT NOT NULL,
                contract_address TEXT NOT NULL,
                table_type TEXT NOT NULL,
                entry_type TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_participation_wallet ON pot_participation_history(wallet_address)",
        )
        .execute(&self.pool)
        .await?;

        // Referral codes and referrals
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS referral_codes (
                wallet_address TEXT PRIMARY KEY,
                code TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS referrals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                referrer_address TEXT NOT NULL,
                referee_address TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database initialized");
        Ok(())
    }

    // ==================== ELIMINATION LEDGER ====================

    /// Check whether a wallet has an elimination row for a market.
    /// Query errors propagate; gating decisions must not fail open.
    pub async fn is_wallet_eliminated(
        &self,
        tables: &MarketTables,
        wallet_address: &str,
    ) -> Result<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE wallet_address = ?",
            tables.eliminations
        );
        let row: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(wallet_address)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Remove a wallet's elimination row. Returns true iff a row existed.
    pub async fn delete_elimination(
        &self,
        tables: &MarketTables,
        wallet_address: &str,
    ) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE wallet_address = ?", tables.eliminations);
        let result = sqlx::query(&sql)
            .bind(wallet_address)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert an elimination row. Used by the external resolver path and by
    /// tests; a duplicate insert is a no-op.
    pub async fn insert_elimination(
        &self,
        tables: &MarketTables,
        wallet_address: &str,
    ) -> Result<()> {
        let sql = format!(
            "INSERT OR IGNORE INTO {} (wallet_address) VALUES (?)",
            tables.eliminations
        );
        sqlx::query(&sql)
            .bind(wallet_address)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== BET LEDGER ====================

    /// Elimination gate plus bet upsert in one transaction.
    ///
    /// The gate read and the write commit together, so a concurrent
    /// elimination or duplicate submission cannot interleave between the
    /// check and the insert.
    pub async fn place_bet_guarded(
        &self,
        tables: &MarketTables,
        wallet_address: &str,
        bet_date: NaiveDate,
        prediction: Prediction,
        now: DateTime<Utc>,
    ) -> Result<BetWrite> {
        let mut tx = self.pool.begin().await?;

        let gate_sql = format!(
            "SELECT 1 FROM {} WHERE wallet_address = ?",
            tables.eliminations
        );
        let eliminated: Option<(i64,)> = sqlx::query_as(&gate_sql)
            .bind(wallet_address)
            .fetch_optional(&mut *tx)
            .await?;

        if eliminated.is_some() {
            tx.rollback().await?;
            return Ok(BetWrite::Eliminated);
        }

        let existing_sql = format!(
            "SELECT id FROM {} WHERE wallet_address = ? AND bet_date = ?",
            tables.bets
        );
        let existing: Option<(i64,)> = sqlx::query_as(&existing_sql)
            .bind(wallet_address)
            .bind(bet_date.format(DATE_FMT).to_string())
            .fetch_optional(&mut *tx)
            .await?;

        let write = match existing {
            Some((id,)) => {
                let sql = format!(
                    "UPDATE {} SET prediction = ?, created_at = ? WHERE id = ?",
                    tables.bets
                );
                sqlx::query(&sql)
                    .bind(prediction.as_str())
                    .bind(now.to_rfc3339())
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                BetWrite::Updated
            }
            None => {
                let sql = format!(
                    "INSERT INTO {} (wallet_address, bet_date, prediction, created_at) VALUES (?, ?, ?, ?)",
                    tables.bets
                );
                sqlx::query(&sql)
                    .bind(wallet_address)
                    .bind(bet_date.format(DATE_FMT).to_string())
                    .bind(prediction.as_str())
                    .bind(now.to_rfc3339())
                    .execute(&mut *tx)
                    .await?;
                BetWrite::Inserted
            }
        };

        tx.commit().await?;
        Ok(write)
    }

    /// Get a wallet's bet for a specific date
    pub async fn get_bet(
        &self,
        tables: &MarketTables,
        wallet_address: &str,
        bet_date: NaiveDate,
    ) -> Result<Option<Bet>> {
        let sql = format!(
            "SELECT * FROM {} WHERE wallet_address = ? AND bet_date = ?",
            tables.bets
        );
        let row = sqlx::query(&sql)
            .bind(wallet_address)
            .bind(bet_date.format(DATE_FMT).to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(row_to_bet(&r)?)),
            None => Ok(None),
        }
    }

    /// Get every wallet's bet for a date
    pub async fn get_bets_for_date(
        &self,
        tables: &MarketTables,
        bet_date: NaiveDate,
    ) -> Result<Vec<Bet>> {
        let sql = format!(
            "SELECT * FROM {} WHERE bet_date = ? ORDER BY created_at ASC",
            tables.bets
        );
        let rows = sqlx::query(&sql)
            .bind(bet_date.format(DATE_FMT).to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_bet).collect()
    }

    // ==================== HISTORY LOGS ====================

    /// Upsert a prediction history row, keyed on (wallet, contract, date)
    pub async fn upsert_prediction_history(
        &self,
        wallet_address: &str,
        question: &str,
        prediction: Prediction,
        contract_address: &str,
        prediction_date: NaiveDate,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO prediction_history (wallet_address, question, prediction, contract_address, prediction_date, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(wallet_address, contract_address, prediction_date)
            DO UPDATE SET question = excluded.question, prediction = excluded.prediction, recorded_at = excluded.recorded_at
            "#,
        )
        .bind(wallet_address)
        .bind(question)
        .bind(prediction.as_str())
        .bind(contract_address)
        .bind(prediction_date.format(DATE_FMT).to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Append a pot participation row
    pub async fn append_pot_participation(
        &self,
        wallet_address: &str,
        contract_address: &str,
        table_type: &str,
        entry_type: EntryType,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO pot_participation_history (wallet_address, contract_address, table_type, entry_type, recorded_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(wallet_address)
        .bind(contract_address)
        .bind(table_type)
        .bind(entry_type.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Participation rows for a wallet, newest first
    pub async fn participation_for_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Vec<PotParticipation>> {
        let rows = sqlx::query(
            "SELECT * FROM pot_participation_history WHERE wallet_address = ? ORDER BY id DESC",
        )
        .bind(wallet_address)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                let entry_type_str: String = r.get("entry_type");
                let entry_type = EntryType::parse(&entry_type_str)
                    .ok_or_else(|| anyhow!("unknown entry_type: {}", entry_type_str))?;
                let recorded_at_str: String = r.get("recorded_at");
                Ok(PotParticipation {
                    id: r.get("id"),
                    wallet_address: r.get("wallet_address"),
                    contract_address: r.get("contract_address"),
                    table_type: r.get("table_type"),
                    entry_type,
                    recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)?
                        .with_timezone(&Utc),
                })
            })
            .collect()
    }

    // ==================== REFERRALS ====================

    /// Get a wallet's referral code if one exists
    pub async fn get_referral_code(&self, wallet_address: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT code FROM referral_codes WHERE wallet_address = ?")
                .bind(wallet_address)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(code,)| code))
    }

    /// Store a referral code for a wallet. Fails on a code collision so the
    /// caller can regenerate.
    pub async fn insert_referral_code(&self, wallet_address: &str, code: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO referral_codes (wallet_address, code, created_at) VALUES (?, ?, ?)",
        )
        .bind(wallet_address)
        .bind(code)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Resolve a referral code to its owner wallet
    pub async fn wallet_for_referral_code(&self, code: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT wallet_address FROM referral_codes WHERE code = ?")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(wallet,)| wallet))
    }

    /// Record a referral. Returns false when the referee was already
    /// referred (unique referee constraint).
    pub async fn insert_referral(
        &self,
        referrer_address: &str,
        referee_address: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO referrals (referrer_address, referee_address, created_at) VALUES (?, ?, ?)",
        )
        .bind(referrer_address)
        .bind(referee_address)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count confirmed referrals for a wallet
    pub async fn count_referrals(&self, referrer_address: &str) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM referrals WHERE referrer_address = ?")
                .bind(referrer_address)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    /// Drop a market's elimination table. Test hook for exercising the
    /// fail-closed gate against a broken store.
    #[cfg(test)]
    pub async fn drop_eliminations_table(&self, tables: &MarketTables) -> Result<()> {
        let sql = format!("DROP TABLE {}", tables.eliminations);
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    #[cfg(test)]
    pub fn pool_for_tests(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_bet(row: &sqlx::sqlite::SqliteRow) -> Result<Bet> {
    let prediction_str: String = row.get("prediction");
    let prediction = Prediction::parse(&prediction_str)
        .ok_or_else(|| anyhow!("unknown prediction value: {}", prediction_str))?;

    let bet_date_str: String = row.get("bet_date");
    let created_at_str: String = row.get("created_at");

    Ok(Bet {
        id: row.get("id"),
        wallet_address: row.get("wallet_address"),
        bet_date: NaiveDate::parse_from_str(&bet_date_str, DATE_FMT)?,
        prediction,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)?.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::{MarketKind, MarketRegistry};

    async fn test_db() -> (Database, MarketRegistry) {
        let registry = MarketRegistry::standard();
        let db = Database::in_memory(&registry).await.unwrap();
        (db, registry)
    }

    #[tokio::test]
    async fn test_guarded_write_inserts_then_updates() {
        let (db, registry) = test_db().await;
        let tables = &registry.get(MarketKind::Crypto).unwrap().tables;
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();

        let first = db
            .place_bet_guarded(tables, "0xaaa", date, Prediction::Positive, Utc::now())
            .await
            .unwrap();
        assert_eq!(first, BetWrite::Inserted);

        let second = db
            .place_bet_guarded(tables, "0xaaa", date, Prediction::Negative, Utc::now())
            .await
            .unwrap();
        assert_eq!(second, BetWrite::Updated);

        // Exactly one row, reflecting the second prediction
        let bets = db.get_bets_for_date(tables, date).await.unwrap();
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].prediction, Prediction::Negative);
    }

    #[tokio::test]
    async fn test_guarded_write_rejects_eliminated_wallet() {
        let (db, registry) = test_db().await;
        let tables = &registry.get(MarketKind::Crypto).unwrap().tables;
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();

        db.insert_elimination(tables, "0xaaa").await.unwrap();

        let write = db
            .place_bet_guarded(tables, "0xaaa", date, Prediction::Positive, Utc::now())
            .await
            .unwrap();
        assert_eq!(write, BetWrite::Eliminated);
        assert!(db.get_bet(tables, "0xaaa", date).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_elimination_reports_whether_row_existed() {
        let (db, registry) = test_db().await;
        let tables = &registry.get(MarketKind::Stocks).unwrap().tables;

        assert!(!db.delete_elimination(tables, "0xbbb").await.unwrap());

        db.insert_elimination(tables, "0xbbb").await.unwrap();
        assert!(db.delete_elimination(tables, "0xbbb").await.unwrap());
        assert!(!db.is_wallet_eliminated(tables, "0xbbb").await.unwrap());
    }

    #[tokio::test]
    async fn test_markets_do_not_share_ledgers() {
        let (db, registry) = test_db().await;
        let crypto = &registry.get(MarketKind::Crypto).unwrap().tables;
        let stocks = &registry.get(MarketKind::Stocks).unwrap().tables;

        db.insert_elimination(crypto, "0xccc").await.unwrap();
        assert!(db.is_wallet_eliminated(crypto, "0xccc").await.unwrap());
        assert!(!db.is_wallet_eliminated(stocks, "0xccc").await.unwrap());
    }

    #[tokio::test]
    async fn test_prediction_history_upserts_in_place() {
        let (db, _) = test_db().await;
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();

        db.upsert_prediction_history("0xaaa", "Q?", Prediction::Positive, "0xc0ffee", date)
            .await
            .unwrap();
        db.upsert_prediction_history("0xaaa", "Q?", Prediction::Negative, "0xc0ffee", date)
            .await
            .unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM prediction_history")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_referral_referee_is_unique() {
        let (db, _) = test_db().await;

        assert!(db.insert_referral("0xref", "0xnew").await.unwrap());
        assert!(!db.insert_referral("0xother", "0xnew").await.unwrap());
        assert_eq!(db.count_referrals("0xref").await.unwrap(), 1);
    }
}
