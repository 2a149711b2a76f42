//! Core types for the Prediwin prediction workflow

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional prediction for a market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Positive,
    Negative,
}

impl Prediction {
    /// Stored form, matching the ledger column values
    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Positive => "positive",
            Prediction::Negative => "negative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Prediction::Positive),
            "negative" => Some(Prediction::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored bet row from a market's bet ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub id: i64,
    /// Always lowercased before storage
    pub wallet_address: String,
    /// The UTC calendar date this bet resolves against
    pub bet_date: NaiveDate,
    pub prediction: Prediction,
    pub created_at: DateTime<Utc>,
}

/// Result of placing or changing a prediction
#[derive(Debug, Clone, Serialize)]
pub struct PlacedBet {
    pub prediction: Prediction,
    pub prediction_date: NaiveDate,
    /// True when an existing row for (wallet, date) was overwritten
    pub updated: bool,
}

/// How a wallet entered a pot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    Entry,
    ReEntry,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Entry => "entry",
            EntryType::ReEntry => "re-entry",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(EntryType::Entry),
            "re-entry" => Some(EntryType::ReEntry),
            _ => None,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only pot participation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotParticipation {
    pub id: i64,
    pub wallet_address: String,
    pub contract_address: String,
    pub table_type: String,
    pub entry_type: EntryType,
    pub recorded_at: DateTime<Utc>,
}

/// Normalize a wallet address for storage and lookup.
///
/// Every read and write goes through this so `0xABC..` and `0xabc..`
/// resolve to the same rows.
pub fn normalize_wallet(address: &str) -> String {
    address.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_round_trip() {
        assert_eq!(Prediction::parse("positive"), Some(Prediction::Positive));
        assert_eq!(Prediction::parse("negative"), Some(Prediction::Negative));
        assert_eq!(Prediction::parse("maybe"), None);
        assert_eq!(Prediction::Positive.as_str(), "positive");
    }

    #[test]
    fn test_entry_type_strings() {
        assert_eq!(EntryType::ReEntry.as_str(), "re-entry");
        assert_eq!(EntryType::parse("re-entry"), Some(EntryType::ReEntry));
        assert_eq!(EntryType::parse("entry"), Some(EntryType::Entry));
    }

    #[test]
    fn test_normalize_wallet() {
        assert_eq!(normalize_wallet(" 0xAbC123 "), "0xabc123");
        assert_eq!(normalize_wallet("0xabc123"), "0xabc123");
    }
}
