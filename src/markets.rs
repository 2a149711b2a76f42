//! Market registry: routing from market kinds and contract addresses to
//! their backing ledger tables and business constants.
//!
//! One pot = one smart contract + one (bets, eliminations) table pair. The
//! registry is an immutable value handed to the workflow functions, so tests
//! can point the same operations at scratch tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market category, one per pot family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    Featured,
    Crypto,
    Stocks,
    Music,
    Formula1,
}

impl MarketKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketKind::Featured => "featured",
            MarketKind::Crypto => "crypto",
            MarketKind::Stocks => "stocks",
            MarketKind::Music => "music",
            MarketKind::Formula1 => "formula1",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "featured" => Some(MarketKind::Featured),
            "crypto" => Some(MarketKind::Crypto),
            "stocks" => Some(MarketKind::Stocks),
            "music" => Some(MarketKind::Music),
            "formula1" => Some(MarketKind::Formula1),
            _ => None,
        }
    }

    pub fn all() -> &'static [MarketKind] {
        &[
            MarketKind::Featured,
            MarketKind::Crypto,
            MarketKind::Stocks,
            MarketKind::Music,
            MarketKind::Formula1,
        ]
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Physical table pair backing one market
#[derive(Debug, Clone)]
pub struct MarketTables {
    pub bets: String,
    pub eliminations: String,
}

/// Registry entry for one market
#[derive(Debug, Clone)]
pub struct MarketEntry {
    pub kind: MarketKind,
    /// Pot contract address, lowercased
    pub contract_address: String,
    /// The question shown in prediction history for this pot
    pub question: String,
    pub tables: MarketTables,
    /// Fixed event date for penalty-exempt markets. None = default
    /// "tomorrow in UTC" prediction-date rule.
    pub event_date: Option<NaiveDate>,
}

/// Immutable market-type <-> table routing
#[derive(Debug, Clone)]
pub struct MarketRegistry {
    entries: Vec<MarketEntry>,
}

impl MarketRegistry {
    pub fn new(entries: Vec<MarketEntry>) -> Self {
        Self { entries }
    }

    /// The production Prediwin market set
    pub fn standard() -> Self {
        let entry = |kind: MarketKind, contract: &str, question: &str, event_date| MarketEntry {
            kind,
            contract_address: contract.to_lowercase(),
            question: question.to_string(),
            tables: MarketTables {
                bets: format!("{}_bets", kind.as_str()),
                eliminations: format!("{}_wrong_predictions", kind.as_str()),
            },
            event_date,
        };

        Self::new(vec![
            entry(
                MarketKind::Featured,
                "0xd1547f2f93e261ce4a4dfbcb9e0b2dd8cd367409",
                "Will Bitcoin end the day higher?",
                None,
            ),
            entry(
                MarketKind::Crypto,
                "0x54ea4b4b57a925ca6d777d1a95a25b4f71c6dbc1",
                "Will Bitcoin end the day higher?",
                None,
            ),
            entry(
                MarketKind::Stocks,
                "0x8b2f1d5a76cb2a9ee84913bbb2262e0eec2cd584",
                "Will Tesla stock end the day higher?",
                None,
            ),
            entry(
                MarketKind::Music,
                "0x2e18a34b1c5b8b1f6a9015ce6a3cb2a9b73ee4b2",
                "Will the song chart higher this week?",
                // Weekly chart release, fixed date
                NaiveDate::from_ymd_opt(2026, 9, 4),
            ),
            entry(
                MarketKind::Formula1,
                "0x90c1f9bb6bdcf0243f943be5c371f8d9fbe4a2c7",
                "Will Verstappen win the race?",
                // Race day, fixed date
                NaiveDate::from_ymd_opt(2026, 9, 6),
            ),
        ])
    }

    pub fn get(&self, kind: MarketKind) -> Option<&MarketEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    /// Look up an entry by pot contract address, case-insensitive
    pub fn by_contract(&self, contract_address: &str) -> Option<&MarketEntry> {
        let addr = contract_address.to_lowercase();
        self.entries.iter().find(|e| e.contract_address == addr)
    }

    pub fn entries(&self) -> &[MarketEntry] {
        &self.entries
    }
}

/// Generic per-category question used when a pot has no configured question
pub fn fallback_question(kind: MarketKind) -> String {
    match kind {
        MarketKind::Featured => "Will the featured market resolve positive?".to_string(),
        MarketKind::Crypto => "Will the crypto market resolve positive?".to_string(),
        MarketKind::Stocks => "Will the stock market resolve positive?".to_string(),
        MarketKind::Music => "Will the music market resolve positive?".to_string(),
        MarketKind::Formula1 => "Will the race resolve positive?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in MarketKind::all() {
            assert_eq!(MarketKind::parse(kind.as_str()), Some(*kind));
        }
        assert_eq!(MarketKind::parse("sports"), None);
    }

    #[test]
    fn test_standard_registry_routes_every_kind() {
        let registry = MarketRegistry::standard();
        for kind in MarketKind::all() {
            let entry = registry.get(*kind).expect("missing entry");
            assert!(entry.tables.bets.starts_with(kind.as_str()));
            assert!(entry.tables.eliminations.ends_with("_wrong_predictions"));
        }
    }

    #[test]
    fn test_contract_lookup_is_case_insensitive() {
        let registry = MarketRegistry::standard();
        let crypto = registry.get(MarketKind::Crypto).unwrap();
        let upper = crypto.contract_address.to_uppercase();
        let found = registry.by_contract(&upper).unwrap();
        assert_eq!(found.kind, MarketKind::Crypto);
    }

    #[test]
    fn test_penalty_exempt_markets_have_event_dates() {
        let registry = MarketRegistry::standard();
        assert!(registry.get(MarketKind::Formula1).unwrap().event_date.is_some());
        assert!(registry.get(MarketKind::Crypto).unwrap().event_date.is_none());
    }
}
