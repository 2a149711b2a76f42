//! Prediwin Backend Library
//!
//! Server-side workflow for the Prediwin prediction market: wallets place
//! daily directional predictions per market, wrong predictions eliminate a
//! wallet until it pays a re-entry fee, and entries/re-entries are logged
//! for history surfaces. Payouts and outcome resolution live in the pot
//! smart contracts, not here.

pub mod actions;
pub mod api;
pub mod config;
pub mod db;
pub mod markets;
pub mod oracle;
pub mod time;
pub mod types;

pub use actions::{ActionError, Actions, HistoryOutcome};
pub use config::Config;
pub use db::Database;
pub use markets::{MarketKind, MarketRegistry};
pub use oracle::PriceOracle;
pub use types::{Bet, EntryType, PlacedBet, PotParticipation, Prediction};
