//! Prediction workflow: the request-handler layer over the ledgers
//!
//! Each operation is a stateless request/response call. Primary writes are
//! transactional; history writes are best-effort side effects with their own
//! typed outcome (see [`history`]).

pub mod elimination;
pub mod errors;
pub mod history;
pub mod predictions;
pub mod referrals;

pub use errors::ActionError;
pub use history::HistoryOutcome;

use crate::db::Database;
use crate::markets::{MarketEntry, MarketKind, MarketRegistry};
use std::sync::Arc;

/// Workflow entry points, bound to a database and a market registry.
///
/// The registry is injected rather than read from a global so tests can
/// route operations at scratch tables.
#[derive(Clone)]
pub struct Actions {
    db: Arc<Database>,
    registry: Arc<MarketRegistry>,
}

impl Actions {
    pub fn new(db: Arc<Database>, registry: Arc<MarketRegistry>) -> Self {
        Self { db, registry }
    }

    pub fn registry(&self) -> &MarketRegistry {
        &self.registry
    }

    pub(crate) fn market(&self, kind: MarketKind) -> Result<&MarketEntry, ActionError> {
        self.registry.get(kind).ok_or(ActionError::UnknownMarket(kind))
    }
}
