//! Workflow error taxonomy
//!
//! Two classes matter to callers: the elimination-gate rejection, which is
//! a user-facing instruction, and everything else, which is an internal
//! failure the caller renders generically. Gating reads fail closed: a
//! query error is never reported as "not eliminated".

use crate::markets::MarketKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    /// Wallet is blocked by an elimination row for this market
    #[error("You have been eliminated from this pot. Pay the re-entry fee to re-enter before predicting again.")]
    Eliminated,

    /// Market kind not present in the registry
    #[error("unknown market type: {0}")]
    UnknownMarket(MarketKind),

    /// Underlying query failed
    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl ActionError {
    /// Whether this error carries a message meant for the end user
    pub fn is_user_facing(&self) -> bool {
        matches!(self, ActionError::Eliminated)
    }

    /// Human-readable message for the frontend
    pub fn user_message(&self) -> String {
        match self {
            ActionError::Eliminated => self.to_string(),
            ActionError::UnknownMarket(_) => "This market is not available.".to_string(),
            ActionError::Database(_) => {
                "Something went wrong saving your prediction. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elimination_message_instructs_re_entry() {
        let err = ActionError::Eliminated;
        assert!(err.is_user_facing());
        assert!(err.to_string().contains("re-enter"));
    }

    #[test]
    fn test_database_error_is_not_user_facing() {
        let err = ActionError::Database(anyhow::anyhow!("boom"));
        assert!(!err.is_user_facing());
        assert!(!err.user_message().contains("boom"));
    }
}
