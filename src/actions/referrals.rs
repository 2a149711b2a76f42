//! Referral codes and referral recording

use super::errors::ActionError;
use super::Actions;
use crate::types::normalize_wallet;
use rand::Rng;
use tracing::info;

const CODE_LEN: usize = 8;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Outcome of recording a referral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferralOutcome {
    Recorded,
    UnknownCode,
    SelfReferral,
    AlreadyReferred,
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

impl Actions {
    /// Get the wallet's referral code, generating one on first call.
    /// Repeat calls return the same code.
    pub async fn referral_code_for(&self, wallet_address: &str) -> Result<String, ActionError> {
        let wallet = normalize_wallet(wallet_address);

        if let Some(code) = self.db.get_referral_code(&wallet).await? {
            return Ok(code);
        }

        // UNIQUE on code; regenerate on the rare collision
        for _ in 0..5 {
            let code = generate_code();
            match self.db.insert_referral_code(&wallet, &code).await {
                Ok(()) => {
                    info!("Referral code generated for {}", wallet);
                    return Ok(code);
                }
                Err(_) => {
                    // Either a code collision or a concurrent insert for
                    // the same wallet; re-read before retrying
                    if let Some(existing) = self.db.get_referral_code(&wallet).await? {
                        return Ok(existing);
                    }
                }
            }
        }

        Err(ActionError::Database(anyhow::anyhow!(
            "could not allocate a referral code"
        )))
    }

    /// Record that `referee` signed up with `code`. One referral per
    /// referee; self-referrals rejected.
    pub async fn record_referral(
        &self,
        code: &str,
        referee_address: &str,
    ) -> Result<ReferralOutcome, ActionError> {
        let referee = normalize_wallet(referee_address);
        let code = code.trim().to_uppercase();

        let referrer = match self.db.wallet_for_referral_code(&code).await? {
            Some(wallet) => wallet,
            None => return Ok(ReferralOutcome::UnknownCode),
        };

        if referrer == referee {
            return Ok(ReferralOutcome::SelfReferral);
        }

        if self.db.insert_referral(&referrer, &referee).await? {
            info!("Referral recorded: {} -> {}", referrer, referee);
            Ok(ReferralOutcome::Recorded)
        } else {
            Ok(ReferralOutcome::AlreadyReferred)
        }
    }

    /// Number of confirmed referrals credited to a wallet
    pub async fn referral_count(&self, wallet_address: &str) -> Result<i64, ActionError> {
        let wallet = normalize_wallet(wallet_address);
        Ok(self.db.count_referrals(&wallet).await?)
    }
}
