//! Price oracle client
//!
//! Thin read-only client for the spot-price endpoint consumed by the market
//! listing surface. Prices feed display only; nothing in the prediction
//! workflow writes through this.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Network(String),
    #[error("oracle returned an unusable payload: {0}")]
    Payload(String),
}

/// Expected oracle response shape. Prices arrive as strings to avoid
/// float precision loss.
#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: String,
}

/// Spot-price client for one oracle endpoint
#[derive(Clone)]
pub struct PriceOracle {
    client: reqwest::Client,
    base_url: String,
}

impl PriceOracle {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client, base_url }
    }

    /// Fetch the current price for an asset symbol, e.g. "BTC"
    pub async fn get_price(&self, symbol: &str) -> Result<Decimal, OracleError> {
        let url = format!("{}/price/{}", self.base_url.trim_end_matches('/'), symbol);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Network(format!("status {}", status)));
        }

        let body: PriceResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Payload(e.to_string()))?;

        Decimal::from_str(&body.price)
            .map_err(|e| OracleError::Payload(format!("bad price '{}': {}", body.price, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_payload_parses_as_decimal() {
        let body: PriceResponse = serde_json::from_str(r#"{"price":"64250.37"}"#).unwrap();
        assert_eq!(Decimal::from_str(&body.price).unwrap(), dec!(64250.37));
    }

    #[test]
    fn test_non_numeric_price_is_a_payload_error() {
        let body: PriceResponse = serde_json::from_str(r#"{"price":"n/a"}"#).unwrap();
        assert!(Decimal::from_str(&body.price).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_oracle_is_a_network_error() {
        // Reserved TEST-NET-1 address; nothing listens there
        let oracle = PriceOracle::new(
            "http://192.0.2.1:9".to_string(),
            Duration::from_millis(200),
        );
        let err = oracle.get_price("BTC").await.unwrap_err();
        assert!(matches!(err, OracleError::Network(_)));
    }
}
