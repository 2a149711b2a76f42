//! Market listing endpoints

use super::ApiError;
use crate::api::server::AppState;
use axum::{extract::State, Json};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

/// One market as shown to the frontend
#[derive(Debug, Serialize)]
pub struct MarketInfo {
    pub kind: String,
    pub contract_address: String,
    pub question: String,
    /// Set for penalty-exempt markets with a fixed event date
    pub event_date: Option<NaiveDate>,
}

/// Market listing response
#[derive(Debug, Serialize)]
pub struct MarketsResponse {
    pub markets: Vec<MarketInfo>,
    /// Current BTC spot price, omitted when the oracle is unset or down
    pub btc_price: Option<Decimal>,
}

/// List all configured markets, with a best-effort oracle price
pub async fn list_markets(
    State(state): State<AppState>,
) -> Result<Json<MarketsResponse>, ApiError> {
    let markets = state
        .actions
        .registry()
        .entries()
        .iter()
        .map(|e| MarketInfo {
            kind: e.kind.as_str().to_string(),
            contract_address: e.contract_address.clone(),
            question: e.question.clone(),
            event_date: e.event_date,
        })
        .collect();

    // Price is display-only; a failed read degrades to None
    let btc_price = match &state.oracle {
        Some(oracle) => match oracle.get_price("BTC").await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!("Oracle price fetch failed: {}", e);
                None
            }
        },
        None => None,
    };

    Ok(Json(MarketsResponse { markets, btc_price }))
}
