//! Prediction placement and retrieval endpoints

use super::{action_error, parse_kind, ApiError, ErrorResponse};
use crate::api::server::AppState;
use crate::types::{Bet, Prediction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Request to place or change a prediction
#[derive(Debug, Deserialize)]
pub struct PlacePredictionRequest {
    pub wallet_address: String,
    pub prediction: Prediction,
    pub market: String,
    /// Optional question override for the history log
    pub question: Option<String>,
}

/// Response for a placed prediction
#[derive(Debug, Serialize)]
pub struct PlacePredictionResponse {
    pub prediction: Prediction,
    pub prediction_date: NaiveDate,
    pub updated: bool,
}

/// Query parameters for single-bet lookups
#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub wallet_address: String,
}

/// Response wrapping an optional bet
#[derive(Debug, Serialize)]
pub struct BetResponse {
    pub bet: Option<Bet>,
}

/// Response for date-wide bet listings
#[derive(Debug, Serialize)]
pub struct BetsResponse {
    pub bets: Vec<Bet>,
    pub total: usize,
}

/// Place a directional prediction for the market's next prediction date
pub async fn place_prediction(
    State(state): State<AppState>,
    Json(req): Json<PlacePredictionRequest>,
) -> Result<Json<PlacePredictionResponse>, ApiError> {
    let kind = parse_kind(&req.market)?;

    // The best-effort history outcome was already logged by the workflow;
    // it never turns a placed prediction into a failure.
    let (placed, _history) = state
        .actions
        .place_prediction(
            &req.wallet_address,
            req.prediction,
            kind,
            req.question.as_deref(),
        )
        .await
        .map_err(action_error)?;

    Ok(Json(PlacePredictionResponse {
        prediction: placed.prediction,
        prediction_date: placed.prediction_date,
        updated: placed.updated,
    }))
}

/// The caller's bet for the next prediction date
pub async fn get_tomorrows_bet(
    State(state): State<AppState>,
    Path(market): Path<String>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<BetResponse>, ApiError> {
    let kind = parse_kind(&market)?;
    let bet = state
        .actions
        .get_tomorrows_bet(&query.wallet_address, kind)
        .await
        .map_err(action_error)?;
    Ok(Json(BetResponse { bet }))
}

/// The caller's bet resolving today
pub async fn get_todays_bet(
    State(state): State<AppState>,
    Path(market): Path<String>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<BetResponse>, ApiError> {
    let kind = parse_kind(&market)?;
    let bet = state
        .actions
        .get_todays_bet(&query.wallet_address, kind)
        .await
        .map_err(action_error)?;
    Ok(Json(BetResponse { bet }))
}

/// All bets for a market on a given date
pub async fn get_bets_for_date(
    State(state): State<AppState>,
    Path((market, date)): Path<(String, String)>,
) -> Result<Json<BetsResponse>, ApiError> {
    let kind = parse_kind(&market)?;
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid date: {}", date),
            }),
        )
    })?;

    let bets = state
        .actions
        .get_bets_for_date(kind, date)
        .await
        .map_err(action_error)?;
    let total = bets.len();

    Ok(Json(BetsResponse { bets, total }))
}
