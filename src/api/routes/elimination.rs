//! Elimination status, re-entry, and participation endpoints

use super::{action_error, parse_kind, ApiError};
use crate::api::server::AppState;
use crate::types::PotParticipation;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub wallet_address: String,
}

/// Elimination status response
#[derive(Debug, Serialize)]
pub struct EliminationResponse {
    pub eliminated: bool,
}

/// Whether the wallet is blocked from predicting on this market
pub async fn get_elimination_status(
    State(state): State<AppState>,
    Path(market): Path<String>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<EliminationResponse>, ApiError> {
    let kind = parse_kind(&market)?;
    let eliminated = state
        .actions
        .is_eliminated(&query.wallet_address, kind)
        .await
        .map_err(action_error)?;
    Ok(Json(EliminationResponse { eliminated }))
}

/// Request for re-entry and pot-entry calls
#[derive(Debug, Deserialize)]
pub struct ParticipationRequest {
    pub wallet_address: String,
    pub market: String,
}

/// Re-entry response
#[derive(Debug, Serialize)]
pub struct ReEntryResponse {
    /// True iff an elimination row existed and was removed
    pub removed: bool,
}

/// Clear the caller's elimination after the re-entry fee was paid on-chain.
/// A no-op when nothing was eliminated.
pub async fn process_re_entry(
    State(state): State<AppState>,
    Json(req): Json<ParticipationRequest>,
) -> Result<Json<ReEntryResponse>, ApiError> {
    let kind = parse_kind(&req.market)?;
    let result = state
        .actions
        .process_re_entry(&req.wallet_address, kind)
        .await
        .map_err(action_error)?;
    Ok(Json(ReEntryResponse { removed: result.removed }))
}

/// Pot entry response
#[derive(Debug, Serialize)]
pub struct PotEntryResponse {
    pub recorded: bool,
}

/// Log a wallet's entry into a pot. Best-effort by design: a failed log
/// write still returns 200 with `recorded: false`.
pub async fn record_pot_entry(
    State(state): State<AppState>,
    Json(req): Json<ParticipationRequest>,
) -> Result<Json<PotEntryResponse>, ApiError> {
    let kind = parse_kind(&req.market)?;
    let outcome = state
        .actions
        .record_pot_entry(&req.wallet_address, kind)
        .await
        .map_err(action_error)?;
    Ok(Json(PotEntryResponse {
        recorded: outcome.is_recorded(),
    }))
}

/// Participation history response
#[derive(Debug, Serialize)]
pub struct ParticipationHistoryResponse {
    pub entries: Vec<PotParticipation>,
    pub total: usize,
}

/// Participation rows for a wallet, newest first
pub async fn get_participation_history(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<ParticipationHistoryResponse>, ApiError> {
    let entries = state
        .actions
        .participation_history(&query.wallet_address)
        .await
        .map_err(action_error)?;
    let total = entries.len();
    Ok(Json(ParticipationHistoryResponse { entries, total }))
}
