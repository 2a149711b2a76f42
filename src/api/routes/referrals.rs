//! Referral endpoints

use super::{action_error, ApiError, ErrorResponse};
use crate::actions::referrals::ReferralOutcome;
use crate::api::server::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub wallet_address: String,
}

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub wallet_address: String,
}

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub code: String,
}

/// Get or create the caller's referral code
pub async fn get_referral_code(
    State(state): State<AppState>,
    Json(req): Json<CodeRequest>,
) -> Result<Json<CodeResponse>, ApiError> {
    let code = state
        .actions
        .referral_code_for(&req.wallet_address)
        .await
        .map_err(action_error)?;
    Ok(Json(CodeResponse { code }))
}

#[derive(Debug, Deserialize)]
pub struct RecordReferralRequest {
    pub code: String,
    pub wallet_address: String,
}

#[derive(Debug, Serialize)]
pub struct RecordReferralResponse {
    pub recorded: bool,
}

/// Record a referral from a code to a new wallet
pub async fn record_referral(
    State(state): State<AppState>,
    Json(req): Json<RecordReferralRequest>,
) -> Result<Json<RecordReferralResponse>, ApiError> {
    let outcome = state
        .actions
        .record_referral(&req.code, &req.wallet_address)
        .await
        .map_err(action_error)?;

    match outcome {
        ReferralOutcome::Recorded => Ok(Json(RecordReferralResponse { recorded: true })),
        ReferralOutcome::UnknownCode => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Referral code not found".to_string(),
            }),
        )),
        ReferralOutcome::SelfReferral => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "You cannot refer yourself".to_string(),
            }),
        )),
        ReferralOutcome::AlreadyReferred => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "This wallet was already referred".to_string(),
            }),
        )),
    }
}

#[derive(Debug, Serialize)]
pub struct ReferralCountResponse {
    pub count: i64,
}

/// Number of confirmed referrals for a wallet
pub async fn get_referral_count(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<ReferralCountResponse>, ApiError> {
    let count = state
        .actions
        .referral_count(&query.wallet_address)
        .await
        .map_err(action_error)?;
    Ok(Json(ReferralCountResponse { count }))
}
