//! Route handlers for the prediction API

pub mod elimination;
pub mod markets;
pub mod predictions;
pub mod referrals;

use crate::actions::ActionError;
use crate::markets::MarketKind;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::error;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a workflow error to an HTTP response. Internal failures are logged
/// server-side and rendered generically.
pub fn action_error(err: ActionError) -> ApiError {
    let status = match &err {
        ActionError::Eliminated => StatusCode::CONFLICT,
        ActionError::UnknownMarket(_) => StatusCode::NOT_FOUND,
        ActionError::Database(e) => {
            error!("Database error: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse { error: err.user_message() }))
}

/// Parse a market kind from a path segment
pub fn parse_kind(kind: &str) -> Result<MarketKind, ApiError> {
    MarketKind::parse(kind).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Unknown market type: {}", kind),
            }),
        )
    })
}
