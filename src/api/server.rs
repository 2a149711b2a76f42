//! Axum server setup and configuration

use crate::actions::Actions;
use crate::api::routes;
use crate::db::Database;
use crate::markets::MarketRegistry;
use crate::oracle::PriceOracle;
use crate::Config;
use anyhow::Result;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub actions: Actions,
    pub config: Arc<Config>,
    /// Unset when no ORACLE_URL is configured
    pub oracle: Option<PriceOracle>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let registry = Arc::new(MarketRegistry::standard());
        let db = Arc::new(Database::new(&config.database_path, &registry).await?);
        let actions = Actions::new(db, registry);

        let oracle = config.oracle_url.as_ref().map(|url| {
            PriceOracle::new(
                url.clone(),
                Duration::from_secs(config.oracle_timeout_seconds),
            )
        });

        Ok(Self {
            actions,
            config: Arc::new(config),
            oracle,
        })
    }
}

/// Create the Axum application with all routes
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // API routes
    let api_routes = Router::new()
        // Prediction routes
        .route("/predictions", post(routes::predictions::place_prediction))
        .route(
            "/predictions/:market/tomorrow",
            get(routes::predictions::get_tomorrows_bet),
        )
        .route(
            "/predictions/:market/today",
            get(routes::predictions::get_todays_bet),
        )
        .route(
            "/predictions/:market/date/:date",
            get(routes::predictions::get_bets_for_date),
        )
        // Elimination and participation routes
        .route(
            "/elimination/:market",
            get(routes::elimination::get_elimination_status),
        )
        .route("/reentry", post(routes::elimination::process_re_entry))
        .route("/pots/enter", post(routes::elimination::record_pot_entry))
        .route(
            "/participation",
            get(routes::elimination::get_participation_history),
        )
        // Market listing
        .route("/markets", get(routes::markets::list_markets))
        // Referral routes
        .route("/referrals/code", post(routes::referrals::get_referral_code))
        .route("/referrals", post(routes::referrals::record_referral))
        .route("/referrals/count", get(routes::referrals::get_referral_count));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
