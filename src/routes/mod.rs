//! HTTP surface for the registry
//!
//! Read routes and claims are public; everything under `/admin` goes through
//! `AdminAuth` first.

pub mod admin_airdrop;
pub mod airdrop;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use crate::airdrop::RegistryError;
use crate::app_state::AppState;

/// HTTP status for a registry error
pub fn status_for(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::NotEligible { .. } => StatusCode::FORBIDDEN,
        RegistryError::CampaignCancelled(_)
        | RegistryError::NotActive(_)
        | RegistryError::NotStarted { .. }
        | RegistryError::Ended { .. }
        | RegistryError::AlreadyClaimed { .. }
        | RegistryError::InsufficientFunds { .. }
        | RegistryError::NotEnded(_)
        | RegistryError::AlreadySwept(_) => StatusCode::CONFLICT,
        RegistryError::Storage(_) | RegistryError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Canonical error body: `{ ok: false, code, error }`
pub fn error_response(err: &RegistryError) -> Response {
    (
        status_for(err),
        Json(json!({
            "ok": false,
            "code": err.kind(),
            "error": err.to_string(),
        })),
    )
        .into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// Full application router
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(crate::version::router())
        .merge(airdrop::router(state.clone()))
        .merge(admin_airdrop::router(state))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(cors)
}
