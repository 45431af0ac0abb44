//! Admin routes for airdrop campaigns
//!
//! Create, fill eligibility, toggle, cancel and sweep. Every handler checks
//! `AdminAuth` before touching the registry.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::airdrop::EligibilityView;
use super::error_response;
use crate::airdrop::{parse_merkle_root, CampaignParams, RegistryResult};
use crate::app_state::AppState;
use crate::auth::AdminCheck;

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub token_address: String,
    pub total_amount: u128,
    pub start_time: u64,
    pub end_time: u64,
    #[serde(default)]
    pub merkle_root: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EligibilityRequest {
    pub users: Vec<String>,
    pub amounts: Vec<u128>,
}

#[derive(Debug, Serialize)]
pub struct EligibilityList {
    pub ok: bool,
    pub campaign_id: u64,
    pub entries: Vec<EligibilityView>,
}

#[derive(Debug, Serialize)]
pub struct WithdrawResponse {
    pub ok: bool,
    pub campaign_id: u64,
    pub amount: u128,
}

/// Returns the authorized admin, or the response to send back.
fn require_admin(state: &AppState, headers: &HeaderMap, action: &str) -> Result<String, Response> {
    match state.auth.check(headers) {
        AdminCheck::Authorized(who) => {
            info!("[AIRDROP ADMIN] {} authorized for {}", who, action);
            Ok(who)
        }
        AdminCheck::Missing => {
            warn!("[AIRDROP ADMIN] No admin token for {}", action);
            Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "ok": false,
                    "code": "unauthorized",
                    "error": "Unauthorized: admin token required"
                })),
            )
                .into_response())
        }
        AdminCheck::Forbidden(who) => {
            warn!("[AIRDROP ADMIN] Unauthorized {} attempt by: {}", action, who);
            Err((
                StatusCode::FORBIDDEN,
                Json(json!({
                    "ok": false,
                    "code": "forbidden",
                    "error": "Forbidden: invalid admin token or address"
                })),
            )
                .into_response())
        }
    }
}

fn ok_or_error<T: Serialize>(res: RegistryResult<T>) -> Response {
    match res {
        Ok(body) => Json(body).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /admin/airdrops
pub async fn create_campaign(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<CreateCampaignRequest>,
) -> Response {
    if let Err(resp) = require_admin(&state, &headers, "create") {
        return resp;
    }

    let merkle_root = match req.merkle_root.as_deref() {
        Some(s) if !s.trim().is_empty() => match parse_merkle_root(s) {
            Ok(root) => Some(root),
            Err(e) => return error_response(&e),
        },
        _ => None,
    };
    let params = CampaignParams {
        token_address: req.token_address,
        total_amount: req.total_amount,
        start_time: req.start_time,
        end_time: req.end_time,
        merkle_root,
    };

    match state.registry.create_campaign_with(params) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({ "ok": true, "campaign_id": id })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /admin/airdrops/:id/eligibility
pub async fn set_eligibility(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<EligibilityRequest>,
) -> Response {
    if let Err(resp) = require_admin(&state, &headers, "set_eligibility") {
        return resp;
    }
    ok_or_error(
        state
            .registry
            .set_eligibility(id, &req.users, &req.amounts)
            .map(|_| json!({ "ok": true, "campaign_id": id, "users": req.users.len() })),
    )
}

/// GET /admin/airdrops/:id/eligibility
pub async fn list_eligibility(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Response {
    if let Err(resp) = require_admin(&state, &headers, "list_eligibility") {
        return resp;
    }
    ok_or_error(state.registry.eligible_users(id).map(|entries| EligibilityList {
        ok: true,
        campaign_id: id,
        entries: entries
            .into_iter()
            .map(|(user, entry)| EligibilityView::new(id, user, entry))
            .collect(),
    }))
}

/// POST /admin/airdrops/:id/activate
pub async fn activate(headers: HeaderMap, State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    if let Err(resp) = require_admin(&state, &headers, "activate") {
        return resp;
    }
    ok_or_error(state.registry.activate(id).map(|_| json!({ "ok": true, "campaign_id": id })))
}

/// POST /admin/airdrops/:id/deactivate
pub async fn deactivate(headers: HeaderMap, State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    if let Err(resp) = require_admin(&state, &headers, "deactivate") {
        return resp;
    }
    ok_or_error(state.registry.deactivate(id).map(|_| json!({ "ok": true, "campaign_id": id })))
}

/// POST /admin/airdrops/:id/cancel
pub async fn cancel(headers: HeaderMap, State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    if let Err(resp) = require_admin(&state, &headers, "cancel") {
        return resp;
    }
    ok_or_error(state.registry.cancel(id).map(|_| json!({ "ok": true, "campaign_id": id })))
}

/// POST /admin/airdrops/:id/withdraw
///
/// Returns the swept amount. Moving the tokens is up to the caller.
pub async fn withdraw(headers: HeaderMap, State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    if let Err(resp) = require_admin(&state, &headers, "withdraw") {
        return resp;
    }
    ok_or_error(
        state
            .registry
            .withdraw_unclaimed(id, state.now())
            .map(|amount| WithdrawResponse {
                ok: true,
                campaign_id: id,
                amount,
            }),
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/airdrops", post(create_campaign))
        .route(
            "/admin/airdrops/:id/eligibility",
            post(set_eligibility).get(list_eligibility),
        )
        .route("/admin/airdrops/:id/activate", post(activate))
        .route("/admin/airdrops/:id/deactivate", post(deactivate))
        .route("/admin/airdrops/:id/cancel", post(cancel))
        .route("/admin/airdrops/:id/withdraw", post(withdraw))
        .with_state(state)
}
