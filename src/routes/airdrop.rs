//! Public airdrop routes: campaign views, user status and claims.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::error_response;
use crate::airdrop::{
    normalize_address, Campaign, CampaignPhase, EligibilityEntry, RegistryError, RegistryEvent,
    UserAirdrop,
};
use crate::app_state::AppState;

/// Campaign as shown to the display layer
#[derive(Debug, Serialize)]
pub struct CampaignView {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub phase: CampaignPhase,
    pub remaining: u128,
}

impl CampaignView {
    pub fn new(campaign: Campaign, now: u64) -> Self {
        Self {
            phase: campaign.phase(now),
            remaining: campaign.remaining(),
            campaign,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CampaignList {
    pub ok: bool,
    pub campaigns: Vec<CampaignView>,
}

#[derive(Debug, Serialize)]
pub struct EventList {
    pub ok: bool,
    pub events: Vec<RegistryEvent>,
}

#[derive(Debug, Serialize)]
pub struct UserAirdropList {
    pub ok: bool,
    pub airdrops: Vec<UserAirdrop>,
}

/// One user's eligibility in one campaign
#[derive(Debug, Serialize)]
pub struct EligibilityView {
    pub campaign_id: u64,
    pub user: String,
    pub amount: u128,
    pub claimed: bool,
    pub claimed_at: Option<u64>,
}

impl EligibilityView {
    pub fn new(campaign_id: u64, user: String, entry: EligibilityEntry) -> Self {
        Self {
            campaign_id,
            user,
            amount: entry.amount,
            claimed: entry.claimed,
            claimed_at: entry.claimed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchClaimRequest {
    pub user: String,
    pub campaign_ids: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub ok: bool,
    pub campaign_id: u64,
    pub user: String,
    pub amount: u128,
}

#[derive(Debug, Serialize)]
pub struct BatchClaimItem {
    pub campaign_id: u64,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchClaimResponse {
    pub ok: bool,
    pub claimed: usize,
    pub failed: usize,
    pub results: Vec<BatchClaimItem>,
}

/// GET /airdrops
pub async fn list_campaigns(State(state): State<AppState>) -> Response {
    let now = state.now();
    match state.registry.campaigns() {
        Ok(list) => Json(CampaignList {
            ok: true,
            campaigns: list.into_iter().map(|c| CampaignView::new(c, now)).collect(),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /airdrops/:id
pub async fn get_campaign(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.registry.campaign(id) {
        Ok(Some(c)) => Json(CampaignView::new(c, state.now())).into_response(),
        Ok(None) => error_response(&RegistryError::NotFound(id)),
        Err(e) => error_response(&e),
    }
}

/// GET /airdrops/:id/events
pub async fn get_events(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.registry.events(id) {
        Ok(events) => Json(EventList { ok: true, events }).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /airdrops/:id/eligibility/:user
pub async fn get_eligibility(
    State(state): State<AppState>,
    Path((id, user)): Path<(u64, String)>,
) -> Response {
    if let Err(e) = state.registry.campaign(id).and_then(|c| c.ok_or(RegistryError::NotFound(id))) {
        return error_response(&e);
    }
    let user = match normalize_address(&user) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };
    match state.registry.eligibility(id, &user) {
        Ok(Some(entry)) => Json(EligibilityView::new(id, user, entry)).into_response(),
        Ok(None) => error_response(&RegistryError::NotEligible {
            campaign_id: id,
            user,
        }),
        Err(e) => error_response(&e),
    }
}

/// GET /users/:user/airdrops
pub async fn get_user_airdrops(State(state): State<AppState>, Path(user): Path<String>) -> Response {
    match state.registry.user_airdrops(&user, state.now()) {
        Ok(airdrops) => Json(UserAirdropList { ok: true, airdrops }).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /airdrops/:id/claim
pub async fn claim(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ClaimRequest>,
) -> Response {
    match state.registry.claim(id, &req.user, state.now()) {
        Ok(amount) => Json(ClaimResponse {
            ok: true,
            campaign_id: id,
            user: req.user,
            amount,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /airdrops/claim
///
/// Always 200 unless the body is malformed; each id reports its own outcome.
pub async fn batch_claim(
    State(state): State<AppState>,
    Json(req): Json<BatchClaimRequest>,
) -> Response {
    let outcomes = state
        .registry
        .batch_claim(&req.campaign_ids, &req.user, state.now());

    let results: Vec<BatchClaimItem> = outcomes
        .into_iter()
        .map(|o| match o.result {
            Ok(amount) => BatchClaimItem {
                campaign_id: o.campaign_id,
                ok: true,
                amount: Some(amount),
                code: None,
                error: None,
            },
            Err(e) => BatchClaimItem {
                campaign_id: o.campaign_id,
                ok: false,
                amount: None,
                code: Some(e.kind()),
                error: Some(e.to_string()),
            },
        })
        .collect();

    let claimed = results.iter().filter(|r| r.ok).count();
    Json(BatchClaimResponse {
        ok: claimed > 0,
        claimed,
        failed: results.len() - claimed,
        results,
    })
    .into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/airdrops", get(list_campaigns))
        .route("/airdrops/claim", post(batch_claim))
        .route("/airdrops/:id", get(get_campaign))
        .route("/airdrops/:id/events", get(get_events))
        .route("/airdrops/:id/eligibility/:user", get(get_eligibility))
        .route("/airdrops/:id/claim", post(claim))
        .route("/users/:user/airdrops", get(get_user_airdrops))
        .with_state(state)
}
