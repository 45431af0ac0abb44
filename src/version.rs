use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::airdrop::unix_now;

#[derive(Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub storage_trees: [&'static str; 4],
    pub ts: u64,
}

async fn get_version() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        storage_trees: [
            crate::airdrop::store::CAMPAIGNS_TREE,
            crate::airdrop::store::ELIGIBILITY_TREE,
            crate::airdrop::store::META_TREE,
            crate::airdrop::store::EVENTS_TREE,
        ],
        ts: unix_now(),
    })
}

pub fn router() -> Router {
    Router::new().route("/version", get(get_version))
}
