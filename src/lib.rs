//! Airdrop campaign registry: persistent eligibility and claim bookkeeping,
//! served over HTTP and a local CLI.

pub mod airdrop;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod routes;
pub mod version;

pub use airdrop::{AirdropRegistry, RegistryError, RegistryResult};
