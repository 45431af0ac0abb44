//! Airdrop campaign registry
//!
//! Campaign creation, eligibility lists, activation windows, claims and the
//! sweep of unclaimed balances. Token movement itself happens elsewhere.

pub mod campaign;
pub mod error;
pub mod events;
pub mod registry;
pub mod store;

pub use campaign::{
    normalize_address, parse_merkle_root, Campaign, CampaignParams, CampaignPhase, ClaimOutcome,
    EligibilityEntry, UserAirdrop,
};
pub use error::{RegistryError, RegistryResult};
pub use events::{RegistryEvent, RegistryEventKind};
pub use registry::{unix_now, AirdropRegistry};
