//! Append-only audit log of registry mutations
//!
//! Each event is written inside the same storage transaction as the state
//! change it describes, so the log never disagrees with campaign state.
//! Records are bincode encoded, which rules out internally tagged enums here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryEventKind {
    Created {
        token_address: String,
        total_amount: u128,
        start_time: u64,
        end_time: u64,
    },
    EligibilitySet {
        users: u64,
        total_amount: u128,
    },
    Activated,
    Deactivated,
    Cancelled,
    Claimed {
        user: String,
        amount: u128,
    },
    Withdrawn {
        amount: u128,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEvent {
    pub campaign_id: u64,
    pub seq: u64,
    pub at: u64,
    pub kind: RegistryEventKind,
}

impl RegistryEventKind {
    pub fn label(&self) -> &'static str {
        match self {
            RegistryEventKind::Created { .. } => "created",
            RegistryEventKind::EligibilitySet { .. } => "eligibility_set",
            RegistryEventKind::Activated => "activated",
            RegistryEventKind::Deactivated => "deactivated",
            RegistryEventKind::Cancelled => "cancelled",
            RegistryEventKind::Claimed { .. } => "claimed",
            RegistryEventKind::Withdrawn { .. } => "withdrawn",
        }
    }
}
