//! Registry error kinds
//!
//! Every precondition failure surfaces as its own variant. Nothing here is
//! retried by the registry; callers decide what to show the user.

use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("campaign {0} not found")]
    NotFound(u64),

    #[error("campaign {0} is cancelled")]
    CampaignCancelled(u64),

    #[error("campaign {0} is not active")]
    NotActive(u64),

    #[error("campaign has not started (starts at {start_time}, now {now})")]
    NotStarted { start_time: u64, now: u64 },

    #[error("campaign has ended (ended at {end_time}, now {now})")]
    Ended { end_time: u64, now: u64 },

    #[error("{user} is not eligible for campaign {campaign_id}")]
    NotEligible { campaign_id: u64, user: String },

    #[error("{user} already claimed from campaign {campaign_id}")]
    AlreadyClaimed { campaign_id: u64, user: String },

    #[error("claim of {requested} exceeds remaining campaign balance {remaining}")]
    InsufficientFunds { requested: u128, remaining: u128 },

    #[error("campaign {0} has not ended yet")]
    NotEnded(u64),

    #[error("unclaimed balance of campaign {0} was already withdrawn")]
    AlreadySwept(u64),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
}

impl RegistryError {
    /// Stable machine-readable code, used in HTTP bodies and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::InvalidInput(_) => "invalid_input",
            RegistryError::NotFound(_) => "not_found",
            RegistryError::CampaignCancelled(_) => "campaign_cancelled",
            RegistryError::NotActive(_) => "not_active",
            RegistryError::NotStarted { .. } => "not_started",
            RegistryError::Ended { .. } => "ended",
            RegistryError::NotEligible { .. } => "not_eligible",
            RegistryError::AlreadyClaimed { .. } => "already_claimed",
            RegistryError::InsufficientFunds { .. } => "insufficient_funds",
            RegistryError::NotEnded(_) => "not_ended",
            RegistryError::AlreadySwept(_) => "already_swept",
            RegistryError::Storage(_) => "storage",
            RegistryError::Codec(_) => "codec",
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        RegistryError::InvalidInput(msg.into())
    }
}
