//! Campaign and eligibility records
//!
//! These are the persisted shapes. All amounts are u128 in the reward token's
//! smallest unit, all times are unix seconds.

use serde::{Deserialize, Serialize};

use super::error::{RegistryError, RegistryResult};

/// One airdrop instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u64,
    /// Reward token reference; the registry never moves tokens itself.
    pub token_address: String,
    pub total_amount: u128,
    pub claimed_amount: u128,
    pub start_time: u64,
    pub end_time: u64,
    pub is_active: bool,
    pub is_cancelled: bool,
    /// Set once the unclaimed remainder has been withdrawn.
    pub is_swept: bool,
    /// Stored for reference only. Eligibility always comes from the explicit list.
    #[serde(with = "merkle_root_hex")]
    pub merkle_root: Option<[u8; 32]>,
    pub created_at: u64,
    /// Number of successful claims
    pub claimants: u64,
}

/// Parameters for creating a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignParams {
    pub token_address: String,
    pub total_amount: u128,
    pub start_time: u64,
    pub end_time: u64,
    #[serde(default, with = "merkle_root_hex")]
    pub merkle_root: Option<[u8; 32]>,
}

impl CampaignParams {
    pub fn new(token_address: &str, total_amount: u128, start_time: u64, end_time: u64) -> Self {
        Self {
            token_address: token_address.to_string(),
            total_amount,
            start_time,
            end_time,
            merkle_root: None,
        }
    }

    pub fn validate(&self) -> RegistryResult<()> {
        if self.token_address.trim().is_empty() {
            return Err(RegistryError::invalid("token address is empty"));
        }
        if self.total_amount == 0 {
            return Err(RegistryError::invalid("total amount must be greater than zero"));
        }
        if self.start_time >= self.end_time {
            return Err(RegistryError::invalid(format!(
                "start time {} must be before end time {}",
                self.start_time, self.end_time
            )));
        }
        Ok(())
    }
}

/// Display status derived from flags and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignPhase {
    Cancelled,
    Swept,
    Inactive,
    Upcoming,
    Live,
    Ended,
}

impl CampaignPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignPhase::Cancelled => "cancelled",
            CampaignPhase::Swept => "swept",
            CampaignPhase::Inactive => "inactive",
            CampaignPhase::Upcoming => "upcoming",
            CampaignPhase::Live => "live",
            CampaignPhase::Ended => "ended",
        }
    }
}

impl Campaign {
    pub(crate) fn from_params(id: u64, params: CampaignParams, created_at: u64) -> Self {
        Self {
            id,
            token_address: params.token_address.trim().to_string(),
            total_amount: params.total_amount,
            claimed_amount: 0,
            start_time: params.start_time,
            end_time: params.end_time,
            is_active: false,
            is_cancelled: false,
            is_swept: false,
            merkle_root: params.merkle_root,
            created_at,
            claimants: 0,
        }
    }

    pub fn remaining(&self) -> u128 {
        self.total_amount.saturating_sub(self.claimed_amount)
    }

    pub fn phase(&self, now: u64) -> CampaignPhase {
        if self.is_cancelled {
            CampaignPhase::Cancelled
        } else if self.is_swept {
            CampaignPhase::Swept
        } else if now > self.end_time {
            CampaignPhase::Ended
        } else if !self.is_active {
            CampaignPhase::Inactive
        } else if now < self.start_time {
            CampaignPhase::Upcoming
        } else {
            CampaignPhase::Live
        }
    }

    /// Campaign-level claim gate: checks 2 to 5 of the claim order.
    pub(crate) fn ensure_claimable(&self, now: u64) -> RegistryResult<()> {
        if self.is_cancelled {
            return Err(RegistryError::CampaignCancelled(self.id));
        }
        if !self.is_active {
            return Err(RegistryError::NotActive(self.id));
        }
        if now < self.start_time {
            return Err(RegistryError::NotStarted {
                start_time: self.start_time,
                now,
            });
        }
        if now > self.end_time {
            return Err(RegistryError::Ended {
                end_time: self.end_time,
                now,
            });
        }
        Ok(())
    }

    pub(crate) fn ensure_not_cancelled(&self) -> RegistryResult<()> {
        if self.is_cancelled {
            Err(RegistryError::CampaignCancelled(self.id))
        } else {
            Ok(())
        }
    }
}

/// How much a user may claim from one campaign, and whether they have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityEntry {
    pub amount: u128,
    pub claimed: bool,
    pub claimed_at: Option<u64>,
}

impl EligibilityEntry {
    pub fn new(amount: u128) -> Self {
        Self {
            amount,
            claimed: false,
            claimed_at: None,
        }
    }
}

/// A user's view of one campaign they appear in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAirdrop {
    pub campaign_id: u64,
    pub token_address: String,
    pub amount: u128,
    pub claimed: bool,
    pub claimable: bool,
    pub phase: CampaignPhase,
    pub start_time: u64,
    pub end_time: u64,
}

/// Result of one claim inside a batch.
#[derive(Debug)]
pub struct ClaimOutcome {
    pub campaign_id: u64,
    pub result: RegistryResult<u128>,
}

impl ClaimOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Normalize a user or admin address into the key form used by storage.
pub fn normalize_address(address: &str) -> RegistryResult<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::invalid("address is empty"));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Parse a 32-byte hex commitment, with or without a 0x prefix.
pub fn parse_merkle_root(s: &str) -> RegistryResult<[u8; 32]> {
    let raw = s.trim().trim_start_matches("0x");
    let bytes = hex::decode(raw)
        .map_err(|e| RegistryError::invalid(format!("merkle root is not hex: {}", e)))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| RegistryError::invalid(format!("merkle root must be 32 bytes, got {}", bytes.len())))
}

mod merkle_root_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(root: &Option<[u8; 32]>, s: S) -> Result<S::Ok, S::Error> {
        match root {
            Some(bytes) => s.serialize_some(&hex::encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<[u8; 32]>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            Some(s) => super::parse_merkle_root(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign() -> Campaign {
        Campaign::from_params(1, CampaignParams::new("0xToken", 1000, 100, 200), 50)
    }

    #[test]
    fn test_params_validation() {
        assert!(CampaignParams::new("0xToken", 1000, 100, 200).validate().is_ok());
        assert!(matches!(
            CampaignParams::new("0xToken", 0, 100, 200).validate(),
            Err(RegistryError::InvalidInput(_))
        ));
        assert!(matches!(
            CampaignParams::new("0xToken", 10, 200, 200).validate(),
            Err(RegistryError::InvalidInput(_))
        ));
        assert!(matches!(
            CampaignParams::new("  ", 10, 100, 200).validate(),
            Err(RegistryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_phase() {
        let mut c = campaign();
        assert_eq!(c.phase(150), CampaignPhase::Inactive);
        c.is_active = true;
        assert_eq!(c.phase(99), CampaignPhase::Upcoming);
        assert_eq!(c.phase(100), CampaignPhase::Live);
        assert_eq!(c.phase(200), CampaignPhase::Live);
        assert_eq!(c.phase(201), CampaignPhase::Ended);
        c.is_cancelled = true;
        assert_eq!(c.phase(150), CampaignPhase::Cancelled);
    }

    #[test]
    fn test_claim_gate_order() {
        let mut c = campaign();
        c.is_cancelled = true;
        // cancelled wins over inactive
        assert!(matches!(c.ensure_claimable(150), Err(RegistryError::CampaignCancelled(1))));
        c.is_cancelled = false;
        assert!(matches!(c.ensure_claimable(150), Err(RegistryError::NotActive(1))));
        c.is_active = true;
        assert!(matches!(c.ensure_claimable(99), Err(RegistryError::NotStarted { .. })));
        assert!(matches!(c.ensure_claimable(201), Err(RegistryError::Ended { .. })));
        assert!(c.ensure_claimable(100).is_ok());
        assert!(c.ensure_claimable(200).is_ok());
    }

    #[test]
    fn test_normalize_and_merkle_root() {
        assert_eq!(normalize_address("  0xAbC ").unwrap(), "0xabc");
        assert!(normalize_address("   ").is_err());

        let root = parse_merkle_root(&format!("0x{}", "ab".repeat(32))).unwrap();
        assert_eq!(root, [0xab; 32]);
        assert!(parse_merkle_root("abcd").is_err());
        assert!(parse_merkle_root("zz").is_err());
    }

    #[test]
    fn test_merkle_root_json_and_bincode() {
        let mut c = campaign();
        c.merkle_root = Some([7u8; 32]);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["merkle_root"], serde_json::json!("07".repeat(32)));

        let bytes = bincode::serialize(&c).unwrap();
        let back: Campaign = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, c);
    }
}
