//! Airdrop Registry
//!
//! Owns every campaign, its eligibility table and claim ledger. One instance is
//! opened per database and shared by `Arc` with whoever needs it (HTTP routes,
//! CLI, tests).
//!
//! Rules:
//! - Mutations on one campaign are serialized by that campaign's lock
//! - Each mutation commits as a single sled transaction (state + event log)
//! - A claimed entry is never un-claimed, not even by re-setting eligibility
//! - Cancellation is terminal; nothing is ever deleted
//! - Authorization is the caller's job; the registry trusts its callers

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use parking_lot::Mutex;
use sled::Db;
use tracing::{debug, info, warn};

use super::campaign::{
    normalize_address, Campaign, CampaignParams, ClaimOutcome, EligibilityEntry, UserAirdrop,
};
use super::error::{RegistryError, RegistryResult};
use super::events::{RegistryEvent, RegistryEventKind};
use super::store::{abort, RegistryStore};

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub struct AirdropRegistry {
    store: RegistryStore,
    /// campaign id -> campaign-level lock
    locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl AirdropRegistry {
    pub fn new(db: Db) -> RegistryResult<Self> {
        Ok(Self {
            store: RegistryStore::open(db)?,
            locks: DashMap::new(),
        })
    }

    /// Open a registry backed by a sled database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> RegistryResult<Self> {
        let db = sled::open(path)?;
        Self::new(db)
    }

    /// Lock for an existing campaign. Unknown ids fail with `NotFound` and
    /// never get an entry in the lock map.
    fn lock_for(&self, id: u64) -> RegistryResult<Arc<Mutex<()>>> {
        if let Some(lock) = self.locks.get(&id) {
            return Ok(lock.clone());
        }
        if self.store.get_campaign(id)?.is_none() {
            return Err(RegistryError::NotFound(id));
        }
        Ok(self.locks.entry(id).or_default().clone())
    }

    // =================== Admin operations ===================

    pub fn create_campaign(
        &self,
        token_address: &str,
        total_amount: u128,
        start_time: u64,
        end_time: u64,
    ) -> RegistryResult<u64> {
        self.create_campaign_with(CampaignParams::new(
            token_address,
            total_amount,
            start_time,
            end_time,
        ))
    }

    pub fn create_campaign_with(&self, params: CampaignParams) -> RegistryResult<u64> {
        params.validate()?;
        let created_at = unix_now();

        let campaign = self.store.transact(|tx| {
            let id = tx.next_campaign_id()?;
            let campaign = Campaign::from_params(id, params.clone(), created_at);
            tx.put_campaign(&campaign)?;
            tx.push_event(
                id,
                created_at,
                RegistryEventKind::Created {
                    token_address: campaign.token_address.clone(),
                    total_amount: campaign.total_amount,
                    start_time: campaign.start_time,
                    end_time: campaign.end_time,
                },
            )?;
            Ok(campaign)
        })?;

        info!(
            campaign_id = campaign.id,
            token = %campaign.token_address,
            total = %campaign.total_amount,
            "[AIRDROP] Created campaign window {}..{}",
            campaign.start_time,
            campaign.end_time
        );
        Ok(campaign.id)
    }

    /// Insert or overwrite eligibility entries.
    ///
    /// Existing entries keep their `claimed` flag; only the amount changes.
    /// An empty batch is a no-op once the campaign checks pass.
    pub fn set_eligibility<S: AsRef<str>>(
        &self,
        campaign_id: u64,
        users: &[S],
        amounts: &[u128],
    ) -> RegistryResult<()> {
        if users.len() != amounts.len() {
            return Err(RegistryError::invalid(format!(
                "{} users but {} amounts",
                users.len(),
                amounts.len()
            )));
        }

        let lock = self.lock_for(campaign_id)?;
        let _guard = lock.lock();

        // campaign state is stable while the lock is held
        let campaign = self
            .store
            .get_campaign(campaign_id)?
            .ok_or(RegistryError::NotFound(campaign_id))?;
        campaign.ensure_not_cancelled()?;
        if campaign.is_swept {
            return Err(RegistryError::AlreadySwept(campaign_id));
        }
        if users.is_empty() {
            debug!(campaign_id, "[AIRDROP] Empty eligibility batch (no-op)");
            return Ok(());
        }

        let mut batch = Vec::with_capacity(users.len());
        let mut batch_total: u128 = 0;
        for (user, &amount) in users.iter().zip(amounts) {
            let user = normalize_address(user.as_ref())?;
            if amount == 0 {
                return Err(RegistryError::invalid(format!("zero amount for {}", user)));
            }
            batch_total = batch_total
                .checked_add(amount)
                .ok_or_else(|| RegistryError::invalid("eligibility total overflows"))?;
            batch.push((user, amount));
        }

        let at = unix_now();
        let reclaimed = self.store.transact(|tx| {
            tx.campaign(campaign_id)?;

            let mut already_claimed = 0u64;
            for (user, amount) in &batch {
                let entry = match tx.get_entry(campaign_id, user)? {
                    Some(mut existing) => {
                        if existing.claimed {
                            already_claimed += 1;
                        }
                        existing.amount = *amount;
                        existing
                    }
                    None => EligibilityEntry::new(*amount),
                };
                tx.put_entry(campaign_id, user, &entry)?;
            }

            tx.push_event(
                campaign_id,
                at,
                RegistryEventKind::EligibilitySet {
                    users: batch.len() as u64,
                    total_amount: batch_total,
                },
            )?;
            Ok(already_claimed)
        })?;

        if reclaimed > 0 {
            warn!(
                campaign_id,
                "[AIRDROP] {} eligibility updates touched already-claimed users; claim flags kept",
                reclaimed
            );
        }
        info!(
            campaign_id,
            users = batch.len(),
            total = %batch_total,
            "[AIRDROP] Eligibility list set"
        );
        Ok(())
    }

    pub fn activate(&self, campaign_id: u64) -> RegistryResult<()> {
        self.set_active(campaign_id, true)
    }

    pub fn deactivate(&self, campaign_id: u64) -> RegistryResult<()> {
        self.set_active(campaign_id, false)
    }

    fn set_active(&self, campaign_id: u64, active: bool) -> RegistryResult<()> {
        let lock = self.lock_for(campaign_id)?;
        let _guard = lock.lock();
        let at = unix_now();

        let changed = self.store.transact(|tx| {
            let mut campaign = tx.campaign(campaign_id)?;
            if let Err(e) = campaign.ensure_not_cancelled() {
                return abort(e);
            }
            if campaign.is_active == active {
                return Ok(false);
            }
            if active && campaign.is_swept {
                return abort(RegistryError::AlreadySwept(campaign_id));
            }
            campaign.is_active = active;
            tx.put_campaign(&campaign)?;
            let kind = if active {
                RegistryEventKind::Activated
            } else {
                RegistryEventKind::Deactivated
            };
            tx.push_event(campaign_id, at, kind)?;
            Ok(true)
        })?;

        if changed {
            info!(campaign_id, active, "[AIRDROP] Campaign activity changed");
        } else {
            debug!(campaign_id, active, "[AIRDROP] Activity unchanged (no-op)");
        }
        Ok(())
    }

    /// Cancel a campaign. Terminal and idempotent.
    pub fn cancel(&self, campaign_id: u64) -> RegistryResult<()> {
        let lock = self.lock_for(campaign_id)?;
        let _guard = lock.lock();
        let at = unix_now();

        let changed = self.store.transact(|tx| {
            let mut campaign = tx.campaign(campaign_id)?;
            if campaign.is_cancelled {
                return Ok(false);
            }
            campaign.is_cancelled = true;
            campaign.is_active = false;
            tx.put_campaign(&campaign)?;
            tx.push_event(campaign_id, at, RegistryEventKind::Cancelled)?;
            Ok(true)
        })?;

        if changed {
            info!(campaign_id, "[AIRDROP] Campaign cancelled");
        }
        Ok(())
    }

    /// Sweep the unclaimed remainder once the window has closed (or the
    /// campaign was cancelled). Returns the swept amount.
    pub fn withdraw_unclaimed(&self, campaign_id: u64, now: u64) -> RegistryResult<u128> {
        let lock = self.lock_for(campaign_id)?;
        let _guard = lock.lock();

        let amount = self.store.transact(|tx| {
            let mut campaign = tx.campaign(campaign_id)?;
            if campaign.is_swept {
                return abort(RegistryError::AlreadySwept(campaign_id));
            }
            if !campaign.is_cancelled && now <= campaign.end_time {
                return abort(RegistryError::NotEnded(campaign_id));
            }
            let amount = campaign.remaining();
            campaign.is_swept = true;
            campaign.is_active = false;
            tx.put_campaign(&campaign)?;
            tx.push_event(campaign_id, now, RegistryEventKind::Withdrawn { amount })?;
            Ok(amount)
        })?;

        info!(
            campaign_id,
            amount = %amount,
            "[AIRDROP] Unclaimed balance withdrawn"
        );
        Ok(amount)
    }

    // =================== Claims ===================

    /// Claim a user's allocation. Checks run in a fixed order and the first
    /// failure decides the error.
    pub fn claim(&self, campaign_id: u64, user: &str, now: u64) -> RegistryResult<u128> {
        let res = self.claim_locked(campaign_id, user, now);
        match &res {
            Ok(amount) => info!(
                campaign_id,
                user = %user,
                amount = %amount,
                "[AIRDROP] ✓ Claimed"
            ),
            Err(e) => debug!(
                campaign_id,
                user = %user,
                code = e.kind(),
                "[AIRDROP] ✗ Claim rejected: {}",
                e
            ),
        }
        res
    }

    fn claim_locked(&self, campaign_id: u64, user: &str, now: u64) -> RegistryResult<u128> {
        let lock = self.lock_for(campaign_id)?;
        let _guard = lock.lock();

        self.store.transact(|tx| {
            let mut campaign = tx.campaign(campaign_id)?;
            if let Err(e) = campaign.ensure_claimable(now) {
                return abort(e);
            }

            let user = match normalize_address(user) {
                Ok(u) => u,
                Err(e) => return abort(e),
            };

            let mut entry = match tx.get_entry(campaign_id, &user)? {
                Some(entry) => entry,
                None => {
                    return abort(RegistryError::NotEligible {
                        campaign_id,
                        user: user.clone(),
                    })
                }
            };
            if entry.claimed {
                return abort(RegistryError::AlreadyClaimed {
                    campaign_id,
                    user: user.clone(),
                });
            }

            let remaining = campaign.remaining();
            if entry.amount > remaining {
                return abort(RegistryError::InsufficientFunds {
                    requested: entry.amount,
                    remaining,
                });
            }

            entry.claimed = true;
            entry.claimed_at = Some(now);
            campaign.claimed_amount += entry.amount;
            campaign.claimants += 1;

            tx.put_entry(campaign_id, &user, &entry)?;
            tx.put_campaign(&campaign)?;
            tx.push_event(
                campaign_id,
                now,
                RegistryEventKind::Claimed {
                    user: user.clone(),
                    amount: entry.amount,
                },
            )?;
            Ok(entry.amount)
        })
    }

    /// Claim from several campaigns. Each id is independent; a failure never
    /// undoes an earlier success.
    pub fn batch_claim(&self, campaign_ids: &[u64], user: &str, now: u64) -> Vec<ClaimOutcome> {
        let outcomes: Vec<ClaimOutcome> = campaign_ids
            .iter()
            .map(|&campaign_id| ClaimOutcome {
                campaign_id,
                result: self.claim(campaign_id, user, now),
            })
            .collect();

        let ok = outcomes.iter().filter(|o| o.is_ok()).count();
        info!(
            user = %user,
            "[AIRDROP] Batch claim: {} successful, {} failed",
            ok,
            outcomes.len() - ok
        );
        outcomes
    }

    // =================== Views ===================

    pub fn campaign(&self, campaign_id: u64) -> RegistryResult<Option<Campaign>> {
        self.store.get_campaign(campaign_id)
    }

    pub fn campaigns(&self) -> RegistryResult<Vec<Campaign>> {
        self.store.campaigns()
    }

    pub fn eligibility(
        &self,
        campaign_id: u64,
        user: &str,
    ) -> RegistryResult<Option<EligibilityEntry>> {
        let user = normalize_address(user)?;
        self.store.get_entry(campaign_id, &user)
    }

    pub fn eligible_users(&self, campaign_id: u64) -> RegistryResult<Vec<(String, EligibilityEntry)>> {
        if self.store.get_campaign(campaign_id)?.is_none() {
            return Err(RegistryError::NotFound(campaign_id));
        }
        self.store.entries(campaign_id)
    }

    /// Every campaign the user appears in, with what `claim` would do at `now`.
    pub fn user_airdrops(&self, user: &str, now: u64) -> RegistryResult<Vec<UserAirdrop>> {
        let user = normalize_address(user)?;
        let mut out = Vec::new();
        for campaign in self.store.campaigns()? {
            let entry = match self.store.get_entry(campaign.id, &user)? {
                Some(e) => e,
                None => continue,
            };
            let claimable = !entry.claimed
                && campaign.ensure_claimable(now).is_ok()
                && entry.amount <= campaign.remaining();
            out.push(UserAirdrop {
                campaign_id: campaign.id,
                token_address: campaign.token_address.clone(),
                amount: entry.amount,
                claimed: entry.claimed,
                claimable,
                phase: campaign.phase(now),
                start_time: campaign.start_time,
                end_time: campaign.end_time,
            });
        }
        Ok(out)
    }

    pub fn events(&self, campaign_id: u64) -> RegistryResult<Vec<RegistryEvent>> {
        if self.store.get_campaign(campaign_id)?.is_none() {
            return Err(RegistryError::NotFound(campaign_id));
        }
        self.store.events(campaign_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airdrop::campaign::CampaignPhase;

    const T: u64 = 1_700_000_000;
    const DAY: u64 = 86_400;

    fn registry() -> AirdropRegistry {
        let db = sled::Config::new().temporary(true).open().unwrap();
        AirdropRegistry::new(db).unwrap()
    }

    fn live_campaign(reg: &AirdropRegistry, total: u128) -> u64 {
        let id = reg.create_campaign("0xToken", total, T, T + DAY).unwrap();
        reg.activate(id).unwrap();
        id
    }

    #[test]
    fn test_claim_scenario() {
        let reg = registry();
        let id = reg.create_campaign("0xToken", 1000, T, T + DAY).unwrap();
        reg.set_eligibility(id, &["0xUserA"], &[600]).unwrap();
        reg.activate(id).unwrap();

        assert_eq!(reg.claim(id, "0xUserA", T + 1).unwrap(), 600);
        assert_eq!(reg.campaign(id).unwrap().unwrap().claimed_amount, 600);
        assert!(matches!(
            reg.claim(id, "0xUserA", T + 2),
            Err(RegistryError::AlreadyClaimed { .. })
        ));
    }

    #[test]
    fn test_claim_requires_activation() {
        let reg = registry();
        let id = reg.create_campaign("0xToken", 1000, T, T + DAY).unwrap();
        reg.set_eligibility(id, &["0xUserA"], &[600]).unwrap();
        assert!(matches!(reg.claim(id, "0xUserA", T + 1), Err(RegistryError::NotActive(_))));
    }

    #[test]
    fn test_claim_window() {
        let reg = registry();
        let id = live_campaign(&reg, 1000);
        reg.set_eligibility(id, &["0xa"], &[10]).unwrap();

        assert!(matches!(reg.claim(id, "0xa", T - 1), Err(RegistryError::NotStarted { .. })));
        assert!(matches!(reg.claim(id, "0xa", T + DAY + 1), Err(RegistryError::Ended { .. })));
        // both window edges are inclusive
        assert_eq!(reg.claim(id, "0xa", T + DAY).unwrap(), 10);
    }

    #[test]
    fn test_claim_error_order() {
        let reg = registry();
        assert!(matches!(reg.claim(42, "0xa", T), Err(RegistryError::NotFound(42))));

        let id = live_campaign(&reg, 1000);
        // not eligible is only reported once the window checks pass
        assert!(matches!(reg.claim(id, "0xa", T - 1), Err(RegistryError::NotStarted { .. })));
        assert!(matches!(reg.claim(id, "0xa", T), Err(RegistryError::NotEligible { .. })));
    }

    #[test]
    fn test_reset_eligibility_keeps_claim() {
        let reg = registry();
        let id = live_campaign(&reg, 1000);
        reg.set_eligibility(id, &["0xa"], &[100]).unwrap();
        reg.claim(id, "0xa", T + 5).unwrap();

        reg.set_eligibility(id, &["0xa"], &[250]).unwrap();
        let entry = reg.eligibility(id, "0xa").unwrap().unwrap();
        assert!(entry.claimed);
        assert_eq!(entry.amount, 250);
        assert!(matches!(
            reg.claim(id, "0xa", T + 6),
            Err(RegistryError::AlreadyClaimed { .. })
        ));
        assert_eq!(reg.campaign(id).unwrap().unwrap().claimed_amount, 100);
    }

    #[test]
    fn test_set_eligibility_validation() {
        let reg = registry();
        let id = reg.create_campaign("0xToken", 1000, T, T + DAY).unwrap();
        assert!(matches!(
            reg.set_eligibility(id, &["0xa", "0xb"], &[1]),
            Err(RegistryError::InvalidInput(_))
        ));
        assert!(matches!(
            reg.set_eligibility(id, &["0xa"], &[0]),
            Err(RegistryError::InvalidInput(_))
        ));
        assert!(matches!(
            reg.set_eligibility(99, &["0xa"], &[1]),
            Err(RegistryError::NotFound(99))
        ));
        // a bad pair rejects the whole batch
        assert!(reg.set_eligibility(id, &["0xa", " "], &[1, 2]).is_err());
        assert!(reg.eligibility(id, "0xa").unwrap().is_none());
    }

    #[test]
    fn test_empty_eligibility_batch() {
        let reg = registry();
        let id = live_campaign(&reg, 1000);
        let none: [&str; 0] = [];
        reg.set_eligibility(id, &none, &[]).unwrap();
        assert!(reg.eligible_users(id).unwrap().is_empty());

        // campaign checks still come first
        assert!(matches!(
            reg.set_eligibility(99, &none, &[]),
            Err(RegistryError::NotFound(99))
        ));
        reg.cancel(id).unwrap();
        assert!(matches!(
            reg.set_eligibility(id, &none, &[]),
            Err(RegistryError::CampaignCancelled(_))
        ));
        assert!(matches!(
            reg.set_eligibility(id, &[" "], &[0]),
            Err(RegistryError::CampaignCancelled(_))
        ));

        let labels: Vec<_> = reg.events(id).unwrap().iter().map(|e| e.kind.label()).collect();
        assert_eq!(labels, vec!["created", "activated", "cancelled"]);
    }

    #[test]
    fn test_set_eligibility_after_sweep() {
        let reg = registry();
        let id = live_campaign(&reg, 1000);
        reg.withdraw_unclaimed(id, T + DAY + 1).unwrap();
        assert!(matches!(
            reg.set_eligibility(id, &["0xa"], &[0]),
            Err(RegistryError::AlreadySwept(_))
        ));
    }

    #[test]
    fn test_claim_bad_address_after_campaign_checks() {
        let reg = registry();
        assert!(matches!(reg.claim(404, "", T), Err(RegistryError::NotFound(404))));

        let id = reg.create_campaign("0xToken", 1000, T, T + DAY).unwrap();
        assert!(matches!(reg.claim(id, " ", T), Err(RegistryError::NotActive(_))));
        reg.activate(id).unwrap();
        assert!(matches!(reg.claim(id, " ", T - 1), Err(RegistryError::NotStarted { .. })));
        assert!(matches!(reg.claim(id, " ", T), Err(RegistryError::InvalidInput(_))));
    }

    #[test]
    fn test_unknown_ids_take_no_lock() {
        let reg = registry();
        for id in 1000..1100 {
            assert!(matches!(reg.claim(id, "0xa", T), Err(RegistryError::NotFound(_))));
            assert!(reg.cancel(id).is_err());
            assert!(reg.withdraw_unclaimed(id, T).is_err());
        }
        let out = reg.batch_claim(&[5000, 5001], "0xa", T);
        assert!(out.iter().all(|o| !o.is_ok()));
        assert_eq!(reg.locks.len(), 0);

        let id = live_campaign(&reg, 10);
        assert_eq!(reg.locks.len(), 1);
        assert!(reg.locks.contains_key(&id));
    }

    #[test]
    fn test_addresses_case_insensitive() {
        let reg = registry();
        let id = live_campaign(&reg, 1000);
        reg.set_eligibility(id, &["0xABCdef"], &[7]).unwrap();
        assert_eq!(reg.claim(id, "0xabcDEF", T).unwrap(), 7);
    }

    #[test]
    fn test_cancel_is_terminal() {
        let reg = registry();
        let id = live_campaign(&reg, 1000);
        reg.set_eligibility(id, &["0xa"], &[10]).unwrap();
        reg.cancel(id).unwrap();
        reg.cancel(id).unwrap();

        assert!(matches!(reg.activate(id), Err(RegistryError::CampaignCancelled(_))));
        assert!(matches!(reg.deactivate(id), Err(RegistryError::CampaignCancelled(_))));
        assert!(matches!(
            reg.set_eligibility(id, &["0xb"], &[1]),
            Err(RegistryError::CampaignCancelled(_))
        ));
        assert!(matches!(reg.claim(id, "0xa", T + 1), Err(RegistryError::CampaignCancelled(_))));
        assert_eq!(reg.campaign(id).unwrap().unwrap().phase(T), CampaignPhase::Cancelled);
    }

    #[test]
    fn test_activation_idempotent() {
        let reg = registry();
        let id = live_campaign(&reg, 1000);
        reg.activate(id).unwrap();
        reg.deactivate(id).unwrap();
        reg.deactivate(id).unwrap();
        assert!(!reg.campaign(id).unwrap().unwrap().is_active);

        // created, activated, deactivated; no-ops write nothing
        let labels: Vec<_> = reg.events(id).unwrap().iter().map(|e| e.kind.label()).collect();
        assert_eq!(labels, vec!["created", "activated", "deactivated"]);
    }

    #[test]
    fn test_over_allocation_keeps_invariant() {
        let reg = registry();
        let id = live_campaign(&reg, 100);
        reg.set_eligibility(id, &["0xa", "0xb"], &[60, 60]).unwrap();
        assert_eq!(reg.claim(id, "0xa", T).unwrap(), 60);
        assert!(matches!(
            reg.claim(id, "0xb", T),
            Err(RegistryError::InsufficientFunds { requested: 60, remaining: 40 })
        ));
        let c = reg.campaign(id).unwrap().unwrap();
        assert!(c.claimed_amount <= c.total_amount);
        assert!(!reg.eligibility(id, "0xb").unwrap().unwrap().claimed);
    }

    #[test]
    fn test_batch_claim_partial() {
        let reg = registry();
        let id1 = live_campaign(&reg, 1000);
        let id2 = live_campaign(&reg, 1000);
        reg.set_eligibility(id1, &["0xa"], &[5]).unwrap();

        let out = reg.batch_claim(&[id1, id2], "0xa", T + 1);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].campaign_id, id1);
        assert_eq!(*out[0].result.as_ref().unwrap(), 5);
        assert!(matches!(out[1].result, Err(RegistryError::NotEligible { .. })));
        assert!(reg.eligibility(id1, "0xa").unwrap().unwrap().claimed);
    }

    #[test]
    fn test_withdraw_unclaimed() {
        let reg = registry();
        let id = live_campaign(&reg, 1000);
        reg.set_eligibility(id, &["0xa"], &[300]).unwrap();
        reg.claim(id, "0xa", T + 1).unwrap();

        assert!(matches!(reg.withdraw_unclaimed(id, T + DAY), Err(RegistryError::NotEnded(_))));
        assert_eq!(reg.withdraw_unclaimed(id, T + DAY + 1).unwrap(), 700);
        assert!(matches!(
            reg.withdraw_unclaimed(id, T + DAY + 2),
            Err(RegistryError::AlreadySwept(_))
        ));

        let c = reg.campaign(id).unwrap().unwrap();
        assert!(c.is_swept && !c.is_active);
        assert!(matches!(reg.activate(id), Err(RegistryError::AlreadySwept(_))));
    }

    #[test]
    fn test_withdraw_after_cancel() {
        let reg = registry();
        let id = live_campaign(&reg, 1000);
        reg.cancel(id).unwrap();
        assert_eq!(reg.withdraw_unclaimed(id, T + 1).unwrap(), 1000);
    }

    #[test]
    fn test_user_airdrops_view() {
        let reg = registry();
        let id1 = live_campaign(&reg, 1000);
        let id2 = reg.create_campaign("0xOther", 50, T, T + DAY).unwrap();
        let _id3 = live_campaign(&reg, 10);
        reg.set_eligibility(id1, &["0xa"], &[5]).unwrap();
        reg.set_eligibility(id2, &["0xa"], &[6]).unwrap();

        let view = reg.user_airdrops("0xA", T + 1).unwrap();
        assert_eq!(view.len(), 2);
        assert!(view[0].claimable);
        assert_eq!(view[1].phase, CampaignPhase::Inactive);
        assert!(!view[1].claimable);
    }

    #[test]
    fn test_concurrent_claims_single_winner() {
        let reg = Arc::new(registry());
        let id = live_campaign(&reg, 1000);
        reg.set_eligibility(id, &["0xa"], &[10]).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = reg.clone();
                std::thread::spawn(move || reg.claim(id, "0xa", T + 1).is_ok())
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(reg.campaign(id).unwrap().unwrap().claimed_amount, 10);
    }
}
