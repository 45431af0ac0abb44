// Registry Store: sled-backed persistence for campaigns, eligibility and events
//
// Storage format:
//   Tree: "airdrop_campaigns"    Key: campaign id (u64 BE)                Value: bincode Campaign
//   Tree: "airdrop_eligibility"  Key: campaign id (u64 BE) ++ user bytes  Value: bincode EligibilityEntry
//   Tree: "airdrop_meta"         Key: "next_campaign_id"                  Value: u64 BE
//                                Key: "event_seq:" ++ campaign id (u64 BE) Value: u64 BE
//   Tree: "airdrop_events"       Key: campaign id (u64 BE) ++ seq (u64 BE) Value: bincode RegistryEvent
//
// Every mutation goes through `transact`, which spans all four trees, so a
// crash never leaves a claim flag without its campaign total.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionalTree};
use sled::{Db, IVec, Transactional, Tree};

use super::campaign::{Campaign, EligibilityEntry};
use super::error::{RegistryError, RegistryResult};
use super::events::{RegistryEvent, RegistryEventKind};

pub const CAMPAIGNS_TREE: &str = "airdrop_campaigns";
pub const ELIGIBILITY_TREE: &str = "airdrop_eligibility";
pub const META_TREE: &str = "airdrop_meta";
pub const EVENTS_TREE: &str = "airdrop_events";

const NEXT_CAMPAIGN_ID_KEY: &[u8] = b"next_campaign_id";
const EVENT_SEQ_PREFIX: &[u8] = b"event_seq:";

/// Campaign ids start here and only ever grow.
pub const FIRST_CAMPAIGN_ID: u64 = 1;

pub type TxResult<T> = Result<T, ConflictableTransactionError<RegistryError>>;

/// Abort the surrounding transaction with a registry error.
pub fn abort<T>(err: RegistryError) -> TxResult<T> {
    Err(ConflictableTransactionError::Abort(err))
}

fn campaign_key(id: u64) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

fn entry_key(id: u64, user: &str) -> Vec<u8> {
    let mut k = Vec::with_capacity(8 + user.len());
    k.extend_from_slice(&id.to_be_bytes());
    k.extend_from_slice(user.as_bytes());
    k
}

fn event_key(id: u64, seq: u64) -> Vec<u8> {
    let mut k = Vec::with_capacity(16);
    k.extend_from_slice(&id.to_be_bytes());
    k.extend_from_slice(&seq.to_be_bytes());
    k
}

fn event_seq_key(id: u64) -> Vec<u8> {
    let mut k = EVENT_SEQ_PREFIX.to_vec();
    k.extend_from_slice(&id.to_be_bytes());
    k
}

fn u64_from_be(v: &IVec) -> RegistryResult<u64> {
    let bytes: [u8; 8] = v
        .as_ref()
        .try_into()
        .map_err(|_| RegistryError::invalid("corrupt u64 counter in registry meta"))?;
    Ok(u64::from_be_bytes(bytes))
}

fn decode<T: DeserializeOwned>(v: &IVec) -> RegistryResult<T> {
    Ok(bincode::deserialize(v.as_ref())?)
}

fn tx_encode<T: Serialize>(value: &T) -> TxResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| ConflictableTransactionError::Abort(e.into()))
}

fn tx_lift<T>(res: RegistryResult<T>) -> TxResult<T> {
    res.map_err(ConflictableTransactionError::Abort)
}

/// Typed view over the four trees inside one transaction.
pub struct StoreTxn<'a> {
    campaigns: &'a TransactionalTree,
    eligibility: &'a TransactionalTree,
    meta: &'a TransactionalTree,
    events: &'a TransactionalTree,
}

impl<'a> StoreTxn<'a> {
    pub fn get_campaign(&self, id: u64) -> TxResult<Option<Campaign>> {
        match self.campaigns.get(campaign_key(id))? {
            Some(v) => Ok(Some(tx_lift(decode(&v))?)),
            None => Ok(None),
        }
    }

    /// Load a campaign or abort with `NotFound`.
    pub fn campaign(&self, id: u64) -> TxResult<Campaign> {
        match self.get_campaign(id)? {
            Some(c) => Ok(c),
            None => abort(RegistryError::NotFound(id)),
        }
    }

    pub fn put_campaign(&self, campaign: &Campaign) -> TxResult<()> {
        self.campaigns
            .insert(campaign_key(campaign.id), tx_encode(campaign)?)?;
        Ok(())
    }

    pub fn get_entry(&self, id: u64, user: &str) -> TxResult<Option<EligibilityEntry>> {
        match self.eligibility.get(entry_key(id, user))? {
            Some(v) => Ok(Some(tx_lift(decode(&v))?)),
            None => Ok(None),
        }
    }

    pub fn put_entry(&self, id: u64, user: &str, entry: &EligibilityEntry) -> TxResult<()> {
        self.eligibility.insert(entry_key(id, user), tx_encode(entry)?)?;
        Ok(())
    }

    /// Reserve the next campaign id.
    pub fn next_campaign_id(&self) -> TxResult<u64> {
        let id = match self.meta.get(NEXT_CAMPAIGN_ID_KEY)? {
            Some(v) => tx_lift(u64_from_be(&v))?,
            None => FIRST_CAMPAIGN_ID,
        };
        self.meta
            .insert(NEXT_CAMPAIGN_ID_KEY, (id + 1).to_be_bytes().to_vec())?;
        Ok(id)
    }

    /// Append an event to a campaign's log.
    pub fn push_event(&self, campaign_id: u64, at: u64, kind: RegistryEventKind) -> TxResult<u64> {
        let seq_key = event_seq_key(campaign_id);
        let seq = match self.meta.get(&seq_key)? {
            Some(v) => tx_lift(u64_from_be(&v))?,
            None => 0,
        };
        let event = RegistryEvent {
            campaign_id,
            seq,
            at,
            kind,
        };
        self.events
            .insert(event_key(campaign_id, seq), tx_encode(&event)?)?;
        self.meta.insert(seq_key, (seq + 1).to_be_bytes().to_vec())?;
        Ok(seq)
    }
}

/// Persistent registry storage
pub struct RegistryStore {
    db: Db,
    campaigns: Tree,
    eligibility: Tree,
    meta: Tree,
    events: Tree,
}

impl RegistryStore {
    /// Open (or create) the registry trees in the given sled database
    pub fn open(db: Db) -> RegistryResult<Self> {
        let campaigns = db.open_tree(CAMPAIGNS_TREE)?;
        let eligibility = db.open_tree(ELIGIBILITY_TREE)?;
        let meta = db.open_tree(META_TREE)?;
        let events = db.open_tree(EVENTS_TREE)?;
        Ok(Self {
            db,
            campaigns,
            eligibility,
            meta,
            events,
        })
    }

    /// Run `f` as one atomic transaction over all registry trees, then flush.
    ///
    /// `f` may be re-run by sled on conflict, so it must not have side effects
    /// outside the transaction view.
    pub fn transact<T, F>(&self, f: F) -> RegistryResult<T>
    where
        F: Fn(&StoreTxn<'_>) -> TxResult<T>,
    {
        let res = (&self.campaigns, &self.eligibility, &self.meta, &self.events).transaction(
            |(campaigns, eligibility, meta, events)| {
                let txn = StoreTxn {
                    campaigns,
                    eligibility,
                    meta,
                    events,
                };
                f(&txn)
            },
        );

        let value = match res {
            Ok(v) => v,
            Err(TransactionError::Abort(e)) => return Err(e),
            Err(TransactionError::Storage(e)) => return Err(RegistryError::Storage(e)),
        };

        self.db.flush()?;
        Ok(value)
    }

    pub fn get_campaign(&self, id: u64) -> RegistryResult<Option<Campaign>> {
        match self.campaigns.get(campaign_key(id))? {
            Some(v) => Ok(Some(decode(&v)?)),
            None => Ok(None),
        }
    }

    /// All campaigns in id order
    pub fn campaigns(&self) -> RegistryResult<Vec<Campaign>> {
        let mut out = Vec::new();
        for item in self.campaigns.iter() {
            let (_, v) = item?;
            out.push(decode(&v)?);
        }
        Ok(out)
    }

    pub fn get_entry(&self, id: u64, user: &str) -> RegistryResult<Option<EligibilityEntry>> {
        match self.eligibility.get(entry_key(id, user))? {
            Some(v) => Ok(Some(decode(&v)?)),
            None => Ok(None),
        }
    }

    /// All eligibility entries of one campaign, ordered by user key
    pub fn entries(&self, id: u64) -> RegistryResult<Vec<(String, EligibilityEntry)>> {
        let mut out = Vec::new();
        for item in self.eligibility.scan_prefix(id.to_be_bytes()) {
            let (k, v) = item?;
            let user = String::from_utf8(k[8..].to_vec())
                .map_err(|_| RegistryError::invalid("corrupt user key in eligibility tree"))?;
            out.push((user, decode(&v)?));
        }
        Ok(out)
    }

    pub fn events(&self, id: u64) -> RegistryResult<Vec<RegistryEvent>> {
        let mut out = Vec::new();
        for item in self.events.scan_prefix(id.to_be_bytes()) {
            let (_, v) = item?;
            out.push(decode(&v)?);
        }
        Ok(out)
    }
}
