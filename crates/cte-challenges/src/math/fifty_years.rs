use cte_core::arith::Policy;
use cte_core::clock::Clock;
use cte_core::error::{ChallengeError, StorageError};
use cte_core::storage::{Storage, StructArray};
use cte_core::types::Address;
use cte_core::U256;

use crate::config::ChallengeConfig;
use crate::machine::Challenge;
use crate::purse::Purse;

const QUEUE_SLOT: U256 = U256([0, 0, 0, 0]);
const HEAD_SLOT: U256 = U256([1, 0, 0, 0]);
const OWNER_SLOT: U256 = U256([2, 0, 0, 0]);

const AMOUNT: u64 = 0;
const UNLOCK: u64 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contribution {
    pub amount: U256,
    pub unlock_timestamp: U256,
}

/// A time-locked contribution queue in raw storage: queue length at slot 0,
/// head at slot 1, owner at slot 2.
///
/// New contributions are built in an uninitialised storage struct, so
/// `amount` lands in the queue length and `unlock_timestamp` in the head.
/// The one-day spacing check adds without overflow protection.
#[derive(Clone, Debug)]
pub struct FiftyYears {
    storage: Storage,
    queue: StructArray,
    max_batch: u64,
    spacing: u64,
    purse: Purse,
}

impl FiftyYears {
    /// Lock the funding for the configured fifty years on behalf of `owner`.
    pub fn new(owner: Address, cfg: &ChallengeConfig, clock: &dyn Clock) -> Self {
        let mut storage = Storage::new();
        storage.store(OWNER_SLOT, owner.to_u256());
        let queue = StructArray::new(QUEUE_SLOT, 2);
        let unlock = clock.timestamp().saturating_add(cfg.fifty_years_lock_secs);
        queue.push(&mut storage, &[cfg.funding, U256::from(unlock)]);
        Self {
            storage,
            queue,
            max_batch: cfg.max_withdraw_batch,
            spacing: cfg.contribution_spacing_secs,
            purse: Purse::funded(cfg.funding),
        }
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), ChallengeError> {
        if caller != self.owner() {
            return Err(ChallengeError::NotOwner);
        }
        Ok(())
    }

    /// Top up contribution `index` if it is live, otherwise append a new
    /// one unlocking at `timestamp`.
    pub fn upsert(
        &mut self,
        caller: Address,
        index: U256,
        timestamp: U256,
        value: U256,
    ) -> Result<(), ChallengeError> {
        self.ensure_owner(caller)?;
        self.purse.receive(value)?;
        let length = self.queue.length(&self.storage);
        if index >= self.head() && index < length {
            let amount = self.queue.field(&self.storage, index, AMOUNT)?;
            let topped = Policy::Wrapping.add(amount, value)?;
            self.queue.set_field(&mut self.storage, index, AMOUNT, topped)?;
            return Ok(());
        }
        let last = length.overflowing_sub(U256::one()).0;
        let previous = self.queue.field(&self.storage, last, UNLOCK)?;
        if timestamp < Policy::Wrapping.add(previous, U256::from(self.spacing))? {
            return Err(ChallengeError::TimestampTooEarly);
        }
        self.storage.store(QUEUE_SLOT + AMOUNT, value);
        self.storage.store(QUEUE_SLOT + UNLOCK, timestamp);
        self.queue.push_from(&mut self.storage, QUEUE_SLOT);
        Ok(())
    }

    /// Pay out every contribution from the head through `index`.
    pub fn withdraw(&mut self, caller: Address, index: U256, clock: &dyn Clock) -> Result<U256, ChallengeError> {
        self.ensure_owner(caller)?;
        let unlock = self.queue.field(&self.storage, index, UNLOCK)?;
        if U256::from(clock.timestamp()) < unlock {
            return Err(ChallengeError::NotYetUnlocked);
        }
        let head = self.head();
        if index >= head {
            let len = (index - head).overflowing_add(U256::one()).0;
            if len > U256::from(self.max_batch) {
                return Err(ChallengeError::BatchTooLarge { len, max: self.max_batch });
            }
        }
        let mut total = U256::zero();
        let mut i = head;
        while i <= index {
            let amount = self.queue.field(&self.storage, i, AMOUNT)?;
            total = Policy::Wrapping.add(total, amount)?;
            self.queue.clear(&mut self.storage, i)?;
            if i == U256::MAX {
                break;
            }
            i += U256::one();
        }
        self.storage.store(HEAD_SLOT, index.overflowing_add(U256::one()).0);
        self.purse.pay(total)
    }

    pub fn owner(&self) -> Address {
        Address::from_u256(self.storage.load(OWNER_SLOT))
    }

    pub fn head(&self) -> U256 {
        self.storage.load(HEAD_SLOT)
    }

    pub fn queue_length(&self) -> U256 {
        self.queue.length(&self.storage)
    }

    pub fn contribution(&self, index: U256) -> Result<Contribution, StorageError> {
        Ok(Contribution {
            amount: self.queue.field(&self.storage, index, AMOUNT)?,
            unlock_timestamp: self.queue.field(&self.storage, index, UNLOCK)?,
        })
    }
}

impl Challenge for FiftyYears {
    fn is_solved(&self) -> bool {
        self.purse.is_empty()
    }

    fn balance(&self) -> U256 {
        self.purse.balance()
    }
}

/// The same queue in owned memory with checked arithmetic and a bounded
/// unlock horizon.
#[derive(Clone, Debug)]
pub struct FiftyYearsFixed {
    owner: Address,
    contributions: Vec<Contribution>,
    head: usize,
    spacing: u64,
    horizon: u64,
    max_batch: u64,
    purse: Purse,
}

impl FiftyYearsFixed {
    pub fn new(owner: Address, cfg: &ChallengeConfig, clock: &dyn Clock) -> Self {
        let unlock = clock.timestamp().saturating_add(cfg.fifty_years_lock_secs);
        Self {
            owner,
            contributions: vec![Contribution {
                amount: cfg.funding,
                unlock_timestamp: U256::from(unlock),
            }],
            head: 0,
            spacing: cfg.contribution_spacing_secs,
            horizon: cfg.max_unlock_horizon_secs,
            max_batch: cfg.max_withdraw_batch,
            purse: Purse::funded(cfg.funding),
        }
    }

    /// Live contribution slot addressed by `index`, if any.
    fn live(&self, index: U256) -> Option<usize> {
        let i = usize::try_from(index).ok()?;
        (i >= self.head && i < self.contributions.len()).then_some(i)
    }

    pub fn upsert(
        &mut self,
        caller: Address,
        index: U256,
        timestamp: U256,
        value: U256,
        clock: &dyn Clock,
    ) -> Result<(), ChallengeError> {
        if caller != self.owner {
            return Err(ChallengeError::NotOwner);
        }
        if let Some(i) = self.live(index) {
            let topped = Policy::Checked.add(self.contributions[i].amount, value)?;
            self.purse.receive(value)?;
            self.contributions[i].amount = topped;
            return Ok(());
        }
        let horizon = U256::from(clock.timestamp()) + U256::from(self.horizon);
        if timestamp > horizon {
            return Err(ChallengeError::TimestampTooFarInFuture);
        }
        let previous = self
            .contributions
            .last()
            .map_or(U256::zero(), |c| c.unlock_timestamp);
        if timestamp < Policy::Checked.add(previous, U256::from(self.spacing))? {
            return Err(ChallengeError::TimestampTooEarly);
        }
        self.purse.receive(value)?;
        self.contributions.push(Contribution { amount: value, unlock_timestamp: timestamp });
        Ok(())
    }

    pub fn withdraw(&mut self, caller: Address, index: U256, clock: &dyn Clock) -> Result<U256, ChallengeError> {
        if caller != self.owner {
            return Err(ChallengeError::NotOwner);
        }
        let last = self.live(index).ok_or(ChallengeError::InvalidIndex)?;
        if U256::from(clock.timestamp()) < self.contributions[last].unlock_timestamp {
            return Err(ChallengeError::NotYetUnlocked);
        }
        let len = (last - self.head + 1) as u64;
        if len > self.max_batch {
            return Err(ChallengeError::BatchTooLarge { len: U256::from(len), max: self.max_batch });
        }
        let mut total = U256::zero();
        for c in &mut self.contributions[self.head..=last] {
            total = Policy::Checked.add(total, c.amount)?;
            *c = Contribution::default();
        }
        self.head = last + 1;
        self.purse.pay(total)
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn contribution_count(&self) -> usize {
        self.contributions.len()
    }

    pub fn contributions(&self, index: usize) -> Option<&Contribution> {
        self.contributions.get(index)
    }
}

impl Challenge for FiftyYearsFixed {
    fn is_solved(&self) -> bool {
        self.purse.is_empty()
    }

    fn balance(&self) -> U256 {
        self.purse.balance()
    }
}
