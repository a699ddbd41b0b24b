use std::collections::BTreeMap;

use cte_core::clock::Clock;
use cte_core::constants::{DONATION_SCALE, LEGACY_DONATION_SCALE};
use cte_core::error::{ChallengeError, LedgerError};
use cte_core::storage::{Storage, StructArray};
use cte_core::types::Address;
use cte_core::U256;

use crate::config::ChallengeConfig;
use crate::machine::Challenge;
use crate::purse::Purse;

const DONATIONS_SLOT: U256 = U256([0, 0, 0, 0]);
const OWNER_SLOT: U256 = U256([1, 0, 0, 0]);

/// Field offsets of a donation struct.
const TIMESTAMP: u64 = 0;
const ETHER_AMOUNT: u64 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DonationRecord {
    pub timestamp: U256,
    pub ether_amount: U256,
}

/// Donations recorded in raw storage: the array length at slot 0, the
/// owner at slot 1.
///
/// Each donation is built in an uninitialised storage struct that points
/// at slot 0, so its `timestamp` overwrites the array length and its
/// `ether_amount` overwrites the owner.
#[derive(Clone, Debug)]
pub struct Donation {
    storage: Storage,
    donations: StructArray,
    scale: U256,
    purse: Purse,
}

impl Donation {
    pub fn new(owner: Address, cfg: &ChallengeConfig) -> Self {
        let mut storage = Storage::new();
        storage.store(OWNER_SLOT, owner.to_u256());
        Self {
            storage,
            donations: StructArray::new(DONATIONS_SLOT, 2),
            scale: LEGACY_DONATION_SCALE,
            purse: Purse::funded(cfg.funding),
        }
    }

    /// Donate, paying `ether_amount / scale` wei.
    pub fn donate(
        &mut self,
        ether_amount: U256,
        value: U256,
        clock: &dyn Clock,
    ) -> Result<(), ChallengeError> {
        if value != ether_amount / self.scale {
            return Err(LedgerError::IncorrectPayment.into());
        }
        self.purse.receive(value)?;
        self.storage.store(DONATIONS_SLOT + TIMESTAMP, U256::from(clock.timestamp()));
        self.storage.store(DONATIONS_SLOT + ETHER_AMOUNT, ether_amount);
        self.donations.push_from(&mut self.storage, DONATIONS_SLOT);
        Ok(())
    }

    pub fn withdraw(&mut self, caller: Address) -> Result<U256, ChallengeError> {
        if caller != self.owner() {
            return Err(ChallengeError::NotOwner);
        }
        Ok(self.purse.drain())
    }

    /// The address stored in the owner slot.
    pub fn owner(&self) -> Address {
        Address::from_u256(self.storage.load(OWNER_SLOT))
    }

    pub fn donation_count(&self) -> U256 {
        self.donations.length(&self.storage)
    }

    pub fn donation(&self, index: U256) -> Result<DonationRecord, ChallengeError> {
        Ok(DonationRecord {
            timestamp: self.donations.field(&self.storage, index, TIMESTAMP)?,
            ether_amount: self.donations.field(&self.storage, index, ETHER_AMOUNT)?,
        })
    }

    pub fn scale(&self) -> U256 {
        self.scale
    }

    pub fn read_storage(&self, slot: U256) -> U256 {
        self.storage.load(slot)
    }
}

impl Challenge for Donation {
    fn is_solved(&self) -> bool {
        self.purse.is_empty()
    }

    fn balance(&self) -> U256 {
        self.purse.balance()
    }
}

/// Donations kept per donor in ordinary owned memory, priced at one wei
/// per ether.
#[derive(Clone, Debug)]
pub struct DonationFixed {
    owner: Address,
    donations: BTreeMap<Address, Vec<DonationRecord>>,
    purse: Purse,
}

impl DonationFixed {
    pub fn new(owner: Address, cfg: &ChallengeConfig) -> Self {
        Self { owner, donations: BTreeMap::new(), purse: Purse::funded(cfg.funding) }
    }

    pub fn donate(
        &mut self,
        caller: Address,
        ether_amount: U256,
        value: U256,
        clock: &dyn Clock,
    ) -> Result<(), ChallengeError> {
        if value != ether_amount / DONATION_SCALE {
            return Err(LedgerError::IncorrectPayment.into());
        }
        self.purse.receive(value)?;
        self.donations.entry(caller).or_default().push(DonationRecord {
            timestamp: U256::from(clock.timestamp()),
            ether_amount,
        });
        Ok(())
    }

    pub fn withdraw(&mut self, caller: Address) -> Result<U256, ChallengeError> {
        if caller != self.owner {
            return Err(ChallengeError::NotOwner);
        }
        Ok(self.purse.drain())
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn donations_by_address(&self, donor: &Address, index: usize) -> Option<&DonationRecord> {
        self.donations.get(donor)?.get(index)
    }

    pub fn donation_count(&self, donor: &Address) -> usize {
        self.donations.get(donor).map_or(0, Vec::len)
    }
}

impl Challenge for DonationFixed {
    fn is_solved(&self) -> bool {
        self.purse.is_empty()
    }

    fn balance(&self) -> U256 {
        self.purse.balance()
    }
}
