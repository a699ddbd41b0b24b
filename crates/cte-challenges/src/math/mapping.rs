use cte_core::error::ChallengeError;
use cte_core::storage::{AliasingArray, IsolatedMap, SlotStore, Storage};
use cte_core::U256;

use crate::machine::Challenge;

/// Slot holding the completion flag.
const COMPLETE_SLOT: U256 = U256([0, 0, 0, 0]);
/// Slot holding the array length.
const MAP_LENGTH_SLOT: U256 = U256([1, 0, 0, 0]);

/// A key/value map backed by `S`. The completion flag lives in slot 0 of
/// the contract's storage and nothing writes it on purpose.
#[derive(Clone, Debug)]
pub struct MappingChallenge<S> {
    storage: Storage,
    map: S,
}

impl MappingChallenge<AliasingArray> {
    /// Backed by a dynamic array whose elements share the storage space.
    pub fn vulnerable() -> Self {
        Self { storage: Storage::new(), map: AliasingArray::new(MAP_LENGTH_SLOT) }
    }

    /// Array element index that lands on the completion flag.
    pub fn flag_index(&self) -> U256 {
        cte_core::storage::aliasing_index(self.map.base_slot(), COMPLETE_SLOT)
    }
}

impl MappingChallenge<IsolatedMap> {
    /// Backed by a map that cannot reach declared slots.
    pub fn fixed() -> Self {
        Self { storage: Storage::new(), map: IsolatedMap::new() }
    }
}

impl<S: SlotStore + Clone> MappingChallenge<S> {
    pub fn set(&mut self, key: U256, value: U256) -> Result<(), ChallengeError> {
        self.map.set(&mut self.storage, key, value)?;
        Ok(())
    }

    pub fn get(&self, key: U256) -> Result<U256, ChallengeError> {
        Ok(self.map.get(&self.storage, key)?)
    }

    pub fn read_storage(&self, slot: U256) -> U256 {
        self.storage.load(slot)
    }
}

impl<S: SlotStore + Clone> Challenge for MappingChallenge<S> {
    fn is_solved(&self) -> bool {
        !self.storage.load(COMPLETE_SLOT).is_zero()
    }

    fn balance(&self) -> U256 {
        U256::zero()
    }
}
