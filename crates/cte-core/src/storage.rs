//! Slot-addressed contract storage and the indexed containers laid over it.
//!
//! [`Storage`] is the flat `U256 -> U256` word store a contract owns.
//! Declared state variables occupy low slots (0, 1, 2, ...). Dynamic arrays
//! keep their length in a declared slot and their elements at
//! `keccak256(pad32(length_slot)) + index`, computed with wrapping 256-bit
//! arithmetic, which is how an attacker-chosen index reaches slot 0.
//!
//! [`SlotStore`] abstracts the indexed container so the aliasing
//! [`AliasingArray`] and the isolated [`IsolatedMap`] are interchangeable.

use std::collections::{BTreeMap, HashMap};

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::commitment::{keccak256, pack, Token};
use crate::error::StorageError;

/// Flat word storage. Unwritten slots read as zero; writing zero clears.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Storage {
    slots: BTreeMap<U256, U256>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the word at `slot`.
    pub fn load(&self, slot: U256) -> U256 {
        self.slots.get(&slot).copied().unwrap_or_default()
    }

    /// Write `value` at `slot`.
    pub fn store(&mut self, slot: U256, value: U256) {
        if value.is_zero() {
            self.slots.remove(&slot);
        } else {
            self.slots.insert(slot, value);
        }
    }

    /// Number of non-zero slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Non-zero slots in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&U256, &U256)> {
        self.slots.iter()
    }
}

/// Slot of element 0 of a dynamic array whose length lives at `length_slot`.
pub fn array_base_slot(length_slot: U256) -> U256 {
    keccak256(pack(&[Token::Uint256(length_slot)])).to_u256()
}

/// Slot of word `word` of element `index`, for elements `element_words`
/// words wide. All arithmetic wraps at 2^256.
pub fn array_element_slot(base: U256, index: U256, element_words: u64, word: u64) -> U256 {
    let offset = index.overflowing_mul(U256::from(element_words)).0;
    base.overflowing_add(offset)
        .0
        .overflowing_add(U256::from(word))
        .0
}

/// The array index whose element slot wraps around to `target`.
///
/// # Examples
///
/// ```
/// use cte_core::storage::{aliasing_index, array_base_slot, array_element_slot};
/// use cte_core::U256;
///
/// let base = array_base_slot(U256::one());
/// let index = aliasing_index(base, U256::zero());
/// assert_eq!(array_element_slot(base, index, 1, 0), U256::zero());
/// ```
pub fn aliasing_index(base: U256, target: U256) -> U256 {
    target.overflowing_sub(base).0
}

/// An indexed word container living beside a contract's [`Storage`].
pub trait SlotStore {
    /// Write `value` at `index`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::IndexOutOfBounds`] if the container cannot address `index`
    fn set(&mut self, storage: &mut Storage, index: U256, value: U256) -> Result<(), StorageError>;

    /// Read the value at `index`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::IndexOutOfBounds`] if the container cannot address `index`
    fn get(&self, storage: &Storage, index: U256) -> Result<U256, StorageError>;
}

/// A legacy dynamic `uint256[]` whose elements share the contract's slot
/// space.
///
/// `set` grows the length to `index + 1` (wrapping) when `length <= index`,
/// as assigning `array.length` did, then writes `base + index`. Bounds are
/// checked against the length after growth, so `index == 2^256 - 1` always
/// fails: its length wraps to zero.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AliasingArray {
    length_slot: U256,
    base: U256,
}

impl AliasingArray {
    /// An array whose length is declared at `length_slot`.
    pub fn new(length_slot: U256) -> Self {
        Self {
            length_slot,
            base: array_base_slot(length_slot),
        }
    }

    pub fn length_slot(&self) -> U256 {
        self.length_slot
    }

    /// Slot of element 0.
    pub fn base_slot(&self) -> U256 {
        self.base
    }

    /// Current length, read from storage.
    pub fn length(&self, storage: &Storage) -> U256 {
        storage.load(self.length_slot)
    }

    /// Storage slot addressed by `index`.
    pub fn slot_of(&self, index: U256) -> U256 {
        array_element_slot(self.base, index, 1, 0)
    }
}

impl SlotStore for AliasingArray {
    fn set(&mut self, storage: &mut Storage, index: U256, value: U256) -> Result<(), StorageError> {
        let mut length = self.length(storage);
        let grow = length <= index;
        if grow {
            length = index.overflowing_add(U256::one()).0;
        }
        if index >= length {
            return Err(StorageError::IndexOutOfBounds { index, length });
        }
        if grow {
            storage.store(self.length_slot, length);
        }
        storage.store(self.slot_of(index), value);
        Ok(())
    }

    fn get(&self, storage: &Storage, index: U256) -> Result<U256, StorageError> {
        let length = self.length(storage);
        if index >= length {
            return Err(StorageError::IndexOutOfBounds { index, length });
        }
        Ok(storage.load(self.slot_of(index)))
    }
}

/// A true associative container keyed by the full index. It never touches
/// the shared storage, so no index can reach a declared slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IsolatedMap {
    entries: HashMap<U256, U256>,
}

impl IsolatedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-zero entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SlotStore for IsolatedMap {
    fn set(&mut self, _storage: &mut Storage, index: U256, value: U256) -> Result<(), StorageError> {
        if value.is_zero() {
            self.entries.remove(&index);
        } else {
            self.entries.insert(index, value);
        }
        Ok(())
    }

    fn get(&self, _storage: &Storage, index: U256) -> Result<U256, StorageError> {
        Ok(self.entries.get(&index).copied().unwrap_or_default())
    }
}

/// A legacy dynamic array of `element_words`-wide structs laid out in the
/// contract's [`Storage`].
///
/// [`push_from`](Self::push_from) copies a struct that itself lives in
/// storage. The length is bumped before the words are copied, so a source
/// struct that overlaps the length slot is copied with the bumped length.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StructArray {
    length_slot: U256,
    base: U256,
    element_words: u64,
}

impl StructArray {
    pub fn new(length_slot: U256, element_words: u64) -> Self {
        Self {
            length_slot,
            base: array_base_slot(length_slot),
            element_words,
        }
    }

    pub fn length(&self, storage: &Storage) -> U256 {
        storage.load(self.length_slot)
    }

    /// Slot of field `word` of element `index`.
    pub fn slot_of(&self, index: U256, word: u64) -> U256 {
        array_element_slot(self.base, index, self.element_words, word)
    }

    fn check(&self, storage: &Storage, index: U256) -> Result<(), StorageError> {
        let length = self.length(storage);
        if index >= length {
            return Err(StorageError::IndexOutOfBounds { index, length });
        }
        Ok(())
    }

    /// Read field `word` of element `index`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::IndexOutOfBounds`] if `index >= length`
    pub fn field(&self, storage: &Storage, index: U256, word: u64) -> Result<U256, StorageError> {
        self.check(storage, index)?;
        Ok(storage.load(self.slot_of(index, word)))
    }

    /// Write field `word` of element `index`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::IndexOutOfBounds`] if `index >= length`
    pub fn set_field(
        &self,
        storage: &mut Storage,
        index: U256,
        word: u64,
        value: U256,
    ) -> Result<(), StorageError> {
        self.check(storage, index)?;
        storage.store(self.slot_of(index, word), value);
        Ok(())
    }

    /// Zero every field of element `index`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::IndexOutOfBounds`] if `index >= length`
    pub fn clear(&self, storage: &mut Storage, index: U256) -> Result<(), StorageError> {
        self.check(storage, index)?;
        for word in 0..self.element_words {
            storage.store(self.slot_of(index, word), U256::zero());
        }
        Ok(())
    }

    /// Append an element with the given field values. Returns its index.
    /// Fields beyond `values` are left zero.
    pub fn push(&self, storage: &mut Storage, values: &[U256]) -> U256 {
        let index = self.length(storage);
        storage.store(self.length_slot, index.overflowing_add(U256::one()).0);
        for (word, value) in (0..self.element_words).zip(values) {
            storage.store(self.slot_of(index, word), *value);
        }
        index
    }

    /// Append a copy of the struct stored at `source..source + element_words`.
    /// Returns the index of the new element. The length wraps.
    pub fn push_from(&self, storage: &mut Storage, source: U256) -> U256 {
        let index = self.length(storage);
        storage.store(self.length_slot, index.overflowing_add(U256::one()).0);
        for word in 0..self.element_words {
            let value = storage.load(source.overflowing_add(U256::from(word)).0);
            storage.store(self.slot_of(index, word), value);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hash256;

    fn slot_zero_aliasing_index() -> U256 {
        aliasing_index(array_base_slot(U256::one()), U256::zero())
    }

    #[test]
    fn base_slot_of_slot_one() {
        assert_eq!(
            Hash256::from_u256(array_base_slot(U256::one())).to_string(),
            "0xb10e2d527612073b26eecdfd717e6a320cf44b4afac2b0732d9fcbe2b7fa0cf6"
        );
    }

    #[test]
    fn storage_zero_clears() {
        let mut s = Storage::new();
        s.store(U256::from(3u8), U256::from(9u8));
        assert_eq!(s.load(U256::from(3u8)), U256::from(9u8));
        s.store(U256::from(3u8), U256::zero());
        assert!(s.is_empty());
    }

    #[test]
    fn aliasing_array_grows_and_reads_back() {
        let mut storage = Storage::new();
        let mut array = AliasingArray::new(U256::one());
        array.set(&mut storage, U256::from(5u8), U256::from(77u8)).unwrap();
        assert_eq!(array.length(&storage), U256::from(6u8));
        assert_eq!(array.get(&storage, U256::from(5u8)), Ok(U256::from(77u8)));
        assert_eq!(array.get(&storage, U256::zero()), Ok(U256::zero()));
        assert!(array.get(&storage, U256::from(6u8)).is_err());
    }

    #[test]
    fn aliasing_array_overwrites_slot_zero() {
        let mut storage = Storage::new();
        let mut array = AliasingArray::new(U256::one());

        // Length must first cover the aliasing index.
        array.set(&mut storage, U256::MAX - U256::one(), U256::zero()).unwrap();
        assert_eq!(array.length(&storage), U256::MAX);

        array.set(&mut storage, slot_zero_aliasing_index(), U256::one()).unwrap();
        assert_eq!(storage.load(U256::zero()), U256::one());
    }

    #[test]
    fn aliasing_array_last_index_is_out_of_bounds() {
        let mut storage = Storage::new();
        let mut array = AliasingArray::new(U256::one());
        let before = storage.clone();
        let err = array.set(&mut storage, U256::MAX, U256::one()).unwrap_err();
        assert_eq!(err, StorageError::IndexOutOfBounds { index: U256::MAX, length: U256::zero() });
        assert_eq!(storage, before);
    }

    #[test]
    fn isolated_map_never_touches_storage() {
        let mut storage = Storage::new();
        let mut map = IsolatedMap::new();
        map.set(&mut storage, slot_zero_aliasing_index(), U256::one()).unwrap();
        map.set(&mut storage, U256::MAX, U256::from(2u8)).unwrap();
        assert!(storage.is_empty());
        assert_eq!(map.get(&storage, U256::MAX), Ok(U256::from(2u8)));
        assert_eq!(map.get(&storage, U256::zero()), Ok(U256::zero()));
    }

    #[test]
    fn struct_push_copies_after_bumping_length() {
        let mut storage = Storage::new();
        let array = StructArray::new(U256::zero(), 2);
        storage.store(U256::zero(), U256::from(5u8));
        storage.store(U256::one(), U256::from(77u8));
        let index = array.push_from(&mut storage, U256::zero());
        assert_eq!(index, U256::from(5u8));
        assert_eq!(array.length(&storage), U256::from(6u8));
        assert_eq!(array.field(&storage, index, 0), Ok(U256::from(6u8)));
        assert_eq!(array.field(&storage, index, 1), Ok(U256::from(77u8)));
    }

    #[test]
    fn struct_fields_are_bounds_checked() {
        let mut storage = Storage::new();
        let array = StructArray::new(U256::from(3u8), 2);
        assert!(array.field(&storage, U256::zero(), 0).is_err());
        assert!(array.set_field(&mut storage, U256::zero(), 1, U256::one()).is_err());
        storage.store(U256::from(9u8), U256::from(4u8));
        array.push_from(&mut storage, U256::from(9u8));
        assert_eq!(array.push(&mut storage, &[U256::from(8u8)]), U256::one());
        assert_eq!(array.field(&storage, U256::one(), 0), Ok(U256::from(8u8)));
        array.set_field(&mut storage, U256::zero(), 1, U256::one()).unwrap();
        assert_eq!(array.slot_of(U256::one(), 0), array.slot_of(U256::zero(), 2));
        array.clear(&mut storage, U256::zero()).unwrap();
        assert_eq!(array.field(&storage, U256::zero(), 0), Ok(U256::zero()));
        assert_eq!(array.field(&storage, U256::zero(), 1), Ok(U256::zero()));
    }
}
