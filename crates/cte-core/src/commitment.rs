//! Tight packing, keccak-256 and the commit-reveal lifecycle.
//!
//! Packing follows the contract ABI's packed mode: each value is written in
//! its fixed-width big-endian form with no padding and no delimiters, so a
//! `uint8` followed by a `bytes32` packs to 33 bytes. Hashes are the
//! original Keccak-256 (not NIST SHA3-256), matching on-chain `keccak256`.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::error::CommitError;
use crate::types::{Address, Hash256};

/// A single value to be packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Uint8(u8),
    Uint256(U256),
    Bytes32(Hash256),
    Address(Address),
    Bool(bool),
    /// Dynamic bytes, copied verbatim.
    Bytes(Vec<u8>),
}

impl Token {
    fn packed_len(&self) -> usize {
        match self {
            Token::Uint8(_) | Token::Bool(_) => 1,
            Token::Uint256(_) | Token::Bytes32(_) => 32,
            Token::Address(_) => 20,
            Token::Bytes(b) => b.len(),
        }
    }

    fn write_packed(&self, out: &mut Vec<u8>) {
        match self {
            Token::Uint8(v) => out.push(*v),
            Token::Bool(v) => out.push(u8::from(*v)),
            Token::Uint256(v) => out.extend_from_slice(Hash256::from_u256(*v).as_bytes()),
            Token::Bytes32(h) => out.extend_from_slice(h.as_bytes()),
            Token::Address(a) => out.extend_from_slice(a.as_bytes()),
            Token::Bytes(b) => out.extend_from_slice(b),
        }
    }
}

/// Concatenate the packed encodings of `tokens` in order.
pub fn pack(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.iter().map(Token::packed_len).sum());
    for token in tokens {
        token.write_packed(&mut out);
    }
    out
}

/// Keccak-256 of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> Hash256 {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_ref());
    Hash256(hasher.finalize().into())
}

/// `keccak256(pack(value, salt))`, the commitment every commit-reveal
/// lottery accepts.
pub fn commitment_hash(value: u8, salt: &Hash256) -> Hash256 {
    keccak256(pack(&[Token::Uint8(value), Token::Bytes32(*salt)]))
}

/// A one-shot commitment to a `uint8` answer.
///
/// Lifecycle: empty, then [`commit`](Self::commit) stores a hash exactly
/// once, then [`reveal`](Self::reveal) after the deadline checks the
/// preimage and exposes the value. The revealed value reads as zero until
/// then.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Commitment {
    hash: Option<Hash256>,
    committed_at: u64,
    reveal_delay: u64,
    revealed: bool,
    value: u8,
}

impl Commitment {
    /// An empty commitment whose reveal opens `reveal_delay` seconds after
    /// the commit.
    pub fn new(reveal_delay: u64) -> Self {
        Self {
            hash: None,
            committed_at: 0,
            reveal_delay,
            revealed: false,
            value: 0,
        }
    }

    /// Store `hash`, committed at time `now`.
    ///
    /// # Errors
    ///
    /// - [`CommitError::AlreadyCommitted`] if a hash is already stored
    pub fn commit(&mut self, hash: Hash256, now: u64) -> Result<(), CommitError> {
        if self.hash.is_some() {
            return Err(CommitError::AlreadyCommitted);
        }
        self.hash = Some(hash);
        self.committed_at = now;
        Ok(())
    }

    /// Open the commitment with `(value, salt)` at time `now`.
    ///
    /// # Errors
    ///
    /// - [`CommitError::NoCommitment`] if nothing was committed
    /// - [`CommitError::TooEarly`] if `now` is before the reveal deadline
    /// - [`CommitError::AlreadyRevealed`] on a second reveal
    /// - [`CommitError::InvalidReveal`] if the preimage does not match
    pub fn reveal(&mut self, value: u8, salt: &Hash256, now: u64) -> Result<u8, CommitError> {
        let (hash, deadline) = match (self.hash, self.reveal_deadline()) {
            (Some(hash), Some(deadline)) => (hash, deadline),
            _ => return Err(CommitError::NoCommitment),
        };
        if now < deadline {
            return Err(CommitError::TooEarly);
        }
        if self.revealed {
            return Err(CommitError::AlreadyRevealed);
        }
        if commitment_hash(value, salt) != hash {
            return Err(CommitError::InvalidReveal);
        }
        self.revealed = true;
        self.value = value;
        Ok(value)
    }

    /// The stored hash, or the zero hash before any commit.
    pub fn hash(&self) -> Hash256 {
        self.hash.unwrap_or(Hash256::ZERO)
    }

    pub fn is_committed(&self) -> bool {
        self.hash.is_some()
    }

    /// Earliest time a reveal is accepted, once committed.
    pub fn reveal_deadline(&self) -> Option<u64> {
        self.hash
            .map(|_| self.committed_at.saturating_add(self.reveal_delay))
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// The revealed answer, `None` until revealed.
    pub fn revealed_value(&self) -> Option<u8> {
        self.revealed.then_some(self.value)
    }

    /// The public `answer` getter: zero until revealed.
    pub fn answer(&self) -> u8 {
        self.value
    }
}
