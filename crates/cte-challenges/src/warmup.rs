//! Warmup challenges: deploy, call a function, register a nickname.

use std::collections::BTreeMap;

use cte_core::types::{Address, Hash256};
use cte_core::U256;

use crate::machine::Challenge;

/// Complete as soon as it exists.
#[derive(Clone, Debug, Default)]
pub struct DeployChallenge;

impl Challenge for DeployChallenge {
    fn is_solved(&self) -> bool {
        true
    }

    fn balance(&self) -> U256 {
        U256::zero()
    }
}

/// Complete once anyone calls [`call_me`](Self::call_me).
#[derive(Clone, Debug, Default)]
pub struct CallMeChallenge {
    called: bool,
}

impl CallMeChallenge {
    pub fn call_me(&mut self) {
        self.called = true;
    }
}

impl Challenge for CallMeChallenge {
    fn is_solved(&self) -> bool {
        self.called
    }

    fn balance(&self) -> U256 {
        U256::zero()
    }
}

/// Encode `name` as a right-padded `bytes32`. `None` if longer than 32
/// bytes.
pub fn encode_nickname(name: &str) -> Option<Hash256> {
    let bytes = name.as_bytes();
    if bytes.len() > 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out[..bytes.len()].copy_from_slice(bytes);
    Some(Hash256(out))
}

/// The suite-wide nickname registry.
#[derive(Clone, Debug, Default)]
pub struct NicknameRegistry {
    nicknames: BTreeMap<Address, Hash256>,
}

impl NicknameRegistry {
    pub fn set_nickname(&mut self, caller: Address, nickname: Hash256) {
        self.nicknames.insert(caller, nickname);
    }

    pub fn nickname_of(&self, account: &Address) -> Hash256 {
        self.nicknames.get(account).copied().unwrap_or_default()
    }
}

/// Complete once `player` has a nickname whose first byte is non-zero.
#[derive(Clone, Debug)]
pub struct NicknameChallenge {
    player: Address,
    registry: NicknameRegistry,
}

impl NicknameChallenge {
    pub fn new(player: Address) -> Self {
        Self { player, registry: NicknameRegistry::default() }
    }

    pub fn set_nickname(&mut self, caller: Address, nickname: Hash256) {
        self.registry.set_nickname(caller, nickname);
    }

    pub fn registry(&self) -> &NicknameRegistry {
        &self.registry
    }

    pub fn player(&self) -> Address {
        self.player
    }
}

impl Challenge for NicknameChallenge {
    fn is_solved(&self) -> bool {
        self.registry.nickname_of(&self.player).0[0] != 0
    }

    fn balance(&self) -> U256 {
        U256::zero()
    }
}
