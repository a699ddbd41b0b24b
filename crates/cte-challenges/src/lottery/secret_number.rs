use std::collections::BTreeMap;

use cte_core::clock::Clock;
use cte_core::commitment::{keccak256, pack, Token};
use cte_core::error::{ChallengeError, CommitError};
use cte_core::types::{Address, Hash256};
use cte_core::U256;

use crate::config::ChallengeConfig;
use crate::machine::Challenge;
use crate::purse::{require_value, Purse};

/// `keccak256(uint8 170)`, the published answer hash.
const SECRET_ANSWER_HASH: [u8; 32] = [
    0xdb, 0x81, 0xb4, 0xd5, 0x85, 0x95, 0xfb, 0xbb, 0xb5, 0x92, 0xd3, 0x66, 0x1a, 0x34, 0xcd, 0xca,
    0x14, 0xd7, 0xab, 0x37, 0x94, 0x41, 0x40, 0x0c, 0xbf, 0xa1, 0xb7, 0x8b, 0xc4, 0x47, 0xc3, 0x65,
];

/// Only the hash of a `uint8` answer is stored. 256 candidates.
#[derive(Clone, Debug)]
pub struct GuessTheSecretNumber {
    answer_hash: Hash256,
    stake: U256,
    prize: U256,
    purse: Purse,
}

impl GuessTheSecretNumber {
    pub fn new(cfg: &ChallengeConfig) -> Self {
        Self {
            answer_hash: Hash256(SECRET_ANSWER_HASH),
            stake: cfg.guess_stake,
            prize: cfg.guess_prize(),
            purse: Purse::funded(cfg.funding),
        }
    }

    pub fn guess(&mut self, n: u8, value: U256) -> Result<U256, ChallengeError> {
        require_value(self.stake, value)?;
        self.purse.receive(value)?;
        if keccak256(pack(&[Token::Uint8(n)])) == self.answer_hash {
            return self.purse.pay(self.prize);
        }
        Ok(U256::zero())
    }

    pub fn answer_hash(&self) -> Hash256 {
        self.answer_hash
    }
}

impl Challenge for GuessTheSecretNumber {
    fn is_solved(&self) -> bool {
        self.purse.is_empty()
    }

    fn balance(&self) -> U256 {
        self.purse.balance()
    }
}

/// Per-address guessing state reported by
/// [`GuessTheSecretNumberFixed::player_info`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerInfo {
    pub attempts: u32,
    pub last_attempt: u64,
    pub can_attempt: bool,
}

/// `uint256` preimage, capped attempts and a per-address cooldown.
#[derive(Clone, Debug)]
pub struct GuessTheSecretNumberFixed {
    owner: Address,
    answer_hash: Option<Hash256>,
    players: BTreeMap<Address, PlayerInfo>,
    stake: U256,
    max_attempts: u32,
    cooldown: u64,
    purse: Purse,
    complete: bool,
}

impl GuessTheSecretNumberFixed {
    pub fn new(owner: Address, cfg: &ChallengeConfig) -> Self {
        Self {
            owner,
            answer_hash: None,
            players: BTreeMap::new(),
            stake: cfg.secret_guess_stake,
            max_attempts: cfg.max_guess_attempts,
            cooldown: cfg.guess_cooldown_secs,
            purse: Purse::funded(cfg.funding),
            complete: false,
        }
    }

    /// Owner sets `keccak256(uint256 answer)` once.
    pub fn set_answer_hash(&mut self, caller: Address, hash: Hash256) -> Result<(), ChallengeError> {
        if caller != self.owner {
            return Err(ChallengeError::NotOwner);
        }
        if self.answer_hash.is_some() {
            return Err(CommitError::AlreadyCommitted.into());
        }
        self.answer_hash = Some(hash);
        Ok(())
    }

    /// Spend one attempt on `n`. A correct guess takes the whole purse.
    pub fn guess(
        &mut self,
        caller: Address,
        n: U256,
        value: U256,
        clock: &dyn Clock,
    ) -> Result<U256, ChallengeError> {
        let answer_hash = self.answer_hash.ok_or(ChallengeError::AnswerHashNotSet)?;
        if self.complete {
            return Err(ChallengeError::AlreadyCompleted);
        }
        let now = clock.timestamp();
        let info = self.players.get(&caller).copied().unwrap_or_default();
        if info.attempts >= self.max_attempts {
            return Err(ChallengeError::MaxAttemptsReached);
        }
        if info.attempts > 0 && now < info.last_attempt.saturating_add(self.cooldown) {
            return Err(ChallengeError::CooldownActive);
        }
        require_value(self.stake, value)?;
        self.purse.receive(value)?;
        self.players.insert(
            caller,
            PlayerInfo { attempts: info.attempts + 1, last_attempt: now, can_attempt: false },
        );
        if keccak256(pack(&[Token::Uint256(n)])) == answer_hash {
            self.complete = true;
            return Ok(self.purse.drain());
        }
        Ok(U256::zero())
    }

    pub fn attempts(&self, account: &Address) -> u32 {
        self.players.get(account).map_or(0, |p| p.attempts)
    }

    pub fn player_info(&self, account: &Address, clock: &dyn Clock) -> PlayerInfo {
        let info = self.players.get(account).copied().unwrap_or_default();
        let cooled = info.attempts == 0
            || clock.timestamp() >= info.last_attempt.saturating_add(self.cooldown);
        PlayerInfo {
            can_attempt: info.attempts < self.max_attempts && cooled,
            ..info
        }
    }

    /// [`Hash256::ZERO`] until set.
    pub fn answer_hash(&self) -> Hash256 {
        self.answer_hash.unwrap_or_default()
    }
}

impl Challenge for GuessTheSecretNumberFixed {
    fn is_solved(&self) -> bool {
        self.complete
    }

    fn balance(&self) -> U256 {
        self.purse.balance()
    }
}
