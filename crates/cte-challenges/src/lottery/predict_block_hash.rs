use cte_core::clock::Clock;
use cte_core::constants::BLOCK_HASH_HISTORY;
use cte_core::error::ChallengeError;
use cte_core::types::{Address, Hash256};
use cte_core::U256;

use crate::config::ChallengeConfig;
use crate::machine::Challenge;
use crate::purse::{require_value, Purse};

/// A locked block-hash guess awaiting settlement.
#[derive(Clone, Debug)]
struct LockedHash {
    guesser: Address,
    guess: Hash256,
    settlement_block: u64,
}

#[derive(Clone, Debug)]
struct HashLottery {
    lock: Option<LockedHash>,
    stake: U256,
    prize: U256,
    purse: Purse,
}

impl HashLottery {
    fn new(cfg: &ChallengeConfig) -> Self {
        Self {
            lock: None,
            stake: cfg.guess_stake,
            prize: cfg.guess_prize(),
            purse: Purse::funded(cfg.funding),
        }
    }

    fn lock_in_guess(
        &mut self,
        caller: Address,
        hash: Hash256,
        value: U256,
        clock: &dyn Clock,
    ) -> Result<(), ChallengeError> {
        if self.lock.is_some() {
            return Err(ChallengeError::GuessAlreadyLocked);
        }
        require_value(self.stake, value)?;
        self.purse.receive(value)?;
        self.lock = Some(LockedHash {
            guesser: caller,
            guess: hash,
            settlement_block: clock.block_number().saturating_add(1),
        });
        Ok(())
    }

    fn settleable(&self, caller: Address, clock: &dyn Clock) -> Result<&LockedHash, ChallengeError> {
        let lock = self
            .lock
            .as_ref()
            .filter(|l| l.guesser == caller)
            .ok_or(ChallengeError::NotGuesser)?;
        if clock.block_number() <= lock.settlement_block {
            return Err(ChallengeError::SettlementTooEarly);
        }
        Ok(lock)
    }

    fn resolve(&mut self, guess: Hash256, answer: Hash256) -> Result<U256, ChallengeError> {
        self.lock = None;
        if guess == answer {
            return self.purse.pay(self.prize);
        }
        Ok(U256::zero())
    }
}

/// Guess the hash of the next block.
///
/// Settlement reads `blockhash(settlement)`, which is zero once the block
/// leaves the 256-block history window.
#[derive(Clone, Debug)]
pub struct PredictTheBlockHash {
    inner: HashLottery,
}

impl PredictTheBlockHash {
    pub fn new(cfg: &ChallengeConfig) -> Self {
        Self { inner: HashLottery::new(cfg) }
    }

    pub fn lock_in_guess(
        &mut self,
        caller: Address,
        hash: Hash256,
        value: U256,
        clock: &dyn Clock,
    ) -> Result<(), ChallengeError> {
        self.inner.lock_in_guess(caller, hash, value, clock)
    }

    pub fn settle(&mut self, caller: Address, clock: &dyn Clock) -> Result<U256, ChallengeError> {
        let lock = self.inner.settleable(caller, clock)?;
        let (guess, answer) = (lock.guess, clock.blockhash_or_zero(lock.settlement_block));
        self.inner.resolve(guess, answer)
    }

    /// Zero when nothing is locked.
    pub fn settlement_block(&self) -> u64 {
        self.inner.lock.as_ref().map_or(0, |l| l.settlement_block)
    }
}

impl Challenge for PredictTheBlockHash {
    fn is_solved(&self) -> bool {
        self.inner.purse.is_empty()
    }

    fn balance(&self) -> U256 {
        self.inner.purse.balance()
    }
}

/// Refuses to settle against a block outside the history window or a zero
/// hash.
#[derive(Clone, Debug)]
pub struct PredictTheBlockHashFixed {
    inner: HashLottery,
}

impl PredictTheBlockHashFixed {
    pub fn new(cfg: &ChallengeConfig) -> Self {
        Self { inner: HashLottery::new(cfg) }
    }

    pub fn lock_in_guess(
        &mut self,
        caller: Address,
        hash: Hash256,
        value: U256,
        clock: &dyn Clock,
    ) -> Result<(), ChallengeError> {
        self.inner.lock_in_guess(caller, hash, value, clock)
    }

    pub fn settle(&mut self, caller: Address, clock: &dyn Clock) -> Result<U256, ChallengeError> {
        let lock = self.inner.settleable(caller, clock)?;
        if clock.block_number() > lock.settlement_block.saturating_add(BLOCK_HASH_HISTORY) {
            return Err(ChallengeError::BlockTooOld);
        }
        let answer = clock.blockhash_or_zero(lock.settlement_block);
        if answer.is_zero() {
            return Err(ChallengeError::BlockHashUnavailable);
        }
        let guess = lock.guess;
        self.inner.resolve(guess, answer)
    }

    pub fn settlement_block(&self) -> u64 {
        self.inner.lock.as_ref().map_or(0, |l| l.settlement_block)
    }
}

impl Challenge for PredictTheBlockHashFixed {
    fn is_solved(&self) -> bool {
        self.inner.purse.is_empty()
    }

    fn balance(&self) -> U256 {
        self.inner.purse.balance()
    }
}
