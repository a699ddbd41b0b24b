use cte_core::clock::Clock;
use cte_core::error::ChallengeError;
use cte_core::types::{Address, Hash256};
use cte_core::U256;

use super::{current_block_answer, CommitRevealLottery};
use crate::config::ChallengeConfig;
use crate::machine::Challenge;
use crate::purse::{require_value, Purse};

/// Guess a digit now, settle it against a block-derived digit later.
///
/// `settle` may be called in any block after the settlement block, and a
/// losing settle only clears the guess. A caller that can abort a losing
/// settle gets unlimited retries.
#[derive(Clone, Debug)]
pub struct PredictTheFuture {
    guesser: Address,
    guess: u8,
    settlement_block: u64,
    stake: U256,
    prize: U256,
    purse: Purse,
}

impl PredictTheFuture {
    pub fn new(cfg: &ChallengeConfig) -> Self {
        Self {
            guesser: Address::ZERO,
            guess: 0,
            settlement_block: 0,
            stake: cfg.guess_stake,
            prize: cfg.guess_prize(),
            purse: Purse::funded(cfg.funding),
        }
    }

    /// Lock `n` (0 through 9) for settlement in the next block.
    pub fn lock_in_guess(
        &mut self,
        caller: Address,
        n: u8,
        value: U256,
        clock: &dyn Clock,
    ) -> Result<(), ChallengeError> {
        if !self.guesser.is_zero() {
            return Err(ChallengeError::GuessAlreadyLocked);
        }
        if n > 9 {
            return Err(ChallengeError::GuessOutOfRange(U256::from(n)));
        }
        require_value(self.stake, value)?;
        self.purse.receive(value)?;
        self.guesser = caller;
        self.guess = n;
        self.settlement_block = clock.block_number().saturating_add(1);
        Ok(())
    }

    /// Resolve the locked guess. Returns the payout.
    pub fn settle(&mut self, caller: Address, clock: &dyn Clock) -> Result<U256, ChallengeError> {
        if self.guesser.is_zero() || caller != self.guesser {
            return Err(ChallengeError::NotGuesser);
        }
        if clock.block_number() <= self.settlement_block {
            return Err(ChallengeError::SettlementTooEarly);
        }
        let answer = current_block_answer(clock) % 10;
        self.guesser = Address::ZERO;
        if self.guess == answer {
            return self.purse.pay(self.prize);
        }
        Ok(U256::zero())
    }

    pub fn guesser(&self) -> Address {
        self.guesser
    }

    pub fn guess(&self) -> u8 {
        self.guess
    }

    pub fn settlement_block(&self) -> u64 {
        self.settlement_block
    }
}

impl Challenge for PredictTheFuture {
    fn is_solved(&self) -> bool {
        self.purse.is_empty()
    }

    fn balance(&self) -> U256 {
        self.purse.balance()
    }
}

/// Commit-reveal replacement. `lock_in_guess` only opens after the reveal
/// and settles immediately.
#[derive(Clone, Debug)]
pub struct PredictTheFutureFixed {
    lottery: CommitRevealLottery,
}

impl PredictTheFutureFixed {
    pub fn new(owner: Address, cfg: &ChallengeConfig) -> Self {
        Self { lottery: CommitRevealLottery::new(owner, cfg) }
    }

    pub fn commit(&mut self, caller: Address, hash: Hash256, clock: &dyn Clock) -> Result<(), ChallengeError> {
        self.lottery.commit(caller, hash, clock)
    }

    pub fn reveal(&mut self, value: u8, salt: &Hash256, clock: &dyn Clock) -> Result<u8, ChallengeError> {
        self.lottery.reveal(value, salt, clock)
    }

    pub fn lock_in_guess(&mut self, caller: Address, n: u8, value: U256) -> Result<U256, ChallengeError> {
        self.lottery.guess(caller, n, value)
    }

    pub fn has_guessed(&self, account: &Address) -> bool {
        self.lottery.has_guessed(account)
    }

    pub fn lottery(&self) -> &CommitRevealLottery {
        &self.lottery
    }
}

impl Challenge for PredictTheFutureFixed {
    fn is_solved(&self) -> bool {
        self.lottery.is_solved()
    }

    fn balance(&self) -> U256 {
        self.lottery.balance()
    }
}
