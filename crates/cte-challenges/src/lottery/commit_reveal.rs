use std::collections::BTreeSet;

use cte_core::clock::Clock;
use cte_core::commitment::Commitment;
use cte_core::error::ChallengeError;
use cte_core::types::{Address, Hash256};
use cte_core::U256;

use crate::config::ChallengeConfig;
use crate::machine::Challenge;
use crate::purse::{require_value, Purse};

/// A lottery whose answer is committed by the owner before anyone plays
/// and revealed only after the reveal delay.
///
/// Each address gets one guess; the first correct guess takes the whole
/// purse and closes the lottery.
#[derive(Clone, Debug)]
pub struct CommitRevealLottery {
    owner: Address,
    commitment: Commitment,
    guessed: BTreeSet<Address>,
    purse: Purse,
    stake: U256,
    complete: bool,
}

impl CommitRevealLottery {
    pub fn new(owner: Address, cfg: &ChallengeConfig) -> Self {
        Self {
            owner,
            commitment: Commitment::new(cfg.reveal_delay_secs),
            guessed: BTreeSet::new(),
            purse: Purse::funded(cfg.funding),
            stake: cfg.guess_stake,
            complete: false,
        }
    }

    /// Owner commits `keccak256(uint8 answer, bytes32 salt)`.
    pub fn commit(&mut self, caller: Address, hash: Hash256, clock: &dyn Clock) -> Result<(), ChallengeError> {
        if caller != self.owner {
            return Err(ChallengeError::NotOwner);
        }
        self.commitment.commit(hash, clock.timestamp())?;
        Ok(())
    }

    /// Anyone holding the preimage may reveal once the delay has passed.
    pub fn reveal(&mut self, value: u8, salt: &Hash256, clock: &dyn Clock) -> Result<u8, ChallengeError> {
        Ok(self.commitment.reveal(value, salt, clock.timestamp())?)
    }

    /// Stake on `n`. Returns the payout, zero for a wrong guess.
    pub fn guess(&mut self, caller: Address, n: u8, value: U256) -> Result<U256, ChallengeError> {
        if !self.commitment.is_revealed() {
            return Err(ChallengeError::NotRevealed);
        }
        if self.complete {
            return Err(ChallengeError::AlreadyCompleted);
        }
        if self.guessed.contains(&caller) {
            return Err(ChallengeError::AlreadyGuessed);
        }
        require_value(self.stake, value)?;
        self.purse.receive(value)?;
        self.guessed.insert(caller);
        if Some(n) == self.commitment.revealed_value() {
            self.complete = true;
            return Ok(self.purse.drain());
        }
        Ok(U256::zero())
    }

    pub fn has_guessed(&self, account: &Address) -> bool {
        self.guessed.contains(account)
    }

    pub fn commitment(&self) -> Hash256 {
        self.commitment.hash()
    }

    pub fn revealed(&self) -> bool {
        self.commitment.is_revealed()
    }

    /// Zero until revealed.
    pub fn answer(&self) -> u8 {
        self.commitment.answer()
    }

    pub fn challenge_complete(&self) -> bool {
        self.complete
    }

    pub fn owner(&self) -> Address {
        self.owner
    }
}

impl Challenge for CommitRevealLottery {
    fn is_solved(&self) -> bool {
        self.complete
    }

    fn balance(&self) -> U256 {
        self.purse.balance()
    }
}
