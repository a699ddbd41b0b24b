use cte_core::clock::Clock;
use cte_core::error::ChallengeError;
use cte_core::U256;

use super::current_block_answer;
use crate::config::ChallengeConfig;
use crate::machine::Challenge;
use crate::purse::{require_value, Purse};

/// The answer is derived from the block the guess lands in.
#[derive(Clone, Debug)]
pub struct GuessTheNewNumber {
    stake: U256,
    prize: U256,
    purse: Purse,
}

impl GuessTheNewNumber {
    pub fn new(cfg: &ChallengeConfig) -> Self {
        Self {
            stake: cfg.guess_stake,
            prize: cfg.guess_prize(),
            purse: Purse::funded(cfg.funding),
        }
    }

    pub fn guess(&mut self, n: u8, value: U256, clock: &dyn Clock) -> Result<U256, ChallengeError> {
        require_value(self.stake, value)?;
        let answer = current_block_answer(clock);
        self.purse.receive(value)?;
        if n == answer {
            return self.purse.pay(self.prize);
        }
        Ok(U256::zero())
    }
}

impl Challenge for GuessTheNewNumber {
    fn is_solved(&self) -> bool {
        self.purse.is_empty()
    }

    fn balance(&self) -> U256 {
        self.purse.balance()
    }
}
