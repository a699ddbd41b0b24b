use cte_core::clock::Clock;
use cte_core::error::ChallengeError;
use cte_core::U256;

use super::current_block_answer;
use crate::config::ChallengeConfig;
use crate::machine::Challenge;
use crate::purse::{require_value, Purse};

/// The answer is derived from the deploy block and kept in slot 0.
#[derive(Clone, Debug)]
pub struct GuessTheRandomNumber {
    answer: u8,
    stake: U256,
    prize: U256,
    purse: Purse,
}

impl GuessTheRandomNumber {
    /// Deploy in the block `clock` is executing.
    pub fn deploy(cfg: &ChallengeConfig, clock: &dyn Clock) -> Self {
        Self {
            answer: current_block_answer(clock),
            stake: cfg.guess_stake,
            prize: cfg.guess_prize(),
            purse: Purse::funded(cfg.funding),
        }
    }

    pub fn guess(&mut self, n: u8, value: U256) -> Result<U256, ChallengeError> {
        require_value(self.stake, value)?;
        self.purse.receive(value)?;
        if n == self.answer {
            return self.purse.pay(self.prize);
        }
        Ok(U256::zero())
    }

    /// Raw storage read. Private variables are still public on chain.
    pub fn read_storage(&self, slot: U256) -> U256 {
        if slot.is_zero() { U256::from(self.answer) } else { U256::zero() }
    }
}

impl Challenge for GuessTheRandomNumber {
    fn is_solved(&self) -> bool {
        self.purse.is_empty()
    }

    fn balance(&self) -> U256 {
        self.purse.balance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cte_core::clock::SimClock;
    use cte_core::constants::ETHER;

    use crate::lottery::block_derived_answer;
    use crate::machine::Machine;

    #[test]
    fn answer_sits_in_slot_zero() {
        let mut clock = SimClock::default();
        clock.mine(10).unwrap();
        let c = GuessTheRandomNumber::deploy(&ChallengeConfig::default(), &clock);
        let expected = block_derived_answer(clock.hash_of(10), clock.timestamp());
        assert_eq!(c.read_storage(U256::zero()), U256::from(expected));
        assert_eq!(c.read_storage(U256::one()), U256::zero());
    }

    #[test]
    fn reading_storage_wins() {
        let clock = SimClock::default();
        let mut m = Machine::new(GuessTheRandomNumber::deploy(&ChallengeConfig::default(), &clock));
        let n = m.state().read_storage(U256::zero()).low_u32() as u8;
        assert_eq!(m.execute(|c| c.guess(n, ETHER)), Ok(ETHER * 2));
        assert!(m.is_complete());
    }
}
