use cte_core::constants::GUESS_THE_NUMBER_ANSWER;
use cte_core::error::ChallengeError;
use cte_core::U256;

use crate::config::ChallengeConfig;
use crate::machine::Challenge;
use crate::purse::{require_value, Purse};

/// The answer is a constant anyone can read.
#[derive(Clone, Debug)]
pub struct GuessTheNumber {
    answer: u8,
    stake: U256,
    prize: U256,
    purse: Purse,
}

impl GuessTheNumber {
    pub fn new(cfg: &ChallengeConfig) -> Self {
        Self {
            answer: GUESS_THE_NUMBER_ANSWER,
            stake: cfg.guess_stake,
            prize: cfg.guess_prize(),
            purse: Purse::funded(cfg.funding),
        }
    }

    /// Stake on `n`; a match pays the prize. Returns the payout.
    pub fn guess(&mut self, n: u8, value: U256) -> Result<U256, ChallengeError> {
        require_value(self.stake, value)?;
        self.purse.receive(value)?;
        if n == self.answer {
            return self.purse.pay(self.prize);
        }
        Ok(U256::zero())
    }

    /// Public state: the hard-coded answer.
    pub fn answer(&self) -> u8 {
        self.answer
    }
}

impl Challenge for GuessTheNumber {
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
    use cte_core::constants::ETHER;

    use crate::machine::Machine;

    #[test]
    fn correct_guess_empties_contract() {
        let mut m = Machine::new(GuessTheNumber::new(&ChallengeConfig::default()));
        let answer = m.state().answer();
        assert_eq!(m.execute(|c| c.guess(answer, ETHER)), Ok(ETHER * 2));
        assert!(m.is_complete());
        assert_eq!(m.balance(), U256::zero());
    }

    #[test]
    fn wrong_guess_keeps_stake() {
        let mut m = Machine::new(GuessTheNumber::new(&ChallengeConfig::default()));
        assert_eq!(m.execute(|c| c.guess(41, ETHER)), Ok(U256::zero()));
        assert!(!m.is_complete());
        assert_eq!(m.balance(), ETHER * 2);
    }

    #[test]
    fn stake_is_exact() {
        let mut m = Machine::new(GuessTheNumber::new(&ChallengeConfig::default()));
        assert_eq!(
            m.execute(|c| c.guess(42, ETHER + 1)),
            Err(ChallengeError::IncorrectValue { expected: ETHER, got: ETHER + 1 })
        );
        assert_eq!(m.balance(), ETHER);
    }
}
