//! The ether balance a challenge contract holds.

use cte_core::arith::Policy;
use cte_core::error::ChallengeError;
use cte_core::U256;

/// Contract ether. Payments in are checked; payments out fail when the
/// purse cannot cover them, the way a failed `transfer` reverts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Purse {
    balance: U256,
}

impl Purse {
    pub fn funded(amount: U256) -> Self {
        Self { balance: amount }
    }

    pub fn balance(&self) -> U256 {
        self.balance
    }

    pub fn is_empty(&self) -> bool {
        self.balance.is_zero()
    }

    /// Accept `amount` (a payable call or a forced send).
    pub fn receive(&mut self, amount: U256) -> Result<(), ChallengeError> {
        self.balance = Policy::Checked.add(self.balance, amount)?;
        Ok(())
    }

    /// Send `amount` out. Returns the amount sent.
    pub fn pay(&mut self, amount: U256) -> Result<U256, ChallengeError> {
        if amount > self.balance {
            return Err(ChallengeError::TransferFailed { amount, balance: self.balance });
        }
        self.balance -= amount;
        Ok(amount)
    }

    /// Send everything out.
    pub fn drain(&mut self) -> U256 {
        std::mem::take(&mut self.balance)
    }
}

/// Fail unless exactly `expected` wei is attached.
pub fn require_value(expected: U256, got: U256) -> Result<(), ChallengeError> {
    if got != expected {
        return Err(ChallengeError::IncorrectValue { expected, got });
    }
    Ok(())
}
