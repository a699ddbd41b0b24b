use cte_core::arith::Policy;
use cte_core::clock::Clock;
use cte_core::error::ChallengeError;
use cte_core::types::Address;
use cte_core::U256;

use crate::catalogue::Variant;
use crate::config::ChallengeConfig;
use crate::machine::Challenge;
use crate::purse::Purse;

/// Ether locked for the owner, with an early-withdrawal penalty the
/// beneficiary may collect. Solved once the fund is empty.
#[derive(Clone, Debug)]
pub struct RetirementFund {
    owner: Address,
    beneficiary: Address,
    start_balance: U256,
    expiration: u64,
    keep_percent: u64,
    purse: Purse,
    variant: Variant,
}

impl RetirementFund {
    pub fn new(
        owner: Address,
        beneficiary: Address,
        variant: Variant,
        cfg: &ChallengeConfig,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            owner,
            beneficiary,
            start_balance: cfg.funding,
            expiration: clock.timestamp().saturating_add(cfg.retirement_lock_secs),
            keep_percent: cfg.early_withdraw_keep_percent,
            purse: Purse::funded(cfg.funding),
            variant,
        }
    }

    /// Owner withdraws; before expiration only `keep_percent` of the fund.
    pub fn withdraw(&mut self, caller: Address, clock: &dyn Clock) -> Result<U256, ChallengeError> {
        if caller != self.owner {
            return Err(ChallengeError::NotOwner);
        }
        let balance = self.purse.balance();
        if clock.timestamp() < self.expiration {
            let kept = Policy::Checked.mul(balance, U256::from(self.keep_percent))? / 100;
            return self.purse.pay(kept);
        }
        self.purse.pay(balance)
    }

    /// Beneficiary takes what is left once the owner withdrew early.
    pub fn collect_penalty(&mut self, caller: Address) -> Result<U256, ChallengeError> {
        if caller != self.beneficiary {
            return Err(ChallengeError::NotBeneficiary);
        }
        let balance = self.purse.balance();
        let withdrawn = match self.variant {
            Variant::Vulnerable => Policy::Wrapping.sub(self.start_balance, balance)?,
            Variant::Fixed => {
                if balance > self.start_balance {
                    return Err(ChallengeError::BalanceExceedsStart);
                }
                self.start_balance - balance
            }
        };
        if withdrawn.is_zero() {
            return Err(ChallengeError::NoEarlyWithdrawal);
        }
        Ok(self.purse.drain())
    }

    /// Ether arriving without running contract code, as a self-destructing
    /// contract sends it.
    pub fn force_deposit(&mut self, amount: U256) -> Result<(), ChallengeError> {
        self.purse.receive(amount)
    }

    pub fn start_balance(&self) -> U256 {
        self.start_balance
    }

    pub fn expiration(&self) -> u64 {
        self.expiration
    }
}

impl Challenge for RetirementFund {
    fn is_solved(&self) -> bool {
        self.purse.is_empty()
    }

    fn balance(&self) -> U256 {
        self.purse.balance()
    }
}
