use cte_core::arith::Policy;
use cte_core::error::{ChallengeError, LedgerError};
use cte_core::ledger::Ledger;
use cte_core::types::Address;
use cte_core::U256;

use crate::catalogue::Variant;
use crate::config::ChallengeConfig;
use crate::machine::Challenge;

/// An ERC20-style token whose whole supply starts with the player.
/// Solved once the player holds the target balance.
#[derive(Clone, Debug)]
pub struct TokenWhale {
    player: Address,
    ledger: Ledger,
    target: U256,
    variant: Variant,
}

impl TokenWhale {
    pub fn new(player: Address, variant: Variant, cfg: &ChallengeConfig) -> Result<Self, ChallengeError> {
        let mut ledger = Ledger::new();
        ledger.mint(player, U256::from(cfg.whale_initial_supply), Policy::Checked)?;
        Ok(Self {
            player,
            ledger,
            target: U256::from(cfg.whale_target_balance),
            variant,
        })
    }

    pub fn transfer(&mut self, caller: Address, to: Address, amount: U256) -> Result<(), ChallengeError> {
        self.ledger.transfer(caller, to, amount, Policy::Checked)?;
        Ok(())
    }

    pub fn approve(&mut self, caller: Address, spender: Address, amount: U256) {
        self.ledger.approve(caller, spender, amount);
    }

    /// Move `amount` of `from`'s tokens to `to` using `caller`'s allowance.
    ///
    /// The vulnerable variant validates `from` but debits `caller`.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), ChallengeError> {
        match self.variant {
            Variant::Fixed => {
                self.ledger.transfer_from(caller, from, to, amount, Policy::Checked)?;
            }
            Variant::Vulnerable => {
                if self.ledger.balance_of(&from) < amount {
                    return Err(LedgerError::InsufficientBalance.into());
                }
                Policy::Checked.add(self.ledger.balance_of(&to), amount)?;
                self.ledger.spend_allowance(from, caller, amount)?;
                self.ledger.transfer(caller, to, amount, Policy::Wrapping)?;
            }
        }
        Ok(())
    }

    pub fn balance_of(&self, account: &Address) -> U256 {
        self.ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }

    pub fn player(&self) -> Address {
        self.player
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

impl Challenge for TokenWhale {
    fn is_solved(&self) -> bool {
        self.ledger.balance_of(&self.player) >= self.target
    }

    fn balance(&self) -> U256 {
        U256::zero()
    }
}
