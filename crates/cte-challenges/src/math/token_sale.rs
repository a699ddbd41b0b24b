use cte_core::arith::Policy;
use cte_core::error::ChallengeError;
use cte_core::ledger::Ledger;
use cte_core::types::Address;
use cte_core::U256;

use crate::catalogue::Variant;
use crate::config::ChallengeConfig;
use crate::machine::Challenge;

/// Tokens for ether at a fixed price. Solved once the reserve holds less
/// than one token's price.
#[derive(Clone, Debug)]
pub struct TokenSale {
    ledger: Ledger,
    price: U256,
    buy_policy: Policy,
}

impl TokenSale {
    /// # Errors
    ///
    /// Fails only if the funding overflows the reserve.
    pub fn new(variant: Variant, cfg: &ChallengeConfig) -> Result<Self, ChallengeError> {
        let mut ledger = Ledger::new();
        ledger.deposit(cfg.funding)?;
        let buy_policy = match variant {
            Variant::Vulnerable => Policy::Wrapping,
            Variant::Fixed => Policy::Checked,
        };
        Ok(Self { ledger, price: cfg.token_price, buy_policy })
    }

    /// Buy `count` tokens, paying `value` wei.
    pub fn buy(&mut self, caller: Address, count: U256, value: U256) -> Result<(), ChallengeError> {
        self.ledger.buy(caller, count, value, self.price, self.buy_policy)?;
        Ok(())
    }

    /// Sell `count` tokens back. Returns the ether paid out.
    pub fn sell(&mut self, caller: Address, count: U256) -> Result<U256, ChallengeError> {
        Ok(self.ledger.sell(caller, count, self.price, Policy::Checked)?)
    }

    pub fn balance_of(&self, account: &Address) -> U256 {
        self.ledger.balance_of(account)
    }

    pub fn price(&self) -> U256 {
        self.price
    }

    pub fn buy_policy(&self) -> Policy {
        self.buy_policy
    }
}

impl Challenge for TokenSale {
    fn is_solved(&self) -> bool {
        self.ledger.reserve() < self.price
    }

    fn balance(&self) -> U256 {
        self.ledger.reserve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cte_core::constants::ETHER;
    use cte_core::error::{ArithmeticError, LedgerError};

    use crate::machine::Machine;

    fn player() -> Address {
        Address::repeat_byte(0x01)
    }

    /// Smallest count whose cost overflows, and the wrapped cost.
    fn overflow_buy() -> (U256, U256) {
        let count = U256::MAX / ETHER + 1;
        let (cost, _) = count.overflowing_mul(ETHER);
        (count, cost)
    }

    #[test]
    fn honest_buy_and_sell() {
        let mut m = Machine::new(TokenSale::new(Variant::Fixed, &ChallengeConfig::default()).unwrap());
        m.execute(|c| c.buy(player(), U256::from(2u8), ETHER * 2)).unwrap();
        assert_eq!(m.state().balance_of(&player()), U256::from(2u8));
        assert_eq!(m.execute(|c| c.sell(player(), U256::one())), Ok(ETHER));
        assert_eq!(m.balance(), ETHER * 2);
        assert!(!m.is_complete());
    }

    #[test]
    fn wrong_payment_rejected() {
        let mut m = Machine::new(TokenSale::new(Variant::Vulnerable, &ChallengeConfig::default()).unwrap());
        assert_eq!(
            m.execute(|c| c.buy(player(), U256::one(), ETHER / 2)).unwrap_err().to_string(),
            "Incorrect payment"
        );
    }

    #[test]
    fn overflowing_buy_drains_vulnerable() {
        let mut m = Machine::new(TokenSale::new(Variant::Vulnerable, &ChallengeConfig::default()).unwrap());
        let (count, cost) = overflow_buy();
        assert!(cost < ETHER);
        m.execute(|c| c.buy(player(), count, cost)).unwrap();
        m.execute(|c| c.sell(player(), U256::one())).unwrap();
        assert!(m.is_complete());
        assert_eq!(m.balance(), cost);
    }

    #[test]
    fn overflowing_buy_rejected_when_fixed() {
        let mut m = Machine::new(TokenSale::new(Variant::Fixed, &ChallengeConfig::default()).unwrap());
        let (count, cost) = overflow_buy();
        assert_eq!(
            m.execute(|c| c.buy(player(), count, cost)),
            Err(ChallengeError::Ledger(LedgerError::Arithmetic(ArithmeticError::Overflow)))
        );
        assert_eq!(m.state().balance_of(&player()), U256::zero());
    }

    #[test]
    fn selling_without_tokens_fails() {
        let mut m = Machine::new(TokenSale::new(Variant::Vulnerable, &ChallengeConfig::default()).unwrap());
        assert_eq!(
            m.execute(|c| c.sell(player(), U256::one())).unwrap_err().to_string(),
            "Insufficient balance"
        );
    }
}
