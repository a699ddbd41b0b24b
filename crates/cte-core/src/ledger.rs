//! Token balances, allowances and the ether reserve backing them.
//!
//! Every operation takes a [`Policy`]: checked operations reject anything
//! that would overflow, underflow or overdraw, while wrapping operations
//! reproduce pre-0.8 contract behaviour. Each operation computes all new
//! values before writing any of them, so a failure leaves the ledger
//! untouched.
//!
//! # Invariants
//!
//! - Under [`Policy::Checked`] token balances sum to the minted supply.
//! - `transfer_from` debits `from` and never the spender.

use std::collections::BTreeMap;

use primitive_types::U256;

use crate::arith::Policy;
use crate::error::LedgerError;
use crate::types::Address;

/// Named token balances plus the ether the owning contract holds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    balances: BTreeMap<Address, U256>,
    allowances: BTreeMap<(Address, Address), U256>,
    reserve: U256,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token balance of `account`.
    pub fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Remaining allowance `owner` granted `spender`.
    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// Ether held by the contract.
    pub fn reserve(&self) -> U256 {
        self.reserve
    }

    /// Sum of all token balances, or `None` if it exceeds 256 bits (which
    /// only wrapping arithmetic can produce).
    pub fn total_balances(&self) -> Option<U256> {
        self.balances
            .values()
            .try_fold(U256::zero(), |acc, v| acc.checked_add(*v))
    }

    /// Accounts with a non-zero token balance.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &U256)> {
        self.balances.iter()
    }

    fn write_balance(&mut self, account: Address, value: U256) {
        if value.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, value);
        }
    }

    fn write_allowance(&mut self, owner: Address, spender: Address, value: U256) {
        if value.is_zero() {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), value);
        }
    }

    /// Mint `amount` tokens to `account`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Arithmetic`] if checked and the balance overflows
    pub fn mint(&mut self, account: Address, amount: U256, policy: Policy) -> Result<(), LedgerError> {
        let credited = policy.add(self.balance_of(&account), amount)?;
        self.write_balance(account, credited);
        Ok(())
    }

    /// Accept `amount` of ether into the reserve.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Arithmetic`] if the reserve would overflow
    pub fn deposit(&mut self, amount: U256) -> Result<(), LedgerError> {
        self.reserve = Policy::Checked.add(self.reserve, amount)?;
        Ok(())
    }

    /// Pay `amount` of ether out of the reserve.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InsufficientReserve`] if the reserve cannot cover it
    pub fn withdraw(&mut self, amount: U256) -> Result<(), LedgerError> {
        if amount > self.reserve {
            return Err(LedgerError::InsufficientReserve { have: self.reserve, need: amount });
        }
        self.reserve -= amount;
        Ok(())
    }

    /// Buy `count` tokens at `price` each, paying `payment`.
    ///
    /// The cost `count * price` is computed under `policy`, so a wrapping
    /// ledger accepts a tiny payment for an overflowing count.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::IncorrectPayment`] if `payment != count * price`
    /// - [`LedgerError::Arithmetic`] if checked and the cost or balance overflows
    pub fn buy(
        &mut self,
        buyer: Address,
        count: U256,
        payment: U256,
        price: U256,
        policy: Policy,
    ) -> Result<(), LedgerError> {
        let cost = policy.mul(count, price)?;
        if payment != cost {
            return Err(LedgerError::IncorrectPayment);
        }
        let credited = policy.add(self.balance_of(&buyer), count)?;
        let reserve = Policy::Checked.add(self.reserve, payment)?;
        self.write_balance(buyer, credited);
        self.reserve = reserve;
        Ok(())
    }

    /// Sell `count` tokens back at `price` each. Returns the ether paid out.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InsufficientBalance`] if checked and `balance < count`
    /// - [`LedgerError::Arithmetic`] if checked and the payout overflows
    /// - [`LedgerError::InsufficientReserve`] if the reserve cannot cover the payout
    pub fn sell(
        &mut self,
        seller: Address,
        count: U256,
        price: U256,
        policy: Policy,
    ) -> Result<U256, LedgerError> {
        let debited = policy
            .sub(self.balance_of(&seller), count)
            .map_err(|_| LedgerError::InsufficientBalance)?;
        let payout = policy.mul(count, price)?;
        if payout > self.reserve {
            return Err(LedgerError::InsufficientReserve { have: self.reserve, need: payout });
        }
        self.write_balance(seller, debited);
        self.reserve -= payout;
        Ok(payout)
    }

    /// Move `amount` tokens from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InsufficientBalance`] if checked and `balance[from] < amount`
    /// - [`LedgerError::Arithmetic`] if checked and `balance[to]` overflows
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
        policy: Policy,
    ) -> Result<(), LedgerError> {
        let debited = policy
            .sub(self.balance_of(&from), amount)
            .map_err(|_| LedgerError::InsufficientBalance)?;
        let to_before = if from == to { debited } else { self.balance_of(&to) };
        let credited = policy.add(to_before, amount)?;
        self.write_balance(from, debited);
        self.write_balance(to, credited);
        Ok(())
    }

    /// Set the allowance `owner` grants `spender`, replacing any previous one.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.write_allowance(owner, spender, amount);
    }

    /// Consume `amount` of the allowance `owner` granted `spender`.
    ///
    /// The allowance check holds under every arithmetic policy.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InsufficientAllowance`] if the allowance is short
    pub fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(&owner, &spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance);
        }
        self.write_allowance(owner, spender, allowance - amount);
        Ok(())
    }

    /// `spender` moves `amount` tokens from `from` to `to` using its
    /// allowance. `balance[spender]` is untouched unless `spender == to`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InsufficientAllowance`] if the allowance is short
    /// - [`LedgerError::InsufficientBalance`] if checked and `balance[from] < amount`
    /// - [`LedgerError::Arithmetic`] if checked and `balance[to]` overflows
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
        policy: Policy,
    ) -> Result<(), LedgerError> {
        let mut draft = self.clone();
        draft.spend_allowance(from, spender, amount)?;
        draft.transfer(from, to, amount, policy)?;
        *self = draft;
        Ok(())
    }
}
