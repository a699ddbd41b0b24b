//! Fixed-width unsigned arithmetic under a wrapping or checked policy.
//!
//! Values are carried in a [`U256`] and interpreted as `W`-bit unsigned
//! integers, `1 <= W <= 256`. The wrapping policy reduces every result
//! modulo `2^W`, which is how pre-0.8 contract arithmetic behaves; the
//! checked policy rejects any result that does not fit.
//!
//! # Invariants
//!
//! - Operands must already fit in `W` bits; wider operands are rejected
//!   rather than silently truncated.
//! - Every function here is pure.

use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};

use crate::error::ArithmeticError;

/// Overflow behaviour applied to an arithmetic operation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Results are reduced modulo `2^W`.
    Wrapping,
    /// Out-of-range results fail with overflow/underflow.
    #[default]
    Checked,
}

/// Bit width of an unsigned integer type.
///
/// # Examples
///
/// ```
/// use cte_core::arith::{Policy, Width};
/// use cte_core::U256;
///
/// let sum = Width::U8.add(U256::from(250u8), U256::from(10u8), Policy::Wrapping).unwrap();
/// assert_eq!(sum, U256::from(4u8));
/// assert!(Width::U8.add(U256::from(250u8), U256::from(10u8), Policy::Checked).is_err());
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Width(u16);

impl Width {
    pub const U8: Self = Self(8);
    pub const U64: Self = Self(64);
    pub const U256: Self = Self(256);

    /// A width of `bits` bits.
    ///
    /// # Errors
    ///
    /// - [`ArithmeticError::InvalidWidth`] unless `1 <= bits <= 256`
    pub fn new(bits: u16) -> Result<Self, ArithmeticError> {
        if bits == 0 || bits > 256 {
            return Err(ArithmeticError::InvalidWidth(bits));
        }
        Ok(Self(bits))
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Largest representable value, `2^W - 1`.
    pub fn max_value(&self) -> U256 {
        if self.0 == 256 {
            U256::MAX
        } else {
            (U256::one() << self.0 as usize) - U256::one()
        }
    }

    /// Whether `value` fits in this width.
    pub fn contains(&self, value: U256) -> bool {
        value <= self.max_value()
    }

    /// Reduce `value` modulo `2^W`.
    pub fn truncate(&self, value: U256) -> U256 {
        value & self.max_value()
    }

    fn check_operand(&self, value: U256) -> Result<U256, ArithmeticError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(ArithmeticError::OperandOutOfRange { value, bits: self.0 })
        }
    }

    /// `a + b` under `policy`.
    ///
    /// # Errors
    ///
    /// - [`ArithmeticError::Overflow`] if checked and `a + b >= 2^W`
    /// - [`ArithmeticError::OperandOutOfRange`] if an operand exceeds the width
    pub fn add(&self, a: U256, b: U256, policy: Policy) -> Result<U256, ArithmeticError> {
        let (a, b) = (self.check_operand(a)?, self.check_operand(b)?);
        let (sum, carried) = a.overflowing_add(b);
        if policy == Policy::Checked && (carried || !self.contains(sum)) {
            return Err(ArithmeticError::Overflow);
        }
        Ok(self.truncate(sum))
    }

    /// `a - b` under `policy`.
    ///
    /// # Errors
    ///
    /// - [`ArithmeticError::Underflow`] if checked and `b > a`
    /// - [`ArithmeticError::OperandOutOfRange`] if an operand exceeds the width
    pub fn sub(&self, a: U256, b: U256, policy: Policy) -> Result<U256, ArithmeticError> {
        let (a, b) = (self.check_operand(a)?, self.check_operand(b)?);
        let (diff, borrowed) = a.overflowing_sub(b);
        if policy == Policy::Checked && borrowed {
            return Err(ArithmeticError::Underflow);
        }
        // 2^W divides 2^256, so the 256-bit wrap reduces correctly.
        Ok(self.truncate(diff))
    }

    /// `a * b` under `policy`.
    ///
    /// # Errors
    ///
    /// - [`ArithmeticError::Overflow`] if checked and `a * b >= 2^W`
    /// - [`ArithmeticError::OperandOutOfRange`] if an operand exceeds the width
    pub fn mul(&self, a: U256, b: U256, policy: Policy) -> Result<U256, ArithmeticError> {
        let (a, b) = (self.check_operand(a)?, self.check_operand(b)?);
        let wide = a.full_mul(b);
        if policy == Policy::Checked && wide > U512::from(self.max_value()) {
            return Err(ArithmeticError::Overflow);
        }
        let U512(limbs) = wide;
        Ok(self.truncate(U256([limbs[0], limbs[1], limbs[2], limbs[3]])))
    }
}

impl Policy {
    /// 256-bit addition under this policy.
    pub fn add(self, a: U256, b: U256) -> Result<U256, ArithmeticError> {
        Width::U256.add(a, b, self)
    }

    /// 256-bit subtraction under this policy.
    pub fn sub(self, a: U256, b: U256) -> Result<U256, ArithmeticError> {
        Width::U256.sub(a, b, self)
    }

    /// 256-bit multiplication under this policy.
    pub fn mul(self, a: U256, b: U256) -> Result<U256, ArithmeticError> {
        Width::U256.mul(a, b, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn width_bounds() {
        assert_eq!(Width::U8.max_value(), u(255));
        assert_eq!(Width::U256.max_value(), U256::MAX);
        assert_eq!(Width::new(0), Err(ArithmeticError::InvalidWidth(0)));
        assert_eq!(Width::new(257), Err(ArithmeticError::InvalidWidth(257)));
        assert_eq!(Width::new(1).unwrap().max_value(), u(1));
    }

    #[test]
    fn u8_add_wraps_or_overflows() {
        assert_eq!(Width::U8.add(u(255), u(1), Policy::Wrapping), Ok(u(0)));
        assert_eq!(Width::U8.add(u(255), u(1), Policy::Checked), Err(ArithmeticError::Overflow));
        assert_eq!(Width::U8.add(u(254), u(1), Policy::Checked), Ok(u(255)));
    }

    #[test]
    fn u8_sub_wraps_or_underflows() {
        assert_eq!(Width::U8.sub(u(0), u(1), Policy::Wrapping), Ok(u(255)));
        assert_eq!(Width::U8.sub(u(0), u(1), Policy::Checked), Err(ArithmeticError::Underflow));
        assert_eq!(Width::U8.sub(u(7), u(7), Policy::Checked), Ok(u(0)));
    }

    #[test]
    fn u8_mul_wraps_or_overflows() {
        assert_eq!(Width::U8.mul(u(16), u(16), Policy::Wrapping), Ok(u(0)));
        assert_eq!(Width::U8.mul(u(16), u(17), Policy::Wrapping), Ok(u(16)));
        assert_eq!(Width::U8.mul(u(16), u(16), Policy::Checked), Err(ArithmeticError::Overflow));
        assert_eq!(Width::U8.mul(u(15), u(17), Policy::Checked), Ok(u(255)));
    }

    #[test]
    fn u256_edges() {
        assert_eq!(Policy::Wrapping.add(U256::MAX, U256::one()), Ok(U256::zero()));
        assert_eq!(Policy::Checked.add(U256::MAX, U256::one()), Err(ArithmeticError::Overflow));
        assert_eq!(Policy::Wrapping.sub(U256::zero(), U256::one()), Ok(U256::MAX));
        assert_eq!(Policy::Wrapping.mul(U256::MAX, u(2)), Ok(U256::MAX - U256::one()));
        assert_eq!(Policy::Checked.mul(U256::MAX, u(2)), Err(ArithmeticError::Overflow));
        assert_eq!(Policy::Checked.mul(U256::MAX, U256::one()), Ok(U256::MAX));
    }

    #[test]
    fn token_sale_overflow_product() {
        // 2^256 / 10^18 rounded up, times the price, wraps to a small payment.
        let price = U256::exp10(18);
        let count = U256::MAX / price + U256::one();
        let wrapped = Policy::Wrapping.mul(count, price).unwrap();
        assert!(wrapped < price);
        assert_eq!(Policy::Checked.mul(count, price), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn operands_wider_than_width_are_rejected() {
        assert_eq!(
            Width::U8.add(u(256), u(0), Policy::Wrapping),
            Err(ArithmeticError::OperandOutOfRange { value: u(256), bits: 8 })
        );
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn word() -> impl Strategy<Value = U256> {
            any::<[u64; 4]>().prop_map(U256)
        }

        proptest! {
            #[test]
            fn wrapping_sub_undoes_wrapping_add(a in word(), b in word(), bits in 1u16..=256) {
                let w = Width::new(bits).unwrap();
                let (a, b) = (w.truncate(a), w.truncate(b));
                let sum = w.add(a, b, Policy::Wrapping).unwrap();
                prop_assert_eq!(w.sub(sum, b, Policy::Wrapping).unwrap(), a);
            }

            #[test]
            fn checked_agrees_with_wrapping_when_it_succeeds(a in word(), b in word(), bits in 1u16..=256) {
                let w = Width::new(bits).unwrap();
                let (a, b) = (w.truncate(a), w.truncate(b));
                if let Ok(product) = w.mul(a, b, Policy::Checked) {
                    prop_assert_eq!(w.mul(a, b, Policy::Wrapping).unwrap(), product);
                }
                if let Ok(sum) = w.add(a, b, Policy::Checked) {
                    prop_assert_eq!(w.add(a, b, Policy::Wrapping).unwrap(), sum);
                }
            }
        }
    }

    #[test]
    fn policy_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Policy::Wrapping).unwrap(), "\"wrapping\"");
        assert_eq!(Policy::default(), Policy::Checked);
    }
}
