//! Adversarial property-based test suite.
//!
//! These tests try to break the model's invariants under randomized inputs.
//! Each property runs 256 cases with proptest shrinking to produce minimal
//! failing examples.
//!
//! Attack vectors tested:
//! - Fixed-width arithmetic at the wrap boundary
//! - Overflowing token purchases
//! - Early, forged and repeated commitment reveals
//! - Storage aliasing through array indices
//! - Allowance spending that touches the spender's balance
//! - Allowance bypass through wrapping arithmetic
//! - Partial state changes from failed operations
//! - Rate-limit bypass in the fixed secret lottery
//! - Queue accounting drift in the fixed time-lock

use proptest::prelude::*;

use cte_challenges::catalogue::Variant;
use cte_challenges::config::ChallengeConfig;
use cte_challenges::lottery::GuessTheSecretNumberFixed;
use cte_challenges::machine::Machine;
use cte_challenges::math::{FiftyYearsFixed, MappingChallenge, RetirementFund, TokenSale};
use cte_core::arith::{Policy, Width};
use cte_core::clock::{Clock, SimClock};
use cte_core::commitment::{commitment_hash, keccak256, pack, Commitment, Token};
use cte_core::constants::{DAY, ETHER, HOUR, YEAR};
use cte_core::error::{ArithmeticError, ChallengeError, CommitError, LedgerError};
use cte_core::ledger::Ledger;
use cte_core::types::Hash256;
use cte_core::U256;
use cte_tests::helpers::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A width of at most 64 bits and two operands that fit in it.
fn narrow_operands() -> impl Strategy<Value = (u16, u64, u64)> {
    (1u16..=64).prop_flat_map(|bits| {
        let max = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
        (Just(bits), 0..=max, 0..=max)
    })
}

fn modulus(bits: u16) -> u128 {
    1u128 << bits
}

fn any_u256() -> impl Strategy<Value = U256> {
    any::<[u64; 4]>().prop_map(U256)
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn wrapping_add_is_modular((bits, a, b) in narrow_operands()) {
        let w = Width::new(bits).unwrap();
        let expected = (a as u128 + b as u128) % modulus(bits);
        let sum = w.add(U256::from(a), U256::from(b), Policy::Wrapping).unwrap();
        prop_assert_eq!(sum, U256::from(expected));
    }

    #[test]
    fn checked_add_fails_iff_sum_exceeds_width((bits, a, b) in narrow_operands()) {
        let w = Width::new(bits).unwrap();
        let overflows = a as u128 + b as u128 >= modulus(bits);
        let result = w.add(U256::from(a), U256::from(b), Policy::Checked);
        if overflows {
            prop_assert_eq!(result, Err(ArithmeticError::Overflow));
        } else {
            prop_assert_eq!(result, Ok(U256::from(a as u128 + b as u128)));
        }
    }

    #[test]
    fn wrapping_sub_is_modular((bits, a, b) in narrow_operands()) {
        let w = Width::new(bits).unwrap();
        let expected = (a as u128 + modulus(bits) - b as u128) % modulus(bits);
        let diff = w.sub(U256::from(a), U256::from(b), Policy::Wrapping).unwrap();
        prop_assert_eq!(diff, U256::from(expected));
        prop_assert_eq!(w.sub(U256::from(a), U256::from(b), Policy::Checked).is_err(), b > a);
    }

    #[test]
    fn checked_mul_fails_iff_product_exceeds_width((bits, a, b) in narrow_operands()) {
        let w = Width::new(bits).unwrap();
        let product = a as u128 * b as u128;
        let wrapped = w.mul(U256::from(a), U256::from(b), Policy::Wrapping).unwrap();
        prop_assert_eq!(wrapped, U256::from(product % modulus(bits)));
        prop_assert_eq!(
            w.mul(U256::from(a), U256::from(b), Policy::Checked).is_err(),
            product >= modulus(bits)
        );
    }

    #[test]
    fn wide_operands_are_rejected(bits in 1u16..=64, excess in 1u64..1_000_000) {
        let w = Width::new(bits).unwrap();
        let operand = U256::from(modulus(bits)) + U256::from(excess - 1);
        let is_out_of_range = matches!(
            w.add(operand, U256::zero(), Policy::Wrapping),
            Err(ArithmeticError::OperandOutOfRange { .. })
        );
        prop_assert!(is_out_of_range);
    }
}

// ---------------------------------------------------------------------------
// Token purchases
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A count just past the overflow point buys with a wrapped payment far
    /// below the true cost on the vulnerable sale only.
    #[test]
    fn overflowing_buy_only_passes_when_wrapping(price in 2u64..=u64::MAX, k in 0u64..1_000) {
        let cfg = ChallengeConfig { token_price: U256::from(price), ..ChallengeConfig::default() };
        let count = U256::MAX / U256::from(price) + U256::one() + U256::from(k);
        let (wrapped, overflowed) = count.overflowing_mul(U256::from(price));
        prop_assert!(overflowed);

        let mut vulnerable = Machine::new(TokenSale::new(Variant::Vulnerable, &cfg).unwrap());
        vulnerable.execute(|c| c.buy(player(), count, wrapped)).unwrap();
        prop_assert_eq!(vulnerable.state().balance_of(&player()), count);

        let mut fixed = Machine::new(TokenSale::new(Variant::Fixed, &cfg).unwrap());
        prop_assert_eq!(
            fixed.execute(|c| c.buy(player(), count, wrapped)),
            Err(ChallengeError::Ledger(LedgerError::Arithmetic(ArithmeticError::Overflow)))
        );
        prop_assert_eq!(fixed.state().balance_of(&player()), U256::zero());
        prop_assert_eq!(fixed.balance(), cfg.funding);
    }

    /// The fixed sale accepts exactly `count * price` and nothing else.
    #[test]
    fn fixed_buy_requires_exact_payment(
        price in 1u64..=u64::MAX,
        count in 0u64..=u64::MAX,
        delta in 1u64..1_000,
    ) {
        let cfg = ChallengeConfig { token_price: U256::from(price), ..ChallengeConfig::default() };
        let cost = U256::from(count) * U256::from(price);
        let mut sale = Machine::new(TokenSale::new(Variant::Fixed, &cfg).unwrap());

        prop_assert_eq!(
            sale.execute(|c| c.buy(player(), U256::from(count), cost + U256::from(delta))),
            Err(ChallengeError::Ledger(LedgerError::IncorrectPayment))
        );
        if cost >= U256::from(delta) {
            prop_assert_eq!(
                sale.execute(|c| c.buy(player(), U256::from(count), cost - U256::from(delta))),
                Err(ChallengeError::Ledger(LedgerError::IncorrectPayment))
            );
        }
        sale.execute(|c| c.buy(player(), U256::from(count), cost)).unwrap();
        prop_assert_eq!(sale.state().balance_of(&player()), U256::from(count));
        prop_assert_eq!(sale.balance(), cfg.funding + cost);
    }
}

// ---------------------------------------------------------------------------
// Commitments
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn reveal_needs_delay_and_exact_preimage(
        value in any::<u8>(),
        wrong in any::<u8>(),
        salt in any::<[u8; 32]>(),
        elapsed in 0u64..2 * DAY,
    ) {
        let salt = Hash256(salt);
        let committed_at = 1_700_000_000;
        let mut c = Commitment::new(DAY);
        c.commit(commitment_hash(value, &salt), committed_at).unwrap();
        prop_assert_eq!(
            c.commit(commitment_hash(wrong, &salt), committed_at),
            Err(CommitError::AlreadyCommitted)
        );

        let now = committed_at + elapsed;
        if elapsed < DAY {
            prop_assert_eq!(c.reveal(value, &salt, now), Err(CommitError::TooEarly));
            prop_assert!(!c.is_revealed());
            return Ok(());
        }
        if wrong != value {
            prop_assert_eq!(c.reveal(wrong, &salt, now), Err(CommitError::InvalidReveal));
        }
        prop_assert_eq!(c.reveal(value, &salt, now), Ok(value));
        prop_assert_eq!(c.revealed_value(), Some(value));
        prop_assert_eq!(c.reveal(value, &salt, now), Err(CommitError::AlreadyRevealed));
    }

    #[test]
    fn reveal_with_another_salt_fails(value in any::<u8>(), a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
        prop_assume!(a != b);
        let mut c = Commitment::new(0);
        c.commit(commitment_hash(value, &Hash256(a)), 0).unwrap();
        prop_assert_eq!(c.reveal(value, &Hash256(b), 0), Err(CommitError::InvalidReveal));
    }
}

// ---------------------------------------------------------------------------
// Storage aliasing
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The isolated map never reaches the completion flag, whatever the key.
    #[test]
    fn isolated_map_never_touches_flag(writes in prop::collection::vec((any_u256(), any_u256()), 1..16)) {
        let mut m = Machine::new(MappingChallenge::fixed());
        for (key, value) in writes {
            prop_assume!(!key.is_zero());
            m.execute(|c| c.set(key, value)).unwrap();
            prop_assert_eq!(m.state().get(key).unwrap(), value);
        }
        prop_assert_eq!(m.state().get(U256::zero()).unwrap(), U256::zero());
        prop_assert_eq!(m.state().read_storage(U256::zero()), U256::zero());
        prop_assert!(!m.is_complete());
    }

    /// Exactly one array index aliases the completion flag.
    #[test]
    fn aliasing_array_reaches_flag_only_through_its_index(index in any_u256(), value in 1u64..=u64::MAX) {
        prop_assume!(index != U256::MAX);
        let mut m = Machine::new(MappingChallenge::vulnerable());
        let flag = m.state().flag_index();
        m.execute(|c| c.set(index, U256::from(value))).unwrap();
        prop_assert_eq!(m.is_complete(), index == flag);

        m.execute(|c| c.set(flag, U256::from(value))).unwrap();
        prop_assert!(m.is_complete());
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A checked transfer either conserves supply or changes nothing.
    #[test]
    fn checked_transfer_conserves_supply(from_balance in any::<u64>(), to_balance in any::<u64>(), amount in any::<u64>()) {
        let mut ledger = Ledger::new();
        ledger.mint(owner(), U256::from(from_balance), Policy::Checked).unwrap();
        ledger.mint(attacker(), U256::from(to_balance), Policy::Checked).unwrap();
        let supply = ledger.total_balances();
        let before = ledger.clone();

        let result = ledger.transfer(owner(), attacker(), U256::from(amount), Policy::Checked);
        if amount > from_balance {
            prop_assert_eq!(result, Err(LedgerError::InsufficientBalance));
            prop_assert_eq!(&ledger, &before);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(ledger.balance_of(&owner()), U256::from(from_balance - amount));
        }
        prop_assert_eq!(ledger.total_balances(), supply);
    }

    /// `transfer_from` moves tokens from `from` to `to` and spends the
    /// allowance, leaving the spender's own balance alone.
    #[test]
    fn transfer_from_leaves_spender_balance(
        supply in 1u64..1_000_000,
        spender_balance in any::<u32>(),
        allowance in any::<u64>(),
        amount in any::<u64>(),
        spender_receives in any::<bool>(),
    ) {
        let spender = addr(0x55);
        let to = if spender_receives { spender } else { attacker() };
        let mut ledger = Ledger::new();
        ledger.mint(owner(), U256::from(supply), Policy::Checked).unwrap();
        ledger.mint(spender, U256::from(spender_balance), Policy::Checked).unwrap();
        ledger.approve(owner(), spender, U256::from(allowance));
        let before = ledger.clone();

        let result = ledger.transfer_from(spender, owner(), to, U256::from(amount), Policy::Checked);
        if amount > allowance {
            prop_assert_eq!(result, Err(LedgerError::InsufficientAllowance));
            prop_assert_eq!(&ledger, &before);
            return Ok(());
        }
        if amount > supply {
            prop_assert_eq!(result, Err(LedgerError::InsufficientBalance));
            prop_assert_eq!(&ledger, &before);
            return Ok(());
        }
        prop_assert!(result.is_ok());
        prop_assert_eq!(ledger.balance_of(&owner()), U256::from(supply - amount));
        prop_assert_eq!(ledger.allowance(&owner(), &spender), U256::from(allowance - amount));
        let expected_spender = if spender_receives {
            U256::from(spender_balance) + U256::from(amount)
        } else {
            U256::from(spender_balance)
        };
        prop_assert_eq!(ledger.balance_of(&spender), expected_spender);
    }

    /// No arithmetic policy lets a spender exceed its allowance, and a
    /// spend only ever lowers it.
    #[test]
    fn allowance_holds_under_every_policy(
        supply in 0u64..1_000_000,
        allowance in any::<u64>(),
        amount in any::<u64>(),
        wrapping in any::<bool>(),
    ) {
        let policy = if wrapping { Policy::Wrapping } else { Policy::Checked };
        let spender = addr(0x55);
        let mut ledger = Ledger::new();
        ledger.mint(owner(), U256::from(supply), Policy::Checked).unwrap();
        ledger.approve(owner(), spender, U256::from(allowance));
        let before = ledger.clone();

        let result = ledger.transfer_from(spender, owner(), attacker(), U256::from(amount), policy);
        if amount > allowance {
            prop_assert_eq!(result, Err(LedgerError::InsufficientAllowance));
            prop_assert_eq!(&ledger, &before);
            return Ok(());
        }
        match result {
            Ok(()) => {
                prop_assert_eq!(ledger.allowance(&owner(), &spender), U256::from(allowance - amount));
                prop_assert_eq!(ledger.balance_of(&attacker()), U256::from(amount));
            }
            Err(err) => {
                prop_assert!(!wrapping, "wrapping transfer_from failed: {err}");
                prop_assert_eq!(err, LedgerError::InsufficientBalance);
                prop_assert_eq!(&ledger, &before);
            }
        }
        prop_assert!(ledger.allowance(&owner(), &spender) <= U256::from(allowance));
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A reverted sell leaves balances, reserve and the operation count as
    /// they were.
    #[test]
    fn failed_operation_is_a_full_revert(owned in 0u64..100, extra in 1u64..100) {
        let cfg = ChallengeConfig::default();
        let mut m = Machine::new(TokenSale::new(Variant::Fixed, &cfg).unwrap());
        m.execute(|c| c.buy(player(), U256::from(owned), ETHER * owned)).unwrap();
        let ops = m.committed_operations();
        let reserve = m.balance();

        prop_assert_eq!(
            m.execute(|c| c.sell(player(), U256::from(owned + extra))),
            Err(ChallengeError::Ledger(LedgerError::InsufficientBalance))
        );
        prop_assert_eq!(m.committed_operations(), ops);
        prop_assert_eq!(m.balance(), reserve);
        prop_assert_eq!(m.state().balance_of(&player()), U256::from(owned));
    }

    /// Once complete, no later operation un-completes a challenge.
    #[test]
    fn completion_latch_is_monotonic(refill in prop::collection::vec(1u64..=u64::MAX, 1..8)) {
        let cfg = ChallengeConfig::default();
        let clock = SimClock::default();
        let mut m = Machine::new(RetirementFund::new(owner(), player(), Variant::Vulnerable, &cfg, &clock));
        m.execute(|c| c.force_deposit(U256::one())).unwrap();
        m.execute(|c| c.collect_penalty(player())).unwrap();
        prop_assert!(m.is_complete());

        for amount in refill {
            m.execute(|c| c.force_deposit(U256::from(amount))).unwrap();
            prop_assert!(!m.balance().is_zero());
            prop_assert!(m.is_complete());
        }
    }
}

// ---------------------------------------------------------------------------
// Rate limiting and time locks
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// However guesses are spaced, no address gets more than the allowed
    /// attempts and each accepted guess is at least a cooldown apart.
    #[test]
    fn secret_attempts_stay_capped(gaps in prop::collection::vec(0u64..2 * HOUR, 1..40)) {
        let cfg = ChallengeConfig::default();
        let mut clock = SimClock::default();
        let mut m = Machine::new(GuessTheSecretNumberFixed::new(owner(), &cfg));
        let answer = keccak256(pack(&[Token::Uint256(U256::from(1_000_000u64))]));
        m.execute(|c| c.set_answer_hash(owner(), answer)).unwrap();

        let mut accepted = 0u32;
        let mut last: Option<u64> = None;
        for (n, gap) in gaps.into_iter().enumerate() {
            clock.advance_time(gap);
            let guess = U256::from(n as u64);
            if m.execute(|c| c.guess(player(), guess, cfg.secret_guess_stake, &clock)).is_ok() {
                if let Some(prev) = last {
                    prop_assert!(clock.timestamp() >= prev + cfg.guess_cooldown_secs);
                }
                last = Some(clock.timestamp());
                accepted += 1;
            }
            prop_assert!(m.state().attempts(&player()) <= cfg.max_guess_attempts);
        }
        prop_assert_eq!(m.state().attempts(&player()), accepted);
        prop_assert_eq!(m.balance(), cfg.funding + cfg.secret_guess_stake * accepted);
        prop_assert!(!m.is_complete());
    }

    /// The fixed queue's purse always equals the sum of its unwithdrawn
    /// contributions.
    #[test]
    fn fixed_queue_purse_matches_contributions(
        ops in prop::collection::vec((0u8..6, 0u64..120 * YEAR, 0u64..1_000_000, any::<bool>()), 1..24),
    ) {
        let cfg = ChallengeConfig::default();
        let mut clock = SimClock::default();
        let start = clock.timestamp();
        let mut m = Machine::new(FiftyYearsFixed::new(owner(), &cfg, &clock));

        for (index, offset, value, withdraw) in ops {
            if withdraw {
                clock.advance_time(offset / 4);
                let _ = m.execute(|c| c.withdraw(owner(), U256::from(index), &clock));
            } else {
                let unlock = U256::from(start) + U256::from(offset);
                let _ = m.execute(|c| c.upsert(owner(), U256::from(index), unlock, U256::from(value), &clock));
            }
            let state = m.state();
            let live = (0..state.contribution_count())
                .filter_map(|i| state.contributions(i))
                .fold(U256::zero(), |acc, c| acc + c.amount);
            prop_assert_eq!(live, m.balance());
        }
    }
}
