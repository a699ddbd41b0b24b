//! Protocol constants. All monetary values in wei (1 ether = 10^18 wei).
//!
//! The pedagogical thresholds live here rather than inline so that
//! configuration can override them (see `cte_challenges::config`).

use primitive_types::U256;

/// One ether in wei.
///
/// # Examples
///
/// ```
/// use cte_core::constants::ETHER;
/// assert_eq!(ETHER, cte_core::U256::exp10(18));
/// ```
pub const ETHER: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// One tenth of an ether.
pub const TENTH_ETHER: U256 = U256([100_000_000_000_000_000, 0, 0, 0]);

pub const MINUTE: u64 = 60;
pub const HOUR: u64 = 60 * MINUTE;
pub const DAY: u64 = 24 * HOUR;
/// Solidity's `years` unit: 365 days, no leap handling.
pub const YEAR: u64 = 365 * DAY;

/// Delay between a commit and the earliest permitted reveal.
pub const REVEAL_DELAY_SECS: u64 = DAY;

/// Minimum spacing between two guesses from the same address.
pub const GUESS_COOLDOWN_SECS: u64 = HOUR;

/// Guesses allowed per address in the rate-limited lottery.
pub const MAX_GUESS_ATTEMPTS: u32 = 10;

/// Number of recent blocks whose hashes are retrievable. Older (and the
/// current) block hashes read as zero.
pub const BLOCK_HASH_HISTORY: u64 = 256;

/// Token price in the token sale.
pub const TOKEN_PRICE: U256 = ETHER;

/// Stake required per lottery guess.
pub const GUESS_STAKE: U256 = ETHER;

/// Stake per guess in the rate-limited secret-number lottery.
pub const SECRET_GUESS_STAKE: U256 = TENTH_ETHER;

/// Initial funding of every ether-holding challenge.
pub const CHALLENGE_FUNDING: U256 = ETHER;

/// Tokens minted to the player by the token whale.
pub const WHALE_INITIAL_SUPPLY: u64 = 1_000;

/// Balance the whale player must reach.
pub const WHALE_TARGET_BALANCE: u64 = 1_000_000;

/// Retirement fund lock period.
pub const RETIREMENT_LOCK_SECS: u64 = 10 * YEAR;

/// Percentage of the fund the owner keeps on early withdrawal.
pub const EARLY_WITHDRAW_KEEP_PERCENT: u64 = 90;

/// Lock period of the first fifty-years contribution.
pub const FIFTY_YEARS_LOCK_SECS: u64 = 50 * YEAR;

/// Minimum spacing between consecutive contribution unlock times.
pub const CONTRIBUTION_SPACING_SECS: u64 = DAY;

/// Furthest a new contribution may unlock, relative to now.
pub const MAX_UNLOCK_HORIZON_SECS: u64 = 100 * YEAR;

/// Donation scale of the fixed donation contract (`1 ether`).
pub const DONATION_SCALE: U256 = ETHER;

/// Donation scale of the vulnerable contract: `10**18 * 1 ether`.
pub const LEGACY_DONATION_SCALE: U256 = U256([0xb34b_9f10_0000_0000, 0x00c0_97ce_7bc9_0715, 0, 0]);

/// Upper bound on contributions swept by one withdraw. Stands in for the
/// block gas limit.
pub const MAX_WITHDRAW_BATCH: u64 = 1_024;

/// Answer of the number-guessing warmup lottery.
pub const GUESS_THE_NUMBER_ANSWER: u8 = 42;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_scale_is_ten_to_the_thirty_six() {
        assert_eq!(LEGACY_DONATION_SCALE, U256::exp10(36));
        assert_eq!(LEGACY_DONATION_SCALE, ETHER * ETHER);
    }

    #[test]
    fn tenth_ether() {
        assert_eq!(TENTH_ETHER * 10, ETHER);
    }

    #[test]
    fn time_units() {
        assert_eq!(DAY, 86_400);
        assert_eq!(HOUR, 3_600);
        assert_eq!(FIFTY_YEARS_LOCK_SECS, 1_576_800_000);
    }
}
