//! Shared test helpers for the integration suites.

use cte_challenges::config::ChallengeConfig;
use cte_challenges::lottery::CommitRevealLottery;
use cte_challenges::machine::Machine;
use cte_core::clock::SimClock;
use cte_core::commitment::commitment_hash;
use cte_core::types::{Address, Hash256};

pub fn owner() -> Address {
    Address::repeat_byte(0xd0)
}

pub fn player() -> Address {
    Address::repeat_byte(0x01)
}

pub fn attacker() -> Address {
    Address::repeat_byte(0xa7)
}

/// Address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address::repeat_byte(seed)
}

/// A clock seeded with `seed` at the default genesis timestamp.
pub fn clock(seed: u8) -> SimClock {
    SimClock::default().with_seed(Hash256([seed; 32]))
}

/// A commit-reveal lottery whose owner committed `answer` under `salt`,
/// with the reveal delay already elapsed but nothing revealed yet.
pub fn committed_lottery(
    answer: u8,
    salt: &Hash256,
    cfg: &ChallengeConfig,
) -> (Machine<CommitRevealLottery>, SimClock) {
    let mut clock = SimClock::default();
    let mut m = Machine::new(CommitRevealLottery::new(owner(), cfg));
    m.execute(|c| c.commit(owner(), commitment_hash(answer, salt), &clock))
        .unwrap();
    clock.advance_time(cfg.reveal_delay_secs);
    (m, clock)
}

/// As [`committed_lottery`], with `answer` revealed.
pub fn revealed_lottery(answer: u8, cfg: &ChallengeConfig) -> (Machine<CommitRevealLottery>, SimClock) {
    let salt = Hash256([0x42; 32]);
    let (mut m, clock) = committed_lottery(answer, &salt, cfg);
    m.execute(|c| c.reveal(answer, &salt, &clock)).unwrap();
    (m, clock)
}
