use tracing::debug;

use cte_challenges::catalogue::Variant;
use cte_challenges::lottery::{
    current_block_answer, CommitRevealLottery, GuessTheNewNumber, GuessTheNumber, GuessTheRandomNumber,
    GuessTheSecretNumber, GuessTheSecretNumberFixed, PredictTheBlockHash, PredictTheBlockHashFixed,
    PredictTheFuture, PredictTheFutureFixed,
};
use cte_challenges::machine::{Challenge, Machine};
use cte_core::clock::Clock;
use cte_core::commitment::{commitment_hash, keccak256, pack, Token};
use cte_core::constants::{BLOCK_HASH_HISTORY, GUESS_THE_NUMBER_ANSWER};
use cte_core::types::Hash256;
use cte_core::U256;

use crate::error::ExploitError;
use crate::session::{Session, World};

/// Blocks to wait out before giving up on a block-derived settle.
const MAX_SETTLE_ATTEMPTS: u64 = 1_024;

/// The deployer's hidden answer and salt for commit-reveal lotteries.
fn owner_secret(world: &World) -> (u8, Hash256) {
    (world.secret("answer").0[0], world.secret("salt"))
}

/// Deploy a commit-reveal lottery with the deployer's commitment in place.
fn committed_lottery(world: &World, session: &mut Session) -> Result<Machine<CommitRevealLottery>, ExploitError> {
    let (answer, salt) = owner_secret(world);
    let mut m = Machine::new(CommitRevealLottery::new(world.deployer, &world.config));
    let r = m.execute(|c| c.commit(world.deployer, commitment_hash(answer, &salt), &world.clock));
    session.step(&m, "owner commit", r)?;
    Ok(m)
}

/// Against a commit-reveal lottery the attacker only knows the public
/// commitment; the answer is not on chain until the owner reveals.
fn guess_before_reveal(world: &World, session: &mut Session, n: u8) -> Result<(), ExploitError> {
    let mut m = committed_lottery(world, session)?;
    let (player, stake) = (world.player, world.config.guess_stake);
    let r = m.execute(|c| c.guess(player, n, stake));
    session.step(&m, format!("guess({n})"), r)?;
    Ok(())
}

pub(super) fn guess_the_number(world: &mut World, session: &mut Session, variant: Variant) -> Result<(), ExploitError> {
    match variant {
        Variant::Vulnerable => {
            let mut m = Machine::new(GuessTheNumber::new(&world.config));
            let answer = m.state().answer();
            let stake = world.config.guess_stake;
            let r = m.execute(|c| c.guess(answer, stake));
            session.step(&m, format!("guess({answer})"), r)?;
            Ok(())
        }
        Variant::Fixed => guess_before_reveal(world, session, GUESS_THE_NUMBER_ANSWER),
    }
}

/// Search the `uint8` space for a preimage of `target`.
fn uint8_preimage(target: Hash256) -> Option<u8> {
    (0..=u8::MAX).find(|n| keccak256(pack(&[Token::Uint8(*n)])) == target)
}

pub(super) fn guess_the_secret_number(
    world: &mut World,
    session: &mut Session,
    variant: Variant,
) -> Result<(), ExploitError> {
    let stake = world.config.guess_stake;
    match variant {
        Variant::Vulnerable => {
            let mut m = Machine::new(GuessTheSecretNumber::new(&world.config));
            let n = uint8_preimage(m.state().answer_hash()).ok_or(ExploitError::NoPreimage)?;
            let r = m.execute(|c| c.guess(n, stake));
            session.step(&m, format!("guess({n})"), r)?;
        }
        Variant::Fixed => {
            let mut m = Machine::new(GuessTheSecretNumberFixed::new(world.deployer, &world.config));
            let secret = world.secret("answer").to_u256();
            let hash = keccak256(pack(&[Token::Uint256(secret)]));
            let deployer = world.deployer;
            let r = m.execute(|c| c.set_answer_hash(deployer, hash));
            session.step(&m, "owner set_answer_hash", r)?;

            let search = uint8_preimage(m.state().answer_hash()).ok_or(ExploitError::NoPreimage);
            session.probe(&m, "search uint8 preimage", search);

            // Fall back to guessing on chain as fast as the contract allows.
            let (player, stake) = (world.player, world.config.secret_guess_stake);
            for n in 0..=u8::MAX {
                let clock = &world.clock;
                let r = m.execute(|c| c.guess(player, U256::from(n), stake, clock));
                session.step(&m, format!("guess({n})"), r)?;
            }
        }
    }
    Ok(())
}

pub(super) fn guess_the_random_number(
    world: &mut World,
    session: &mut Session,
    variant: Variant,
) -> Result<(), ExploitError> {
    match variant {
        Variant::Vulnerable => {
            let mut m = Machine::new(GuessTheRandomNumber::deploy(&world.config, &world.clock));
            world.clock.mine(1)?;
            let word = m.state().read_storage(U256::zero());
            let n = u8::try_from(word.low_u64()).map_err(|_| ExploitError::NoPreimage)?;
            let stake = world.config.guess_stake;
            let r = m.execute(|c| c.guess(n, stake));
            session.step(&m, format!("guess({n}) from slot 0"), r)?;
            Ok(())
        }
        Variant::Fixed => {
            let n = current_block_answer(&world.clock);
            guess_before_reveal(world, session, n)
        }
    }
}

pub(super) fn guess_the_new_number(
    world: &mut World,
    session: &mut Session,
    variant: Variant,
) -> Result<(), ExploitError> {
    match variant {
        Variant::Vulnerable => {
            let mut m = Machine::new(GuessTheNewNumber::new(&world.config));
            world.clock.mine(1)?;
            let (clock, stake) = (&world.clock, world.config.guess_stake);
            // Computed and submitted in the same block.
            let r = m.execute(|c| c.guess(current_block_answer(clock), stake, clock));
            session.step(&m, "guess(same-block answer)", r)?;
            Ok(())
        }
        Variant::Fixed => {
            let n = current_block_answer(&world.clock);
            guess_before_reveal(world, session, n)
        }
    }
}

pub(super) fn predict_the_future(
    world: &mut World,
    session: &mut Session,
    variant: Variant,
) -> Result<(), ExploitError> {
    let (player, stake) = (world.player, world.config.guess_stake);
    match variant {
        Variant::Vulnerable => {
            let mut m = Machine::new(PredictTheFuture::new(&world.config));
            let clock = &world.clock;
            let r = m.execute(|c| c.lock_in_guess(player, 0, stake, clock));
            session.step(&m, "lock_in_guess(0)", r)?;
            world.clock.mine(2)?;

            for attempt in 0..MAX_SETTLE_ATTEMPTS {
                let clock = &world.clock;
                // Settle and revert unless the settle won.
                let r = m.execute(|c| {
                    let payout = c.settle(player, clock)?;
                    if !c.is_solved() {
                        return Err(ExploitError::Aborted);
                    }
                    Ok(payout)
                });
                match r {
                    Err(ExploitError::Aborted) => {
                        debug!(attempt, block = world.clock.block_number(), "settle would lose, retrying");
                        world.clock.mine(1)?;
                    }
                    r => {
                        session.step(&m, format!("settle after {attempt} aborted attempts"), r)?;
                        return Ok(());
                    }
                }
            }
            Err(ExploitError::Exhausted { tries: MAX_SETTLE_ATTEMPTS })
        }
        Variant::Fixed => {
            let (answer, salt) = owner_secret(world);
            let deployer = world.deployer;
            let mut m = Machine::new(PredictTheFutureFixed::new(deployer, &world.config));
            let clock = &world.clock;
            let r = m.execute(|c| c.commit(deployer, commitment_hash(answer, &salt), clock));
            session.step(&m, "owner commit", r)?;
            let r = m.execute(|c| c.lock_in_guess(player, 0, stake));
            session.step(&m, "lock_in_guess(0)", r)?;
            Ok(())
        }
    }
}

pub(super) fn predict_the_block_hash(
    world: &mut World,
    session: &mut Session,
    variant: Variant,
) -> Result<(), ExploitError> {
    let (player, stake) = (world.player, world.config.guess_stake);
    let wait = BLOCK_HASH_HISTORY + 2;
    match variant {
        Variant::Vulnerable => {
            let mut m = Machine::new(PredictTheBlockHash::new(&world.config));
            let r = m.execute(|c| c.lock_in_guess(player, Hash256::ZERO, stake, &world.clock));
            session.step(&m, "lock_in_guess(0x0)", r)?;
            world.clock.mine(wait)?;
            let r = m.execute(|c| c.settle(player, &world.clock));
            session.step(&m, format!("settle after {wait} blocks"), r)?;
        }
        Variant::Fixed => {
            let mut m = Machine::new(PredictTheBlockHashFixed::new(&world.config));
            let r = m.execute(|c| c.lock_in_guess(player, Hash256::ZERO, stake, &world.clock));
            session.step(&m, "lock_in_guess(0x0)", r)?;
            world.clock.mine(wait)?;
            let r = m.execute(|c| c.settle(player, &world.clock));
            session.step(&m, format!("settle after {wait} blocks"), r)?;
        }
    }
    Ok(())
}
