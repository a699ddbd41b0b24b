//! One attack per challenge. Each deploys its own instance of the
//! requested variant into the [`World`] and drives it through the
//! [`Session`], stopping at the first reverted step.

mod lottery;
mod math;
mod warmup;

use cte_challenges::catalogue::{ChallengeId, Variant};

use crate::error::ExploitError;
use crate::session::{Session, World};

pub(crate) fn run(
    id: ChallengeId,
    variant: Variant,
    world: &mut World,
    session: &mut Session,
) -> Result<(), ExploitError> {
    match id {
        ChallengeId::Deploy => warmup::deploy(session),
        ChallengeId::CallMe => warmup::call_me(session),
        ChallengeId::Nickname => warmup::nickname(world, session),
        ChallengeId::GuessTheNumber => lottery::guess_the_number(world, session, variant),
        ChallengeId::GuessTheSecretNumber => lottery::guess_the_secret_number(world, session, variant),
        ChallengeId::GuessTheRandomNumber => lottery::guess_the_random_number(world, session, variant),
        ChallengeId::GuessTheNewNumber => lottery::guess_the_new_number(world, session, variant),
        ChallengeId::PredictTheFuture => lottery::predict_the_future(world, session, variant),
        ChallengeId::PredictTheBlockHash => lottery::predict_the_block_hash(world, session, variant),
        ChallengeId::TokenSale => math::token_sale(world, session, variant),
        ChallengeId::TokenWhale => math::token_whale(world, session, variant),
        ChallengeId::RetirementFund => math::retirement_fund(world, session, variant),
        ChallengeId::Mapping => math::mapping(session, variant),
        ChallengeId::Donation => math::donation(world, session, variant),
        ChallengeId::FiftyYears => math::fifty_years(world, session, variant),
    }
}
