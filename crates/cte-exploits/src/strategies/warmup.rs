use cte_challenges::machine::Machine;
use cte_challenges::warmup::{encode_nickname, CallMeChallenge, DeployChallenge, NicknameChallenge};

use crate::error::ExploitError;
use crate::session::{Session, World};

pub(super) fn deploy(session: &mut Session) -> Result<(), ExploitError> {
    let m = Machine::new(DeployChallenge);
    session.step(&m, "deploy", Ok::<_, ExploitError>(()))?;
    Ok(())
}

pub(super) fn call_me(session: &mut Session) -> Result<(), ExploitError> {
    let mut m = Machine::new(CallMeChallenge::default());
    m.apply(|c| c.call_me());
    session.step(&m, "call_me", Ok::<_, ExploitError>(()))?;
    Ok(())
}

pub(super) fn nickname(world: &World, session: &mut Session) -> Result<(), ExploitError> {
    let mut m = Machine::new(NicknameChallenge::new(world.player));
    let name = encode_nickname("player").ok_or_else(|| ExploitError::InvalidParameters("nickname".into()))?;
    let player = world.player;
    m.apply(|c| c.set_nickname(player, name));
    session.step(&m, "set_nickname(\"player\")", Ok::<_, ExploitError>(()))?;
    Ok(())
}
