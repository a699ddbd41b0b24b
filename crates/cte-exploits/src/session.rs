//! The world a scenario runs in and the log of what it did.

use std::fmt::Debug;

use tracing::debug;

use cte_challenges::config::ChallengeConfig;
use cte_challenges::machine::{Challenge, Machine};
use cte_core::clock::SimClock;
use cte_core::commitment::{keccak256, pack, Token};
use cte_core::types::{Address, Hash256};
use cte_core::U256;

use crate::error::ExploitError;
use crate::report::Step;

/// Accounts and chain shared by every step of one scenario.
#[derive(Clone, Debug)]
pub struct World {
    pub clock: SimClock,
    pub config: ChallengeConfig,
    /// Deploys and owns the challenge contract.
    pub deployer: Address,
    /// The account that must complete the challenge.
    pub player: Address,
    /// A second account the player controls.
    pub accomplice: Address,
    seed: Hash256,
}

impl World {
    pub fn new(config: ChallengeConfig, seed: Hash256) -> Self {
        Self {
            clock: SimClock::default().with_seed(seed),
            config,
            deployer: Address::repeat_byte(0xd0),
            player: Address::repeat_byte(0x01),
            accomplice: Address::repeat_byte(0xac),
            seed,
        }
    }

    /// A value derived from the scenario seed, private to whoever asks for
    /// it under `label`.
    pub fn secret(&self, label: &str) -> Hash256 {
        keccak256(pack(&[Token::Bytes32(self.seed), Token::Bytes(label.as_bytes().to_vec())]))
    }
}

/// Records each call's outcome and the challenge's state after it.
#[derive(Debug, Default)]
pub struct Session {
    steps: Vec<Step>,
    completed: bool,
    balance: U256,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `result` for `action` against `machine` and pass it on.
    pub fn step<C, T, E>(
        &mut self,
        machine: &Machine<C>,
        action: impl Into<String>,
        result: Result<T, E>,
    ) -> Result<T, ExploitError>
    where
        C: Challenge,
        T: Debug,
        E: Into<ExploitError>,
    {
        let action = action.into();
        self.observe(machine);
        match result {
            Ok(value) => {
                debug!(%action, result = ?value, complete = self.completed, "step succeeded");
                self.steps.push(Step { action, ok: true, detail: format!("{value:?}") });
                Ok(value)
            }
            Err(err) => {
                let err = err.into();
                debug!(%action, error = %err, "step reverted");
                self.steps.push(Step { action, ok: false, detail: err.to_string() });
                Err(err)
            }
        }
    }

    /// Record a step whose failure is expected and not fatal.
    pub fn probe<C, T, E>(&mut self, machine: &Machine<C>, action: impl Into<String>, result: Result<T, E>)
    where
        C: Challenge,
        T: Debug,
        E: Into<ExploitError>,
    {
        let _ = self.step(machine, action, result);
    }

    /// Snapshot completion and balance.
    pub fn observe<C: Challenge>(&mut self, machine: &Machine<C>) {
        self.completed = machine.is_complete();
        self.balance = machine.balance();
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn balance(&self) -> U256 {
        self.balance
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}
