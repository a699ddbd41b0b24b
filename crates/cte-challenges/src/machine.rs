//! Transactional execution and the completion latch.
//!
//! A [`Machine`] owns one challenge instance. Every mutating operation runs
//! against a draft copy of the state through [`Machine::execute`]; the draft
//! replaces the live state only when the operation succeeds, so a failed
//! operation is a full revert. After each successful operation the win
//! predicate is evaluated and the [`ChallengeState`] latch may move to
//! `Complete`. It never moves back.
//!
//! [`SharedMachine`] wraps a machine in a single exclusive lock for hosts
//! that drive one instance from several threads.

use std::sync::Arc;

use cte_core::U256;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Behaviour every challenge exposes to the machine.
pub trait Challenge: Clone {
    /// Win predicate over the current state. Must not mutate anything.
    fn is_solved(&self) -> bool;

    /// Ether held by the challenge contract.
    fn balance(&self) -> U256;
}

/// Completion status of a challenge instance. Monotonic.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ChallengeState {
    #[default]
    Incomplete,
    Complete,
}

/// A challenge instance with all-or-nothing operations.
#[derive(Clone, Debug)]
pub struct Machine<C> {
    state: C,
    status: ChallengeState,
    committed: u64,
}

impl<C: Challenge> Machine<C> {
    /// Deploy `state`. A challenge whose predicate already holds (the
    /// deploy warmup) starts complete.
    pub fn new(state: C) -> Self {
        let status = if state.is_solved() {
            ChallengeState::Complete
        } else {
            ChallengeState::Incomplete
        };
        Self { state, status, committed: 0 }
    }

    /// Run `op` as one transaction.
    ///
    /// On `Err` the state is exactly what it was before the call. On `Ok`
    /// the new state is committed and the completion latch re-evaluated.
    pub fn execute<T, E, F>(&mut self, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut C) -> Result<T, E>,
    {
        let mut draft = self.state.clone();
        let out = op(&mut draft)?;
        self.commit(draft);
        Ok(out)
    }

    /// Run an operation that cannot fail.
    pub fn apply<T, F>(&mut self, op: F) -> T
    where
        F: FnOnce(&mut C) -> T,
    {
        let mut draft = self.state.clone();
        let out = op(&mut draft);
        self.commit(draft);
        out
    }

    fn commit(&mut self, draft: C) {
        self.state = draft;
        self.committed += 1;
        if self.state.is_solved() {
            self.status = ChallengeState::Complete;
        }
    }

    /// Read-only view of the live state.
    pub fn state(&self) -> &C {
        &self.state
    }

    pub fn status(&self) -> ChallengeState {
        self.status
    }

    /// Whether the challenge has ever been completed.
    pub fn is_complete(&self) -> bool {
        self.status == ChallengeState::Complete
    }

    /// Ether held by the contract.
    pub fn balance(&self) -> U256 {
        self.state.balance()
    }

    /// Number of successfully committed operations.
    pub fn committed_operations(&self) -> u64 {
        self.committed
    }

    pub fn into_inner(self) -> C {
        self.state
    }
}

/// A [`Machine`] behind one exclusive lock, cloneable across threads.
pub struct SharedMachine<C> {
    inner: Arc<Mutex<Machine<C>>>,
}

impl<C> Clone for SharedMachine<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C: Challenge> SharedMachine<C> {
    pub fn new(state: C) -> Self {
        Self::from_machine(Machine::new(state))
    }

    pub fn from_machine(machine: Machine<C>) -> Self {
        Self { inner: Arc::new(Mutex::new(machine)) }
    }

    /// Run `op` as one transaction while holding the instance lock.
    pub fn execute<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut C) -> Result<T, E>,
    {
        self.inner.lock().execute(op)
    }

    /// Read the live state under the lock.
    pub fn with_state<T>(&self, read: impl FnOnce(&C) -> T) -> T {
        read(self.inner.lock().state())
    }

    pub fn is_complete(&self) -> bool {
        self.inner.lock().is_complete()
    }

    pub fn balance(&self) -> U256 {
        self.inner.lock().balance()
    }
}
