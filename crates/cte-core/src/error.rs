//! Error types for the Capture the Ether execution model.
//!
//! Display strings of the revert-style variants match the literal reason
//! strings the contracts revert with, so harness output can be compared
//! against recorded expectations verbatim.
use thiserror::Error;

use primitive_types::U256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("arithmetic overflow")] Overflow,
    #[error("arithmetic underflow")] Underflow,
    #[error("operand {value} does not fit in {bits} bits")] OperandOutOfRange { value: U256, bits: u16 },
    #[error("invalid width: {0} bits")] InvalidWidth(u16),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Incorrect payment")] IncorrectPayment,
    #[error("Insufficient balance")] InsufficientBalance,
    #[error("Insufficient allowance")] InsufficientAllowance,
    #[error("insufficient reserve: have {have}, need {need}")] InsufficientReserve { have: U256, need: U256 },
    #[error(transparent)] Arithmetic(#[from] ArithmeticError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("Hash already set")] AlreadyCommitted,
    #[error("No commitment made")] NoCommitment,
    #[error("Too early to reveal")] TooEarly,
    #[error("Already revealed")] AlreadyRevealed,
    #[error("Invalid answer or salt")] InvalidReveal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("index out of bounds: {index} >= {length}")] IndexOutOfBounds { index: U256, length: U256 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("clock moved backwards: {now} < {previous}")] TimeWentBackwards { previous: u64, now: u64 },
    #[error("block height overflow")] HeightOverflow,
}

/// Challenge-level failures. Every variant is a revert: the operation that
/// produced it left the challenge untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("Not owner")] NotOwner,
    #[error("Not beneficiary")] NotBeneficiary,
    #[error("Not guesser")] NotGuesser,
    #[error("Incorrect value: expected {expected}, got {got}")] IncorrectValue { expected: U256, got: U256 },
    #[error("Already guessed")] AlreadyGuessed,
    #[error("Guess already locked")] GuessAlreadyLocked,
    #[error("No guess locked")] NoGuessLocked,
    #[error("Answer not yet revealed")] NotRevealed,
    #[error("Answer hash not set")] AnswerHashNotSet,
    #[error("Challenge already completed")] AlreadyCompleted,
    #[error("Max attempts reached")] MaxAttemptsReached,
    #[error("Cooldown period not elapsed")] CooldownActive,
    #[error("Too early")] SettlementTooEarly,
    #[error("Block too old - hash unavailable")] BlockTooOld,
    #[error("Block hash unavailable")] BlockHashUnavailable,
    #[error("Balance cannot exceed startBalance")] BalanceExceedsStart,
    #[error("No early withdrawal")] NoEarlyWithdrawal,
    #[error("Timestamp must be at least 1 day after previous")] TimestampTooEarly,
    #[error("Timestamp too far in future")] TimestampTooFarInFuture,
    #[error("Not yet unlocked")] NotYetUnlocked,
    #[error("Invalid index")] InvalidIndex,
    #[error("withdraw batch too large: {len} > {max}")] BatchTooLarge { len: U256, max: u64 },
    #[error("guess out of range: {0}")] GuessOutOfRange(U256),
    #[error("transfer of {amount} failed: balance is {balance}")] TransferFailed { amount: U256, balance: U256 },
    #[error(transparent)] Arithmetic(#[from] ArithmeticError),
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error(transparent)] Commit(#[from] CommitError),
    #[error(transparent)] Storage(#[from] StorageError),
    #[error(transparent)] Clock(#[from] ClockError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revert_reasons_are_verbatim() {
        assert_eq!(LedgerError::InsufficientBalance.to_string(), "Insufficient balance");
        assert_eq!(LedgerError::IncorrectPayment.to_string(), "Incorrect payment");
        assert_eq!(CommitError::TooEarly.to_string(), "Too early to reveal");
        assert_eq!(ChallengeError::AlreadyGuessed.to_string(), "Already guessed");
        assert_eq!(ChallengeError::BlockTooOld.to_string(), "Block too old - hash unavailable");
        assert_eq!(
            ChallengeError::BalanceExceedsStart.to_string(),
            "Balance cannot exceed startBalance"
        );
        assert_eq!(
            ChallengeError::TimestampTooEarly.to_string(),
            "Timestamp must be at least 1 day after previous"
        );
    }

    #[test]
    fn nested_errors_display_transparently() {
        let err: ChallengeError = LedgerError::from(ArithmeticError::Overflow).into();
        assert_eq!(err.to_string(), "arithmetic overflow");
        let err: ChallengeError = CommitError::InvalidReveal.into();
        assert_eq!(err.to_string(), "Invalid answer or salt");
    }
}
