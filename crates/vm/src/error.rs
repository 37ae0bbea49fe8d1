//! Errors for the HRM VM.
//!
//! [`ProgramError`] is static: the program itself is malformed and cannot
//! be run. [`RuntimeError`] is dynamic: an instruction's precondition failed
//! for the current state. Every runtime variant except `TooManySteps`
//! carries the index of the failing instruction (`at`).

use hrm_common::{Opcode, OperandKind, Value};
use thiserror::Error;

/// Structural problems found before execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// An instruction's operand does not match its opcode.
    #[error("{opcode} expects {expected} at instruction {at}")]
    OperandMismatch {
        at: usize,
        opcode: Opcode,
        expected: OperandKind,
    },

    /// A jump names a label missing from the label table.
    #[error("undefined label '{label}' at instruction {at}")]
    UndefinedLabel { at: usize, label: String },

    /// A jump's resolved target disagrees with the label table.
    #[error("label '{label}' resolves to {expected}, not {target}, at instruction {at}")]
    LabelMismatch {
        at: usize,
        label: String,
        target: usize,
        expected: usize,
    },

    /// A label points outside `0..=len`.
    #[error("label '{label}' points at {target}, past the end of the program ({len})")]
    LabelOutOfRange {
        label: String,
        target: usize,
        len: usize,
    },
}

/// Errors that occur during execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The instruction needs a held value and hands are empty.
    #[error("you don't hold any value at instruction {at}")]
    EmptyHands { at: usize },

    /// A tile was read before anything was written to it.
    #[error("tile {address} is empty at instruction {at}")]
    EmptyTile { at: usize, address: usize },

    /// An indirect address read a letter or a negative number.
    #[error("tile {address} holds {value}, which is not a valid address, at instruction {at}")]
    NotAnAddress {
        at: usize,
        address: usize,
        value: Value,
    },

    /// `add` while holding a letter.
    #[error("cannot add to value {value} at instruction {at}")]
    CannotAddTo { at: usize, value: Value },

    /// `add` of a tile holding a letter.
    #[error("cannot add value {value} at instruction {at}")]
    CannotAdd { at: usize, value: Value },

    /// `sub` of mismatched types.
    #[error("cannot sub {value} from {from} at instruction {at}")]
    CannotSub { at: usize, value: Value, from: Value },

    /// `bumpup` on a tile holding a letter.
    #[error("cannot increment value {value} at instruction {at}")]
    CannotIncrement { at: usize, value: Value },

    /// `bumpdn` on a tile holding a letter.
    #[error("cannot decrement value {value} at instruction {at}")]
    CannotDecrement { at: usize, value: Value },

    /// `jumpn` while holding a letter.
    #[error("cannot compare value {value} with zero at instruction {at}")]
    CannotCompare { at: usize, value: Value },

    /// Integer arithmetic left the 64-bit range.
    #[error("integer overflow at instruction {at}")]
    Overflow { at: usize },

    /// A jump target outside the program (only reachable by unvalidated programs).
    #[error("invalid jump target {target} at instruction {at}")]
    InvalidJumpTarget { at: usize, target: usize },

    /// An operand that does not fit its opcode (only reachable by unvalidated programs).
    #[error("malformed instruction at {at}")]
    Malformed { at: usize },

    /// The step limit was reached before the program halted.
    #[error("too many steps (limit {limit})")]
    TooManySteps { limit: u64 },
}

impl RuntimeError {
    /// Index of the failing instruction, if the error belongs to one.
    pub fn at(&self) -> Option<usize> {
        match self {
            RuntimeError::EmptyHands { at }
            | RuntimeError::EmptyTile { at, .. }
            | RuntimeError::NotAnAddress { at, .. }
            | RuntimeError::CannotAddTo { at, .. }
            | RuntimeError::CannotAdd { at, .. }
            | RuntimeError::CannotSub { at, .. }
            | RuntimeError::CannotIncrement { at, .. }
            | RuntimeError::CannotDecrement { at, .. }
            | RuntimeError::CannotCompare { at, .. }
            | RuntimeError::Overflow { at }
            | RuntimeError::InvalidJumpTarget { at, .. }
            | RuntimeError::Malformed { at } => Some(*at),
            RuntimeError::TooManySteps { .. } => None,
        }
    }
}

/// Either failure of [`run`](crate::run).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
