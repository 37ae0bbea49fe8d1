//! HRM common types.
//!
//! This crate provides the data structures shared by the assembler and the
//! virtual machine:
//!
//! - [`Value`]: an integer or a letter, the only thing tiles and queues hold
//! - [`Opcode`] / [`OperandKind`]: the eleven operations and what they take
//! - [`Instruction`] / [`Operand`] / [`Address`]: one decoded source line
//! - [`Program`]: instructions plus the label table
//! - [`ValueError`]: errors from building values out of text or JSON

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::ValueError;
pub use instruction::{Address, Instruction, Operand};
pub use opcode::{Opcode, OperandKind, ALL_OPCODES};
pub use program::Program;
pub use value::Value;
