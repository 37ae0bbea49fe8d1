//! Opcode definitions for the HRM instruction set.

use std::fmt;
use std::str::FromStr;

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Queues
    /// Take the next inbox value into hands. Halts when the inbox is empty.
    Inbox,
    /// Put the held value on the outbox.
    Outbox,

    // Tiles
    /// Copy a tile into hands.
    CopyFrom,
    /// Copy hands onto a tile.
    CopyTo,

    // Arithmetic
    /// Add a tile to the held integer.
    Add,
    /// Subtract a tile from the held value.
    Sub,
    /// Increment a tile, then copy it into hands.
    BumpUp,
    /// Decrement a tile, then copy it into hands.
    BumpDn,

    // Control flow
    /// Unconditional jump.
    Jump,
    /// Jump if the held value is zero.
    JumpZ,
    /// Jump if the held value is negative.
    JumpN,
}

/// The kind of operand an opcode takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// No operand.
    None,
    /// A direct or indirect tile address.
    Tile,
    /// A label name.
    Label,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandKind::None => f.write_str("no argument"),
            OperandKind::Tile => f.write_str("a tile address"),
            OperandKind::Label => f.write_str("a label"),
        }
    }
}

/// All opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 11] = [
    Opcode::Inbox,
    Opcode::Outbox,
    Opcode::CopyFrom,
    Opcode::CopyTo,
    Opcode::Add,
    Opcode::Sub,
    Opcode::BumpUp,
    Opcode::BumpDn,
    Opcode::Jump,
    Opcode::JumpZ,
    Opcode::JumpN,
];

impl Opcode {
    /// Returns the source mnemonic for this opcode (always lowercase).
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Inbox => "inbox",
            Opcode::Outbox => "outbox",
            Opcode::CopyFrom => "copyfrom",
            Opcode::CopyTo => "copyto",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::BumpUp => "bumpup",
            Opcode::BumpDn => "bumpdn",
            Opcode::Jump => "jump",
            Opcode::JumpZ => "jumpz",
            Opcode::JumpN => "jumpn",
        }
    }

    /// The operand this opcode requires.
    pub fn operand_kind(&self) -> OperandKind {
        match self {
            Opcode::Inbox | Opcode::Outbox => OperandKind::None,
            Opcode::CopyFrom
            | Opcode::CopyTo
            | Opcode::Add
            | Opcode::Sub
            | Opcode::BumpUp
            | Opcode::BumpDn => OperandKind::Tile,
            Opcode::Jump | Opcode::JumpZ | Opcode::JumpN => OperandKind::Label,
        }
    }

    /// Number of arguments written after the mnemonic in source text.
    pub fn arity(&self) -> usize {
        match self.operand_kind() {
            OperandKind::None => 0,
            OperandKind::Tile | OperandKind::Label => 1,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Error returned when a word is not a known mnemonic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOpcode;

impl FromStr for Opcode {
    type Err = UnknownOpcode;

    /// Case-insensitive mnemonic lookup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .copied()
            .ok_or(UnknownOpcode)
    }
}
