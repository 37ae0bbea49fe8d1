//! Instructions and their operands.

use std::fmt;

use crate::opcode::{Opcode, OperandKind};

/// A tile address as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    /// `N`: operate on tile N.
    Direct(usize),
    /// `[N]`: operate on the tile whose address is stored in tile N.
    Indirect(usize),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Direct(n) => write!(f, "{n}"),
            Address::Indirect(n) => write!(f, "[{n}]"),
        }
    }
}

/// The argument attached to an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// `inbox` and `outbox` take nothing.
    None,
    /// Tile operations take an address.
    Tile(Address),
    /// Jumps take a label, resolved to an instruction index at parse time.
    Label {
        /// Label name as written in source.
        name: String,
        /// Instruction index the label points at. May equal the program length.
        target: usize,
    },
}

impl Operand {
    /// The kind of this operand.
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::None => OperandKind::None,
            Operand::Tile(_) => OperandKind::Tile,
            Operand::Label { .. } => OperandKind::Label,
        }
    }
}

/// A single instruction: an opcode and its operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// The operation's argument.
    pub operand: Operand,
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    /// `inbox` / `outbox`.
    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, Operand::None)
    }

    /// A tile operation on a direct address.
    pub fn direct(opcode: Opcode, tile: usize) -> Self {
        Self::new(opcode, Operand::Tile(Address::Direct(tile)))
    }

    /// A tile operation on an indirect address.
    pub fn indirect(opcode: Opcode, tile: usize) -> Self {
        Self::new(opcode, Operand::Tile(Address::Indirect(tile)))
    }

    /// A jump to a resolved label.
    pub fn jump(opcode: Opcode, name: impl Into<String>, target: usize) -> Self {
        Self::new(
            opcode,
            Operand::Label {
                name: name.into(),
                target,
            },
        )
    }

    /// Returns true if the operand kind matches what the opcode requires.
    pub fn is_well_formed(&self) -> bool {
        self.opcode.operand_kind() == self.operand.kind()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operand {
            Operand::None => write!(f, "{}", self.opcode),
            Operand::Tile(addr) => write!(f, "{} {addr}", self.opcode),
            Operand::Label { name, .. } => write!(f, "{} {name}", self.opcode),
        }
    }
}
