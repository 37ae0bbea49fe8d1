//! Program representation: an instruction list plus its label table.
//!
//! A program is immutable once built. It holds no execution state, so one
//! program can back any number of executions, including concurrent ones.

use std::collections::BTreeMap;

use crate::instruction::Instruction;

/// A parsed HRM program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// The instruction stream.
    pub instructions: Vec<Instruction>,
    /// Label name → instruction index. An index equal to the program length
    /// marks the end of the program.
    pub labels: BTreeMap<String, usize>,
    /// Source line of each instruction. Empty for programs built by hand.
    pub lines: Vec<usize>,
}

impl Program {
    /// Create a new program from instructions and labels.
    pub fn new(instructions: Vec<Instruction>, labels: BTreeMap<String, usize>) -> Self {
        Self {
            instructions,
            labels,
            lines: Vec::new(),
        }
    }

    /// Attach the source line of each instruction.
    pub fn with_lines(mut self, lines: Vec<usize>) -> Self {
        self.lines = lines;
        self
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Source line of the instruction at `index`, when known.
    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.lines.get(index).copied()
    }

    /// Instruction index a label points at.
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// All labels pointing at `index`, in name order.
    pub fn labels_at(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.labels
            .iter()
            .filter(move |&(_, &target)| target == index)
            .map(|(name, _)| name.as_str())
    }
}
