//! HRM assembler: program text to [`Program`] and back.
//!
//! Parsing is two stages: [`tokenize`] splits the text into positioned
//! tokens (never fails, never drops a byte), then [`parse_tokens`] checks
//! every line and resolves labels. [`parse`] runs both.
//!
//! # Usage
//!
//! ```
//! use hrm_assembler::{disassemble, parse};
//!
//! let program = parse("loop:\n  inbox\n  outbox\n  jump loop\n").unwrap();
//! assert_eq!(program.len(), 3);
//! assert_eq!(program.label("loop"), Some(0));
//!
//! let again = parse(&disassemble(&program)).unwrap();
//! assert_eq!(again.instructions, program.instructions);
//! ```
//!
//! # Grammar
//!
//! - `-- ...` is a comment, anywhere on a line.
//! - `define ...` opens a block skipped up to a blank line or a line ending
//!   in `;`. Lines starting with `comment` are skipped.
//! - `name:` declares a label pointing at the next instruction.
//! - Anything else is `opcode [operand]`, where the operand is `N`, `[N]`
//!   or a label name depending on the opcode.

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use disassembler::HEADER;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{render_tokens, tokenize, Span, Token, TokenKind};
pub use parser::parse_tokens;

use hrm_common::Program;
use log::debug;

/// Parse program text.
///
/// Returns the first error encountered. Fix one error at a time.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let program = parse_tokens(&tokenize(source))?;
    debug!(
        "parsed {} instructions, {} labels",
        program.len(),
        program.labels.len()
    );
    Ok(program)
}

/// Print a program in canonical form.
pub fn disassemble(program: &Program) -> String {
    disassembler::disassemble(program)
}
