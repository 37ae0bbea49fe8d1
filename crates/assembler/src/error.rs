//! Error types for the HRM parser.

use hrm_common::{Opcode, OperandKind};
use thiserror::Error;

use crate::lexer::Span;

/// What went wrong while parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The first word of an operation line is not a known mnemonic.
    #[error("unknown operation '{0}'")]
    UnknownOpcode(String),

    /// An opcode was written without its argument.
    #[error("{opcode} expects {expected}")]
    MissingArgument {
        opcode: Opcode,
        expected: OperandKind,
    },

    /// A token appeared where it was not expected (e.g. an extra argument).
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    /// A tile operation was given something other than an address.
    #[error("{opcode} expects a tile address, got '{token}'")]
    ExpectedAddress { opcode: Opcode, token: String },

    /// A jump was given something other than a label name.
    #[error("{opcode} expects a label, got '{token}'")]
    ExpectedLabel { opcode: Opcode, token: String },

    /// An integer literal does not fit in 64 bits.
    #[error("invalid integer '{0}'")]
    InvalidInteger(String),

    /// A tile address is negative or too large.
    #[error("invalid tile address '{0}'")]
    InvalidAddress(String),

    /// Bracketed operand other than `[N]`.
    #[error("malformed indirect address '{0}'")]
    MalformedIndirect(String),

    /// The same label was declared twice.
    #[error("duplicate label '{0}'")]
    DuplicateLabel(String),

    /// A label name is empty or contains whitespace or brackets.
    #[error("invalid label '{0}'")]
    InvalidLabel(String),

    /// A jump names a label that is never declared.
    #[error("undefined label '{0}'")]
    UndefinedLabel(String),
}

/// A parse failure, located in the source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based source line.
    pub line: usize,
    /// Columns of the offending token, when there is one.
    pub span: Option<Span>,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, span: Option<Span>, kind: ParseErrorKind) -> Self {
        Self { line, span, kind }
    }

    /// Render the error with the offending source line and a caret marker.
    ///
    /// ```text
    /// line 2: unknown operation 'inbx'
    ///   2 |     inbx
    ///     |     ^^^^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let mut out = self.to_string();
        let Some(text) = source.lines().nth(self.line.saturating_sub(1)) else {
            return out;
        };

        let gutter = self.line.to_string();
        let pad = " ".repeat(gutter.len());
        out.push_str(&format!("\n {gutter} | {text}"));

        if let Some(span) = self.span {
            let before = text.get(..span.start).map_or(0, |s| s.chars().count());
            let width = text
                .get(span.start..span.end)
                .map_or(1, |s| s.chars().count())
                .max(1);
            out.push_str(&format!(
                "\n {pad} | {}{}",
                " ".repeat(before),
                "^".repeat(width)
            ));
        }
        out
    }
}
