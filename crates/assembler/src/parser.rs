//! Parser for HRM tokens → program.
//!
//! Works line by line: a line is empty, a label declaration, or one
//! operation. Jump targets are resolved after the whole file has been read,
//! so forward references are legal.

use std::collections::BTreeMap;

use hrm_common::{Address, Instruction, Opcode, Operand, OperandKind, Program};

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Span, Token, TokenKind};

/// A jump whose label still has to be looked up.
struct PendingJump {
    index: usize,
    line: usize,
    span: Span,
}

/// Parse a token stream into a program.
pub fn parse_tokens(tokens: &[Token]) -> Result<Program, ParseError> {
    let mut instructions = Vec::new();
    let mut lines = Vec::new();
    let mut labels: BTreeMap<String, usize> = BTreeMap::new();
    let mut pending = Vec::new();

    for group in tokens.chunk_by(|a, b| a.line == b.line) {
        let significant: Vec<&Token> = group.iter().filter(|t| t.is_significant()).collect();
        let Some((&first, args)) = significant.split_first() else {
            continue;
        };
        let line = first.line;

        match first.kind {
            TokenKind::LabelDef => {
                let name = first.label_name().unwrap_or_default();
                if !is_valid_label(name) {
                    return Err(error(first, ParseErrorKind::InvalidLabel(name.to_string())));
                }
                if let Some(&extra) = args.first() {
                    return Err(unexpected(extra));
                }
                if labels.insert(name.to_string(), instructions.len()).is_some() {
                    return Err(error(first, ParseErrorKind::DuplicateLabel(name.to_string())));
                }
            }
            TokenKind::Word => {
                let opcode: Opcode = first
                    .text
                    .parse()
                    .map_err(|_| error(first, ParseErrorKind::UnknownOpcode(first.text.clone())))?;
                let operand = parse_operand(opcode, first, args)?;
                if let Operand::Label { .. } = operand {
                    pending.push(PendingJump {
                        index: instructions.len(),
                        line,
                        span: args[0].span,
                    });
                }
                instructions.push(Instruction::new(opcode, operand));
                lines.push(line);
            }
            _ => return Err(unexpected(first)),
        }
    }

    for jump in pending {
        if let Operand::Label { name, target } = &mut instructions[jump.index].operand {
            *target = labels.get(name.as_str()).copied().ok_or_else(|| {
                ParseError::new(
                    jump.line,
                    Some(jump.span),
                    ParseErrorKind::UndefinedLabel(name.clone()),
                )
            })?;
        }
    }

    Ok(Program::new(instructions, labels).with_lines(lines))
}

fn is_valid_label(name: &str) -> bool {
    !name.is_empty() && !name.contains(|c: char| c.is_whitespace() || c == '[' || c == ']')
}

fn error(token: &Token, kind: ParseErrorKind) -> ParseError {
    ParseError::new(token.line, Some(token.span), kind)
}

fn unexpected(token: &Token) -> ParseError {
    error(token, ParseErrorKind::UnexpectedToken(token.text.clone()))
}

/// Check the arguments of one operation against what its opcode takes.
fn parse_operand(opcode: Opcode, mnemonic: &Token, args: &[&Token]) -> Result<Operand, ParseError> {
    let missing = || {
        error(
            mnemonic,
            ParseErrorKind::MissingArgument {
                opcode,
                expected: opcode.operand_kind(),
            },
        )
    };

    match opcode.operand_kind() {
        OperandKind::None => {
            expect_end(args)?;
            Ok(Operand::None)
        }
        OperandKind::Tile => {
            let first = args.first().ok_or_else(missing)?;
            let (address, used) = match first.kind {
                TokenKind::Integer => (Address::Direct(expect_address(first)?), 1),
                TokenKind::LBracket | TokenKind::RBracket => (expect_indirect(args)?, 3),
                _ => {
                    return Err(error(
                        first,
                        ParseErrorKind::ExpectedAddress {
                            opcode,
                            token: first.text.clone(),
                        },
                    ))
                }
            };
            expect_end(&args[used..])?;
            Ok(Operand::Tile(address))
        }
        OperandKind::Label => {
            let first = args.first().ok_or_else(missing)?;
            match first.kind {
                TokenKind::Word | TokenKind::Integer => {
                    expect_end(&args[1..])?;
                    Ok(Operand::Label {
                        name: first.text.clone(),
                        target: 0,
                    })
                }
                _ => Err(error(
                    first,
                    ParseErrorKind::ExpectedLabel {
                        opcode,
                        token: first.text.clone(),
                    },
                )),
            }
        }
    }
}

/// Parse an integer token as a non-negative tile address.
fn expect_address(token: &Token) -> Result<usize, ParseError> {
    let n: i64 = token
        .text
        .parse()
        .map_err(|_| error(token, ParseErrorKind::InvalidInteger(token.text.clone())))?;
    usize::try_from(n).map_err(|_| error(token, ParseErrorKind::InvalidAddress(token.text.clone())))
}

/// Parse `[ N ]` from the start of `args`.
fn expect_indirect(args: &[&Token]) -> Result<Address, ParseError> {
    match args {
        [open, inner, close, ..]
            if open.kind == TokenKind::LBracket
                && inner.kind == TokenKind::Integer
                && close.kind == TokenKind::RBracket =>
        {
            Ok(Address::Indirect(expect_address(inner)?))
        }
        _ => {
            // Report everything up to the first closing bracket (or the end).
            let end = args
                .iter()
                .position(|t| t.kind == TokenKind::RBracket)
                .map_or(args.len(), |i| i + 1);
            let covered = &args[..end];
            let text: Vec<&str> = covered.iter().map(|t| t.text.as_str()).collect();
            let span = covered[0].span.to(covered[end - 1].span);
            Err(ParseError::new(
                covered[0].line,
                Some(span),
                ParseErrorKind::MalformedIndirect(text.join(" ")),
            ))
        }
    }
}

/// Check that there are no extra tokens.
fn expect_end(remaining: &[&Token]) -> Result<(), ParseError> {
    match remaining.first() {
        Some(&tok) => Err(unexpected(tok)),
        None => Ok(()),
    }
}
