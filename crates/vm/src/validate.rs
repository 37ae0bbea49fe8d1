//! Structural validation of programs before execution.
//!
//! The parser already guarantees everything checked here. Programs can also
//! be built or edited by hand, so the VM re-checks before running one.

use hrm_common::{Operand, Program};

use crate::error::ProgramError;

/// Check a program and collect every problem found.
///
/// An empty result means the program is safe to execute: every operand
/// matches its opcode and every jump lands inside `0..=len`.
pub fn check_program(program: &Program) -> Vec<ProgramError> {
    let mut errors = Vec::new();
    let len = program.len();

    for (label, &target) in &program.labels {
        if target > len {
            errors.push(ProgramError::LabelOutOfRange {
                label: label.clone(),
                target,
                len,
            });
        }
    }

    for (at, instr) in program.instructions.iter().enumerate() {
        if !instr.is_well_formed() {
            errors.push(ProgramError::OperandMismatch {
                at,
                opcode: instr.opcode,
                expected: instr.opcode.operand_kind(),
            });
            continue;
        }

        if let Operand::Label { name, target } = &instr.operand {
            match program.label(name) {
                None => errors.push(ProgramError::UndefinedLabel {
                    at,
                    label: name.clone(),
                }),
                Some(expected) if expected != *target => {
                    errors.push(ProgramError::LabelMismatch {
                        at,
                        label: name.clone(),
                        target: *target,
                        expected,
                    })
                }
                Some(_) => {}
            }
        }
    }

    errors
}

/// Validate a program, returning every problem on failure.
pub fn validate(program: &Program) -> Result<(), Vec<ProgramError>> {
    let errors = check_program(program);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrm_common::{Instruction, Opcode, OperandKind};
    use std::collections::BTreeMap;

    fn labels(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
        pairs.iter().map(|&(n, t)| (n.to_string(), t)).collect()
    }

    #[test]
    fn valid_program_passes() {
        let program = Program::new(
            vec![
                Instruction::bare(Opcode::Inbox),
                Instruction::jump(Opcode::JumpZ, "end", 3),
                Instruction::jump(Opcode::Jump, "top", 0),
            ],
            labels(&[("top", 0), ("end", 3)]),
        );
        assert_eq!(validate(&program), Ok(()));
    }

    #[test]
    fn operand_mismatch() {
        let program = Program::new(
            vec![
                Instruction::direct(Opcode::Inbox, 0),
                Instruction::bare(Opcode::CopyTo),
            ],
            BTreeMap::new(),
        );
        assert_eq!(
            check_program(&program),
            vec![
                ProgramError::OperandMismatch {
                    at: 0,
                    opcode: Opcode::Inbox,
                    expected: OperandKind::None
                },
                ProgramError::OperandMismatch {
                    at: 1,
                    opcode: Opcode::CopyTo,
                    expected: OperandKind::Tile
                },
            ]
        );
    }

    #[test]
    fn undefined_label() {
        let program = Program::new(
            vec![Instruction::jump(Opcode::Jump, "gone", 0)],
            BTreeMap::new(),
        );
        assert_eq!(
            check_program(&program),
            vec![ProgramError::UndefinedLabel {
                at: 0,
                label: "gone".to_string()
            }]
        );
    }

    #[test]
    fn stale_target() {
        let program = Program::new(
            vec![
                Instruction::bare(Opcode::Inbox),
                Instruction::jump(Opcode::Jump, "a", 0),
            ],
            labels(&[("a", 1)]),
        );
        assert_eq!(
            check_program(&program),
            vec![ProgramError::LabelMismatch {
                at: 1,
                label: "a".to_string(),
                target: 0,
                expected: 1
            }]
        );
    }

    #[test]
    fn label_past_end() {
        let program = Program::new(vec![Instruction::bare(Opcode::Inbox)], labels(&[("far", 2)]));
        assert_eq!(
            check_program(&program),
            vec![ProgramError::LabelOutOfRange {
                label: "far".to_string(),
                target: 2,
                len: 1
            }]
        );
    }

    #[test]
    fn label_at_end_is_fine() {
        let program = Program::new(vec![Instruction::bare(Opcode::Inbox)], labels(&[("end", 1)]));
        assert!(check_program(&program).is_empty());
    }
}
