//! Opcode dispatch and instruction semantics.

use hrm_common::{Address, Instruction, Opcode, Operand, Value};
use log::trace;

use crate::error::RuntimeError;
use crate::machine::Execution;

/// Where control goes after an instruction.
enum Flow {
    /// Fall through to the next instruction.
    Next,
    /// Continue at the given index.
    Jump(usize),
    /// Stop successfully.
    Halt,
}

impl Execution<'_> {
    /// Execute one instruction. `Ok(false)` means the program halted.
    pub(crate) fn advance(&mut self) -> Result<bool, RuntimeError> {
        let at = self.state.ip;
        let program = self.program;
        let Some(instr) = program.instructions.get(at) else {
            return Ok(false);
        };

        if let Some(limit) = self.step_limit {
            if self.steps >= limit {
                return Err(RuntimeError::TooManySteps { limit });
            }
        }
        self.steps += 1;
        trace!("{at:>4}: {instr}");

        match self.dispatch(at, instr)? {
            Flow::Next => {
                self.state.ip = at + 1;
                Ok(self.state.ip < program.len())
            }
            Flow::Jump(target) => {
                if target > program.len() {
                    return Err(RuntimeError::InvalidJumpTarget { at, target });
                }
                self.state.ip = target;
                Ok(target < program.len())
            }
            Flow::Halt => Ok(false),
        }
    }

    fn dispatch(&mut self, at: usize, instr: &Instruction) -> Result<Flow, RuntimeError> {
        match (instr.opcode, &instr.operand) {
            (Opcode::Inbox, _) => Ok(self.exec_inbox()),
            (Opcode::Outbox, _) => self.exec_outbox(at),
            (Opcode::CopyFrom, Operand::Tile(addr)) => self.exec_copyfrom(at, *addr),
            (Opcode::CopyTo, Operand::Tile(addr)) => self.exec_copyto(at, *addr),
            (Opcode::Add, Operand::Tile(addr)) => self.exec_add(at, *addr),
            (Opcode::Sub, Operand::Tile(addr)) => self.exec_sub(at, *addr),
            (Opcode::BumpUp, Operand::Tile(addr)) => self.exec_bump(at, *addr, 1),
            (Opcode::BumpDn, Operand::Tile(addr)) => self.exec_bump(at, *addr, -1),
            (Opcode::Jump, Operand::Label { target, .. }) => Ok(Flow::Jump(*target)),
            (Opcode::JumpZ, Operand::Label { target, .. }) => self.exec_jumpz(at, *target),
            (Opcode::JumpN, Operand::Label { target, .. }) => self.exec_jumpn(at, *target),
            (_, _) => Err(RuntimeError::Malformed { at }),
        }
    }

    // ---- state access ----

    fn hands(&self, at: usize) -> Result<Value, RuntimeError> {
        self.state.hands.ok_or(RuntimeError::EmptyHands { at })
    }

    fn read_tile(&self, at: usize, address: usize) -> Result<Value, RuntimeError> {
        self.state
            .tile(address)
            .ok_or(RuntimeError::EmptyTile { at, address })
    }

    /// Effective tile index of an address operand.
    fn resolve(&self, at: usize, addr: Address) -> Result<usize, RuntimeError> {
        match addr {
            Address::Direct(n) => Ok(n),
            Address::Indirect(n) => {
                let value = self.read_tile(at, n)?;
                value
                    .as_int()
                    .and_then(|k| usize::try_from(k).ok())
                    .ok_or(RuntimeError::NotAnAddress {
                        at,
                        address: n,
                        value,
                    })
            }
        }
    }

    fn load(&self, at: usize, addr: Address) -> Result<Value, RuntimeError> {
        let address = self.resolve(at, addr)?;
        self.read_tile(at, address)
    }

    // ---- opcodes ----

    fn exec_inbox(&mut self) -> Flow {
        match self.state.inbox.pop_front() {
            Some(value) => {
                self.state.hands = Some(value);
                Flow::Next
            }
            None => Flow::Halt,
        }
    }

    fn exec_outbox(&mut self, at: usize) -> Result<Flow, RuntimeError> {
        let value = self.hands(at)?;
        self.state.outbox.push(value);
        self.state.hands = None;
        Ok(Flow::Next)
    }

    fn exec_copyfrom(&mut self, at: usize, addr: Address) -> Result<Flow, RuntimeError> {
        self.state.hands = Some(self.load(at, addr)?);
        Ok(Flow::Next)
    }

    fn exec_copyto(&mut self, at: usize, addr: Address) -> Result<Flow, RuntimeError> {
        let value = self.hands(at)?;
        let address = self.resolve(at, addr)?;
        self.state.tiles.insert(address, Some(value));
        Ok(Flow::Next)
    }

    fn exec_add(&mut self, at: usize, addr: Address) -> Result<Flow, RuntimeError> {
        let held = self.hands(at)?;
        let Value::Int(a) = held else {
            return Err(RuntimeError::CannotAddTo { at, value: held });
        };
        let value = self.load(at, addr)?;
        let Value::Int(b) = value else {
            return Err(RuntimeError::CannotAdd { at, value });
        };
        let sum = a.checked_add(b).ok_or(RuntimeError::Overflow { at })?;
        self.state.hands = Some(Value::Int(sum));
        Ok(Flow::Next)
    }

    fn exec_sub(&mut self, at: usize, addr: Address) -> Result<Flow, RuntimeError> {
        let held = self.hands(at)?;
        let value = self.load(at, addr)?;
        let diff = match (held, value) {
            (Value::Int(a), Value::Int(b)) => a.checked_sub(b).ok_or(RuntimeError::Overflow { at })?,
            (Value::Char(a), Value::Char(b)) => i64::from(u32::from(a)) - i64::from(u32::from(b)),
            _ => {
                return Err(RuntimeError::CannotSub {
                    at,
                    value,
                    from: held,
                })
            }
        };
        self.state.hands = Some(Value::Int(diff));
        Ok(Flow::Next)
    }

    fn exec_bump(&mut self, at: usize, addr: Address, delta: i64) -> Result<Flow, RuntimeError> {
        let address = self.resolve(at, addr)?;
        let value = self.read_tile(at, address)?;
        let Value::Int(n) = value else {
            return Err(if delta > 0 {
                RuntimeError::CannotIncrement { at, value }
            } else {
                RuntimeError::CannotDecrement { at, value }
            });
        };
        let bumped = Value::Int(n.checked_add(delta).ok_or(RuntimeError::Overflow { at })?);
        self.state.tiles.insert(address, Some(bumped));
        self.state.hands = Some(bumped);
        Ok(Flow::Next)
    }

    fn exec_jumpz(&mut self, at: usize, target: usize) -> Result<Flow, RuntimeError> {
        if self.hands(at)?.is_zero() {
            Ok(Flow::Jump(target))
        } else {
            Ok(Flow::Next)
        }
    }

    fn exec_jumpn(&mut self, at: usize, target: usize) -> Result<Flow, RuntimeError> {
        match self.hands(at)? {
            Value::Int(n) if n < 0 => Ok(Flow::Jump(target)),
            Value::Int(_) => Ok(Flow::Next),
            value @ Value::Char(_) => Err(RuntimeError::CannotCompare { at, value }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RuntimeError;
    use crate::machine::{Machine, Step, Tiles};
    use hrm_common::{Instruction, Opcode, Program, Value};
    use std::collections::BTreeMap;
    use Value::{Char, Int};

    fn run(
        instructions: Vec<Instruction>,
        inbox: Vec<Value>,
        tiles: Tiles,
    ) -> Result<Vec<Value>, RuntimeError> {
        let program = Program::new(instructions, BTreeMap::new());
        Machine::new(&program).unwrap().run(inbox, tiles)
    }

    fn tiles(pairs: &[(usize, Value)]) -> Tiles {
        pairs.iter().map(|&(a, v)| (a, Some(v))).collect()
    }

    #[test]
    fn outbox_with_empty_hands() {
        assert_eq!(
            run(vec![Instruction::bare(Opcode::Outbox)], vec![], Tiles::new()),
            Err(RuntimeError::EmptyHands { at: 0 })
        );
    }

    #[test]
    fn copyfrom_empty_tile() {
        let err = run(vec![Instruction::direct(Opcode::CopyFrom, 0)], vec![], Tiles::new()).unwrap_err();
        assert_eq!(err, RuntimeError::EmptyTile { at: 0, address: 0 });
        assert_eq!(err.to_string(), "tile 0 is empty at instruction 0");
    }

    #[test]
    fn explicitly_empty_tile_reads_as_empty() {
        let floor = Tiles::from([(2, None)]);
        assert_eq!(
            run(vec![Instruction::direct(Opcode::CopyFrom, 2)], vec![], floor),
            Err(RuntimeError::EmptyTile { at: 0, address: 2 })
        );
    }

    #[test]
    fn copyto_then_copyfrom() {
        let out = run(
            vec![
                Instruction::bare(Opcode::Inbox),
                Instruction::direct(Opcode::CopyTo, 4),
                Instruction::bare(Opcode::Outbox),
                Instruction::direct(Opcode::CopyFrom, 4),
                Instruction::bare(Opcode::Outbox),
            ],
            vec![Char('Q')],
            Tiles::new(),
        );
        assert_eq!(out, Ok(vec![Char('Q'), Char('Q')]));
    }

    #[test]
    fn copyto_with_empty_hands() {
        assert_eq!(
            run(vec![Instruction::direct(Opcode::CopyTo, 0)], vec![], Tiles::new()),
            Err(RuntimeError::EmptyHands { at: 0 })
        );
    }

    #[test]
    fn add_ints_and_type_errors() {
        let prog = vec![
            Instruction::bare(Opcode::Inbox),
            Instruction::direct(Opcode::Add, 0),
            Instruction::bare(Opcode::Outbox),
        ];
        assert_eq!(run(prog.clone(), vec![Int(2)], tiles(&[(0, Int(40))])), Ok(vec![Int(42)]));
        assert_eq!(
            run(prog.clone(), vec![Char('A')], tiles(&[(0, Int(1))])),
            Err(RuntimeError::CannotAddTo { at: 1, value: Char('A') })
        );
        assert_eq!(
            run(prog, vec![Int(1)], tiles(&[(0, Char('Z'))])),
            Err(RuntimeError::CannotAdd { at: 1, value: Char('Z') })
        );
    }

    #[test]
    fn add_overflow() {
        let prog = vec![Instruction::bare(Opcode::Inbox), Instruction::direct(Opcode::Add, 0)];
        assert_eq!(
            run(prog, vec![Int(i64::MAX)], tiles(&[(0, Int(1))])),
            Err(RuntimeError::Overflow { at: 1 })
        );
    }

    #[test]
    fn sub_letters_gives_distance() {
        let prog = vec![
            Instruction::bare(Opcode::Inbox),
            Instruction::direct(Opcode::Sub, 0),
            Instruction::bare(Opcode::Outbox),
        ];
        assert_eq!(run(prog.clone(), vec![Char('D')], tiles(&[(0, Char('A'))])), Ok(vec![Int(3)]));
        assert_eq!(run(prog.clone(), vec![Char('A')], tiles(&[(0, Char('D'))])), Ok(vec![Int(-3)]));
        assert_eq!(run(prog.clone(), vec![Int(5)], tiles(&[(0, Int(7))])), Ok(vec![Int(-2)]));
        let err = run(prog, vec![Int(1)], tiles(&[(0, Char('A'))])).unwrap_err();
        assert_eq!(err, RuntimeError::CannotSub { at: 1, value: Char('A'), from: Int(1) });
        assert_eq!(err.to_string(), "cannot sub A from 1 at instruction 1");
    }

    #[test]
    fn bump_updates_tile_and_hands() {
        let out = run(
            vec![
                Instruction::direct(Opcode::BumpUp, 0),
                Instruction::direct(Opcode::BumpUp, 0),
                Instruction::bare(Opcode::Outbox),
                Instruction::direct(Opcode::BumpDn, 1),
                Instruction::bare(Opcode::Outbox),
                Instruction::direct(Opcode::CopyFrom, 0),
                Instruction::bare(Opcode::Outbox),
            ],
            vec![],
            tiles(&[(0, Int(0)), (1, Int(0))]),
        );
        assert_eq!(out, Ok(vec![Int(2), Int(-1), Int(2)]));
    }

    #[test]
    fn bump_on_letter() {
        let floor = tiles(&[(0, Char('X'))]);
        assert_eq!(
            run(vec![Instruction::direct(Opcode::BumpUp, 0)], vec![], floor.clone()),
            Err(RuntimeError::CannotIncrement { at: 0, value: Char('X') })
        );
        assert_eq!(
            run(vec![Instruction::direct(Opcode::BumpDn, 0)], vec![], floor),
            Err(RuntimeError::CannotDecrement { at: 0, value: Char('X') })
        );
    }

    #[test]
    fn indirect_copyto_writes_through_pointer() {
        let program = Program::new(
            vec![
                Instruction::bare(Opcode::Inbox),
                Instruction::indirect(Opcode::CopyTo, 0),
            ],
            BTreeMap::new(),
        );
        let machine = Machine::new(&program).unwrap();
        let mut exec = machine.start([Int(42)], tiles(&[(0, Int(5))]));
        while exec.step() == Step::Continue {}
        assert_eq!(exec.state().tile(5), Some(Int(42)));
        assert_eq!(exec.state().tile(0), Some(Int(5)));
    }

    #[test]
    fn malformed_instruction_in_unvalidated_program() {
        let broken = Program::new(vec![Instruction::bare(Opcode::CopyTo)], BTreeMap::new());
        let valid = Program::new(vec![Instruction::bare(Opcode::Inbox)], BTreeMap::new());
        let mut exec = Machine::new(&valid).unwrap().start([], Tiles::new());
        exec.program = &broken;
        assert_eq!(exec.step(), Step::Failed(RuntimeError::Malformed { at: 0 }));
    }

    #[test]
    fn indirect_through_bad_pointers() {
        let prog = vec![Instruction::indirect(Opcode::CopyFrom, 0)];
        assert_eq!(
            run(prog.clone(), vec![], Tiles::new()),
            Err(RuntimeError::EmptyTile { at: 0, address: 0 })
        );
        assert_eq!(
            run(prog.clone(), vec![], tiles(&[(0, Char('A'))])),
            Err(RuntimeError::NotAnAddress { at: 0, address: 0, value: Char('A') })
        );
        assert_eq!(
            run(prog.clone(), vec![], tiles(&[(0, Int(-1))])),
            Err(RuntimeError::NotAnAddress { at: 0, address: 0, value: Int(-1) })
        );
        assert_eq!(
            run(prog, vec![], tiles(&[(0, Int(3))])),
            Err(RuntimeError::EmptyTile { at: 0, address: 3 })
        );
    }

    #[test]
    fn inbox_replaces_held_value() {
        let out = run(
            vec![
                Instruction::bare(Opcode::Inbox),
                Instruction::bare(Opcode::Inbox),
                Instruction::bare(Opcode::Outbox),
            ],
            vec![Int(1), Int(2)],
            Tiles::new(),
        );
        assert_eq!(out, Ok(vec![Int(2)]));
    }

    #[test]
    fn jumps_need_held_value() {
        let program = Program::new(
            vec![Instruction::jump(Opcode::JumpZ, "end", 1)],
            BTreeMap::from([("end".to_string(), 1)]),
        );
        assert_eq!(
            Machine::new(&program).unwrap().run([], Tiles::new()),
            Err(RuntimeError::EmptyHands { at: 0 })
        );
    }

    #[test]
    fn jumpn_on_letter_fails() {
        let program = Program::new(
            vec![
                Instruction::bare(Opcode::Inbox),
                Instruction::jump(Opcode::JumpN, "end", 2),
            ],
            BTreeMap::from([("end".to_string(), 2)]),
        );
        assert_eq!(
            Machine::new(&program).unwrap().run([Char('A')], Tiles::new()),
            Err(RuntimeError::CannotCompare { at: 1, value: Char('A') })
        );
    }

    #[test]
    fn jumpz_on_letter_falls_through() {
        let program = Program::new(
            vec![
                Instruction::bare(Opcode::Inbox),
                Instruction::jump(Opcode::JumpZ, "end", 3),
                Instruction::bare(Opcode::Outbox),
            ],
            BTreeMap::from([("end".to_string(), 3)]),
        );
        assert_eq!(
            Machine::new(&program).unwrap().run([Char('A')], Tiles::new()),
            Ok(vec![Char('A')])
        );
    }

    #[test]
    fn jump_past_end_of_unvalidated_program() {
        let program = Program::new(
            vec![Instruction::jump(Opcode::Jump, "far", 9)],
            BTreeMap::from([("far".to_string(), 9)]),
        );
        // Bypass validation.
        let valid = Program::new(
            vec![Instruction::jump(Opcode::Jump, "end", 1)],
            BTreeMap::from([("end".to_string(), 1)]),
        );
        let mut exec = Machine::new(&valid).unwrap().start([], Tiles::new());
        exec.program = &program;
        assert_eq!(
            exec.step(),
            Step::Failed(RuntimeError::InvalidJumpTarget { at: 0, target: 9 })
        );
    }
}
