//! HRM virtual machine: executes parsed programs one instruction at a time.
//!
//! The machine has:
//! - A pair of hands holding at most one value
//! - Floor tiles addressed by non-negative integers
//! - An inbox consumed from the front and an append-only outbox
//!
//! A [`Machine`] is a validated, immutable view of a program. Each call to
//! [`Machine::start`] creates an independent [`Execution`] that owns its
//! state and advances with [`Execution::step`].
//!
//! # Usage
//!
//! ```
//! use hrm_common::Value;
//! use hrm_vm::{Machine, Step, Tiles};
//!
//! let program = hrm_assembler::parse("in:\n  inbox\n  outbox\n  jump in\n").unwrap();
//! let machine = Machine::new(&program).unwrap();
//!
//! let inbox = [Value::Int(1), Value::Char('B')];
//! assert_eq!(machine.run(inbox, Tiles::new()).unwrap(), inbox);
//!
//! let mut exec = machine.start([Value::Int(7)], Tiles::new());
//! assert_eq!(exec.step(), Step::Continue);
//! assert_eq!(exec.state().hands, Some(Value::Int(7)));
//! ```

pub mod error;
mod execute;
pub mod machine;
pub mod validate;

pub use error::{Error, ProgramError, RuntimeError};
pub use machine::{Execution, Machine, MachineState, Status, Step, Tiles, DEFAULT_STEP_LIMIT};
pub use validate::validate;

use hrm_common::{Program, Value};

/// Validate a program and run it to completion with the default step limit.
///
/// # Errors
///
/// Returns [`Error::Program`] if the program is malformed and
/// [`Error::Runtime`] if execution fails.
pub fn run(
    program: &Program,
    inbox: impl IntoIterator<Item = Value>,
    tiles: Tiles,
) -> Result<Vec<Value>, Error> {
    let machine = Machine::new(program)?;
    Ok(machine.run(inbox, tiles)?)
}
