//! Machine state and the resumable execution driver.

use std::collections::{BTreeMap, VecDeque};

use hrm_common::{Program, Value};
use log::debug;

use crate::error::{ProgramError, RuntimeError};
use crate::validate::check_program;

/// Default bound on executed instructions for [`Machine::run`].
pub const DEFAULT_STEP_LIMIT: u64 = 1_000_000;

/// Floor tiles. `None` is an explicitly empty tile; a missing entry is a
/// tile that was never touched. Both read as empty.
pub type Tiles = BTreeMap<usize, Option<Value>>;

/// Everything that changes while a program runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MachineState {
    /// Index of the next instruction.
    pub ip: usize,
    /// The value the actor carries.
    pub hands: Option<Value>,
    /// Floor contents by address.
    pub tiles: Tiles,
    /// Values still waiting, front first.
    pub inbox: VecDeque<Value>,
    /// Values delivered so far, in order.
    pub outbox: Vec<Value>,
}

impl MachineState {
    /// Contents of a tile, if any.
    pub fn tile(&self, address: usize) -> Option<Value> {
        self.tiles.get(&address).copied().flatten()
    }
}

/// Lifecycle of an [`Execution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Nothing executed yet.
    Ready,
    Running,
    /// Terminated normally.
    Halted,
    /// Terminated with an error.
    Failed,
}

impl Status {
    /// True for `Halted` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Halted | Status::Failed)
    }
}

/// Outcome of a single [`Execution::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// One instruction executed; more may follow.
    Continue,
    /// The program finished.
    Halted,
    /// An instruction's precondition failed.
    Failed(RuntimeError),
}

/// A validated program, ready to be started any number of times.
///
/// Holds no mutable state, so one machine can be shared between threads
/// that each drive their own [`Execution`].
#[derive(Debug, Clone, Copy)]
pub struct Machine<'a> {
    program: &'a Program,
    step_limit: Option<u64>,
}

impl<'a> Machine<'a> {
    /// Validate `program` and wrap it.
    ///
    /// Fails with the first structural problem found. The step limit
    /// defaults to [`DEFAULT_STEP_LIMIT`].
    pub fn new(program: &'a Program) -> Result<Self, ProgramError> {
        if let Some(err) = check_program(program).into_iter().next() {
            return Err(err);
        }
        Ok(Self {
            program,
            step_limit: Some(DEFAULT_STEP_LIMIT),
        })
    }

    /// Bound the number of executed instructions. `None` runs unbounded.
    pub fn with_step_limit(mut self, limit: Option<u64>) -> Self {
        self.step_limit = limit;
        self
    }

    /// The program being executed.
    pub fn program(&self) -> &'a Program {
        self.program
    }

    pub fn step_limit(&self) -> Option<u64> {
        self.step_limit
    }

    /// Begin an execution with the given inbox and floor.
    pub fn start(&self, inbox: impl IntoIterator<Item = Value>, tiles: Tiles) -> Execution<'a> {
        Execution {
            program: self.program,
            step_limit: self.step_limit,
            state: MachineState {
                ip: 0,
                hands: None,
                tiles,
                inbox: inbox.into_iter().collect(),
                outbox: Vec::new(),
            },
            status: Status::Ready,
            steps: 0,
            outcome: None,
        }
    }

    /// Run to completion and return the outbox.
    pub fn run(
        &self,
        inbox: impl IntoIterator<Item = Value>,
        tiles: Tiles,
    ) -> Result<Vec<Value>, RuntimeError> {
        let mut execution = self.start(inbox, tiles);
        loop {
            match execution.step() {
                Step::Continue => {}
                Step::Halted => return Ok(execution.into_outbox()),
                Step::Failed(err) => return Err(err),
            }
        }
    }
}

/// One run of a program, advanced an instruction at a time.
#[derive(Debug, Clone)]
pub struct Execution<'a> {
    pub(crate) program: &'a Program,
    pub(crate) step_limit: Option<u64>,
    pub(crate) state: MachineState,
    status: Status,
    pub(crate) steps: u64,
    outcome: Option<Step>,
}

impl Execution<'_> {
    /// Execute the instruction at `ip`.
    ///
    /// Once the execution has halted or failed, every further call returns
    /// that same result without touching the state.
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        self.status = Status::Running;

        let step = match self.advance() {
            Ok(true) => return Step::Continue,
            Ok(false) => {
                debug!(
                    "halted after {} steps, {} values in outbox",
                    self.steps,
                    self.state.outbox.len()
                );
                self.status = Status::Halted;
                Step::Halted
            }
            Err(err) => {
                debug!("failed after {} steps: {err}", self.steps);
                self.status = Status::Failed;
                Step::Failed(err)
            }
        };
        self.outcome = Some(step.clone());
        step
    }

    /// Current machine state.
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    /// Where the execution is in its lifecycle.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The program being executed.
    pub fn program(&self) -> &Program {
        self.program
    }

    /// Values delivered so far.
    pub fn outbox(&self) -> &[Value] {
        &self.state.outbox
    }

    /// Consume the execution and keep its outbox.
    pub fn into_outbox(self) -> Vec<Value> {
        self.state.outbox
    }
}

/// Yields every step, the terminal one included, then stops.
impl Iterator for Execution<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.status.is_terminal() {
            None
        } else {
            Some(self.step())
        }
    }
}
