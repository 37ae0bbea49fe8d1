//! Per-instruction trace for `hrmi run -v`.
//!
//! Each executed instruction prints one line: the instruction, then the
//! state changes it caused, separated by ` / `.

use std::collections::BTreeSet;

use hrm_common::{Instruction, Value};
use hrm_vm::{MachineState, Step};

/// Width of the instruction column (`copyfrom [99]` plus padding).
const COLUMN: usize = 15;

/// Describe one step, given the state before and after it.
///
/// `instr` is `None` when the step ran off the end of the program.
pub fn describe(
    instr: Option<&Instruction>,
    before: &MachineState,
    after: &MachineState,
    step: &Step,
) -> String {
    let head = instr.map_or_else(|| "(end)".to_string(), ToString::to_string);

    let mut changes = Vec::new();
    match step {
        Step::Failed(err) => changes.push(format!("error: {err}")),
        Step::Continue | Step::Halted => {
            let halted = *step == Step::Halted;
            changes.extend(state_changes(before, after, halted));
            if halted {
                changes.push("halt".to_string());
            }
        }
    }

    format!("{head:<COLUMN$}{}", changes.join(" / "))
        .trim_end()
        .to_string()
}

fn state_changes(before: &MachineState, after: &MachineState, halted: bool) -> Vec<String> {
    let mut changes = Vec::new();

    let took = after.inbox.len() < before.inbox.len();
    if took {
        changes.push(format!("in {}", show(after.hands)));
    }

    let addresses: BTreeSet<usize> = before.tiles.keys().chain(after.tiles.keys()).copied().collect();
    for address in addresses {
        let value = after.tile(address);
        if before.tile(address) != value {
            changes.push(format!("tile {address}={}", show(value)));
        }
    }

    let put = after.outbox.len() > before.outbox.len();
    if let (true, Some(value)) = (put, after.outbox.last()) {
        changes.push(format!("out {value}"));
    }

    if !took && !put && before.hands != after.hands {
        changes.push(format!("hands={}", show(after.hands)));
    }

    // A halt on an empty inbox leaves ip in place.
    if after.ip != before.ip + 1 && !(halted && after.ip == before.ip) {
        changes.push(format!("jump {}", after.ip));
    }

    changes
}

fn show(value: Option<Value>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Space-separated values, as printed for the inbox and outbox.
pub fn join(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
