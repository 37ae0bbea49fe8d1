//! CLI command implementations.

use std::fs;
use std::path::Path;

use hrm_common::{Program, Value};
use hrm_vm::{Machine, RuntimeError, Step, Tiles};
use log::info;

use crate::input::{self, Fixture};
use crate::trace;

/// Read a file, reporting failures as input errors.
fn read_file(path: &Path) -> Result<String, i32> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        1
    })
}

/// Read and parse a program.
fn load_program(path: &Path) -> Result<(String, Program), i32> {
    let text = read_file(path)?;
    let program = hrm_assembler::parse(&text).map_err(|e| {
        eprintln!("error: {}: {}", path.display(), e.render(&text));
        1
    })?;
    Ok((text, program))
}

/// Validate a parsed program and wrap it in a machine.
fn load_machine(program: &Program, max_steps: u64) -> Result<Machine<'_>, i32> {
    if let Err(errors) = hrm_vm::validate(program) {
        for e in &errors {
            eprintln!("error: {e}");
        }
        return Err(2);
    }
    let limit = (max_steps > 0).then_some(max_steps);
    Machine::new(program)
        .map(|m| m.with_step_limit(limit))
        .map_err(|e| {
            eprintln!("error: {e}");
            2
        })
}

/// Print a runtime error with the source line of the failing instruction.
fn report_runtime_error(err: &RuntimeError, program: &Program, source: &str) {
    eprintln!("runtime error: {err}");
    let line = err.at().and_then(|at| program.line_of(at));
    if let Some(line) = line {
        if let Some(text) = source.lines().nth(line - 1) {
            eprintln!("  --> line {line}: {}", text.trim());
        }
    }
}

/// Parse, validate and execute a program, printing its outbox.
pub fn run(
    path: &Path,
    inbox: Option<&str>,
    tiles: Option<&str>,
    verbose: bool,
    max_steps: u64,
) -> Result<(), i32> {
    let (source, program) = load_program(path)?;
    let inbox = input::parse_inbox(inbox.unwrap_or_default()).map_err(|e| {
        eprintln!("error: inbox: {e}");
        1
    })?;
    let tiles = match tiles {
        Some(text) => input::parse_tiles(text).map_err(|e| {
            eprintln!("error: tiles: {e}");
            1
        })?,
        None => Tiles::new(),
    };
    let machine = load_machine(&program, max_steps)?;
    info!(
        "running {} ({} instructions) with {} inbox values",
        path.display(),
        program.len(),
        inbox.len()
    );

    if !verbose {
        return match machine.run(inbox, tiles) {
            Ok(outbox) => {
                println!("{}", trace::join(&outbox));
                Ok(())
            }
            Err(e) => {
                report_runtime_error(&e, &program, &source);
                Err(3)
            }
        };
    }

    println!("< {}", trace::join(&inbox));
    let mut exec = machine.start(inbox, tiles);
    loop {
        let before = exec.state().clone();
        let step = exec.step();
        let instr = program.instructions.get(before.ip);
        println!("{}", trace::describe(instr, &before, exec.state(), &step));
        match step {
            Step::Continue => {}
            Step::Halted => break,
            Step::Failed(e) => {
                report_runtime_error(&e, &program, &source);
                return Err(3);
            }
        }
    }
    println!("> {}", trace::join(exec.outbox()));
    Ok(())
}

/// Parse and validate a program, reporting every problem.
pub fn check(path: &Path) -> Result<(), i32> {
    let (_, program) = load_program(path)?;
    match hrm_vm::validate(&program) {
        Ok(()) => {
            println!(
                "OK: {} ({} instructions, {} labels)",
                path.display(),
                program.len(),
                program.labels.len()
            );
            Ok(())
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("error: {e}");
            }
            Err(2)
        }
    }
}

/// Print a program in canonical form.
pub fn fmt(path: &Path) -> Result<(), i32> {
    let (_, program) = load_program(path)?;
    print!("{}", hrm_assembler::disassemble(&program));
    Ok(())
}

/// Outcome of one fixture example.
enum Outcome {
    Pass,
    Mismatch(Vec<Value>),
    Error(RuntimeError),
}

/// Run every example of a fixture and compare outboxes.
pub fn test(path: &Path, fixture_path: &Path, max_steps: u64) -> Result<(), i32> {
    let (_, program) = load_program(path)?;
    let text = read_file(fixture_path)?;
    let fixture = Fixture::from_json(&text).map_err(|e| {
        eprintln!("error: {}: {e}", fixture_path.display());
        1
    })?;
    let machine = load_machine(&program, max_steps)?;
    let tiles = fixture.tiles();

    let mut passed = 0;
    for (i, example) in fixture.examples.iter().enumerate() {
        let outcome = match machine.run(example.inbox.iter().copied(), tiles.clone()) {
            Ok(out) if out == example.outbox => Outcome::Pass,
            Ok(out) => Outcome::Mismatch(out),
            Err(e) => Outcome::Error(e),
        };
        match outcome {
            Outcome::Pass => {
                passed += 1;
                println!("example {i}: ok");
            }
            Outcome::Mismatch(out) => println!(
                "example {i}: FAILED\n  expected: {}\n  got:      {}",
                trace::join(&example.outbox),
                trace::join(&out)
            ),
            Outcome::Error(e) => println!("example {i}: FAILED\n  runtime error: {e}"),
        }
    }

    let total = fixture.examples.len();
    println!("{passed}/{total} examples passed");
    if passed == total {
        Ok(())
    } else {
        Err(4)
    }
}
