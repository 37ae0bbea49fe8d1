//! Disassembler: program → canonical source text.
//!
//! Output mirrors the game's own export format: a header comment, labels at
//! column 0, instructions indented four spaces. No comments, no blank lines
//! after the header.

use hrm_common::Program;

/// First line of every canonical listing.
pub const HEADER: &str = "-- HUMAN RESOURCE MACHINE PROGRAM --";

/// Print a program in canonical form.
///
/// Parsing the output yields the same instructions and labels.
pub fn disassemble(program: &Program) -> String {
    let mut lines = vec![HEADER.to_string(), String::new()];

    for (index, instr) in program.instructions.iter().enumerate() {
        lines.extend(program.labels_at(index).map(|name| format!("{name}:")));
        lines.push(format!("    {instr}"));
    }

    // Labels at (or, in hand-built programs, past) the end.
    lines.extend(
        program
            .labels
            .iter()
            .filter(|&(_, &target)| target >= program.len())
            .map(|(name, _)| format!("{name}:")),
    );

    let mut text = lines.join("\n");
    text.push('\n');
    text
}
