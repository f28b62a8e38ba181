//! Target code generation for straight-line programs.
mod emitter;
mod lifetime_analysis;
mod machine;
mod register_allocation;
mod straight_line;

pub use emitter::emit;
pub use lifetime_analysis::{analyse, LineAnalysis, LiveSet, NextUse};
pub use machine::{MachineInstr, MachineListing, MachineOperand, Register};
pub use register_allocation::{RegisterAllocator, RegisterFile};
pub use straight_line::{Operand, Quad, StraightLine};

use crate::listing::Listing;

/// The dataflow facts of every instruction, in the layout of the emitter's
/// diagnostic blocks but without any code.
pub fn liveness_report(program: &StraightLine) -> Listing<String> {
    let mut report = Listing::new();

    for ((position, quad), analysis) in program.lines().iter_lines().zip(analyse(program)) {
        report.push(format!("{}: {}", position, quad));
        for line in analysis.describe() {
            report.push(format!("  {}", line));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use crate::{config::RegisterCapacity, reader::read};

    use super::*;

    #[test]
    fn liveness_report_lists_every_instruction() {
        let program = read("num a, b; a = b; b = a + 1; return b", RegisterCapacity::default())
            .unwrap();

        let report: Vec<_> = liveness_report(&program).into_instructions().collect();

        assert_eq!(10, report.len());
        assert_eq!("0: a = #0 + b", report[0]);
        assert_eq!("  Life_IN  : [b]", report[1]);
        assert_eq!("1: b = a + #1", report[5]);
        assert_eq!("  Life_OUT : [b]", report[7]);
    }
}
