//! Target code emission for straight-line programs.

use log::debug;

use crate::{ast::typed::ArithOp, error::BackendError};

use super::{
    lifetime_analysis::{analyse, LineAnalysis},
    machine::{MachineInstr, MachineListing, MachineOperand, Register},
    register_allocation::RegisterAllocator,
    straight_line::{Quad, StraightLine},
};

/// Allocate registers for `program` and emit its target code. Each
/// instruction is announced by a `Step` comment and followed by its dataflow
/// facts; memory is brought up to date for returned variables at the end.
pub fn emit(program: &StraightLine) -> Result<MachineListing, BackendError> {
    debug!(
        "Emitting {} instructions with {} registers",
        program.lines().len(),
        program.capacity()
    );

    let analyses = analyse(program);
    let mut allocator = RegisterAllocator::new(program.capacity());
    let mut code = MachineListing::new();

    for ((position, quad), analysis) in program.lines().iter_lines().zip(&analyses) {
        code.push(MachineInstr::Comment(format!("Step {}", position)));
        emit_quad(quad, analysis, &mut allocator, &mut code)?;
        for line in analysis.describe() {
            code.push(MachineInstr::Comment(line));
        }
    }

    allocator.final_stores(program.returns(), &mut code);

    Ok(code)
}

fn emit_quad(
    quad: &Quad,
    analysis: &LineAnalysis,
    allocator: &mut RegisterAllocator,
    code: &mut MachineListing,
) -> Result<(), BackendError> {
    let (live_in, next_in) = (&analysis.life_in, &analysis.next_in);

    let left = allocator.resolve(quad.left(), live_in, next_in, true, None, code)?;
    let right = allocator.resolve(quad.right(), live_in, next_in, true, left.register(), code)?;
    let target = allocator.resolve_variable(
        quad.assign(),
        &analysis.life_out,
        &analysis.next_out,
        false,
        None,
        code,
    )?;

    if is_identity(quad.op(), target, left, right) {
        debug!("Eliding identity {}", quad);
    } else {
        code.push(MachineInstr::Op(quad.op(), target, left, right));
    }
    allocator.mark_modified(quad.assign());

    Ok(())
}

/// `target = x + 0`, `target = 0 + x` and `target = x - 0` do nothing when
/// `x` already lives in `target`.
fn is_identity(op: ArithOp, target: Register, left: MachineOperand, right: MachineOperand) -> bool {
    let in_target = |operand: MachineOperand| operand.register() == Some(target);

    match op {
        ArithOp::Add => {
            (left.is_zero() && in_target(right)) || (right.is_zero() && in_target(left))
        }
        ArithOp::Sub => right.is_zero() && in_target(left),
        ArithOp::Mul | ArithOp::Div => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::{config::RegisterCapacity, reader::read};

    use super::*;

    macro_rules! assert_emits {
        ($source:expr, [$($line:literal),* $(,)?]) => {{
            let program = read($source, RegisterCapacity::default()).unwrap();
            let code = emit(&program).unwrap();
            let expected: Vec<&str> = vec![$($line),*];
            assert_eq!(expected, instructions(&code));
        }};
    }

    /// Emitted lines without the comments.
    fn instructions(code: &MachineListing) -> Vec<String> {
        code.iter_instructions()
            .filter(|instr| !matches!(instr, MachineInstr::Comment(_)))
            .map(ToString::to_string)
            .collect()
    }

    fn emit_source(source: &str) -> MachineListing {
        emit(&read(source, RegisterCapacity::default()).unwrap()).unwrap()
    }

    #[test]
    fn single_addition_with_two_registers() {
        let code = emit_source(
            "NumberRegister 2; num a; num b; num c; a = b + c; return a;",
        );

        let text: Vec<_> = code.iter_instructions().map(ToString::to_string).collect();
        assert_eq!(
            vec![
                "// Step 0",
                "LD R0, b",
                "LD R1, c",
                "ADD R0, R0, R1",
                "// Life_IN  : [b, c]",
                "// Life_OUT : [a]",
                "// Next_IN  : b:[0], c:[0]",
                "// Next_OUT : ",
                "ST a, R0",
            ],
            text
        );
    }

    #[test]
    fn additive_identities_are_elided() {
        assert_emits!(
            "num t; t = t + 0; t = 0 + t; t = t - 0; return t",
            ["LD R0, t", "ST t, R0"]
        );
    }

    #[test]
    fn subtraction_from_zero_is_kept() {
        assert_emits!(
            "num t; t = 0 - t; return t",
            ["LD R0, t", "MIN R0, #0, R0", "ST t, R0"]
        );
    }

    #[test]
    fn copy_into_other_register_is_kept() {
        assert_emits!(
            "num a, b; a = b; return a",
            ["LD R0, b", "ADD R1, #0, R0", "ST a, R1"]
        );
    }

    #[test]
    fn multiplication_by_zero_is_not_an_identity() {
        assert_emits!(
            "num t; t = t * 0; return t",
            ["LD R0, t", "MUL R0, R0, #0", "ST t, R0"]
        );
    }

    #[test]
    fn spills_live_modified_variable() {
        // With two registers, reloading `a` for `y` takes `x`'s register
        // while `x` is still needed by the final addition.
        assert_emits!(
            "NumberRegister 2
             num a, b, x, y, z
             x = a + b
             y = a * b
             z = x + y
             return z",
            [
                "LD R0, a",
                "LD R1, b",
                "ADD R0, R0, R1",
                "ST x, R0",
                "LD R0, a",
                "MUL R0, R0, R1",
                "LD R1, x",
                "ADD R0, R1, R0",
                "ST z, R0"
            ]
        );
    }

    #[test]
    fn returns_only_modified_variables() {
        assert_emits!(
            "num a, b; a = b * 2; return a, b",
            ["LD R0, b", "MUL R1, R0, #2", "ST a, R1"]
        );
    }

    #[test]
    fn never_uses_more_registers_than_available() {
        let source = "NumberRegister 3
            num a, b, c, d, e, f
            a = b + c
            d = a * e
            f = d - b
            c = f / a
            e = c + d
            b = e - f
            return a, b, c";
        let program = read(source, RegisterCapacity::default()).unwrap();
        let capacity = program.capacity().get();

        let mut allocator = RegisterAllocator::new(program.capacity());
        let mut code = MachineListing::new();
        for ((_, quad), analysis) in program.lines().iter_lines().zip(&analyse(&program)) {
            emit_quad(quad, analysis, &mut allocator, &mut code).unwrap();
            assert!(allocator.resident_count() <= capacity, "after {}", quad);
        }
        assert_eq!(capacity, allocator.resident_count());

        for instr in code.iter_instructions() {
            let registers = match instr {
                MachineInstr::Op(_, target, left, right) => {
                    vec![Some(*target), left.register(), right.register()]
                }
                MachineInstr::Ld(reg, _) | MachineInstr::St(_, reg) => vec![Some(*reg)],
                MachineInstr::Comment(_) => vec![],
            };
            for reg in registers.into_iter().flatten() {
                assert!(reg.0 < 3, "{} in {}", reg, instr);
            }
        }
    }

    #[test]
    fn every_step_is_announced() {
        let code = emit_source("num a, b; a = b; b = a; return b");

        let steps: Vec<_> = code
            .iter_instructions()
            .filter_map(|instr| match instr {
                MachineInstr::Comment(text) if text.starts_with("Step") => Some(text.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(vec!["Step 0", "Step 1"], steps);
    }

    #[test]
    fn binary_operation_needs_two_registers() {
        let source = "NumberRegister 1; num a, b, c; a = b + c; return a";
        let program = read(source, RegisterCapacity::default()).unwrap();

        assert_eq!(
            Some(BackendError::NoEvictionCandidate("c".into())),
            emit(&program).err()
        );
    }
}
