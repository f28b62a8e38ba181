//! The register machine targeted by the emitter.

use std::fmt::{self, Display, Formatter};

use crate::{ast::typed::ArithOp, listing::Listing};

pub type MachineListing = Listing<MachineInstr>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Register(pub usize);
impl Display for Register {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineOperand {
    Reg(Register),
    Imm(i64),
}
impl MachineOperand {
    pub fn register(self) -> Option<Register> {
        match self {
            MachineOperand::Reg(reg) => Some(reg),
            MachineOperand::Imm(_) => None,
        }
    }

    pub fn is_zero(self) -> bool {
        self == MachineOperand::Imm(0)
    }
}
impl Display for MachineOperand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            MachineOperand::Reg(reg) => reg.fmt(f),
            MachineOperand::Imm(value) => write!(f, "#{}", value),
        }
    }
}

/// Mnemonic of an arithmetic operation.
pub fn mnemonic(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => "ADD",
        ArithOp::Sub => "MIN",
        ArithOp::Mul => "MUL",
        ArithOp::Div => "DIV",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineInstr {
    /// `<OP> target, left, right`
    Op(ArithOp, Register, MachineOperand, MachineOperand),
    /// Load a variable from memory.
    Ld(Register, String),
    /// Store a register back to its variable.
    St(String, Register),
    Comment(String),
}
impl Display for MachineInstr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            MachineInstr::Op(op, target, left, right) => {
                write!(f, "{} {}, {}, {}", mnemonic(*op), target, left, right)
            }
            MachineInstr::Ld(reg, var) => write!(f, "LD {}, {}", reg, var),
            MachineInstr::St(var, reg) => write!(f, "ST {}, {}", var, reg),
            MachineInstr::Comment(text) => write!(f, "// {}", text),
        }
    }
}
