//! Control-flow free programs, the input of register allocation.

use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
};

use log::trace;

use crate::{
    ast::typed::ArithOp,
    config::RegisterCapacity,
    error::BackendError,
    il::{TacInstr, TacListing, Value},
    listing::Listing,
};

/// An operand of a [`Quad`]: a variable, or an immediate written as `#n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Var(String),
    Imm(i64),
}
impl Operand {
    pub fn var<S: Into<String>>(name: S) -> Self {
        Self::Var(name.into())
    }

    pub fn as_var(&self) -> Option<&str> {
        match self {
            Operand::Var(name) => Some(name),
            Operand::Imm(_) => None,
        }
    }
}
impl From<&Value> for Operand {
    fn from(value: &Value) -> Self {
        match value {
            Value::Const(c) => Operand::Imm(*c),
            Value::Name(n) => Operand::Var(n.clone()),
        }
    }
}
impl Display for Operand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Operand::Var(name) => f.write_str(name),
            Operand::Imm(value) => write!(f, "#{}", value),
        }
    }
}

/// `assign = left op right`. Copies and negations are expressed against an
/// immediate zero. The DEF and REF sets are fixed when the quad is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quad {
    op: ArithOp,
    assign: String,
    left: Operand,
    right: Operand,
    def: BTreeSet<String>,
    refs: BTreeSet<String>,
}
impl Quad {
    pub fn new<S: Into<String>>(op: ArithOp, assign: S, left: Operand, right: Operand) -> Self {
        let assign = assign.into();
        let def = BTreeSet::from([assign.clone()]);
        let refs = [&left, &right]
            .into_iter()
            .filter_map(|o| o.as_var())
            .map(ToString::to_string)
            .collect();

        Self {
            op,
            assign,
            left,
            right,
            def,
            refs,
        }
    }

    /// `assign = value`, as `assign = #0 + value`.
    pub fn copy<S: Into<String>>(assign: S, value: Operand) -> Self {
        Self::new(ArithOp::Add, assign, Operand::Imm(0), value)
    }

    /// `assign = - value`, as `assign = #0 - value`.
    pub fn negate<S: Into<String>>(assign: S, value: Operand) -> Self {
        Self::new(ArithOp::Sub, assign, Operand::Imm(0), value)
    }

    pub fn op(&self) -> ArithOp {
        self.op
    }

    pub fn assign(&self) -> &str {
        &self.assign
    }

    pub fn left(&self) -> &Operand {
        &self.left
    }

    pub fn right(&self) -> &Operand {
        &self.right
    }

    /// Variables written by this instruction.
    pub fn def(&self) -> &BTreeSet<String> {
        &self.def
    }

    /// Variables read by this instruction.
    pub fn refs(&self) -> &BTreeSet<String> {
        &self.refs
    }
}
impl Display for Quad {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} = {} {} {}", self.assign, self.left, self.op, self.right)
    }
}

/// A straight-line program: no jumps and no labels, ending in an implicit
/// return of `returns`. The dataflow analyses make a single backward sweep,
/// which is only exact because of this shape, so the only ways to build one
/// are from quads directly or through [`StraightLine::from_tac`], which
/// refuses any jump.
#[derive(Debug, Clone)]
pub struct StraightLine {
    lines: Listing<Quad>,
    returns: Vec<String>,
    capacity: RegisterCapacity,
}
impl StraightLine {
    pub fn new(lines: Listing<Quad>, returns: Vec<String>, capacity: RegisterCapacity) -> Self {
        Self {
            lines,
            returns,
            capacity,
        }
    }

    /// Convert a three-address code listing. Fails on the first jump; labels
    /// are dropped, since nothing can jump to them.
    pub fn from_tac(
        listing: &TacListing,
        returns: Vec<String>,
        capacity: RegisterCapacity,
    ) -> Result<Self, BackendError> {
        let mut lines = Listing::new();

        for (position, instr) in listing.iter_lines() {
            let quad = match instr {
                TacInstr::Assign(target, value) => Quad::copy(target, value.into()),
                TacInstr::Neg(target, value) => Quad::negate(target, value.into()),
                TacInstr::Bin(target, op, lhs, rhs) => {
                    Quad::new(*op, target, lhs.into(), rhs.into())
                }
                TacInstr::Label(label) => {
                    trace!("Dropping label {} at line {}", label, position);
                    continue;
                }
                TacInstr::Goto(_) | TacInstr::IfCmp(..) | TacInstr::IfFalseCmp(..) => {
                    return Err(BackendError::ControlFlow(position, instr.to_string()))
                }
            };
            lines.push(quad);
        }

        Ok(Self::new(lines, returns, capacity))
    }

    pub fn with_capacity(self, capacity: RegisterCapacity) -> Self {
        Self { capacity, ..self }
    }

    pub fn lines(&self) -> &Listing<Quad> {
        &self.lines
    }

    pub fn returns(&self) -> &[String] {
        &self.returns
    }

    pub fn capacity(&self) -> RegisterCapacity {
        self.capacity
    }
}
