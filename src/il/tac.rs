//! Three-Address Code

use std::fmt::{self, Display, Formatter};

use crate::{
    ast::typed::{ArithOp, CmpOp},
    listing::Listing,
};

pub type TacListing = Listing<TacInstr>;

/// A jump target minted by the [`super::label_generator::LabelGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(usize);
impl Label {
    pub fn new(index: usize) -> Self {
        Self(index)
    }
}
impl Display for Label {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "_L{}", self.0)
    }
}

/// Where control should go when a condition resolves one way.
/// [`Target::Fall`] means "the instruction physically following the
/// generated code", so no jump or label needs to be emitted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Fall,
    To(Label),
}
impl Target {
    pub fn label(self) -> Option<Label> {
        match self {
            Target::Fall => None,
            Target::To(label) => Some(label),
        }
    }

    pub fn is_fall(self) -> bool {
        self == Target::Fall
    }
}
impl From<Label> for Target {
    fn from(label: Label) -> Self {
        Target::To(label)
    }
}

/// A single TAC instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TacInstr {
    /// Assign a value to a name.
    Assign(String, Value),
    /// Assign the negation of a value to a name.
    Neg(String, Value),
    /// Perform a binary operation.
    Bin(String, ArithOp, Value, Value),
    /// Jump to a label.
    Goto(Label),
    /// Jump if a comparison evaluates to true.
    IfCmp(Value, CmpOp, Value, Label),
    /// Jump if a comparison evaluates to false.
    IfFalseCmp(Value, CmpOp, Value, Label),
    /// A label which can be jumped to.
    Label(Label),
}
impl Display for TacInstr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Assign(target, value) => write!(f, "{} = {}", target, value),
            Self::Neg(target, value) => write!(f, "{} = - {}", target, value),
            Self::Bin(target, op, lhs, rhs) => {
                write!(f, "{} = {} {} {}", target, lhs, op, rhs)
            }
            Self::Goto(label) => write!(f, "goto {}", label),
            Self::IfCmp(lhs, op, rhs, lbl) => {
                write!(f, "if {} {} {} goto {}", lhs, op, rhs, lbl)
            }
            Self::IfFalseCmp(lhs, op, rhs, lbl) => {
                write!(f, "ifFalse {} {} {} goto {}", lhs, op, rhs, lbl)
            }
            Self::Label(lbl) => write!(f, "{}", lbl),
        }
    }
}

/// A TAC value. Values can be constants, or references to names: either
/// identifiers from the source program or generated temporaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Const(i64),
    Name(String),
}
impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::Const(lit) => write!(f, "{}", lit),
            Value::Name(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditional_jumps_use_textual_format() {
        let jump = TacInstr::IfCmp(
            Value::Name("a".into()),
            CmpOp::LessThan,
            Value::Const(3),
            Label::new(2),
        );
        let negated = TacInstr::IfFalseCmp(
            Value::Name("a".into()),
            CmpOp::Equal,
            Value::Const(1),
            Label::new(0),
        );

        assert_eq!("if a < 3 goto _L2", jump.to_string());
        assert_eq!("ifFalse a == 1 goto _L0", negated.to_string());
    }

    #[test]
    fn labels_print_bare() {
        assert_eq!("_L7", TacInstr::Label(Label::new(7)).to_string());
    }

    #[test]
    fn unary_minus_is_spaced() {
        let neg = TacInstr::Neg("_t0".into(), Value::Name("x".into()));

        assert_eq!("_t0 = - x", neg.to_string());
    }
}
