use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
};

use super::TypeSpec;

#[derive(Debug, Default)]
pub struct Program {
    pub declarations: Vec<Declaration>,
    pub body: Block,
}
impl Program {
    pub fn new(declarations: Vec<Declaration>, body: Block) -> Self {
        Self { declarations, body }
    }
}

#[derive(Debug, Clone)]
pub enum Declaration {
    /// `num x` or `bool x`.
    Var(String, TypeSpec),
    /// `<EnumType> x`, a variable holding a member of some enum.
    EnumVar(String),
}

#[derive(Debug, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}
impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

#[derive(Debug)]
pub enum Statement {
    Assign(Assign),
    If(If),
    While(While),
    For(For),
    Enum(EnumDef),
    Switch(Switch),
    Break,
    Block(Block),
}

#[derive(Debug)]
pub struct Assign {
    pub target: String,
    pub value: Expr,
}
impl Assign {
    pub fn new<S: Into<String>>(target: S, value: Expr) -> Self {
        Self {
            target: target.into(),
            value,
        }
    }
}

#[derive(Debug)]
pub struct If {
    pub condition: Expr,
    pub body: Block,
    pub else_body: Option<Block>,
}

#[derive(Debug)]
pub struct While {
    pub condition: Expr,
    pub body: Block,
}

/// `for (init; condition; update) { body }`
#[derive(Debug)]
pub struct For {
    pub init: Assign,
    pub condition: Expr,
    pub update: Assign,
    pub body: Block,
}

#[derive(Debug)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug)]
pub struct Switch {
    pub subject: String,
    pub cases: Vec<Case>,
}

#[derive(Debug)]
pub struct Case {
    pub value: CaseValue,
    pub body: Block,
    /// Whether the case ends in an explicit `break`. Cases without one fall
    /// through into the next case's body.
    pub breaks: bool,
}

#[derive(Debug, Clone)]
pub enum CaseValue {
    Int(i64),
    Member(String),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    Identifier(String),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Arith(Box<Expr>, ArithOp, Box<Expr>),
    Compare(Box<Expr>, CmpOp, Box<Expr>),
    Logic(Box<Expr>, LogicOp, Box<Expr>),
}
impl Expr {
    pub fn ident<S: Into<String>>(id: S) -> Self {
        Self::Identifier(id.into())
    }

    pub fn arith(lhs: Expr, op: ArithOp, rhs: Expr) -> Self {
        Self::Arith(Box::new(lhs), op, Box::new(rhs))
    }

    pub fn compare(lhs: Expr, op: CmpOp, rhs: Expr) -> Self {
        Self::Compare(Box::new(lhs), op, Box::new(rhs))
    }

    pub fn logic(lhs: Expr, op: LogicOp, rhs: Expr) -> Self {
        Self::Logic(Box::new(lhs), op, Box::new(rhs))
    }

    pub fn not(inner: Expr) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn neg(inner: Expr) -> Self {
        Self::Neg(Box::new(inner))
    }
}
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Expr::Int(i) => write!(f, "{}", i),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Identifier(id) => f.write_str(id),
            Expr::Neg(inner) => write!(f, "-{}", inner),
            Expr::Not(inner) => write!(f, "!{}", inner),
            Expr::Arith(lhs, op, rhs) => write!(f, "({} {} {})", lhs, op, rhs),
            Expr::Compare(lhs, op, rhs) => write!(f, "({} {} {})", lhs, op, rhs),
            Expr::Logic(lhs, op, rhs) => write!(f, "({} {} {})", lhs, op, rhs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}
impl Display for ArithOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    Equal,
    NotEqual,
}
impl Display for CmpOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            CmpOp::LessThan => "<",
            CmpOp::GreaterThan => ">",
            CmpOp::LessThanEqual => "<=",
            CmpOp::GreaterThanEqual => ">=",
            CmpOp::Equal => "==",
            CmpOp::NotEqual => "!=",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
}
impl Display for LogicOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
        })
    }
}

/// Symbol context produced by the semantic pass: the type of every identifier
/// and the ordinal of every enum member.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    pub type_map: HashMap<String, TypeSpec>,
    pub enum_ordinals: HashMap<String, i64>,
}
impl Environment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_type<S: Into<String>>(&mut self, name: S, type_spec: TypeSpec) {
        self.type_map.insert(name.into(), type_spec);
    }

    pub fn type_of(&self, name: &str) -> Option<TypeSpec> {
        self.type_map.get(name).copied()
    }

    /// Bind every member to its declaration-order ordinal, starting at 0.
    pub fn declare_enum<S: Into<String>>(&mut self, name: S, members: &[String]) {
        self.type_map.insert(name.into(), TypeSpec::EnumType);
        for (ordinal, member) in members.iter().enumerate() {
            self.enum_ordinals.insert(member.clone(), ordinal as i64);
        }
    }

    pub fn ordinal_of(&self, member: &str) -> Option<i64> {
        self.enum_ordinals.get(member).copied()
    }
}
