use std::{collections::HashSet, iter::Peekable, vec::IntoIter};

use log::debug;

use crate::{
    ast::typed::ArithOp,
    codegen::{Operand, Quad, StraightLine},
    config::RegisterCapacity,
    error::BackendError,
    listing::Listing,
};

use super::{error::*, tokens::*};

type Result<T> = std::result::Result<T, BackendError>;

pub fn parse(tokens: Vec<Token>, default_capacity: RegisterCapacity) -> Result<StraightLine> {
    Parser::new(tokens).run(default_capacity)
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    line: usize,
    declared: HashSet<String>,
    capacity: Option<RegisterCapacity>,
    returns: Vec<String>,
    lines: Listing<Quad>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
            line: 1,
            declared: HashSet::new(),
            capacity: None,
            returns: vec![],
            lines: Listing::new(),
        }
    }

    fn run(mut self, default_capacity: RegisterCapacity) -> Result<StraightLine> {
        while let Some(token) = self.advance() {
            match token {
                TokenKind::Terminator => continue,
                TokenKind::Keyword(Keyword::NumberRegister) => self.number_register()?,
                TokenKind::Keyword(Keyword::Num) => {
                    for name in self.name_list()? {
                        self.declared.insert(name);
                    }
                }
                TokenKind::Keyword(Keyword::Return) => {
                    for name in self.name_list()? {
                        self.check_declared(&name)?;
                        if !self.returns.contains(&name) {
                            self.returns.push(name);
                        }
                    }
                }
                TokenKind::Identifier(target) => self.assignment(target)?,
                other => return Err(self.unexpected(other, "a statement")),
            }
            self.end_of_statement()?;
        }

        let capacity = self.capacity.unwrap_or(default_capacity);
        debug!(
            "Read {} instructions, returning {:?}, {} registers",
            self.lines.len(),
            self.returns,
            capacity
        );
        Ok(StraightLine::new(self.lines, self.returns, capacity))
    }

    fn number_register(&mut self) -> Result<()> {
        let count = match self.advance() {
            Some(TokenKind::Integer(count)) => count,
            Some(other) => return Err(self.unexpected(other, "a register count")),
            None => return Err(self.end("a register count")),
        };
        let count = usize::try_from(count)
            .map_err(|_| self.error(ReadErrorKind::InvalidInteger(count.to_string())))?;

        self.capacity = Some(RegisterCapacity::new(count)?);
        Ok(())
    }

    /// `a, b, c`
    fn name_list(&mut self) -> Result<Vec<String>> {
        let mut names = vec![self.name()?];
        while self.recognise(Symbol::Comma) {
            names.push(self.name()?);
        }
        Ok(names)
    }

    fn name(&mut self) -> Result<String> {
        match self.advance() {
            Some(TokenKind::Identifier(name)) => Ok(name),
            Some(other) => Err(self.unexpected(other, "a variable name")),
            None => Err(self.end("a variable name")),
        }
    }

    /// `x = y`, `x = - y` or `x = y op z`
    fn assignment(&mut self, target: String) -> Result<()> {
        self.check_declared(&target)?;
        match self.advance() {
            Some(TokenKind::Symbol(Symbol::Assign)) => {}
            Some(other) => return Err(self.unexpected(other, "'='")),
            None => return Err(self.end("'='")),
        }

        if self.recognise(Symbol::Minus) {
            let value = self.operand()?;
            self.lines.push(Quad::negate(target, value));
            return Ok(());
        }

        let left = self.operand()?;
        let op = match self.peek() {
            Some(TokenKind::Symbol(Symbol::Plus)) => Some(ArithOp::Add),
            Some(TokenKind::Symbol(Symbol::Minus)) => Some(ArithOp::Sub),
            Some(TokenKind::Symbol(Symbol::Asterisk)) => Some(ArithOp::Mul),
            Some(TokenKind::Symbol(Symbol::Slash)) => Some(ArithOp::Div),
            _ => None,
        };
        let Some(op) = op else {
            self.lines.push(Quad::copy(target, left));
            return Ok(());
        };
        self.advance();
        let right = self.operand()?;
        self.lines.push(Quad::new(op, target, left, right));
        Ok(())
    }

    fn operand(&mut self) -> Result<Operand> {
        match self.advance() {
            Some(TokenKind::Integer(value)) => Ok(Operand::Imm(value)),
            Some(TokenKind::Identifier(name)) => {
                self.check_declared(&name)?;
                Ok(Operand::Var(name))
            }
            Some(other) => Err(self.unexpected(other, "a variable or integer")),
            None => Err(self.end("a variable or integer")),
        }
    }

    fn end_of_statement(&mut self) -> Result<()> {
        match self.advance() {
            None | Some(TokenKind::Terminator) => Ok(()),
            Some(other) => Err(self.unexpected(other, "end of statement")),
        }
    }

    fn check_declared(&self, name: &str) -> Result<()> {
        if self.declared.contains(name) {
            Ok(())
        } else {
            Err(self.error(ReadErrorKind::Undeclared(name.to_string())))
        }
    }

    fn advance(&mut self) -> Option<TokenKind> {
        let token = self.tokens.next()?;
        self.line = token.line;
        Some(token.kind)
    }

    fn peek(&mut self) -> Option<&TokenKind> {
        self.tokens.peek().map(|token| &token.kind)
    }

    fn recognise(&mut self, symbol: Symbol) -> bool {
        if self.peek() == Some(&TokenKind::Symbol(symbol)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, kind: ReadErrorKind) -> BackendError {
        ReadError::new(self.line, kind).into()
    }

    fn unexpected(&self, found: TokenKind, expected: &'static str) -> BackendError {
        self.error(ReadErrorKind::UnexpectedToken {
            found: found.to_string(),
            expected,
        })
    }

    fn end(&self, expected: &'static str) -> BackendError {
        self.error(ReadErrorKind::UnexpectedEnd(expected))
    }
}
