use log::{debug, trace};

use crate::{
    ast::{typed::*, TypeSpec},
    error::BackendError,
};

use super::{label_generator::*, name_generator::*, tac::*};

type Result<T> = std::result::Result<T, BackendError>;

/// Selects how branch targets that immediately follow the generated code are
/// handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenMode {
    /// Every branch target is a freshly minted label and every jump is emitted.
    Naive,
    /// A target that is the physically next instruction is represented by
    /// [`Target::Fall`], so its jump and label are never emitted.
    #[default]
    Fallthrough,
}

/// Generate a three-address code listing for a type-checked program.
/// `environment` holds whatever the semantic pass already knows; declarations
/// and `enum` statements in the program extend it.
pub fn generate(program: &Program, environment: Environment, mode: GenMode) -> Result<TacListing> {
    TacGenerator::new(environment, mode).generate(program)
}

/// Immutable traversal state, handed down from each statement to its children.
#[derive(Debug, Clone, Copy)]
struct Context {
    /// The label that follows the statement being lowered.
    next: Label,
    /// Exit of the nearest enclosing loop or switch.
    exit: Option<Label>,
}
impl Context {
    fn new(next: Label) -> Self {
        Self { next, exit: None }
    }

    fn with_next(self, next: Label) -> Self {
        Self { next, ..self }
    }

    fn enclosing(next: Label, exit: Label) -> Self {
        Self {
            next,
            exit: Some(exit),
        }
    }
}

struct TacGenerator {
    listing: TacListing,
    name_generator: NameGenerator,
    label_generator: LabelGenerator,
    environment: Environment,
    mode: GenMode,
}
impl TacGenerator {
    fn new(environment: Environment, mode: GenMode) -> Self {
        Self {
            listing: TacListing::new(),
            name_generator: NameGenerator::new(),
            label_generator: LabelGenerator::new(),
            environment,
            mode,
        }
    }

    /// Lower the whole program. The body continues at a fresh end-of-program
    /// label, which is emitted last.
    fn generate(mut self, program: &Program) -> Result<TacListing> {
        debug!("Generating three-address code ({:?} mode)", self.mode);
        let end = self.label_generator.next_label();

        for declaration in &program.declarations {
            self.declare(declaration);
        }

        self.lower_block(&program.body, Context::new(end))?;
        self.emit_label(end);

        debug!("Generated {} instructions", self.listing.len());
        Ok(self.listing)
    }

    fn declare(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Var(name, type_spec) => self.environment.set_type(name, *type_spec),
            Declaration::EnumVar(name) => self.environment.set_type(name, TypeSpec::EnumVar),
        }
    }

    /// Lower a block of statements. Every statement but the last gets its own
    /// end-of-statement label, so forward jumps out of it have somewhere to land.
    fn lower_block(&mut self, block: &Block, ctx: Context) -> Result<()> {
        let Some((last, init)) = block.statements.split_last() else {
            return Ok(());
        };

        for stmt in init {
            let end_stmt = self.label_generator.next_label();
            self.lower_stmt(stmt, ctx.with_next(end_stmt))?;
            self.emit_label(end_stmt);
        }

        self.lower_stmt(last, ctx)
    }

    fn lower_stmt(&mut self, stmt: &Statement, ctx: Context) -> Result<()> {
        match stmt {
            Statement::Assign(assign) => self.lower_assign(assign, ctx),
            Statement::If(if_stmt) => self.lower_if(if_stmt, ctx),
            Statement::While(while_stmt) => self.lower_while(while_stmt, ctx),
            Statement::For(for_stmt) => self.lower_for(for_stmt, ctx),
            Statement::Enum(enum_def) => {
                trace!("enum {} has {} members", enum_def.name, enum_def.members.len());
                self.environment
                    .declare_enum(&enum_def.name, &enum_def.members);
                Ok(())
            }
            Statement::Switch(switch) => self.lower_switch(switch, ctx),
            Statement::Break => {
                let exit = ctx.exit.ok_or(BackendError::BreakOutsideLoop)?;
                self.emit(TacInstr::Goto(exit));
                Ok(())
            }
            Statement::Block(block) => self.lower_block(block, ctx),
        }
    }

    fn lower_if(&mut self, if_stmt: &If, ctx: Context) -> Result<()> {
        let body_lbl = self.fall_or_fresh();

        match &if_stmt.else_body {
            None => {
                self.lower_cond(&if_stmt.condition, body_lbl, ctx.next.into())?;
                self.place(body_lbl);
                self.lower_block(&if_stmt.body, ctx)
            }
            Some(else_body) => {
                let else_lbl = self.label_generator.next_label();
                self.lower_cond(&if_stmt.condition, body_lbl, else_lbl.into())?;
                self.place(body_lbl);
                self.lower_block(&if_stmt.body, ctx)?;
                self.emit(TacInstr::Goto(ctx.next));
                self.emit_label(else_lbl);
                self.lower_block(else_body, ctx)
            }
        }
    }

    fn lower_while(&mut self, while_stmt: &While, ctx: Context) -> Result<()> {
        let head = self.label_generator.next_label();
        self.emit_label(head);

        let body_lbl = self.fall_or_fresh();
        self.lower_cond(&while_stmt.condition, body_lbl, ctx.next.into())?;
        self.place(body_lbl);

        self.lower_block(&while_stmt.body, Context::enclosing(head, ctx.next))?;
        self.emit(TacInstr::Goto(head));
        Ok(())
    }

    fn lower_for(&mut self, for_stmt: &For, ctx: Context) -> Result<()> {
        let cond_lbl = self.label_generator.next_label();
        let iter_lbl = self.label_generator.next_label();
        let body_lbl = self.fall_or_fresh();

        self.lower_assign(&for_stmt.init, ctx.with_next(cond_lbl))?;
        self.emit_label(cond_lbl);
        self.lower_cond(&for_stmt.condition, body_lbl, ctx.next.into())?;
        self.place(body_lbl);

        self.lower_block(&for_stmt.body, Context::enclosing(iter_lbl, ctx.next))?;
        self.emit_label(iter_lbl);
        self.lower_assign(&for_stmt.update, ctx.with_next(cond_lbl))?;
        self.emit(TacInstr::Goto(cond_lbl));
        Ok(())
    }

    /// Lower a switch statement. Each case tests the subject and skips to the
    /// next case when it does not match. A case without `break` ends in a jump
    /// to a fallthrough label that is placed in the next case's prologue,
    /// behind its comparison, so the next body runs unconditionally.
    fn lower_switch(&mut self, switch: &Switch, ctx: Context) -> Result<()> {
        match self.environment.type_of(&switch.subject) {
            Some(TypeSpec::Number) | Some(TypeSpec::EnumVar) => (),
            Some(other) => return Err(BackendError::type_mismatch("switch", "num or enum", other)),
            None => return Err(BackendError::UndefinedIdentifier(switch.subject.clone())),
        }

        let end = ctx.next;
        let mut fallthrough: Option<Label> = None;

        for (index, case) in switch.cases.iter().enumerate() {
            let is_last = index + 1 == switch.cases.len();
            let next_case = if is_last {
                end
            } else {
                self.label_generator.next_label()
            };

            let value = self.lower_case_value(&case.value)?;
            let case_lbl = self.fall_or_fresh();
            self.emit_jumps(
                Value::Name(switch.subject.clone()),
                CmpOp::Equal,
                value,
                case_lbl,
                next_case.into(),
            );
            self.place(case_lbl);

            if let Some(incoming) = fallthrough.take() {
                self.emit_label(incoming);
            }

            let after_body = if case.breaks || is_last {
                end
            } else {
                let outgoing = self.label_generator.next_label();
                fallthrough = Some(outgoing);
                outgoing
            };

            self.lower_block(&case.body, Context::enclosing(after_body, end))?;
            if case.breaks || !is_last {
                self.emit(TacInstr::Goto(after_body));
            }

            if !is_last {
                self.emit_label(next_case);
            }
        }

        Ok(())
    }

    fn lower_case_value(&self, value: &CaseValue) -> Result<Value> {
        match value {
            CaseValue::Int(i) => Ok(Value::Const(*i)),
            CaseValue::Member(member) => self
                .environment
                .ordinal_of(member)
                .map(Value::Const)
                .ok_or_else(|| BackendError::UnknownEnumMember(member.clone())),
        }
    }

    /// Lower an assignment. Booleans are materialised as `1`/`0` through
    /// jumping code, enum members are folded into their ordinal.
    fn lower_assign(&mut self, assign: &Assign, ctx: Context) -> Result<()> {
        let target = assign.target.clone();

        match self.environment.type_of(&target) {
            Some(TypeSpec::Bool) => {
                let true_lbl = self.fall_or_fresh();
                let false_lbl = self.label_generator.next_label();

                self.lower_cond(&assign.value, true_lbl, false_lbl.into())?;
                self.place(true_lbl);
                self.emit(TacInstr::Assign(target.clone(), Value::Const(1)));
                self.emit(TacInstr::Goto(ctx.next));
                self.emit_label(false_lbl);
                self.emit(TacInstr::Assign(target, Value::Const(0)));
            }
            Some(TypeSpec::EnumVar) => {
                let value = match &assign.value {
                    Expr::Identifier(id) => match self.environment.ordinal_of(id) {
                        Some(ordinal) => Value::Const(ordinal),
                        None if self.environment.type_of(id) == Some(TypeSpec::EnumVar) => {
                            Value::Name(id.clone())
                        }
                        None => return Err(BackendError::UnknownEnumMember(id.clone())),
                    },
                    other => {
                        return Err(BackendError::type_mismatch(
                            "enum assignment",
                            "an enum member or variable",
                            other,
                        ))
                    }
                };
                self.emit(TacInstr::Assign(target, value));
            }
            Some(TypeSpec::Number) => {
                let value = self.lower_value(&assign.value)?;
                self.emit(TacInstr::Assign(target, value));
            }
            Some(TypeSpec::EnumType) => {
                return Err(BackendError::type_mismatch("assignment", "a variable", target))
            }
            None => return Err(BackendError::UndefinedIdentifier(target)),
        }

        Ok(())
    }

    /// Lower an expression that produces a number, returning the value that
    /// holds its result.
    fn lower_value(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Int(i) => Ok(Value::Const(*i)),
            Expr::Bool(b) => Ok(Value::Const(*b as i64)),
            Expr::Identifier(id) => self.convert_identifier(id),
            Expr::Neg(inner) => {
                let value = self.lower_value(inner)?;
                let temp = self.name_generator.next_temp();
                self.emit(TacInstr::Neg(temp.clone(), value));
                Ok(Value::Name(temp))
            }
            Expr::Arith(lhs, op, rhs) => {
                let temp = self.name_generator.next_temp();
                let lhs = self.lower_value(lhs)?;
                let rhs = self.lower_value(rhs)?;
                self.emit(TacInstr::Bin(temp.clone(), *op, lhs, rhs));
                Ok(Value::Name(temp))
            }
            Expr::Not(_) | Expr::Compare(..) | Expr::Logic(..) => {
                Err(BackendError::type_mismatch("expression", "a number", expr))
            }
        }
    }

    /// Convert an identifier to a [`Value`]. Enum members fold into their ordinal.
    /// This does not result in the emission of intermediate code.
    fn convert_identifier(&self, id: &str) -> Result<Value> {
        if let Some(ordinal) = self.environment.ordinal_of(id) {
            return Ok(Value::Const(ordinal));
        }
        match self.environment.type_of(id) {
            Some(_) => Ok(Value::Name(id.to_string())),
            None => Err(BackendError::UndefinedIdentifier(id.to_string())),
        }
    }

    /// Lower a boolean expression to jumping code: control reaches `on_true`
    /// when it holds and `on_false` otherwise.
    fn lower_cond(&mut self, expr: &Expr, on_true: Target, on_false: Target) -> Result<()> {
        match expr {
            Expr::Bool(value) => {
                let target = if *value { on_true } else { on_false };
                if let Some(label) = target.label() {
                    self.emit(TacInstr::Goto(label));
                }
            }
            Expr::Identifier(id) => match self.environment.type_of(id) {
                Some(TypeSpec::Bool) => self.emit_jumps(
                    Value::Name(id.clone()),
                    CmpOp::Equal,
                    Value::Const(1),
                    on_true,
                    on_false,
                ),
                Some(other) => return Err(BackendError::type_mismatch("condition", "bool", other)),
                None => return Err(BackendError::UndefinedIdentifier(id.clone())),
            },
            Expr::Compare(lhs, op, rhs) => {
                // Both outcomes continue at the same place, so the test is moot.
                if on_true.is_fall() && on_false.is_fall() {
                    return Ok(());
                }
                let lhs = self.lower_value(lhs)?;
                let rhs = self.lower_value(rhs)?;
                self.emit_jumps(lhs, *op, rhs, on_true, on_false);
            }
            Expr::Not(inner) => self.lower_cond(inner, on_false, on_true)?,
            Expr::Logic(lhs, LogicOp::And, rhs) => {
                let lhs_true = self.fall_or_fresh();
                let (lhs_false, deferred) = self.resolve_fall(on_false);

                self.lower_cond(lhs, lhs_true, lhs_false)?;
                self.place(lhs_true);
                self.lower_cond(rhs, on_true, on_false)?;
                if let Some(label) = deferred {
                    self.emit_label(label);
                }
            }
            Expr::Logic(lhs, LogicOp::Or, rhs) => {
                let (lhs_true, deferred) = self.resolve_fall(on_true);
                let lhs_false = self.fall_or_fresh();

                self.lower_cond(lhs, lhs_true, lhs_false)?;
                self.place(lhs_false);
                self.lower_cond(rhs, on_true, on_false)?;
                if let Some(label) = deferred {
                    self.emit_label(label);
                }
            }
            Expr::Int(_) | Expr::Neg(_) | Expr::Arith(..) => {
                return Err(BackendError::type_mismatch("condition", "bool", expr))
            }
        }

        Ok(())
    }

    /// Emit the jumps for a comparison, skipping any outcome that falls through.
    fn emit_jumps(&mut self, lhs: Value, op: CmpOp, rhs: Value, on_true: Target, on_false: Target) {
        match (on_true.label(), on_false.label()) {
            (Some(t), Some(f)) => {
                self.emit(TacInstr::IfCmp(lhs, op, rhs, t));
                self.emit(TacInstr::Goto(f));
            }
            (Some(t), None) => self.emit(TacInstr::IfCmp(lhs, op, rhs, t)),
            (None, Some(f)) => self.emit(TacInstr::IfFalseCmp(lhs, op, rhs, f)),
            (None, None) => (),
        }
    }

    /// A target for code that will be placed immediately after the code
    /// currently being generated.
    fn fall_or_fresh(&mut self) -> Target {
        match self.mode {
            GenMode::Naive => Target::To(self.label_generator.next_label()),
            GenMode::Fallthrough => Target::Fall,
        }
    }

    /// An operand of `&&`/`||` cannot short-circuit to "fall", since the other
    /// operand is what physically follows it. Such a target is swapped for a
    /// fresh label that the caller places after the other operand.
    fn resolve_fall(&mut self, target: Target) -> (Target, Option<Label>) {
        match target {
            Target::Fall => {
                let label = self.label_generator.next_label();
                (Target::To(label), Some(label))
            }
            to => (to, None),
        }
    }

    /// Emit the label of a target, unless it falls through.
    fn place(&mut self, target: Target) {
        if let Target::To(label) = target {
            self.emit_label(label);
        }
    }

    fn emit_label(&mut self, label: Label) {
        self.emit(TacInstr::Label(label));
    }

    /// Emit an instruction, adding it to the listing.
    fn emit(&mut self, instr: TacInstr) {
        trace!("{}", instr);
        self.listing.push(instr);
    }
}
