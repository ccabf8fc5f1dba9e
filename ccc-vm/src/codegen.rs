//! Lowers a checked (and usually optimized) AST into an IR [`Module`].

use ccc_ast::ast::{Block, Expr, ExprKind, FunctionDecl, FunctionDef, Item, Literal, Program, Stmt, StmtKind};
use ccc_ast::ops::{BinaryOp, LogicalOp, RelationalOp, UnaryOp};
use ccc_ast::types::TypeName;
use ccc_ast::Location;
use ccc_ir::{
    BinOp, BlockId, BuildError, Builder, CastOp, Constant, FloatPredicate, FuncId, IntPredicate, IrType, Module,
    Param, SlotId, Value, VerifyError,
};
use ccc_passes::symtab::SymbolTable;
use thiserror::Error;
use tracing::{debug, trace};

/// Something the semantic analyzer should have ruled out. Never caused by user input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    #[error("internal error: unresolved variable `{0}`")]
    UnresolvedVariable(String),
    #[error("internal error: unresolved function `{0}`")]
    UnresolvedFunction(String),
    #[error("internal error: `{0}` without an enclosing loop")]
    MissingLoopTarget(&'static str),
    #[error("internal error: expression at {0} has no type annotation")]
    MissingAnnotation(Location),
    #[error("internal error: no conversion from `{from}` to `{to}`")]
    UnsupportedCast { from: TypeName, to: TypeName },
    #[error("internal error: {0}")]
    Build(#[from] BuildError),
    #[error("internal error: generated IR is malformed: {0}")]
    Verify(#[from] VerifyError),
}

type Result<T> = std::result::Result<T, CodegenError>;

/// Where `continue` and `break` jump to inside one loop.
#[derive(Debug, Clone, Copy)]
struct LoopTarget {
    continue_to: BlockId,
    exit: BlockId,
}

pub fn ir_type(ty: TypeName) -> IrType {
    match ty {
        TypeName::Void => IrType::Void,
        TypeName::Bool => IrType::I1,
        TypeName::Char => IrType::I8,
        TypeName::Short => IrType::I16,
        TypeName::Int => IrType::I32,
        TypeName::Long => IrType::I64,
        TypeName::Float => IrType::F32,
        TypeName::Double => IrType::F64,
    }
}

pub fn constant(literal: Literal) -> Constant {
    match literal {
        Literal::Bool(val) => Constant::I1(val),
        Literal::Char(val) => Constant::I8(val),
        Literal::Short(val) => Constant::I16(val),
        Literal::Int(val) => Constant::I32(val),
        Literal::Long(val) => Constant::I64(val),
        Literal::Float(val) => Constant::F32(val),
        Literal::Double(val) => Constant::F64(val),
    }
}

fn arith_op(op: BinaryOp, ty: TypeName) -> BinOp {
    if ty.is_floating() {
        match op {
            BinaryOp::Add => BinOp::FAdd,
            BinaryOp::Sub => BinOp::FSub,
            BinaryOp::Mul => BinOp::FMul,
            BinaryOp::Div => BinOp::FDiv,
            BinaryOp::Rem => BinOp::FRem,
        }
    } else {
        match op {
            BinaryOp::Add => BinOp::Add,
            BinaryOp::Sub => BinOp::Sub,
            BinaryOp::Mul => BinOp::Mul,
            BinaryOp::Div => BinOp::SDiv,
            BinaryOp::Rem => BinOp::SRem,
        }
    }
}

fn int_predicate(op: RelationalOp) -> IntPredicate {
    match op {
        RelationalOp::Eq => IntPredicate::Eq,
        RelationalOp::Ne => IntPredicate::Ne,
        RelationalOp::Lt => IntPredicate::Slt,
        RelationalOp::Gt => IntPredicate::Sgt,
        RelationalOp::Le => IntPredicate::Sle,
        RelationalOp::Ge => IntPredicate::Sge,
    }
}

fn float_predicate(op: RelationalOp) -> FloatPredicate {
    match op {
        RelationalOp::Eq => FloatPredicate::Oeq,
        RelationalOp::Ne => FloatPredicate::One,
        RelationalOp::Lt => FloatPredicate::Olt,
        RelationalOp::Gt => FloatPredicate::Ogt,
        RelationalOp::Le => FloatPredicate::Ole,
        RelationalOp::Ge => FloatPredicate::Oge,
    }
}

/// Generate IR from an abstract syntax tree that passed semantic analysis.
pub struct Codegen {
    builder: Builder,
    /// Maps every visible variable to the stack slot backing it.
    symbols: SymbolTable<SlotId>,
    /// Innermost loop last.
    loops: Vec<LoopTarget>,
    function: Option<FuncId>,
}

impl Codegen {
    pub fn new(module_name: &str) -> Self {
        Self {
            builder: Builder::new(module_name),
            symbols: SymbolTable::new(),
            loops: Vec::new(),
            function: None,
        }
    }

    /// Consumes `self`, verifies the generated module and returns it.
    pub fn finish(self) -> Result<Module> {
        Ok(self.builder.finish()?)
    }

    pub fn codegen_program(&mut self, program: &Program) -> Result<()> {
        for item in &program.items {
            match item {
                Item::Declaration(decl) => {
                    self.codegen_function_decl(decl)?;
                }
                Item::Definition(def) => self.codegen_function_def(def)?,
            }
        }
        Ok(())
    }

    fn codegen_function_decl(&mut self, decl: &FunctionDecl) -> Result<FuncId> {
        let params = decl
            .params
            .iter()
            .map(|param| Param {
                name: param.name.clone(),
                ty: ir_type(param.ty),
            })
            .collect();
        let func = self
            .builder
            .declare_function(&decl.name, ir_type(decl.return_type), params);
        // A definition's parameter names are final.
        if self.builder.function(func)?.is_declaration() {
            for (index, param) in decl.params.iter().enumerate() {
                self.builder.set_param_name(func, index, &param.name)?;
            }
        }
        Ok(func)
    }

    fn codegen_function_def(&mut self, def: &FunctionDef) -> Result<()> {
        debug!(function = %def.decl.name, "generating function");
        let func = self.codegen_function_decl(&def.decl)?;
        let entry = self.builder.append_block(func, "entry")?;
        self.builder.position_at_end(func, entry)?;
        self.function = Some(func);
        self.loops.clear();

        let return_type = def.decl.return_type;
        let result = self.scoped(|this| {
            for (index, param) in def.decl.params.iter().enumerate() {
                let slot = this.builder.build_alloca(&param.name, ir_type(param.ty))?;
                this.builder.build_store(slot, Value::Arg(index))?;
                this.symbols.set_symbol(&param.name, param.ty, param.loc, slot);
            }
            this.codegen_block(&def.body)?;

            if !this.builder.is_terminated() {
                if return_type == TypeName::Void {
                    this.builder.build_ret(None)?;
                } else {
                    this.builder.build_unreachable()?;
                }
            }
            Ok(())
        });
        self.function = None;
        result
    }

    /// Runs `f` inside a new scope. The scope is popped whether or not `f` succeeds.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.symbols.push_scope();
        let result = f(self);
        self.symbols.pop_scope();
        result
    }

    fn in_loop<T>(&mut self, target: LoopTarget, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.loops.push(target);
        let result = f(self);
        self.loops.pop();
        result
    }

    fn current_function(&self) -> Result<FuncId> {
        self.function.ok_or(CodegenError::Build(BuildError::NoInsertionPoint))
    }

    fn append_block(&mut self, label: &str) -> Result<BlockId> {
        let func = self.current_function()?;
        Ok(self.builder.append_block(func, label)?)
    }

    fn position_at_end(&mut self, block: BlockId) -> Result<()> {
        let func = self.current_function()?;
        trace!(block = block.0, "switching block");
        Ok(self.builder.position_at_end(func, block)?)
    }

    /// Branches to `target` unless the current block already ended.
    fn branch_if_open(&mut self, target: BlockId) -> Result<()> {
        if !self.builder.is_terminated() {
            self.builder.build_br(target)?;
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<SlotId> {
        self.symbols
            .get_symbol(name)
            .map(|entry| entry.handle)
            .ok_or_else(|| CodegenError::UnresolvedVariable(name.to_string()))
    }

    fn codegen_block(&mut self, block: &Block) -> Result<()> {
        self.scoped(|this| {
            for stmt in &block.stmts {
                // Anything after `return`, `break` or `continue` is dead.
                if this.builder.is_terminated() {
                    break;
                }
                this.codegen_stmt(stmt)?;
            }
            Ok(())
        })
    }

    fn codegen_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::Declaration(decl) => {
                let slot = self.builder.build_alloca(&decl.name, ir_type(decl.ty))?;
                self.symbols.set_symbol(&decl.name, decl.ty, decl.loc, slot);
            }
            StmtKind::DeclAndAssign { decl, init } => {
                // The initializer still sees any outer variable with the same name.
                let value = self.codegen_expr(init)?;
                let slot = self.builder.build_alloca(&decl.name, ir_type(decl.ty))?;
                self.builder.build_store(slot, value)?;
                self.symbols.set_symbol(&decl.name, decl.ty, decl.loc, slot);
            }
            StmtKind::Assignment { name, value } => {
                let slot = self.lookup(name)?;
                let value = self.codegen_expr(value)?;
                self.builder.build_store(slot, value)?;
            }
            StmtKind::AugmentedAssignment { op, name, value } => {
                let slot = self.lookup(name)?;
                let current = self.builder.build_load(slot)?;
                let ty = annotation(value)?;
                let rhs = self.codegen_expr(value)?;
                let result = self
                    .builder
                    .build_binary(arith_op(op.binary_op(), ty), current, rhs)?;
                self.builder.build_store(slot, result)?;
            }
            StmtKind::Block(block) => self.codegen_block(block)?,
            StmtKind::If { cond, body } => {
                let cond = self.codegen_condition(cond)?;
                let then_block = self.append_block("iftrue")?;
                let cont_block = self.append_block("ifcont")?;
                self.builder.build_cond_br(cond, then_block, cont_block)?;

                self.position_at_end(then_block)?;
                self.codegen_stmt(body)?;
                self.branch_if_open(cont_block)?;

                self.position_at_end(cont_block)?;
            }
            StmtKind::While { cond, body } => {
                let cond_block = self.append_block("while.cond")?;
                let body_block = self.append_block("while.body")?;
                let end_block = self.append_block("while.end")?;
                self.builder.build_br(cond_block)?;

                self.position_at_end(cond_block)?;
                let cond = self.codegen_condition(cond)?;
                self.builder.build_cond_br(cond, body_block, end_block)?;

                self.position_at_end(body_block)?;
                let target = LoopTarget {
                    continue_to: cond_block,
                    exit: end_block,
                };
                self.in_loop(target, |this| this.codegen_stmt(body))?;
                self.branch_if_open(cond_block)?;

                self.position_at_end(end_block)?;
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => self.scoped(|this| {
                if let Some(init) = init {
                    this.codegen_stmt(init)?;
                }
                let cond_block = this.append_block("for.cond")?;
                let body_block = this.append_block("for.body")?;
                let inc_block = this.append_block("for.inc")?;
                let end_block = this.append_block("for.end")?;
                this.builder.build_br(cond_block)?;

                this.position_at_end(cond_block)?;
                match cond {
                    Some(cond) => {
                        let cond = this.codegen_condition(cond)?;
                        this.builder.build_cond_br(cond, body_block, end_block)?;
                    }
                    None => this.builder.build_br(body_block)?,
                }

                this.position_at_end(body_block)?;
                let target = LoopTarget {
                    continue_to: inc_block,
                    exit: end_block,
                };
                this.in_loop(target, |this| this.codegen_stmt(body))?;
                this.branch_if_open(inc_block)?;

                this.position_at_end(inc_block)?;
                if let Some(update) = update {
                    this.codegen_stmt(update)?;
                }
                this.branch_if_open(cond_block)?;

                this.position_at_end(end_block)
            })?,
            StmtKind::Break => {
                let target = self
                    .loops
                    .last()
                    .ok_or(CodegenError::MissingLoopTarget("break"))?;
                self.builder.build_br(target.exit)?;
            }
            StmtKind::Continue => {
                let target = self
                    .loops
                    .last()
                    .ok_or(CodegenError::MissingLoopTarget("continue"))?;
                self.builder.build_br(target.continue_to)?;
            }
            StmtKind::Return(None) => self.builder.build_ret(None)?,
            StmtKind::Return(Some(value)) => {
                let ty = annotation(value)?;
                let value = self.codegen_expr(value)?;
                // `return f();` inside a void function, where `f` returns void.
                if ty == TypeName::Void {
                    self.builder.build_ret(None)?;
                } else {
                    self.builder.build_ret(Some(value))?;
                }
            }
            StmtKind::Expr(expr) => {
                self.codegen_expr(expr)?;
            }
        }
        Ok(())
    }

    /// Lowers a condition and compares it against zero, producing an `i1`.
    fn codegen_condition(&mut self, cond: &Expr) -> Result<Value> {
        let value = self.codegen_expr(cond)?;
        self.to_bool(value)
    }

    fn to_bool(&mut self, value: Value) -> Result<Value> {
        let ty = self.builder.value_type(&value);
        let zero = ty.zero().ok_or(CodegenError::UnsupportedCast {
            from: TypeName::Void,
            to: TypeName::Bool,
        })?;
        let result = if ty.is_float() {
            self.builder
                .build_fcmp(FloatPredicate::One, value, zero.into())?
        } else {
            self.builder
                .build_icmp(IntPredicate::Ne, value, zero.into())?
        };
        Ok(result)
    }

    fn codegen_expr(&mut self, expr: &Expr) -> Result<Value> {
        let ty = annotation(expr)?;
        let value = match &expr.kind {
            ExprKind::Literal(literal) => Value::Const(constant(*literal)),
            ExprKind::Variable(name) => {
                let slot = self.lookup(name)?;
                self.builder.build_load(slot)?
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.codegen_expr(lhs)?;
                let rhs = self.codegen_expr(rhs)?;
                self.builder.build_binary(arith_op(*op, ty), lhs, rhs)?
            }
            ExprKind::Logical { op, lhs, rhs } => {
                let lhs = self.codegen_expr(lhs)?;
                let rhs = self.codegen_expr(rhs)?;
                let lhs = self.to_bool(lhs)?;
                let rhs = self.to_bool(rhs)?;
                let op = match op {
                    LogicalOp::And => BinOp::And,
                    LogicalOp::Or => BinOp::Or,
                };
                self.builder.build_binary(op, lhs, rhs)?
            }
            ExprKind::Relational { op, lhs, rhs } => {
                let operand_ty = annotation(lhs)?;
                let lhs = self.codegen_expr(lhs)?;
                let rhs = self.codegen_expr(rhs)?;
                if operand_ty.is_floating() {
                    self.builder.build_fcmp(float_predicate(*op), lhs, rhs)?
                } else {
                    self.builder.build_icmp(int_predicate(*op), lhs, rhs)?
                }
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.codegen_expr(operand)?;
                match op {
                    UnaryOp::Neg if ty.is_floating() => self.builder.build_fneg(operand)?,
                    UnaryOp::Neg => {
                        let zero = ir_type(ty)
                            .zero()
                            .ok_or(CodegenError::MissingAnnotation(expr.loc))?;
                        self.builder.build_binary(BinOp::Sub, zero.into(), operand)?
                    }
                    UnaryOp::Not => {
                        self.builder
                            .build_binary(BinOp::Xor, operand, Constant::I1(true).into())?
                    }
                }
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                let cond = self.codegen_condition(cond)?;
                let true_block = self.append_block("cond.true")?;
                let false_block = self.append_block("cond.false")?;
                let end_block = self.append_block("cond.end")?;
                self.builder.build_cond_br(cond, true_block, false_block)?;

                // Nested control flow may move the insertion point, so the incoming edge is
                // whatever block each arm ends in.
                self.position_at_end(true_block)?;
                let then_value = self.codegen_expr(then_expr)?;
                let then_end = self.builder.current_block().unwrap_or(true_block);
                self.builder.build_br(end_block)?;

                self.position_at_end(false_block)?;
                let else_value = self.codegen_expr(else_expr)?;
                let else_end = self.builder.current_block().unwrap_or(false_block);
                self.builder.build_br(end_block)?;

                self.position_at_end(end_block)?;
                self.builder.build_phi(
                    ir_type(ty),
                    vec![(then_value, then_end), (else_value, else_end)],
                )?
            }
            ExprKind::Cast { target, operand } => {
                let from = annotation(operand)?;
                let value = self.codegen_expr(operand)?;
                if from == *target {
                    value
                } else if target.is_integer() && from.is_floating() {
                    self.builder
                        .build_cast(CastOp::FpToSi, value, ir_type(*target))?
                } else if target.is_floating() && from.is_integer() {
                    self.builder
                        .build_cast(CastOp::SiToFp, value, ir_type(*target))?
                } else {
                    return Err(CodegenError::UnsupportedCast { from, to: *target });
                }
            }
            ExprKind::Call { callee, args } => {
                let func = self
                    .builder
                    .get_function(callee)
                    .ok_or_else(|| CodegenError::UnresolvedFunction(callee.clone()))?;
                let args = args
                    .iter()
                    .map(|arg| self.codegen_expr(arg))
                    .collect::<Result<Vec<_>>>()?;
                self.builder.build_call(func, args)?
            }
        };
        Ok(value)
    }
}

fn annotation(expr: &Expr) -> Result<TypeName> {
    expr.ty.ok_or(CodegenError::MissingAnnotation(expr.loc))
}

/// Lowers `program` into a verified module called `module_name`.
pub fn codegen(program: &Program, module_name: &str) -> Result<Module> {
    let mut codegen = Codegen::new(module_name);
    codegen.codegen_program(program)?;
    codegen.finish()
}
