//! Semantic analysis pass.
//!
//! Resolves every name, checks every typing rule and annotates each expression with its type and
//! constancy. The first error aborts the pass.

use crate::functab::FunctionTable;
use crate::symtab::SymbolTable;
use ccc_ast::ast::{Block, Declaration, Expr, ExprKind, FunctionDecl, FunctionDef, Item, Program, Stmt, StmtKind};
use ccc_ast::ops::UnaryOp;
use ccc_ast::types::TypeName;
use ccc_source::{Diagnostic, Location};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("use of undeclared variable `{name}`")]
    UndeclaredVariable { name: String, loc: Location },
    #[error("`{name}` is already declared in this scope")]
    DuplicateDeclaration {
        name: String,
        loc: Location,
        previous: Location,
    },
    #[error("type mismatch in {context}: expected `{expected}`, got `{got}`")]
    TypeMismatch {
        context: String,
        expected: TypeName,
        got: TypeName,
        loc: Location,
    },
    #[error("no definition of `int main()`")]
    MissingMain { loc: Location },
    #[error("`main` must return `int`, not `{got}`")]
    WrongMainSignature { got: TypeName, loc: Location },
    #[error("function `{name}` returns `{ty}` but contains no return statement")]
    MissingReturn {
        name: String,
        ty: TypeName,
        loc: Location,
    },
    #[error("function `{name}` is already defined")]
    DuplicateFunctionDefinition {
        name: String,
        loc: Location,
        previous: Location,
    },
    #[error("function `{name}` takes {expected} argument(s) but {got} were supplied")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
        loc: Location,
    },
    #[error("call to undeclared function `{name}`")]
    UnknownFunction { name: String, loc: Location },
    #[error("cannot cast to `{target}`: only `int` and `float` are cast targets")]
    InvalidCastTarget { target: TypeName, loc: Location },
    #[error("condition of `{construct}` must be `bool`, got `{got}`")]
    NonBooleanCondition {
        construct: &'static str,
        got: TypeName,
        loc: Location,
    },
    #[error("variable `{name}` declared `void`")]
    VoidDeclaration { name: String, loc: Location },
    #[error("operator `{op}` cannot be applied to `{ty}`")]
    InvalidOperand {
        op: String,
        ty: TypeName,
        loc: Location,
    },
    #[error("`{keyword}` outside of a loop")]
    LoopControlOutsideLoop { keyword: &'static str, loc: Location },
    #[error("`return` outside of a function")]
    ReturnOutsideFunction { loc: Location },
}

impl SemanticError {
    /// Where the error was detected.
    pub fn loc(&self) -> Location {
        match self {
            SemanticError::UndeclaredVariable { loc, .. }
            | SemanticError::DuplicateDeclaration { loc, .. }
            | SemanticError::TypeMismatch { loc, .. }
            | SemanticError::MissingMain { loc }
            | SemanticError::WrongMainSignature { loc, .. }
            | SemanticError::MissingReturn { loc, .. }
            | SemanticError::DuplicateFunctionDefinition { loc, .. }
            | SemanticError::ArityMismatch { loc, .. }
            | SemanticError::UnknownFunction { loc, .. }
            | SemanticError::InvalidCastTarget { loc, .. }
            | SemanticError::NonBooleanCondition { loc, .. }
            | SemanticError::VoidDeclaration { loc, .. }
            | SemanticError::InvalidOperand { loc, .. }
            | SemanticError::LoopControlOutsideLoop { loc, .. }
            | SemanticError::ReturnOutsideFunction { loc } => *loc,
        }
    }

    /// Short human readable category.
    pub fn category(&self) -> &'static str {
        match self {
            SemanticError::UndeclaredVariable { .. } => "undeclared variable",
            SemanticError::DuplicateDeclaration { .. } => "duplicate declaration",
            SemanticError::TypeMismatch { .. } => "type mismatch",
            SemanticError::MissingMain { .. } => "missing main",
            SemanticError::WrongMainSignature { .. } => "wrong main signature",
            SemanticError::MissingReturn { .. } => "missing return",
            SemanticError::DuplicateFunctionDefinition { .. } => "duplicate function definition",
            SemanticError::ArityMismatch { .. } => "arity mismatch",
            SemanticError::UnknownFunction { .. } => "unknown function",
            SemanticError::InvalidCastTarget { .. } => "invalid cast target",
            SemanticError::NonBooleanCondition { .. } => "non-boolean condition",
            SemanticError::VoidDeclaration { .. } => "void declaration",
            SemanticError::InvalidOperand { .. } => "invalid operand",
            SemanticError::LoopControlOutsideLoop { .. } => "loop control outside loop",
            SemanticError::ReturnOutsideFunction { .. } => "return outside function",
        }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::new(self.category(), self, self.loc());
        match self {
            SemanticError::DuplicateDeclaration { previous, .. } => {
                diagnostic.with_note("previously declared here", *previous)
            }
            SemanticError::DuplicateFunctionDefinition { previous, .. } => {
                diagnostic.with_note("previous definition seen here", *previous)
            }
            _ => diagnostic,
        }
    }
}

type Result<T> = std::result::Result<T, SemanticError>;

/// Semantic analysis pass.
#[derive(Debug, Default)]
pub struct Analyzer {
    symbols: SymbolTable<()>,
    functions: FunctionTable,
    /// Number of loops enclosing the current statement.
    loop_depth: u32,
    /// Set when a `return` is seen inside the current function body.
    seen_return: bool,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    #[must_use]
    pub fn into_functions(self) -> FunctionTable {
        self.functions
    }

    /// Analyzes every item of `program` in order, then checks for `int main()`.
    pub fn analyze_program(&mut self, program: &mut Program) -> Result<()> {
        for item in &mut program.items {
            match item {
                Item::Declaration(decl) => self.analyze_prototype(decl)?,
                Item::Definition(def) => self.analyze_function_def(def)?,
            }
        }

        let main = self
            .functions
            .get_function("main")
            .filter(|main| main.has_definition())
            .ok_or(SemanticError::MissingMain {
                loc: Location::default(),
            })?;
        if main.return_type != TypeName::Int {
            return Err(SemanticError::WrongMainSignature {
                got: main.return_type,
                loc: main.definition_loc.unwrap_or_default(),
            });
        }

        debug!("semantic analysis complete");
        Ok(())
    }

    /// Runs `f` inside a new scope. The scope is popped whether or not `f` succeeds.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.symbols.push_scope();
        let result = f(self);
        self.symbols.pop_scope();
        result
    }

    /// Runs `f` with one more enclosing loop.
    fn in_loop<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.loop_depth += 1;
        let result = f(self);
        self.loop_depth -= 1;
        result
    }

    fn declare(&mut self, decl: &Declaration) -> Result<()> {
        if decl.ty == TypeName::Void {
            return Err(SemanticError::VoidDeclaration {
                name: decl.name.clone(),
                loc: decl.loc,
            });
        }
        if let Some(previous) = self.symbols.get_in_current_scope(&decl.name) {
            return Err(SemanticError::DuplicateDeclaration {
                name: decl.name.clone(),
                loc: decl.loc,
                previous: previous.loc,
            });
        }
        self.symbols.add_symbol(&decl.name, decl.ty, decl.loc, ());
        Ok(())
    }

    fn register_signature(&mut self, decl: &FunctionDecl) {
        let param_types = decl.params.iter().map(|param| param.ty).collect();
        self.functions
            .add_function(&decl.name, decl.return_type, param_types);
    }

    /// A bare prototype. Parameters are checked in a throwaway scope.
    fn analyze_prototype(&mut self, decl: &FunctionDecl) -> Result<()> {
        self.scoped(|this| {
            for param in &decl.params {
                this.declare(param)?;
            }
            Ok(())
        })?;
        self.register_signature(decl);
        Ok(())
    }

    fn analyze_function_def(&mut self, def: &mut FunctionDef) -> Result<()> {
        let name = def.decl.name.clone();
        debug!(function = %name, "analyzing function definition");

        if let Some(previous) = self
            .functions
            .get_function(&name)
            .and_then(|entry| entry.definition_loc)
        {
            return Err(SemanticError::DuplicateFunctionDefinition {
                name,
                loc: def.loc,
                previous,
            });
        }

        let return_type = def.decl.return_type;
        let loc = def.loc;
        self.scoped(|this| {
            for param in &def.decl.params {
                this.declare(param)?;
            }
            // Registered before the body so that recursive calls resolve.
            this.register_signature(&def.decl);

            this.functions.enter_function_definition(&name);
            this.seen_return = false;
            this.loop_depth = 0;
            let result = this.analyze_block(&mut def.body);
            this.functions.exit_function_definition();
            result?;

            if return_type != TypeName::Void && !this.seen_return {
                return Err(SemanticError::MissingReturn {
                    name: name.clone(),
                    ty: return_type,
                    loc,
                });
            }
            this.functions.define_function(&name, loc);
            Ok(())
        })
    }

    fn analyze_block(&mut self, block: &mut Block) -> Result<()> {
        self.scoped(|this| {
            for stmt in &mut block.stmts {
                this.analyze_stmt(stmt)?;
            }
            Ok(())
        })
    }

    fn check_condition(&mut self, cond: &mut Expr, construct: &'static str) -> Result<()> {
        let ty = self.analyze_expr(cond)?;
        if ty != TypeName::Bool {
            return Err(SemanticError::NonBooleanCondition {
                construct,
                got: ty,
                loc: cond.loc,
            });
        }
        Ok(())
    }

    fn lookup(&self, name: &str, loc: Location) -> Result<TypeName> {
        self.symbols
            .get_symbol(name)
            .map(|entry| entry.ty)
            .ok_or_else(|| SemanticError::UndeclaredVariable {
                name: name.to_string(),
                loc,
            })
    }

    fn analyze_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        let loc = stmt.loc;
        match &mut stmt.kind {
            StmtKind::Declaration(decl) => self.declare(decl),
            StmtKind::DeclAndAssign { decl, init } => {
                let ty = self.analyze_expr(init)?;
                if ty != decl.ty {
                    return Err(SemanticError::TypeMismatch {
                        context: format!("initialization of `{}`", decl.name),
                        expected: decl.ty,
                        got: ty,
                        loc: init.loc,
                    });
                }
                self.declare(decl)
            }
            StmtKind::Assignment { name, value } => {
                let expected = self.lookup(name, loc)?;
                let ty = self.analyze_expr(value)?;
                if ty != expected {
                    return Err(SemanticError::TypeMismatch {
                        context: format!("assignment to `{}`", name),
                        expected,
                        got: ty,
                        loc: value.loc,
                    });
                }
                Ok(())
            }
            StmtKind::AugmentedAssignment { op, name, value } => {
                let expected = self.lookup(name, loc)?;
                if !expected.is_numeric() {
                    return Err(SemanticError::InvalidOperand {
                        op: op.to_string(),
                        ty: expected,
                        loc,
                    });
                }
                let ty = self.analyze_expr(value)?;
                if ty != expected {
                    return Err(SemanticError::TypeMismatch {
                        context: format!("`{}` on `{}`", op, name),
                        expected,
                        got: ty,
                        loc: value.loc,
                    });
                }
                Ok(())
            }
            StmtKind::Block(block) => self.analyze_block(block),
            StmtKind::If { cond, body } => {
                self.check_condition(cond, "if")?;
                self.analyze_stmt(body)
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => self.scoped(|this| {
                if let Some(init) = init {
                    this.analyze_stmt(init)?;
                }
                if let Some(cond) = cond {
                    this.check_condition(cond, "for")?;
                }
                if let Some(update) = update {
                    this.analyze_stmt(update)?;
                }
                this.in_loop(|this| this.analyze_stmt(body))
            }),
            StmtKind::While { cond, body } => {
                self.check_condition(cond, "while")?;
                self.in_loop(|this| this.analyze_stmt(body))
            }
            kind @ (StmtKind::Break | StmtKind::Continue) => {
                if self.loop_depth == 0 {
                    let keyword = if matches!(kind, StmtKind::Break) {
                        "break"
                    } else {
                        "continue"
                    };
                    return Err(SemanticError::LoopControlOutsideLoop { keyword, loc });
                }
                Ok(())
            }
            StmtKind::Return(value) => {
                let expected = self
                    .functions
                    .current_function()
                    .map(|function| function.return_type)
                    .ok_or(SemanticError::ReturnOutsideFunction { loc })?;
                self.seen_return = true;

                let (got, loc) = match value {
                    Some(value) => (self.analyze_expr(value)?, value.loc),
                    None => (TypeName::Void, loc),
                };
                if got != expected {
                    return Err(SemanticError::TypeMismatch {
                        context: "return".to_string(),
                        expected,
                        got,
                        loc,
                    });
                }
                Ok(())
            }
            StmtKind::Expr(expr) => self.analyze_expr(expr).map(|_| ()),
        }
    }

    /// Checks `expr`, writes its annotations and returns its type.
    fn analyze_expr(&mut self, expr: &mut Expr) -> Result<TypeName> {
        let loc = expr.loc;
        let (ty, is_constant) = match &mut expr.kind {
            ExprKind::Literal(literal) => (literal.ty(), true),
            ExprKind::Variable(name) => (self.lookup(name, loc)?, false),
            ExprKind::Binary { op, lhs, rhs } => {
                let (ty, is_constant) = self.analyze_operands(lhs, rhs, &op.to_string(), loc)?;
                if !ty.is_numeric() {
                    return Err(invalid_operand(*op, ty, loc));
                }
                (ty, is_constant)
            }
            ExprKind::Logical { op, lhs, rhs } => {
                let (ty, is_constant) = self.analyze_operands(lhs, rhs, &op.to_string(), loc)?;
                if ty == TypeName::Void {
                    return Err(invalid_operand(*op, ty, loc));
                }
                (TypeName::Bool, is_constant)
            }
            ExprKind::Relational { op, lhs, rhs } => {
                let (ty, is_constant) = self.analyze_operands(lhs, rhs, &op.to_string(), loc)?;
                if ty == TypeName::Void || (ty == TypeName::Bool && op.is_ordering()) {
                    return Err(invalid_operand(*op, ty, loc));
                }
                (TypeName::Bool, is_constant)
            }
            ExprKind::Unary { op, operand } => {
                let operand_ty = self.analyze_expr(operand)?;
                let ty = match op {
                    UnaryOp::Neg if operand_ty.is_numeric() => operand_ty,
                    UnaryOp::Not if operand_ty == TypeName::Bool => TypeName::Bool,
                    _ => return Err(invalid_operand(*op, operand_ty, loc)),
                };
                (ty, operand.is_constant)
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                self.check_condition(cond, "?:")?;
                let then_ty = self.analyze_expr(then_expr)?;
                let else_ty = self.analyze_expr(else_expr)?;
                if then_ty != else_ty {
                    return Err(SemanticError::TypeMismatch {
                        context: "branches of `?:`".to_string(),
                        expected: then_ty,
                        got: else_ty,
                        loc: else_expr.loc,
                    });
                }
                if then_ty == TypeName::Void {
                    return Err(invalid_operand("?:", then_ty, loc));
                }
                (
                    then_ty,
                    cond.is_constant && then_expr.is_constant && else_expr.is_constant,
                )
            }
            ExprKind::Cast { target, operand } => {
                if !target.is_cast_target() {
                    return Err(SemanticError::InvalidCastTarget {
                        target: *target,
                        loc,
                    });
                }
                let operand_ty = self.analyze_expr(operand)?;
                if !operand_ty.is_cast_target() {
                    return Err(invalid_operand(format!("({})", target), operand_ty, loc));
                }
                (*target, operand.is_constant)
            }
            ExprKind::Call { callee, args } => {
                let function = self
                    .functions
                    .get_function(callee)
                    .ok_or_else(|| SemanticError::UnknownFunction {
                        name: callee.clone(),
                        loc,
                    })?;
                let return_type = function.return_type;
                let param_types = function.param_types.clone();

                if args.len() != param_types.len() {
                    return Err(SemanticError::ArityMismatch {
                        name: callee.clone(),
                        expected: param_types.len(),
                        got: args.len(),
                        loc,
                    });
                }
                for arg in args.iter_mut() {
                    self.analyze_expr(arg)?;
                }
                for (i, (arg, expected)) in args.iter().zip(param_types).enumerate() {
                    let got = arg.ty.unwrap_or(TypeName::Void);
                    if got != expected {
                        return Err(SemanticError::TypeMismatch {
                            context: format!("argument {} of `{}`", i + 1, callee),
                            expected,
                            got,
                            loc: arg.loc,
                        });
                    }
                }
                (return_type, false)
            }
        };

        expr.ty = Some(ty);
        expr.is_constant = is_constant;
        Ok(ty)
    }

    /// Checks both operands of a binary node and requires them to have the same type.
    /// Returns the shared type and whether both operands are constant.
    fn analyze_operands(&mut self, lhs: &mut Expr, rhs: &mut Expr, op: &str, loc: Location) -> Result<(TypeName, bool)> {
        let lhs_ty = self.analyze_expr(lhs)?;
        let rhs_ty = self.analyze_expr(rhs)?;
        if lhs_ty != rhs_ty {
            return Err(SemanticError::TypeMismatch {
                context: format!("operands of `{}`", op),
                expected: lhs_ty,
                got: rhs_ty,
                loc,
            });
        }
        Ok((lhs_ty, lhs.is_constant && rhs.is_constant))
    }
}

fn invalid_operand(op: impl ToString, ty: TypeName, loc: Location) -> SemanticError {
    SemanticError::InvalidOperand {
        op: op.to_string(),
        ty,
        loc,
    }
}

/// Analyzes `program`, annotating it in place. Returns the populated function table.
pub fn analyze(program: &mut Program) -> Result<FunctionTable> {
    let mut analyzer = Analyzer::new();
    analyzer.analyze_program(program)?;
    Ok(analyzer.into_functions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccc_ast::builder::*;
    use ccc_ast::ops::AugmentedAssignOp;
    use ccc_ast::types::TypeName::*;

    fn check(mut program: Program) -> Result<Program> {
        analyze(&mut program)?;
        Ok(program)
    }

    fn main_with(body: Vec<Stmt>) -> Program {
        program(vec![func(Int, "main", vec![], body)])
    }

    #[test]
    fn annotates_expressions() {
        let program = check(main_with(vec![
            decl_assign(Int, "x", int(4)),
            ret(add(mul(int(2), int(3)), var("x"))),
        ]))
        .unwrap();

        let Item::Definition(main) = &program.items[0] else {
            panic!("expected a definition");
        };
        let StmtKind::Return(Some(value)) = &main.body.stmts[1].kind else {
            panic!("expected a return");
        };
        assert_eq!(value.ty, Some(Int));
        assert!(!value.is_constant);
        let ExprKind::Binary { lhs, rhs, .. } = &value.kind else {
            panic!("expected a binary expression");
        };
        assert_eq!(lhs.ty, Some(Int));
        assert!(lhs.is_constant);
        assert!(!rhs.is_constant);
    }

    #[test]
    fn relational_is_bool() {
        let program = check(main_with(vec![
            decl_assign(Bool, "b", lt(float(1.0), float(2.0))),
            ret(int(0)),
        ]))
        .unwrap();
        let Item::Definition(main) = &program.items[0] else {
            panic!("expected a definition");
        };
        let StmtKind::DeclAndAssign { init, .. } = &main.body.stmts[0].kind else {
            panic!("expected a declaration");
        };
        assert_eq!(init.ty, Some(Bool));
        assert!(init.is_constant);
    }

    #[test]
    fn undeclared_after_block() {
        let err = check(main_with(vec![
            block(vec![decl(Int, "x")]),
            ret(var("x").at(3, 12)),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            SemanticError::UndeclaredVariable {
                name: "x".to_string(),
                loc: Location::new(3, 12)
            }
        );
    }

    #[test]
    fn shadowing_in_inner_block() {
        check(main_with(vec![
            decl(Int, "x"),
            block(vec![decl(Float, "x"), assign("x", float(1.5))]),
            assign("x", int(2)),
            ret(var("x")),
        ]))
        .unwrap();
    }

    #[test]
    fn duplicate_declaration() {
        let err = check(main_with(vec![
            decl(Int, "x").at(1, 14),
            decl(Int, "x").at(1, 21),
            ret(int(0)),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            SemanticError::DuplicateDeclaration {
                name: "x".to_string(),
                loc: Location::new(1, 21),
                previous: Location::new(1, 14),
            }
        );
        assert_eq!(err.diagnostic().notes.len(), 1);
    }

    #[test]
    fn parameters_can_be_shadowed_by_body() {
        check(program(vec![
            func(Int, "f", vec![param(Int, "x")], vec![decl(Int, "x"), ret(int(0))]),
            func(Int, "main", vec![], vec![ret(call("f", vec![int(1)]))]),
        ]))
        .unwrap();
    }

    #[test]
    fn initializer_type_mismatch() {
        let err = check(main_with(vec![decl_assign(Int, "x", float(1.0)), ret(int(0))])).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch {
                expected: Int,
                got: Float,
                ..
            }
        ));
    }

    #[test]
    fn operand_type_mismatch() {
        let err = check(main_with(vec![ret(add(int(1), float(2.0)))])).unwrap_err();
        assert_eq!(err.category(), "type mismatch");
    }

    #[test]
    fn invalid_operands() {
        let err = check(main_with(vec![
            decl_assign(Bool, "b", add(boolean(true), boolean(false))),
            ret(int(0)),
        ]))
        .unwrap_err();
        assert!(matches!(err, SemanticError::InvalidOperand { ty: Bool, .. }));

        let err = check(main_with(vec![ret(not(int(1)))])).unwrap_err();
        assert!(matches!(err, SemanticError::InvalidOperand { ty: Int, .. }));

        let err = check(main_with(vec![
            decl(Bool, "b"),
            aug_assign(AugmentedAssignOp::AddAssign, "b", boolean(true)),
            ret(int(0)),
        ]))
        .unwrap_err();
        assert!(matches!(err, SemanticError::InvalidOperand { ty: Bool, .. }));
    }

    #[test]
    fn missing_main() {
        let err = check(program(vec![func(Int, "f", vec![], vec![ret(int(0))])])).unwrap_err();
        assert_eq!(err, SemanticError::MissingMain { loc: Location::default() });

        let err = check(program(vec![proto(Int, "main", vec![])])).unwrap_err();
        assert!(matches!(err, SemanticError::MissingMain { .. }));
    }

    #[test]
    fn wrong_main_signature() {
        let err = check(program(vec![func(Void, "main", vec![], vec![]).at(1, 1)])).unwrap_err();
        assert_eq!(
            err,
            SemanticError::WrongMainSignature {
                got: Void,
                loc: Location::new(1, 1)
            }
        );
    }

    #[test]
    fn missing_return() {
        let err = check(program(vec![
            func(Int, "f", vec![], vec![decl(Int, "x")]),
            func(Int, "main", vec![], vec![ret(int(0))]),
        ]))
        .unwrap_err();
        assert!(matches!(err, SemanticError::MissingReturn { ty: Int, .. }));

        // A return nested anywhere in the body is enough.
        check(program(vec![
            func(Int, "f", vec![], vec![if_(boolean(true), vec![ret(int(1))])]),
            func(Int, "main", vec![], vec![ret(int(0))]),
        ]))
        .unwrap();
    }

    #[test]
    fn return_type_mismatch() {
        let err = check(program(vec![
            func(Void, "f", vec![], vec![ret(int(1))]),
            func(Int, "main", vec![], vec![ret(int(0))]),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch {
                expected: Void,
                got: Int,
                ..
            }
        ));

        let err = check(main_with(vec![ret_void()])).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch {
                expected: Int,
                got: Void,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_function_definition() {
        let err = check(program(vec![
            func(Int, "f", vec![], vec![ret(int(0))]).at(1, 1),
            func(Int, "f", vec![], vec![ret(int(1))]).at(2, 1),
            func(Int, "main", vec![], vec![ret(int(0))]),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            SemanticError::DuplicateFunctionDefinition {
                name: "f".to_string(),
                loc: Location::new(2, 1),
                previous: Location::new(1, 1),
            }
        );

        let diagnostic = err.diagnostic();
        assert_eq!(diagnostic.category, "duplicate function definition");
        assert_eq!(diagnostic.notes[0].location, Location::new(1, 1));
    }

    #[test]
    fn prototypes() {
        // Redundant prototypes are fine, and a prototype allows calls before the definition.
        check(program(vec![
            proto(Int, "f", vec![param(Int, "x")]),
            proto(Int, "f", vec![param(Int, "x")]),
            func(Int, "main", vec![], vec![ret(call("f", vec![int(1)]))]),
            func(Int, "f", vec![param(Int, "x")], vec![ret(var("x"))]),
        ]))
        .unwrap();
    }

    #[test]
    fn recursion() {
        check(program(vec![
            func(
                Int,
                "fact",
                vec![param(Int, "n")],
                vec![
                    if_(le(var("n"), int(1)), vec![ret(int(1))]),
                    ret(mul(var("n"), call("fact", vec![sub(var("n"), int(1))]))),
                ],
            ),
            func(Int, "main", vec![], vec![ret(call("fact", vec![int(5)]))]),
        ]))
        .unwrap();
    }

    #[test]
    fn call_errors() {
        let err = check(main_with(vec![ret(call("g", vec![]))])).unwrap_err();
        assert!(matches!(err, SemanticError::UnknownFunction { .. }));

        let f = func(Int, "f", vec![param(Int, "x")], vec![ret(var("x"))]);
        let err = check(program(vec![
            f.clone(),
            func(Int, "main", vec![], vec![ret(call("f", vec![]))]),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::ArityMismatch {
                expected: 1,
                got: 0,
                ..
            }
        ));

        let err = check(program(vec![
            f,
            func(Int, "main", vec![], vec![ret(call("f", vec![float(1.0)]))]),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch {
                expected: Int,
                got: Float,
                ..
            }
        ));
    }

    #[test]
    fn casts() {
        check(main_with(vec![ret(cast(Int, float(2.5)))])).unwrap();

        let err = check(main_with(vec![
            decl_assign(Double, "d", cast(Double, int(1))),
            ret(int(0)),
        ]))
        .unwrap_err();
        assert!(matches!(err, SemanticError::InvalidCastTarget { target: Double, .. }));

        let err = check(main_with(vec![ret(cast(Int, boolean(true)))])).unwrap_err();
        assert!(matches!(err, SemanticError::InvalidOperand { ty: Bool, .. }));

        // Only `int` and `float` convert; wider numeric types do not.
        for ty in [Char, Short, Long, Double] {
            let err = check(main_with(vec![
                decl(ty, "x"),
                ret(cast(Int, var("x"))),
            ]))
            .unwrap_err();
            assert!(matches!(err, SemanticError::InvalidOperand { ty: got, .. } if got == ty));
        }
    }

    #[test]
    fn conditions_must_be_bool() {
        let err = check(main_with(vec![while_(int(1), vec![]), ret(int(0))])).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::NonBooleanCondition {
                construct: "while",
                got: Int,
                ..
            }
        ));

        let err = check(main_with(vec![ret(ternary(int(1), int(2), int(3)))])).unwrap_err();
        assert!(matches!(err, SemanticError::NonBooleanCondition { construct: "?:", .. }));
    }

    #[test]
    fn ternary_rules() {
        let err = check(main_with(vec![ret(ternary(boolean(true), int(2), float(3.0)))])).unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));

        let program = check(main_with(vec![ret(ternary(boolean(true), int(2), int(3)))])).unwrap();
        let Item::Definition(main) = &program.items[0] else {
            panic!("expected a definition");
        };
        let StmtKind::Return(Some(value)) = &main.body.stmts[0].kind else {
            panic!("expected a return");
        };
        assert_eq!(value.ty, Some(Int));
        assert!(value.is_constant);
    }

    #[test]
    fn loop_control() {
        let err = check(main_with(vec![brk().at(1, 14), ret(int(0))])).unwrap_err();
        assert_eq!(
            err,
            SemanticError::LoopControlOutsideLoop {
                keyword: "break",
                loc: Location::new(1, 14)
            }
        );

        check(main_with(vec![
            for_(
                Some(decl_assign(Int, "i", int(0))),
                Some(lt(var("i"), int(10))),
                Some(aug_assign(AugmentedAssignOp::AddAssign, "i", int(1))),
                vec![if_(eq(var("i"), int(5)), vec![cont()]), brk()],
            ),
            ret(int(0)),
        ]))
        .unwrap();
    }

    #[test]
    fn for_variable_is_scoped_to_loop() {
        let err = check(main_with(vec![
            for_(Some(decl_assign(Int, "i", int(0))), None, None, vec![brk()]),
            ret(var("i")),
        ]))
        .unwrap_err();
        assert!(matches!(err, SemanticError::UndeclaredVariable { .. }));
    }

    #[test]
    fn void_declaration() {
        let err = check(main_with(vec![decl(Void, "v"), ret(int(0))])).unwrap_err();
        assert!(matches!(err, SemanticError::VoidDeclaration { .. }));
    }

    #[test]
    fn scopes_are_balanced_after_error() {
        let mut analyzer = Analyzer::new();
        let mut bad = main_with(vec![block(vec![block(vec![ret(var("nope"))])])]);
        assert!(analyzer.analyze_program(&mut bad).is_err());
        assert_eq!(analyzer.symbols.depth(), 1);
        assert!(!analyzer.functions.is_in_function_definition());
    }
}
