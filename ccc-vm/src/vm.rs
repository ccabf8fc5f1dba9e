//! Executes an IR [`Module`] directly.
//!
//! Every call gets a fresh frame holding the function's stack slots and the value of every
//! instruction executed so far. A `phi` picks its operand by the block control arrived from.

use crate::builtins::{default_builtins, Builtins};
use ccc_ir::{
    BinOp, BlockId, CastOp, Constant, FloatPredicate, FuncId, Function, Inst, InstId, InstKind, IntPredicate,
    IrType, Module, Terminator, Value,
};
use num_traits::{CheckedDiv, CheckedRem, Float, PrimInt, ToPrimitive, WrappingAdd, WrappingMul, WrappingSub};
use thiserror::Error;
use tracing::{debug, trace};

/// Default bound on the number of nested calls.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("undefined function `{0}`")]
    UndefinedFunction(String),
    #[error("`{name}` expects {expected} argument(s), received {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("integer division by zero in `{0}`")]
    DivisionByZero(String),
    #[error("reached unreachable code in `{0}`")]
    Unreachable(String),
    #[error("stack overflow: more than {0} nested calls")]
    StackOverflow(usize),
    #[error("conversion out of range in `{0}`")]
    ConversionOutOfRange(String),
    #[error("malformed IR in `{function}`: {message}")]
    Malformed { function: String, message: String },
}

type Result<T> = std::result::Result<T, RuntimeError>;

/// Failure of an arithmetic kernel, before it is attributed to a function.
enum Fault {
    DivisionByZero,
    Unsupported,
}

fn int_binary<T>(op: BinOp, lhs: T, rhs: T) -> std::result::Result<T, Fault>
where
    T: PrimInt + WrappingAdd + WrappingSub + WrappingMul + CheckedDiv + CheckedRem,
{
    Ok(match op {
        BinOp::Add => lhs.wrapping_add(&rhs),
        BinOp::Sub => lhs.wrapping_sub(&rhs),
        BinOp::Mul => lhs.wrapping_mul(&rhs),
        BinOp::SDiv | BinOp::SRem if rhs.is_zero() => return Err(Fault::DivisionByZero),
        // Only `MIN / -1` overflows. It wraps to `MIN`, with a remainder of zero.
        BinOp::SDiv => lhs.checked_div(&rhs).unwrap_or(lhs),
        BinOp::SRem => lhs.checked_rem(&rhs).unwrap_or_else(T::zero),
        BinOp::And => lhs & rhs,
        BinOp::Or => lhs | rhs,
        BinOp::Xor => lhs ^ rhs,
        _ => return Err(Fault::Unsupported),
    })
}

fn bool_binary(op: BinOp, lhs: bool, rhs: bool) -> std::result::Result<bool, Fault> {
    match op {
        BinOp::And => Ok(lhs & rhs),
        BinOp::Or => Ok(lhs | rhs),
        BinOp::Xor => Ok(lhs ^ rhs),
        _ => Err(Fault::Unsupported),
    }
}

fn float_binary<T: Float>(op: BinOp, lhs: T, rhs: T) -> std::result::Result<T, Fault> {
    match op {
        BinOp::FAdd => Ok(lhs + rhs),
        BinOp::FSub => Ok(lhs - rhs),
        BinOp::FMul => Ok(lhs * rhs),
        BinOp::FDiv => Ok(lhs / rhs),
        BinOp::FRem => Ok(lhs % rhs),
        _ => Err(Fault::Unsupported),
    }
}

fn binary(op: BinOp, lhs: Constant, rhs: Constant) -> std::result::Result<Constant, Fault> {
    // Dispatches to `$kernel` when both operands are `Constant::$variant`.
    macro_rules! gen_binary_op {
        ($($variant:ident => $kernel:ident),*) => {
            match (lhs, rhs) {
                $(
                    (Constant::$variant(a), Constant::$variant(b)) => {
                        $kernel(op, a, b).map(Constant::$variant)
                    }
                )*
                _ => Err(Fault::Unsupported),
            }
        };
    }

    gen_binary_op!(
        I1 => bool_binary,
        I8 => int_binary,
        I16 => int_binary,
        I32 => int_binary,
        I64 => int_binary,
        F32 => float_binary,
        F64 => float_binary
    )
}

fn int_compare<T: PartialOrd>(pred: IntPredicate, lhs: T, rhs: T) -> bool {
    match pred {
        IntPredicate::Eq => lhs == rhs,
        IntPredicate::Ne => lhs != rhs,
        IntPredicate::Slt => lhs < rhs,
        IntPredicate::Sgt => lhs > rhs,
        IntPredicate::Sle => lhs <= rhs,
        IntPredicate::Sge => lhs >= rhs,
    }
}

/// Ordered comparison: false whenever either operand is NaN.
fn float_compare<T: Float>(pred: FloatPredicate, lhs: T, rhs: T) -> bool {
    if lhs.is_nan() || rhs.is_nan() {
        return false;
    }
    match pred {
        FloatPredicate::Oeq => lhs == rhs,
        FloatPredicate::One => lhs != rhs,
        FloatPredicate::Olt => lhs < rhs,
        FloatPredicate::Ogt => lhs > rhs,
        FloatPredicate::Ole => lhs <= rhs,
        FloatPredicate::Oge => lhs >= rhs,
    }
}

fn icmp(pred: IntPredicate, lhs: Constant, rhs: Constant) -> Option<bool> {
    Some(match (lhs, rhs) {
        (Constant::I1(a), Constant::I1(b)) => int_compare(pred, a, b),
        (Constant::I8(a), Constant::I8(b)) => int_compare(pred, a, b),
        (Constant::I16(a), Constant::I16(b)) => int_compare(pred, a, b),
        (Constant::I32(a), Constant::I32(b)) => int_compare(pred, a, b),
        (Constant::I64(a), Constant::I64(b)) => int_compare(pred, a, b),
        _ => return None,
    })
}

fn fcmp(pred: FloatPredicate, lhs: Constant, rhs: Constant) -> Option<bool> {
    Some(match (lhs, rhs) {
        (Constant::F32(a), Constant::F32(b)) => float_compare(pred, a, b),
        (Constant::F64(a), Constant::F64(b)) => float_compare(pred, a, b),
        _ => return None,
    })
}

/// `None` if the conversion is out of range or not a conversion `op` performs.
fn convert(op: CastOp, value: Constant, ty: IrType) -> Option<Constant> {
    match op {
        CastOp::FpToSi => {
            let val = match value {
                Constant::F32(val) => f64::from(val),
                Constant::F64(val) => val,
                _ => return None,
            };
            Some(match ty {
                IrType::I8 => Constant::I8(val.to_i8()?),
                IrType::I16 => Constant::I16(val.to_i16()?),
                IrType::I32 => Constant::I32(val.to_i32()?),
                IrType::I64 => Constant::I64(val.to_i64()?),
                _ => return None,
            })
        }
        CastOp::SiToFp => {
            let val = match value {
                Constant::I8(val) => i64::from(val),
                Constant::I16(val) => i64::from(val),
                Constant::I32(val) => i64::from(val),
                Constant::I64(val) => val,
                _ => return None,
            };
            Some(match ty {
                IrType::F32 => Constant::F32(val.to_f32()?),
                IrType::F64 => Constant::F64(val.to_f64()?),
                _ => return None,
            })
        }
    }
}

/// What the interpreter loop does after one instruction.
enum Step {
    Value(Option<Constant>),
    Call(FuncId, Vec<Constant>),
}

/// Result of entering a function.
enum Entered<'a> {
    /// A builtin ran to completion.
    Native(Option<Constant>),
    Frame(CallFrame<'a>),
}

struct CallFrame<'a> {
    function: &'a Function,
    args: Vec<Constant>,
    /// Current contents of each stack slot. Slots start out zeroed.
    slots: Vec<Option<Constant>>,
    /// Result of each instruction, indexed by `InstId`.
    values: Vec<Option<Constant>>,
    block: BlockId,
    /// Block control arrived from, read by `phi`.
    previous: Option<BlockId>,
    /// Instruction pointer into `block`.
    ip: usize,
    /// Call waiting for the callee's result.
    call_site: Option<InstId>,
}

impl<'a> CallFrame<'a> {
    fn new(function: &'a Function, args: Vec<Constant>) -> Self {
        Self {
            function,
            args,
            slots: function.slots.iter().map(|slot| slot.ty.zero()).collect(),
            values: vec![None; function.insts.len()],
            block: BlockId(0),
            previous: None,
            ip: 0,
            call_site: None,
        }
    }

    fn malformed(&self, message: impl ToString) -> RuntimeError {
        RuntimeError::Malformed {
            function: self.function.name.clone(),
            message: message.to_string(),
        }
    }

    fn value(&self, value: &Value) -> Result<Constant> {
        match value {
            Value::Const(constant) => Ok(*constant),
            Value::Inst(id) => self
                .values
                .get(id.0)
                .copied()
                .flatten()
                .ok_or_else(|| self.malformed(format!("instruction #{} used before it produced a value", id.0))),
            Value::Arg(index) => self
                .args
                .get(*index)
                .copied()
                .ok_or_else(|| self.malformed(format!("no argument #{}", index))),
        }
    }

    fn fault(&self, fault: Fault, what: &str) -> RuntimeError {
        match fault {
            Fault::DivisionByZero => RuntimeError::DivisionByZero(self.function.name.clone()),
            Fault::Unsupported => self.malformed(format!("unsupported operands for `{}`", what)),
        }
    }

    fn jump(&mut self, target: BlockId) {
        self.previous = Some(self.block);
        self.block = target;
        self.ip = 0;
    }

    /// Executes one instruction. Calls are handed back to the interpreter loop.
    fn execute(&mut self, inst: &Inst) -> Result<Step> {
        let result = match &inst.kind {
            InstKind::Load(slot) => {
                let value = self.slots.get(slot.0).copied().flatten();
                Some(value.ok_or_else(|| self.malformed(format!("load from invalid slot #{}", slot.0)))?)
            }
            InstKind::Store { slot, value } => {
                let value = self.value(value)?;
                if slot.0 >= self.slots.len() {
                    return Err(self.malformed(format!("store to invalid slot #{}", slot.0)));
                }
                self.slots[slot.0] = Some(value);
                None
            }
            InstKind::Binary { op, lhs, rhs } => {
                let lhs = self.value(lhs)?;
                let rhs = self.value(rhs)?;
                Some(binary(*op, lhs, rhs).map_err(|fault| self.fault(fault, op.name()))?)
            }
            InstKind::FNeg(value) => Some(match self.value(value)? {
                Constant::F32(val) => Constant::F32(-val),
                Constant::F64(val) => Constant::F64(-val),
                _ => return Err(self.fault(Fault::Unsupported, "fneg")),
            }),
            InstKind::ICmp { pred, lhs, rhs } => {
                let result = icmp(*pred, self.value(lhs)?, self.value(rhs)?);
                Some(Constant::I1(result.ok_or_else(|| self.fault(Fault::Unsupported, "icmp"))?))
            }
            InstKind::FCmp { pred, lhs, rhs } => {
                let result = fcmp(*pred, self.value(lhs)?, self.value(rhs)?);
                Some(Constant::I1(result.ok_or_else(|| self.fault(Fault::Unsupported, "fcmp"))?))
            }
            InstKind::Cast { op, value } => {
                let value = self.value(value)?;
                let converted = convert(*op, value, inst.ty)
                    .ok_or_else(|| RuntimeError::ConversionOutOfRange(self.function.name.clone()))?;
                Some(converted)
            }
            InstKind::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.value(arg))
                    .collect::<Result<Vec<_>>>()?;
                return Ok(Step::Call(*callee, args));
            }
            InstKind::Phi { incoming } => {
                let (value, _) = incoming
                    .iter()
                    .find(|(_, from)| Some(*from) == self.previous)
                    .ok_or_else(|| self.malformed("phi has no value for the incoming edge"))?;
                Some(self.value(value)?)
            }
        };
        Ok(Step::Value(result))
    }
}

/// Interprets the functions of one module.
///
/// Calls between interpreted functions never recurse on the native stack: suspended callers
/// wait on an explicit call stack, bounded by the maximum call depth.
pub struct Vm<'a> {
    module: &'a Module,
    builtins: Builtins,
    /// Everything printed by builtins.
    output: String,
    max_depth: usize,
}

impl<'a> Vm<'a> {
    pub fn new(module: &'a Module) -> Self {
        Self::with_builtins(module, default_builtins())
    }

    pub fn with_builtins(module: &'a Module, builtins: Builtins) -> Self {
        Self {
            module,
            builtins,
            output: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Calls the function called `name` and returns its result (`None` for `void` functions).
    pub fn call(&mut self, name: &str, args: &[Constant]) -> Result<Option<Constant>> {
        let id = self
            .module
            .get_function(name)
            .ok_or_else(|| RuntimeError::UndefinedFunction(name.to_string()))?;
        debug!(function = name, "calling");
        match self.enter(id, args.to_vec(), 0)? {
            Entered::Native(result) => Ok(result),
            Entered::Frame(frame) => self.run(frame),
        }
    }

    /// Runs `int main()` and returns its exit code.
    pub fn run_main(&mut self) -> Result<i32> {
        match self.call("main", &[])? {
            Some(Constant::I32(code)) => Ok(code),
            other => Err(RuntimeError::Malformed {
                function: "main".to_string(),
                message: format!("expected an `i32` result, got {:?}", other),
            }),
        }
    }

    /// Checks a call and either runs the builtin or sets up a frame. `depth` is the number of
    /// frames already live.
    fn enter(&mut self, id: FuncId, args: Vec<Constant>, depth: usize) -> Result<Entered<'a>> {
        let module = self.module;
        let function = module
            .function(id)
            .ok_or_else(|| RuntimeError::UndefinedFunction(format!("#{}", id.0)))?;
        if function.params.len() != args.len() {
            return Err(RuntimeError::ArityMismatch {
                name: function.name.clone(),
                expected: function.params.len(),
                got: args.len(),
            });
        }

        if function.is_declaration() {
            let (native, arity) = self
                .builtins
                .get(&function.name)
                .ok_or_else(|| RuntimeError::UndefinedFunction(function.name.clone()))?;
            if arity != args.len() {
                return Err(RuntimeError::ArityMismatch {
                    name: function.name.clone(),
                    expected: arity,
                    got: args.len(),
                });
            }
            trace!(function = %function.name, "calling builtin");
            return Ok(Entered::Native(native(&args, &mut self.output)));
        }

        if depth >= self.max_depth {
            return Err(RuntimeError::StackOverflow(self.max_depth));
        }
        trace!(function = %function.name, depth = depth + 1, "entering function");
        Ok(Entered::Frame(CallFrame::new(function, args)))
    }

    fn run(&mut self, mut frame: CallFrame<'a>) -> Result<Option<Constant>> {
        let mut call_stack: Vec<CallFrame<'a>> = Vec::new();

        loop {
            let function = frame.function;
            let block = function
                .block(frame.block)
                .ok_or_else(|| frame.malformed(format!("no block #{}", frame.block.0)))?;

            if let Some(id) = block.insts.get(frame.ip).copied() {
                frame.ip += 1;
                let inst = function
                    .inst(id)
                    .ok_or_else(|| frame.malformed(format!("no instruction #{}", id.0)))?;
                match frame.execute(inst)? {
                    Step::Value(result) => frame.values[id.0] = result,
                    Step::Call(callee, args) => match self.enter(callee, args, call_stack.len() + 1)? {
                        Entered::Native(result) => frame.values[id.0] = result,
                        Entered::Frame(callee) => {
                            frame.call_site = Some(id);
                            call_stack.push(std::mem::replace(&mut frame, callee));
                        }
                    },
                }
                continue;
            }

            let terminator = block
                .terminator
                .as_ref()
                .ok_or_else(|| frame.malformed(format!("block `{}` has no terminator", block.label)))?;
            match terminator {
                Terminator::Ret(value) => {
                    let result = value.as_ref().map(|value| frame.value(value)).transpose()?;
                    match call_stack.pop() {
                        Some(caller) => {
                            frame = caller;
                            if let Some(site) = frame.call_site.take() {
                                frame.values[site.0] = result;
                            }
                        }
                        None => return Ok(result),
                    }
                }
                Terminator::Br(target) => frame.jump(*target),
                Terminator::CondBr {
                    cond,
                    then_block,
                    else_block,
                } => {
                    let taken = match frame.value(cond)? {
                        Constant::I1(taken) => taken,
                        other => return Err(frame.malformed(format!("branch on non-`i1` value {}", other))),
                    };
                    frame.jump(if taken { *then_block } else { *else_block });
                }
                Terminator::Unreachable => return Err(RuntimeError::Unreachable(function.name.clone())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Result, RuntimeError, Vm, DEFAULT_MAX_DEPTH};
    use crate::codegen::codegen;
    use ccc_ir::{Constant, Module};
    use ccc_ast::ast::Program;
    use ccc_ast::builder::*;
    use ccc_ast::ops::AugmentedAssignOp;
    use ccc_ast::types::TypeName::*;
    use ccc_passes::{optimize::optimize, sema::analyze};

    fn compile(mut program: Program, optimized: bool) -> Module {
        analyze(&mut program).unwrap();
        if optimized {
            optimize(&mut program);
        }
        codegen(&program, "test").unwrap()
    }

    /// Runs `main` with and without optimization and checks both agree.
    fn run_main(program: Program) -> Result<i32> {
        let unoptimized = Vm::new(&compile(program.clone(), false)).run_main();
        let optimized = Vm::new(&compile(program, true)).run_main();
        assert_eq!(unoptimized, optimized);
        optimized
    }

    fn main_with(body: Vec<ccc_ast::ast::Stmt>) -> Program {
        program(vec![func(Int, "main", vec![], body)])
    }

    #[test]
    fn call_returns_argument() {
        let program = program(vec![
            func(Int, "f", vec![param(Int, "x")], vec![ret(var("x"))]),
            func(Int, "main", vec![], vec![ret(call("f", vec![int(5)]))]),
        ]);
        assert_eq!(run_main(program), Ok(5));
    }

    #[test]
    fn recursion() {
        let program = program(vec![
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
        ]);
        assert_eq!(run_main(program), Ok(120));
    }

    #[test]
    fn nested_loops() {
        let program = main_with(vec![
            decl_assign(Int, "total", int(0)),
            for_(
                Some(decl_assign(Int, "i", int(0))),
                Some(lt(var("i"), int(5))),
                Some(aug_assign(AugmentedAssignOp::AddAssign, "i", int(1))),
                vec![
                    if_(eq(var("i"), int(3)), vec![cont()]),
                    decl_assign(Int, "j", int(0)),
                    while_(
                        boolean(true),
                        vec![
                            if_(eq(var("j"), int(2)), vec![brk()]),
                            aug_assign(AugmentedAssignOp::AddAssign, "total", int(1)),
                            aug_assign(AugmentedAssignOp::AddAssign, "j", int(1)),
                        ],
                    ),
                ],
            ),
            ret(var("total")),
        ]);
        assert_eq!(run_main(program), Ok(8));
    }

    #[test]
    fn floats_and_casts() {
        let program = main_with(vec![
            decl_assign(Float, "x", float(1.5)),
            decl_assign(Float, "y", mul(var("x"), float(3.0))),
            ret(cast(Int, var("y"))),
        ]);
        assert_eq!(run_main(program), Ok(4));
    }

    #[test]
    fn logical_and_ternary() {
        let program = main_with(vec![
            decl_assign(Bool, "a", boolean(true)),
            decl_assign(Bool, "b", boolean(false)),
            decl_assign(Int, "z", int(0)),
            decl_assign(Int, "x", ternary(and(var("a"), not(var("b"))), int(10), int(20))),
            decl_assign(Int, "y", ternary(or(var("z"), int(3)), int(1), int(2))),
            ret(add(var("x"), var("y"))),
        ]);
        assert_eq!(run_main(program), Ok(11));
    }

    #[test]
    fn arithmetic_wraps() {
        let program = main_with(vec![
            decl_assign(Int, "m", int(i32::MAX)),
            ret(add(var("m"), int(1))),
        ]);
        assert_eq!(run_main(program), Ok(i32::MIN));
    }

    #[test]
    fn division_by_zero() {
        let program = main_with(vec![
            decl_assign(Int, "x", int(0)),
            ret(div(int(1), var("x"))),
        ]);
        assert_eq!(
            run_main(program),
            Err(RuntimeError::DivisionByZero("main".to_string()))
        );
    }

    #[test]
    fn falling_off_a_function() {
        let program = program(vec![
            func(
                Int,
                "f",
                vec![param(Bool, "b")],
                vec![if_(var("b"), vec![ret(int(1))])],
            ),
            func(Int, "main", vec![], vec![ret(call("f", vec![boolean(false)]))]),
        ]);
        assert_eq!(
            run_main(program),
            Err(RuntimeError::Unreachable("f".to_string()))
        );
    }

    #[test]
    fn stack_overflow() {
        let program = program(vec![
            func(Int, "f", vec![param(Int, "n")], vec![ret(call("f", vec![var("n")]))]),
            func(Int, "main", vec![], vec![ret(call("f", vec![int(0)]))]),
        ]);
        let module = compile(program, true);
        let mut vm = Vm::new(&module);
        vm.set_max_depth(64);
        assert_eq!(vm.run_main(), Err(RuntimeError::StackOverflow(64)));
    }

    #[test]
    fn unbounded_recursion_at_default_depth() {
        let program = program(vec![
            func(Int, "f", vec![param(Int, "n")], vec![ret(call("f", vec![var("n")]))]),
            func(Int, "main", vec![], vec![ret(call("f", vec![int(1)]))]),
        ]);
        assert_eq!(
            run_main(program),
            Err(RuntimeError::StackOverflow(DEFAULT_MAX_DEPTH))
        );
    }

    #[test]
    fn deep_recursion_within_limit() {
        let program = program(vec![
            func(
                Int,
                "sum",
                vec![param(Int, "n")],
                vec![
                    if_(eq(var("n"), int(0)), vec![ret(int(0))]),
                    ret(add(var("n"), call("sum", vec![sub(var("n"), int(1))]))),
                ],
            ),
            func(Int, "main", vec![], vec![ret(call("sum", vec![int(1000)]))]),
        ]);
        assert_eq!(run_main(program), Ok(500500));
    }

    #[test]
    fn builtins_write_output() {
        let program = program(vec![
            proto(Void, "putint", vec![param(Int, "n")]),
            proto(Void, "putascii", vec![param(Int, "c")]),
            func(
                Int,
                "main",
                vec![],
                vec![
                    expr_stmt(call("putint", vec![int(42)])),
                    expr_stmt(call("putascii", vec![int(72)])),
                    expr_stmt(call("putascii", vec![int(105)])),
                    ret(int(0)),
                ],
            ),
        ]);
        let module = compile(program, true);
        let mut vm = Vm::new(&module);
        assert_eq!(vm.run_main(), Ok(0));
        assert_eq!(vm.output(), "putint: 42\nHi");
        assert_eq!(vm.take_output(), "putint: 42\nHi");
        assert_eq!(vm.output(), "");
    }

    #[test]
    fn unknown_builtin() {
        let program = program(vec![
            proto(Void, "mystery", vec![]),
            func(
                Int,
                "main",
                vec![],
                vec![expr_stmt(call("mystery", vec![])), ret(int(0))],
            ),
        ]);
        assert_eq!(
            run_main(program),
            Err(RuntimeError::UndefinedFunction("mystery".to_string()))
        );
    }

    #[test]
    fn call_by_name() {
        let program = program(vec![
            func(
                Int,
                "add",
                vec![param(Int, "a"), param(Int, "b")],
                vec![ret(add(var("a"), var("b")))],
            ),
            func(Int, "main", vec![], vec![ret(int(0))]),
        ]);
        let module = compile(program, true);
        let mut vm = Vm::new(&module);
        assert_eq!(
            vm.call("add", &[Constant::I32(2), Constant::I32(40)]),
            Ok(Some(Constant::I32(42)))
        );
        assert!(matches!(
            vm.call("add", &[Constant::I32(2)]),
            Err(RuntimeError::ArityMismatch { expected: 2, got: 1, .. })
        ));
        assert_eq!(
            vm.call("nope", &[]),
            Err(RuntimeError::UndefinedFunction("nope".to_string()))
        );
    }
}
