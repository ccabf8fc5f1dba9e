//! Textual dump of a [`Module`] in an LLVM-like syntax.

use crate::{BlockId, Function, Inst, InstId, InstKind, IrType, Module, SlotId, Terminator, Value};
use std::collections::HashMap;
use std::fmt;

/// Naming state for one function: SSA results are numbered in print order and stack slots get
/// unique `%name.addr` names.
struct FunctionPrinter<'a> {
    module: &'a Module,
    function: &'a Function,
    numbers: HashMap<InstId, usize>,
    slot_names: Vec<String>,
}

impl<'a> FunctionPrinter<'a> {
    fn new(module: &'a Module, function: &'a Function) -> Self {
        let mut numbers = HashMap::new();
        for id in function.blocks.iter().flat_map(|block| &block.insts) {
            let has_result = function
                .inst(*id)
                .map_or(false, |inst| inst.ty != IrType::Void);
            if has_result {
                numbers.insert(*id, numbers.len());
            }
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let slot_names = function
            .slots
            .iter()
            .map(|slot| {
                let count = seen.entry(slot.name.as_str()).or_insert(0);
                let name = if *count == 0 {
                    format!("%{}.addr", slot.name)
                } else {
                    format!("%{}.addr{}", slot.name, count)
                };
                *count += 1;
                name
            })
            .collect();

        Self {
            module,
            function,
            numbers,
            slot_names,
        }
    }

    fn value(&self, value: &Value) -> String {
        match value {
            Value::Const(constant) => constant.to_string(),
            Value::Inst(id) => match self.numbers.get(id) {
                Some(number) => format!("%{}", number),
                None => format!("%inst{}", id.0),
            },
            Value::Arg(index) => match self.function.params.get(*index) {
                Some(param) => format!("%{}", param.name),
                None => format!("%arg{}", index),
            },
        }
    }

    /// `type value`
    fn typed(&self, value: &Value) -> String {
        format!("{} {}", self.function.value_type(value), self.value(value))
    }

    fn slot(&self, slot: SlotId) -> &str {
        self.slot_names
            .get(slot.0)
            .map_or("%<bad slot>", String::as_str)
    }

    fn label(&self, block: BlockId) -> String {
        self.function
            .block(block)
            .map_or_else(|| format!("%<bad block {}>", block.0), |block| format!("%{}", block.label))
    }

    fn inst(&self, f: &mut fmt::Formatter<'_>, id: InstId, inst: &Inst) -> fmt::Result {
        write!(f, "  ")?;
        if let Some(number) = self.numbers.get(&id) {
            write!(f, "%{} = ", number)?;
        }
        match &inst.kind {
            InstKind::Load(slot) => write!(f, "load {}, ptr {}", inst.ty, self.slot(*slot)),
            InstKind::Store { slot, value } => {
                write!(f, "store {}, ptr {}", self.typed(value), self.slot(*slot))
            }
            InstKind::Binary { op, lhs, rhs } => {
                write!(f, "{} {}, {}", op.name(), self.typed(lhs), self.value(rhs))
            }
            InstKind::FNeg(value) => write!(f, "fneg {}", self.typed(value)),
            InstKind::ICmp { pred, lhs, rhs } => {
                write!(f, "icmp {} {}, {}", pred.name(), self.typed(lhs), self.value(rhs))
            }
            InstKind::FCmp { pred, lhs, rhs } => {
                write!(f, "fcmp {} {}, {}", pred.name(), self.typed(lhs), self.value(rhs))
            }
            InstKind::Cast { op, value } => {
                write!(f, "{} {} to {}", op.name(), self.typed(value), inst.ty)
            }
            InstKind::Call { callee, args } => {
                let callee = self
                    .module
                    .function(*callee)
                    .map_or("<bad callee>", |callee| callee.name.as_str());
                let args = args
                    .iter()
                    .map(|arg| self.typed(arg))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "call {} @{}({})", inst.ty, callee, args)
            }
            InstKind::Phi { incoming } => {
                let incoming = incoming
                    .iter()
                    .map(|(value, block)| format!("[ {}, {} ]", self.value(value), self.label(*block)))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "phi {} {}", inst.ty, incoming)
            }
        }?;
        writeln!(f)
    }

    fn terminator(&self, f: &mut fmt::Formatter<'_>, terminator: Option<&Terminator>) -> fmt::Result {
        match terminator {
            Some(Terminator::Ret(Some(value))) => writeln!(f, "  ret {}", self.typed(value)),
            Some(Terminator::Ret(None)) => writeln!(f, "  ret void"),
            Some(Terminator::Br(target)) => writeln!(f, "  br label {}", self.label(*target)),
            Some(Terminator::CondBr {
                cond,
                then_block,
                else_block,
            }) => writeln!(
                f,
                "  br {}, label {}, label {}",
                self.typed(cond),
                self.label(*then_block),
                self.label(*else_block)
            ),
            Some(Terminator::Unreachable) => writeln!(f, "  unreachable"),
            None => writeln!(f, "  ; missing terminator"),
        }
    }
}

impl fmt::Display for FunctionPrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let function = self.function;
        if function.is_declaration() {
            let params = function
                .params
                .iter()
                .map(|param| param.ty.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return writeln!(f, "declare {} @{}({})", function.return_type, function.name, params);
        }

        let params = function
            .params
            .iter()
            .map(|param| format!("{} %{}", param.ty, param.name))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "define {} @{}({}) {{", function.return_type, function.name, params)?;

        for (index, block) in function.blocks.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", block.label)?;
            if index == 0 {
                for (slot, name) in function.slots.iter().zip(&self.slot_names) {
                    writeln!(f, "  {} = alloca {}", name, slot.ty)?;
                }
            }
            for id in &block.insts {
                if let Some(inst) = function.inst(*id) {
                    self.inst(f, *id, inst)?;
                }
            }
            self.terminator(f, block.terminator.as_ref())?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        for function in &self.functions {
            writeln!(f)?;
            write!(f, "{}", FunctionPrinter::new(self, function))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{BinOp, Builder, Constant, IntPredicate, IrType, Param, Value};

    fn param(name: &str, ty: IrType) -> Param {
        Param {
            name: name.to_string(),
            ty,
        }
    }

    #[test]
    fn dump_module() {
        let mut builder = Builder::new("test");
        let putint = builder.declare_function("putint", IrType::Void, vec![param("n", IrType::I32)]);
        let main = builder.declare_function("main", IrType::I32, vec![param("n", IrType::I32)]);
        let entry = builder.append_block(main, "entry").unwrap();
        let pos = builder.append_block(main, "pos").unwrap();
        let merge = builder.append_block(main, "merge").unwrap();

        builder.position_at_end(main, entry).unwrap();
        let x = builder.build_alloca("x", IrType::I32).unwrap();
        builder.build_store(x, Value::Arg(0)).unwrap();
        let loaded = builder.build_load(x).unwrap();
        let cond = builder
            .build_icmp(IntPredicate::Sgt, loaded, Constant::I32(0).into())
            .unwrap();
        builder.build_cond_br(cond, pos, merge).unwrap();

        builder.position_at_end(main, pos).unwrap();
        builder.build_call(putint, vec![loaded]).unwrap();
        let incremented = builder
            .build_binary(BinOp::Add, loaded, Constant::I32(1).into())
            .unwrap();
        builder.build_br(merge).unwrap();

        builder.position_at_end(main, merge).unwrap();
        let phi = builder
            .build_phi(IrType::I32, vec![(loaded, entry), (incremented, pos)])
            .unwrap();
        builder.build_ret(Some(phi)).unwrap();

        let module = builder.finish().unwrap();
        insta::assert_snapshot!(module.to_string(), @r###"
        ; ModuleID = 'test'

        declare void @putint(i32)

        define i32 @main(i32 %n) {
        entry:
          %x.addr = alloca i32
          store i32 %n, ptr %x.addr
          %0 = load i32, ptr %x.addr
          %1 = icmp sgt i32 %0, 0
          br i1 %1, label %pos, label %merge

        pos:
          call void @putint(i32 %0)
          %2 = add i32 %0, 1
          br label %merge

        merge:
          %3 = phi i32 [ %0, %entry ], [ %2, %pos ]
          ret i32 %3
        }
        "###);
    }

    #[test]
    fn shadowed_slots_get_distinct_names() {
        let mut builder = Builder::new("test");
        let f = builder.declare_function("f", IrType::Void, vec![]);
        let entry = builder.append_block(f, "entry").unwrap();
        builder.position_at_end(f, entry).unwrap();
        builder.build_alloca("x", IrType::I32).unwrap();
        builder.build_alloca("x", IrType::F32).unwrap();
        builder.build_ret(None).unwrap();

        insta::assert_snapshot!(builder.finish().unwrap().to_string(), @r###"
        ; ModuleID = 'test'

        define void @f() {
        entry:
          %x.addr = alloca i32
          %x.addr1 = alloca float
          ret void
        }
        "###);
    }
}
