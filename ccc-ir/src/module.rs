//! Module, function and instruction definitions.

use crate::{BlockId, FuncId, InstId, IrType, SlotId, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    SDiv,
    SRem,
    And,
    Or,
    Xor,
    FAdd,
    FSub,
    FMul,
    FDiv,
    FRem,
}

impl BinOp {
    pub fn is_float(self) -> bool {
        matches!(
            self,
            BinOp::FAdd | BinOp::FSub | BinOp::FMul | BinOp::FDiv | BinOp::FRem
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::SDiv => "sdiv",
            BinOp::SRem => "srem",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
            BinOp::FAdd => "fadd",
            BinOp::FSub => "fsub",
            BinOp::FMul => "fmul",
            BinOp::FDiv => "fdiv",
            BinOp::FRem => "frem",
        }
    }
}

/// Signed integer comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntPredicate {
    Eq,
    Ne,
    Slt,
    Sgt,
    Sle,
    Sge,
}

impl IntPredicate {
    pub fn name(self) -> &'static str {
        match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Slt => "slt",
            IntPredicate::Sgt => "sgt",
            IntPredicate::Sle => "sle",
            IntPredicate::Sge => "sge",
        }
    }
}

/// Ordered floating point comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatPredicate {
    Oeq,
    One,
    Olt,
    Ogt,
    Ole,
    Oge,
}

impl FloatPredicate {
    pub fn name(self) -> &'static str {
        match self {
            FloatPredicate::Oeq => "oeq",
            FloatPredicate::One => "one",
            FloatPredicate::Olt => "olt",
            FloatPredicate::Ogt => "ogt",
            FloatPredicate::Ole => "ole",
            FloatPredicate::Oge => "oge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastOp {
    FpToSi,
    SiToFp,
}

impl CastOp {
    pub fn name(self) -> &'static str {
        match self {
            CastOp::FpToSi => "fptosi",
            CastOp::SiToFp => "sitofp",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    Load(SlotId),
    Store { slot: SlotId, value: Value },
    Binary { op: BinOp, lhs: Value, rhs: Value },
    FNeg(Value),
    ICmp { pred: IntPredicate, lhs: Value, rhs: Value },
    FCmp { pred: FloatPredicate, lhs: Value, rhs: Value },
    /// Converts `value` to the type of the instruction.
    Cast { op: CastOp, value: Value },
    Call { callee: FuncId, args: Vec<Value> },
    /// Selects the value of the edge control arrived from.
    Phi { incoming: Vec<(Value, BlockId)> },
}

/// An instruction together with the type of its result (`void` if it has none).
#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub kind: InstKind,
    pub ty: IrType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Ret(Option<Value>),
    Br(BlockId),
    CondBr {
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    },
    Unreachable,
}

impl Terminator {
    /// Blocks control may continue to.
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Br(target) => vec![*target],
            Terminator::CondBr {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            Terminator::Ret(_) | Terminator::Unreachable => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub label: String,
    pub insts: Vec<InstId>,
    /// `None` only while the block is being built.
    pub terminator: Option<Terminator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: IrType,
}

/// A named, typed stack slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub ty: IrType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub return_type: IrType,
    pub params: Vec<Param>,
    pub slots: Vec<Slot>,
    /// Instruction arena. Blocks refer to instructions by [`InstId`].
    pub insts: Vec<Inst>,
    /// The first block is the entry block. Empty for a declaration.
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn new(name: &str, return_type: IrType, params: Vec<Param>) -> Self {
        Self {
            name: name.to_string(),
            return_type,
            params,
            slots: Vec::new(),
            insts: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Returns `true` if the function has no body.
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.0)
    }

    pub fn inst(&self, id: InstId) -> Option<&Inst> {
        self.insts.get(id.0)
    }

    /// Type of `value` within this function. Unknown values are `void`.
    pub fn value_type(&self, value: &Value) -> IrType {
        match value {
            Value::Const(constant) => constant.ty(),
            Value::Inst(id) => self.inst(*id).map_or(IrType::Void, |inst| inst.ty),
            Value::Arg(index) => self.params.get(*index).map_or(IrType::Void, |param| param.ty),
        }
    }

    /// Blocks that branch to `target`.
    pub fn predecessors(&self, target: BlockId) -> Vec<BlockId> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| {
                block
                    .terminator
                    .as_ref()
                    .map_or(false, |term| term.successors().contains(&target))
            })
            .map(|(index, _)| BlockId(index))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            functions: Vec::new(),
        }
    }

    pub fn function(&self, id: FuncId) -> Option<&Function> {
        self.functions.get(id.0)
    }

    pub fn get_function(&self, name: &str) -> Option<FuncId> {
        self.functions
            .iter()
            .position(|function| function.name == name)
            .map(FuncId)
    }
}
