//! Incremental construction of a [`Module`].

use crate::verify::{verify_module, VerifyError};
use crate::{
    BasicBlock, BinOp, BlockId, CastOp, FloatPredicate, FuncId, Function, Inst, InstId, InstKind, IntPredicate,
    IrType, Module, Param, Slot, SlotId, Terminator, Value,
};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("no insertion point")]
    NoInsertionPoint,
    #[error("block `{0}` already has a terminator")]
    BlockTerminated(String),
    #[error("unknown function #{0}")]
    UnknownFunction(usize),
    #[error("unknown block #{0}")]
    UnknownBlock(usize),
    #[error("unknown stack slot #{0}")]
    UnknownSlot(usize),
}

type Result<T> = std::result::Result<T, BuildError>;

/// Builds a [`Module`] one instruction at a time, always appending to the end of the current block.
#[derive(Debug, Clone)]
pub struct Builder {
    module: Module,
    position: Option<(FuncId, BlockId)>,
}

impl Builder {
    pub fn new(module_name: &str) -> Self {
        Self {
            module: Module::new(module_name),
            position: None,
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Verifies the module and returns it.
    pub fn finish(self) -> std::result::Result<Module, VerifyError> {
        verify_module(&self.module)?;
        Ok(self.module)
    }

    /// Returns the function called `name`, declaring it first if it does not exist yet.
    /// An existing function keeps its original signature.
    pub fn declare_function(&mut self, name: &str, return_type: IrType, params: Vec<Param>) -> FuncId {
        if let Some(id) = self.module.get_function(name) {
            return id;
        }
        trace!(function = name, "declaring function");
        self.module.functions.push(Function::new(name, return_type, params));
        FuncId(self.module.functions.len() - 1)
    }

    pub fn get_function(&self, name: &str) -> Option<FuncId> {
        self.module.get_function(name)
    }

    pub fn function(&self, id: FuncId) -> Result<&Function> {
        self.module
            .function(id)
            .ok_or(BuildError::UnknownFunction(id.0))
    }

    fn function_mut(&mut self, id: FuncId) -> Result<&mut Function> {
        self.module
            .functions
            .get_mut(id.0)
            .ok_or(BuildError::UnknownFunction(id.0))
    }

    /// Renames parameter `index` of `func`.
    pub fn set_param_name(&mut self, func: FuncId, index: usize, name: &str) -> Result<()> {
        if let Some(param) = self.function_mut(func)?.params.get_mut(index) {
            param.name = name.to_string();
        }
        Ok(())
    }

    /// Appends an empty block to `func`. The label is made unique within the function by adding a
    /// numeric suffix if needed.
    pub fn append_block(&mut self, func: FuncId, label: &str) -> Result<BlockId> {
        let function = self.function_mut(func)?;
        let is_taken = |candidate: &str| function.blocks.iter().any(|block| block.label == candidate);

        let mut unique = label.to_string();
        let mut suffix = 1;
        while is_taken(&unique) {
            unique = format!("{}{}", label, suffix);
            suffix += 1;
        }

        function.blocks.push(BasicBlock {
            label: unique,
            insts: Vec::new(),
            terminator: None,
        });
        Ok(BlockId(function.blocks.len() - 1))
    }

    /// Moves the insertion point to the end of `block`.
    pub fn position_at_end(&mut self, func: FuncId, block: BlockId) -> Result<()> {
        if self.function(func)?.block(block).is_none() {
            return Err(BuildError::UnknownBlock(block.0));
        }
        self.position = Some((func, block));
        Ok(())
    }

    pub fn current_function(&self) -> Option<FuncId> {
        self.position.map(|(func, _)| func)
    }

    pub fn current_block(&self) -> Option<BlockId> {
        self.position.map(|(_, block)| block)
    }

    /// Returns `true` if the current block already ends in a terminator.
    pub fn is_terminated(&self) -> bool {
        self.position
            .and_then(|(func, block)| self.module.function(func)?.block(block))
            .map_or(false, |block| block.terminator.is_some())
    }

    /// Type of `value` in the current function.
    pub fn value_type(&self, value: &Value) -> IrType {
        match value {
            Value::Const(constant) => constant.ty(),
            _ => self
                .current_function()
                .and_then(|func| self.module.function(func))
                .map_or(IrType::Void, |function| function.value_type(value)),
        }
    }

    fn current(&mut self) -> Result<(&mut Function, BlockId)> {
        let (func, block) = self.position.ok_or(BuildError::NoInsertionPoint)?;
        Ok((self.function_mut(func)?, block))
    }

    fn current_block_mut(&mut self) -> Result<&mut BasicBlock> {
        let (function, block) = self.current()?;
        let block = function
            .blocks
            .get_mut(block.0)
            .ok_or(BuildError::UnknownBlock(block.0))?;
        if block.terminator.is_some() {
            return Err(BuildError::BlockTerminated(block.label.clone()));
        }
        Ok(block)
    }

    fn push_inst(&mut self, kind: InstKind, ty: IrType) -> Result<Value> {
        // Checks the block before touching the arena.
        self.current_block_mut()?;
        let (function, block) = self.current()?;
        let id = InstId(function.insts.len());
        function.insts.push(Inst { kind, ty });
        function.blocks[block.0].insts.push(id);
        Ok(Value::Inst(id))
    }

    fn set_terminator(&mut self, terminator: Terminator) -> Result<()> {
        self.current_block_mut()?.terminator = Some(terminator);
        Ok(())
    }

    fn slot_type(&mut self, slot: SlotId) -> Result<IrType> {
        let (function, _) = self.current()?;
        function
            .slots
            .get(slot.0)
            .map(|slot| slot.ty)
            .ok_or(BuildError::UnknownSlot(slot.0))
    }

    /// Allocates a stack slot in the current function. Slots always live in the entry block.
    pub fn build_alloca(&mut self, name: &str, ty: IrType) -> Result<SlotId> {
        let (function, _) = self.current()?;
        function.slots.push(Slot {
            name: name.to_string(),
            ty,
        });
        Ok(SlotId(function.slots.len() - 1))
    }

    pub fn build_load(&mut self, slot: SlotId) -> Result<Value> {
        let ty = self.slot_type(slot)?;
        self.push_inst(InstKind::Load(slot), ty)
    }

    pub fn build_store(&mut self, slot: SlotId, value: Value) -> Result<()> {
        self.slot_type(slot)?;
        self.push_inst(InstKind::Store { slot, value }, IrType::Void)?;
        Ok(())
    }

    /// The result has the type of `lhs`.
    pub fn build_binary(&mut self, op: BinOp, lhs: Value, rhs: Value) -> Result<Value> {
        let ty = self.value_type(&lhs);
        self.push_inst(InstKind::Binary { op, lhs, rhs }, ty)
    }

    pub fn build_fneg(&mut self, value: Value) -> Result<Value> {
        let ty = self.value_type(&value);
        self.push_inst(InstKind::FNeg(value), ty)
    }

    pub fn build_icmp(&mut self, pred: IntPredicate, lhs: Value, rhs: Value) -> Result<Value> {
        self.push_inst(InstKind::ICmp { pred, lhs, rhs }, IrType::I1)
    }

    pub fn build_fcmp(&mut self, pred: FloatPredicate, lhs: Value, rhs: Value) -> Result<Value> {
        self.push_inst(InstKind::FCmp { pred, lhs, rhs }, IrType::I1)
    }

    pub fn build_cast(&mut self, op: CastOp, value: Value, ty: IrType) -> Result<Value> {
        self.push_inst(InstKind::Cast { op, value }, ty)
    }

    /// Calls `callee`. The result of a `void` function is a `void` value that must not be used.
    pub fn build_call(&mut self, callee: FuncId, args: Vec<Value>) -> Result<Value> {
        let ty = self.function(callee)?.return_type;
        self.push_inst(InstKind::Call { callee, args }, ty)
    }

    pub fn build_phi(&mut self, ty: IrType, incoming: Vec<(Value, BlockId)>) -> Result<Value> {
        self.push_inst(InstKind::Phi { incoming }, ty)
    }

    pub fn build_ret(&mut self, value: Option<Value>) -> Result<()> {
        self.set_terminator(Terminator::Ret(value))
    }

    pub fn build_br(&mut self, target: BlockId) -> Result<()> {
        self.set_terminator(Terminator::Br(target))
    }

    pub fn build_cond_br(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) -> Result<()> {
        self.set_terminator(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        })
    }

    pub fn build_unreachable(&mut self) -> Result<()> {
        self.set_terminator(Terminator::Unreachable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Constant;

    #[test]
    fn declare_is_idempotent() {
        let mut builder = Builder::new("test");
        let first = builder.declare_function("f", IrType::I32, vec![]);
        let second = builder.declare_function("f", IrType::Void, vec![]);
        assert_eq!(first, second);
        assert_eq!(builder.module().functions.len(), 1);
        assert_eq!(builder.function(first).unwrap().return_type, IrType::I32);
    }

    #[test]
    fn block_labels_are_unique() {
        let mut builder = Builder::new("test");
        let f = builder.declare_function("f", IrType::Void, vec![]);
        let a = builder.append_block(f, "while.cond").unwrap();
        let b = builder.append_block(f, "while.cond").unwrap();
        let c = builder.append_block(f, "while.cond").unwrap();
        let function = builder.function(f).unwrap();
        assert_eq!(function.block(a).unwrap().label, "while.cond");
        assert_eq!(function.block(b).unwrap().label, "while.cond1");
        assert_eq!(function.block(c).unwrap().label, "while.cond2");
    }

    #[test]
    fn nothing_after_terminator() {
        let mut builder = Builder::new("test");
        assert_eq!(
            builder.build_ret(None),
            Err(BuildError::NoInsertionPoint)
        );

        let f = builder.declare_function("f", IrType::I32, vec![]);
        let entry = builder.append_block(f, "entry").unwrap();
        builder.position_at_end(f, entry).unwrap();
        assert!(!builder.is_terminated());
        builder.build_ret(Some(Constant::I32(0).into())).unwrap();
        assert!(builder.is_terminated());

        let err = builder
            .build_binary(BinOp::Add, Constant::I32(1).into(), Constant::I32(2).into())
            .unwrap_err();
        assert_eq!(err, BuildError::BlockTerminated("entry".to_string()));
        assert!(builder.build_unreachable().is_err());
    }

    #[test]
    fn result_types() {
        let mut builder = Builder::new("test");
        let f = builder.declare_function("f", IrType::F32, vec![]);
        let entry = builder.append_block(f, "entry").unwrap();
        builder.position_at_end(f, entry).unwrap();

        let slot = builder.build_alloca("x", IrType::F32).unwrap();
        let x = builder.build_load(slot).unwrap();
        assert_eq!(builder.value_type(&x), IrType::F32);
        let cmp = builder
            .build_fcmp(FloatPredicate::Olt, x, Constant::F32(1.0).into())
            .unwrap();
        assert_eq!(builder.value_type(&cmp), IrType::I1);
        let int = builder.build_cast(CastOp::FpToSi, x, IrType::I32).unwrap();
        assert_eq!(builder.value_type(&int), IrType::I32);
        assert_eq!(
            builder.build_load(SlotId(7)),
            Err(BuildError::UnknownSlot(7))
        );
    }
}
