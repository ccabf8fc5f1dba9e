//! Structural checks run on a finished module.

use crate::{BlockId, Function, InstKind, IrType, Module, Terminator};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("block `{block}` in `@{function}` has no terminator")]
    MissingTerminator { function: String, block: String },
    #[error("`@{function}` refers to block #{block} which does not exist")]
    UnknownBlock { function: String, block: usize },
    #[error("`@{function}` returns `{got}` but is declared to return `{expected}`")]
    ReturnType {
        function: String,
        expected: IrType,
        got: IrType,
    },
    #[error("`@{function}` calls function #{callee} which does not exist")]
    UnknownCallee { function: String, callee: usize },
    #[error("call to `@{callee}` in `@{function}` passes {got} argument(s), expected {expected}")]
    CallArity {
        function: String,
        callee: String,
        expected: usize,
        got: usize,
    },
    #[error("phi in block `{block}` of `@{function}` has an incoming value from `{from}`, which is not a predecessor")]
    PhiPredecessor {
        function: String,
        block: String,
        from: String,
    },
}

/// Verifies every defined function of `module`.
pub fn verify_module(module: &Module) -> Result<(), VerifyError> {
    for function in module.functions.iter().filter(|f| !f.is_declaration()) {
        verify_function(module, function)?;
    }
    Ok(())
}

fn label(function: &Function, block: BlockId) -> String {
    function
        .block(block)
        .map_or_else(|| format!("#{}", block.0), |block| block.label.clone())
}

fn verify_function(module: &Module, function: &Function) -> Result<(), VerifyError> {
    let unknown_block = |block: BlockId| VerifyError::UnknownBlock {
        function: function.name.clone(),
        block: block.0,
    };

    for (index, block) in function.blocks.iter().enumerate() {
        let terminator = block
            .terminator
            .as_ref()
            .ok_or_else(|| VerifyError::MissingTerminator {
                function: function.name.clone(),
                block: block.label.clone(),
            })?;

        for target in terminator.successors() {
            function.block(target).ok_or_else(|| unknown_block(target))?;
        }

        if let Terminator::Ret(value) = terminator {
            let got = value
                .as_ref()
                .map_or(IrType::Void, |value| function.value_type(value));
            if got != function.return_type {
                return Err(VerifyError::ReturnType {
                    function: function.name.clone(),
                    expected: function.return_type,
                    got,
                });
            }
        }

        for inst in block.insts.iter().filter_map(|id| function.inst(*id)) {
            match &inst.kind {
                InstKind::Call { callee, args } => {
                    let callee = module.function(*callee).ok_or(VerifyError::UnknownCallee {
                        function: function.name.clone(),
                        callee: callee.0,
                    })?;
                    if callee.params.len() != args.len() {
                        return Err(VerifyError::CallArity {
                            function: function.name.clone(),
                            callee: callee.name.clone(),
                            expected: callee.params.len(),
                            got: args.len(),
                        });
                    }
                }
                InstKind::Phi { incoming } => {
                    let predecessors = function.predecessors(BlockId(index));
                    for (_, from) in incoming {
                        function.block(*from).ok_or_else(|| unknown_block(*from))?;
                        if !predecessors.contains(from) {
                            return Err(VerifyError::PhiPredecessor {
                                function: function.name.clone(),
                                block: block.label.clone(),
                                from: label(function, *from),
                            });
                        }
                    }
                }
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Builder, Constant, Param};

    #[test]
    fn missing_terminator() {
        let mut builder = Builder::new("test");
        let f = builder.declare_function("f", IrType::Void, vec![]);
        builder.append_block(f, "entry").unwrap();
        assert_eq!(
            builder.finish(),
            Err(VerifyError::MissingTerminator {
                function: "f".to_string(),
                block: "entry".to_string()
            })
        );
    }

    #[test]
    fn return_type() {
        let mut builder = Builder::new("test");
        let f = builder.declare_function("f", IrType::I32, vec![]);
        let entry = builder.append_block(f, "entry").unwrap();
        builder.position_at_end(f, entry).unwrap();
        builder.build_ret(Some(Constant::F32(1.0).into())).unwrap();
        assert!(matches!(
            builder.finish(),
            Err(VerifyError::ReturnType {
                expected: IrType::I32,
                got: IrType::F32,
                ..
            })
        ));
    }

    #[test]
    fn call_arity() {
        let mut builder = Builder::new("test");
        let g = builder.declare_function(
            "g",
            IrType::Void,
            vec![Param {
                name: "x".to_string(),
                ty: IrType::I32,
            }],
        );
        let f = builder.declare_function("f", IrType::Void, vec![]);
        let entry = builder.append_block(f, "entry").unwrap();
        builder.position_at_end(f, entry).unwrap();
        builder.build_call(g, vec![]).unwrap();
        builder.build_ret(None).unwrap();
        assert!(matches!(
            builder.finish(),
            Err(VerifyError::CallArity {
                expected: 1,
                got: 0,
                ..
            })
        ));
    }

    #[test]
    fn phi_needs_predecessors() {
        let mut builder = Builder::new("test");
        let f = builder.declare_function("f", IrType::I32, vec![]);
        let entry = builder.append_block(f, "entry").unwrap();
        let other = builder.append_block(f, "other").unwrap();
        let merge = builder.append_block(f, "merge").unwrap();

        builder.position_at_end(f, entry).unwrap();
        builder.build_br(merge).unwrap();
        builder.position_at_end(f, other).unwrap();
        builder.build_unreachable().unwrap();
        builder.position_at_end(f, merge).unwrap();
        let phi = builder
            .build_phi(
                IrType::I32,
                vec![(Constant::I32(1).into(), entry), (Constant::I32(2).into(), other)],
            )
            .unwrap();
        builder.build_ret(Some(phi)).unwrap();

        assert_eq!(
            builder.finish(),
            Err(VerifyError::PhiPredecessor {
                function: "f".to_string(),
                block: "merge".to_string(),
                from: "other".to_string(),
            })
        );
    }
}
