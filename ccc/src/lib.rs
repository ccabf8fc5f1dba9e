//! The compilation pipeline: semantic analysis, optimization, code generation and execution.

use ccc_ast::ast::Program;
use ccc_ir::Module;
use ccc_passes::optimize::optimize;
use ccc_passes::sema::{analyze, SemanticError};
use ccc_source::Diagnostic;
use ccc_vm::codegen::{codegen, CodegenError};
use ccc_vm::vm::{RuntimeError, Vm};
use thiserror::Error;
use tracing::{info, info_span};

pub use ccc_vm::builtins;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptLevel {
    /// No AST optimization.
    O0,
    /// Constant folding and dead branch removal.
    #[default]
    O1,
}

impl OptLevel {
    /// `0` or `1`.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(OptLevel::O0),
            1 => Some(OptLevel::O1),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub opt_level: OptLevel,
    /// Print the AST to stderr after optimization.
    pub dump_ast: bool,
    /// Print the generated IR to stderr.
    pub dump_ir: bool,
    pub module_name: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            opt_level: OptLevel::default(),
            dump_ast: false,
            dump_ir: false,
            module_name: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    /// The user facing diagnostic, for errors caused by the program being compiled.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            CompileError::Semantic(err) => Some(err.diagnostic()),
            CompileError::Codegen(_) => None,
        }
    }
}

/// Any failure between reading an input file and running it.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("invalid AST: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Deserializes a program from the JSON produced by a front end.
pub fn load_program(json: &str) -> Result<Program, serde_json::Error> {
    serde_json::from_str(json)
}

/// Checks, optimizes and lowers `program`. The AST is annotated and rewritten in place.
pub fn compile(program: &mut Program, options: &CompileOptions) -> Result<Module, CompileError> {
    {
        let _span = info_span!("sema").entered();
        analyze(program)?;
    }

    if options.opt_level >= OptLevel::O1 {
        let _span = info_span!("optimize").entered();
        let stats = optimize(program);
        info!(sweeps = stats.sweeps, rewrites = stats.rewrites, "optimized");
    }

    if options.dump_ast {
        eprintln!("{}", program);
    }

    let module = {
        let _span = info_span!("codegen").entered();
        codegen(program, &options.module_name)?
    };

    if options.dump_ir {
        eprintln!("{}", module);
    }
    Ok(module)
}

/// Result of running `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub exit_code: i32,
    /// Everything the program printed through builtins.
    pub output: String,
}

/// Runs `int main()` of `module`.
pub fn run(module: &Module) -> Result<RunOutput, RuntimeError> {
    let _span = info_span!("run").entered();
    let mut vm = Vm::new(module);
    let exit_code = vm.run_main()?;
    Ok(RunOutput {
        exit_code,
        output: vm.take_output(),
    })
}

/// Compiles and runs `program`.
pub fn interpret(program: &mut Program, options: &CompileOptions) -> Result<RunOutput, Error> {
    let module = compile(program, options)?;
    Ok(run(&module)?)
}
