use ccc::{CompileError, CompileOptions, Error, OptLevel};
use clap::Parser;
use console::style;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "ccc - compile a C-like program from its serialized AST")]
struct Args {
    /// JSON file holding the program's AST
    input: PathBuf,

    /// Optimization level
    #[arg(short = 'O', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=1))]
    opt_level: u8,

    /// Print the AST after optimization
    #[arg(short = 'a', long)]
    dump_ast: bool,

    /// Print the generated IR
    #[arg(short = 'i', long)]
    dump_ir: bool,

    /// Write the generated IR to this file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Run `main` and exit with its return value
    #[arg(long)]
    run: bool,

    /// Maximum level of log events written to stderr
    #[arg(long, default_value_t = tracing::Level::WARN)]
    trace_level: tracing::Level,
}

fn try_main(args: &Args) -> Result<u8, Error> {
    let json = fs::read_to_string(&args.input)?;
    let mut program = ccc::load_program(&json)?;

    let options = CompileOptions {
        opt_level: OptLevel::from_level(args.opt_level).unwrap_or_default(),
        dump_ast: args.dump_ast,
        dump_ir: args.dump_ir,
        module_name: args
            .input
            .file_stem()
            .map_or_else(|| "main".to_string(), |stem| stem.to_string_lossy().into_owned()),
    };
    let module = ccc::compile(&mut program, &options)?;

    match &args.output {
        Some(path) => fs::write(path, module.to_string())?,
        None if !args.run && !args.dump_ir => print!("{}", module),
        None => {}
    }

    if args.run {
        let result = ccc::run(&module)?;
        print!("{}", result.output);
        // Truncated the same way a process exit status is.
        return Ok(result.exit_code as u8);
    }
    Ok(0)
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(args.trace_level)
        .init();

    match try_main(&args) {
        Ok(code) => ExitCode::from(code),
        Err(Error::Compile(err @ CompileError::Semantic(_))) => {
            if let Some(diagnostic) = err.diagnostic() {
                eprint!("{}", diagnostic);
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{} {}", style("error").red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
