use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use bfcplus::{eval, parser, toolchain};
use clap::Parser;
use tracing::{info, Level};

#[derive(clap::Parser)]
struct Args {
    /// Print every token the parser reads
    #[arg(long)]
    debug: bool,
    /// Interpret the program instead of building it
    #[arg(long)]
    eval: bool,
    /// Stop after writing NAME.asm
    #[arg(long)]
    emit_asm: bool,
    /// Base name of the .asm, .o and executable outputs
    #[arg(short = 'o', long, default_value = "output")]
    name: String,
    #[arg(long, default_value = "nasm")]
    assembler: String,
    #[arg(long, default_value = "ld")]
    linker: String,

    path: PathBuf,
}

fn run(args: &Args) -> Result<()> {
    if args.path.extension().and_then(|e| e.to_str()) != Some("bf") {
        bail!("invalid file extension. Must enter .bf file");
    }
    let code = fs::read_to_string(&args.path)
        .with_context(|| format!("error while trying to read {}", args.path.display()))?;

    if args.eval {
        let prog = parser::Parser::parse(&code).context("error while trying to parse source")?;
        eval::eval(&prog);
        return Ok(());
    }

    // Compile fully before touching the output file.
    let asm = bfcplus::compile(&code).context("error while trying to compile source")?;

    let asm_path = PathBuf::from(format!("{}.asm", args.name));
    info!(path = %asm_path.display(), "writing assembly");
    fs::write(&asm_path, asm)
        .with_context(|| format!("error while trying to write {}", asm_path.display()))?;
    if args.emit_asm {
        return Ok(());
    }

    let tc = toolchain::Nasm {
        assembler: args.assembler.clone(),
        linker: args.linker.clone(),
    };
    toolchain::build(&tc, &asm_path, Path::new(&args.name))
        .context("failed to build the executable")?;
    info!(output = %args.name, "done");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&args) {
        eprintln!("Error: {:?}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
