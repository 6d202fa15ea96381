//! Compiles brainfuck source into NASM assembly for x86-64 Linux.
//!
//! The pipeline runs strictly forward: [`lexer`] produces tokens on demand,
//! [`parser`] builds the [`ast`] while folding runs of `><+-`, and
//! [`x86_emitter`] renders the tree with a fixed preamble and epilogue.
//! [`toolchain`] hands the result to an external assembler and linker, and
//! [`eval`] interprets a tree with the same semantics as the emitted program.

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod toolchain;
pub mod x86_emitter;

#[cfg(test)]
mod test;

use std::io::Write;

pub use error::{CompileError, CompileResult};

/// Compiles `source` and writes the assembly into `sink`.
///
/// Nothing is written unless parsing succeeds.
pub fn compile_to<W: Write>(source: &str, sink: &mut W) -> CompileResult<()> {
    let prog = parser::Parser::parse(source)?;
    x86_emitter::X86Emitter::emit(&prog, sink)
}

pub fn compile(source: &str) -> CompileResult<String> {
    let mut out = Vec::new();
    compile_to(source, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
