use std::io;
use std::num::ParseIntError;
use std::process::ExitStatus;

use snafu::Snafu;

use crate::lexer::{Position, TokenKind};

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
    #[snafu(display("unmatched [ at {pos}"))]
    UnmatchedLoopOpen { pos: Position },

    #[snafu(display("encountered unmatched ] at {pos}"))]
    UnmatchedLoopClose { pos: Position },

    #[snafu(display("encountered invalid number {literal} at {pos}"))]
    InvalidNumber {
        literal: String,
        pos: Position,
        source: ParseIntError,
    },

    #[snafu(display("loops nested deeper than {limit} at {pos}"))]
    NestingTooDeep { pos: Position, limit: usize },

    #[snafu(display("encountered unhandled token {kind} at {pos}"))]
    UnhandledToken { kind: TokenKind, pos: Position },

    #[snafu(display("error while compiling loop body: {source}"))]
    LoopBody {
        #[snafu(source(from(CompileError, Box::new)))]
        source: Box<CompileError>,
    },

    #[snafu(display("failed to write assembly: {source}"))]
    Write { source: io::Error },

    #[snafu(display("failed to run {tool}: {source}"))]
    Spawn { tool: String, source: io::Error },

    #[snafu(display("{tool} exited with {status}"))]
    ToolFailed { tool: String, status: ExitStatus },
}
