use snafu::{ensure, ResultExt};
use tracing::debug;

use crate::ast::{ASTProgram, AST};
use crate::error::{
    CompileResult, InvalidNumberSnafu, NestingTooDeepSnafu, UnhandledTokenSnafu,
    UnmatchedLoopCloseSnafu, UnmatchedLoopOpenSnafu,
};
use crate::lexer::{Lexer, TokenKind};

/// Deepest loop nesting accepted. Parsing, emission and evaluation all recurse
/// once per level.
pub const MAX_LOOP_DEPTH: usize = 512;

/// The kind of block enclosing a nested parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Loop,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self { lexer, depth: 0 }
    }

    pub fn parse(code: &str) -> CompileResult<ASTProgram> {
        let mut p = Parser::new(Lexer::new(code));
        let (prog, _) = p.parse_block(None)?;
        Ok(prog)
    }

    /// Parses tokens until end of input or, inside a loop body, until the
    /// closing bracket. Also returns the token that ended the block:
    /// `Some(LoopClose)` for a closed loop body, `None` at end of input.
    pub fn parse_block(
        &mut self,
        enclosing: Option<Block>,
    ) -> CompileResult<(ASTProgram, Option<TokenKind>)> {
        let mut ret: Vec<AST> = Vec::new();
        loop {
            let token = self.lexer.lex();
            if token.kind == TokenKind::Eof {
                break;
            }
            debug!(
                token = %token.kind,
                symbol = %token.literal.escape_debug(),
                position = %token.pos,
                "lexed token"
            );

            if fold_repeat(ret.last_mut(), token.kind) {
                continue;
            }

            match token.kind {
                TokenKind::LoopOpen => {
                    ensure!(
                        self.depth < MAX_LOOP_DEPTH,
                        NestingTooDeepSnafu {
                            pos: token.pos,
                            limit: MAX_LOOP_DEPTH,
                        }
                    );
                    self.depth += 1;
                    let (body, terminator) = self.parse_block(Some(Block::Loop))?;
                    self.depth -= 1;
                    if terminator != Some(TokenKind::LoopClose) {
                        return UnmatchedLoopOpenSnafu { pos: token.pos }.fail();
                    }
                    ret.push(AST::While(body));
                }
                TokenKind::LoopClose => {
                    if enclosing != Some(Block::Loop) {
                        return UnmatchedLoopCloseSnafu { pos: token.pos }.fail();
                    }
                    return Ok((ASTProgram(ret), Some(TokenKind::LoopClose)));
                }
                TokenKind::Number => {
                    let value = token.literal.parse::<i64>().context(InvalidNumberSnafu {
                        literal: &token.literal,
                        pos: token.pos,
                    })?;
                    ret.push(AST::IntegerLiteral { value, repeat: 0 });
                }
                TokenKind::NextCell => ret.push(AST::NextCell { repeat: 0 }),
                TokenKind::PreviousCell => ret.push(AST::PreviousCell { repeat: 0 }),
                TokenKind::IncrementCell => ret.push(AST::IncrementCell { repeat: 0 }),
                TokenKind::DecrementCell => ret.push(AST::DecrementCell { repeat: 0 }),
                TokenKind::OutputCell => ret.push(AST::OutputCell { repeat: 0 }),
                TokenKind::InputCell => ret.push(AST::InputCell { repeat: 0 }),
                TokenKind::Eof => {
                    return UnhandledTokenSnafu {
                        kind: token.kind,
                        pos: token.pos,
                    }
                    .fail()
                }
            }
        }
        Ok((ASTProgram(ret), None))
    }
}

/// Bumps the repeat count of `last` when `kind` is the same pointer or cell
/// arithmetic operation. Output and input are never folded.
fn fold_repeat(last: Option<&mut AST>, kind: TokenKind) -> bool {
    let repeat = match (last, kind) {
        (Some(AST::NextCell { repeat }), TokenKind::NextCell)
        | (Some(AST::PreviousCell { repeat }), TokenKind::PreviousCell)
        | (Some(AST::IncrementCell { repeat }), TokenKind::IncrementCell)
        | (Some(AST::DecrementCell { repeat }), TokenKind::DecrementCell) => repeat,
        _ => return false,
    };
    *repeat += 1;
    true
}

#[cfg(test)]
use crate::{error::CompileError, lexer::Position};

macro_rules! make_test {
    ($test_name:ident, $code:expr, $ast:expr) => {
        #[cfg(test)]
        mod $test_name {
            use super::*;
            #[test]
            fn test_eq() {
                assert_eq!(Parser::parse($code).unwrap(), ASTProgram($ast))
            }
        }
    };
}

macro_rules! make_error_test {
    ($test_name:ident, $code:expr, $err:pat) => {
        #[cfg(test)]
        mod $test_name {
            use super::*;
            #[test]
            fn test_err() {
                let res = Parser::parse($code);
                assert!(matches!(res, Err($err)), "got {:?}", res);
            }
        }
    };
}

make_test!(empty, "", vec![]);
make_test!(
    simple,
    "+-><.,",
    vec![
        AST::IncrementCell { repeat: 0 },
        AST::DecrementCell { repeat: 0 },
        AST::NextCell { repeat: 0 },
        AST::PreviousCell { repeat: 0 },
        AST::OutputCell { repeat: 0 },
        AST::InputCell { repeat: 0 }
    ]
);
make_test!(
    folding,
    "+++>>--<",
    vec![
        AST::IncrementCell { repeat: 2 },
        AST::NextCell { repeat: 1 },
        AST::DecrementCell { repeat: 1 },
        AST::PreviousCell { repeat: 0 }
    ]
);
make_test!(
    io_is_not_folded,
    "..,,",
    vec![
        AST::OutputCell { repeat: 0 },
        AST::OutputCell { repeat: 0 },
        AST::InputCell { repeat: 0 },
        AST::InputCell { repeat: 0 }
    ]
);
make_test!(
    folding_ignores_comments,
    "+ # more\n +",
    vec![AST::IncrementCell { repeat: 1 }]
);
make_test!(
    simple_loop,
    "+++[>+<-]",
    vec![
        AST::IncrementCell { repeat: 2 },
        AST::While(ASTProgram(vec![
            AST::NextCell { repeat: 0 },
            AST::IncrementCell { repeat: 0 },
            AST::PreviousCell { repeat: 0 },
            AST::DecrementCell { repeat: 0 }
        ]))
    ]
);
make_test!(
    folding_stops_at_loops,
    "+[+]+",
    vec![
        AST::IncrementCell { repeat: 0 },
        AST::While(ASTProgram(vec![AST::IncrementCell { repeat: 0 }])),
        AST::IncrementCell { repeat: 0 }
    ]
);
make_test!(
    nested_loops,
    "[[-]>]",
    vec![AST::While(ASTProgram(vec![
        AST::While(ASTProgram(vec![AST::DecrementCell { repeat: 0 }])),
        AST::NextCell { repeat: 0 }
    ]))]
);
make_test!(
    integer_literals,
    "12+ 3",
    vec![
        AST::IntegerLiteral {
            value: 12,
            repeat: 0
        },
        AST::IncrementCell { repeat: 0 },
        AST::IntegerLiteral {
            value: 3,
            repeat: 0
        }
    ]
);
make_test!(comment_word, "move>", vec![]);

make_error_test!(
    malformed_loop,
    "[+",
    CompileError::UnmatchedLoopOpen {
        pos: Position { line: 1, column: 1 }
    }
);
make_error_test!(
    complex_malformed_loop,
    "[[[[[[[[]]]]]]]",
    CompileError::UnmatchedLoopOpen {
        pos: Position { line: 1, column: 1 }
    }
);
make_error_test!(
    inner_malformed_loop,
    "[]\n[[]",
    CompileError::UnmatchedLoopOpen {
        pos: Position { line: 2, column: 1 }
    }
);
make_error_test!(
    unexpected_loop_close,
    "+]",
    CompileError::UnmatchedLoopClose {
        pos: Position { line: 1, column: 2 }
    }
);
make_error_test!(
    unexpected_loop_close_after_loop,
    "[]\n ][",
    CompileError::UnmatchedLoopClose {
        pos: Position { line: 2, column: 2 }
    }
);
make_error_test!(
    non_ascii_digit,
    "\u{0663}+",
    CompileError::InvalidNumber {
        pos: Position { line: 1, column: 1 },
        ..
    }
);
make_error_test!(
    number_overflow,
    "[ 99999999999999999999 ]",
    CompileError::InvalidNumber { .. }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_open_message() {
        let err = Parser::parse("\n  [+").unwrap_err();
        assert_eq!(err.to_string(), "unmatched [ at 2:3");
    }

    #[test]
    fn non_ascii_digit_message() {
        let err = Parser::parse("+\n \u{0663}").unwrap_err();
        assert_eq!(err.to_string(), "encountered invalid number \u{0663} at 2:2");
    }

    #[test]
    fn nesting_at_limit_is_accepted() {
        let code = "[".repeat(MAX_LOOP_DEPTH) + &"]".repeat(MAX_LOOP_DEPTH);
        let prog = Parser::parse(&code).unwrap();
        let mut block = &prog;
        let mut depth = 0;
        while let [AST::While(body)] = block.0.as_slice() {
            block = body;
            depth += 1;
        }
        assert_eq!(depth, MAX_LOOP_DEPTH);
    }

    #[test]
    fn very_deep_nesting_is_an_error() {
        let code = "[".repeat(20_000) + &"]".repeat(20_000);
        match Parser::parse(&code) {
            Err(CompileError::NestingTooDeep { pos, limit }) => {
                assert_eq!(pos, Position { line: 1, column: MAX_LOOP_DEPTH + 1 });
                assert_eq!(limit, MAX_LOOP_DEPTH);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn reparse_is_identical() {
        let code = "++[>+++[->++<]<-]>>.,# trailing\n";
        assert_eq!(Parser::parse(code).unwrap(), Parser::parse(code).unwrap());
    }

    #[test]
    fn long_runs_fold_into_one_node() {
        for n in 1..64 {
            let code = ">".repeat(n) + "<";
            let prog = Parser::parse(&code).unwrap();
            assert_eq!(
                prog.0,
                vec![
                    AST::NextCell { repeat: n - 1 },
                    AST::PreviousCell { repeat: 0 }
                ]
            );
        }
    }
}
