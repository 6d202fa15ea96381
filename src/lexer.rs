use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Starts a comment that runs to the end of the line.
pub const COMMENT: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Number,
    NextCell,
    PreviousCell,
    IncrementCell,
    DecrementCell,
    OutputCell,
    InputCell,
    LoopOpen,
    LoopClose,
}

impl TokenKind {
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::NextCell),
            '<' => Some(Self::PreviousCell),
            '+' => Some(Self::IncrementCell),
            '-' => Some(Self::DecrementCell),
            '.' => Some(Self::OutputCell),
            ',' => Some(Self::InputCell),
            '[' => Some(Self::LoopOpen),
            ']' => Some(Self::LoopClose),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Eof => "EOF",
            Self::Number => "NUMBER",
            Self::NextCell => ">",
            Self::PreviousCell => "<",
            Self::IncrementCell => "+",
            Self::DecrementCell => "-",
            Self::OutputCell => ".",
            Self::InputCell => ",",
            Self::LoopOpen => "[",
            Self::LoopClose => "]",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 1-based line and column of a character in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub pos: Position,
    pub kind: TokenKind,
    pub literal: String,
}

/// Produces one token per call to [`Lexer::lex`].
///
/// Once the input is exhausted every further call returns an `Eof` token whose
/// literal is `"\n"`.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            pos: Position { line: 1, column: 0 },
        }
    }

    fn advance(&mut self, c: char) -> char {
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 0;
        } else {
            self.pos.column += 1;
        }
        c
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        Some(self.advance(c))
    }

    fn bump_if(&mut self, pred: impl FnOnce(&char) -> bool) -> Option<char> {
        let c = self.chars.next_if(pred)?;
        Some(self.advance(c))
    }

    pub fn lex(&mut self) -> Token {
        while let Some(c) = self.bump() {
            if c == '\n' {
                continue;
            }
            if c == COMMENT {
                self.skip_comment();
                continue;
            }
            if let Some(kind) = TokenKind::from_symbol(c) {
                return Token {
                    pos: self.pos,
                    kind,
                    literal: c.to_string(),
                };
            }
            if c.is_whitespace() {
                continue;
            }
            if c.is_numeric() {
                let pos = self.pos;
                let mut literal = String::from(c);
                while let Some(d) = self.bump_if(|d| d.is_numeric()) {
                    literal.push(d);
                }
                return Token {
                    pos,
                    kind: TokenKind::Number,
                    literal,
                };
            }
            if c.is_alphabetic() {
                self.skip_word();
            }
        }

        Token {
            pos: self.pos,
            kind: TokenKind::Eof,
            literal: "\n".to_string(),
        }
    }

    fn skip_comment(&mut self) {
        while self.bump_if(|&c| c != '\n').is_some() {}
    }

    // Words are comments. A command symbol directly after a letter is
    // swallowed by the word, so `move>` produces nothing.
    fn skip_word(&mut self) {
        let mut after_letter = true;
        loop {
            if self.bump_if(|c| c.is_alphabetic()).is_some() {
                after_letter = true;
            } else if after_letter
                && self
                    .bump_if(|&c| TokenKind::from_symbol(c).is_some())
                    .is_some()
            {
                after_letter = false;
            } else {
                break;
            }
        }
    }
}

/// Yields tokens up to, but not including, the `Eof` token.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.lex();
        (token.kind != TokenKind::Eof).then_some(token)
    }
}
