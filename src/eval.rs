use std::collections::HashMap;
use std::io::{self, Read, Write};

use crate::ast::{ASTProgram, AST};

/// Byte-level I/O used by the evaluator.
pub trait IO {
    fn putchar(&mut self, val: u8);
    /// `None` at end of input.
    fn getchar(&mut self) -> Option<u8>;
}

/// Stdin/stdout, flushed after every byte like the compiled program's
/// single-byte `write` calls.
pub struct StdIO;

impl IO for StdIO {
    fn putchar(&mut self, val: u8) {
        let mut out = io::stdout().lock();
        // A closed stdout is ignored, as the `write` syscall's result is.
        let _ = out.write_all(&[val]).and_then(|_| out.flush());
    }

    fn getchar(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match io::stdin().read(&mut buf) {
            Ok(1) => Some(buf[0]),
            _ => None,
        }
    }
}

// Mirrors the memory the emitted program reserves.
#[derive(Default)]
struct State {
    mem: HashMap<i64, i64>,
    idx: i64,
    read_buffer: u8,
}

impl State {
    fn read(&self) -> i64 {
        *self.mem.get(&self.idx).unwrap_or(&0)
    }

    fn write(&mut self, val: i64) {
        self.mem.insert(self.idx, val);
    }

    fn ptr_change(&mut self, amt: i64) {
        self.idx = self.idx.wrapping_add(amt);
    }
}

/// The byte `print_cell` writes for a cell value.
pub fn printed_byte(cell: i64) -> u8 {
    let shifted = cell.wrapping_sub(48);
    if shifted == 10 {
        b'\n'
    } else {
        (shifted as u8).wrapping_add(b'0')
    }
}

/// The cell value after `input_cell` stores `byte` into its low byte.
pub fn stored_input(cell: i64, byte: u8) -> i64 {
    (cell & !0xff) | i64::from(byte)
}

pub fn eval(prog: &ASTProgram) {
    eval_with_io(prog, &mut StdIO);
}

pub fn eval_with_io(prog: &ASTProgram, io: &mut impl IO) {
    fn amount(repeat: usize) -> i64 {
        (repeat as i64).wrapping_add(1)
    }

    fn run_series(nodes: &[AST], state: &mut State, io: &mut impl IO) {
        for node in nodes {
            match node {
                AST::While(body) => {
                    while state.read() != 0 {
                        run_series(&body.0, state, io);
                    }
                }
                AST::NextCell { repeat } => state.ptr_change(amount(*repeat)),
                AST::PreviousCell { repeat } => state.ptr_change(amount(*repeat).wrapping_neg()),
                AST::IncrementCell { repeat } => {
                    state.write(state.read().wrapping_add(amount(*repeat)));
                }
                AST::DecrementCell { repeat } => {
                    state.write(state.read().wrapping_sub(amount(*repeat)));
                }
                AST::OutputCell { .. } => io.putchar(printed_byte(state.read())),
                AST::InputCell { .. } => {
                    // On end of input the buffer keeps its previous byte.
                    if let Some(byte) = io.getchar() {
                        state.read_buffer = byte;
                    }
                    state.write(stored_input(state.read(), state.read_buffer));
                }
                AST::IntegerLiteral { .. } => {}
            }
        }
    }

    let mut state = State::default();
    run_series(&prog.0, &mut state, io);
    io.putchar(b'\n');
}
