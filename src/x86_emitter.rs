use std::io::Write;

use snafu::ResultExt;

use crate::ast::{ASTProgram, AST};
use crate::error::{CompileResult, LoopBodySnafu, WriteSnafu};

/// Number of 8-byte cells reserved for the tape.
pub const TAPE_CELLS: usize = 30000;

// Follows the `tape` reservation in `.bss`.
const PREAMBLE: &str = "    cell_pointer    resq 1
    print_buffer    resb 1
    read_buffer     resb 1

section .data
    linefeed        db 0x0A

segment .text
global _start

; Writes the byte in tape[cell_pointer] to stdout. A cell holding 58 prints a
; linefeed instead.
print_cell:
    mov rbx, [cell_pointer]
    mov rax, [tape+rbx*8]
    sub rax, 48
    cmp rax, 10
    jne .not_linefeed
    mov al, [linefeed]
    mov [print_buffer], al
    jmp .perform_print
.not_linefeed:
    add al, '0'
    mov [print_buffer], al
.perform_print:
    mov rax, 1
    mov rdi, 1
    mov rsi, print_buffer
    mov rdx, 1
    syscall
    ret

; Reads one byte from stdin into the low byte of tape[cell_pointer].
input_cell:
    mov rax, 0
    mov rdi, 0
    mov rsi, read_buffer
    mov rdx, 1
    syscall
    mov rbx, [cell_pointer]
    mov al, [read_buffer]
    mov [tape+rbx*8], al
    ret

_start:
";

const EPILOGUE: &str = "    ; -- New Line -- ;
    mov rax, 1
    mov rdi, 1
    mov rsi, linefeed
    mov rdx, 1
    syscall
    ; -- Exit -- ;
    mov rax, 60
    xor rdi, rdi
    syscall
";

macro_rules! emit {
    ($e:expr, $($arg:tt)*) => {
        writeln!($e.out, $($arg)*).context(WriteSnafu)?
    };
}

/// Renders a program as NASM assembly for x86-64 Linux.
pub struct X86Emitter<'w, W: Write> {
    out: &'w mut W,
    // Bumped once per visited node, loops included, so every loop id is unique.
    label_count: usize,
}

impl<'w, W: Write> X86Emitter<'w, W> {
    pub fn emit(prog: &ASTProgram, out: &'w mut W) -> CompileResult<()> {
        let mut e = Self {
            out,
            label_count: 0,
        };
        emit!(e, "segment .bss");
        emit!(e, "    tape            resq {}", TAPE_CELLS);
        e.out.write_all(PREAMBLE.as_bytes()).context(WriteSnafu)?;
        e.emit_series(&prog.0)?;
        e.out.write_all(EPILOGUE.as_bytes()).context(WriteSnafu)?;
        e.out.flush().context(WriteSnafu)
    }

    fn emit_series(&mut self, nodes: &[AST]) -> CompileResult<()> {
        for n in nodes {
            self.emit_inner(n)?;
        }
        Ok(())
    }

    fn emit_inner(&mut self, node: &AST) -> CompileResult<()> {
        self.label_count += 1;

        match node {
            AST::NextCell { repeat } => {
                emit!(self, "    ; -- Next Cell -- ;");
                emit!(self, "    mov rbx, [cell_pointer]");
                emit!(self, "    add rbx, {}", repeat + 1);
                emit!(self, "    mov [cell_pointer], rbx");
            }
            AST::PreviousCell { repeat } => {
                emit!(self, "    ; -- Previous Cell -- ;");
                emit!(self, "    mov rbx, [cell_pointer]");
                emit!(self, "    sub rbx, {}", repeat + 1);
                emit!(self, "    mov [cell_pointer], rbx");
            }
            AST::IncrementCell { repeat } => {
                emit!(self, "    ; -- Increment -- ;");
                emit!(self, "    mov rbx, [cell_pointer]");
                emit!(self, "    mov rax, [tape+rbx*8]");
                emit!(self, "    add rax, {}", repeat + 1);
                emit!(self, "    mov [tape+rbx*8], rax");
            }
            AST::DecrementCell { repeat } => {
                emit!(self, "    ; -- Decrement -- ;");
                emit!(self, "    mov rbx, [cell_pointer]");
                emit!(self, "    mov rax, [tape+rbx*8]");
                emit!(self, "    sub rax, {}", repeat + 1);
                emit!(self, "    mov [tape+rbx*8], rax");
            }
            AST::OutputCell { .. } => {
                emit!(self, "    ; -- Output -- ;");
                emit!(self, "    call print_cell");
            }
            AST::InputCell { .. } => {
                emit!(self, "    ; -- Input -- ;");
                emit!(self, "    call input_cell");
            }
            AST::IntegerLiteral { .. } => {}
            AST::While(body) => {
                let l = format!("while_{}", self.label_count);
                emit!(self, "    ; -- While -- ;");
                emit!(self, "{}:", l);
                emit!(self, "    mov rbx, [cell_pointer]");
                emit!(self, "    mov rax, [tape+rbx*8]");
                emit!(self, "    cmp rax, 0");
                emit!(self, "    jnz {}.not_zero", l);
                emit!(self, "    jmp {}.done", l);
                emit!(self, "{}.not_zero:", l);

                self.emit_series(&body.0).context(LoopBodySnafu)?;

                emit!(self, "    jmp {}", l);
                emit!(self, "{}.done:", l);
            }
        }
        Ok(())
    }
}
