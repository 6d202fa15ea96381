use crate::ast::ASTProgram;
use crate::eval;
use crate::parser;

struct TestIO {
    input: Vec<u8>,
    input_idx: usize,
    output: Vec<u8>,
}

impl eval::IO for TestIO {
    fn putchar(&mut self, val: u8) {
        self.output.push(val);
    }
    fn getchar(&mut self) -> Option<u8> {
        let ret = self.input.get(self.input_idx).copied();
        self.input_idx += 1;
        ret
    }
}

impl TestIO {
    fn new(input: &[u8]) -> Self {
        Self {
            input: input.to_vec(),
            input_idx: 0,
            output: Vec::new(),
        }
    }
    fn done(&self, output: &[u8]) {
        assert!(
            self.input_idx >= self.input.len(),
            "Did not consume full input"
        );
        assert_eq!(self.output, output);
    }
}

fn run(prog: &ASTProgram, input: &[u8], output: &[u8]) {
    let mut io = TestIO::new(input);
    eval::eval_with_io(prog, &mut io);
    io.done(output);
}

fn test_program(code: &str, input: &[u8], output: &[u8]) {
    let ast_prog = parser::Parser::parse(code).unwrap();
    run(&ast_prog, input, output);
    // A re-parse of the same source behaves identically.
    let again = parser::Parser::parse(code).unwrap();
    assert_eq!(ast_prog, again);
    run(&again, input, output);
}

macro_rules! make_test {
    ($test_name:ident, $code:expr, $input:expr, $output:expr) => {
        #[cfg(test)]
        mod $test_name {
            use super::*;
            #[test]
            fn test_eval() {
                test_program($code, $input, $output);
            }
        }
    };
}

// Every program ends by printing a newline.
make_test!(empty, "", b"", b"\n");
make_test!(get_put, ",.", b"a", b"a\n");
make_test!(put_zero, ".", b"", b"\0\n");
make_test!(put_newline, "++++++++++.", b"", b"\n\n");
make_test!(get_get_put, ",,.", b"ab", b"b\n");
make_test!(addmul, "++++++[->+++++<]>++.", b"", b" \n");
make_test!(letter_a, "++++++++[->++++++++<]>+.", b"", b"A\n");
make_test!(simple_loop, "+++[>+<-]>.", b"", b"\x03\n");
make_test!(colon_prints_linefeed, "++++++[->++++++++++<]>--.", b"", b"\n\n");
make_test!(semicolon_prints_itself, "++++++[->++++++++++<]>-.", b"", b";\n");
make_test!(
    high_cell_prints_low_byte,
    &format!("{}[->{}<]>{}.", "+".repeat(16), "+".repeat(16), "+".repeat(67)),
    b"",
    b"C\n"
);
make_test!(eof_keeps_last_byte, ",.,.", b"x", b"xx\n");
make_test!(eof_with_no_input_reads_zero, "+,.", b"", b"\0\n");
make_test!(comment_word_is_skipped, "+++ move> .", b"", b"\x03\n");
make_test!(comment_line_is_skipped, "+++ # [-]\n.", b"", b"\x03\n");
make_test!(integer_literals_are_inert, "65.", b"", b"\0\n");
make_test!(negative_cells, "-.", b"", b"\xff\n");
make_test!(
    hello,
    "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.",
    b"",
    b"Hello\n"
);
make_test!(
    deepest_nesting_runs,
    &format!(
        "+{}-{}.",
        "[".repeat(crate::parser::MAX_LOOP_DEPTH),
        "]".repeat(crate::parser::MAX_LOOP_DEPTH)
    ),
    b"",
    b"\0\n"
);
