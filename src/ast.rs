/// One operation. `repeat` counts the extra occurrences folded into the node,
/// so a lone `+` has `repeat == 0` and `+++` has `repeat == 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AST {
    // Parsed but never emitted
    IntegerLiteral { value: i64, repeat: usize },

    NextCell { repeat: usize },
    PreviousCell { repeat: usize },
    IncrementCell { repeat: usize },
    DecrementCell { repeat: usize },
    OutputCell { repeat: usize },
    InputCell { repeat: usize },
    While(ASTProgram),
}

/// A block of nodes in execution order: the whole program or one loop body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ASTProgram(pub Vec<AST>);
