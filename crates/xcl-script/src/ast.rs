//! Script abstract syntax tree

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `name = expr`
    Assign { name: String, value: Expr },
    /// A bare expression
    Expr(Expr),
}

/// Expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // === Literals ===
    Number(f64),
    String(String),
    Boolean(bool),
    Null,

    /// Variable reference
    Variable(String),

    // === Operators ===
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },

    /// Function call, name stored uppercase
    Function { name: String, args: Vec<Expr> },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Logical
    Or,
    And,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Text
    Concat,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
    Not,
}
