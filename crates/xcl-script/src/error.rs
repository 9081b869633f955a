//! Script error types

use thiserror::Error;

/// Result type for script operations
pub type ScriptResult<T> = std::result::Result<T, ScriptError>;

/// Errors that can occur while parsing or evaluating a statement
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    /// Statement parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reference to a variable that was never set
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    /// Operand or argument of the wrong type
    #[error("Type error: {0}")]
    Type(String),

    /// Division or remainder by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Invalid argument value
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },
}

impl ScriptError {
    pub(crate) fn type_error(msg: impl Into<String>) -> Self {
        ScriptError::Type(msg.into())
    }
}
