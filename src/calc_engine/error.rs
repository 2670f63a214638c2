use thiserror::Error;

use super::token::Function;

/// The token stream is structurally invalid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("Unexpected character: {0}")]
    UnexpectedCharacter(char),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Malformed number: {0}")]
    MalformedNumber(String),

    #[error("Mismatched parentheses")]
    MismatchedParentheses,

    #[error("Function {0} must be followed by '('")]
    MissingArguments(Function),

    /// Wrong number of values left once evaluation finished.
    #[error("Invalid expression")]
    InvalidExpression,

    #[error("Expression too long: {len} characters (max {max})")]
    TooLong { len: usize, max: usize },
}

/// The token stream is well formed but cannot be computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// An operator or function found too few operands on the stack.
    #[error("Invalid expression")]
    InvalidExpression,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result is not finite")]
    NotFinite,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

impl CalcError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, CalcError::Syntax(_))
    }
}
