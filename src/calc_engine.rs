//! Arithmetic expression evaluator.
//!
//! Three stages run as a strict pipeline on every call: [`tokenize`] turns
//! the input into tokens, [`to_postfix`] reorders them with the
//! shunting-yard algorithm, and [`evaluate`] reduces the postfix sequence on
//! a value stack. Nothing is shared between calls, so [`parse`] can be used
//! from any number of threads at once.

mod error;
mod evaluator;
mod postfix;
mod token;
mod tokenizer;

pub use error::{CalcError, EvaluationError, SyntaxError};
pub use evaluator::{evaluate, EvaluationTrace, Step};
pub use postfix::to_postfix;
pub use token::{Assoc, Function, Operator, OperatorSpec, Paren, Token, FUNCTIONS, OPERATORS};
pub use tokenizer::{tokenize, MAX_EXPRESSION_LEN};

/// Evaluates `expression` to a finite number.
pub fn parse(expression: &str) -> Result<f64, CalcError> {
    parse_traced(expression, &mut EvaluationTrace::new(false))
}

/// Like [`parse`], recording every operator and function application in
/// `trace` when it is in detailed mode.
pub fn parse_traced(expression: &str, trace: &mut EvaluationTrace) -> Result<f64, CalcError> {
    let tokens = tokenize(expression)?;
    let postfix = to_postfix(&tokens)?;
    let result = evaluate(&postfix, trace);
    match &result {
        Ok(value) => log::debug!("{:?} = {}", expression, value),
        Err(e) => log::debug!("{:?} failed: {}", expression, e),
    }
    result
}
