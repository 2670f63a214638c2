use super::error::{CalcError, EvaluationError, SyntaxError};
use super::token::{Operator, Paren, Token};

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub operation: String,
    pub result: f64,
}

pub struct EvaluationTrace {
    pub steps: Vec<Step>,
    pub detailed_mode: bool,
}

impl EvaluationTrace {
    pub fn new(detailed_mode: bool) -> Self {
        EvaluationTrace {
            steps: Vec::new(),
            detailed_mode,
        }
    }

    pub fn add_step(&mut self, operation: String, result: f64) {
        if self.detailed_mode {
            self.steps.push(Step { operation, result });
        }
    }
}

pub fn evaluate(postfix: &[Token], trace: &mut EvaluationTrace) -> Result<f64, CalcError> {
    let mut stack: Vec<f64> = Vec::with_capacity(postfix.len());

    for token in postfix {
        match *token {
            // Literals that overflow parse to infinity.
            Token::Number(n) => stack.push(finite(n)?),
            Token::Operator(op) => {
                let result = apply(op, &mut stack, trace)?;
                stack.push(result);
            }
            Token::Function(func) => {
                let a = pop(&mut stack)?;
                let result = finite(func.apply(a))?;
                trace.add_step(format!("{}({})", func, a), result);
                stack.push(result);
            }
            // The converter never emits parentheses.
            Token::Paren(Paren::Open) | Token::Paren(Paren::Close) => {
                return Err(SyntaxError::MismatchedParentheses.into());
            }
        }
    }

    match stack.as_slice() {
        [value] => Ok(finite(*value)?),
        _ => Err(SyntaxError::InvalidExpression.into()),
    }
}

/// Pops the operator's operands (right one first) and applies it.
fn apply(op: Operator, stack: &mut Vec<f64>, trace: &mut EvaluationTrace) -> Result<f64, EvaluationError> {
    let b = pop(stack)?;
    let a = if op.is_unary() { None } else { Some(pop(stack)?) };

    let result = match (op, a) {
        (Operator::Neg, None) => -b,
        (Operator::Add, Some(a)) => a + b,
        (Operator::Sub, Some(a)) => a - b,
        (Operator::Mul, Some(a)) => a * b,
        (Operator::Div, Some(_)) if b == 0.0 => return Err(EvaluationError::DivisionByZero),
        (Operator::Div, Some(a)) => a / b,
        (Operator::Pow, Some(a)) => a.powf(b),
        _ => return Err(EvaluationError::InvalidExpression),
    };
    let result = finite(result)?;

    match a {
        Some(a) => trace.add_step(format!("{} {} {}", a, op, b), result),
        None => trace.add_step(format!("-({})", b), result),
    }
    Ok(result)
}

fn pop(stack: &mut Vec<f64>) -> Result<f64, EvaluationError> {
    stack.pop().ok_or(EvaluationError::InvalidExpression)
}

fn finite(value: f64) -> Result<f64, EvaluationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationError::NotFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc_engine::token::Function;

    fn eval(postfix: &[Token]) -> Result<f64, CalcError> {
        evaluate(postfix, &mut EvaluationTrace::new(false))
    }

    #[test]
    fn second_pop_is_left_operand() {
        let postfix = [Token::Number(10.0), Token::Number(4.0), Token::Operator(Operator::Sub)];
        assert_eq!(eval(&postfix), Ok(6.0));
        let postfix = [Token::Number(2.0), Token::Number(3.0), Token::Operator(Operator::Pow)];
        assert_eq!(eval(&postfix), Ok(8.0));
    }

    #[test]
    fn operator_underflow() {
        let postfix = [Token::Number(1.0), Token::Operator(Operator::Add)];
        assert_eq!(eval(&postfix), Err(EvaluationError::InvalidExpression.into()));
        let postfix = [Token::Function(Function::Abs)];
        assert_eq!(eval(&postfix), Err(EvaluationError::InvalidExpression.into()));
    }

    #[test]
    fn leftover_values_are_a_syntax_error() {
        let postfix = [Token::Number(1.0), Token::Number(2.0)];
        assert_eq!(eval(&postfix), Err(SyntaxError::InvalidExpression.into()));
        assert_eq!(eval(&[]), Err(SyntaxError::InvalidExpression.into()));
    }

    #[test]
    fn division_by_zero_is_caught_before_dividing() {
        let postfix = [Token::Number(0.0), Token::Number(0.0), Token::Operator(Operator::Div)];
        assert_eq!(eval(&postfix), Err(EvaluationError::DivisionByZero.into()));
    }

    #[test]
    fn non_finite_intermediate_is_rejected() {
        let postfix = [Token::Number(-1.0), Token::Function(Function::Sqrt)];
        assert_eq!(eval(&postfix), Err(EvaluationError::NotFinite.into()));
        let postfix = [Token::Number(0.0), Token::Function(Function::Ln)];
        assert_eq!(eval(&postfix), Err(EvaluationError::NotFinite.into()));
    }

    #[test]
    fn infinite_literal_is_rejected() {
        let postfix = [Token::Number(f64::INFINITY)];
        assert_eq!(eval(&postfix), Err(EvaluationError::NotFinite.into()));
        let postfix = [Token::Number(f64::INFINITY), Token::Number(0.0), Token::Operator(Operator::Mul)];
        assert_eq!(eval(&postfix), Err(EvaluationError::NotFinite.into()));
    }

    #[test]
    fn negation_takes_one_operand() {
        let postfix = [Token::Number(1.0), Token::Number(2.0), Token::Operator(Operator::Neg)];
        assert_eq!(eval(&postfix), Err(SyntaxError::InvalidExpression.into()));
        let mut trace = EvaluationTrace::new(true);
        let postfix = [Token::Number(5.0), Token::Operator(Operator::Neg)];
        assert_eq!(evaluate(&postfix, &mut trace), Ok(-5.0));
        assert_eq!(trace.steps[0].operation, "-(5)");
    }

    #[test]
    fn trace_records_each_application() {
        let postfix = [
            Token::Number(2.0),
            Token::Number(3.0),
            Token::Number(4.0),
            Token::Operator(Operator::Mul),
            Token::Operator(Operator::Add),
        ];
        let mut trace = EvaluationTrace::new(true);
        assert_eq!(evaluate(&postfix, &mut trace), Ok(14.0));
        let ops: Vec<_> = trace.steps.iter().map(|s| s.operation.as_str()).collect();
        assert_eq!(ops, ["3 * 4", "2 + 12"]);
        assert_eq!(trace.steps[1].result, 14.0);
    }

    #[test]
    fn quiet_trace_stays_empty() {
        let postfix = [Token::Number(2.0), Token::Operator(Operator::Neg)];
        let mut trace = EvaluationTrace::new(false);
        assert_eq!(evaluate(&postfix, &mut trace), Ok(-2.0));
        assert!(trace.steps.is_empty());
    }
}
