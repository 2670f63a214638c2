use super::error::SyntaxError;
use super::token::{Assoc, Operator, Paren, Token};

/// Shunting-yard conversion of an infix token stream to postfix order.
///
/// A `-` in prefix position (first token, after an operator, after `(`)
/// becomes [`Operator::Neg`]; a prefix `+` is dropped. Functions stay on the
/// stack until the `)` closing their argument.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>, SyntaxError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();
    let mut expect_operand = true;

    for (i, &token) in tokens.iter().enumerate() {
        match token {
            Token::Number(_) => {
                output.push(token);
                expect_operand = false;
            }
            Token::Function(func) => {
                if tokens.get(i + 1) != Some(&Token::Paren(Paren::Open)) {
                    return Err(SyntaxError::MissingArguments(func));
                }
                stack.push(token);
                expect_operand = true;
            }
            Token::Operator(op) if expect_operand => match op {
                Operator::Sub | Operator::Neg => stack.push(Token::Operator(Operator::Neg)),
                Operator::Add => {}
                // Left for the evaluator to reject as an underflow.
                _ => push_operator(op, &mut stack, &mut output),
            },
            Token::Operator(op) => {
                push_operator(op, &mut stack, &mut output);
                expect_operand = true;
            }
            Token::Paren(Paren::Open) => {
                stack.push(token);
                expect_operand = true;
            }
            Token::Paren(Paren::Close) => {
                loop {
                    match stack.pop() {
                        Some(Token::Paren(Paren::Open)) => break,
                        Some(top) => output.push(top),
                        None => return Err(SyntaxError::MismatchedParentheses),
                    }
                }
                if let Some(&Token::Function(_)) = stack.last() {
                    output.extend(stack.pop());
                }
                expect_operand = false;
            }
        }
    }

    while let Some(top) = stack.pop() {
        if top == Token::Paren(Paren::Open) {
            return Err(SyntaxError::MismatchedParentheses);
        }
        output.push(top);
    }

    log::trace!("postfix: {}", render(&output));
    Ok(output)
}

fn push_operator(op: Operator, stack: &mut Vec<Token>, output: &mut Vec<Token>) {
    while let Some(&Token::Operator(top)) = stack.last() {
        let pops = match op.assoc() {
            Assoc::Left => op.precedence() <= top.precedence(),
            Assoc::Right => op.precedence() < top.precedence(),
        };
        if !pops {
            break;
        }
        output.extend(stack.pop());
    }
    stack.push(Token::Operator(op));
}

/// Space-separated postfix form, e.g. `2 3 4 * +`.
pub fn render(postfix: &[Token]) -> String {
    postfix
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc_engine::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    fn rpn(input: &str) -> String {
        render(&to_postfix(&tokenize(input).unwrap()).unwrap())
    }

    #[test]
    fn precedence_orders_output() {
        assert_eq!(rpn("2+3*4"), "2 3 4 * +");
        assert_eq!(rpn("2*3+4"), "2 3 * 4 +");
    }

    #[test]
    fn left_associative_chain() {
        assert_eq!(rpn("10-2-3"), "10 2 - 3 -");
        assert_eq!(rpn("8/4/2"), "8 4 / 2 /");
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(rpn("2^3^2"), "2 3 2 ^ ^");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(rpn("(2+3)*4"), "2 3 + 4 *");
    }

    #[test]
    fn function_closes_with_its_paren() {
        assert_eq!(rpn("sqrt(16)+1"), "16 sqrt 1 +");
        assert_eq!(rpn("abs(sin(0)-2)"), "0 sin 2 - abs");
    }

    #[test]
    fn prefix_minus_becomes_negation() {
        assert_eq!(rpn("-5+10"), "5 neg 10 +");
        assert_eq!(rpn("-2^2"), "2 2 ^ neg");
        assert_eq!(rpn("2^-1"), "2 1 neg ^");
        assert_eq!(rpn("10/-2"), "10 2 neg /");
        assert_eq!(rpn("-(1)"), "1 neg");
        assert_eq!(rpn("+3"), "3");
    }

    #[test]
    fn mismatched_parentheses() {
        let open = to_postfix(&tokenize("(5+3").unwrap());
        assert_eq!(open, Err(SyntaxError::MismatchedParentheses));
        let close = to_postfix(&tokenize("5+3)").unwrap());
        assert_eq!(close, Err(SyntaxError::MismatchedParentheses));
    }

    #[test]
    fn function_needs_parenthesised_argument() {
        let err = to_postfix(&tokenize("sqrt 16").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "Function sqrt must be followed by '('");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(to_postfix(&[]).unwrap().is_empty());
    }
}
