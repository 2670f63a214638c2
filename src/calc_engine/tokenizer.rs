use super::error::SyntaxError;
use super::token::{Function, Operator, Paren, Token};

pub const MAX_EXPRESSION_LEN: usize = 1024;

pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    let len = input.chars().count();
    if len > MAX_EXPRESSION_LEN {
        return Err(SyntaxError::TooLong { len, max: MAX_EXPRESSION_LEN });
    }

    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            _ if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                tokens.push(Token::Paren(Paren::Open));
                chars.next();
            }
            ')' => {
                tokens.push(Token::Paren(Paren::Close));
                chars.next();
            }
            '+' | '-' | '*' | '/' | '^' => {
                if let Some(op) = Operator::from_symbol(c) {
                    tokens.push(Token::Operator(op));
                }
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut num_str = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '.' {
                        num_str.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(parse_number(&num_str)?));
            }
            'a'..='z' | 'A'..='Z' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphabetic() {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match Function::lookup(&ident) {
                    Some(func) => tokens.push(Token::Function(func)),
                    None => return Err(SyntaxError::UnknownFunction(ident)),
                }
            }
            _ => return Err(SyntaxError::UnexpectedCharacter(c)),
        }
    }

    log::trace!("tokenized {:?} into {} tokens", input, tokens.len());
    Ok(tokens)
}

// The scan above only collects digits and dots, so a second dot is the
// only way a literal can be ambiguous.
fn parse_number(literal: &str) -> Result<f64, SyntaxError> {
    if literal.matches('.').count() > 1 {
        return Err(SyntaxError::MalformedNumber(literal.to_string()));
    }
    literal
        .parse::<f64>()
        .map_err(|_| SyntaxError::MalformedNumber(literal.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_operators_and_parens() {
        let tokens = tokenize("(1.5 + 2) * 3").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Paren(Paren::Open),
                Token::Number(1.5),
                Token::Operator(Operator::Add),
                Token::Number(2.0),
                Token::Paren(Paren::Close),
                Token::Operator(Operator::Mul),
                Token::Number(3.0),
            ]
        );
    }

    #[test]
    fn leading_and_trailing_dots() {
        assert_eq!(tokenize(".5").unwrap(), vec![Token::Number(0.5)]);
        assert_eq!(tokenize("5.").unwrap(), vec![Token::Number(5.0)]);
    }

    #[test]
    fn whitespace_is_skipped() {
        assert_eq!(tokenize(" \t 7 \n").unwrap(), vec![Token::Number(7.0)]);
        assert!(tokenize("   ").unwrap().is_empty());
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn functions_are_recognised() {
        assert_eq!(
            tokenize("sqrt(4)").unwrap(),
            vec![
                Token::Function(Function::Sqrt),
                Token::Paren(Paren::Open),
                Token::Number(4.0),
                Token::Paren(Paren::Close),
            ]
        );
    }

    #[test]
    fn unknown_function() {
        assert_eq!(tokenize("2 + foo(1)"), Err(SyntaxError::UnknownFunction("foo".into())));
        assert_eq!(tokenize("SIN(0)"), Err(SyntaxError::UnknownFunction("SIN".into())));
    }

    #[test]
    fn unexpected_character() {
        let err = tokenize("2@3").unwrap_err();
        assert_eq!(err, SyntaxError::UnexpectedCharacter('@'));
        assert_eq!(err.to_string(), "Unexpected character: @");
        assert_eq!(tokenize("2×3"), Err(SyntaxError::UnexpectedCharacter('×')));
    }

    #[test]
    fn several_decimal_points_are_rejected() {
        assert_eq!(tokenize("1.2.3"), Err(SyntaxError::MalformedNumber("1.2.3".into())));
        assert_eq!(tokenize("."), Err(SyntaxError::MalformedNumber(".".into())));
    }

    #[test]
    fn overlong_input() {
        let input = "1+".repeat(MAX_EXPRESSION_LEN);
        assert!(matches!(tokenize(&input), Err(SyntaxError::TooLong { .. })));
    }
}
