//! Expression editing state behind the keypad and keyboard front-ends.

use std::f64::consts::PI;

use unicode_segmentation::UnicodeSegmentation;

use crate::calc_engine::{parse_traced, CalcError, EvaluationTrace, Function, Step};

const BINARY_OPERATORS: &str = "+-*/^";
const NUMBER_SEPARATORS: &[char] = &['+', '-', '*', '/', '^', '(', ')'];

/// A successful calculation, ready to be written to history.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub expression: String,
    pub result: f64,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default)]
pub struct Calculator {
    expression: String,
    last_result: f64,
    memory: f64,
    result_displayed: bool,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn last_result(&self) -> f64 {
        self.last_result
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    pub fn has_memory(&self) -> bool {
        self.memory != 0.0
    }

    pub fn is_result_displayed(&self) -> bool {
        self.result_displayed
    }

    /// What the main display shows.
    pub fn display(&self) -> String {
        if self.result_displayed {
            format_number(self.last_result)
        } else if self.expression.is_empty() {
            "0".to_string()
        } else {
            self.expression.clone()
        }
    }

    /// Digit or decimal point from the keypad. A second `.` in the number
    /// being typed is ignored.
    pub fn input_number(&mut self, value: &str) {
        self.start_fresh_after_result();

        let current_number = self.expression.rsplit(NUMBER_SEPARATORS).next().unwrap_or("");
        if value == "." && current_number.contains('.') {
            return;
        }
        self.expression.push_str(value);
    }

    /// Binary operator from the keypad. Continues from the last result when
    /// one is displayed and replaces a trailing operator.
    pub fn input_operator(&mut self, op: char) {
        if self.result_displayed {
            self.expression = self.last_result.to_string();
            self.result_displayed = false;
        }

        if self.expression.is_empty() && op != '-' {
            return;
        }

        if let Some(last) = self.expression.chars().last() {
            if BINARY_OPERATORS.contains(last) && BINARY_OPERATORS.contains(op) {
                self.expression.pop();
            }
        }
        self.expression.push(op);
    }

    pub fn input_function(&mut self, func: Function) {
        self.start_fresh_after_result();
        self.expression.push_str(func.name());
        self.expression.push('(');
    }

    /// Free-form typing. An operator typed right after a result continues
    /// from it, anything else starts a new expression.
    pub fn input_text(&mut self, text: &str) {
        if self.result_displayed {
            let continues = text.starts_with(|c: char| BINARY_OPERATORS.contains(c));
            self.expression = if continues {
                self.last_result.to_string()
            } else {
                String::new()
            };
            self.result_displayed = false;
        }
        self.expression.push_str(text);
    }

    pub fn set_expression(&mut self, expression: &str) {
        self.expression = expression.to_string();
        self.result_displayed = false;
    }

    pub fn percent(&mut self) {
        if self.result_displayed {
            self.expression = self.last_result.to_string();
            self.result_displayed = false;
        }
        if !self.expression.is_empty() {
            self.expression.push_str("/100*");
        }
    }

    pub fn backspace(&mut self) {
        if self.result_displayed {
            return;
        }
        if let Some((idx, _)) = self.expression.grapheme_indices(true).next_back() {
            self.expression.truncate(idx);
        }
    }

    pub fn clear(&mut self) {
        self.expression.clear();
        self.last_result = 0.0;
        self.result_displayed = false;
    }

    /// Evaluates the current expression. On failure the expression is left
    /// exactly as typed. An empty expression is a no-op.
    pub fn calculate(&mut self, detailed: bool) -> Result<Option<Outcome>, CalcError> {
        if self.expression.trim().is_empty() {
            return Ok(None);
        }

        let normalized = normalize_expression(&self.expression);
        let mut trace = EvaluationTrace::new(detailed);
        let result = round_result(parse_traced(&normalized, &mut trace)?);

        let outcome = Outcome {
            expression: std::mem::take(&mut self.expression),
            result,
            steps: trace.steps,
        };
        self.last_result = result;
        self.result_displayed = true;
        self.expression = result.to_string();
        Ok(Some(outcome))
    }

    pub fn memory_clear(&mut self) {
        self.memory = 0.0;
    }

    pub fn memory_add(&mut self) {
        self.memory += self.last_result;
    }

    pub fn memory_recall(&mut self) {
        self.start_fresh_after_result();
        self.expression.push_str(&self.memory.to_string());
    }

    fn start_fresh_after_result(&mut self) {
        if self.result_displayed {
            self.expression.clear();
            self.result_displayed = false;
        }
    }
}

/// Replaces display glyphs with the symbols the evaluator understands.
pub fn normalize_expression(expression: &str) -> String {
    expression
        .replace('×', "*")
        .replace('÷', "/")
        .replace('π', &PI.to_string())
}

/// Snaps values within 1e-10 of zero to zero and rounds other non-integers
/// to ten decimal places, hiding float noise like `0.1 + 0.2`.
pub fn round_result(value: f64) -> f64 {
    if value.abs() < 1e-10 {
        0.0
    } else if value.fract() != 0.0 {
        format!("{:.10}", value).parse().unwrap_or(value)
    } else {
        value
    }
}

pub fn format_number(x: f64) -> String {
    if x.abs() >= 1e9 || (x.abs() < 1e-6 && x != 0.0) {
        format!("{:.6e}", x)
    } else {
        x.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn typed(keys: &str) -> Calculator {
        let mut calc = Calculator::new();
        for c in keys.chars() {
            if c.is_ascii_digit() || c == '.' {
                calc.input_number(&c.to_string());
            } else {
                calc.input_operator(c);
            }
        }
        calc
    }

    #[test]
    fn second_decimal_point_is_ignored() {
        assert_eq!(typed("1.2.3").expression(), "1.23");
        assert_eq!(typed("1.2+3.4.5").expression(), "1.2+3.45");
    }

    #[test]
    fn operator_replaces_trailing_operator() {
        assert_eq!(typed("5+*2").expression(), "5*2");
    }

    #[test]
    fn only_minus_may_start_an_expression() {
        assert_eq!(typed("*").expression(), "");
        assert_eq!(typed("-3").expression(), "-3");
    }

    #[test]
    fn calculate_displays_rounded_result() {
        let mut calc = typed("0.1+0.2");
        let outcome = calc.calculate(false).unwrap().unwrap();
        assert_eq!(outcome.expression, "0.1+0.2");
        assert_eq!(outcome.result, 0.3);
        assert!(calc.is_result_displayed());
        assert_eq!(calc.display(), "0.3");
    }

    #[test]
    fn failed_calculation_keeps_input() {
        let mut calc = typed("5/0");
        let err = calc.calculate(false).unwrap_err();
        assert_eq!(err.to_string(), "Division by zero");
        assert_eq!(calc.expression(), "5/0");
        assert!(!calc.is_result_displayed());
    }

    #[test]
    fn empty_calculation_is_a_no_op() {
        let mut calc = Calculator::new();
        assert_eq!(calc.calculate(false), Ok(None));
        assert_eq!(calc.display(), "0");
    }

    #[test]
    fn operator_after_result_continues_from_it() {
        let mut calc = typed("2*3");
        calc.calculate(false).unwrap();
        calc.input_operator('+');
        calc.input_number("1");
        assert_eq!(calc.expression(), "6+1");
    }

    #[test]
    fn digit_after_result_starts_over() {
        let mut calc = typed("2*3");
        calc.calculate(false).unwrap();
        calc.input_number("9");
        assert_eq!(calc.expression(), "9");
    }

    #[test]
    fn glyphs_are_normalised() {
        let mut calc = Calculator::new();
        calc.input_text("6×2÷3");
        assert_eq!(calc.calculate(false).unwrap().unwrap().result, 4.0);

        calc.set_expression("cos(π)");
        assert_eq!(calc.calculate(false).unwrap().unwrap().result, -1.0);
    }

    #[test]
    fn backspace_removes_whole_glyph() {
        let mut calc = Calculator::new();
        calc.input_text("2×π");
        calc.backspace();
        assert_eq!(calc.expression(), "2×");
        calc.backspace();
        calc.backspace();
        calc.backspace();
        assert_eq!(calc.expression(), "");
    }

    #[test]
    fn function_and_percent() {
        let mut calc = Calculator::new();
        calc.input_function(Function::Sqrt);
        calc.input_number("16");
        calc.input_text(")");
        calc.percent();
        calc.input_number("50");
        assert_eq!(calc.expression(), "sqrt(16)/100*50");
        assert_eq!(calc.calculate(false).unwrap().unwrap().result, 2.0);
    }

    #[test]
    fn memory_register() {
        let mut calc = typed("4*5");
        calc.calculate(false).unwrap();
        assert!(!calc.has_memory());
        calc.memory_add();
        calc.memory_add();
        assert_eq!(calc.memory(), 40.0);
        calc.memory_recall();
        assert_eq!(calc.expression(), "40");
        calc.memory_clear();
        assert!(!calc.has_memory());
    }

    #[test]
    fn clear_resets_last_result() {
        let mut calc = typed("1+1");
        calc.calculate(false).unwrap();
        calc.clear();
        assert_eq!(calc.last_result(), 0.0);
        assert_eq!(calc.display(), "0");
    }

    #[test]
    fn rounding() {
        assert_eq!(round_result(1e-11), 0.0);
        assert_eq!(round_result(-1e-12), 0.0);
        assert_eq!(round_result(1.0 / 3.0), 0.3333333333);
        assert_eq!(round_result(42.0), 42.0);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(1_234_567_890.0), "1.234568e9");
        assert_eq!(format_number(0.0000001), "1.000000e-7");
    }
}
