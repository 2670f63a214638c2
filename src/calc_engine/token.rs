use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Number(f64),
    Operator(Operator),
    Paren(Paren),
    Function(Function),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paren {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    /// Prefix minus. Never produced by the tokenizer, only by the converter.
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSpec {
    pub symbol: char,
    pub precedence: u8,
    pub assoc: Assoc,
    pub arity: usize,
}

/// Precedence and associativity of every operator, in one place.
pub const OPERATORS: [(Operator, OperatorSpec); 6] = [
    (Operator::Add, OperatorSpec { symbol: '+', precedence: 1, assoc: Assoc::Left, arity: 2 }),
    (Operator::Sub, OperatorSpec { symbol: '-', precedence: 1, assoc: Assoc::Left, arity: 2 }),
    (Operator::Mul, OperatorSpec { symbol: '*', precedence: 2, assoc: Assoc::Left, arity: 2 }),
    (Operator::Div, OperatorSpec { symbol: '/', precedence: 2, assoc: Assoc::Left, arity: 2 }),
    (Operator::Pow, OperatorSpec { symbol: '^', precedence: 3, assoc: Assoc::Right, arity: 2 }),
    (Operator::Neg, OperatorSpec { symbol: '-', precedence: 3, assoc: Assoc::Right, arity: 1 }),
];

impl Operator {
    pub fn spec(self) -> OperatorSpec {
        // The table covers every variant.
        OPERATORS
            .iter()
            .find(|(op, _)| *op == self)
            .map(|(_, spec)| *spec)
            .unwrap_or_else(|| unreachable!("operator {:?} missing from table", self))
    }

    /// Maps an input symbol to its binary operator.
    pub fn from_symbol(c: char) -> Option<Operator> {
        OPERATORS
            .iter()
            .find(|(_, spec)| spec.symbol == c && spec.arity == 2)
            .map(|(op, _)| *op)
    }

    pub fn precedence(self) -> u8 {
        self.spec().precedence
    }

    pub fn assoc(self) -> Assoc {
        self.spec().assoc
    }

    pub fn is_unary(self) -> bool {
        self.spec().arity == 1
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec().symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Sqrt,
    Ln,
    Log,
    Abs,
}

pub const FUNCTIONS: [(&str, Function); 7] = [
    ("sin", Function::Sin),
    ("cos", Function::Cos),
    ("tan", Function::Tan),
    ("sqrt", Function::Sqrt),
    ("ln", Function::Ln),
    ("log", Function::Log),
    ("abs", Function::Abs),
];

impl Function {
    /// Case-sensitive lookup: `Sin` is not `sin`.
    pub fn lookup(name: &str) -> Option<Function> {
        FUNCTIONS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Sqrt => "sqrt",
            Function::Ln => "ln",
            Function::Log => "log",
            Function::Abs => "abs",
        }
    }

    /// Trigonometric functions take radians.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Sqrt => x.sqrt(),
            Function::Ln => x.ln(),
            Function::Log => x.log10(),
            Function::Abs => x.abs(),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Operator(Operator::Neg) => f.write_str("neg"),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Paren(Paren::Open) => f.write_str("("),
            Token::Paren(Paren::Close) => f.write_str(")"),
            Token::Function(func) => write!(f, "{}", func),
        }
    }
}
