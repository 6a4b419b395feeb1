//! Abstract syntax tree for SaneQL queries
//!
//! A query is a sequence of let definitions followed by one body
//! expression. Expressions are value pipelines: literals, tokens, access
//! paths, calls with (possibly named, possibly braced) arguments, operators
//! and casts.

/// A parsed query
#[derive(Debug, Clone)]
pub enum Query {
    /// Lets plus one body expression
    Body(QueryBody),
    /// A defun construct. Recognized but rejected during analysis.
    DefineFunction,
}

/// The body of a regular query
#[derive(Debug, Clone)]
pub struct QueryBody {
    /// The let definitions, in source order
    pub lets: Vec<LetEntry>,
    /// The body expression
    pub body: Expr,
}

/// A user defined function or value
#[derive(Debug, Clone)]
pub struct LetEntry {
    /// The name
    pub name: String,
    /// The parameters
    pub args: Vec<LetArg>,
    /// The body
    pub body: Expr,
}

/// One parameter of a let
#[derive(Debug, Clone)]
pub struct LetArg {
    /// The name
    pub name: String,
    /// The argument category, if annotated (scalar otherwise)
    pub category: Option<String>,
    /// The default value, if any
    pub default: Option<Expr>,
}

/// Literal values, kept as raw text. The compiler never computes with
/// literal values, it only types them and passes the text through.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(String),
    Float(String),
    String(String),
    True,
    False,
    Null,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Pow,
    Less,
    Greater,
    Equals,
    NotEquals,
    LessOrEqual,
    GreaterOrEqual,
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

/// A type written in the query, e.g. the target of a cast
#[derive(Debug, Clone, PartialEq)]
pub struct TypeName {
    /// The name of a simple type
    pub name: String,
}

/// An expression
#[derive(Debug, Clone)]
pub enum Expr {
    /// A literal value
    Literal(Literal),
    /// A bare name: column, argument, let, or table
    Token(String),
    /// Scoped access `base.part`
    Access { base: Box<Expr>, part: String },
    /// A call. The callee is either a token (free function) or an access
    /// (method on the base value).
    Call { func: Box<Expr>, args: Vec<FuncArg> },
    /// A binary expression
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// A unary expression
    Unary { op: UnaryOp, value: Box<Expr> },
    /// A cast `value :: type`
    Cast { value: Box<Expr>, ty: TypeName },
}

impl Expr {
    /// The name of a bare token, if this is one
    pub fn as_token(&self) -> Option<&str> {
        match self {
            Expr::Token(name) => Some(name),
            _ => None,
        }
    }
}

/// A call argument, possibly named
#[derive(Debug, Clone)]
pub struct FuncArg {
    /// The parameter name, if given
    pub name: Option<String>,
    /// The value
    pub value: ArgValue,
}

/// The value of a call argument or brace list entry
#[derive(Debug, Clone)]
pub enum ArgValue {
    /// A plain expression
    Expr(Expr),
    /// A braced list of entries
    List(Vec<FuncArg>),
    /// A `condition => result` case pair
    Case { condition: Expr, result: Expr },
}

impl ArgValue {
    /// The contained plain expression, if this is one
    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            ArgValue::Expr(expr) => Some(expr),
            _ => None,
        }
    }
}
