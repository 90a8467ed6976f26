//! The syntax tree produced by the parser. Nodes carry spans into the source
//! file they were parsed from but no semantic information; names are still
//! unresolved symbols.

use super::intern::InternedSymbol;
use crate::frontend::lexer::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub span: Span,
    pub symbol: InternedSymbol,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub span: Span,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub span: Span,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// cred x = 1, const x = 1, order g = f
    VariableDeclaration(Box<VariableDeclaration>),
    /// order cred f(cred x) { ... }
    FunctionDeclaration(Box<FunctionDeclaration>),
    /// x = 1, a[0] = 1
    Assignment {
        target: Box<Expression>,
        source: Box<Expression>,
    },
    /// x++, x--
    Increment {
        target: Identifier,
        operator: IncrementOperator,
    },
    /// f(x)
    Call(Box<Expression>),
    /// emit x
    Print(Box<Expression>),
    /// execute x
    Return(Box<Expression>),
    /// execute
    ShortReturn,
    /// unleash
    Break,
    /// endure
    Continue,
    If(Box<IfStatement>),
    /// as x < 10 { ... }
    While { test: Box<Expression>, body: Block },
    /// force (cred i = 0; i < 10; i++) { ... }
    CountingFor(Box<CountingFor>),
    /// force (x in xs) { ... }
    ForEach(Box<ForEach>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub read_only: bool,
    pub name: Identifier,
    /// Absent for `const x = ...` and `order g = ...`, in which case the type
    /// is taken from the initializer
    pub ty: Option<Type>,
    pub initializer: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: Identifier,
    pub parameters: Vec<Parameter>,
    /// Absent means the function returns `void`
    pub return_type: Option<Type>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub span: Span,
    pub name: Identifier,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Block,
    pub alternative: Option<Alternative>,
}

/// What follows an `altshould`/`elseshould`
#[derive(Debug, Clone, PartialEq)]
pub enum Alternative {
    Block(Block),
    If(Box<IfStatement>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountingFor {
    pub iterator: Identifier,
    pub ty: Type,
    pub start: Expression,
    pub test: Expression,
    pub step: IncrementOperator,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEach {
    pub iterator: Identifier,
    pub collection: Expression,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub span: Span,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// cred, ket, absolute, transmission, void
    Named(Identifier),
    /// tome<T>
    Array(Box<Type>),
    /// holocron<K, V>
    Map { key: Box<Type>, value: Box<Type> },
    /// (T, U) -> R
    Function {
        parameters: Vec<Type>,
        return_type: Box<Type>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub span: Span,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(LiteralValue),
    Identifier(Identifier),
    Binary {
        lhs: Box<Expression>,
        operator: BinaryOperatorKind,
        rhs: Box<Expression>,
    },
    Unary {
        operator: UnaryOperatorKind,
        operand: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Subscript {
        base: Box<Expression>,
        index: Box<Expression>,
    },
    /// [1, 2, 3]
    Array(Vec<Expression>),
    /// tome<cred>[]
    EmptyArray(Box<Type>),
    /// <1: "one", 2: "two">
    Map(Vec<(Expression, Expression)>),
}

/// A literal's value, decoded once by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl core::fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Boolean(true) => write!(f, "light"),
            Self::Boolean(false) => write!(f, "dark"),
            Self::String(value) => write!(f, "{value:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperatorKind {
    Add,                  // +
    Subtract,             // -
    Multiply,             // *
    Divide,               // /
    Modulus,              // %
    Power,                // **
    Equals,               // == or onewith
    NotEquals,            // !=
    LessThan,             // <
    LessThanOrEqualTo,    // <=
    GreaterThan,          // >
    GreaterThanOrEqualTo, // >=
    LogicalAnd,           // and
    LogicalOr,            // or
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperatorClass {
    Arithmetic,
    Relational,
    Equality,
    Logical,
}

impl BinaryOperatorKind {
    pub fn class(self) -> BinaryOperatorClass {
        match self {
            Self::Add
            | Self::Subtract
            | Self::Multiply
            | Self::Divide
            | Self::Modulus
            | Self::Power => BinaryOperatorClass::Arithmetic,
            Self::LessThan
            | Self::LessThanOrEqualTo
            | Self::GreaterThan
            | Self::GreaterThanOrEqualTo => BinaryOperatorClass::Relational,
            Self::Equals | Self::NotEquals => BinaryOperatorClass::Equality,
            Self::LogicalAnd | Self::LogicalOr => BinaryOperatorClass::Logical,
        }
    }
}

impl core::fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Subtract => write!(f, "-"),
            Self::Multiply => write!(f, "*"),
            Self::Divide => write!(f, "/"),
            Self::Modulus => write!(f, "%"),
            Self::Power => write!(f, "**"),
            Self::Equals => write!(f, "=="),
            Self::NotEquals => write!(f, "!="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqualTo => write!(f, "<="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqualTo => write!(f, ">="),
            Self::LogicalAnd => write!(f, "and"),
            Self::LogicalOr => write!(f, "or"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperatorKind {
    LogicalNot, // darth
    Negate,     // -
}

impl core::fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LogicalNot => write!(f, "darth"),
            Self::Negate => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOperator {
    Increment, // ++
    Decrement, // --
}

impl core::fmt::Display for IncrementOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increment => write!(f, "++"),
            Self::Decrement => write!(f, "--"),
        }
    }
}
