//! The decorated tree produced by semantic analysis. Every name is resolved
//! to an entity and every expression carries its type. Spans are dropped; the
//! optimizer and the code generator only need the meaning of the program.

use super::{stdlib::LibraryItem, ty::Type};
use crate::{
    frontend::{
        ast::{BinaryOperatorKind, IncrementOperator, LiteralValue, UnaryOperatorKind},
        intern::InternedSymbol,
    },
    index::{IndexVec, simple_index},
};

pub mod pretty_print;

simple_index! {
    /// Identifies a variable or function. Two references to the same entity
    /// hold the same id.
    pub struct EntityId;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Every entity referenced by the program, including the standard library
    pub entities: IndexVec<EntityId, Entity>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Variable(Variable),
    Function(Function),
}

impl Entity {
    pub fn name(&self) -> InternedSymbol {
        match self {
            Entity::Variable(variable) => variable.name,
            Entity::Function(function) => function.name,
        }
    }

    pub fn ty(&self) -> &Type {
        match self {
            Entity::Variable(variable) => &variable.ty,
            Entity::Function(function) => &function.ty,
        }
    }

    /// Set for entities provided by the standard library
    pub fn library(&self) -> Option<LibraryItem> {
        match self {
            Entity::Variable(variable) => variable.library,
            Entity::Function(function) => function.library,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: InternedSymbol,
    pub read_only: bool,
    pub ty: Type,
    pub library: Option<LibraryItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: InternedSymbol,
    /// Parameter variables in declaration order. Empty for standard library
    /// functions, whose signature only lives in `ty`.
    pub parameters: Vec<EntityId>,
    pub return_type: Type,
    /// The full function type
    pub ty: Type,
    pub library: Option<LibraryItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    VariableDeclaration {
        variable: EntityId,
        initializer: Expression,
    },
    FunctionDeclaration {
        function: EntityId,
        body: Vec<Statement>,
    },
    Assignment {
        target: Expression,
        source: Expression,
    },
    Increment {
        variable: EntityId,
        operator: IncrementOperator,
    },
    Call(Expression),
    Print(Expression),
    Return(Expression),
    ShortReturn,
    Break,
    Continue,
    If(IfStatement),
    While {
        test: Expression,
        body: Vec<Statement>,
    },
    CountingFor {
        iterator: EntityId,
        start: Expression,
        test: Expression,
        step: IncrementOperator,
        body: Vec<Statement>,
    },
    ForEach {
        iterator: EntityId,
        collection: Expression,
        body: Vec<Statement>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Vec<Statement>,
    pub alternative: Option<Alternative>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alternative {
    Block(Vec<Statement>),
    If(Box<IfStatement>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub ty: Type,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(LiteralValue),
    /// A resolved reference to a variable or function
    Entity(EntityId),
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
    /// Indexing into a `tome` or a `holocron`; the base's type tells which
    Subscript {
        base: Box<Expression>,
        index: Box<Expression>,
    },
    Array(Vec<Expression>),
    /// An array with no elements. The element type lives in `ty`.
    EmptyArray,
    Map(Vec<(Expression, Expression)>),
}

impl Expression {
    pub fn literal(value: LiteralValue) -> Self {
        let ty = match value {
            LiteralValue::Integer(_) => Type::integer(),
            LiteralValue::Float(_) => Type::float(),
            LiteralValue::Boolean(_) => Type::boolean(),
            LiteralValue::String(_) => Type::string(),
        };

        Self {
            ty,
            kind: ExpressionKind::Literal(value),
        }
    }

    pub fn entity(id: EntityId, ty: Type) -> Self {
        Self {
            ty,
            kind: ExpressionKind::Entity(id),
        }
    }

    pub fn as_literal(&self) -> Option<&LiteralValue> {
        match &self.kind {
            ExpressionKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self.kind {
            ExpressionKind::Literal(LiteralValue::Boolean(value)) => Some(value),
            _ => None,
        }
    }

    /// True when evaluating the expression can have no side effects, which in
    /// this language means it contains no calls
    pub fn is_pure(&self) -> bool {
        match &self.kind {
            ExpressionKind::Literal(_) | ExpressionKind::Entity(_) | ExpressionKind::EmptyArray => {
                true
            }
            ExpressionKind::Binary { lhs, rhs, .. } => lhs.is_pure() && rhs.is_pure(),
            ExpressionKind::Unary { operand, .. } => operand.is_pure(),
            ExpressionKind::Call { .. } => false,
            ExpressionKind::Subscript { base, index } => base.is_pure() && index.is_pure(),
            ExpressionKind::Array(elements) => elements.iter().all(Expression::is_pure),
            ExpressionKind::Map(entries) => entries
                .iter()
                .all(|(key, value)| key.is_pure() && value.is_pure()),
        }
    }
}
