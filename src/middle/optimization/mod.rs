//! Semantics-preserving rewrites of the decorated tree. Each rule only looks at
//! a node whose children have already been rewritten, so optimizing an
//! optimized program gives back the same program.
//!
//! Statements can disappear or be replaced by the statements of one of their
//! blocks, which is why optimizing a statement produces a list that gets
//! spliced into the enclosing one.

mod fold;

pub use fold::{evaluate_binary, optimize_expression};

use super::hir::{
    Alternative, EntityId, Expression, ExpressionKind, IfStatement, Program, Statement,
};
use crate::frontend::ast::LiteralValue;

pub fn optimize_program(program: Program) -> Program {
    log::debug!("optimizing {} top-level statements", program.statements.len());

    Program {
        entities: program.entities,
        statements: optimize_statements(program.statements),
    }
}

pub fn optimize_statements(statements: Vec<Statement>) -> Vec<Statement> {
    statements.into_iter().flat_map(optimize_statement).collect()
}

pub fn optimize_statement(statement: Statement) -> Vec<Statement> {
    match statement {
        Statement::VariableDeclaration {
            variable,
            initializer,
        } => vec![Statement::VariableDeclaration {
            variable,
            initializer: optimize_expression(initializer),
        }],
        Statement::FunctionDeclaration { function, body } => {
            vec![Statement::FunctionDeclaration {
                function,
                body: optimize_statements(body),
            }]
        }
        Statement::Assignment { target, source } => {
            let target = optimize_expression(target);
            let source = optimize_expression(source);

            if target == source && target.is_pure() {
                log::trace!("removing self assignment");
                return Vec::new();
            }

            vec![Statement::Assignment { target, source }]
        }
        Statement::Call(call) => vec![Statement::Call(optimize_expression(call))],
        Statement::Print(value) => vec![Statement::Print(optimize_expression(value))],
        Statement::Return(value) => vec![Statement::Return(optimize_expression(value))],
        statement @ (Statement::Increment { .. }
        | Statement::ShortReturn
        | Statement::Break
        | Statement::Continue) => vec![statement],
        Statement::If(if_statement) => optimize_if(if_statement),
        Statement::While { test, body } => {
            let test = optimize_expression(test);

            if test.as_boolean() == Some(false) {
                log::trace!("removing loop that never runs");
                return Vec::new();
            }

            vec![Statement::While {
                test,
                body: optimize_statements(body),
            }]
        }
        Statement::CountingFor {
            iterator,
            start,
            test,
            step,
            body,
        } => {
            let start = optimize_expression(start);
            let test = optimize_expression(test);

            if test.as_boolean() == Some(false) || fails_on_entry(iterator, &start, &test) {
                log::trace!("removing loop that never runs");
                return Vec::new();
            }

            vec![Statement::CountingFor {
                iterator,
                start,
                test,
                step,
                body: optimize_statements(body),
            }]
        }
        Statement::ForEach {
            iterator,
            collection,
            body,
        } => {
            let collection = optimize_expression(collection);

            if matches!(collection.kind, ExpressionKind::EmptyArray) {
                log::trace!("removing loop over an empty array");
                return Vec::new();
            }

            vec![Statement::ForEach {
                iterator,
                collection,
                body: optimize_statements(body),
            }]
        }
    }
}

/// A conditional with a constant test is replaced by the branch that runs
fn optimize_if(if_statement: IfStatement) -> Vec<Statement> {
    let IfStatement {
        test,
        consequent,
        alternative,
    } = if_statement;

    let test = optimize_expression(test);
    let consequent = optimize_statements(consequent);

    let alternative = match alternative {
        Some(Alternative::Block(block)) => Some(Alternative::Block(optimize_statements(block))),
        Some(Alternative::If(nested)) => match <[Statement; 1]>::try_from(optimize_if(*nested)) {
            Ok([Statement::If(nested)]) => Some(Alternative::If(Box::new(nested))),
            Ok([statement]) => Some(Alternative::Block(vec![statement])),
            Err(statements) => Some(Alternative::Block(statements)),
        },
        None => None,
    };

    // An empty else block says nothing
    let alternative = alternative
        .filter(|alternative| !matches!(alternative, Alternative::Block(block) if block.is_empty()));

    match test.as_boolean() {
        Some(true) => consequent,
        Some(false) => match alternative {
            None => Vec::new(),
            Some(Alternative::Block(block)) => block,
            Some(Alternative::If(nested)) => vec![Statement::If(*nested)],
        },
        None => vec![Statement::If(IfStatement {
            test,
            consequent,
            alternative,
        })],
    }
}

/// Checks for loops like `force (cred i = 10; i < 5; i++)` whose test fails
/// for the starting value
fn fails_on_entry(iterator: EntityId, start: &Expression, test: &Expression) -> bool {
    let Some(LiteralValue::Integer(start)) = start.as_literal() else {
        return false;
    };

    let ExpressionKind::Binary { lhs, operator, rhs } = &test.kind else {
        return false;
    };

    if lhs.kind != ExpressionKind::Entity(iterator) {
        return false;
    }

    let Some(bound @ LiteralValue::Integer(_)) = rhs.as_literal() else {
        return false;
    };

    evaluate_binary(&LiteralValue::Integer(*start), *operator, bound)
        == Some(LiteralValue::Boolean(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        frontend::ast::{BinaryOperatorKind, IncrementOperator},
        index::Index,
        middle::ty::Type,
    };

    fn int(value: i64) -> Expression {
        Expression::literal(LiteralValue::Integer(value))
    }

    fn boolean(value: bool) -> Expression {
        Expression::literal(LiteralValue::Boolean(value))
    }

    fn variable(index: usize) -> Expression {
        Expression::entity(EntityId::new(index), Type::integer())
    }

    fn print(value: i64) -> Statement {
        Statement::Print(int(value))
    }

    fn less_than(lhs: Expression, rhs: Expression) -> Expression {
        Expression {
            ty: Type::boolean(),
            kind: ExpressionKind::Binary {
                lhs: Box::new(lhs),
                operator: BinaryOperatorKind::LessThan,
                rhs: Box::new(rhs),
            },
        }
    }

    fn if_statement(
        test: Expression,
        consequent: Vec<Statement>,
        alternative: Option<Alternative>,
    ) -> IfStatement {
        IfStatement {
            test,
            consequent,
            alternative,
        }
    }

    #[test]
    fn removes_self_assignment() {
        let statement = Statement::Assignment {
            target: variable(0),
            source: variable(0),
        };

        assert_eq!(optimize_statement(statement), Vec::new());
    }

    #[test]
    fn keeps_ordinary_assignment() {
        let statement = Statement::Assignment {
            target: variable(0),
            source: variable(1),
        };

        assert_eq!(optimize_statement(statement.clone()), vec![statement]);
    }

    #[test]
    fn splices_the_branch_that_runs() {
        let taken = Statement::If(if_statement(
            boolean(true),
            vec![print(1), print(2)],
            Some(Alternative::Block(vec![print(3)])),
        ));
        assert_eq!(optimize_statement(taken), vec![print(1), print(2)]);

        let not_taken = Statement::If(if_statement(
            boolean(false),
            vec![print(1)],
            Some(Alternative::Block(vec![print(3)])),
        ));
        assert_eq!(optimize_statement(not_taken), vec![print(3)]);

        let no_else = Statement::If(if_statement(boolean(false), vec![print(1)], None));
        assert_eq!(optimize_statement(no_else), Vec::new());
    }

    #[test]
    fn folds_nested_alternatives() {
        // should x < 1 {} altshould dark {} elseshould { print(3) }
        let statement = Statement::If(if_statement(
            less_than(variable(0), int(1)),
            vec![print(1)],
            Some(Alternative::If(Box::new(if_statement(
                boolean(false),
                vec![print(2)],
                Some(Alternative::Block(vec![print(3)])),
            )))),
        ));

        let expected = Statement::If(if_statement(
            less_than(variable(0), int(1)),
            vec![print(1)],
            Some(Alternative::Block(vec![print(3)])),
        ));

        assert_eq!(optimize_statement(statement), vec![expected.clone()]);
        assert_eq!(optimize_statement(expected.clone()), vec![expected]);
    }

    #[test]
    fn removes_loops_that_never_run() {
        let while_loop = Statement::While {
            test: less_than(int(2), int(1)),
            body: vec![print(1)],
        };
        assert_eq!(optimize_statement(while_loop), Vec::new());

        let counting = Statement::CountingFor {
            iterator: EntityId::new(0),
            start: int(10),
            test: less_than(variable(0), int(5)),
            step: IncrementOperator::Increment,
            body: vec![print(1)],
        };
        assert_eq!(optimize_statement(counting), Vec::new());

        let over_nothing = Statement::ForEach {
            iterator: EntityId::new(0),
            collection: Expression {
                ty: Type::array(Type::integer()),
                kind: ExpressionKind::EmptyArray,
            },
            body: vec![print(1)],
        };
        assert_eq!(optimize_statement(over_nothing), Vec::new());
    }

    #[test]
    fn keeps_loops_that_run() {
        let counting = Statement::CountingFor {
            iterator: EntityId::new(0),
            start: int(0),
            test: less_than(variable(0), int(5)),
            step: IncrementOperator::Increment,
            body: vec![print(1)],
        };

        assert_eq!(optimize_statement(counting.clone()), vec![counting]);
    }

    #[test]
    fn optimizes_loop_bodies() {
        let statement = Statement::While {
            test: less_than(variable(0), int(3)),
            body: vec![Statement::If(if_statement(boolean(true), vec![print(1)], None))],
        };

        assert_eq!(
            optimize_statement(statement),
            vec![Statement::While {
                test: less_than(variable(0), int(3)),
                body: vec![print(1)],
            }]
        );
    }
}
