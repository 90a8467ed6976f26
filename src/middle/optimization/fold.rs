//! Constant folding and algebraic simplification of expressions. Operands are
//! simplified before their parent, so a single bottom-up pass reaches a fixed
//! point.

use crate::{
    frontend::ast::{BinaryOperatorKind, LiteralValue, UnaryOperatorKind},
    middle::{
        hir::{Expression, ExpressionKind},
        ty::{Type, TypeKind},
    },
};

pub fn optimize_expression(expression: Expression) -> Expression {
    let Expression { ty, kind } = expression;

    match kind {
        ExpressionKind::Binary { lhs, operator, rhs } => fold_binary(
            ty,
            optimize_expression(*lhs),
            operator,
            optimize_expression(*rhs),
        ),
        ExpressionKind::Unary { operator, operand } => {
            fold_unary(ty, operator, optimize_expression(*operand))
        }
        ExpressionKind::Call { callee, arguments } => Expression {
            ty,
            kind: ExpressionKind::Call {
                callee: Box::new(optimize_expression(*callee)),
                arguments: arguments.into_iter().map(optimize_expression).collect(),
            },
        },
        ExpressionKind::Subscript { base, index } => Expression {
            ty,
            kind: ExpressionKind::Subscript {
                base: Box::new(optimize_expression(*base)),
                index: Box::new(optimize_expression(*index)),
            },
        },
        ExpressionKind::Array(elements) => Expression {
            ty,
            kind: ExpressionKind::Array(elements.into_iter().map(optimize_expression).collect()),
        },
        ExpressionKind::Map(entries) => Expression {
            ty,
            kind: ExpressionKind::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (optimize_expression(key), optimize_expression(value)))
                    .collect(),
            ),
        },
        kind @ (ExpressionKind::Literal(_) | ExpressionKind::Entity(_) | ExpressionKind::EmptyArray) => {
            Expression { ty, kind }
        }
    }
}

fn is_zero(expression: &Expression) -> bool {
    match expression.as_literal() {
        Some(LiteralValue::Integer(value)) => *value == 0,
        Some(LiteralValue::Float(value)) => *value == 0.0,
        _ => false,
    }
}

fn is_one(expression: &Expression) -> bool {
    match expression.as_literal() {
        Some(LiteralValue::Integer(value)) => *value == 1,
        Some(LiteralValue::Float(value)) => *value == 1.0,
        _ => false,
    }
}

fn one_of_type(ty: &Type) -> Option<Expression> {
    match **ty {
        TypeKind::Integer => Some(Expression::literal(LiteralValue::Integer(1))),
        TypeKind::Float => Some(Expression::literal(LiteralValue::Float(1.0))),
        _ => None,
    }
}

/// Rewrites that drop an operand only apply when that operand has no side
/// effects
fn fold_binary(
    ty: Type,
    lhs: Expression,
    operator: BinaryOperatorKind,
    rhs: Expression,
) -> Expression {
    use BinaryOperatorKind::*;

    if let (Some(l), Some(r)) = (lhs.as_literal(), rhs.as_literal()) {
        if let Some(value) = evaluate_binary(l, operator, r) {
            log::trace!("folded {l} {operator} {r} into {value}");
            return Expression::literal(value);
        }
    }

    match operator {
        LogicalAnd => match (lhs.as_boolean(), rhs.as_boolean()) {
            (Some(true), _) => return rhs,
            (_, Some(true)) => return lhs,
            // The right side never runs
            (Some(false), _) => return lhs,
            (_, Some(false)) if lhs.is_pure() => return rhs,
            _ => {}
        },
        LogicalOr => match (lhs.as_boolean(), rhs.as_boolean()) {
            (Some(false), _) => return rhs,
            (_, Some(false)) => return lhs,
            (Some(true), _) => return lhs,
            (_, Some(true)) if lhs.is_pure() => return rhs,
            _ => {}
        },
        Add if is_zero(&lhs) => return rhs,
        Add if is_zero(&rhs) => return lhs,
        Subtract if is_zero(&rhs) => return lhs,
        Subtract if is_zero(&lhs) => {
            return Expression {
                ty: rhs.ty.clone(),
                kind: ExpressionKind::Unary {
                    operator: UnaryOperatorKind::Negate,
                    operand: Box::new(rhs),
                },
            };
        }
        Multiply if is_one(&lhs) => return rhs,
        Multiply if is_one(&rhs) => return lhs,
        Multiply if is_zero(&lhs) && rhs.is_pure() => return lhs,
        Multiply if is_zero(&rhs) && lhs.is_pure() => return rhs,
        Divide if is_one(&rhs) => return lhs,
        Divide if is_zero(&lhs) && !is_zero(&rhs) && rhs.is_pure() => return lhs,
        Power if is_one(&lhs) && rhs.is_pure() => return lhs,
        Power if is_zero(&rhs) && lhs.is_pure() => {
            if let Some(one) = one_of_type(&ty) {
                return one;
            }
        }
        _ => {}
    }

    Expression {
        ty,
        kind: ExpressionKind::Binary {
            lhs: Box::new(lhs),
            operator,
            rhs: Box::new(rhs),
        },
    }
}

fn fold_unary(ty: Type, operator: UnaryOperatorKind, operand: Expression) -> Expression {
    let folded = match (operator, operand.as_literal()) {
        (UnaryOperatorKind::Negate, Some(LiteralValue::Integer(value))) => {
            value.checked_neg().map(LiteralValue::Integer)
        }
        (UnaryOperatorKind::Negate, Some(LiteralValue::Float(value))) => {
            Some(LiteralValue::Float(-value))
        }
        (UnaryOperatorKind::LogicalNot, Some(LiteralValue::Boolean(value))) => {
            Some(LiteralValue::Boolean(!value))
        }
        _ => None,
    };

    if let Some(value) = folded {
        return Expression::literal(value);
    }

    Expression {
        ty,
        kind: ExpressionKind::Unary {
            operator,
            operand: Box::new(operand),
        },
    }
}

/// Evaluates an operator applied to two literals. Returns `None` when the
/// result cannot be represented as a literal (overflow, division by zero,
/// non-finite floats) or when the operation is left for runtime.
pub fn evaluate_binary(
    lhs: &LiteralValue,
    operator: BinaryOperatorKind,
    rhs: &LiteralValue,
) -> Option<LiteralValue> {
    use BinaryOperatorKind::*;

    match (lhs, rhs) {
        (LiteralValue::Integer(a), LiteralValue::Integer(b)) => match operator {
            Add => a.checked_add(*b).map(LiteralValue::Integer),
            Subtract => a.checked_sub(*b).map(LiteralValue::Integer),
            Multiply => a.checked_mul(*b).map(LiteralValue::Integer),
            // Truncates toward zero
            Divide => a.checked_div(*b).map(LiteralValue::Integer),
            Modulus => a.checked_rem(*b).map(LiteralValue::Integer),
            Power => u32::try_from(*b)
                .ok()
                .and_then(|exponent| a.checked_pow(exponent))
                .map(LiteralValue::Integer),
            _ => compare(operator, a, b).map(LiteralValue::Boolean),
        },
        (LiteralValue::Float(a), LiteralValue::Float(b)) => {
            let value = match operator {
                Add => a + b,
                Subtract => a - b,
                Multiply => a * b,
                Divide => a / b,
                Modulus => a % b,
                Power => a.powf(*b),
                _ => return compare(operator, a, b).map(LiteralValue::Boolean),
            };

            value.is_finite().then_some(LiteralValue::Float(value))
        }
        (LiteralValue::Boolean(a), LiteralValue::Boolean(b)) => match operator {
            LogicalAnd => Some(LiteralValue::Boolean(*a && *b)),
            LogicalOr => Some(LiteralValue::Boolean(*a || *b)),
            Equals => Some(LiteralValue::Boolean(a == b)),
            NotEquals => Some(LiteralValue::Boolean(a != b)),
            _ => None,
        },
        (LiteralValue::String(a), LiteralValue::String(b)) => match operator {
            Add => Some(LiteralValue::String(format!("{a}{b}"))),
            Equals => Some(LiteralValue::Boolean(a == b)),
            NotEquals => Some(LiteralValue::Boolean(a != b)),
            _ => None,
        },
        _ => None,
    }
}

fn compare<T: PartialOrd>(operator: BinaryOperatorKind, a: &T, b: &T) -> Option<bool> {
    use BinaryOperatorKind::*;

    Some(match operator {
        Equals => a == b,
        NotEquals => a != b,
        LessThan => a < b,
        LessThanOrEqualTo => a <= b,
        GreaterThan => a > b,
        GreaterThanOrEqualTo => a >= b,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{index::Index, middle::hir::EntityId};

    fn int(value: i64) -> Expression {
        Expression::literal(LiteralValue::Integer(value))
    }

    fn float(value: f64) -> Expression {
        Expression::literal(LiteralValue::Float(value))
    }

    fn boolean(value: bool) -> Expression {
        Expression::literal(LiteralValue::Boolean(value))
    }

    fn x() -> Expression {
        Expression::entity(EntityId::new(0), Type::integer())
    }

    fn call() -> Expression {
        Expression {
            ty: Type::integer(),
            kind: ExpressionKind::Call {
                callee: Box::new(Expression::entity(
                    EntityId::new(1),
                    Type::function(Vec::new(), Type::integer()),
                )),
                arguments: Vec::new(),
            },
        }
    }

    fn binary(lhs: Expression, operator: BinaryOperatorKind, rhs: Expression) -> Expression {
        let ty = match operator.class() {
            crate::frontend::ast::BinaryOperatorClass::Arithmetic => lhs.ty.clone(),
            _ => Type::boolean(),
        };

        Expression {
            ty,
            kind: ExpressionKind::Binary {
                lhs: Box::new(lhs),
                operator,
                rhs: Box::new(rhs),
            },
        }
    }

    fn negate(operand: Expression) -> Expression {
        Expression {
            ty: operand.ty.clone(),
            kind: ExpressionKind::Unary {
                operator: UnaryOperatorKind::Negate,
                operand: Box::new(operand),
            },
        }
    }

    use BinaryOperatorKind::*;

    #[test]
    fn folds_integer_arithmetic() {
        assert_eq!(optimize_expression(binary(int(2), Add, int(3))), int(5));
        assert_eq!(optimize_expression(binary(int(7), Divide, int(2))), int(3));
        assert_eq!(optimize_expression(binary(int(-7), Modulus, int(3))), int(-1));
        assert_eq!(optimize_expression(binary(int(2), Power, int(10))), int(1024));
        assert_eq!(
            optimize_expression(binary(int(2), LessThan, int(3))),
            boolean(true)
        );
    }

    #[test]
    fn folds_float_arithmetic() {
        assert_eq!(
            optimize_expression(binary(float(1.5), Multiply, float(2.0))),
            float(3.0)
        );
        assert_eq!(
            optimize_expression(binary(float(5.0), Divide, float(8.0))),
            float(0.625)
        );
    }

    #[test]
    fn leaves_unrepresentable_results_alone() {
        let division_by_zero = binary(int(1), Divide, int(0));
        assert_eq!(optimize_expression(division_by_zero.clone()), division_by_zero);

        let overflow = binary(int(i64::MAX), Add, int(1));
        assert_eq!(optimize_expression(overflow.clone()), overflow);

        let negative_exponent = binary(int(2), Power, int(-1));
        assert_eq!(
            optimize_expression(negative_exponent.clone()),
            negative_exponent
        );

        let infinity = binary(float(1.0), Divide, float(0.0));
        assert_eq!(optimize_expression(infinity.clone()), infinity);
    }

    #[test]
    fn applies_additive_identities() {
        assert_eq!(optimize_expression(binary(x(), Add, int(0))), x());
        assert_eq!(optimize_expression(binary(int(0), Add, x())), x());
        assert_eq!(optimize_expression(binary(x(), Subtract, int(0))), x());
        assert_eq!(
            optimize_expression(binary(int(0), Subtract, x())),
            negate(x())
        );
    }

    #[test]
    fn applies_multiplicative_identities() {
        assert_eq!(optimize_expression(binary(x(), Multiply, int(1))), x());
        assert_eq!(optimize_expression(binary(int(1), Multiply, x())), x());
        assert_eq!(optimize_expression(binary(x(), Multiply, int(0))), int(0));
        assert_eq!(optimize_expression(binary(int(0), Multiply, x())), int(0));
        assert_eq!(optimize_expression(binary(x(), Divide, int(1))), x());
        assert_eq!(optimize_expression(binary(int(0), Divide, x())), int(0));
        assert_eq!(optimize_expression(binary(x(), Power, int(0))), int(1));
        assert_eq!(optimize_expression(binary(int(1), Power, x())), int(1));
    }

    #[test]
    fn keeps_calls_that_would_be_dropped() {
        let product = binary(call(), Multiply, int(0));
        assert_eq!(optimize_expression(product.clone()), product);
    }

    #[test]
    fn simplifies_logical_operators() {
        let b = || Expression::entity(EntityId::new(2), Type::boolean());

        assert_eq!(optimize_expression(binary(b(), LogicalAnd, boolean(true))), b());
        assert_eq!(
            optimize_expression(binary(b(), LogicalAnd, boolean(false))),
            boolean(false)
        );
        assert_eq!(
            optimize_expression(binary(boolean(false), LogicalAnd, b())),
            boolean(false)
        );
        assert_eq!(optimize_expression(binary(b(), LogicalOr, boolean(false))), b());
        assert_eq!(
            optimize_expression(binary(b(), LogicalOr, boolean(true))),
            boolean(true)
        );
        assert_eq!(
            optimize_expression(binary(
                binary(x(), LessThan, int(1)),
                LogicalAnd,
                boolean(false)
            )),
            boolean(false)
        );
    }

    #[test]
    fn folds_unary_operators() {
        assert_eq!(optimize_expression(negate(int(8))), int(-8));
        assert_eq!(optimize_expression(negate(float(2.5))), float(-2.5));

        let not = Expression {
            ty: Type::boolean(),
            kind: ExpressionKind::Unary {
                operator: UnaryOperatorKind::LogicalNot,
                operand: Box::new(boolean(true)),
            },
        };
        assert_eq!(optimize_expression(not), boolean(false));
    }

    #[test]
    fn folds_nested_expressions_bottom_up() {
        // (x + 0) * (2 + 3 - 4)
        let expression = binary(
            binary(x(), Add, int(0)),
            Multiply,
            binary(binary(int(2), Add, int(3)), Subtract, int(4)),
        );

        let optimized = optimize_expression(expression);

        assert_eq!(optimized, x());
        assert_eq!(optimize_expression(optimized.clone()), optimized);
    }

    #[test]
    fn folds_string_concatenation() {
        let hello = Expression::literal(LiteralValue::String("hello ".to_owned()));
        let there = Expression::literal(LiteralValue::String("there".to_owned()));

        assert_eq!(
            optimize_expression(binary(hello, Add, there)),
            Expression::literal(LiteralValue::String("hello there".to_owned()))
        );
    }
}
