use colored::Colorize;
use itertools::Itertools;

use super::{
    Alternative, Entity, EntityId, Expression, ExpressionKind, IfStatement, Program, Statement,
};
use crate::{
    frontend::ast::{LiteralValue, UnaryOperatorKind},
    index::Index,
};

/// Renders a decorated program in a syntax close to the source, with every
/// name suffixed by the id of the entity it resolved to (`x#3`)
pub fn pretty_print_program(program: &Program) -> String {
    let mut printer = PrettyPrinter {
        program,
        output: String::new(),
        depth: 0,
    };

    printer.statements(&program.statements);

    printer.output
}

struct PrettyPrinter<'a> {
    program: &'a Program,
    output: String,
    depth: usize,
}

impl PrettyPrinter<'_> {
    fn line(&mut self, text: impl core::fmt::Display) {
        for _ in 0..self.depth {
            self.output.push_str("    ");
        }

        self.output.push_str(&text.to_string());
        self.output.push('\n');
    }

    fn statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.statement(statement);
        }
    }

    /// Writes `header {` followed by the indented body. The closing brace is
    /// left to the caller so `elseshould` can follow it on the same line.
    fn block(&mut self, header: impl core::fmt::Display, body: &[Statement]) {
        self.line(format!("{header} {{"));
        self.depth += 1;
        self.statements(body);
        self.depth -= 1;
    }

    fn statement(&mut self, statement: &Statement) {
        let program = self.program;

        match statement {
            Statement::VariableDeclaration {
                variable,
                initializer,
            } => {
                let entity = &program.entities[*variable];
                let constant = match entity {
                    Entity::Variable(variable) if variable.read_only => {
                        format!("{} ", "const".magenta())
                    }
                    _ => String::new(),
                };

                self.line(format!(
                    "{constant}{} {} = {}",
                    entity.ty().colored(),
                    self.entity(*variable),
                    self.expression(initializer)
                ));
            }
            Statement::FunctionDeclaration { function, body } => {
                let Entity::Function(declared) = &program.entities[*function] else {
                    panic!("Function declaration bound to a variable");
                };

                let parameters = declared
                    .parameters
                    .iter()
                    .map(|parameter| {
                        format!(
                            "{} {}",
                            program.entities[*parameter].ty().colored(),
                            self.entity(*parameter)
                        )
                    })
                    .join(", ");

                self.block(
                    format!(
                        "{} {} {}({parameters})",
                        "order".magenta(),
                        declared.return_type.colored(),
                        self.entity(*function)
                    ),
                    body,
                );
                self.line("}");
            }
            Statement::Assignment { target, source } => self.line(format!(
                "{} = {}",
                self.expression(target),
                self.expression(source)
            )),
            Statement::Increment { variable, operator } => {
                self.line(format!("{}{operator}", self.entity(*variable)))
            }
            Statement::Call(call) => self.line(self.expression(call)),
            Statement::Print(value) => {
                self.line(format!("{} {}", "emit".magenta(), self.expression(value)))
            }
            Statement::Return(value) => {
                self.line(format!("{} {}", "execute".magenta(), self.expression(value)))
            }
            Statement::ShortReturn => self.line("execute".magenta()),
            Statement::Break => self.line("unleash".magenta()),
            Statement::Continue => self.line("endure".magenta()),
            Statement::If(if_statement) => {
                self.if_statement(if_statement, "");
                self.line("}");
            }
            Statement::While { test, body } => {
                self.block(
                    format!("{} {}", "as".magenta(), self.expression(test)),
                    body,
                );
                self.line("}");
            }
            Statement::CountingFor {
                iterator,
                start,
                test,
                step,
                body,
            } => {
                self.block(
                    format!(
                        "{} ({} {} = {}; {}; {}{step})",
                        "force".magenta(),
                        program.entities[*iterator].ty().colored(),
                        self.entity(*iterator),
                        self.expression(start),
                        self.expression(test),
                        self.entity(*iterator),
                    ),
                    body,
                );
                self.line("}");
            }
            Statement::ForEach {
                iterator,
                collection,
                body,
            } => {
                self.block(
                    format!(
                        "{} ({} {} {})",
                        "force".magenta(),
                        self.entity(*iterator),
                        "in".magenta(),
                        self.expression(collection)
                    ),
                    body,
                );
                self.line("}");
            }
        }
    }

    /// `prefix` is empty for the first branch and `} ` for the ones chained
    /// after it
    fn if_statement(&mut self, if_statement: &IfStatement, prefix: &str) {
        let keyword = if prefix.is_empty() {
            "should"
        } else {
            "altshould"
        };

        self.block(
            format!(
                "{prefix}{} {}",
                keyword.magenta(),
                self.expression(&if_statement.test)
            ),
            &if_statement.consequent,
        );

        match &if_statement.alternative {
            Some(Alternative::Block(block)) => {
                self.block(format!("}} {}", "elseshould".magenta()), block)
            }
            Some(Alternative::If(nested)) => self.if_statement(nested, "} "),
            None => {}
        }
    }

    fn entity(&self, id: EntityId) -> String {
        format!(
            "{}#{}",
            self.program.entities[id].name().value().blue(),
            id.index()
        )
    }

    fn expression(&self, expression: &Expression) -> String {
        match &expression.kind {
            ExpressionKind::Literal(value @ LiteralValue::String(_)) => {
                value.to_string().green().to_string()
            }
            ExpressionKind::Literal(value @ LiteralValue::Boolean(_)) => {
                value.to_string().magenta().to_string()
            }
            ExpressionKind::Literal(value) => value.to_string().purple().to_string(),
            ExpressionKind::Entity(id) => self.entity(*id),
            ExpressionKind::Binary { lhs, operator, rhs } => format!(
                "({} {operator} {})",
                self.expression(lhs),
                self.expression(rhs)
            ),
            ExpressionKind::Unary {
                operator: UnaryOperatorKind::LogicalNot,
                operand,
            } => format!("{} {}", "darth".magenta(), self.expression(operand)),
            ExpressionKind::Unary {
                operator: UnaryOperatorKind::Negate,
                operand,
            } => format!("-{}", self.expression(operand)),
            ExpressionKind::Call { callee, arguments } => format!(
                "{}({})",
                self.expression(callee),
                arguments
                    .iter()
                    .map(|argument| self.expression(argument))
                    .join(", ")
            ),
            ExpressionKind::Subscript { base, index } => {
                format!("{}[{}]", self.expression(base), self.expression(index))
            }
            ExpressionKind::Array(elements) => format!(
                "[{}]",
                elements
                    .iter()
                    .map(|element| self.expression(element))
                    .join(", ")
            ),
            ExpressionKind::EmptyArray => format!("{}[]", expression.ty.colored()),
            ExpressionKind::Map(entries) => format!(
                "<{}>",
                entries
                    .iter()
                    .map(|(key, value)| format!(
                        "{}: {}",
                        self.expression(key),
                        self.expression(value)
                    ))
                    .join(", ")
            ),
        }
    }
}
