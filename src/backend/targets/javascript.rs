use hashbrown::HashMap;
use itertools::Itertools;

use crate::{
    backend::targets::CodeGenerator,
    frontend::ast::{BinaryOperatorKind, LiteralValue, UnaryOperatorKind},
    middle::{
        hir::{
            Alternative, Entity, EntityId, Expression, ExpressionKind, IfStatement, Program,
            Statement,
        },
        stdlib::LibraryItem,
        ty::TypeKind,
    },
};

pub struct JavaScriptGenerator;

impl CodeGenerator for JavaScriptGenerator {
    fn translate(&self, program: &Program) -> String {
        let mut emitter = Emitter {
            program,
            names: HashMap::new(),
            output: String::new(),
            depth: 0,
        };

        log::debug!("generating javascript for {} statements", program.statements.len());

        emitter.statements(&program.statements);

        emitter.output
    }
}

fn library_name(item: LibraryItem) -> &'static str {
    match item {
        LibraryItem::Print => "console.log",
        LibraryItem::Sqrt => "Math.sqrt",
        LibraryItem::Sin => "Math.sin",
        LibraryItem::Cos => "Math.cos",
        LibraryItem::Pi => "Math.PI",
    }
}

struct Emitter<'a> {
    program: &'a Program,
    /// Suffixed names handed out so far. Entities are numbered in order of
    /// first appearance, starting at 1.
    names: HashMap<EntityId, String>,
    output: String,
    depth: usize,
}

impl Emitter<'_> {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.output.push_str("  ");
        }

        self.output.push_str(text.as_ref());
        self.output.push('\n');
    }

    fn statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.statement(statement);
        }
    }

    fn body(&mut self, statements: &[Statement]) {
        self.depth += 1;
        self.statements(statements);
        self.depth -= 1;
    }

    fn name(&mut self, id: EntityId) -> String {
        let entity = &self.program.entities[id];

        if let Some(item) = entity.library() {
            return library_name(item).to_owned();
        }

        let next = self.names.len() + 1;

        self.names
            .entry(id)
            .or_insert_with(|| format!("{}_{next}", entity.name()))
            .clone()
    }

    fn statement(&mut self, statement: &Statement) {
        let program = self.program;

        match statement {
            Statement::VariableDeclaration {
                variable,
                initializer,
            } => {
                // The analyzer already rejected writes to constants, so `let`
                // works for both
                let name = self.name(*variable);
                let initializer = self.expression(initializer);
                self.line(format!("let {name} = {initializer}"));
            }
            Statement::FunctionDeclaration { function, body } => {
                let name = self.name(*function);

                let parameters: &[EntityId] = match &program.entities[*function] {
                    Entity::Function(function) => function.parameters.as_slice(),
                    Entity::Variable(_) => &[],
                };
                let parameters = parameters.iter().map(|id| self.name(*id)).join(", ");

                self.line(format!("function {name}({parameters}) {{"));
                self.body(body);
                self.line("}");
            }
            Statement::Assignment { target, source } => {
                if let ExpressionKind::Subscript { base, index } = &target.kind {
                    if matches!(*base.ty, TypeKind::Map { .. }) {
                        let base = self.operand(base);
                        let index = self.expression(index);
                        let source = self.expression(source);
                        self.line(format!("{base}.set({index}, {source})"));
                        return;
                    }
                }

                let target = self.expression(target);
                let source = self.expression(source);
                self.line(format!("{target} = {source}"));
            }
            Statement::Increment { variable, operator } => {
                let name = self.name(*variable);
                self.line(format!("{name}{operator}"));
            }
            Statement::Call(call) => {
                let call = self.expression(call);
                self.line(call);
            }
            Statement::Print(value) => {
                let value = self.expression(value);
                self.line(format!("console.log({value})"));
            }
            Statement::Return(value) => {
                let value = self.expression(value);
                self.line(format!("return {value}"));
            }
            Statement::ShortReturn => self.line("return"),
            Statement::Break => self.line("break"),
            Statement::Continue => self.line("continue"),
            Statement::If(if_statement) => {
                self.if_statement(if_statement, "if");
                self.line("}");
            }
            Statement::While { test, body } => {
                let test = self.expression(test);
                self.line(format!("while ({test}) {{"));
                self.body(body);
                self.line("}");
            }
            Statement::CountingFor {
                iterator,
                start,
                test,
                step,
                body,
            } => {
                let iterator = self.name(*iterator);
                let start = self.expression(start);
                let test = self.expression(test);
                self.line(format!(
                    "for (let {iterator} = {start}; {test}; {iterator}{step}) {{"
                ));
                self.body(body);
                self.line("}");
            }
            Statement::ForEach {
                iterator,
                collection,
                body,
            } => {
                let iterator = self.name(*iterator);
                let collection = self.expression(collection);
                self.line(format!("for (const {iterator} of {collection}) {{"));
                self.body(body);
                self.line("}");
            }
        }
    }

    /// `header` is `if` for the first branch and `} else if` afterwards. The
    /// final closing brace is left to the caller.
    fn if_statement(&mut self, if_statement: &IfStatement, header: &str) {
        let test = self.expression(&if_statement.test);
        self.line(format!("{header} ({test}) {{"));
        self.body(&if_statement.consequent);

        match &if_statement.alternative {
            Some(Alternative::Block(block)) => {
                self.line("} else {");
                self.body(block);
            }
            Some(Alternative::If(nested)) => self.if_statement(nested, "} else if"),
            None => {}
        }
    }

    /// Renders an expression that appears as an operand of another operator,
    /// parenthesizing it when JavaScript's precedence could regroup it
    fn operand(&mut self, expression: &Expression) -> String {
        let needs_parentheses = match &expression.kind {
            ExpressionKind::Binary { .. } | ExpressionKind::Unary { .. } => true,
            ExpressionKind::Literal(LiteralValue::Integer(value)) => *value < 0,
            ExpressionKind::Literal(LiteralValue::Float(value)) => value.is_sign_negative(),
            _ => false,
        };

        let rendered = self.expression(expression);

        if needs_parentheses {
            format!("({rendered})")
        } else {
            rendered
        }
    }

    fn expression(&mut self, expression: &Expression) -> String {
        match &expression.kind {
            ExpressionKind::Literal(LiteralValue::Integer(value)) => value.to_string(),
            ExpressionKind::Literal(LiteralValue::Float(value)) => format!("{value:?}"),
            ExpressionKind::Literal(LiteralValue::Boolean(value)) => value.to_string(),
            ExpressionKind::Literal(LiteralValue::String(value)) => format!("{value:?}"),
            ExpressionKind::Entity(id) => self.name(*id),
            ExpressionKind::Binary { lhs, operator, rhs } => {
                let is_integer_division = *operator == BinaryOperatorKind::Divide
                    && matches!(*expression.ty, TypeKind::Integer);

                let lhs = self.operand(lhs);
                let rhs = self.operand(rhs);

                if is_integer_division {
                    return format!("Math.trunc({lhs} / {rhs})");
                }

                let operator = match operator {
                    BinaryOperatorKind::Equals => "===",
                    BinaryOperatorKind::NotEquals => "!==",
                    BinaryOperatorKind::LogicalAnd => "&&",
                    BinaryOperatorKind::LogicalOr => "||",
                    BinaryOperatorKind::Add => "+",
                    BinaryOperatorKind::Subtract => "-",
                    BinaryOperatorKind::Multiply => "*",
                    BinaryOperatorKind::Divide => "/",
                    BinaryOperatorKind::Modulus => "%",
                    BinaryOperatorKind::Power => "**",
                    BinaryOperatorKind::LessThan => "<",
                    BinaryOperatorKind::LessThanOrEqualTo => "<=",
                    BinaryOperatorKind::GreaterThan => ">",
                    BinaryOperatorKind::GreaterThanOrEqualTo => ">=",
                };

                format!("{lhs} {operator} {rhs}")
            }
            ExpressionKind::Unary { operator, operand } => {
                let operand = self.operand(operand);

                match operator {
                    UnaryOperatorKind::LogicalNot => format!("!{operand}"),
                    UnaryOperatorKind::Negate => format!("-{operand}"),
                }
            }
            ExpressionKind::Call { callee, arguments } => {
                let callee = self.operand(callee);
                let arguments = arguments
                    .iter()
                    .map(|argument| self.expression(argument))
                    .join(", ");

                format!("{callee}({arguments})")
            }
            ExpressionKind::Subscript { base, index } => {
                let is_map = matches!(*base.ty, TypeKind::Map { .. });
                let base = self.operand(base);
                let index = self.expression(index);

                if is_map {
                    format!("{base}.get({index})")
                } else {
                    format!("{base}[{index}]")
                }
            }
            ExpressionKind::Array(elements) => {
                let elements = elements
                    .iter()
                    .map(|element| self.expression(element))
                    .join(", ");

                format!("[{elements}]")
            }
            ExpressionKind::EmptyArray => "[]".to_owned(),
            ExpressionKind::Map(entries) => {
                let entries = entries
                    .iter()
                    .map(|(key, value)| {
                        format!("[{}, {}]", self.expression(key), self.expression(value))
                    })
                    .join(", ");

                format!("new Map([{entries}])")
            }
        }
    }
}
