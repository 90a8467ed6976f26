//! Semantic analysis. Walks the syntax tree once, resolving every name
//! against the scope stack and computing the type of every expression. The
//! result is a new decorated tree; the syntax tree is left untouched. The first
//! rule violation aborts the walk.

use strum::IntoEnumIterator;

use super::{
    error::{IllegalControlFlow, SemanticError, TypeMismatch},
    hir::{self, Entity, EntityId, Expression, ExpressionKind, Function, Variable},
    primitive::PrimitiveKind,
    scope::{Binding, ScopeKind, ScopeStack},
    stdlib::LibraryItem,
    ty::{Type, TypeKind},
};
use crate::{
    frontend::{
        ast::{self, BinaryOperatorClass, BinaryOperatorKind, UnaryOperatorKind},
        intern::InternedSymbol,
    },
    index::IndexVec,
};

type AnalysisResult<T> = Result<T, SemanticError>;

#[derive(Debug)]
pub struct Analyzer {
    entities: IndexVec<EntityId, Entity>,
    scopes: ScopeStack,
}

impl Analyzer {
    /// Checks the program and produces its decorated form.
    ///
    /// The root scope is seeded with the primitive type names and the
    /// standard library before any user statement is looked at, so user code
    /// can neither shadow nor redeclare them.
    pub fn analyze_program(program: &ast::Program) -> AnalysisResult<hir::Program> {
        let mut analyzer = Self {
            entities: IndexVec::new(),
            scopes: ScopeStack::new(),
        };

        analyzer.bind_built_ins()?;

        log::debug!(
            "analyzing program with {} top level statements",
            program.statements.len()
        );

        let statements = analyzer.analyze_statements(&program.statements)?;

        Ok(hir::Program {
            entities: analyzer.entities,
            statements,
        })
    }

    fn bind_built_ins(&mut self) -> AnalysisResult<()> {
        for primitive in PrimitiveKind::iter() {
            self.scopes.add(
                InternedSymbol::new(&primitive.to_string()),
                Binding::Type(primitive.ty()),
            )?;
        }

        for item in LibraryItem::iter() {
            let id = self.entities.push(item.entity());
            self.scopes
                .add(InternedSymbol::new(item.name()), Binding::Entity(id))?;
        }

        Ok(())
    }

    fn declare(&mut self, name: InternedSymbol, entity: Entity) -> AnalysisResult<EntityId> {
        if self.scopes.sees(name) {
            return Err(SemanticError::DuplicateDeclaration(name.value().to_owned()));
        }

        log::debug!("declaring {name}: {}", entity.ty());

        let id = self.entities.push(entity);
        self.scopes.add(name, Binding::Entity(id))?;

        Ok(id)
    }

    fn variable(&self, id: EntityId) -> Option<&Variable> {
        match &self.entities[id] {
            Entity::Variable(variable) => Some(variable),
            Entity::Function(_) => None,
        }
    }

    /* Types */

    /// Resolves a written type. `void` is only accepted where a return type is
    /// expected.
    fn resolve_type(&self, ty: &ast::Type, allow_void: bool) -> AnalysisResult<Type> {
        match &ty.kind {
            ast::TypeKind::Named(identifier) => {
                let resolved = self.scopes.lookup_type(identifier.symbol)?;

                if !allow_void && matches!(**resolved, TypeKind::Void) {
                    return Err(TypeMismatch::VoidValue.into());
                }

                Ok(resolved.clone())
            }
            ast::TypeKind::Array(element) => Ok(Type::array(self.resolve_type(element, false)?)),
            ast::TypeKind::Map { key, value } => Ok(Type::map(
                self.resolve_type(key, false)?,
                self.resolve_type(value, false)?,
            )),
            ast::TypeKind::Function {
                parameters,
                return_type,
            } => {
                let parameters = parameters
                    .iter()
                    .map(|parameter| self.resolve_type(parameter, false))
                    .collect::<AnalysisResult<Vec<_>>>()?;

                Ok(Type::function(
                    parameters,
                    self.resolve_type(return_type, true)?,
                ))
            }
        }
    }

    fn expect_type(&self, expression: &Expression, expected: &Type) -> AnalysisResult<()> {
        if !expression.ty.is_equivalent_to(expected) {
            return Err(TypeMismatch::expected(expected, &expression.ty).into());
        }

        Ok(())
    }

    fn expect_assignable(&self, source: &Type, target: &Type) -> AnalysisResult<()> {
        if !source.is_assignable_to(target) {
            return Err(TypeMismatch::not_assignable(source, target).into());
        }

        Ok(())
    }

    fn expect_not_void(&self, expression: &Expression) -> AnalysisResult<()> {
        if matches!(*expression.ty, TypeKind::Void) {
            return Err(TypeMismatch::VoidValue.into());
        }

        Ok(())
    }

    /* Statements */

    fn analyze_statements(
        &mut self,
        statements: &[ast::Statement],
    ) -> AnalysisResult<Vec<hir::Statement>> {
        statements
            .iter()
            .map(|statement| self.analyze_statement(statement))
            .collect()
    }

    /// Analyzes a block in a fresh scope nested in the current one
    fn analyze_block(
        &mut self,
        block: &ast::Block,
        kind: ScopeKind,
    ) -> AnalysisResult<Vec<hir::Statement>> {
        self.scopes.push_scope(kind);
        let statements = self.analyze_statements(&block.statements)?;
        self.scopes.pop_scope();

        Ok(statements)
    }

    fn analyze_statement(&mut self, statement: &ast::Statement) -> AnalysisResult<hir::Statement> {
        match &statement.kind {
            ast::StatementKind::VariableDeclaration(declaration) => {
                self.analyze_variable_declaration(declaration)
            }
            ast::StatementKind::FunctionDeclaration(declaration) => {
                self.analyze_function_declaration(declaration)
            }
            ast::StatementKind::Assignment { target, source } => {
                let target = self.analyze_expression(target)?;

                if let ExpressionKind::Entity(id) = target.kind {
                    if !self.variable(id).is_some_and(|variable| !variable.read_only) {
                        return Err(SemanticError::ConstAssignment(
                            self.entities[id].name().value().to_owned(),
                        ));
                    }
                }

                let source = self.analyze_expression(source)?;
                self.expect_assignable(&source.ty, &target.ty)?;

                Ok(hir::Statement::Assignment { target, source })
            }
            ast::StatementKind::Increment { target, operator } => {
                let id = match self.scopes.lookup(target.symbol)? {
                    Binding::Entity(id) => *id,
                    Binding::Type(ty) => return Err(TypeMismatch::expected("value", ty).into()),
                };

                let Some(variable) = self.variable(id) else {
                    return Err(SemanticError::ConstAssignment(target.symbol.value().to_owned()));
                };

                if variable.read_only {
                    return Err(SemanticError::ConstAssignment(target.symbol.value().to_owned()));
                }

                if !matches!(*variable.ty, TypeKind::Integer) {
                    return Err(TypeMismatch::expected(Type::integer(), &variable.ty).into());
                }

                Ok(hir::Statement::Increment {
                    variable: id,
                    operator: *operator,
                })
            }
            ast::StatementKind::Call(call) => Ok(hir::Statement::Call(self.analyze_expression(call)?)),
            ast::StatementKind::Print(argument) => {
                let argument = self.analyze_expression(argument)?;
                self.expect_not_void(&argument)?;

                Ok(hir::Statement::Print(argument))
            }
            ast::StatementKind::Return(value) => {
                let return_type = self.current_return_type()?;

                if matches!(*return_type, TypeKind::Void) {
                    return Err(IllegalControlFlow::ValueInVoidFunction.into());
                }

                let value = self.analyze_expression(value)?;
                self.expect_assignable(&value.ty, &return_type)?;

                Ok(hir::Statement::Return(value))
            }
            ast::StatementKind::ShortReturn => {
                let return_type = self.current_return_type()?;

                if !matches!(*return_type, TypeKind::Void) {
                    return Err(IllegalControlFlow::MissingReturnValue.into());
                }

                Ok(hir::Statement::ShortReturn)
            }
            ast::StatementKind::Break => {
                if !self.scopes.in_loop() {
                    return Err(IllegalControlFlow::OutsideLoop("unleash").into());
                }

                Ok(hir::Statement::Break)
            }
            ast::StatementKind::Continue => {
                if !self.scopes.in_loop() {
                    return Err(IllegalControlFlow::OutsideLoop("endure").into());
                }

                Ok(hir::Statement::Continue)
            }
            ast::StatementKind::If(statement) => Ok(hir::Statement::If(self.analyze_if(statement)?)),
            ast::StatementKind::While { test, body } => {
                let test = self.analyze_expression(test)?;
                self.expect_type(&test, &Type::boolean())?;

                let body = self.analyze_block(body, ScopeKind::Loop)?;

                Ok(hir::Statement::While { test, body })
            }
            ast::StatementKind::CountingFor(statement) => self.analyze_counting_for(statement),
            ast::StatementKind::ForEach(statement) => {
                let collection = self.analyze_expression(&statement.collection)?;

                let TypeKind::Array(element) = &*collection.ty else {
                    return Err(TypeMismatch::expected("tome", &collection.ty).into());
                };
                let element = element.clone();

                self.scopes.push_scope(ScopeKind::Loop);

                let iterator = self.declare(
                    statement.iterator.symbol,
                    Entity::Variable(Variable {
                        name: statement.iterator.symbol,
                        read_only: true,
                        ty: element,
                        library: None,
                    }),
                )?;
                let body = self.analyze_statements(&statement.body.statements)?;

                self.scopes.pop_scope();

                Ok(hir::Statement::ForEach {
                    iterator,
                    collection,
                    body,
                })
            }
        }
    }

    fn analyze_variable_declaration(
        &mut self,
        declaration: &ast::VariableDeclaration,
    ) -> AnalysisResult<hir::Statement> {
        // The initializer cannot see the variable being declared
        let initializer = self.analyze_expression(&declaration.initializer)?;

        let ty = match &declaration.ty {
            Some(ty) => {
                let ty = self.resolve_type(ty, false)?;
                self.expect_assignable(&initializer.ty, &ty)?;
                ty
            }
            None => {
                self.expect_not_void(&initializer)?;

                // `order g = ...` has to hold a function, `const x = ...` takes
                // any value
                if !declaration.read_only && !matches!(*initializer.ty, TypeKind::Function { .. })
                {
                    return Err(TypeMismatch::expected("order", &initializer.ty).into());
                }

                initializer.ty.clone()
            }
        };

        let variable = self.declare(
            declaration.name.symbol,
            Entity::Variable(Variable {
                name: declaration.name.symbol,
                read_only: declaration.read_only,
                ty,
                library: None,
            }),
        )?;

        Ok(hir::Statement::VariableDeclaration {
            variable,
            initializer,
        })
    }

    fn analyze_function_declaration(
        &mut self,
        declaration: &ast::FunctionDeclaration,
    ) -> AnalysisResult<hir::Statement> {
        let return_type = match &declaration.return_type {
            Some(ty) => self.resolve_type(ty, true)?,
            None => Type::void(),
        };

        let parameter_types = declaration
            .parameters
            .iter()
            .map(|parameter| self.resolve_type(&parameter.ty, false))
            .collect::<AnalysisResult<Vec<_>>>()?;

        // Declared before the body is analyzed so the function can call itself
        let function = self.declare(
            declaration.name.symbol,
            Entity::Function(Function {
                name: declaration.name.symbol,
                parameters: Vec::new(),
                return_type: return_type.clone(),
                ty: Type::function(parameter_types.clone(), return_type),
                library: None,
            }),
        )?;

        self.scopes.push_scope(ScopeKind::Function(function));

        let mut parameters = Vec::with_capacity(declaration.parameters.len());

        for (parameter, ty) in declaration.parameters.iter().zip(parameter_types) {
            parameters.push(self.declare(
                parameter.name.symbol,
                Entity::Variable(Variable {
                    name: parameter.name.symbol,
                    read_only: false,
                    ty,
                    library: None,
                }),
            )?);
        }

        if let Some(Entity::Function(entity)) = self.entities.get_mut(function) {
            entity.parameters = parameters;
        }

        let body = self.analyze_statements(&declaration.body.statements)?;

        self.scopes.pop_scope();

        Ok(hir::Statement::FunctionDeclaration { function, body })
    }

    fn current_return_type(&self) -> AnalysisResult<Type> {
        match self.scopes.function().map(|id| &self.entities[id]) {
            Some(Entity::Function(function)) => Ok(function.return_type.clone()),
            _ => Err(IllegalControlFlow::ReturnOutsideFunction.into()),
        }
    }

    /// An `altshould` is analyzed in the scope of the `should` it belongs to;
    /// only blocks open new scopes.
    fn analyze_if(&mut self, statement: &ast::IfStatement) -> AnalysisResult<hir::IfStatement> {
        let test = self.analyze_expression(&statement.test)?;
        self.expect_type(&test, &Type::boolean())?;

        let consequent = self.analyze_block(&statement.consequent, ScopeKind::Block)?;

        let alternative = match &statement.alternative {
            Some(ast::Alternative::Block(block)) => Some(hir::Alternative::Block(
                self.analyze_block(block, ScopeKind::Block)?,
            )),
            Some(ast::Alternative::If(nested)) => {
                Some(hir::Alternative::If(Box::new(self.analyze_if(nested)?)))
            }
            None => None,
        };

        Ok(hir::IfStatement {
            test,
            consequent,
            alternative,
        })
    }

    fn analyze_counting_for(&mut self, statement: &ast::CountingFor) -> AnalysisResult<hir::Statement> {
        let ty = self.resolve_type(&statement.ty, false)?;

        if !matches!(*ty, TypeKind::Integer) {
            return Err(TypeMismatch::expected(Type::integer(), &ty).into());
        }

        let start = self.analyze_expression(&statement.start)?;
        self.expect_assignable(&start.ty, &ty)?;

        self.scopes.push_scope(ScopeKind::Loop);

        // The body may read the iterator but only the loop steps it
        let iterator = self.declare(
            statement.iterator.symbol,
            Entity::Variable(Variable {
                name: statement.iterator.symbol,
                read_only: true,
                ty,
                library: None,
            }),
        )?;

        let test = self.analyze_expression(&statement.test)?;
        self.expect_type(&test, &Type::boolean())?;

        let body = self.analyze_statements(&statement.body.statements)?;

        self.scopes.pop_scope();

        Ok(hir::Statement::CountingFor {
            iterator,
            start,
            test,
            step: statement.step,
            body,
        })
    }

    /* Expressions */

    fn analyze_expression(&mut self, expression: &ast::Expression) -> AnalysisResult<Expression> {
        match &expression.kind {
            ast::ExpressionKind::Literal(value) => Ok(Expression::literal(value.clone())),
            ast::ExpressionKind::Identifier(identifier) => {
                match self.scopes.lookup(identifier.symbol)? {
                    Binding::Entity(id) => {
                        let id = *id;
                        Ok(Expression::entity(id, self.entities[id].ty().clone()))
                    }
                    Binding::Type(ty) => Err(TypeMismatch::expected("value", ty).into()),
                }
            }
            ast::ExpressionKind::Binary { lhs, operator, rhs } => {
                let lhs = self.analyze_expression(lhs)?;
                let rhs = self.analyze_expression(rhs)?;

                self.analyze_binary(lhs, *operator, rhs)
            }
            ast::ExpressionKind::Unary { operator, operand } => {
                let operand = self.analyze_expression(operand)?;

                match operator {
                    UnaryOperatorKind::Negate if !operand.ty.is_numeric() => {
                        return Err(TypeMismatch::expected("number", &operand.ty).into());
                    }
                    UnaryOperatorKind::LogicalNot => {
                        self.expect_type(&operand, &Type::boolean())?;
                    }
                    UnaryOperatorKind::Negate => {}
                }

                Ok(Expression {
                    ty: operand.ty.clone(),
                    kind: ExpressionKind::Unary {
                        operator: *operator,
                        operand: Box::new(operand),
                    },
                })
            }
            ast::ExpressionKind::Call { callee, arguments } => {
                let callee = self.analyze_expression(callee)?;

                let TypeKind::Function {
                    parameters,
                    return_type,
                    is_variadic,
                } = &*callee.ty
                else {
                    return Err(SemanticError::NotCallable);
                };

                let arguments = arguments
                    .iter()
                    .map(|argument| self.analyze_expression(argument))
                    .collect::<AnalysisResult<Vec<_>>>()?;

                if *is_variadic {
                    for argument in &arguments {
                        self.expect_not_void(argument)?;
                        self.expect_assignable(&argument.ty, &parameters[0])?;
                    }
                } else {
                    if parameters.len() != arguments.len() {
                        return Err(SemanticError::ArityMismatch {
                            parameters: parameters.len(),
                            arguments: arguments.len(),
                        });
                    }

                    for (argument, parameter) in arguments.iter().zip(parameters.iter()) {
                        self.expect_assignable(&argument.ty, parameter)?;
                    }
                }

                Ok(Expression {
                    ty: return_type.clone(),
                    kind: ExpressionKind::Call {
                        callee: Box::new(callee),
                        arguments,
                    },
                })
            }
            ast::ExpressionKind::Subscript { base, index } => {
                let base = self.analyze_expression(base)?;
                let index = self.analyze_expression(index)?;

                let ty = match &*base.ty {
                    TypeKind::Array(element) => {
                        self.expect_type(&index, &Type::integer())?;
                        element.clone()
                    }
                    TypeKind::Map { key, value } => {
                        self.expect_assignable(&index.ty, key)?;
                        value.clone()
                    }
                    _ => {
                        return Err(TypeMismatch::expected("tome or holocron", &base.ty).into());
                    }
                };

                Ok(Expression {
                    ty,
                    kind: ExpressionKind::Subscript {
                        base: Box::new(base),
                        index: Box::new(index),
                    },
                })
            }
            ast::ExpressionKind::Array(elements) => {
                let elements = elements
                    .iter()
                    .map(|element| self.analyze_expression(element))
                    .collect::<AnalysisResult<Vec<_>>>()?;

                let element_type = elements[0].ty.clone();
                self.expect_not_void(&elements[0])?;

                if !elements
                    .iter()
                    .all(|element| element.ty.is_equivalent_to(&element_type))
                {
                    return Err(TypeMismatch::ElementsDiffer.into());
                }

                Ok(Expression {
                    ty: Type::array(element_type),
                    kind: ExpressionKind::Array(elements),
                })
            }
            ast::ExpressionKind::EmptyArray(element) => Ok(Expression {
                ty: Type::array(self.resolve_type(element, false)?),
                kind: ExpressionKind::EmptyArray,
            }),
            ast::ExpressionKind::Map(entries) => {
                let entries = entries
                    .iter()
                    .map(|(key, value)| {
                        Ok((self.analyze_expression(key)?, self.analyze_expression(value)?))
                    })
                    .collect::<AnalysisResult<Vec<_>>>()?;

                let (first_key, first_value) = &entries[0];
                self.expect_not_void(first_key)?;
                self.expect_not_void(first_value)?;

                let key_type = first_key.ty.clone();
                let value_type = first_value.ty.clone();

                if !entries.iter().all(|(key, _)| key.ty.is_equivalent_to(&key_type)) {
                    return Err(TypeMismatch::KeysDiffer.into());
                }

                if !entries
                    .iter()
                    .all(|(_, value)| value.ty.is_equivalent_to(&value_type))
                {
                    return Err(TypeMismatch::ValuesDiffer.into());
                }

                Ok(Expression {
                    ty: Type::map(key_type, value_type),
                    kind: ExpressionKind::Map(entries),
                })
            }
        }
    }

    fn analyze_binary(
        &self,
        lhs: Expression,
        operator: BinaryOperatorKind,
        rhs: Expression,
    ) -> AnalysisResult<Expression> {
        let ty = match operator.class() {
            BinaryOperatorClass::Arithmetic => {
                let accepts_strings = operator == BinaryOperatorKind::Add;

                self.expect_operand(&lhs, accepts_strings)?;
                self.expect_operand(&rhs, accepts_strings)?;
                self.expect_same_types(&lhs, &rhs)?;

                lhs.ty.clone()
            }
            BinaryOperatorClass::Relational => {
                self.expect_operand(&lhs, true)?;
                self.expect_operand(&rhs, true)?;
                self.expect_same_types(&lhs, &rhs)?;

                Type::boolean()
            }
            BinaryOperatorClass::Equality => {
                self.expect_same_types(&lhs, &rhs)?;

                Type::boolean()
            }
            BinaryOperatorClass::Logical => {
                self.expect_type(&lhs, &Type::boolean())?;
                self.expect_type(&rhs, &Type::boolean())?;

                Type::boolean()
            }
        };

        Ok(Expression {
            ty,
            kind: ExpressionKind::Binary {
                lhs: Box::new(lhs),
                operator,
                rhs: Box::new(rhs),
            },
        })
    }

    /// Operands of arithmetic and relational operators are numbers, or for
    /// some operators strings
    fn expect_operand(&self, operand: &Expression, accepts_strings: bool) -> AnalysisResult<()> {
        if operand.ty.is_numeric() {
            return Ok(());
        }

        if accepts_strings {
            if matches!(*operand.ty, TypeKind::String) {
                return Ok(());
            }

            return Err(TypeMismatch::expected("number or transmission", &operand.ty).into());
        }

        Err(TypeMismatch::expected("number", &operand.ty).into())
    }

    fn expect_same_types(&self, lhs: &Expression, rhs: &Expression) -> AnalysisResult<()> {
        if !lhs.ty.is_equivalent_to(&rhs.ty) {
            return Err(TypeMismatch::OperandsDiffer.into());
        }

        Ok(())
    }
}
