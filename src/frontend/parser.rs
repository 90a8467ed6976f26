use super::{error::SyntaxError, intern::InternedSymbol};
use crate::frontend::{
    SourceFile,
    ast::{
        Alternative, BinaryOperatorKind, Block, CountingFor, Expression, ExpressionKind, ForEach,
        FunctionDeclaration, Identifier, IfStatement, IncrementOperator, LiteralValue, Parameter,
        Program, Statement, StatementKind, Type, TypeKind, UnaryOperatorKind, VariableDeclaration,
    },
    lexer::{Keyword, Lexer, Span, Token, TokenKind},
};

type ParseResult<T> = Result<T, SyntaxError>;

#[derive(Debug)]
pub struct Parser<'source> {
    lexer: Lexer<'source>,
}

impl<'source> Parser<'source> {
    pub fn parse_program(source_file: &'source SourceFile) -> ParseResult<Program> {
        let mut parser = Self {
            lexer: Lexer::new(source_file),
        };

        let mut statements = Vec::new();

        while parser.lexer.peek()?.is_some() {
            statements.push(parser.parse_statement()?);
        }

        log::debug!("parsed {} top level statements", statements.len());

        Ok(Program { statements })
    }

    fn source(&self) -> &'source SourceFile {
        self.lexer.source()
    }

    fn error_at(&self, span: Span, message: impl Into<String>) -> SyntaxError {
        self.lexer.error_at(span.start, message)
    }

    fn unexpected(&self, token: &Token, expecting: &str) -> SyntaxError {
        self.error_at(
            token.span,
            format!(
                "Expected {expecting} but found {:?} ({})",
                token.kind,
                self.source().value_of_span(token.span)
            ),
        )
    }

    fn end_of_file(&self, expecting: &str) -> SyntaxError {
        self.lexer.error_at(
            self.source().contents.len(),
            format!("Expected {expecting} but reached end of file"),
        )
    }

    fn expect_peek(&mut self, expecting: &str) -> ParseResult<Token> {
        match self.lexer.peek()? {
            Some(token) => Ok(token),
            None => Err(self.end_of_file(expecting)),
        }
    }

    fn expect_next(&mut self, expecting: &str) -> ParseResult<Token> {
        match self.lexer.next()? {
            Some(token) => Ok(token),
            None => Err(self.end_of_file(expecting)),
        }
    }

    fn expect_next_to_be(&mut self, kind: TokenKind) -> ParseResult<Token> {
        let token = self.expect_next(&format!("{kind:?}"))?;

        if token.kind != kind {
            return Err(self.unexpected(&token, &format!("{kind:?}")));
        }

        Ok(token)
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<Token> {
        self.expect_next_to_be(TokenKind::Keyword(keyword))
    }

    fn peek_is(&mut self, kind: TokenKind) -> ParseResult<bool> {
        Ok(self.lexer.peek()?.is_some_and(|t| t.kind == kind))
    }

    fn peek_nth_is(&mut self, n: usize, kind: TokenKind) -> ParseResult<bool> {
        Ok(self.lexer.peek_nth(n)?.is_some_and(|t| t.kind == kind))
    }

    /// A `(` only continues a call when it starts on the line the callee ends
    /// on. On a new line it opens a function type.
    fn peek_call_on_same_line(&mut self, callee: &Expression) -> ParseResult<bool> {
        let source = self.source();

        Ok(self.lexer.peek()?.is_some_and(|next| {
            next.kind == TokenKind::OpenParen
                && source.row_for_position(next.span.start)
                    == source.row_for_position(callee.span.end)
        }))
    }

    /// Consumes the next token if it has the given kind
    fn eat(&mut self, kind: TokenKind) -> ParseResult<Option<Token>> {
        if self.peek_is(kind)? {
            return self.lexer.next();
        }

        Ok(None)
    }

    fn peek_starts_type(&mut self) -> ParseResult<bool> {
        Ok(self
            .lexer
            .peek()?
            .is_some_and(|t| t.kind.is_type_keyword() || t.kind == TokenKind::OpenParen))
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let peeked = self.expect_peek("statement")?;

        match peeked.kind {
            kind if kind.is_type_keyword() || kind == TokenKind::OpenParen => {
                self.parse_variable_declaration()
            }
            TokenKind::Keyword(Keyword::Const) => self.parse_variable_declaration(),
            TokenKind::Keyword(Keyword::Order) => {
                if self.peek_nth_is(1, TokenKind::Identifier)?
                    && self.peek_nth_is(2, TokenKind::Equals)?
                {
                    self.parse_variable_declaration()
                } else {
                    self.parse_function_declaration()
                }
            }
            TokenKind::Identifier => self.parse_simple_statement(),
            TokenKind::Keyword(Keyword::Emit) => {
                let keyword = self.expect_keyword(Keyword::Emit)?;
                let argument = self.parse_expression()?;

                Ok(Statement {
                    span: keyword.span.to(argument.span),
                    kind: StatementKind::Print(Box::new(argument)),
                })
            }
            TokenKind::Keyword(Keyword::Execute) => self.parse_return_statement(),
            TokenKind::Keyword(Keyword::Unleash) => {
                let keyword = self.expect_keyword(Keyword::Unleash)?;

                Ok(Statement {
                    span: keyword.span,
                    kind: StatementKind::Break,
                })
            }
            TokenKind::Keyword(Keyword::Endure) => {
                let keyword = self.expect_keyword(Keyword::Endure)?;

                Ok(Statement {
                    span: keyword.span,
                    kind: StatementKind::Continue,
                })
            }
            TokenKind::Keyword(Keyword::Should) => {
                let keyword = self.expect_keyword(Keyword::Should)?;
                let statement = self.parse_if_statement()?;
                let end = match &statement.alternative {
                    Some(Alternative::Block(block)) => block.span,
                    Some(Alternative::If(_)) | None => statement.consequent.span,
                };

                Ok(Statement {
                    span: keyword.span.to(end),
                    kind: StatementKind::If(Box::new(statement)),
                })
            }
            TokenKind::Keyword(Keyword::As) => {
                let keyword = self.expect_keyword(Keyword::As)?;
                let test = self.parse_expression()?;
                let body = self.parse_block()?;

                Ok(Statement {
                    span: keyword.span.to(body.span),
                    kind: StatementKind::While {
                        test: Box::new(test),
                        body,
                    },
                })
            }
            TokenKind::Keyword(Keyword::Force) => self.parse_for_statement(),
            _ => Err(self.unexpected(&peeked, "statement")),
        }
    }

    /// Type name = expression
    /// const ( Type )? name = expression
    /// order name = expression
    fn parse_variable_declaration(&mut self) -> ParseResult<Statement> {
        let start = self.expect_peek("variable declaration")?.span;

        let (read_only, ty) = if self.eat(TokenKind::Keyword(Keyword::Const))?.is_some() {
            let ty = if self.peek_starts_type()? {
                Some(self.parse_type()?)
            } else {
                None
            };

            (true, ty)
        } else if self.eat(TokenKind::Keyword(Keyword::Order))?.is_some() {
            (false, None)
        } else {
            (false, Some(self.parse_type()?))
        };

        let name = self.parse_identifier()?;
        self.expect_next_to_be(TokenKind::Equals)?;
        let initializer = self.parse_expression()?;

        Ok(Statement {
            span: start.to(initializer.span),
            kind: StatementKind::VariableDeclaration(Box::new(VariableDeclaration {
                read_only,
                name,
                ty,
                initializer,
            })),
        })
    }

    /// order ( Type )? name ( Type param, ... ) { ... }
    fn parse_function_declaration(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect_keyword(Keyword::Order)?;

        // Without a return type the name comes straight after the keyword
        let return_type = if self.peek_is(TokenKind::Identifier)?
            && self.peek_nth_is(1, TokenKind::OpenParen)?
        {
            None
        } else {
            Some(self.parse_type()?)
        };

        let name = self.parse_identifier()?;

        self.expect_next_to_be(TokenKind::OpenParen)?;

        let mut parameters = Vec::new();

        if !self.peek_is(TokenKind::CloseParen)? {
            parameters.push(self.parse_parameter()?);

            while self.eat(TokenKind::Comma)?.is_some() {
                parameters.push(self.parse_parameter()?);
            }
        }

        self.expect_next_to_be(TokenKind::CloseParen)?;

        let body = self.parse_block()?;

        Ok(Statement {
            span: keyword.span.to(body.span),
            kind: StatementKind::FunctionDeclaration(Box::new(FunctionDeclaration {
                name,
                parameters,
                return_type,
                body,
            })),
        })
    }

    // cred x
    fn parse_parameter(&mut self) -> ParseResult<Parameter> {
        let ty = self.parse_type()?;
        let name = self.parse_identifier()?;

        Ok(Parameter {
            span: ty.span.to(name.span),
            name,
            ty,
        })
    }

    /// Statements that start with an identifier: assignments, increments and
    /// call statements
    fn parse_simple_statement(&mut self) -> ParseResult<Statement> {
        let target = self.parse_postfix_expression()?;

        if self.eat(TokenKind::Equals)?.is_some() {
            if !matches!(
                target.kind,
                ExpressionKind::Identifier(_) | ExpressionKind::Subscript { .. }
            ) {
                return Err(self.error_at(target.span, "Invalid assignment target"));
            }

            let source = self.parse_expression()?;

            return Ok(Statement {
                span: target.span.to(source.span),
                kind: StatementKind::Assignment {
                    target: Box::new(target),
                    source: Box::new(source),
                },
            });
        }

        let operator = if let Some(token) = self.eat(TokenKind::Increment)? {
            Some((IncrementOperator::Increment, token))
        } else {
            self.eat(TokenKind::Decrement)?
                .map(|token| (IncrementOperator::Decrement, token))
        };

        if let Some((operator, token)) = operator {
            let ExpressionKind::Identifier(identifier) = target.kind else {
                return Err(self.error_at(
                    target.span,
                    format!("Only variables can be used with {operator}"),
                ));
            };

            return Ok(Statement {
                span: target.span.to(token.span),
                kind: StatementKind::Increment {
                    target: identifier,
                    operator,
                },
            });
        }

        if matches!(target.kind, ExpressionKind::Call { .. }) {
            return Ok(Statement {
                span: target.span,
                kind: StatementKind::Call(Box::new(target)),
            });
        }

        Err(self.error_at(
            target.span,
            "Expected an assignment, increment, or call statement",
        ))
    }

    /// execute ( expression )?
    ///
    /// The returned expression has to start on the same line as the keyword,
    /// otherwise this is a short return.
    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect_keyword(Keyword::Execute)?;

        let has_value = match self.lexer.peek()? {
            Some(next) => {
                self.source().row_for_position(next.span.start)
                    == self.source().row_for_position(keyword.span.start)
                    && starts_expression(next.kind)
            }
            None => false,
        };

        if !has_value {
            return Ok(Statement {
                span: keyword.span,
                kind: StatementKind::ShortReturn,
            });
        }

        let expression = self.parse_expression()?;

        Ok(Statement {
            span: keyword.span.to(expression.span),
            kind: StatementKind::Return(Box::new(expression)),
        })
    }

    /// expression BLOCK ( "altshould" expression BLOCK )* ( "elseshould" BLOCK )?
    ///
    /// Called after the `should` or `altshould` keyword is consumed.
    fn parse_if_statement(&mut self) -> ParseResult<IfStatement> {
        let test = self.parse_expression()?;
        let consequent = self.parse_block()?;

        let alternative = if self
            .eat(TokenKind::Keyword(Keyword::Altshould))?
            .is_some()
        {
            Some(Alternative::If(Box::new(self.parse_if_statement()?)))
        } else if self
            .eat(TokenKind::Keyword(Keyword::Elseshould))?
            .is_some()
        {
            Some(Alternative::Block(self.parse_block()?))
        } else {
            None
        };

        Ok(IfStatement {
            test,
            consequent,
            alternative,
        })
    }

    /// "force" "(" Type name "=" expression ";" expression ";" name ( "++" | "--" ) ")" BLOCK
    /// "force" "(" name "in" expression ")" BLOCK
    fn parse_for_statement(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect_keyword(Keyword::Force)?;
        self.expect_next_to_be(TokenKind::OpenParen)?;

        if self.peek_is(TokenKind::Identifier)?
            && self.peek_nth_is(1, TokenKind::Keyword(Keyword::In))?
        {
            let iterator = self.parse_identifier()?;
            self.expect_keyword(Keyword::In)?;
            let collection = self.parse_expression()?;
            self.expect_next_to_be(TokenKind::CloseParen)?;
            let body = self.parse_block()?;

            return Ok(Statement {
                span: keyword.span.to(body.span),
                kind: StatementKind::ForEach(Box::new(ForEach {
                    iterator,
                    collection,
                    body,
                })),
            });
        }

        let ty = self.parse_type()?;
        let iterator = self.parse_identifier()?;
        self.expect_next_to_be(TokenKind::Equals)?;
        let start = self.parse_expression()?;
        self.expect_next_to_be(TokenKind::Semicolon)?;
        let test = self.parse_expression()?;
        self.expect_next_to_be(TokenKind::Semicolon)?;

        let stepped = self.parse_identifier()?;
        if stepped.symbol != iterator.symbol {
            return Err(self.error_at(
                stepped.span,
                format!(
                    "Loop must step its own iterator `{}` but steps `{}`",
                    iterator.symbol, stepped.symbol
                ),
            ));
        }

        let step_token = self.expect_next("increment or decrement")?;
        let step = match step_token.kind {
            TokenKind::Increment => IncrementOperator::Increment,
            TokenKind::Decrement => IncrementOperator::Decrement,
            _ => return Err(self.unexpected(&step_token, "increment or decrement")),
        };

        self.expect_next_to_be(TokenKind::CloseParen)?;
        let body = self.parse_block()?;

        Ok(Statement {
            span: keyword.span.to(body.span),
            kind: StatementKind::CountingFor(Box::new(CountingFor {
                iterator,
                ty,
                start,
                test,
                step,
                body,
            })),
        })
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        let open_brace = self.expect_next_to_be(TokenKind::OpenBrace)?;

        let mut statements = Vec::new();

        while self.expect_peek("statement or closing brace")?.kind != TokenKind::CloseBrace {
            statements.push(self.parse_statement()?);
        }

        let close_brace = self.expect_next_to_be(TokenKind::CloseBrace)?;

        Ok(Block {
            span: open_brace.span.to(close_brace.span),
            statements,
        })
    }

    fn parse_identifier(&mut self) -> ParseResult<Identifier> {
        let token = self.expect_next_to_be(TokenKind::Identifier)?;

        Ok(Identifier {
            span: token.span,
            symbol: InternedSymbol::new(self.source().value_of_span(token.span)),
        })
    }

    // type = "cred" | "ket" | "absolute" | "transmission" | "void"
    //        | "tome" "<" type ">"
    //        | "holocron" "<" type "," type ">"
    //        | "(" ( type ( "," type )* )? ")" "->" type
    fn parse_type(&mut self) -> ParseResult<Type> {
        let token = self.expect_next("type")?;

        match token.kind {
            TokenKind::Keyword(
                Keyword::Cred
                | Keyword::Ket
                | Keyword::Absolute
                | Keyword::Transmission
                | Keyword::Void,
            ) => Ok(Type {
                span: token.span,
                kind: TypeKind::Named(Identifier {
                    span: token.span,
                    symbol: InternedSymbol::new(self.source().value_of_span(token.span)),
                }),
            }),
            TokenKind::Keyword(Keyword::Tome) => {
                self.expect_next_to_be(TokenKind::LessThan)?;
                let element = self.parse_type()?;
                let close = self.expect_next_to_be(TokenKind::GreaterThan)?;

                Ok(Type {
                    span: token.span.to(close.span),
                    kind: TypeKind::Array(Box::new(element)),
                })
            }
            TokenKind::Keyword(Keyword::Holocron) => {
                self.expect_next_to_be(TokenKind::LessThan)?;
                let key = self.parse_type()?;
                self.expect_next_to_be(TokenKind::Comma)?;
                let value = self.parse_type()?;
                let close = self.expect_next_to_be(TokenKind::GreaterThan)?;

                Ok(Type {
                    span: token.span.to(close.span),
                    kind: TypeKind::Map {
                        key: Box::new(key),
                        value: Box::new(value),
                    },
                })
            }
            TokenKind::OpenParen => {
                let mut parameters = Vec::new();

                if !self.peek_is(TokenKind::CloseParen)? {
                    parameters.push(self.parse_type()?);

                    while self.eat(TokenKind::Comma)?.is_some() {
                        parameters.push(self.parse_type()?);
                    }
                }

                self.expect_next_to_be(TokenKind::CloseParen)?;
                self.expect_next_to_be(TokenKind::Arrow)?;
                let return_type = self.parse_type()?;

                Ok(Type {
                    span: token.span.to(return_type.span),
                    kind: TypeKind::Function {
                        parameters,
                        return_type: Box::new(return_type),
                    },
                })
            }
            _ => Err(self.unexpected(&token, "type")),
        }
    }

    /// expression     -> logical_or
    /// logical_or     -> logical_and ( "or" logical_and )*
    /// logical_and    -> equality ( "and" equality )*
    /// equality       -> relational ( ( "==" | "onewith" | "!=" ) relational )?
    /// relational     -> term ( ( "<" | "<=" | ">" | ">=" ) term )?
    /// term           -> factor ( ( "+" | "-" ) factor )*
    /// factor         -> unary ( ( "*" | "/" | "%" ) unary )*
    /// unary          -> ( "-" | "darth" ) unary | power
    /// power          -> postfix ( "**" unary )?
    /// postfix        -> atom ( "(" arguments ")" | "[" expression "]" )*
    /// atom           -> IDENTIFIER | NUMBER | STRING | BOOL
    ///                   | "(" expression ")"
    ///                   | "[" expression ( "," expression )* "]"
    ///                   | "<" term ":" term ( "," term ":" term )* ">"
    ///                   | "tome" "<" type ">" "[" "]"
    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_logical_or_expression()
    }

    fn parse_logical_or_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.parse_logical_and_expression()?;

        while self.eat(TokenKind::Keyword(Keyword::Or))?.is_some() {
            let rhs = self.parse_logical_and_expression()?;
            expression = binary(expression, BinaryOperatorKind::LogicalOr, rhs);
        }

        Ok(expression)
    }

    fn parse_logical_and_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.parse_equality_expression()?;

        while self.eat(TokenKind::Keyword(Keyword::And))?.is_some() {
            let rhs = self.parse_equality_expression()?;
            expression = binary(expression, BinaryOperatorKind::LogicalAnd, rhs);
        }

        Ok(expression)
    }

    fn parse_equality_expression(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_relational_expression()?;

        if !self
            .lexer
            .peek()?
            .is_some_and(|t| t.kind.is_equality_operator())
        {
            return Ok(expression);
        }

        let operator = match self.expect_next("equality operator")?.kind {
            TokenKind::NotEquals => BinaryOperatorKind::NotEquals,
            _ => BinaryOperatorKind::Equals,
        };
        let rhs = self.parse_relational_expression()?;

        Ok(binary(expression, operator, rhs))
    }

    fn parse_relational_expression(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_term_expression()?;

        if !self
            .lexer
            .peek()?
            .is_some_and(|t| t.kind.is_relational_operator())
        {
            return Ok(expression);
        }

        let operator = match self.expect_next("relational operator")?.kind {
            TokenKind::LessThan => BinaryOperatorKind::LessThan,
            TokenKind::LessThanOrEqualTo => BinaryOperatorKind::LessThanOrEqualTo,
            TokenKind::GreaterThan => BinaryOperatorKind::GreaterThan,
            TokenKind::GreaterThanOrEqualTo => BinaryOperatorKind::GreaterThanOrEqualTo,
            _ => unreachable!("peeked a relational operator"),
        };
        let rhs = self.parse_term_expression()?;

        Ok(binary(expression, operator, rhs))
    }

    fn parse_term_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.parse_factor_expression()?;

        while self
            .lexer
            .peek()?
            .is_some_and(|t| t.kind.is_term_operator())
        {
            let operator = match self.expect_next("term operator")?.kind {
                TokenKind::Plus => BinaryOperatorKind::Add,
                _ => BinaryOperatorKind::Subtract,
            };
            let rhs = self.parse_factor_expression()?;
            expression = binary(expression, operator, rhs);
        }

        Ok(expression)
    }

    fn parse_factor_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.parse_unary_expression()?;

        while self
            .lexer
            .peek()?
            .is_some_and(|t| t.kind.is_factor_operator())
        {
            let operator = match self.expect_next("factor operator")?.kind {
                TokenKind::Asterisk => BinaryOperatorKind::Multiply,
                TokenKind::Divide => BinaryOperatorKind::Divide,
                _ => BinaryOperatorKind::Modulus,
            };
            let rhs = self.parse_unary_expression()?;
            expression = binary(expression, operator, rhs);
        }

        Ok(expression)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Expression> {
        if self
            .lexer
            .peek()?
            .is_some_and(|t| t.kind.is_unary_operator())
        {
            let token = self.expect_next("unary operator")?;
            let operator = match token.kind {
                TokenKind::Minus => UnaryOperatorKind::Negate,
                _ => UnaryOperatorKind::LogicalNot,
            };
            let operand = self.parse_unary_expression()?;

            return Ok(Expression {
                span: token.span.to(operand.span),
                kind: ExpressionKind::Unary {
                    operator,
                    operand: Box::new(operand),
                },
            });
        }

        self.parse_power_expression()
    }

    fn parse_power_expression(&mut self) -> ParseResult<Expression> {
        let base = self.parse_postfix_expression()?;

        if self.eat(TokenKind::DoubleAsterisk)?.is_none() {
            return Ok(base);
        }

        // Right associative: the exponent may itself be a power
        let exponent = self.parse_unary_expression()?;

        Ok(binary(base, BinaryOperatorKind::Power, exponent))
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.parse_atomic_expression()?;

        loop {
            if self.peek_call_on_same_line(&expression)? {
                self.expect_next_to_be(TokenKind::OpenParen)?;
                let mut arguments = Vec::new();

                if !self.peek_is(TokenKind::CloseParen)? {
                    arguments.push(self.parse_expression()?);

                    while self.eat(TokenKind::Comma)?.is_some() {
                        arguments.push(self.parse_expression()?);
                    }
                }

                let close_paren = self.expect_next_to_be(TokenKind::CloseParen)?;

                expression = Expression {
                    span: expression.span.to(close_paren.span),
                    kind: ExpressionKind::Call {
                        callee: Box::new(expression),
                        arguments,
                    },
                };
            } else if self.eat(TokenKind::OpenBracket)?.is_some() {
                let index = self.parse_expression()?;
                let close_bracket = self.expect_next_to_be(TokenKind::CloseBracket)?;

                expression = Expression {
                    span: expression.span.to(close_bracket.span),
                    kind: ExpressionKind::Subscript {
                        base: Box::new(expression),
                        index: Box::new(index),
                    },
                };
            } else {
                return Ok(expression);
            }
        }
    }

    fn parse_atomic_expression(&mut self) -> ParseResult<Expression> {
        let peeked = self.expect_peek("expression")?;

        match peeked.kind {
            TokenKind::Identifier => {
                let identifier = self.parse_identifier()?;

                Ok(Expression {
                    span: identifier.span,
                    kind: ExpressionKind::Identifier(identifier),
                })
            }
            TokenKind::OpenParen => {
                let open_paren = self.expect_next_to_be(TokenKind::OpenParen)?;
                let expression = self.parse_expression()?;
                let close_paren = self.expect_next_to_be(TokenKind::CloseParen)?;

                Ok(Expression {
                    span: open_paren.span.to(close_paren.span),
                    kind: expression.kind,
                })
            }
            TokenKind::OpenBracket => {
                let open_bracket = self.expect_next_to_be(TokenKind::OpenBracket)?;

                if self.peek_is(TokenKind::CloseBracket)? {
                    return Err(self.error_at(
                        open_bracket.span,
                        "Empty arrays need an element type, write tome<T>[]",
                    ));
                }

                let mut elements = vec![self.parse_expression()?];

                while self.eat(TokenKind::Comma)?.is_some() {
                    elements.push(self.parse_expression()?);
                }

                let close_bracket = self.expect_next_to_be(TokenKind::CloseBracket)?;

                Ok(Expression {
                    span: open_bracket.span.to(close_bracket.span),
                    kind: ExpressionKind::Array(elements),
                })
            }
            TokenKind::LessThan => {
                let open = self.expect_next_to_be(TokenKind::LessThan)?;

                let mut entries = vec![self.parse_map_entry()?];

                while self.eat(TokenKind::Comma)?.is_some() {
                    entries.push(self.parse_map_entry()?);
                }

                let close = self.expect_next_to_be(TokenKind::GreaterThan)?;

                Ok(Expression {
                    span: open.span.to(close.span),
                    kind: ExpressionKind::Map(entries),
                })
            }
            TokenKind::Keyword(Keyword::Tome) => {
                let ty = self.parse_type()?;
                self.expect_next_to_be(TokenKind::OpenBracket)?;
                let close_bracket = self.expect_next_to_be(TokenKind::CloseBracket)?;

                let TypeKind::Array(element) = ty.kind else {
                    unreachable!("`tome` always parses to an array type")
                };

                Ok(Expression {
                    span: ty.span.to(close_bracket.span),
                    kind: ExpressionKind::EmptyArray(element),
                })
            }
            TokenKind::BooleanLiteral
            | TokenKind::IntegerLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral => self.parse_literal(),
            _ => Err(self.unexpected(&peeked, "expression")),
        }
    }

    // key: value
    fn parse_map_entry(&mut self) -> ParseResult<(Expression, Expression)> {
        let key = self.parse_term_expression()?;
        self.expect_next_to_be(TokenKind::Colon)?;
        let value = self.parse_term_expression()?;

        Ok((key, value))
    }

    fn parse_literal(&mut self) -> ParseResult<Expression> {
        let token = self.expect_next("literal")?;
        let text = self.source().value_of_span(token.span);

        let value = match token.kind {
            TokenKind::BooleanLiteral => LiteralValue::Boolean(text == "light"),
            TokenKind::IntegerLiteral => LiteralValue::Integer(text.parse().map_err(|_| {
                self.error_at(token.span, format!("Integer literal `{text}` is too large"))
            })?),
            TokenKind::FloatLiteral => LiteralValue::Float(text.parse().map_err(|_| {
                self.error_at(token.span, format!("Invalid float literal `{text}`"))
            })?),
            TokenKind::StringLiteral => LiteralValue::String(
                unescape(&text[1..text.len() - 1])
                    .map_err(|message| self.error_at(token.span, message))?,
            ),
            _ => return Err(self.unexpected(&token, "literal")),
        };

        Ok(Expression {
            span: token.span,
            kind: ExpressionKind::Literal(value),
        })
    }
}

fn binary(lhs: Expression, operator: BinaryOperatorKind, rhs: Expression) -> Expression {
    Expression {
        span: lhs.span.to(rhs.span),
        kind: ExpressionKind::Binary {
            lhs: Box::new(lhs),
            operator,
            rhs: Box::new(rhs),
        },
    }
}

fn starts_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::BooleanLiteral
            | TokenKind::IntegerLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::OpenParen
            | TokenKind::OpenBracket
            | TokenKind::LessThan
            | TokenKind::Minus
            | TokenKind::Keyword(Keyword::Darth | Keyword::Tome)
    )
}

/// Decodes the escape sequences of a string literal body
fn unescape(raw: &str) -> Result<String, String> {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('"') => value.push('"'),
            Some('\'') => value.push('\''),
            Some('\\') => value.push('\\'),
            Some(other) => return Err(format!("Unknown escape sequence `\\{other}`")),
            None => return Err("Unterminated escape sequence".to_owned()),
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::parse_program(&SourceFile::from_memory(source)).unwrap()
    }

    fn parse_error(source: &str) -> SyntaxError {
        Parser::parse_program(&SourceFile::from_memory(source)).unwrap_err()
    }

    fn only_expression(source: &str) -> ExpressionKind {
        let program = parse(&format!("emit {source}"));

        let [statement] = program.statements.as_slice() else {
            panic!("expected a single statement");
        };
        let StatementKind::Print(expression) = &statement.kind else {
            panic!("expected a print statement");
        };

        expression.kind.clone()
    }

    #[test]
    fn power_is_right_associative_and_binds_tighter_than_negation() {
        let ExpressionKind::Unary {
            operator: UnaryOperatorKind::Negate,
            operand,
        } = only_expression("-2 ** 3 ** 2")
        else {
            panic!("expected negation at the root");
        };

        let ExpressionKind::Binary {
            operator: BinaryOperatorKind::Power,
            rhs,
            ..
        } = operand.kind
        else {
            panic!("expected a power");
        };

        assert!(matches!(
            rhs.kind,
            ExpressionKind::Binary {
                operator: BinaryOperatorKind::Power,
                ..
            }
        ));
    }

    #[test]
    fn onewith_is_equality() {
        assert!(matches!(
            only_expression("1 onewith 2"),
            ExpressionKind::Binary {
                operator: BinaryOperatorKind::Equals,
                ..
            }
        ));
    }

    #[test]
    fn logical_operators_are_left_associative() {
        let ExpressionKind::Binary {
            lhs,
            operator: BinaryOperatorKind::LogicalOr,
            ..
        } = only_expression("a or b or c and d")
        else {
            panic!("expected `or` at the root");
        };

        assert!(matches!(
            lhs.kind,
            ExpressionKind::Binary {
                operator: BinaryOperatorKind::LogicalOr,
                ..
            }
        ));
    }

    #[test]
    fn parses_collection_literals() {
        assert!(matches!(only_expression("[1, 2, 3]"), ExpressionKind::Array(e) if e.len() == 3));
        assert!(matches!(only_expression("<1: \"a\", 2: \"b\">"), ExpressionKind::Map(e) if e.len() == 2));
        assert!(matches!(
            only_expression("tome<cred>[]"),
            ExpressionKind::EmptyArray(_)
        ));
    }

    #[test]
    fn decodes_string_escapes() {
        assert_eq!(
            only_expression(r#""a\"b\n""#),
            ExpressionKind::Literal(LiteralValue::String("a\"b\n".to_owned()))
        );
    }

    #[test]
    fn distinguishes_declarations() {
        let program = parse(
            "order cred f(cred x) { execute x }\n\
             order g = f\n\
             order h() { execute }\n\
             const pi2 = 6.28\n\
             (cred) -> cred k = f",
        );

        let kinds = program
            .statements
            .iter()
            .map(|s| match &s.kind {
                StatementKind::FunctionDeclaration(_) => "function",
                StatementKind::VariableDeclaration(_) => "variable",
                _ => "other",
            })
            .collect::<Vec<_>>();

        assert_eq!(
            kinds,
            vec!["function", "variable", "function", "variable", "variable"]
        );
    }

    #[test]
    fn function_typed_declaration_after_an_expression() {
        let program = parse("cred y = 1\n(cred) -> cred k = f\nprint(y)");

        let kinds = program
            .statements
            .iter()
            .map(|s| match &s.kind {
                StatementKind::VariableDeclaration(_) => "variable",
                _ => "other",
            })
            .collect::<Vec<_>>();

        assert_eq!(kinds, vec!["variable", "variable", "other"]);
    }

    #[test]
    fn execute_on_its_own_line_is_a_short_return() {
        let program = parse("order f() {\n  execute\n}\norder cred g() {\n  execute 1\n}");

        let bodies = program
            .statements
            .iter()
            .map(|s| match &s.kind {
                StatementKind::FunctionDeclaration(f) => f.body.statements[0].kind.clone(),
                _ => panic!("expected functions"),
            })
            .collect::<Vec<_>>();

        assert_eq!(bodies[0], StatementKind::ShortReturn);
        assert!(matches!(bodies[1], StatementKind::Return(_)));
    }

    #[test]
    fn else_if_chains_nest() {
        let program = parse("should a { emit 1 } altshould b { emit 2 } elseshould { emit 3 }");

        let StatementKind::If(statement) = &program.statements[0].kind else {
            panic!("expected an if statement");
        };
        let Some(Alternative::If(nested)) = &statement.alternative else {
            panic!("expected a nested if");
        };

        assert!(matches!(nested.alternative, Some(Alternative::Block(_))));
    }

    #[test]
    fn parses_both_loop_forms() {
        let program = parse(
            "force (cred i = 0; i < 10; i++) { emit i }\nforce (x in xs) { unleash }",
        );

        assert!(matches!(
            program.statements[0].kind,
            StatementKind::CountingFor(_)
        ));
        assert!(matches!(program.statements[1].kind, StatementKind::ForEach(_)));
    }

    #[test]
    fn rejects_loops_stepping_another_variable() {
        let error = parse_error("force (cred i = 0; i < 10; j++) { }");
        assert!(error.message.contains("must step its own iterator"));
    }

    #[test]
    fn rejects_non_statement_expressions() {
        let error = parse_error("x + 1");
        assert_eq!(error.line, 1);
        assert_eq!(error.column, 1);
    }

    #[test]
    fn rejects_oversized_integers() {
        let error = parse_error("emit 99999999999999999999");
        assert!(error.message.contains("too large"));
    }

    #[test]
    fn reports_unexpected_end_of_file() {
        let error = parse_error("should light {");
        assert!(error.message.contains("reached end of file"));
    }
}
