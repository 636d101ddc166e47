use std::sync::Arc;

use indexmap::IndexMap;

use crate::ast::{
    BlockStatement, Expression, FunctionLiteral, Identifier, NacDefinition, NacField, NacMethod,
    Program, Statement, SwitchCase,
};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

use super::shortening::{shortened_identifier, MAX_IDENTIFIER_LENGTH};

/// Binding powers, lowest to highest. Operators missing from
/// [`Precedence::of`] (including `lazy`, which only ever parses as a prefix)
/// fall back to `Lowest` and therefore never bind as infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Assign,
    Lazy,
    AndOr,
    Comparison,
    SumAndProduct,
    Prefix,
    Call,
    MemberAccess,
    Index,
}

impl Precedence {
    fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::Assign => Precedence::Assign,
            TokenKind::Lazy => Precedence::Lazy,
            TokenKind::And | TokenKind::Or => Precedence::AndOr,
            TokenKind::GtEq => Precedence::Comparison,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Slash | TokenKind::Asterisk => {
                Precedence::SumAndProduct
            }
            TokenKind::Lparen => Precedence::Call,
            TokenKind::Period => Precedence::MemberAccess,
            TokenKind::Lbracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

/// A Pratt parser over the token stream. Errors are collected rather than
/// aborting: every error entry is prefixed with the offending token's
/// location and lexeme, and parsing resumes at the next statement.
pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<String>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Self {
            lexer,
            cur_token,
            peek_token,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while self.cur_token.kind != TokenKind::Eof {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }
        Program { statements }
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn cur_token_is(&self, kind: TokenKind) -> bool {
        self.cur_token.kind == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_token_is(kind) {
            self.next_token();
            true
        } else {
            let token = self.peek_token.clone();
            self.error_at(
                &token,
                format!(
                    "expected next token to be {}, got {} instead",
                    kind, token.kind
                ),
            );
            false
        }
    }

    fn error_at(&mut self, token: &Token, message: impl AsRef<str>) {
        self.errors.push(format!(
            "{} ({}): {}",
            token.location(),
            token.literal,
            message.as_ref()
        ));
    }

    /// Identifier rules: lowercase, no underscores, at most eight characters.
    /// A violation is reported with a shortening suggestion but the
    /// identifier is still accepted so parsing can continue.
    fn validate_identifier(&mut self, token: &Token) -> bool {
        let identifier = &token.literal;
        let complaint = if identifier.len() > MAX_IDENTIFIER_LENGTH {
            Some("Identifier must be at most eight characters long")
        } else if identifier.chars().any(|ch| ch.is_ascii_uppercase()) {
            Some("Identifier must not contain uppercase characters")
        } else if identifier.contains('_') {
            Some("Identifier must not contain underscores")
        } else {
            None
        };

        match complaint {
            Some(complaint) => {
                let message = format!(
                    "{}; consider using '{}' instead.\nSee https://github.com/jesseduffield/ok#familiarity-admits-brevity",
                    complaint,
                    shortened_identifier(identifier)
                );
                self.error_at(token, message);
                false
            }
            None => true,
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.kind {
            TokenKind::Nac => self.parse_nac_definition(),
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Comment => Some(self.parse_comment_statement()),
            _ => Some(self.parse_expression_statement()),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name_token = self.cur_token.clone();
        self.validate_identifier(&name_token);
        let name = Identifier {
            value: name_token.literal.clone(),
            token: name_token,
        };

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Statement::Let { token, name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Statement::Return { token, value })
    }

    fn parse_comment_statement(&mut self) -> Statement {
        let token = self.cur_token.clone();
        let text = token.literal.strip_prefix("//").unwrap_or(&token.literal);
        let text = text.strip_prefix(' ').unwrap_or(text).to_string();
        Statement::Comment { token, text }
    }

    fn parse_expression_statement(&mut self) -> Statement {
        let token = self.cur_token.clone();
        let expression = self.parse_expression(Precedence::Lowest);

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Statement::Expression { token, expression }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(TokenKind::Semicolon)
            && precedence < Precedence::of(self.peek_token.kind)
        {
            left = match self.peek_token.kind {
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Slash
                | TokenKind::Asterisk
                | TokenKind::GtEq
                | TokenKind::Assign => {
                    self.next_token();
                    self.parse_infix_expression(left)?
                }
                TokenKind::And | TokenKind::Or => {
                    self.next_token();
                    self.parse_logical_infix_expression(left)?
                }
                TokenKind::Lparen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                TokenKind::Lbracket => {
                    self.next_token();
                    self.parse_index_expression(left)?
                }
                TokenKind::Period => {
                    self.next_token();
                    self.parse_member_access_expression(left)?
                }
                _ => return Some(left),
            };
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.cur_token.kind {
            TokenKind::Ident => self.parse_identifier(),
            TokenKind::Int => self.parse_integer_literal(),
            TokenKind::Str => Some(Expression::StringLiteral {
                value: self.cur_token.literal.clone(),
                token: self.cur_token.clone(),
            }),
            TokenKind::True | TokenKind::False => Some(Expression::BooleanLiteral {
                value: self.cur_token_is(TokenKind::True),
                token: self.cur_token.clone(),
            }),
            TokenKind::Null => Some(Expression::NullLiteral {
                token: self.cur_token.clone(),
            }),
            TokenKind::Bang | TokenKind::Minus => self.parse_prefix_expression(),
            TokenKind::Lparen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => {
                let function = self.parse_function_literal()?;
                Some(Expression::FunctionLiteral(function))
            }
            TokenKind::Lbracket => self.parse_array_literal(),
            TokenKind::Lbrace => self.parse_hash_literal(),
            TokenKind::Switch => self.parse_switch_expression(),
            TokenKind::New => self.parse_struct_instantiation(),
            TokenKind::Lazy => self.parse_lazy_expression(),
            _ => {
                self.no_prefix_parse_error();
                None
            }
        }
    }

    fn no_prefix_parse_error(&mut self) {
        let token = self.cur_token.clone();
        let message = if token.kind == TokenKind::Illegal
            && matches!(token.literal.as_str(), "<" | ">" | "==" | "!=" | "<=")
        {
            format!(
                "Unexpected token '{}'. There is only one comparison operator: '>='.\nSee https://github.com/jesseduffield/ok#one-comparison-operator",
                token.literal
            )
        } else {
            format!("Unexpected token '{}'", token.literal)
        };
        self.error_at(&token, message);
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        self.validate_identifier(&token);
        Some(Expression::Identifier(Identifier {
            value: token.literal.clone(),
            token,
        }))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral { token, value }),
            Err(_) => {
                let message = format!("'{}' is not a valid integer", token.literal);
                self.error_at(&token, message);
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let operator = token.literal.clone();

        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix {
            token,
            operator,
            right: Box::new(right),
        })
    }

    fn parse_lazy_expression(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();

        self.next_token();
        let right = self.parse_expression(Precedence::Lazy)?;

        Some(Expression::Lazy {
            token,
            right: Arc::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::Rparen) {
            return None;
        }

        Some(expression)
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();
        let operator = token.literal.clone();
        let precedence = Precedence::of(token.kind);

        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            token,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// `&&` and `||` only accept bare identifiers (or further logical
    /// expressions) as operands, so that anything with side effects has to
    /// be named before it is short-circuited over.
    fn parse_logical_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let expression = self.parse_infix_expression(left)?;

        let Expression::Infix { left, right, .. } = &expression else {
            return None;
        };

        for (operand, side) in [(left.as_ref(), "Left"), (right.as_ref(), "Right")] {
            let allowed = match operand {
                Expression::Identifier(_) => true,
                Expression::Infix { operator, .. } => operator == "&&" || operator == "||",
                _ => false,
            };
            if !allowed {
                let rendered = operand.to_string();
                let location = operand.token().location();
                self.errors.push(format!(
                    "{} ({}): {} operand of logical expression must be a variable. Consider storing '{}' in a variable",
                    location, rendered, side, rendered
                ));
                return None;
            }
        }

        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::Lparen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::Rparen) {
            return None;
        }
        if !self.expect_peek(TokenKind::Lbrace) {
            return None;
        }
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token_is(TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::Lbrace) {
                return None;
            }
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expression::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_switch_expression(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        self.next_token();

        let subject = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::Lbrace) {
            return None;
        }
        self.next_token();

        let cases = self.parse_switch_cases()?;

        let default = if self.cur_token_is(TokenKind::Default) {
            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }
            Some(self.parse_switch_block()?)
        } else {
            None
        };

        Some(Expression::Switch {
            token,
            subject: Box::new(subject),
            cases,
            default,
        })
    }

    fn parse_switch_cases(&mut self) -> Option<Vec<SwitchCase>> {
        let mut cases = Vec::new();

        while self.cur_token_is(TokenKind::Case) {
            self.next_token();

            let value = self.parse_expression(Precedence::Lowest)?;

            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }

            let block = self.parse_switch_block()?;
            cases.push(SwitchCase { value, block });
        }

        Some(cases)
    }

    /// Like a regular block, but capped at one statement that is not a
    /// comment. Larger case bodies have to go through a function call.
    fn parse_switch_block(&mut self) -> Option<BlockStatement> {
        let token = self.cur_token.clone();
        let mut statements = Vec::new();

        self.next_token();

        while !matches!(
            self.cur_token.kind,
            TokenKind::Rbrace | TokenKind::Eof | TokenKind::Default | TokenKind::Case
        ) {
            let non_comment_count = statements
                .iter()
                .filter(|statement| !matches!(statement, Statement::Comment { .. }))
                .count();
            if non_comment_count >= 1 && self.cur_token.kind != TokenKind::Comment {
                let offending = self.cur_token.clone();
                self.error_at(
                    &offending,
                    "switch blocks can only contain a single statement. If you want to include multiple statements, use a function call\nSee https://github.com/jesseduffield/ok#readable-switches",
                );
                return None;
            }
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        Some(BlockStatement { token, statements })
    }

    fn parse_block_statement(&mut self) -> BlockStatement {
        let token = self.cur_token.clone();
        let mut statements = Vec::new();

        self.next_token();

        while !self.cur_token_is(TokenKind::Rbrace) && !self.cur_token_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        BlockStatement { token, statements }
    }

    fn parse_function_literal(&mut self) -> Option<Arc<FunctionLiteral>> {
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::Lparen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenKind::Lbrace) {
            return None;
        }
        let body = self.parse_block_statement();

        Some(Arc::new(FunctionLiteral {
            token,
            parameters,
            body,
        }))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();

        if self.peek_token_is(TokenKind::Rparen) {
            self.next_token();
            return Some(parameters);
        }

        self.next_token();
        let token = self.cur_token.clone();
        self.validate_identifier(&token);
        parameters.push(Identifier {
            value: token.literal.clone(),
            token,
        });

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            let token = self.cur_token.clone();
            self.validate_identifier(&token);
            parameters.push(Identifier {
                value: token.literal.clone(),
                token,
            });
        }

        if !self.expect_peek(TokenKind::Rparen) {
            return None;
        }

        Some(parameters)
    }

    fn parse_nac_definition(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();
        self.next_token();

        let name_token = self.cur_token.clone();
        self.validate_identifier(&name_token);
        let name = name_token.literal;

        if !self.expect_peek(TokenKind::Lbrace) {
            return None;
        }

        let mut privacy_acknowledgement = None;
        if self.peek_token_is(TokenKind::Pack) {
            self.next_token();
            self.next_token();
            privacy_acknowledgement = Some(self.cur_token.literal.clone());
        }

        let mut fields = Vec::new();
        while self.peek_token_is(TokenKind::Field) {
            self.next_token();
            let field_token = self.peek_token.clone();
            self.validate_identifier(&field_token);
            // no public nac fields for now
            fields.push(NacField {
                name: field_token.literal,
                public: false,
            });
            self.next_token();
        }

        let mut methods = IndexMap::new();
        while !self.peek_token_is(TokenKind::Rbrace) && !self.peek_token_is(TokenKind::Eof) {
            let mut public = false;
            if self.peek_token_is(TokenKind::Public) {
                self.next_token();
                public = true;
                if self.peek_token_is(TokenKind::Field) {
                    let offending = self.cur_token.clone();
                    self.error_at(&offending, "public nac fields are not permitted");
                    return None;
                }
            }

            let method_token = self.peek_token.clone();
            self.validate_identifier(&method_token);
            self.next_token();
            self.next_token();

            let function = self.parse_function_literal()?;
            methods.insert(method_token.literal, NacMethod { public, function });
        }

        self.next_token();

        Some(Statement::Nac(Arc::new(NacDefinition {
            token,
            name,
            privacy_acknowledgement,
            fields,
            methods,
        })))
    }

    fn parse_struct_instantiation(&mut self) -> Option<Expression> {
        // typical form: new person(arg1, arg2)
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name_token = self.cur_token.clone();
        self.validate_identifier(&name_token);
        let nac_name = name_token.literal;

        if !self.expect_peek(TokenKind::Lparen) {
            return None;
        }
        let arguments = self.parse_expression_list(TokenKind::Rparen)?;

        Some(Expression::New {
            token,
            nac_name,
            arguments,
        })
    }

    fn parse_member_access_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let member_token = self.cur_token.clone();
        self.validate_identifier(&member_token);

        Some(Expression::MemberAccess {
            token,
            left: Box::new(left),
            member: member_token.literal,
        })
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();
        let arguments = self.parse_expression_list(TokenKind::Rparen)?;
        Some(Expression::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();

        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::Rbracket) {
            return None;
        }

        Some(Expression::Index {
            token,
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let elements = self.parse_expression_list(TokenKind::Rbracket)?;
        Some(Expression::ArrayLiteral { token, elements })
    }

    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(list)
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let mut pairs = Vec::new();

        while !self.peek_token_is(TokenKind::Rbrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }

            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if !self.peek_token_is(TokenKind::Rbrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }

        if !self.expect_peek(TokenKind::Rbrace) {
            return None;
        }

        Some(Expression::HashLiteral { token, pairs })
    }
}
