//! Recursive-descent parser with explicit precedence climbing and
//! two-token lookahead (the whole token stream is pre-materialized into a
//! `Vec<Token>`, which turns lookahead and speculative-then-backtrack
//! parsing, used for lambda params and destructuring `let`s, into plain
//! index saves/restores).

use std::rc::Rc;

use crate::ast::{
    ArrayElement, BinOp, Clause, ElementCondition, Expr, ExprKind, FieldKey, ObjectField,
    ObjectFieldPattern, Pattern, StringSegment, UnOp, WhenArm,
};
use crate::error::{ErrorKind, LazyError, RunResult};
use crate::token::{Keyword, StringPart, Token, TokenKind, Tokenizer};

/// Parses a complete program: a single top-level expression (possibly a
/// chain of `let` bindings sugar).
pub fn parse_program(source: &str) -> RunResult<Rc<Expr>> {
    let mut parser = Parser::new(source)?;
    let expr = parser.parse_block()?;
    parser.expect(TokenKind::Eof)?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> RunResult<Self> {
        let mut tokenizer = Tokenizer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            // doc comments are skipped here and re-attached at the call
            // site that needs them (object fields); everywhere else they
            // are simply not meaningful.
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(Self { tokens, pos: 0 })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_non_doc(&self) -> &Token {
        let mut i = self.pos;
        while matches!(self.tokens[i].kind, TokenKind::DocComment(_)) && i + 1 < self.tokens.len() {
            i += 1;
        }
        &self.tokens[i]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Consumes and concatenates any pending `///` doc-comment lines
    /// immediately preceding the cursor.
    fn take_doc(&mut self) -> Option<String> {
        if let TokenKind::DocComment(text) = self.peek().kind.clone() {
            self.advance();
            Some(text)
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> RunResult<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("expected {kind:?}")))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> RunResult<Token> {
        self.expect(TokenKind::Keyword(keyword))
    }

    fn unexpected(&self, message: &str) -> LazyError {
        LazyError::new(ErrorKind::UnexpectedToken, format!("{message}, found {:?}", self.peek().kind))
            .with_location(self.peek().location())
    }

    fn continuation_ok(&self, base_column: u32) -> bool {
        let token = self.peek();
        token.newlines_before == 0 || token.column > base_column
    }

    // ---- blocks (let-chains) -------------------------------------------------

    /// Parses a sequence of `pattern = value` bindings (newline- or
    /// `;`-separated) followed by a trailing body expression, producing
    /// nested `Let` nodes.
    fn parse_block(&mut self) -> RunResult<Rc<Expr>> {
        let start = self.peek().clone();
        if let Some((pattern, base_column)) = self.try_parse_binding_head()? {
            let value = self.parse_expr(base_column)?;
            if self.peek().kind == TokenKind::Semicolon {
                self.advance();
            }
            let body = self.parse_block()?;
            Ok(Expr::new(ExprKind::Let { pattern, value, body }, start.location()))
        } else {
            let base_column = self.peek().column;
            self.parse_expr(base_column)
        }
    }

    /// Speculatively parses `pattern =`, returning the pattern and the
    /// column its first token started at (used as the base indentation for
    /// the bound value) if a bare `=` follows; otherwise rewinds.
    fn try_parse_binding_head(&mut self) -> RunResult<Option<(Rc<Pattern>, u32)>> {
        let save = self.pos;
        let column = self.peek().column;
        match self.parse_pattern() {
            Ok(pattern) if self.peek().kind == TokenKind::Eq => {
                self.advance();
                Ok(Some((pattern, column)))
            }
            _ => {
                self.pos = save;
                Ok(None)
            }
        }
    }

    // ---- expressions, by ascending precedence --------------------------------

    fn parse_expr(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        self.parse_where(base_column)
    }

    fn parse_where(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let mut expr = self.parse_pipeline(base_column)?;
        while self.continuation_ok(base_column) && self.peek().kind == TokenKind::Keyword(Keyword::Where) {
            self.advance();
            let mut bindings = Vec::new();
            loop {
                let name = self.expect_identifier()?;
                self.expect(TokenKind::Eq)?;
                let value = self.parse_pipeline(base_column)?;
                bindings.push((name, value));
                if self.peek().kind == TokenKind::Semicolon {
                    self.advance();
                } else {
                    break;
                }
            }
            expr = Expr::new(ExprKind::Where { body: expr, bindings }, loc);
        }
        Ok(expr)
    }

    fn parse_pipeline(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let mut acc = self.parse_do(base_column)?;
        while self.continuation_ok(base_column) && self.peek().kind == TokenKind::Backslash {
            self.advance();
            let stage = self.parse_do(base_column)?;
            acc = Expr::new(ExprKind::Application { callee: stage, argument: acc }, loc);
        }
        Ok(acc)
    }

    fn parse_do(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let mut expr = self.parse_or(base_column)?;
        while self.continuation_ok(base_column) && self.peek().kind == TokenKind::Keyword(Keyword::Do) {
            self.advance();
            let block = self.parse_expr(base_column)?;
            expr = Expr::new(ExprKind::Application { callee: expr, argument: block }, loc);
        }
        Ok(expr)
    }

    fn parse_or(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let mut left = self.parse_and(base_column)?;
        while self.continuation_ok(base_column) && self.peek().kind == TokenKind::OrOr {
            self.advance();
            let right = self.parse_and(base_column)?;
            left = Expr::new(ExprKind::Binary { op: BinOp::Or, left, right }, loc);
        }
        Ok(left)
    }

    fn parse_and(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let mut left = self.parse_comparison(base_column)?;
        while self.continuation_ok(base_column) && self.peek().kind == TokenKind::AndAnd {
            self.advance();
            let right = self.parse_comparison(base_column)?;
            left = Expr::new(ExprKind::Binary { op: BinOp::And, left, right }, loc);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let mut left = self.parse_concat(base_column)?;
        loop {
            if !self.continuation_ok(base_column) {
                break;
            }
            let op = match self.peek().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::NotEq,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_concat(base_column)?;
            left = Expr::new(ExprKind::Binary { op, left, right }, loc);
        }
        Ok(left)
    }

    fn parse_concat(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let mut left = self.parse_additive(base_column)?;
        loop {
            if !self.continuation_ok(base_column) {
                break;
            }
            let op = match self.peek().kind {
                TokenKind::PlusPlus => BinOp::Concat,
                TokenKind::Amp => BinOp::Merge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive(base_column)?;
            left = Expr::new(ExprKind::Binary { op, left, right }, loc);
        }
        Ok(left)
    }

    fn parse_additive(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let mut left = self.parse_multiplicative(base_column)?;
        loop {
            if !self.continuation_ok(base_column) {
                break;
            }
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative(base_column)?;
            left = Expr::new(ExprKind::Binary { op, left, right }, loc);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let mut left = self.parse_unary(base_column)?;
        loop {
            if !self.continuation_ok(base_column) {
                break;
            }
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary(base_column)?;
            left = Expr::new(ExprKind::Binary { op, left, right }, loc);
        }
        Ok(left)
    }

    fn parse_unary(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let op = match self.peek().kind {
            TokenKind::Bang => Some(UnOp::Not),
            TokenKind::Minus => Some(UnOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary(base_column)?;
            Ok(Expr::new(ExprKind::Unary { op, operand }, loc))
        } else {
            self.parse_application(base_column)
        }
    }

    fn parse_application(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let mut expr = self.parse_postfix(base_column)?;
        while self.continuation_ok(base_column) && starts_primary(&self.peek().kind) {
            let argument = self.parse_postfix(base_column)?;
            expr = Expr::new(ExprKind::Application { callee: expr, argument }, loc);
        }
        Ok(expr)
    }

    fn parse_postfix(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        let mut expr = self.parse_primary(base_column)?;
        loop {
            if !self.continuation_ok(base_column) {
                break;
            }
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    if self.peek().kind == TokenKind::LBrace {
                        self.advance();
                        let mut names = vec![self.expect_identifier()?];
                        while self.peek().kind == TokenKind::Comma {
                            self.advance();
                            names.push(self.expect_identifier()?);
                        }
                        self.expect(TokenKind::RBrace)?;
                        expr = Expr::new(ExprKind::FieldProjection { object: expr, names }, loc);
                    } else {
                        let name = self.expect_identifier()?;
                        expr = Expr::new(ExprKind::FieldAccess { object: expr, name }, loc);
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let key = self.parse_expr(self.peek().column)?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::new(ExprKind::Index { collection: expr, key }, loc);
                }
                TokenKind::LBrace => {
                    let fields = self.parse_object_fields()?;
                    expr = Expr::new(ExprKind::ObjectExtend { base: expr, fields }, loc);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Parses the `{ field, field, ... }` braces of an object-extend
    /// clause (`base { ... }`); unlike a fresh object literal this never
    /// turns into a comprehension.
    fn parse_object_fields(&mut self) -> RunResult<Vec<ObjectField>> {
        self.advance(); // '{'
        let mut fields = Vec::new();
        if self.peek().kind != TokenKind::RBrace {
            fields.push(self.parse_object_field()?);
            loop {
                if self.peek().kind == TokenKind::Comma {
                    self.advance();
                }
                if self.peek().kind == TokenKind::RBrace {
                    break;
                }
                fields.push(self.parse_object_field()?);
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(fields)
    }

    fn parse_primary(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        // Speculatively try a lambda: `pattern -> body`.
        let save = self.pos;
        if let Some(param) = self.try_parse_lambda_head() {
            let body = self.parse_expr(base_column)?;
            return Ok(Expr::new(ExprKind::Lambda { param, body }, self.tokens[save].location()));
        }
        self.pos = save;

        let token = self.peek().clone();
        let token_loc = token.location();
        match token.kind {
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Expr::new(ExprKind::Integer(n), token_loc))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::new(ExprKind::Float(f), token_loc))
            }
            TokenKind::Boolean(b) => {
                self.advance();
                Ok(Expr::new(ExprKind::Boolean(b), token_loc))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::new(ExprKind::Null, token_loc))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expr::new(ExprKind::String(s), token_loc))
            }
            TokenKind::InterpolatedString(parts) => {
                self.advance();
                let segments = parts
                    .into_iter()
                    .map(|part| self.string_part_to_segment(part))
                    .collect::<RunResult<Vec<_>>>()?;
                Ok(Expr::new(ExprKind::Interpolated(segments), token_loc))
            }
            TokenKind::Symbol(name) => {
                self.advance();
                Ok(Expr::new(ExprKind::Symbol(name), token_loc))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::new(ExprKind::Identifier(name), token_loc))
            }
            TokenKind::Dot => {
                self.advance();
                let mut names = vec![self.expect_identifier()?];
                while self.peek().kind == TokenKind::Dot {
                    self.advance();
                    names.push(self.expect_identifier()?);
                }
                Ok(Expr::new(ExprKind::FieldAccessor { names }, token.location()))
            }
            TokenKind::LParen => self.parse_paren(),
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_object(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(base_column),
            TokenKind::Keyword(Keyword::When) => self.parse_when(base_column),
            TokenKind::Keyword(Keyword::Import) => self.parse_import(),
            _ => Err(LazyError::new(ErrorKind::ExpectedExpression, format!("expected expression, found {:?}", token.kind))
                .with_location(token.location())),
        }
    }

    fn string_part_to_segment(&mut self, part: StringPart) -> RunResult<StringSegment> {
        match part {
            StringPart::Literal(text) => Ok(StringSegment::Literal(text)),
            StringPart::Expr { source, .. } => {
                let expr = parse_subexpression(&source)?;
                Ok(StringSegment::Expr(expr))
            }
        }
    }

    fn try_parse_lambda_head(&mut self) -> Option<Rc<Pattern>> {
        let save = self.pos;
        match self.parse_pattern() {
            Ok(pattern) if self.peek().kind == TokenKind::Arrow => {
                self.advance();
                Some(pattern)
            }
            _ => {
                self.pos = save;
                None
            }
        }
    }

    fn parse_paren(&mut self) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        self.advance(); // '('
        if self.peek().kind == TokenKind::RParen {
            self.advance();
            return Ok(Expr::new(ExprKind::Tuple(vec![]), loc));
        }
        let mut items = vec![self.parse_block()?];
        let mut is_tuple = false;
        while self.peek().kind == TokenKind::Comma {
            is_tuple = true;
            self.advance();
            items.push(self.parse_block()?);
        }
        self.expect(TokenKind::RParen)?;
        if is_tuple {
            Ok(Expr::new(ExprKind::Tuple(items), loc))
        } else {
            Ok(items.into_iter().next().expect("at least one item"))
        }
    }

    fn parse_array(&mut self) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        self.advance(); // '['
        if self.peek().kind == TokenKind::RBracket {
            self.advance();
            return Ok(Expr::new(ExprKind::Array(vec![]), loc));
        }
        let col = self.peek().column;
        let first = self.parse_expr(col)?;
        let condition = self.parse_element_condition(col)?;
        if matches!(self.peek().kind, TokenKind::Keyword(Keyword::For) | TokenKind::Keyword(Keyword::When)) {
            let clauses = self.parse_clauses()?;
            self.expect(TokenKind::RBracket)?;
            return Ok(Expr::new(ExprKind::ArrayComprehension { body: first, clauses }, loc));
        }
        let mut elements = vec![ArrayElement { value: first, condition }];
        loop {
            if self.peek().kind == TokenKind::Comma {
                self.advance();
            }
            if self.peek().kind == TokenKind::RBracket {
                self.advance();
                break;
            }
            let col = self.peek().column;
            let value = self.parse_expr(col)?;
            let condition = self.parse_element_condition(col)?;
            elements.push(ArrayElement { value, condition });
        }
        Ok(Expr::new(ExprKind::Array(elements), loc))
    }

    fn parse_element_condition(&mut self, base_column: u32) -> RunResult<Option<ElementCondition>> {
        if !self.continuation_ok(base_column) {
            return Ok(None);
        }
        match self.peek().kind {
            TokenKind::Keyword(Keyword::If) => {
                self.advance();
                Ok(Some(ElementCondition::If(self.parse_expr(base_column)?)))
            }
            TokenKind::Keyword(Keyword::Unless) => {
                self.advance();
                Ok(Some(ElementCondition::Unless(self.parse_expr(base_column)?)))
            }
            _ => Ok(None),
        }
    }

    fn parse_clauses(&mut self) -> RunResult<Vec<Clause>> {
        let mut clauses = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Keyword(Keyword::For) => {
                    self.advance();
                    let pattern = self.parse_pattern()?;
                    self.expect_keyword(Keyword::In)?;
                    let col = self.peek().column;
                    let source = self.parse_expr(col)?;
                    clauses.push(Clause::For { pattern, source });
                }
                TokenKind::Keyword(Keyword::When) => {
                    self.advance();
                    let col = self.peek().column;
                    let guard = self.parse_expr(col)?;
                    clauses.push(Clause::Guard(guard));
                }
                _ => break,
            }
        }
        Ok(clauses)
    }

    fn parse_object(&mut self) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        self.advance(); // '{'
        if self.peek().kind == TokenKind::RBrace {
            self.advance();
            return Ok(Expr::new(ExprKind::Object(vec![]), loc));
        }
        let first = self.parse_object_field()?;
        if matches!(self.peek().kind, TokenKind::Keyword(Keyword::For) | TokenKind::Keyword(Keyword::When)) {
            let clauses = self.parse_clauses()?;
            self.expect(TokenKind::RBrace)?;
            return Ok(Expr::new(
                ExprKind::ObjectComprehension { key: first.key, value: first.value, clauses },
                loc,
            ));
        }
        let mut fields = vec![first];
        loop {
            if self.peek().kind == TokenKind::Comma {
                self.advance();
            }
            if self.peek().kind == TokenKind::RBrace {
                self.advance();
                break;
            }
            fields.push(self.parse_object_field()?);
        }
        Ok(Expr::new(ExprKind::Object(fields), loc))
    }

    fn parse_object_field(&mut self) -> RunResult<ObjectField> {
        let doc = self.take_doc();
        let key = self.parse_field_key()?;
        match self.peek().kind {
            TokenKind::Colon => {
                self.advance();
                let col = self.peek().column;
                let value = self.parse_expr(col)?;
                Ok(ObjectField { key, value, merge: false, doc })
            }
            TokenKind::LBrace => {
                let value = self.parse_object()?;
                Ok(ObjectField { key, value, merge: true, doc })
            }
            _ => Err(self.unexpected("expected `:` or `{` in object field")),
        }
    }

    fn parse_field_key(&mut self) -> RunResult<FieldKey> {
        match self.peek().kind.clone() {
            TokenKind::LBracket => {
                self.advance();
                let col = self.peek().column;
                let expr = self.parse_expr(col)?;
                self.expect(TokenKind::RBracket)?;
                Ok(FieldKey::Dynamic(expr))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(FieldKey::Static(name))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(FieldKey::Static(s))
            }
            _ => Err(self.unexpected("expected object field key")),
        }
    }

    fn parse_if(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        self.advance(); // 'if'
        let condition = self.parse_expr(base_column)?;
        self.expect_keyword(Keyword::Then)?;
        let then_branch = self.parse_expr(base_column)?;
        let else_branch = if self.peek().kind == TokenKind::Keyword(Keyword::Else) {
            self.advance();
            Some(self.parse_expr(base_column)?)
        } else {
            None
        };
        Ok(Expr::new(ExprKind::If { condition, then_branch, else_branch }, loc))
    }

    fn parse_when(&mut self, base_column: u32) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        self.advance(); // 'when'
        let scrutinee = self.parse_expr(base_column)?;
        self.expect_keyword(Keyword::Matches)?;
        let mut arms = Vec::new();
        let mut otherwise = None;
        loop {
            if self.peek().kind == TokenKind::Keyword(Keyword::Otherwise) {
                self.advance();
                if self.peek().kind == TokenKind::Keyword(Keyword::Then) {
                    self.advance();
                }
                otherwise = Some(self.parse_expr(base_column)?);
                if self.peek().kind == TokenKind::Semicolon {
                    self.advance();
                }
                break;
            }
            if !starts_primary(&self.peek().kind) {
                break;
            }
            let pattern = self.parse_pattern()?;
            self.expect_keyword(Keyword::Then)?;
            let body = self.parse_expr(base_column)?;
            arms.push(WhenArm { pattern, body });
            if self.peek().kind == TokenKind::Semicolon {
                self.advance();
            } else if arms.last().is_some() && !starts_primary(&self.peek().kind)
                && self.peek().kind != TokenKind::Keyword(Keyword::Otherwise)
            {
                break;
            }
        }
        Ok(Expr::new(ExprKind::When { scrutinee, arms, otherwise }, loc))
    }

    fn parse_import(&mut self) -> RunResult<Rc<Expr>> {
        let loc = self.peek().location();
        self.advance(); // 'import'
        let path = match self.peek().kind.clone() {
            TokenKind::String(s) => {
                self.advance();
                s
            }
            _ => return Err(self.unexpected("expected string path after `import`")),
        };
        Ok(Expr::new(ExprKind::Import(path), loc))
    }

    fn expect_identifier(&mut self) -> RunResult<String> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("expected identifier")),
        }
    }

    // ---- patterns -------------------------------------------------------------

    fn parse_pattern(&mut self) -> RunResult<Rc<Pattern>> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Rc::new(Pattern::Identifier(name)))
            }
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Rc::new(Pattern::Integer(n)))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Rc::new(Pattern::Float(f)))
            }
            TokenKind::Boolean(b) => {
                self.advance();
                Ok(Rc::new(Pattern::Boolean(b)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Rc::new(Pattern::Null))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Rc::new(Pattern::String(s)))
            }
            TokenKind::Symbol(s) => {
                self.advance();
                Ok(Rc::new(Pattern::Symbol(s)))
            }
            TokenKind::LParen => {
                self.advance();
                if self.peek().kind == TokenKind::RParen {
                    self.advance();
                    return Ok(Rc::new(Pattern::Tuple(vec![])));
                }
                let mut items = vec![self.parse_pattern()?];
                let mut is_tuple = false;
                while self.peek().kind == TokenKind::Comma {
                    is_tuple = true;
                    self.advance();
                    items.push(self.parse_pattern()?);
                }
                self.expect(TokenKind::RParen)?;
                if is_tuple {
                    Ok(Rc::new(Pattern::Tuple(items)))
                } else {
                    Ok(items.into_iter().next().expect("at least one item"))
                }
            }
            TokenKind::LBracket => {
                self.advance();
                let mut prefix = Vec::new();
                let mut rest = None;
                if self.peek().kind != TokenKind::RBracket {
                    loop {
                        if self.peek().kind == TokenKind::Ellipsis {
                            self.advance();
                            rest = Some(self.expect_identifier()?);
                            break;
                        }
                        prefix.push(self.parse_pattern()?);
                        if self.peek().kind == TokenKind::Comma {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket)?;
                Ok(Rc::new(Pattern::Array { prefix, rest }))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                if self.peek().kind != TokenKind::RBrace {
                    loop {
                        let name = self.expect_identifier()?;
                        let subpattern = if self.peek().kind == TokenKind::Colon {
                            self.advance();
                            Some(self.parse_pattern()?)
                        } else {
                            None
                        };
                        fields.push(ObjectFieldPattern { name, subpattern });
                        if self.peek().kind == TokenKind::Comma {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBrace)?;
                Ok(Rc::new(Pattern::Object(fields)))
            }
            _ => Err(LazyError::new(ErrorKind::ExpectedExpression, format!("expected pattern, found {:?}", token.kind))
                .with_location(token.location())),
        }
    }
}

fn starts_primary(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Integer(_)
            | TokenKind::Float(_)
            | TokenKind::Boolean(_)
            | TokenKind::Null
            | TokenKind::String(_)
            | TokenKind::InterpolatedString(_)
            | TokenKind::Symbol(_)
            | TokenKind::Identifier(_)
            | TokenKind::Dot
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Keyword(Keyword::If)
            | TokenKind::Keyword(Keyword::When)
            | TokenKind::Keyword(Keyword::Import)
    )
}

/// Parses a single embedded expression from a string interpolation, in
/// isolation from the enclosing source buffer's position tracking.
fn parse_subexpression(source: &str) -> RunResult<Rc<Expr>> {
    let mut parser = Parser::new(source)?;
    let col = parser.peek().column;
    let expr = parser.parse_expr(col)?;
    parser.expect(TokenKind::Eof)?;
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Rc<Expr> {
        parse_program(source).unwrap_or_else(|e| panic!("parse failed for {source:?}: {e}"))
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let expr = parse("1 + 2 * 3");
        match &expr.kind {
            ExprKind::Binary { op: BinOp::Add, left, right } => {
                assert!(matches!(left.kind, ExprKind::Integer(1)));
                assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_lambda_application() {
        let expr = parse("(x -> x + 1) 41");
        assert!(matches!(expr.kind, ExprKind::Application { .. }));
    }

    #[test]
    fn parses_let_sugar() {
        let expr = parse("x = 1\nx + 1");
        assert!(matches!(expr.kind, ExprKind::Let { .. }));
    }

    #[test]
    fn parses_destructuring_let() {
        let expr = parse("{ first, last } = { first: \"John\", last: \"Doe\" }\nfirst");
        match &expr.kind {
            ExprKind::Let { pattern, .. } => assert!(matches!(**pattern, Pattern::Object(_))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_object_literal_and_patch_field() {
        let expr = parse("{ a: 1, b { c: 2 } }");
        match &expr.kind {
            ExprKind::Object(fields) => {
                assert_eq!(fields.len(), 2);
                assert!(!fields[0].merge);
                assert!(fields[1].merge);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_array_comprehension() {
        let expr = parse("[x + y for x in [1, 2] for y in [10, 20]]");
        assert!(matches!(expr.kind, ExprKind::ArrayComprehension { .. }));
    }

    #[test]
    fn parses_conditional_array_elements() {
        let expr = parse("[1, 2 if true, 3 unless false]");
        match &expr.kind {
            ExprKind::Array(elements) => {
                assert_eq!(elements.len(), 3);
                assert!(elements[0].condition.is_none());
                assert!(matches!(elements[1].condition, Some(ElementCondition::If(_))));
                assert!(matches!(elements[2].condition, Some(ElementCondition::Unless(_))));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_when_matches_with_semicolons() {
        let expr = parse("when (#error, \"msg\") matches (#ok, v) then v; (#error, m) then m");
        match &expr.kind {
            ExprKind::When { arms, otherwise, .. } => {
                assert_eq!(arms.len(), 2);
                assert!(otherwise.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_if_else_chain() {
        let expr = parse("if true then 1 else if false then 2 else 3");
        assert!(matches!(expr.kind, ExprKind::If { .. }));
    }

    #[test]
    fn parses_field_accessor_and_projection() {
        let expr = parse(".name");
        assert!(matches!(expr.kind, ExprKind::FieldAccessor { .. }));
        let expr = parse("x.{a, b}");
        assert!(matches!(expr.kind, ExprKind::FieldProjection { .. }));
    }

    #[test]
    fn parses_import_destructure() {
        let expr = parse("{ double } = import './Lib'\ndouble 21");
        assert!(matches!(expr.kind, ExprKind::Let { .. }));
    }

    #[test]
    fn parses_pipeline_as_last_argument_application() {
        let expr = parse("5 \\ add 1");
        // add 1 5  ==  (add 1) 5
        match &expr.kind {
            ExprKind::Application { callee, argument } => {
                assert!(matches!(argument.kind, ExprKind::Integer(5)));
                assert!(matches!(callee.kind, ExprKind::Application { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_interpolated_string() {
        let expr = parse("\"hi ${1 + 2}\"");
        match &expr.kind {
            ExprKind::Interpolated(segments) => assert_eq!(segments.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_where_suffix() {
        let expr = parse("x + y where x = 1; y = 2");
        assert!(matches!(expr.kind, ExprKind::Where { .. }));
    }

    #[test]
    fn rejects_unterminated_object() {
        let err = parse_program("{ a: 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
    }
}
