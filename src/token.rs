//! Lexical analysis: turns a source buffer into a lazily-produced stream of
//! [`Token`]s. The tokenizer has no knowledge of parser state; indentation
//! sensitivity is surfaced only as a `newlines_before` count on each token,
//! left for the parser to interpret.

use crate::error::{ErrorKind, LazyError, SourceLocation};

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    /// A string literal, already unescaped. Interpolated strings are
    /// represented as a dedicated kind below, since their embedded
    /// expressions must themselves be tokenized.
    String(String),
    /// A string literal containing `$ident`/`${expr}` interpolations: an
    /// ordered list of literal segments interleaved with raw source slices
    /// for the embedded expressions (handed to the parser to be parsed as
    /// full sub-expressions).
    InterpolatedString(Vec<StringPart>),
    Symbol(String),
    Identifier(String),
    Keyword(Keyword),
    /// A `///` doc-comment line (one token per contiguous block).
    DocComment(String),

    // Operators / punctuation
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    Amp,
    PlusPlus,
    Arrow,
    Backslash,
    Eq,
    Dot,
    Comma,
    Colon,
    Semicolon,
    Ellipsis,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Then,
    Else,
    When,
    Matches,
    Otherwise,
    For,
    In,
    Where,
    Do,
    Let,
    Import,
    Unless,
    And,
    Or,
    True,
    False,
    Null,
}

impl Keyword {
    fn from_str(word: &str) -> Option<Keyword> {
        Some(match word {
            "if" => Keyword::If,
            "then" => Keyword::Then,
            "else" => Keyword::Else,
            "when" => Keyword::When,
            "matches" => Keyword::Matches,
            "otherwise" => Keyword::Otherwise,
            "for" => Keyword::For,
            "in" => Keyword::In,
            "where" => Keyword::Where,
            "do" => Keyword::Do,
            "let" => Keyword::Let,
            "import" => Keyword::Import,
            "unless" => Keyword::Unless,
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            _ => return None,
        })
    }
}

/// One literal segment of an interpolated string, or an embedded
/// expression's raw source slice (with its own location so it can be
/// re-tokenized and parsed independently).
#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    Literal(String),
    Expr { source: String, offset: usize, line: u32, column: u32 },
}

/// A lexical atom with its lexeme slice, position metadata, and the count
/// of newlines since the previous non-whitespace token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
    pub column: u32,
    pub offset: usize,
    pub newlines_before: u32,
}

impl Token {
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.offset, self.lexeme.len().max(1))
    }
}

/// Consumes a source buffer left-to-right, producing tokens on demand.
#[derive(Clone)]
pub struct Tokenizer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    line: u32,
    column: u32,
    pending_newlines: u32,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, bytes: source.as_bytes(), pos: 0, line: 1, column: 1, pending_newlines: 0 }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if byte != b'\r' {
            self.column += 1;
        }
        Some(byte)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\t') | Some(b'\r') => {
                    self.advance();
                }
                Some(b'\n') => {
                    self.advance();
                    self.pending_newlines += 1;
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'/') && self.peek_byte_at(2) != Some(b'/') => {
                    while !matches!(self.peek_byte(), None | Some(b'\n')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn current_location(&self, start: usize, start_line: u32, start_column: u32) -> SourceLocation {
        SourceLocation::new(start_line, start_column, start, self.pos - start)
    }

    /// Produces the next token, or `TokenKind::Eof` once the source is
    /// exhausted.
    pub fn next_token(&mut self) -> Result<Token, LazyError> {
        self.skip_trivia();

        // `///` doc comments are preserved as tokens; consecutive doc-comment
        // lines collapse into a single token.
        if self.peek_byte() == Some(b'/') && self.peek_byte_at(1) == Some(b'/') && self.peek_byte_at(2) == Some(b'/')
        {
            return self.lex_doc_comment();
        }

        let newlines_before = std::mem::take(&mut self.pending_newlines);
        let start = self.pos;
        let start_line = self.line;
        let start_column = self.column;

        let Some(byte) = self.peek_byte() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                line: start_line,
                column: start_column,
                offset: start,
                newlines_before,
            });
        };

        let kind = match byte {
            b'0'..=b'9' => self.lex_number()?,
            b'"' | b'\'' => self.lex_string(byte)?,
            b'#' => self.lex_symbol()?,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_identifier_or_keyword(),
            _ => self.lex_operator(start, start_line, start_column)?,
        };

        let lexeme = self.source[start..self.pos].to_string();
        Ok(Token { kind, lexeme, line: start_line, column: start_column, offset: start, newlines_before })
    }

    fn lex_doc_comment(&mut self) -> Result<Token, LazyError> {
        let newlines_before = std::mem::take(&mut self.pending_newlines);
        let start = self.pos;
        let start_line = self.line;
        let start_column = self.column;
        let mut lines = Vec::new();
        loop {
            // consume "///"
            self.advance();
            self.advance();
            self.advance();
            if self.peek_byte() == Some(b' ') {
                self.advance();
            }
            let line_start = self.pos;
            while !matches!(self.peek_byte(), None | Some(b'\n')) {
                self.advance();
            }
            lines.push(self.source[line_start..self.pos].to_string());
            // peek ahead past this line's newline and any blank lines to see
            // whether another doc-comment line follows immediately
            let mut probe = self.clone();
            let mut newlines_seen = 0u32;
            loop {
                match probe.peek_byte() {
                    Some(b'\n') => {
                        probe.advance();
                        newlines_seen += 1;
                    }
                    Some(b' ') | Some(b'\t') | Some(b'\r') => {
                        probe.advance();
                    }
                    _ => break,
                }
            }
            let continues = newlines_seen == 1
                && probe.peek_byte() == Some(b'/')
                && probe.peek_byte_at(1) == Some(b'/')
                && probe.peek_byte_at(2) == Some(b'/');
            if !continues {
                break;
            }
            *self = probe;
        }
        let lexeme = self.source[start..self.pos].to_string();
        Ok(Token {
            kind: TokenKind::DocComment(lines.join("\n")),
            lexeme,
            line: start_line,
            column: start_column,
            offset: start,
            newlines_before,
        })
    }

    fn lex_number(&mut self) -> Result<TokenKind, LazyError> {
        let start = self.pos;
        while matches!(self.peek_byte(), Some(b'0'..=b'9')) {
            self.advance();
        }
        if self.peek_byte() == Some(b'.') && matches!(self.peek_byte_at(1), Some(b'0'..=b'9')) {
            self.advance();
            while matches!(self.peek_byte(), Some(b'0'..=b'9')) {
                self.advance();
            }
            let text = &self.source[start..self.pos];
            let value: f64 = text.parse().expect("validated float lexeme");
            return Ok(TokenKind::Float(value));
        }
        let text = &self.source[start..self.pos];
        let value: i64 = text.parse().map_err(|_| {
            LazyError::new(ErrorKind::UnexpectedCharacter, format!("integer literal out of range: {text}"))
        })?;
        Ok(TokenKind::Integer(value))
    }

    fn lex_string(&mut self, quote: u8) -> Result<TokenKind, LazyError> {
        let open_line = self.line;
        let open_column = self.column;
        let open_offset = self.pos;
        self.advance(); // opening quote

        let mut parts: Vec<StringPart> = Vec::new();
        let mut literal = String::new();
        let mut interpolated = false;

        loop {
            match self.peek_byte() {
                None => {
                    return Err(LazyError::new(ErrorKind::UnterminatedString, "unterminated string literal")
                        .with_location(SourceLocation::new(open_line, open_column, open_offset, 1)));
                }
                Some(b) if b == quote => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    let escaped = self.advance().ok_or_else(|| {
                        LazyError::new(ErrorKind::UnterminatedString, "unterminated string literal")
                            .with_location(SourceLocation::new(open_line, open_column, open_offset, 1))
                    })?;
                    literal.push(match escaped {
                        b'n' => '\n',
                        b't' => '\t',
                        b'\\' => '\\',
                        b'"' => '"',
                        b'\'' => '\'',
                        other => other as char,
                    });
                }
                Some(b'$') if self.peek_byte_at(1) == Some(b'{') => {
                    interpolated = true;
                    parts.push(StringPart::Literal(std::mem::take(&mut literal)));
                    self.advance();
                    self.advance();
                    let expr_start = self.pos;
                    let expr_line = self.line;
                    let expr_column = self.column;
                    let mut depth = 1i32;
                    while depth > 0 {
                        match self.peek_byte() {
                            None => {
                                return Err(LazyError::new(
                                    ErrorKind::UnterminatedString,
                                    "unterminated interpolation",
                                ));
                            }
                            Some(b'{') => {
                                depth += 1;
                                self.advance();
                            }
                            Some(b'}') => {
                                depth -= 1;
                                self.advance();
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                    let source = self.source[expr_start..self.pos - 1].to_string();
                    parts.push(StringPart::Expr { source, offset: expr_start, line: expr_line, column: expr_column });
                }
                Some(b'$') if matches!(self.peek_byte_at(1), Some(b'a'..=b'z') | Some(b'A'..=b'Z') | Some(b'_')) => {
                    interpolated = true;
                    parts.push(StringPart::Literal(std::mem::take(&mut literal)));
                    self.advance();
                    let expr_start = self.pos;
                    let expr_line = self.line;
                    let expr_column = self.column;
                    while matches!(self.peek_byte(), Some(b'a'..=b'z') | Some(b'A'..=b'Z') | Some(b'0'..=b'9') | Some(b'_'))
                    {
                        self.advance();
                    }
                    let source = self.source[expr_start..self.pos].to_string();
                    parts.push(StringPart::Expr { source, offset: expr_start, line: expr_line, column: expr_column });
                }
                Some(_) => {
                    // consume one UTF-8 scalar value
                    let rest = &self.source[self.pos..];
                    let ch = rest.chars().next().expect("non-empty remainder");
                    for _ in 0..ch.len_utf8() {
                        self.advance();
                    }
                    literal.push(ch);
                }
            }
        }

        if interpolated {
            parts.push(StringPart::Literal(literal));
            Ok(TokenKind::InterpolatedString(parts))
        } else {
            Ok(TokenKind::String(literal))
        }
    }

    fn lex_symbol(&mut self) -> Result<TokenKind, LazyError> {
        let hash_line = self.line;
        let hash_column = self.column;
        let hash_offset = self.pos;
        self.advance(); // '#'
        let start = self.pos;
        if !matches!(self.peek_byte(), Some(b'a'..=b'z') | Some(b'A'..=b'Z') | Some(b'_')) {
            return Err(LazyError::new(ErrorKind::UnexpectedCharacter, "expected identifier after `#`")
                .with_location(SourceLocation::new(hash_line, hash_column, hash_offset, 1)));
        }
        while matches!(self.peek_byte(), Some(b'a'..=b'z') | Some(b'A'..=b'Z') | Some(b'0'..=b'9') | Some(b'_')) {
            self.advance();
        }
        Ok(TokenKind::Symbol(self.source[start..self.pos].to_string()))
    }

    fn lex_identifier_or_keyword(&mut self) -> TokenKind {
        let start = self.pos;
        while matches!(self.peek_byte(), Some(b'a'..=b'z') | Some(b'A'..=b'Z') | Some(b'0'..=b'9') | Some(b'_')) {
            self.advance();
        }
        let word = &self.source[start..self.pos];
        if let Some(keyword) = Keyword::from_str(word) {
            match keyword {
                Keyword::True => TokenKind::Boolean(true),
                Keyword::False => TokenKind::Boolean(false),
                Keyword::Null => TokenKind::Null,
                other => TokenKind::Keyword(other),
            }
        } else {
            TokenKind::Identifier(word.to_string())
        }
    }

    fn lex_operator(&mut self, start: usize, start_line: u32, start_column: u32) -> Result<TokenKind, LazyError> {
        macro_rules! two {
            ($second:expr, $two_kind:expr, $one_kind:expr) => {{
                self.advance();
                if self.peek_byte() == Some($second) {
                    self.advance();
                    $two_kind
                } else {
                    $one_kind
                }
            }};
        }

        let byte = self.peek_byte().expect("checked by caller");
        let kind = match byte {
            b'+' => two!(b'+', TokenKind::PlusPlus, TokenKind::Plus),
            b'-' => two!(b'>', TokenKind::Arrow, TokenKind::Minus),
            b'*' => {
                self.advance();
                TokenKind::Star
            }
            b'/' => {
                self.advance();
                TokenKind::Slash
            }
            b'%' => {
                self.advance();
                TokenKind::Percent
            }
            b'=' => two!(b'=', TokenKind::EqEq, TokenKind::Eq),
            b'!' => two!(b'=', TokenKind::NotEq, TokenKind::Bang),
            b'<' => two!(b'=', TokenKind::LtEq, TokenKind::Lt),
            b'>' => two!(b'=', TokenKind::GtEq, TokenKind::Gt),
            b'&' => two!(b'&', TokenKind::AndAnd, TokenKind::Amp),
            b'|' => {
                self.advance();
                if self.peek_byte() == Some(b'|') {
                    self.advance();
                    TokenKind::OrOr
                } else {
                    return Err(LazyError::new(ErrorKind::UnexpectedCharacter, "unexpected character `|`")
                        .with_location(self.current_location(start, start_line, start_column)));
                }
            }
            b'.' => {
                self.advance();
                if self.peek_byte() == Some(b'.') && self.peek_byte_at(1) == Some(b'.') {
                    self.advance();
                    self.advance();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            b',' => {
                self.advance();
                TokenKind::Comma
            }
            b':' => {
                self.advance();
                TokenKind::Colon
            }
            b';' => {
                self.advance();
                TokenKind::Semicolon
            }
            b'(' => {
                self.advance();
                TokenKind::LParen
            }
            b')' => {
                self.advance();
                TokenKind::RParen
            }
            b'[' => {
                self.advance();
                TokenKind::LBracket
            }
            b']' => {
                self.advance();
                TokenKind::RBracket
            }
            b'{' => {
                self.advance();
                TokenKind::LBrace
            }
            b'}' => {
                self.advance();
                TokenKind::RBrace
            }
            b'\\' => {
                self.advance();
                TokenKind::Backslash
            }
            other => {
                return Err(LazyError::new(
                    ErrorKind::UnexpectedCharacter,
                    format!("unexpected character `{}`", other as char),
                )
                .with_location(self.current_location(start, start_line, start_column)));
            }
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut tokenizer = Tokenizer::new(source);
        let mut out = Vec::new();
        loop {
            let token = tokenizer.next_token().unwrap();
            if token.kind == TokenKind::Eof {
                break;
            }
            out.push(token.kind);
        }
        out
    }

    #[test]
    fn integers_and_floats() {
        assert_eq!(kinds("42 3.14"), vec![TokenKind::Integer(42), TokenKind::Float(3.14)]);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("if x then y"),
            vec![
                TokenKind::Keyword(Keyword::If),
                TokenKind::Identifier("x".into()),
                TokenKind::Keyword(Keyword::Then),
                TokenKind::Identifier("y".into()),
            ]
        );
    }

    #[test]
    fn booleans_and_null_are_literals_not_keywords() {
        assert_eq!(kinds("true false null"), vec![TokenKind::Boolean(true), TokenKind::Boolean(false), TokenKind::Null]);
    }

    #[test]
    fn symbol_tokenizes() {
        assert_eq!(kinds("#ok"), vec![TokenKind::Symbol("ok".into())]);
    }

    #[test]
    fn unterminated_string_errors_at_open_location() {
        let mut tokenizer = Tokenizer::new("\"abc");
        let err = tokenizer.next_token().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedString);
        assert_eq!(err.context.location.unwrap().offset, 0);
    }

    #[test]
    fn unexpected_character_reports_offset() {
        let mut tokenizer = Tokenizer::new("@");
        let err = tokenizer.next_token().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedCharacter);
        assert_eq!(err.context.location.unwrap().offset, 0);
    }

    #[test]
    fn interpolated_string_splits_parts() {
        let mut tokenizer = Tokenizer::new("\"hi $name and ${1 + 2}\"");
        let token = tokenizer.next_token().unwrap();
        match token.kind {
            TokenKind::InterpolatedString(parts) => {
                assert_eq!(
                    parts,
                    vec![
                        StringPart::Literal("hi ".into()),
                        StringPart::Expr { source: "name".into(), offset: 5, line: 1, column: 6 },
                        StringPart::Literal(" and ".into()),
                        StringPart::Expr { source: "1 + 2".into(), offset: 17, line: 1, column: 18 },
                        StringPart::Literal("".into()),
                    ]
                );
            }
            other => panic!("expected interpolated string, got {other:?}"),
        }
    }

    #[test]
    fn newlines_before_tracks_blank_lines() {
        let mut tokenizer = Tokenizer::new("a\n\nb");
        let first = tokenizer.next_token().unwrap();
        let second = tokenizer.next_token().unwrap();
        assert_eq!(first.newlines_before, 0);
        assert_eq!(second.newlines_before, 2);
    }

    #[test]
    fn doc_comment_collapses_contiguous_lines() {
        let mut tokenizer = Tokenizer::new("/// first\n/// second\nx");
        let doc = tokenizer.next_token().unwrap();
        assert_eq!(doc.kind, TokenKind::DocComment("first\nsecond".into()));
        let ident = tokenizer.next_token().unwrap();
        assert_eq!(ident.kind, TokenKind::Identifier("x".into()));
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(kinds("1 // two\n2"), vec![TokenKind::Integer(1), TokenKind::Integer(2)]);
    }

    #[test]
    fn ellipsis_and_arrow() {
        assert_eq!(kinds("... ->"), vec![TokenKind::Ellipsis, TokenKind::Arrow]);
    }
}
