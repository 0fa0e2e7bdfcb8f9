// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Portable filter text parser
//!
//! Grammar, precedence low to high (`&&` binds tighter than `||`, `NOT`
//! tighter than both, parentheses override):
//!
//! ```text
//! expr       := orExpr
//! orExpr     := andExpr ('||' andExpr)*
//! andExpr    := term ('&&' term)*
//! term       := '(' expr ')' | NOT term | comparison
//! comparison := IDENT ('=' | '!=' | '>' | '>=' | '<' | '<=') literal
//!             | IDENT 'in' '[' literal (',' literal)* ']'
//! literal    := quoted string | integer | float | true | false
//! ```
//!
//! This text syntax is a stable wire contract: whitespace-insensitive, a
//! single left-to-right recursive-descent pass, no backtracking. Every
//! failure carries the byte position it occurred at.

use thiserror::Error;

use crate::core::types::ScalarValue;
use crate::filter::ast::{CompareOp, FilterExpression, LogicalOp};

/// Malformed filter text, with the byte position of the offending input
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parse error at position {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

impl ParseError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    AndAnd,
    OrOr,
    Not,
    In,
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Str(_) => "string literal".to_string(),
            Token::Int(_) | Token::Float(_) => "number literal".to_string(),
            Token::Bool(_) => "boolean literal".to_string(),
            Token::AndAnd => "'&&'".to_string(),
            Token::OrOr => "'||'".to_string(),
            Token::Not => "'NOT'".to_string(),
            Token::In => "'in'".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Ne => "'!='".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Gte => "'>='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Lte => "'<='".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Comma => "','".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct SpannedToken {
    token: Token,
    position: usize,
}

fn lex(input: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(SpannedToken { token: Token::LParen, position: pos });
            }
            ')' => {
                chars.next();
                tokens.push(SpannedToken { token: Token::RParen, position: pos });
            }
            '[' => {
                chars.next();
                tokens.push(SpannedToken { token: Token::LBracket, position: pos });
            }
            ']' => {
                chars.next();
                tokens.push(SpannedToken { token: Token::RBracket, position: pos });
            }
            ',' => {
                chars.next();
                tokens.push(SpannedToken { token: Token::Comma, position: pos });
            }
            '=' => {
                chars.next();
                tokens.push(SpannedToken { token: Token::Eq, position: pos });
            }
            '!' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '=')) => {
                        chars.next();
                        tokens.push(SpannedToken { token: Token::Ne, position: pos });
                    }
                    _ => return Err(ParseError::new(pos, "expected '=' after '!'")),
                }
            }
            '>' => {
                chars.next();
                if let Some(&(_, '=')) = chars.peek() {
                    chars.next();
                    tokens.push(SpannedToken { token: Token::Gte, position: pos });
                } else {
                    tokens.push(SpannedToken { token: Token::Gt, position: pos });
                }
            }
            '<' => {
                chars.next();
                if let Some(&(_, '=')) = chars.peek() {
                    chars.next();
                    tokens.push(SpannedToken { token: Token::Lte, position: pos });
                } else {
                    tokens.push(SpannedToken { token: Token::Lt, position: pos });
                }
            }
            '&' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '&')) => {
                        chars.next();
                        tokens.push(SpannedToken { token: Token::AndAnd, position: pos });
                    }
                    _ => return Err(ParseError::new(pos, "expected '&&'")),
                }
            }
            '|' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '|')) => {
                        chars.next();
                        tokens.push(SpannedToken { token: Token::OrOr, position: pos });
                    }
                    _ => return Err(ParseError::new(pos, "expected '||'")),
                }
            }
            '\'' | '"' => {
                tokens.push(lex_string(&mut chars, pos, ch)?);
            }
            '-' => {
                // Only valid as a numeric sign.
                match bytes.get(pos + 1) {
                    Some(b) if b.is_ascii_digit() => {
                        tokens.push(lex_number(&mut chars, pos)?);
                    }
                    _ => return Err(ParseError::new(pos, "expected digit after '-'")),
                }
            }
            c if c.is_ascii_digit() => {
                tokens.push(lex_number(&mut chars, pos)?);
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let token = if ident.eq_ignore_ascii_case("not") {
                    Token::Not
                } else if ident.eq_ignore_ascii_case("in") {
                    Token::In
                } else if ident.eq_ignore_ascii_case("true") {
                    Token::Bool(true)
                } else if ident.eq_ignore_ascii_case("false") {
                    Token::Bool(false)
                } else {
                    Token::Ident(ident)
                };
                tokens.push(SpannedToken { token, position: pos });
            }
            c => {
                return Err(ParseError::new(pos, format!("unexpected character '{}'", c)));
            }
        }
    }

    Ok(tokens)
}

fn lex_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
    quote: char,
) -> Result<SpannedToken, ParseError> {
    chars.next(); // opening quote
    let mut value = String::new();
    loop {
        match chars.next() {
            Some((_, c)) if c == quote => {
                return Ok(SpannedToken {
                    token: Token::Str(value),
                    position: start,
                });
            }
            Some((pos, '\\')) => match chars.next() {
                Some((_, '\\')) => value.push('\\'),
                Some((_, '\'')) => value.push('\''),
                Some((_, '"')) => value.push('"'),
                Some((_, c)) => {
                    return Err(ParseError::new(pos, format!("invalid escape '\\{}'", c)));
                }
                None => return Err(ParseError::new(start, "unterminated string literal")),
            },
            Some((_, c)) => value.push(c),
            None => return Err(ParseError::new(start, "unterminated string literal")),
        }
    }
}

fn lex_number(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
) -> Result<SpannedToken, ParseError> {
    let mut text = String::new();
    if let Some(&(_, '-')) = chars.peek() {
        text.push('-');
        chars.next();
    }
    let mut is_float = false;
    while let Some(&(pos, c)) = chars.peek() {
        if c.is_ascii_digit() {
            text.push(c);
            chars.next();
        } else if c == '.' && !is_float {
            is_float = true;
            text.push(c);
            chars.next();
            match chars.peek() {
                Some(&(_, d)) if d.is_ascii_digit() => {}
                _ => {
                    return Err(ParseError::new(pos, "expected digit after decimal point"));
                }
            }
        } else {
            break;
        }
    }

    let token = if is_float {
        let value = text
            .parse::<f64>()
            .map_err(|_| ParseError::new(start, format!("invalid number '{}'", text)))?;
        Token::Float(value)
    } else {
        let value = text
            .parse::<i64>()
            .map_err(|_| ParseError::new(start, format!("invalid number '{}'", text)))?;
        Token::Int(value)
    };
    Ok(SpannedToken { token, position: start })
}

/// Parse portable filter text into a [`FilterExpression`].
pub fn parse(input: &str) -> Result<FilterExpression, ParseError> {
    let tokens = lex(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
    };
    let expr = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(ParseError::new(
            token.position,
            format!("unexpected {} after expression", token.token.describe()),
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek().map(|t| &t.token) == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<SpannedToken, ParseError> {
        match self.advance() {
            Some(token) if token.token == expected => Ok(token),
            Some(token) => Err(ParseError::new(
                token.position,
                format!("expected {}, found {}", what, token.token.describe()),
            )),
            None => Err(ParseError::new(
                self.end,
                format!("expected {}, found end of input", what),
            )),
        }
    }

    fn parse_or(&mut self) -> Result<FilterExpression, ParseError> {
        let first = self.parse_and()?;
        let mut children = vec![first];
        while self.eat(&Token::OrOr) {
            children.push(self.parse_and()?);
        }
        if children.len() == 1 {
            Ok(children.swap_remove(0))
        } else {
            Ok(FilterExpression::Logical {
                op: LogicalOp::Or,
                children,
            })
        }
    }

    fn parse_and(&mut self) -> Result<FilterExpression, ParseError> {
        let first = self.parse_term()?;
        let mut children = vec![first];
        while self.eat(&Token::AndAnd) {
            children.push(self.parse_term()?);
        }
        if children.len() == 1 {
            Ok(children.swap_remove(0))
        } else {
            Ok(FilterExpression::Logical {
                op: LogicalOp::And,
                children,
            })
        }
    }

    fn parse_term(&mut self) -> Result<FilterExpression, ParseError> {
        if self.eat(&Token::LParen) {
            let expr = self.parse_or()?;
            self.expect(Token::RParen, "')'")?;
            return Ok(expr);
        }
        if self.eat(&Token::Not) {
            let child = self.parse_term()?;
            return Ok(FilterExpression::Not {
                child: Box::new(child),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<FilterExpression, ParseError> {
        let field = match self.advance() {
            Some(SpannedToken {
                token: Token::Ident(name),
                ..
            }) => name,
            Some(token) => {
                return Err(ParseError::new(
                    token.position,
                    format!("expected field name, found {}", token.token.describe()),
                ));
            }
            None => {
                return Err(ParseError::new(
                    self.end,
                    "expected field name, found end of input",
                ));
            }
        };

        match self.advance() {
            Some(SpannedToken { token: Token::In, .. }) => self.parse_in_list(field),
            Some(SpannedToken { token, position }) => {
                let op = match token {
                    Token::Eq => CompareOp::Eq,
                    Token::Ne => CompareOp::Ne,
                    Token::Gt => CompareOp::Gt,
                    Token::Gte => CompareOp::Gte,
                    Token::Lt => CompareOp::Lt,
                    Token::Lte => CompareOp::Lte,
                    other => {
                        return Err(ParseError::new(
                            position,
                            format!(
                                "expected comparison operator or 'in', found {}",
                                other.describe()
                            ),
                        ));
                    }
                };
                let (value, _) = self.parse_literal()?;
                Ok(FilterExpression::Comparison { field, op, value })
            }
            None => Err(ParseError::new(
                self.end,
                "expected comparison operator or 'in', found end of input",
            )),
        }
    }

    fn parse_in_list(&mut self, field: String) -> Result<FilterExpression, ParseError> {
        let open = self.expect(Token::LBracket, "'['")?;
        if self.eat(&Token::RBracket) {
            return Err(ParseError::new(open.position, "empty IN list"));
        }

        let (first, _) = self.parse_literal()?;
        let expected = first.type_name();
        let mut values = vec![first];
        while self.eat(&Token::Comma) {
            let (value, position) = self.parse_literal()?;
            // Int and Float are both Number, so they may mix; anything else
            // must match the first literal's type.
            if value.type_name() != expected {
                return Err(ParseError::new(
                    position,
                    format!(
                        "mixed literal types in IN list: expected {}, found {}",
                        expected,
                        value.type_name()
                    ),
                ));
            }
            values.push(value);
        }
        self.expect(Token::RBracket, "']'")?;
        Ok(FilterExpression::In { field, values })
    }

    fn parse_literal(&mut self) -> Result<(ScalarValue, usize), ParseError> {
        match self.advance() {
            Some(SpannedToken { token, position }) => {
                let value = match token {
                    Token::Str(s) => ScalarValue::Text(s),
                    Token::Int(n) => ScalarValue::Int(n),
                    Token::Float(n) => ScalarValue::Float(n),
                    Token::Bool(b) => ScalarValue::Bool(b),
                    other => {
                        return Err(ParseError::new(
                            position,
                            format!("expected literal, found {}", other.describe()),
                        ));
                    }
                };
                Ok((value, position))
            }
            None => Err(ParseError::new(
                self.end,
                "expected literal, found end of input",
            )),
        }
    }
}
