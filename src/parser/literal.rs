//! Hand-written reader for JavaScript-style data literals.
//!
//! Two dialects share one recursive-descent reader:
//! - `Dialect::Strict` accepts literal data shapes only: arrays, objects with
//!   quoted keys, quoted strings, numbers, `null`/`true`/`false` and the host
//!   spellings `None`/`True`/`False`, with optional trailing commas.
//! - `Dialect::Expression` additionally evaluates a small expression subset:
//!   unquoted keys, comments, `+` on strings and numbers, parentheses, unary
//!   signs, backtick strings without substitutions and `undefined`.
//!
//! Keywords are recognized as whole tokens, never inside string contents.

use serde_json::{Map, Number, Value};
use std::fmt;

const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Strict,
    Expression,
}

/// Position-tagged syntax error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub offset: usize,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.offset)
    }
}

impl std::error::Error for SyntaxError {}

type ReadResult<T> = Result<T, SyntaxError>;

/// Reads one complete literal from `src`; trailing non-blank input is an error.
pub fn read_literal(src: &str, dialect: Dialect) -> ReadResult<Value> {
    let mut reader = Reader {
        src,
        pos: 0,
        depth: 0,
        dialect,
    };
    reader.skip_blank()?;
    let value = reader.expression()?;
    reader.skip_blank()?;
    if reader.pos < src.len() {
        return Err(reader.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
    dialect: Dialect,
}

impl<'a> Reader<'a> {
    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, expected: char) -> ReadResult<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}' but found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}' but reached end of input", expected))),
        }
    }

    fn expressions_enabled(&self) -> bool {
        self.dialect == Dialect::Expression
    }

    /// Skips whitespace, plus comments in the expression dialect
    fn skip_blank(&mut self) -> ReadResult<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == '\u{FEFF}' => {
                    self.bump();
                }
                Some('/') if self.expressions_enabled() => match self.peek_second() {
                    Some('/') => {
                        while let Some(c) = self.bump() {
                            if c == '\n' {
                                break;
                            }
                        }
                    }
                    Some('*') => match self.src[self.pos + 2..].find("*/") {
                        Some(end) => self.pos += 2 + end + 2,
                        None => return Err(self.error("unterminated block comment")),
                    },
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn enter(&mut self) -> ReadResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expression(&mut self) -> ReadResult<Value> {
        if !self.expressions_enabled() {
            return self.primary();
        }
        let mut left = self.unary()?;
        loop {
            self.skip_blank()?;
            if self.peek() != Some('+') {
                return Ok(left);
            }
            let at = self.pos;
            self.bump();
            self.skip_blank()?;
            let right = self.unary()?;
            left = add(left, right).map_err(|message| SyntaxError { offset: at, message })?;
        }
    }

    fn unary(&mut self) -> ReadResult<Value> {
        match self.peek() {
            Some(sign @ ('-' | '+')) if !self.peek_second().is_some_and(|c| c.is_ascii_digit() || c == '.') => {
                let at = self.pos;
                self.bump();
                self.skip_blank()?;
                self.enter()?;
                let operand = self.unary()?;
                self.leave();
                if sign == '+' {
                    return match operand {
                        Value::Number(_) => Ok(operand),
                        _ => Err(SyntaxError {
                            offset: at,
                            message: "unary '+' applied to a non-number".into(),
                        }),
                    };
                }
                negate(&operand).ok_or(SyntaxError {
                    offset: at,
                    message: "unary '-' applied to a non-number".into(),
                })
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> ReadResult<Value> {
        match self.peek() {
            Some('[') => self.array(),
            Some('{') => self.object(),
            Some(quote @ ('"' | '\'')) => self.quoted(quote).map(Value::String),
            Some('`') if self.expressions_enabled() => self.template().map(Value::String),
            Some('(') if self.expressions_enabled() => {
                self.bump();
                self.enter()?;
                self.skip_blank()?;
                let inner = self.expression()?;
                self.skip_blank()?;
                self.expect(')')?;
                self.leave();
                Ok(inner)
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(c) if is_ident_start(c) => self.keyword(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn array(&mut self) -> ReadResult<Value> {
        self.expect('[')?;
        self.enter()?;
        let mut items = Vec::new();
        loop {
            self.skip_blank()?;
            if self.peek() == Some(']') {
                self.bump();
                break;
            }
            items.push(self.expression()?);
            self.skip_blank()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {
                    self.bump();
                    break;
                }
                _ => return Err(self.error("expected ',' or ']' in array")),
            }
        }
        self.leave();
        Ok(Value::Array(items))
    }

    fn object(&mut self) -> ReadResult<Value> {
        self.expect('{')?;
        self.enter()?;
        let mut fields = Map::new();
        loop {
            self.skip_blank()?;
            if self.peek() == Some('}') {
                self.bump();
                break;
            }
            let key = self.key()?;
            self.skip_blank()?;
            self.expect(':')?;
            self.skip_blank()?;
            let value = self.expression()?;
            fields.insert(key, value);
            self.skip_blank()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    break;
                }
                _ => return Err(self.error("expected ',' or '}' in object")),
            }
        }
        self.leave();
        Ok(Value::Object(fields))
    }

    fn key(&mut self) -> ReadResult<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.quoted(quote),
            Some(c) if c.is_ascii_digit() => match self.number()? {
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(self.error("invalid numeric key")),
            },
            Some(c) if is_ident_start(c) => {
                if !self.expressions_enabled() {
                    return Err(self.error("unquoted object key"));
                }
                Ok(self.identifier().to_string())
            }
            Some(c) => Err(self.error(format!("unexpected character '{}' in object key", c))),
            None => Err(self.error("unexpected end of input in object")),
        }
    }

    fn identifier(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.bump();
            } else {
                break;
            }
        }
        &src[start..self.pos]
    }

    fn keyword(&mut self) -> ReadResult<Value> {
        let start = self.pos;
        let word = self.identifier();
        let value = match word {
            "null" | "None" => Value::Null,
            "true" | "True" => Value::Bool(true),
            "false" | "False" => Value::Bool(false),
            "undefined" if self.expressions_enabled() => Value::Null,
            _ => {
                self.pos = start;
                return Err(self.error(format!("'{}' is not a literal", word)));
            }
        };
        Ok(value)
    }

    fn number(&mut self) -> ReadResult<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.bump();
        }

        if self.expressions_enabled() && self.peek() == Some('0') && matches!(self.peek_second(), Some('x' | 'X')) {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            let digits = &self.src[digits_start..self.pos];
            let magnitude = i64::from_str_radix(digits, 16).map_err(|_| SyntaxError {
                offset: start,
                message: "invalid hexadecimal number".into(),
            })?;
            let value = if self.src[start..].starts_with('-') { -magnitude } else { magnitude };
            return Ok(Value::Number(value.into()));
        }

        let mut integral = true;
        let mut digits = 0;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            digits += 1;
        }
        if self.peek() == Some('.') {
            integral = false;
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
                digits += 1;
            }
        }
        if digits == 0 {
            self.pos = start;
            return Err(self.error("invalid number"));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            integral = false;
            self.bump();
            if matches!(self.peek(), Some('-' | '+')) {
                self.bump();
            }
            let exp_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            if self.pos == exp_start {
                return Err(self.error("missing exponent digits"));
            }
        }

        let text = self.src[start..self.pos].trim_start_matches('+');
        if integral {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
            if let Ok(n) = text.parse::<u64>() {
                return Ok(Value::Number(n.into()));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or(SyntaxError {
                offset: start,
                message: format!("number '{}' is out of range", text),
            })
    }

    fn quoted(&mut self, quote: char) -> ReadResult<String> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some('\n') | None => {
                    self.pos = start;
                    return Err(self.error("unterminated string"));
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn template(&mut self) -> ReadResult<String> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('`') => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some('$') if self.peek() == Some('{') => {
                    return Err(self.error("template substitutions are not supported"));
                }
                Some(c) => out.push(c),
                None => {
                    self.pos = start;
                    return Err(self.error("unterminated template string"));
                }
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> ReadResult<()> {
        let at = self.pos;
        let c = self.bump().ok_or_else(|| self.error("unterminated escape sequence"))?;
        match c {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let code = self.hex_digits(2, at)?;
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            'u' => {
                let code = self.unicode_escape(at)?;
                if (0xD800..0xDC00).contains(&code) && self.src[self.pos..].starts_with("\\u") {
                    let resume = self.pos;
                    self.pos += 2;
                    let low = self.unicode_escape(at)?;
                    if (0xDC00..0xE000).contains(&low) {
                        let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                        out.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                        return Ok(());
                    }
                    self.pos = resume;
                }
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            '\r' => {
                if self.peek() == Some('\n') {
                    self.bump();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
        Ok(())
    }

    fn unicode_escape(&mut self, at: usize) -> ReadResult<u32> {
        if self.peek() == Some('{') {
            self.bump();
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            let code = u32::from_str_radix(&self.src[start..self.pos], 16).map_err(|_| SyntaxError {
                offset: at,
                message: "invalid unicode escape".into(),
            })?;
            self.expect('}')?;
            return Ok(code);
        }
        self.hex_digits(4, at)
    }

    fn hex_digits(&mut self, count: usize, at: usize) -> ReadResult<u32> {
        let end = self.pos + count;
        let digits = self
            .src
            .get(self.pos..end)
            .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or(SyntaxError {
                offset: at,
                message: "invalid hex escape".into(),
            })?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| SyntaxError {
            offset: at,
            message: "invalid hex escape".into(),
        })?;
        self.pos = end;
        Ok(code)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn negate(value: &Value) -> Option<Value> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64().and_then(i64::checked_neg) {
        return Some(Value::Number(i.into()));
    }
    n.as_f64().and_then(|f| Number::from_f64(-f)).map(Value::Number)
}

/// JavaScript `+` restricted to strings and numbers
fn add(left: Value, right: Value) -> Result<Value, String> {
    match (left, right) {
        (Value::String(mut a), Value::String(b)) => {
            a.push_str(&b);
            Ok(Value::String(a))
        }
        (Value::String(mut a), Value::Number(b)) => {
            a.push_str(&b.to_string());
            Ok(Value::String(a))
        }
        (Value::Number(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                if let Some(sum) = x.checked_add(y) {
                    return Ok(Value::Number(sum.into()));
                }
            }
            match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Number::from_f64(x + y)
                    .map(Value::Number)
                    .ok_or_else(|| "numeric overflow".to_string()),
                _ => Err("numeric overflow".to_string()),
            }
        }
        _ => Err("'+' is only supported between strings and numbers".to_string()),
    }
}
