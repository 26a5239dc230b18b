//! Restricted literal grammar for list and record cells
//!
//! Accepts only lists (`[..]`, `(..)`), records (`{key: value}`), quoted
//! strings, numbers, `True`, `False` and `None`. Nothing is ever evaluated:
//! any other token is a parse error.

use std::fmt::Write as _;
use thiserror::Error;

/// Nesting deeper than this is rejected instead of recursing further
pub const MAX_DEPTH: usize = 64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("trailing input at offset {0}")]
    TrailingInput(usize),
}

/// A parsed literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    /// Key/value pairs in source order; a repeated key keeps its last value
    Record(Vec<(String, Literal)>),
}

impl Literal {
    /// Look up a key in a record
    pub fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Literal::Record(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Literal::None)
    }

    /// Falsy values in the source data convention: None, False, 0, empty containers
    pub fn is_truthy(&self) -> bool {
        match self {
            Literal::None => false,
            Literal::Bool(b) => *b,
            Literal::Int(i) => *i != 0,
            Literal::Float(f) => *f != 0.0,
            Literal::Str(s) => !s.is_empty(),
            Literal::List(items) => !items.is_empty(),
            Literal::Record(fields) => !fields.is_empty(),
        }
    }

    /// Text used when the literal becomes a column name or a text cell
    pub fn render(&self) -> String {
        match self {
            Literal::Str(s) => s.clone(),
            other => {
                let mut out = String::new();
                other.write_repr(&mut out);
                out
            }
        }
    }

    fn write_repr(&self, out: &mut String) {
        match self {
            Literal::None => out.push_str("None"),
            Literal::Bool(true) => out.push_str("True"),
            Literal::Bool(false) => out.push_str("False"),
            Literal::Int(i) => {
                let _ = write!(out, "{}", i);
            }
            Literal::Float(f) => out.push_str(&render_float(*f)),
            Literal::Str(s) => {
                out.push('\'');
                for c in s.chars() {
                    match c {
                        '\'' => out.push_str("\\'"),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        _ => out.push(c),
                    }
                }
                out.push('\'');
            }
            Literal::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_repr(out);
                }
                out.push(']');
            }
            Literal::Record(fields) => {
                out.push('{');
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    Literal::Str(k.clone()).write_repr(out);
                    out.push_str(": ");
                    v.write_repr(out);
                }
                out.push('}');
            }
        }
    }
}

/// Float text that stays distinguishable from an integer (`5.0`, not `5`)
pub fn render_float(f: f64) -> String {
    let s = format!("{}", f);
    if f.is_finite() && !s.contains(['.', 'e', 'E']) {
        format!("{}.0", s)
    } else {
        s
    }
}

/// Parse one literal, rejecting anything outside the grammar
pub fn parse(input: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser::new(input);
    let value = parser.value(0)?;
    parser.skip_ws();
    match parser.peek() {
        None => Ok(value),
        Some(_) => Err(LiteralError::TrailingInput(parser.pos)),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> Result<(), LiteralError> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(LiteralError::UnexpectedChar {
                ch: c,
                pos: self.pos - 1,
            }),
            None => Err(LiteralError::UnexpectedEnd),
        }
    }

    fn value(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        if depth > MAX_DEPTH {
            return Err(LiteralError::TooDeep(MAX_DEPTH));
        }
        self.skip_ws();
        match self.peek() {
            None => Err(LiteralError::UnexpectedEnd),
            Some('[') => self.sequence('[', ']', depth).map(Literal::List),
            Some('(') => self.sequence('(', ')', depth).map(Literal::List),
            Some('{') => self.record(depth),
            Some(q @ ('\'' | '"')) => self.string(q).map(Literal::Str),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() => self.keyword(),
            Some(c) => Err(LiteralError::UnexpectedChar { ch: c, pos: self.pos }),
        }
    }

    fn sequence(
        &mut self,
        open: char,
        close: char,
        depth: usize,
    ) -> Result<Vec<Literal>, LiteralError> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.value(depth + 1)?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(items),
                Some(c) => {
                    return Err(LiteralError::UnexpectedChar {
                        ch: c,
                        pos: self.pos - 1,
                    })
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn record(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        self.expect('{')?;
        let mut fields: Vec<(String, Literal)> = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Literal::Record(fields));
            }
            let key = self.value(depth + 1)?.render();
            self.expect(':')?;
            let value = self.value(depth + 1)?;
            match fields.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => fields.push((key, value)),
            }
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Literal::Record(fields)),
                Some(c) => {
                    return Err(LiteralError::UnexpectedChar {
                        ch: c,
                        pos: self.pos - 1,
                    })
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let c = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let escape_at = self.pos - 1;
            let e = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
            match e {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0' => out.push('\0'),
                '\\' | '\'' | '"' => out.push(e),
                '\n' => {}
                'x' => out.push(self.hex_escape(2, escape_at)?),
                'u' => out.push(self.hex_escape(4, escape_at)?),
                'U' => out.push(self.hex_escape(8, escape_at)?),
                _ => return Err(LiteralError::InvalidEscape(escape_at)),
            }
        }
    }

    fn hex_escape(&mut self, digits: usize, escape_at: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        if end > self.chars.len() {
            return Err(LiteralError::InvalidEscape(escape_at));
        }
        let text: String = self.chars[self.pos..end].iter().collect();
        self.pos = end;
        u32::from_str_radix(&text, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(LiteralError::InvalidEscape(escape_at))
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    if matches!(self.chars.get(self.pos + 1), Some('-' | '+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        let invalid = || LiteralError::InvalidNumber(text.clone());
        if is_float {
            return text.parse::<f64>().map(Literal::Float).map_err(|_| invalid());
        }
        match text.parse::<i64>() {
            Ok(i) => Ok(Literal::Int(i)),
            // Integers past i64 keep their magnitude as floats
            Err(_) => text.parse::<f64>().map(Literal::Float).map_err(|_| invalid()),
        }
    }

    fn keyword(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "None" => Ok(Literal::None),
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            _ => Err(LiteralError::UnexpectedChar {
                ch: self.chars[start],
                pos: start,
            }),
        }
    }
}
