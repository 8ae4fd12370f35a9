//! Arithmetic evaluator for resolved template values.
//!
//! Accepts numeric literals (integers, decimals, exponents, `inf`, `nan`), the binary
//! operators `+ - * /`, unary signs and parentheses. Nothing else is evaluated.
//!
//! Integers stay integers under `+ - *`; `/` is true division and always produces a
//! float. Mixing an integer with a float promotes to float. Nesting beyond
//! [`MAX_DEPTH`] levels is rejected with `ExprError::TooDeep`.

use std::fmt;

use crate::common::{ExprError, format_float};

/// Deepest nesting of parentheses and unary signs accepted.
pub const MAX_DEPTH: usize = 256;

/// Result of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Exact integer.
    Int(i64),
    /// Floating-point value.
    Float(f64),
}

impl Number {
    /// The value as a float.
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Int(n) => n as f64,
            Self::Float(x) => x,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/// Evaluates an arithmetic expression.
///
/// # Arguments
///
/// * `text` - The expression. Surrounding whitespace is ignored.
///
/// # Returns
///
/// The value, or an `ExprError` describing the first problem found.
pub fn evaluate(text: &str) -> Result<Number, ExprError> {
    let mut parser = Parser { text, pos: 0, depth: 0 };
    parser.skip_ws();
    if parser.at_end() {
        return Err(ExprError::Empty);
    }
    let value = parser.expr()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.unexpected());
    }
    Ok(value)
}

struct Parser<'t> {
    text: &'t str,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn unexpected(&self) -> ExprError {
        match self.peek() {
            Some(c) => ExprError::Unexpected {
                found: c.to_string(),
                offset: self.pos,
            },
            None => ExprError::UnexpectedEnd,
        }
    }

    fn descend(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    /// `term (('+' | '-') term)*`
    fn expr(&mut self) -> Result<Number, ExprError> {
        let mut acc = self.term()?;
        loop {
            self.skip_ws();
            let op = match self.peek() {
                Some(c @ ('+' | '-')) => c,
                _ => return Ok(acc),
            };
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == '+' { add(acc, rhs)? } else { sub(acc, rhs)? };
        }
    }

    /// `unary (('*' | '/') unary)*`
    fn term(&mut self) -> Result<Number, ExprError> {
        let mut acc = self.unary()?;
        loop {
            self.skip_ws();
            let op = match self.peek() {
                Some(c @ ('*' | '/')) => c,
                _ => return Ok(acc),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            acc = if op == '*' { mul(acc, rhs)? } else { div(acc, rhs)? };
        }
    }

    /// `('+' | '-') unary | primary`
    fn unary(&mut self) -> Result<Number, ExprError> {
        self.skip_ws();
        match self.peek() {
            Some(sign @ ('+' | '-')) => {
                self.pos += 1;
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                match (sign, value) {
                    ('+', _) => Ok(value),
                    (_, Number::Int(n)) => n.checked_neg().map(Number::Int).ok_or(ExprError::Overflow),
                    (_, Number::Float(x)) => Ok(Number::Float(-x)),
                }
            }
            _ => self.primary(),
        }
    }

    /// `number | 'inf' | 'nan' | '(' expr ')'`
    fn primary(&mut self) -> Result<Number, ExprError> {
        self.skip_ws();
        match self.peek() {
            None => Err(ExprError::UnexpectedEnd),
            Some('(') => {
                self.pos += 1;
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                self.skip_ws();
                if self.peek() != Some(')') {
                    return Err(self.unexpected());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(_) => self.keyword(),
        }
    }

    fn keyword(&mut self) -> Result<Number, ExprError> {
        for (word, value) in [("inf", f64::INFINITY), ("nan", f64::NAN)] {
            if self.rest().starts_with(word) {
                self.pos += word.len();
                return Ok(Number::Float(value));
            }
        }
        Err(self.unexpected())
    }

    fn number(&mut self) -> Result<Number, ExprError> {
        let start = self.pos;
        let bytes = self.text.as_bytes();
        let mut end = start;
        let mut is_float = false;

        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end < bytes.len() && bytes[end] == b'.' {
            is_float = true;
            end += 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
        if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
            let mut exp = end + 1;
            if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
                exp += 1;
            }
            if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                is_float = true;
                end = exp;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
            }
        }

        let literal = &self.text[start..end];
        self.pos = end;
        if is_float {
            literal.parse::<f64>().map(Number::Float).map_err(|_| ExprError::Unexpected {
                found: literal.to_owned(),
                offset: start,
            })
        } else {
            literal.parse::<i64>().map(Number::Int).map_err(|_| ExprError::Overflow)
        }
    }
}

fn add(lhs: Number, rhs: Number) -> Result<Number, ExprError> {
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => a.checked_add(b).map(Number::Int).ok_or(ExprError::Overflow),
        _ => Ok(Number::Float(lhs.as_f64() + rhs.as_f64())),
    }
}

fn sub(lhs: Number, rhs: Number) -> Result<Number, ExprError> {
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => a.checked_sub(b).map(Number::Int).ok_or(ExprError::Overflow),
        _ => Ok(Number::Float(lhs.as_f64() - rhs.as_f64())),
    }
}

fn mul(lhs: Number, rhs: Number) -> Result<Number, ExprError> {
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => a.checked_mul(b).map(Number::Int).ok_or(ExprError::Overflow),
        _ => Ok(Number::Float(lhs.as_f64() * rhs.as_f64())),
    }
}

fn div(lhs: Number, rhs: Number) -> Result<Number, ExprError> {
    let divisor = rhs.as_f64();
    if divisor == 0.0 {
        return Err(ExprError::DivisionByZero);
    }
    Ok(Number::Float(lhs.as_f64() / divisor))
}
