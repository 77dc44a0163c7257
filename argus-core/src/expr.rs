//! A small embedded expression evaluator for assembler operand expressions.
//!
//! Grammar:
//! ```text
//! expr   := term (('+' | '-' | '|' | '^') term)*
//! term   := factor (('*' | '&' | '%') factor)*
//! factor := ['+' | '-'] (number | ident | '(' expr ')')
//! ```
//! Numbers are decimal or `0x`-prefixed hexadecimal. Identifiers are resolved against a
//! caller-supplied symbol table; an unresolved identifier is an evaluation error, not a panic.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError(pub String);

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves identifiers (register names, labels, `EQU` names, and the pseudo-symbol `PC`)
/// to their bound 24-bit value.
pub trait SymbolResolver {
    fn resolve(&self, name: &str) -> Option<u32>;
}

impl<F> SymbolResolver for F
where
    F: Fn(&str) -> Option<u32>,
{
    fn resolve(&self, name: &str) -> Option<u32> {
        self(name)
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    symbols: &'a dyn SymbolResolver,
}

/// Evaluate `input` as an expression, resolving identifiers through `symbols`. Arithmetic is
/// performed in `u32` and wraps the way the target 24-bit machine word arithmetic does;
/// callers mask the result to the field width they need (14 bits for operands, 24 for words).
pub fn eval(input: &str, symbols: &dyn SymbolResolver) -> Result<u32, EvalError> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
        symbols,
    };
    parser.skip_ws();
    let value = parser.parse_expr()?;
    parser.skip_ws();
    if parser.chars.peek().is_some() {
        return Err(EvalError(format!(
            "unexpected trailing input in expression: {:?}",
            input
        )));
    }
    Ok(value)
}

impl<'a> Parser<'a> {
    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn parse_expr(&mut self) -> Result<u32, EvalError> {
        let mut value = self.parse_term()?;
        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some('+') => {
                    self.chars.next();
                    value = value.wrapping_add(self.parse_term()?);
                }
                Some('-') => {
                    self.chars.next();
                    value = value.wrapping_sub(self.parse_term()?);
                }
                Some('|') => {
                    self.chars.next();
                    value |= self.parse_term()?;
                }
                Some('^') => {
                    self.chars.next();
                    value ^= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_term(&mut self) -> Result<u32, EvalError> {
        let mut value = self.parse_factor()?;
        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some('*') => {
                    self.chars.next();
                    value = value.wrapping_mul(self.parse_factor()?);
                }
                Some('&') => {
                    self.chars.next();
                    value &= self.parse_factor()?;
                }
                Some('%') => {
                    self.chars.next();
                    let divisor = self.parse_factor()?;
                    if divisor == 0 {
                        return Err(EvalError("modulo by zero in expression".to_string()));
                    }
                    value %= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_factor(&mut self) -> Result<u32, EvalError> {
        self.skip_ws();
        let mut negate = false;
        match self.chars.peek() {
            Some('+') => {
                self.chars.next();
            }
            Some('-') => {
                negate = true;
                self.chars.next();
            }
            _ => {}
        }
        self.skip_ws();

        let value = match self.chars.peek() {
            Some('(') => {
                self.chars.next();
                let inner = self.parse_expr()?;
                self.skip_ws();
                match self.chars.next() {
                    Some(')') => inner,
                    other => {
                        return Err(EvalError(format!(
                            "expected ')' in expression, found {:?}",
                            other
                        )))
                    }
                }
            }
            Some(c) if c.is_ascii_digit() => self.parse_number()?,
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_ident()?,
            other => {
                return Err(EvalError(format!(
                    "unexpected character in expression: {:?}",
                    other
                )))
            }
        };

        Ok(if negate { (!value).wrapping_add(1) } else { value })
    }

    fn parse_number(&mut self) -> Result<u32, EvalError> {
        let mut text = String::new();
        if self.chars.peek() == Some(&'0') {
            text.push(self.chars.next().unwrap());
            if matches!(self.chars.peek(), Some('x') | Some('X')) {
                self.chars.next();
                let mut hex = String::new();
                while matches!(self.chars.peek(), Some(c) if c.is_ascii_hexdigit()) {
                    hex.push(self.chars.next().unwrap());
                }
                return u32::from_str_radix(&hex, 16)
                    .map_err(|_| EvalError(format!("invalid hex literal: 0x{}", hex)));
            }
        }
        while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
            text.push(self.chars.next().unwrap());
        }
        text.parse::<u32>()
            .map_err(|_| EvalError(format!("invalid numeric literal: {}", text)))
    }

    fn parse_ident(&mut self) -> Result<u32, EvalError> {
        let mut name = String::new();
        while matches!(self.chars.peek(), Some(c) if c.is_alphanumeric() || *c == '_') {
            name.push(self.chars.next().unwrap());
        }
        self.symbols
            .resolve(&name)
            .ok_or_else(|| EvalError(format!("undefined symbol: {}", name)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn no_symbols(_: &str) -> Option<u32> {
        None
    }

    #[test]
    fn evaluates_arithmetic_with_precedence() {
        assert_eq!(eval("1 + 2 * 3", &no_symbols).unwrap(), 7);
        assert_eq!(eval("(1 + 2) * 3", &no_symbols).unwrap(), 9);
    }

    #[test]
    fn evaluates_hex_literals() {
        assert_eq!(eval("0x10", &no_symbols).unwrap(), 16);
        assert_eq!(eval("0x10 + 1", &no_symbols).unwrap(), 17);
    }

    #[test]
    fn evaluates_bitwise_operators() {
        assert_eq!(eval("0x0F & 0x03", &no_symbols).unwrap(), 0x03);
        assert_eq!(eval("0x0F | 0x10", &no_symbols).unwrap(), 0x1F);
        assert_eq!(eval("0x0F ^ 0x0F", &no_symbols).unwrap(), 0);
    }

    #[test]
    fn resolves_symbols() {
        let resolve = |name: &str| if name == "foo" { Some(42) } else { None };
        assert_eq!(eval("foo + 1", &resolve).unwrap(), 43);
    }

    #[test]
    fn unary_minus_wraps() {
        assert_eq!(eval("-1", &no_symbols).unwrap(), 0xFFFF_FFFF);
    }

    #[test]
    fn undefined_symbol_is_an_error() {
        assert!(eval("bar", &no_symbols).is_err());
    }
}
