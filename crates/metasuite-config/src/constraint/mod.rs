//! Version constraint expressions.
//!
//! A constraint gates a section on the version of its own package or of a
//! dependency, e.g. `version >= 2.0 and version < 3.0`. Expressions are
//! tokenized with `nom` and parsed by recursive descent into an [`ast::Expr`];
//! nothing is ever handed to a general-purpose evaluator.
//!
//! ```text
//! expr       := and_expr ( "or" and_expr )*
//! and_expr   := primary ( "and" primary )*
//! primary    := "(" expr ")" | comparison
//! comparison := operand comparator operand
//! operand    := "version" | literal
//! ```

pub mod ast;
pub mod lexer;

use std::fmt;
use std::str::FromStr;

use metasuite_common::error::{MetasuiteError, Result};

use self::ast::{Expr, Operand};
use self::lexer::Token;
use crate::version::Version;

/// Cursor into a token stream for recursive-descent parsing.
struct TokenCursor<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    const fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_token(&mut self, expected: &Token) -> Result<()> {
        let source = self.source;
        match self.advance() {
            Some(tok) if tok == expected => Ok(()),
            other => Err(parse_err(
                source,
                format!("expected {expected:?}, got {other:?}"),
            )),
        }
    }

    const fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

fn parse_err(source: &str, message: String) -> MetasuiteError {
    MetasuiteError::Parse {
        expression: source.to_owned(),
        message,
    }
}

fn parse_or(cursor: &mut TokenCursor<'_>) -> Result<Expr> {
    let mut expr = parse_and(cursor)?;
    while cursor.peek() == Some(&Token::Or) {
        let _ = cursor.advance();
        let rhs = parse_and(cursor)?;
        expr = Expr::Or(Box::new(expr), Box::new(rhs));
    }
    Ok(expr)
}

fn parse_and(cursor: &mut TokenCursor<'_>) -> Result<Expr> {
    let mut expr = parse_primary(cursor)?;
    while cursor.peek() == Some(&Token::And) {
        let _ = cursor.advance();
        let rhs = parse_primary(cursor)?;
        expr = Expr::And(Box::new(expr), Box::new(rhs));
    }
    Ok(expr)
}

fn parse_primary(cursor: &mut TokenCursor<'_>) -> Result<Expr> {
    if cursor.peek() == Some(&Token::ParenOpen) {
        let _ = cursor.advance();
        let inner = parse_or(cursor)?;
        cursor.expect_token(&Token::ParenClose)?;
        return Ok(inner);
    }

    let lhs = parse_operand(cursor)?;
    let source = cursor.source;
    let op = match cursor.advance() {
        Some(Token::Op(op)) => *op,
        other => {
            return Err(parse_err(
                source,
                format!("expected comparison operator, got {other:?}"),
            ));
        }
    };
    let rhs = parse_operand(cursor)?;

    if let Some(Token::Op(extra)) = cursor.peek() {
        return Err(parse_err(
            source,
            format!("comparisons do not chain (unexpected {extra})"),
        ));
    }

    Ok(Expr::Compare { lhs, op, rhs })
}

fn parse_operand(cursor: &mut TokenCursor<'_>) -> Result<Operand> {
    let source = cursor.source;
    match cursor.advance() {
        Some(Token::Subject) => Ok(Operand::Subject),
        Some(Token::Literal(text)) => Ok(Operand::Literal(Version::parse(text))),
        other => Err(parse_err(
            source,
            format!("expected `version` or a version literal, got {other:?}"),
        )),
    }
}

/// A parsed constraint, reusable against any number of subjects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    source: String,
    expr: Expr,
}

impl Constraint {
    /// Parses a constraint expression.
    ///
    /// # Errors
    ///
    /// Returns [`MetasuiteError::Parse`] if the expression is empty, holds an
    /// unknown token, is missing an operand or operator, chains comparisons,
    /// or has trailing tokens.
    pub fn parse(expression: &str) -> Result<Self> {
        let tokens = lexer::tokenize(expression)?;
        if tokens.is_empty() {
            return Err(parse_err(expression, "empty expression".into()));
        }

        let mut cursor = TokenCursor::new(expression, &tokens);
        let expr = parse_or(&mut cursor)?;
        if !cursor.at_end() {
            return Err(parse_err(
                expression,
                format!("unexpected trailing token {:?}", cursor.peek()),
            ));
        }

        Ok(Self {
            source: expression.trim().to_owned(),
            expr,
        })
    }

    /// Returns true if `subject` satisfies the constraint.
    #[must_use]
    pub fn matches(&self, subject: &Version) -> bool {
        self.expr.evaluate(subject)
    }

    /// Returns the expression text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Constraint {
    type Err = MetasuiteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Evaluates `expression` with `version` bound to `subject`.
///
/// # Errors
///
/// Returns [`MetasuiteError::Parse`] if the expression is malformed.
pub fn evaluate(subject: &str, expression: &str) -> Result<bool> {
    let constraint = Constraint::parse(expression)?;
    Ok(constraint.matches(&Version::parse(subject)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_accepts_inside_and_rejects_upper_bound() {
        let expr = r#"version >= "2.0" and version < "3.0""#;
        assert!(evaluate("2.1", expr).expect("should evaluate"));
        assert!(!evaluate("3.0", expr).expect("should evaluate"));
        assert!(!evaluate("1.9", expr).expect("should evaluate"));
    }

    #[test]
    fn bare_literals_match_quoted_ones() {
        assert_eq!(
            evaluate("5.34", "version == 5.34").expect("should evaluate"),
            evaluate("5.34", "version == '5.34'").expect("should evaluate")
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        // true or (false and false)
        let expr = "version == 1.0 or version > 5 and version < 2";
        assert!(evaluate("1.0", expr).expect("should evaluate"));
        assert!(!evaluate("6", expr).expect("should evaluate"));
    }

    #[test]
    fn parentheses_group() {
        let expr = "(version == 1.0 or version > 5) and version < 6";
        assert!(evaluate("1.0", expr).expect("should evaluate"));
        assert!(evaluate("5.5", expr).expect("should evaluate"));
        assert!(!evaluate("7", expr).expect("should evaluate"));
    }

    #[test]
    fn literal_may_be_on_the_left() {
        assert!(evaluate("2.0", "1.0 < version").expect("should evaluate"));
        assert!(evaluate("2.0", "1.0 < 1.5").expect("should evaluate"));
    }

    #[test]
    fn all_comparators() {
        assert!(evaluate("1.0", "version == 1.0.0").expect("eq"));
        assert!(evaluate("1.0", "version != 1.1").expect("ne"));
        assert!(evaluate("1.0", "version <= 1.0").expect("le"));
        assert!(evaluate("1.0", "version >= 1.0").expect("ge"));
        assert!(evaluate("1.0", "version > 0.9").expect("gt"));
        assert!(evaluate("1.0", "version < 1.0.1").expect("lt"));
    }

    #[test]
    fn parsed_constraint_is_reusable() {
        let constraint = Constraint::parse("version < 2").expect("should parse");
        assert!(constraint.matches(&Version::parse("1.9")));
        assert!(!constraint.matches(&Version::parse("2.0")));
        assert_eq!(constraint.to_string(), "version < 2");
    }

    #[test]
    fn rejects_empty_expression() {
        assert!(matches!(
            Constraint::parse("  "),
            Err(MetasuiteError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_missing_operand() {
        assert!(evaluate("1.0", "version >=").is_err());
        assert!(evaluate("1.0", ">= 1.0").is_err());
    }

    #[test]
    fn rejects_bare_operand() {
        assert!(evaluate("1.0", "version").is_err());
    }

    #[test]
    fn rejects_chained_comparison() {
        let err = evaluate("1.5", "1.0 < version < 2.0").expect_err("chains are not supported");
        assert!(err.to_string().contains("do not chain"), "got: {err}");
    }

    #[test]
    fn rejects_dangling_connective() {
        assert!(evaluate("1.0", "version > 0.5 and").is_err());
        assert!(evaluate("1.0", "or version > 0.5").is_err());
    }

    #[test]
    fn rejects_unbalanced_parentheses() {
        assert!(evaluate("1.0", "(version > 0.5").is_err());
        assert!(evaluate("1.0", "version > 0.5)").is_err());
    }

    #[test]
    fn rejects_code_injection_attempts() {
        assert!(evaluate("1.0", "__import__('os').system('true')").is_err());
    }
}
