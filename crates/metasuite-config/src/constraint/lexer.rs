//! Tokenization of constraint expressions using `nom`.
//!
//! Produces a stream of [`Token`]s for the recursive-descent parser.
//! Whitespace between tokens is discarded; operators may be written with or
//! without surrounding spaces (`version>=1.0` and `version >= 1.0` lex alike).

use metasuite_common::error::{MetasuiteError, Result};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, value},
    sequence::delimited,
};

use super::ast::Comparator;

/// A token in the constraint language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// The `version` keyword.
    Subject,
    /// The `and` connective.
    And,
    /// The `or` connective.
    Or,
    /// A comparison operator.
    Op(Comparator),
    /// `(`
    ParenOpen,
    /// `)`
    ParenClose,
    /// A bare or quoted version literal.
    Literal(String),
}

fn skip_whitespace(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

fn comparator(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Op(Comparator::Eq), tag("==")),
        value(Token::Op(Comparator::Ne), tag("!=")),
        value(Token::Op(Comparator::Le), tag("<=")),
        value(Token::Op(Comparator::Ge), tag(">=")),
        value(Token::Op(Comparator::Lt), tag("<")),
        value(Token::Op(Comparator::Gt), tag(">")),
    ))
    .parse(input)
}

fn paren(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::ParenOpen, char('(')),
        value(Token::ParenClose, char(')')),
    ))
    .parse(input)
}

/// Parses a `"..."` or `'...'` literal; versions need no escapes.
fn quoted_literal(input: &str) -> IResult<&str, Token> {
    let double = delimited(char('"'), take_while(|c: char| c != '"'), char('"'));
    let single = delimited(char('\''), take_while(|c: char| c != '\''), char('\''));
    map(alt((double, single)), |s: &str| Token::Literal(s.to_owned())).parse(input)
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '<' | '>' | '=' | '!' | '"' | '\'')
}

/// Parses a keyword or a bare literal.
fn word(input: &str) -> IResult<&str, Token> {
    let (input, text) = take_while1(is_word_char).parse(input)?;
    let token = match text {
        "version" => Token::Subject,
        "and" => Token::And,
        "or" => Token::Or,
        other => Token::Literal(other.to_owned()),
    };
    Ok((input, token))
}

fn single_token(input: &str) -> IResult<&str, Token> {
    alt((comparator, paren, quoted_literal, word)).parse(input)
}

/// Tokenizes a constraint expression.
///
/// # Errors
///
/// Returns [`MetasuiteError::Parse`] if the input holds a character sequence
/// that is not a token (a lone `=` or `!`, an unterminated quote).
pub fn tokenize(expression: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut remaining = expression;

    loop {
        let (rest, _) =
            skip_whitespace(remaining).map_err(|e| lex_err(expression, &format!("{e}")))?;
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        let (rest, token) = single_token(remaining).map_err(|_| {
            lex_err(
                expression,
                &format!(
                    "unexpected input at \"{}\"",
                    remaining.chars().take(20).collect::<String>()
                ),
            )
        })?;
        tokens.push(token);
        remaining = rest;
    }

    Ok(tokens)
}

fn lex_err(expression: &str, message: &str) -> MetasuiteError {
    MetasuiteError::Parse {
        expression: expression.to_owned(),
        message: message.to_owned(),
    }
}
