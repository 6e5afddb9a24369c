//! Reader for the INI-style section text, built on `nom`.
//!
//! ```text
//! # comment
//! [package root version >= 5.28]
//! depends = python version >= 2.6
//! action = download, unpack,
//!     configure
//! ```
//!
//! Keys are lower-cased and values trimmed. A line that starts with
//! whitespace continues the previous value (joined with a newline). Blank
//! lines and lines starting with `#` or `;` are skipped.

use metasuite_common::error::{MetasuiteError, Result};
use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::{char, one_of, space0},
    combinator::{eof, rest},
    sequence::{delimited, terminated},
};

use crate::section::Section;

fn header_line(input: &str) -> IResult<&str, &str> {
    terminated(
        delimited(char('['), take_while1(|c: char| c != ']'), char(']')),
        (space0, eof),
    )
    .parse(input)
}

fn key_value_line(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, key) = take_while1(|c: char| c != '=' && c != ':').parse(input)?;
    let (input, _) = one_of("=:").parse(input)?;
    let (input, value) = rest.parse(input)?;
    Ok((input, (key, value)))
}

fn syntax_err(line: usize, message: impl Into<String>) -> MetasuiteError {
    MetasuiteError::Syntax {
        line,
        message: message.into(),
    }
}

/// Parses section text into sections, in order of appearance.
///
/// A header that appears twice in the same text yields two sections; the
/// [`SectionStore`](crate::store::SectionStore) merges them on insert.
///
/// # Errors
///
/// Returns [`MetasuiteError::Syntax`] for entries outside any section,
/// unterminated headers, lines with no `=`/`:` separator, or stray
/// continuation lines, and header errors from [`Section::new`].
pub fn parse_sections(text: &str) -> Result<Vec<Section>> {
    tracing::debug!("reading section text");
    let mut sections: Vec<Section> = Vec::new();
    let mut last_key: Option<String> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            let key = last_key
                .as_deref()
                .ok_or_else(|| syntax_err(line_no, "continuation line without a preceding entry"))?;
            let section = sections
                .last_mut()
                .ok_or_else(|| syntax_err(line_no, "continuation line outside any section"))?;
            let value = format!("{}\n{trimmed}", section.get(key).unwrap_or_default());
            section.set(key, value);
            continue;
        }

        if line.starts_with('[') {
            let (_, header) = header_line(trimmed)
                .map_err(|_| syntax_err(line_no, format!("malformed section header: {trimmed}")))?;
            sections.push(Section::new(header)?);
            last_key = None;
            continue;
        }

        let section = sections
            .last_mut()
            .ok_or_else(|| syntax_err(line_no, "entry appears before any section header"))?;
        let (_, (key, value)) = key_value_line(line)
            .map_err(|_| syntax_err(line_no, format!("expected `key = value`, got: {trimmed}")))?;
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return Err(syntax_err(line_no, "empty key"));
        }
        section.set(key.clone(), value.trim());
        last_key = Some(key);
    }

    Ok(sections)
}
