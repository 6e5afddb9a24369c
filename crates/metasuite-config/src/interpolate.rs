//! Fixed-point placeholder interpolation.
//!
//! Values of a flat mapping may reference other keys of the same mapping as
//! `{key}`. Each pass substitutes every placeholder of every value using the
//! mapping produced by the previous pass, never a partially updated one.
//! `{{` and `}}` stand for literal braces; they survive all passes untouched
//! and are turned into single braces by [`unescape`] once a caller is done
//! substituting.
//!
//! A placeholder may only remain in a converged mapping if it names a key
//! that referenced itself in the input (`{a: "{a}"}` is its own fixed
//! point). Anything else still unresolved when the pass budget runs out is
//! reported as an overflow.

use std::collections::{BTreeMap, BTreeSet};

use metasuite_common::error::{MetasuiteError, Result};

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    /// `{{` or `}}`, kept verbatim until [`unescape`].
    Escaped(char),
    Placeholder(&'a str),
}

fn malformed(template: &str, message: &str) -> MetasuiteError {
    MetasuiteError::MalformedTemplate {
        template: template.to_owned(),
        message: message.to_owned(),
    }
}

fn scan(template: &str) -> Result<Vec<Piece<'_>>> {
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut chars = template.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch != '{' && ch != '}' {
            continue;
        }
        if idx > text_start {
            pieces.push(Piece::Text(&template[text_start..idx]));
        }

        if chars.peek().map(|&(_, next)| next) == Some(ch) {
            let _ = chars.next();
            pieces.push(Piece::Escaped(ch));
            text_start = idx + 2;
            continue;
        }
        if ch == '}' {
            return Err(malformed(template, "single '}' encountered"));
        }

        let name_start = idx + 1;
        let close = loop {
            match chars.next() {
                Some((end, '}')) => break end,
                Some((_, '{')) => return Err(malformed(template, "'{' inside placeholder")),
                Some(_) => {}
                None => return Err(malformed(template, "unterminated placeholder")),
            }
        };
        let name = &template[name_start..close];
        if name.is_empty() {
            return Err(malformed(template, "empty placeholder"));
        }
        pieces.push(Piece::Placeholder(name));
        text_start = close + 1;
    }

    if text_start < template.len() {
        pieces.push(Piece::Text(&template[text_start..]));
    }
    Ok(pieces)
}

/// Names referenced by `template`, in order of appearance.
///
/// # Errors
///
/// Returns [`MetasuiteError::MalformedTemplate`] for unbalanced braces.
pub fn placeholders(template: &str) -> Result<Vec<&str>> {
    Ok(scan(template)?
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Placeholder(name) => Some(name),
            _ => None,
        })
        .collect())
}

/// Replaces every placeholder of `template` once, using `context`.
///
/// `key` names the entry being substituted and is only used for error
/// reporting. Escaped braces are kept as they are.
///
/// # Errors
///
/// Returns [`MetasuiteError::UndefinedPlaceholder`] if a placeholder is not a
/// key of `context`, or [`MetasuiteError::MalformedTemplate`].
pub fn substitute(key: &str, template: &str, context: &BTreeMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    for piece in scan(template)? {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Escaped(brace) => {
                out.push(brace);
                out.push(brace);
            }
            Piece::Placeholder(name) => {
                let value = context
                    .get(name)
                    .ok_or_else(|| MetasuiteError::UndefinedPlaceholder {
                        key: key.to_owned(),
                        placeholder: name.to_owned(),
                    })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}

/// Turns `{{`/`}}` into literal braces; placeholders are left in place.
///
/// # Errors
///
/// Returns [`MetasuiteError::MalformedTemplate`] for unbalanced braces.
pub fn unescape(template: &str) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    for piece in scan(template)? {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Escaped(brace) => out.push(brace),
            Piece::Placeholder(name) => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
    }
    Ok(out)
}

/// Keys of `mapping` holding a placeholder outside `allowed`.
fn unresolved(mapping: &BTreeMap<String, String>, allowed: &BTreeSet<String>) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    for (key, value) in mapping {
        if placeholders(value)?.iter().any(|name| !allowed.contains(*name)) {
            keys.push(key.clone());
        }
    }
    Ok(keys)
}

/// Substitutes placeholders until the mapping stops changing.
///
/// # Errors
///
/// - [`MetasuiteError::UndefinedPlaceholder`] if a value references a key
///   that is not in the mapping.
/// - [`MetasuiteError::InterpolationOverflow`] if no fixed point is reached
///   within `max_passes`, naming the keys still changing or unresolved.
/// - [`MetasuiteError::MalformedTemplate`] for unbalanced braces.
pub fn interpolate(
    mapping: &BTreeMap<String, String>,
    max_passes: usize,
) -> Result<BTreeMap<String, String>> {
    let mut self_referencing = BTreeSet::new();
    for (key, value) in mapping {
        if placeholders(value)?.contains(&key.as_str()) {
            let _ = self_referencing.insert(key.clone());
        }
    }

    let mut last = mapping.clone();
    let mut stalled = unresolved(&last, &self_referencing)?;

    for pass in 1..=max_passes {
        let mut next = BTreeMap::new();
        for (key, value) in &last {
            let _ = next.insert(key.clone(), substitute(key, value, &last)?);
        }

        let pending = unresolved(&next, &self_referencing)?;
        if next == last && pending.is_empty() {
            tracing::debug!(passes = pass, keys = next.len(), "interpolation converged");
            return Ok(next);
        }

        stalled = next
            .iter()
            .filter(|(key, value)| last.get(*key) != Some(*value) || pending.contains(*key))
            .map(|(key, _)| key.clone())
            .collect();
        tracing::trace!(pass, changing = stalled.len(), "interpolation pass");
        last = next;
    }

    Err(MetasuiteError::InterpolationOverflow {
        passes: max_passes,
        keys: stalled,
    })
}
