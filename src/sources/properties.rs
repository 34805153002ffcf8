//! Line-oriented `key=value` parsing for `.properties` files.

use crate::error::{ConfigError, Result};
use std::collections::HashMap;

/// Parse the text of a `.properties` file into a flat map.
///
/// Comment lines start with `#` or `!`. A trailing odd run of backslashes
/// joins the next line. Lines without an unescaped `=` or `:` are skipped.
/// Later duplicates within one file overwrite earlier ones.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] for a malformed `\uXXXX` escape.
pub fn parse(text: &str) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();

    for (line_no, logical) in logical_lines(text) {
        let Some((raw_key, raw_value)) = split_entry(&logical) else {
            tracing::trace!(line = line_no, "skipping properties line without separator");
            continue;
        };

        let key = unescape(raw_key.trim(), line_no)?;
        if key.is_empty() {
            continue;
        }
        let value = unescape(raw_value.trim(), line_no)?;
        map.insert(key, value);
    }

    Ok(map)
}

/// Join continuation lines and drop comments. Yields the 1-based number of the
/// first physical line of each logical line.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (idx, physical) in text.lines().enumerate() {
        let trimmed = physical.trim_start();

        let (start, mut buf) = match current.take() {
            Some(pending) => pending,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (idx + 1, String::new())
            }
        };

        if ends_with_continuation(trimmed) {
            buf.push_str(&trimmed[..trimmed.len() - 1]);
            current = Some((start, buf));
        } else {
            buf.push_str(trimmed);
            out.push((start, buf));
        }
    }

    // A continuation on the last line just ends the entry.
    if let Some(pending) = current {
        out.push(pending);
    }

    out
}

fn ends_with_continuation(line: &str) -> bool {
    line.bytes().rev().take_while(|b| *b == b'\\').count() % 2 == 1
}

/// Split at the first `=` or `:` that is not escaped.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return Some((&line[..i], &line[i + 1..])),
            _ => {}
        }
    }
    None
}

fn unescape(raw: &str, line_no: usize) -> Result<String> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{0c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        ConfigError::ParseError(format!(
                            "invalid \\u escape '\\u{}' on line {}",
                            hex, line_no
                        ))
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}
