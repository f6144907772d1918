//! Line-oriented text sections.
//!
//! `runtime-version`, `timestamps`, `module-versions` and `string-table` are
//! plain text, one record per line. Strings are escaped so any value
//! survives: `\` → `\\`, newline → `\n`, carriage return → `\r`. Keys of
//! `name:value` entries additionally escape `:` as `\:`, so an entry always
//! splits at its first unescaped colon.

use crate::DecodeError;

/// Escape a value for a single line.
pub fn escape(s: &str) -> String {
    escape_with(s, false)
}

/// Escape the key of a `name:value` entry.
pub fn escape_key(s: &str) -> String {
    escape_with(s, true)
}

fn escape_with(s: &str, key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' if key => out.push_str("\\:"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`] / [`escape_key`].
pub fn unescape(s: &str, line: usize) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(':') => out.push(':'),
            _ => {
                return Err(DecodeError::MalformedLine {
                    line,
                    reason: "invalid escape sequence",
                })
            }
        }
    }
    Ok(out)
}

/// Split a raw `name:value` line at its first unescaped colon.
fn split_entry(raw: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in raw.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ':' => return Some((&raw[..i], &raw[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Render `name:value` entries, one per line.
pub fn write_entries<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut out = String::new();
    for (name, value) in entries {
        out.push_str(&escape_key(name));
        out.push(':');
        out.push_str(&escape(&value));
        out.push('\n');
    }
    out
}

/// Parse `name:value` entries. Blank lines are ignored.
///
/// Line numbers in errors are 1-based.
pub fn read_entries(text: &str) -> Result<Vec<(String, String)>, DecodeError> {
    let mut entries = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        if raw.is_empty() {
            continue;
        }
        let (name, value) = split_entry(raw).ok_or(DecodeError::MalformedLine {
            line,
            reason: "expected `name:value`",
        })?;
        entries.push((unescape(name, line)?, unescape(value, line)?));
    }
    Ok(entries)
}

/// Render one escaped string per line.
pub fn write_lines<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for value in values {
        out.push_str(&escape(value));
        out.push('\n');
    }
    out
}

/// Parse one escaped string per line. Every line is significant.
pub fn read_lines(text: &str) -> Result<Vec<String>, DecodeError> {
    text.lines()
        .enumerate()
        .map(|(idx, raw)| unescape(raw, idx + 1))
        .collect()
}

#[cfg(test)]
mod tests;
