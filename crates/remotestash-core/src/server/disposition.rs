//! `Content-Disposition` handling: carries an item's original file name
//! across push and pull.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes left unescaped in an RFC 5987 `filename*` value (`attr-char`).
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Header value announcing `filename`, e.g. `inline; filename="notes.txt"`.
///
/// Control characters are dropped so the value always stays on one header
/// line. Non-ASCII names get an ASCII `filename` fallback plus `filename*`.
pub fn inline_filename(filename: &str) -> String {
    let clean: String = filename.chars().filter(|c| !c.is_control()).collect();
    if clean.is_ascii() {
        return format!("inline; filename=\"{}\"", quote_escape(&clean));
    }
    let fallback: String = clean
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    format!(
        "inline; filename=\"{}\"; filename*=UTF-8''{}",
        quote_escape(&fallback),
        utf8_percent_encode(&clean, ATTR_CHAR)
    )
}

fn quote_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Extracts the filename from a raw Content-Disposition header value.
///
/// `filename*` (UTF-8 only) wins over `filename`. Only the final path
/// component is kept.
pub fn parse_filename(header_value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for (name, value) in params(header_value) {
        match name.to_ascii_lowercase().as_str() {
            "filename*" => {
                extended = strip_prefix_ignore_case(&value, "utf-8''")
                    .map(|v| percent_decode_str(v).decode_utf8_lossy().into_owned())
                    .and_then(|d| base_name(&d))
                    .or(extended);
            }
            "filename" => plain = base_name(&value).or(plain),
            _ => {}
        }
    }

    extended.or(plain)
}

/// `name=value` parameters after the disposition type. Quoted values are
/// unescaped and may contain `;`.
fn params(header_value: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut rest = match header_value.split_once(';') {
        Some((_, r)) => r,
        None => return out,
    };
    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }
        let Some(eq) = rest.find('=') else {
            break;
        };
        let name = rest[..eq].trim().to_string();
        let after = rest[eq + 1..].trim_start();
        let (value, remaining) = match after.strip_prefix('"') {
            Some(quoted) => read_quoted(quoted),
            None => match after.find(';') {
                Some(end) => (after[..end].trim().to_string(), &after[end..]),
                None => (after.trim().to_string(), ""),
            },
        };
        out.push((name, value));
        rest = remaining;
    }
    out
}

/// Reads up to the closing quote; returns the unescaped text and what follows.
fn read_quoted(s: &str) -> (String, &str) {
    let mut value = String::with_capacity(s.len());
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    value.push(escaped);
                }
            }
            '"' => return (value, &s[i + 1..]),
            _ => value.push(c),
        }
    }
    (value, "")
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Last path component with control characters removed; None if nothing usable remains.
fn base_name(raw: &str) -> Option<String> {
    let last = raw.rsplit(&['/', '\\'][..]).next().unwrap_or(raw);
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        None
    } else {
        Some(cleaned.to_string())
    }
}
