//! Escaping of values placed in separator-delimited path segments.
//!
//! Every ASCII byte of the separator is percent-encoded inside values, so a
//! value containing the separator still splits back into one segment.
//! Non-ASCII bytes are always encoded. Separators never contain `%` or
//! alphanumerics (enforced by config validation), so escaping them after the
//! base pass cannot corrupt an existing escape.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::CodecError;

const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\\')
    .add(b'^')
    .add(b'|')
    .add(b'[')
    .add(b']');

/// Percent-encode one value for a segment delimited by `separator`.
pub fn escape(value: &str, separator: &str) -> String {
    let mut encoded = utf8_percent_encode(value, SEGMENT).to_string();
    for c in separator.chars().filter(char::is_ascii) {
        if encoded.contains(c) {
            encoded = encoded.replace(c, &format!("%{:02X}", c as u32));
        }
    }
    encoded
}

/// Percent-encode each value and join them with `separator`.
pub fn join_escaped<'a, I>(values: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(|value| escape(value, separator))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Split on `separator` and percent-decode each segment.
pub fn split_unescaped(segment: &str, separator: &str) -> Result<Vec<String>, CodecError> {
    if segment.is_empty() {
        return Ok(Vec::new());
    }
    segment.split(separator).map(unescape).collect()
}

/// Percent-decode one segment.
pub fn unescape(segment: &str) -> Result<String, CodecError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| CodecError::Malformed(format!("segment `{segment}` is not valid UTF-8")))
}
