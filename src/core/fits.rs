//! Primary FITS header read/write.
//!
//! Only the primary header unit is touched. The data unit (and anything after
//! it) is carried over byte for byte when a header is written back.

use std::path::Path;

use crate::error::{Error, Result};
use crate::header::{Card, Header, HeaderValue};
use crate::utils::io;

const BLOCK: usize = 2880;
const CARD: usize = 80;
const VALUE_INDICATOR: &str = "= ";

/// Read the primary header of a FITS file.
pub fn read_header(path: &Path) -> Result<Header> {
    let bytes = io::read_bytes(path, &format!("read {}", path.display()))?;
    parse_header(&bytes)
        .map(|(header, _)| header)
        .map_err(|e| with_path(e, path))
}

/// Replace the primary header of a FITS file, keeping its data unit.
pub fn write_header(path: &Path, header: &Header) -> Result<()> {
    let bytes = io::read_bytes(path, &format!("read {}", path.display()))?;
    let (_, header_len) = parse_header(&bytes).map_err(|e| with_path(e, path))?;

    let mut out = encode_header(header)?;
    out.extend_from_slice(&bytes[header_len..]);

    io::write_bytes_atomic(path, &out, &format!("write {}", path.display()))
}

fn with_path(mut err: Error, path: &Path) -> Error {
    if let Some(obj) = err.details.as_object_mut() {
        obj.insert(
            "path".to_string(),
            serde_json::Value::String(path.display().to_string()),
        );
    }
    err
}

/// Parse header cards up to `END`. Returns the header and its length in
/// bytes, padded to the 2880-byte block boundary.
pub fn parse_header(bytes: &[u8]) -> Result<(Header, usize)> {
    if !bytes.starts_with(b"SIMPLE") {
        return Err(Error::fits_invalid_header(
            "File does not start with a SIMPLE card",
            None,
            Some(0),
        ));
    }

    let mut cards = Vec::new();
    for (index, raw) in bytes.chunks(CARD).enumerate() {
        if raw.len() < CARD {
            break;
        }
        if !raw.is_ascii() {
            return Err(Error::fits_invalid_header(
                "Header card contains non-ASCII bytes",
                None,
                Some(index),
            ));
        }
        let text = String::from_utf8_lossy(raw);
        let keyword = text[..8].trim_end();

        if keyword == "END" {
            let end = (index + 1) * CARD;
            let header_len = end.div_ceil(BLOCK) * BLOCK;
            return Ok((Header::from_cards(cards), header_len.min(bytes.len())));
        }

        cards.push(parse_card(&text, index)?);
    }

    Err(Error::fits_invalid_header(
        "Header has no END card",
        None,
        None,
    ))
}

fn parse_card(text: &str, index: usize) -> Result<Card> {
    let keyword = text[..8].trim_end();

    if keyword == "HIERARCH" {
        let rest = &text[8..];
        let eq = rest.find('=').ok_or_else(|| {
            Error::fits_invalid_header("HIERARCH card without '='", None, Some(index))
        })?;
        let name = format!("HIERARCH {}", rest[..eq].trim());
        let (value, comment) = parse_value(&rest[eq + 1..]);
        return Ok(card(&name, value, comment));
    }

    if matches!(keyword, "COMMENT" | "HISTORY" | "") {
        return Ok(Card::commentary(keyword, text[8..].trim_end()));
    }

    if &text[8..10] == VALUE_INDICATOR {
        let (value, comment) = parse_value(&text[10..]);
        return Ok(card(keyword, value, comment));
    }

    Ok(Card::commentary(keyword, text[8..].trim_end()))
}

fn card(keyword: &str, value: Option<HeaderValue>, comment: Option<String>) -> Card {
    Card {
        keyword: keyword.trim().to_uppercase(),
        value,
        comment,
        commentary: false,
    }
}

/// Split a value field into its value and the comment after `/`.
fn parse_value(field: &str) -> (Option<HeaderValue>, Option<String>) {
    let field = field.trim_start();

    if let Some(quoted) = field.strip_prefix('\'') {
        let mut value = String::new();
        let mut chars = quoted.char_indices().peekable();
        let mut rest = "";
        while let Some((i, c)) = chars.next() {
            if c == '\'' {
                if let Some((_, '\'')) = chars.peek() {
                    value.push('\'');
                    chars.next();
                    continue;
                }
                rest = &quoted[i + 1..];
                break;
            }
            value.push(c);
        }
        let value = value.trim_end().to_string();
        return (Some(HeaderValue::String(value)), parse_comment(rest));
    }

    let (raw, comment) = match field.find('/') {
        Some(i) => (&field[..i], parse_comment(&field[i..])),
        None => (field, None),
    };
    let raw = raw.trim();

    let value = match raw {
        "" => None,
        "T" => Some(HeaderValue::Logical(true)),
        "F" => Some(HeaderValue::Logical(false)),
        _ => {
            if let Ok(i) = raw.parse::<i64>() {
                Some(HeaderValue::Integer(i))
            } else if let Ok(f) = raw.replace('D', "E").parse::<f64>() {
                Some(HeaderValue::Float(f))
            } else {
                Some(HeaderValue::String(raw.to_string()))
            }
        }
    };

    (value, comment)
}

fn parse_comment(rest: &str) -> Option<String> {
    let comment = rest.trim_start().strip_prefix('/')?.trim();
    if comment.is_empty() {
        None
    } else {
        Some(comment.to_string())
    }
}

/// Encode header cards plus `END`, padded with blanks to a whole block.
///
/// A valued card whose keyword and value do not fit in 80 columns is an
/// error; only the trailing comment is ever cut short.
pub fn encode_header(header: &Header) -> Result<Vec<u8>> {
    let mut out = String::new();
    for c in header.cards() {
        out.push_str(&pad_card(&format_card(c)?));
    }
    out.push_str(&pad_card("END"));

    let mut bytes = out.into_bytes();
    let padded = bytes.len().div_ceil(BLOCK) * BLOCK;
    bytes.resize(padded, b' ');
    Ok(bytes)
}

fn pad_card(text: &str) -> String {
    let mut card: String = text.chars().filter(|c| c.is_ascii()).take(CARD).collect();
    while card.len() < CARD {
        card.push(' ');
    }
    card
}

fn format_card(card: &Card) -> Result<String> {
    if card.is_commentary() {
        let text = card.comment.as_deref().unwrap_or("");
        return Ok(format!("{:<8}{}", card.keyword, text));
    }

    let value = match &card.value {
        Some(value) => format_value(value),
        None => format!("{:>20}", ""),
    };
    let mut text = if card.keyword.len() <= 8 && !card.keyword.starts_with("HIERARCH") {
        format!("{:<8}= {}", card.keyword, value)
    } else if card.keyword.starts_with("HIERARCH ") {
        format!("{} = {}", card.keyword, value)
    } else {
        format!("HIERARCH {} = {}", card.keyword, value)
    };

    if text.len() > CARD || !text.is_ascii() {
        let raw = card.value.as_ref().map(|v| v.to_string()).unwrap_or_default();
        return Err(Error::header_invalid_value(&card.keyword, raw));
    }

    if let Some(comment) = &card.comment {
        text.push_str(" / ");
        text.push_str(comment);
    }
    Ok(text)
}

fn format_value(value: &HeaderValue) -> String {
    match value {
        HeaderValue::String(s) => {
            let escaped = s.replace('\'', "''");
            format!("'{:<8}'", escaped)
        }
        HeaderValue::Logical(b) => format!("{:>20}", if *b { "T" } else { "F" }),
        HeaderValue::Integer(i) => format!("{:>20}", i),
        HeaderValue::Float(f) => format!("{:>20}", format!("{:?}", f).replace('e', "E")),
    }
}
