//! In-memory FITS header.
//!
//! Cards keep their file order. Valued keywords are unique; commentary cards
//! (`COMMENT`, `HISTORY`, blank, and any card without a value indicator such
//! as `CONTINUE`) may repeat and carry text instead of a value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// Keyword -> value mapping produced by metadata resolution and consumed by
/// header updates.
pub type Metadata = BTreeMap<String, HeaderValue>;

const COMMENTARY: [&str; 3] = ["COMMENT", "HISTORY", ""];

/// A FITS header value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Logical(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl HeaderValue {
    /// Falsy values: empty string, zero, `F`.
    pub fn is_truthy(&self) -> bool {
        match self {
            HeaderValue::Logical(b) => *b,
            HeaderValue::Integer(i) => *i != 0,
            HeaderValue::Float(f) => *f != 0.0,
            HeaderValue::String(s) => !s.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HeaderValue::Integer(i) => Some(*i),
            HeaderValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            HeaderValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Float(f) => Some(*f),
            HeaderValue::Integer(i) => Some(*i as f64),
            HeaderValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Numbers compare by value across integer and float, everything else
/// compares within its own variant.
impl PartialEq for HeaderValue {
    fn eq(&self, other: &Self) -> bool {
        use HeaderValue::*;
        match (self, other) {
            (Logical(a), Logical(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(a), Float(b)) | (Float(b), Integer(a)) => (*a as f64) == *b,
            (String(a), String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Logical(true) => write!(f, "T"),
            HeaderValue::Logical(false) => write!(f, "F"),
            HeaderValue::Integer(i) => write!(f, "{}", i),
            HeaderValue::Float(v) => write!(f, "{}", v),
            HeaderValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(s: &str) -> Self {
        HeaderValue::String(s.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(s: String) -> Self {
        HeaderValue::String(s)
    }
}

impl From<i64> for HeaderValue {
    fn from(i: i64) -> Self {
        HeaderValue::Integer(i)
    }
}

impl From<f64> for HeaderValue {
    fn from(v: f64) -> Self {
        HeaderValue::Float(v)
    }
}

impl From<bool> for HeaderValue {
    fn from(b: bool) -> Self {
        HeaderValue::Logical(b)
    }
}

/// One 80-column header record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<HeaderValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// No value indicator: the text after the keyword is kept verbatim.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub commentary: bool,
}

impl Card {
    pub fn new(keyword: &str, value: HeaderValue, comment: Option<&str>) -> Self {
        Self {
            keyword: normalize(keyword),
            value: Some(value),
            comment: comment.map(str::to_string),
            commentary: false,
        }
    }

    pub fn commentary(keyword: &str, text: &str) -> Self {
        Self {
            keyword: normalize(keyword),
            value: None,
            comment: Some(text.to_string()),
            commentary: true,
        }
    }

    pub fn is_commentary(&self) -> bool {
        self.commentary || COMMENTARY.contains(&self.keyword.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    cards: Vec<Card>,
}

fn normalize(keyword: &str) -> String {
    keyword.trim().to_uppercase()
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn position(&self, keyword: &str) -> Option<usize> {
        let key = normalize(keyword);
        self.cards
            .iter()
            .position(|c| !c.is_commentary() && c.keyword == key)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.position(keyword).is_some()
    }

    /// Value of a keyword. A keyword present with an undefined value reads as
    /// absent.
    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.position(keyword)
            .and_then(|i| self.cards[i].value.as_ref())
    }

    pub fn comment(&self, keyword: &str) -> Option<&str> {
        self.position(keyword)
            .and_then(|i| self.cards[i].comment.as_deref())
    }

    /// Set a value, keeping the existing card position and comment.
    pub fn set(&mut self, keyword: &str, value: impl Into<HeaderValue>) {
        let value = value.into();
        match self.position(keyword) {
            Some(i) => self.cards[i].value = Some(value),
            None => self.cards.push(Card::new(keyword, value, None)),
        }
    }

    pub fn set_with_comment(&mut self, keyword: &str, value: impl Into<HeaderValue>, comment: &str) {
        let value = value.into();
        match self.position(keyword) {
            Some(i) => {
                self.cards[i].value = Some(value);
                self.cards[i].comment = Some(comment.to_string());
            }
            None => self.cards.push(Card::new(keyword, value, Some(comment))),
        }
    }

    pub fn remove(&mut self, keyword: &str) -> Option<HeaderValue> {
        let i = self.position(keyword)?;
        self.cards.remove(i).value
    }

    /// Rename a keyword in place. Fails when `old` is absent or `new` is
    /// already present.
    pub fn rename_keyword(&mut self, old: &str, new: &str) -> Result<()> {
        let i = self
            .position(old)
            .ok_or_else(|| Error::header_keyword_not_found(normalize(old)))?;
        if self.contains(new) {
            return Err(Error::header_keyword_exists(normalize(new)));
        }
        self.cards[i].keyword = normalize(new);
        Ok(())
    }

    pub fn add_history(&mut self, text: &str) {
        self.cards.push(Card::commentary("HISTORY", text));
    }

    /// Valued keywords in card order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.cards
            .iter()
            .filter(|c| !c.is_commentary())
            .filter_map(|c| c.value.as_ref().map(|v| (c.keyword.as_str(), v)))
    }

    /// Write every entry of `info` into the header, using `comment_for` to
    /// label cards that do not exist yet.
    pub fn merge<'a, F>(&mut self, info: &Metadata, comment_for: F)
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        for (key, value) in info {
            if self.contains(key) {
                self.set(key, value.clone());
            } else {
                match comment_for(key) {
                    Some(comment) => self.set_with_comment(key, value.clone(), comment),
                    None => self.set(key, value.clone()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_header_semantics() {
        assert!(!HeaderValue::from("").is_truthy());
        assert!(!HeaderValue::Integer(0).is_truthy());
        assert!(!HeaderValue::Float(0.0).is_truthy());
        assert!(!HeaderValue::Logical(false).is_truthy());
        assert!(HeaderValue::from("Empty").is_truthy());
        assert!(HeaderValue::Integer(2000).is_truthy());
    }

    #[test]
    fn integer_and_float_compare_by_value() {
        assert_eq!(HeaderValue::Integer(2000), HeaderValue::Float(2000.0));
        assert_ne!(HeaderValue::Integer(2000), HeaderValue::from("2000"));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let mut header = Header::new();
        header.set("objra", "03:14:15.00");
        assert!(header.contains("OBJRA"));
        assert_eq!(header.get("ObjRa"), Some(&HeaderValue::from("03:14:15.00")));
    }

    #[test]
    fn set_keeps_position_and_comment() {
        let mut header = Header::new();
        header.set_with_comment("OBJECT", "V404 Cyg", "IAU name of observed object");
        header.set("EXPOSURE", 0.5);
        header.set("OBJECT", "SN 1987A");

        assert_eq!(header.cards()[0].keyword, "OBJECT");
        assert_eq!(header.comment("OBJECT"), Some("IAU name of observed object"));
        assert_eq!(header.get("OBJECT"), Some(&HeaderValue::from("SN 1987A")));
    }

    #[test]
    fn rename_keyword_moves_value() {
        let mut header = Header::new();
        header.set("HIERARCH EM GAIN", 30_i64);
        header.rename_keyword("HIERARCH EM GAIN", "GAIN").unwrap();

        assert!(!header.contains("HIERARCH EM GAIN"));
        assert_eq!(header.get("GAIN"), Some(&HeaderValue::Integer(30)));
    }

    #[test]
    fn rename_keyword_fails_when_source_absent() {
        let mut header = Header::new();
        let err = header.rename_keyword("HIERARCH RON", "RON").unwrap_err();
        assert_eq!(err.code.as_str(), "header.keyword_not_found");
    }

    #[test]
    fn rename_keyword_fails_when_target_present() {
        let mut header = Header::new();
        header.set("HIERARCH RON", 8.0);
        header.set("RON", 7.5);
        let err = header.rename_keyword("HIERARCH RON", "RON").unwrap_err();
        assert_eq!(err.code.as_str(), "header.keyword_exists");
        assert!(header.contains("HIERARCH RON"));
    }

    #[test]
    fn history_cards_do_not_shadow_values() {
        let mut header = Header::new();
        header.add_history("first");
        header.add_history("second");
        assert!(!header.contains("HISTORY"));
        assert_eq!(header.len(), 2);
        assert_eq!(header.iter().count(), 0);
    }

    #[test]
    fn merge_labels_new_cards_only() {
        let mut header = Header::new();
        header.set_with_comment("OBJECT", "old", "kept comment");

        let mut info = Metadata::new();
        info.insert("OBJECT".to_string(), HeaderValue::from("new"));
        info.insert("OBSERVAT".to_string(), HeaderValue::from("SAAO"));

        header.merge(&info, |key| match key {
            "OBSERVAT" => Some("Observatory"),
            _ => Some("ignored"),
        });

        assert_eq!(header.comment("OBJECT"), Some("kept comment"));
        assert_eq!(header.comment("OBSERVAT"), Some("Observatory"));
        assert_eq!(header.get("OBJECT"), Some(&HeaderValue::from("new")));
    }
}
