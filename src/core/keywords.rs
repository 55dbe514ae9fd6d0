//! Canonical header keywords the pipeline needs for every SHOC run.
//!
//! Each keyword carries its card comment, an example input shown to the
//! operator, an optional assumed value, and the validity check and conversion
//! applied to free-text input.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::coords::{self, Declination, RightAscension};
use crate::error::{Error, Result};
use crate::header::{Header, HeaderValue};

/// Fixed observatory identity written into every resolved mapping.
pub const OBSERVATORY_KEY: &str = "OBSERVAT";
pub const OBSERVATORY: &str = "SAAO";
pub const OBSERVATORY_COMMENT: &str = "Observatory";

/// Keywords routinely absent from headers written by older acquisition
/// software.
pub const LEGACY_MISSING_KEYWORDS: [&str; 7] = [
    "OBJECT", "OBJEPOCH", "OBJRA", "OBJDEC", "OBSERVER", "OBSTYPE", "DATE-OBS",
];

const EXAMPLE_RA: &str = "'03:14:15' or '03 14 15'";
const EXAMPLE_DEC: &str = "'+27:18:28.1' or '27 18 28.1'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    Trivial,
    RightAscension,
    Declination,
    Epoch,
}

impl Validity {
    pub fn check(&self, input: &str) -> bool {
        match self {
            Validity::Trivial => true,
            Validity::RightAscension => RightAscension::parse(input).is_some(),
            Validity::Declination => Declination::parse(input).is_some(),
            Validity::Epoch => coords::parse_epoch(input).is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    Trivial,
    RightAscension,
    Declination,
    Epoch,
}

impl Conversion {
    /// Typed value for a raw terminal argument. Numeric keywords are parsed
    /// when possible; anything else is kept as typed.
    pub fn from_terminal(&self, input: &str) -> HeaderValue {
        match self {
            Conversion::Epoch => coords::parse_epoch(input)
                .map(HeaderValue::Float)
                .unwrap_or_else(|| HeaderValue::from(input)),
            _ => HeaderValue::from(input),
        }
    }

    pub fn convert(&self, input: &str) -> Result<HeaderValue> {
        let invalid = || {
            Error::validation_invalid_argument(
                "value",
                format!("Cannot convert '{}'", input),
                None,
                None,
            )
        };
        match self {
            Conversion::Trivial => Ok(HeaderValue::String(input.trim().to_string())),
            Conversion::RightAscension => RightAscension::parse(input)
                .map(|ra| HeaderValue::String(ra.to_sexagesimal()))
                .ok_or_else(invalid),
            Conversion::Declination => Declination::parse(input)
                .map(|dec| HeaderValue::String(dec.to_sexagesimal()))
                .ok_or_else(invalid),
            Conversion::Epoch => coords::parse_epoch(input)
                .map(HeaderValue::Float)
                .ok_or_else(invalid),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordSpec {
    pub name: &'static str,
    pub comment: &'static str,
    pub example: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assumed: Option<HeaderValue>,
    pub validity: Validity,
    pub conversion: Conversion,
}

/// Canonical keyword records, looked up by name, iterated in table order.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    order: Vec<&'static str>,
    records: HashMap<&'static str, KeywordSpec>,
}

impl KeywordTable {
    pub fn new(specs: Vec<KeywordSpec>) -> Self {
        let order = specs.iter().map(|s| s.name).collect();
        let records = specs.into_iter().map(|s| (s.name, s)).collect();
        Self { order, records }
    }

    pub fn names(&self) -> &[&'static str] {
        &self.order
    }

    pub fn get(&self, name: &str) -> Option<&KeywordSpec> {
        self.records.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordSpec> {
        self.order.iter().filter_map(|name| self.records.get(name))
    }

    /// Card comment for a resolved keyword, including the fixed observatory
    /// entry.
    pub fn comment_for(&self, name: &str) -> Option<&'static str> {
        if name == OBSERVATORY_KEY {
            return Some(OBSERVATORY_COMMENT);
        }
        self.get(name).map(|s| s.comment)
    }
}

fn spec(
    name: &'static str,
    comment: &'static str,
    example: &'static str,
    assumed: Option<HeaderValue>,
    validity: Validity,
    conversion: Conversion,
) -> KeywordSpec {
    KeywordSpec {
        name,
        comment,
        example,
        assumed,
        validity,
        conversion,
    }
}

/// The canonical table of keywords resolved for each run.
pub fn canonical() -> &'static KeywordTable {
    static TABLE: OnceLock<KeywordTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        KeywordTable::new(vec![
            spec(
                "OBJECT",
                "IAU name of observed object",
                "",
                None,
                Validity::Trivial,
                Conversion::Trivial,
            ),
            spec(
                "OBJRA",
                "Right Ascension",
                EXAMPLE_RA,
                None,
                Validity::RightAscension,
                Conversion::RightAscension,
            ),
            spec(
                "OBJDEC",
                "Declination",
                EXAMPLE_DEC,
                None,
                Validity::Declination,
                Conversion::Declination,
            ),
            spec(
                "EPOCH",
                "Coordinate epoch",
                "2000",
                Some(HeaderValue::Integer(2000)),
                Validity::Epoch,
                Conversion::Epoch,
            ),
            spec(
                "TELESCOP",
                "The telescope name",
                "",
                Some(HeaderValue::from("1.9m")),
                Validity::Trivial,
                Conversion::Trivial,
            ),
            spec(
                "FILTERA",
                "The active filter in wheel A",
                "Empty",
                Some(HeaderValue::from("Empty")),
                Validity::Trivial,
                Conversion::Trivial,
            ),
            spec(
                "OBSERVER",
                "Observer who acquired the data",
                "",
                None,
                Validity::Trivial,
                Conversion::Trivial,
            ),
        ])
    })
}

/// Keywords from `LEGACY_MISSING_KEYWORDS` the header lacks or leaves empty.
pub fn missing_keywords(header: &Header) -> Vec<&'static str> {
    LEGACY_MISSING_KEYWORDS
        .iter()
        .copied()
        .filter(|k| !header.get(k).is_some_and(HeaderValue::is_truthy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_is_stable() {
        assert_eq!(
            canonical().names(),
            &["OBJECT", "OBJRA", "OBJDEC", "EPOCH", "TELESCOP", "FILTERA", "OBSERVER"]
        );
    }

    #[test]
    fn lookup_by_name_returns_full_record() {
        let ra = canonical().get("OBJRA").unwrap();
        assert_eq!(ra.comment, "Right Ascension");
        assert_eq!(ra.validity, Validity::RightAscension);
        assert!(ra.assumed.is_none());
        assert!(canonical().get("OBSERVAT").is_none());
    }

    #[test]
    fn comment_for_covers_observatory() {
        assert_eq!(canonical().comment_for("OBSERVAT"), Some("Observatory"));
        assert_eq!(canonical().comment_for("EPOCH"), Some("Coordinate epoch"));
        assert_eq!(canonical().comment_for("NAXIS"), None);
    }

    #[test]
    fn conversions_normalise_input() {
        assert_eq!(
            Conversion::RightAscension.convert("03 14 15").unwrap(),
            HeaderValue::from("03:14:15.00")
        );
        assert_eq!(
            Conversion::Declination.convert("27 18 28.1").unwrap(),
            HeaderValue::from("+27:18:28.1")
        );
        assert_eq!(Conversion::Epoch.convert("2000").unwrap(), HeaderValue::Float(2000.0));
        assert_eq!(Conversion::Epoch.from_terminal("2000"), HeaderValue::Float(2000.0));
        assert_eq!(Conversion::Epoch.from_terminal("J2000?"), HeaderValue::from("J2000?"));
        assert_eq!(
            Conversion::RightAscension.from_terminal("03 14 15"),
            HeaderValue::from("03 14 15")
        );
        assert_eq!(
            Conversion::Trivial.convert("  NGC 104 ").unwrap(),
            HeaderValue::from("NGC 104")
        );
        assert!(Conversion::Declination.convert("north").is_err());
    }

    #[test]
    fn validity_checks_delegate_to_parsers() {
        assert!(Validity::Trivial.check(""));
        assert!(Validity::RightAscension.check("23:59:59.9"));
        assert!(!Validity::RightAscension.check("25:00:00"));
        assert!(Validity::Epoch.check("1950"));
        assert!(!Validity::Epoch.check("year"));
    }

    #[test]
    fn missing_keywords_treats_empty_as_missing() {
        let mut header = Header::new();
        header.set("OBJECT", "");
        header.set("OBJRA", "03:14:15.00");
        header.set("DATE-OBS", "2017-06-01");

        let missing = missing_keywords(&header);
        assert!(missing.contains(&"OBJECT"));
        assert!(!missing.contains(&"OBJRA"));
        assert!(!missing.contains(&"DATE-OBS"));
        assert_eq!(missing.len(), 5);
    }
}
