//! Legacy SHOC keyword conversion.
//!
//! Early SHOC acquisition software wrote long `HIERARCH` keywords; the
//! pipeline reads the short standard names. Conversion works in both
//! directions and keeps going past keywords that cannot be renamed.

use serde::Serialize;

use crate::header::Header;

/// `(old, new)` keyword pairs, in conversion order.
pub const KEYWORDS: [(&str, &str); 12] = [
    ("HIERARCH RON", "RON"),
    ("HIERARCH SENSITIVITY", "SENSITIV"),
    ("HIERARCH EM GAIN", "GAIN"),
    ("HIERARCH PREAMPLIFIER GAIN", "PREAMP"),
    ("HIERARCH OUTPUT AMPLIFIER", "OUTPTAMP"),
    ("HIERARCH ACQUISITION MODE", "ACQMODE"),
    ("HIERARCH READ MODE", "READMODE"),
    ("HIERARCH TRIGGER MODE", "TRIGGER"),
    ("HIERARCH HORIZONTAL SHIFT SPEED", "HSHIFT"),
    ("HIERARCH VERTICAL SHIFT SPEED", "VSHIFT"),
    ("HIERARCH SERIAL NUMBER", "SERNO"),
    ("HIERARCH TEMPERATURE", "CCDTEMP"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenamedKeyword {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenameReport {
    pub success: bool,
    pub direction: Direction,
    pub renamed: Vec<RenamedKeyword>,
    pub not_renamed: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Whether any old-style keyword is present.
pub fn has_old_keys(header: &Header) -> bool {
    KEYWORDS.iter().any(|(old, _)| header.contains(old))
}

/// Rename old keywords to new ones (`forward`) or back.
///
/// A pair that cannot be renamed is recorded in `not_renamed` with a warning
/// and the remaining pairs are still attempted.
pub fn convert_old_new(header: &mut Header, forward: bool, verbose: bool) -> RenameReport {
    let direction = if forward {
        Direction::Forward
    } else {
        Direction::Reverse
    };

    if verbose && has_old_keys(header) {
        crate::log_status!("convert", "The following header keywords will be renamed:");
        for (old, new) in KEYWORDS {
            crate::log_status!("convert", "{:35}--> {}", old, new);
        }
    }

    let mut report = RenameReport {
        success: true,
        direction,
        renamed: Vec::new(),
        not_renamed: Vec::new(),
        warnings: Vec::new(),
    };

    for (old, new) in KEYWORDS {
        let (from, to) = match direction {
            Direction::Forward => (old, new),
            Direction::Reverse => (new, old),
        };

        match header.rename_keyword(from, to) {
            Ok(()) => report.renamed.push(RenamedKeyword {
                from: from.to_string(),
                to: to.to_string(),
            }),
            Err(e) => {
                let warning = format!("Could not rename keyword {}: {}", from, e);
                crate::log_status!("convert", "{}", warning);
                report.warnings.push(warning);
                report.not_renamed.push(from.to_string());
                report.success = false;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderValue;

    fn legacy_header() -> Header {
        let mut header = Header::new();
        header.set("SIMPLE", true);
        for (i, (old, _)) in KEYWORDS.iter().enumerate() {
            header.set(old, i as i64);
        }
        header
    }

    #[test]
    fn detects_old_keys() {
        assert!(has_old_keys(&legacy_header()));

        let mut header = Header::new();
        header.set("RON", 7.5);
        assert!(!has_old_keys(&header));
    }

    #[test]
    fn forward_renames_every_pair() {
        let mut header = legacy_header();
        let report = convert_old_new(&mut header, true, false);

        assert!(report.success);
        assert_eq!(report.renamed.len(), KEYWORDS.len());
        assert!(report.not_renamed.is_empty());
        assert!(!has_old_keys(&header));
        assert_eq!(header.get("GAIN"), Some(&HeaderValue::Integer(2)));
    }

    #[test]
    fn missing_keyword_is_recorded_and_conversion_continues() {
        let mut header = Header::new();
        header.set("HIERARCH RON", 8.2);
        header.set("HIERARCH SERIAL NUMBER", 5982_i64);

        let report = convert_old_new(&mut header, true, false);

        assert!(!report.success);
        assert_eq!(report.renamed.len(), 2);
        assert_eq!(report.not_renamed.len(), KEYWORDS.len() - 2);
        assert!(report.not_renamed.contains(&"HIERARCH EM GAIN".to_string()));
        assert_eq!(report.warnings.len(), report.not_renamed.len());
        assert_eq!(header.get("SERNO"), Some(&HeaderValue::Integer(5982)));
    }

    #[test]
    fn reverse_restores_original_names() {
        let original = legacy_header();
        let mut header = original.clone();

        convert_old_new(&mut header, true, false);
        let report = convert_old_new(&mut header, false, true);

        assert!(report.success);
        assert_eq!(report.direction, Direction::Reverse);
        assert_eq!(header, original);
    }

    #[test]
    fn existing_target_is_not_overwritten() {
        let mut header = Header::new();
        header.set("HIERARCH RON", 8.2);
        header.set("RON", 6.0);

        let report = convert_old_new(&mut header, true, false);

        assert!(report.not_renamed.contains(&"HIERARCH RON".to_string()));
        assert_eq!(header.get("RON"), Some(&HeaderValue::Float(6.0)));
        assert_eq!(header.get("HIERARCH RON"), Some(&HeaderValue::Float(8.2)));
    }
}
