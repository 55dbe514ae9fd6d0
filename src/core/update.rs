//! Header update planning and application.

use serde::Serialize;

use crate::error::Result;
use crate::header::{Header, Metadata};
use crate::keywords;
use crate::legacy::{self, RenameReport};
use crate::prompt::InputLoop;
use crate::readnoise::{self, ReadNoise, ReadNoiseEntry};
use crate::resolve::{self, Resolution, TerminalArg};

/// Entries of `info` whose value differs from the header's. A keyword the
/// header lacks always differs.
pub fn needs_update(info: &Metadata, header: &Header, verbose: bool) -> Metadata {
    let mut to_update = Metadata::new();
    for (key, value) in info {
        if header.get(key) != Some(value) {
            to_update.insert(key.clone(), value.clone());
        } else if verbose {
            crate::log_status!("update", "{} will not be updated", key);
        }
    }
    to_update
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateSummary {
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
}

/// Write the entries that need updating into `header`. New cards get the
/// canonical keyword comment.
pub fn apply_update(header: &mut Header, info: &Metadata, verbose: bool) -> UpdateSummary {
    let to_update = needs_update(info, header, verbose);
    let table = keywords::canonical();
    header.merge(&to_update, |key| table.comment_for(key));

    UpdateSummary {
        updated: to_update.keys().cloned().collect(),
        unchanged: info
            .keys()
            .filter(|k| !to_update.contains_key(*k))
            .cloned()
            .collect(),
    }
}

#[derive(Debug, Clone)]
pub struct UpdateOptions<'a> {
    /// Resolve run metadata; when false only `OBSERVAT` is written.
    pub do_update: bool,
    pub strict: bool,
    pub verbose: bool,
    /// HISTORY text appended when the header changed.
    pub history: Option<String>,
    pub readnoise_table: &'a [ReadNoiseEntry],
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted: Option<RenameReport>,
    pub resolution: Resolution,
    pub summary: UpdateSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readnoise: Option<ReadNoise>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub changed: bool,
}

/// Bring a header up to date: rename legacy keywords, resolve and merge run
/// metadata, then attach readout noise when the instrument configuration is
/// in the table.
pub fn update_header<L: InputLoop + ?Sized>(
    header: &mut Header,
    from_terminal: &[TerminalArg],
    options: &UpdateOptions<'_>,
    input_loop: &mut L,
) -> Result<HeaderUpdate> {
    let original = header.clone();

    let converted = legacy::has_old_keys(header)
        .then(|| legacy::convert_old_new(header, true, options.verbose));

    let resolution = resolve::resolve_metadata(
        options.do_update,
        from_terminal,
        header,
        options.strict,
        input_loop,
    )?;
    let summary = apply_update(header, &resolution.info, options.verbose);

    let mut warnings = Vec::new();
    let readnoise = match readnoise::set_readnoise(header, options.readnoise_table) {
        Ok(data) => Some(data),
        Err(e) => {
            let warning = format!("Readout noise not set: {}", e);
            crate::log_status!("readnoise", "{}", warning);
            warnings.push(warning);
            None
        }
    };

    let changed = *header != original;
    if changed {
        if let Some(text) = &options.history {
            header.add_history(text);
        }
    }

    Ok(HeaderUpdate {
        converted,
        resolution,
        summary,
        readnoise,
        warnings,
        changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderValue;

    fn info(entries: &[(&str, HeaderValue)]) -> Metadata {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn equal_values_are_excluded() {
        let mut header = Header::new();
        header.set("OBJECT", "M4");
        header.set("OBSERVAT", "SAAO");

        let info = info(&[
            ("OBJECT", HeaderValue::from("M4")),
            ("OBSERVAT", HeaderValue::from("SAAO")),
        ]);

        assert!(needs_update(&info, &header, true).is_empty());
    }

    #[test]
    fn absent_and_differing_values_are_included() {
        let mut header = Header::new();
        header.set("OBJECT", "M4");
        header.set("EPOCH", 1950_i64);

        let info = info(&[
            ("OBJECT", HeaderValue::from("M4")),
            ("EPOCH", HeaderValue::Float(2000.0)),
            ("OBSERVER", HeaderValue::from("Jane Doe")),
        ]);

        let result = needs_update(&info, &header, false);
        assert_eq!(result.len(), 2);
        assert!(result.contains_key("EPOCH"));
        assert!(result.contains_key("OBSERVER"));
    }

    #[test]
    fn numeric_equality_spans_int_and_float() {
        let mut header = Header::new();
        header.set("EPOCH", 2000_i64);
        let info = info(&[("EPOCH", HeaderValue::Float(2000.0))]);
        assert!(needs_update(&info, &header, false).is_empty());
    }

    #[test]
    fn apply_update_adds_comments_to_new_cards() {
        let mut header = Header::new();
        header.set("OBJECT", "M4");

        let info = info(&[
            ("OBJECT", HeaderValue::from("M4")),
            ("OBJRA", HeaderValue::from("16:23:35.22")),
            ("OBSERVAT", HeaderValue::from("SAAO")),
        ]);

        let summary = apply_update(&mut header, &info, false);

        assert_eq!(summary.updated, vec!["OBJRA", "OBSERVAT"]);
        assert_eq!(summary.unchanged, vec!["OBJECT"]);
        assert_eq!(header.comment("OBJRA"), Some("Right Ascension"));
        assert_eq!(header.comment("OBSERVAT"), Some("Observatory"));
    }

    mod workflow {
        use super::*;
        use crate::prompt::NonInteractive;

        fn options(table: &[ReadNoiseEntry]) -> UpdateOptions<'_> {
            UpdateOptions {
                do_update: true,
                strict: false,
                verbose: false,
                history: Some("updated".to_string()),
                readnoise_table: table,
            }
        }

        fn arg(key: &str, value: Option<&str>) -> TerminalArg {
            (key.to_string(), value.map(str::to_string))
        }

        #[test]
        fn legacy_header_is_converted_and_calibrated() {
            let mut header = Header::new();
            header.set("HIERARCH SERIAL NUMBER", 5982_i64);
            header.set("HIERARCH OUTPUT AMPLIFIER", "Conventional");
            header.set("HIERARCH PREAMPLIFIER GAIN", 2.4);
            header.set("HIERARCH HORIZONTAL SHIFT SPEED", 1.0);

            let table = readnoise::builtin_table();
            let terminal = vec![arg("object", Some("NGC 6121")), arg("epoch", None)];
            let result =
                update_header(&mut header, &terminal, &options(&table), &mut NonInteractive)
                    .unwrap();

            assert!(result.changed);
            assert!(result.converted.is_some());
            assert_eq!(header.get("SERNO"), Some(&HeaderValue::Integer(5982)));
            assert_eq!(header.get("OBJECT"), Some(&HeaderValue::from("NGC 6121")));
            assert_eq!(header.get("EPOCH"), Some(&HeaderValue::Integer(2000)));
            assert_eq!(header.get("RON"), Some(&HeaderValue::Float(6.32)));
            assert_eq!(result.resolution.warnings, vec!["Assuming EPOCH is 2000"]);

            let history: Vec<_> = header
                .cards()
                .iter()
                .filter(|c| c.keyword == "HISTORY")
                .collect();
            assert_eq!(history.len(), 1);
        }

        #[test]
        fn unknown_configuration_is_a_warning() {
            let mut header = Header::new();
            let table = readnoise::builtin_table();

            let result =
                update_header(&mut header, &[], &options(&table), &mut NonInteractive).unwrap();

            assert!(result.readnoise.is_none());
            assert_eq!(result.warnings.len(), 1);
            assert!(result.warnings[0].starts_with("Readout noise not set"));
            assert_eq!(header.get("OBSERVAT"), Some(&HeaderValue::from("SAAO")));
        }

        #[test]
        fn up_to_date_header_gets_no_history() {
            let mut header = Header::new();
            header.set("OBSERVAT", "SAAO");
            header.set("OBJECT", "M4");
            let table = readnoise::builtin_table();
            let terminal = vec![arg("object", None)];

            let result =
                update_header(&mut header, &terminal, &options(&table), &mut NonInteractive)
                    .unwrap();

            assert!(!result.changed);
            assert_eq!(result.summary.unchanged, vec!["OBJECT", "OBSERVAT"]);
            assert!(header.cards().iter().all(|c| c.keyword != "HISTORY"));
        }
    }
}
