//! Resolution of run-level header metadata.
//!
//! Terminal arguments are matched against the canonical keyword table. For
//! every matched keyword the value comes from the terminal, the existing
//! header, an assumed fallback or the operator, in that order of preference.
//! `OBSERVAT` is always set and never asked for.

use serde::Serialize;

use crate::error::Result;
use crate::header::{Header, HeaderValue, Metadata};
use crate::keywords::{self, KeywordTable, OBSERVATORY, OBSERVATORY_KEY};
use crate::matcher::match_keyword;
use crate::prompt::{InputLoop, PromptRequest};

pub const INTRO: &str = "\nPlease enter the following information about the observations to \
populate the image header. If you enter nothing that item will not be updated.";

/// A terminal argument name with its raw value.
pub type TerminalArg = (String, Option<String>);

#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    pub info: Metadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prompted: Vec<String>,
}

/// Resolve metadata against the canonical keyword table.
///
/// With `do_update == false` nothing is reconciled and only `OBSERVAT` is
/// returned; callers treat that as "metadata unresolved".
pub fn resolve_metadata<L: InputLoop + ?Sized>(
    do_update: bool,
    from_terminal: &[TerminalArg],
    header_for_defaults: &Header,
    strict: bool,
    input_loop: &mut L,
) -> Result<Resolution> {
    resolve_with_table(
        keywords::canonical(),
        do_update,
        from_terminal,
        header_for_defaults,
        strict,
        input_loop,
    )
}

/// The assumed value only replaces an empty header default when the terminal
/// gave nothing either, so a supplied value (`--tel 1.0m`) is never overridden.
pub fn resolve_with_table<L: InputLoop + ?Sized>(
    table: &KeywordTable,
    do_update: bool,
    from_terminal: &[TerminalArg],
    header_for_defaults: &Header,
    strict: bool,
    input_loop: &mut L,
) -> Result<Resolution> {
    let mut resolution = Resolution::default();

    if do_update {
        let mut intro_shown = false;

        for (term_key, term_value) in from_terminal {
            // most terminal arguments have nothing to do with the header
            let Some(header_key) = match_keyword(term_key, table.names()) else {
                continue;
            };
            let Some(spec) = table.get(header_key) else {
                continue;
            };

            let default = header_for_defaults.get(header_key).cloned();
            let supplied = term_value
                .as_deref()
                .map(|raw| spec.conversion.from_terminal(raw))
                .filter(HeaderValue::is_truthy);
            let mut info = supplied.or_else(|| default.clone());

            let info_truthy = is_truthy(&info);
            let default_truthy = is_truthy(&default);
            let ask = !info_truthy && strict;

            if ask {
                if !intro_shown {
                    input_loop.message(INTRO);
                    intro_shown = true;
                }
                let request = PromptRequest::for_keyword(spec, default, false);
                info = input_loop.ask(&request)?;
                resolution.prompted.push(header_key.to_string());
            } else if let Some(assumed) = spec
                .assumed
                .as_ref()
                .filter(|_| !default_truthy && !info_truthy)
            {
                let warning = format!("Assuming {} is {}", header_key, repr(assumed));
                crate::log_status!("header", "{}", warning);
                resolution.warnings.push(warning);
                info = Some(assumed.clone());
            }

            if let Some(value) = info.filter(HeaderValue::is_truthy) {
                resolution.info.insert(header_key.to_string(), value);
            }
        }
    }

    resolution.info.insert(
        OBSERVATORY_KEY.to_string(),
        HeaderValue::from(OBSERVATORY),
    );
    Ok(resolution)
}

fn is_truthy(value: &Option<HeaderValue>) -> bool {
    value.as_ref().is_some_and(HeaderValue::is_truthy)
}

fn repr(value: &HeaderValue) -> String {
    match value {
        HeaderValue::String(s) => format!("'{}'", s),
        other => other.to_string(),
    }
}
