//! Readout noise, sensitivity and saturation per instrument configuration.
//!
//! Rows are keyed by camera serial number, output amplifier, pre-amplifier
//! gain setting and horizontal readout frequency. The header supplies these
//! as `SERNO`, `OUTPTAMP`, `PREAMP` and `HSHIFT`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, ReadNoiseConfigDetails, Result};
use crate::header::Header;

const SETTING_TOLERANCE: f64 = 1e-3;

pub const RON_KEY: &str = "RON";
pub const SENSITIVITY_KEY: &str = "SENSITIV";
pub const SATURATION_KEY: &str = "SATURATE";

const RON_COMMENT: &str = "CCD Readout Noise";
const SENSITIVITY_COMMENT: &str = "CCD Sensitivity";
const SATURATION_COMMENT: &str = "CCD saturation counts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmplifierMode {
    #[serde(rename = "EM")]
    ElectronMultiplying,
    #[serde(rename = "CON")]
    Conventional,
}

impl AmplifierMode {
    /// Parse an `OUTPTAMP` value such as `Electron Multiplying` or `CON`.
    pub fn from_header(value: &str) -> Option<Self> {
        let v = value.trim().to_lowercase();
        if v.starts_with("electron") || v == "em" {
            Some(AmplifierMode::ElectronMultiplying)
        } else if v.starts_with("conv") || v == "con" {
            Some(AmplifierMode::Conventional)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AmplifierMode::ElectronMultiplying => "EM",
            AmplifierMode::Conventional => "CON",
        }
    }
}

/// One row of the lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadNoiseEntry {
    pub serno: i64,
    pub mode: AmplifierMode,
    pub preamp: f64,
    pub readout_mhz: f64,
    /// electrons
    pub ron: f64,
    /// electrons per ADU
    pub sensitivity: f64,
    /// ADU
    pub saturation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadNoise {
    pub ron: f64,
    pub sensitivity: f64,
    pub saturation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadNoiseCard {
    pub keyword: &'static str,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<&'static str>,
}

/// Instrument settings read from a header.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSetup {
    pub serno: i64,
    pub mode: AmplifierMode,
    pub preamp: f64,
    pub readout_mhz: f64,
}

impl InstrumentSetup {
    pub fn from_header(header: &Header) -> Result<Self> {
        let serno = header
            .get("SERNO")
            .ok_or_else(|| Error::readnoise_missing_key("SERNO"))?;
        let serno = serno
            .as_i64()
            .ok_or_else(|| Error::header_invalid_value("SERNO", serno.to_string()))?;

        let amp = header
            .get("OUTPTAMP")
            .ok_or_else(|| Error::readnoise_missing_key("OUTPTAMP"))?;
        let mode = AmplifierMode::from_header(&amp.to_string())
            .ok_or_else(|| Error::header_invalid_value("OUTPTAMP", amp.to_string()))?;

        let preamp = header
            .get("PREAMP")
            .ok_or_else(|| Error::readnoise_missing_key("PREAMP"))?;
        let preamp = preamp
            .as_f64()
            .ok_or_else(|| Error::header_invalid_value("PREAMP", preamp.to_string()))?;

        let readout = header
            .get("HSHIFT")
            .ok_or_else(|| Error::readnoise_missing_key("HSHIFT"))?;
        let readout_mhz = readout
            .as_f64()
            .ok_or_else(|| Error::header_invalid_value("HSHIFT", readout.to_string()))?;

        Ok(Self {
            serno,
            mode,
            preamp,
            readout_mhz,
        })
    }

    fn matches(&self, entry: &ReadNoiseEntry) -> bool {
        entry.serno == self.serno
            && entry.mode == self.mode
            && (entry.preamp - self.preamp).abs() < SETTING_TOLERANCE
            && (entry.readout_mhz - self.readout_mhz).abs() < SETTING_TOLERANCE
    }
}

/// Look up readout noise, sensitivity and saturation for the header's
/// instrument configuration.
pub fn get_readnoise(header: &Header, table: &[ReadNoiseEntry]) -> Result<ReadNoise> {
    let setup = InstrumentSetup::from_header(header)?;
    table
        .iter()
        .find(|entry| setup.matches(entry))
        .map(|entry| ReadNoise {
            ron: entry.ron,
            sensitivity: entry.sensitivity,
            saturation: entry.saturation,
        })
        .ok_or_else(|| {
            Error::readnoise_no_match(ReadNoiseConfigDetails {
                serno: Some(setup.serno),
                mode: Some(setup.mode.as_str().to_string()),
                preamp: Some(setup.preamp),
                readout_mhz: Some(setup.readout_mhz),
            })
        })
}

/// `RON`, `SENSITIV` and `SATURATE` cards, optionally with their comments.
pub fn readnoise_dict(
    header: &Header,
    table: &[ReadNoiseEntry],
    with_comments: bool,
) -> Result<Vec<ReadNoiseCard>> {
    let data = get_readnoise(header, table)?;
    let card = |keyword, value, comment| ReadNoiseCard {
        keyword,
        value,
        comment: with_comments.then_some(comment),
    };
    Ok(vec![
        card(RON_KEY, data.ron, RON_COMMENT),
        card(SENSITIVITY_KEY, data.sensitivity, SENSITIVITY_COMMENT),
        card(SATURATION_KEY, data.saturation, SATURATION_COMMENT),
    ])
}

/// Write the derived calibration cards into the header.
pub fn set_readnoise(header: &mut Header, table: &[ReadNoiseEntry]) -> Result<ReadNoise> {
    let data = get_readnoise(header, table)?;
    header.set_with_comment(RON_KEY, data.ron, RON_COMMENT);
    header.set_with_comment(SENSITIVITY_KEY, data.sensitivity, SENSITIVITY_COMMENT);
    header.set_with_comment(SATURATION_KEY, data.saturation, SATURATION_COMMENT);
    Ok(data)
}

fn row(
    serno: i64,
    mode: AmplifierMode,
    preamp: f64,
    readout_mhz: f64,
    ron: f64,
    sensitivity: f64,
    saturation: f64,
) -> ReadNoiseEntry {
    ReadNoiseEntry {
        serno,
        mode,
        preamp,
        readout_mhz,
        ron,
        sensitivity,
        saturation,
    }
}

/// Nominal table for the two SHOC cameras, used when the config file does
/// not provide one.
pub fn builtin_table() -> Vec<ReadNoiseEntry> {
    use AmplifierMode::{Conventional as CON, ElectronMultiplying as EM};
    vec![
        row(5982, CON, 1.0, 1.0, 8.32, 3.74, 65535.0),
        row(5982, CON, 2.4, 1.0, 6.32, 1.47, 65535.0),
        row(5982, CON, 4.9, 1.0, 5.92, 0.72, 32768.0),
        row(5982, CON, 2.4, 3.0, 10.29, 1.58, 65535.0),
        row(5982, EM, 1.0, 1.0, 36.96, 17.87, 65535.0),
        row(5982, EM, 2.4, 1.0, 30.04, 7.43, 65535.0),
        row(5982, EM, 4.9, 10.0, 46.11, 3.54, 65535.0),
        row(6448, CON, 1.0, 1.0, 7.91, 3.57, 65535.0),
        row(6448, CON, 2.4, 1.0, 6.08, 1.41, 65535.0),
        row(6448, CON, 4.9, 1.0, 5.53, 0.69, 32768.0),
        row(6448, EM, 1.0, 1.0, 38.59, 18.56, 65535.0),
        row(6448, EM, 2.4, 1.0, 29.48, 7.65, 65535.0),
        row(6448, EM, 4.9, 10.0, 44.96, 3.71, 65535.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderValue;

    fn shoc_header(serno: i64, amp: &str, preamp: f64, hshift: f64) -> Header {
        let mut header = Header::new();
        header.set("SERNO", serno);
        header.set("OUTPTAMP", amp);
        header.set("PREAMP", preamp);
        header.set("HSHIFT", hshift);
        header
    }

    #[test]
    fn amplifier_mode_parses_header_spellings() {
        assert_eq!(
            AmplifierMode::from_header("Electron Multiplying"),
            Some(AmplifierMode::ElectronMultiplying)
        );
        assert_eq!(
            AmplifierMode::from_header("Conventional"),
            Some(AmplifierMode::Conventional)
        );
        assert_eq!(AmplifierMode::from_header("CON"), Some(AmplifierMode::Conventional));
        assert_eq!(AmplifierMode::from_header("unknown"), None);
    }

    #[test]
    fn lookup_matches_configuration() {
        let header = shoc_header(6448, "Conventional", 2.4, 1.0);
        let data = get_readnoise(&header, &builtin_table()).unwrap();
        assert_eq!(data.ron, 6.08);
        assert_eq!(data.sensitivity, 1.41);
        assert_eq!(data.saturation, 65535.0);
    }

    #[test]
    fn lookup_reports_missing_configuration_key() {
        let mut header = shoc_header(5982, "EM", 1.0, 1.0);
        header.remove("HSHIFT");
        let err = get_readnoise(&header, &builtin_table()).unwrap_err();
        assert_eq!(err.code.as_str(), "readnoise.missing_key");
        assert_eq!(err.details["keyword"], "HSHIFT");
    }

    #[test]
    fn lookup_reports_unknown_configuration() {
        let header = shoc_header(1234, "CON", 1.0, 1.0);
        let err = get_readnoise(&header, &builtin_table()).unwrap_err();
        assert_eq!(err.code.as_str(), "readnoise.no_match");
        assert_eq!(err.details["serno"], 1234);
    }

    #[test]
    fn string_valued_settings_are_accepted() {
        let mut header = shoc_header(5982, "CON", 0.0, 0.0);
        header.set("SERNO", "5982");
        header.set("PREAMP", "4.9");
        header.set("HSHIFT", "1");
        let data = get_readnoise(&header, &builtin_table()).unwrap();
        assert_eq!(data.ron, 5.92);
    }

    #[test]
    fn dict_includes_comments_on_request() {
        let header = shoc_header(5982, "CON", 1.0, 1.0);
        let table = builtin_table();

        let plain = readnoise_dict(&header, &table, false).unwrap();
        assert!(plain.iter().all(|c| c.comment.is_none()));

        let commented = readnoise_dict(&header, &table, true).unwrap();
        let keywords: Vec<_> = commented.iter().map(|c| c.keyword).collect();
        assert_eq!(keywords, vec!["RON", "SENSITIV", "SATURATE"]);
        assert_eq!(commented[0].comment, Some("CCD Readout Noise"));
    }

    #[test]
    fn set_readnoise_writes_cards() {
        let mut header = shoc_header(5982, "Electron Multiplying", 2.4, 1.0);
        set_readnoise(&mut header, &builtin_table()).unwrap();

        assert_eq!(header.get("RON"), Some(&HeaderValue::Float(30.04)));
        assert_eq!(header.comment("SENSITIV"), Some("CCD Sensitivity"));
        assert!(header.contains("SATURATE"));
    }
}
