//! Free-text sexagesimal coordinate and epoch parsing.
//!
//! Accepts colon or whitespace separated fields (`03:14:15`, `03 14 15.2`).
//! No frame transforms happen here.

use regex::Regex;
use std::sync::OnceLock;

const EPOCH_RANGE: (f64, f64) = (1800.0, 2200.0);

fn ra_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,2})(?:\s*:\s*|\s+)(\d{1,2})(?:\s*:\s*|\s+)(\d{1,2}(?:\.\d*)?)\s*$")
            .expect("Invalid regex pattern")
    })
}

fn dec_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*([+-]?)\s*(\d{1,2})(?:\s*:\s*|\s+)(\d{1,2})(?:\s*:\s*|\s+)(\d{1,2}(?:\.\d*)?)\s*$",
        )
        .expect("Invalid regex pattern")
    })
}

/// Right ascension as hours, minutes, seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RightAscension {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: f64,
}

/// Declination as sign, degrees, arcminutes, arcseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Declination {
    pub negative: bool,
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
}

impl RightAscension {
    pub fn parse(input: &str) -> Option<Self> {
        let caps = ra_pattern().captures(input)?;
        let hours: u32 = caps[1].parse().ok()?;
        let minutes: u32 = caps[2].parse().ok()?;
        let seconds: f64 = caps[3].parse().ok()?;

        if hours >= 24 || minutes >= 60 || seconds >= 60.0 {
            return None;
        }
        Some(Self {
            hours,
            minutes,
            seconds,
        })
    }

    pub fn to_degrees(&self) -> f64 {
        15.0 * (self.hours as f64 + self.minutes as f64 / 60.0 + self.seconds / 3600.0)
    }

    /// `HH:MM:SS.ss`
    pub fn to_sexagesimal(&self) -> String {
        format!("{:02}:{:02}:{:05.2}", self.hours, self.minutes, self.seconds)
    }
}

impl Declination {
    pub fn parse(input: &str) -> Option<Self> {
        let caps = dec_pattern().captures(input)?;
        let negative = &caps[1] == "-";
        let degrees: u32 = caps[2].parse().ok()?;
        let minutes: u32 = caps[3].parse().ok()?;
        let seconds: f64 = caps[4].parse().ok()?;

        if degrees > 90 || minutes >= 60 || seconds >= 60.0 {
            return None;
        }
        if degrees == 90 && (minutes > 0 || seconds > 0.0) {
            return None;
        }
        Some(Self {
            negative,
            degrees,
            minutes,
            seconds,
        })
    }

    pub fn to_degrees(&self) -> f64 {
        let magnitude = self.degrees as f64 + self.minutes as f64 / 60.0 + self.seconds / 3600.0;
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    /// `+DD:MM:SS.s`
    pub fn to_sexagesimal(&self) -> String {
        let sign = if self.negative { '-' } else { '+' };
        format!(
            "{}{:02}:{:02}:{:04.1}",
            sign, self.degrees, self.minutes, self.seconds
        )
    }
}

/// Epoch as a decimal year, optionally prefixed with `J` or `B`.
pub fn parse_epoch(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix(['J', 'j', 'B', 'b'])
        .unwrap_or(trimmed);
    let year: f64 = digits.parse().ok()?;
    (EPOCH_RANGE.0..=EPOCH_RANGE.1)
        .contains(&year)
        .then_some(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ra_accepts_colon_and_space_forms() {
        let a = RightAscension::parse("03:14:15").unwrap();
        let b = RightAscension::parse("03 14 15").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_sexagesimal(), "03:14:15.00");
    }

    #[test]
    fn ra_keeps_fractional_seconds() {
        let ra = RightAscension::parse(" 3:14:15.9265 ").unwrap();
        assert_eq!(ra.to_sexagesimal(), "03:14:15.93");
        assert!((ra.to_degrees() - 48.5663606).abs() < 1e-6);
    }

    #[test]
    fn ra_rejects_out_of_range_fields() {
        assert!(RightAscension::parse("24:00:00").is_none());
        assert!(RightAscension::parse("12:60:00").is_none());
        assert!(RightAscension::parse("12:00:60").is_none());
        assert!(RightAscension::parse("12h00m00s").is_none());
        assert!(RightAscension::parse("").is_none());
    }

    #[test]
    fn dec_accepts_signed_and_unsigned_forms() {
        let north = Declination::parse("+27:18:28.1").unwrap();
        let bare = Declination::parse("27 18 28.1").unwrap();
        assert_eq!(north, bare);
        assert_eq!(north.to_sexagesimal(), "+27:18:28.1");

        let south = Declination::parse("-05 02 03").unwrap();
        assert!(south.negative);
        assert_eq!(south.to_sexagesimal(), "-05:02:03.0");
        assert!(south.to_degrees() < 0.0);
    }

    #[test]
    fn dec_rejects_beyond_pole() {
        assert!(Declination::parse("+90:00:00").is_some());
        assert!(Declination::parse("+90:00:01").is_none());
        assert!(Declination::parse("91:00:00").is_none());
        assert!(Declination::parse("45:61:00").is_none());
    }

    #[test]
    fn epoch_parses_decimal_years() {
        assert_eq!(parse_epoch("2000"), Some(2000.0));
        assert_eq!(parse_epoch("J2000.0"), Some(2000.0));
        assert_eq!(parse_epoch("B1950"), Some(1950.0));
        assert_eq!(parse_epoch("20000"), None);
        assert_eq!(parse_epoch("now"), None);
    }
}
