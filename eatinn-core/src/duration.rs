//! Recipe timings and their text form.
//!
//! A timing is written as a sequence of decimal numbers, each with an optional
//! fraction and a unit suffix, such as "45s", "1.5h" or "2h15m30s". Valid units
//! are "ns", "us" (or "µs"), "ms", "s", "m" and "h". A bare "0" means zero.
//!
//! Formatting always produces the canonical spelling: "0s", "300ms", "1.5s",
//! "1m0s", "1h30m0s".

use crate::error::FormatError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

/// Largest accepted timing in nanoseconds (roughly 292 years).
const MAX_NANOS: u128 = i64::MAX as u128;

/// Fraction digits beyond this cannot change a nanosecond count.
const MAX_FRACTION_DIGITS: usize = 18;

/// Wall-clock length of a recipe phase (prep time, active time).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timing(Duration);

impl Timing {
    pub const ZERO: Timing = Timing(Duration::ZERO);

    pub const fn from_duration(duration: Duration) -> Self {
        Timing(duration)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Timing(Duration::from_secs(secs))
    }

    /// Largest whole number of minutes a timing can hold.
    pub const MAX_MINUTES: u64 = (MAX_NANOS / NANOS_PER_MINUTE) as u64;

    /// Saturates at [`Timing::MAX_MINUTES`].
    pub const fn from_minutes(minutes: u64) -> Self {
        let minutes = if minutes > Self::MAX_MINUTES {
            Self::MAX_MINUTES
        } else {
            minutes
        };
        Timing(Duration::from_secs(minutes * 60))
    }

    /// `None` when `minutes` exceeds [`Timing::MAX_MINUTES`].
    pub const fn checked_from_minutes(minutes: u64) -> Option<Self> {
        if minutes > Self::MAX_MINUTES {
            None
        } else {
            Some(Timing(Duration::from_secs(minutes * 60)))
        }
    }

    pub const fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Duration> for Timing {
    fn from(duration: Duration) -> Self {
        Timing(duration)
    }
}

impl From<Timing> for Duration {
    fn from(timing: Timing) -> Self {
        timing.0
    }
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(NANOS_PER_MINUTE),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

fn fraction_nanos(digits: &str, scale: u128) -> u128 {
    let digits = &digits[..digits.len().min(MAX_FRACTION_DIGITS)];
    if digits.is_empty() {
        return 0;
    }
    let numerator: u128 = digits.parse().unwrap_or(0);
    numerator * scale / 10u128.pow(digits.len() as u32)
}

fn split_digits(s: &str) -> (&str, &str) {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    s.split_at(len)
}

impl FromStr for Timing {
    type Err = FormatError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || FormatError::Invalid(input.to_string());
        let overflow = || FormatError::Overflow(input.to_string());

        let (negative, mut rest) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        if rest == "0" {
            return Ok(Timing::ZERO);
        }
        if rest.is_empty() {
            return Err(invalid());
        }

        let mut total: u128 = 0;
        while !rest.is_empty() {
            let (whole_digits, after) = split_digits(rest);
            let (fraction_digits, after) = match after.strip_prefix('.') {
                Some(after_dot) => split_digits(after_dot),
                None => ("", after),
            };
            if whole_digits.is_empty() && fraction_digits.is_empty() {
                return Err(invalid());
            }

            let unit_len = after
                .find(|c: char| c == '.' || c.is_ascii_digit())
                .unwrap_or(after.len());
            let (unit, remainder) = after.split_at(unit_len);
            if unit.is_empty() {
                return Err(FormatError::MissingUnit(input.to_string()));
            }
            let scale = unit_nanos(unit).ok_or_else(|| FormatError::UnknownUnit {
                unit: unit.to_string(),
                input: input.to_string(),
            })?;

            let whole: u128 = if whole_digits.is_empty() {
                0
            } else {
                whole_digits.parse().map_err(|_| overflow())?
            };
            let value = whole
                .checked_mul(scale)
                .and_then(|v| v.checked_add(fraction_nanos(fraction_digits, scale)))
                .ok_or_else(overflow)?;
            total = total.checked_add(value).ok_or_else(overflow)?;
            if total > MAX_NANOS {
                return Err(overflow());
            }
            rest = remainder;
        }

        if negative && total > 0 {
            return Err(FormatError::Negative(input.to_string()));
        }

        let nanos = u64::try_from(total).map_err(|_| overflow())?;
        Ok(Timing(Duration::from_nanos(nanos)))
    }
}

/// Writes `value / scale` with up to `digits` fraction digits, trailing zeros trimmed.
fn write_fixed(f: &mut fmt::Formatter<'_>, value: u128, scale: u128, digits: usize) -> fmt::Result {
    let whole = value / scale;
    let fraction = value % scale;
    if fraction == 0 {
        return write!(f, "{whole}");
    }
    let fraction = format!("{fraction:0digits$}");
    write!(f, "{whole}.{}", fraction.trim_end_matches('0'))
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        if nanos == 0 {
            return f.write_str("0s");
        }

        if nanos < NANOS_PER_SEC {
            if nanos < NANOS_PER_MICRO {
                return write!(f, "{nanos}ns");
            }
            if nanos < NANOS_PER_MILLI {
                write_fixed(f, nanos, NANOS_PER_MICRO, 3)?;
                return f.write_str("µs");
            }
            write_fixed(f, nanos, NANOS_PER_MILLI, 6)?;
            return f.write_str("ms");
        }

        let hours = nanos / NANOS_PER_HOUR;
        let minutes = nanos % NANOS_PER_HOUR / NANOS_PER_MINUTE;
        let seconds = nanos % NANOS_PER_MINUTE;

        if hours > 0 {
            write!(f, "{hours}h")?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        write_fixed(f, seconds, NANOS_PER_SEC, 9)?;
        f.write_str("s")
    }
}

impl Serialize for Timing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct TimingVisitor;

impl Visitor<'_> for TimingVisitor {
    type Value = Timing;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration string such as \"30m\" or \"1h30m\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Timing, E> {
        value.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Timing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(TimingVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Timing, FormatError> {
        s.parse()
    }

    #[test]
    fn test_minutes_beyond_the_maximum() {
        assert_eq!(Timing::MAX_MINUTES, 153_722_867);
        assert_eq!(
            Timing::checked_from_minutes(Timing::MAX_MINUTES),
            Some(Timing::from_secs(153_722_867 * 60))
        );
        assert_eq!(Timing::checked_from_minutes(Timing::MAX_MINUTES + 1), None);
        assert_eq!(Timing::checked_from_minutes(i64::MAX as u64), None);
        assert_eq!(
            Timing::from_minutes(u64::MAX),
            Timing::from_minutes(Timing::MAX_MINUTES)
        );
    }

    #[test]
    fn test_parse_hours_and_minutes() {
        assert_eq!(parse("1h30m").unwrap(), Timing::from_minutes(90));
        assert_eq!(parse("2h15m30s").unwrap(), Timing::from_secs(2 * 3600 + 15 * 60 + 30));
    }

    #[test]
    fn test_parse_fraction_and_small_units() {
        assert_eq!(parse("1.5h").unwrap(), Timing::from_minutes(90));
        assert_eq!(parse(".5s").unwrap(), Timing::from_duration(Duration::from_millis(500)));
        assert_eq!(parse("300ms").unwrap(), Timing::from_duration(Duration::from_millis(300)));
        assert_eq!(parse("15us").unwrap(), Timing::from_duration(Duration::from_micros(15)));
        assert_eq!(parse("15µs").unwrap(), Timing::from_duration(Duration::from_micros(15)));
        assert_eq!(parse("7ns").unwrap(), Timing::from_duration(Duration::from_nanos(7)));
    }

    #[test]
    fn test_parse_zero_forms() {
        assert_eq!(parse("0").unwrap(), Timing::ZERO);
        assert_eq!(parse("0m").unwrap(), Timing::ZERO);
        assert_eq!(parse("-0s").unwrap(), Timing::ZERO);
        assert_eq!(parse("+45m").unwrap(), Timing::from_minutes(45));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse(""), Err(FormatError::Invalid(_))));
        assert!(matches!(parse("abc"), Err(FormatError::Invalid(_))));
        assert!(matches!(parse("."), Err(FormatError::Invalid(_))));
        assert!(matches!(parse("30"), Err(FormatError::MissingUnit(_))));
        assert!(matches!(parse("1h30"), Err(FormatError::MissingUnit(_))));
        assert!(matches!(
            parse("3 days"),
            Err(FormatError::UnknownUnit { .. })
        ));
        assert!(matches!(
            parse("3d"),
            Err(FormatError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_negative_and_overflow() {
        assert!(matches!(parse("-5m"), Err(FormatError::Negative(_))));
        assert!(matches!(parse("3000000h"), Err(FormatError::Overflow(_))));
        assert!(matches!(
            parse("99999999999999999999999999999999999999999h"),
            Err(FormatError::Overflow(_))
        ));
    }

    #[test]
    fn test_display_canonical_forms() {
        assert_eq!(Timing::ZERO.to_string(), "0s");
        assert_eq!(Timing::from_minutes(90).to_string(), "1h30m0s");
        assert_eq!(Timing::from_minutes(1).to_string(), "1m0s");
        assert_eq!(Timing::from_secs(61).to_string(), "1m1s");
        assert_eq!(Timing::from_minutes(120).to_string(), "2h0m0s");
        assert_eq!(
            Timing::from_duration(Duration::from_millis(1500)).to_string(),
            "1.5s"
        );
        assert_eq!(
            Timing::from_duration(Duration::from_millis(300)).to_string(),
            "300ms"
        );
        assert_eq!(
            Timing::from_duration(Duration::from_micros(1500)).to_string(),
            "1.5ms"
        );
        assert_eq!(
            Timing::from_duration(Duration::from_nanos(2500)).to_string(),
            "2.5µs"
        );
        assert_eq!(
            Timing::from_duration(Duration::from_nanos(42)).to_string(),
            "42ns"
        );
    }

    #[test]
    fn test_display_output_parses_back() {
        for text in ["1h30m0s", "45m0s", "1.5s", "300ms", "2.5µs", "0s"] {
            assert_eq!(parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_json_accepts_only_strings() {
        let timing: Timing = serde_json::from_str("\"1h30m\"").unwrap();
        assert_eq!(timing, Timing::from_minutes(90));
        assert_eq!(serde_json::to_string(&timing).unwrap(), "\"1h30m0s\"");

        let err = serde_json::from_str::<Timing>("5400").unwrap_err();
        assert!(err.to_string().contains("duration string"));

        let err = serde_json::from_str::<Timing>("\"soon\"").unwrap_err();
        assert!(err.to_string().contains("invalid duration"));
    }
}
