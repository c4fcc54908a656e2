//! Comparison literals: numbers and calendar periods.
//!
//! A literal is classified by shape first. Text that has the shape of a date
//! or a number but does not denote a real value (`2024-13-01`, `10:61`) is
//! reported as malformed, so the lexer can decide whether to drop it silently
//! or record an error.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

/// A comparison literal with a known value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    /// A decimal number.
    Number(f64),
    /// A year, month, day or instant.
    Period(Period),
}

/// The span of time a date literal denotes, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    /// First millisecond of the period.
    pub start: DateTime<Utc>,
    /// Last millisecond of the period.
    pub end: DateTime<Utc>,
    /// The literal named an explicit time of day.
    pub has_time: bool,
}

/// Outcome of classifying a literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classified {
    /// Well-formed literal.
    Valid(Literal),
    /// Shaped like a literal, but names no real value.
    Malformed,
    /// Not a comparison literal at all.
    NotLiteral,
}

/// Characters that may appear inside a comparison literal.
pub fn is_literal_char(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '-' | '+' | ':' | '.' | 'T' | 't' | 'Z' | 'z')
}

/// Classifies `text` as a number, a calendar period, or neither.
///
/// A bare four-digit integer is a year, not a number.
pub fn classify(text: &str) -> Classified {
    let bytes = text.as_bytes();

    if let Some(shape) = date_shape(bytes) {
        return match shape.resolve() {
            Some(period) => Classified::Valid(Literal::Period(period)),
            None => Classified::Malformed,
        };
    }

    if is_number_shape(bytes) {
        return match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Classified::Valid(Literal::Number(value)),
            _ => Classified::Malformed,
        };
    }

    Classified::NotLiteral
}

/// Checks for `[+-]?digits(.digits)?`.
fn is_number_shape(bytes: &[u8]) -> bool {
    let unsigned = match bytes.first() {
        Some(b'+' | b'-') => &bytes[1..],
        _ => bytes,
    };

    let (whole, fraction) = match unsigned.iter().position(|&b| b == b'.') {
        Some(dot) => (&unsigned[..dot], Some(&unsigned[dot + 1..])),
        None => (unsigned, None),
    };

    let all_digits = |part: &[u8]| !part.is_empty() && part.iter().all(u8::is_ascii_digit);
    all_digits(whole) && fraction.is_none_or(all_digits)
}

/// The fields of a date literal, before calendar validation.
#[derive(Debug, Clone, Copy)]
struct DateShape {
    /// Four-digit year.
    year: i32,
    /// Month, when the literal has one.
    month: Option<u32>,
    /// Day of month, when the literal has one.
    day: Option<u32>,
    /// Time of day, when the literal has one.
    time: Option<TimeShape>,
}

/// The time-of-day part of a timestamp literal.
#[derive(Debug, Clone, Copy)]
struct TimeShape {
    /// Hour of day.
    hour: u32,
    /// Minute of hour.
    minute: u32,
    /// Second of minute (0 when omitted).
    second: u32,
    /// Fractional second in nanoseconds (0 when omitted).
    nanos: u32,
    /// Offset east of UTC (0 for `Z` or no offset).
    offset: Offset,
}

/// A UTC offset as written, before range validation.
#[derive(Debug, Clone, Copy)]
struct Offset {
    /// `1` east of UTC, `-1` west.
    sign: i32,
    /// Whole hours.
    hours: u32,
    /// Minutes past the hour.
    minutes: u32,
}

impl Offset {
    /// The zero offset.
    const UTC: Self = Self {
        sign: 1,
        hours: 0,
        minutes: 0,
    };

    /// Converts to a fixed offset, rejecting out-of-range fields.
    fn to_fixed(self) -> Option<FixedOffset> {
        if self.minutes >= 60 {
            return None;
        }
        let total = i32::try_from(self.hours * 3600 + self.minutes * 60).ok()?;
        FixedOffset::east_opt(self.sign * total)
    }
}

impl DateShape {
    /// Validates the fields against the calendar and computes the period.
    fn resolve(&self) -> Option<Period> {
        let year = self.year;
        match (self.month, self.day, self.time) {
            (None, _, _) => span(
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
            ),
            (Some(month), None, _) => {
                let start = NaiveDate::from_ymd_opt(year, month, 1)?;
                let next = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)?
                };
                span(start, next)
            }
            (Some(month), Some(day), None) => {
                let start = NaiveDate::from_ymd_opt(year, month, day)?;
                span(start, start.succ_opt()?)
            }
            (Some(month), Some(day), Some(time)) => {
                let date = NaiveDate::from_ymd_opt(year, month, day)?;
                let clock =
                    NaiveTime::from_hms_nano_opt(time.hour, time.minute, time.second, time.nanos)?;
                let offset = time.offset.to_fixed()?;
                let instant = offset
                    .from_local_datetime(&date.and_time(clock))
                    .single()?
                    .with_timezone(&Utc);
                Some(Period {
                    start: instant,
                    end: instant,
                    has_time: true,
                })
            }
        }
    }
}

/// Builds the period running from midnight of `start` up to, but excluding, `next`.
fn span(start: NaiveDate, next: NaiveDate) -> Option<Period> {
    let start = start.and_hms_opt(0, 0, 0)?.and_utc();
    let end = next.and_hms_opt(0, 0, 0)?.and_utc() - TimeDelta::milliseconds(1);
    Some(Period {
        start,
        end,
        has_time: false,
    })
}

/// Reads exactly `count` ASCII digits at `at`.
fn digits(bytes: &[u8], at: usize, count: usize) -> Option<u32> {
    let slice = bytes.get(at..at + count)?;
    if !slice.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        slice
            .iter()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0')),
    )
}

/// Matches `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM[:SS[.fff]][Z|±HH[:]MM]`.
fn date_shape(bytes: &[u8]) -> Option<DateShape> {
    let year = i32::try_from(digits(bytes, 0, 4)?).ok()?;
    let mut shape = DateShape {
        year,
        month: None,
        day: None,
        time: None,
    };
    if bytes.len() == 4 {
        return Some(shape);
    }

    if bytes.get(4) != Some(&b'-') {
        return None;
    }
    shape.month = Some(digits(bytes, 5, 2)?);
    if bytes.len() == 7 {
        return Some(shape);
    }

    if bytes.get(7) != Some(&b'-') {
        return None;
    }
    shape.day = Some(digits(bytes, 8, 2)?);
    if bytes.len() == 10 {
        return Some(shape);
    }

    if !matches!(bytes.get(10), Some(b'T' | b't')) {
        return None;
    }
    shape.time = Some(time_shape(&bytes[11..])?);
    Some(shape)
}

/// Matches the part of a timestamp after the `T`.
fn time_shape(bytes: &[u8]) -> Option<TimeShape> {
    let hour = digits(bytes, 0, 2)?;
    if bytes.get(2) != Some(&b':') {
        return None;
    }
    let minute = digits(bytes, 3, 2)?;

    let mut at = 5;
    let mut second = 0;
    let mut nanos = 0;
    if bytes.get(at) == Some(&b':') {
        second = digits(bytes, at + 1, 2)?;
        at += 3;
        if bytes.get(at) == Some(&b'.') {
            let start = at + 1;
            let end = bytes[start..]
                .iter()
                .position(|b| !b.is_ascii_digit())
                .map_or(bytes.len(), |p| start + p);
            let count = end - start;
            if count == 0 || count > 9 {
                return None;
            }
            nanos = digits(bytes, start, count)? * 10u32.pow(u32::try_from(9 - count).ok()?);
            at = end;
        }
    }

    let offset = offset(&bytes[at..])?;

    Some(TimeShape {
        hour,
        minute,
        second,
        nanos,
        offset,
    })
}

/// Parses a trailing UTC offset (`Z`, `+HH`, `+HHMM`, `+HH:MM`, or nothing).
fn offset(bytes: &[u8]) -> Option<Offset> {
    let sign = match bytes.first() {
        None => return Some(Offset::UTC),
        Some(b'Z' | b'z') if bytes.len() == 1 => return Some(Offset::UTC),
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return None,
    };

    let hours = digits(bytes, 1, 2)?;
    let minutes = match bytes.len() {
        3 => 0,
        5 => digits(bytes, 3, 2)?,
        6 if bytes[3] == b':' => digits(bytes, 4, 2)?,
        _ => return None,
    };

    Some(Offset {
        sign,
        hours,
        minutes,
    })
}
